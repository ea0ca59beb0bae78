//! AI pre-check gate: a cheap, synchronous heuristic that decides whether
//! an email is worth a remote model call at all.
//!
//! This is a cost/latency control, not a correctness mechanism. It is
//! independent of the rule-engine score and degrades toward escalation:
//! when the optional metadata cannot be read, the email goes to the model.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::config::GateConfig;
use crate::email::GateMeta;

/// Decide whether to escalate `(subject, body)` to the model. Escalates on:
/// a question mark anywhere, any configured action keyword, a sender the
/// user replies to often, or unread mail gone stale.
pub fn should_escalate(
    cfg: &GateConfig,
    subject: &str,
    body: &str,
    meta: Option<&GateMeta>,
    now: DateTime<Utc>,
) -> bool {
    let text = format!("{} {}", subject.to_lowercase(), body.to_lowercase());

    if text.contains('?') {
        return true;
    }

    if cfg.action_keywords.iter().any(|k| text.contains(k.as_str())) {
        return true;
    }

    if let Some(meta) = meta {
        if meta.reply_count > cfg.reply_count_min {
            return true;
        }
        if !meta.is_read && now - meta.received_at > Duration::hours(cfg.stale_unread_hours) {
            return true;
        }
    }

    false
}

/// Variant for callers whose metadata lookup can fail: an `Err` escalates.
pub fn should_escalate_or_default<E: std::fmt::Display>(
    cfg: &GateConfig,
    subject: &str,
    body: &str,
    meta: Result<Option<GateMeta>, E>,
    now: DateTime<Utc>,
) -> bool {
    match meta {
        Ok(meta) => should_escalate(cfg, subject, body, meta.as_ref(), now),
        Err(e) => {
            warn!(error = %e, "gate metadata lookup failed; escalating to model");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn cfg() -> GateConfig {
        EngineConfig::builtin().gate
    }

    fn now() -> DateTime<Utc> {
        "2026-03-01T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn newsletter_text_does_not_escalate() {
        let escalate = should_escalate(
            &cfg(),
            "Weekly Tech Newsletter - January 2026",
            "Top stories from around the industry this week.",
            None,
            now(),
        );
        assert!(!escalate);
    }

    #[test]
    fn question_mark_escalates() {
        let escalate = should_escalate(
            &cfg(),
            "Quick question about the meeting",
            "Does 3pm still work for you?",
            None,
            now(),
        );
        assert!(escalate);
    }

    #[test]
    fn action_keyword_escalates() {
        let escalate = should_escalate(&cfg(), "Project timeline", "The deadline moved up.", None, now());
        assert!(escalate);
    }

    #[test]
    fn frequent_sender_escalates() {
        let meta = GateMeta {
            reply_count: 4,
            is_read: true,
            received_at: now(),
        };
        let escalate = should_escalate(&cfg(), "Catch up", "Nothing new on my side.", Some(&meta), now());
        assert!(escalate, "reply_count 4 > threshold 3 should escalate");
    }

    #[test]
    fn reply_count_at_threshold_does_not_escalate() {
        let meta = GateMeta {
            reply_count: 3,
            is_read: true,
            received_at: now(),
        };
        let escalate = should_escalate(&cfg(), "Catch up", "Nothing here.", Some(&meta), now());
        assert!(!escalate);
    }

    #[test]
    fn stale_unread_escalates() {
        let meta = GateMeta {
            reply_count: 0,
            is_read: false,
            received_at: now() - Duration::hours(96),
        };
        let escalate = should_escalate(&cfg(), "Old note", "Some text.", Some(&meta), now());
        assert!(escalate, "unread for 4 days should escalate");
    }

    #[test]
    fn recent_read_mail_without_keywords_stays_cheap() {
        let meta = GateMeta {
            reply_count: 1,
            is_read: true,
            received_at: now() - Duration::hours(2),
        };
        let escalate = should_escalate(&cfg(), "Notes", "Summary attached.", Some(&meta), now());
        assert!(!escalate);
    }

    #[test]
    fn metadata_error_fails_toward_escalation() {
        let meta: Result<Option<GateMeta>, anyhow::Error> = Err(anyhow::anyhow!("db timeout"));
        let escalate = should_escalate_or_default(&cfg(), "Notes", "Summary attached.", meta, now());
        assert!(escalate);
    }
}
