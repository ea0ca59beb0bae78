// tests/gate_fixtures.rs
//
// Pre-check gate scenarios over realistic inbox fixtures: the gate must
// keep obvious bulk mail off the model while escalating anything that
// smells like it needs an answer.

use chrono::{DateTime, Duration, Utc};

use inbox_decision_engine::{should_escalate, should_escalate_or_default, GateConfig, GateMeta};

fn cfg() -> GateConfig {
    GateConfig::default()
}

fn now() -> DateTime<Utc> {
    "2026-03-01T09:00:00Z".parse().unwrap()
}

#[test]
fn weekly_newsletter_short_circuits() {
    let escalate = should_escalate(
        &cfg(),
        "Weekly Tech Newsletter - January 2026",
        "Top stories from around the industry. Read on for product launches and funding news.",
        None,
        now(),
    );
    assert!(!escalate, "digest mail must not pay for a model call");
}

#[test]
fn question_about_meeting_escalates() {
    let escalate = should_escalate(
        &cfg(),
        "Quick question about the meeting",
        "Does Thursday at 3pm still work for you?",
        None,
        now(),
    );
    assert!(escalate);
}

#[test]
fn deadline_keyword_escalates() {
    let escalate = should_escalate(
        &cfg(),
        "Timeline update",
        "Heads-up that the deadline for the submission moved to next month.",
        None,
        now(),
    );
    assert!(escalate);
}

#[test]
fn frequent_correspondent_escalates_even_without_keywords() {
    let meta = GateMeta {
        reply_count: 7,
        is_read: true,
        received_at: now() - Duration::hours(1),
    };
    let escalate = should_escalate(&cfg(), "One more thing", "Sending the doc over now.", Some(&meta), now());
    assert!(escalate);
}

#[test]
fn stale_unread_mail_escalates() {
    let meta = GateMeta {
        reply_count: 0,
        is_read: false,
        received_at: now() - Duration::days(4),
    };
    let escalate = should_escalate(&cfg(), "Following along", "Some plain text.", Some(&meta), now());
    assert!(escalate);
}

#[test]
fn quiet_mail_with_quiet_meta_stays_cheap() {
    let meta = GateMeta {
        reply_count: 1,
        is_read: true,
        received_at: now() - Duration::hours(2),
    };
    let escalate = should_escalate(&cfg(), "Notes", "Minutes attached for the record.", Some(&meta), now());
    assert!(!escalate);
}

#[test]
fn metadata_failure_fails_toward_the_model() {
    let broken: Result<Option<GateMeta>, anyhow::Error> = Err(anyhow::anyhow!("index offline"));
    let escalate = should_escalate_or_default(&cfg(), "Notes", "Minutes attached.", broken, now());
    assert!(escalate, "metadata errors must not silently under-classify");
}
