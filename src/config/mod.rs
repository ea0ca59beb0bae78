//! Engine configuration: phrase tables, weights, thresholds.
//!
//! All "business logic" pattern tables are data, not scattered literals:
//! they load from TOML (`config/engine.toml`, path overridable via
//! `ENGINE_CONFIG_PATH`) and fall back to the compiled-in defaults below so
//! the library works with no file on disk. Thresholds can additionally be
//! overridden per-process via `ENGINE_SOFT_THRESHOLD` / `ENGINE_HARD_THRESHOLD`.

pub mod ai;

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_ENGINE_CONFIG_PATH: &str = "ENGINE_CONFIG_PATH";
pub const ENV_SOFT_THRESHOLD: &str = "ENGINE_SOFT_THRESHOLD";
pub const ENV_HARD_THRESHOLD: &str = "ENGINE_HARD_THRESHOLD";

/// Compiled-in defaults. The shipped `config/engine.toml` mirrors this; edits
/// there win over the built-in tables.
const DEFAULT_ENGINE_TOML: &str = r#"
[thresholds]
# confidence >= hard -> Level 2, >= soft -> Level 1, else Level 0
soft = 0.60
hard = 0.75

[weights]
base = 0.30
explicit_choice = 0.35
mandatory_action = 0.30
rsvp = 0.25
interest_check = 0.15
feedback_request = 0.15
personal_question = 0.15
time_boxed = 0.20
real_sender = 0.10
deadline_urgent = 0.25
deadline_soon = 0.15
deadline_unresolved = 0.10

[exclusions]
sender_prefixes = [
    "noreply", "no-reply", "donotreply", "do-not-reply", "newsletter",
    "newsletters", "notifications", "notification", "alerts", "updates",
    "marketing", "mailer-daemon", "bounce", "automated", "digest",
]
bulk_domains = [
    "mailchimp.com", "sendgrid.net", "substack.com", "beehiiv.com",
    "convertkit.com", "mailerlite.com", "campaign-archive.com",
    "facebookmail.com", "linkedin.com", "twitter.com", "x.com",
    "pinterest.com", "medium.com", "quora.com", "glassdoor.com",
]
newsletter_subjects = [
    "newsletter", "digest", "weekly roundup", "monthly roundup",
    "bulletin", "issue #", "this week in", "top stories",
]
fyi_phrases = [
    "fyi", "for your information", "no action needed", "no action required",
    "no reply needed", "just so you know", "for your records",
    "this is an automated", "do not reply to this",
]
# Bodies longer than this read like long-form newsletters.
long_form_chars = 8000

[signals]
explicit_choice = [
    "approve or reject", "accept or decline", "yes or no", "option a",
    "option b", "which option", "choose between", "please approve",
    "approval needed", "need your approval", "sign off", "authorize",
    "your decision", "decide whether",
]
mandatory_action = [
    "action required", "action needed", "must complete", "required by",
    "you need to", "you must", "please complete", "please submit",
    "please review and", "needs your", "waiting on you", "blocking",
]
rsvp = [
    "rsvp", "please confirm", "confirm your attendance", "will you attend",
    "are you coming", "save the date", "confirm by", "accept the invitation",
]
interest_check = [
    "are you interested", "would you be interested", "interested in",
    "let me know if you", "open to", "would you like to",
]
feedback_request = [
    "your feedback", "your thoughts", "what do you think", "review and comment",
    "any objections", "thoughts on", "comments on", "input on",
]
personal_question = [
    "can you", "could you", "would you", "do you", "are you able",
    "what time", "when can", "when are you", "?",
]
time_boxed = [
    "expires", "offer ends", "last chance", "final day", "closing soon",
    "only today", "limited time", "before it's too late", "ends tonight",
]
automated_sender_markers = ["noreply", "no-reply", "donotreply", "automated", "notifications", "mailer"]

[gate]
action_keywords = [
    "please confirm", "deadline", "urgent", "let me know", "action required",
    "asap", "respond by", "rsvp", "approval", "waiting for your",
]
reply_count_min = 3
stale_unread_hours = 72
"#;

/// Level thresholds. Fixed per run, tunable via config/env.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Thresholds {
    pub soft: f32,
    pub hard: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            soft: 0.60,
            hard: 0.75,
        }
    }
}

/// Per-category scoring weights plus the base confidence floor.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Weights {
    pub base: f32,
    pub explicit_choice: f32,
    pub mandatory_action: f32,
    pub rsvp: f32,
    pub interest_check: f32,
    pub feedback_request: f32,
    pub personal_question: f32,
    pub time_boxed: f32,
    pub real_sender: f32,
    pub deadline_urgent: f32,
    pub deadline_soon: f32,
    pub deadline_unresolved: f32,
}

impl Default for Weights {
    fn default() -> Self {
        EngineConfig::builtin().weights
    }
}

/// "Never a decision" pattern tables for the hard-exclusion filter.
#[derive(Debug, Clone, Deserialize)]
pub struct ExclusionTables {
    pub sender_prefixes: Vec<String>,
    pub bulk_domains: Vec<String>,
    pub newsletter_subjects: Vec<String>,
    pub fyi_phrases: Vec<String>,
    pub long_form_chars: usize,
}

/// The seven signal phrase categories plus sender-realness markers.
/// Lists are ordered and lowercase; a single hit per category counts.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalTables {
    pub explicit_choice: Vec<String>,
    pub mandatory_action: Vec<String>,
    pub rsvp: Vec<String>,
    pub interest_check: Vec<String>,
    pub feedback_request: Vec<String>,
    pub personal_question: Vec<String>,
    pub time_boxed: Vec<String>,
    pub automated_sender_markers: Vec<String>,
}

/// AI pre-check gate tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    pub action_keywords: Vec<String>,
    /// Escalate when the user has replied to this sender more than this
    /// many times.
    pub reply_count_min: u32,
    /// Escalate when an unread email is older than this.
    pub stale_unread_hours: i64,
}

impl Default for GateConfig {
    fn default() -> Self {
        EngineConfig::builtin().gate
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub weights: Weights,
    pub exclusions: ExclusionTables,
    pub signals: SignalTables,
    pub gate: GateConfig,
}

impl EngineConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: EngineConfig = toml::from_str(toml_str)?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Load from `ENGINE_CONFIG_PATH` (default `config/engine.toml`). A
    /// missing file falls back to the built-in tables; a present-but-broken
    /// file is an error so typos do not silently revert behavior.
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_ENGINE_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENGINE_CONFIG_PATH));

        let mut cfg = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| {
                anyhow::anyhow!("invalid engine config at {}: {}", path.display(), e)
            })?,
            Err(_) => Self::builtin(),
        };

        if let Some(t) = parse_threshold_env(std::env::var(ENV_SOFT_THRESHOLD).ok()) {
            cfg.thresholds.soft = t;
        }
        if let Some(t) = parse_threshold_env(std::env::var(ENV_HARD_THRESHOLD).ok()) {
            cfg.thresholds.hard = t;
        }
        if cfg.thresholds.soft > cfg.thresholds.hard {
            warn!(
                soft = cfg.thresholds.soft,
                hard = cfg.thresholds.hard,
                "soft threshold above hard threshold; swapping"
            );
            std::mem::swap(&mut cfg.thresholds.soft, &mut cfg.thresholds.hard);
        }
        Ok(cfg)
    }

    /// The compiled-in default tables.
    pub fn builtin() -> Self {
        Self::from_toml_str(DEFAULT_ENGINE_TOML).expect("built-in engine config")
    }

    /// Lowercase every phrase table so matching stays case-insensitive even
    /// when an operator-edited TOML carries mixed case.
    fn normalize(&mut self) {
        for list in [
            &mut self.exclusions.sender_prefixes,
            &mut self.exclusions.bulk_domains,
            &mut self.exclusions.newsletter_subjects,
            &mut self.exclusions.fyi_phrases,
            &mut self.signals.explicit_choice,
            &mut self.signals.mandatory_action,
            &mut self.signals.rsvp,
            &mut self.signals.interest_check,
            &mut self.signals.feedback_request,
            &mut self.signals.personal_question,
            &mut self.signals.time_boxed,
            &mut self.signals.automated_sender_markers,
            &mut self.gate.action_keywords,
        ] {
            for p in list.iter_mut() {
                *p = p.to_lowercase();
            }
            list.retain(|p| !p.is_empty());
        }
        if !self.thresholds.soft.is_finite() {
            self.thresholds.soft = Thresholds::default().soft;
        }
        if !self.thresholds.hard.is_finite() {
            self.thresholds.hard = Thresholds::default().hard;
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .map(|v| v.clamp(0.0, 1.0))
}
