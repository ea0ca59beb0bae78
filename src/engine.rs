//! # Classification engine
//! The rule-engine path: hard exclusions → learned exclusions → signal
//! extraction + deadline extraction → scoring → explanation. Pure and
//! synchronous per email aside from one read of the exclusion store; safe
//! to run concurrently across many emails.
//!
//! `EngineHandle` wraps a `Classifier` behind an `RwLock` and can hot-reload
//! the TOML config in dev environments.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{EngineConfig, DEFAULT_ENGINE_CONFIG_PATH, ENV_ENGINE_CONFIG_PATH};
use crate::deadline::extract_deadline;
use crate::decision::ClassificationResult;
use crate::email::{Email, ExclusionStore};
use crate::exclusions::{hard_exclusion, learned_exclusion};
use crate::explain::{explain, join_reason};
use crate::scoring::score;
use crate::signals::extract_signals;

/// The rule-engine classifier. Holds only the fixed pattern tables and
/// tunables; all per-call state travels through arguments.
#[derive(Debug, Clone)]
pub struct Classifier {
    cfg: EngineConfig,
}

impl Classifier {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    /// Built-in tables, no file I/O.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::builtin())
    }

    /// Load tables from `config/engine.toml` (env-overridable).
    pub fn from_config() -> anyhow::Result<Self> {
        Ok(Self::new(EngineConfig::from_toml()?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Primary entry point: the 4-stage pipeline against the wall clock.
    pub fn classify(
        &self,
        email: &Email,
        store: Option<&dyn ExclusionStore>,
    ) -> ClassificationResult {
        self.classify_at(email, store, Utc::now())
    }

    /// Same pipeline with an injected reference time. Deadline math is the
    /// only clock-dependent step, so fixing `now` makes results
    /// byte-identical across repeated calls.
    pub fn classify_at(
        &self,
        email: &Email,
        store: Option<&dyn ExclusionStore>,
        now: DateTime<Utc>,
    ) -> ClassificationResult {
        // 1) Hard exclusions terminate early.
        if let Some(reason) = hard_exclusion(email, &self.cfg.exclusions) {
            let result = ClassificationResult::not_a_decision(reason);
            dev_log_classification(email, &result, "hard_excluded");
            return result;
        }

        // 2) Learned exclusions (fail open inside).
        if let Some(store) = store {
            if let Some(reason) = learned_exclusion(email, &email.user_id, store) {
                let result = ClassificationResult::not_a_decision(reason);
                dev_log_classification(email, &result, "learned_excluded");
                return result;
            }
        }

        // 3) Signals + deadline.
        let signals = extract_signals(email, &self.cfg.signals);
        let deadline = extract_deadline(&email.subject, &email.body_text, now);

        // 4) Score, threshold, explain.
        let outcome = score(&signals, &deadline, &self.cfg.weights, &self.cfg.thresholds);
        let bullets = explain(&signals, outcome.confidence, &self.cfg.thresholds);

        let result = ClassificationResult::new(outcome.level, outcome.decision_type, outcome.confidence)
            .with_reason(join_reason(&bullets))
            .with_urgency(outcome.urgency)
            .with_deadline(deadline.raw_text.clone())
            .with_signals(signals);

        dev_log_classification(email, &result, "scored");
        result
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// Dev logging gate: DECISION_DEV_LOG=1 AND dev env (debug build or APP_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("DECISION_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short stable hash so diagnostics never carry raw email ids or content.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Minimal, anonymized dev logger. Never logs subjects or bodies.
fn dev_log_classification(email: &Email, result: &ClassificationResult, stage: &str) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(&email.id);
    info!(
        target: "decision",
        %id,
        stage,
        level = result.decision_level,
        confidence = result.confidence,
        signals = result.signals.len(),
    );
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// A threadsafe handle that can hot-reload the underlying classifier in
/// dev/local. Enable by setting ENGINE_HOT_RELOAD=1; active only if
/// cfg!(debug_assertions) OR APP_ENV is "local"/"development"/"dev".
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<RwLock<Classifier>>,
}

impl EngineHandle {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            inner: Arc::new(RwLock::new(classifier)),
        }
    }

    pub fn classify(
        &self,
        email: &Email,
        store: Option<&dyn ExclusionStore>,
    ) -> ClassificationResult {
        self.classify_at(email, store, Utc::now())
    }

    pub fn classify_at(
        &self,
        email: &Email,
        store: Option<&dyn ExclusionStore>,
        now: DateTime<Utc>,
    ) -> ClassificationResult {
        match self.inner.read() {
            Ok(engine) => engine.classify_at(email, store, now),
            // Poisoned lock: classification must still return a result.
            Err(poisoned) => poisoned.into_inner().classify_at(email, store, now),
        }
    }
}

/// Returns true if we should enable hot reload (dev/local only).
fn hot_reload_enabled() -> bool {
    let want = std::env::var("ENGINE_HOT_RELOAD")
        .ok()
        .map(|v| v == "1")
        .unwrap_or(false);
    if !want {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Start a simple polling watcher on the engine TOML to hot-reload into
/// `handle`. Polls mtime every 2s. Uses only std, no external deps.
pub fn start_hot_reload_thread(handle: EngineHandle) {
    if !hot_reload_enabled() {
        return;
    }
    let path = std::env::var(ENV_ENGINE_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENGINE_CONFIG_PATH));

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(mtime) => {
                    let changed = match last_mtime {
                        None => {
                            last_mtime = Some(mtime);
                            false
                        }
                        Some(prev) => mtime > prev,
                    };
                    if changed {
                        if let Ok(content) = fs::read_to_string(&path) {
                            if let Ok(cfg) = EngineConfig::from_toml_str(&content) {
                                if let Ok(mut guard) = handle.inner.write() {
                                    *guard = Classifier::new(cfg);
                                    info!(path = %path.display(), "engine config hot-reloaded");
                                }
                            }
                        }
                        last_mtime = Some(mtime);
                    }
                }
                Err(_) => {
                    // File missing or unreadable; keep trying.
                }
            }
            thread::sleep(poll);
        }
    });
}
