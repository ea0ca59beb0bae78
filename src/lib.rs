// src/lib.rs
// Public library surface for integration tests (and reuse by the mail app).

pub mod ai_adapter;
pub mod batch;
pub mod config;
pub mod deadline;
pub mod decision;
pub mod email;
pub mod engine;
pub mod exclusions;
pub mod explain;
pub mod fallback;
pub mod gate;
pub mod scoring;
pub mod signals;

// ---- Re-exports for stable public API ----
pub use crate::ai_adapter::{build_client_from_config, CompletionClient, DynCompletionClient};
pub use crate::config::{ai::AiConfig, EngineConfig, GateConfig, Thresholds, Weights};
pub use crate::decision::{
    ClassificationResult, DeadlineInfo, DecisionType, SignalCategory, SignalMatch, UrgencyLabel,
};
pub use crate::email::{
    DecisionSink, Email, ExclusionStore, GateMeta, LearnedExclusion, MemoryDecisionSink,
    MemoryExclusionStore,
};
pub use crate::engine::{start_hot_reload_thread, Classifier, EngineHandle};
pub use crate::fallback::{classify_via_model, ModelDecision, ModelDecisionType};
pub use crate::gate::{should_escalate, should_escalate_or_default};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR APP_ENV in {local, development, dev})
///   - DECISION_DEV_LOG=1
pub fn enable_dev_tracing() {
    let dev_flag = std::env::var("DECISION_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("APP_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("decision=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
