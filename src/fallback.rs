//! AI fallback classifier: constrained prompt in, small JSON decision out.
//!
//! Every failure mode — timeout, network error, missing or malformed JSON —
//! degrades to the same safe default (`informational_only` / "Could not
//! analyze email"). Nothing on this path ever reaches the caller as an
//! error, and a hung provider call can never stall the rule-engine path.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai_adapter::CompletionClient;
use crate::decision::{ClassificationResult, DecisionType, UrgencyLabel};

pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);
pub const SAFE_DEFAULT_REASON: &str = "Could not analyze email";

/// How much body text goes into the prompt.
const PROMPT_BODY_CHARS: usize = 2000;

/// The exact wire shape the model must return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDecision {
    pub decision_required: bool,
    pub decision_type: ModelDecisionType,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelDecisionType {
    ReplyRequired,
    Deadline,
    FollowUp,
    InformationalOnly,
}

impl ModelDecision {
    /// The degradation target for every failure on this path.
    pub fn safe_default() -> Self {
        Self {
            decision_required: false,
            decision_type: ModelDecisionType::InformationalOnly,
            reason: SAFE_DEFAULT_REASON.to_string(),
        }
    }
}

/// Fixed prompt template. The model gets the decision-type vocabulary and a
/// strict-JSON instruction; anything conversational in the reply is handled
/// by the tolerant parser below.
pub fn build_prompt(subject: &str, body: &str) -> String {
    let body = truncate_chars(body, PROMPT_BODY_CHARS);
    format!(
        "Decide whether this email requires a decision or response from the recipient.\n\
         Respond with strict JSON only:\n\
         {{\"decision_required\": true|false, \"decision_type\": \"reply_required|deadline|follow_up|informational_only\", \"reason\": \"max 12 words\"}}\n\
         \n\
         Subject: {subject}\n\
         Body: {body}"
    )
}

/// Parse the first JSON object found in `text`, tolerating markdown code
/// fences and surrounding prose. `None` when no parseable object exists.
pub fn extract_decision(text: &str) -> Option<ModelDecision> {
    let candidate = first_json_object(text)?;
    serde_json::from_str(candidate).ok()
}

/// Locate the first balanced `{...}` span. Good enough for model replies;
/// braces inside JSON strings are respected.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Map the coarse model decision into the engine's result shape.
pub fn to_classification(decision: &ModelDecision) -> ClassificationResult {
    if !decision.decision_required {
        return ClassificationResult::not_a_decision(decision.reason.clone());
    }
    let (level, decision_type, confidence, urgency) = match decision.decision_type {
        ModelDecisionType::Deadline => (
            2,
            DecisionType::TimeSensitive,
            0.80,
            UrgencyLabel::DecideSoon,
        ),
        ModelDecisionType::ReplyRequired => {
            (1, DecisionType::ReplyRequired, 0.65, UrgencyLabel::DecideSoon)
        }
        ModelDecisionType::FollowUp => {
            (1, DecisionType::ReplyRequired, 0.62, UrgencyLabel::DecideSoon)
        }
        // decision_required=true with informational_only is contradictory;
        // trust the type over the flag.
        ModelDecisionType::InformationalOnly => {
            return ClassificationResult::not_a_decision(decision.reason.clone())
        }
    };
    ClassificationResult::new(level, decision_type, confidence)
        .with_reason(decision.reason.clone())
        .with_urgency(urgency)
}

/// Ask the model to classify `(subject, body)`. Bounded by `timeout`
/// (30 s default); never returns an error.
pub async fn classify_via_model(
    client: &dyn CompletionClient,
    subject: &str,
    body: &str,
    timeout: Duration,
) -> ClassificationResult {
    let prompt = build_prompt(subject, body);
    let decision = match tokio::time::timeout(timeout, client.complete(&prompt)).await {
        Ok(Some(completion)) => extract_decision(&completion.text).unwrap_or_else(|| {
            debug!(provider = client.provider_name(), "model reply had no parseable JSON");
            ModelDecision::safe_default()
        }),
        Ok(None) => ModelDecision::safe_default(),
        Err(_) => {
            debug!(provider = client.provider_name(), "model call timed out");
            ModelDecision::safe_default()
        }
    };
    to_classification(&decision)
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
