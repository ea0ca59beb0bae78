//! Output types: classification results, signal matches, deadline info.
//!
//! `ClassificationResult` is the one shape the engine hands to downstream
//! collaborators (decision-record store, API layer). It is constructed once
//! per classification call and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// What kind of decision the email asks for. Exactly one value is attached
/// to a non-Level-0 result; `None` is reserved for Level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    ApprovalRequired,
    ActionRequired,
    RsvpRequired,
    InterestCheck,
    FeedbackRequest,
    ReplyRequired,
    Question,
    TimeSensitive,
    None,
}

/// Coarse deadline-driven bucket shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLabel {
    DecideNow,
    DecideSoon,
    ExpiresSoon,
    Optional,
}

/// Named phrase category a signal belongs to. The declaration order here is
/// also the decision-type priority order used by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    ExplicitChoice,
    MandatoryAction,
    Rsvp,
    InterestCheck,
    FeedbackRequest,
    PersonalQuestion,
    TimeBoxed,
    RealSender,
}

/// A single fired pattern/heuristic. Immutable once created; accumulated
/// into a list per classification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalMatch {
    pub category: SignalCategory,
    /// Human-readable description, e.g. `Explicit choice requested ("approve or reject")`.
    pub description: String,
}

impl SignalMatch {
    pub fn new(category: SignalCategory, description: impl Into<String>) -> Self {
        Self {
            category,
            description: description.into(),
        }
    }
}

/// Outcome of deadline extraction. `hours_remaining` stays `None` when a
/// deadline phrase was found but could not be resolved to a concrete offset
/// ("respond by Friday" parsed loosely) — that is a valid state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlineInfo {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<f32>,
}

impl DeadlineInfo {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn resolved(raw: impl Into<String>, hours: f32) -> Self {
        Self {
            found: true,
            raw_text: Some(raw.into()),
            hours_remaining: Some(hours),
        }
    }

    pub fn unresolved(raw: impl Into<String>) -> Self {
        Self {
            found: true,
            raw_text: Some(raw.into()),
            hours_remaining: None,
        }
    }
}

/// Complete classification of one email, including explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// 0 = not a decision, 1 = soft decision, 2 = hard decision.
    pub decision_level: u8,
    pub decision_type: DecisionType,
    /// Confidence in [0.0, 1.0].
    pub confidence: f32,
    /// Short human-readable explanation (joined bullet list).
    pub reason: String,
    pub urgency: UrgencyLabel,
    /// Raw deadline text when one was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalMatch>,
}

impl ClassificationResult {
    pub fn new(level: u8, decision_type: DecisionType, confidence: f32) -> Self {
        Self {
            decision_level: level.min(2),
            decision_type,
            confidence: clamp01(confidence),
            reason: String::new(),
            urgency: UrgencyLabel::Optional,
            deadline: None,
            signals: Vec::new(),
        }
    }

    /// Level-0 terminal result (exclusions, below-threshold scores, safe
    /// defaults). Type is forced to `None` and urgency to `Optional`.
    pub fn not_a_decision(reason: impl Into<String>) -> Self {
        let mut r = Self::new(0, DecisionType::None, 0.0);
        r.reason = reason.into();
        r
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_urgency(mut self, urgency: UrgencyLabel) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<String>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_signals(mut self, signals: Vec<SignalMatch>) -> Self {
        self.signals = signals;
        self
    }

    pub fn is_decision(&self) -> bool {
        self.decision_level > 0
    }
}

pub(crate) fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_result_shape() {
        let r = ClassificationResult::new(2, DecisionType::ApprovalRequired, 0.82)
            .with_reason("Explicit choice requested; Deadline detected")
            .with_urgency(UrgencyLabel::DecideNow)
            .with_deadline(Some("by tomorrow".into()))
            .with_signals(vec![SignalMatch::new(
                SignalCategory::ExplicitChoice,
                "Explicit choice requested (\"approve or reject\")",
            )]);

        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["decision_level"], serde_json::json!(2));
        assert_eq!(v["decision_type"], serde_json::json!("approval_required"));
        assert_eq!(v["urgency"], serde_json::json!("decide_now"));
        assert_eq!(v["deadline"], serde_json::json!("by tomorrow"));

        let conf = v["confidence"].as_f64().unwrap();
        assert!((conf - 0.82).abs() < 1e-6, "confidence ~= 0.82, got {conf}");

        let sig = &v["signals"][0];
        assert_eq!(sig["category"], serde_json::json!("explicit_choice"));
    }

    #[test]
    fn level0_constructor_forces_none_and_optional() {
        let r = ClassificationResult::not_a_decision("Newsletter sender");
        assert_eq!(r.decision_level, 0);
        assert_eq!(r.decision_type, DecisionType::None);
        assert_eq!(r.urgency, UrgencyLabel::Optional);
        assert!(!r.is_decision());
    }

    #[test]
    fn confidence_is_clamped() {
        let r = ClassificationResult::new(1, DecisionType::Question, 1.7);
        assert_eq!(r.confidence, 1.0);
        let r = ClassificationResult::new(1, DecisionType::Question, -0.2);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn unresolved_deadline_is_found_without_hours() {
        let d = DeadlineInfo::unresolved("respond by Friday");
        assert!(d.found);
        assert_eq!(d.raw_text.as_deref(), Some("respond by Friday"));
        assert!(d.hours_remaining.is_none());
    }
}
