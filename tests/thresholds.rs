// tests/thresholds.rs
//
// Boundary tests for the level thresholds, at and adjacent to both edges.
// Weights are crafted so a single question signal lands the confidence on
// the exact values under test.

use inbox_decision_engine::decision::{DeadlineInfo, SignalCategory, SignalMatch};
use inbox_decision_engine::scoring::score;
use inbox_decision_engine::{DecisionType, Thresholds, UrgencyLabel, Weights};

fn weights_with_question(question: f32) -> Weights {
    Weights {
        base: 0.30,
        explicit_choice: 0.35,
        mandatory_action: 0.30,
        rsvp: 0.25,
        interest_check: 0.15,
        feedback_request: 0.15,
        personal_question: question,
        time_boxed: 0.20,
        real_sender: 0.10,
        deadline_urgent: 0.25,
        deadline_soon: 0.15,
        deadline_unresolved: 0.10,
    }
}

fn question_signal() -> Vec<SignalMatch> {
    vec![SignalMatch::new(
        SignalCategory::PersonalQuestion,
        "Direct question to you (\"?\")",
    )]
}

fn run(question_weight: f32) -> (f32, u8, DecisionType, UrgencyLabel) {
    let out = score(
        &question_signal(),
        &DeadlineInfo::none(),
        &weights_with_question(question_weight),
        &Thresholds::default(),
    );
    (out.confidence, out.level, out.decision_type, out.urgency)
}

#[test]
fn just_below_soft_threshold_is_level0() {
    // 0.30 + 0.299 = 0.599
    let (conf, level, dtype, urgency) = run(0.299);
    assert!(conf < 0.60, "confidence {conf} must stay below 0.60");
    assert_eq!(level, 0);
    assert_eq!(dtype, DecisionType::None, "type must not leak below threshold");
    assert_eq!(urgency, UrgencyLabel::Optional);
}

#[test]
fn at_soft_threshold_is_level1() {
    // 0.30 + 0.30 = 0.60
    let (conf, level, dtype, _) = run(0.30);
    assert!(conf >= 0.60, "confidence {conf} must reach 0.60");
    assert_eq!(level, 1);
    assert_eq!(dtype, DecisionType::Question);
}

#[test]
fn just_below_hard_threshold_is_level1() {
    // 0.30 + 0.449 = 0.749
    let (conf, level, _, _) = run(0.449);
    assert!(conf < 0.75, "confidence {conf} must stay below 0.75");
    assert_eq!(level, 1);
}

#[test]
fn at_hard_threshold_is_level2() {
    // 0.30 + 0.45 = 0.75
    let (conf, level, dtype, _) = run(0.45);
    assert!(conf >= 0.75, "confidence {conf} must reach 0.75");
    assert_eq!(level, 2);
    assert_eq!(dtype, DecisionType::Question);
}

/// Custom thresholds (the "ultra-strict" variant) are honored end to end.
#[test]
fn custom_thresholds_shift_the_boundaries() {
    let strict = Thresholds {
        soft: 0.70,
        hard: 0.85,
    };
    let out = score(
        &question_signal(),
        &DeadlineInfo::none(),
        &weights_with_question(0.45),
        &strict,
    );
    // 0.75 clears the default hard threshold but only the strict soft one.
    assert_eq!(out.level, 1);
}
