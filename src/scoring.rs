//! Scorer & level assigner: combines fired signals and deadline urgency
//! into a confidence in [0,1], maps it to a decision level via the
//! configured thresholds, and derives the decision type.
//!
//! The Level-0 override is hard: below the soft threshold, the type is
//! forced to `none` and the urgency to `optional` no matter which signals
//! fired. Raw matches never leak into the output when confidence is
//! insufficient.

use crate::config::{Thresholds, Weights};
use crate::decision::{
    clamp01, DeadlineInfo, DecisionType, SignalCategory, SignalMatch, UrgencyLabel,
};

/// Deadline closer than this forces Level-2 eligibility.
pub const URGENT_DEADLINE_HOURS: f32 = 48.0;
/// Deadline within a week forces Level-1 eligibility.
pub const SOON_DEADLINE_HOURS: f32 = 168.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOutcome {
    pub confidence: f32,
    pub level: u8,
    pub decision_type: DecisionType,
    pub urgency: UrgencyLabel,
}

fn weight_for(cat: SignalCategory, w: &Weights) -> f32 {
    match cat {
        SignalCategory::ExplicitChoice => w.explicit_choice,
        SignalCategory::MandatoryAction => w.mandatory_action,
        SignalCategory::Rsvp => w.rsvp,
        SignalCategory::InterestCheck => w.interest_check,
        SignalCategory::FeedbackRequest => w.feedback_request,
        SignalCategory::PersonalQuestion => w.personal_question,
        SignalCategory::TimeBoxed => w.time_boxed,
        SignalCategory::RealSender => w.real_sender,
    }
}

/// Decision type by priority: approval/action > rsvp > interest check >
/// feedback > question > time-sensitive. The extractor emits signals in
/// this order, so the first non-meta signal wins.
fn type_from_signals(signals: &[SignalMatch], deadline: &DeadlineInfo) -> DecisionType {
    for s in signals {
        match s.category {
            SignalCategory::ExplicitChoice => return DecisionType::ApprovalRequired,
            SignalCategory::MandatoryAction => return DecisionType::ActionRequired,
            SignalCategory::Rsvp => return DecisionType::RsvpRequired,
            SignalCategory::InterestCheck => return DecisionType::InterestCheck,
            SignalCategory::FeedbackRequest => return DecisionType::FeedbackRequest,
            SignalCategory::PersonalQuestion => return DecisionType::Question,
            SignalCategory::TimeBoxed => return DecisionType::TimeSensitive,
            SignalCategory::RealSender => {}
        }
    }
    if deadline.found {
        DecisionType::TimeSensitive
    } else {
        DecisionType::None
    }
}

/// Score one classification run. Pure: same inputs, same outcome.
pub fn score(
    signals: &[SignalMatch],
    deadline: &DeadlineInfo,
    weights: &Weights,
    thresholds: &Thresholds,
) -> ScoreOutcome {
    let mut confidence = weights.base;
    for s in signals {
        confidence += weight_for(s.category, weights);
    }

    // Deadline boost + the minimum level its urgency bucket guarantees.
    let mut min_level: u8 = 0;
    let mut deadline_urgency: Option<UrgencyLabel> = None;
    if deadline.found {
        match deadline.hours_remaining {
            Some(h) if h <= URGENT_DEADLINE_HOURS => {
                confidence += weights.deadline_urgent;
                min_level = 2;
                deadline_urgency = Some(UrgencyLabel::DecideNow);
            }
            Some(h) if h <= SOON_DEADLINE_HOURS => {
                confidence += weights.deadline_soon;
                min_level = 1;
                deadline_urgency = Some(UrgencyLabel::DecideSoon);
            }
            Some(_) => {
                // Far-future deadline: mild evidence, no level guarantee,
                // and the level-based label applies.
                confidence += weights.deadline_unresolved;
            }
            None => {
                confidence += weights.deadline_unresolved;
                min_level = 1;
                deadline_urgency = Some(UrgencyLabel::ExpiresSoon);
            }
        }
    }

    let confidence = clamp01(confidence);

    let mut level: u8 = if confidence >= thresholds.hard {
        2
    } else if confidence >= thresholds.soft {
        1
    } else {
        0
    };

    if level == 0 {
        // Hard override: a below-threshold signal is not actionable.
        return ScoreOutcome {
            confidence,
            level: 0,
            decision_type: DecisionType::None,
            urgency: UrgencyLabel::Optional,
        };
    }

    // Deadline bumps apply only once the soft threshold is cleared.
    level = level.max(min_level);

    let urgency = deadline_urgency.unwrap_or(if level == 2 {
        UrgencyLabel::DecideNow
    } else {
        UrgencyLabel::DecideSoon
    });

    ScoreOutcome {
        confidence,
        level,
        decision_type: type_from_signals(signals, deadline),
        urgency,
    }
}
