//! Signal extraction: scans subject+body against the seven named phrase
//! categories and the sender-realness heuristic.
//!
//! One `SignalMatch` per category at most — a category that fires five times
//! is no stronger evidence than one that fires once. The category iteration
//! order doubles as the decision-type priority order downstream.

use crate::config::SignalTables;
use crate::decision::{SignalCategory, SignalMatch};
use crate::email::Email;

/// Human label per category, used to build readable descriptions.
fn category_label(cat: SignalCategory) -> &'static str {
    match cat {
        SignalCategory::ExplicitChoice => "Explicit choice requested",
        SignalCategory::MandatoryAction => "Mandatory action requested",
        SignalCategory::Rsvp => "RSVP/confirmation requested",
        SignalCategory::InterestCheck => "Interest check",
        SignalCategory::FeedbackRequest => "Feedback requested",
        SignalCategory::PersonalQuestion => "Direct question to you",
        SignalCategory::TimeBoxed => "Time-boxed offer",
        SignalCategory::RealSender => "Sender appears to be a real person",
    }
}

/// Run all phrase categories over the lowercased `subject + " " + body`.
/// The real-sender signal is appended only when at least one phrase
/// category already fired — a real sender alone is not evidence of a
/// decision.
pub fn extract_signals(email: &Email, tables: &SignalTables) -> Vec<SignalMatch> {
    let text = email.search_text();
    let mut out = Vec::new();

    let categories: [(SignalCategory, &[String]); 7] = [
        (SignalCategory::ExplicitChoice, &tables.explicit_choice),
        (SignalCategory::MandatoryAction, &tables.mandatory_action),
        (SignalCategory::Rsvp, &tables.rsvp),
        (SignalCategory::InterestCheck, &tables.interest_check),
        (SignalCategory::FeedbackRequest, &tables.feedback_request),
        (SignalCategory::PersonalQuestion, &tables.personal_question),
        (SignalCategory::TimeBoxed, &tables.time_boxed),
    ];

    for (cat, phrases) in categories {
        if let Some(phrase) = phrases.iter().find(|p| text.contains(p.as_str())) {
            out.push(SignalMatch::new(
                cat,
                format!("{} (\"{}\")", category_label(cat), phrase),
            ));
        }
    }

    if !out.is_empty() && sender_is_real_person(email, tables) {
        out.push(SignalMatch::new(
            SignalCategory::RealSender,
            category_label(SignalCategory::RealSender),
        ));
    }

    out
}

/// True unless the sender address carries an automated marker.
pub fn sender_is_real_person(email: &Email, tables: &SignalTables) -> bool {
    let addr = email.from_address.to_lowercase();
    !tables
        .automated_sender_markers
        .iter()
        .any(|m| addr.contains(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn tables() -> SignalTables {
        EngineConfig::builtin().signals
    }

    fn mail(from: &str, subject: &str, body: &str) -> Email {
        Email::new("e1", "u1").from(from).subject(subject).body(body)
    }

    #[test]
    fn explicit_choice_fires_once_per_category() {
        let m = mail(
            "anna@corp.com",
            "Budget sign-off",
            "Please approve or reject the draft. You can approve or reject inline.",
        );
        let sigs = extract_signals(&m, &tables());
        let choice_hits = sigs
            .iter()
            .filter(|s| s.category == SignalCategory::ExplicitChoice)
            .count();
        assert_eq!(choice_hits, 1, "no double-counting within a category");
    }

    #[test]
    fn real_sender_needs_another_signal_first() {
        let m = mail("anna@corp.com", "Photos from the trip", "Here they are.");
        let sigs = extract_signals(&m, &tables());
        assert!(
            sigs.is_empty(),
            "real sender alone must not produce a signal: {sigs:?}"
        );
    }

    #[test]
    fn real_sender_rides_along_with_other_signals() {
        let m = mail("anna@corp.com", "Quick one", "Can you send the slides?");
        let sigs = extract_signals(&m, &tables());
        assert!(sigs
            .iter()
            .any(|s| s.category == SignalCategory::PersonalQuestion));
        assert!(sigs.iter().any(|s| s.category == SignalCategory::RealSender));
    }

    #[test]
    fn automated_sender_never_counts_as_real() {
        let m = mail(
            "notifications@platform.com",
            "Action required",
            "You must complete your profile.",
        );
        let sigs = extract_signals(&m, &tables());
        assert!(sigs
            .iter()
            .any(|s| s.category == SignalCategory::MandatoryAction));
        assert!(!sigs.iter().any(|s| s.category == SignalCategory::RealSender));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let m = mail("anna@corp.com", "PLEASE CONFIRM Attendance", "");
        let sigs = extract_signals(&m, &tables());
        assert!(sigs.iter().any(|s| s.category == SignalCategory::Rsvp));
    }

    #[test]
    fn categories_fire_in_priority_order() {
        let m = mail(
            "anna@corp.com",
            "Choices",
            "Please approve or reject. Also, what do you think?",
        );
        let sigs = extract_signals(&m, &tables());
        assert_eq!(sigs[0].category, SignalCategory::ExplicitChoice);
    }
}
