// tests/ai_fallback.rs
//
// The AI fallback path must never error: well-formed JSON maps into a
// result, everything else (prose, garbage, silence, timeouts) degrades to
// the safe informational default.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use inbox_decision_engine::ai_adapter::{Completion, CompletionClient, FixedClient};
use inbox_decision_engine::fallback::{classify_via_model, SAFE_DEFAULT_REASON};
use inbox_decision_engine::{DecisionType, UrgencyLabel};

const TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::test]
async fn well_formed_reply_maps_to_result() {
    let client = FixedClient::answering(
        r#"{"decision_required": true, "decision_type": "reply_required", "reason": "Direct question from manager"}"#,
    );
    let r = classify_via_model(&client, "Quick question", "Can you join?", TIMEOUT).await;
    assert_eq!(r.decision_level, 1);
    assert_eq!(r.decision_type, DecisionType::ReplyRequired);
    assert_eq!(r.urgency, UrgencyLabel::DecideSoon);
    assert_eq!(r.reason, "Direct question from manager");
}

#[tokio::test]
async fn fenced_reply_is_tolerated() {
    let client = FixedClient::answering(
        "```json\n{\"decision_required\": true, \"decision_type\": \"deadline\", \"reason\": \"Submission due Friday\"}\n```",
    );
    let r = classify_via_model(&client, "Reminder", "Due Friday", TIMEOUT).await;
    assert_eq!(r.decision_level, 2);
    assert_eq!(r.decision_type, DecisionType::TimeSensitive);
}

#[tokio::test]
async fn prose_reply_degrades_to_safe_default() {
    let client = FixedClient::answering("Sorry, I cannot classify this email for you.");
    let r = classify_via_model(&client, "Anything", "At all", TIMEOUT).await;
    assert_eq!(r.decision_level, 0);
    assert_eq!(r.decision_type, DecisionType::None);
    assert_eq!(r.reason, SAFE_DEFAULT_REASON);
}

#[tokio::test]
async fn provider_failure_degrades_to_safe_default() {
    let client = FixedClient::failing();
    let r = classify_via_model(&client, "Anything", "At all", TIMEOUT).await;
    assert_eq!(r.decision_level, 0);
    assert_eq!(r.reason, SAFE_DEFAULT_REASON);
}

/// A provider that never answers within the timeout.
struct HangingClient;

impl CompletionClient for HangingClient {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Completion>> + Send + 'a>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Some(Completion {
                text: "too late".into(),
            })
        })
    }
    fn provider_name(&self) -> &'static str {
        "hanging"
    }
}

#[tokio::test(start_paused = true)]
async fn hung_call_times_out_to_safe_default() {
    let r = classify_via_model(&HangingClient, "Anything", "At all", Duration::from_secs(5)).await;
    assert_eq!(r.decision_level, 0);
    assert_eq!(r.reason, SAFE_DEFAULT_REASON);
}

#[tokio::test]
async fn unknown_decision_type_degrades() {
    let client = FixedClient::answering(
        r#"{"decision_required": true, "decision_type": "world_domination", "reason": "nope"}"#,
    );
    let r = classify_via_model(&client, "Anything", "At all", TIMEOUT).await;
    assert_eq!(r.decision_level, 0);
    assert_eq!(r.reason, SAFE_DEFAULT_REASON);
}
