//! Explanation assembler: short, ordered, human-readable reason bullets.

use crate::config::Thresholds;
use crate::decision::SignalMatch;

pub const NO_SIGNALS_REASON: &str = "No decision signals detected";
pub const HIGH_CONFIDENCE_NOTE: &str = "High confidence classification";

/// At most this many signal bullets appear in an explanation.
pub const MAX_BULLETS: usize = 3;

/// One bullet per distinct fired category, in fire order, capped at
/// [`MAX_BULLETS`]; a high-confidence note is appended at or above the hard
/// threshold. An empty signal list yields the single default string.
pub fn explain(signals: &[SignalMatch], confidence: f32, thresholds: &Thresholds) -> Vec<String> {
    if signals.is_empty() {
        return vec![NO_SIGNALS_REASON.to_string()];
    }

    let mut bullets: Vec<String> = Vec::with_capacity(MAX_BULLETS + 1);
    for s in signals {
        if bullets.len() == MAX_BULLETS {
            break;
        }
        bullets.push(s.description.clone());
    }
    if confidence >= thresholds.hard {
        bullets.push(HIGH_CONFIDENCE_NOTE.to_string());
    }
    bullets
}

/// Render bullets into the single `reason` string on the result.
pub fn join_reason(bullets: &[String]) -> String {
    bullets.join("; ")
}
