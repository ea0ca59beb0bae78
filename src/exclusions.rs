//! Exclusion filters: the first two stages of the pipeline.
//!
//! The hard filter is pure and deterministic — fixed "never a decision"
//! tables, first match wins. The learned filter consults the per-user
//! feedback history and fails open on any store error: an exclusion
//! mechanism must never become a hard dependency that blocks classification.

use tracing::warn;

use crate::config::ExclusionTables;
use crate::email::{Email, ExclusionStore};

/// Most-recent-first learned exclusions are capped at this many entries.
pub const LEARNED_EXCLUSION_CAP: usize = 100;

/// Check the fixed "never a decision" tables. Order matters: sender
/// local-part, sender domain, subject prefix phrases, FYI phrases,
/// long-form body. Returns the one-line reason of the first hit.
pub fn hard_exclusion(email: &Email, tables: &ExclusionTables) -> Option<String> {
    let local = email.sender_local_part();
    for prefix in &tables.sender_prefixes {
        if local.starts_with(prefix.as_str()) {
            return Some(format!("Automated sender (\"{local}\")"));
        }
    }

    let domain = email.sender_domain();
    if !domain.is_empty() {
        for bulk in &tables.bulk_domains {
            // Label-boundary anchored: "x.com" must not match "xerox.com".
            if domain == bulk.as_str() || domain.ends_with(&format!(".{bulk}")) {
                return Some(format!("Bulk/platform domain ({domain})"));
            }
        }
    }

    let subject = email.subject.to_lowercase();
    for phrase in &tables.newsletter_subjects {
        if subject.contains(phrase.as_str()) {
            return Some(format!("Newsletter-style subject (\"{phrase}\")"));
        }
    }

    let text = email.search_text();
    for phrase in &tables.fyi_phrases {
        if contains_bounded(&text, phrase) {
            return Some(format!("Informational/FYI phrasing (\"{phrase}\")"));
        }
    }

    if email.body_text.chars().count() > tables.long_form_chars {
        return Some("Long-form body (newsletter-like)".to_string());
    }

    None
}

/// Substring containment anchored on word boundaries, so short tokens like
/// "fyi" do not match inside ordinary words ("satisfying").
fn contains_bounded(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let mut search = 0;
    while let Some(found) = text[search..].find(phrase) {
        let i = search + found;
        let j = i + phrase.len();
        let before_ok = text[..i].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[j..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        search = j;
    }
    false
}

/// Check the learned (user-feedback) exclusions for this user. Matching is
/// substring containment against the sender domain and the first-three-words
/// subject prefix. Any read failure from the store degrades to
/// "not excluded".
pub fn learned_exclusion(
    email: &Email,
    user_id: &str,
    store: &dyn ExclusionStore,
) -> Option<String> {
    let entries = match store.learned_exclusions(user_id) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(user_id, error = %e, "learned-exclusion store read failed; failing open");
            return None;
        }
    };

    let domain = email.sender_domain();
    let prefix = email.subject_prefix();

    for entry in entries.iter().take(LEARNED_EXCLUSION_CAP) {
        if let Some(d) = entry.sender_domain.as_deref() {
            let d = d.to_lowercase();
            if !d.is_empty() && !domain.is_empty() && domain.contains(&d) {
                return Some(format!("Previously marked not-a-decision (sender {d})"));
            }
        }
        if let Some(p) = entry.subject_pattern.as_deref() {
            let p = p.to_lowercase();
            if !p.is_empty() && !prefix.is_empty() && (prefix.contains(&p) || p.contains(&prefix)) {
                return Some(format!("Previously marked not-a-decision (subject \"{p}\")"));
            }
        }
    }
    None
}
