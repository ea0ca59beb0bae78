//! Input records and collaborator traits.
//!
//! The engine classifies a normalized [`Email`] record and talks to two
//! external stores through narrow traits: [`ExclusionStore`] (read-only
//! feedback history) and [`DecisionSink`] (upsert of classification results).
//! Persistence itself lives outside this crate.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::ClassificationResult;

/// Normalized email record, read-only to the engine.
/// `body_text` may be empty; all matching downstream is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub from_address: String,
    #[serde(default)]
    pub from_display_name: String,
    #[serde(default)]
    pub body_text: String,
    pub received_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl Email {
    /// Minimal constructor for tests and callers that fill fields gradually.
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            subject: String::new(),
            from_address: String::new(),
            from_display_name: String::new(),
            body_text: String::new(),
            received_at: Utc::now(),
            is_read: false,
        }
    }

    pub fn subject(mut self, s: impl Into<String>) -> Self {
        self.subject = s.into();
        self
    }

    pub fn from(mut self, addr: impl Into<String>) -> Self {
        self.from_address = addr.into();
        self
    }

    pub fn body(mut self, b: impl Into<String>) -> Self {
        self.body_text = b.into();
        self
    }

    pub fn received(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = at;
        self
    }

    /// Lowercased `local_part` of the sender address ("noreply" in
    /// "noreply@vendor.com"). Empty when the address has no `@`.
    pub fn sender_local_part(&self) -> String {
        self.from_address
            .split('@')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase()
    }

    /// Lowercased domain of the sender address. Empty when absent.
    pub fn sender_domain(&self) -> String {
        self.from_address
            .split('@')
            .nth(1)
            .unwrap_or("")
            .trim()
            .to_lowercase()
    }

    /// Lowercased `subject + " " + body` — the haystack all phrase tables
    /// match against.
    pub fn search_text(&self) -> String {
        let mut out = String::with_capacity(self.subject.len() + self.body_text.len() + 1);
        out.push_str(&self.subject.to_lowercase());
        out.push(' ');
        out.push_str(&self.body_text.to_lowercase());
        out
    }

    /// First three whitespace-separated words of the subject, lowercased.
    /// This is the coarse key learned exclusions are matched on.
    pub fn subject_prefix(&self) -> String {
        self.subject
            .split_whitespace()
            .take(3)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// One "not a decision" feedback rule derived from past user corrections.
/// Either field may be absent; empty patterns never match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnedExclusion {
    #[serde(default)]
    pub sender_domain: Option<String>,
    #[serde(default)]
    pub subject_pattern: Option<String>,
}

impl LearnedExclusion {
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            sender_domain: Some(domain.into()),
            subject_pattern: None,
        }
    }

    pub fn for_subject(pattern: impl Into<String>) -> Self {
        Self {
            sender_domain: None,
            subject_pattern: Some(pattern.into()),
        }
    }
}

/// Optional per-sender metadata consulted by the AI pre-check gate.
#[derive(Debug, Clone, Copy)]
pub struct GateMeta {
    /// How many times the user has replied to this sender.
    pub reply_count: u32,
    pub is_read: bool,
    pub received_at: DateTime<Utc>,
}

/// Read-only access to the learned-exclusion history, most-recent-first.
/// Implementations may fail; the engine fails open on errors.
pub trait ExclusionStore: Send + Sync {
    fn learned_exclusions(&self, user_id: &str) -> anyhow::Result<Vec<LearnedExclusion>>;
}

/// Upsert sink for classification results, keyed by `(email_id, user_id)`.
/// Reclassifying the same key overwrites the prior record.
pub trait DecisionSink: Send + Sync {
    fn upsert(
        &self,
        email_id: &str,
        user_id: &str,
        result: &ClassificationResult,
    ) -> anyhow::Result<()>;
}

/// In-memory exclusion store. Good enough for tests and single-process
/// callers; production callers wrap their own persistence.
#[derive(Debug, Default)]
pub struct MemoryExclusionStore {
    inner: RwLock<HashMap<String, Vec<LearnedExclusion>>>,
}

impl MemoryExclusionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend (most-recent-first, matching the store contract).
    pub fn record(&self, user_id: &str, exclusion: LearnedExclusion) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard
            .entry(user_id.to_string())
            .or_default()
            .insert(0, exclusion);
    }
}

impl ExclusionStore for MemoryExclusionStore {
    fn learned_exclusions(&self, user_id: &str) -> anyhow::Result<Vec<LearnedExclusion>> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(user_id).cloned().unwrap_or_default())
    }
}

/// In-memory decision sink with upsert semantics.
#[derive(Debug, Default)]
pub struct MemoryDecisionSink {
    inner: Mutex<HashMap<(String, String), ClassificationResult>>,
}

impl MemoryDecisionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, email_id: &str, user_id: &str) -> Option<ClassificationResult> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(email_id.to_string(), user_id.to_string()))
            .cloned()
    }
}

impl DecisionSink for MemoryDecisionSink {
    fn upsert(
        &self,
        email_id: &str,
        user_id: &str,
        result: &ClassificationResult,
    ) -> anyhow::Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((email_id.to_string(), user_id.to_string()), result.clone());
        Ok(())
    }
}
