//! Batch backfill: classify a backlog of emails and upsert the results.
//!
//! Emails are processed in small sequential batches with an explicit pause
//! in between. The pause exists purely to respect the downstream AI
//! provider's rate limits when callers interleave model calls with the
//! backfill; the rule engine itself has no ordering requirement.

use std::time::Duration;

use tracing::{info, warn};

use crate::email::{DecisionSink, Email, ExclusionStore};
use crate::engine::Classifier;

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Pause between batches, not between individual emails.
    pub pause: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            pause: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub classified: usize,
    pub persisted: usize,
    pub sink_failures: usize,
}

/// Classify every email and upsert through the sink. Sink errors are
/// logged and counted but never abort the run.
pub async fn backfill(
    classifier: &Classifier,
    emails: &[Email],
    store: Option<&dyn ExclusionStore>,
    sink: &dyn DecisionSink,
    opts: BatchOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    let batch_size = opts.batch_size.max(1);

    for (i, chunk) in emails.chunks(batch_size).enumerate() {
        if i > 0 && !opts.pause.is_zero() {
            tokio::time::sleep(opts.pause).await;
        }
        for email in chunk {
            let result = classifier.classify(email, store);
            report.classified += 1;
            match sink.upsert(&email.id, &email.user_id, &result) {
                Ok(()) => report.persisted += 1,
                Err(e) => {
                    report.sink_failures += 1;
                    warn!(email_id = %email.id, error = %e, "decision upsert failed");
                }
            }
        }
    }

    info!(
        classified = report.classified,
        persisted = report.persisted,
        failures = report.sink_failures,
        "backfill finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ClassificationResult;
    use crate::email::MemoryDecisionSink;

    fn mails(n: usize) -> Vec<Email> {
        (0..n)
            .map(|i| {
                Email::new(format!("e{i}"), "u1")
                    .from("anna@corp.com")
                    .subject("Quick check")
                    .body("Can you review this?")
            })
            .collect()
    }

    #[tokio::test]
    async fn backfill_persists_every_email() {
        let classifier = Classifier::with_defaults();
        let sink = MemoryDecisionSink::new();
        let opts = BatchOptions {
            batch_size: 3,
            pause: Duration::from_millis(0),
        };
        let report = backfill(&classifier, &mails(7), None, &sink, opts).await;
        assert_eq!(report.classified, 7);
        assert_eq!(report.persisted, 7);
        assert_eq!(sink.len(), 7);
    }

    #[tokio::test]
    async fn sink_errors_are_counted_not_fatal() {
        struct FlakySink;
        impl DecisionSink for FlakySink {
            fn upsert(
                &self,
                email_id: &str,
                _user_id: &str,
                _result: &ClassificationResult,
            ) -> anyhow::Result<()> {
                if email_id == "e1" {
                    anyhow::bail!("disk full")
                }
                Ok(())
            }
        }
        let classifier = Classifier::with_defaults();
        let opts = BatchOptions {
            batch_size: 10,
            pause: Duration::from_millis(0),
        };
        let report = backfill(&classifier, &mails(3), None, &FlakySink, opts).await;
        assert_eq!(report.classified, 3);
        assert_eq!(report.persisted, 2);
        assert_eq!(report.sink_failures, 1);
    }
}
