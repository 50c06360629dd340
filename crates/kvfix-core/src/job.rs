//! Sequential repair job
//!
//! Keys are processed one at a time, in enumeration order. A key is fully
//! fetched, classified and (when needed) written before the next one starts.
//! Per-key failures are recorded and the run moves on; only a failed
//! enumeration stops it, before any value is fetched.

use crate::classify::{classify, Classification};
use crate::config::RepairConfig;
use crate::error::{RepairError, StoreError};
use crate::report::{KeyOutcome, RunReport, Stage};
use crate::store::KvStore;

/// Receives each non-valid outcome as soon as it is known
pub trait RepairObserver {
    /// Called once per key that was not already valid
    fn on_outcome(&mut self, key: &str, outcome: &KeyOutcome);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RepairObserver for NoopObserver {
    fn on_outcome(&mut self, _key: &str, _outcome: &KeyOutcome) {}
}

/// One repair run over a namespace
#[derive(Debug)]
pub struct RepairJob<'a, S: KvStore + ?Sized> {
    store: &'a S,
    config: &'a RepairConfig,
}

impl<'a, S: KvStore + ?Sized> RepairJob<'a, S> {
    /// Create job over `store`
    #[inline]
    #[must_use]
    pub fn new(store: &'a S, config: &'a RepairConfig) -> Self {
        Self { store, config }
    }

    /// Process every key under the configured prefix
    ///
    /// # Errors
    /// Returns [`RepairError::Enumeration`] if the keys cannot be listed. No
    /// value has been fetched or written at that point.
    pub async fn run(&self, observer: &mut dyn RepairObserver) -> Result<RunReport, RepairError> {
        let keys = self.enumerate_keys().await?;
        tracing::info!(
            namespace = %self.config.namespace_id,
            prefix = %self.config.prefix,
            keys = keys.len(),
            dry_run = self.config.dry_run,
            "Starting repair run"
        );

        let mut report = RunReport::start(self.config);
        for key in &keys {
            let outcome = self.process_key(key).await;
            if let Some(outcome) = &outcome {
                observer.on_outcome(key, outcome);
            }
            report.record(key, outcome);
        }
        report.finish();

        tracing::info!(
            scanned = report.scanned,
            fixed = report.fixed,
            invalid = report.invalid,
            skipped = report.skipped,
            "Repair run complete"
        );
        Ok(report)
    }

    async fn enumerate_keys(&self) -> Result<Vec<String>, RepairError> {
        self.store
            .list_keys(&self.config.prefix)
            .await
            .map_err(|source| RepairError::Enumeration {
                prefix: self.config.prefix.clone(),
                source,
            })
    }

    async fn fetch_value(&self, key: &str) -> Result<String, StoreError> {
        let value = self.store.get(key).await?;
        if value.len() > self.config.max_value_bytes {
            return Err(StoreError::ValueTooLarge {
                size: value.len(),
                limit: self.config.max_value_bytes,
            });
        }
        Ok(value)
    }

    /// Outcome for one key; `None` when the value was already valid
    async fn process_key(&self, key: &str) -> Option<KeyOutcome> {
        let raw = match self.fetch_value(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(key, "Fetch failed: {}", e);
                return Some(KeyOutcome::skipped(Stage::Fetch, &e));
            }
        };

        let classification = classify(&raw);
        if let Some(canonical) = classification.canonical_text() {
            tracing::debug!(key, bytes = canonical.len(), "Value repairable");
            return Some(self.write_back(key, &canonical).await);
        }
        match classification {
            Classification::Invalid(reason) => {
                tracing::debug!(key, "Value not repairable: {}", reason);
                Some(KeyOutcome::Invalid { reason })
            }
            _ => {
                tracing::debug!(key, "Value already valid");
                None
            }
        }
    }

    async fn write_back(&self, key: &str, canonical: &str) -> KeyOutcome {
        if self.config.dry_run {
            return KeyOutcome::Fixed { written: false };
        }
        match self.store.put(key, canonical).await {
            Ok(()) => KeyOutcome::Fixed { written: true },
            Err(e) => {
                tracing::debug!(key, "Write-back failed: {}", e);
                KeyOutcome::skipped(Stage::WriteBack, &e)
            }
        }
    }
}
