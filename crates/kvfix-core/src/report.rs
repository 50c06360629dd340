//! Run report
//!
//! Created when a run starts, updated once per key, read when it ends.

use crate::classify::InvalidReason;
use crate::config::RepairConfig;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Step at which a key was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Value could not be fetched
    Fetch,
    /// Repaired value could not be written
    WriteBack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::WriteBack => write!(f, "write-back"),
        }
    }
}

/// Result for a key that was not already valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeyOutcome {
    /// Repaired
    Fixed {
        /// False in dry-run mode
        written: bool,
    },
    /// Left broken, needs manual attention
    Invalid {
        /// Why sanitizing did not help
        reason: InvalidReason,
    },
    /// Not processed to the end; a re-run may succeed
    Skipped {
        /// Step that failed
        stage: Stage,
        /// Store error text
        reason: String,
    },
}

impl KeyOutcome {
    /// Skipped outcome from a store error
    #[must_use]
    pub fn skipped(stage: Stage, error: &StoreError) -> Self {
        Self::Skipped {
            stage,
            reason: error.to_string(),
        }
    }
}

/// Outcome recorded against a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyRecord {
    /// Key as enumerated
    pub key: String,
    /// What happened to it
    #[serde(flatten)]
    pub outcome: KeyOutcome,
}

/// Aggregate result of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Namespace that was scanned
    pub namespace_id: String,
    /// Key prefix that was scanned
    pub prefix: String,
    /// No values were written
    pub dry_run: bool,
    /// Keys returned by enumeration and processed
    pub scanned: usize,
    /// Keys repaired (or repairable, in dry-run mode)
    pub fixed: usize,
    /// Keys left broken
    pub invalid: usize,
    /// Keys whose fetch or write-back failed
    pub skipped: usize,
    /// Every key that was not already valid, in processing order
    pub entries: Vec<KeyRecord>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the last key was processed
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    /// Empty report for a run starting now
    #[must_use]
    pub fn start(config: &RepairConfig) -> Self {
        Self {
            namespace_id: config.namespace_id.clone(),
            prefix: config.prefix.clone(),
            dry_run: config.dry_run,
            scanned: 0,
            fixed: 0,
            invalid: 0,
            skipped: 0,
            entries: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Count a processed key; `None` means it was already valid
    pub fn record(&mut self, key: &str, outcome: Option<KeyOutcome>) {
        self.scanned += 1;
        let Some(outcome) = outcome else {
            return;
        };
        match outcome {
            KeyOutcome::Fixed { .. } => self.fixed += 1,
            KeyOutcome::Invalid { .. } => self.invalid += 1,
            KeyOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.entries.push(KeyRecord {
            key: key.to_string(),
            outcome,
        });
    }

    /// Mark the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Keys that were fixed (or would be, in dry-run mode)
    pub fn fixed_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|r| matches!(r.outcome, KeyOutcome::Fixed { .. }))
            .map(|r| r.key.as_str())
    }

    /// Nothing left for an operator to look at
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid == 0 && self.skipped == 0
    }

    /// Three-line operator summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Fixed: {}\nInvalid: {}\nSkipped: {}",
            self.fixed, self.invalid, self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report() -> RunReport {
        RunReport::start(&RepairConfig::new("ns"))
    }

    #[test]
    fn valid_keys_only_count_as_scanned() {
        let mut r = report();
        r.record("config:a", None);
        r.record("config:b", None);

        assert_eq!(r.scanned, 2);
        assert_eq!((r.fixed, r.invalid, r.skipped), (0, 0, 0));
        assert!(r.entries.is_empty());
        assert!(r.is_clean());
    }

    #[test]
    fn counters_follow_outcomes() {
        let mut r = report();
        r.record("config:a", Some(KeyOutcome::Fixed { written: true }));
        r.record(
            "config:b",
            Some(KeyOutcome::Invalid {
                reason: InvalidReason::SanitizeNoop {
                    parse_error: "key must be a string".to_string(),
                },
            }),
        );
        r.record(
            "config:c",
            Some(KeyOutcome::skipped(
                Stage::Fetch,
                &StoreError::Unavailable("down".to_string()),
            )),
        );

        assert_eq!((r.scanned, r.fixed, r.invalid, r.skipped), (3, 1, 1, 1));
        assert_eq!(r.fixed_keys().collect::<Vec<_>>(), vec!["config:a"]);
        assert!(!r.is_clean());
        assert_eq!(r.summary(), "Fixed: 1\nInvalid: 1\nSkipped: 1");
    }

    #[test]
    fn serializes_flat_entries() {
        let mut r = report();
        r.record(
            "config:c",
            Some(KeyOutcome::Skipped {
                stage: Stage::WriteBack,
                reason: "put timed out".to_string(),
            }),
        );
        r.finish();

        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(
            value["entries"][0],
            serde_json::json!({
                "key": "config:c",
                "status": "skipped",
                "stage": "write_back",
                "reason": "put timed out"
            })
        );
        assert!(value["finished_at"].is_string());
    }
}
