//! Run configuration

use crate::error::ConfigError;
use std::time::Duration;

/// Key prefix scanned when none is given
pub const DEFAULT_PREFIX: &str = "config:";

/// Per-call timeout for store operations
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Largest value the remote store accepts (25 MiB)
pub const DEFAULT_MAX_VALUE_BYTES: usize = 25 * 1024 * 1024;

/// Settings for one repair run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairConfig {
    /// Namespace holding the keys
    pub namespace_id: String,
    /// Only keys starting with this prefix are scanned
    pub prefix: String,
    /// Classify and report without writing back
    pub dry_run: bool,
    /// Timeout for each store call, in milliseconds
    pub timeout_ms: u64,
    /// Values larger than this are skipped unparsed
    pub max_value_bytes: usize,
}

impl RepairConfig {
    /// Create configuration for namespace with default settings
    #[inline]
    #[must_use]
    pub fn new(namespace_id: impl Into<String>) -> Self {
        Self {
            namespace_id: namespace_id.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            dry_run: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }

    /// With key prefix
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// With dry-run mode
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With per-call timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// With value size limit
    #[inline]
    #[must_use]
    pub fn with_max_value_bytes(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = max_value_bytes;
        self
    }

    /// Per-call timeout as a duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check settings before any store call is made
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingNamespace`] for a blank namespace and
    /// [`ConfigError::Invalid`] for zero limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace_id.trim().is_empty() {
            return Err(ConfigError::MissingNamespace);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("timeout_ms", "must be greater than zero"));
        }
        if self.max_value_bytes == 0 {
            return Err(ConfigError::invalid(
                "max_value_bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
