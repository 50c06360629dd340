//! TOML config file
//!
//! Every field is optional; command-line arguments win over the file.
//!
//! ```toml
//! namespace_id = "abc123"
//! prefix = "config:"
//! dry_run = false
//! kv_cli = "wrangler"
//! timeout_ms = 30000
//! max_value_bytes = 26214400
//! ```

use kvfix_core::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Settings read from a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Namespace identifier
    pub namespace_id: Option<String>,
    /// Key prefix to scan
    pub prefix: Option<String>,
    /// Suppress write-back
    pub dry_run: Option<bool>,
    /// External KV program
    pub kv_cli: Option<String>,
    /// Timeout for each KV call, in milliseconds
    pub timeout_ms: Option<u64>,
    /// Largest value fetched and repaired
    pub max_value_bytes: Option<usize>,
}

impl FileConfig {
    /// Parse config text; `path` is only used in error messages
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse the file at `path`
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as [`FileConfig::parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::parse(&text, path)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}
