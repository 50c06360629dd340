//! Command-line arguments and settings resolution

use crate::config_file::FileConfig;
use clap::Parser;
use kvfix_core::config::{DEFAULT_MAX_VALUE_BYTES, DEFAULT_PREFIX, DEFAULT_TIMEOUT_MS};
use kvfix_core::{ConfigError, RepairConfig};
use std::path::PathBuf;

/// External KV CLI used when none is configured
pub const DEFAULT_KV_CLI: &str = "wrangler";

/// Repair BOM and control-character damage in JSON values of a KV namespace
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "kvfix", version)]
pub struct Cli {
    /// Namespace identifier (required here or in the config file)
    pub namespace_id: Option<String>,

    /// Key prefix to scan [default: config:]
    pub prefix: Option<String>,

    /// Classify and report without writing anything back
    #[arg(long)]
    pub dry_run: bool,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// External KV command-line tool [default: wrangler]
    #[arg(long, value_name = "PROGRAM")]
    pub kv_cli: Option<String>,

    /// Timeout for each KV call [default: 30000]
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Skip values larger than this; output past the limit is discarded
    /// while reading [default: 26214400]
    #[arg(long, value_name = "BYTES")]
    pub max_value_bytes: Option<usize>,

    /// Print the run report as JSON instead of the text summary
    #[arg(long)]
    pub json: bool,
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Settings handed to the repair job
    pub repair: RepairConfig,
    /// External KV program
    pub kv_cli: String,
    /// Emit the report as JSON
    pub json: bool,
}

impl Cli {
    /// Merge arguments over `file`, then defaults
    ///
    /// # Errors
    /// [`ConfigError::MissingNamespace`] if neither source names a namespace,
    /// [`ConfigError::Invalid`] for unusable limits.
    pub fn resolve(&self, file: FileConfig) -> Result<Settings, ConfigError> {
        let namespace_id = self
            .namespace_id
            .clone()
            .or(file.namespace_id)
            .filter(|ns| !ns.trim().is_empty())
            .ok_or(ConfigError::MissingNamespace)?;

        let repair = RepairConfig::new(namespace_id)
            .with_prefix(
                self.prefix
                    .clone()
                    .or(file.prefix)
                    .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            )
            .with_dry_run(self.dry_run || file.dry_run.unwrap_or(false))
            .with_timeout_ms(self.timeout_ms.or(file.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS))
            .with_max_value_bytes(
                self.max_value_bytes
                    .or(file.max_value_bytes)
                    .unwrap_or(DEFAULT_MAX_VALUE_BYTES),
            );
        repair.validate()?;

        Ok(Settings {
            repair,
            kv_cli: self
                .kv_cli
                .clone()
                .or(file.kv_cli)
                .unwrap_or_else(|| DEFAULT_KV_CLI.to_string()),
            json: self.json,
        })
    }
}
