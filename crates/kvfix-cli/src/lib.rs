//! kvfix command-line front end
//!
//! Wires the core repair job to an external KV tool, a config file, and the
//! console.
//!
//! ## Exit codes
//! - `0`: run completed, whatever the per-key outcomes
//! - `1`: keys could not be enumerated, or the config file is unusable
//! - `2`: no namespace identifier (also used by argument parsing errors)

#![warn(unreachable_pub)]

pub mod args;
pub mod cli_store;
pub mod config_file;
pub mod console;
pub mod logging;

pub use args::{Cli, Settings};
pub use cli_store::CliStore;
pub use config_file::FileConfig;

use anyhow::Context;
use kvfix_core::{ConfigError, RepairJob, RepairObserver, RunReport};

/// Exit status for a successful run
pub const EXIT_OK: i32 = 0;
/// Exit status for fatal runtime failures
pub const EXIT_FAILURE: i32 = 1;
/// Exit status for a missing namespace identifier
pub const EXIT_USAGE: i32 = 2;

/// Resolve settings from arguments and the optional config file
///
/// # Errors
/// See [`Cli::resolve`] and [`FileConfig::load`].
pub fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    cli.resolve(file)
}

/// Run the repair described by `settings`, printing progress and summary
///
/// # Errors
/// Fails if enumeration fails or the summary cannot be written.
pub async fn run(settings: &Settings) -> anyhow::Result<RunReport> {
    let store = CliStore::new(
        settings.kv_cli.clone(),
        settings.repair.namespace_id.clone(),
        settings.repair.timeout(),
    )
    .with_max_value_bytes(settings.repair.max_value_bytes);
    // stdout carries only the report document in JSON mode
    let mut observer: Box<dyn RepairObserver> = if settings.json {
        Box::new(console::ConsoleObserver::new(
            std::io::stderr(),
            std::io::stderr(),
        ))
    } else {
        Box::new(console::ConsoleObserver::stdio())
    };

    let report = RepairJob::new(&store, &settings.repair)
        .run(observer.as_mut())
        .await
        .with_context(|| format!("repair of namespace {} aborted", settings.repair.namespace_id))?;

    console::print_summary(&report, settings.json)?;
    Ok(report)
}

/// Exit status for an error returned by [`load_settings`] or [`run`]
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::MissingNamespace) => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}
