//! Error types for the repair pipeline
//!
//! Three tiers, matching how far a failure reaches:
//! - [`StoreError`]: one list/get/put call failed
//! - [`RepairError`]: the whole run cannot proceed
//! - [`ConfigError`]: the run could not be configured

use std::fmt;
use std::path::PathBuf;

/// Store operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Key enumeration
    List,
    /// Value fetch
    Get,
    /// Value write-back
    Put,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => write!(f, "list"),
            Operation::Get => write!(f, "get"),
            Operation::Put => write!(f, "put"),
        }
    }
}

/// Errors from a single key-value store call
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// External program could not be started
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Program as configured
        program: String,
        /// Error from the spawn or wait
        #[source]
        source: std::io::Error,
    },

    /// External program exited unsuccessfully
    #[error("{operation} exited with {status}: {stderr}")]
    CommandFailed {
        /// Call that failed
        operation: Operation,
        /// Exit status as printed by the OS
        status: String,
        /// Trimmed standard error
        stderr: String,
    },

    /// Call did not finish within the configured timeout
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// Call that overran
        operation: Operation,
        /// Limit that was hit
        timeout_ms: u64,
    },

    /// Fetched value exceeds the configured size limit
    #[error("value is {size} bytes, limit is {limit}")]
    ValueTooLarge {
        /// Bytes produced
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Fetched value is not UTF-8 text
    #[error("value is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    /// Value could not be handed to the external program
    #[error("failed to stage value for write-back: {0}")]
    Staging(#[source] std::io::Error),

    /// Key listing could not be parsed
    #[error("key listing is not valid JSON: {0}")]
    MalformedListing(#[source] serde_json::Error),

    /// Store refused the call
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create spawn error for program
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create command failure with captured stderr
    pub fn command_failed(
        operation: Operation,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            operation,
            status: status.into(),
            stderr: stderr.into(),
        }
    }
}

/// Errors that abort a repair run
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    /// Keys could not be enumerated; fatal whatever the store error
    #[error("failed to enumerate keys under prefix '{prefix}': {source}")]
    Enumeration {
        /// Prefix being listed
        prefix: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No namespace identifier was supplied
    #[error("missing namespace identifier")]
    MissingNamespace,

    /// A setting has an unusable value
    #[error("invalid setting `{field}`: {message}")]
    Invalid {
        /// Setting name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Read error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

impl ConfigError {
    /// Create invalid-setting error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
