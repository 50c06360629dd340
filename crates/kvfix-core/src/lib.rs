//! kvfix core - JSON repair for remote key-value namespaces
//!
//! Some values in a tenant configuration namespace were written with a
//! leading byte-order mark or with raw control characters embedded in the
//! text. Strict JSON parsers reject them. This crate finds those values and
//! rewrites them in canonical compact form, leaving everything else alone.
//!
//! # Pipeline
//!
//! ```text
//! KvStore::list_keys → for each key: get → classify → (sanitize → reparse) → put
//!                                                  ↓
//!                                              RunReport
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use kvfix_core::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new().with_entry("config:hotel-a", "\u{feff}{\"a\":1}");
//! let config = RepairConfig::new("ns-1");
//!
//! let report = RepairJob::new(&store, &config).run(&mut NoopObserver).await?;
//! assert_eq!(report.fixed, 1);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod classify;
pub mod config;
pub mod error;
pub mod job;
pub mod report;
pub mod sanitize;
pub mod store;

// Re-exports for convenience
pub use classify::{classify, Classification, InvalidReason};
pub use config::RepairConfig;
pub use error::{ConfigError, Operation, RepairError, StoreError};
pub use job::{NoopObserver, RepairJob, RepairObserver};
pub use report::{KeyOutcome, KeyRecord, RunReport, Stage};
pub use sanitize::sanitize;
pub use store::{memory::MemoryStore, KvStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running a repair
    pub use crate::classify::{classify, Classification};
    pub use crate::config::RepairConfig;
    pub use crate::error::{RepairError, StoreError};
    pub use crate::job::{NoopObserver, RepairJob, RepairObserver};
    pub use crate::report::{KeyOutcome, RunReport};
    pub use crate::store::{memory::MemoryStore, KvStore};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
