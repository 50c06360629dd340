//! Key-value store port
//!
//! The repair job only needs three calls from the remote store. Everything
//! behind them (which CLI, which credentials, which account) is the
//! implementation's business.

pub mod memory;

use crate::error::StoreError;
use async_trait::async_trait;
use serde::Deserialize;

/// Narrow list/get/put interface over one namespace
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Keys starting with `prefix`, in the order the store returns them
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Raw text stored under `key`
    async fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Replace the value stored under `key`
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Deserialize)]
struct ListedKey {
    name: String,
}

/// Parse a key listing: a JSON array of objects with a `name` field
///
/// Other fields (expiration, metadata) are ignored.
///
/// # Errors
/// Returns [`StoreError::MalformedListing`] if the text is not such an array.
pub fn parse_listing(raw: &[u8]) -> Result<Vec<String>, StoreError> {
    let listed: Vec<ListedKey> =
        serde_json::from_slice(raw).map_err(StoreError::MalformedListing)?;
    Ok(listed.into_iter().map(|k| k.name).collect())
}
