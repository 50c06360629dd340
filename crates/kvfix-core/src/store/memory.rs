//! In-memory store
//!
//! Ordered map behind a mutex, with switches for every failure the job has
//! to survive. Used by tests and for rehearsing a repair on exported data.

use super::{parse_listing, KvStore};
use crate::error::StoreError;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct Inner {
    entries: IndexMap<String, String>,
    failing_gets: HashSet<String>,
    failing_puts: HashSet<String>,
    broken_listing: Option<String>,
    list_calls: usize,
    get_calls: usize,
    put_calls: usize,
}

/// Ordered in-memory [`KvStore`]
///
/// Keys are listed in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With entry
    #[must_use]
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value without counting it as a write
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.lock().entries.insert(key.into(), value.into());
    }

    /// Current value under `key`
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Make every `get` of `key` fail
    pub fn fail_get(&self, key: impl Into<String>) {
        self.inner.lock().failing_gets.insert(key.into());
    }

    /// Make every `put` of `key` fail
    pub fn fail_put(&self, key: impl Into<String>) {
        self.inner.lock().failing_puts.insert(key.into());
    }

    /// Answer listings with `raw` instead of the real keys
    pub fn break_listing(&self, raw: impl Into<String>) {
        self.inner.lock().broken_listing = Some(raw.into());
    }

    /// Number of `list_keys` calls
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.inner.lock().list_calls
    }

    /// Number of `get` calls
    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.inner.lock().get_calls
    }

    /// Number of `put` calls, failed ones included
    #[must_use]
    pub fn put_calls(&self) -> usize {
        self.inner.lock().put_calls
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        inner.list_calls += 1;
        if let Some(raw) = &inner.broken_listing {
            return parse_listing(raw.as_bytes());
        }
        Ok(inner
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get(&self, key: &str) -> Result<String, StoreError> {
        let mut inner = self.inner.lock();
        inner.get_calls += 1;
        if inner.failing_gets.contains(key) {
            return Err(StoreError::Unavailable(format!("get {key} refused")));
        }
        inner
            .entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Unavailable(format!("no value for {key}")))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.put_calls += 1;
        if inner.failing_puts.contains(key) {
            return Err(StoreError::Unavailable(format!("put {key} refused")));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
