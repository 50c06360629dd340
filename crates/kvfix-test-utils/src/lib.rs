//! Testing utilities for kvfix workspace
//!
//! Shared fixtures: damaged values, seeded stores, and a fake external KV
//! CLI that the real binary can be pointed at.

#![allow(missing_docs)]

use kvfix_core::MemoryStore;
use kvfix_core::sanitize::BYTE_ORDER_MARK;

#[cfg(unix)]
mod fake_cli;

#[cfg(unix)]
pub use fake_cli::FakeKvCli;

/// What a repair run should do with a sample value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    Valid,
    Fixed(String),
    Invalid,
}

/// Sample key, stored value and expected result
#[derive(Debug, Clone)]
pub struct SampleEntry {
    pub key: String,
    pub value: String,
    pub expect: Expect,
}

impl SampleEntry {
    fn new(key: &str, value: impl Into<String>, expect: Expect) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
            expect,
        }
    }
}

/// Prefix `json` with a byte-order mark
pub fn with_bom(json: &str) -> String {
    format!("{BYTE_ORDER_MARK}{json}")
}

/// Embed control characters at both ends of `json`
pub fn with_controls(json: &str) -> String {
    format!("\u{01}{json}\u{1f}\u{0b}")
}

/// Mixed namespace: two valid, two fixable, two beyond repair
pub fn sample_entries() -> Vec<SampleEntry> {
    vec![
        SampleEntry::new(
            "config:hotel-valid",
            r#"{"theme":"sea","rooms":12}"#,
            Expect::Valid,
        ),
        SampleEntry::new(
            "config:hotel-bom",
            with_bom(r#"{"a":1}"#),
            Expect::Fixed(r#"{"a":1}"#.to_string()),
        ),
        SampleEntry::new(
            "config:hotel-ctrl",
            with_controls("{ \"name\": \"Villa\u{08} Rosa\", \"beds\": [2, 3] }"),
            Expect::Fixed(r#"{"name":"Villa Rosa","beds":[2,3]}"#.to_string()),
        ),
        SampleEntry::new("config:hotel-garbage", "{not json", Expect::Invalid),
        SampleEntry::new(
            "config:hotel-truncated",
            with_bom(r#"{"a":"#),
            Expect::Invalid,
        ),
        SampleEntry::new("config:hotel-list", "[1, 2, 3]", Expect::Valid),
    ]
}

/// In-memory store holding `entries` in order
pub fn seeded_memory_store(entries: &[SampleEntry]) -> MemoryStore {
    let store = MemoryStore::new();
    for entry in entries {
        store.insert(entry.key.clone(), entry.value.clone());
    }
    store
}

/// Count of entries expected to be fixed
pub fn expected_fixed(entries: &[SampleEntry]) -> usize {
    entries
        .iter()
        .filter(|e| matches!(e.expect, Expect::Fixed(_)))
        .count()
}

/// Count of entries expected to be invalid
pub fn expected_invalid(entries: &[SampleEntry]) -> usize {
    entries
        .iter()
        .filter(|e| e.expect == Expect::Invalid)
        .count()
}
