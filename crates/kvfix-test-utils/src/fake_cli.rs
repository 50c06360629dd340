//! Fake external KV CLI
//!
//! A shell script answering `kv key list|get|put` from files under a temp
//! directory. Every call is appended to `calls.log` so tests can check which
//! store operations happened.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
root='@ROOT@'
op="$3"
case "$op" in
  list)
    echo "list $5 $7" >> "$root/calls.log"
    if [ -e "$root/hang-list" ]; then sleep 5; fi
    if [ -e "$root/fail-list" ]; then cat "$root/fail-list" >&2; exit 1; fi
    cat "$root/listing.json"
    ;;
  get)
    echo "get $4" >> "$root/calls.log"
    if [ -e "$root/hang-get/$4" ]; then sleep 5; fi
    if [ -e "$root/fail-get/$4" ]; then echo "fetch refused for $4" >&2; exit 1; fi
    cat "$root/values/$4"
    ;;
  put)
    echo "put $4" >> "$root/calls.log"
    if [ -e "$root/fail-put/$4" ]; then echo "write refused for $4" >&2; exit 1; fi
    if [ "$5" != "--path" ]; then echo "put expects --path, got: $5" >&2; exit 64; fi
    cat "$6" > "$root/values/$4"
    ;;
  *)
    echo "unsupported: $*" >&2
    exit 64
    ;;
esac
"#;

/// Fake KV CLI backed by a temp directory
pub struct FakeKvCli {
    dir: TempDir,
}

impl FakeKvCli {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create fake kv dir");
        let root = dir.path();
        for sub in ["values", "fail-get", "fail-put", "hang-get"] {
            fs::create_dir_all(root.join(sub)).expect("create fake kv subdir");
        }
        fs::write(root.join("listing.json"), "[]").expect("write empty listing");
        fs::write(root.join("calls.log"), "").expect("create call log");

        let script = root.join("fake-kv");
        let body = SCRIPT.replace("@ROOT@", root.to_str().expect("temp path utf8"));
        fs::write(&script, body).expect("write fake kv script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("make fake kv executable");

        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path to pass as the external CLI program
    pub fn program(&self) -> PathBuf {
        self.root().join("fake-kv")
    }

    /// Store `value` under `key`, appending the key to the listing
    pub fn insert(&self, key: &str, value: &str) {
        fs::write(self.root().join("values").join(key), value).expect("write value");

        let path = self.root().join("listing.json");
        let raw = fs::read_to_string(&path).expect("read listing");
        let mut listing: Vec<serde_json::Value> =
            serde_json::from_str(&raw).unwrap_or_default();
        if !listing.iter().any(|k| k["name"] == key) {
            listing.push(serde_json::json!({ "name": key }));
        }
        fs::write(&path, serde_json::to_string(&listing).expect("serialize listing"))
            .expect("write listing");
    }

    /// Store every sample entry in order
    pub fn insert_all(&self, entries: &[crate::SampleEntry]) {
        for entry in entries {
            self.insert(&entry.key, &entry.value);
        }
    }

    /// Current value under `key`
    pub fn value(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.root().join("values").join(key)).ok()
    }

    /// Answer listings with `raw`
    pub fn break_listing(&self, raw: &str) {
        fs::write(self.root().join("listing.json"), raw).expect("write listing");
    }

    /// Make listings exit non-zero with `stderr`
    pub fn fail_listing(&self, stderr: &str) {
        fs::write(self.root().join("fail-list"), stderr).expect("mark failing listing");
    }

    /// Make listings stall for several seconds
    pub fn hang_listing(&self) {
        fs::write(self.root().join("hang-list"), "").expect("mark hanging listing");
    }

    /// Make `get` of `key` exit non-zero
    pub fn fail_get(&self, key: &str) {
        fs::write(self.root().join("fail-get").join(key), "").expect("mark failing get");
    }

    /// Make `put` of `key` exit non-zero
    pub fn fail_put(&self, key: &str) {
        fs::write(self.root().join("fail-put").join(key), "").expect("mark failing put");
    }

    /// Make `get` of `key` stall for several seconds
    pub fn hang_get(&self, key: &str) {
        fs::write(self.root().join("hang-get").join(key), "").expect("mark hanging get");
    }

    /// Logged calls, one per line: `list <ns> <prefix>`, `get <key>`, `put <key>`
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("calls.log"))
            .expect("read call log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Logged calls of one operation
    pub fn calls_of(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .collect()
    }
}

impl Default for FakeKvCli {
    fn default() -> Self {
        Self::new()
    }
}
