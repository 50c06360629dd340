//! [`KvStore`] over an external KV command-line tool
//!
//! Calls take the form used by `wrangler`:
//!
//! ```text
//! <program> kv key list --namespace-id <ns> --prefix <prefix>
//! <program> kv key get <key> --namespace-id <ns>
//! <program> kv key put <key> --path <file> --namespace-id <ns>
//! ```
//!
//! Each call runs under the configured timeout; a call that overruns is
//! killed. Values fetched with `get` are kept only up to the configured size
//! limit; output past it is drained and dropped.

use async_trait::async_trait;
use kvfix_core::config::DEFAULT_MAX_VALUE_BYTES;
use kvfix_core::store::parse_listing;
use kvfix_core::{KvStore, Operation, StoreError};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Standard error kept for failure messages
const STDERR_CAPTURE_BYTES: usize = 64 * 1024;

/// Store bound to one namespace, reached through an external program
#[derive(Debug, Clone)]
pub struct CliStore {
    program: String,
    namespace_id: String,
    timeout: Duration,
    max_value_bytes: usize,
}

impl CliStore {
    /// Create store using `program` for namespace `namespace_id`
    #[must_use]
    pub fn new(program: impl Into<String>, namespace_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            namespace_id: namespace_id.into(),
            timeout,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }

    /// With limit on fetched value size
    #[must_use]
    pub fn with_max_value_bytes(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = max_value_bytes;
        self
    }

    fn list_args(&self, prefix: &str) -> Vec<String> {
        vec![
            "kv".to_string(),
            "key".to_string(),
            "list".to_string(),
            "--namespace-id".to_string(),
            self.namespace_id.clone(),
            "--prefix".to_string(),
            prefix.to_string(),
        ]
    }

    fn get_args(&self, key: &str) -> Vec<String> {
        vec![
            "kv".to_string(),
            "key".to_string(),
            "get".to_string(),
            key.to_string(),
            "--namespace-id".to_string(),
            self.namespace_id.clone(),
        ]
    }

    fn put_args(&self, key: &str, value_path: &Path) -> Vec<OsString> {
        vec![
            "kv".into(),
            "key".into(),
            "put".into(),
            key.into(),
            "--path".into(),
            value_path.as_os_str().to_os_string(),
            "--namespace-id".into(),
            self.namespace_id.clone().into(),
        ]
    }

    /// Run the program and return at most `stdout_limit` bytes of stdout
    async fn invoke<A: AsRef<OsStr> + Sync>(
        &self,
        operation: Operation,
        args: &[A],
        stdout_limit: usize,
    ) -> Result<Vec<u8>, StoreError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StoreError::spawn(&self.program, e))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(StoreError::spawn(
                &self.program,
                io::Error::other("output pipes not captured"),
            ));
        };
        let capture = async {
            tokio::try_join!(
                read_capped(stdout, stdout_limit),
                read_capped(stderr, STDERR_CAPTURE_BYTES),
                child.wait(),
            )
        };

        let ((stdout, stdout_len), (stderr, _), status) =
            match tokio::time::timeout(self.timeout, capture).await {
                Ok(result) => result.map_err(|e| StoreError::spawn(&self.program, e))?,
                Err(_) => {
                    return Err(StoreError::Timeout {
                        operation,
                        timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    })
                }
            };

        if !status.success() {
            return Err(StoreError::command_failed(
                operation,
                status.to_string(),
                String::from_utf8_lossy(&stderr).trim(),
            ));
        }
        if stdout_len > stdout_limit {
            return Err(StoreError::ValueTooLarge {
                size: stdout_len,
                limit: stdout_limit,
            });
        }
        Ok(stdout)
    }
}

/// Read `reader` to the end, keeping the bytes only while within `limit`
///
/// Returns the kept bytes and the total length read.
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> io::Result<(Vec<u8>, usize)> {
    let mut kept = Vec::new();
    let mut total = 0usize;
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok((kept, total));
        }
        total = total.saturating_add(n);
        if total <= limit {
            kept.extend_from_slice(&chunk[..n]);
        } else if !kept.is_empty() {
            kept = Vec::new();
        }
    }
}

#[async_trait]
impl KvStore for CliStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let stdout = self
            .invoke(Operation::List, &self.list_args(prefix), usize::MAX)
            .await?;
        parse_listing(&stdout)
    }

    async fn get(&self, key: &str) -> Result<String, StoreError> {
        let stdout = self
            .invoke(Operation::Get, &self.get_args(key), self.max_value_bytes)
            .await?;
        Ok(String::from_utf8(stdout)?)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // a single argv entry is capped at 128 KiB on Linux
        let staged = tempfile::Builder::new()
            .prefix("kvfix-")
            .suffix(".json")
            .tempfile()
            .map_err(StoreError::Staging)?;
        tokio::fs::write(staged.path(), value)
            .await
            .map_err(StoreError::Staging)?;

        self.invoke(Operation::Put, &self.put_args(key, staged.path()), usize::MAX)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_shapes() {
        let store = CliStore::new("wrangler", "ns-1", Duration::from_secs(1));
        assert_eq!(
            store.list_args("config:").join(" "),
            "kv key list --namespace-id ns-1 --prefix config:"
        );
        assert_eq!(
            store.get_args("config:a").join(" "),
            "kv key get config:a --namespace-id ns-1"
        );
        let put: Vec<OsString> = [
            "kv",
            "key",
            "put",
            "config:a",
            "--path",
            "/tmp/v.json",
            "--namespace-id",
            "ns-1",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        assert_eq!(store.put_args("config:a", Path::new("/tmp/v.json")), put);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let store = CliStore::new(
            "/nonexistent/kvfix-test-program",
            "ns-1",
            Duration::from_secs(1),
        );
        let err = store.get("config:a").await.unwrap_err();
        assert!(matches!(err, StoreError::Spawn { .. }));
    }

    #[tokio::test]
    async fn capped_read_drains_past_the_limit() {
        let data = vec![b'x'; 20_000];
        let (kept, total) = read_capped(&data[..], 1024).await.unwrap();
        assert!(kept.is_empty());
        assert_eq!(total, 20_000);

        let (kept, total) = read_capped(&b"{\"a\":1}"[..], 1024).await.unwrap();
        assert_eq!(kept, b"{\"a\":1}");
        assert_eq!(total, 7);
    }

    #[cfg(unix)]
    mod against_fake_cli {
        use super::*;
        use kvfix_test_utils::FakeKvCli;

        fn store(fake: &FakeKvCli, timeout: Duration) -> CliStore {
            CliStore::new(fake.program().to_string_lossy(), "ns-1", timeout)
        }

        #[tokio::test]
        async fn list_get_put_roundtrip() {
            let fake = FakeKvCli::new();
            fake.insert("config:b", "\u{feff}{}");
            fake.insert("config:a", "{\"x\":\u{01}1}");
            let store = store(&fake, Duration::from_secs(5));

            assert_eq!(
                store.list_keys("config:").await.unwrap(),
                vec!["config:b", "config:a"]
            );
            assert_eq!(store.get("config:a").await.unwrap(), "{\"x\":\u{01}1}");
            store.put("config:a", "{\"x\":1}").await.unwrap();
            assert_eq!(fake.value("config:a").as_deref(), Some("{\"x\":1}"));
            assert_eq!(
                fake.calls(),
                vec!["list ns-1 config:", "get config:a", "put config:a"]
            );
        }

        #[tokio::test]
        async fn bom_survives_the_pipe() {
            let fake = FakeKvCli::new();
            fake.insert("config:bom", "\u{feff}{\"a\":1}");
            let value = store(&fake, Duration::from_secs(5))
                .get("config:bom")
                .await
                .unwrap();
            assert!(value.starts_with('\u{feff}'));
        }

        #[tokio::test]
        async fn put_handles_values_beyond_argv_limits() {
            let fake = FakeKvCli::new();
            fake.insert("config:big", "{}");
            let value = format!("{{\"blob\":\"{}\"}}", "x".repeat(200 * 1024));

            store(&fake, Duration::from_secs(5))
                .put("config:big", &value)
                .await
                .unwrap();
            assert_eq!(fake.value("config:big"), Some(value));
        }

        #[tokio::test]
        async fn put_keeps_option_like_values_intact() {
            let fake = FakeKvCli::new();
            fake.insert("config:neg", "\u{feff}-5");

            store(&fake, Duration::from_secs(5))
                .put("config:neg", "-5")
                .await
                .unwrap();
            assert_eq!(fake.value("config:neg").as_deref(), Some("-5"));
        }

        #[tokio::test]
        async fn oversize_get_is_rejected_with_full_length() {
            let fake = FakeKvCli::new();
            fake.insert("config:big", &"x".repeat(10_000));

            let err = store(&fake, Duration::from_secs(5))
                .with_max_value_bytes(1024)
                .get("config:big")
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                StoreError::ValueTooLarge {
                    size: 10_000,
                    limit: 1024
                }
            ));
        }

        #[tokio::test]
        async fn non_zero_exit_carries_stderr() {
            let fake = FakeKvCli::new();
            fake.insert("config:a", "{}");
            fake.fail_put("config:a");

            let err = store(&fake, Duration::from_secs(5))
                .put("config:a", "{}")
                .await
                .unwrap_err();
            match err {
                StoreError::CommandFailed {
                    operation, stderr, ..
                } => {
                    assert_eq!(operation, Operation::Put);
                    assert_eq!(stderr, "write refused for config:a");
                }
                other => panic!("expected command failure, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn failed_listing_carries_stderr() {
            let fake = FakeKvCli::new();
            fake.fail_listing("Authentication error [code: 10000]");

            let err = store(&fake, Duration::from_secs(5))
                .list_keys("config:")
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                StoreError::CommandFailed {
                    operation: Operation::List,
                    ref stderr,
                    ..
                } if stderr == "Authentication error [code: 10000]"
            ));
        }

        #[tokio::test]
        async fn slow_call_times_out() {
            let fake = FakeKvCli::new();
            fake.insert("config:slow", "{}");
            fake.hang_get("config:slow");

            let err = store(&fake, Duration::from_millis(200))
                .get("config:slow")
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                StoreError::Timeout {
                    operation: Operation::Get,
                    timeout_ms: 200
                }
            ));
        }

        #[tokio::test]
        async fn garbage_listing_is_malformed() {
            let fake = FakeKvCli::new();
            fake.break_listing("✘ [ERROR] Not logged in.");

            let err = store(&fake, Duration::from_secs(5))
                .list_keys("config:")
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::MalformedListing(_)));
        }
    }
}
