//! Operator-facing output
//!
//! Progress lines are streamed per key; the summary is printed once at the
//! end. Fixes go to stdout, problems to stderr.

use kvfix_core::{KeyOutcome, RepairObserver, RunReport};
use serde::Serialize;
use std::io::Write;

/// Progress line for an outcome, without trailing newline
#[must_use]
pub fn progress_line(key: &str, outcome: &KeyOutcome) -> String {
    match outcome {
        KeyOutcome::Fixed { written: true } => format!("[FIX] {key}"),
        KeyOutcome::Fixed { written: false } => format!("[FIX] {key} (dry-run)"),
        KeyOutcome::Invalid { reason } => format!("[INVALID] {key}: {reason}"),
        KeyOutcome::Skipped { stage, reason } => {
            format!("[WARN] {key}: {stage} failed, skipped: {reason}")
        }
    }
}

/// Observer writing progress lines to a pair of writers
pub struct ConsoleObserver<O: Write, E: Write> {
    out: O,
    err: E,
}

impl ConsoleObserver<std::io::Stdout, std::io::Stderr> {
    /// Observer on the process stdout/stderr
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleObserver<O, E> {
    /// Observer writing fixes to `out` and problems to `err`
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Recover the writers
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> RepairObserver for ConsoleObserver<O, E> {
    fn on_outcome(&mut self, key: &str, outcome: &KeyOutcome) {
        let line = progress_line(key, outcome);
        let sink: &mut dyn Write = match outcome {
            KeyOutcome::Fixed { .. } => &mut self.out,
            _ => &mut self.err,
        };
        // A closed pipe must not abort the run
        let _ = writeln!(sink, "{line}");
    }
}

#[derive(Serialize)]
struct JsonOut<'a, T: Serialize> {
    ok: bool,
    data: &'a T,
}

/// Print the final summary, as text or as a JSON report
///
/// # Errors
/// Fails if the report cannot be serialized or stdout is closed.
pub fn print_summary(report: &RunReport, json: bool) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    if json {
        writeln!(
            stdout,
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: report.is_clean(),
                data: report
            })?
        )?;
    } else {
        writeln!(stdout, "{}", report.summary())?;
    }
    Ok(())
}
