// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run log implementation.

use crate::run::{RecordedInvocation, RecordedOutcome, RecordedRun, Side};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Shared log of process runs.
///
/// Clones share the same storage, so the log can be handed to every runner
/// of a suite and inspected once the suite is done.
pub struct RunLog {
    start: Instant,
    runs: Arc<Mutex<Vec<RecordedRun>>>,
    sink: Option<Arc<Mutex<JsonlSink>>>,
}

/// Append-only JSONL mirror of the log. A failed line never drops the
/// in-memory record; it is reported and counted instead.
struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
    failures: u64,
}

impl JsonlSink {
    fn append(&mut self, run: &RecordedRun) {
        let result = serde_json::to_string(run)
            .map_err(std::io::Error::from)
            .and_then(|json| {
                writeln!(self.writer, "{}", json)?;
                self.writer.flush()
            });
        if let Err(e) = result {
            self.failures += 1;
            tracing::warn!(
                event = "run_log_write_failed",
                path = %self.path.display(),
                seq = run.seq,
                scenario = %run.invocation.scenario,
                side = %run.invocation.side,
                failures = self.failures,
                error = %e,
                "could not append run to log file"
            );
        }
    }
}

impl RunLog {
    /// Create a new in-memory run log
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            runs: Arc::new(Mutex::new(Vec::new())),
            sink: None,
        }
    }

    /// Create a run log that also appends every record to a JSONL file
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            start: Instant::now(),
            runs: Arc::new(Mutex::new(Vec::new())),
            sink: Some(Arc::new(Mutex::new(JsonlSink {
                path: path.to_path_buf(),
                writer: BufWriter::new(file),
                failures: 0,
            }))),
        })
    }

    /// Record a finished run
    pub fn record(&self, invocation: RecordedInvocation, outcome: RecordedOutcome) {
        let mut runs = self.runs.lock();
        let run = RecordedRun {
            seq: runs.len() as u64,
            timestamp: SystemTime::now(),
            since_start: self.start.elapsed(),
            invocation,
            outcome,
        };

        if let Some(ref sink) = self.sink {
            sink.lock().append(&run);
        }

        runs.push(run);
    }

    /// Get all recorded runs
    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().clone()
    }

    /// Get the last N runs
    pub fn last(&self, n: usize) -> Vec<RecordedRun> {
        let all = self.runs.lock();
        all.iter().rev().take(n).rev().cloned().collect()
    }

    /// Count runs matching a predicate
    pub fn count<F: Fn(&RecordedRun) -> bool>(&self, pred: F) -> usize {
        self.runs.lock().iter().filter(|r| pred(r)).count()
    }

    /// Runs belonging to one scenario, in launch-completion order
    pub fn find_by_scenario(&self, scenario: &str) -> Vec<RecordedRun> {
        self.runs
            .lock()
            .iter()
            .filter(|r| r.invocation.scenario == scenario)
            .cloned()
            .collect()
    }

    /// Runs of one side
    pub fn find_by_side(&self, side: Side) -> Vec<RecordedRun> {
        self.runs
            .lock()
            .iter()
            .filter(|r| r.invocation.side == side)
            .cloned()
            .collect()
    }

    /// Runs that never produced a termination status
    pub fn find_failures(&self) -> Vec<RecordedRun> {
        self.runs
            .lock()
            .iter()
            .filter(|r| r.outcome.is_failure())
            .cloned()
            .collect()
    }

    /// Path of the JSONL mirror, if one is attached
    pub fn file_path(&self) -> Option<PathBuf> {
        self.sink.as_ref().map(|s| s.lock().path.clone())
    }

    /// Number of runs that could not be appended to the JSONL mirror
    pub fn sink_failures(&self) -> u64 {
        self.sink.as_ref().map_or(0, |s| s.lock().failures)
    }

    pub fn len(&self) -> usize {
        self.runs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.lock().is_empty()
    }

    /// Clear all recorded runs
    pub fn clear(&self) {
        self.runs.lock().clear();
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RunLog {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            runs: Arc::clone(&self.runs),
            sink: self.sink.as_ref().map(Arc::clone),
        }
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog")
            .field("runs", &self.len())
            .field("file", &self.file_path())
            .field("sink_failures", &self.sink_failures())
            .finish()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
