// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recorded run data types.

use crate::duration_serde;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Which program of a comparison a run belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The reference runner
    Baseline,
    /// The runner under test
    Proxy,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Baseline => "baseline",
            Side::Proxy => "proxy",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded process run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedRun {
    /// Sequence number
    pub seq: u64,

    /// Wall-clock timestamp of the record
    pub timestamp: SystemTime,

    /// Time since the log was created
    #[serde(with = "duration_serde")]
    pub since_start: Duration,

    /// What was launched
    pub invocation: RecordedInvocation,

    /// How it ended
    pub outcome: RecordedOutcome,
}

/// The launch parameters of a recorded run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedInvocation {
    pub scenario: String,
    pub side: Side,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<String>,
}

/// How a recorded run ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedOutcome {
    Exited {
        code: i32,
        stdout_len: usize,
        stderr_len: usize,
        #[serde(with = "duration_serde")]
        elapsed: Duration,
    },
    Signaled {
        signal: i32,
        stdout_len: usize,
        stderr_len: usize,
        #[serde(with = "duration_serde")]
        elapsed: Duration,
    },
    /// The platform reported neither an exit code nor a signal
    Unreported {
        stdout_len: usize,
        stderr_len: usize,
        #[serde(with = "duration_serde")]
        elapsed: Duration,
    },
    SpawnFailed {
        message: String,
    },
    CaptureFailed {
        message: String,
    },
    TimedOut {
        #[serde(with = "duration_serde")]
        after: Duration,
    },
}

impl RecordedOutcome {
    /// Whether the process never produced a termination status
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RecordedOutcome::SpawnFailed { .. }
                | RecordedOutcome::CaptureFailed { .. }
                | RecordedOutcome::TimedOut { .. }
        )
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
