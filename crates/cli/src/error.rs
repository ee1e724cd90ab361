// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for process runs and scenario checks.

use crate::compare::Comparison;
use crate::expect::ExpectationReport;
use parity_capture::Side;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A process could not be run to completion.
///
/// None of these carry an exit code: a program that never started or never
/// finished has no termination status to compare.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} did not exit within {}ms", program.display(), after.as_millis())]
    Timeout { program: PathBuf, after: Duration },

    #[error("failed to capture {stream} of {}: {source}", program.display())]
    Capture {
        program: PathBuf,
        stream: &'static str,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    pub fn program(&self) -> &PathBuf {
        match self {
            RunError::Spawn { program, .. }
            | RunError::Timeout { program, .. }
            | RunError::Capture { program, .. } => program,
        }
    }
}

/// Why a scenario failed
#[derive(Debug, Error)]
pub enum HarnessError {
    /// One side could not be run; the scenario is aborted.
    #[error("{side} run failed: {source}")]
    Run {
        side: Side,
        #[source]
        source: RunError,
    },

    /// Baseline and proxy disagree on exit status or normalized stdout.
    #[error("{0}")]
    Divergence(Box<Comparison>),

    /// A proxy-only scenario missed its literal expectation.
    #[error("{0}")]
    Expectation(Box<ExpectationReport>),
}

impl HarnessError {
    /// Stable identifier used in machine-readable reports
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::Run {
                source: RunError::Spawn { .. },
                ..
            } => "spawn_failure",
            HarnessError::Run {
                source: RunError::Timeout { .. },
                ..
            } => "timeout",
            HarnessError::Run {
                source: RunError::Capture { .. },
                ..
            } => "capture_failure",
            HarnessError::Divergence(_) => "divergence",
            HarnessError::Expectation(_) => "expectation",
        }
    }
}

/// A harness configuration or catalog file is unusable
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid normalization pattern for '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("no {0} program configured")]
    MissingProgram(Side),

    #[error("invalid catalog: {0}")]
    Catalog(String),
}
