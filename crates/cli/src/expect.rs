// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Proxy-only checks against literal expectations.
//!
//! Extension points only exist in the proxy, so there is nothing to compare
//! against. Instead the fixtures force a literal side effect: a specific exit
//! code, or text in `--help`, that can only appear if the extension ran.

use crate::catalog::{Expectation, Scenario};
use crate::error::HarnessError;
use crate::process::{CapturedResult, Invocation, ProcessRunner, Termination};
use parity_capture::Side;
use serde::Serialize;
use std::fmt;

/// One expectation the proxy did not meet
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Unmet {
    ExitCode {
        expected: i32,
        actual: Termination,
    },
    MissingText {
        needle: String,
    },
}

impl fmt::Display for Unmet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unmet::ExitCode { expected, actual } => {
                write!(f, "expected exit code {}, got {}", expected, actual)
            }
            Unmet::MissingText { needle } => write!(f, "stdout does not contain {:?}", needle),
        }
    }
}

/// A proxy-only scenario that missed its expectations, with the raw run
#[derive(Clone, Debug, Serialize)]
pub struct ExpectationReport {
    pub scenario: String,
    pub args: Vec<String>,
    pub result: CapturedResult,
    pub unmet: Vec<Unmet>,
}

impl fmt::Display for ExpectationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unmet: Vec<String> = self.unmet.iter().map(ToString::to_string).collect();
        write!(f, "proxy {}", unmet.join("; "))
    }
}

/// Check a finished proxy run against `expectation`.
///
/// The exit code must match exactly; text is searched in the raw stdout.
pub fn evaluate(
    scenario: &Scenario,
    expectation: &Expectation,
    result: CapturedResult,
) -> Result<CapturedResult, HarnessError> {
    let mut unmet = Vec::new();

    if let Some(expected) = expectation.exit_code {
        if result.termination != Termination::Exited(expected) {
            unmet.push(Unmet::ExitCode {
                expected,
                actual: result.termination,
            });
        }
    }
    for needle in &expectation.stdout_contains {
        if !result.stdout.raw_contains(needle) {
            unmet.push(Unmet::MissingText {
                needle: needle.clone(),
            });
        }
    }

    if unmet.is_empty() {
        return Ok(result);
    }
    Err(HarnessError::Expectation(Box::new(ExpectationReport {
        scenario: scenario.name().to_string(),
        args: scenario.args().to_vec(),
        result,
        unmet,
    })))
}

/// Run `invocation` (the proxy) and check it against `expectation`.
pub async fn verify(
    runner: &ProcessRunner,
    scenario: &Scenario,
    expectation: &Expectation,
    invocation: &Invocation,
) -> Result<CapturedResult, HarnessError> {
    let result = runner
        .run_for(scenario.name(), Side::Proxy, invocation)
        .await
        .map_err(|source| HarnessError::Run {
            side: Side::Proxy,
            source,
        })?;
    let checked = evaluate(scenario, expectation, result);
    if let Err(HarnessError::Expectation(ref report)) = checked {
        tracing::info!(event = "expectation_unmet", scenario = scenario.name(), unmet = %report);
    }
    checked
}

#[cfg(test)]
#[path = "expect_tests.rs"]
mod tests;
