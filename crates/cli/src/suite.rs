// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential execution of a scenario catalog.

use crate::catalog::{Catalog, Check, Scenario};
use crate::compare::{Aspect, Comparator, Comparison};
use crate::error::HarnessError;
use crate::expect;
use crate::process::{millis_u64, CapturedResult};
use parity_capture::Side;
use std::time::{Duration, Instant};

/// What a passing scenario observed
#[derive(Debug)]
pub enum Evidence {
    /// Both sides agreed (possibly with advisory divergences)
    Parity(Comparison),
    /// The proxy met its literal expectations
    Proxy(CapturedResult),
}

#[derive(Debug)]
pub enum ScenarioOutcome {
    Passed(Evidence),
    Failed(HarnessError),
}

/// Result of one scenario
#[derive(Debug)]
pub struct ScenarioReport {
    pub name: String,
    pub args: Vec<String>,
    pub outcome: ScenarioOutcome,
    pub elapsed: Duration,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, ScenarioOutcome::Passed(_))
    }

    /// Non-blocking divergences recorded on a passing parity scenario
    pub fn advisories(&self) -> Vec<Aspect> {
        match &self.outcome {
            ScenarioOutcome::Passed(Evidence::Parity(comparison)) => {
                comparison.advisories().map(|d| d.aspect).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Results of a whole suite, in catalog order
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub scenarios: Vec<ScenarioReport>,
    /// Scenarios not run because an earlier one failed under fail-fast
    pub skipped: usize,
    pub elapsed: Duration,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    /// Passing scenarios that carry at least one advisory divergence
    pub fn advisories(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| !s.advisories().is_empty())
            .count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0 && self.skipped == 0
    }
}

/// Runs catalog scenarios one after another
#[derive(Clone, Debug)]
pub struct Suite {
    comparator: Comparator,
    filter: Option<String>,
    fail_fast: bool,
}

impl Suite {
    pub fn new(comparator: Comparator) -> Self {
        Self {
            comparator,
            filter: None,
            fail_fast: false,
        }
    }

    /// Only run scenarios whose name contains `filter`
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.is_empty());
        self
    }

    /// Stop after the first failing scenario
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// Scenarios this suite would run from `catalog`
    pub fn selected<'a>(&'a self, catalog: &'a Catalog) -> Vec<&'a Scenario> {
        match &self.filter {
            Some(pattern) => catalog.matching(pattern).collect(),
            None => catalog.scenarios().iter().collect(),
        }
    }

    /// Run every selected scenario. A failure never stops the remaining
    /// scenarios unless fail-fast is set.
    pub async fn run(&self, catalog: &Catalog) -> SuiteReport {
        let start = Instant::now();
        let selected = self.selected(catalog);
        let mut report = SuiteReport::default();

        for (index, scenario) in selected.iter().enumerate() {
            let scenario_report = self.run_scenario(scenario).await;
            let failed = !scenario_report.passed();
            report.scenarios.push(scenario_report);

            if failed && self.fail_fast {
                report.skipped = selected.len() - index - 1;
                tracing::info!(event = "fail_fast", skipped = report.skipped);
                break;
            }
        }

        report.elapsed = start.elapsed();
        tracing::info!(
            event = "suite_finished",
            passed = report.passed(),
            failed = report.failed(),
            advisories = report.advisories(),
            skipped = report.skipped,
            elapsed_ms = millis_u64(report.elapsed),
        );
        report
    }

    /// Run one scenario according to its check.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        tracing::debug!(event = "scenario_start", scenario = scenario.name());
        let start = Instant::now();

        let outcome = match scenario.check() {
            Check::Parity => self
                .comparator
                .check(scenario)
                .await
                .map(Evidence::Parity),
            Check::Expect(expectation) => {
                let invocation = self.comparator.invocation(Side::Proxy, scenario);
                expect::verify(self.comparator.runner(), scenario, expectation, &invocation)
                    .await
                    .map(Evidence::Proxy)
            }
        };
        let outcome = match outcome {
            Ok(evidence) => ScenarioOutcome::Passed(evidence),
            Err(err) => {
                tracing::info!(
                    event = "scenario_failed",
                    scenario = scenario.name(),
                    kind = err.kind()
                );
                ScenarioOutcome::Failed(err)
            }
        };

        ScenarioReport {
            name: scenario.name().to_string(),
            args: scenario.args().to_vec(),
            outcome,
            elapsed: start.elapsed(),
        }
    }
}

#[cfg(test)]
#[path = "suite_tests.rs"]
mod tests;
