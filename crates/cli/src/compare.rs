// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Baseline vs. proxy comparison.

use crate::catalog::Scenario;
use crate::error::HarnessError;
use crate::process::{CapturedResult, Invocation, ProcessRunner};
use parity_capture::Side;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How a stderr mismatch is treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StderrPolicy {
    /// Record the mismatch, keep the scenario passing
    #[default]
    Advisory,
    /// Fail the scenario
    Strict,
}

/// Part of the observed behavior that two runs can disagree on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    Termination,
    Stdout,
    Stderr,
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Aspect::Termination => "exit status",
            Aspect::Stdout => "stdout",
            Aspect::Stderr => "stderr",
        })
    }
}

/// One disagreement between baseline and proxy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub aspect: Aspect,
    /// Whether this divergence fails the scenario
    pub blocking: bool,
}

/// Both sides of one parity scenario and how they differ
#[derive(Clone, Debug, Serialize)]
pub struct Comparison {
    pub scenario: String,
    pub args: Vec<String>,
    pub baseline: CapturedResult,
    pub proxy: CapturedResult,
    pub divergences: Vec<Divergence>,
}

impl Comparison {
    /// Compare two captured results, most important aspect first.
    pub fn new(
        scenario: impl Into<String>,
        args: Vec<String>,
        baseline: CapturedResult,
        proxy: CapturedResult,
        stderr_policy: StderrPolicy,
    ) -> Self {
        let mut divergences = Vec::new();
        if baseline.termination != proxy.termination {
            divergences.push(Divergence {
                aspect: Aspect::Termination,
                blocking: true,
            });
        }
        if baseline.stdout.normalized() != proxy.stdout.normalized() {
            divergences.push(Divergence {
                aspect: Aspect::Stdout,
                blocking: true,
            });
        }
        if baseline.stderr.normalized() != proxy.stderr.normalized() {
            divergences.push(Divergence {
                aspect: Aspect::Stderr,
                blocking: stderr_policy == StderrPolicy::Strict,
            });
        }

        Self {
            scenario: scenario.into(),
            args,
            baseline,
            proxy,
            divergences,
        }
    }

    /// No divergence fails the scenario
    pub fn is_match(&self) -> bool {
        self.divergences.iter().all(|d| !d.blocking)
    }

    pub fn blocking(&self) -> impl Iterator<Item = &Divergence> {
        self.divergences.iter().filter(|d| d.blocking)
    }

    pub fn advisories(&self) -> impl Iterator<Item = &Divergence> {
        self.divergences.iter().filter(|d| !d.blocking)
    }

    pub fn diverges_on(&self, aspect: Aspect) -> bool {
        self.divergences.iter().any(|d| d.aspect == aspect)
    }

    /// `Err(Divergence)` if any blocking divergence was found.
    pub fn into_result(self) -> Result<Comparison, HarnessError> {
        if self.is_match() {
            Ok(self)
        } else {
            Err(HarnessError::Divergence(Box::new(self)))
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let aspects: Vec<String> = self.blocking().map(|d| d.aspect.to_string()).collect();
        write!(
            f,
            "baseline and proxy diverge on {}",
            if aspects.is_empty() {
                "nothing".to_string()
            } else {
                aspects.join(", ")
            }
        )?;
        if self.diverges_on(Aspect::Termination) {
            write!(
                f,
                " (baseline {}, proxy {})",
                self.baseline.termination, self.proxy.termination
            )?;
        }
        Ok(())
    }
}

/// Runs scenarios against a baseline and a proxy program
#[derive(Clone, Debug)]
pub struct Comparator {
    baseline: PathBuf,
    proxy: PathBuf,
    cwd: PathBuf,
    env: Vec<(String, String)>,
    runner: ProcessRunner,
    stderr_policy: StderrPolicy,
}

impl Comparator {
    pub fn new(
        baseline: impl Into<PathBuf>,
        proxy: impl Into<PathBuf>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            baseline: baseline.into(),
            proxy: proxy.into(),
            cwd: cwd.into(),
            env: Vec::new(),
            runner: ProcessRunner::new(),
            stderr_policy: StderrPolicy::default(),
        }
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Environment overrides given to both programs
    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn with_stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    pub fn baseline(&self) -> &Path {
        &self.baseline
    }

    pub fn proxy(&self) -> &Path {
        &self.proxy
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    pub fn stderr_policy(&self) -> StderrPolicy {
        self.stderr_policy
    }

    /// The invocation of `scenario` against one side
    pub fn invocation(&self, side: Side, scenario: &Scenario) -> Invocation {
        let program = match side {
            Side::Baseline => &self.baseline,
            Side::Proxy => &self.proxy,
        };
        Invocation::new(program, scenario.args().iter().cloned(), &self.cwd)
            .with_env(self.env.iter().cloned())
    }

    /// Run both sides concurrently and compare them.
    ///
    /// Both processes are in flight before either is awaited. A side that
    /// cannot be run aborts the scenario. Divergences are returned inside the
    /// `Comparison`; see [`Comparator::check`] to turn them into errors.
    pub async fn compare(&self, scenario: &Scenario) -> Result<Comparison, HarnessError> {
        let baseline = self.invocation(Side::Baseline, scenario);
        let proxy = baseline.for_program(&self.proxy);

        let (baseline_result, proxy_result) = tokio::join!(
            self.runner.run_for(scenario.name(), Side::Baseline, &baseline),
            self.runner.run_for(scenario.name(), Side::Proxy, &proxy),
        );
        let baseline_result = baseline_result.map_err(|source| HarnessError::Run {
            side: Side::Baseline,
            source,
        })?;
        let proxy_result = proxy_result.map_err(|source| HarnessError::Run {
            side: Side::Proxy,
            source,
        })?;

        let comparison = Comparison::new(
            scenario.name(),
            scenario.args().to_vec(),
            baseline_result,
            proxy_result,
            self.stderr_policy,
        );
        for divergence in &comparison.divergences {
            if divergence.blocking {
                tracing::info!(event = "divergence", scenario = scenario.name(), aspect = %divergence.aspect);
            } else {
                tracing::warn!(event = "advisory_divergence", scenario = scenario.name(), aspect = %divergence.aspect);
            }
        }
        Ok(comparison)
    }

    /// Compare and fail on any blocking divergence.
    pub async fn check(&self, scenario: &Scenario) -> Result<Comparison, HarnessError> {
        self.compare(scenario).await?.into_result()
    }
}

#[cfg(test)]
#[path = "compare_tests.rs"]
mod tests;
