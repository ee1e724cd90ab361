// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line interface of the `runner-parity` binary.

use crate::config::{HarnessConfig, Overrides, Settings};
use crate::error::ConfigError;
use crate::report::Format;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Compare a proxy test runner against the baseline runner it imitates
#[derive(Parser, Debug, Clone)]
#[command(name = "runner-parity", version, about)]
pub struct Cli {
    /// Harness config file (TOML)
    #[arg(long, env = crate::env::PARITY_CONFIG, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Scenario catalog file (TOML)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Baseline runner executable
    #[arg(long, env = crate::env::PARITY_BASELINE, value_name = "PATH")]
    pub baseline: Option<PathBuf>,

    /// Proxy runner executable
    #[arg(long, env = crate::env::PARITY_PROXY, value_name = "PATH")]
    pub proxy: Option<PathBuf>,

    /// Working directory for both runners
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Kill a runner that has not exited after this many milliseconds
    #[arg(long, env = crate::env::PARITY_TIMEOUT_MS, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Fail scenarios whose stderr differs
    #[arg(long)]
    pub strict_stderr: bool,

    /// Only run scenarios whose name contains this text
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,

    /// Append every run to this JSONL file
    #[arg(long, value_name = "FILE")]
    pub capture_log: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Load the config file, if any, and apply the flags on top.
    pub fn settings(&self, default_cwd: &Path) -> Result<Settings, ConfigError> {
        let config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };
        Settings::resolve(config, self.overrides(), default_cwd)
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            baseline: self.baseline.clone(),
            proxy: self.proxy.clone(),
            cwd: self.cwd.clone(),
            timeout_ms: self.timeout_ms,
            strict_stderr: self.strict_stderr,
            fail_fast: self.fail_fast,
            catalog: self.catalog.clone(),
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
