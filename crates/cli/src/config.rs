// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Harness configuration loaded from TOML.
//!
//! ```toml
//! baseline = "node_modules/.bin/mocha"
//! proxy = "bin/marionette-mocha"
//! catalog = "test/parity.toml"
//! timeout_ms = 30000
//! stderr = "advisory"
//!
//! [env]
//! NO_COLOR = "1"
//!
//! [[normalize]]
//! name = "tmp-paths"
//! pattern = "/tmp/[A-Za-z0-9.]+"
//! replacement = "<tmp>"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
//! Bare program names (no path separator) are left for `PATH` lookup.

use crate::catalog::{Catalog, HostHelp};
use crate::compare::{Comparator, StderrPolicy};
use crate::error::ConfigError;
use crate::normalize::{NormalizationPass, Normalizer};
use crate::process::ProcessRunner;
use parity_capture::{RunLog, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// An extra normalization pass appended after the built-in ones
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PassConfig {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    /// Why this variance is not meaningful
    #[serde(default)]
    pub intent: String,
}

/// Contents of a harness config file
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default)]
    pub baseline: Option<PathBuf>,

    #[serde(default)]
    pub proxy: Option<PathBuf>,

    /// Working directory for both programs (default: current directory)
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Per-run timeout; unset means wait indefinitely
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub stderr: Option<StderrPolicy>,

    #[serde(default)]
    pub fail_fast: Option<bool>,

    /// Scenario catalog file
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// Fixture directory for the standard catalog, used when no catalog
    /// file is given
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,

    /// Host help metadata for the standard catalog
    #[serde(default)]
    pub host: Option<HostHelp>,

    /// Environment overrides passed to both programs
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default, rename = "normalize")]
    pub passes: Vec<PassConfig>,
}

impl HarnessConfig {
    /// Load a config file and resolve its relative paths.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: HarnessConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?;
        let base = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(base);
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for program in [&mut self.baseline, &mut self.proxy].into_iter().flatten() {
            if program.components().count() > 1 && program.is_relative() {
                *program = base.join(&*program);
            }
        }
        for dir in [&mut self.cwd, &mut self.catalog, &mut self.fixtures_dir]
            .into_iter()
            .flatten()
        {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    /// Built-in passes followed by the configured ones.
    pub fn normalizer(&self) -> Result<Normalizer, ConfigError> {
        self.passes
            .iter()
            .try_fold(Normalizer::standard(), |normalizer, pass| {
                let compiled = NormalizationPass::new(
                    pass.name.clone(),
                    pass.intent.clone(),
                    &pass.pattern,
                    &pass.replacement,
                )
                .map_err(|source| ConfigError::Pattern {
                    name: pass.name.clone(),
                    source,
                })?;
                Ok(normalizer.with_pass(compiled))
            })
    }
}

/// Values given on the command line; each one wins over the config file
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub baseline: Option<PathBuf>,
    pub proxy: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub strict_stderr: bool,
    pub fail_fast: bool,
    pub catalog: Option<PathBuf>,
}

/// Where scenarios come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Standard { fixtures: PathBuf, host: HostHelp },
}

impl CatalogSource {
    pub fn load(&self) -> Result<Catalog, ConfigError> {
        match self {
            CatalogSource::File(path) => Catalog::load(path),
            CatalogSource::Standard { fixtures, host } => Ok(Catalog::standard(fixtures, host)),
        }
    }
}

/// Fully resolved harness settings
#[derive(Clone, Debug)]
pub struct Settings {
    pub baseline: PathBuf,
    pub proxy: PathBuf,
    pub cwd: PathBuf,
    pub timeout: Option<Duration>,
    pub stderr_policy: StderrPolicy,
    pub fail_fast: bool,
    pub catalog: CatalogSource,
    pub env: Vec<(String, String)>,
    pub normalizer: Normalizer,
}

impl Settings {
    /// Merge command-line overrides into a config.
    ///
    /// `cwd` falls back to `default_cwd`. A missing program or catalog is an
    /// error.
    pub fn resolve(
        config: HarnessConfig,
        overrides: Overrides,
        default_cwd: &Path,
    ) -> Result<Self, ConfigError> {
        let normalizer = config.normalizer()?;

        let baseline = overrides
            .baseline
            .or(config.baseline)
            .ok_or(ConfigError::MissingProgram(Side::Baseline))?;
        let proxy = overrides
            .proxy
            .or(config.proxy)
            .ok_or(ConfigError::MissingProgram(Side::Proxy))?;

        let catalog = match (overrides.catalog.or(config.catalog), config.host) {
            (Some(path), _) => CatalogSource::File(path),
            (None, Some(host)) => CatalogSource::Standard {
                fixtures: config
                    .fixtures_dir
                    .unwrap_or_else(|| default_cwd.join("fixtures")),
                host,
            },
            (None, None) => {
                return Err(ConfigError::Catalog(
                    "no catalog file given and no [host] section for the standard catalog"
                        .to_string(),
                ))
            }
        };

        let stderr_policy = if overrides.strict_stderr {
            StderrPolicy::Strict
        } else {
            config.stderr.unwrap_or_default()
        };

        Ok(Self {
            baseline,
            proxy,
            cwd: overrides
                .cwd
                .or(config.cwd)
                .unwrap_or_else(|| default_cwd.to_path_buf()),
            timeout: overrides
                .timeout_ms
                .or(config.timeout_ms)
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            stderr_policy,
            fail_fast: overrides.fail_fast || config.fail_fast.unwrap_or(false),
            catalog,
            env: config.env.into_iter().collect(),
            normalizer,
        })
    }

    /// Comparator wired with these settings.
    pub fn comparator(&self, run_log: Option<RunLog>) -> Comparator {
        let mut runner = ProcessRunner::new()
            .with_normalizer(self.normalizer.clone())
            .with_timeout(self.timeout);
        if let Some(log) = run_log {
            runner = runner.with_run_log(log);
        }
        Comparator::new(&self.baseline, &self.proxy, &self.cwd)
            .with_runner(runner)
            .with_env(self.env.clone())
            .with_stderr_policy(self.stderr_policy)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
