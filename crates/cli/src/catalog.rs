// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario catalog: which argument vectors to run, and what to check.
//!
//! Parity scenarios run against both programs and must agree. Expectation
//! scenarios run against the proxy alone and must hit literal values; they
//! prove that proxy-only extension points (host modules, profile builders)
//! actually ran inside the target process.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Exit code the fixture host forces through `--code`
pub const HOST_EXIT_CODE: i32 = 55;

/// Exit code the fixture profile builder forces
pub const BUILDER_EXIT_CODE: i32 = 66;

/// Flag contributed by the fixture host; must show up in `--help`
pub const HOST_CODE_FLAG: &str = "--code";

const FIXTURES_TOKEN: &str = "{fixtures}";
const HOST_TITLE_TOKEN: &str = "{host.title}";
const HOST_DESCRIPTION_TOKEN: &str = "{host.description}";

/// Help metadata declared by the fixture host module
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostHelp {
    pub title: String,
    pub description: String,
}

impl HostHelp {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Literal expectations for a proxy-only scenario
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Expectation {
    /// Exact exit code the proxy must terminate with
    pub exit_code: Option<i32>,
    /// Substrings that must appear in the proxy's raw stdout
    pub stdout_contains: Vec<String>,
}

impl Expectation {
    pub fn exit_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            stdout_contains: Vec::new(),
        }
    }

    pub fn stdout_contains<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exit_code: None,
            stdout_contains: needles.into_iter().map(Into::into).collect(),
        }
    }
}

/// What a scenario verifies
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Check {
    /// Baseline and proxy must agree
    Parity,
    /// The proxy alone must meet literal expectations
    Expect(Expectation),
}

/// One named argument vector and its check
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Scenario {
    name: String,
    args: Vec<String>,
    check: Check,
}

impl Scenario {
    pub fn parity<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            check: Check::Parity,
        }
    }

    pub fn expect<I, S>(name: impl Into<String>, args: I, expectation: Expectation) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            check: Check::Expect(expectation),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn is_parity(&self) -> bool {
        matches!(self.check, Check::Parity)
    }

    /// Exit code a proxy-only scenario must produce, if it pins one
    pub fn expected_exit(&self) -> Option<i32> {
        match &self.check {
            Check::Parity => None,
            Check::Expect(expectation) => expectation.exit_code,
        }
    }
}

/// Ordered list of scenarios
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or duplicate names.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if scenario.name.trim().is_empty() {
                return Err(ConfigError::Catalog("scenario name cannot be empty".to_string()));
            }
            if !seen.insert(scenario.name.as_str()) {
                return Err(ConfigError::Catalog(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
        }
        Ok(Self { scenarios })
    }

    /// The standard suite.
    ///
    /// Parity: `test` and `pending` with the spec reporter, and
    /// `with-helper` with a `--require`d helper. Proxy-only: host help text,
    /// the host's `--code` exit code and the profile builder's exit code.
    pub fn standard(fixtures: &Path, host: &HostHelp) -> Self {
        let fixture = |name: &str| fixtures.join(name).display().to_string();

        let mut scenarios = vec![
            Scenario::parity("test", [fixture("test"), "--reporter".into(), "spec".into()]),
            Scenario::parity(
                "pending",
                [fixture("pending"), "--reporter".into(), "spec".into()],
            ),
            Scenario::parity(
                "with-helper",
                [fixture("with-helper"), "--require".into(), fixture("helper")],
            ),
        ];
        scenarios.extend(extension_scenarios(&fixture("host"), host, &fixture));

        Self { scenarios }
    }

    /// Load a catalog file.
    ///
    /// `fixtures_dir` is resolved relative to the file; `{fixtures}` in
    /// arguments expands to it, and `{host.title}` / `{host.description}` in
    /// expectations expand to the `[host]` section.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CatalogFile = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        file.into_catalog(base)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Scenarios whose name contains `pattern`
    pub fn matching<'a>(&'a self, pattern: &'a str) -> impl Iterator<Item = &'a Scenario> + 'a {
        self.scenarios
            .iter()
            .filter(move |s| s.name.contains(pattern))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

fn extension_scenarios(
    host_module: &str,
    host: &HostHelp,
    fixture: impl Fn(&str) -> String,
) -> Vec<Scenario> {
    vec![
        Scenario::expect(
            "host-help",
            ["--host", host_module, "--help"],
            Expectation::stdout_contains([
                host.title.as_str(),
                host.description.as_str(),
                HOST_CODE_FLAG,
            ]),
        ),
        Scenario::expect(
            "host-code",
            [
                "--host".to_string(),
                host_module.to_string(),
                fixture("marionettetest"),
                HOST_CODE_FLAG.to_string(),
                HOST_EXIT_CODE.to_string(),
            ],
            Expectation::exit_code(HOST_EXIT_CODE),
        ),
        Scenario::expect(
            "profile-builder",
            [
                "--profile-builder".to_string(),
                fixture("builder"),
                fixture("marionettetest"),
            ],
            Expectation::exit_code(BUILDER_EXIT_CODE),
        ),
    ]
}

/// On-disk catalog format
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    fixtures_dir: Option<PathBuf>,

    #[serde(default)]
    host: Option<HostHelp>,

    /// Prepend the standard suite (requires `[host]`)
    #[serde(default)]
    include_standard: bool,

    #[serde(default, rename = "scenario")]
    scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioEntry {
    name: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    expect_exit: Option<i32>,
    #[serde(default)]
    stdout_contains: Vec<String>,
}

impl CatalogFile {
    fn into_catalog(self, base: &Path) -> Result<Catalog, ConfigError> {
        let fixtures = match self.fixtures_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        };
        let fixtures_str = fixtures.display().to_string();

        let mut scenarios = Vec::new();
        if self.include_standard {
            let Some(ref host) = self.host else {
                return Err(ConfigError::Catalog(
                    "include_standard requires a [host] section".to_string(),
                ));
            };
            scenarios.extend(Catalog::standard(&fixtures, host).scenarios);
        }

        for entry in self.scenarios {
            let args: Vec<String> = entry
                .args
                .iter()
                .map(|arg| arg.replace(FIXTURES_TOKEN, &fixtures_str))
                .collect();

            if entry.expect_exit.is_none() && entry.stdout_contains.is_empty() {
                scenarios.push(Scenario::parity(entry.name, args));
                continue;
            }

            let stdout_contains = entry
                .stdout_contains
                .iter()
                .map(|needle| expand_host_tokens(needle, self.host.as_ref(), &entry.name))
                .collect::<Result<Vec<_>, _>>()?;
            scenarios.push(Scenario::expect(
                entry.name,
                args,
                Expectation {
                    exit_code: entry.expect_exit,
                    stdout_contains,
                },
            ));
        }

        Catalog::new(scenarios)
    }
}

fn expand_host_tokens(
    needle: &str,
    host: Option<&HostHelp>,
    scenario: &str,
) -> Result<String, ConfigError> {
    if !needle.contains(HOST_TITLE_TOKEN) && !needle.contains(HOST_DESCRIPTION_TOKEN) {
        return Ok(needle.to_string());
    }
    let Some(host) = host else {
        return Err(ConfigError::Catalog(format!(
            "scenario '{}' references host help but no [host] section is defined",
            scenario
        )));
    };
    Ok(needle
        .replace(HOST_TITLE_TOKEN, &host.title)
        .replace(HOST_DESCRIPTION_TOKEN, &host.description))
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
