// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A fake test runner used to exercise the harness end to end.
//!
//! One binary plays both roles. Invoked under a name containing `proxy` (or
//! with `MOCK_RUNNER_FLAVOR=proxy`) it behaves like the proxy; otherwise like
//! the baseline. Both flavors report the same results but differ in layout
//! and timing figures, exactly the kind of noise normalization removes.
//!
//! Fixtures are TOML files:
//!
//! ```toml
//! suite = "arithmetic"
//!
//! [[test]]
//! title = "adds"
//! duration_ms = 3
//!
//! [[test]]
//! title = "divides"
//! status = "fail"
//! message = "expected 1 to equal 2"
//! ```
//!
//! A path without an extension also matches `<path>.toml`.

use crate::error::ConfigError;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Extra milliseconds the proxy adds to every reported duration
const PROXY_OVERHEAD_MS: u64 = 13;

/// Which runner the mock imitates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    Baseline,
    Proxy,
}

impl Flavor {
    /// Pick the flavor from an explicit override or the invoked program name.
    pub fn detect(program: &str, forced: Option<&str>) -> Self {
        if let Some(forced) = forced {
            return if forced.eq_ignore_ascii_case("proxy") {
                Flavor::Proxy
            } else {
                Flavor::Baseline
            };
        }
        let name = Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains("proxy") {
            Flavor::Proxy
        } else {
            Flavor::Baseline
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pass,
    Fail,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub title: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub message: Option<String>,
}

/// A test file
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub suite: String,
    #[serde(default, rename = "test")]
    pub tests: Vec<TestCase>,
}

/// A `--require`d helper module
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Helper {
    pub banner: String,
}

/// A `--host` module; contributes a help group and the `--code` flag
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Host {
    pub title: String,
    pub description: String,
}

/// A `--profile-builder` module
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Builder {
    pub name: String,
    pub exit_code: i32,
}

/// Everything one mock invocation writes, and how it exits
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockRun {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl MockRun {
    fn error(message: impl std::fmt::Display) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("Error: {}\n", message),
            exit_code: 1,
        }
    }
}

/// Resolve a module path, trying `<path>.toml` when it has no extension.
pub fn resolve_module(path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.extension().is_none() && !candidate.exists() {
        return candidate.with_extension("toml");
    }
    candidate
}

fn load<T: serde::de::DeserializeOwned>(module: &str) -> Result<T, ConfigError> {
    let path = resolve_module(module);
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Toml { path, source })
}

fn command(flavor: Flavor, host: Option<&Host>) -> Command {
    let mut cmd = Command::new("mock-runner")
        .about("Runs TOML test fixtures")
        .disable_version_flag(true)
        .arg(
            Arg::new("files")
                .value_name("SPEC")
                .num_args(0..)
                .help("Test files to run"),
        )
        .arg(
            Arg::new("reporter")
                .long("reporter")
                .short('R')
                .value_name("NAME")
                .value_parser(["spec", "dot"])
                .default_value("spec")
                .help("Reporter to use"),
        )
        .arg(
            Arg::new("require")
                .long("require")
                .short('r')
                .value_name("MODULE")
                .action(ArgAction::Append)
                .help("Load a module before running tests"),
        );

    if flavor == Flavor::Proxy {
        cmd = cmd
            .arg(
                Arg::new("host")
                    .long("host")
                    .value_name("MODULE")
                    .help("Host module the tests run inside"),
            )
            .arg(
                Arg::new("profile-builder")
                    .long("profile-builder")
                    .value_name("MODULE")
                    .help("Module that builds the runner profile"),
            );
        if let Some(host) = host {
            cmd = cmd.next_help_heading(host.title.clone()).arg(
                Arg::new("code")
                    .long("code")
                    .value_name("N")
                    .value_parser(value_parser!(i32))
                    .help(host.description.clone()),
            );
        }
    }
    cmd
}

/// The `--host` value, found before full parsing so the host can extend
/// the command line (and its help) it is parsed with.
fn host_arg(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--host" {
            return iter.next().map(String::as_str);
        }
        if let Some(value) = arg.strip_prefix("--host=") {
            return Some(value);
        }
    }
    None
}

/// Run the mock with `args` (without the program name).
pub fn execute(flavor: Flavor, args: &[String]) -> MockRun {
    let host = match (flavor, host_arg(args)) {
        (Flavor::Proxy, Some(module)) => match load::<Host>(module) {
            Ok(host) => Some(host),
            Err(err) => return MockRun::error(err),
        },
        _ => None,
    };

    let argv = std::iter::once("mock-runner").chain(args.iter().map(String::as_str));
    let matches = match command(flavor, host.as_ref()).try_get_matches_from(argv) {
        Ok(matches) => matches,
        Err(err) if !err.use_stderr() => {
            return MockRun {
                stdout: err.to_string(),
                stderr: String::new(),
                exit_code: 0,
            }
        }
        Err(err) => {
            return MockRun {
                stdout: String::new(),
                stderr: err.to_string(),
                exit_code: 1,
            }
        }
    };

    match run_matches(flavor, &matches) {
        Ok(run) => run,
        Err(err) => MockRun::error(err),
    }
}

fn run_matches(flavor: Flavor, matches: &ArgMatches) -> Result<MockRun, ConfigError> {
    let mut out = MockRun::default();

    if let Some(module) = matches.try_get_one::<String>("profile-builder").ok().flatten() {
        let builder: Builder = load(module)?;
        out.stdout = format!("profile builder {} finished\n", builder.name);
        out.exit_code = builder.exit_code;
        return Ok(out);
    }

    for module in matches.get_many::<String>("require").into_iter().flatten() {
        let helper: Helper = load(module)?;
        match flavor {
            Flavor::Baseline => {
                let _ = writeln!(out.stdout, "  {}", helper.banner);
            }
            Flavor::Proxy => {
                let _ = writeln!(out.stdout, "{}", helper.banner);
            }
        }
    }

    let fixtures = matches
        .get_many::<String>("files")
        .into_iter()
        .flatten()
        .map(|file| load::<Fixture>(file))
        .collect::<Result<Vec<_>, _>>()?;

    let reporter = matches
        .get_one::<String>("reporter")
        .map(String::as_str)
        .unwrap_or("spec");
    let failures = Report::new(flavor, &fixtures).write(reporter, &mut out);

    out.exit_code = match matches.try_get_one::<i32>("code").ok().flatten() {
        Some(code) => *code,
        None => failures.min(255) as i32,
    };
    Ok(out)
}

struct Report<'a> {
    flavor: Flavor,
    fixtures: &'a [Fixture],
}

impl<'a> Report<'a> {
    fn new(flavor: Flavor, fixtures: &'a [Fixture]) -> Self {
        Self { flavor, fixtures }
    }

    fn duration(&self, ms: u64) -> String {
        match self.flavor {
            Flavor::Baseline => format!("{}ms", ms),
            Flavor::Proxy => format!("{} ms", ms + PROXY_OVERHEAD_MS),
        }
    }

    fn tests(&self) -> impl Iterator<Item = (&'a Fixture, &'a TestCase)> + 'a {
        let fixtures = self.fixtures;
        fixtures
            .iter()
            .flat_map(|fixture| fixture.tests.iter().map(move |test| (fixture, test)))
    }

    /// Write the report and return the number of failures.
    fn write(&self, reporter: &str, out: &mut MockRun) -> usize {
        match reporter {
            "dot" => self.write_dots(&mut out.stdout),
            _ => self.write_spec(&mut out.stdout),
        }
        self.write_summary(&mut out.stdout);
        self.write_failures(&mut out.stderr)
    }

    fn write_spec(&self, stdout: &mut String) {
        let (suite_indent, test_indent) = match self.flavor {
            Flavor::Baseline => ("\n  ", "    "),
            Flavor::Proxy => ("", "  "),
        };
        let mut failure = 0;
        for fixture in self.fixtures {
            let _ = writeln!(stdout, "{}{}", suite_indent, fixture.suite);
            for test in &fixture.tests {
                let _ = match test.status {
                    Status::Pass => writeln!(
                        stdout,
                        "{}✓ {} ({})",
                        test_indent,
                        test.title,
                        self.duration(test.duration_ms)
                    ),
                    Status::Pending => writeln!(stdout, "{}- {}", test_indent, test.title),
                    Status::Fail => {
                        failure += 1;
                        writeln!(stdout, "{}{}) {}", test_indent, failure, test.title)
                    }
                };
            }
        }
    }

    fn write_dots(&self, stdout: &mut String) {
        let dots: String = self
            .tests()
            .map(|(_, test)| match test.status {
                Status::Pass => '.',
                Status::Pending => ',',
                Status::Fail => '!',
            })
            .collect();
        match self.flavor {
            Flavor::Baseline => {
                let _ = writeln!(stdout, "\n  {}", dots);
            }
            Flavor::Proxy => {
                let _ = writeln!(stdout, "{}", dots);
            }
        }
    }

    fn write_summary(&self, stdout: &mut String) {
        let count = |status| self.tests().filter(|(_, t)| t.status == status).count();
        let passing = count(Status::Pass);
        let pending = count(Status::Pending);
        let failing = count(Status::Fail);
        let total: u64 = self.tests().map(|(_, t)| t.duration_ms).sum();

        let indent = match self.flavor {
            Flavor::Baseline => {
                stdout.push_str("\n\n");
                "  "
            }
            Flavor::Proxy => "",
        };
        let _ = writeln!(stdout, "{}{} passing ({})", indent, passing, self.duration(total));
        if pending > 0 {
            let _ = writeln!(stdout, "{}{} pending", indent, pending);
        }
        if failing > 0 {
            let _ = writeln!(stdout, "{}{} failing", indent, failing);
        }
        if self.flavor == Flavor::Baseline {
            stdout.push('\n');
        }
    }

    fn write_failures(&self, stderr: &mut String) -> usize {
        let failed: Vec<_> = self
            .tests()
            .filter(|(_, t)| t.status == Status::Fail)
            .collect();
        for (index, (fixture, test)) in failed.iter().enumerate() {
            let message = test.message.as_deref().unwrap_or("failed");
            let _ = match self.flavor {
                Flavor::Baseline => writeln!(
                    stderr,
                    "\n  {}) {}\n       {}:\n     Error: {}\n",
                    index + 1,
                    fixture.suite,
                    test.title,
                    message
                ),
                Flavor::Proxy => writeln!(
                    stderr,
                    "{}) {}\n   {}:\n   Error: {}",
                    index + 1,
                    fixture.suite,
                    test.title,
                    message
                ),
            };
        }
        failed.len()
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
