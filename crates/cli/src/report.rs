// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Console and JSON rendering of suite results.
//!
//! Divergences are shown as unified diffs of the raw output of both sides.
//! Normalized text only decides pass or fail; it is never what a human has
//! to debug from.

use crate::compare::{Aspect, Comparison};
use crate::error::HarnessError;
use crate::expect::ExpectationReport;
use crate::output_diagnostic::{paint, Tone};
use crate::process::{millis_u64, CapturedResult, CapturedStream};
use crate::suite::{Evidence, ScenarioOutcome, ScenarioReport, SuiteReport};
use parity_capture::Side;
use serde::Serialize;
use similar::TextDiff;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Output format of the suite report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Text,
    Json,
}

const DIFF_CONTEXT: usize = 3;

/// Render the report as one line per scenario plus diffs and a summary.
pub fn render_text(report: &SuiteReport, color: bool) -> String {
    let mut out = String::new();
    for scenario in &report.scenarios {
        render_scenario(&mut out, scenario, color);
    }

    let _ = writeln!(
        out,
        "\n{} passed, {} failed, {} with advisories{} ({}ms)",
        report.passed(),
        report.failed(),
        report.advisories(),
        if report.skipped > 0 {
            format!(", {} skipped", report.skipped)
        } else {
            String::new()
        },
        report.elapsed.as_millis()
    );
    out
}

fn render_scenario(out: &mut String, scenario: &ScenarioReport, color: bool) {
    let ms = scenario.elapsed.as_millis();
    match &scenario.outcome {
        ScenarioOutcome::Passed(Evidence::Parity(comparison)) if !scenario.advisories().is_empty() => {
            let aspects: Vec<String> = scenario.advisories().iter().map(ToString::to_string).collect();
            let _ = writeln!(
                out,
                "{} {} ({}ms): {} differs (advisory)",
                paint("WARN", Tone::Warn, color),
                scenario.name,
                ms,
                aspects.join(", ")
            );
            if comparison.diverges_on(Aspect::Stderr) {
                push_diff(out, "stderr", &comparison.baseline.stderr, &comparison.proxy.stderr);
            }
        }
        ScenarioOutcome::Passed(_) => {
            let _ = writeln!(out, "{} {} ({}ms)", paint("PASS", Tone::Pass, color), scenario.name, ms);
        }
        ScenarioOutcome::Failed(err) => {
            let _ = writeln!(
                out,
                "{} {} ({}ms): {}",
                paint("FAIL", Tone::Fail, color),
                scenario.name,
                ms,
                err
            );
            let _ = writeln!(out, "  args: {}", scenario.args.join(" "));
            render_failure(out, err);
        }
    }
}

fn render_failure(out: &mut String, err: &HarnessError) {
    match err {
        HarnessError::Run { .. } => {}
        HarnessError::Divergence(comparison) => {
            // An exit status divergence shows both sides' output, even
            // where the normalized streams agree.
            let exit_diverged = comparison.diverges_on(Aspect::Termination);
            for aspect in [Aspect::Stdout, Aspect::Stderr] {
                if !exit_diverged && !comparison.diverges_on(aspect) {
                    continue;
                }
                let (baseline, proxy) = match aspect {
                    Aspect::Stderr => (&comparison.baseline.stderr, &comparison.proxy.stderr),
                    _ => (&comparison.baseline.stdout, &comparison.proxy.stdout),
                };
                if baseline.raw() == proxy.raw() {
                    push_raw(out, &format!("{} (same on both sides)", aspect), baseline);
                } else {
                    push_diff(out, &aspect.to_string(), baseline, proxy);
                }
            }
        }
        HarnessError::Expectation(report) => {
            push_raw(out, "proxy stdout", &report.result.stdout);
            push_raw(out, "proxy stderr", &report.result.stderr);
        }
    }
}

fn push_diff(out: &mut String, stream: &str, baseline: &CapturedStream, proxy: &CapturedStream) {
    let old = baseline.raw_text();
    let new = proxy.raw_text();
    let diff = TextDiff::from_lines(&*old, &*new);
    let rendered = diff
        .unified_diff()
        .context_radius(DIFF_CONTEXT)
        .header(&format!("baseline {}", stream), &format!("proxy {}", stream))
        .to_string();
    for line in rendered.lines() {
        let _ = writeln!(out, "    {}", line);
    }
}

fn push_raw(out: &mut String, label: &str, stream: &CapturedStream) {
    if stream.raw().is_empty() {
        return;
    }
    let _ = writeln!(out, "  {}:", label);
    for line in stream.raw_text().lines() {
        let _ = writeln!(out, "    {}", line);
    }
}

/// Serializable view of a suite report
#[derive(Debug, Serialize)]
struct SuiteView<'a> {
    passed: usize,
    failed: usize,
    advisories: usize,
    skipped: usize,
    elapsed_ms: u64,
    scenarios: Vec<ScenarioView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Serialize)]
struct ScenarioView<'a> {
    name: &'a str,
    args: &'a [String],
    status: Status,
    elapsed_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    advisories: Vec<Aspect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<&'a Comparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxy: Option<&'a CapturedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorView<'a>>,
}

#[derive(Debug, Serialize)]
struct ErrorView<'a> {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expectation: Option<&'a ExpectationReport>,
}

impl<'a> ScenarioView<'a> {
    fn new(scenario: &'a ScenarioReport) -> Self {
        let advisories = scenario.advisories();
        let mut view = ScenarioView {
            name: &scenario.name,
            args: &scenario.args,
            status: if advisories.is_empty() {
                Status::Pass
            } else {
                Status::Warn
            },
            elapsed_ms: millis_u64(scenario.elapsed),
            advisories,
            comparison: None,
            proxy: None,
            error: None,
        };

        match &scenario.outcome {
            ScenarioOutcome::Passed(Evidence::Parity(comparison)) => view.comparison = Some(comparison),
            ScenarioOutcome::Passed(Evidence::Proxy(result)) => view.proxy = Some(result),
            ScenarioOutcome::Failed(err) => {
                view.status = Status::Fail;
                let mut error = ErrorView {
                    kind: err.kind(),
                    message: err.to_string(),
                    side: None,
                    expectation: None,
                };
                match err {
                    HarnessError::Run { side, .. } => error.side = Some(*side),
                    HarnessError::Divergence(comparison) => view.comparison = Some(comparison.as_ref()),
                    HarnessError::Expectation(report) => error.expectation = Some(report.as_ref()),
                }
                view.error = Some(error);
            }
        }
        view
    }
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &SuiteReport) -> serde_json::Result<String> {
    let view = SuiteView {
        passed: report.passed(),
        failed: report.failed(),
        advisories: report.advisories(),
        skipped: report.skipped,
        elapsed_ms: millis_u64(report.elapsed),
        scenarios: report.scenarios.iter().map(ScenarioView::new).collect(),
    };
    serde_json::to_string_pretty(&view)
}

/// Write the report to `writer` in the requested format.
pub fn write<W: Write>(writer: &mut W, report: &SuiteReport, format: Format, color: bool) -> io::Result<()> {
    match format {
        Format::Text => writer.write_all(render_text(report, color).as_bytes()),
        Format::Json => {
            let json = render_json(report).map_err(io::Error::other)?;
            writeln!(writer, "{}", json)
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
