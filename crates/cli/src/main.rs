// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! runner-parity binary entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use runner_parity::capture::RunLog;
use runner_parity::cli::Cli;
use runner_parity::config::Settings;
use runner_parity::output_diagnostic::{print_error, print_warning};
use runner_parity::report;
use runner_parity::suite::{Suite, SuiteReport};

/// Every scenario passed
const EXIT_PASSED: u8 = 0;
/// At least one scenario failed
const EXIT_FAILED: u8 = 1;
/// The harness could not be configured
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    runner_parity::logging::init(cli.verbose, cli.log_json);

    let settings = match std::env::current_dir()
        .context("cannot determine the current directory")
        .and_then(|cwd| cli.settings(&cwd).map_err(anyhow::Error::from))
    {
        Ok(settings) => settings,
        Err(e) => {
            print_error(format_args!("{:#}", e));
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            print_error(format_args!("failed to start async runtime: {}", e));
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match runtime.block_on(run(&cli, settings)) {
        Ok(report) if report.all_passed() => ExitCode::from(EXIT_PASSED),
        Ok(_) => ExitCode::from(EXIT_FAILED),
        Err(e) => {
            print_error(format_args!("{:#}", e));
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

async fn run(cli: &Cli, settings: Settings) -> anyhow::Result<SuiteReport> {
    let catalog = settings.catalog.load()?;
    let run_log = match &cli.capture_log {
        Some(path) => Some(
            RunLog::with_file(path)
                .with_context(|| format!("cannot open capture log {}", path.display()))?,
        ),
        None => None,
    };

    let suite = Suite::new(settings.comparator(run_log))
        .with_filter(cli.filter.clone())
        .with_fail_fast(settings.fail_fast);
    let selected = suite.selected(&catalog).len();
    if selected == 0 {
        match &cli.filter {
            Some(filter) => anyhow::bail!("no scenario matches filter '{}'", filter),
            None => anyhow::bail!("the catalog has no scenarios"),
        }
    }
    tracing::info!(
        event = "suite_start",
        scenarios = selected,
        baseline = %settings.baseline.display(),
        proxy = %settings.proxy.display(),
    );

    let report = suite.run(&catalog).await;
    if report.advisories() > 0 {
        print_warning(format_args!(
            "{} scenario(s) passed with advisory differences",
            report.advisories()
        ));
    }

    let color = io::stdout().is_terminal();
    report::write(&mut io::stdout().lock(), &report, cli.format, color)
        .context("failed to write report")?;
    Ok(report)
}
