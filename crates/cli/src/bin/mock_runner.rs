// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fake test runner for end-to-end harness tests.
//!
//! Link or copy it as `baseline-runner` and `proxy-runner`; the name picks
//! the flavor.

use std::io::Write;

use runner_parity::mock::{execute, Flavor};

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_default();
    let args: Vec<String> = args.collect();

    let flavor = Flavor::detect(&program, runner_parity::env::mock_runner_flavor().as_deref());
    let run = execute(flavor, &args);

    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(run.stdout.as_bytes());
    let _ = stdout.flush();
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(run.stderr.as_bytes());
    let _ = stderr.flush();

    std::process::exit(run.exit_code);
}
