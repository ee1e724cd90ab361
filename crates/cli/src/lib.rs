// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Differential test harness for test-runner CLIs.
//!
//! Runs a *proxy* runner and the *baseline* runner it imitates with identical
//! arguments, captures both processes' output, strips formatting noise that
//! does not change meaning, and checks that exit status and output agree.
//! Proxy-only extension points (host modules, profile builders) are checked
//! against literal expectations.
//!
//! ```no_run
//! use runner_parity::{Catalog, Comparator, HostHelp, ProcessRunner};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let host = HostHelp::new("Marionette", "Marionette host options");
//! let catalog = Catalog::standard("test/fixtures".as_ref(), &host);
//! let comparator = Comparator::new("node_modules/.bin/mocha", "bin/marionette-mocha", ".")
//!     .with_runner(ProcessRunner::new());
//! let report = runner_parity::suite::Suite::new(comparator).run(&catalog).await;
//! assert!(report.all_passed());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod compare;
pub mod config;
pub mod env;
pub mod error;
pub mod expect;
pub mod logging;
#[doc(hidden)]
pub mod mock;
pub mod normalize;
pub mod output_diagnostic;
pub mod process;
pub mod report;
pub mod stream;
pub mod suite;

/// Re-exported run recording types from the parity-capture crate.
pub mod capture {
    pub use parity_capture::{RecordedInvocation, RecordedOutcome, RecordedRun, RunLog, Side};
}

pub use catalog::{Catalog, Check, HostHelp, Scenario};
pub use compare::{Comparator, Comparison, StderrPolicy};
pub use error::{HarnessError, RunError};
pub use normalize::{NormalizationPass, Normalizer};
pub use process::{CapturedResult, CapturedStream, Invocation, ProcessRunner, Termination};
