// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup for the harness binary.
//!
//! Logs always go to stderr; stdout is reserved for the report.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count. `PARITY_LOG` wins when set.
pub fn filter_directive(verbosity: u8, env_override: Option<String>) -> String {
    if let Some(directive) = env_override {
        return directive;
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

/// Install the global subscriber. Calling it twice keeps the first one.
pub fn init(verbosity: u8, json: bool) {
    let directive = filter_directive(verbosity, crate::env::log_filter());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!(event = "subscriber_already_set");
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
