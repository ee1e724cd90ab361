// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All environment variables read by runner-parity and the mock runner are
//! named here. Use these accessors instead of calling `std::env::var()`
//! directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

// Re-export name constants for callers that need the raw name string.
pub use names::*;

/// `PARITY_LOG`: tracing filter directive (e.g. `runner_parity=debug`).
pub fn log_filter() -> Option<String> {
    std::env::var(names::PARITY_LOG)
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// `MOCK_RUNNER_FLAVOR`: forces the mock runner's flavor regardless of the
/// name it was invoked as.
pub fn mock_runner_flavor() -> Option<String> {
    std::env::var(names::MOCK_RUNNER_FLAVOR).ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
