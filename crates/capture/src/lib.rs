// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process run recording for runner-parity.
//!
//! Every subprocess the harness launches can be recorded here, in memory and
//! optionally as JSONL, so a failing suite can be inspected after the fact.

mod duration_serde;
mod log;
mod run;

pub use log::RunLog;
pub use run::{RecordedInvocation, RecordedOutcome, RecordedRun, Side};
