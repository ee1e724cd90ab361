// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared helpers for end-to-end tests against the mock runner.

#![allow(dead_code)]

use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::{Path, PathBuf};

use runner_parity::HostHelp;

/// Directory holding the TOML fixtures
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn mock_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mock-runner"))
}

pub fn parity_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_runner-parity"))
}

/// Host help the fixture host module declares
pub fn fixture_host() -> HostHelp {
    HostHelp::new("Marionette", "Marionette host options")
}

/// Baseline and proxy runners: the mock binary linked under names that
/// select each flavor.
pub struct Runners {
    pub baseline: PathBuf,
    pub proxy: PathBuf,
    tmp: tempfile::TempDir,
}

impl Runners {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline-runner");
        let proxy = dir.path().join("proxy-runner");
        symlink(mock_bin(), &baseline).unwrap();
        symlink(mock_bin(), &proxy).unwrap();
        Self {
            baseline,
            proxy,
            tmp: dir,
        }
    }

    pub fn dir(&self) -> &Path {
        self.tmp.path()
    }

    /// An executable shell script next to the runners
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
