// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with full output capture.

use crate::error::RunError;
use crate::normalize::Normalizer;
use crate::stream::StreamAggregator;
use parity_capture::{RecordedInvocation, RecordedOutcome, RunLog, Side};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// What to launch: program, arguments, working directory and environment.
///
/// Built once per run and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
    env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    /// Set environment overrides on top of the inherited environment
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// The same invocation aimed at a different program.
    pub fn for_program(&self, program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..self.clone()
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&self.cwd)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn record(&self, scenario: &str, side: Side) -> RecordedInvocation {
        RecordedInvocation {
            scenario: scenario.to_string(),
            side,
            program: self.program.display().to_string(),
            args: self.args.clone(),
            cwd: Some(self.cwd.display().to_string()),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a process ended, exactly as the OS reported it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Termination {
    /// Normal exit with a status code
    Exited(i32),
    /// Killed by a signal
    Signaled(i32),
    /// The platform reported neither a code nor a signal
    Unreported,
}

impl Termination {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled(signal);
            }
        }
        Termination::Unreported
    }

    /// The exit code, if the process exited normally
    pub fn code(&self) -> Option<i32> {
        match self {
            Termination::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit code {}", code),
            Termination::Signaled(signal) => write!(f, "signal {}", signal),
            Termination::Unreported => f.write_str("unreported status"),
        }
    }
}

/// One captured output stream, raw and normalized.
///
/// The raw bytes are always kept: normalization is lossy, and substring
/// checks such as help-text assertions need the exact output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CapturedStream {
    #[serde(serialize_with = "lossy")]
    raw: Vec<u8>,
    #[serde(serialize_with = "lossy")]
    normalized: Vec<u8>,
}

impl CapturedStream {
    pub fn new(raw: Vec<u8>, normalizer: &Normalizer) -> Self {
        let normalized = normalizer.normalize(&raw);
        Self { raw, normalized }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn normalized(&self) -> &[u8] {
        &self.normalized
    }

    pub fn raw_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    pub fn normalized_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.normalized)
    }

    /// Whether the raw output contains `needle` verbatim
    pub fn raw_contains(&self, needle: &str) -> bool {
        let needle = needle.as_bytes();
        needle.is_empty() || self.raw.windows(needle.len()).any(|w| w == needle)
    }
}

fn lossy<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Everything observed from one finished process
#[derive(Clone, Debug, Serialize)]
pub struct CapturedResult {
    pub termination: Termination,
    pub stdout: CapturedStream,
    pub stderr: CapturedStream,
    #[serde(rename = "elapsed_ms", serialize_with = "millis")]
    pub elapsed: Duration,
}

impl CapturedResult {
    pub fn exit_code(&self) -> Option<i32> {
        self.termination.code()
    }

    fn recorded_outcome(&self) -> RecordedOutcome {
        let stdout_len = self.stdout.raw().len();
        let stderr_len = self.stderr.raw().len();
        match self.termination {
            Termination::Exited(code) => RecordedOutcome::Exited {
                code,
                stdout_len,
                stderr_len,
                elapsed: self.elapsed,
            },
            Termination::Signaled(signal) => RecordedOutcome::Signaled {
                signal,
                stdout_len,
                stderr_len,
                elapsed: self.elapsed,
            },
            Termination::Unreported => RecordedOutcome::Unreported {
                stdout_len,
                stderr_len,
                elapsed: self.elapsed,
            },
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn millis_u64(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(millis_u64(*duration))
}

/// Launches invocations and captures their output
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    normalizer: Arc<Normalizer>,
    timeout: Option<Duration>,
    run_log: Option<RunLog>,
}

impl ProcessRunner {
    /// Standard normalization, no timeout, no recording
    pub fn new() -> Self {
        Self {
            normalizer: Arc::new(Normalizer::standard()),
            timeout: None,
            run_log: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Kill runs that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record every run in `log`
    pub fn with_run_log(mut self, log: RunLog) -> Self {
        self.run_log = Some(log);
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `invocation` and record the run under `scenario`/`side`.
    pub async fn run_for(
        &self,
        scenario: &str,
        side: Side,
        invocation: &Invocation,
    ) -> Result<CapturedResult, RunError> {
        let result = self.run(invocation).await;
        if let Some(ref log) = self.run_log {
            let outcome = match &result {
                Ok(captured) => captured.recorded_outcome(),
                Err(RunError::Timeout { after, .. }) => RecordedOutcome::TimedOut { after: *after },
                Err(e @ RunError::Spawn { .. }) => RecordedOutcome::SpawnFailed {
                    message: e.to_string(),
                },
                Err(e @ RunError::Capture { .. }) => RecordedOutcome::CaptureFailed {
                    message: e.to_string(),
                },
            };
            log.record(invocation.record(scenario, side), outcome);
        }
        result
    }

    /// Run `invocation` to completion.
    ///
    /// Both output streams are attached before anything is awaited. The
    /// returned termination is the one the OS reported; a spawn failure is an
    /// error, never a made-up exit code.
    pub async fn run(&self, invocation: &Invocation) -> Result<CapturedResult, RunError> {
        let program = invocation.program().to_path_buf();
        tracing::debug!(event = "spawn", command = %invocation, cwd = %invocation.cwd().display());

        let started = Instant::now();
        let mut child = invocation
            .command()
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .map(StreamAggregator::attach)
            .unwrap_or_else(StreamAggregator::detached);
        let stderr = child
            .stderr
            .take()
            .map(StreamAggregator::attach)
            .unwrap_or_else(StreamAggregator::detached);

        let capture = async {
            let status = child.wait().await.map_err(|source| RunError::Capture {
                program: program.clone(),
                stream: "exit status",
                source,
            })?;
            let stdout = stdout.collect().await.map_err(|source| RunError::Capture {
                program: program.clone(),
                stream: "stdout",
                source,
            })?;
            let stderr = stderr.collect().await.map_err(|source| RunError::Capture {
                program: program.clone(),
                stream: "stderr",
                source,
            })?;
            Ok::<_, RunError>((status, stdout, stderr))
        };

        let captured = match self.timeout {
            None => capture.await,
            Some(limit) => match tokio::time::timeout(limit, capture).await {
                Ok(captured) => captured,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(event = "kill_failed", program = %program.display(), error = %e);
                    }
                    tracing::warn!(event = "timeout", program = %program.display(), after_ms = millis_u64(limit));
                    return Err(RunError::Timeout {
                        program,
                        after: limit,
                    });
                }
            },
        };
        let (status, stdout, stderr) = captured?;

        let result = CapturedResult {
            termination: Termination::from_status(status),
            stdout: CapturedStream::new(stdout, &self.normalizer),
            stderr: CapturedStream::new(stderr, &self.normalizer),
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            event = "exit",
            program = %program.display(),
            termination = %result.termination,
            stdout_bytes = result.stdout.raw().len(),
            stderr_bytes = result.stderr.raw().len(),
            elapsed_ms = millis_u64(result.elapsed),
        );
        Ok(result)
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
