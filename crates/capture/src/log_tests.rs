// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::panic)]
use super::*;
use proptest::prelude::*;
use rstest::rstest;
use std::thread;
use std::time::Duration;

fn make_invocation(scenario: &str, side: Side) -> RecordedInvocation {
    RecordedInvocation {
        scenario: scenario.to_string(),
        side,
        program: format!("/bin/{}", side),
        args: vec![scenario.to_string()],
        cwd: None,
    }
}

fn exited(code: i32) -> RecordedOutcome {
    RecordedOutcome::Exited {
        code,
        stdout_len: 10,
        stderr_len: 0,
        elapsed: Duration::from_millis(5),
    }
}

#[test]
fn test_record_and_retrieve() {
    let log = RunLog::new();

    log.record(make_invocation("test", Side::Baseline), exited(0));

    assert_eq!(log.len(), 1);
    let runs = log.runs();
    assert_eq!(runs[0].seq, 0);
    assert_eq!(runs[0].invocation.scenario, "test");
}

#[rstest]
#[case(1, 1)]
#[case(5, 2)]
#[case(10, 5)]
#[case(3, 10)]
fn test_last_n(#[case] total: usize, #[case] n: usize) {
    let log = RunLog::new();

    for i in 0..total {
        log.record(make_invocation(&format!("s{}", i), Side::Proxy), exited(0));
    }

    let last = log.last(n);
    let expected_len = n.min(total);
    assert_eq!(last.len(), expected_len);

    let start = total.saturating_sub(n);
    for (i, run) in last.iter().enumerate() {
        assert_eq!(run.invocation.scenario, format!("s{}", start + i));
    }
}

#[test]
fn test_find_by_scenario_and_side() {
    let log = RunLog::new();

    log.record(make_invocation("test", Side::Baseline), exited(0));
    log.record(make_invocation("test", Side::Proxy), exited(0));
    log.record(make_invocation("pending", Side::Proxy), exited(0));

    assert_eq!(log.find_by_scenario("test").len(), 2);
    assert_eq!(log.find_by_scenario("missing").len(), 0);
    assert_eq!(log.find_by_side(Side::Proxy).len(), 2);
    assert_eq!(log.find_by_side(Side::Baseline).len(), 1);
}

#[test]
fn test_find_failures() {
    let log = RunLog::new();

    log.record(make_invocation("a", Side::Baseline), exited(1));
    log.record(
        make_invocation("b", Side::Proxy),
        RecordedOutcome::SpawnFailed {
            message: "not found".to_string(),
        },
    );
    log.record(
        make_invocation("c", Side::Proxy),
        RecordedOutcome::TimedOut {
            after: Duration::from_secs(1),
        },
    );

    assert_eq!(log.find_failures().len(), 2);
    assert_eq!(log.count(|r| r.invocation.scenario == "a"), 1);
}

#[test]
fn test_clear_and_default() {
    let log = RunLog::default();
    assert!(log.is_empty());

    log.record(make_invocation("test", Side::Baseline), exited(0));
    assert!(!log.is_empty());
    log.clear();
    assert_eq!(log.len(), 0);
}

#[test]
fn test_clone_shares_state() {
    let log1 = RunLog::new();
    let log2 = log1.clone();

    log1.record(make_invocation("one", Side::Baseline), exited(0));
    assert_eq!(log2.len(), 1);

    log2.record(make_invocation("two", Side::Proxy), exited(0));
    assert_eq!(log1.len(), 2);
}

#[test]
fn test_file_capture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.jsonl");

    {
        let log = RunLog::with_file(&path).unwrap();
        log.record(make_invocation("test", Side::Baseline), exited(0));
        log.record(make_invocation("test", Side::Proxy), exited(2));
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: RecordedRun = serde_json::from_str(lines[0]).unwrap();
    let second: RecordedRun = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(first.invocation.side, Side::Baseline);
    assert_eq!(second.seq, 1);
    assert_eq!(second.outcome, exited(2));
}

#[test]
fn test_file_capture_reports_path_and_no_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.jsonl");
    let log = RunLog::with_file(&path).unwrap();
    log.record(make_invocation("test", Side::Baseline), exited(0));

    assert_eq!(log.file_path(), Some(path));
    assert_eq!(log.sink_failures(), 0);
    assert_eq!(RunLog::new().file_path(), None);
    assert_eq!(RunLog::new().sink_failures(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_file_write_failure_is_counted_and_run_kept() {
    // Every write to /dev/full fails with ENOSPC.
    let log = RunLog::with_file(std::path::Path::new("/dev/full")).unwrap();
    let shared = log.clone();

    log.record(make_invocation("full", Side::Baseline), exited(0));
    shared.record(make_invocation("full", Side::Proxy), exited(1));

    assert_eq!(log.len(), 2);
    assert_eq!(log.sink_failures(), 2);
    assert_eq!(log.find_by_scenario("full").len(), 2);
}

#[test]
fn test_file_capture_invalid_path() {
    let result = RunLog::with_file(std::path::Path::new("/nonexistent/dir/runs.jsonl"));
    assert!(result.is_err());
}

#[test]
fn test_thread_safety() {
    let log = RunLog::new();
    let log_clone = log.clone();

    let handle = thread::spawn(move || {
        for i in 0..100 {
            log_clone.record(make_invocation(&format!("t{}", i), Side::Proxy), exited(0));
        }
    });

    for i in 0..100 {
        log.record(make_invocation(&format!("m{}", i), Side::Baseline), exited(0));
    }

    handle.join().unwrap();

    assert_eq!(log.len(), 200);
    let runs = log.runs();
    for (i, run) in runs.iter().enumerate() {
        assert_eq!(run.seq, i as u64);
    }
}

proptest! {
    #[test]
    fn len_equals_record_count(count in 0usize..100) {
        let log = RunLog::new();
        for _ in 0..count {
            log.record(make_invocation("p", Side::Proxy), exited(0));
        }
        prop_assert_eq!(log.len(), count);
    }

    #[test]
    fn failures_partition_runs(exits in 0usize..20, spawn_failures in 0usize..20) {
        let log = RunLog::new();
        for _ in 0..exits {
            log.record(make_invocation("p", Side::Proxy), exited(1));
        }
        for _ in 0..spawn_failures {
            log.record(
                make_invocation("p", Side::Baseline),
                RecordedOutcome::SpawnFailed { message: "gone".to_string() },
            );
        }
        prop_assert_eq!(log.find_failures().len(), spawn_failures);
        prop_assert_eq!(log.len(), exits + spawn_failures);
    }
}
