// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use rstest::rstest;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("parity.config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn programs() -> Overrides {
    Overrides {
        baseline: Some(PathBuf::from("/bin/baseline")),
        proxy: Some(PathBuf::from("/bin/proxy")),
        catalog: Some(PathBuf::from("/catalog.toml")),
        ..Default::default()
    }
}

#[test]
fn full_config_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
baseline = "node_modules/.bin/mocha"
proxy = "marionette-mocha"
catalog = "parity.toml"
timeout_ms = 5000
stderr = "strict"
fail_fast = true

[env]
NO_COLOR = "1"

[[normalize]]
name = "tmp-paths"
pattern = "/tmp/[a-z]+"
replacement = "<tmp>"
intent = "temporary directories differ per run"
"#,
    );

    let config = HarnessConfig::load(&path).unwrap();
    assert_eq!(
        config.baseline,
        Some(dir.path().join("node_modules/.bin/mocha"))
    );
    assert_eq!(config.proxy, Some(PathBuf::from("marionette-mocha")));
    assert_eq!(config.catalog, Some(dir.path().join("parity.toml")));
    assert_eq!(config.stderr, Some(StderrPolicy::Strict));
    assert_eq!(config.env.get("NO_COLOR").map(String::as_str), Some("1"));
    assert_eq!(config.passes.len(), 1);
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "baseline = \"a\"\nretries = 3\n");
    assert!(matches!(
        HarnessConfig::load(&path),
        Err(ConfigError::Toml { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = HarnessConfig::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn configured_passes_run_after_builtins() {
    let config = HarnessConfig {
        passes: vec![PassConfig {
            name: "tmp-paths".to_string(),
            pattern: "/tmp/[a-z]+".to_string(),
            replacement: "<tmp>".to_string(),
            intent: String::new(),
        }],
        ..Default::default()
    };
    let normalizer = config.normalizer().unwrap();
    let names: Vec<&str> = normalizer.passes().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["elapsed-time", "layout-whitespace", "tmp-paths"]);
    assert_eq!(normalizer.normalize_str("wrote /tmp/abc in 5ms"), "wrote <tmp> in");
}

#[test]
fn bad_pattern_names_the_pass() {
    let config = HarnessConfig {
        passes: vec![PassConfig {
            name: "broken".to_string(),
            pattern: "(".to_string(),
            replacement: String::new(),
            intent: String::new(),
        }],
        ..Default::default()
    };
    match config.normalizer().unwrap_err() {
        ConfigError::Pattern { name, .. } => assert_eq!(name, "broken"),
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case::baseline(Overrides { baseline: None, ..programs() }, Side::Baseline)]
#[case::proxy(Overrides { proxy: None, ..programs() }, Side::Proxy)]
fn missing_program_is_a_config_error(#[case] overrides: Overrides, #[case] side: Side) {
    let err = Settings::resolve(HarnessConfig::default(), overrides, Path::new("/work")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingProgram(s) if s == side));
}

#[test]
fn command_line_wins_over_config() {
    let config = HarnessConfig {
        baseline: Some(PathBuf::from("/config/baseline")),
        proxy: Some(PathBuf::from("/config/proxy")),
        timeout_ms: Some(1000),
        stderr: Some(StderrPolicy::Advisory),
        ..Default::default()
    };
    let overrides = Overrides {
        timeout_ms: Some(250),
        strict_stderr: true,
        ..programs()
    };
    let settings = Settings::resolve(config, overrides, Path::new("/work")).unwrap();

    assert_eq!(settings.baseline, PathBuf::from("/bin/baseline"));
    assert_eq!(settings.timeout, Some(Duration::from_millis(250)));
    assert_eq!(settings.stderr_policy, StderrPolicy::Strict);
    assert_eq!(settings.cwd, PathBuf::from("/work"));
    assert_eq!(settings.catalog, CatalogSource::File(PathBuf::from("/catalog.toml")));
}

#[test]
fn config_fills_what_the_command_line_leaves_out() {
    let config = HarnessConfig {
        baseline: Some(PathBuf::from("/config/baseline")),
        proxy: Some(PathBuf::from("/config/proxy")),
        cwd: Some(PathBuf::from("/config/cwd")),
        fail_fast: Some(true),
        host: Some(HostHelp::new("Marionette", "Marionette host options")),
        fixtures_dir: Some(PathBuf::from("/config/fixtures")),
        ..Default::default()
    };
    let settings = Settings::resolve(config, Overrides::default(), Path::new("/work")).unwrap();

    assert_eq!(settings.proxy, PathBuf::from("/config/proxy"));
    assert_eq!(settings.cwd, PathBuf::from("/config/cwd"));
    assert!(settings.fail_fast);
    assert_eq!(settings.timeout, None);
    assert_eq!(settings.stderr_policy, StderrPolicy::Advisory);
    assert!(matches!(
        settings.catalog,
        CatalogSource::Standard { ref fixtures, .. } if fixtures == Path::new("/config/fixtures")
    ));
}

#[test]
fn zero_timeout_means_none() {
    let overrides = Overrides {
        timeout_ms: Some(0),
        ..programs()
    };
    let settings = Settings::resolve(HarnessConfig::default(), overrides, Path::new("/")).unwrap();
    assert_eq!(settings.timeout, None);
}

#[test]
fn catalog_is_required() {
    let overrides = Overrides {
        catalog: None,
        ..programs()
    };
    let err = Settings::resolve(HarnessConfig::default(), overrides, Path::new("/")).unwrap_err();
    assert!(matches!(err, ConfigError::Catalog(_)));
}

#[test]
fn comparator_carries_settings() {
    let config = HarnessConfig {
        env: BTreeMap::from([("NO_COLOR".to_string(), "1".to_string())]),
        ..Default::default()
    };
    let overrides = Overrides {
        timeout_ms: Some(100),
        ..programs()
    };
    let settings = Settings::resolve(config, overrides, Path::new("/work")).unwrap();
    let comparator = settings.comparator(None);

    assert_eq!(comparator.baseline(), Path::new("/bin/baseline"));
    assert_eq!(comparator.runner().timeout(), Some(Duration::from_millis(100)));
    let scenario = crate::catalog::Scenario::parity("test", ["a"]);
    let invocation = comparator.invocation(Side::Proxy, &scenario);
    assert_eq!(invocation.env(), [("NO_COLOR".to_string(), "1".to_string())]);
}
