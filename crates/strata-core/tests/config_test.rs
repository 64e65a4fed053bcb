//! Tests for the Strata configuration system.

use std::sync::Mutex;

use strata_core::config::{CliOverrides, RuleSourceConfig, StrataConfig};
use strata_core::errors::ConfigError;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all STRATA_ env vars to prevent cross-test contamination.
fn clear_strata_env_vars() {
    for key in [
        "STRATA_SCAN_MAX_DEPTH",
        "STRATA_SCAN_PARALLEL",
        "STRATA_FIX_DRY_RUN",
        "STRATA_REPORT_OUTPUT",
        "STRATA_RULES_DISABLED",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_strata_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("strata.toml"),
        r#"
[scan]
max_depth = 4

[fix]
dry_run = false
"#,
    )
    .unwrap();

    std::env::set_var("STRATA_SCAN_MAX_DEPTH", "6");

    let cli = CliOverrides {
        dry_run: Some(true),
        ..Default::default()
    };
    let config = StrataConfig::load(dir.path(), Some(&cli)).unwrap();

    // Env beats project, CLI beats both.
    assert_eq!(config.scan.max_depth, Some(6));
    assert_eq!(config.fix.dry_run, Some(true));

    clear_strata_env_vars();
}

#[test]
fn test_missing_project_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_strata_env_vars();

    let dir = tempdir();
    let config = StrataConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.scan.effective_max_depth(), 10);
    assert_eq!(config.scan.effective_descriptor_file(), "pom.xml");
    assert_eq!(config.scan.effective_exclude(), vec!["target", "node_modules"]);
    assert!(config.scan.effective_parallel());
    assert!(!config.fix.effective_dry_run());
    assert_eq!(config.fix.effective_backup_dir(), ".strata-backups");
    assert!(config.rules.effective_include_builtin());
    assert!(config.report.output.is_none());
}

#[test]
fn test_rules_section_parses_sources_and_overrides() {
    let config = StrataConfig::from_toml(
        r#"
[rules]
disabled = ["MOD-001"]
sources = [
    { path = "rules/base.properties", required = true },
    { path = "rules/extra.yaml" },
]

[rules.severity_overrides]
"AGG-001" = "warning"
"#,
    )
    .unwrap();

    assert_eq!(
        config.rules.sources,
        vec![
            RuleSourceConfig {
                path: "rules/base.properties".to_string(),
                required: true,
            },
            RuleSourceConfig {
                path: "rules/extra.yaml".to_string(),
                required: false,
            },
        ]
    );
    assert_eq!(config.rules.disabled, vec!["MOD-001".to_string()]);
    assert_eq!(
        config.rules.severity_overrides.get("AGG-001").map(String::as_str),
        Some("warning")
    );
}

#[test]
fn test_env_disabled_rules_list() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_strata_env_vars();

    let dir = tempdir();
    std::env::set_var("STRATA_RULES_DISABLED", "AGG-001, MOD-001,");
    let config = StrataConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.rules.disabled, vec!["AGG-001", "MOD-001"]);

    clear_strata_env_vars();
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_strata_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("strata.toml"), "[scan\nmax_depth = ").unwrap();
    let err = StrataConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_validation_rejects_bad_values() {
    let zero_depth = StrataConfig::from_toml("[scan]\nmax_depth = 0\n").unwrap_err();
    assert!(matches!(zero_depth, ConfigError::ValidationFailed { ref field, .. } if field == "scan.max_depth"));

    for dir in ["../elsewhere", ".", "./", "a/../b", "/tmp/backups", ""] {
        let err = StrataConfig::from_toml(&format!("[fix]\nbackup_dir = \"{dir}\"\n")).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "fix.backup_dir"),
            "{dir:?}"
        );
    }
    assert!(StrataConfig::from_toml("[fix]\nbackup_dir = \"build/backups\"\n").is_ok());

    let bad_severity =
        StrataConfig::from_toml("[rules.severity_overrides]\n\"AGG-001\" = \"fatal\"\n").unwrap_err();
    assert!(matches!(bad_severity, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = StrataConfig::from_toml(
        r#"
[scan]
max_depth = 3
future_option = "yes"

[telemetry]
enabled = true
"#,
    )
    .unwrap();
    assert_eq!(config.scan.max_depth, Some(3));
}

#[test]
fn test_toml_round_trip_keeps_values() {
    let config = StrataConfig::from_toml(
        r#"
[report]
output = "target/strata-report.json"
module_name = "billing"
"#,
    )
    .unwrap();
    let text = config.to_toml().unwrap();
    let back = StrataConfig::from_toml(&text).unwrap();
    assert_eq!(back.report.output.as_deref(), Some("target/strata-report.json"));
    assert_eq!(back.report.module_name.as_deref(), Some("billing"));
}

#[test]
fn test_resolve_path_relative_and_absolute() {
    let root = std::path::Path::new("/work/project");
    assert_eq!(
        StrataConfig::resolve_path(root, "rules/a.properties"),
        root.join("rules/a.properties")
    );
    assert_eq!(
        StrataConfig::resolve_path(root, "/etc/strata/rules.yaml"),
        std::path::PathBuf::from("/etc/strata/rules.yaml")
    );
}
