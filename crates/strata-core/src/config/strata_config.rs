//! Top-level Strata configuration with layered resolution.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{FixConfig, ReportConfig, RulesConfig, ScanConfig};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

const SEVERITY_TOKENS: [&str; 3] = ["error", "warning", "info"];

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`STRATA_*`)
/// 3. Project config (`strata.toml` in project root)
/// 4. User config (`~/.strata/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrataConfig {
    pub scan: ScanConfig,
    pub rules: RulesConfig,
    pub fix: FixConfig,
    pub report: ReportConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_depth: Option<usize>,
    pub dry_run: Option<bool>,
    pub report_output: Option<String>,
    pub disabled_rules: Vec<String>,
}

impl StrataConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config. Only a parse failure is fatal here.
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &StrataConfig) -> Result<(), ConfigError> {
        if config.scan.max_depth == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.max_depth".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(ref name) = config.scan.descriptor_file {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.descriptor_file".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if let Some(ref dir) = config.fix.backup_dir {
            // Only plain names: "." or "a/.." would stage into the root itself.
            let path = Path::new(dir);
            let plain = path.components().all(|c| matches!(c, Component::Normal(_)));
            if dir.trim().is_empty() || !plain || path.components().next().is_none() {
                return Err(ConfigError::ValidationFailed {
                    field: "fix.backup_dir".to_string(),
                    message: "must be a relative path of plain names inside the project root".to_string(),
                });
            }
        }
        for (rule_id, token) in &config.rules.severity_overrides {
            if !SEVERITY_TOKENS.contains(&token.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("rules.severity_overrides.{rule_id}"),
                    message: format!("unknown severity '{token}'"),
                });
            }
        }
        Ok(())
    }

    /// Resolve a configured path against the project root.
    pub fn resolve_path(root: &Path, configured: &str) -> PathBuf {
        let path = Path::new(configured);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    /// Returns the user config path: `~/.strata/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".strata").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut StrataConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: StrataConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`: `Some` values and non-empty lists win.
    fn merge(base: &mut StrataConfig, other: &StrataConfig) {
        // Scan
        if other.scan.max_depth.is_some() {
            base.scan.max_depth = other.scan.max_depth;
        }
        if other.scan.descriptor_file.is_some() {
            base.scan.descriptor_file = other.scan.descriptor_file.clone();
        }
        if !other.scan.exclude.is_empty() {
            base.scan.exclude = other.scan.exclude.clone();
        }
        if other.scan.parallel.is_some() {
            base.scan.parallel = other.scan.parallel;
        }

        // Rules
        if !other.rules.sources.is_empty() {
            base.rules.sources = other.rules.sources.clone();
        }
        if !other.rules.disabled.is_empty() {
            base.rules.disabled = other.rules.disabled.clone();
        }
        if !other.rules.severity_overrides.is_empty() {
            base.rules.severity_overrides = other.rules.severity_overrides.clone();
        }
        if other.rules.include_builtin.is_some() {
            base.rules.include_builtin = other.rules.include_builtin;
        }

        // Fix
        if other.fix.dry_run.is_some() {
            base.fix.dry_run = other.fix.dry_run;
        }
        if !other.fix.disabled_fixers.is_empty() {
            base.fix.disabled_fixers = other.fix.disabled_fixers.clone();
        }
        if other.fix.backup_dir.is_some() {
            base.fix.backup_dir = other.fix.backup_dir.clone();
        }
        if other.fix.cleanup_on_success.is_some() {
            base.fix.cleanup_on_success = other.fix.cleanup_on_success;
        }

        // Report
        if other.report.output.is_some() {
            base.report.output = other.report.output.clone();
        }
        if other.report.consolidated.is_some() {
            base.report.consolidated = other.report.consolidated.clone();
        }
        if other.report.module_name.is_some() {
            base.report.module_name = other.report.module_name.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `STRATA_SCAN_MAX_DEPTH`, `STRATA_FIX_DRY_RUN`, etc.
    fn apply_env_overrides(config: &mut StrataConfig) {
        if let Ok(val) = std::env::var("STRATA_SCAN_MAX_DEPTH") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.max_depth = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_SCAN_PARALLEL") {
            if let Ok(v) = val.parse::<bool>() {
                config.scan.parallel = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_FIX_DRY_RUN") {
            if let Ok(v) = val.parse::<bool>() {
                config.fix.dry_run = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_REPORT_OUTPUT") {
            config.report.output = Some(val);
        }
        if let Ok(val) = std::env::var("STRATA_RULES_DISABLED") {
            let ids: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !ids.is_empty() {
                config.rules.disabled = ids;
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut StrataConfig, cli: &CliOverrides) {
        if let Some(v) = cli.max_depth {
            config.scan.max_depth = Some(v);
        }
        if let Some(v) = cli.dry_run {
            config.fix.dry_run = Some(v);
        }
        if let Some(ref v) = cli.report_output {
            config.report.output = Some(v.clone());
        }
        if !cli.disabled_rules.is_empty() {
            config.rules.disabled = cli.disabled_rules.clone();
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
