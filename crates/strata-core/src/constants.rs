//! Shared constants for the Strata engine.

/// Strata version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build descriptor file recognised by default.
pub const DEFAULT_DESCRIPTOR_FILE: &str = "pom.xml";

/// Maximum directory depth walked below the project root.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Hidden staging directory (relative to the project root) holding backups.
pub const DEFAULT_BACKUP_DIR: &str = ".strata-backups";

/// Suffix appended to every staged backup file.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Directory names never descended into by the scanner.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 2] = ["target", "node_modules"];

/// Upper bound on violations a single rule may emit for one module.
pub const MAX_VIOLATIONS_PER_RULE: usize = 50;

/// Priority assigned to fixers that do not override `priority()`.
pub const DEFAULT_FIXER_PRIORITY: i32 = 50;

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "strata.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "STRATA_LOG";

/// Conventional layered sub-module roles, detected by naming suffix.
pub const LAYER_SLOTS: [&str; 5] = ["api", "core", "spi", "facade", "common"];

/// Status message for a fix whose target condition no longer holds.
pub const NO_CHANGES_NEEDED: &str = "No changes needed";
