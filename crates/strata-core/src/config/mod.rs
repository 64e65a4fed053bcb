//! Configuration system for Strata.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod fix_config;
pub mod report_config;
pub mod rules_config;
pub mod scan_config;
pub mod strata_config;

pub use fix_config::FixConfig;
pub use report_config::ReportConfig;
pub use rules_config::{RuleSourceConfig, RulesConfig};
pub use scan_config::ScanConfig;
pub use strata_config::{CliOverrides, StrataConfig};
