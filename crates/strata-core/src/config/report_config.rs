//! Report output configuration.

use serde::{Deserialize, Serialize};

/// Where reports are written.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    /// Path of the per-run JSON report. Not written when unset.
    pub output: Option<String>,
    /// Path of the consolidated multi-module report. Not written when unset.
    pub consolidated: Option<String>,
    /// Key under which this run is merged into the consolidated report.
    pub module_name: Option<String>,
}
