//! Report document types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fixers::{FixResult, FixSummary};
use crate::rules::Violation;

/// Overall outcome of a run, derived from the summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Something was fixed and nothing failed.
    Success,
    /// Something was fixed and something failed.
    PartialSuccess,
    /// Every result was skipped or had no fixer.
    AllSkipped,
    Completed,
}

impl ReportStatus {
    pub fn from_summary(summary: &FixSummary) -> Self {
        let failures = summary.failures();
        if summary.fixed > 0 && failures == 0 {
            Self::Success
        } else if summary.fixed > 0 {
            Self::PartialSuccess
        } else if summary.total > 0 && summary.skipped + summary.not_fixable == summary.total {
            Self::AllSkipped
        } else {
            Self::Completed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// RFC 3339.
    pub generated_at: String,
    pub project_path: String,
    pub duration_ms: u64,
    pub version: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(flatten)]
    pub counts: FixSummary,
    pub success_rate: f64,
}

/// Fix results bucketed by outcome. `skipped` also holds not-fixable results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixBuckets {
    pub successful: Vec<FixResult>,
    pub failed: Vec<FixResult>,
    pub skipped: Vec<FixResult>,
    pub dry_run: Vec<FixResult>,
}

/// Per-rule counts with one example message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRollup {
    pub total: usize,
    pub fixed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: usize,
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixReport {
    pub metadata: ReportMetadata,
    pub status: ReportStatus,
    pub summary: ReportSummary,
    pub fixes: FixBuckets,
    pub rules: BTreeMap<String, RuleRollup>,
    pub violations_by_rule: BTreeMap<String, Vec<Violation>>,
}
