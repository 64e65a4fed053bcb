//! Module scanner configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DESCRIPTOR_FILE, DEFAULT_EXCLUDED_DIRS, DEFAULT_MAX_DEPTH};

/// Configuration for the module scanner.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum directory depth below the project root. Default: 10.
    pub max_depth: Option<usize>,
    /// Build descriptor file name. Default: "pom.xml".
    pub descriptor_file: Option<String>,
    /// Directory names never descended into.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Parse descriptors on the rayon pool. Default: true.
    pub parallel: Option<bool>,
}

impl ScanConfig {
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    pub fn effective_descriptor_file(&self) -> &str {
        self.descriptor_file
            .as_deref()
            .unwrap_or(DEFAULT_DESCRIPTOR_FILE)
    }

    /// Returns the configured exclusions, or the defaults when none are set.
    pub fn effective_exclude(&self) -> Vec<String> {
        if self.exclude.is_empty() {
            DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
        } else {
            self.exclude.clone()
        }
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }
}
