//! Rule catalog configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One layered rule-definition source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSourceConfig {
    /// Path to a `.properties`, `.yaml`/`.yml`, or `.toml` rule file.
    /// Relative paths resolve against the project root.
    pub path: String,
    /// A missing required source is a fatal configuration error.
    #[serde(default)]
    pub required: bool,
}

/// Configuration for rule loading and post-evaluation overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RulesConfig {
    /// Sources applied in order after the built-in definitions.
    #[serde(default)]
    pub sources: Vec<RuleSourceConfig>,
    /// Rule ids disabled regardless of their definition.
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Rule id → severity token ("error" | "warning" | "info").
    #[serde(default)]
    pub severity_overrides: BTreeMap<String, String>,
    /// Load the built-in rule definitions as the first layer. Default: true.
    pub include_builtin: Option<bool>,
}

impl RulesConfig {
    pub fn effective_include_builtin(&self) -> bool {
        self.include_builtin.unwrap_or(true)
    }
}
