//! Core types for the rule catalog and engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scanner::{ModuleDescriptor, ModuleKind};

/// Severity levels for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Parse a severity token. Unknown tokens fall back to `Error` so a typo
    /// in a rule file never silently downgrades a check.
    pub fn parse_lenient(token: &str) -> Self {
        Self::parse(token).unwrap_or_else(|| {
            tracing::debug!(token, "unknown severity token, using error");
            Self::Error
        })
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Rule categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Dependencies,
    Structure,
    Naming,
    Quality,
    Security,
    Performance,
    Configuration,
}

impl RuleCategory {
    /// Parse a category token. Unknown tokens fall back to `Structure`.
    pub fn parse_lenient(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "dependencies" | "dependency" => Self::Dependencies,
            "structure" => Self::Structure,
            "naming" => Self::Naming,
            "quality" => Self::Quality,
            "security" => Self::Security,
            "performance" => Self::Performance,
            "configuration" | "config" => Self::Configuration,
            other => {
                tracing::debug!(token = other, "unknown category token, using structure");
                Self::Structure
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::Structure => "structure",
            Self::Naming => "naming",
            Self::Quality => "quality",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which modules a rule targets. A rule applies when any token matches;
/// an empty filter matches every module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetFilter {
    pub tokens: Vec<String>,
}

impl TargetFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn matches(&self, module: &ModuleDescriptor) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        self.tokens.iter().any(|token| match token.as_str() {
            "all" | "*" => true,
            "parent" => module.kind == ModuleKind::Parent,
            "leaf" => module.kind == ModuleKind::Leaf,
            "standalone" => module.kind == ModuleKind::Standalone,
            "pure-aggregator" => module.is_pure_aggregator(),
            glob => glob::Pattern::new(glob)
                .map(|p| p.matches(&module.artifact_id))
                .unwrap_or(false),
        })
    }
}

/// Dependency constraints of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyCriteria {
    /// Globs of which each must match at least one dependency.
    pub must_contain: Vec<String>,
    /// Globs no dependency may match.
    pub must_not_contain: Vec<String>,
    /// Dependency identifiers (or module artifact ids) exempt from both lists.
    pub exceptions: Vec<String>,
}

impl DependencyCriteria {
    pub fn is_empty(&self) -> bool {
        self.must_contain.is_empty() && self.must_not_contain.is_empty()
    }
}

/// Structural constraints of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralCriteria {
    /// Layer slots in the order declared children must follow.
    pub required_child_order: Vec<String>,
    /// Top-level descriptor elements that must be present.
    pub required_elements: Vec<String>,
}

impl StructuralCriteria {
    pub fn is_empty(&self) -> bool {
        self.required_child_order.is_empty() && self.required_elements.is_empty()
    }
}

/// What a rule looks for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionCriteria {
    /// Module paths (relative to the project root) the rule is limited to.
    pub path_patterns: Vec<String>,
    /// File globs (relative to the module) each required to match something.
    pub file_patterns: Vec<String>,
    /// Dotted packages that must not exist under `src/main/java`.
    pub package_patterns: Vec<String>,
    pub dependencies: DependencyCriteria,
    pub structure: StructuralCriteria,
}

impl DetectionCriteria {
    /// True when the criteria alone say nothing to check.
    pub fn is_empty(&self) -> bool {
        self.file_patterns.is_empty()
            && self.package_patterns.is_empty()
            && self.dependencies.is_empty()
            && self.structure.is_empty()
    }
}

/// A named, versioned structural check. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// `<PREFIX>-<NNN>`, the join key with violations and fixers.
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub enabled: bool,
    pub targets: TargetFilter,
    pub criteria: DetectionCriteria,
    pub remediation: Option<String>,
    pub documentation: Option<String>,
}

impl RuleDefinition {
    /// A definition with only an id; other fields take their lenient defaults.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            category: RuleCategory::Structure,
            severity: Severity::Error,
            enabled: true,
            targets: TargetFilter::all(),
            criteria: DetectionCriteria::default(),
            remediation: None,
            documentation: None,
        }
    }

    /// Start a violation of this rule against `module`, located at its base path.
    pub fn violation(&self, module: &ModuleDescriptor, message: impl Into<String>) -> Violation {
        Violation {
            rule_id: self.id.clone(),
            rule_name: self.name.clone(),
            target: module.artifact_id.clone(),
            message: message.into(),
            severity: self.severity,
            category: self.category,
            location: module.base_path.clone(),
            suggested_fix: self.remediation.clone(),
            documentation: self.documentation.clone(),
        }
    }
}

/// One instance of a rule failing against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub rule_name: String,
    /// Artifact id of the offending module.
    pub target: String,
    pub message: String,
    pub severity: Severity,
    pub category: RuleCategory,
    /// File or directory the violation points at.
    pub location: PathBuf,
    pub suggested_fix: Option<String>,
    pub documentation: Option<String>,
}

impl Violation {
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_category(mut self, category: RuleCategory) -> Self {
        self.category = category;
        self
    }
}
