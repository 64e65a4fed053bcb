//! Rule catalog: layered loading of rule definitions.
//!
//! Sources apply in order. A later definition with the same id replaces the
//! earlier one wholesale; fields are never merged across sources.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use strata_core::config::{RulesConfig, StrataConfig};
use strata_core::errors::ConfigError;

use super::properties::parse_properties;
use super::types::{
    DependencyCriteria, DetectionCriteria, RuleCategory, RuleDefinition, Severity,
    StructuralCriteria, TargetFilter,
};

/// Built-in rule definitions, applied as the first layer.
pub const BUILTIN_RULES: &str = include_str!("builtin/rules.properties");

/// Rule file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Properties,
    Yaml,
    Toml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "properties" => Some(Self::Properties),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// One layer of rule definitions.
#[derive(Debug, Clone)]
pub enum RuleSource {
    File { path: PathBuf, required: bool },
    Inline {
        name: String,
        format: SourceFormat,
        content: String,
    },
}

impl RuleSource {
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            required: true,
        }
    }

    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            required: false,
        }
    }

    pub fn builtin() -> Self {
        Self::Inline {
            name: "<builtin>".to_string(),
            format: SourceFormat::Properties,
            content: BUILTIN_RULES.to_string(),
        }
    }
}

/// Keyed table of loaded rule definitions. Immutable after load apart from
/// administrative disabling.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    definitions: BTreeMap<String, RuleDefinition>,
}

impl RuleCatalog {
    /// Apply `sources` in order, later ids replacing earlier ones.
    pub fn load(sources: &[RuleSource]) -> Result<Self, ConfigError> {
        let mut catalog = Self::default();
        for source in sources {
            let Some(definitions) = read_source(source)? else {
                continue;
            };
            for definition in definitions {
                if !is_valid_rule_id(&definition.id) {
                    tracing::warn!(id = %definition.id, "skipping rule with malformed id");
                    continue;
                }
                if catalog.definitions.contains_key(&definition.id) {
                    tracing::debug!(id = %definition.id, "rule definition replaced by later source");
                }
                catalog.definitions.insert(definition.id.clone(), definition);
            }
        }
        tracing::debug!(rules = catalog.len(), "rule catalog loaded");
        Ok(catalog)
    }

    /// Load the built-ins (unless excluded) and the configured sources, then
    /// apply the configured disable list.
    pub fn from_config(root: &Path, config: &RulesConfig) -> Result<Self, ConfigError> {
        let mut sources = Vec::new();
        if config.effective_include_builtin() {
            sources.push(RuleSource::builtin());
        }
        for source in &config.sources {
            sources.push(RuleSource::File {
                path: StrataConfig::resolve_path(root, &source.path),
                required: source.required,
            });
        }
        let mut catalog = Self::load(&sources)?;
        catalog.disable(&config.disabled);
        Ok(catalog)
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = RuleDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&RuleDefinition> {
        self.definitions.get(id)
    }

    /// Whether `id` is loaded and enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.get(id).is_some_and(|d| d.enabled)
    }

    /// Enabled definitions in id order.
    pub fn enabled(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.definitions.values().filter(|d| d.enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.definitions.values()
    }

    /// Mark the given ids disabled. Unknown ids are ignored.
    pub fn disable(&mut self, ids: &[String]) {
        for id in ids {
            if let Some(definition) = self.definitions.get_mut(id) {
                definition.enabled = false;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// `<PREFIX>-<NNN>`: upper-case prefix, three digits.
pub fn is_valid_rule_id(id: &str) -> bool {
    static RULE_ID: OnceLock<Option<Regex>> = OnceLock::new();
    RULE_ID
        .get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9]*-[0-9]{3}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(id))
}

/// Returns `None` for a missing optional file.
fn read_source(source: &RuleSource) -> Result<Option<Vec<RuleDefinition>>, ConfigError> {
    match source {
        RuleSource::Inline {
            name,
            format,
            content,
        } => parse_source(content, *format, name).map(Some),
        RuleSource::File { path, required } => {
            if !path.is_file() {
                if *required {
                    return Err(ConfigError::MissingRequiredSource {
                        path: path.display().to_string(),
                    });
                }
                tracing::debug!(path = %path.display(), "optional rule source missing, skipped");
                return Ok(None);
            }
            let format = SourceFormat::from_path(path).ok_or_else(|| ConfigError::InvalidValue {
                field: "rules.sources".to_string(),
                message: format!("unsupported rule file format: {}", path.display()),
            })?;
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            parse_source(&content, format, &path.display().to_string()).map(Some)
        }
    }
}

fn parse_source(
    content: &str,
    format: SourceFormat,
    origin: &str,
) -> Result<Vec<RuleDefinition>, ConfigError> {
    let parse_error = |message: String| ConfigError::ParseError {
        path: origin.to_string(),
        message,
    };
    match format {
        SourceFormat::Properties => Ok(parse_properties(content)),
        SourceFormat::Yaml => {
            let file: RuleFile =
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            Ok(file.into_definitions())
        }
        SourceFormat::Toml => {
            let file: RuleFile = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            Ok(file.into_definitions())
        }
    }
}

/// Nested rule document shared by the YAML and TOML formats.
#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

impl RuleFile {
    fn into_definitions(self) -> Vec<RuleDefinition> {
        self.rules.into_iter().map(RuleEntry::into_definition).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleEntry {
    id: String,
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    severity: Option<String>,
    enabled: Option<bool>,
    #[serde(default)]
    targets: Vec<String>,
    #[serde(default)]
    path_patterns: Vec<String>,
    #[serde(default)]
    file_patterns: Vec<String>,
    #[serde(default)]
    package_patterns: Vec<String>,
    #[serde(default)]
    dependencies: DependencyEntry,
    #[serde(default)]
    structure: StructureEntry,
    remediation: Option<String>,
    documentation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DependencyEntry {
    must_contain: Vec<String>,
    must_not_contain: Vec<String>,
    exceptions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StructureEntry {
    required_child_order: Vec<String>,
    required_elements: Vec<String>,
}

impl RuleEntry {
    fn into_definition(self) -> RuleDefinition {
        let base = RuleDefinition::new(self.id);
        RuleDefinition {
            name: self.name.unwrap_or_else(|| base.name.clone()),
            description: self.description.unwrap_or_default(),
            category: self
                .category
                .as_deref()
                .map(RuleCategory::parse_lenient)
                .unwrap_or(RuleCategory::Structure),
            severity: self
                .severity
                .as_deref()
                .map(Severity::parse_lenient)
                .unwrap_or(Severity::Error),
            enabled: self.enabled.unwrap_or(true),
            targets: TargetFilter::new(self.targets),
            criteria: DetectionCriteria {
                path_patterns: self.path_patterns,
                file_patterns: self.file_patterns,
                package_patterns: self.package_patterns,
                dependencies: DependencyCriteria {
                    must_contain: self.dependencies.must_contain,
                    must_not_contain: self.dependencies.must_not_contain,
                    exceptions: self.dependencies.exceptions,
                },
                structure: StructuralCriteria {
                    required_child_order: self.structure.required_child_order,
                    required_elements: self.structure.required_elements,
                },
            },
            remediation: self.remediation,
            documentation: self.documentation,
            id: base.id,
        }
    }
}
