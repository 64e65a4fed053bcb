//! Scanner data types.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Module classification derived from descriptor packaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Aggregating module (packaging `pom`), produces no compiled artifact.
    Parent,
    /// Artifact-producing module with a parent reference.
    Leaf,
    /// Artifact-producing module without a parent.
    Standalone,
}

impl ModuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Leaf => "leaf",
            Self::Standalone => "standalone",
        }
    }
}

/// Reference to the parent descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub relative_path: Option<String>,
}

/// One entry of the descriptor's dependency list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
}

impl DependencySpec {
    /// `groupId:artifactId`, the identifier rules match against.
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// Fields the engine reads from a build descriptor. Everything else stays in `raw`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedDescriptor {
    pub artifact_id: Option<String>,
    pub group_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    /// Declared child modules, in descriptor order.
    pub modules: Vec<String>,
    /// Project-level dependencies (not dependency management).
    pub dependencies: Vec<DependencySpec>,
    /// Names of the root element's direct children.
    pub top_level_elements: BTreeSet<String>,
    #[serde(skip)]
    pub raw: String,
}

impl ParsedDescriptor {
    /// Packaging with the descriptor format's implicit default.
    pub fn effective_packaging(&self) -> &str {
        self.packaging.as_deref().unwrap_or("jar")
    }
}

/// A declared child module and whether it exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildModule {
    /// Name as written in the descriptor.
    pub name: String,
    pub path: PathBuf,
    /// The directory exists and holds its own descriptor.
    pub present: bool,
}

/// A filled layer slot (api/core/spi/facade/common).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub module_name: String,
    pub path: PathBuf,
    pub present: bool,
}

/// One directory of the project tree that holds a build descriptor.
/// Built fresh on every scan, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub artifact_id: String,
    pub group_id: String,
    pub kind: ModuleKind,
    pub base_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub children: Vec<ChildModule>,
    pub dependencies: BTreeSet<String>,
    pub layers: BTreeMap<String, LayerInfo>,
    pub has_sources: bool,
    pub descriptor: ParsedDescriptor,
}

impl ModuleDescriptor {
    /// Declared child names in descriptor order.
    pub fn declared_children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|c| c.name.as_str())
    }

    /// A parent with no layer slots and no sources only groups children.
    pub fn is_pure_aggregator(&self) -> bool {
        self.kind == ModuleKind::Parent && self.layers.is_empty() && !self.has_sources
    }

    /// Path relative to `root`, `"."` for the root module itself.
    pub fn relative_path(&self, root: &Path) -> String {
        match self.base_path.strip_prefix(root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => self.base_path.display().to_string(),
        }
    }
}

/// A descriptor the scanner could not turn into a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDescriptor {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a scan: modules in walk order plus skipped descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub modules: Vec<ModuleDescriptor>,
    pub skipped: Vec<SkippedDescriptor>,
}
