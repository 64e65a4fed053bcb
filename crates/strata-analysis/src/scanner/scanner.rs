//! Module scanner: descriptor discovery, parsing, and classification.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use strata_core::config::StrataConfig;
use strata_core::constants::LAYER_SLOTS;
use strata_core::errors::{ParseError, ScanError};
use strata_core::traits::{Cancellable, CancellationToken};

use super::descriptor::{DescriptorParser, XmlDescriptorParser};
use super::lister::{DirectoryLister, ListOptions, WalkDirectoryLister};
use super::types::{
    ChildModule, LayerInfo, ModuleDescriptor, ModuleKind, ScanOutcome, SkippedDescriptor,
};

/// Builds the module tree of a project. Read-only: never touches the files it scans.
pub struct ModuleScanner {
    parser: Arc<dyn DescriptorParser>,
    lister: Arc<dyn DirectoryLister>,
    options: ListOptions,
    parallel: bool,
}

impl ModuleScanner {
    /// Scanner with the XML parser, the walking lister, and default options.
    pub fn new() -> Self {
        Self {
            parser: Arc::new(XmlDescriptorParser::new()),
            lister: Arc::new(WalkDirectoryLister),
            options: ListOptions::default(),
            parallel: true,
        }
    }

    /// Scanner configured from the `[scan]` and `[fix]` sections.
    pub fn from_config(config: &StrataConfig) -> Self {
        let options = ListOptions {
            descriptor_file: config.scan.effective_descriptor_file().to_string(),
            max_depth: config.scan.effective_max_depth(),
            exclude: config.scan.effective_exclude(),
            backup_dir: config.fix.effective_backup_dir().to_string(),
        };
        Self::new()
            .with_options(options)
            .parallel(config.scan.effective_parallel())
    }

    pub fn with_parser(mut self, parser: Arc<dyn DescriptorParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_lister(mut self, lister: Arc<dyn DirectoryLister>) -> Self {
        self.lister = lister;
        self
    }

    pub fn with_options(mut self, options: ListOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse descriptors on the rayon pool. Output order is unaffected.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Scan `root` into modules. Unparsable descriptors are skipped, not fatal.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome, ScanError> {
        self.scan_with_cancel(root, &CancellationToken::new())
    }

    /// Like `scan`, checking `cancel` before each descriptor is parsed.
    pub fn scan_with_cancel(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let descriptors = self.lister.descriptor_files(root, &self.options)?;
        tracing::debug!(root = %root.display(), count = descriptors.len(), "descriptors discovered");

        let build = |path: &std::path::PathBuf| {
            if cancel.is_cancelled() {
                return None;
            }
            Some((path.clone(), self.build_module(path)))
        };
        let built: Vec<_> = if self.parallel {
            descriptors.par_iter().map(build).collect()
        } else {
            descriptors.iter().map(build).collect()
        };

        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut outcome = ScanOutcome::default();
        for (path, result) in built.into_iter().flatten() {
            match result {
                Ok(module) => outcome.modules.push(module),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping module with unusable descriptor");
                    outcome.skipped.push(SkippedDescriptor {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            modules = outcome.modules.len(),
            skipped = outcome.skipped.len(),
            "scan complete"
        );
        Ok(outcome)
    }

    fn build_module(&self, descriptor_path: &Path) -> Result<ModuleDescriptor, ParseError> {
        let parsed = self.parser.parse(descriptor_path)?;

        let artifact_id = parsed
            .artifact_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ParseError::MissingElement {
                path: descriptor_path.to_path_buf(),
                element: "artifactId".to_string(),
            })?;
        let group_id = parsed
            .group_id
            .clone()
            .or_else(|| parsed.parent.as_ref().and_then(|p| p.group_id.clone()))
            .unwrap_or_default();

        let base_path = descriptor_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let kind = if parsed.effective_packaging() == "pom" {
            ModuleKind::Parent
        } else if parsed.parent.is_some() {
            ModuleKind::Leaf
        } else {
            ModuleKind::Standalone
        };

        let children: Vec<ChildModule> = parsed
            .modules
            .iter()
            .map(|name| {
                let path = base_path.join(name);
                let present = path.join(&self.options.descriptor_file).is_file();
                ChildModule {
                    name: name.clone(),
                    path,
                    present,
                }
            })
            .collect();

        let mut layers = BTreeMap::new();
        for child in &children {
            if let Some(slot) = layer_slot(&child.name) {
                layers.entry(slot.to_string()).or_insert_with(|| LayerInfo {
                    module_name: child.name.clone(),
                    path: child.path.clone(),
                    present: child.present,
                });
            }
        }

        let dependencies: BTreeSet<String> =
            parsed.dependencies.iter().map(|d| d.identifier()).collect();
        let has_sources = base_path.join("src").join("main").is_dir();

        Ok(ModuleDescriptor {
            artifact_id,
            group_id,
            kind,
            descriptor_path: descriptor_path.to_path_buf(),
            base_path,
            children,
            dependencies,
            layers,
            has_sources,
            descriptor: parsed,
        })
    }
}

impl Default for ModuleScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// The layer slot a child name fills: exact slot name or a `-<slot>` suffix.
pub fn layer_slot(name: &str) -> Option<&'static str> {
    LAYER_SLOTS
        .iter()
        .copied()
        .find(|slot| name == *slot || name.ends_with(&format!("-{slot}")))
}
