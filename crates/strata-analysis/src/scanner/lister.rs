//! Directory listing: finds descriptor files below the project root.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use strata_core::constants::{
    DEFAULT_BACKUP_DIR, DEFAULT_DESCRIPTOR_FILE, DEFAULT_EXCLUDED_DIRS, DEFAULT_MAX_DEPTH,
};
use strata_core::errors::ScanError;

/// What the lister looks for and where it must not look.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub descriptor_file: String,
    /// Maximum depth of a module directory below the root (root = 0).
    pub max_depth: usize,
    /// Directory names pruned from the walk.
    pub exclude: Vec<String>,
    /// Staging directory name, always pruned.
    pub backup_dir: String,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            exclude: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            backup_dir: DEFAULT_BACKUP_DIR.to_string(),
        }
    }
}

/// Lists descriptor files under a root. Injectable for tests and for
/// callers that already know their module layout.
pub trait DirectoryLister: Send + Sync {
    /// Returns descriptor paths ordered parent-before-child.
    fn descriptor_files(&self, root: &Path, options: &ListOptions) -> Result<Vec<PathBuf>, ScanError>;
}

/// Default lister backed by `ignore::WalkBuilder`. Hidden directories, the
/// staging directory and excluded names are pruned; VCS ignore files are not
/// consulted, since module layout is independent of what git tracks.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkDirectoryLister;

impl DirectoryLister for WalkDirectoryLister {
    fn descriptor_files(&self, root: &Path, options: &ListOptions) -> Result<Vec<PathBuf>, ScanError> {
        let exclude = options.exclude.clone();
        let backup_dir = options.backup_dir.clone();

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .max_depth(Some(options.max_depth + 1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if !is_dir || entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                name != backup_dir.as_str() && !exclude.iter().any(|e| e.as_str() == name)
            });

        let mut found = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|t| t.is_file());
                    if is_file && entry.file_name() == options.descriptor_file.as_str() {
                        found.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                }
            }
        }

        found.sort_by(|a, b| a.parent().cmp(&b.parent()));
        Ok(found)
    }
}
