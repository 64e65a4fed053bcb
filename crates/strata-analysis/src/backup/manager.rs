//! Backup manager: owns the staging area and the in-flight transaction registry.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strata_core::config::FixConfig;
use strata_core::constants::{BACKUP_SUFFIX, DEFAULT_BACKUP_DIR};
use strata_core::errors::TransactionError;

use super::transaction::Transaction;
use super::types::{BackupRecord, RestoreRecord, TransactionState};

/// Staged backups live at `<root>/<backup_dir>/<relative path>.bak`. The
/// first transaction to stage a file takes that slot; later transactions
/// stage at `<relative path>.<transaction id>.bak` so a kept copy is never
/// overwritten or discarded by someone else's rollback.
///
/// Cloning is cheap; clones share the staging area and the registry.
#[derive(Debug, Clone)]
pub struct BackupManager {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    project_root: PathBuf,
    staging_dir: PathBuf,
    transactions: Mutex<HashMap<String, TransactionState>>,
}

impl BackupManager {
    /// `backup_dir` must be a relative path of plain names below the root.
    pub fn new(project_root: impl Into<PathBuf>, backup_dir: &str) -> Result<Self, TransactionError> {
        let relative = Path::new(backup_dir);
        let plain = relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain || relative.components().next().is_none() {
            return Err(TransactionError::InvalidStagingDir {
                path: PathBuf::from(backup_dir),
            });
        }
        Ok(Self::unchecked(project_root.into(), relative))
    }

    pub fn with_default_dir(project_root: impl Into<PathBuf>) -> Self {
        Self::unchecked(project_root.into(), Path::new(DEFAULT_BACKUP_DIR))
    }

    pub fn from_config(project_root: impl Into<PathBuf>, config: &FixConfig) -> Result<Self, TransactionError> {
        Self::new(project_root, config.effective_backup_dir())
    }

    fn unchecked(project_root: PathBuf, backup_dir: &Path) -> Self {
        let staging_dir = project_root.join(backup_dir);
        Self {
            inner: Arc::new(Inner {
                project_root,
                staging_dir,
                transactions: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.inner.project_root
    }

    pub fn staging_dir(&self) -> &Path {
        &self.inner.staging_dir
    }

    /// Where `path` is staged, or `None` when it lies outside the project root.
    pub fn staging_path(&self, path: &Path) -> Option<PathBuf> {
        self.staged_as(path, None)
    }

    /// Where transaction `id` stages `path` when the shared slot is taken.
    pub fn transaction_staging_path(&self, path: &Path, id: &str) -> Option<PathBuf> {
        self.staged_as(path, Some(id))
    }

    fn staged_as(&self, path: &Path, id: Option<&str>) -> Option<PathBuf> {
        let relative = self.relative_to_root(path)?;
        let mut staged = self.inner.staging_dir.join(relative);
        let mut name = staged.file_name()?.to_os_string();
        if let Some(id) = id {
            name.push(".");
            name.push(id);
        }
        name.push(BACKUP_SUFFIX);
        staged.set_file_name(name);
        Some(staged)
    }

    fn relative_to_root(&self, path: &Path) -> Option<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.inner.project_root.join(path)
        };
        let relative = absolute.strip_prefix(&self.inner.project_root).ok()?;
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        (clean && relative.file_name().is_some()).then(|| relative.to_path_buf())
    }

    /// Copy `path` into the staging area. Missing, non-regular, or
    /// out-of-root paths give an unsuccessful record.
    pub fn backup(&self, path: &Path) -> BackupRecord {
        match self.staging_path(path) {
            Some(staged) => self.stage(path, staged),
            None => self.stage_rejected(path),
        }
    }

    /// Stage `path` on behalf of transaction `id`, never touching a staged
    /// copy that already exists.
    pub(crate) fn backup_for(&self, path: &Path, id: &str) -> BackupRecord {
        let (Some(shared), Some(own)) = (self.staging_path(path), self.transaction_staging_path(path, id)) else {
            return self.stage_rejected(path);
        };
        if shared.exists() {
            self.stage(path, own)
        } else {
            self.stage(path, shared)
        }
    }

    fn stage_rejected(&self, path: &Path) -> BackupRecord {
        if !path.is_file() {
            return BackupRecord::failed(path.to_path_buf(), "not an existing regular file");
        }
        BackupRecord::failed(path.to_path_buf(), "outside the project root")
    }

    fn stage(&self, path: &Path, staged: PathBuf) -> BackupRecord {
        let original = path.to_path_buf();
        if !path.is_file() {
            return BackupRecord::failed(original, "not an existing regular file");
        }
        if let Some(parent) = staged.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return BackupRecord::failed(original, format!("cannot create staging directory: {e}"));
            }
        }
        match fs::copy(path, &staged) {
            Ok(_) => {
                tracing::debug!(path = %path.display(), backup = %staged.display(), "backup staged");
                BackupRecord::staged(original, staged)
            }
            Err(e) => BackupRecord::failed(original, format!("copy failed: {e}")),
        }
    }

    /// Copy the staged backup of `path` back over it. The staged copy is kept.
    pub fn restore(&self, path: &Path) -> RestoreRecord {
        let original = path.to_path_buf();
        let Some(staged) = self.staging_path(path) else {
            return RestoreRecord::failed(original, "outside the project root");
        };
        if !staged.is_file() {
            return RestoreRecord::failed(original, "no backup exists");
        }
        match fs::copy(&staged, path) {
            Ok(_) => RestoreRecord::ok(original),
            Err(e) => RestoreRecord::failed(original, format!("restore failed: {e}")),
        }
    }

    /// Delete one staged backup and any staging directories it leaves empty.
    pub(crate) fn discard(&self, staged: &Path) -> std::io::Result<()> {
        match fs::remove_file(staged) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.prune_empty_dirs(staged.parent());
        Ok(())
    }

    fn prune_empty_dirs(&self, mut dir: Option<&Path>) {
        while let Some(d) = dir {
            if !d.starts_with(&self.inner.staging_dir) {
                break;
            }
            // Fails on a non-empty directory, which ends the walk.
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }

    /// Open a new Active transaction bound to this manager.
    pub fn begin_transaction(&self) -> Transaction {
        let id = uuid::Uuid::new_v4().to_string();
        self.registry().insert(id.clone(), TransactionState::Active);
        tracing::debug!(transaction = %id, "transaction opened");
        Transaction::new(id, self.clone())
    }

    pub(crate) fn set_state(&self, id: &str, state: TransactionState) {
        self.registry().insert(id.to_string(), state);
    }

    /// Ids of transactions not yet committed or rolled back, sorted.
    pub fn active_transactions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .registry()
            .iter()
            .filter(|(_, state)| **state == TransactionState::Active)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn transaction_state(&self, id: &str) -> Option<TransactionState> {
        self.registry().get(id).copied()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<String, TransactionState>> {
        self.inner
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Every staged backup file, sorted. Files without the backup suffix
    /// are not staged copies and are ignored.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, TransactionError> {
        let mut found = Vec::new();
        if self.inner.staging_dir.is_dir() {
            collect_files(&self.inner.staging_dir, &mut found)?;
        }
        found.sort();
        Ok(found)
    }

    /// Delete every staged backup, then any staging directories left
    /// empty. Returns the number of backups removed.
    pub fn cleanup(&self) -> Result<usize, TransactionError> {
        let backups = self.list_backups()?;
        for staged in &backups {
            self.discard(staged).map_err(|source| TransactionError::Io {
                path: staged.clone(),
                source,
            })?;
        }
        tracing::info!(removed = backups.len(), "staged backups cleaned up");
        Ok(backups.len())
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), TransactionError> {
    let io_err = |source| TransactionError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_err)?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() && path.to_string_lossy().ends_with(BACKUP_SUFFIX) {
            out.push(path);
        }
    }
    Ok(())
}
