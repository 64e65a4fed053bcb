//! Multi-file transactions with rollback on drop.

use std::fs;
use std::path::{Path, PathBuf};

use strata_core::errors::TransactionError;

use super::manager::BackupManager;
use super::types::{BackupRecord, RestoreRecord, TransactionState};

/// A scoped set of backups. Dropping a transaction that is still Active
/// rolls it back, so an early return or a panic never leaves a
/// half-applied change behind.
#[derive(Debug)]
pub struct Transaction {
    id: String,
    manager: BackupManager,
    records: Vec<BackupRecord>,
    state: TransactionState,
}

impl Transaction {
    pub(crate) fn new(id: String, manager: BackupManager) -> Self {
        Self {
            id,
            manager,
            records: Vec::new(),
            state: TransactionState::Active,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[BackupRecord] {
        &self.records
    }

    pub fn manager(&self) -> &BackupManager {
        &self.manager
    }

    fn ensure_active(&self) -> Result<(), TransactionError> {
        if self.state == TransactionState::Active {
            Ok(())
        } else {
            Err(TransactionError::NotActive {
                id: self.id.clone(),
                state: self.state.to_string(),
            })
        }
    }

    fn existing(&self, path: &Path) -> Option<&BackupRecord> {
        self.records
            .iter()
            .find(|r| r.success && r.original == path)
    }

    /// Stage `path` and record it. A path already staged by this transaction
    /// keeps its first record, so rollback restores pre-transaction bytes.
    /// Unsuccessful records are returned but not kept.
    pub fn backup(&mut self, path: &Path) -> Result<BackupRecord, TransactionError> {
        self.ensure_active()?;
        if let Some(record) = self.existing(path) {
            return Ok(record.clone());
        }
        let record = self.manager.backup_for(path, &self.id);
        if record.success {
            self.records.push(record.clone());
        } else {
            tracing::warn!(
                transaction = %self.id,
                path = %path.display(),
                reason = record.message.as_deref().unwrap_or(""),
                "backup failed"
            );
        }
        Ok(record)
    }

    /// Record that this transaction is about to create `path`; rollback deletes it.
    pub fn track_created(&mut self, path: &Path) -> Result<BackupRecord, TransactionError> {
        self.ensure_active()?;
        if let Some(record) = self.existing(path) {
            return Ok(record.clone());
        }
        let record = BackupRecord::created(path.to_path_buf());
        self.records.push(record.clone());
        Ok(record)
    }

    /// Mark committed. Staged backups are kept for audit until cleanup.
    pub fn commit(&mut self) -> Result<(), TransactionError> {
        self.ensure_active()?;
        self.state = TransactionState::Committed;
        self.manager.set_state(&self.id, self.state);
        tracing::debug!(transaction = %self.id, files = self.records.len(), "transaction committed");
        Ok(())
    }

    /// Restore every recorded file in reverse order and delete the staged
    /// copies this transaction made. Files the transaction created are
    /// deleted.
    ///
    /// Any per-file failure yields `RollbackFailed`; the transaction is
    /// RolledBack either way.
    pub fn rollback(&mut self) -> Result<Vec<RestoreRecord>, TransactionError> {
        match self.state {
            TransactionState::Active => {}
            TransactionState::Committed => {
                return Err(TransactionError::RollbackAfterCommit {
                    id: self.id.clone(),
                })
            }
            TransactionState::RolledBack => self.ensure_active()?,
        }

        let mut restored = Vec::with_capacity(self.records.len());
        let mut failures = Vec::new();
        for record in self.records.iter().rev() {
            let outcome = self.undo(record);
            if !outcome.success {
                failures.push(format!(
                    "{}: {}",
                    outcome.path.display(),
                    outcome.message.as_deref().unwrap_or("unknown failure")
                ));
            }
            restored.push(outcome);
        }

        self.state = TransactionState::RolledBack;
        self.manager.set_state(&self.id, self.state);

        if failures.is_empty() {
            tracing::info!(transaction = %self.id, files = restored.len(), "transaction rolled back");
            Ok(restored)
        } else {
            tracing::error!(transaction = %self.id, failed = failures.len(), "rollback incomplete");
            Err(TransactionError::RollbackFailed {
                id: self.id.clone(),
                failures,
            })
        }
    }

    fn undo(&self, record: &BackupRecord) -> RestoreRecord {
        let path: PathBuf = record.original.clone();
        match &record.backup {
            None => match fs::remove_file(&path) {
                Ok(()) => RestoreRecord::ok(path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => RestoreRecord::ok(path),
                Err(e) => RestoreRecord::failed(path, format!("cannot delete created file: {e}")),
            },
            Some(staged) => {
                if let Err(e) = fs::copy(staged, &path) {
                    return RestoreRecord::failed(path, format!("restore failed: {e}"));
                }
                match self.manager.discard(staged) {
                    Ok(()) => RestoreRecord::ok(path),
                    Err(e) => RestoreRecord::failed(
                        path,
                        format!("restored, but staged copy not removed: {e}"),
                    ),
                }
            }
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state != TransactionState::Active {
            return;
        }
        tracing::warn!(transaction = %self.id, "transaction released without commit, rolling back");
        if let Err(e) = self.rollback() {
            tracing::error!(transaction = %self.id, error = %e, "rollback on release failed");
        }
    }
}
