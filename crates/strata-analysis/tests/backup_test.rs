//! Tests for the backup manager and transactions.

mod common;

use std::fs;

use common::Project;
use strata_analysis::backup::{BackupManager, TransactionState};
use strata_core::errors::TransactionError;

fn manager(p: &Project) -> BackupManager {
    BackupManager::with_default_dir(p.root())
}

#[test]
fn backup_mirrors_relative_path_with_suffix() {
    let p = Project::new();
    let file = p.file("billing/pom.xml", "<project/>");
    let record = manager(&p).backup(&file);

    assert!(record.success);
    let staged = record.backup.unwrap();
    assert_eq!(staged, p.path(".strata-backups/billing/pom.xml.bak"));
    assert_eq!(fs::read_to_string(staged).unwrap(), "<project/>");
}

#[test]
fn backup_of_missing_file_is_unsuccessful_record() {
    let p = Project::new();
    let record = manager(&p).backup(&p.path("nope.xml"));
    assert!(!record.success);
    assert!(record.backup.is_none());
    assert!(record.message.is_some());
}

#[test]
fn backup_of_directory_is_unsuccessful_record() {
    let p = Project::new();
    let dir = p.dir("module");
    assert!(!manager(&p).backup(&dir).success);
}

#[test]
fn backup_outside_root_is_unsuccessful_record() {
    let p = Project::new();
    let outside = tempfile::NamedTempFile::new().unwrap();
    let record = manager(&p).backup(outside.path());
    assert!(!record.success);
    assert_eq!(record.message.as_deref(), Some("outside the project root"));
}

#[test]
fn restore_copies_backup_back() {
    let p = Project::new();
    let file = p.file("pom.xml", "original");
    let m = manager(&p);
    m.backup(&file);
    fs::write(&file, "changed").unwrap();

    let restored = m.restore(&file);
    assert!(restored.success);
    assert_eq!(p.read("pom.xml"), "original");
}

#[test]
fn restore_without_backup_fails() {
    let p = Project::new();
    let file = p.file("pom.xml", "x");
    let restored = manager(&p).restore(&file);
    assert!(!restored.success);
}

#[test]
fn rollback_restores_all_files_and_removes_backups() {
    let p = Project::new();
    let a = p.file("a/pom.xml", "A original");
    let b = p.file("b/pom.xml", "B original");
    let m = manager(&p);

    let mut tx = m.begin_transaction();
    assert!(tx.backup(&a).unwrap().success);
    assert!(tx.backup(&b).unwrap().success);
    fs::write(&a, "A changed").unwrap();
    fs::write(&b, "B changed").unwrap();

    let restored = tx.rollback().unwrap();
    // Reverse insertion order.
    assert_eq!(restored[0].path, b);
    assert_eq!(restored[1].path, a);
    assert_eq!(p.read("a/pom.xml"), "A original");
    assert_eq!(p.read("b/pom.xml"), "B original");
    assert!(m.list_backups().unwrap().is_empty());
    assert_eq!(tx.state(), TransactionState::RolledBack);
}

#[test]
fn repeated_backup_keeps_pre_transaction_bytes() {
    let p = Project::new();
    let file = p.file("pom.xml", "v1");
    let mut tx = manager(&p).begin_transaction();

    tx.backup(&file).unwrap();
    fs::write(&file, "v2").unwrap();
    tx.backup(&file).unwrap();
    fs::write(&file, "v3").unwrap();
    assert_eq!(tx.records().len(), 1);

    tx.rollback().unwrap();
    assert_eq!(p.read("pom.xml"), "v1");
}

#[test]
fn commit_keeps_staged_backups() {
    let p = Project::new();
    let file = p.file("pom.xml", "x");
    let m = manager(&p);
    let mut tx = m.begin_transaction();
    tx.backup(&file).unwrap();
    tx.commit().unwrap();

    assert_eq!(tx.state(), TransactionState::Committed);
    assert_eq!(m.list_backups().unwrap(), vec![p.path(".strata-backups/pom.xml.bak")]);
}

#[test]
fn rollback_after_commit_fails_loudly() {
    let p = Project::new();
    let m = manager(&p);
    let mut tx = m.begin_transaction();
    tx.commit().unwrap();
    let err = tx.rollback().unwrap_err();
    assert!(matches!(err, TransactionError::RollbackAfterCommit { .. }));
    assert!(!err.is_fatal());
}

#[test]
fn finished_transaction_rejects_backups() {
    let p = Project::new();
    let file = p.file("pom.xml", "x");
    let mut tx = manager(&p).begin_transaction();
    tx.rollback().unwrap();
    assert!(matches!(tx.backup(&file), Err(TransactionError::NotActive { .. })));
    assert!(matches!(tx.commit(), Err(TransactionError::NotActive { .. })));
}

#[test]
fn dropping_active_transaction_rolls_back() {
    let p = Project::new();
    let file = p.file("pom.xml", "before");
    let m = manager(&p);
    let id = {
        let mut tx = m.begin_transaction();
        tx.backup(&file).unwrap();
        fs::write(&file, "after").unwrap();
        tx.id().to_string()
    };

    assert_eq!(p.read("pom.xml"), "before");
    assert_eq!(m.transaction_state(&id), Some(TransactionState::RolledBack));
    assert!(m.list_backups().unwrap().is_empty());
}

#[test]
fn dropping_committed_transaction_keeps_changes() {
    let p = Project::new();
    let file = p.file("pom.xml", "before");
    let m = manager(&p);
    {
        let mut tx = m.begin_transaction();
        tx.backup(&file).unwrap();
        fs::write(&file, "after").unwrap();
        tx.commit().unwrap();
    }
    assert_eq!(p.read("pom.xml"), "after");
}

#[test]
fn created_files_are_deleted_on_rollback() {
    let p = Project::new();
    let created = p.path("new/README.md");
    let mut tx = manager(&p).begin_transaction();
    let record = tx.track_created(&created).unwrap();
    assert!(record.is_created());
    p.file("new/README.md", "hello");

    tx.rollback().unwrap();
    assert!(!created.exists());
}

#[test]
fn registry_tracks_in_flight_transactions() {
    let p = Project::new();
    let m = manager(&p);
    let mut first = m.begin_transaction();
    let second = m.begin_transaction();
    assert_ne!(first.id(), second.id());

    let mut active = vec![first.id().to_string(), second.id().to_string()];
    active.sort();
    assert_eq!(m.active_transactions(), active);

    first.commit().unwrap();
    assert_eq!(m.active_transactions(), vec![second.id().to_string()]);
    assert_eq!(m.transaction_state(first.id()), Some(TransactionState::Committed));

    let clone = m.clone();
    assert_eq!(clone.active_transactions().len(), 1);
}

#[test]
fn cleanup_removes_staging_area() {
    let p = Project::new();
    let m = manager(&p);
    for rel in ["a/pom.xml", "b/c/pom.xml", "pom.xml"] {
        let file = p.file(rel, rel);
        assert!(m.backup(&file).success);
    }
    assert_eq!(m.list_backups().unwrap().len(), 3);

    assert_eq!(m.cleanup().unwrap(), 3);
    assert!(!m.staging_dir().exists());
    assert_eq!(m.cleanup().unwrap(), 0);
}

#[test]
fn staging_dir_must_be_plain_names_below_root() {
    let p = Project::new();
    for dir in [".", "", "a/..", "../out", "./"] {
        let err = BackupManager::new(p.root(), dir).unwrap_err();
        assert!(matches!(err, TransactionError::InvalidStagingDir { .. }), "{dir:?}");
    }
    let m = BackupManager::new(p.root(), "build/staging").unwrap();
    assert_eq!(m.staging_dir(), p.path("build/staging"));
}

#[test]
fn cleanup_only_deletes_staged_copies() {
    let p = Project::new();
    p.file("tools/notes.txt", "keep");
    p.file("tools/nested/readme.md", "keep");
    let m = BackupManager::new(p.root(), "tools").unwrap();
    let file = p.file("billing/pom.xml", "x");
    assert!(m.backup(&file).success);
    assert_eq!(m.list_backups().unwrap(), vec![p.path("tools/billing/pom.xml.bak")]);

    assert_eq!(m.cleanup().unwrap(), 1);
    assert_eq!(p.read("tools/notes.txt"), "keep");
    assert_eq!(p.read("tools/nested/readme.md"), "keep");
    assert!(!p.path("tools/billing").exists());
    assert_eq!(p.read("billing/pom.xml"), "x");
}

#[test]
fn later_rollback_keeps_committed_backup() {
    let p = Project::new();
    let file = p.file("pom.xml", "ORIGINAL");
    let m = manager(&p);
    let shared = p.path(".strata-backups/pom.xml.bak");

    let mut first = m.begin_transaction();
    first.backup(&file).unwrap();
    fs::write(&file, "AFTER-FIX-1").unwrap();
    first.commit().unwrap();

    let mut second = m.begin_transaction();
    let record = second.backup(&file).unwrap();
    assert_ne!(record.backup.as_deref(), Some(shared.as_path()));
    fs::write(&file, "AFTER-FIX-2").unwrap();
    second.rollback().unwrap();

    assert_eq!(p.read("pom.xml"), "AFTER-FIX-1");
    assert_eq!(fs::read_to_string(&shared).unwrap(), "ORIGINAL");
    assert_eq!(m.list_backups().unwrap(), vec![shared]);
}

#[test]
fn each_committed_transaction_keeps_its_own_copy() {
    let p = Project::new();
    let file = p.file("pom.xml", "v1");
    let m = manager(&p);

    for next in ["v2", "v3"] {
        let mut tx = m.begin_transaction();
        tx.backup(&file).unwrap();
        fs::write(&file, next).unwrap();
        tx.commit().unwrap();
    }

    let backups = m.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    let contents: Vec<String> = backups.iter().map(|b| fs::read_to_string(b).unwrap()).collect();
    assert!(contents.contains(&"v1".to_string()));
    assert!(contents.contains(&"v2".to_string()));
    assert_eq!(fs::read_to_string(p.path(".strata-backups/pom.xml.bak")).unwrap(), "v1");

    assert!(m.restore(&file).success);
    assert_eq!(p.read("pom.xml"), "v1");
}
