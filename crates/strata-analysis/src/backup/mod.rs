//! Backup / transaction manager: staged copies of files about to be
//! mutated, and multi-file transactions that roll back unless committed.

pub mod manager;
pub mod transaction;
pub mod types;

pub use manager::BackupManager;
pub use transaction::Transaction;
pub use types::{BackupRecord, RestoreRecord, TransactionState};
