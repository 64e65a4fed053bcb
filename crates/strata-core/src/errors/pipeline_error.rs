//! Pipeline errors.

use super::error_code::{self, StrataErrorCode};
use super::{ConfigError, ReportError, ScanError, TransactionError};

/// Fatal errors of a scan → evaluate → fix → report run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Pipeline cancelled")]
    Cancelled,
}

impl StrataErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Scan(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Transaction(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
