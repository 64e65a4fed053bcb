//! StrataErrorCode trait for structured error codes.

/// Every error enum implements this to expose a stable error code string,
/// used by reports and by callers that branch on the failure class.
pub trait StrataErrorCode {
    /// Returns the error code string (e.g., "SCAN_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const RULE_ERROR: &str = "RULE_ERROR";
pub const FIX_ERROR: &str = "FIX_ERROR";
pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
pub const BACKUP_FAILED: &str = "BACKUP_FAILED";
pub const TRANSACTION_ERROR: &str = "TRANSACTION_ERROR";
pub const ROLLBACK_FAILED: &str = "ROLLBACK_FAILED";
pub const REPORT_ERROR: &str = "REPORT_ERROR";
pub const LOCK_ERROR: &str = "LOCK_ERROR";
pub const CANCELLED: &str = "CANCELLED";
