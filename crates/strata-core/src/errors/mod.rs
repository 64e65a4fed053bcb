//! Error handling for Strata.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod fix_error;
pub mod parse_error;
pub mod pipeline_error;
pub mod report_error;
pub mod rule_error;
pub mod scan_error;
pub mod transaction_error;

pub use config_error::ConfigError;
pub use error_code::StrataErrorCode;
pub use fix_error::FixError;
pub use parse_error::ParseError;
pub use pipeline_error::PipelineError;
pub use report_error::ReportError;
pub use rule_error::RuleError;
pub use scan_error::ScanError;
pub use transaction_error::TransactionError;
