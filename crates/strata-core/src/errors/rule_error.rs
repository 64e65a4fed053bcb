//! Rule evaluation errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};

/// Exceptional conditions hit while evaluating a rule against a module.
/// The engine converts these into Configuration-category violations.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Rule evaluation failed: {0}")]
    EvaluationFailed(String),
}

impl StrataErrorCode for RuleError {
    fn error_code(&self) -> &'static str {
        error_code::RULE_ERROR
    }
}
