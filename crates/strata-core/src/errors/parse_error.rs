//! Build descriptor parse errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};

/// Errors raised while reading or parsing a module's build descriptor.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Cannot read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed descriptor {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Descriptor {path} is missing required element <{element}>")]
    MissingElement { path: PathBuf, element: String },
}

impl StrataErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        error_code::PARSE_ERROR
    }
}
