//! Error types for node construction and path parsing.

use std::str::Utf8Error;
use thiserror::Error;

/// Errors raised while building nodes or parsing paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A key was supplied as bytes that are not valid UTF-8.
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(#[from] Utf8Error),

    /// A textual path could not be parsed.
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },
}

impl Error {
    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
