//! Error types for checking a source file.
//!
//! Missing headers, cycles and malformed literals are not errors: they are
//! recovered locally and, where useful, reported as diagnostics.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    MainFileNotFound { path: PathBuf },

    #[error("{path}:{line}: {message}")]
    Config {
        path: PathBuf,
        line: usize,
        message: String,
    },
}
