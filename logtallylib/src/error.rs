//! Error types for logtallylib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning a log stream.
///
/// Malformed lines are not errors: they are tallied as invalid and the
/// scan continues. Everything here aborts the scan.
#[derive(Error, Debug)]
pub enum LogtallyError {
    /// Failed to open or read a named input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Invalid scan or report option
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Scan was cancelled and the cancel policy discards partial results
    #[error("scan cancelled after {lines} lines")]
    Cancelled { lines: u64 },

    /// IO error on an unnamed stream (stdin)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
