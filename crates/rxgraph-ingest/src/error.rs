//! Error types for RRF ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating and reading RRF extracts.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RRF file not found.
    #[error("RRF file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more of the required extracts is absent.
    #[error("missing RRF inputs: {}", .files.join(", "))]
    MissingInputs { files: Vec<String> },

    // === Parsing Errors ===
    /// The delimited reader failed (bad gzip stream, I/O error mid-file).
    #[error("failed to parse {path}: {message}")]
    RrfParse { path: PathBuf, message: String },

    // === Schema Errors ===
    /// Required columns are absent from a table.
    #[error("table '{table}' is missing columns: {}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    // === Snapshot Errors ===
    /// A snapshot could not be read or written.
    #[error("snapshot {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
