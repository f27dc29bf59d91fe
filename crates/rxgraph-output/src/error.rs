//! Error types for bulk-import file writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to create, write or persist an output file.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV encoder failed.
    #[error("failed to encode {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// A node file has neither labels nor a `:LABEL` column.
    #[error("no label provided for the nodes in {path}")]
    MissingLabel { path: PathBuf },

    /// The configured id column is absent from a node table.
    #[error("id column '{column}' not found for {path}")]
    MissingIdColumn { path: PathBuf, column: String },

    /// A relationship file lacks a start id, an end id or a type.
    #[error("relationship file {path} is missing: {}", .missing.join(", "))]
    RelationshipContract { path: PathBuf, missing: Vec<String> },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for OutputError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
