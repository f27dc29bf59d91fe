//! Error types for graph transformation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Required columns are absent from an input table.
    #[error("table '{table}' is missing columns: {}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

/// Fails with one error naming every column of `required` absent from `df`.
pub(crate) fn require_columns(
    df: &polars::prelude::DataFrame,
    table: &str,
    required: &[&str],
) -> Result<()> {
    let missing = rxgraph_common::missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TransformError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        })
    }
}
