//! Polars helpers for text tables.
//!
//! RRF extracts are read as text only, so the helpers here deal in
//! `Option<String>` cells: `None` is a null (an empty field in the source).

use polars::prelude::{
    BooleanChunked, Column, DataFrame, DataType, IntoColumn, NamedFrom, NewChunkedArray,
    PolarsResult, Series,
};

/// Returns the column names of a frame as owned strings, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Returns true if the frame has a column with exactly this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names()
        .into_iter()
        .any(|column| column.as_str() == name)
}

/// Lists the required columns that are absent from the frame, in the order given.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !has_column(df, name))
        .map(|name| (*name).to_string())
        .collect()
}

/// Reads a column as text cells, casting non-string columns first.
///
/// Empty strings are returned as `None` so that a frame built from a
/// source file and one loaded from a snapshot compare equal.
pub fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .iter()
        .map(|value| match value {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => None,
        })
        .collect();
    Ok(values)
}

/// Builds a frame of `String` columns from `(name, cells)` pairs.
///
/// All columns must have the same length.
pub fn text_frame(columns: Vec<(String, Vec<Option<String>>)>) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    DataFrame::new(columns)
}

/// Keeps the rows whose entry in `keep` is true.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    df.filter(&mask)
}
