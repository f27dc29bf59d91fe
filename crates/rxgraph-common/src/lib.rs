//! Shared utilities for the RxNorm graph crates.
//!
//! Every table handled by the pipeline is a Polars `DataFrame` whose columns
//! hold text. This crate provides the small set of helpers used to read such
//! columns, rebuild frames from them, and filter rows with a keep mask.

pub mod frame;

// Re-export commonly used functions at crate root for convenience
pub use frame::{column_names, filter_rows, has_column, missing_columns, text_column, text_frame};
