//! RxNorm RRF ingestion.
//!
//! This crate locates the release extracts, parses them into Polars
//! DataFrames with standardized column names, and keeps an optional Feather
//! snapshot of each parsed table.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use rxgraph_ingest::{SnapshotCache, discover_rrf_files};
//! use rxgraph_model::RrfKind;
//!
//! let inputs = discover_rrf_files(Path::new("rrf"))?;
//! let cache = SnapshotCache::new(true);
//! let conso = cache.load(inputs.path(RrfKind::Concept), RrfKind::Concept)?;
//! ```

mod discovery;
mod error;
mod reader;
mod snapshot;
mod standardize;

// === Error Types ===
pub use error::{IngestError, Result};

// === RRF Reading ===
pub use reader::{open_source, read_rrf, require_columns};
pub use standardize::{standardize_column_name, standardize_columns};

// === Snapshot Cache ===
pub use snapshot::{SnapshotCache, read_snapshot, snapshot_path, write_snapshot};

// === File Discovery ===
pub use discovery::{RrfInputs, discover_rrf_files, locate_rrf_files};
