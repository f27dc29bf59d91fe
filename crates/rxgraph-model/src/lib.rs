//! Shared definitions for the RxNorm graph pipeline.
//!
//! - [`RrfKind`]: the four RRF extracts and their column schemas.
//! - [`PipelineOptions`]: TOML-loadable configuration.
//! - [`NodeFileSpec`] / [`RelationshipFileSpec`]: how tables are written.
//! - [`DropLog`]: rows removed by data-quality rules.

pub mod drop_log;
pub mod error;
pub mod files;
pub mod options;
pub mod rrf;

pub use drop_log::{DropEntry, DropLog, DropReason};
pub use error::{ModelError, Result};
pub use files::{FileKind, NodeFileSpec, RelationshipFileSpec, WrittenFile};
pub use options::{CacheOptions, GraphOptions, OutputOptions, PipelineOptions, ResolutionOptions};
pub use rrf::RrfKind;
