//! Bulk-import file writers.
//!
//! Serializes node and relationship tables to the CSV layout expected by the
//! graph database's offline importer, plain or gzip-compressed.

pub mod error;
mod table;
pub mod writer;

pub use error::{OutputError, Result};
pub use writer::{
    LABEL_COLUMN, TYPE_COLUMN, label_value, output_path, standardize_relationship_header,
    write_node_file, write_relationship_file,
};
