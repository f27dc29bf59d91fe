//! RxNorm graph transformation.
//!
//! This crate turns parsed RRF tables into the node and edge tables of a
//! graph import:
//!
//! - **ndc**: product-code normalization to 11 digits
//! - **relationships**: per-type projection of the relation table
//! - **resolve**: generic/brand merge with duplicate resolution
//! - **graph**: node and edge assembly with referential gating

pub mod error;
pub mod graph;
pub mod ndc;
pub mod relationships;
pub mod resolve;

pub use error::{Result, TransformError};
pub use graph::{
    EdgeTable, GraphInputs, GraphModel, NodeTable, build_graph_model, medication_file_name,
    parent_tree_number, relation_file_name,
};
pub use ndc::normalize_ndc;
pub use relationships::{TYPE_COLUMN, relationship_map, relationship_maps};
pub use resolve::{ResolvedEntities, resolve_entities};
