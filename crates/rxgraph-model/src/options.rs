//! Configuration options for the graph-import pipeline.
//!
//! Every field has a default matching the RxNorm release conventions, so an
//! empty TOML file (or none at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options for merging generic and brand concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionOptions {
    /// Only rows from this source vocabulary are considered authoritative.
    pub trusted_source: String,
    /// Term type of ingredient concepts.
    pub ingredient_tty: String,
    /// Term-type prefix of clinical (generic) drugs, e.g. `SCD`, `SCDC`.
    pub clinical_drug_prefix: String,
    /// Term type of brand names.
    pub brand_name_tty: String,
    /// Term-type prefix of branded drugs, e.g. `SBD`, `SBDC`.
    pub branded_drug_prefix: String,
    /// Value of the `suppress` column for rows that are not suppressed.
    pub not_suppressed_flag: String,
    /// Relation linking a brand concept to its generic concept.
    pub tradename_relation: String,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            trusted_source: "RXNORM".to_string(),
            ingredient_tty: "IN".to_string(),
            clinical_drug_prefix: "SCD".to_string(),
            brand_name_tty: "BN".to_string(),
            branded_drug_prefix: "SBD".to_string(),
            not_suppressed_flag: "N".to_string(),
            tradename_relation: "has_tradename".to_string(),
        }
    }
}

/// Options for assembling nodes and edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Relation types exported as `rel_<type>.csv` edge files.
    pub relation_types: Vec<String>,
    /// Attribute name (`atn`) carrying product codes.
    pub ndc_attribute: String,
    /// Edge type from a product code to its concept.
    pub ndc_relation_type: String,
    pub medication_label: String,
    pub ndc_label: String,
    pub sty_label: String,
    /// Edge type from a concept to its semantic type.
    pub semantic_type_relation: String,
    /// Edge type from a semantic type to its parent in the type tree.
    pub semantic_tree_relation: String,
    /// Emit concept-to-type and type-hierarchy edges.
    pub semantic_type_edges: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            relation_types: ["consists_of", "has_ingredient", "contains", "has_tradename"]
                .into_iter()
                .map(String::from)
                .collect(),
            ndc_attribute: "NDC".to_string(),
            ndc_relation_type: "aka".to_string(),
            medication_label: "RXCUI".to_string(),
            ndc_label: "NDC".to_string(),
            sty_label: "STY".to_string(),
            semantic_type_relation: "has_semantic_type".to_string(),
            semantic_tree_relation: "isa".to_string(),
            semantic_type_edges: true,
        }
    }
}

/// Options for the written import files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    /// Gzip every file and append `.gz` to its name.
    pub compress: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            compress: false,
        }
    }
}

/// Options for the columnar snapshot cache next to each input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    pub snapshots: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { snapshots: true }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub resolution: ResolutionOptions,
    pub graph: GraphOptions,
    pub output: OutputOptions,
    pub cache: CacheOptions,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a TOML file; missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.output_dir = dir.into();
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.output.compress = compress;
        self
    }

    pub fn with_snapshots(mut self, enabled: bool) -> Self {
        self.cache.snapshots = enabled;
        self
    }

    pub fn with_trusted_source(mut self, source: impl Into<String>) -> Self {
        self.resolution.trusted_source = source.into();
        self
    }
}
