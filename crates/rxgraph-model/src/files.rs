//! Descriptions of the bulk-import files produced by the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Describes how a node table is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFileSpec {
    /// File name without compression suffix, e.g. `ndc_nodes.csv`.
    pub name: String,
    /// Column holding the node id. Becomes `<id>:ID(<first label>)`.
    pub id_column: Option<String>,
    /// Node labels; the first one names the id space.
    pub labels: Vec<String>,
}

impl NodeFileSpec {
    pub fn new(name: impl Into<String>, id_column: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            name: name.into(),
            id_column: Some(id_column.into()),
            labels: labels.iter().map(|label| (*label).to_string()).collect(),
        }
    }

    /// Id space of the node file, i.e. the upper-cased first label.
    pub fn id_space(&self) -> Option<String> {
        self.labels.first().map(|label| label.to_uppercase())
    }
}

/// Describes how a relationship table is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipFileSpec {
    pub name: String,
    pub start_column: String,
    /// Id space of the start node.
    pub start_label: String,
    pub end_column: String,
    pub end_label: String,
    /// Type used when the table carries no `:TYPE` column.
    pub rela_type: Option<String>,
}

impl RelationshipFileSpec {
    pub fn new(
        name: impl Into<String>,
        (start_column, start_label): (&str, &str),
        (end_column, end_label): (&str, &str),
    ) -> Self {
        Self {
            name: name.into(),
            start_column: start_column.to_string(),
            start_label: start_label.to_string(),
            end_column: end_column.to_string(),
            end_label: end_label.to_string(),
            rela_type: None,
        }
    }

    pub fn with_type(mut self, rela_type: impl Into<String>) -> Self {
        self.rela_type = Some(rela_type.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Nodes,
    Relationships,
}

/// A file persisted by one of the writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub kind: FileKind,
    /// Data rows written, excluding the header.
    pub rows: usize,
}

impl WrittenFile {
    /// File name as it appears in the output directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
