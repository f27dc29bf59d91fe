//! Record of rows removed by data-quality rules during a run.
//!
//! Each stage, the file writers included, receives a `&mut DropLog` and
//! records how many rows a rule removed. Non-zero entries are also emitted
//! as `tracing` warnings so that nothing is dropped silently.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Second and later rows for the same normalized product code.
    DuplicateNdc,
    /// Second and later rows for the same node id.
    DuplicateId,
    /// Rows identical to an earlier row.
    DuplicateRow,
    /// Rows with an identical `(rxcui, brand_rxcui)` pair.
    DuplicateTradename,
    /// Later rows of a concept group with no brand concept to take over.
    MissingBrandConcept,
    /// Rows whose concept collides with an earlier row after substitution.
    ConceptCollision,
    /// Edges referencing a node absent from the emitted node sets.
    DanglingEndpoint,
    /// Semantic types whose parent tree position has no node.
    MissingParentType,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::DuplicateNdc => "duplicate_ndc",
            DropReason::DuplicateId => "duplicate_id",
            DropReason::DuplicateRow => "duplicate_row",
            DropReason::DuplicateTradename => "duplicate_tradename",
            DropReason::MissingBrandConcept => "missing_brand_concept",
            DropReason::ConceptCollision => "concept_collision",
            DropReason::DanglingEndpoint => "dangling_endpoint",
            DropReason::MissingParentType => "missing_parent_type",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Pipeline stage, e.g. `resolve` or `graph`.
    pub stage: String,
    /// Table or file the rule applied to.
    pub target: String,
    pub reason: DropReason,
    pub count: usize,
}

/// Ordered list of drop records for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropLog {
    entries: Vec<DropEntry>,
}

impl DropLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a drop and warns when `count` is non-zero.
    ///
    /// Zero counts are kept as well, so the report shows which rules ran.
    pub fn record(&mut self, stage: &str, target: &str, reason: DropReason, count: usize) {
        if count > 0 {
            tracing::warn!(stage, target, reason = %reason, dropped = count, "rows dropped");
        }
        self.entries.push(DropEntry {
            stage: stage.to_string(),
            target: target.to_string(),
            reason,
            count,
        });
    }

    pub fn entries(&self) -> &[DropEntry] {
        &self.entries
    }

    /// Sum of counts recorded for `target` with `reason`.
    pub fn count(&self, target: &str, reason: DropReason) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.target == target && entry.reason == reason)
            .map(|entry| entry.count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}
