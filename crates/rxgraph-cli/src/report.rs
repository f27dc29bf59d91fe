//! The run report written next to the import files.
//!
//! The report lists file names rather than paths and carries no timestamps,
//! so two runs over the same inputs produce identical reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rxgraph_model::{DropEntry, DropLog, FileKind, WrittenFile};

pub const REPORT_FILE: &str = "import_report.json";

/// One written import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
    pub file: String,
    pub kind: FileKind,
    pub rows: usize,
}

/// Contents of `import_report.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub files: Vec<ReportFile>,
    pub drops: Vec<DropEntry>,
    /// Arguments for the bulk importer, relative to the output directory.
    pub import_args: Vec<String>,
}

impl ImportReport {
    pub fn new(files: &[WrittenFile], drops: &DropLog) -> Self {
        Self {
            files: files
                .iter()
                .map(|file| ReportFile {
                    file: file.file_name(),
                    kind: file.kind,
                    rows: file.rows,
                })
                .collect(),
            drops: drops.entries().to_vec(),
            import_args: import_args(files),
        }
    }

    pub fn node_rows(&self) -> usize {
        self.rows_of(FileKind::Nodes)
    }

    pub fn relationship_rows(&self) -> usize {
        self.rows_of(FileKind::Relationships)
    }

    fn rows_of(&self, kind: FileKind) -> usize {
        self.files
            .iter()
            .filter(|file| file.kind == kind)
            .map(|file| file.rows)
            .sum()
    }
}

/// `--nodes=<file>` and `--relationships=<file>` in write order.
pub fn import_args(files: &[WrittenFile]) -> Vec<String> {
    files
        .iter()
        .map(|file| match file.kind {
            FileKind::Nodes => format!("--nodes={}", file.file_name()),
            FileKind::Relationships => format!("--relationships={}", file.file_name()),
        })
        .collect()
}

/// Writes the report as pretty JSON into `output_dir`.
pub fn write_report(report: &ImportReport, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(REPORT_FILE);
    let mut json = serde_json::to_string_pretty(report).context("serialize import report")?;
    json.push('\n');
    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved import report");
    Ok(path)
}

/// Reads a report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<ImportReport> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgraph_model::DropReason;

    fn written(name: &str, kind: FileKind, rows: usize) -> WrittenFile {
        WrittenFile {
            path: PathBuf::from("out").join(name),
            kind,
            rows,
        }
    }

    #[test]
    fn test_import_args_follow_write_order() {
        let files = vec![
            written("ndc_nodes.csv.gz", FileKind::Nodes, 3),
            written("ndc_cui_relations.csv.gz", FileKind::Relationships, 2),
            written("rxcui_IN_nodes.csv.gz", FileKind::Nodes, 1),
        ];
        assert_eq!(
            import_args(&files),
            vec![
                "--nodes=ndc_nodes.csv.gz",
                "--relationships=ndc_cui_relations.csv.gz",
                "--nodes=rxcui_IN_nodes.csv.gz",
            ]
        );
    }

    #[test]
    fn test_report_totals_and_round_trip() {
        let files = vec![
            written("ndc_nodes.csv", FileKind::Nodes, 3),
            written("rxcui_IN_nodes.csv", FileKind::Nodes, 2),
            written("rel_contains.csv", FileKind::Relationships, 4),
        ];
        let mut drops = DropLog::new();
        drops.record("graph", "rel_contains.csv", DropReason::DanglingEndpoint, 1);
        let report = ImportReport::new(&files, &drops);
        assert_eq!(report.node_rows(), 5);
        assert_eq!(report.relationship_rows(), 4);
        assert_eq!(report.files[0].file, "ndc_nodes.csv");

        let dir = tempfile::TempDir::new().unwrap();
        let path = write_report(&report, dir.path()).unwrap();
        assert_eq!(read_report(&path).unwrap(), report);
    }
}
