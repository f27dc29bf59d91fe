//! Columnar snapshot cache for parsed RRF tables.
//!
//! Parsing the full concept extract dominates a run, so the parsed table is
//! stored next to the source as a Feather (Arrow IPC) file and reused while
//! it is newer than the source.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, IpcReader, IpcWriter, SerReader, SerWriter};
use rxgraph_common::{text_column, text_frame};
use rxgraph_model::RrfKind;

use crate::error::{IngestError, Result};
use crate::reader::{read_rrf, require_columns};
use crate::standardize::standardize_columns;

const SNAPSHOT_EXTENSION: &str = "feather";

/// Snapshot location for an input file: `RXNCONSO.RRF.gz` maps to `RXNCONSO.RRF.feather`.
pub fn snapshot_path(input: &Path) -> PathBuf {
    input.with_extension(SNAPSHOT_EXTENSION)
}

/// Reads RRF tables, going through the snapshot cache when enabled.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotCache {
    enabled: bool,
}

impl SnapshotCache {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Loads `path` as a table of `kind`.
    ///
    /// A usable snapshot is returned directly. A stale or unreadable one is
    /// reported and the source is parsed again; the fresh table then replaces
    /// the snapshot. Failing to write the snapshot only produces a warning.
    pub fn load(&self, path: &Path, kind: RrfKind) -> Result<DataFrame> {
        if !self.enabled {
            return read_rrf(path, kind);
        }

        let snapshot = snapshot_path(path);
        if snapshot.is_file() {
            if is_stale(path, &snapshot) {
                tracing::warn!(
                    path = %snapshot.display(),
                    "snapshot is older than its source, reparsing"
                );
            } else {
                match read_snapshot(&snapshot, kind) {
                    Ok(df) => {
                        tracing::info!(
                            table = kind.table_name(),
                            path = %snapshot.display(),
                            rows = df.height(),
                            "loaded snapshot"
                        );
                        return Ok(df);
                    }
                    Err(err) => {
                        tracing::warn!(
                            path = %snapshot.display(),
                            error = %err,
                            "snapshot unusable, reparsing"
                        );
                    }
                }
            }
        }

        let df = read_rrf(path, kind)?;
        if let Err(err) = write_snapshot(&snapshot, &df) {
            tracing::warn!(path = %snapshot.display(), error = %err, "failed to write snapshot");
        }
        Ok(df)
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(true)
    }
}

fn is_stale(source: &Path, snapshot: &Path) -> bool {
    let modified = |path: &Path| std::fs::metadata(path).and_then(|meta| meta.modified());
    match (modified(source), modified(snapshot)) {
        (Ok(source_time), Ok(snapshot_time)) => source_time > snapshot_time,
        _ => false,
    }
}

/// Reads a snapshot, standardizes its column names and projects it to the schema of `kind`.
pub fn read_snapshot(path: &Path, kind: RrfKind) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut df = IpcReader::new(file)
        .finish()
        .map_err(|e| IngestError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    standardize_columns(&mut df)?;
    require_columns(&df, kind.table_name(), kind.headers())?;

    let mut columns = Vec::with_capacity(kind.headers().len());
    for name in kind.headers() {
        columns.push(((*name).to_string(), text_column(&df, name)?));
    }
    Ok(text_frame(columns)?)
}

/// Writes `df` as a Feather snapshot.
pub fn write_snapshot(path: &Path, df: &DataFrame) -> Result<()> {
    let snapshot_error = |message: String| IngestError::Snapshot {
        path: path.to_path_buf(),
        message,
    };
    let mut file = File::create(path).map_err(|e| snapshot_error(e.to_string()))?;
    let mut df = df.clone();
    IpcWriter::new(&mut file)
        .finish(&mut df)
        .map_err(|e| snapshot_error(e.to_string()))?;
    tracing::debug!(path = %path.display(), rows = df.height(), "wrote snapshot");
    Ok(())
}
