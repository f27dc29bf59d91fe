//! Locating the RRF extracts of a release directory.

use std::path::{Path, PathBuf};

use rxgraph_model::RrfKind;

use crate::error::{IngestError, Result};

/// Paths of the four extracts consumed by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrfInputs {
    pub conso: PathBuf,
    pub rel: PathBuf,
    pub sat: PathBuf,
    pub sty: PathBuf,
}

impl RrfInputs {
    pub fn new(conso: PathBuf, rel: PathBuf, sat: PathBuf, sty: PathBuf) -> Self {
        Self {
            conso,
            rel,
            sat,
            sty,
        }
    }

    pub fn path(&self, kind: RrfKind) -> &Path {
        match kind {
            RrfKind::Concept => &self.conso,
            RrfKind::Relation => &self.rel,
            RrfKind::Attribute => &self.sat,
            RrfKind::SemanticType => &self.sty,
        }
    }

    pub fn set_path(&mut self, kind: RrfKind, path: PathBuf) {
        match kind {
            RrfKind::Concept => self.conso = path,
            RrfKind::Relation => self.rel = path,
            RrfKind::Attribute => self.sat = path,
            RrfKind::SemanticType => self.sty = path,
        }
    }

    /// Checks that every input is a file, reporting all missing ones at once.
    pub fn verify(&self) -> Result<()> {
        let missing: Vec<String> = RrfKind::ALL
            .iter()
            .map(|kind| self.path(*kind))
            .filter(|path| !path.is_file())
            .map(|path| path.display().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IngestError::MissingInputs { files: missing })
        }
    }
}

/// Finds the extracts in `dir` and checks that all of them exist.
pub fn discover_rrf_files(dir: &Path) -> Result<RrfInputs> {
    let inputs = locate_rrf_files(dir)?;
    inputs.verify()?;
    for kind in RrfKind::ALL {
        tracing::debug!(
            table = kind.table_name(),
            path = %inputs.path(kind).display(),
            "found input"
        );
    }
    Ok(inputs)
}

/// Resolves the extract paths in `dir`, preferring `<NAME>.gz` over the plain file.
///
/// Names match case-insensitively. When neither form exists the plain name
/// is returned, so that a later [`RrfInputs::verify`] reports it.
pub fn locate_rrf_files(dir: &Path) -> Result<RrfInputs> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let locate = |kind: RrfKind| -> PathBuf {
        let plain = kind.file_name();
        let gzip = format!("{plain}.gz");
        let find = |wanted: &str| {
            files.iter().find(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
            })
        };
        find(&gzip)
            .or_else(|| find(plain))
            .cloned()
            .unwrap_or_else(|| dir.join(plain))
    };

    Ok(RrfInputs::new(
        locate(RrfKind::Concept),
        locate(RrfKind::Relation),
        locate(RrfKind::Attribute),
        locate(RrfKind::SemanticType),
    ))
}
