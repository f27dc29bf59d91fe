//! Node and relationship file writers for graph bulk import.
//!
//! Headers follow the import tool's conventions: `<name>:ID(<SPACE>)` for node
//! ids, `<name>:START_ID(<SPACE>)` / `<name>:END_ID(<SPACE>)` for edge endpoints,
//! `:LABEL` for `;`-separated node labels and `:TYPE` for relationship types.
//! Files are written to a temporary file in the output directory and only
//! moved into place once complete.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use polars::prelude::DataFrame;
use rxgraph_model::{
    DropLog, DropReason, FileKind, NodeFileSpec, OutputOptions, RelationshipFileSpec, WrittenFile,
};
use tempfile::NamedTempFile;

use crate::error::{OutputError, Result};
use crate::table::TextTable;

pub const LABEL_COLUMN: &str = ":LABEL";
pub const TYPE_COLUMN: &str = ":TYPE";
const ID_TOKEN: &str = ":ID";
const START_TOKEN: &str = ":START_ID";
const END_TOKEN: &str = ":END_ID";
const STAGE: &str = "write";

/// Final location of a file, with `.gz` appended when compressing.
pub fn output_path(name: &str, output: &OutputOptions) -> PathBuf {
    if output.compress {
        output.output_dir.join(format!("{name}.gz"))
    } else {
        output.output_dir.join(name)
    }
}

/// Joins labels into a `:LABEL` value: upper-cased, `;`-separated, backticks doubled.
pub fn label_value(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| label.to_uppercase().replace('`', "``"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Lower-cases and trims the property part of a header, keeping any `:`-suffix.
pub fn standardize_relationship_header(header: &str) -> String {
    match header.split_once(':') {
        Some((property, rest)) => format!("{}:{rest}", property.trim().to_lowercase()),
        None => header.trim().to_lowercase(),
    }
}

/// Writes a node table.
///
/// The id column is renamed to `<id>:ID(<first label>)` and rows repeating an
/// earlier id are dropped. Without labels the table must already carry a
/// `:LABEL` column, otherwise the write fails with [`OutputError::MissingLabel`].
/// Duplicate ids and duplicate rows are recorded in `drops` under the file name.
pub fn write_node_file(
    df: &DataFrame,
    spec: &NodeFileSpec,
    output: &OutputOptions,
    drops: &mut DropLog,
) -> Result<WrittenFile> {
    let path = output_path(&spec.name, output);
    let mut table = TextTable::from_frame(df)?;

    let has_label_column = table.has_header_token(LABEL_COLUMN);
    if spec.labels.is_empty() && !has_label_column {
        return Err(OutputError::MissingLabel { path });
    }

    if let Some(id) = &spec.id_column {
        let idx = table
            .position(id)
            .ok_or_else(|| OutputError::MissingIdColumn {
                path: path.clone(),
                column: id.clone(),
            })?;
        let space = spec.id_space().unwrap_or_else(|| id.to_uppercase());
        table.rename(idx, format!("{id}{ID_TOKEN}({space})"));
    }

    let id_columns: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| header.contains(ID_TOKEN))
        .map(|(idx, _)| idx)
        .collect();
    let mut duplicate_ids = 0;
    for idx in id_columns {
        duplicate_ids += table.dedupe_on(&[idx]);
    }
    drops.record(STAGE, &spec.name, DropReason::DuplicateId, duplicate_ids);

    if !has_label_column {
        table.push_constant(LABEL_COLUMN, &label_value(&spec.labels));
    }

    finish_table(&mut table, &path, &spec.name, drops);
    persist(&table, &path, output.compress)?;
    Ok(WrittenFile {
        path,
        kind: FileKind::Nodes,
        rows: table.height(),
    })
}

/// Writes a relationship table.
///
/// Fails with one [`OutputError::RelationshipContract`] naming every missing
/// start id, end id or type. Duplicate rows are recorded in `drops`.
pub fn write_relationship_file(
    df: &DataFrame,
    spec: &RelationshipFileSpec,
    output: &OutputOptions,
    drops: &mut DropLog,
) -> Result<WrittenFile> {
    let path = output_path(&spec.name, output);
    let mut table = TextTable::from_frame(df)?;
    for idx in 0..table.headers.len() {
        let standardized = standardize_relationship_header(&table.headers[idx]);
        table.rename(idx, standardized);
    }

    let endpoints = [
        (&spec.start_column, &spec.start_label, START_TOKEN, "start"),
        (&spec.end_column, &spec.end_label, END_TOKEN, "end"),
    ];
    let mut missing = Vec::new();
    for (column, label, token, side) in endpoints {
        let column = standardize_relationship_header(column);
        match table.position(&column) {
            Some(idx) => table.rename(idx, format!("{column}{token}({})", label.to_uppercase())),
            None if table.has_header_token(token) => {}
            None => missing.push(format!("{side} id column '{column}'")),
        }
    }

    let type_idx = table.position(TYPE_COLUMN);
    match (type_idx, &spec.rela_type) {
        (Some(idx), _) => table.map_column(idx, |value| value.trim().to_lowercase()),
        (None, Some(rela_type)) => {
            table.push_constant(TYPE_COLUMN, &rela_type.trim().to_lowercase());
        }
        (None, None) => missing.push("relationship type".to_string()),
    }

    if !missing.is_empty() {
        for requirement in &missing {
            tracing::error!(path = %path.display(), "missing {requirement}");
        }
        return Err(OutputError::RelationshipContract { path, missing });
    }

    finish_table(&mut table, &path, &spec.name, drops);
    persist(&table, &path, output.compress)?;
    Ok(WrittenFile {
        path,
        kind: FileKind::Relationships,
        rows: table.height(),
    })
}

/// Drops all-empty columns and exact duplicate rows.
fn finish_table(table: &mut TextTable, path: &Path, name: &str, drops: &mut DropLog) {
    let removed = table.drop_empty_columns();
    if !removed.is_empty() {
        tracing::debug!(path = %path.display(), columns = ?removed, "dropped empty columns");
    }
    let duplicates = table.dedupe_rows();
    drops.record(STAGE, name, DropReason::DuplicateRow, duplicates);
}

fn persist(table: &TextTable, path: &Path, compress: bool) -> Result<()> {
    let io_error = |source: std::io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(io_error)?;

    let mut temp = NamedTempFile::new_in(&dir).map_err(io_error)?;
    if compress {
        let encoder = GzEncoder::new(temp.as_file_mut(), Compression::default());
        let encoder = write_csv(table, encoder, path)?;
        encoder.finish().map_err(io_error)?;
    } else {
        let mut writer = write_csv(table, BufWriter::new(temp.as_file_mut()), path)?;
        writer.flush().map_err(io_error)?;
    }
    temp.persist(path).map_err(|err| io_error(err.error))?;

    tracing::info!(path = %path.display(), rows = table.height(), "saved file");
    Ok(())
}

fn write_csv<W: Write>(table: &TextTable, sink: W, path: &Path) -> Result<W> {
    let csv_error = |err: csv::Error| OutputError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink);
    writer.write_record(&table.headers).map_err(csv_error)?;
    for row in 0..table.height() {
        writer
            .write_record(
                table
                    .columns
                    .iter()
                    .map(|column| column[row].as_deref().unwrap_or("")),
            )
            .map_err(csv_error)?;
    }
    writer.into_inner().map_err(|err| OutputError::Io {
        path: path.to_path_buf(),
        source: err.into_error(),
    })
}
