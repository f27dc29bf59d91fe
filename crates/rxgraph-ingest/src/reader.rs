//! Pipe-delimited RRF reading, plain or gzip.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use polars::prelude::DataFrame;
use rxgraph_common::{missing_columns, text_frame};
use rxgraph_model::RrfKind;

use crate::error::{IngestError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn open_error(path: &Path, err: std::io::Error) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Opens a file for reading, decompressing it when it starts with the gzip magic bytes.
pub fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut reader = BufReader::new(file);
    let head = reader.fill_buf().map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if head.starts_with(&GZIP_MAGIC) {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Reads an RRF extract into a text table with the columns of `kind`.
///
/// Fields are split on `|` without quoting. Empty fields become nulls, short
/// rows are padded with nulls, and fields past the schema (including the empty
/// one after the trailing `|`) are ignored. Blank lines are skipped.
pub fn read_rrf(path: &Path, kind: RrfKind) -> Result<DataFrame> {
    let source = open_source(path)?;
    let headers = kind.headers();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b'|')
        .quoting(false)
        .from_reader(source);

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut record = csv::ByteRecord::new();
    let mut overlong = 0usize;
    loop {
        let more = reader
            .read_byte_record(&mut record)
            .map_err(|e| IngestError::RrfParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if !more {
            break;
        }
        if record.iter().all(<[u8]>::is_empty) {
            continue;
        }
        if record
            .iter()
            .skip(headers.len())
            .any(|field| !field.is_empty())
        {
            overlong += 1;
        }
        for (idx, column) in columns.iter_mut().enumerate() {
            let value = record
                .get(idx)
                .filter(|field| !field.is_empty())
                .map(|field| String::from_utf8_lossy(field).into_owned());
            column.push(value);
        }
    }

    if overlong > 0 {
        tracing::debug!(
            table = kind.table_name(),
            rows = overlong,
            "ignored fields beyond the schema"
        );
    }

    let df = text_frame(
        headers
            .iter()
            .map(|name| (*name).to_string())
            .zip(columns)
            .collect(),
    )?;
    tracing::info!(
        table = kind.table_name(),
        path = %path.display(),
        rows = df.height(),
        "read RRF table"
    );
    Ok(df)
}

/// Fails with one error naming every column of `required` absent from `df`.
pub fn require_columns(df: &DataFrame, table: &str, required: &[&str]) -> Result<()> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        })
    }
}
