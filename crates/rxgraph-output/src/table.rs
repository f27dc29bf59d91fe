//! Column-major text table used while preparing a file.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use rxgraph_common::{column_names, text_column};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextTable {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<Option<String>>>,
}

impl TextTable {
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let headers = column_names(df);
        let mut columns = Vec::with_capacity(headers.len());
        for name in &headers {
            columns.push(text_column(df, name)?);
        }
        Ok(Self { headers, columns })
    }

    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_header_token(&self, token: &str) -> bool {
        self.headers.iter().any(|header| header.contains(token))
    }

    pub fn rename(&mut self, idx: usize, name: String) {
        self.headers[idx] = name;
    }

    pub fn push_constant(&mut self, name: &str, value: &str) {
        let height = self.height();
        self.headers.push(name.to_string());
        self.columns.push(vec![Some(value.to_string()); height]);
    }

    pub fn map_column(&mut self, idx: usize, f: impl Fn(&str) -> String) {
        for value in self.columns[idx].iter_mut().flatten() {
            *value = f(value);
        }
    }

    /// Keeps the rows whose entry in `keep` is true.
    fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.retain(|_| flags.next().copied().unwrap_or(false));
        }
    }

    fn row_key(&self, row: usize, columns: &[usize]) -> Vec<Option<String>> {
        columns
            .iter()
            .map(|&idx| self.columns[idx][row].clone())
            .collect()
    }

    /// Drops rows repeating an earlier value of `columns`; returns the number dropped.
    pub fn dedupe_on(&mut self, columns: &[usize]) -> usize {
        let mut seen = BTreeSet::new();
        let keep: Vec<bool> = (0..self.height())
            .map(|row| seen.insert(self.row_key(row, columns)))
            .collect();
        let dropped = keep.iter().filter(|kept| !**kept).count();
        self.retain_rows(&keep);
        dropped
    }

    /// Drops rows identical to an earlier row; returns the number dropped.
    pub fn dedupe_rows(&mut self) -> usize {
        let all: Vec<usize> = (0..self.headers.len()).collect();
        self.dedupe_on(&all)
    }

    /// Removes columns with no value in any row, sparing import header columns.
    ///
    /// Returns the removed header names. Nothing is removed from an empty table.
    pub fn drop_empty_columns(&mut self) -> Vec<String> {
        if self.height() == 0 {
            return Vec::new();
        }
        let mut removed = Vec::new();
        let mut idx = 0;
        while idx < self.headers.len() {
            let empty = self.columns[idx].iter().all(Option::is_none);
            if empty && !self.headers[idx].contains(':') {
                removed.push(self.headers.remove(idx));
                self.columns.remove(idx);
            } else {
                idx += 1;
            }
        }
        removed
    }
}
