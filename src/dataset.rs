//! In-memory tabular types shared by every pipeline stage.
//!
//! A [`Dataset`] is one loaded input (internal export or provider statement)
//! with per-column types. A [`Table`] is the generic row/column shape the
//! merger, classifier and finalizer pass between each other.

use std::fmt;

use serde::Serialize;

use crate::data::{Cell, ColumnType, display_cell, infer_column_type, parse_typed_value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Internal,
    Provider,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Internal => f.write_str("internal"),
            Source::Provider => f.write_str("provider"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub source: Source,
    pub headers: Vec<String>,
    pub types: Vec<ColumnType>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Builds a dataset from raw text rows, typing each column over all of its cells.
    ///
    /// Short rows are padded with nulls.
    pub fn from_rows(source: Source, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let types = (0..headers.len())
            .map(|idx| {
                infer_column_type(
                    rows.iter()
                        .map(move |row| row.get(idx).map(String::as_str).unwrap_or("")),
                )
            })
            .collect::<Vec<_>>();
        let rows = rows
            .iter()
            .map(|row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(idx, ty)| {
                        parse_typed_value(row.get(idx).map(String::as_str).unwrap_or(""), *ty)
                    })
                    .collect()
            })
            .collect();
        Self {
            source,
            headers,
            types,
            rows,
        }
    }

    pub fn empty(source: Source, headers: Vec<String>) -> Self {
        let types = vec![ColumnType::String; headers.len()];
        Self {
            source,
            headers,
            types,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Rows rendered as text, nulls as empty strings.
    pub fn display_rows(&self, limit: Option<usize>) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| row.iter().map(display_cell).collect())
            .collect()
    }
}
