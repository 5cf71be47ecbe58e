//! Error taxonomy for the reconciliation pipeline and its collaborators.
//!
//! [`ConfigError`] covers everything that can go wrong before a run starts,
//! [`ReconError`] covers the core pipeline, and [`InputError`] is raised by the
//! CSV reader when an input file cannot become a [`Dataset`](crate::dataset::Dataset).

use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::Source;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0:?}")]
    NotFound(PathBuf),
    #[error("reading config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ReconError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("merge key '{key}' not found in {side} dataset")]
    MissingMergeKey { key: String, side: Source },
    #[error("column '{column}' not found during {stage}")]
    MissingColumn { column: String, stage: &'static str },
    #[error("row {row}: unknown origin marker '{value}'")]
    UnknownOrigin { value: String, row: usize },
    #[error("duplicate merge key '{key}' in {side} dataset")]
    DuplicateKey { key: String, side: Source },
    #[error("merged column '{column}' would appear twice")]
    ColumnCollision { column: String },
    #[error("row {row} has {found} cell(s), expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{label}: opening {path:?}: {source}")]
    Open {
        label: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{label}: CSV parse failed at row {row}: {source}")]
    Csv {
        label: String,
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("{label}: row {row} is not valid {encoding}")]
    Decode {
        label: String,
        row: usize,
        encoding: &'static str,
    },
    #[error("{label}: unknown encoding '{encoding}'")]
    UnknownEncoding { label: String, encoding: String },
    #[error("{label}: file is empty")]
    Empty { label: String },
    #[error("{label}: missing required column(s): {}", columns.join(", "))]
    MissingColumns { label: String, columns: Vec<String> },
    #[error("{label}: row {row} has {found} field(s), expected {expected}")]
    RaggedRow {
        label: String,
        row: usize,
        found: usize,
        expected: usize,
    },
}
