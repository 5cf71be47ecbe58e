#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use mini_reconcile::{Dataset, Source};
use tempfile::{TempDir, tempdir};

/// Returns the path of the stock configuration shipped with the crate.
pub fn stock_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("config.yaml")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a typed dataset from string literals.
pub fn dataset(source: Source, headers: &[&str], rows: &[&[&str]]) -> Dataset {
    Dataset::from_rows(
        source,
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

pub fn internal(rows: &[&[&str]]) -> Dataset {
    dataset(
        Source::Internal,
        &["transaction_reference", "amount", "status"],
        rows,
    )
}

pub fn provider(rows: &[&[&str]]) -> Dataset {
    dataset(
        Source::Provider,
        &["transaction_reference", "amount", "status"],
        rows,
    )
}
