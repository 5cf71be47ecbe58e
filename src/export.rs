//! Writes a [`ResultSet`] to disk: one delimited file per category and an
//! optional JSON run summary.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use log::info;
use serde::Serialize;

use crate::{
    data::display_cell,
    dataset::Table,
    events::RunReport,
    io_utils,
    reconcile::ResultSet,
};

#[derive(Debug, Serialize)]
struct Summary<'a> {
    generated_at: String,
    engine_version: &'static str,
    #[serde(flatten)]
    report: &'a RunReport,
}

/// Writes `<category>.csv` (or `.tsv` for a tab delimiter) for all four
/// categories into `dir` and returns the written paths in category order.
pub fn write_result_set(result: &ResultSet, dir: &Path, delimiter: u8) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))?;
    let extension = if delimiter == io_utils::DEFAULT_TSV_DELIMITER {
        "tsv"
    } else {
        "csv"
    };
    let mut written = Vec::with_capacity(4);
    for (category, table) in result.iter() {
        let path = dir.join(format!("{}.{extension}", category.key()));
        write_table(table, &path, delimiter)
            .with_context(|| format!("Writing {category} results to {path:?}"))?;
        info!("Wrote {} {category} row(s) to {:?}", table.len(), path);
        written.push(path);
    }
    Ok(written)
}

pub fn write_table(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, delimiter)
        .with_context(|| format!("Creating output file {path:?}"))?;
    writer
        .write_record(&table.columns)
        .context("Writing header row")?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(display_cell))
            .context("Writing data row")?;
    }
    writer.flush().context("Flushing output")?;
    Ok(())
}

pub fn write_summary(result: &ResultSet, path: &Path) -> Result<()> {
    let summary = Summary {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        engine_version: env!("CARGO_PKG_VERSION"),
        report: &result.report,
    };
    let file = fs::File::create(path).with_context(|| format!("Creating summary file {path:?}"))?;
    serde_json::to_writer_pretty(file, &summary).context("Writing summary JSON")?;
    info!("Wrote run summary to {path:?}");
    Ok(())
}
