pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod events;
pub mod export;
pub mod finalize;
pub mod io_utils;
pub mod merge;
pub mod reader;
pub mod reconcile;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

pub use classify::Category;
pub use config::ReconConfig;
pub use dataset::{Dataset, Source, Table};
pub use error::{ConfigError, InputError, ReconError};
pub use reconcile::{Reconciler, ResultSet, reconcile};

use crate::{cli::Cli, reader::ReadOptions};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("mini_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    execute(&cli)
}

pub fn execute(cli: &Cli) -> Result<()> {
    info!("Initializing reconciler");
    let reconciler = if cli.default_config {
        Reconciler::new(ReconConfig::default())
    } else {
        Reconciler::from_config_path(cli.config.as_deref())
    }
    .context("Loading reconciliation config")?;
    debug!("Merge key(s): {:?}", reconciler.config().merge_key);

    let options = ReadOptions {
        delimiter: cli.delimiter,
        encoding: cli.input_encoding.clone(),
        required_columns: reconciler.config().required_columns.clone(),
    };
    let internal = reader::load_dataset(
        &cli.internal,
        "Internal System Export",
        Source::Internal,
        &options,
    )?;
    let provider =
        reader::load_dataset(&cli.provider, "Provider Statement", Source::Provider, &options)?;

    let result = reconciler
        .reconcile(&internal, &provider)
        .context("Reconciliation failed")?;
    for event in &result.report.events {
        info!("{event}");
    }
    info!("Reconciliation complete: {}", result.report);

    for (category, table) in result.iter() {
        println!();
        println!(
            "=== {} === ({} rows)",
            category.key().to_uppercase(),
            table.len()
        );
        if cli.preview_rows > 0 && !table.is_empty() {
            print!("{}", table::render_preview(table, cli.preview_rows));
        }
    }

    if let Some(dir) = &cli.output_dir {
        let delimiter = cli.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
        export::write_result_set(&result, dir, delimiter)?;
    }
    if let Some(path) = &cli.summary {
        export::write_summary(&result, path)?;
    }
    Ok(())
}
