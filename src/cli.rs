use std::path::PathBuf;

use clap::Parser;

use crate::io_utils::parse_delimiter;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reconcile an internal transaction export against a provider statement",
    long_about = None
)]
pub struct Cli {
    /// Internal system export (CSV, or '-' for stdin)
    pub internal: PathBuf,
    /// Provider statement (CSV)
    pub provider: PathBuf,
    /// Reconciliation config YAML (falls back to $RECONCILE_CONFIG_PATH, then config/config.yaml)
    #[arg(short, long, conflicts_with = "default_config")]
    pub config: Option<PathBuf>,
    /// Use the built-in configuration instead of a YAML file
    #[arg(long = "default-config")]
    pub default_config: bool,
    /// Directory that receives one CSV per result category
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Write a JSON run summary (counts, stage timings) to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Rows to preview per category (0 prints only the counts)
    #[arg(short = 'n', long = "preview-rows", default_value_t = 5)]
    pub preview_rows: usize,
    /// CSV delimiter character for both inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}
