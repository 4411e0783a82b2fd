pub mod report;

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the pulmoscan viewer
#[derive(Parser, Debug)]
#[command(name = "pulmoscan")]
#[command(about = "Interactive viewer for precomputed lung CT scans and nodule annotations")]
#[command(version)]
pub struct Cli {
    /// Data directory with metadata CSVs and per-patient volume folders
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Patient to select at startup instead of the first listed
    #[arg(short, long)]
    pub patient: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
