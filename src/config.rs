use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "snake")]
#[command(version, about = "Snake in the terminal. Space to start, arrow keys to steer.")]
pub struct Config {
    /// Seed for food placement, for a repeatable game
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file. Nothing is logged without it
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
