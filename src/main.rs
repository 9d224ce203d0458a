mod config;
mod game;
mod input;
mod snake;
mod term;
mod timer;

use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

use config::Config;

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = game::Controller::new(rng);

    let mut term = term::TermManager::new()?;
    term.setup()?;
    let res = game::run(&mut term, &mut game);
    // Leave the terminal usable even if the game loop failed
    term.restore()?;

    tracing::info!(high_score = game.state().high_score, "exiting");
    res
}

fn init_logging(config: &Config) -> Result<()> {
    // Logging to the terminal would draw over the board
    let path = match &config.log_file {
        Some(path) => path,
        None => return Ok(()),
    };

    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
