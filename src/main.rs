mod app;
mod food;
mod game;
mod grid;
mod highscore;
mod input;
mod snake;
mod term;

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, WriteLogger};

use crate::app::App;
use crate::game::Game;
use crate::highscore::{HighScoreFile, DEFAULT_HIGH_SCORE_FILE};
use crate::term::TermManager;

#[derive(Parser)]
#[command(name = "snake")]
#[command(version, about = "Classic snake in the terminal")]
struct Cli {
    /// File the high score is kept in
    #[arg(long, default_value = DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,

    /// Log file; the terminal itself belongs to the game
    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Seed for food placement, for reproducible rounds
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging before anything else
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)
        .context("Failed to initialize logger")?;

    info!("Starting snake, high score file {}", cli.high_score_file.display());

    let rng = match cli.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut term = TermManager::new();
    term.enter()?;

    let mut app = App::new(term, Game::new(rng), HighScoreFile::new(cli.high_score_file));
    let result = app.run();
    info!("High score on exit: {}", app.high_score());

    // Give the terminal back even when the game loop failed
    let restored = app.into_frontend().restore();
    if let Err(e) = &result {
        error!("Game loop failed: {:#}", e);
    }
    result?;
    restored?;

    println!("Thanks for playing! Exiting...");
    Ok(())
}
