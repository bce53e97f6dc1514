use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::filter::EnvFilter;

use stage_snake::config::GameConfig;
use stage_snake::game::SnakeGame;
use stage_snake::term::{KeyboardInput, TermManager};
use stage_snake::BoardInt;

#[derive(Parser)]
#[command(name = "stage-snake")]
#[command(version, about = "Terminal snake with four stages, gates and poison")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds between two ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Play-area rows, border included
    #[arg(long)]
    rows: Option<BoardInt>,

    /// Play-area columns, border included
    #[arg(long)]
    cols: Option<BoardInt>,

    /// Write logs here (filtered by RUST_LOG); the terminal belongs to the game
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(ms) = self.tick_ms {
            config.tick_interval_ms = ms;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }

        config.validate().context("Invalid game config")?;
        Ok(config)
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut term = TermManager::new((config.rows, config.cols)).context("Failed to read terminal size")?;
    term.setup().context("Failed to set up terminal")?;

    let mut game = SnakeGame::new(term, KeyboardInput, rng, config);
    let result = game
        .play()
        .and_then(|summary| game.show_summary(&summary).map(|_| summary));

    // The terminal is handed back even when the run errored
    game.display_mut().restore().context("Failed to restore terminal")?;
    let summary = result.context("Game aborted")?;

    for line in summary.lines() {
        println!("{}", line);
    }

    Ok(())
}
