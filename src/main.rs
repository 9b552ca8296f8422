mod config;
mod errors;
mod food;
mod game;
mod highscore;
mod sim;
mod snake;
mod state;
mod term;

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use config::GameConfig;
use highscore::FileScoreStore;

pub type TermInt = u16;
pub type Coords = (u16, u16);

#[derive(Parser)]
#[command(name = "food_snake")]
#[command(version, about = "Snake with foods that grow, shrink, slow and speed you up")]
struct Cli {
    /// Board width in board units
    #[arg(long, default_value = "600")]
    width: i32,

    /// Board height in board units
    #[arg(long, default_value = "600")]
    height: i32,

    /// Size of one cell, and of one move
    #[arg(long, default_value = "20")]
    cell_size: i32,

    /// File holding the high score
    #[arg(long, default_value = "record.txt")]
    record_file: PathBuf,

    #[arg(long, default_value = "food_snake.log")]
    log_file: PathBuf,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the game, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level.into(), Config::default(), log_file)
        .context("Failed to initialize logger")?;

    let config = GameConfig::new(cli.width, cli.height, cli.cell_size);
    config.validate()?;
    info!("starting with {:?}", config);

    let store = FileScoreStore::new(cli.record_file);
    let mut game = game::SnakeGame::new(config, store)?;
    game.initialize()?;

    // Put the terminal back even if the game failed
    let result = game.run();
    game.restore()?;

    info!("bye");
    result
}
