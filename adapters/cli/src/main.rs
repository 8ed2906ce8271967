#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless tower defence game.
//!
//! The binary loads a configuration, lets a scripted autopilot build towers
//! and start rounds, and prints the final field once the game stops.

mod autopilot;
mod render;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tower_defence_core::{Command, GameConfig, GameError, LifecycleState};
use tower_defence_world::{apply, driver, query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::autopilot::Autopilot;

const MIN_HEADLESS_STEP: Duration = Duration::from_millis(1);

/// Command-line arguments accepted by the tower defence binary.
#[derive(Debug, Parser)]
#[command(name = "tower-defence")]
#[command(about = "Plays a headless tower defence game with a scripted autopilot")]
struct Cli {
    /// TOML file overriding the default game configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of tile columns.
    #[arg(long)]
    width: Option<u32>,

    /// Number of tile rows.
    #[arg(long)]
    height: Option<u32>,

    /// Seed for field generation and wave sizes.
    #[arg(long)]
    seed: Option<u64>,

    /// Integer game speed multiplier.
    #[arg(long)]
    speed: Option<u32>,

    /// Rounds the autopilot plays before stopping the game.
    #[arg(long, default_value_t = 5)]
    rounds: u32,

    /// Pace the simulation with wall-clock time instead of fixed steps.
    #[arg(long)]
    realtime: bool,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.field_width = width;
        }
        if let Some(height) = self.height {
            config.field_height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(speed) = self.speed {
            config.game_speed = speed;
        }

        config.validate().context("invalid command-line overrides")?;
        Ok(config)
    }
}

/// Entry point for the tower defence command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.game_config()?;
    info!(
        width = config.field_width,
        height = config.field_height,
        seed = ?config.seed,
        rounds = cli.rounds,
        "starting game"
    );

    let mut world = World::new(config);
    let mut autopilot = Autopilot::new(cli.rounds);
    autopilot.join(&mut world)?;

    if cli.realtime {
        driver::run(&mut world, |world, events, _| autopilot.frame(world, events))?;
    } else {
        run_headless(&mut world, &mut autopilot)?;
    }

    print!("{}", render::field(&world));
    println!("{}", render::summary(&world));
    Ok(())
}

/// Advances the world in fixed steps of one tick delay, as fast as possible.
fn run_headless(world: &mut World, autopilot: &mut Autopilot) -> Result<(), GameError> {
    let config = query::config(world);
    let step = (config.tick_delay() * config.game_speed).max(MIN_HEADLESS_STEP);
    let mut events = Vec::new();

    while query::lifecycle(world) != LifecycleState::Stopped {
        events.clear();
        apply(world, Command::Tick { dt: step }, &mut events)?;
        match autopilot.frame(world, &events) {
            Ok(()) => {}
            Err(GameError::Exit) => break,
            Err(error) => return Err(error),
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
