//! Outpost harness
//!
//! Runs a simulation preset headless at a fixed frame rate and reports the
//! result.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use outpost_core::{Command, Event, SimConfig, Simulation};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// Waypoint path with tower slots
    TowerDefense,
    /// Wandering, shooting enemies around a player
    ArenaShooter,
}

#[derive(Parser)]
#[command(name = "outpost-harness")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run an Outpost simulation headless", long_about = None)]
struct Cli {
    /// Built-in map to run
    #[arg(short, long, value_enum, default_value = "tower-defense")]
    preset: Preset,

    /// JSON config file to use instead of the preset's
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value = "3600")]
    frames: u32,

    /// Frame length in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: f64,

    /// RNG seed
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Print the final snapshot as JSON
    #[arg(long)]
    dump: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if cli.frame_ms <= 0.0 {
        bail!("frame length must be positive, got {}", cli.frame_ms);
    }

    let config = load_config(&cli)?;
    let mut sim = Simulation::new(config, cli.seed).context("invalid simulation config")?;
    let center = sim.config().playfield.bounds.center();
    let player = match cli.preset {
        Preset::TowerDefense => {
            let slots = sim.config().towers.slots.clone();
            for at in slots {
                sim.push_command(Command::PlaceEmplacement { at });
            }
            None
        }
        Preset::ArenaShooter => Some(sim.spawn_player(center)),
    };

    info!(preset = ?cli.preset, frames = cli.frames, seed = cli.seed, "running");

    let mut now = 0.0;
    let mut shots = 0usize;
    let mut purged = 0usize;
    for frame in 0..cli.frames {
        if let Some(shooter) = player {
            // Sweep the player's aim around a circle
            #[allow(clippy::cast_precision_loss)]
            let angle = frame as f32 * 0.05;
            sim.push_command(Command::Fire {
                shooter,
                aim: center + Vec2::from_angle(angle) * 100.0,
            });
        }
        now += cli.frame_ms;
        let report = sim
            .step(now, cli.frame_ms)
            .with_context(|| format!("tick {frame} rejected"))?;
        shots += report.shots_fired();
        purged += report.purged;
        for event in &report.events {
            if let Event::Scored { reason, total } = event {
                debug!(tick = report.tick, ?reason, total, "scored");
            }
        }
    }

    info!(
        score = sim.score(),
        shots,
        purged,
        live = sim.arena().active_count(),
        "finished"
    );

    if cli.dump {
        let json = serde_json::to_string_pretty(&sim.snapshot()).context("failed to encode snapshot")?;
        println!("{json}");
    } else {
        println!("score: {}", sim.score());
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            SimConfig::from_json(&text).with_context(|| format!("failed to load {}", path.display()))
        }
        None => Ok(match cli.preset {
            Preset::TowerDefense => SimConfig::tower_defense(),
            Preset::ArenaShooter => SimConfig::arena_shooter(),
        }),
    }
}
