//! Portal World Testbed
//!
//! Runs a portal world headless for a number of ticks and logs per-frame
//! render metrics. Set `RUST_LOG=debug` to see every frame.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use escher_world::WorldDescription;
use testbed::{room_ring, Simulation, TestbedConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Portal World Testbed
///
/// Walks a character through a world of portal-linked chunks and renders
/// every tick into a command recorder.
#[derive(Parser, Debug)]
#[command(name = "testbed")]
#[command(about = "Headless portal world simulation")]
struct Args {
    /// Load the world from a RON description instead of generating one
    #[arg(long, short = 'w', value_name = "PATH")]
    world: Option<PathBuf>,

    /// Load settings from a TOML file
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, value_name = "TICKS")]
    ticks: Option<u64>,

    /// Rooms in the generated ring
    #[arg(long, value_name = "ROOMS")]
    scene_rooms: Option<usize>,

    /// Viewport width over height
    #[arg(long, value_name = "RATIO")]
    aspect: Option<f32>,

    /// Walk forward every tick
    #[arg(long)]
    walk: bool,
}

impl Args {
    fn apply_to(&self, config: &mut TestbedConfig) {
        let simulation = &mut config.simulation;
        if let Some(ticks) = self.ticks {
            simulation.ticks = ticks;
        }
        if let Some(rooms) = self.scene_rooms {
            simulation.scene_rooms = rooms;
        }
        if let Some(aspect) = self.aspect {
            simulation.aspect = aspect;
        }
        simulation.walk |= self.walk;
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TestbedConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TestbedConfig::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    let description = match &args.world {
        Some(path) => WorldDescription::load_from_file(path)
            .with_context(|| format!("loading world {}", path.display()))?,
        None => {
            info!("Generating a ring of {} rooms", config.simulation.scene_rooms);
            room_ring(config.simulation.scene_rooms)?
        }
    };

    let mut simulation = Simulation::from_description(&description, config)?;
    let summary = simulation.run(config.simulation.ticks);
    info!("{}", summary);

    Ok(())
}
