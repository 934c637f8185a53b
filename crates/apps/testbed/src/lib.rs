//! Headless testbed for portal worlds
//!
//! Loads a world description or generates a demo scene, drives the character
//! controller with scripted input and renders every tick into a command
//! recorder, logging what the traversal did.

pub mod config;
pub mod scene;
pub mod simulation;

pub use config::{ConfigError, SimulationConfig, TestbedConfig};
pub use scene::room_ring;
pub use simulation::{FrameReport, RunSummary, Simulation};
