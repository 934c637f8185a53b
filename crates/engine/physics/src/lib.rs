//! Continuous collision for triangle-soup bodies
//!
//! - [`collision`]: sweep coefficient and recursive sliding
//! - [`character_controller`]: first-person walker built on the sweep

pub mod character_controller;
pub mod collision;

pub use character_controller::{CharacterController, CharacterControllerConfig, ControlInput};
pub use collision::{slide, sweep, sweep_coefficient, Body, Sweep, SLIDE_EPSILON};

// Re-export for convenience
pub use escher_core;
pub use glam;
