//! Core geometry for Escher - shared by collision, world and renderer crates
//!
//! Everything in this crate is a pure value type or a pure function. Nothing
//! here owns world state.
//!
//! # Modules
//!
//! - [`triangle`]: triangles, ray-triangle intersection and point projection
//! - [`plane`]: half-space planes used for frustum and portal clipping
//! - [`frame`]: oriented frames and the look-direction basis helpers
//! - [`mesh`]: physical triangle soups and mesh builders
//! - [`camera`]: camera view in the accumulated world frame

pub mod camera;
pub mod frame;
pub mod mesh;
pub mod plane;
pub mod triangle;

pub use camera::{CameraConfig, CameraView};
pub use frame::OrientedFrame;
pub use mesh::{Mesh, PhysicalMesh};
pub use plane::Plane;
pub use triangle::{point_tri_projection, ray_tri_intersection, Triangle, EPSILON, NO_HIT};

// Re-export glam for downstream crates
pub use glam;
