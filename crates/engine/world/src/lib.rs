//! Chunk graph, chunk crossing and the per-tick world update
//!
//! A world is a set of independently meshed chunks joined by portals. The
//! graph is immutable after loading; [`World`] owns the only mutable state:
//! the active chunk, the accumulated orientation and the controller.

pub mod crossing;
pub mod description;
pub mod error;
pub mod graph;
pub mod world;

pub use crossing::{collision_environment, detect_crossing, Crossing, CrossingConfig, WorldState};
pub use description::{
    ChunkDescription, FrameDescription, MeshDescription, PortalDescription, SpawnDescription,
    WorldDescription,
};
pub use error::{Result, WorldError};
pub use graph::{portal_transform, Chunk, ChunkId, Portal, PortalGraph};
pub use world::{TickReport, World};
