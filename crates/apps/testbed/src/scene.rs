//! Generated demo scenes
//!
//! The room ring is a row of identical rooms whose last door opens back into
//! the first one. Walking north forever cycles through all of them, and
//! looking through a door shows the following rooms nested in each other.

use std::f32::consts::PI;

use escher_core::{Mesh, OrientedFrame};
use escher_world::{Chunk, ChunkId, Portal, PortalGraph, SpawnDescription, WorldDescription, WorldError};
use glam::{Vec2, Vec3};

pub const ROOM_HALF_WIDTH: f32 = 4.0;
pub const ROOM_HEIGHT: f32 = 3.0;
pub const DOOR_HALF_WIDTH: f32 = 1.0;
pub const DOOR_HEIGHT: f32 = 2.0;

/// Vertical quad from `from` to `to` on the floor plan, facing left of the
/// direction of travel
fn wall(mesh: &mut Mesh, from: Vec2, to: Vec2, bottom: f32, top: f32) {
    mesh.extend(&Mesh::quad(
        Vec3::new(from.x, bottom, from.y),
        Vec3::new(to.x, bottom, to.y),
        Vec3::new(to.x, top, to.y),
        Vec3::new(from.x, top, from.y),
    ));
}

/// Wall along `z` with a door gap in its middle, running in direction `sign`
fn door_wall(mesh: &mut Mesh, z: f32, sign: f32) {
    let w = ROOM_HALF_WIDTH * sign;
    let d = DOOR_HALF_WIDTH * sign;
    wall(mesh, Vec2::new(-w, z), Vec2::new(-d, z), 0.0, ROOM_HEIGHT);
    wall(mesh, Vec2::new(d, z), Vec2::new(w, z), 0.0, ROOM_HEIGHT);
    wall(mesh, Vec2::new(-d, z), Vec2::new(d, z), DOOR_HEIGHT, ROOM_HEIGHT);
}

/// Closed room with a door in its north (-Z) and south (+Z) walls
pub fn room() -> Mesh {
    let w = ROOM_HALF_WIDTH;
    let mut mesh = Mesh::quad(
        Vec3::new(-w, 0.0, w),
        Vec3::new(w, 0.0, w),
        Vec3::new(w, 0.0, -w),
        Vec3::new(-w, 0.0, -w),
    );
    mesh.extend(&Mesh::quad(
        Vec3::new(-w, ROOM_HEIGHT, -w),
        Vec3::new(w, ROOM_HEIGHT, -w),
        Vec3::new(w, ROOM_HEIGHT, w),
        Vec3::new(-w, ROOM_HEIGHT, w),
    ));
    door_wall(&mut mesh, -w, 1.0);
    door_wall(&mut mesh, w, -1.0);
    wall(&mut mesh, Vec2::new(w, -w), Vec2::new(w, w), 0.0, ROOM_HEIGHT);
    wall(&mut mesh, Vec2::new(-w, w), Vec2::new(-w, -w), 0.0, ROOM_HEIGHT);
    mesh
}

/// North door of a room, opening into the south door of `next`
pub fn north_door(next: ChunkId, portal_id: u32) -> Result<Portal, WorldError> {
    let z = -ROOM_HALF_WIDTH;
    Portal::new(
        Some(next),
        portal_id,
        Mesh::quad(
            Vec3::new(-DOOR_HALF_WIDTH, 0.0, z),
            Vec3::new(DOOR_HALF_WIDTH, 0.0, z),
            Vec3::new(DOOR_HALF_WIDTH, DOOR_HEIGHT, z),
            Vec3::new(-DOOR_HALF_WIDTH, DOOR_HEIGHT, z),
        ),
        OrientedFrame::new(Vec3::new(0.0, 0.0, z), Vec3::Z, Vec3::Y),
        OrientedFrame::new(Vec3::new(0.0, 0.0, -z), Vec3::Z, Vec3::Y),
    )
}

/// Ring of `rooms` rooms, spawning in the first one facing north
pub fn room_ring(rooms: usize) -> Result<WorldDescription, WorldError> {
    if rooms == 0 {
        return Err(WorldError::Empty);
    }

    let count = rooms as u32;
    let mut chunks = Vec::with_capacity(rooms);
    for i in 0..count {
        let next = (i + 1) % count;
        let previous = (i + count - 1) % count;
        let back = north_door(ChunkId(i), previous)?.mirrored(ChunkId(previous));
        chunks.push(
            Chunk::new(format!("room-{i}"), room())
                .with_portal(north_door(ChunkId(next), i)?)
                .with_portal(back),
        );
    }
    let graph = PortalGraph::new(chunks)?;

    let spawn = SpawnDescription {
        chunk: Some("room-0".to_string()),
        position: [0.0, 1.5, 0.0],
        yaw: PI,
    };
    Ok(WorldDescription::from_graph(&graph, spawn))
}
