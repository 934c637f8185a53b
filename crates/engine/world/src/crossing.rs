//! Chunk crossing
//!
//! After the controller moves, the segment each sample point travelled is
//! tested against the portal footprints of the active chunk. The first portal
//! in declaration order that any sample crossed wins, and at most one portal
//! is crossed per tick.

use escher_core::{ray_tri_intersection, PhysicalMesh};
use escher_physics::Body;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::graph::{ChunkId, PortalGraph};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingConfig {
    /// Sample points are the body's vertices pulled this far towards its origin
    pub sample_scale: f32,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self { sample_scale: 0.5 }
    }
}

/// Which chunk the controller is in and how that chunk sits in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldState {
    pub active_chunk: ChunkId,
    /// Product of every crossed portal's transform since the start
    pub orientation: Mat4,
}

impl WorldState {
    pub fn new(active_chunk: ChunkId) -> Self {
        Self {
            active_chunk,
            orientation: Mat4::IDENTITY,
        }
    }

    pub fn apply(&mut self, crossing: &Crossing) {
        self.active_chunk = crossing.to;
        self.orientation *= crossing.transform;
    }
}

/// A portal the controller passed through this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub from: ChunkId,
    pub to: ChunkId,
    /// Position of the portal in the source chunk's list
    pub portal_index: usize,
    pub portal_id: u32,
    /// Destination-to-source transform of the portal
    pub transform: Mat4,
}

/// Find the portal crossed by a body that moved by `movement` from `origin`
///
/// # Arguments
/// * `graph` - World graph
/// * `chunk` - Chunk the body was in before moving
/// * `body` - Body mesh relative to `origin`
/// * `origin` - Body position before the move, in `chunk` coordinates
/// * `movement` - Displacement applied this tick
/// * `config` - Sampling settings
pub fn detect_crossing(
    graph: &PortalGraph,
    chunk: ChunkId,
    body: &dyn PhysicalMesh,
    origin: Vec3,
    movement: Vec3,
    config: &CrossingConfig,
) -> Option<Crossing> {
    if movement == Vec3::ZERO {
        return None;
    }
    let source = graph.chunk(chunk)?;

    let samples: Vec<Vec3> = body
        .physical_vertices()
        .iter()
        .map(|vertex| origin + config.sample_scale * *vertex)
        .collect();

    source
        .portals()
        .iter()
        .enumerate()
        .find_map(|(portal_index, portal)| {
            let to = graph.destination(portal)?.id();
            let crossed = samples.iter().any(|sample| {
                portal
                    .mesh()
                    .faces()
                    .iter()
                    .any(|face| ray_tri_intersection(*sample, movement, face) < 1.0)
            });
            crossed.then(|| Crossing {
                from: chunk,
                to,
                portal_index,
                portal_id: portal.portal_id(),
                transform: portal.transform(),
            })
        })
}

/// Geometry the controller collides with while in `chunk`
///
/// The chunk's own mesh plus every neighbour one portal away, placed through
/// that portal's transform. Portals with unknown destinations add nothing.
pub fn collision_environment(graph: &PortalGraph, chunk: ChunkId) -> Vec<Body<'_>> {
    let Some(source) = graph.chunk(chunk) else {
        return Vec::new();
    };

    let mut environment = Vec::with_capacity(source.portals().len() + 1);
    environment.push(Body::fixed(source.mesh()));
    for portal in source.portals() {
        if let Some(destination) = graph.destination(portal) {
            environment.push(Body::new(destination.mesh(), portal.transform()));
        }
    }
    environment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Chunk, Portal};
    use escher_core::{Mesh, OrientedFrame};

    fn doorway(z: f32) -> Mesh {
        Mesh::quad(
            Vec3::new(-1.0, 0.0, z),
            Vec3::new(1.0, 0.0, z),
            Vec3::new(1.0, 2.0, z),
            Vec3::new(-1.0, 2.0, z),
        )
    }

    fn portal(destination: u32, portal_id: u32, z: f32) -> Portal {
        Portal::new(
            Some(ChunkId(destination)),
            portal_id,
            doorway(z),
            OrientedFrame::new(Vec3::new(0.0, 0.0, z), Vec3::Z, Vec3::Y),
            OrientedFrame::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y),
        )
        .unwrap()
    }

    fn probe() -> Mesh {
        Mesh::cuboid(Vec3::new(-0.2, -1.0, -0.2), Vec3::new(0.2, 0.2, 0.2), 1)
    }

    fn graph(portals: Vec<Portal>) -> PortalGraph {
        let mut start = Chunk::new("start", Mesh::new());
        for portal in portals {
            start.push_portal(portal);
        }
        PortalGraph::new(vec![
            start,
            Chunk::new("first", Mesh::new()),
            Chunk::new("second", Mesh::new()),
        ])
        .unwrap()
    }

    #[test]
    fn test_crossing_against_portal_normal() {
        let graph = graph(vec![portal(1, 10, 1.0)]);
        let crossing = detect_crossing(
            &graph,
            ChunkId(0),
            &probe(),
            Vec3::new(0.0, 1.2, 1.15),
            Vec3::new(0.0, 0.0, -0.2),
            &CrossingConfig::default(),
        );

        let crossing = crossing.expect("moving through the doorway should cross it");
        assert_eq!(crossing.to, ChunkId(1));
        assert_eq!(crossing.portal_id, 10);
    }

    #[test]
    fn test_no_crossing_when_short_of_portal() {
        let graph = graph(vec![portal(1, 10, 1.0)]);
        let crossing = detect_crossing(
            &graph,
            ChunkId(0),
            &probe(),
            Vec3::new(0.0, 1.2, 1.5),
            Vec3::new(0.0, 0.0, -0.2),
            &CrossingConfig::default(),
        );
        assert!(crossing.is_none());
    }

    #[test]
    fn test_leaving_through_back_side_does_not_cross() {
        let graph = graph(vec![portal(1, 10, 1.0)]);
        let crossing = detect_crossing(
            &graph,
            ChunkId(0),
            &probe(),
            Vec3::new(0.0, 1.2, 0.9),
            Vec3::new(0.0, 0.0, 0.2),
            &CrossingConfig::default(),
        );
        assert!(crossing.is_none());
    }

    #[test]
    fn test_first_portal_in_list_order_wins() {
        let graph = graph(vec![portal(2, 20, 1.0), portal(1, 10, 1.0)]);
        let crossing = detect_crossing(
            &graph,
            ChunkId(0),
            &probe(),
            Vec3::new(0.0, 1.2, 1.15),
            Vec3::new(0.0, 0.0, -0.2),
            &CrossingConfig::default(),
        )
        .unwrap();

        assert_eq!(crossing.portal_index, 0);
        assert_eq!(crossing.to, ChunkId(2));
    }

    #[test]
    fn test_unknown_destination_never_crosses() {
        let graph = graph(vec![portal(9, 90, 1.0), portal(1, 10, 1.0)]);
        let crossing = detect_crossing(
            &graph,
            ChunkId(0),
            &probe(),
            Vec3::new(0.0, 1.2, 1.15),
            Vec3::new(0.0, 0.0, -0.2),
            &CrossingConfig::default(),
        )
        .unwrap();
        assert_eq!(crossing.portal_id, 10);
    }

    #[test]
    fn test_state_composes_orientation() {
        let mut state = WorldState::new(ChunkId(0));
        let step = Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0));
        let crossing = Crossing {
            from: ChunkId(0),
            to: ChunkId(1),
            portal_index: 0,
            portal_id: 1,
            transform: step,
        };

        state.apply(&crossing);
        state.apply(&crossing);

        assert_eq!(state.active_chunk, ChunkId(1));
        assert!(state
            .orientation
            .abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 0.0, 4.0)), 1e-6));
    }

    #[test]
    fn test_environment_includes_neighbours() {
        let floor = Mesh::quad(
            Vec3::new(-4.0, 0.0, -4.0),
            Vec3::new(-4.0, 0.0, 4.0),
            Vec3::new(4.0, 0.0, 4.0),
            Vec3::new(4.0, 0.0, -4.0),
        );
        let graph = PortalGraph::new(vec![
            Chunk::new("start", floor.clone())
                .with_portal(portal(1, 10, 1.0))
                .with_portal(portal(7, 70, -1.0)),
            Chunk::new("first", floor),
        ])
        .unwrap();

        let environment = collision_environment(&graph, ChunkId(0));
        assert_eq!(environment.len(), 2, "own mesh plus the one resolvable neighbour");
        assert_eq!(environment[1].transform, graph.chunk(ChunkId(0)).unwrap().portals()[0].transform());
        assert!(collision_environment(&graph, ChunkId(5)).is_empty());
    }
}
