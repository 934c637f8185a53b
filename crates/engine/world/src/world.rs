//! Per-tick world update
//!
//! Movement runs in the active chunk's local frame. When the controller
//! passes through a portal it is re-expressed in the destination chunk's
//! frame and the portal transform is folded into the world orientation, so
//! `orientation * local` stays continuous.

use escher_core::{CameraConfig, CameraView};
use escher_physics::{CharacterController, CharacterControllerConfig, ControlInput};
use glam::Vec3;

use crate::crossing::{collision_environment, detect_crossing, Crossing, CrossingConfig, WorldState};
use crate::description::WorldDescription;
use crate::error::{Result, WorldError};
use crate::graph::{ChunkId, PortalGraph};

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Displacement in the pre-tick chunk frame
    pub moved: Vec3,
    /// Displacement in world space
    pub world_motion: Vec3,
    pub crossing: Option<Crossing>,
}

/// A portal graph plus the controller walking through it
#[derive(Debug, Clone)]
pub struct World {
    graph: PortalGraph,
    state: WorldState,
    controller: CharacterController,
    crossing: CrossingConfig,
}

impl World {
    /// # Arguments
    /// * `graph` - Static chunk graph
    /// * `spawn_chunk` - Chunk the controller starts in
    /// * `spawn_position` - Eye position in that chunk's frame
    /// * `controller` - Character configuration
    /// * `crossing` - Crossing sample configuration
    pub fn new(
        graph: PortalGraph,
        spawn_chunk: ChunkId,
        spawn_position: Vec3,
        controller: CharacterControllerConfig,
        crossing: CrossingConfig,
    ) -> Result<Self> {
        if graph.chunk(spawn_chunk).is_none() {
            return Err(WorldError::UnknownChunk(spawn_chunk.to_string()));
        }

        Ok(Self {
            graph,
            state: WorldState::new(spawn_chunk),
            controller: CharacterController::new(spawn_position, controller),
            crossing,
        })
    }

    /// Build the graph and place the controller at the described spawn point
    pub fn from_description(
        description: &WorldDescription,
        controller: CharacterControllerConfig,
        crossing: CrossingConfig,
    ) -> Result<Self> {
        let graph = description.build_graph()?;
        let (chunk, position) = description.spawn_point(&graph)?;
        let mut world = Self::new(graph, chunk, position, controller, crossing)?;
        world.controller.set_look(description.spawn.yaw, 0.0);
        Ok(world)
    }

    /// Move the controller, then switch chunks if it walked through a portal
    pub fn update(&mut self, input: &ControlInput) -> TickReport {
        let origin = self.controller.position();
        let environment = collision_environment(&self.graph, self.state.active_chunk);
        let moved = self.controller.update(input, &environment);
        let world_motion = self.state.orientation.transform_vector3(moved);

        let crossing = detect_crossing(
            &self.graph,
            self.state.active_chunk,
            self.controller.body_mesh(),
            origin,
            moved,
            &self.crossing,
        );

        if let Some(crossing) = &crossing {
            self.state.apply(crossing);
            self.controller.reorient(&crossing.transform.inverse());
            tracing::debug!(
                "Crossed portal {} from chunk {} into chunk {}",
                crossing.portal_id,
                crossing.from,
                crossing.to
            );
        }

        TickReport {
            moved,
            world_motion,
            crossing,
        }
    }

    /// Camera at the controller's eye, mapped into world space
    pub fn camera_view(&self, camera: &CameraConfig, aspect: f32) -> CameraView {
        let orientation = self.state.orientation;
        CameraView::new(
            orientation.transform_point3(self.controller.head_position()),
            orientation.transform_vector3(self.controller.look_direction()),
            orientation.transform_vector3(Vec3::Y),
            camera,
            aspect,
        )
    }

    pub fn graph(&self) -> &PortalGraph {
        &self.graph
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CharacterController {
        &mut self.controller
    }
}
