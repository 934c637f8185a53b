//! Breadth-first stencil traversal of the portal graph
//!
//! The active chunk is drawn first, then every visible portal is marked in
//! the stencil buffer and its destination queued one level deeper. Regions of
//! a level are committed together before the next level draws: the depth
//! equality pass keeps only the unoccluded part of each portal, depth is
//! reset inside the region and the flag bit is cleared.

use std::collections::VecDeque;
use std::fmt;

use escher_core::{CameraView, Plane};
use escher_world::{Chunk, ChunkId, Portal, PortalGraph, WorldState};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::commands::{Draw, RenderCommand, Renderer, StencilState};
use crate::stencil::{CyclingMaskAllocator, MaskAllocator, DEFAULT_STENCIL_BITS};
use crate::visibility::{
    frustum_planes, mesh_visible, portal_bounds, portal_clip_plane, ViewBounds, FRUSTUM_PLANES,
};

/// Default number of traversal levels, the active chunk included
pub const MAX_ITERATIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Levels drawn, the active chunk being level 0
    pub max_depth: usize,
    /// Stencil bits available to the traversal
    pub stencil_bits: u8,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_ITERATIONS,
            stencil_bits: DEFAULT_STENCIL_BITS,
        }
    }
}

/// What one frame's traversal did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderMetrics {
    /// Chunk visits, one chunk may be visited more than once
    pub chunks: usize,
    /// Levels reached, 1 when only the active chunk was drawn
    pub depth: usize,
    /// Widest level
    pub breadth: usize,
    pub peak_queue: usize,
    pub stencil_reuses: usize,
}

impl fmt::Display for RenderMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunks: {} depth: {} breadth: {} queue: {}",
            self.chunks, self.depth, self.breadth, self.peak_queue
        )
    }
}

/// The portal instance an entry was reached through
#[derive(Debug, Clone, Copy)]
struct Arrival {
    portal_id: u32,
    from: ChunkId,
    portal_index: usize,
}

impl Arrival {
    /// Whether `portal` is the opposite side of the arrival portal
    ///
    /// The arrival portal itself is not its own mirror: a portal leading back
    /// into its own chunk keeps nesting.
    fn is_mirrored_by(
        &self,
        chunk: ChunkId,
        index: usize,
        portal: &Portal,
        destination: ChunkId,
    ) -> bool {
        let same_instance = chunk == self.from && index == self.portal_index;
        portal.portal_id() == self.portal_id && destination == self.from && !same_instance
    }
}

#[derive(Debug)]
struct TraversalEntry<'g> {
    chunk: &'g Chunk,
    arrival: Option<Arrival>,
    orientation: Mat4,
    bounds: ViewBounds,
    clip_planes: Vec<Plane>,
    depth: usize,
    stencil_id: u32,
}

/// A marked portal waiting for its level to be committed
#[derive(Debug)]
struct PendingRegion<'g> {
    portal: &'g Portal,
    orientation: Mat4,
    clip_planes: Vec<Plane>,
    stencil_id: u32,
}

/// Draw the world as seen from `camera`
///
/// The camera is in global space; `state.orientation` places the active
/// chunk in it. Each chunk visit submits a depth and a color pass restricted
/// to its stencil region.
pub fn render_world<R: Renderer + ?Sized>(
    graph: &PortalGraph,
    state: &WorldState,
    camera: &CameraView,
    config: &TraversalConfig,
    renderer: &mut R,
) -> RenderMetrics {
    let mut metrics = RenderMetrics::default();
    let Some(root) = graph.chunk(state.active_chunk) else {
        warn!(chunk = %state.active_chunk, "Active chunk is not in the graph");
        return metrics;
    };

    let mut allocator = CyclingMaskAllocator::new(config.stencil_bits);
    renderer.begin_frame(camera);

    let bounds = ViewBounds::full(camera);
    let mut queue = VecDeque::from([TraversalEntry {
        chunk: root,
        arrival: None,
        orientation: state.orientation,
        bounds,
        clip_planes: frustum_planes(camera, &bounds),
        depth: 0,
        stencil_id: 0,
    }]);
    metrics.peak_queue = queue.len();

    let mut pending = Vec::new();
    let mut level = 0;
    let mut level_width = 0;

    while let Some(entry) = queue.pop_front() {
        if entry.depth != level {
            commit_regions(renderer, &allocator, &mut pending);
            metrics.breadth = metrics.breadth.max(level_width);
            level = entry.depth;
            level_width = 0;
        }
        level_width += 1;
        metrics.chunks += 1;
        metrics.depth = metrics.depth.max(entry.depth + 1);

        trace!(chunk = %entry.chunk.id(), depth = entry.depth, stencil = entry.stencil_id, "Visiting chunk");
        visit(
            graph,
            camera,
            config,
            &entry,
            &mut allocator,
            renderer,
            &mut queue,
            &mut pending,
        );
        metrics.peak_queue = metrics.peak_queue.max(queue.len());
    }

    metrics.breadth = metrics.breadth.max(level_width);
    metrics.stencil_reuses = allocator.reuses();
    renderer.end_frame();
    metrics
}

#[allow(clippy::too_many_arguments)]
fn visit<'g, R: Renderer + ?Sized>(
    graph: &'g PortalGraph,
    camera: &CameraView,
    config: &TraversalConfig,
    entry: &TraversalEntry<'g>,
    allocator: &mut CyclingMaskAllocator,
    renderer: &mut R,
    queue: &mut VecDeque<TraversalEntry<'g>>,
    pending: &mut Vec<PendingRegion<'g>>,
) {
    let region = StencilState {
        reference: allocator.combine(false, entry.stencil_id),
        test_mask: allocator.value_mask(),
        write_mask: 0,
        depth_equal: false,
        depth_write: true,
    };
    let draw = Draw {
        mesh: entry.chunk.mesh(),
        transform: entry.orientation,
        clip_planes: &entry.clip_planes,
    };
    renderer.submit(RenderCommand::Depth {
        chunk: entry.chunk.id(),
        draw,
        stencil: region,
    });
    renderer.submit(RenderCommand::Color {
        chunk: entry.chunk.id(),
        draw,
        stencil: StencilState {
            depth_write: false,
            ..region
        },
    });

    if entry.depth + 1 >= config.max_depth {
        return;
    }

    for (index, portal) in entry.chunk.portals().iter().enumerate() {
        let Some(destination) = graph.destination(portal) else {
            continue;
        };
        let chunk = entry.chunk.id();
        if entry
            .arrival
            .is_some_and(|a| a.is_mirrored_by(chunk, index, portal, destination.id()))
        {
            continue;
        }
        if !mesh_visible(&entry.clip_planes, camera.eye, &entry.orientation, portal.mesh()) {
            continue;
        }
        let Some(bounds) = portal_bounds(camera, &entry.orientation, portal.mesh())
            .and_then(|b| b.intersect(&entry.bounds))
        else {
            continue;
        };

        let stencil_id = allocator.allocate_region(entry.stencil_id);
        renderer.submit(RenderCommand::StencilMark {
            portal_id: portal.portal_id(),
            draw: Draw {
                mesh: portal.mesh(),
                transform: entry.orientation,
                clip_planes: &entry.clip_planes,
            },
            stencil: StencilState {
                reference: allocator.combine(true, entry.stencil_id),
                test_mask: allocator.value_mask(),
                write_mask: allocator.flag_mask(),
                depth_equal: false,
                depth_write: true,
            },
        });

        // Frustum of the footprint, then every portal plane crossed so far
        let mut clip_planes = frustum_planes(camera, &bounds);
        clip_planes.extend_from_slice(&entry.clip_planes[FRUSTUM_PLANES..]);
        clip_planes.push(portal_clip_plane(&entry.orientation, portal.local()));

        pending.push(PendingRegion {
            portal,
            orientation: entry.orientation,
            clip_planes: entry.clip_planes.clone(),
            stencil_id,
        });
        queue.push_back(TraversalEntry {
            chunk: destination,
            arrival: Some(Arrival {
                portal_id: portal.portal_id(),
                from: entry.chunk.id(),
                portal_index: index,
            }),
            orientation: entry.orientation * portal.transform(),
            bounds,
            clip_planes,
            depth: entry.depth + 1,
            stencil_id,
        });
    }
}

/// Turn the flagged pixels of every pending portal into its region
fn commit_regions<R: Renderer + ?Sized>(
    renderer: &mut R,
    allocator: &CyclingMaskAllocator,
    pending: &mut Vec<PendingRegion<'_>>,
) {
    if pending.is_empty() {
        return;
    }

    for region in pending.iter() {
        renderer.submit(RenderCommand::StencilMark {
            portal_id: region.portal.portal_id(),
            draw: Draw {
                mesh: region.portal.mesh(),
                transform: region.orientation,
                clip_planes: &region.clip_planes,
            },
            stencil: StencilState {
                reference: allocator.combine(true, region.stencil_id),
                test_mask: allocator.flag_mask(),
                write_mask: allocator.value_mask(),
                depth_equal: true,
                depth_write: false,
            },
        });
    }
    for region in pending.iter() {
        renderer.submit(RenderCommand::ClearDepth {
            stencil: StencilState {
                reference: allocator.combine(false, region.stencil_id),
                test_mask: allocator.value_mask(),
                write_mask: 0,
                depth_equal: false,
                depth_write: true,
            },
        });
    }
    renderer.submit(RenderCommand::ClearStencil {
        mask: allocator.flag_mask(),
    });
    pending.clear();
}
