//! Recursive portal rendering
//!
//! Chunks are drawn breadth first through their portals, each nested view
//! confined to its portal's footprint by the stencil buffer and clipped by
//! planes derived from that footprint. The traversal is backend agnostic: it
//! emits [`RenderCommand`]s to a [`Renderer`].

pub mod commands;
pub mod stencil;
pub mod traversal;
pub mod visibility;

pub use commands::{
    CommandKind, CommandRecorder, Draw, RecordedCommand, RenderCommand, Renderer, StencilState,
};
pub use stencil::{CyclingMaskAllocator, MaskAllocator};
pub use traversal::{render_world, RenderMetrics, TraversalConfig, MAX_ITERATIONS};
pub use visibility::{
    far_plane, frustum_planes, mesh_visible, near_plane, portal_bounds, portal_clip_plane,
    view_frustum, ViewBounds, FRUSTUM_PLANES,
};
