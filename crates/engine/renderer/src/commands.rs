//! Abstract draw commands emitted by the portal traversal
//!
//! The traversal never talks to a graphics API. It submits a stream of
//! [`RenderCommand`]s to a [`Renderer`], which maps them onto whatever
//! backend it wraps. Every draw carries the model transform, the clip planes
//! to apply in world space and the stencil state to draw with.

use escher_core::{CameraView, Mesh, Plane};
use escher_world::ChunkId;
use glam::Mat4;

/// Stencil test and write state for one command
///
/// A pixel passes when `(stencil & test_mask) == (reference & test_mask)`.
/// Passing pixels of marking draws get `reference` written into the bits of
/// `write_mask`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StencilState {
    pub reference: u32,
    pub test_mask: u32,
    pub write_mask: u32,
    /// Depth test passes only on equal depth instead of less-or-equal
    pub depth_equal: bool,
    pub depth_write: bool,
}

/// Geometry to draw with its placement and clipping
#[derive(Clone, Copy, Debug)]
pub struct Draw<'a> {
    pub mesh: &'a Mesh,
    /// Chunk-local to world transform
    pub transform: Mat4,
    /// World-space half-spaces; fragments outside any of them are discarded
    pub clip_planes: &'a [Plane],
}

#[derive(Clone, Copy, Debug)]
pub enum RenderCommand<'a> {
    /// Depth-only pass of a chunk
    Depth {
        chunk: ChunkId,
        draw: Draw<'a>,
        stencil: StencilState,
    },
    /// Shaded pass of a chunk, depth tested against its depth pass
    Color {
        chunk: ChunkId,
        draw: Draw<'a>,
        stencil: StencilState,
    },
    /// Portal footprint written into the stencil buffer only
    StencilMark {
        portal_id: u32,
        draw: Draw<'a>,
        stencil: StencilState,
    },
    /// Reset depth to the far plane where the stencil test passes
    ClearDepth { stencil: StencilState },
    /// Zero the given stencil bits everywhere
    ClearStencil { mask: u32 },
}

impl RenderCommand<'_> {
    pub fn kind(&self) -> CommandKind {
        match self {
            RenderCommand::Depth { .. } => CommandKind::Depth,
            RenderCommand::Color { .. } => CommandKind::Color,
            RenderCommand::StencilMark { .. } => CommandKind::StencilMark,
            RenderCommand::ClearDepth { .. } => CommandKind::ClearDepth,
            RenderCommand::ClearStencil { .. } => CommandKind::ClearStencil,
        }
    }

    pub fn draw(&self) -> Option<&Draw<'_>> {
        match self {
            RenderCommand::Depth { draw, .. }
            | RenderCommand::Color { draw, .. }
            | RenderCommand::StencilMark { draw, .. } => Some(draw),
            RenderCommand::ClearDepth { .. } | RenderCommand::ClearStencil { .. } => None,
        }
    }

    pub fn stencil(&self) -> StencilState {
        match self {
            RenderCommand::Depth { stencil, .. }
            | RenderCommand::Color { stencil, .. }
            | RenderCommand::StencilMark { stencil, .. }
            | RenderCommand::ClearDepth { stencil } => *stencil,
            RenderCommand::ClearStencil { mask } => StencilState {
                write_mask: *mask,
                ..Default::default()
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Depth,
    Color,
    StencilMark,
    ClearDepth,
    ClearStencil,
}

/// Backend the traversal draws through
pub trait Renderer {
    /// Called once per frame before any command, with the global camera
    fn begin_frame(&mut self, _camera: &CameraView) {}

    fn submit(&mut self, command: RenderCommand<'_>);

    fn end_frame(&mut self) {}
}

/// Owned copy of a submitted command
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCommand {
    pub kind: CommandKind,
    pub chunk: Option<ChunkId>,
    pub portal_id: Option<u32>,
    pub transform: Option<Mat4>,
    pub clip_planes: Vec<Plane>,
    pub face_count: usize,
    pub stencil: StencilState,
}

impl From<&RenderCommand<'_>> for RecordedCommand {
    fn from(command: &RenderCommand<'_>) -> Self {
        let (chunk, portal_id) = match command {
            RenderCommand::Depth { chunk, .. } | RenderCommand::Color { chunk, .. } => {
                (Some(*chunk), None)
            }
            RenderCommand::StencilMark { portal_id, .. } => (None, Some(*portal_id)),
            _ => (None, None),
        };
        let draw = command.draw();
        Self {
            kind: command.kind(),
            chunk,
            portal_id,
            transform: draw.map(|d| d.transform),
            clip_planes: draw.map(|d| d.clip_planes.to_vec()).unwrap_or_default(),
            face_count: draw.map_or(0, |d| d.mesh.faces().len()),
            stencil: command.stencil(),
        }
    }
}

/// Renderer that keeps the command stream of the last frame
///
/// Used headless by the testbed and by tests that check traversal order.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    frames: usize,
    camera: Option<CameraView>,
    commands: Vec<RecordedCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    pub fn of_kind(&self, kind: CommandKind) -> impl Iterator<Item = &RecordedCommand> {
        self.commands.iter().filter(move |c| c.kind == kind)
    }

    /// Chunks in the order their color pass was submitted
    pub fn chunks_drawn(&self) -> Vec<ChunkId> {
        self.of_kind(CommandKind::Color)
            .filter_map(|c| c.chunk)
            .collect()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }
}

impl Renderer for CommandRecorder {
    fn begin_frame(&mut self, camera: &CameraView) {
        self.commands.clear();
        self.camera = Some(*camera);
        self.frames += 1;
    }

    fn submit(&mut self, command: RenderCommand<'_>) {
        self.commands.push(RecordedCommand::from(&command));
    }
}
