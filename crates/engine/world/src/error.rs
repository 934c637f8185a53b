//! Errors raised while building a world

use std::path::PathBuf;

/// Failures while loading or validating a world description
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("failed to read world file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse world description: {0}")]
    Parse(String),

    #[error("failed to serialize world description: {0}")]
    Serialize(String),

    #[error("world has no chunks")]
    Empty,

    #[error("duplicate chunk name '{0}'")]
    DuplicateChunk(String),

    #[error("unknown chunk '{0}'")]
    UnknownChunk(String),

    #[error("{context}: vertex index {index} out of range ({count} vertices)")]
    VertexIndex {
        context: String,
        index: u32,
        count: usize,
    },

    #[error("{context}: frame normal is zero or parallel to its up vector")]
    DegenerateFrame { context: String },
}

pub type Result<T> = std::result::Result<T, WorldError>;
