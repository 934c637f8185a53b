//! Serializable world description
//!
//! Worlds are stored as RON. Chunks refer to each other by name; names are
//! resolved to [`ChunkId`]s when the description is turned into a
//! [`PortalGraph`]. A portal naming a chunk that does not exist is kept with
//! an unknown destination rather than rejected.

use std::fs;
use std::path::Path;

use escher_core::{Mesh, OrientedFrame, Triangle};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};
use crate::graph::{Chunk, ChunkId, Portal, PortalGraph};

/// Indexed triangle and quad lists
///
/// Quads `(a, b, c, d)` are split into `(a, b, c)` and `(c, d, a)`. Vertices
/// not referenced by any face still count as physical vertices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDescription {
    #[serde(default)]
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub triangles: Vec<[u32; 3]>,
    #[serde(default)]
    pub quads: Vec<[u32; 4]>,
}

impl MeshDescription {
    /// Describe an existing mesh as an indexed triangle list
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let vertices: Vec<[f32; 3]> = mesh.vertices().iter().map(|v| v.to_array()).collect();
        let index_of = |corner: Vec3| {
            mesh.vertices()
                .iter()
                .position(|v| *v == corner)
                .unwrap_or_default() as u32
        };
        let triangles = mesh
            .faces()
            .iter()
            .map(|face| [index_of(face.a), index_of(face.b), index_of(face.c)])
            .collect();

        Self {
            vertices,
            triangles,
            quads: Vec::new(),
        }
    }

    /// Resolve indices into a [`Mesh`]
    ///
    /// # Arguments
    /// * `context` - Prefix for error messages, e.g. the chunk name
    pub fn build(&self, context: &str) -> Result<Mesh> {
        let vertex = |index: u32| -> Result<Vec3> {
            self.vertices
                .get(index as usize)
                .map(|v| Vec3::from_array(*v))
                .ok_or_else(|| WorldError::VertexIndex {
                    context: context.to_string(),
                    index,
                    count: self.vertices.len(),
                })
        };

        let mut faces = Vec::with_capacity(self.triangles.len() + 2 * self.quads.len());
        for [a, b, c] in &self.triangles {
            faces.push(Triangle::new(vertex(*a)?, vertex(*b)?, vertex(*c)?));
        }
        for [a, b, c, d] in &self.quads {
            let (a, b, c, d) = (vertex(*a)?, vertex(*b)?, vertex(*c)?, vertex(*d)?);
            faces.push(Triangle::new(a, b, c));
            faces.push(Triangle::new(c, d, a));
        }

        let extra: Vec<Vec3> = self.vertices.iter().map(|v| Vec3::from_array(*v)).collect();
        Ok(Mesh::from_parts(faces, &extra))
    }
}

/// Oriented frame with array coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameDescription {
    pub origin: [f32; 3],
    pub normal: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

impl From<FrameDescription> for OrientedFrame {
    fn from(frame: FrameDescription) -> Self {
        OrientedFrame::new(
            Vec3::from_array(frame.origin),
            Vec3::from_array(frame.normal),
            Vec3::from_array(frame.up),
        )
    }
}

impl From<&OrientedFrame> for FrameDescription {
    fn from(frame: &OrientedFrame) -> Self {
        Self {
            origin: frame.origin.to_array(),
            normal: frame.normal.to_array(),
            up: frame.up.to_array(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalDescription {
    /// Name of the destination chunk
    pub chunk: String,
    pub portal_id: u32,
    pub mesh: MeshDescription,
    pub local: FrameDescription,
    pub remote: FrameDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDescription {
    pub name: String,
    pub mesh: MeshDescription,
    #[serde(default)]
    pub portals: Vec<PortalDescription>,
}

/// Where the controller starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDescription {
    /// Starting chunk; the first chunk when omitted
    #[serde(default)]
    pub chunk: Option<String>,
    /// Eye position in that chunk's local frame
    pub position: [f32; 3],
    #[serde(default)]
    pub yaw: f32,
}

impl Default for SpawnDescription {
    fn default() -> Self {
        Self {
            chunk: None,
            position: [0.0, 1.5, 0.0],
            yaw: 0.0,
        }
    }
}

/// Complete description of a world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDescription {
    pub chunks: Vec<ChunkDescription>,
    #[serde(default)]
    pub spawn: SpawnDescription,
}

impl WorldDescription {
    /// Load a world description from a RON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    pub fn from_ron_str(content: &str) -> Result<Self> {
        ron::from_str(content).map_err(|e| WorldError::Parse(e.to_string()))
    }

    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::new().depth_limit(4);
        ron::ser::to_string_pretty(self, config).map_err(|e| WorldError::Serialize(e.to_string()))
    }

    /// Describe an already built graph, e.g. a generated scene
    pub fn from_graph(graph: &PortalGraph, spawn: SpawnDescription) -> Self {
        let chunks = graph
            .chunks()
            .map(|chunk| ChunkDescription {
                name: chunk.name().to_string(),
                mesh: MeshDescription::from_mesh(chunk.mesh()),
                portals: chunk
                    .portals()
                    .iter()
                    .map(|portal| PortalDescription {
                        chunk: graph
                            .destination(portal)
                            .map(|c| c.name().to_string())
                            .unwrap_or_default(),
                        portal_id: portal.portal_id(),
                        mesh: MeshDescription::from_mesh(portal.mesh()),
                        local: portal.local().into(),
                        remote: portal.remote().into(),
                    })
                    .collect(),
            })
            .collect();

        Self { chunks, spawn }
    }

    /// Resolve names and build the graph
    pub fn build_graph(&self) -> Result<PortalGraph> {
        let ids: std::collections::HashMap<&str, ChunkId> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| (chunk.name.as_str(), ChunkId(index as u32)))
            .collect();

        let mut chunks = Vec::with_capacity(self.chunks.len());
        for description in &self.chunks {
            let mut chunk = Chunk::new(&description.name, description.mesh.build(&description.name)?);
            for portal in &description.portals {
                let context = format!("{} portal {}", description.name, portal.portal_id);
                let destination = ids.get(portal.chunk.as_str()).copied();
                if destination.is_none() {
                    tracing::warn!("{}: destination chunk '{}' not found", context, portal.chunk);
                }
                let built = Portal::new(
                    destination,
                    portal.portal_id,
                    portal.mesh.build(&context)?,
                    portal.local.into(),
                    portal.remote.into(),
                )
                .map_err(|e| match e {
                    WorldError::DegenerateFrame { .. } => WorldError::DegenerateFrame { context },
                    other => other,
                })?;
                chunk.push_portal(built);
            }
            chunks.push(chunk);
        }

        let graph = PortalGraph::new(chunks)?;
        tracing::info!(
            "Built world with {} chunks and {} portals",
            graph.len(),
            graph.chunks().map(|c| c.portals().len()).sum::<usize>()
        );
        Ok(graph)
    }

    /// Starting chunk and eye position
    pub fn spawn_point(&self, graph: &PortalGraph) -> Result<(ChunkId, Vec3)> {
        let chunk = match &self.spawn.chunk {
            Some(name) => graph
                .id_of(name)
                .ok_or_else(|| WorldError::UnknownChunk(name.clone()))?,
            None => ChunkId(0),
        };
        Ok((chunk, Vec3::from_array(self.spawn.position)))
    }
}
