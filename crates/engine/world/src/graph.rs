//! Static chunk and portal graph
//!
//! Chunks are built once and never change. Every spatial relation between
//! chunks is carried by a portal's pair of oriented frames; a chunk's own mesh
//! is always expressed in its own local frame.

use std::collections::HashMap;
use std::fmt;

use escher_core::{Mesh, OrientedFrame};
use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// Dense chunk index, assigned in load order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(pub u32);

impl ChunkId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Map from destination-chunk coordinates into source-chunk coordinates
///
/// `inverse(frame(local)) * frame(remote)`: a point one unit along
/// `remote.normal` from `remote.origin` lands one unit along `local.normal`
/// from `local.origin`.
pub fn portal_transform(local: &OrientedFrame, remote: &OrientedFrame) -> Mat4 {
    local.to_matrix().inverse() * remote.to_matrix()
}

/// An oriented opening from one chunk into another
///
/// The portal mesh lies in the source chunk and faces `local.normal`, the
/// side the opening is seen and entered from.
#[derive(Clone, Debug)]
pub struct Portal {
    destination: Option<ChunkId>,
    portal_id: u32,
    mesh: Mesh,
    local: OrientedFrame,
    remote: OrientedFrame,
    transform: Mat4,
}

impl Portal {
    /// # Arguments
    /// * `destination` - Chunk seen through the opening; `None` if unknown
    /// * `portal_id` - Shared by both sides of the same opening
    /// * `mesh` - Footprint of the opening in the source chunk
    /// * `local` - Frame on the source side
    /// * `remote` - Matching frame in the destination chunk
    pub fn new(
        destination: Option<ChunkId>,
        portal_id: u32,
        mesh: Mesh,
        local: OrientedFrame,
        remote: OrientedFrame,
    ) -> Result<Self> {
        for (frame, side) in [(&local, "local"), (&remote, "remote")] {
            if frame.is_degenerate() {
                return Err(WorldError::DegenerateFrame {
                    context: format!("portal {portal_id} {side} frame"),
                });
            }
        }

        Ok(Self {
            destination,
            portal_id,
            mesh,
            local,
            remote,
            transform: portal_transform(&local, &remote),
        })
    }

    /// The same opening seen from the destination chunk
    ///
    /// The footprint is carried into destination coordinates and flipped so
    /// that it faces the destination-side viewer.
    pub fn mirrored(&self, source: ChunkId) -> Self {
        let local = self.remote.reversed();
        let remote = self.local.reversed();
        Self {
            destination: Some(source),
            portal_id: self.portal_id,
            mesh: self.mesh.transformed(&self.transform.inverse()).flipped(),
            local,
            remote,
            transform: portal_transform(&local, &remote),
        }
    }

    pub fn destination(&self) -> Option<ChunkId> {
        self.destination
    }

    pub fn portal_id(&self) -> u32 {
        self.portal_id
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn local(&self) -> &OrientedFrame {
        &self.local
    }

    pub fn remote(&self) -> &OrientedFrame {
        &self.remote
    }

    /// Cached [`portal_transform`] of this portal's frames
    pub fn transform(&self) -> Mat4 {
        self.transform
    }
}

/// One self-contained mesh region with its outgoing portals
#[derive(Clone, Debug)]
pub struct Chunk {
    id: ChunkId,
    name: String,
    mesh: Mesh,
    portals: Vec<Portal>,
}

impl Chunk {
    /// Start a chunk; its id is assigned when the graph is built
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            id: ChunkId(0),
            name: name.into(),
            mesh,
            portals: Vec::new(),
        }
    }

    pub fn with_portal(mut self, portal: Portal) -> Self {
        self.portals.push(portal);
        self
    }

    pub fn push_portal(&mut self, portal: Portal) {
        self.portals.push(portal);
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Portals in declaration order; order decides crossing ties
    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }
}

/// Read-only lookup over all chunks of a world
#[derive(Clone, Debug)]
pub struct PortalGraph {
    chunks: Vec<Chunk>,
    names: HashMap<String, ChunkId>,
}

impl PortalGraph {
    /// Build a graph; chunk `i` in `chunks` gets `ChunkId(i)`
    pub fn new(chunks: Vec<Chunk>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(WorldError::Empty);
        }

        let mut names = HashMap::with_capacity(chunks.len());
        let mut numbered = Vec::with_capacity(chunks.len());
        for (index, mut chunk) in chunks.into_iter().enumerate() {
            let id = ChunkId(index as u32);
            if names.insert(chunk.name.clone(), id).is_some() {
                return Err(WorldError::DuplicateChunk(chunk.name));
            }
            chunk.id = id;
            numbered.push(chunk);
        }

        for chunk in &numbered {
            for portal in &chunk.portals {
                match portal.destination {
                    Some(id) if id.index() < numbered.len() => {}
                    Some(id) => tracing::warn!(
                        "Portal {} in chunk '{}' leads to missing chunk {}",
                        portal.portal_id,
                        chunk.name,
                        id
                    ),
                    None => tracing::warn!(
                        "Portal {} in chunk '{}' has no destination",
                        portal.portal_id,
                        chunk.name
                    ),
                }
            }
        }

        Ok(Self {
            chunks: numbered,
            names,
        })
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(id.index())
    }

    pub fn chunk_by_name(&self, name: &str) -> Option<&Chunk> {
        self.names.get(name).and_then(|id| self.chunk(*id))
    }

    pub fn id_of(&self, name: &str) -> Option<ChunkId> {
        self.names.get(name).copied()
    }

    /// The chunk a portal leads to, if it exists
    pub fn destination(&self, portal: &Portal) -> Option<&Chunk> {
        portal.destination.and_then(|id| self.chunk(id))
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn frame(origin: Vec3, normal: Vec3) -> OrientedFrame {
        OrientedFrame::new(origin, normal, Vec3::Y)
    }

    fn opening() -> Mesh {
        Mesh::quad(
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 2.0, 1.0),
            Vec3::new(-1.0, 2.0, 1.0),
        )
    }

    #[test]
    fn test_translation_only_frames_give_translation() {
        let local = frame(Vec3::new(3.0, 1.0, -2.0), Vec3::new(1.0, 0.0, 1.0));
        let remote = frame(Vec3::new(-5.0, 4.0, 7.0), Vec3::new(1.0, 0.0, 1.0));
        let transform = portal_transform(&local, &remote);
        let expected = Mat4::from_translation(local.origin - remote.origin);
        assert!(
            transform.abs_diff_eq(expected, 1e-5),
            "expected {expected:?}, got {transform:?}"
        );
    }

    #[test]
    fn test_transform_maps_remote_frame_onto_local_frame() {
        let local = frame(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        let remote = frame(Vec3::ZERO, Vec3::NEG_Z);
        let transform = portal_transform(&local, &remote);

        let origin = transform.transform_point3(remote.origin);
        let ahead = transform.transform_point3(remote.origin + remote.normal);
        assert!(origin.abs_diff_eq(local.origin, 1e-5), "got {origin:?}");
        assert!(ahead.abs_diff_eq(local.origin + local.normal, 1e-5), "got {ahead:?}");
        assert!(transform.transform_vector3(Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_mirror_inverts_transform() {
        let portal = Portal::new(
            Some(ChunkId(1)),
            7,
            opening(),
            frame(Vec3::new(0.0, 0.0, 1.0), Vec3::Z),
            frame(Vec3::new(4.0, 0.0, 0.0), Vec3::X),
        )
        .unwrap();
        let mirror = portal.mirrored(ChunkId(0));

        assert_eq!(mirror.portal_id(), 7);
        assert_eq!(mirror.destination(), Some(ChunkId(0)));
        let round_trip = portal.transform() * mirror.transform();
        assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-5), "got {round_trip:?}");

        // The mirrored footprint faces the mirror's local normal
        for face in mirror.mesh().faces() {
            let normal = face.normal().normalize();
            assert!(
                normal.abs_diff_eq(mirror.local().normal, 1e-5),
                "face normal {normal:?} vs frame {:?}",
                mirror.local().normal
            );
        }
    }

    #[test]
    fn test_degenerate_frame_is_rejected() {
        let result = Portal::new(
            None,
            1,
            opening(),
            frame(Vec3::ZERO, Vec3::Y),
            frame(Vec3::ZERO, Vec3::Z),
        );
        assert!(matches!(result, Err(WorldError::DegenerateFrame { .. })));
    }

    #[test]
    fn test_graph_assigns_ids_and_resolves_names() {
        let graph = PortalGraph::new(vec![
            Chunk::new("hall", Mesh::new()),
            Chunk::new("attic", Mesh::new()),
        ])
        .unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.id_of("attic"), Some(ChunkId(1)));
        assert_eq!(graph.chunk(ChunkId(1)).map(Chunk::name), Some("attic"));
        assert!(graph.chunk(ChunkId(5)).is_none());
        assert_eq!(graph.chunk_by_name("hall").map(Chunk::id), Some(ChunkId(0)));
    }

    #[test]
    fn test_graph_rejects_duplicates_and_empty_worlds() {
        assert!(matches!(PortalGraph::new(Vec::new()), Err(WorldError::Empty)));
        let result = PortalGraph::new(vec![
            Chunk::new("hall", Mesh::new()),
            Chunk::new("hall", Mesh::new()),
        ]);
        assert!(matches!(result, Err(WorldError::DuplicateChunk(name)) if name == "hall"));
    }

    #[test]
    fn test_dangling_destination_is_unknown() {
        let portal = Portal::new(
            Some(ChunkId(9)),
            3,
            opening(),
            frame(Vec3::new(0.0, 0.0, 1.0), Vec3::Z),
            frame(Vec3::ZERO, Vec3::NEG_Z),
        )
        .unwrap();
        let graph = PortalGraph::new(vec![Chunk::new("hall", Mesh::new()).with_portal(portal)]).unwrap();
        let hall = graph.chunk(ChunkId(0)).unwrap();
        assert!(graph.destination(&hall.portals()[0]).is_none());
    }
}
