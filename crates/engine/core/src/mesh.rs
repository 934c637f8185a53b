//! Physical triangle soups
//!
//! Collision and visibility only ever look at the physical faces and the
//! physical vertex set of a mesh. Meshes handed to the collision engine should
//! be over-triangulated: a vertex resting exactly on another mesh's shared
//! edge is not blocked by either adjacent triangle, so builders here can add
//! redundant interior vertices through their `subdivisions` argument.

use std::collections::HashSet;

use glam::{Mat4, Vec3};

use crate::triangle::Triangle;

/// Read-only triangle-soup queries used by collision and visibility
pub trait PhysicalMesh {
    /// Triangles that block motion and occlude vision
    fn physical_faces(&self) -> &[Triangle];

    /// Deduplicated vertex set swept against other meshes' faces
    fn physical_vertices(&self) -> &[Vec3];
}

/// Owned triangle soup with a deduplicated vertex set
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    faces: Vec<Triangle>,
    vertices: Vec<Vec3>,
    vertex_keys: HashSet<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from triangles, collecting their corners as the vertex set
    pub fn from_triangles(faces: impl IntoIterator<Item = Triangle>) -> Self {
        let mut mesh = Self::new();
        for face in faces {
            mesh.push(face);
        }
        mesh
    }

    /// Build from triangles plus extra vertices that carry no face
    pub fn from_parts(faces: Vec<Triangle>, extra_vertices: &[Vec3]) -> Self {
        let mut mesh = Self::from_triangles(faces);
        for &vertex in extra_vertices {
            mesh.push_vertex(vertex);
        }
        mesh
    }

    /// Quad split into `(a, b, c)` and `(c, d, a)`
    pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self::from_triangles([Triangle::new(a, b, c), Triangle::new(c, d, a)])
    }

    /// Bilinear quad split into `subdivisions x subdivisions` cells
    ///
    /// `subdivisions` of 0 or 1 is a plain [`Mesh::quad`].
    pub fn subdivided_quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, subdivisions: u32) -> Self {
        let mut mesh = Self::new();
        mesh.push_quad_grid([a, b, c, d], subdivisions.max(1));
        mesh
    }

    /// Axis-aligned box with outward-facing triangles
    pub fn cuboid(min: Vec3, max: Vec3, subdivisions: u32) -> Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let faces = [
            // +X
            [
                Vec3::new(x1, y0, z1),
                Vec3::new(x1, y0, z0),
                Vec3::new(x1, y1, z0),
                Vec3::new(x1, y1, z1),
            ],
            // -X
            [
                Vec3::new(x0, y0, z0),
                Vec3::new(x0, y0, z1),
                Vec3::new(x0, y1, z1),
                Vec3::new(x0, y1, z0),
            ],
            // +Y
            [
                Vec3::new(x0, y1, z0),
                Vec3::new(x0, y1, z1),
                Vec3::new(x1, y1, z1),
                Vec3::new(x1, y1, z0),
            ],
            // -Y
            [
                Vec3::new(x0, y0, z0),
                Vec3::new(x1, y0, z0),
                Vec3::new(x1, y0, z1),
                Vec3::new(x0, y0, z1),
            ],
            // +Z
            [
                Vec3::new(x0, y0, z1),
                Vec3::new(x1, y0, z1),
                Vec3::new(x1, y1, z1),
                Vec3::new(x0, y1, z1),
            ],
            // -Z
            [
                Vec3::new(x1, y0, z0),
                Vec3::new(x0, y0, z0),
                Vec3::new(x0, y1, z0),
                Vec3::new(x1, y1, z0),
            ],
        ];

        let mut mesh = Self::new();
        for corners in faces {
            mesh.push_quad_grid(corners, subdivisions.max(1));
        }
        mesh
    }

    /// Add one triangle and any of its corners not yet in the vertex set
    pub fn push(&mut self, face: Triangle) {
        for corner in face.vertices() {
            self.push_vertex(corner);
        }
        self.faces.push(face);
    }

    fn push_vertex(&mut self, vertex: Vec3) {
        if self.vertex_keys.insert(vertex_key(vertex)) {
            self.vertices.push(vertex);
        }
    }

    /// Append every face of another mesh
    pub fn extend(&mut self, other: &Mesh) {
        for &face in &other.faces {
            self.push(face);
        }
    }

    /// Same mesh seen from the other side
    pub fn flipped(&self) -> Self {
        Self {
            faces: self.faces.iter().map(Triangle::flipped).collect(),
            ..self.clone()
        }
    }

    pub fn transformed(&self, transform: &Mat4) -> Self {
        let vertices: Vec<Vec3> = self
            .vertices
            .iter()
            .map(|v| transform.transform_point3(*v))
            .collect();
        Self::from_parts(
            self.faces.iter().map(|f| f.transformed(transform)).collect(),
            &vertices,
        )
    }

    pub fn faces(&self) -> &[Triangle] {
        &self.faces
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    fn push_quad_grid(&mut self, [a, b, c, d]: [Vec3; 4], cells: u32) {
        let point = |i: u32, j: u32| {
            let s = i as f32 / cells as f32;
            let t = j as f32 / cells as f32;
            a + s * (b - a) + t * (d - a) + s * t * (a - b + c - d)
        };
        for j in 0..cells {
            for i in 0..cells {
                let p00 = point(i, j);
                let p10 = point(i + 1, j);
                let p11 = point(i + 1, j + 1);
                let p01 = point(i, j + 1);
                self.push(Triangle::new(p00, p10, p11));
                self.push(Triangle::new(p11, p01, p00));
            }
        }
    }
}

impl PhysicalMesh for Mesh {
    fn physical_faces(&self) -> &[Triangle] {
        &self.faces
    }

    fn physical_vertices(&self) -> &[Vec3] {
        &self.vertices
    }
}

fn vertex_key(vertex: Vec3) -> [u32; 3] {
    // Fold -0.0 into 0.0 so both spellings of a corner dedup together
    let v = vertex + Vec3::ZERO;
    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}
