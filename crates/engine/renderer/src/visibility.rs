//! View frustum and portal visibility tests
//!
//! Portal footprints are bounded on the view plane at unit distance from the
//! eye. A nested portal's bounds are intersected with its parent's, so a
//! traversal entry clips with four side planes plus near and far however deep
//! it is, followed by one plane per portal crossed to reach it.

use escher_core::{CameraView, Mesh, OrientedFrame, Plane};
use glam::{Mat4, Vec2, Vec3};

/// Axis-aligned rectangle on the view plane at unit distance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl ViewBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// The whole field of view
    pub fn full(camera: &CameraView) -> Self {
        let half = camera.half_extents();
        Self::new(-half, half)
    }

    /// Overlap of two rectangles, `None` if it has no area
    pub fn intersect(&self, other: &ViewBounds) -> Option<ViewBounds> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min.x < max.x && min.y < max.y).then_some(Self::new(min, max))
    }

    /// Four planes through the eye bounding this rectangle
    pub fn planes(&self, camera: &CameraView) -> [Plane; 4] {
        let eye = camera.eye;
        let side = camera.side();
        let up = camera.up_direction();
        let corner = |x: f32, y: f32| camera.direction + x * side + y * up;

        let bl = corner(self.min.x, self.min.y);
        let tl = corner(self.min.x, self.max.y);
        let br = corner(self.max.x, self.min.y);
        let tr = corner(self.max.x, self.max.y);

        [
            Plane::new(eye, br.cross(bl)),
            Plane::new(eye, tl.cross(tr)),
            Plane::new(eye, bl.cross(tl)),
            Plane::new(eye, tr.cross(br)),
        ]
    }
}

pub fn near_plane(camera: &CameraView) -> Plane {
    Plane::new(camera.eye + camera.z_near * camera.direction, camera.direction)
}

pub fn far_plane(camera: &CameraView) -> Plane {
    Plane::new(camera.eye + camera.z_far * camera.direction, -camera.direction)
}

/// Planes returned by [`frustum_planes`]
pub const FRUSTUM_PLANES: usize = 6;

/// Side planes of `bounds` plus near and far
pub fn frustum_planes(camera: &CameraView, bounds: &ViewBounds) -> Vec<Plane> {
    let mut planes = Vec::with_capacity(FRUSTUM_PLANES + 1);
    planes.extend(bounds.planes(camera));
    planes.push(near_plane(camera));
    planes.push(far_plane(camera));
    planes
}

/// The full view frustum
pub fn view_frustum(camera: &CameraView) -> Vec<Plane> {
    frustum_planes(camera, &ViewBounds::full(camera))
}

/// Half-space beyond a portal's opening
///
/// Geometry of the destination chunk that lands on the viewer's side of the
/// opening is cut away.
pub fn portal_clip_plane(transform: &Mat4, local: &OrientedFrame) -> Plane {
    Plane::new(local.origin, -local.normal).transformed(transform)
}

/// View-plane bounds of a mesh's part in front of the near plane
///
/// Returns `None` when nothing of the mesh is in front of the near plane.
/// The result is not clamped to the field of view.
pub fn portal_bounds(camera: &CameraView, transform: &Mat4, mesh: &Mesh) -> Option<ViewBounds> {
    let near = near_plane(camera);
    let mut bounds: Option<ViewBounds> = None;

    let mut include = |point: Vec3| {
        let coords = camera.view_plane_coords(point);
        bounds = Some(match bounds {
            Some(b) => ViewBounds::new(b.min.min(coords), b.max.max(coords)),
            None => ViewBounds::new(coords, coords),
        });
    };

    for face in mesh.faces() {
        let corners = face.transformed(transform).vertices();
        let distances = corners.map(|corner| near.signed_distance(corner));

        // Clip the triangle against the near plane one edge at a time
        for i in 0..3 {
            let j = (i + 1) % 3;
            let (p, q) = (corners[i], corners[j]);
            let (dp, dq) = (distances[i], distances[j]);
            if dp >= 0.0 {
                include(p);
            }
            if (dp >= 0.0) != (dq >= 0.0) {
                include(p + (q - p) * (dp / (dp - dq)));
            }
        }
    }

    bounds
}

/// Whether any front-facing triangle of a mesh may be inside all planes
///
/// Conservative: a triangle is only rejected when all three of its corners
/// are outside one and the same plane.
pub fn mesh_visible(planes: &[Plane], eye: Vec3, transform: &Mat4, mesh: &Mesh) -> bool {
    mesh.faces().iter().any(|face| {
        let face = face.transformed(transform);
        if face.normal().dot(eye - face.a) <= 0.0 {
            return false;
        }
        let corners = face.vertices();
        !planes
            .iter()
            .any(|plane| corners.iter().all(|corner| !plane.contains(*corner)))
    })
}
