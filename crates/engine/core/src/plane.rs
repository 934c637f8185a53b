//! Half-space planes
//!
//! A plane keeps everything on the side its normal points to. The normal is
//! not required to be unit length; only signs are ever compared.

use glam::{Mat3, Mat4, Vec3};

/// Plane through `point` whose inside is `{x : (x - point) . normal >= 0}`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub const fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Signed distance scaled by the normal length
    pub fn signed_distance(&self, position: Vec3) -> f32 {
        (position - self.point).dot(self.normal)
    }

    pub fn contains(&self, position: Vec3) -> bool {
        self.signed_distance(position) >= 0.0
    }

    /// Map the plane through an affine transform
    ///
    /// Normals are carried by the inverse transpose so that non-rigid
    /// transforms keep the plane perpendicular to its normal.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();
        Self {
            point: transform.transform_point3(self.point),
            normal: normal_matrix * self.normal,
        }
    }
}
