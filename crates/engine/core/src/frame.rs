//! Oriented frames and look-direction bases
//!
//! An [`OrientedFrame`] anchors one side of a portal. Its matrix is a
//! right-handed look-at basis, so two frames give a rigid map between the
//! chunks they belong to.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Origin plus forward normal and up vector
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientedFrame {
    pub origin: Vec3,
    pub normal: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
}

fn default_up() -> Vec3 {
    Vec3::Y
}

impl OrientedFrame {
    pub const fn new(origin: Vec3, normal: Vec3, up: Vec3) -> Self {
        Self { origin, normal, up }
    }

    /// World-to-frame look-at matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.origin, self.origin + self.normal, self.up)
    }

    /// True when no look-at basis exists for this frame
    pub fn is_degenerate(&self) -> bool {
        self.normal.length_squared() < f32::EPSILON
            || self.normal.cross(self.up).length_squared() < f32::EPSILON
    }

    /// The frame facing the other way from the same origin
    pub fn reversed(&self) -> Self {
        Self::new(self.origin, -self.normal, self.up)
    }

    /// Map the frame through an affine transform
    pub fn transformed(&self, transform: &Mat4) -> Self {
        Self::new(
            transform.transform_point3(self.origin),
            transform.transform_vector3(self.normal),
            transform.transform_vector3(self.up),
        )
    }
}

/// Unit vector to the right of `direction`, relative to `up`
pub fn side_direction(direction: Vec3, up: Vec3) -> Vec3 {
    direction.cross(up).normalize_or_zero()
}

/// Unit vector perpendicular to `direction`, closest to `up`
pub fn up_direction(direction: Vec3, up: Vec3) -> Vec3 {
    side_direction(direction, up)
        .cross(direction)
        .normalize_or_zero()
}

/// `direction` flattened onto the plane perpendicular to `up`
pub fn forward_direction(direction: Vec3, up: Vec3) -> Vec3 {
    up.cross(side_direction(direction, up)).normalize_or_zero()
}
