//! Camera view in the accumulated world frame

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::frame::{side_direction, up_direction};

/// Projection settings shared by the controller and the traversal
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in radians
    pub fov: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0_f32.to_radians(),
            z_near: 1.0 / 64.0,
            z_far: 256.0,
        }
    }
}

/// Eye, view direction and projection of one rendered frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub eye: Vec3,
    /// Unit view direction
    pub direction: Vec3,
    /// Reference up vector, not necessarily perpendicular to `direction`
    pub up: Vec3,
    pub fov: f32,
    /// Width over height
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraView {
    pub fn new(eye: Vec3, direction: Vec3, up: Vec3, config: &CameraConfig, aspect: f32) -> Self {
        Self {
            eye,
            direction: direction.normalize_or_zero(),
            up,
            fov: config.fov,
            aspect,
            z_near: config.z_near,
            z_far: config.z_far,
        }
    }

    pub fn side(&self) -> Vec3 {
        side_direction(self.direction, self.up)
    }

    pub fn up_direction(&self) -> Vec3 {
        up_direction(self.direction, self.up)
    }

    /// Half width and half height of the view plane at unit distance
    pub fn half_extents(&self) -> Vec2 {
        let f = (self.fov / 2.0).tan();
        Vec2::new(f * self.aspect, f)
    }

    /// Distance of a point in front of the eye along the view direction
    pub fn depth_of(&self, position: Vec3) -> f32 {
        (position - self.eye).dot(self.direction)
    }

    /// Project a point onto the view plane at unit distance
    ///
    /// Only meaningful for points with positive depth.
    pub fn view_plane_coords(&self, position: Vec3) -> Vec2 {
        let offset = position - self.eye;
        let depth = offset.dot(self.direction);
        Vec2::new(
            offset.dot(self.side()) / depth,
            offset.dot(self.up_direction()) / depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraView {
        CameraView::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::NEG_Z,
            Vec3::Y,
            &CameraConfig {
                fov: std::f32::consts::FRAC_PI_2,
                ..CameraConfig::default()
            },
            2.0,
        )
    }

    #[test]
    fn test_basis() {
        let camera = camera();
        assert!(camera.side().abs_diff_eq(Vec3::X, 1e-6));
        assert!(camera.up_direction().abs_diff_eq(Vec3::Y, 1e-6));
        assert!(camera.half_extents().abs_diff_eq(Vec2::new(2.0, 1.0), 1e-5));
    }

    #[test]
    fn test_view_plane_coords() {
        let coords = camera().view_plane_coords(Vec3::new(1.0, 2.0, -2.0));
        assert!(coords.abs_diff_eq(Vec2::new(0.5, 0.5), 1e-6), "got {coords:?}");
        assert!((camera().depth_of(Vec3::new(5.0, 0.0, -3.0)) - 3.0).abs() < 1e-6);
    }
}
