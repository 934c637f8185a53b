//! Triangle primitive and the two intersection kernels built on it
//!
//! Both kernels use the Moller-Trumbore parametrisation
//! `origin + t * direction = (1 - u - v) * a + u * b + v * c`.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Tolerance shared by the intersection kernels (1 / 2^20)
pub const EPSILON: f32 = 1.0 / 1_048_576.0;

/// Sentinel returned by [`ray_tri_intersection`] when the ray misses
pub const NO_HIT: f32 = 2.0;

/// A triangle with counter-clockwise front-face winding
///
/// The front face normal is `(b - a) x (c - a)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unnormalized front-face normal
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a)
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// True when the triangle has (numerically) no area
    pub fn is_degenerate(&self) -> bool {
        self.normal().length_squared() <= EPSILON * EPSILON
    }

    /// The same triangle with the opposite winding
    pub fn flipped(&self) -> Self {
        Self::new(self.a, self.c, self.b)
    }

    /// Apply an affine transform to all three corners
    pub fn transformed(&self, transform: &Mat4) -> Self {
        Self::new(
            transform.transform_point3(self.a),
            transform.transform_point3(self.b),
            transform.transform_point3(self.c),
        )
    }
}

/// Intersect a ray with the front face of a triangle
///
/// Returns the ray parameter `t` of the hit, so the hit point is
/// `origin + t * direction`. Returns [`NO_HIT`] when the triangle is
/// back-facing or degenerate relative to the ray, when the hit lies outside
/// the open triangle (edges and corners do not count) or when the triangle is
/// behind the origin.
///
/// An origin that sits less than [`EPSILON`] behind the front face reports a
/// contact at `t = 0`, so a body resting on a surface cannot sink through it
/// after accumulating rounding error.
///
/// # Arguments
/// * `origin` - Ray origin
/// * `direction` - Ray direction, not necessarily normalized
/// * `triangle` - Triangle to test against
pub fn ray_tri_intersection(origin: Vec3, direction: Vec3, triangle: &Triangle) -> f32 {
    let ab = triangle.b - triangle.a;
    let ac = triangle.c - triangle.a;

    let pv = direction.cross(ac);
    let determinant = ab.dot(pv);
    if determinant < EPSILON {
        return NO_HIT;
    }

    let tv = origin - triangle.a;
    let u = tv.dot(pv);
    if u <= 0.0 || u >= determinant {
        return NO_HIT;
    }

    let qv = tv.cross(ab);
    let v = direction.dot(qv);
    if v <= 0.0 || u + v >= determinant {
        return NO_HIT;
    }

    let t = ac.dot(qv) / determinant;
    if t < 0.0 {
        if t * direction.length() < -EPSILON {
            return NO_HIT;
        }
        return 0.0;
    }
    t
}

/// Project a point onto the plane of a triangle along the triangle normal
///
/// The projection is not clamped to the triangle's edges. A degenerate
/// triangle returns the point unchanged.
pub fn point_tri_projection(point: Vec3, triangle: &Triangle) -> Vec3 {
    let ab = triangle.b - triangle.a;
    let ac = triangle.c - triangle.a;
    let normal = ab.cross(ac);

    let pv = normal.cross(ac);
    let determinant = pv.dot(ab);
    if determinant.abs() < EPSILON * EPSILON {
        return point;
    }

    let tv = point - triangle.a;
    let u = tv.dot(pv) / determinant;
    let qv = tv.cross(ab);
    let v = normal.dot(qv) / determinant;

    triangle.a + u * ab + v * ac
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Large triangle in the y = 0 plane facing +Y
    fn floor() -> Triangle {
        Triangle::new(
            Vec3::new(-10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -20.0),
        )
    }

    #[test]
    fn test_floor_faces_up() {
        let normal = floor().normal().normalize();
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-6), "normal was {normal:?}");
    }

    #[test]
    fn test_ray_hits_front_face() {
        let t = ray_tri_intersection(Vec3::new(0.5, 1.0, -0.5), Vec3::new(0.0, -2.0, 0.0), &floor());
        assert!((t - 0.5).abs() < 1e-6, "expected t = 0.5, got {t}");
    }

    #[test]
    fn test_ray_reports_hits_past_segment_end() {
        let t = ray_tri_intersection(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -2.0, 0.0), &floor());
        assert!((t - 1.5).abs() < 1e-6, "expected t = 1.5, got {t}");
    }

    #[test]
    fn test_back_face_never_hits() {
        let t = ray_tri_intersection(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 2.0, 0.0), &floor());
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let t = ray_tri_intersection(Vec3::new(0.0, 0.5, 0.0), Vec3::X, &floor());
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_ray_outside_triangle_misses() {
        let t = ray_tri_intersection(Vec3::new(50.0, 1.0, 0.0), Vec3::NEG_Y, &floor());
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_triangle_behind_origin_misses() {
        let t = ray_tri_intersection(Vec3::new(0.0, -1.0, 0.0), Vec3::NEG_Y, &floor());
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_resting_contact_reports_zero() {
        let t = ray_tri_intersection(Vec3::new(0.0, -1e-7, 0.0), Vec3::NEG_Y, &floor());
        assert_eq!(t, 0.0, "a hair below the surface still counts as contact");
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let line = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(line.is_degenerate());
        let t = ray_tri_intersection(Vec3::new(1.0, 1.0, 0.0), Vec3::NEG_Y, &line);
        assert_eq!(t, NO_HIT);
    }

    #[test]
    fn test_projection_drops_onto_plane() {
        let projected = point_tri_projection(Vec3::new(3.0, 5.0, -2.0), &floor());
        assert!(projected.abs_diff_eq(Vec3::new(3.0, 0.0, -2.0), 1e-5), "got {projected:?}");
    }

    #[test]
    fn test_projection_is_unclamped() {
        let projected = point_tri_projection(Vec3::new(100.0, -4.0, 100.0), &floor());
        assert!(projected.abs_diff_eq(Vec3::new(100.0, 0.0, 100.0), 1e-3), "got {projected:?}");
    }

    #[test]
    fn test_transformed_triangle() {
        let moved = floor().transformed(&Mat4::from_translation(Vec3::Y));
        assert_eq!(moved.a, Vec3::new(-10.0, 1.0, 10.0));
        assert_eq!(moved.flipped().normal().normalize(), Vec3::NEG_Y);
    }
}
