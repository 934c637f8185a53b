//! Continuous collision sweep and sliding
//!
//! A sweep asks how far a body can travel along a displacement before any of
//! its vertices crosses an environment triangle, or any environment vertex
//! crosses one of its triangles. Only front faces block, so closed meshes
//! must be wound outward and rooms inward.

use escher_core::{point_tri_projection, ray_tri_intersection, PhysicalMesh, Triangle};
use glam::{Mat4, Vec3};
use tracing::trace;

/// Leftover displacement below this length ends a slide (1 / 2^20)
pub const SLIDE_EPSILON: f32 = 1.0 / (1024.0 * 1024.0);

/// A mesh placed in the world by a transform
///
/// Bodies borrow their mesh; the collision engine never owns geometry.
#[derive(Clone, Copy)]
pub struct Body<'a> {
    pub mesh: &'a dyn PhysicalMesh,
    pub transform: Mat4,
}

impl<'a> Body<'a> {
    pub fn new(mesh: &'a dyn PhysicalMesh, transform: Mat4) -> Self {
        Self { mesh, transform }
    }

    /// Body with an identity transform
    pub fn fixed(mesh: &'a dyn PhysicalMesh) -> Self {
        Self::new(mesh, Mat4::IDENTITY)
    }

    /// The same body moved by `offset` in world space
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.mesh, Mat4::from_translation(offset) * self.transform)
    }

    fn world_faces(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.mesh
            .physical_faces()
            .iter()
            .map(|face| face.transformed(&self.transform))
    }

    fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.mesh
            .physical_vertices()
            .iter()
            .map(|vertex| self.transform.transform_point3(*vertex))
    }
}

impl std::fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("faces", &self.mesh.physical_faces().len())
            .field("transform", &self.transform)
            .finish()
    }
}

/// Outcome of one sweep
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sweep {
    /// Safe fraction of the displacement; `>= 1` means unobstructed
    pub coefficient: f32,
    /// Unconsumed displacement redirected along the blocking surface
    pub remaining: Option<Vec3>,
}

impl Sweep {
    pub fn is_blocked(&self) -> bool {
        self.coefficient < 1.0
    }
}

/// The vertex/triangle pair that produced the smallest coefficient
#[derive(Clone, Copy)]
enum Contact {
    /// A vertex of the moving body hit an environment triangle
    Forward { vertex: Vec3, face: Triangle },
    /// An environment vertex hit a triangle of the moving body
    Reverse { vertex: Vec3, face: Triangle },
}

/// Sweep a body through an environment
///
/// # Arguments
/// * `object` - The moving body
/// * `environment` - Static bodies that can block it
/// * `displacement` - Proposed world-space motion
/// * `with_remaining` - Also compute the slide vector of the blocking contact
pub fn sweep(
    object: &Body,
    environment: &[Body],
    displacement: Vec3,
    with_remaining: bool,
) -> Sweep {
    let object_vertices: Vec<Vec3> = object.world_vertices().collect();
    let object_faces: Vec<Triangle> = object.world_faces().collect();
    let environment_vertices: Vec<Vec3> = environment
        .iter()
        .flat_map(|body| body.world_vertices())
        .collect();
    let environment_faces: Vec<Triangle> = environment
        .iter()
        .flat_map(|body| body.world_faces())
        .collect();

    let mut coefficient = 1.0_f32;
    let mut contact = None;

    'forward: for &vertex in &object_vertices {
        for face in &environment_faces {
            let t = ray_tri_intersection(vertex, displacement, face);
            if t < coefficient {
                coefficient = t;
                contact = Some(Contact::Forward { vertex, face: *face });
                if coefficient <= 0.0 {
                    break 'forward;
                }
            }
        }
    }

    if coefficient > 0.0 {
        'reverse: for &vertex in &environment_vertices {
            for face in &object_faces {
                let t = ray_tri_intersection(vertex, -displacement, face);
                if t < coefficient {
                    coefficient = t;
                    contact = Some(Contact::Reverse { vertex, face: *face });
                    if coefficient <= 0.0 {
                        break 'reverse;
                    }
                }
            }
        }
    }

    let remaining = match (with_remaining, contact) {
        (true, Some(Contact::Forward { vertex, face })) => {
            let projected = point_tri_projection(vertex + displacement, &face);
            Some(projected - (vertex + coefficient * displacement))
        }
        (true, Some(Contact::Reverse { vertex, face })) => {
            let projected = point_tri_projection(vertex - displacement, &face);
            Some((vertex - coefficient * displacement) - projected)
        }
        _ => None,
    };

    Sweep {
        coefficient,
        remaining,
    }
}

/// Safe fraction of `displacement` for `a` moving against a single body `b`
pub fn sweep_coefficient(a: &Body, b: &Body, displacement: Vec3) -> f32 {
    sweep(a, std::slice::from_ref(b), displacement, false).coefficient
}

/// Move as far as possible, sliding along whatever blocks the motion
///
/// Runs at most `max_iterations` sweeps and returns the total translation.
/// With `max_iterations == 1` this is `coefficient * displacement`; with 0
/// the body does not move.
pub fn slide(
    object: &Body,
    environment: &[Body],
    displacement: Vec3,
    max_iterations: u32,
) -> Vec3 {
    let mut total = Vec3::ZERO;
    let mut pending = displacement;

    for iteration in 0..max_iterations {
        let result = sweep(&object.translated(total), environment, pending, true);
        if !result.is_blocked() {
            total += pending;
            break;
        }

        total += result.coefficient * pending;
        match result.remaining {
            Some(next) if next.length() > SLIDE_EPSILON => pending = next,
            _ => break,
        }
        if iteration + 1 == max_iterations {
            trace!(
                "Slide gave up after {} iterations, {} left",
                max_iterations,
                pending.length()
            );
        }
    }

    total
}
