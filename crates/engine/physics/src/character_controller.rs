//! First-person walker driven by the collision sweep
//!
//! All speeds are in world units per tick. The controller lives in the local
//! frame of whatever chunk it is in; `+Y` of that frame is up and gravity pulls
//! along `-Y`.

use std::f32::consts::FRAC_PI_2;

use escher_core::frame::{forward_direction, side_direction};
use escher_core::Mesh;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::{slide, sweep, Body};

/// Pitch stays this far inside straight up and straight down
pub const MAX_PITCH: f32 = FRAC_PI_2 - 1.0 / 1024.0;

/// One tick of player input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlInput {
    pub forward: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Mouse motion; positive `x` turns right, positive `y` looks up
    pub look_delta: Vec2,
}

impl ControlInput {
    /// Input that only walks forward
    pub fn walk() -> Self {
        Self {
            forward: true,
            ..Self::default()
        }
    }
}

/// Configuration for character controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterControllerConfig {
    /// Horizontal distance covered per tick
    pub move_speed: f32,
    /// Sweeps spent sliding along walls per tick
    pub slide_iterations: u32,
    /// Fall speed gained per tick
    pub gravity: f32,
    /// Terminal fall speed
    pub max_fall_speed: f32,
    /// Upward speed right after a jump
    pub jump_speed: f32,
    /// Radians turned per unit of mouse motion
    pub look_sensitivity: f32,
    /// Half width of the body box
    pub radius: f32,
    /// Distance from the feet up to the eye
    pub eye_height: f32,
    /// Distance from the eye up to the top of the body box
    pub head_room: f32,
    /// Grid cells per body box face
    pub body_subdivisions: u32,
}

impl Default for CharacterControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 1.0 / 32.0,
            slide_iterations: 8,
            gravity: 1.0 / 512.0,
            max_fall_speed: 1.0 / 4.0,
            jump_speed: 1.0 / 16.0,
            look_sensitivity: 1.0 / 2048.0,
            radius: 0.25,
            eye_height: 1.5,
            head_room: 0.25,
            body_subdivisions: 2,
        }
    }
}

/// Kinematic first-person body with look angles and a fall speed
///
/// The position is the eye; the body box hangs `eye_height` below it.
#[derive(Debug, Clone)]
pub struct CharacterController {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fall_speed: f32,
    grounded: bool,
    body: Mesh,
    config: CharacterControllerConfig,
}

impl CharacterController {
    /// Create a controller looking along `+Z`
    ///
    /// # Arguments
    /// * `position` - Eye position in the local frame of the starting chunk
    /// * `config` - Character configuration
    pub fn new(position: Vec3, config: CharacterControllerConfig) -> Self {
        let body = Mesh::cuboid(
            Vec3::new(-config.radius, -config.eye_height, -config.radius),
            Vec3::new(config.radius, config.head_room, config.radius),
            config.body_subdivisions,
        );

        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fall_speed: 0.0,
            grounded: false,
            body,
            config,
        }
    }

    /// Advance one tick and return how far the controller moved
    ///
    /// Horizontal motion slides along walls; the fall is clipped by a single
    /// sweep and scales the fall speed by the same coefficient, so landing
    /// (or bumping a ceiling) kills vertical speed.
    pub fn update(&mut self, input: &ControlInput, environment: &[Body]) -> Vec3 {
        let start = self.position;

        self.yaw += input.look_delta.x * self.config.look_sensitivity;
        self.pitch = (self.pitch + input.look_delta.y * self.config.look_sensitivity)
            .clamp(-MAX_PITCH, MAX_PITCH);

        let look = self.look_direction();
        let velocity = side_direction(look, Vec3::Y) * axis(input.right, input.left)
            + forward_direction(look, Vec3::Y) * axis(input.forward, input.reverse);

        if velocity.length_squared() > 0.0 {
            let velocity = velocity.normalize() * self.config.move_speed;
            self.position += slide(
                &self.body(),
                environment,
                velocity,
                self.config.slide_iterations,
            );
        }

        if input.jump && self.grounded {
            self.fall_speed = -self.config.jump_speed;
        }
        self.fall_speed = (self.fall_speed + self.config.gravity).min(self.config.max_fall_speed);

        let fall = Vec3::new(0.0, -self.fall_speed, 0.0);
        let coefficient = sweep(&self.body(), environment, fall, false).coefficient;
        self.grounded = self.fall_speed > 0.0 && coefficient < 1.0;
        self.fall_speed *= coefficient;
        self.position += fall * coefficient;

        self.position - start
    }

    /// Re-express the controller in another frame
    ///
    /// Position and look direction are mapped through `transform`; the fall
    /// speed keeps acting along the new frame's `-Y`.
    pub fn reorient(&mut self, transform: &Mat4) {
        self.position = transform.transform_point3(self.position);
        let look = transform.transform_vector3(self.look_direction());
        self.look_towards(look);
    }

    /// The body box placed at the current position
    pub fn body(&self) -> Body<'_> {
        Body::new(&self.body, Mat4::from_translation(self.position))
    }

    pub fn body_mesh(&self) -> &Mesh {
        &self.body
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn head_position(&self) -> Vec3 {
        self.position
    }

    /// Unit look direction derived from yaw and pitch
    pub fn look_direction(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * (-self.yaw).sin(),
            self.pitch.sin(),
            self.pitch.cos() * (-self.yaw).cos(),
        )
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set look angles directly; pitch is clamped
    pub fn set_look(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Turn to face `direction`; a zero vector leaves the angles alone
    pub fn look_towards(&mut self, direction: Vec3) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        let pitch = direction.y.clamp(-1.0, 1.0).asin();
        self.set_look(-direction.x.atan2(direction.z), pitch);
    }

    /// Current downward speed; negative while rising after a jump
    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    /// Whether the last fall sweep was blocked from below
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn config(&self) -> &CharacterControllerConfig {
        &self.config
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}
