//! Mass-bearing bodies and the kinematics integrator
//!
//! Semi-implicit Euler: velocity first, then position from the new velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_BODY_MASS;

/// What a body represents in the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    Debris,
}

/// A dynamic entity with mass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    mass: f32,
    pub radius: f32,
}

impl Body {
    pub fn new(id: u32, kind: BodyKind, pos: Vec2, mass: f32, radius: f32) -> Self {
        let mut body = Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            mass: MIN_BODY_MASS,
            radius: radius.max(0.0),
        };
        body.set_mass(mass);
        body
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set mass, floored at [`MIN_BODY_MASS`]
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = if mass.is_finite() { mass.max(MIN_BODY_MASS) } else { MIN_BODY_MASS };
    }

    #[inline]
    pub fn momentum(&self) -> Vec2 {
        self.vel * self.mass
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Playfield rectangle with a wrap margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self { width, height, margin }
    }

    /// Screen wrap: leaving past one edge (plus margin) re-enters at the other
    pub fn wrap(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            wrap_axis(pos.x, self.width, self.margin),
            wrap_axis(pos.y, self.height, self.margin),
        )
    }

    /// Whether a point lies inside the playable rectangle (margin included)
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= -self.margin
            && pos.x <= self.width + self.margin
            && pos.y >= -self.margin
            && pos.y <= self.height + self.margin
    }
}

#[inline]
fn wrap_axis(v: f32, extent: f32, margin: f32) -> f32 {
    if v < -margin {
        extent + margin
    } else if v > extent + margin {
        -margin
    } else {
        v
    }
}

/// Advance a body by `dt` under `force` (thrust + gravity, already summed)
///
/// Speed is clamped to `max_speed` after the velocity update so stacked forces
/// can't run away. Wrapping is left to the caller.
pub fn integrate(body: &mut Body, force: Vec2, dt: f32, max_speed: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let force = if force.is_finite() { force } else { Vec2::ZERO };

    let accel = force / body.mass.max(MIN_BODY_MASS);
    body.vel += accel * dt;

    if max_speed.is_finite() && max_speed > 0.0 {
        body.vel = body.vel.clamp_length_max(max_speed);
    }

    body.pos += body.vel * dt;
}
