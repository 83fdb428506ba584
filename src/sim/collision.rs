//! Collision detection and response
//!
//! Body/body contacts use a 1D elastic impulse along the contact normal, which
//! conserves total momentum exactly. Planet surfaces act as immovable walls.

use glam::Vec2;

use super::body::Body;
use super::gravity::GravityWell;
use crate::EPSILON;
use crate::consts::MIN_BODY_MASS;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact normal (from the second shape toward the first)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two bodies
///
/// Bodies touch when their distance is below `(ra + rb) / scale`. Coincident
/// centers have no usable normal and count as a miss.
pub fn body_body_collision(a: &Body, b: &Body, scale: f32) -> CollisionResult {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let contact_dist = (a.radius + b.radius) / scale;
    let offset = a.pos - b.pos;
    let dist = offset.length();

    if dist >= contact_dist || dist <= EPSILON {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: offset / dist,
        penetration: contact_dist - dist,
    }
}

/// Post-collision velocities for two bodies along `normal`
///
/// Returns the inputs unchanged when the bodies are already separating.
pub fn resolve_velocities(
    vel_a: Vec2,
    mass_a: f32,
    vel_b: Vec2,
    mass_b: f32,
    normal: Vec2,
) -> (Vec2, Vec2) {
    let vn = (vel_a - vel_b).dot(normal);
    if vn >= 0.0 || !vn.is_finite() {
        return (vel_a, vel_b);
    }

    let mass_a = mass_a.max(MIN_BODY_MASS);
    let mass_b = mass_b.max(MIN_BODY_MASS);
    let impulse = 2.0 * vn / (mass_a + mass_b);

    (
        vel_a - impulse * mass_b * normal,
        vel_b + impulse * mass_a * normal,
    )
}

/// Detect and resolve a body/body collision in place
///
/// Returns true when an impulse was applied. Overlap is split evenly between
/// the two bodies so they stop interpenetrating.
pub fn resolve_pair(a: &mut Body, b: &mut Body, scale: f32) -> bool {
    let contact = body_body_collision(a, b, scale);
    if !contact.hit {
        return false;
    }

    let (vel_a, vel_b) = resolve_velocities(a.vel, a.mass(), b.vel, b.mass(), contact.normal);
    if vel_a == a.vel && vel_b == b.vel {
        return false;
    }
    a.vel = vel_a;
    b.vel = vel_b;

    let push = contact.normal * (contact.penetration * 0.5);
    a.pos += push;
    b.pos -= push;
    true
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check a body against a planet surface
pub fn body_well_collision(body: &Body, well: &GravityWell) -> CollisionResult {
    let offset = body.pos - well.pos;
    let dist = offset.length();
    let contact_dist = well.collision_radius + body.radius;

    if dist >= contact_dist {
        return CollisionResult::miss();
    }

    // Dead center: push out along +x
    let normal = if dist <= EPSILON { Vec2::X } else { offset / dist };
    CollisionResult {
        hit: true,
        normal,
        penetration: contact_dist - dist,
    }
}

/// Bounce a body off a planet surface
///
/// The body is moved back onto the surface. Velocity is reflected only if it
/// points into the planet, then scaled by `restitution`.
pub fn resolve_surface(body: &mut Body, well: &GravityWell, restitution: f32) -> bool {
    let contact = body_well_collision(body, well);
    if !contact.hit {
        return false;
    }

    body.pos += contact.normal * contact.penetration;
    if body.vel.dot(contact.normal) < 0.0 {
        body.vel = reflect_velocity(body.vel, contact.normal) * restitution.clamp(0.0, 1.0);
    }
    true
}
