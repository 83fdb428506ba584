//! Point-mass gravity wells
//!
//! Inside a well's collision radius the force is zero. That's a gameplay
//! policy to avoid the 1/r² singularity, not physics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::EPSILON;
use crate::consts::STABLE_ORBIT_BAND;

/// A static attractor (planet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravityWell {
    pub pos: Vec2,
    pub mass: f32,
    /// Planet surface; no force is applied inside it
    pub collision_radius: f32,
    /// Beyond this distance the well is considered out of range
    pub influence_radius: f32,
}

impl GravityWell {
    pub fn new(pos: Vec2, mass: f32, collision_radius: f32, influence_radius: f32) -> Self {
        Self {
            pos,
            mass,
            collision_radius,
            influence_radius,
        }
    }

    /// Attractive force on a body of `body_mass` at `body_pos`
    pub fn force_on(&self, body_pos: Vec2, body_mass: f32, g: f32) -> Vec2 {
        let offset = self.pos - body_pos;
        let r = offset.length();
        if r < self.collision_radius || r <= EPSILON {
            return Vec2::ZERO;
        }
        let magnitude = g * self.mass * body_mass / (r * r);
        if !magnitude.is_finite() {
            return Vec2::ZERO;
        }
        offset / r * magnitude
    }

    /// Normalized field strength: 1 at the surface, 0 at the edge of influence
    pub fn field_strength(&self, pos: Vec2) -> f32 {
        let r = pos.distance(self.pos);
        if r <= self.collision_radius {
            return 1.0;
        }
        if r >= self.influence_radius {
            return 0.0;
        }
        let span = self.influence_radius - self.collision_radius;
        if span <= EPSILON {
            return 0.0;
        }
        (1.0 - (r - self.collision_radius) / span).clamp(0.0, 1.0)
    }

    pub fn is_in_field(&self, pos: Vec2) -> bool {
        pos.distance(self.pos) <= self.influence_radius
    }

    /// Speed of a circular orbit at the distance of `pos`
    pub fn circular_orbit_speed(&self, pos: Vec2, g: f32) -> f32 {
        let r = pos.distance(self.pos);
        if r <= EPSILON {
            return 0.0;
        }
        (g * self.mass / r).max(0.0).sqrt()
    }

    /// Instructional heuristic: speed within ±20% of circular-orbit speed
    pub fn is_stable_orbit(&self, pos: Vec2, vel: Vec2, g: f32) -> bool {
        let orbit_speed = self.circular_orbit_speed(pos, g);
        if orbit_speed <= EPSILON {
            return false;
        }
        (vel.length() - orbit_speed).abs() <= orbit_speed * STABLE_ORBIT_BAND
    }
}

/// All wells active in a level plus the shared gravitational constant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GravityField {
    pub g: f32,
    pub wells: Vec<GravityWell>,
}

impl GravityField {
    pub fn new(g: f32, wells: Vec<GravityWell>) -> Self {
        Self { g, wells }
    }

    /// Summed force from every well
    pub fn force_at(&self, pos: Vec2, body_mass: f32) -> Vec2 {
        self.wells
            .iter()
            .map(|w| w.force_on(pos, body_mass, self.g))
            .fold(Vec2::ZERO, |acc, f| acc + f)
    }

    /// Index of the well with the strongest field at `pos`, if any is in range
    pub fn strongest_well(&self, pos: Vec2) -> Option<usize> {
        self.wells
            .iter()
            .enumerate()
            .map(|(i, w)| (i, w.field_strength(pos)))
            .filter(|&(_, s)| s > 0.0)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }

    /// Whether `pos` is inside any planet
    pub fn is_inside_any(&self, pos: Vec2) -> bool {
        self.wells.iter().any(|w| pos.distance(w.pos) < w.collision_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn well() -> GravityWell {
        GravityWell::new(Vec2::ZERO, 100.0, 40.0, 200.0)
    }

    #[test]
    fn test_force_magnitude_and_direction() {
        let w = well();
        let f = w.force_on(Vec2::new(50.0, 0.0), 1.0, 500.0);
        assert!((f.length() - 20.0).abs() < 1e-3);
        // Points from body toward the well
        assert!(f.x < 0.0);
        assert!(f.y.abs() < 1e-6);
    }

    #[test]
    fn test_no_force_inside_collision_radius() {
        let w = well();
        assert_eq!(w.force_on(Vec2::new(39.0, 0.0), 1.0, 500.0), Vec2::ZERO);
        assert_eq!(w.force_on(Vec2::ZERO, 1.0, 500.0), Vec2::ZERO);
        let point = GravityWell::new(Vec2::ZERO, 100.0, 0.0, 200.0);
        assert_eq!(point.force_on(Vec2::ZERO, 1.0, 500.0), Vec2::ZERO);
    }

    #[test]
    fn test_field_strength_endpoints() {
        let w = well();
        assert_eq!(w.field_strength(Vec2::new(40.0, 0.0)), 1.0);
        assert_eq!(w.field_strength(Vec2::new(10.0, 0.0)), 1.0);
        assert_eq!(w.field_strength(Vec2::new(200.0, 0.0)), 0.0);
        assert_eq!(w.field_strength(Vec2::new(500.0, 0.0)), 0.0);
        assert!((w.field_strength(Vec2::new(120.0, 0.0)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_is_in_field() {
        let w = well();
        assert!(w.is_in_field(Vec2::new(200.0, 0.0)));
        assert!(!w.is_in_field(Vec2::new(200.1, 0.0)));
    }

    #[test]
    fn test_field_sums_wells() {
        let field = GravityField::new(
            500.0,
            vec![
                GravityWell::new(Vec2::new(-50.0, 0.0), 100.0, 10.0, 200.0),
                GravityWell::new(Vec2::new(50.0, 0.0), 100.0, 10.0, 200.0),
            ],
        );
        // Symmetric wells cancel at the midpoint
        assert!(field.force_at(Vec2::ZERO, 1.0).length() < 1e-4);
        assert!(field.force_at(Vec2::new(20.0, 0.0), 1.0).x > 0.0);
    }

    #[test]
    fn test_strongest_well() {
        let field = GravityField::new(
            500.0,
            vec![
                GravityWell::new(Vec2::new(0.0, 0.0), 100.0, 10.0, 100.0),
                GravityWell::new(Vec2::new(300.0, 0.0), 100.0, 10.0, 100.0),
            ],
        );
        assert_eq!(field.strongest_well(Vec2::new(250.0, 0.0)), Some(1));
        assert_eq!(field.strongest_well(Vec2::new(150.0, 0.0)), None);
    }

    #[test]
    fn test_stable_orbit_heuristic() {
        let w = well();
        let pos = Vec2::new(100.0, 0.0);
        let v_circ = w.circular_orbit_speed(pos, 500.0);
        assert!((v_circ - (500.0f32 * 100.0 / 100.0).sqrt()).abs() < 1e-4);
        assert!(w.is_stable_orbit(pos, Vec2::new(0.0, v_circ * 1.1), 500.0));
        assert!(!w.is_stable_orbit(pos, Vec2::new(0.0, v_circ * 1.3), 500.0));
        assert!(!w.is_stable_orbit(w.pos, Vec2::new(0.0, 10.0), 500.0));
    }

    proptest! {
        #[test]
        fn prop_field_strength_non_increasing(a in 0.0f32..400.0, b in 0.0f32..400.0) {
            let w = well();
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let s_near = w.field_strength(Vec2::new(near, 0.0));
            let s_far = w.field_strength(Vec2::new(far, 0.0));
            prop_assert!(s_near >= s_far);
            prop_assert!((0.0..=1.0).contains(&s_near));
        }
    }
}
