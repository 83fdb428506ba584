//! Rescue targets and their eligibility rules

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Bounds};
use crate::{EPSILON, cosine_similarity};

/// How a target decides whether the player may pick it up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RescueRule {
    /// Close enough is good enough
    Proximity,
    /// Close enough, and the pod's momentum matches in size and heading
    MomentumMatch {
        required_momentum: f32,
        /// Unit heading
        required_direction: Vec2,
        /// Fractional band, e.g. 0.3 for ±30%
        tolerance: f32,
    },
}

impl RescueRule {
    pub fn momentum_match(required_momentum: f32, required_direction: Vec2, tolerance: f32) -> Self {
        RescueRule::MomentumMatch {
            required_momentum: required_momentum.abs(),
            required_direction: required_direction.normalize_or_zero(),
            tolerance: tolerance.clamp(0.0, 1.0),
        }
    }
}

/// Elliptical path for orbiting targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub center: Vec2,
    pub radii: Vec2,
    /// Current angle (radians)
    pub phase: f32,
    /// Radians per second
    pub angular_speed: f32,
}

impl Orbit {
    pub fn position(&self) -> Vec2 {
        self.center + Vec2::new(self.radii.x * self.phase.cos(), self.radii.y * self.phase.sin())
    }

    /// Instantaneous velocity along the ellipse
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(
            -self.radii.x * self.phase.sin(),
            self.radii.y * self.phase.cos(),
        ) * self.angular_speed
    }

    pub fn advance(&mut self, dt: f32) {
        self.phase = (self.phase + self.angular_speed * dt).rem_euclid(std::f32::consts::TAU);
    }
}

/// A stranded astronaut waiting for pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescueTarget {
    pub id: u32,
    pub pos: Vec2,
    /// Slow drift for free-floating targets (ignored while orbiting)
    pub vel: Vec2,
    pub rule: RescueRule,
    pub orbit: Option<Orbit>,
    pub rescued: bool,
}

impl RescueTarget {
    pub fn new(id: u32, pos: Vec2, rule: RescueRule) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            rule,
            orbit: None,
            rescued: false,
        }
    }

    pub fn with_drift(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_orbit(mut self, orbit: Orbit) -> Self {
        self.orbit = Some(orbit);
        self.sync_to_orbit();
        self
    }

    /// Move along the orbit, or drift and wrap
    ///
    /// An orbiting momentum-match target wants the pod flying alongside it, so
    /// its required heading tracks the orbit tangent.
    pub fn update(&mut self, dt: f32, bounds: &Bounds) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        if let Some(orbit) = self.orbit.as_mut() {
            orbit.advance(dt);
            self.sync_to_orbit();
        } else {
            self.pos = bounds.wrap(self.pos + self.vel * dt);
        }
    }

    fn sync_to_orbit(&mut self) {
        let Some(orbit) = self.orbit else {
            return;
        };
        self.pos = orbit.position();
        self.vel = orbit.velocity();
        if let RescueRule::MomentumMatch {
            required_direction, ..
        } = &mut self.rule
        {
            let heading = self.vel.normalize_or_zero();
            if heading != Vec2::ZERO {
                *required_direction = heading;
            }
        }
    }

    /// Whether `player` may rescue this target right now
    pub fn is_eligible(&self, player: &Body, rescue_radius: f32) -> bool {
        if self.rescued || player.pos.distance(self.pos) > rescue_radius {
            return false;
        }
        match self.rule {
            RescueRule::Proximity => true,
            RescueRule::MomentumMatch {
                required_momentum,
                required_direction,
                tolerance,
            } => momentum_matches(player.momentum(), required_momentum, required_direction, tolerance),
        }
    }
}

/// Magnitude within ±tolerance and heading cosine ≥ 1 - tolerance
pub fn momentum_matches(momentum: Vec2, required: f32, direction: Vec2, tolerance: f32) -> bool {
    let magnitude = momentum.length();
    if magnitude <= EPSILON || direction.length_squared() <= EPSILON {
        return false;
    }
    let magnitude_ok = (magnitude - required).abs() <= required * tolerance;
    let direction_ok = cosine_similarity(momentum, direction) >= 1.0 - tolerance;
    magnitude_ok && direction_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyKind;

    fn pod(pos: Vec2, vel: Vec2, mass: f32) -> Body {
        Body::new(1, BodyKind::Player, pos, mass, 15.0).with_velocity(vel)
    }

    #[test]
    fn test_proximity_rule() {
        let target = RescueTarget::new(7, Vec2::new(100.0, 100.0), RescueRule::Proximity);
        assert!(target.is_eligible(&pod(Vec2::new(130.0, 100.0), Vec2::ZERO, 1.0), 40.0));
        assert!(!target.is_eligible(&pod(Vec2::new(141.0, 100.0), Vec2::ZERO, 1.0), 40.0));
    }

    #[test]
    fn test_rescued_target_not_eligible() {
        let mut target = RescueTarget::new(7, Vec2::ZERO, RescueRule::Proximity);
        target.rescued = true;
        assert!(!target.is_eligible(&pod(Vec2::ZERO, Vec2::ZERO, 1.0), 40.0));
    }

    #[test]
    fn test_momentum_match_rule() {
        let rule = RescueRule::momentum_match(100.0, Vec2::new(0.0, 5.0), 0.3);
        let target = RescueTarget::new(3, Vec2::ZERO, rule);

        // 2 kg at 60 up = 120: within 30%
        assert!(target.is_eligible(&pod(Vec2::ZERO, Vec2::new(0.0, 60.0), 2.0), 40.0));
        // Magnitude too high
        assert!(!target.is_eligible(&pod(Vec2::ZERO, Vec2::new(0.0, 70.0), 2.0), 40.0));
        // Right magnitude, wrong heading
        assert!(!target.is_eligible(&pod(Vec2::ZERO, Vec2::new(100.0, 0.0), 1.0), 40.0));
        // At rest: neutral
        assert!(!target.is_eligible(&pod(Vec2::ZERO, Vec2::ZERO, 1.0), 40.0));
        // Still needs proximity
        assert!(!target.is_eligible(&pod(Vec2::new(100.0, 0.0), Vec2::new(0.0, 100.0), 1.0), 40.0));
    }

    #[test]
    fn test_momentum_direction_band() {
        let dir = Vec2::Y;
        // 40 degrees off: cos = 0.766 >= 0.7
        let a = 40.0f32.to_radians();
        assert!(momentum_matches(Vec2::new(a.sin(), a.cos()) * 100.0, 100.0, dir, 0.3));
        // 50 degrees off: cos = 0.643 < 0.7
        let b = 50.0f32.to_radians();
        assert!(!momentum_matches(Vec2::new(b.sin(), b.cos()) * 100.0, 100.0, dir, 0.3));
    }

    #[test]
    fn test_orbiting_target_moves_on_ellipse() {
        let orbit = Orbit {
            center: Vec2::new(400.0, 300.0),
            radii: Vec2::new(120.0, 80.0),
            phase: 0.0,
            angular_speed: std::f32::consts::FRAC_PI_2,
        };
        let mut target = RescueTarget::new(1, Vec2::ZERO, RescueRule::Proximity).with_orbit(orbit);
        assert!((target.pos - Vec2::new(520.0, 300.0)).length() < 1e-3);

        let bounds = Bounds::new(800.0, 600.0, 20.0);
        target.update(1.0, &bounds);
        assert!((target.pos - Vec2::new(400.0, 380.0)).length() < 1e-3);
        assert!(target.vel.x < 0.0);
    }

    #[test]
    fn test_orbiting_match_tracks_tangent() {
        let orbit = Orbit {
            center: Vec2::ZERO,
            radii: Vec2::new(100.0, 100.0),
            phase: 0.0,
            angular_speed: 0.5,
        };
        let rule = RescueRule::momentum_match(50.0, Vec2::X, 0.3);
        let target = RescueTarget::new(1, Vec2::ZERO, rule).with_orbit(orbit);
        // At phase 0 the target moves straight up
        let RescueRule::MomentumMatch { required_direction, .. } = target.rule else {
            panic!("rule changed variant");
        };
        assert!((required_direction - Vec2::Y).length() < 1e-5);
        // Flying alongside at matching speed rescues
        let alongside = pod(target.pos + Vec2::new(10.0, 0.0), Vec2::new(0.0, 50.0), 1.0);
        assert!(target.is_eligible(&alongside, 40.0));
    }

    #[test]
    fn test_drifting_target_wraps() {
        let bounds = Bounds::new(800.0, 600.0, 20.0);
        let mut target =
            RescueTarget::new(1, Vec2::new(815.0, 100.0), RescueRule::Proximity).with_drift(Vec2::new(10.0, 0.0));
        target.update(1.0, &bounds);
        assert_eq!(target.pos.x, -20.0);
    }
}
