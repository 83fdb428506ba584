//! Newton Rescue - A top-down space-rescue game about Newtonian mechanics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, gravity, collisions, mission state)
//! - `settings`: Data-driven tuning and difficulty presets
//!
//! Rendering, input devices and HUD text live outside this crate. They read
//! [`sim::GameState`] and feed [`sim::TickInput`] back in.

pub mod settings;
pub mod sim;

pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Largest frame dt accepted by a tick
    pub const MAX_FRAME_DT: f32 = 1.0;
    /// Physics substep length; a frame is split into steps no longer than this
    pub const PHYSICS_STEP: f32 = 1.0 / 60.0;
    /// Cap on substeps per frame (a long stall runs coarser steps)
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Fixed timestep used by the trajectory predictor
    pub const PREDICTION_DT: f32 = 1.0 / 30.0;
    /// Default number of predictor steps
    pub const PREDICTION_STEPS: usize = 120;

    /// Playfield dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Bodies wrap once they leave the playfield by this much
    pub const WRAP_MARGIN: f32 = 20.0;

    /// Lower bound for any body mass (keeps a = F/m finite)
    pub const MIN_BODY_MASS: f32 = 0.5;

    /// Player pod
    pub const PLAYER_BASE_MASS: f32 = 1.0;
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const THRUST_FORCE: f32 = 200.0;
    pub const MAX_SPEED: f32 = 300.0;
    /// Fuel units burned per second of thrust
    pub const FUEL_BURN_RATE: f32 = 8.0;
    pub const MAX_FUEL: f32 = 100.0;

    /// Gravitational constant shared by every well
    pub const GRAVITY_CONSTANT: f32 = 500.0;
    /// Fraction of circular-orbit speed still counted as a stable orbit
    pub const STABLE_ORBIT_BAND: f32 = 0.2;
    /// Velocity kept after bouncing off a planet surface
    pub const SURFACE_RESTITUTION: f32 = 0.6;

    /// Divisor applied to summed radii for body/body contact
    pub const COLLISION_SCALE: f32 = 1.0;

    /// Rescue and delivery
    pub const RESCUE_RADIUS: f32 = 40.0;
    pub const RESCUE_BONUS: u64 = 100;
    pub const DELIVERY_BONUS: u64 = 50;
    pub const TOWED_MASS_INCREMENT: f32 = 0.5;
    /// Fractional band for momentum-matched rescues (magnitude and direction)
    pub const MOMENTUM_TOLERANCE: f32 = 0.3;
    /// Spacing between towed targets trailing the pod (cosmetic)
    pub const TOW_SPACING: f32 = 22.0;

    /// Momentum gates
    pub const GATE_THRESHOLD: f32 = 50.0;
    pub const GATE_CONSERVATION: f32 = 0.9;
    pub const GATE_COOLDOWN: f32 = 1.0;
    /// Boost zones
    pub const BOOST_FACTOR: f32 = 1.5;
    pub const BOOST_COOLDOWN: f32 = 0.5;
    /// Moving platforms
    pub const PLATFORM_AMPLIFICATION: f32 = 2.0;
    pub const PLATFORM_COOLDOWN: f32 = 0.5;

    /// Pause between clearing a level and loading the next one (seconds)
    pub const LEVEL_TRANSITION_DELAY: f32 = 2.0;
    /// Number of levels in a full mission
    pub const LEVEL_COUNT: u8 = 3;
}

/// Tolerance below which a length counts as zero
pub const EPSILON: f32 = 1e-6;

/// Cosine of the angle between two vectors, 0 if either is (near) zero
#[inline]
pub fn cosine_similarity(a: Vec2, b: Vec2) -> f32 {
    let denom = a.length() * b.length();
    if denom <= EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0)
}

/// Closest point to `p` inside the axis-aligned rectangle `center ± half_extents`
#[inline]
pub fn closest_point_on_rect(p: Vec2, center: Vec2, half_extents: Vec2) -> Vec2 {
    p.clamp(center - half_extents, center + half_extents)
}

/// Sanitize a frame dt: NaN and negatives become 0, large stalls are capped
#[inline]
pub fn sanitize_dt(dt: f32, max: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, max) } else { 0.0 }
}

/// Format whole seconds as `M:SS` for the HUD
pub fn format_clock(seconds: f32) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0).ceil() as u32 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(Vec2::X, Vec2::X * 5.0) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(Vec2::X, -Vec2::X) + 1.0).abs() < 1e-6);
        assert!(cosine_similarity(Vec2::X, Vec2::Y).abs() < 1e-6);
        // Degenerate input is neutral, never NaN
        assert_eq!(cosine_similarity(Vec2::ZERO, Vec2::X), 0.0);
    }

    #[test]
    fn test_closest_point_on_rect() {
        let c = Vec2::new(100.0, 100.0);
        let half = Vec2::new(10.0, 5.0);
        assert_eq!(closest_point_on_rect(Vec2::new(0.0, 100.0), c, half), Vec2::new(90.0, 100.0));
        assert_eq!(closest_point_on_rect(c, c, half), c);
    }

    #[test]
    fn test_sanitize_dt() {
        assert_eq!(sanitize_dt(f32::NAN, 0.1), 0.0);
        assert_eq!(sanitize_dt(-1.0, 0.1), 0.0);
        assert_eq!(sanitize_dt(5.0, 0.1), 0.1);
        assert_eq!(sanitize_dt(0.016, 0.1), 0.016);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(125.0), "2:05");
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(59.2), "1:00");
        assert_eq!(format_clock(-3.0), "0:00");
    }
}
