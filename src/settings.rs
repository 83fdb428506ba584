//! Game settings and tuning
//!
//! Every field defaults to the matching constant in [`crate::consts`]. A JSON
//! document only needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Cadet,
    #[default]
    Pilot,
    Commander,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Cadet => "Cadet",
            Difficulty::Pilot => "Pilot",
            Difficulty::Commander => "Commander",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cadet" | "easy" => Some(Difficulty::Cadet),
            "pilot" | "normal" => Some(Difficulty::Pilot),
            "commander" | "hard" => Some(Difficulty::Commander),
            _ => None,
        }
    }

    /// Multiplier on each level's time budget
    pub fn time_multiplier(&self) -> f32 {
        match self {
            Difficulty::Cadet => 1.5,
            Difficulty::Pilot => 1.0,
            Difficulty::Commander => 0.75,
        }
    }

    /// Multiplier on fuel burned per second of thrust
    pub fn fuel_burn_multiplier(&self) -> f32 {
        match self {
            Difficulty::Cadet => 0.5,
            Difficulty::Pilot => 1.0,
            Difficulty::Commander => 1.5,
        }
    }
}

/// Runtime-tunable physics and gameplay values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    pub wrap_margin: f32,

    // === Player ===
    pub player_base_mass: f32,
    pub player_radius: f32,
    pub thrust_force: f32,
    pub max_speed: f32,
    pub fuel_burn_rate: f32,

    // === Gravity ===
    pub gravity_constant: f32,
    pub surface_restitution: f32,

    // === Collisions ===
    pub collision_scale: f32,

    // === Rescue ===
    pub rescue_radius: f32,
    pub rescue_bonus: u64,
    pub delivery_bonus: u64,
    pub towed_mass_increment: f32,
    pub momentum_tolerance: f32,

    // === Structures ===
    pub gate_threshold: f32,
    pub gate_conservation: f32,
    pub gate_cooldown: f32,
    pub boost_factor: f32,
    pub boost_cooldown: f32,
    pub platform_amplification: f32,
    pub platform_cooldown: f32,

    // === Pacing ===
    pub level_transition_delay: f32,
    pub prediction_steps: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Pilot,

            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            wrap_margin: WRAP_MARGIN,

            player_base_mass: PLAYER_BASE_MASS,
            player_radius: PLAYER_RADIUS,
            thrust_force: THRUST_FORCE,
            max_speed: MAX_SPEED,
            fuel_burn_rate: FUEL_BURN_RATE,

            gravity_constant: GRAVITY_CONSTANT,
            surface_restitution: SURFACE_RESTITUTION,

            collision_scale: COLLISION_SCALE,

            rescue_radius: RESCUE_RADIUS,
            rescue_bonus: RESCUE_BONUS,
            delivery_bonus: DELIVERY_BONUS,
            towed_mass_increment: TOWED_MASS_INCREMENT,
            momentum_tolerance: MOMENTUM_TOLERANCE,

            gate_threshold: GATE_THRESHOLD,
            gate_conservation: GATE_CONSERVATION,
            gate_cooldown: GATE_COOLDOWN,
            boost_factor: BOOST_FACTOR,
            boost_cooldown: BOOST_COOLDOWN,
            platform_amplification: PLATFORM_AMPLIFICATION,
            platform_cooldown: PLATFORM_COOLDOWN,

            level_transition_delay: LEVEL_TRANSITION_DELAY,
            prediction_steps: PREDICTION_STEPS,
        }
    }
}

impl Settings {
    /// Create settings for a difficulty (everything else default)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse settings from JSON, then clamp out-of-range values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Parse settings from JSON, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings ({})", settings.difficulty.as_str());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        fn positive(name: &str, value: &mut f32, fallback: f32) {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("Setting {} = {} out of range, using {}", name, value, fallback);
                *value = fallback;
            }
        }
        fn non_negative(name: &str, value: &mut f32, fallback: f32) {
            if !value.is_finite() || *value < 0.0 {
                log::warn!("Setting {} = {} out of range, using {}", name, value, fallback);
                *value = fallback;
            }
        }

        positive("world_width", &mut self.world_width, defaults.world_width);
        positive("world_height", &mut self.world_height, defaults.world_height);
        non_negative("wrap_margin", &mut self.wrap_margin, defaults.wrap_margin);
        positive("max_speed", &mut self.max_speed, defaults.max_speed);
        positive("collision_scale", &mut self.collision_scale, defaults.collision_scale);
        non_negative("player_radius", &mut self.player_radius, defaults.player_radius);
        non_negative("thrust_force", &mut self.thrust_force, defaults.thrust_force);
        non_negative("fuel_burn_rate", &mut self.fuel_burn_rate, defaults.fuel_burn_rate);
        non_negative("gravity_constant", &mut self.gravity_constant, defaults.gravity_constant);
        non_negative("rescue_radius", &mut self.rescue_radius, defaults.rescue_radius);
        non_negative(
            "towed_mass_increment",
            &mut self.towed_mass_increment,
            defaults.towed_mass_increment,
        );
        non_negative("gate_threshold", &mut self.gate_threshold, defaults.gate_threshold);
        non_negative("gate_conservation", &mut self.gate_conservation, defaults.gate_conservation);
        non_negative("gate_cooldown", &mut self.gate_cooldown, defaults.gate_cooldown);
        non_negative("boost_factor", &mut self.boost_factor, defaults.boost_factor);
        non_negative("boost_cooldown", &mut self.boost_cooldown, defaults.boost_cooldown);
        non_negative(
            "platform_amplification",
            &mut self.platform_amplification,
            defaults.platform_amplification,
        );
        non_negative("platform_cooldown", &mut self.platform_cooldown, defaults.platform_cooldown);
        non_negative(
            "level_transition_delay",
            &mut self.level_transition_delay,
            defaults.level_transition_delay,
        );

        if !self.player_base_mass.is_finite() || self.player_base_mass < MIN_BODY_MASS {
            log::warn!(
                "Setting player_base_mass = {} below floor, using {}",
                self.player_base_mass,
                MIN_BODY_MASS
            );
            self.player_base_mass = MIN_BODY_MASS;
        }
        if !self.surface_restitution.is_finite() {
            self.surface_restitution = defaults.surface_restitution;
        }
        self.surface_restitution = self.surface_restitution.clamp(0.0, 1.0);
        if !self.momentum_tolerance.is_finite() {
            self.momentum_tolerance = defaults.momentum_tolerance;
        }
        self.momentum_tolerance = self.momentum_tolerance.clamp(0.0, 1.0);

        self
    }

    /// Fuel burned per second of thrust after difficulty scaling
    pub fn effective_fuel_burn(&self) -> f32 {
        self.fuel_burn_rate * self.difficulty.fuel_burn_multiplier()
    }
}
