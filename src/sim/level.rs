//! Level layouts
//!
//! Layouts are plain data: targets, wells, debris and structures per level.
//! Tuning factors (gate conservation, boost factor, cooldowns) come from
//! [`Settings`] when a layout is instantiated, so one JSON file can rebalance
//! every level at once.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind};
use super::gravity::{GravityField, GravityWell};
use super::rescue::{Orbit, RescueRule, RescueTarget};
use super::structures::{BoostZone, Gate, MomentumStructure, MovingPlatform};
use crate::Settings;
use crate::consts::MOMENTUM_TOLERANCE;

/// Delivery point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub pos: Vec2,
    pub radius: f32,
}

impl Station {
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.distance(self.pos) <= self.radius
    }
}

fn proximity() -> RescueRule {
    RescueRule::Proximity
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDef {
    pub pos: Vec2,
    #[serde(default)]
    pub drift: Vec2,
    #[serde(default = "proximity")]
    pub rule: RescueRule,
    /// Momentum-match tolerance; falls back to the configured one
    #[serde(default)]
    pub tolerance: Option<f32>,
    #[serde(default)]
    pub orbit: Option<Orbit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisDef {
    pub pos: Vec2,
    #[serde(default)]
    pub vel: Vec2,
    pub mass: f32,
    pub radius: f32,
}

/// Structure geometry; transfer factors come from settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StructureDef {
    Gate {
        center: Vec2,
        direction: Vec2,
        half_width: f32,
    },
    BoostZone {
        center: Vec2,
        radius: f32,
        direction: Vec2,
    },
    Platform {
        start: Vec2,
        end: Vec2,
        half_extents: Vec2,
        speed: f32,
    },
}

impl StructureDef {
    pub fn build(&self, settings: &Settings) -> MomentumStructure {
        match *self {
            StructureDef::Gate {
                center,
                direction,
                half_width,
            } => MomentumStructure::Gate(Gate::new(
                center,
                direction,
                half_width,
                settings.gate_threshold,
                settings.gate_conservation,
                settings.gate_cooldown,
            )),
            StructureDef::BoostZone {
                center,
                radius,
                direction,
            } => MomentumStructure::BoostZone(BoostZone::new(
                center,
                radius,
                direction,
                settings.boost_factor,
                settings.boost_cooldown,
            )),
            StructureDef::Platform {
                start,
                end,
                half_extents,
                speed,
            } => MomentumStructure::Platform(MovingPlatform::new(
                start,
                end,
                half_extents,
                speed,
                settings.platform_amplification,
                settings.platform_cooldown,
            )),
        }
    }
}

/// A pilot hint shown `delay` seconds after the level starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintDef {
    pub delay: f32,
    pub text: String,
}

/// Static description of one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub name: String,
    /// Seconds on the clock
    pub time_budget: f32,
    pub fuel_budget: f32,
    pub player_start: Vec2,
    pub station: Station,
    #[serde(default)]
    pub wells: Vec<GravityWell>,
    #[serde(default)]
    pub targets: Vec<TargetDef>,
    #[serde(default)]
    pub debris: Vec<DebrisDef>,
    #[serde(default)]
    pub structures: Vec<StructureDef>,
    /// Extra debris placed by the seeded RNG
    #[serde(default)]
    pub scatter_debris: u32,
    #[serde(default)]
    pub hints: Vec<HintDef>,
}

impl LevelDefinition {
    pub fn build_field(&self, settings: &Settings) -> GravityField {
        GravityField::new(settings.gravity_constant, self.wells.clone())
    }

    pub fn build_structures(&self, settings: &Settings) -> Vec<MomentumStructure> {
        self.structures.iter().map(|s| s.build(settings)).collect()
    }

    pub fn build_targets(&self, settings: &Settings, mut next_id: impl FnMut() -> u32) -> Vec<RescueTarget> {
        self.targets
            .iter()
            .map(|def| {
                let rule = match def.rule {
                    RescueRule::MomentumMatch {
                        required_momentum,
                        required_direction,
                        ..
                    } => RescueRule::momentum_match(
                        required_momentum,
                        required_direction,
                        def.tolerance.unwrap_or(settings.momentum_tolerance),
                    ),
                    RescueRule::Proximity => RescueRule::Proximity,
                };
                let target = RescueTarget::new(next_id(), def.pos, rule).with_drift(def.drift);
                match def.orbit {
                    Some(orbit) => target.with_orbit(orbit),
                    None => target,
                }
            })
            .collect()
    }

    /// Fixed debris plus `scatter_debris` random pieces clear of wells and the pod
    pub fn build_debris(
        &self,
        settings: &Settings,
        rng: &mut Pcg32,
        mut next_id: impl FnMut() -> u32,
    ) -> Vec<Body> {
        let mut debris: Vec<Body> = self
            .debris
            .iter()
            .map(|d| Body::new(next_id(), BodyKind::Debris, d.pos, d.mass, d.radius).with_velocity(d.vel))
            .collect();

        let width = settings.world_width;
        let height = settings.world_height;
        for _ in 0..self.scatter_debris {
            let radius = rng.random_range(8.0..14.0);
            let mut placed = None;
            for _ in 0..32 {
                let pos = Vec2::new(rng.random_range(0.0..width), rng.random_range(0.0..height));
                let clear_of_wells = self
                    .wells
                    .iter()
                    .all(|w| pos.distance(w.pos) > w.collision_radius + radius + 30.0);
                let clear_of_pod = pos.distance(self.player_start) > 100.0;
                let clear_of_station = !self.station.contains(pos);
                if clear_of_wells && clear_of_pod && clear_of_station {
                    placed = Some(pos);
                    break;
                }
            }
            let Some(pos) = placed else {
                log::debug!("No room for scattered debris in {}", self.name);
                continue;
            };
            let vel = Vec2::new(rng.random_range(-30.0..30.0), rng.random_range(-30.0..30.0));
            let mass = rng.random_range(1.0..3.0);
            debris.push(Body::new(next_id(), BodyKind::Debris, pos, mass, radius).with_velocity(vel));
        }
        debris
    }
}

/// The ordered levels of a mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSet {
    pub levels: Vec<LevelDefinition>,
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelSet {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Level by 1-based number
    pub fn get(&self, level: u8) -> Option<&LevelDefinition> {
        (level as usize).checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The three stock levels: inertia, gravity, orbits
    pub fn builtin() -> Self {
        Self {
            levels: vec![level_inertia(), level_gravity(), level_orbits()],
        }
    }
}

fn hint(delay: f32, text: &str) -> HintDef {
    HintDef {
        delay,
        text: text.to_string(),
    }
}

fn level_inertia() -> LevelDefinition {
    LevelDefinition {
        name: "Inertia".to_string(),
        time_budget: 120.0,
        fuel_budget: 100.0,
        player_start: Vec2::new(150.0, 300.0),
        station: Station {
            pos: Vec2::new(80.0, 300.0),
            radius: 60.0,
        },
        wells: Vec::new(),
        targets: vec![
            TargetDef {
                pos: Vec2::new(400.0, 150.0),
                drift: Vec2::new(6.0, 2.0),
                rule: RescueRule::Proximity,
                tolerance: None,
                orbit: None,
            },
            TargetDef {
                pos: Vec2::new(620.0, 300.0),
                drift: Vec2::new(-3.0, 5.0),
                rule: RescueRule::Proximity,
                tolerance: None,
                orbit: None,
            },
            TargetDef {
                pos: Vec2::new(400.0, 460.0),
                drift: Vec2::new(4.0, -4.0),
                rule: RescueRule::Proximity,
                tolerance: None,
                orbit: None,
            },
        ],
        debris: vec![
            DebrisDef {
                pos: Vec2::new(300.0, 300.0),
                vel: Vec2::new(0.0, 20.0),
                mass: 2.0,
                radius: 14.0,
            },
            DebrisDef {
                pos: Vec2::new(520.0, 220.0),
                vel: Vec2::new(-15.0, 0.0),
                mass: 1.0,
                radius: 10.0,
            },
        ],
        structures: Vec::new(),
        scatter_debris: 2,
        hints: vec![
            hint(0.5, "Thrust changes your velocity, not your position. Let go and you keep drifting."),
            hint(6.0, "Bump into debris: momentum is shared between you, never lost."),
            hint(12.0, "Press rescue next to an astronaut, then bring them home to the station."),
        ],
    }
}

fn level_gravity() -> LevelDefinition {
    LevelDefinition {
        name: "Gravity".to_string(),
        time_budget: 150.0,
        fuel_budget: 100.0,
        player_start: Vec2::new(120.0, 520.0),
        station: Station {
            pos: Vec2::new(70.0, 530.0),
            radius: 60.0,
        },
        wells: vec![
            GravityWell::new(Vec2::new(420.0, 300.0), 100.0, 40.0, 200.0),
            GravityWell::new(Vec2::new(660.0, 140.0), 60.0, 25.0, 140.0),
        ],
        targets: vec![
            TargetDef {
                pos: Vec2::new(420.0, 160.0),
                drift: Vec2::ZERO,
                rule: RescueRule::Proximity,
                tolerance: None,
                orbit: None,
            },
            TargetDef {
                pos: Vec2::new(660.0, 400.0),
                drift: Vec2::new(-2.0, 3.0),
                rule: RescueRule::Proximity,
                tolerance: None,
                orbit: None,
            },
            TargetDef {
                pos: Vec2::new(260.0, 120.0),
                drift: Vec2::new(3.0, 0.0),
                rule: RescueRule::Proximity,
                tolerance: None,
                orbit: None,
            },
        ],
        debris: vec![DebrisDef {
            pos: Vec2::new(560.0, 300.0),
            vel: Vec2::new(0.0, -25.0),
            mass: 3.0,
            radius: 16.0,
        }],
        structures: vec![
            StructureDef::Gate {
                center: Vec2::new(250.0, 300.0),
                direction: Vec2::X,
                half_width: 25.0,
            },
            StructureDef::BoostZone {
                center: Vec2::new(560.0, 500.0),
                radius: 35.0,
                direction: Vec2::new(-1.0, 0.0),
            },
        ],
        scatter_debris: 3,
        hints: vec![
            hint(0.5, "Planets pull harder the closer you get: F = G·M·m / r²."),
            hint(6.0, "Watch the predicted path. Coast around a planet instead of burning fuel."),
            hint(12.0, "Gates channel your momentum along their axis. Boost zones re-aim it."),
        ],
    }
}

fn level_orbits() -> LevelDefinition {
    let well_center = Vec2::new(420.0, 300.0);
    LevelDefinition {
        name: "Orbits".to_string(),
        time_budget: 180.0,
        fuel_budget: 100.0,
        player_start: Vec2::new(100.0, 100.0),
        station: Station {
            pos: Vec2::new(60.0, 60.0),
            radius: 60.0,
        },
        wells: vec![GravityWell::new(well_center, 150.0, 45.0, 230.0)],
        targets: vec![
            TargetDef {
                pos: well_center,
                drift: Vec2::ZERO,
                rule: RescueRule::momentum_match(70.0, Vec2::Y, MOMENTUM_TOLERANCE),
                tolerance: None,
                orbit: Some(Orbit {
                    center: well_center,
                    radii: Vec2::new(140.0, 140.0),
                    phase: 0.0,
                    angular_speed: 0.5,
                }),
            },
            TargetDef {
                pos: well_center,
                drift: Vec2::ZERO,
                rule: RescueRule::momentum_match(70.0, Vec2::Y, MOMENTUM_TOLERANCE),
                tolerance: None,
                orbit: Some(Orbit {
                    center: well_center,
                    radii: Vec2::new(220.0, 160.0),
                    phase: std::f32::consts::PI,
                    angular_speed: -0.35,
                }),
            },
            TargetDef {
                pos: Vec2::new(700.0, 540.0),
                drift: Vec2::new(-4.0, -2.0),
                rule: RescueRule::Proximity,
                tolerance: None,
                orbit: None,
            },
        ],
        debris: Vec::new(),
        structures: vec![
            StructureDef::Platform {
                start: Vec2::new(200.0, 60.0),
                end: Vec2::new(600.0, 60.0),
                half_extents: Vec2::new(40.0, 8.0),
                speed: 80.0,
            },
            StructureDef::Platform {
                start: Vec2::new(740.0, 150.0),
                end: Vec2::new(740.0, 450.0),
                half_extents: Vec2::new(8.0, 40.0),
                speed: 60.0,
            },
            StructureDef::Gate {
                center: Vec2::new(560.0, 560.0),
                direction: Vec2::new(-1.0, 0.0),
                half_width: 25.0,
            },
        ],
        scatter_debris: 4,
        hints: vec![
            hint(0.5, "Orbiting astronauts can only be caught by matching their momentum."),
            hint(6.0, "Every passenger adds mass. The same thrust now gives less acceleration."),
            hint(12.0, "Platforms hand you their velocity on contact. Time your approach."),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_has_three_levels() {
        let set = LevelSet::builtin();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(1).unwrap().name, "Inertia");
        assert_eq!(set.get(3).unwrap().name, "Orbits");
        assert!(set.get(0).is_none());
        assert!(set.get(4).is_none());
    }

    #[test]
    fn test_scatter_is_deterministic_and_clear_of_wells() {
        let settings = Settings::default();
        let level = LevelSet::builtin().get(2).unwrap().clone();

        let build = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut id = 0;
            level.build_debris(&settings, &mut rng, || {
                id += 1;
                id
            })
        };
        let a = build(42);
        let b = build(42);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.vel, y.vel);
        }
        for d in &a {
            for w in &level.wells {
                assert!(d.pos.distance(w.pos) > w.collision_radius + d.radius);
            }
        }
    }

    #[test]
    fn test_structures_take_settings_factors() {
        let settings = Settings {
            boost_factor: 3.0,
            ..Settings::default()
        };
        let level = LevelSet::builtin().get(2).unwrap().clone();
        let structures = level.build_structures(&settings);
        let boost = structures
            .iter()
            .find_map(|s| match s {
                MomentumStructure::BoostZone(z) => Some(z),
                _ => None,
            })
            .unwrap();
        assert_eq!(boost.boost_factor, 3.0);
    }

    #[test]
    fn test_json_level_defaults() {
        let json = r#"{
            "levels": [{
                "name": "Custom",
                "time_budget": 30.0,
                "fuel_budget": 50.0,
                "player_start": [10.0, 10.0],
                "station": { "pos": [0.0, 0.0], "radius": 30.0 },
                "targets": [{ "pos": [100.0, 100.0] }]
            }]
        }"#;
        let set = LevelSet::from_json(json).unwrap();
        let level = set.get(1).unwrap();
        assert_eq!(level.targets[0].rule, RescueRule::Proximity);
        assert!(level.wells.is_empty());
        assert_eq!(level.scatter_debris, 0);
    }

    #[test]
    fn test_target_tolerance_override() {
        let mut level = LevelSet::builtin().get(3).unwrap().clone();
        level.targets[1].tolerance = Some(0.1);
        let settings = Settings {
            momentum_tolerance: 0.5,
            ..Settings::default()
        };
        let mut id = 0;
        let targets = level.build_targets(&settings, || {
            id += 1;
            id
        });
        let tolerances: Vec<f32> = targets
            .iter()
            .filter_map(|t| match t.rule {
                RescueRule::MomentumMatch { tolerance, .. } => Some(tolerance),
                RescueRule::Proximity => None,
            })
            .collect();
        assert_eq!(tolerances, vec![0.5, 0.1]);
    }

    #[test]
    fn test_orbit_targets_start_on_orbit() {
        let level = LevelSet::builtin().get(3).unwrap().clone();
        let mut id = 0;
        let targets = level.build_targets(&Settings::default(), || {
            id += 1;
            id
        });
        assert_eq!(targets.len(), 3);
        let first = &targets[0];
        assert!((first.pos - Vec2::new(560.0, 300.0)).length() < 1e-3);
        assert!(matches!(first.rule, RescueRule::MomentumMatch { .. }));
    }
}
