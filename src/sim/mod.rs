//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable frame dt, split into bounded fixed substeps
//! - Seeded RNG only
//! - Stable iteration order (player first, then by spawn order)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod gravity;
pub mod level;
pub mod mission;
pub mod rescue;
pub mod scheduler;
pub mod state;
pub mod structures;
pub mod tick;
pub mod trajectory;

pub use body::{Body, BodyKind, Bounds, integrate};
pub use collision::{CollisionResult, body_body_collision, reflect_velocity, resolve_pair, resolve_surface};
pub use gravity::{GravityField, GravityWell};
pub use level::{LevelDefinition, LevelSet, Station};
pub use mission::{Delivery, MissionPhase, MissionState, MissionStatus};
pub use rescue::{Orbit, RescueRule, RescueTarget};
pub use scheduler::{Scheduler, TaskToken};
pub use state::{GameEvent, GameState, HudSnapshot, PLAYER, ScheduledAction};
pub use structures::{BoostZone, Gate, MomentumStructure, MovingPlatform, StructureKind, StructurePhase};
pub use tick::{TickInput, tick};
pub use trajectory::{PredictionEnd, Trajectory, TrajectoryPoint, predict};
