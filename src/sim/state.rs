//! Game state and simulation context
//!
//! Everything a tick reads or writes lives in [`GameState`]: the body arena
//! (player first), the level's wells and structures, the mission, the
//! scheduler and the events produced this tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind, Bounds};
use super::gravity::GravityField;
use super::level::{LevelSet, Station};
use super::mission::{MissionState, MissionStatus};
use super::scheduler::Scheduler;
use super::structures::{MomentumStructure, StructureKind};
use super::trajectory::{self, Trajectory};
use crate::Settings;
use crate::consts::{MAX_FUEL, TOW_SPACING};
use crate::format_clock;

/// Index of the player in [`GameState::bodies`]
pub const PLAYER: usize = 0;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MissionStarted,
    RescueSucceeded { target_id: u32, towed: usize },
    DeliverySucceeded { count: usize, points: u64 },
    /// Two bodies bounced off each other
    Collision { a: u32, b: u32 },
    /// A body bounced off a planet
    SurfaceImpact { body_id: u32, well: usize },
    StructureTriggered { kind: StructureKind, index: usize, body_id: u32 },
    EnteredGravityField { well: usize },
    FuelEmpty,
    Hint { text: String },
    LevelCleared { level: u8 },
    LevelAdvanced { level: u8 },
    MissionWon { score: u64 },
    MissionFailed { score: u64 },
}

/// Deferred work keyed to the simulation clock
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledAction {
    Hint(String),
    AdvanceLevel,
}

/// Values the HUD shows each frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    pub speed: f32,
    /// Fuel as 0-100 percent
    pub fuel_percent: f32,
    pub score: u64,
    /// Remaining time as `M:SS`
    pub time_text: String,
    pub level: u8,
    pub level_name: String,
    pub status: MissionStatus,
    pub towed: usize,
    pub targets_left: usize,
    /// Coasting in a near-circular orbit of the dominant well
    pub stable_orbit: bool,
}

/// Complete simulation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub levels: LevelSet,
    pub bounds: Bounds,
    /// Virtual clock (seconds of play)
    pub clock: f32,
    /// Dynamic bodies; the player is always at [`PLAYER`]
    pub bodies: Vec<Body>,
    pub field: GravityField,
    pub structures: Vec<MomentumStructure>,
    pub station: Station,
    pub mission: MissionState,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
    #[serde(skip)]
    pub(crate) scheduler: Scheduler<ScheduledAction>,
    /// Bumped on every level load; stale scheduled work is dropped
    level_epoch: u32,
    /// Well whose field the player was in last tick
    pub(crate) current_well: Option<usize>,
    next_id: u32,
}

impl GameState {
    /// Create a new game with default settings and the built-in levels
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Settings::default(), LevelSet::builtin())
    }

    /// Create a new game with injected tuning and level layouts
    pub fn with_config(seed: u64, settings: Settings, levels: LevelSet) -> Self {
        let settings = settings.sanitized();
        let levels = if levels.is_empty() {
            log::warn!("Empty level set, falling back to built-in levels");
            LevelSet::builtin()
        } else {
            levels
        };
        let bounds = Bounds::new(settings.world_width, settings.world_height, settings.wrap_margin);

        let mut state = Self {
            seed,
            settings,
            levels,
            bounds,
            clock: 0.0,
            bodies: Vec::new(),
            field: GravityField::default(),
            structures: Vec::new(),
            station: Station {
                pos: Vec2::ZERO,
                radius: 0.0,
            },
            mission: MissionState::new(),
            events: Vec::new(),
            scheduler: Scheduler::new(),
            level_epoch: 0,
            current_well: None,
            next_id: 1,
        };
        state.load_level(1);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn player(&self) -> &Body {
        &self.bodies[PLAYER]
    }

    #[inline]
    pub fn player_mut(&mut self) -> &mut Body {
        &mut self.bodies[PLAYER]
    }

    pub fn level_count(&self) -> u8 {
        self.levels.len().min(u8::MAX as usize) as u8
    }

    /// Tear down the current level and build `level` from its definition
    pub fn load_level(&mut self, level: u8) {
        let Some(def) = self.levels.get(level).cloned() else {
            log::warn!("Level {} not defined", level);
            return;
        };

        self.level_epoch += 1;
        self.scheduler.retire_owners_before(self.level_epoch);

        let mut rng = Pcg32::seed_from_u64(
            self.seed ^ (level as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );

        let player_id = self.next_entity_id();
        let player = Body::new(
            player_id,
            BodyKind::Player,
            def.player_start,
            self.settings.player_base_mass,
            self.settings.player_radius,
        );

        let mut next_id = self.next_id;
        let debris = def.build_debris(&self.settings, &mut rng, || {
            let id = next_id;
            next_id += 1;
            id
        });
        let targets = def.build_targets(&self.settings, || {
            let id = next_id;
            next_id += 1;
            id
        });
        self.next_id = next_id;

        self.bodies.clear();
        self.bodies.push(player);
        self.bodies.extend(debris);
        self.field = def.build_field(&self.settings);
        self.structures = def.build_structures(&self.settings);
        self.station = def.station;
        self.current_well = None;

        let time_budget = def.time_budget * self.settings.difficulty.time_multiplier();
        self.mission
            .reset_for_level(level, time_budget, def.fuel_budget.min(MAX_FUEL), targets);

        for hint in &def.hints {
            self.scheduler.schedule_in(
                self.clock,
                hint.delay,
                self.level_epoch,
                ScheduledAction::Hint(hint.text.clone()),
            );
        }

        log::info!(
            "Level {} ({}): {} targets, {} wells, {} structures, {} debris, {:.0}s",
            level,
            def.name,
            self.mission.active_targets.len(),
            self.field.wells.len(),
            self.structures.len(),
            self.bodies.len() - 1,
            time_budget
        );
    }

    /// Start the mission clock; emits `MissionStarted` once
    pub fn start(&mut self) {
        if self.mission.start() {
            log::info!("Mission started (seed {})", self.seed);
            self.events.push(GameEvent::MissionStarted);
        }
    }

    /// Push an event unless an identical one was already raised this tick
    pub(crate) fn emit_once(&mut self, event: GameEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    /// Queue work on the virtual clock, owned by the current level
    pub(crate) fn schedule(&mut self, delay: f32, action: ScheduledAction) {
        self.scheduler
            .schedule_in(self.clock, delay, self.level_epoch, action);
    }

    /// Fire scheduled work that has come due
    ///
    /// One action at a time: a level advance retires the old level's epoch,
    /// and its remaining work must not fire on the new level.
    pub(crate) fn run_due_actions(&mut self) {
        while let Some(action) = self.scheduler.pop_due(self.clock) {
            match action {
                ScheduledAction::Hint(text) => {
                    if self.mission.is_running() {
                        self.events.push(GameEvent::Hint { text });
                    }
                }
                ScheduledAction::AdvanceLevel => self.advance_level(),
            }
        }
    }

    fn advance_level(&mut self) {
        if self.mission.status != MissionStatus::Transitioning {
            return;
        }
        let next = self.mission.level.saturating_add(1);
        self.load_level(next);
        self.events.push(GameEvent::LevelAdvanced { level: next });
    }

    /// Keep towed targets trailing the pod (cosmetic)
    pub(crate) fn update_towed_positions(&mut self) {
        let player = &self.bodies[PLAYER];
        let heading = player.vel.normalize_or_zero();
        let heading = if heading == Vec2::ZERO { Vec2::X } else { heading };
        let anchor = player.pos;
        let base = player.radius;
        for (i, target) in self.mission.towed.iter_mut().enumerate() {
            target.pos = anchor - heading * (base + TOW_SPACING * (i as f32 + 1.0));
            target.vel = player.vel;
        }
    }

    /// Predicted coasting path of the player from its current state
    pub fn predicted_path(&self) -> Trajectory {
        let player = self.player();
        trajectory::predict(
            player.pos,
            player.vel,
            &self.field,
            &self.bounds,
            self.settings.prediction_steps,
            self.settings.max_speed,
        )
    }

    /// Values for the HUD
    pub fn hud(&self) -> HudSnapshot {
        let player = self.player();
        let stable_orbit = self
            .field
            .strongest_well(player.pos)
            .map(|i| self.field.wells[i].is_stable_orbit(player.pos, player.vel, self.field.g))
            .unwrap_or(false);
        let level_name = self
            .levels
            .get(self.mission.level)
            .map(|l| l.name.clone())
            .unwrap_or_default();

        HudSnapshot {
            player_pos: player.pos,
            player_vel: player.vel,
            speed: player.speed(),
            fuel_percent: (self.mission.fuel / MAX_FUEL * 100.0).clamp(0.0, 100.0),
            score: self.mission.score,
            time_text: format_clock(self.mission.time_remaining),
            level: self.mission.level,
            level_name,
            status: self.mission.status,
            towed: self.mission.towed.len(),
            targets_left: self.mission.active_targets.len(),
            stable_orbit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_loads_level_one() {
        let state = GameState::new(7);
        assert_eq!(state.mission.level, 1);
        assert_eq!(state.player().kind, BodyKind::Player);
        assert_eq!(state.player().mass(), state.settings.player_base_mass);
        assert_eq!(state.mission.active_targets.len(), 3);
        assert!(!state.mission.started);
        assert_eq!(state.mission.fuel, MAX_FUEL);
        assert_eq!(state.mission.time_remaining, 120.0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GameState::new(1234);
        let b = GameState::new(1234);
        assert_eq!(a.bodies.len(), b.bodies.len());
        for (x, y) in a.bodies.iter().zip(&b.bodies) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.vel, y.vel);
        }
    }

    #[test]
    fn test_entity_ids_unique() {
        let state = GameState::new(99);
        let mut ids: Vec<u32> = state.bodies.iter().map(|b| b.id).collect();
        ids.extend(state.mission.active_targets.iter().map(|t| t.id));
        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn test_difficulty_scales_time_budget() {
        let settings = Settings::from_difficulty(crate::Difficulty::Cadet);
        let state = GameState::with_config(1, settings, LevelSet::builtin());
        assert_eq!(state.mission.time_remaining, 180.0);
    }

    #[test]
    fn test_configured_momentum_tolerance_reaches_targets() {
        let settings = Settings {
            momentum_tolerance: 0.9,
            ..Settings::default()
        };
        let mut state = GameState::with_config(1, settings, LevelSet::builtin());
        state.load_level(3);
        let matched: Vec<f32> = state
            .mission
            .active_targets
            .iter()
            .filter_map(|t| match t.rule {
                crate::sim::rescue::RescueRule::MomentumMatch { tolerance, .. } => Some(tolerance),
                crate::sim::rescue::RescueRule::Proximity => None,
            })
            .collect();
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|&t| (t - 0.9).abs() < 1e-6));
    }

    #[test]
    fn test_empty_level_set_falls_back() {
        let state = GameState::with_config(1, Settings::default(), LevelSet { levels: Vec::new() });
        assert_eq!(state.level_count(), 3);
    }

    #[test]
    fn test_load_level_retires_old_hints() {
        let mut state = GameState::new(5);
        let pending_level_one = state.scheduler.pending();
        assert!(pending_level_one > 0);
        state.load_level(2);
        // Only level 2's hints remain
        let level_two_hints = state.levels.get(2).unwrap().hints.len();
        assert_eq!(state.scheduler.pending(), level_two_hints);
        assert!(state.field.wells.len() == 2);
    }

    #[test]
    fn test_towed_targets_trail_player() {
        let mut state = GameState::new(5);
        let target = state.mission.active_targets.remove(0);
        state.mission.towed.push(target);
        state.player_mut().vel = Vec2::new(10.0, 0.0);
        state.update_towed_positions();
        let player = state.player().clone();
        let towed = &state.mission.towed[0];
        assert!(towed.pos.x < player.pos.x);
        assert!((towed.pos.y - player.pos.y).abs() < 1e-4);
    }

    #[test]
    fn test_hud_snapshot() {
        let state = GameState::new(5);
        let hud = state.hud();
        assert_eq!(hud.time_text, "2:00");
        assert_eq!(hud.fuel_percent, 100.0);
        assert_eq!(hud.level_name, "Inertia");
        assert_eq!(hud.targets_left, 3);
        assert!(!hud.stable_orbit);
    }

    #[test]
    fn test_predicted_path_does_not_mutate() {
        let mut state = GameState::new(5);
        state.load_level(2);
        state.player_mut().vel = Vec2::new(40.0, -30.0);
        let before = state.player().clone();
        let path = state.predicted_path();
        assert!(!path.points.is_empty());
        assert_eq!(state.player().pos, before.pos);
        assert_eq!(state.player().vel, before.vel);
    }
}
