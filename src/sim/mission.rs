//! Mission bookkeeping: score, fuel, countdown, rescue and delivery
//!
//! Transition methods are guarded: once a transition is underway or the
//! mission has ended, further calls are silent no-ops. Several events in the
//! same frame can therefore ask for the same transition safely.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::level::Station;
use super::rescue::RescueTarget;
use crate::Settings;
use crate::consts::MAX_FUEL;

/// Lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    /// A level is in play
    Playing,
    /// Level cleared, next one not loaded yet
    Transitioning,
    Won,
    Failed,
}

/// Coarse mission phase: Level1 → Level2 → Level3 → Won, or Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionPhase {
    Level(u8),
    Won,
    Failed,
}

/// Result of delivering towed targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub count: usize,
    pub points: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionState {
    pub score: u64,
    /// Fuel in [0, 100]
    pub fuel: f32,
    /// Seconds left on the clock
    pub time_remaining: f32,
    /// 1-based level number
    pub level: u8,
    pub started: bool,
    pub status: MissionStatus,
    pub active_targets: Vec<RescueTarget>,
    /// Rescued targets in pickup order
    pub towed: Vec<RescueTarget>,
    /// Time not yet taken off the clock (< 1s)
    second_accumulator: f32,
    fuel_empty_reported: bool,
}

impl Default for MissionState {
    fn default() -> Self {
        Self::new()
    }
}

impl MissionState {
    pub fn new() -> Self {
        Self {
            score: 0,
            fuel: MAX_FUEL,
            time_remaining: 0.0,
            level: 1,
            started: false,
            status: MissionStatus::Playing,
            active_targets: Vec::new(),
            towed: Vec::new(),
            second_accumulator: 0.0,
            fuel_empty_reported: false,
        }
    }

    /// Begin the countdown; returns false if already started
    pub fn start(&mut self) -> bool {
        if self.started || self.is_over() {
            return false;
        }
        self.started = true;
        true
    }

    /// Load a level's budgets and targets; score carries over
    pub fn reset_for_level(
        &mut self,
        level: u8,
        time_budget: f32,
        fuel_budget: f32,
        targets: Vec<RescueTarget>,
    ) {
        self.level = level;
        self.time_remaining = time_budget.max(0.0);
        self.fuel = fuel_budget.clamp(0.0, MAX_FUEL);
        self.active_targets = targets;
        self.towed.clear();
        self.second_accumulator = 0.0;
        self.fuel_empty_reported = false;
        if self.status == MissionStatus::Transitioning {
            self.status = MissionStatus::Playing;
        }
    }

    pub fn phase(&self) -> MissionPhase {
        match self.status {
            MissionStatus::Won => MissionPhase::Won,
            MissionStatus::Failed => MissionPhase::Failed,
            _ => MissionPhase::Level(self.level),
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        matches!(self.status, MissionStatus::Won | MissionStatus::Failed)
    }

    /// Started and a level is in play
    #[inline]
    pub fn is_running(&self) -> bool {
        self.started && self.status == MissionStatus::Playing
    }

    // === Clock ===

    /// Count the clock down in whole seconds; returns true if time just ran out
    pub fn tick_timer(&mut self, dt: f32) -> bool {
        if !self.is_running() || !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.second_accumulator += dt;
        while self.second_accumulator >= 1.0 && self.time_remaining > 0.0 {
            self.second_accumulator -= 1.0;
            self.time_remaining = (self.time_remaining - 1.0).max(0.0);
        }
        if self.time_remaining <= 0.0 {
            return self.fail();
        }
        false
    }

    // === Fuel ===

    #[inline]
    pub fn has_fuel(&self) -> bool {
        self.fuel > 0.0
    }

    /// Burn fuel; returns true the first time the tank hits empty
    pub fn burn_fuel(&mut self, amount: f32) -> bool {
        if !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.fuel = (self.fuel - amount).clamp(0.0, MAX_FUEL);
        if self.fuel <= 0.0 && !self.fuel_empty_reported {
            self.fuel_empty_reported = true;
            return true;
        }
        false
    }

    // === Rescue and delivery ===

    /// Tow the closest eligible target, at most one per attempt
    ///
    /// Returns the rescued target's id.
    pub fn try_rescue(&mut self, player: &Body, settings: &Settings) -> Option<u32> {
        if !self.is_running() {
            return None;
        }
        let index = self
            .active_targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_eligible(player, settings.rescue_radius))
            .min_by(|(_, a), (_, b)| {
                a.pos
                    .distance_squared(player.pos)
                    .partial_cmp(&b.pos.distance_squared(player.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)?;

        let mut target = self.active_targets.remove(index);
        target.rescued = true;
        let id = target.id;
        self.towed.push(target);
        self.score += settings.rescue_bonus;
        log::debug!("Rescued target {} ({} towed)", id, self.towed.len());
        Some(id)
    }

    /// Deliver every towed target if the player is inside the station
    pub fn try_deliver(&mut self, player_pos: Vec2, station: &Station, settings: &Settings) -> Option<Delivery> {
        if !self.is_running() || self.towed.is_empty() || !station.contains(player_pos) {
            return None;
        }
        let count = self.towed.len();
        let points = settings.delivery_bonus * count as u64;
        self.towed.clear();
        self.score += points;
        log::debug!("Delivered {} targets for {} points", count, points);
        Some(Delivery { count, points })
    }

    /// Player mass implied by the current tow
    pub fn player_mass(&self, settings: &Settings) -> f32 {
        settings.player_base_mass + settings.towed_mass_increment * self.towed.len() as f32
    }

    pub fn is_level_complete(&self) -> bool {
        self.active_targets.is_empty() && self.towed.is_empty()
    }

    // === Transitions ===

    /// Freeze play between levels; returns false if not allowed right now
    pub fn begin_level_transition(&mut self) -> bool {
        if self.status != MissionStatus::Playing {
            log::debug!("Ignoring level transition while {:?}", self.status);
            return false;
        }
        self.status = MissionStatus::Transitioning;
        true
    }

    pub fn win(&mut self) -> bool {
        if self.status != MissionStatus::Playing {
            log::debug!("Ignoring win while {:?}", self.status);
            return false;
        }
        self.status = MissionStatus::Won;
        log::info!("Mission won with {} points", self.score);
        true
    }

    pub fn fail(&mut self) -> bool {
        if self.status != MissionStatus::Playing {
            log::debug!("Ignoring failure while {:?}", self.status);
            return false;
        }
        self.status = MissionStatus::Failed;
        log::info!("Mission failed on level {} with {} points", self.level, self.score);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyKind;
    use crate::sim::rescue::RescueRule;

    fn running(targets: Vec<RescueTarget>) -> MissionState {
        let mut m = MissionState::new();
        m.reset_for_level(1, 60.0, 100.0, targets);
        m.start();
        m
    }

    fn pod(pos: Vec2) -> Body {
        Body::new(1, BodyKind::Player, pos, 1.0, 15.0)
    }

    #[test]
    fn test_timer_counts_whole_seconds() {
        let mut m = running(Vec::new());
        for _ in 0..59 {
            m.tick_timer(1.0 / 60.0);
        }
        assert_eq!(m.time_remaining, 60.0);
        m.tick_timer(0.5);
        assert_eq!(m.time_remaining, 59.0);
    }

    #[test]
    fn test_timeout_fails_once() {
        let mut m = running(Vec::new());
        m.time_remaining = 1.0;
        assert!(m.tick_timer(1.0));
        assert_eq!(m.time_remaining, 0.0);
        assert_eq!(m.status, MissionStatus::Failed);
        assert!(!m.tick_timer(1.0));
        assert_eq!(m.phase(), MissionPhase::Failed);
    }

    #[test]
    fn test_timer_idle_until_started() {
        let mut m = MissionState::new();
        m.reset_for_level(1, 10.0, 100.0, Vec::new());
        assert!(!m.tick_timer(5.0));
        assert_eq!(m.time_remaining, 10.0);
    }

    #[test]
    fn test_fuel_empty_reported_once() {
        let mut m = running(Vec::new());
        assert!(!m.burn_fuel(60.0));
        assert!(m.burn_fuel(60.0));
        assert_eq!(m.fuel, 0.0);
        assert!(!m.has_fuel());
        assert!(!m.burn_fuel(1.0));
        assert!(!m.burn_fuel(f32::NAN));
    }

    #[test]
    fn test_rescue_picks_closest_only() {
        let targets = vec![
            RescueTarget::new(1, Vec2::new(30.0, 0.0), RescueRule::Proximity),
            RescueTarget::new(2, Vec2::new(10.0, 0.0), RescueRule::Proximity),
            RescueTarget::new(3, Vec2::new(500.0, 0.0), RescueRule::Proximity),
        ];
        let mut m = running(targets);
        let settings = Settings::default();
        assert_eq!(m.try_rescue(&pod(Vec2::ZERO), &settings), Some(2));
        assert_eq!(m.towed.len(), 1);
        assert_eq!(m.active_targets.len(), 2);
        assert_eq!(m.score, settings.rescue_bonus);
        assert!((m.player_mass(&settings) - 1.5).abs() < 1e-6);

        assert_eq!(m.try_rescue(&pod(Vec2::ZERO), &settings), Some(1));
        // Nothing left in range
        assert_eq!(m.try_rescue(&pod(Vec2::ZERO), &settings), None);
    }

    #[test]
    fn test_delivery_is_batched() {
        let settings = Settings::default();
        let targets = (1..=3)
            .map(|id| RescueTarget::new(id, Vec2::ZERO, RescueRule::Proximity))
            .collect();
        let mut m = running(targets);
        for _ in 0..3 {
            assert!(m.try_rescue(&pod(Vec2::ZERO), &settings).is_some());
        }
        let station = Station {
            pos: Vec2::new(200.0, 0.0),
            radius: 50.0,
        };
        assert!(m.try_deliver(Vec2::ZERO, &station, &settings).is_none());
        let delivery = m.try_deliver(Vec2::new(180.0, 0.0), &station, &settings).unwrap();
        assert_eq!(delivery.count, 3);
        assert_eq!(m.score, settings.rescue_bonus * 3 + settings.delivery_bonus * 3);
        assert!(m.towed.is_empty());
        assert_eq!(m.player_mass(&settings), settings.player_base_mass);
        assert!(m.is_level_complete());
        // Empty tow: no-op
        assert!(m.try_deliver(Vec2::new(180.0, 0.0), &station, &settings).is_none());
    }

    #[test]
    fn test_transition_guards() {
        let mut m = running(Vec::new());
        assert!(m.begin_level_transition());
        assert!(!m.begin_level_transition());
        assert!(!m.win());
        assert!(!m.fail());
        m.reset_for_level(2, 60.0, 100.0, Vec::new());
        assert_eq!(m.status, MissionStatus::Playing);
        assert_eq!(m.phase(), MissionPhase::Level(2));
        assert!(m.win());
        assert!(!m.fail());
        assert!(!m.begin_level_transition());
        assert_eq!(m.phase(), MissionPhase::Won);
    }

    #[test]
    fn test_score_carries_across_levels() {
        let mut m = running(Vec::new());
        m.score = 450;
        m.fuel = 3.0;
        m.begin_level_transition();
        m.reset_for_level(2, 90.0, 100.0, Vec::new());
        assert_eq!(m.score, 450);
        assert_eq!(m.fuel, 100.0);
        assert_eq!(m.time_remaining, 90.0);
    }
}
