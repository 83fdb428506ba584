//! Momentum transfer structures: gates, boost zones and moving platforms
//!
//! Each structure owns a [`Cooldown`] and cycles Ready → Triggered →
//! CoolingDown → Ready. While cooling down it never interacts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::{EPSILON, closest_point_on_rect};

/// Observable phase of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructurePhase {
    Ready,
    /// Fired during the current tick
    Triggered,
    CoolingDown,
}

/// Refractory timer shared by all structures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub remaining: f32,
    pub duration: f32,
    /// Set on trigger, cleared by the next `update`
    #[serde(default)]
    fired: bool,
}

impl Cooldown {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: 0.0,
            duration: duration.max(0.0),
            fired: false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.fired = false;
        if dt.is_finite() && dt > 0.0 && self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.remaining <= EPSILON
    }

    pub fn trigger(&mut self) {
        self.remaining = self.duration;
        self.fired = true;
    }

    pub fn phase(&self) -> StructurePhase {
        if self.fired {
            StructurePhase::Triggered
        } else if self.is_ready() {
            StructurePhase::Ready
        } else {
            StructurePhase::CoolingDown
        }
    }
}

/// Redirects flow along its axis when crossed fast enough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub center: Vec2,
    /// Unit axis
    pub direction: Vec2,
    pub half_width: f32,
    /// Minimum |v·dir| to trigger
    pub threshold: f32,
    pub conservation_factor: f32,
    pub cooldown: Cooldown,
}

impl Gate {
    pub fn new(
        center: Vec2,
        direction: Vec2,
        half_width: f32,
        threshold: f32,
        conservation_factor: f32,
        cooldown: f32,
    ) -> Self {
        Self {
            center,
            direction: direction.normalize_or_zero(),
            half_width,
            threshold,
            conservation_factor,
            cooldown: Cooldown::new(cooldown),
        }
    }

    /// New velocity for `body` if the gate fires
    pub fn interact(&mut self, body: &Body) -> Option<Vec2> {
        if !self.cooldown.is_ready() || self.direction == Vec2::ZERO {
            return None;
        }
        if body.pos.distance(self.center) > self.half_width + body.radius {
            return None;
        }
        let along = body.vel.dot(self.direction).abs();
        if along <= self.threshold {
            return None;
        }
        self.cooldown.trigger();
        Some(self.direction * along * self.conservation_factor)
    }
}

/// Circular region that re-aims and amplifies a body's speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostZone {
    pub center: Vec2,
    pub radius: f32,
    /// Unit direction of the boost
    pub direction: Vec2,
    pub boost_factor: f32,
    pub cooldown: Cooldown,
}

impl BoostZone {
    pub fn new(center: Vec2, radius: f32, direction: Vec2, boost_factor: f32, cooldown: f32) -> Self {
        Self {
            center,
            radius,
            direction: direction.normalize_or_zero(),
            boost_factor,
            cooldown: Cooldown::new(cooldown),
        }
    }

    pub fn interact(&mut self, body: &Body) -> Option<Vec2> {
        if !self.cooldown.is_ready() || self.direction == Vec2::ZERO {
            return None;
        }
        if body.pos.distance(self.center) > self.radius {
            return None;
        }
        // A body at rest has nothing to redirect
        let speed = body.speed();
        if speed <= EPSILON {
            return None;
        }
        self.cooldown.trigger();
        Some(self.direction * speed * self.boost_factor)
    }
}

/// Rectangle ping-ponging between two endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub start: Vec2,
    pub end: Vec2,
    pub pos: Vec2,
    pub half_extents: Vec2,
    pub speed: f32,
    /// True while travelling start → end
    pub forward: bool,
    pub amplification: f32,
    pub cooldown: Cooldown,
}

impl MovingPlatform {
    pub fn new(
        start: Vec2,
        end: Vec2,
        half_extents: Vec2,
        speed: f32,
        amplification: f32,
        cooldown: f32,
    ) -> Self {
        Self {
            start,
            end,
            pos: start,
            half_extents: half_extents.abs(),
            speed: speed.max(0.0),
            forward: true,
            amplification,
            cooldown: Cooldown::new(cooldown),
        }
    }

    fn target(&self) -> Vec2 {
        if self.forward { self.end } else { self.start }
    }

    /// Current platform velocity
    pub fn velocity(&self) -> Vec2 {
        (self.target() - self.pos).normalize_or_zero() * self.speed
    }

    /// Move toward the current endpoint; snap and reverse on arrival
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 || self.speed <= 0.0 {
            return;
        }
        let target = self.target();
        let to_target = target - self.pos;
        let step = self.speed * dt;
        if to_target.length() <= step {
            self.pos = target;
            self.forward = !self.forward;
        } else {
            self.pos += to_target.normalize_or_zero() * step;
        }
    }

    pub fn overlaps(&self, body: &Body) -> bool {
        let closest = closest_point_on_rect(body.pos, self.pos, self.half_extents);
        body.pos.distance(closest) <= body.radius
    }

    /// Transfer platform velocity into an overlapping body
    pub fn interact(&mut self, body: &Body) -> Option<Vec2> {
        if !self.cooldown.is_ready() || !self.overlaps(body) {
            return None;
        }
        let platform_vel = self.velocity();
        if platform_vel == Vec2::ZERO {
            return None;
        }
        self.cooldown.trigger();
        Some(body.vel + platform_vel * self.amplification)
    }
}

/// Structure kind tag (for events)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Gate,
    BoostZone,
    Platform,
}

/// Any momentum structure placed in a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MomentumStructure {
    Gate(Gate),
    BoostZone(BoostZone),
    Platform(MovingPlatform),
}

impl MomentumStructure {
    pub fn kind(&self) -> StructureKind {
        match self {
            MomentumStructure::Gate(_) => StructureKind::Gate,
            MomentumStructure::BoostZone(_) => StructureKind::BoostZone,
            MomentumStructure::Platform(_) => StructureKind::Platform,
        }
    }

    fn cooldown(&self) -> &Cooldown {
        match self {
            MomentumStructure::Gate(g) => &g.cooldown,
            MomentumStructure::BoostZone(z) => &z.cooldown,
            MomentumStructure::Platform(p) => &p.cooldown,
        }
    }

    fn cooldown_mut(&mut self) -> &mut Cooldown {
        match self {
            MomentumStructure::Gate(g) => &mut g.cooldown,
            MomentumStructure::BoostZone(z) => &mut z.cooldown,
            MomentumStructure::Platform(p) => &mut p.cooldown,
        }
    }

    /// Per-tick update: count down the cooldown and move platforms
    pub fn update(&mut self, dt: f32) {
        self.cooldown_mut().update(dt);
        if let MomentumStructure::Platform(p) = self {
            p.advance(dt);
        }
    }

    /// New velocity for `body`, or None when there is no interaction
    pub fn interact(&mut self, body: &Body) -> Option<Vec2> {
        match self {
            MomentumStructure::Gate(g) => g.interact(body),
            MomentumStructure::BoostZone(z) => z.interact(body),
            MomentumStructure::Platform(p) => p.interact(body),
        }
    }

    pub fn phase(&self) -> StructurePhase {
        self.cooldown().phase()
    }

    pub fn position(&self) -> Vec2 {
        match self {
            MomentumStructure::Gate(g) => g.center,
            MomentumStructure::BoostZone(z) => z.center,
            MomentumStructure::Platform(p) => p.pos,
        }
    }
}
