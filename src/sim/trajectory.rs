//! Ballistic trajectory prediction
//!
//! Coasting flight only (no thrust), fixed timestep, unit test mass. The
//! result is advisory and never touches game state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind, Bounds, integrate};
use super::gravity::GravityField;
use crate::consts::PREDICTION_DT;

/// One sample of a predicted path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Why the prediction stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionEnd {
    /// Ran for the full step budget
    StepLimit,
    /// Left the playable rectangle
    OutOfBounds,
    /// Would hit a planet
    Crash,
}

/// A predicted path and how it ended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<TrajectoryPoint>,
    pub end: PredictionEnd,
}

/// Forward-simulate a coasting body through every well in `field`
pub fn predict(
    start_pos: Vec2,
    start_vel: Vec2,
    field: &GravityField,
    bounds: &Bounds,
    max_steps: usize,
    max_speed: f32,
) -> Trajectory {
    let mut probe = Body::new(0, BodyKind::Debris, start_pos, 1.0, 0.0).with_velocity(start_vel);
    let mut points = Vec::with_capacity(max_steps);

    if !start_pos.is_finite() || !start_vel.is_finite() {
        return Trajectory {
            points,
            end: PredictionEnd::OutOfBounds,
        };
    }

    for _ in 0..max_steps {
        let force = field.force_at(probe.pos, 1.0);
        integrate(&mut probe, force, PREDICTION_DT, max_speed);

        if !bounds.contains(probe.pos) {
            return Trajectory {
                points,
                end: PredictionEnd::OutOfBounds,
            };
        }
        if field.is_inside_any(probe.pos) {
            return Trajectory {
                points,
                end: PredictionEnd::Crash,
            };
        }

        points.push(TrajectoryPoint {
            pos: probe.pos,
            vel: probe.vel,
        });
    }

    Trajectory {
        points,
        end: PredictionEnd::StepLimit,
    }
}
