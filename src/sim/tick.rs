//! Simulation tick
//!
//! One call advances the whole game by a frame's dt: scheduled work, physics
//! substeps, rescue and delivery, then the mission clock.

use glam::Vec2;

use super::body::integrate;
use super::collision::{resolve_pair, resolve_surface};
use super::mission::MissionStatus;
use super::state::{GameEvent, GameState, PLAYER, ScheduledAction};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, PHYSICS_STEP};
use crate::sanitize_dt;

/// Player intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Try to pick up the closest eligible astronaut
    pub rescue: bool,
}

impl TickInput {
    /// Unit thrust direction (screen coordinates, +y down); zero when idle or
    /// when opposite keys cancel out
    pub fn thrust_direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }

    /// Any intent at all (starts the mission)
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right || self.rescue
    }
}

/// Number of physics substeps for a frame of length `dt`
fn substeps(dt: f32) -> u32 {
    ((dt / PHYSICS_STEP).ceil() as u32).clamp(1, MAX_SUBSTEPS)
}

/// Advance the game by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    let dt = sanitize_dt(dt, MAX_FRAME_DT);

    if state.mission.is_over() {
        return;
    }
    if !state.mission.started {
        if !input.any() {
            return;
        }
        state.start();
    }
    if dt <= 0.0 {
        return;
    }

    state.clock += dt;
    let level = state.mission.level;
    state.run_due_actions();
    // A freshly loaded level starts on the next frame
    if state.mission.level != level || state.mission.status != MissionStatus::Playing {
        return;
    }

    let steps = substeps(dt);
    let step_dt = dt / steps as f32;
    for _ in 0..steps {
        step_physics(state, input, step_dt);
    }
    state.update_towed_positions();

    update_mission(state, input);

    if state.mission.tick_timer(dt) {
        state.events.push(GameEvent::MissionFailed {
            score: state.mission.score,
        });
    }
}

/// One fixed physics step: thrust, gravity, wrap, contacts, structures
fn step_physics(state: &mut GameState, input: &TickInput, dt: f32) {
    let max_speed = state.settings.max_speed;

    // Thrust only while there is fuel to burn
    let mut thrust = Vec2::ZERO;
    let direction = input.thrust_direction();
    if direction != Vec2::ZERO && state.mission.has_fuel() {
        thrust = direction * state.settings.thrust_force;
        let burn = state.settings.effective_fuel_burn() * dt;
        if state.mission.burn_fuel(burn) {
            log::debug!("Fuel exhausted at t={:.2}", state.clock);
            state.emit_once(GameEvent::FuelEmpty);
        }
    }

    for (i, body) in state.bodies.iter_mut().enumerate() {
        let mut force = state.field.force_at(body.pos, body.mass());
        if i == PLAYER {
            force += thrust;
        }
        integrate(body, force, dt, max_speed);
        body.pos = state.bounds.wrap(body.pos);
    }

    let mut events = Vec::new();

    // Planet surfaces
    let restitution = state.settings.surface_restitution;
    for body in state.bodies.iter_mut() {
        for (well_index, well) in state.field.wells.iter().enumerate() {
            if resolve_surface(body, well, restitution) {
                events.push(GameEvent::SurfaceImpact {
                    body_id: body.id,
                    well: well_index,
                });
            }
        }
    }

    // Body/body contacts in stable index order
    let scale = state.settings.collision_scale;
    let count = state.bodies.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let (head, tail) = state.bodies.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            if resolve_pair(a, b, scale) {
                events.push(GameEvent::Collision { a: a.id, b: b.id });
            }
        }
    }

    // Momentum structures
    for structure in state.structures.iter_mut() {
        structure.update(dt);
    }
    for (index, structure) in state.structures.iter_mut().enumerate() {
        for body in state.bodies.iter_mut() {
            if let Some(vel) = structure.interact(body) {
                body.vel = vel.clamp_length_max(max_speed);
                events.push(GameEvent::StructureTriggered {
                    kind: structure.kind(),
                    index,
                    body_id: body.id,
                });
            }
        }
    }

    for target in state.mission.active_targets.iter_mut() {
        target.update(dt, &state.bounds);
    }

    for event in events {
        state.emit_once(event);
    }
}

/// Rescue, delivery, gravity-field entry and level completion
fn update_mission(state: &mut GameState, input: &TickInput) {
    if input.rescue {
        if let Some(target_id) = state
            .mission
            .try_rescue(&state.bodies[PLAYER], &state.settings)
        {
            sync_player_mass(state);
            state.events.push(GameEvent::RescueSucceeded {
                target_id,
                towed: state.mission.towed.len(),
            });
        }
    }

    if let Some(delivery) =
        state
            .mission
            .try_deliver(state.bodies[PLAYER].pos, &state.station, &state.settings)
    {
        sync_player_mass(state);
        state.events.push(GameEvent::DeliverySucceeded {
            count: delivery.count,
            points: delivery.points,
        });
    }

    let well = state.field.strongest_well(state.bodies[PLAYER].pos);
    if well != state.current_well {
        if let Some(well) = well {
            state.events.push(GameEvent::EnteredGravityField { well });
        }
        state.current_well = well;
    }

    if state.mission.is_level_complete() {
        let level = state.mission.level;
        if level >= state.level_count() {
            if state.mission.win() {
                state.events.push(GameEvent::LevelCleared { level });
                state.events.push(GameEvent::MissionWon {
                    score: state.mission.score,
                });
            }
        } else if state.mission.begin_level_transition() {
            log::info!("Level {} cleared, score {}", level, state.mission.score);
            state.events.push(GameEvent::LevelCleared { level });
            let delay = state.settings.level_transition_delay;
            state.schedule(delay, ScheduledAction::AdvanceLevel);
        }
    }
}

/// Pod mass follows the number of astronauts in tow
fn sync_player_mass(state: &mut GameState) {
    let mass = state.mission.player_mass(&state.settings);
    state.bodies[PLAYER].set_mass(mass);
}
