//! Newton Rescue headless runner
//!
//! Drives the simulation with a simple autopilot at 60 Hz and logs what
//! happens. Useful for soak-testing levels and tuning without a renderer.
//!
//! Usage: `newton-rescue [seed] [--difficulty cadet|pilot|commander] [--settings file.json]`

use newton_rescue::sim::{GameEvent, GameState, PLAYER, TickInput, tick};
use newton_rescue::{Difficulty, Settings, sim::LevelSet};

const FRAME_DT: f32 = 1.0 / 60.0;
/// Hard stop for the soak run (ten minutes of game time)
const MAX_FRAMES: u32 = 60 * 60 * 10;
/// Cruise speed the autopilot tries to hold
const CRUISE_SPEED: f32 = 90.0;
/// Velocity error below which the autopilot stops burning
const DEADBAND: f32 = 8.0;

struct Args {
    seed: u64,
    settings: Settings,
}

fn parse_args() -> Args {
    let mut seed = 12345;
    let mut settings = Settings::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--difficulty" => match args.next().as_deref().and_then(Difficulty::from_str) {
                Some(difficulty) => {
                    settings.difficulty = difficulty;
                }
                None => log::warn!("Unknown difficulty, keeping {}", settings.difficulty.as_str()),
            },
            "--settings" => {
                if let Some(path) = args.next() {
                    match std::fs::read_to_string(&path) {
                        Ok(json) => settings = Settings::from_json_or_default(&json),
                        Err(e) => log::warn!("Failed to read {}: {}", path, e),
                    }
                }
            }
            other => match other.parse() {
                Ok(value) => seed = value,
                Err(_) => log::warn!("Ignoring argument {:?}", other),
            },
        }
    }
    Args { seed, settings }
}

/// Steer toward the nearest astronaut, or home once anyone is in tow
fn autopilot(state: &GameState) -> TickInput {
    let player = &state.bodies[PLAYER];
    let goal = if !state.mission.towed.is_empty() || state.mission.active_targets.is_empty() {
        Some(state.station.pos)
    } else {
        state
            .mission
            .active_targets
            .iter()
            .map(|t| t.pos)
            .min_by(|a, b| {
                a.distance_squared(player.pos)
                    .partial_cmp(&b.distance_squared(player.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    };
    let Some(goal) = goal else {
        return TickInput::default();
    };

    let offset = goal - player.pos;
    let desired = offset.normalize_or_zero() * CRUISE_SPEED.min(offset.length());
    let error = desired - player.vel;
    let near_target = state
        .mission
        .active_targets
        .iter()
        .any(|t| t.pos.distance(player.pos) <= state.settings.rescue_radius);

    TickInput {
        up: error.y < -DEADBAND,
        down: error.y > DEADBAND,
        left: error.x < -DEADBAND,
        right: error.x > DEADBAND,
        rescue: near_target,
    }
}

fn describe(event: &GameEvent) -> Option<String> {
    Some(match event {
        GameEvent::MissionStarted => "mission started".to_string(),
        GameEvent::RescueSucceeded { target_id, towed } => {
            format!("rescued astronaut {} ({} in tow)", target_id, towed)
        }
        GameEvent::DeliverySucceeded { count, points } => {
            format!("delivered {} for {} points", count, points)
        }
        GameEvent::FuelEmpty => "out of fuel".to_string(),
        GameEvent::Hint { text } => format!("hint: {}", text),
        GameEvent::LevelCleared { level } => format!("level {} cleared", level),
        GameEvent::LevelAdvanced { level } => format!("level {} loaded", level),
        GameEvent::MissionWon { score } => format!("mission won, score {}", score),
        GameEvent::MissionFailed { score } => format!("mission failed, score {}", score),
        GameEvent::EnteredGravityField { well } => format!("entered gravity field of planet {}", well),
        // Contacts are too chatty for info
        GameEvent::Collision { .. }
        | GameEvent::SurfaceImpact { .. }
        | GameEvent::StructureTriggered { .. } => {
            log::debug!("{:?}", event);
            return None;
        }
    })
}

fn main() {
    env_logger::init();
    let args = parse_args();
    log::info!(
        "Newton Rescue (headless) seed {} on {}",
        args.seed,
        args.settings.difficulty.as_str()
    );

    let mut state = GameState::with_config(args.seed, args.settings, LevelSet::builtin());
    let mut frames = 0;
    while frames < MAX_FRAMES && !state.mission.is_over() {
        let input = autopilot(&state);
        tick(&mut state, &input, FRAME_DT);
        for text in state.events.iter().filter_map(describe) {
            log::info!("[{}] {}", state.hud().time_text, text);
        }
        frames += 1;
    }

    let hud = state.hud();
    let player = state.player();
    log::info!(
        "Finished after {:.1}s: {:?} on level {} with {} points, fuel {:.0}%, pod at ({:.0}, {:.0}) mass {:.1}",
        frames as f32 * FRAME_DT,
        hud.status,
        hud.level,
        hud.score,
        hud.fuel_percent,
        player.pos.x,
        player.pos.y,
        player.mass()
    );
    if player.vel.length() > 0.0 {
        let path = state.predicted_path();
        log::info!(
            "Predicted coast: {} points, ends {:?}",
            path.points.len(),
            path.end
        );
    }
}
