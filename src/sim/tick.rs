//! Fixed timestep simulation tick
//!
//! Advances the board deterministically: intents first, then movement,
//! spawning, towers, projectiles, rewards and wave bookkeeping.

use super::intent::{Intent, apply_intent};
use crate::consts::MAX_SPEED_STEPS;
use super::state::GameState;
use super::{combat, director, movement};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player actions, applied in order before the simulation step
    pub intents: Vec<Intent>,
}

/// Advance the game state by `dt` milliseconds of unscaled time. The speed
/// multiplier is applied here: the scaled time runs as `ceil(speed)` equal
/// steps, so a tick at 4x replays four ticks at 1x.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    for intent in &input.intents {
        // Refusals are reported through events
        let _ = apply_intent(state, intent);
    }

    // Don't tick if paused or game over
    if !state.playing || state.game_over {
        return;
    }

    state.time_ticks += 1;

    let steps = (state.speed.ceil() as u32).clamp(1, MAX_SPEED_STEPS);
    let step_dt = dt * state.speed / steps as f32;
    for _ in 0..steps {
        step(state, step_dt);
        if state.game_over {
            break;
        }
    }
}

/// One pass of the pipeline over `dt` milliseconds of game time
fn step(state: &mut GameState, dt: f32) {
    movement::run(state, dt);
    director::run(state, dt);
    if state.game_over {
        return;
    }

    combat::run_towers(state, dt);
    combat::run_projectiles(state, dt);
    combat::reap_defeated(state);

    director::finish_wave(state);
    state.check_population();
}
