//! Frame driver
//!
//! Converts variable real frame times into fixed simulation steps and keeps
//! the wall clock used by real-time cooldowns.

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, Intent, TickInput, apply_intent, tick};

/// Longest frame fed to the accumulator (ms)
const MAX_FRAME_MS: f32 = 100.0;

/// Runs the simulation at a fixed timestep
pub struct GameLoop {
    pub state: GameState,
    accumulator: f32,
    max_substeps: u32,
    pending: Vec<Intent>,
}

impl GameLoop {
    pub fn new(settings: &Settings) -> Self {
        let mut state = GameState::new(settings.seed);
        state.gold = settings.starting_gold;
        state.tickets = settings.starting_tickets;
        state.speed = settings.speed.multiplier();
        state.playing = settings.auto_start;
        log::info!(
            "New run: seed {:#x}, speed {}, {} gold",
            settings.seed,
            settings.speed.as_str(),
            state.gold
        );
        Self {
            state,
            accumulator: 0.0,
            max_substeps: settings.max_substeps.max(1),
            pending: Vec::new(),
        }
    }

    /// Queue an intent for the next simulation step
    pub fn push_intent(&mut self, intent: Intent) {
        self.pending.push(intent);
    }

    /// Advance by one rendered frame of `real_dt_ms` and return the events
    /// it produced. The wall clock advances even while paused.
    pub fn frame(&mut self, real_dt_ms: f32) -> Vec<GameEvent> {
        self.state.advance_clock(real_dt_ms as f64);

        // Intents apply even while the simulation is halted
        for intent in std::mem::take(&mut self.pending) {
            let _ = apply_intent(&mut self.state, &intent);
        }

        self.accumulator += real_dt_ms.min(MAX_FRAME_MS);
        let input = TickInput::default();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < self.max_substeps {
            tick(&mut self.state, &input, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(SIM_DT_MS);
        }

        self.state.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_runs_fixed_steps() {
        let mut game = GameLoop::new(&Settings::default());
        game.frame(SIM_DT_MS * 3.0 + 1.0);
        assert_eq!(game.state.time_ticks, 3);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut game = GameLoop::new(&Settings::default());
        game.frame(10_000.0);
        assert!(game.state.time_ticks <= MAX_SUBSTEPS as u64);
        assert_eq!(game.state.clock_ms, 10_000.0);
    }

    #[test]
    fn test_intents_apply_while_paused() {
        let settings = Settings {
            auto_start: false,
            ..Default::default()
        };
        let mut game = GameLoop::new(&settings);
        game.push_intent(Intent::Summon { cell: None, rarity: None });
        game.frame(1.0);
        assert_eq!(game.state.towers().len(), 1);
        assert_eq!(game.state.time_ticks, 0);
    }

    #[test]
    fn test_clock_runs_while_paused() {
        let settings = Settings {
            auto_start: false,
            ..Default::default()
        };
        let mut game = GameLoop::new(&settings);
        game.push_intent(Intent::SummonChallengeBoss);
        game.frame(16.0);
        assert_eq!(game.state.enemies().len(), 1);

        for _ in 0..600 {
            game.frame(100.0);
        }
        game.push_intent(Intent::SummonChallengeBoss);
        let events = game.frame(16.0);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::IntentRefused(_))));
        assert_eq!(game.state.enemies().len(), 2);
    }
}
