//! Player intents
//!
//! Every player action reaches the simulation as an [`Intent`]. Refused
//! intents leave the state untouched and are reported as
//! [`GameEvent::IntentRefused`].

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::ActionError;
use super::catalog::Rarity;
use super::state::{GameEvent, GameState, TowerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Paid summon, optionally on a given cell or forced to a rarity
    Summon {
        #[serde(default)]
        cell: Option<IVec2>,
        #[serde(default)]
        rarity: Option<Rarity>,
    },
    Gamble,
    AutoMerge,
    Select { tower: TowerId },
    Deselect,
    Sell { tower: TowerId },
    Exchange { tower: TowerId },
    /// Evolve the selected legendary into the mythic the board allows
    EvolveSelected,
    Evolve { target: String, ingredients: [TowerId; 3] },
    Upgrade { rarity: Rarity },
    SetSpeed { multiplier: f32 },
    SetPlaying { playing: bool },
    Restart,
    SummonChallengeBoss,
}

impl Intent {
    /// Intents that remain available after the run is lost
    fn allowed_after_game_over(&self) -> bool {
        matches!(self, Intent::Restart | Intent::Select { .. } | Intent::Deselect)
    }
}

/// Apply one intent. Refusals are logged and reported as events.
pub fn apply_intent(state: &mut GameState, intent: &Intent) -> Result<(), ActionError> {
    let result = dispatch(state, intent);
    if let Err(err) = &result {
        log::debug!("Refused {:?}: {}", intent, err);
        state.emit(GameEvent::IntentRefused(err.clone()));
    }
    result
}

fn dispatch(state: &mut GameState, intent: &Intent) -> Result<(), ActionError> {
    if state.game_over && !intent.allowed_after_game_over() {
        return Err(ActionError::GameOver);
    }

    match intent {
        Intent::Summon { cell, rarity } => state.summon(*cell, *rarity).map(|_| ()),
        Intent::Gamble => state.gamble().map(|_| ()),
        Intent::AutoMerge => {
            state.auto_merge();
            Ok(())
        }
        Intent::Select { tower } => state.select(*tower),
        Intent::Deselect => {
            state.deselect();
            Ok(())
        }
        Intent::Sell { tower } => state.sell(*tower).map(|_| ()),
        Intent::Exchange { tower } => state.exchange(*tower).map(|_| ()),
        Intent::EvolveSelected => {
            let option = state
                .selected
                .and_then(|id| state.evolution_option(id))
                .ok_or(ActionError::MissingIngredients)?;
            state.evolve(option.target.name, option.ingredients).map(|_| ())
        }
        Intent::Evolve { target, ingredients } => state.evolve(target, *ingredients).map(|_| ()),
        Intent::Upgrade { rarity } => state.upgrade(*rarity).map(|_| ()),
        Intent::SetSpeed { multiplier } => state.set_speed(*multiplier),
        Intent::SetPlaying { playing } => {
            state.playing = *playing;
            log::info!("Simulation {}", if *playing { "resumed" } else { "paused" });
            Ok(())
        }
        Intent::Restart => {
            state.restart();
            Ok(())
        }
        Intent::SummonChallengeBoss => state.summon_challenge_boss().map(|_| ()),
    }
}

impl GameState {
    pub fn set_speed(&mut self, multiplier: f32) -> Result<(), ActionError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ActionError::InvalidSpeed);
        }
        self.speed = multiplier;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_json() {
        let intent: Intent = serde_json::from_str(r#"{"type":"summon"}"#).unwrap();
        assert_eq!(intent, Intent::Summon { cell: None, rarity: None });

        let intent: Intent = serde_json::from_str(r#"{"type":"upgrade","rarity":"Epic"}"#).unwrap();
        assert_eq!(intent, Intent::Upgrade { rarity: Rarity::Epic });

        let intent: Intent = serde_json::from_str(r#"{"type":"sell","tower":12}"#).unwrap();
        assert_eq!(intent, Intent::Sell { tower: TowerId(12) });
    }

    #[test]
    fn test_refusal_emits_event_without_mutation() {
        let mut state = GameState::new(1);
        state.gold = 0;
        state.drain_events();
        let result = apply_intent(&mut state, &Intent::Summon { cell: None, rarity: None });
        assert!(result.is_err());
        assert!(state.towers().is_empty());
        let events = state.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::IntentRefused(ActionError::InsufficientGold { .. })));
    }

    #[test]
    fn test_stale_ids_are_refused() {
        let mut state = GameState::new(1);
        let ghost = TowerId(999);
        assert_eq!(
            apply_intent(&mut state, &Intent::Sell { tower: ghost }),
            Err(ActionError::UnitNotFound(ghost))
        );
        assert_eq!(state.gold, crate::consts::STARTING_GOLD);
    }

    #[test]
    fn test_speed_validation() {
        let mut state = GameState::new(1);
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert_eq!(
                apply_intent(&mut state, &Intent::SetSpeed { multiplier: bad }),
                Err(ActionError::InvalidSpeed)
            );
        }
        assert_eq!(state.speed, 1.0);
        apply_intent(&mut state, &Intent::SetSpeed { multiplier: 4.0 }).unwrap();
        assert_eq!(state.speed, 4.0);
    }

    #[test]
    fn test_game_over_blocks_economy() {
        let mut state = GameState::new(1);
        state.game_over = true;
        assert_eq!(apply_intent(&mut state, &Intent::Gamble), Err(ActionError::GameOver));
        apply_intent(&mut state, &Intent::Restart).unwrap();
        assert!(!state.game_over);
        assert!(apply_intent(&mut state, &Intent::Gamble).is_ok());
    }
}
