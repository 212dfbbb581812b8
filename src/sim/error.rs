//! Refusal reasons for player actions
//!
//! None of these are faults: they describe why an intent left the game
//! untouched.

use serde::Serialize;
use thiserror::Error;

use super::state::TowerId;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ActionError {
    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u64, available: u64 },
    #[error("not enough tickets: need {needed}, have {available}")]
    InsufficientTickets { needed: u32, available: u32 },
    #[error("no empty cell left on the board")]
    NoEmptyCell,
    #[error("cell is already occupied")]
    CellOccupied,
    #[error("cell is part of the enemy path")]
    PathCell,
    #[error("cell is outside the board")]
    OutOfBounds,
    #[error("unit {0:?} no longer exists")]
    UnitNotFound(TowerId),
    #[error("legendary and mythic units cannot be merged")]
    NotMergeable,
    #[error("no matching unit to merge with")]
    NoMergePartner,
    #[error("not a craftable mythic recipe")]
    InvalidRecipe,
    #[error("evolution ingredients do not match the recipe")]
    MissingIngredients,
    #[error("challenge boss on cooldown for {remaining_ms} ms")]
    CooldownActive { remaining_ms: u64 },
    #[error("speed multiplier must be a positive finite number")]
    InvalidSpeed,
    #[error("the run is over")]
    GameOver,
}
