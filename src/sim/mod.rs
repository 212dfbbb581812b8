//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod catalog;
pub mod combat;
pub mod director;
pub mod economy;
pub mod error;
pub mod intent;
pub mod movement;
pub mod path;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use catalog::{AttackType, Rarity, RarityWeights, StatusEffect, UnitConfig};
pub use director::WaveDirector;
pub use economy::{EvolutionOption, GambleOutcome};
pub use error::ActionError;
pub use intent::{Intent, apply_intent};
pub use path::Path;
pub use snapshot::{EnemyView, ProjectileView, Snapshot, TowerView};
pub use state::{Enemy, EnemyId, GameEvent, GameState, Projectile, ProjectileId, Tower, TowerId};
pub use tick::{TickInput, tick};
