//! Escape Dungeon
//!
//! A frame-stepped top-down arena: the player auto-fires at nearby enemies
//! while boons from the gods add multishot, rapid fire, homing, orbitals,
//! lightning and healing. Rooms grow by half each time one is cleared.

pub mod state;
pub mod tick;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub use state::{Bolt, DungeonEvent, DungeonState, Foe, Player};
pub use tick::{DungeonInput, tick};

/// Arena tuning, in pixels and frames
pub mod consts {
    pub const WORLD_SIZE: f32 = 2000.0;
    /// Viewport assumed when the caller does not supply one
    pub const DEFAULT_VIEWPORT: (f32, f32) = (800.0, 600.0);

    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_MAX_HP: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 4.0;
    pub const DASH_SPEED: f32 = 12.0;
    pub const DASH_FRAMES: u32 = 15;
    pub const DASH_COOLDOWN_FRAMES: u32 = 45;

    pub const ATTACK_RANGE: f32 = 400.0;
    pub const ATTACK_COOLDOWN_FRAMES: u32 = 30;
    pub const BOLT_SPEED: f32 = 10.0;
    pub const BOLT_SIZE: f32 = 12.0;
    pub const BOLT_DAMAGE: f32 = 25.0;
    pub const MULTISHOT_EXTRA: u32 = 3;
    pub const MULTISHOT_SPREAD_DEG: f32 = 15.0;
    pub const HOMING_STEER: f32 = 0.15;

    pub const ORBITALS_PER_BOON: usize = 2;
    pub const ORBITAL_RADIUS: f32 = 70.0;
    pub const ORBITAL_SPIN: f32 = 0.05;
    pub const ORBITAL_SIZE: f32 = 10.0;
    pub const ORBITAL_DAMAGE: f32 = 2.0;

    pub const LIGHTNING_INTERVAL_FRAMES: u64 = 120;
    pub const LIGHTNING_DAMAGE: f32 = 50.0;
    pub const HEAL_AMOUNT: f32 = 20.0;

    pub const BASE_ENEMIES_PER_ROOM: f64 = 10.0;
    pub const ROOM_GROWTH: f64 = 1.5;
    pub const SPAWN_INTERVAL_FRAMES: u32 = 30;
    pub const MAX_LIVE_ENEMIES: usize = 50;
    /// Spawns land this far past the viewport edge, plus up to the jitter
    pub const SPAWN_DISTANCE: f32 = 100.0;
    pub const SPAWN_JITTER: f32 = 200.0;
    pub const SPAWN_MARGIN: f32 = 30.0;
    pub const ENEMY_SPEED: f32 = 2.5;
    pub const ENEMY_HP: f32 = 50.0;
    pub const ENEMY_SIZE: f32 = 32.0;
    pub const BOSS_HP: f32 = 250.0;
    pub const BOSS_SIZE: f32 = 64.0;
    pub const SEPARATION_PUSH: f32 = 0.5;
    pub const CONTACT_DAMAGE: f32 = 0.5;
}

/// Enemies a room at `depth` holds
pub fn room_quota(depth: u32) -> u32 {
    (consts::BASE_ENEMIES_PER_ROOM * consts::ROOM_GROWTH.powi(depth as i32)).floor() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum God {
    Zeus,
    Poseidon,
    Athena,
    Ares,
    Artemis,
}

impl God {
    pub const ALL: [God; 5] = [God::Zeus, God::Poseidon, God::Athena, God::Ares, God::Artemis];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoonMechanic {
    Multishot,
    Rapid,
    Homing,
    Orbital,
    Lightning,
    Heal,
}

impl BoonMechanic {
    pub const ALL: [BoonMechanic; 6] = [
        BoonMechanic::Multishot,
        BoonMechanic::Rapid,
        BoonMechanic::Homing,
        BoonMechanic::Orbital,
        BoonMechanic::Lightning,
        BoonMechanic::Heal,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boon {
    pub god: God,
    pub mechanic: BoonMechanic,
}

/// Count of boons with the given mechanic
pub fn boon_count(boons: &[Boon], mechanic: BoonMechanic) -> usize {
    boons.iter().filter(|b| b.mechanic == mechanic).count()
}

/// A god offers three distinct mechanics after each cleared room
pub fn offer_boons<R: Rng + ?Sized>(rng: &mut R) -> (God, [BoonMechanic; 3]) {
    let god = God::ALL[rng.random_range(0..God::ALL.len())];
    let mut pool = BoonMechanic::ALL;
    pool.shuffle(rng);
    (god, [pool[0], pool[1], pool[2]])
}

/// Progress across rooms: depth, carried hp and collected boons
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub depth: u32,
    pub hp: f32,
    pub boons: Vec<Boon>,
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}

impl Run {
    pub fn new() -> Self {
        Self {
            depth: 0,
            hp: consts::PLAYER_MAX_HP,
            boons: Vec::new(),
        }
    }

    pub fn enter_room(&self, seed: u64) -> DungeonState {
        log::info!("Entering room at depth {} ({} enemies)", self.depth, room_quota(self.depth));
        DungeonState::new(seed, self.depth, self.hp, self.boons.clone())
    }

    /// Bank the surviving hp, take the chosen boon and go one level deeper
    pub fn complete_room(&mut self, hp: f32, boon: Boon) {
        self.hp = hp;
        if boon.mechanic == BoonMechanic::Heal {
            self.hp = (self.hp + consts::HEAL_AMOUNT).min(consts::PLAYER_MAX_HP);
        }
        self.boons.push(boon);
        self.depth += 1;
    }
}
