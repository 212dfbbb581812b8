//! Arena state for a single dungeon room

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::consts::*;
use super::{Boon, BoonMechanic, boon_count, room_quota};

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Last movement direction, always unit length
    pub facing: Vec2,
    /// Frames of dash left
    pub dash_frames: u32,
    pub dash_cooldown: u32,
    pub attack_cooldown: u32,
}

impl Player {
    /// Dashing players take no contact damage
    pub fn is_dashing(&self) -> bool {
        self.dash_frames > 0
    }
}

/// A chasing enemy
#[derive(Debug, Clone, Serialize)]
pub struct Foe {
    pub id: u32,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
    pub is_boss: bool,
}

/// Player projectile
#[derive(Debug, Clone, Serialize)]
pub struct Bolt {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub homing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DungeonEvent {
    /// Every enemy of the room is spawned and defeated
    RoomCleared { hp: f32 },
    PlayerDied,
    BossSpawned,
}

/// One room of the dungeon
#[derive(Debug, Clone)]
pub struct DungeonState {
    pub(crate) rng: Pcg32,
    pub depth: u32,
    pub frame: u64,
    pub player: Player,
    pub enemies: Vec<Foe>,
    pub bolts: Vec<Bolt>,
    /// Orbital positions, recomputed every frame
    pub orbitals: Vec<Vec2>,
    pub orbital_angle: f32,
    pub boons: Vec<Boon>,
    /// Top-left corner of the view, following the player
    pub camera: Vec2,
    pub spawn_timer: u32,
    pub spawned: u32,
    pub quota: u32,
    pub kills: u32,
    pub(crate) cleared: bool,
    pub(crate) dead: bool,
    pub(crate) events: Vec<DungeonEvent>,
    next_id: u32,
}

impl DungeonState {
    pub fn new(seed: u64, depth: u32, hp: f32, boons: Vec<Boon>) -> Self {
        let orbitals = vec![Vec2::ZERO; boon_count(&boons, BoonMechanic::Orbital) * ORBITALS_PER_BOON];
        Self {
            rng: Pcg32::seed_from_u64(seed),
            depth,
            frame: 0,
            player: Player {
                pos: Vec2::splat(WORLD_SIZE / 2.0),
                hp,
                max_hp: PLAYER_MAX_HP,
                facing: Vec2::Y,
                dash_frames: 0,
                dash_cooldown: 0,
                attack_cooldown: 0,
            },
            enemies: Vec::new(),
            bolts: Vec::new(),
            orbitals,
            orbital_angle: 0.0,
            boons,
            camera: Vec2::ZERO,
            spawn_timer: 0,
            spawned: 0,
            quota: room_quota(depth),
            kills: 0,
            cleared: false,
            dead: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn drain_events(&mut self) -> Vec<DungeonEvent> {
        std::mem::take(&mut self.events)
    }

    /// Enemies still to spawn plus those alive
    pub fn enemies_left(&self) -> u32 {
        self.quota.saturating_sub(self.spawned) + self.enemies.len() as u32
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn boon_count(&self, mechanic: BoonMechanic) -> usize {
        boon_count(&self.boons, mechanic)
    }
}
