//! Slot Defense - a tick-driven tower-defense simulation
//!
//! Core modules:
//! - `sim`: Deterministic Slot Defense simulation (waves, combat, economy)
//! - `game_loop`: Fixed timestep driver with speed multiplier and real-time clock
//! - `hud`: Presentation adapter that folds simulation events into a HUD model
//! - `dungeon`: Escape Dungeon, a smaller top-down arena loop
//! - `settings`: Data-driven configuration

pub mod dungeon;
pub mod game_loop;
pub mod hud;
pub mod settings;
pub mod sim;

pub use game_loop::GameLoop;
pub use hud::Hud;
pub use settings::{Settings, SpeedPreset};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Board dimensions in tiles
    pub const GRID_WIDTH: i32 = 10;
    pub const GRID_HEIGHT: i32 = 6;
    /// Side length of one tile in world pixels
    pub const TILE_SIZE: f32 = 60.0;

    /// Attack speeds are authored in ticks of this rate
    pub const BASE_FPS: f32 = 30.0;
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Upper bound on game steps one tick splits a sped-up dt into
    pub const MAX_SPEED_STEPS: u32 = 64;

    /// Live enemy count above which the run is lost
    pub const MAX_ENEMIES: usize = 100;

    /// Wave timing
    pub const WAVE_DURATION_MS: f32 = 40_000.0;
    /// No spawns once less than this much wave time remains
    pub const SPAWN_CUTOFF_MS: f32 = 5_000.0;
    /// Spawns must fit into this share of the wave window
    pub const SPAWN_WINDOW_SHARE: f32 = 0.9;
    pub const IDEAL_SPAWN_INTERVAL_MS: f32 = 500.0;
    pub const WAVE_BASE_ENEMIES: u32 = 40;
    pub const WAVE_ENEMIES_PER_WAVE: u32 = 8;

    /// Enemy scaling
    pub const ENEMY_BASE_HP: f64 = 100.0;
    pub const ENEMY_HP_GROWTH: f64 = 1.2;
    pub const ENEMY_BASE_SPEED: f32 = 0.0006;
    pub const ENEMY_SPEED_PER_WAVE: f32 = 0.00001;
    pub const ENEMY_SPEED_WAVE_CAP: u32 = 50;

    /// Bosses
    pub const BOSS_WAVE_INTERVAL: u32 = 5;
    pub const BOSS_SPAWN_INTERVAL: u32 = 10;
    pub const BOSS_HP_MULTIPLIER: f64 = 15.0;
    pub const BOSS_SPEED_MULTIPLIER: f32 = 0.6;
    pub const BOSS_REWARD_MULTIPLIER: u64 = 10;

    /// Challenge boss (player summoned)
    pub const CHALLENGE_BOSS_BASE_HP: i64 = 3000;
    pub const CHALLENGE_BOSS_SPEED: f32 = 0.0004;
    pub const CHALLENGE_BOSS_COOLDOWN_MS: u64 = 60_000;

    /// Combat
    pub const PROJECTILE_SPEED: f32 = 0.8; // px per ms
    pub const STATUS_DURATION_MS: f32 = 100.0;
    pub const CRIT_CHANCE: f64 = 0.2;
    /// Damage bonus per upgrade level. Crits add half again.
    pub const UPGRADE_STEP: f64 = 0.2;
    pub const DEFAULT_SPLASH_RADIUS: f32 = 1.5; // tiles

    /// Economy
    pub const STARTING_GOLD: u64 = 300;
    pub const RESTART_GOLD: u64 = 250;
    pub const STARTING_TICKETS: u32 = 3;
    pub const SUMMON_COST: u64 = 50;
    pub const SUMMON_COST_INCREASE: u64 = 10;
    pub const GAMBLE_TICKET_COST: u32 = 1;
    pub const GAMBLE_SUCCESS_CHANCE: f64 = 0.5;
    pub const TICKET_DROP_RATE: f64 = 0.0005;
    pub const KILL_REWARD_BASE: u64 = 10;
}

/// World-space center of a grid cell
#[inline]
pub fn cell_center(x: i32, y: i32) -> Vec2 {
    use consts::TILE_SIZE;
    Vec2::new(
        x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// Convert a distance in tiles to world pixels
#[inline]
pub fn tiles_to_px(tiles: f32) -> f32 {
    tiles * consts::TILE_SIZE
}

/// Whether a cell lies on the board
#[inline]
pub fn in_bounds(x: i32, y: i32) -> bool {
    (0..consts::GRID_WIDTH).contains(&x) && (0..consts::GRID_HEIGHT).contains(&y)
}
