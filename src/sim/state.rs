//! Game state and core simulation types
//!
//! The simulation owns every registry. Presentation code only sees ids and
//! the views built in `snapshot`.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{AttackType, Rarity, StatusEffect, UnitConfig};
use super::director::WaveDirector;
use super::path::Path;
use super::snapshot::TowerView;
use crate::cell_center;
use crate::consts::*;

/// Enemy handle. Stays valid as a lookup key after the enemy is reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Placed unit handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TowerId(pub u32);

/// In-flight projectile handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// An enemy walking the path
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    /// Index of the path segment being walked
    pub segment: usize,
    /// Fraction of the current segment covered, always in [0, 1)
    pub progress: f32,
    /// Cached world position, refreshed whenever progress changes
    pub pos: Vec2,
    pub hp: i64,
    pub max_hp: i64,
    /// Segments per millisecond
    pub speed: f32,
    /// Remaining slow time (ms). Slowed enemies do not advance.
    pub slow_ms: f32,
    /// Remaining stun time (ms)
    pub stun_ms: f32,
    pub is_boss: bool,
    /// Player-summoned boss: always drops a ticket and levels up on death
    pub is_challenge: bool,
}

impl Enemy {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Targeting priority: distance walked, with bosses always ahead
    pub fn priority(&self) -> f32 {
        let boss_bonus = if self.is_boss { 1000.0 } else { 0.0 };
        boss_bonus + self.segment as f32 + self.progress
    }

    pub fn apply_status(&mut self, effect: StatusEffect) {
        match effect {
            StatusEffect::Slow => self.slow_ms = STATUS_DURATION_MS,
            StatusEffect::Stun => self.stun_ms = STATUS_DURATION_MS,
        }
    }
}

/// A placed unit
#[derive(Debug, Clone)]
pub struct Tower {
    pub id: TowerId,
    pub cell: IVec2,
    pub config: &'static UnitConfig,
    /// Milliseconds until the next attack is allowed
    pub cooldown_ms: f32,
}

impl Tower {
    #[inline]
    pub fn pos(&self) -> Vec2 {
        cell_center(self.cell.x, self.cell.y)
    }

    /// Same unit template, eligible for a pairwise merge
    pub fn same_unit(&self, other: &Tower) -> bool {
        self.config.name == other.config.name && self.config.rarity == other.config.rarity
    }
}

/// Damage captured when a tower fires. The upgrade level is frozen at fire
/// time, the crit roll happens on impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamagePayload {
    pub base: u32,
    pub level: u32,
}

impl DamagePayload {
    /// `floor(base * (1 + 0.2 * level) * (crit ? 1.5 : 1))`, computed in
    /// integers so the floor is exact.
    pub fn resolve(&self, crit: bool) -> i64 {
        let scaled = self.base as i64 * (5 + self.level as i64);
        if crit { scaled * 3 / 10 } else { scaled / 5 }
    }
}

/// A projectile homing on its target
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub target: EnemyId,
    pub pos: Vec2,
    /// Pixels per millisecond
    pub speed: f32,
    pub payload: DamagePayload,
    pub attack_type: AttackType,
    pub splash_radius: Option<f32>,
    pub effect: Option<StatusEffect>,
}

/// Outbound notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    GoldChanged(u64),
    TicketsChanged(u32),
    /// A wave ended (cleared or timed out) and `next` began
    WaveComplete { completed: u32, next: u32 },
    /// Emitted once per whole-second change of the wave timer
    TimerUpdate { remaining_ms: f32 },
    EnemyCountChanged(usize),
    GameOver,
    StatsUpdate(Vec<TowerView>),
    TowerSelected(TowerView),
    TowerDeselected,
    UnitPlaced(TowerView),
    GambleResult { cell: IVec2, success: bool },
    EnemyDefeated { id: EnemyId, gold: u64, ticket: bool },
    BossSpawned { id: EnemyId, challenge: bool },
    ChallengeBossLevel(i64),
    Evolved { into: &'static str, cell: IVec2 },
    IntentRefused(super::ActionError),
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub path: Path,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) towers: Vec<Tower>,
    pub(crate) projectiles: Vec<Projectile>,
    pub gold: u64,
    pub tickets: u32,
    /// Price of the next paid summon
    pub summon_cost: u64,
    /// Damage upgrade level per rarity, indexed by `Rarity::index`
    pub upgrade_levels: [u32; 5],
    pub director: WaveDirector,
    pub playing: bool,
    pub game_over: bool,
    /// Multiplier applied to every tick's elapsed time
    pub speed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Wall-clock milliseconds; advances while paused and ignores `speed`
    pub clock_ms: f64,
    /// Challenge boss HP multiplier, doubles per defeat
    pub challenge_level: i64,
    /// Wall-clock time at which the challenge boss may be summoned again
    pub challenge_ready_at_ms: f64,
    pub selected: Option<TowerId>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) reported_enemy_count: usize,
    next_id: u32,
}

impl GameState {
    /// Create a new run with the given seed. The simulation starts paused.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            path: Path::default(),
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            gold: STARTING_GOLD,
            tickets: STARTING_TICKETS,
            summon_cost: SUMMON_COST,
            upgrade_levels: [0; 5],
            director: WaveDirector::new(),
            playing: false,
            game_over: false,
            speed: 1.0,
            time_ticks: 0,
            clock_ms: 0.0,
            challenge_level: 1,
            challenge_ready_at_ms: 0.0,
            selected: None,
            events: Vec::new(),
            reported_enemy_count: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|t| t.id == id)
    }

    pub fn tower_at(&self, cell: IVec2) -> Option<&Tower> {
        self.towers.iter().find(|t| t.cell == cell)
    }

    pub fn wave(&self) -> u32 {
        self.director.wave
    }

    pub fn upgrade_level(&self, rarity: Rarity) -> u32 {
        self.upgrade_levels[rarity.index()]
    }

    /// Advance the wall clock used by real-time cooldowns
    pub fn advance_clock(&mut self, real_ms: f64) {
        self.clock_ms += real_ms;
    }

    pub(crate) fn add_gold(&mut self, amount: u64) {
        self.gold += amount;
        self.emit(GameEvent::GoldChanged(self.gold));
    }

    pub(crate) fn spend_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_sub(amount);
        self.emit(GameEvent::GoldChanged(self.gold));
    }

    pub(crate) fn add_tickets(&mut self, amount: u32) {
        self.tickets += amount;
        self.emit(GameEvent::TicketsChanged(self.tickets));
    }

    pub(crate) fn spend_tickets(&mut self, amount: u32) {
        self.tickets = self.tickets.saturating_sub(amount);
        self.emit(GameEvent::TicketsChanged(self.tickets));
    }

    /// Push an enemy onto the path entry and enforce the population ceiling
    pub(crate) fn spawn_enemy(&mut self, hp: i64, speed: f32, is_boss: bool, is_challenge: bool) -> EnemyId {
        let id = EnemyId(self.next_entity_id());
        let pos = self.path.start();
        self.enemies.push(Enemy {
            id,
            segment: 0,
            progress: 0.0,
            pos,
            hp,
            max_hp: hp,
            speed,
            slow_ms: 0.0,
            stun_ms: 0.0,
            is_boss,
            is_challenge,
        });
        if is_boss {
            self.emit(GameEvent::BossSpawned { id, challenge: is_challenge });
        }
        self.report_enemy_count();
        self.check_population();
        id
    }

    /// Lose the run once live enemies exceed the ceiling
    pub(crate) fn check_population(&mut self) {
        if !self.game_over && self.enemies.len() > MAX_ENEMIES {
            log::info!(
                "Population ceiling breached at wave {} ({} enemies)",
                self.wave(),
                self.enemies.len()
            );
            self.game_over = true;
            self.playing = false;
            self.emit(GameEvent::GameOver);
        }
    }

    pub(crate) fn report_enemy_count(&mut self) {
        let count = self.enemies.len();
        if count != self.reported_enemy_count {
            self.reported_enemy_count = count;
            self.emit(GameEvent::EnemyCountChanged(count));
        }
    }

    pub(crate) fn emit_stats(&mut self) {
        let towers = self.towers.iter().map(|t| self.tower_view(t)).collect();
        self.emit(GameEvent::StatsUpdate(towers));
    }

    /// Full teardown followed by a fresh run at wave 1
    pub fn restart(&mut self) {
        log::info!("Restarting run (was wave {})", self.wave());
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.gold = RESTART_GOLD;
        self.tickets = STARTING_TICKETS;
        self.summon_cost = SUMMON_COST;
        self.upgrade_levels = [0; 5];
        self.director = WaveDirector::new();
        self.game_over = false;
        self.playing = true;
        self.speed = 1.0;
        self.challenge_level = 1;
        self.challenge_ready_at_ms = 0.0;
        if self.selected.take().is_some() {
            self.emit(GameEvent::TowerDeselected);
        }
        self.emit(GameEvent::GoldChanged(self.gold));
        self.emit(GameEvent::TicketsChanged(self.tickets));
        self.emit(GameEvent::ChallengeBossLevel(self.challenge_level));
        self.report_enemy_count();
        self.emit_stats();
    }

    /// Ensure registries are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.towers.sort_by_key(|t| t.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
