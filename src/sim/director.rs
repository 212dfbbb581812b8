//! Wave director: timed waves, spawn scheduling and the wave-complete latch

use serde::Serialize;

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Number of enemies a wave tries to spawn
pub fn wave_quota(wave: u32) -> u32 {
    WAVE_BASE_ENEMIES + wave * WAVE_ENEMIES_PER_WAVE
}

/// Milliseconds between spawns: the ideal cadence, tightened so the whole
/// quota fits into the spawn window
pub fn spawn_interval(wave: u32) -> f32 {
    let window = WAVE_DURATION_MS * SPAWN_WINDOW_SHARE;
    IDEAL_SPAWN_INTERVAL_MS.min(window / wave_quota(wave) as f32)
}

/// The `nth` spawn of a wave (0-based) is a boss on every fifth wave: the
/// 10th, 20th, ... enemy of the wave
pub fn is_boss_spawn(wave: u32, nth: u32) -> bool {
    wave % BOSS_WAVE_INTERVAL == 0 && (nth + 1) % BOSS_SPAWN_INTERVAL == 0
}

pub fn enemy_hp(wave: u32, boss: bool) -> i64 {
    let mult = if boss { BOSS_HP_MULTIPLIER } else { 1.0 };
    (ENEMY_BASE_HP * ENEMY_HP_GROWTH.powi(wave as i32) * mult).floor() as i64
}

pub fn enemy_speed(wave: u32, boss: bool) -> f32 {
    let speed = ENEMY_BASE_SPEED + wave.min(ENEMY_SPEED_WAVE_CAP) as f32 * ENEMY_SPEED_PER_WAVE;
    if boss { speed * BOSS_SPEED_MULTIPLIER } else { speed }
}

/// A spawn that came due during `advance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrder {
    pub boss: bool,
    /// Milliseconds between the scheduled spawn moment and the end of the
    /// tick. The enemy walks this long before the tick ends.
    pub late_ms: f32,
}

/// Per-wave scheduling state
#[derive(Debug, Clone, Serialize)]
pub struct WaveDirector {
    /// Current wave, starting at 1
    pub wave: u32,
    /// Time elapsed in the current wave (ms)
    pub elapsed_ms: f32,
    /// Spawn accumulator. A spawn is due whenever it reaches the interval.
    spawn_timer_ms: f32,
    pub spawned: u32,
    /// Set once the current wave has been reported complete
    completed: bool,
    /// Last whole second reported through `TimerUpdate`
    reported_second: Option<u32>,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        let mut director = Self {
            wave: 1,
            elapsed_ms: 0.0,
            spawn_timer_ms: 0.0,
            spawned: 0,
            completed: false,
            reported_second: None,
        };
        director.begin_wave(1, 0.0);
        director
    }

    /// Reset timers for `wave`. `carry_ms` of the new wave has already
    /// elapsed. The first spawn is due immediately.
    pub fn begin_wave(&mut self, wave: u32, carry_ms: f32) {
        self.wave = wave;
        self.elapsed_ms = carry_ms;
        self.spawn_timer_ms = spawn_interval(wave) + carry_ms;
        self.spawned = 0;
        self.completed = false;
    }

    pub fn remaining_ms(&self) -> f32 {
        (WAVE_DURATION_MS - self.elapsed_ms).max(0.0)
    }

    fn window_open_at(&self, elapsed_ms: f32) -> bool {
        WAVE_DURATION_MS - elapsed_ms > SPAWN_CUTOFF_MS
    }

    /// Enemies still to come this wave. Zero once the quota is met or the
    /// spawn window has closed.
    pub fn remaining_spawns(&self) -> u32 {
        if self.window_open_at(self.elapsed_ms) {
            wave_quota(self.wave).saturating_sub(self.spawned)
        } else {
            0
        }
    }

    pub fn expired(&self) -> bool {
        self.elapsed_ms >= WAVE_DURATION_MS
    }

    /// Advance the wave clock by `dt` and collect the spawns that came due.
    /// Several spawns can fall into one long tick; each keeps its own
    /// lateness so large timesteps place enemies where small ones would.
    pub fn advance(&mut self, dt: f32, orders: &mut Vec<SpawnOrder>) {
        self.elapsed_ms += dt;
        self.spawn_timer_ms += dt;
        self.collect_due(orders);
    }

    fn collect_due(&mut self, orders: &mut Vec<SpawnOrder>) {
        let interval = spawn_interval(self.wave);
        let quota = wave_quota(self.wave);
        while self.spawn_timer_ms >= interval && self.spawned < quota {
            let late_ms = self.spawn_timer_ms - interval;
            if !self.window_open_at(self.elapsed_ms - late_ms) {
                break;
            }
            self.spawn_timer_ms -= interval;
            orders.push(SpawnOrder {
                boss: is_boss_spawn(self.wave, self.spawned),
                late_ms,
            });
            self.spawned += 1;
        }
    }

    /// Report wave completion at most once per wave: on timer expiry, or
    /// when nothing is left to spawn and the field is clear.
    pub fn check_complete(&mut self, live_enemies: usize) -> bool {
        if self.completed {
            return false;
        }
        if self.expired() || (self.remaining_spawns() == 0 && live_enemies == 0) {
            self.completed = true;
            return true;
        }
        false
    }

    /// Start the following wave, carrying over time past the deadline.
    /// Spawns due within the carried time are collected into `orders`.
    pub fn next_wave(&mut self, orders: &mut Vec<SpawnOrder>) -> u32 {
        let carry = (self.elapsed_ms - WAVE_DURATION_MS).max(0.0);
        self.begin_wave(self.wave + 1, carry);
        self.collect_due(orders);
        self.wave
    }

    /// Whole-second countdown value if it changed since the last report
    fn take_second_change(&mut self) -> Option<u32> {
        let second = (self.remaining_ms() / 1000.0).ceil() as u32;
        if self.reported_second == Some(second) {
            return None;
        }
        self.reported_second = Some(second);
        Some(second)
    }
}

fn spawn_ordered(state: &mut GameState, order: SpawnOrder) {
    let wave = state.director.wave;
    let id = state.spawn_enemy(
        enemy_hp(wave, order.boss),
        enemy_speed(wave, order.boss),
        order.boss,
        false,
    );
    if order.late_ms > 0.0 {
        if let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == id) {
            super::movement::advance_enemy(enemy, &state.path, order.late_ms);
        }
    }
}

/// Advance the wave clock and spawn whatever came due
pub fn run(state: &mut GameState, dt: f32) {
    let mut orders = Vec::new();
    state.director.advance(dt, &mut orders);
    for order in orders {
        if state.game_over {
            break;
        }
        spawn_ordered(state, order);
    }
}

/// Advance to the next wave if the current one is complete, then report
/// the countdown
pub fn finish_wave(state: &mut GameState) {
    let live = state.enemies.len();
    if state.director.check_complete(live) {
        let completed = state.director.wave;
        let mut orders = Vec::new();
        let next = state.director.next_wave(&mut orders);
        log::info!("Wave {} complete, starting wave {} ({} enemies)", completed, next, wave_quota(next));
        state.emit(GameEvent::WaveComplete { completed, next });
        for order in orders {
            if state.game_over {
                break;
            }
            spawn_ordered(state, order);
        }
    }
    if let Some(second) = state.director.take_second_change() {
        log::trace!("Wave timer: {}s", second);
        state.emit(GameEvent::TimerUpdate { remaining_ms: state.director.remaining_ms() });
    }
}
