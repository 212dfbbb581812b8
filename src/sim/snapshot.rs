//! Read-only views of the simulation for presentation

use glam::{IVec2, Vec2};
use serde::Serialize;

use super::catalog::{AttackType, Rarity, StatusEffect};
use super::state::{EnemyId, GameState, ProjectileId, Tower, TowerId};
use crate::consts::UPGRADE_STEP;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerView {
    pub id: TowerId,
    pub cell: IVec2,
    pub name: &'static str,
    pub visual: &'static str,
    pub rarity: Rarity,
    pub attack_type: AttackType,
    /// Range in tiles
    pub range: f32,
    pub base_damage: u32,
    /// Damage after upgrades, before crits
    pub damage: f64,
    pub attack_speed: u32,
    pub effect: Option<StatusEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub pos: Vec2,
    pub hp: i64,
    pub max_hp: i64,
    pub is_boss: bool,
    pub is_challenge: bool,
    pub slowed: bool,
    pub stunned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub pos: Vec2,
    pub target: EnemyId,
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub wave: u32,
    pub remaining_ms: f32,
    pub gold: u64,
    pub tickets: u32,
    pub summon_cost: u64,
    pub upgrade_levels: [u32; 5],
    pub challenge_level: i64,
    pub playing: bool,
    pub game_over: bool,
    pub speed: f32,
    pub selected: Option<TowerId>,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub projectiles: Vec<ProjectileView>,
}

impl GameState {
    pub fn tower_view(&self, tower: &Tower) -> TowerView {
        let config = tower.config;
        let level = self.upgrade_level(config.rarity);
        TowerView {
            id: tower.id,
            cell: tower.cell,
            name: config.name,
            visual: config.visual,
            rarity: config.rarity,
            attack_type: config.attack_type,
            range: config.range,
            base_damage: config.damage,
            damage: config.damage as f64 * (1.0 + UPGRADE_STEP * level as f64),
            attack_speed: config.attack_speed,
            effect: config.effect,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            wave: self.director.wave,
            remaining_ms: self.director.remaining_ms(),
            gold: self.gold,
            tickets: self.tickets,
            summon_cost: self.summon_cost,
            upgrade_levels: self.upgrade_levels,
            challenge_level: self.challenge_level,
            playing: self.playing,
            game_over: self.game_over,
            speed: self.speed,
            selected: self.selected,
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    pos: e.pos,
                    hp: e.hp,
                    max_hp: e.max_hp,
                    is_boss: e.is_boss,
                    is_challenge: e.is_challenge,
                    slowed: e.slow_ms > 0.0,
                    stunned: e.stun_ms > 0.0,
                })
                .collect(),
            towers: self.towers.iter().map(|t| self.tower_view(t)).collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView { id: p.id, pos: p.pos, target: p.target })
                .collect(),
        }
    }
}
