//! Targeting, firing, projectile flight and hit resolution

use glam::Vec2;
use rand::Rng;

use super::catalog::{AttackType, StatusEffect};
use super::state::{
    DamagePayload, Enemy, EnemyId, GameEvent, GameState, Projectile, ProjectileId,
};
use crate::consts::*;
use crate::tiles_to_px;

/// Everything a hit needs once it lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub payload: DamagePayload,
    pub attack_type: AttackType,
    pub splash_radius: Option<f32>,
    pub effect: Option<StatusEffect>,
}

impl Projectile {
    pub fn hit(&self) -> Hit {
        Hit {
            payload: self.payload,
            attack_type: self.attack_type,
            splash_radius: self.splash_radius,
            effect: self.effect,
        }
    }
}

/// Pick the live enemy in range that is furthest along the path. Bosses
/// outrank everything else; ties keep the earlier enemy.
pub fn select_target(origin: Vec2, range_px: f32, enemies: &[Enemy]) -> Option<EnemyId> {
    let mut best: Option<(EnemyId, f32)> = None;
    for enemy in enemies {
        if !enemy.is_alive() || enemy.pos.distance(origin) > range_px {
            continue;
        }
        let score = enemy.priority();
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((enemy.id, score));
        }
    }
    best.map(|(id, _)| id)
}

/// Apply a hit on `target`. A splash hit damages every live enemy within
/// the radius of the target's position, the target included. Hits on a
/// missing or already dead target are dropped.
pub fn resolve_hit<R: Rng>(enemies: &mut [Enemy], target: EnemyId, hit: &Hit, rng: &mut R) {
    let Some(index) = enemies.iter().position(|e| e.id == target && e.is_alive()) else {
        return;
    };
    let crit = rng.random_bool(CRIT_CHANCE);
    let damage = hit.payload.resolve(crit);

    match hit.attack_type {
        AttackType::Splash => {
            let center = enemies[index].pos;
            let radius = tiles_to_px(hit.splash_radius.unwrap_or(DEFAULT_SPLASH_RADIUS));
            for enemy in enemies
                .iter_mut()
                .filter(|e| e.is_alive() && e.pos.distance(center) <= radius)
            {
                enemy.hp -= damage;
                if let Some(effect) = hit.effect {
                    enemy.apply_status(effect);
                }
            }
        }
        AttackType::Single | AttackType::Instant => {
            let enemy = &mut enemies[index];
            enemy.hp -= damage;
            if let Some(effect) = hit.effect {
                enemy.apply_status(effect);
            }
        }
    }
}

/// Tick every tower's cooldown and fire the ready ones
pub fn run_towers(state: &mut GameState, dt: f32) {
    for i in 0..state.towers.len() {
        let tower = &mut state.towers[i];
        tower.cooldown_ms -= dt;
        if tower.cooldown_ms > 0.0 {
            continue;
        }
        let config = tower.config;
        let origin = tower.pos();

        let Some(target) = select_target(origin, tiles_to_px(config.range), &state.enemies) else {
            // Idle towers stay ready
            state.towers[i].cooldown_ms = 0.0;
            continue;
        };
        state.towers[i].cooldown_ms += config.cooldown_ms();

        let hit = Hit {
            payload: DamagePayload {
                base: config.damage,
                level: state.upgrade_level(config.rarity),
            },
            attack_type: config.attack_type,
            splash_radius: config.splash_radius,
            effect: config.effect,
        };

        if config.attack_type == AttackType::Instant {
            resolve_hit(&mut state.enemies, target, &hit, &mut state.rng);
        } else {
            let id = ProjectileId(state.next_entity_id());
            state.projectiles.push(Projectile {
                id,
                target,
                pos: origin,
                speed: PROJECTILE_SPEED,
                payload: hit.payload,
                attack_type: hit.attack_type,
                splash_radius: hit.splash_radius,
                effect: hit.effect,
            });
        }
    }
}

/// Fly projectiles toward their targets. Projectiles whose target is gone
/// are discarded.
pub fn run_projectiles(state: &mut GameState, dt: f32) {
    let projectiles = std::mem::take(&mut state.projectiles);
    let mut in_flight = Vec::with_capacity(projectiles.len());

    for mut projectile in projectiles {
        let Some(target_pos) = state
            .enemies
            .iter()
            .find(|e| e.id == projectile.target && e.is_alive())
            .map(|e| e.pos)
        else {
            continue;
        };

        let step = projectile.speed * dt;
        let to_target = target_pos - projectile.pos;
        let dist = to_target.length();
        if dist <= step {
            resolve_hit(&mut state.enemies, projectile.target, &projectile.hit(), &mut state.rng);
        } else {
            projectile.pos += to_target / dist * step;
            in_flight.push(projectile);
        }
    }

    state.projectiles = in_flight;
}

/// Kill reward for the current wave
pub fn kill_reward(wave: u32, boss: bool) -> u64 {
    let base = KILL_REWARD_BASE + (wave / 2) as u64;
    if boss { base * BOSS_REWARD_MULTIPLIER } else { base }
}

/// Remove defeated enemies and pay out their rewards, one payout each
pub fn reap_defeated(state: &mut GameState) {
    if state.enemies.iter().all(Enemy::is_alive) {
        return;
    }
    let (defeated, alive): (Vec<Enemy>, Vec<Enemy>) =
        std::mem::take(&mut state.enemies).into_iter().partition(|e| !e.is_alive());
    state.enemies = alive;

    let wave = state.director.wave;
    for enemy in defeated {
        let gold = kill_reward(wave, enemy.is_boss);
        let ticket = enemy.is_boss || enemy.is_challenge || state.rng.random_bool(TICKET_DROP_RATE);

        state.add_gold(gold);
        if ticket {
            state.add_tickets(1);
        }
        if enemy.is_challenge {
            state.challenge_level = state.challenge_level.saturating_mul(2);
            log::info!("Challenge boss defeated, next level {}", state.challenge_level);
            state.emit(GameEvent::ChallengeBossLevel(state.challenge_level));
        }
        log::debug!("Enemy {:?} defeated: +{} gold, ticket: {}", enemy.id, gold, ticket);
        state.emit(GameEvent::EnemyDefeated { id: enemy.id, gold, ticket });
    }
    state.report_enemy_count();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::{self, Rarity};
    use crate::sim::state::Tower;
    use crate::sim::TowerId;
    use glam::IVec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn enemy_at(id: u32, pos: Vec2, hp: i64) -> Enemy {
        Enemy {
            id: EnemyId(id),
            segment: 0,
            progress: 0.0,
            pos,
            hp,
            max_hp: hp,
            speed: 0.0,
            slow_ms: 0.0,
            stun_ms: 0.0,
            is_boss: false,
            is_challenge: false,
        }
    }

    fn splash_hit(radius: f32) -> Hit {
        Hit {
            payload: DamagePayload { base: 10, level: 0 },
            attack_type: AttackType::Splash,
            splash_radius: Some(radius),
            effect: Some(StatusEffect::Slow),
        }
    }

    #[test]
    fn test_select_prefers_furthest_along() {
        let mut a = enemy_at(1, Vec2::new(100.0, 100.0), 10);
        let mut b = enemy_at(2, Vec2::new(110.0, 100.0), 10);
        a.segment = 3;
        b.segment = 2;
        b.progress = 0.9;
        let target = select_target(Vec2::new(100.0, 100.0), 200.0, &[a, b]);
        assert_eq!(target, Some(EnemyId(1)));
    }

    #[test]
    fn test_select_prefers_boss() {
        let a = {
            let mut e = enemy_at(1, Vec2::ZERO, 10);
            e.segment = 19;
            e
        };
        let b = {
            let mut e = enemy_at(2, Vec2::ZERO, 10);
            e.is_boss = true;
            e
        };
        assert_eq!(select_target(Vec2::ZERO, 10.0, &[a, b]), Some(EnemyId(2)));
    }

    #[test]
    fn test_select_ignores_out_of_range_and_dead() {
        let far = enemy_at(1, Vec2::new(500.0, 0.0), 10);
        let dead = enemy_at(2, Vec2::ZERO, 0);
        assert_eq!(select_target(Vec2::ZERO, 100.0, &[far, dead]), None);
    }

    #[test]
    fn test_splash_radius_is_inclusive() {
        let mut rng = Pcg32::seed_from_u64(3);
        let center = Vec2::new(300.0, 300.0);
        let mut enemies = vec![
            enemy_at(1, center, 100),
            // Exactly 1.5 tiles away
            enemy_at(2, center + Vec2::new(90.0, 0.0), 100),
            enemy_at(3, center + Vec2::new(91.0, 0.0), 100),
        ];
        resolve_hit(&mut enemies, EnemyId(1), &splash_hit(1.5), &mut rng);
        assert!(enemies[0].hp < 100);
        assert!(enemies[1].hp < 100);
        assert_eq!(enemies[2].hp, 100);
        assert_eq!(enemies[1].slow_ms, STATUS_DURATION_MS);
        assert_eq!(enemies[2].slow_ms, 0.0);
    }

    #[test]
    fn test_hit_on_dead_target_is_dropped() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemies = vec![enemy_at(1, Vec2::ZERO, 0), enemy_at(2, Vec2::ZERO, 50)];
        resolve_hit(&mut enemies, EnemyId(1), &splash_hit(1.5), &mut rng);
        assert_eq!(enemies[1].hp, 50);
    }

    #[test]
    fn test_stun_applies_to_single_target() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemies = vec![enemy_at(1, Vec2::ZERO, 100), enemy_at(2, Vec2::ZERO, 100)];
        let hit = Hit {
            payload: DamagePayload { base: 10, level: 0 },
            attack_type: AttackType::Single,
            splash_radius: None,
            effect: Some(StatusEffect::Stun),
        };
        resolve_hit(&mut enemies, EnemyId(2), &hit, &mut rng);
        assert_eq!(enemies[0].hp, 100);
        assert!(enemies[1].hp == 90 || enemies[1].hp == 85);
        assert_eq!(enemies[1].stun_ms, STATUS_DURATION_MS);
    }

    #[test]
    fn test_projectile_discarded_when_target_gone() {
        let mut state = GameState::new(1);
        state.projectiles.push(Projectile {
            id: ProjectileId(99),
            target: EnemyId(12345),
            pos: Vec2::ZERO,
            speed: PROJECTILE_SPEED,
            payload: DamagePayload { base: 10, level: 0 },
            attack_type: AttackType::Single,
            splash_radius: None,
            effect: None,
        });
        run_projectiles(&mut state, 16.0);
        assert!(state.projectiles().is_empty());
    }

    #[test]
    fn test_tower_fires_projectile_that_lands() {
        let mut state = GameState::new(1);
        let target = state.spawn_enemy(1_000, 0.0, false, false);
        let start = state.path.start();
        let config = catalog::units_of(Rarity::Common)
            .iter()
            .find(|u| u.attack_type == AttackType::Single)
            .unwrap();
        state.towers.push(Tower {
            id: TowerId(500),
            cell: IVec2::new(2, 2),
            config,
            cooldown_ms: 0.0,
        });

        run_towers(&mut state, 16.0);
        assert_eq!(state.projectiles().len(), 1);
        assert!(state.towers()[0].cooldown_ms > 0.0);

        // Diagonal from (2,2) to (1,1) is ~85 px, 0.8 px/ms
        for _ in 0..10 {
            run_projectiles(&mut state, 16.0);
        }
        assert!(state.projectiles().is_empty());
        let hp = state.enemy(target).unwrap().hp;
        assert!(hp < 1_000);
        assert_eq!(state.enemy(target).unwrap().pos, start);
    }

    #[test]
    fn test_reap_pays_boss_and_ticket_once() {
        let mut state = GameState::new(1);
        let boss = state.spawn_enemy(10, 0.0, true, false);
        state.drain_events();
        state.enemies[0].hp = -5;
        let gold = state.gold;
        let tickets = state.tickets;

        reap_defeated(&mut state);
        reap_defeated(&mut state);

        assert_eq!(state.gold, gold + kill_reward(1, true));
        assert_eq!(state.tickets, tickets + 1);
        let payouts = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::EnemyDefeated { id, .. } if *id == boss))
            .count();
        assert_eq!(payouts, 1);
    }

    #[test]
    fn test_challenge_kill_doubles_level() {
        let mut state = GameState::new(1);
        state.spawn_enemy(10, 0.0, true, true);
        state.enemies[0].hp = 0;
        reap_defeated(&mut state);
        assert_eq!(state.challenge_level, 2);
    }

    #[test]
    fn test_challenge_level_saturates() {
        let mut state = GameState::new(1);
        state.challenge_level = i64::MAX / 2 + 1;
        state.spawn_enemy(10, 0.0, true, true);
        state.enemies[0].hp = 0;
        reap_defeated(&mut state);
        assert_eq!(state.challenge_level, i64::MAX);
    }

    #[test]
    fn test_kill_reward_scales_with_wave() {
        assert_eq!(kill_reward(1, false), 10);
        assert_eq!(kill_reward(4, false), 12);
        assert_eq!(kill_reward(5, true), 120);
    }

    proptest! {
        #[test]
        fn prop_damage_matches_formula(base in 1u32..5000, level in 0u32..50) {
            let payload = DamagePayload { base, level };
            let plain = (base as f64 * (5 + level) as f64 / 5.0).floor() as i64;
            let crit = (base as f64 * (5 + level) as f64 * 3.0 / 10.0).floor() as i64;
            prop_assert_eq!(payload.resolve(false), plain);
            prop_assert_eq!(payload.resolve(true), crit);
            prop_assert!(payload.resolve(true) >= payload.resolve(false));
        }
    }
}
