//! Per-frame update for a dungeon room

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::BoonMechanic;
use super::consts::*;
use super::state::{Bolt, DungeonEvent, DungeonState, Foe};

/// Input for one frame
#[derive(Debug, Clone, Default)]
pub struct DungeonInput {
    /// Desired direction. Keyboard input is unnormalized, analog sticks may
    /// be shorter than 1.
    pub move_dir: Vec2,
    pub dash: bool,
    /// Visible area in pixels; `DEFAULT_VIEWPORT` when absent
    pub viewport: Option<Vec2>,
}

/// Advance the room by one frame
pub fn tick(state: &mut DungeonState, input: &DungeonInput) {
    if state.player.hp <= 0.0 {
        if !state.dead {
            state.dead = true;
            log::info!("Player fell at depth {} after {} kills", state.depth, state.kills);
            state.events.push(DungeonEvent::PlayerDied);
        }
        return;
    }

    if state.spawned >= state.quota && state.enemies.is_empty() && !state.cleared {
        state.cleared = true;
        log::info!("Room at depth {} cleared with {:.1} hp", state.depth, state.player.hp);
        state.events.push(DungeonEvent::RoomCleared { hp: state.player.hp });
    }

    let viewport = input
        .viewport
        .unwrap_or(Vec2::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1));

    move_player(state, input);
    auto_attack(state);
    let half = PLAYER_SIZE / 2.0;
    state.player.pos = state.player.pos.clamp(Vec2::splat(half), Vec2::splat(WORLD_SIZE - half));
    state.camera = (state.player.pos - viewport / 2.0)
        .min(Vec2::splat(WORLD_SIZE) - viewport)
        .max(Vec2::ZERO);

    spin_orbitals(state);
    strike_lightning(state, viewport);
    spawn_enemies(state, viewport);
    move_enemies(state);
    fly_bolts(state);

    let before = state.enemies.len();
    state.enemies.retain(|e| e.hp > 0.0);
    state.kills += (before - state.enemies.len()) as u32;

    state.frame += 1;
}

fn move_player(state: &mut DungeonState, input: &DungeonInput) {
    let player = &mut state.player;
    if input.dash && player.dash_cooldown == 0 {
        player.dash_frames = DASH_FRAMES;
        player.dash_cooldown = DASH_COOLDOWN_FRAMES;
    }

    if player.dash_frames > 0 {
        player.dash_frames -= 1;
        player.pos += player.facing * DASH_SPEED;
    } else {
        let mag = input.move_dir.length();
        if mag > 0.0 {
            let dir = if mag > 1.0 { input.move_dir / mag } else { input.move_dir };
            player.facing = input.move_dir / mag;
            player.pos += dir * PLAYER_SPEED;
        }
    }

    player.dash_cooldown = player.dash_cooldown.saturating_sub(1);
    player.attack_cooldown = player.attack_cooldown.saturating_sub(1);
}

/// Frames between volleys for the given number of rapid-fire boons
pub fn attack_cooldown(rapid: usize) -> u32 {
    if rapid == 0 {
        ATTACK_COOLDOWN_FRAMES
    } else {
        (ATTACK_COOLDOWN_FRAMES as f32 / (1.5 * rapid as f32)).floor() as u32
    }
}

fn auto_attack(state: &mut DungeonState) {
    if state.player.attack_cooldown > 0 {
        return;
    }
    let origin = state.player.pos;
    let Some(target) = state
        .enemies
        .iter()
        .map(|e| (e.pos, e.pos.distance(origin)))
        .filter(|(_, d)| *d < ATTACK_RANGE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pos, _)| pos)
    else {
        return;
    };

    let multishot = state.boon_count(BoonMechanic::Multishot) as u32;
    let homing = state.boon_count(BoonMechanic::Homing) > 0;
    state.player.attack_cooldown = attack_cooldown(state.boon_count(BoonMechanic::Rapid));

    let count = 1 + multishot * MULTISHOT_EXTRA;
    let spread = MULTISHOT_SPREAD_DEG.to_radians();
    let aim = (target - origin).to_angle();
    let first = aim - (count - 1) as f32 * spread / 2.0;
    for i in 0..count {
        let id = state.next_entity_id();
        state.bolts.push(Bolt {
            id,
            pos: origin,
            vel: Vec2::from_angle(first + i as f32 * spread) * BOLT_SPEED,
            damage: BOLT_DAMAGE,
            homing,
        });
    }
}

fn spin_orbitals(state: &mut DungeonState) {
    state.orbital_angle += ORBITAL_SPIN;
    let count = state.orbitals.len();
    for i in 0..count {
        let offset = TAU / count as f32 * i as f32;
        let pos = state.player.pos + Vec2::from_angle(state.orbital_angle + offset) * ORBITAL_RADIUS;
        state.orbitals[i] = pos;
        for foe in &mut state.enemies {
            if pos.distance(foe.pos) < foe.size / 2.0 + ORBITAL_SIZE / 2.0 {
                foe.hp -= ORBITAL_DAMAGE;
            }
        }
    }
}

fn strike_lightning(state: &mut DungeonState, viewport: Vec2) {
    let strikes = state.boon_count(BoonMechanic::Lightning);
    if strikes == 0 || state.frame % LIGHTNING_INTERVAL_FRAMES != 0 || state.enemies.is_empty() {
        return;
    }
    let (lo, hi) = (state.camera, state.camera + viewport);
    for _ in 0..strikes {
        let visible: Vec<usize> = state
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.pos.cmpgt(lo).all() && e.pos.cmplt(hi).all())
            .map(|(i, _)| i)
            .collect();
        let index = if visible.is_empty() {
            state.rng.random_range(0..state.enemies.len())
        } else {
            visible[state.rng.random_range(0..visible.len())]
        };
        state.enemies[index].hp -= LIGHTNING_DAMAGE;
    }
}

fn spawn_enemies(state: &mut DungeonState, viewport: Vec2) {
    state.spawn_timer += 1;
    if state.spawn_timer <= SPAWN_INTERVAL_FRAMES
        || state.enemies.len() >= MAX_LIVE_ENEMIES
        || state.spawned >= state.quota
    {
        return;
    }

    let angle = state.rng.random::<f32>() * TAU;
    let radius = viewport.max_element() / 2.0 + SPAWN_DISTANCE + state.rng.random::<f32>() * SPAWN_JITTER;
    let pos = (state.player.pos + Vec2::from_angle(angle) * radius)
        .clamp(Vec2::splat(SPAWN_MARGIN), Vec2::splat(WORLD_SIZE - SPAWN_MARGIN));

    let is_boss = state.spawned == state.quota - 1;
    let (hp, size) = if is_boss { (BOSS_HP, BOSS_SIZE) } else { (ENEMY_HP, ENEMY_SIZE) };
    let id = state.next_entity_id();
    state.enemies.push(Foe { id, pos, hp, max_hp: hp, size, is_boss });
    state.spawned += 1;
    state.spawn_timer = 0;
    if is_boss {
        log::debug!("Room boss spawned at {}", pos);
        state.events.push(DungeonEvent::BossSpawned);
    }
}

fn move_enemies(state: &mut DungeonState) {
    let player = state.player.pos;
    let contact = PLAYER_SIZE / 2.0;
    let mut damage = 0.0;

    for i in 0..state.enemies.len() {
        let to_player = player - state.enemies[i].pos;
        let dist = to_player.length();
        if dist > 0.0 {
            state.enemies[i].pos += to_player / dist * ENEMY_SPEED;
        }

        for j in 0..state.enemies.len() {
            if i == j {
                continue;
            }
            let away = state.enemies[i].pos - state.enemies[j].pos;
            let gap = away.length();
            if gap > 0.0 && gap < state.enemies[i].size {
                state.enemies[i].pos += away / gap * SEPARATION_PUSH;
            }
        }

        if dist < contact + state.enemies[i].size / 2.0 && !state.player.is_dashing() {
            damage += CONTACT_DAMAGE;
        }
    }

    state.player.hp -= damage;
}

fn fly_bolts(state: &mut DungeonState) {
    let world = Vec2::splat(WORLD_SIZE);
    let enemies = &mut state.enemies;
    state.bolts.retain_mut(|bolt| {
        if bolt.homing {
            let nearest = enemies
                .iter()
                .min_by(|a, b| a.pos.distance(bolt.pos).total_cmp(&b.pos.distance(bolt.pos)));
            if let Some(foe) = nearest {
                let desired = Vec2::from_angle((foe.pos - bolt.pos).to_angle()) * BOLT_SPEED;
                bolt.vel = bolt.vel * (1.0 - HOMING_STEER) + desired * HOMING_STEER;
            }
        }
        bolt.pos += bolt.vel;

        let mut keep = bolt.pos.cmpge(Vec2::ZERO).all() && bolt.pos.cmple(world).all();
        for foe in enemies.iter_mut() {
            if bolt.pos.distance(foe.pos) < foe.size / 2.0 + BOLT_SIZE / 2.0 {
                foe.hp -= bolt.damage;
                keep = false;
            }
        }
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Boon, God, Run};

    fn room(boons: Vec<Boon>) -> DungeonState {
        DungeonState::new(11, 0, PLAYER_MAX_HP, boons)
    }

    fn boons(mechanic: BoonMechanic, n: usize) -> Vec<Boon> {
        vec![Boon { god: God::Zeus, mechanic }; n]
    }

    fn foe_at(state: &mut DungeonState, pos: Vec2, hp: f32) {
        let id = state.next_entity_id();
        state.enemies.push(Foe { id, pos, hp, max_hp: hp, size: ENEMY_SIZE, is_boss: false });
    }

    #[test]
    fn test_player_moves_and_is_clamped() {
        let mut state = room(Vec::new());
        let input = DungeonInput { move_dir: Vec2::new(1.0, 1.0), ..Default::default() };
        let start = state.player.pos;
        tick(&mut state, &input);
        // Keyboard diagonals are normalized
        assert!((state.player.pos.distance(start) - PLAYER_SPEED).abs() < 1e-4);

        state.player.pos = Vec2::new(5.0, 5.0);
        tick(&mut state, &DungeonInput::default());
        assert_eq!(state.player.pos, Vec2::splat(PLAYER_SIZE / 2.0));
    }

    #[test]
    fn test_dash_burst_and_cooldown() {
        let mut state = room(Vec::new());
        state.player.facing = Vec2::X;
        let start = state.player.pos;
        let dash = DungeonInput { dash: true, ..Default::default() };
        tick(&mut state, &dash);
        assert!((state.player.pos.x - start.x - DASH_SPEED).abs() < 1e-4);
        assert!(state.player.is_dashing());

        for _ in 0..DASH_FRAMES {
            tick(&mut state, &DungeonInput::default());
        }
        assert!(!state.player.is_dashing());
        let pos = state.player.pos;
        tick(&mut state, &dash);
        // Still cooling down
        assert_eq!(state.player.pos, pos);
    }

    #[test]
    fn test_contact_damage_skipped_while_dashing() {
        let mut state = room(Vec::new());
        let p = state.player.pos;
        foe_at(&mut state, p + Vec2::new(10.0, 0.0), 1000.0);
        state.player.attack_cooldown = 1000;
        tick(&mut state, &DungeonInput::default());
        assert_eq!(state.player.hp, PLAYER_MAX_HP - CONTACT_DAMAGE);

        let hp = state.player.hp;
        state.player.facing = Vec2::Y;
        tick(&mut state, &DungeonInput { dash: true, ..Default::default() });
        assert_eq!(state.player.hp, hp);
    }

    #[test]
    fn test_multishot_volley() {
        let mut state = room(boons(BoonMechanic::Multishot, 1));
        let p = state.player.pos;
        foe_at(&mut state, p + Vec2::new(300.0, 0.0), 1000.0);
        tick(&mut state, &DungeonInput::default());
        assert_eq!(state.bolts.len(), 4);
        assert_eq!(state.player.attack_cooldown, ATTACK_COOLDOWN_FRAMES);
    }

    #[test]
    fn test_out_of_range_enemies_are_ignored() {
        let mut state = room(Vec::new());
        let p = state.player.pos;
        foe_at(&mut state, p + Vec2::new(450.0, 0.0), 1000.0);
        tick(&mut state, &DungeonInput::default());
        assert!(state.bolts.is_empty());
    }

    #[test]
    fn test_rapid_fire_cooldown() {
        assert_eq!(attack_cooldown(0), 30);
        assert_eq!(attack_cooldown(1), 20);
        assert_eq!(attack_cooldown(2), 10);
        assert_eq!(attack_cooldown(3), 6);
    }

    #[test]
    fn test_orbitals_per_boon() {
        let state = room(boons(BoonMechanic::Orbital, 2));
        assert_eq!(state.orbitals.len(), 4);
    }

    #[test]
    fn test_lightning_on_first_frame() {
        let mut state = room(boons(BoonMechanic::Lightning, 1));
        let p = state.player.pos;
        foe_at(&mut state, p + Vec2::new(0.0, 350.0), 1000.0);
        state.player.attack_cooldown = 1000;
        tick(&mut state, &DungeonInput::default());
        assert_eq!(state.enemies[0].hp, 1000.0 - LIGHTNING_DAMAGE);
    }

    #[test]
    fn test_spawn_cadence_and_boss_last() {
        let mut state = room(Vec::new());
        state.player.attack_cooldown = u32::MAX;
        let frames = (SPAWN_INTERVAL_FRAMES + 1) * state.quota;
        for _ in 0..frames {
            state.player.hp = PLAYER_MAX_HP;
            state.player.attack_cooldown = u32::MAX;
            tick(&mut state, &DungeonInput::default());
        }
        assert_eq!(state.spawned, state.quota);
        assert_eq!(state.enemies.iter().filter(|e| e.is_boss).count(), 1);
        assert!(state.enemies.last().is_some_and(|e| e.is_boss && e.hp == BOSS_HP));
        assert!(state.drain_events().contains(&DungeonEvent::BossSpawned));
    }

    #[test]
    fn test_latches_fire_once() {
        let mut state = room(Vec::new());
        state.spawned = state.quota;
        tick(&mut state, &DungeonInput::default());
        tick(&mut state, &DungeonInput::default());
        assert_eq!(state.drain_events(), vec![DungeonEvent::RoomCleared { hp: PLAYER_MAX_HP }]);
        assert!(state.is_cleared());

        state.player.hp = 0.0;
        tick(&mut state, &DungeonInput::default());
        tick(&mut state, &DungeonInput::default());
        assert_eq!(state.drain_events(), vec![DungeonEvent::PlayerDied]);
        assert!(state.is_dead());
    }

    #[test]
    fn test_bolts_kill_and_count() {
        let mut state = Run::new().enter_room(5);
        let p = state.player.pos;
        foe_at(&mut state, p + Vec2::new(100.0, 0.0), BOLT_DAMAGE);
        for _ in 0..15 {
            tick(&mut state, &DungeonInput::default());
        }
        assert_eq!(state.kills, 1);
    }
}
