//! Enemy movement along the path

use super::path::Path;
use super::state::{Enemy, GameState};

/// Advance one enemy by `dt` milliseconds.
///
/// Status effects hold the enemy in place and only consume as much of the
/// step as they have left, so the rest of a long step is still walked.
/// Stun drains before slow.
pub fn advance_enemy(enemy: &mut Enemy, path: &Path, dt: f32) {
    let mut budget = dt;
    for timer in [&mut enemy.stun_ms, &mut enemy.slow_ms] {
        if *timer > 0.0 {
            let used = timer.min(budget);
            *timer -= used;
            budget -= used;
        }
    }
    if budget <= 0.0 {
        return;
    }

    enemy.progress += enemy.speed * budget;
    if enemy.progress >= 1.0 {
        // Consume every whole segment in one go
        let whole = enemy.progress.floor();
        enemy.progress -= whole;
        enemy.segment = (enemy.segment + whole as usize) % path.len();
    }
    enemy.pos = path.point_at(enemy.segment, enemy.progress);
}

pub fn run(state: &mut GameState, dt: f32) {
    let path = &state.path;
    for enemy in &mut state.enemies {
        advance_enemy(enemy, path, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EnemyId;
    use glam::Vec2;
    use proptest::prelude::*;

    fn walker(speed: f32) -> Enemy {
        let path = Path::default();
        Enemy {
            id: EnemyId(1),
            segment: 0,
            progress: 0.0,
            pos: path.start(),
            hp: 100,
            max_hp: 100,
            speed,
            slow_ms: 0.0,
            stun_ms: 0.0,
            is_boss: false,
            is_challenge: false,
        }
    }

    #[test]
    fn test_walks_forward() {
        let path = Path::default();
        let mut enemy = walker(0.001);
        advance_enemy(&mut enemy, &path, 500.0);
        assert_eq!(enemy.segment, 0);
        assert!((enemy.progress - 0.5).abs() < 1e-5);
        assert!((enemy.pos - Vec2::new(120.0, 90.0)).length() < 1e-3);
    }

    #[test]
    fn test_crosses_several_segments_in_one_step() {
        let path = Path::default();
        let mut enemy = walker(0.001);
        advance_enemy(&mut enemy, &path, 3250.0);
        assert_eq!(enemy.segment, 3);
        assert!((enemy.progress - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_wraps_at_end_of_loop() {
        let path = Path::default();
        let mut enemy = walker(0.001);
        enemy.segment = path.len() - 1;
        enemy.progress = 0.5;
        advance_enemy(&mut enemy, &path, 1000.0);
        assert_eq!(enemy.segment, 0);
        assert!((enemy.progress - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_status_consumes_part_of_step() {
        let path = Path::default();
        let mut enemy = walker(0.001);
        enemy.stun_ms = 100.0;
        advance_enemy(&mut enemy, &path, 50.0);
        assert_eq!(enemy.progress, 0.0);
        assert_eq!(enemy.stun_ms, 50.0);

        enemy.slow_ms = 100.0;
        advance_enemy(&mut enemy, &path, 200.0);
        assert_eq!(enemy.stun_ms, 0.0);
        assert_eq!(enemy.slow_ms, 0.0);
        assert!((enemy.progress - 0.05).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_progress_stays_in_unit_range(
            speed in 0.0001f32..0.01,
            steps in prop::collection::vec(1.0f32..5000.0, 1..50),
        ) {
            let path = Path::default();
            let mut enemy = walker(speed);
            for dt in steps {
                advance_enemy(&mut enemy, &path, dt);
                prop_assert!(enemy.progress >= 0.0 && enemy.progress < 1.0);
                prop_assert!(enemy.segment < path.len());
            }
        }
    }
}
