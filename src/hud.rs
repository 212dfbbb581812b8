//! HUD model
//!
//! Folds simulation events into the numbers a heads-up display shows. The
//! HUD never reads simulation registries directly.

use std::collections::VecDeque;

use crate::consts::MAX_ENEMIES;
use crate::sim::{GameEvent, TowerView};

/// Notices kept for the message log
const NOTICE_CAPACITY: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct Hud {
    pub gold: u64,
    pub tickets: u32,
    pub wave: u32,
    pub remaining_secs: u32,
    pub enemy_count: usize,
    pub challenge_level: i64,
    pub game_over: bool,
    pub selected: Option<TowerView>,
    pub towers: Vec<TowerView>,
    pub notices: VecDeque<String>,
}

impl Hud {
    pub fn new(gold: u64, tickets: u32) -> Self {
        Self {
            gold,
            tickets,
            wave: 1,
            challenge_level: 1,
            ..Default::default()
        }
    }

    /// Share of the population ceiling in use, 1.0 = one enemy from losing
    pub fn danger(&self) -> f32 {
        (self.enemy_count as f32 / MAX_ENEMIES as f32).min(1.0)
    }

    fn notice(&mut self, text: String) {
        if self.notices.len() == NOTICE_CAPACITY {
            self.notices.pop_front();
        }
        self.notices.push_back(text);
    }

    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GoldChanged(gold) => self.gold = *gold,
            GameEvent::TicketsChanged(tickets) => self.tickets = *tickets,
            GameEvent::WaveComplete { completed, next } => {
                self.wave = *next;
                self.notice(format!("Wave {completed} complete"));
            }
            GameEvent::TimerUpdate { remaining_ms } => {
                self.remaining_secs = (remaining_ms / 1000.0).ceil() as u32;
            }
            GameEvent::EnemyCountChanged(count) => self.enemy_count = *count,
            GameEvent::GameOver => {
                self.game_over = true;
                self.notice("Game over".to_string());
            }
            GameEvent::StatsUpdate(towers) => {
                self.towers = towers.clone();
                if let Some(selected) = &self.selected {
                    // Drop a selection whose unit left the board
                    if !towers.iter().any(|t| t.id == selected.id) {
                        self.selected = None;
                    }
                }
            }
            GameEvent::TowerSelected(view) => self.selected = Some(view.clone()),
            GameEvent::TowerDeselected => self.selected = None,
            GameEvent::UnitPlaced(view) => {
                self.notice(format!("{} {} joined", view.rarity.as_str(), view.name));
            }
            GameEvent::GambleResult { success, .. } => {
                let text = if *success { "Gamble won!" } else { "Gamble lost" };
                self.notice(text.to_string());
            }
            GameEvent::EnemyDefeated { ticket, .. } => {
                if *ticket {
                    self.notice("Ticket dropped".to_string());
                }
            }
            GameEvent::BossSpawned { challenge, .. } => {
                let text = if *challenge { "Challenge boss approaches" } else { "Boss incoming" };
                self.notice(text.to_string());
            }
            GameEvent::ChallengeBossLevel(level) => {
                if *level > self.challenge_level {
                    self.notice(format!("Challenge boss defeated, level {level} unlocked"));
                }
                self.challenge_level = *level;
            }
            GameEvent::Evolved { into, .. } => self.notice(format!("Evolved into {into}!")),
            GameEvent::IntentRefused(reason) => self.notice(reason.to_string()),
        }
    }

    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    /// One-line status summary
    pub fn status_line(&self) -> String {
        format!(
            "wave {} | {}s | gold {} | tickets {} | enemies {}/{} | units {}",
            self.wave,
            self.remaining_secs,
            self.gold,
            self.tickets,
            self.enemy_count,
            MAX_ENEMIES,
            self.towers.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ActionError, GameState};

    #[test]
    fn test_tracks_economy_and_wave() {
        let mut hud = Hud::new(300, 3);
        hud.apply_all(&[
            GameEvent::GoldChanged(250),
            GameEvent::TicketsChanged(2),
            GameEvent::WaveComplete { completed: 1, next: 2 },
            GameEvent::TimerUpdate { remaining_ms: 39_500.0 },
            GameEvent::EnemyCountChanged(50),
        ]);
        assert_eq!(hud.gold, 250);
        assert_eq!(hud.tickets, 2);
        assert_eq!(hud.wave, 2);
        assert_eq!(hud.remaining_secs, 40);
        assert_eq!(hud.danger(), 0.5);
    }

    #[test]
    fn test_selection_follows_board() {
        let mut state = GameState::new(1);
        let id = state.summon(None, None).unwrap();
        state.select(id).unwrap();

        let mut hud = Hud::new(300, 3);
        hud.apply_all(&state.drain_events());
        assert_eq!(hud.selected.as_ref().map(|v| v.id), Some(id));
        assert_eq!(hud.towers.len(), 1);

        state.sell(id).unwrap();
        hud.apply_all(&state.drain_events());
        assert!(hud.selected.is_none());
        assert!(hud.towers.is_empty());
    }

    #[test]
    fn test_notice_log_is_bounded() {
        let mut hud = Hud::new(0, 0);
        for _ in 0..20 {
            hud.apply(&GameEvent::IntentRefused(ActionError::NoEmptyCell));
        }
        assert_eq!(hud.notices.len(), NOTICE_CAPACITY);
    }
}
