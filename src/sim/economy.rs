//! Gold, tickets and everything that puts units on or takes them off the board

use glam::IVec2;
use rand::Rng;
use serde::Serialize;

use super::ActionError;
use super::catalog::{self, GAMBLE_SUCCESS_WEIGHTS, Rarity, SUMMON_WEIGHTS, UnitConfig};
use super::state::{EnemyId, GameEvent, GameState, Tower, TowerId};
use crate::consts::*;
use crate::in_bounds;

/// Outcome of a gamble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GambleOutcome {
    pub tower: TowerId,
    pub success: bool,
}

/// A mythic the selected unit can evolve into right now
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvolutionOption {
    pub target: &'static UnitConfig,
    /// Selected unit first, then the other two ingredients
    pub ingredients: [TowerId; 3],
}

impl GameState {
    /// Free cells in row-major order
    pub fn empty_cells(&self) -> Vec<IVec2> {
        let mut cells = Vec::new();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let cell = IVec2::new(x, y);
                if !self.path.is_path_cell(x, y) && self.tower_at(cell).is_none() {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Validate a requested cell, or pick a random free one
    fn choose_cell(&mut self, requested: Option<IVec2>) -> Result<IVec2, ActionError> {
        match requested {
            Some(cell) => {
                if !in_bounds(cell.x, cell.y) {
                    Err(ActionError::OutOfBounds)
                } else if self.path.is_path_cell(cell.x, cell.y) {
                    Err(ActionError::PathCell)
                } else if self.tower_at(cell).is_some() {
                    Err(ActionError::CellOccupied)
                } else {
                    Ok(cell)
                }
            }
            None => {
                let cells = self.empty_cells();
                if cells.is_empty() {
                    return Err(ActionError::NoEmptyCell);
                }
                Ok(cells[self.rng.random_range(0..cells.len())])
            }
        }
    }

    fn place_unit(&mut self, cell: IVec2, config: &'static UnitConfig) -> TowerId {
        let id = TowerId(self.next_entity_id());
        self.towers.push(Tower { id, cell, config, cooldown_ms: 0.0 });
        log::debug!("Placed {} ({}) at {}", config.name, config.rarity.as_str(), cell);
        if let Some(tower) = self.tower(id) {
            let view = self.tower_view(tower);
            self.emit(GameEvent::UnitPlaced(view));
        }
        self.emit_stats();
        id
    }

    fn remove_towers(&mut self, ids: &[TowerId]) {
        self.towers.retain(|t| !ids.contains(&t.id));
        if self.selected.is_some_and(|s| ids.contains(&s)) {
            self.deselect();
        }
    }

    /// Paid summon. The price rises after every paid summon.
    pub fn summon(&mut self, cell: Option<IVec2>, rarity: Option<Rarity>) -> Result<TowerId, ActionError> {
        let cost = self.summon_cost;
        if self.gold < cost {
            return Err(ActionError::InsufficientGold { needed: cost, available: self.gold });
        }
        let cell = self.choose_cell(cell)?;
        let rarity = rarity.unwrap_or_else(|| SUMMON_WEIGHTS.draw(&mut self.rng));
        let config = catalog::random_unit(rarity, &mut self.rng);

        self.spend_gold(cost);
        self.summon_cost += SUMMON_COST_INCREASE;
        Ok(self.place_unit(cell, config))
    }

    /// Spend a ticket for a coin flip: success rolls Rare or better, failure
    /// still yields a Common
    pub fn gamble(&mut self) -> Result<GambleOutcome, ActionError> {
        if self.tickets < GAMBLE_TICKET_COST {
            return Err(ActionError::InsufficientTickets {
                needed: GAMBLE_TICKET_COST,
                available: self.tickets,
            });
        }
        let cell = self.choose_cell(None)?;
        self.spend_tickets(GAMBLE_TICKET_COST);

        let success = self.rng.random_bool(GAMBLE_SUCCESS_CHANCE);
        let rarity = if success {
            GAMBLE_SUCCESS_WEIGHTS.draw(&mut self.rng)
        } else {
            Rarity::Common
        };
        let config = catalog::random_unit(rarity, &mut self.rng);
        let tower = self.place_unit(cell, config);
        log::debug!("Gamble {}: {}", if success { "won" } else { "lost" }, config.name);
        self.emit(GameEvent::GambleResult { cell, success });
        Ok(GambleOutcome { tower, success })
    }

    /// Fuse two matching units into a random unit of the next tier, placed
    /// on `keep`'s cell
    fn merge_pair(&mut self, keep: TowerId, other: TowerId) -> Result<TowerId, ActionError> {
        let a = self.tower(keep).ok_or(ActionError::UnitNotFound(keep))?;
        let b = self.tower(other).ok_or(ActionError::UnitNotFound(other))?;
        if !a.same_unit(b) {
            return Err(ActionError::NoMergePartner);
        }
        let next = a.config.rarity.merge_result().ok_or(ActionError::NotMergeable)?;
        let cell = a.cell;

        self.remove_towers(&[keep, other]);
        self.deselect();
        let config = catalog::random_unit(next, &mut self.rng);
        Ok(self.place_unit(cell, config))
    }

    /// Merge `id` with any other unit of the same name and rarity
    pub fn merge_with_partner(&mut self, id: TowerId) -> Result<TowerId, ActionError> {
        let tower = self.tower(id).ok_or(ActionError::UnitNotFound(id))?;
        if tower.config.rarity.merge_result().is_none() {
            return Err(ActionError::NotMergeable);
        }
        let partner = self
            .towers
            .iter()
            .find(|t| t.id != id && t.same_unit(tower))
            .map(|t| t.id)
            .ok_or(ActionError::NoMergePartner)?;
        self.merge_pair(id, partner)
    }

    /// Merge every matching pair below Legendary, pass after pass, until no
    /// pair is left. Returns the number of merges.
    pub fn auto_merge(&mut self) -> usize {
        let mut merged = 0;
        loop {
            let pass = self.merge_groups();
            if pass == 0 {
                break;
            }
            merged += pass;
        }
        log::debug!("Auto-merged {} pairs", merged);
        merged
    }

    /// One pass over the board. Groups keep first-appearance order and pairs
    /// are taken from the newest end.
    fn merge_groups(&mut self) -> usize {
        let mut groups: Vec<((&'static str, Rarity), Vec<TowerId>)> = Vec::new();
        for tower in &self.towers {
            if tower.config.rarity.merge_result().is_none() {
                continue;
            }
            let key = (tower.config.name, tower.config.rarity);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, ids)) => ids.push(tower.id),
                None => groups.push((key, vec![tower.id])),
            }
        }

        let mut merged = 0;
        for (_, mut ids) in groups {
            while let (Some(keep), Some(other)) = (ids.pop(), ids.pop()) {
                if self.merge_pair(keep, other).is_ok() {
                    merged += 1;
                }
            }
        }
        merged
    }

    /// The first mythic whose recipe the selected legendary completes with
    /// units already on the board
    pub fn evolution_option(&self, selected: TowerId) -> Option<EvolutionOption> {
        let tower = self.tower(selected)?;
        if tower.config.rarity != Rarity::Legendary {
            return None;
        }
        for mythic in catalog::recipes_using(tower.config.name) {
            let Some(recipe) = mythic.recipe else { continue };
            let mut needed: Vec<&str> = recipe.to_vec();
            if let Some(i) = needed.iter().position(|n| *n == tower.config.name) {
                needed.remove(i);
            }

            let mut ingredients = vec![selected];
            for name in needed {
                let found = self.towers.iter().find(|t| {
                    t.config.rarity == Rarity::Legendary
                        && t.config.name == name
                        && !ingredients.contains(&t.id)
                });
                match found {
                    Some(t) => ingredients.push(t.id),
                    None => break,
                }
            }
            if let Ok(ingredients) = <[TowerId; 3]>::try_from(ingredients) {
                return Some(EvolutionOption { target: mythic, ingredients });
            }
        }
        None
    }

    /// Consume three legendaries matching `target`'s recipe and place the
    /// mythic on the first ingredient's cell
    pub fn evolve(&mut self, target: &str, ingredients: [TowerId; 3]) -> Result<TowerId, ActionError> {
        let mythic = catalog::find_unit(target, Rarity::Mythic)
            .filter(|m| m.recipe.is_some())
            .ok_or(ActionError::InvalidRecipe)?;

        let [a, b, c] = ingredients;
        if a == b || b == c || a == c {
            return Err(ActionError::MissingIngredients);
        }
        let mut names = [""; 3];
        for (slot, id) in names.iter_mut().zip(ingredients) {
            let tower = self.tower(id).ok_or(ActionError::MissingIngredients)?;
            if tower.config.rarity != Rarity::Legendary {
                return Err(ActionError::MissingIngredients);
            }
            *slot = tower.config.name;
        }
        if !mythic.recipe_matches(names) {
            return Err(ActionError::MissingIngredients);
        }

        let cell = self.tower(a).map(|t| t.cell).ok_or(ActionError::UnitNotFound(a))?;
        self.remove_towers(&ingredients);
        self.deselect();
        let id = self.place_unit(cell, mythic);
        log::info!("Evolved {} at {}", mythic.name, cell);
        self.emit(GameEvent::Evolved { into: mythic.name, cell });
        Ok(id)
    }

    /// Remove a unit for its rarity's sell price
    pub fn sell(&mut self, id: TowerId) -> Result<u64, ActionError> {
        let tower = self.tower(id).ok_or(ActionError::UnitNotFound(id))?;
        let price = tower.config.rarity.sell_price();
        self.remove_towers(&[id]);
        self.add_gold(price);
        self.emit_stats();
        Ok(price)
    }

    /// Re-roll a unit within its rarity, keeping its cell
    pub fn exchange(&mut self, id: TowerId) -> Result<&'static UnitConfig, ActionError> {
        let tower = self.tower(id).ok_or(ActionError::UnitNotFound(id))?;
        let rarity = tower.config.rarity;
        let cost = rarity.exchange_price();
        if self.gold < cost {
            return Err(ActionError::InsufficientGold { needed: cost, available: self.gold });
        }

        self.spend_gold(cost);
        let config = catalog::random_unit(rarity, &mut self.rng);
        if let Some(tower) = self.towers.iter_mut().find(|t| t.id == id) {
            tower.config = config;
        }
        if self.selected == Some(id) {
            if let Some(tower) = self.tower(id) {
                let view = self.tower_view(tower);
                self.emit(GameEvent::TowerSelected(view));
            }
        }
        self.emit_stats();
        Ok(config)
    }

    /// Raise the damage level of every unit of `rarity`
    pub fn upgrade(&mut self, rarity: Rarity) -> Result<u32, ActionError> {
        let cost = rarity.upgrade_cost();
        if self.gold < cost {
            return Err(ActionError::InsufficientGold { needed: cost, available: self.gold });
        }
        self.spend_gold(cost);
        let level = &mut self.upgrade_levels[rarity.index()];
        *level += 1;
        let level = *level;
        log::debug!("Upgraded {} to level {}", rarity.as_str(), level);
        self.emit_stats();
        Ok(level)
    }

    /// Summon the challenge boss. Gated by a wall-clock cooldown that ignores
    /// pause and the speed multiplier.
    pub fn summon_challenge_boss(&mut self) -> Result<EnemyId, ActionError> {
        if self.clock_ms < self.challenge_ready_at_ms {
            let remaining_ms = (self.challenge_ready_at_ms - self.clock_ms).ceil() as u64;
            return Err(ActionError::CooldownActive { remaining_ms });
        }
        self.challenge_ready_at_ms = self.clock_ms + CHALLENGE_BOSS_COOLDOWN_MS as f64;
        let hp = CHALLENGE_BOSS_BASE_HP.saturating_mul(self.challenge_level);
        log::info!("Challenge boss summoned (level {}, {} hp)", self.challenge_level, hp);
        Ok(self.spawn_enemy(hp, CHALLENGE_BOSS_SPEED, true, true))
    }

    /// Select a unit. Selecting the already selected unit merges it with a
    /// matching partner.
    pub fn select(&mut self, id: TowerId) -> Result<(), ActionError> {
        if self.selected == Some(id) {
            if self.game_over {
                return Err(ActionError::GameOver);
            }
            return self.merge_with_partner(id).map(|_| ());
        }
        let tower = self.tower(id).ok_or(ActionError::UnitNotFound(id))?;
        let view = self.tower_view(tower);
        self.selected = Some(id);
        self.emit(GameEvent::TowerSelected(view));
        Ok(())
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.emit(GameEvent::TowerDeselected);
        }
    }
}
