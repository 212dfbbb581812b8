//! Unit catalog and balance tables
//!
//! Every placeable unit is an immutable template keyed by (name, rarity).
//! The numeric values here are the game's balance data and must not drift.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rarity tiers, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    /// Position in `ALL`, used to index per-rarity tables
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }

    /// Tier produced by merging two units of this tier.
    /// Legendary and Mythic units only advance through evolution.
    pub fn merge_result(self) -> Option<Rarity> {
        match self {
            Rarity::Common => Some(Rarity::Rare),
            Rarity::Rare => Some(Rarity::Epic),
            Rarity::Epic => Some(Rarity::Legendary),
            Rarity::Legendary | Rarity::Mythic => None,
        }
    }

    pub fn sell_price(self) -> u64 {
        [30, 80, 300, 1000, 5000][self.index()]
    }

    pub fn exchange_price(self) -> u64 {
        [50, 150, 500, 2000, 10_000][self.index()]
    }

    pub fn upgrade_cost(self) -> u64 {
        [100, 200, 400, 1000, 2000][self.index()]
    }
}

/// How a unit delivers its damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackType {
    /// Projectile that damages only its target
    Single,
    /// Projectile that damages everything around the impact point
    Splash,
    /// Resolves on the spot, no projectile
    Instant,
}

/// Status applied on hit. Both stop movement for their duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffect {
    Slow,
    Stun,
}

/// Immutable unit template
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitConfig {
    pub name: &'static str,
    pub visual: &'static str,
    pub rarity: Rarity,
    pub attack_type: AttackType,
    /// Targeting range in tiles
    pub range: f32,
    pub damage: u32,
    /// Cooldown between attacks in `BASE_FPS` ticks
    pub attack_speed: u32,
    /// Splash radius in tiles (splash units only)
    pub splash_radius: Option<f32>,
    pub effect: Option<StatusEffect>,
    /// Three legendary unit names consumed by evolution (mythic units only)
    pub recipe: Option<[&'static str; 3]>,
}

impl UnitConfig {
    const fn new(
        name: &'static str,
        visual: &'static str,
        rarity: Rarity,
        attack_type: AttackType,
        range: f32,
        damage: u32,
        attack_speed: u32,
    ) -> Self {
        Self {
            name,
            visual,
            rarity,
            attack_type,
            range,
            damage,
            attack_speed,
            splash_radius: None,
            effect: None,
            recipe: None,
        }
    }

    const fn splash(mut self, radius: f32) -> Self {
        self.splash_radius = Some(radius);
        self
    }

    const fn effect(mut self, effect: StatusEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    const fn recipe(mut self, recipe: [&'static str; 3]) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// Milliseconds between attacks
    pub fn cooldown_ms(&self) -> f32 {
        (self.attack_speed as f32 / crate::consts::BASE_FPS) * 1000.0
    }

    /// Whether `names` is exactly this unit's recipe as a multiset
    pub fn recipe_matches(&self, names: [&str; 3]) -> bool {
        let Some(recipe) = self.recipe else {
            return false;
        };
        let mut wanted = recipe;
        let mut got = names;
        wanted.sort_unstable();
        got.sort_unstable();
        wanted == got
    }
}

use AttackType::{Instant, Single, Splash};
use Rarity::{Common, Epic, Legendary, Mythic, Rare};
use StatusEffect::{Slow, Stun};

pub const DRAGON_LORD: &str = "Dragon Lord";
pub const ARCHANGEL: &str = "Archangel";
pub const DEMON_KING: &str = "Demon King";
pub const POSEIDON: &str = "Poseidon";
pub const WARLORD: &str = "Warlord";
pub const ZEUS: &str = "Zeus";
pub const PHOENIX: &str = "Phoenix";
pub const PALADIN: &str = "Paladin";

static COMMON_UNITS: [UnitConfig; 4] = [
    UnitConfig::new("Trainee Chick", "🐤", Common, Single, 2.5, 8, 20),
    UnitConfig::new("Rock Thrower", "🪨", Common, Single, 2.0, 12, 25),
    UnitConfig::new("Apprentice Archer", "🏹", Common, Single, 3.5, 10, 18),
    UnitConfig::new("Spearman", "🔱", Common, Single, 1.8, 15, 22),
];

static RARE_UNITS: [UnitConfig; 8] = [
    UnitConfig::new("Fire Mage", "🔥", Rare, Splash, 3.5, 25, 25).splash(1.5),
    UnitConfig::new("Frost Mage", "❄️", Rare, Single, 3.0, 15, 20).effect(Slow),
    UnitConfig::new("Sniper", "🔭", Rare, Single, 6.0, 80, 50),
    UnitConfig::new("Cannon", "💣", Rare, Splash, 4.0, 40, 40).splash(2.0),
    UnitConfig::new("Venom Hunter", "🐍", Rare, Single, 3.0, 35, 18),
    UnitConfig::new("Catapult", "🪵", Rare, Splash, 5.0, 60, 50).splash(2.2),
    UnitConfig::new("Elite Swordsman", "⚔️", Rare, Instant, 1.5, 55, 15),
    UnitConfig::new("Boomerang Hunter", "🪃", Rare, Splash, 3.5, 28, 22).splash(1.5),
];

static EPIC_UNITS: [UnitConfig; 8] = [
    UnitConfig::new("Ninja", "🥷", Epic, Instant, 2.0, 80, 8),
    UnitConfig::new("Heavy Mech", "🤖", Epic, Single, 4.0, 120, 35).effect(Stun),
    UnitConfig::new("Berserker", "🩸", Epic, Single, 1.5, 200, 15),
    UnitConfig::new("Dark Priest", "🔮", Epic, Splash, 4.5, 90, 20).splash(1.8),
    UnitConfig::new("Laser Tank", "🚨", Epic, Instant, 5.0, 150, 40),
    UnitConfig::new("Storm Caller", "⛈️", Epic, Splash, 4.5, 100, 25)
        .splash(2.2)
        .effect(Stun),
    UnitConfig::new("Void Eye", "👁️", Epic, Single, 7.0, 180, 35),
    UnitConfig::new("Magma Golem", "🌋", Epic, Splash, 3.0, 220, 45).splash(3.0),
];

static LEGENDARY_UNITS: [UnitConfig; 8] = [
    UnitConfig::new(DRAGON_LORD, "🐲", Legendary, Splash, 4.5, 300, 20).splash(2.5),
    UnitConfig::new(ARCHANGEL, "👼", Legendary, Single, 5.0, 400, 15),
    UnitConfig::new(DEMON_KING, "👹", Legendary, Splash, 3.5, 450, 25)
        .splash(2.0)
        .effect(Slow),
    UnitConfig::new(POSEIDON, "🔱", Legendary, Splash, 4.0, 350, 22)
        .splash(2.0)
        .effect(Slow),
    UnitConfig::new(WARLORD, "⚔️", Legendary, Instant, 2.5, 800, 30),
    UnitConfig::new(ZEUS, "⚡", Legendary, Splash, 5.5, 380, 18)
        .splash(2.5)
        .effect(Stun),
    UnitConfig::new(PHOENIX, "🦅", Legendary, Splash, 5.0, 320, 12).splash(2.0),
    UnitConfig::new(PALADIN, "🛡️", Legendary, Instant, 2.0, 1200, 40),
];

static MYTHIC_UNITS: [UnitConfig; 10] = [
    UnitConfig::new("God of Luck", "👑", Mythic, Splash, 6.0, 2000, 10)
        .splash(3.5)
        .recipe([DRAGON_LORD, ARCHANGEL, DEMON_KING]),
    UnitConfig::new("Titan", "🗿", Mythic, Splash, 5.0, 2500, 25)
        .splash(4.0)
        .effect(Stun)
        .recipe([POSEIDON, WARLORD, ZEUS]),
    UnitConfig::new("Hellfire Dragon", "🌋", Mythic, Splash, 5.5, 2800, 20)
        .splash(3.0)
        .recipe([DRAGON_LORD, DEMON_KING, PHOENIX]),
    UnitConfig::new("Seraphim", "✨", Mythic, Single, 6.5, 3000, 15)
        .recipe([ARCHANGEL, PALADIN, ZEUS]),
    UnitConfig::new("Dragon Slayer", "🗡️", Mythic, Instant, 3.0, 5000, 30)
        .recipe([WARLORD, PALADIN, DRAGON_LORD]),
    UnitConfig::new("Elemental Lord", "🌀", Mythic, Splash, 5.0, 2200, 18)
        .splash(4.0)
        .effect(Slow)
        .recipe([POSEIDON, PHOENIX, ARCHANGEL]),
    UnitConfig::new("Chaos Emperor", "🌌", Mythic, Splash, 4.0, 3500, 22)
        .splash(3.0)
        .effect(Stun)
        .recipe([DEMON_KING, WARLORD, ZEUS]),
    UnitConfig::new("Thor", "🔨", Mythic, Splash, 5.0, 2700, 20)
        .splash(3.5)
        .effect(Stun)
        .recipe([ZEUS, WARLORD, POSEIDON]),
    UnitConfig::new("Judge", "⚖️", Mythic, Instant, 7.0, 1800, 8)
        .recipe([ARCHANGEL, PALADIN, WARLORD]),
    UnitConfig::new("Archmage", "🧙", Mythic, Splash, 5.5, 2400, 18)
        .splash(3.0)
        .recipe([DEMON_KING, DRAGON_LORD, ZEUS]),
];

/// All units of one tier, in catalog order
pub fn units_of(rarity: Rarity) -> &'static [UnitConfig] {
    match rarity {
        Rarity::Common => &COMMON_UNITS,
        Rarity::Rare => &RARE_UNITS,
        Rarity::Epic => &EPIC_UNITS,
        Rarity::Legendary => &LEGENDARY_UNITS,
        Rarity::Mythic => &MYTHIC_UNITS,
    }
}

/// Look up a unit by name and tier
pub fn find_unit(name: &str, rarity: Rarity) -> Option<&'static UnitConfig> {
    units_of(rarity).iter().find(|u| u.name == name)
}

/// Mythic units whose recipe includes `name`
pub fn recipes_using(name: &str) -> impl Iterator<Item = &'static UnitConfig> + '_ {
    MYTHIC_UNITS
        .iter()
        .filter(move |m| m.recipe.is_some_and(|r| r.iter().any(|n| *n == name)))
}

/// Uniformly pick a unit of the given tier
pub fn random_unit<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> &'static UnitConfig {
    let pool = units_of(rarity);
    &pool[rng.random_range(0..pool.len())]
}

/// Probability of drawing each rarity, indexed by `Rarity::index`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityWeights(pub [f64; 5]);

/// Paid summon table
pub const SUMMON_WEIGHTS: RarityWeights = RarityWeights([0.85, 0.12, 0.025, 0.005, 0.0]);

/// Table used when a gamble succeeds
pub const GAMBLE_SUCCESS_WEIGHTS: RarityWeights = RarityWeights([0.0, 0.99, 0.008, 0.002, 0.0]);

impl RarityWeights {
    /// Cumulative draw. A roll past the accumulated total (rounding) lands on
    /// the highest tier with a non-zero weight.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Rarity {
        self.pick(rng.random::<f64>())
    }

    /// Resolve a roll in [0, 1) against the table
    pub fn pick(&self, roll: f64) -> Rarity {
        let mut cumulative = 0.0;
        for rarity in Rarity::ALL {
            let weight = self.0[rarity.index()];
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            if roll < cumulative {
                return rarity;
            }
        }
        Rarity::ALL
            .into_iter()
            .rev()
            .find(|r| self.0[r.index()] > 0.0)
            .unwrap_or(Rarity::Common)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(units_of(Rarity::Common).len(), 4);
        assert_eq!(units_of(Rarity::Rare).len(), 8);
        assert_eq!(units_of(Rarity::Epic).len(), 8);
        assert_eq!(units_of(Rarity::Legendary).len(), 8);
        assert_eq!(units_of(Rarity::Mythic).len(), 10);
    }

    #[test]
    fn test_every_unit_sits_in_its_own_tier() {
        for rarity in Rarity::ALL {
            for unit in units_of(rarity) {
                assert_eq!(unit.rarity, rarity, "{}", unit.name);
                assert_eq!(
                    unit.attack_type == AttackType::Splash,
                    unit.splash_radius.is_some(),
                    "{}",
                    unit.name
                );
            }
        }
    }

    #[test]
    fn test_recipes_reference_legendary_units() {
        for mythic in units_of(Rarity::Mythic) {
            let recipe = mythic.recipe.expect("mythic units carry a recipe");
            for name in recipe {
                assert!(find_unit(name, Rarity::Legendary).is_some(), "{name}");
            }
        }
        for rarity in [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary] {
            assert!(units_of(rarity).iter().all(|u| u.recipe.is_none()));
        }
    }

    #[test]
    fn test_recipe_match_ignores_order() {
        let god_of_luck = find_unit("God of Luck", Rarity::Mythic).unwrap();
        assert!(god_of_luck.recipe_matches([DEMON_KING, DRAGON_LORD, ARCHANGEL]));
        assert!(!god_of_luck.recipe_matches([DEMON_KING, DRAGON_LORD, DRAGON_LORD]));
        assert!(!god_of_luck.recipe_matches([DEMON_KING, DRAGON_LORD, ZEUS]));
    }

    #[test]
    fn test_cooldown_conversion() {
        let chick = find_unit("Trainee Chick", Rarity::Common).unwrap();
        // 20 ticks at 30 ticks/s
        assert!((chick.cooldown_ms() - 666.666_7).abs() < 0.01);
    }

    #[test]
    fn test_weight_table_boundaries() {
        assert_eq!(SUMMON_WEIGHTS.pick(0.0), Rarity::Common);
        assert_eq!(SUMMON_WEIGHTS.pick(0.849), Rarity::Common);
        assert_eq!(SUMMON_WEIGHTS.pick(0.85), Rarity::Rare);
        assert_eq!(SUMMON_WEIGHTS.pick(0.969), Rarity::Rare);
        assert_eq!(SUMMON_WEIGHTS.pick(0.98), Rarity::Epic);
        assert_eq!(SUMMON_WEIGHTS.pick(0.996), Rarity::Legendary);
        assert_eq!(SUMMON_WEIGHTS.pick(0.999_999_9), Rarity::Legendary);

        assert_eq!(GAMBLE_SUCCESS_WEIGHTS.pick(0.0), Rarity::Rare);
        assert_eq!(GAMBLE_SUCCESS_WEIGHTS.pick(0.995), Rarity::Epic);
        assert_eq!(GAMBLE_SUCCESS_WEIGHTS.pick(0.999), Rarity::Legendary);
    }

    #[test]
    fn test_mythic_never_drawn_from_summon_table() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..10_000 {
            assert_ne!(SUMMON_WEIGHTS.draw(&mut rng), Rarity::Mythic);
        }
    }

    #[test]
    fn test_merge_ladder() {
        assert_eq!(Rarity::Common.merge_result(), Some(Rarity::Rare));
        assert_eq!(Rarity::Rare.merge_result(), Some(Rarity::Epic));
        assert_eq!(Rarity::Epic.merge_result(), Some(Rarity::Legendary));
        assert_eq!(Rarity::Legendary.merge_result(), None);
        assert_eq!(Rarity::Mythic.merge_result(), None);
    }
}
