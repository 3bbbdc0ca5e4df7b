//! Post-combat rewards and card/relic sampling shared with the merchant.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::{CardCategory, CardDef, Catalog, Rarity};
use crate::core::rng::SeededRng;
use crate::run::map::RoomNode;

/// What a won fight pays out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Gold granted
    pub gold: u32,
    /// Card ids offered, at most one may be taken
    pub card_choices: Vec<String>,
    /// Relic granted by elite and boss fights
    pub relic: Option<String>,
}

/// Rarity weights shifted by loot luck: `(common, uncommon, rare)`.
pub fn rarity_weights(loot_luck: u32) -> [(Rarity, u32); 3] {
    let luck = loot_luck.min(20);
    [
        (Rarity::Common, 60u32.saturating_sub(5 * luck).max(20)),
        (Rarity::Uncommon, 30 + 3 * luck),
        (Rarity::Rare, 10 + 2 * luck),
    ]
}

/// Cards that can be offered: unlocked, not starter or special, playable
/// category.
pub fn offer_pool(catalog: &Catalog, max_unlocked: u32) -> Vec<&CardDef> {
    catalog
        .cards()
        .filter(|c| {
            matches!(c.rarity, Rarity::Common | Rarity::Uncommon | Rarity::Rare)
                && !matches!(c.category, CardCategory::Status | CardCategory::Curse)
                && c.unlock_level <= max_unlocked
        })
        .collect()
}

/// Sample up to `count` distinct cards with rarity weighting.
///
/// Each pick first rolls a rarity among those with cards left, then a card
/// of that rarity.
pub fn sample_cards(
    catalog: &Catalog,
    max_unlocked: u32,
    loot_luck: u32,
    count: usize,
    rng: &mut SeededRng,
) -> Vec<String> {
    let mut pool = offer_pool(catalog, max_unlocked);
    let weights = rarity_weights(loot_luck);
    let mut picked = Vec::with_capacity(count);

    while picked.len() < count && !pool.is_empty() {
        let available: Vec<(Rarity, u32)> = weights
            .iter()
            .filter(|(rarity, _)| pool.iter().any(|c| c.rarity == *rarity))
            .copied()
            .collect();
        let Some(rarity) = rng.weighted_pick(&available).copied() else {
            break;
        };
        let indices: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, c)| c.rarity == rarity)
            .map(|(i, _)| i)
            .collect();
        let Some(&idx) = rng.pick(&indices) else {
            break;
        };
        picked.push(pool.remove(idx).id.clone());
    }
    picked
}

/// Relics the run can still find: not owned, allowed at this difficulty.
pub fn relic_pool<'a>(catalog: &'a Catalog, owned: &[String], difficulty: u32) -> Vec<&'a str> {
    catalog
        .relics()
        .filter(|r| r.min_difficulty <= difficulty && !owned.contains(&r.id))
        .map(|r| r.id.as_str())
        .collect()
}

/// One random findable relic.
pub fn roll_relic(catalog: &Catalog, owned: &[String], difficulty: u32, rng: &mut SeededRng) -> Option<String> {
    let pool = relic_pool(catalog, owned, difficulty);
    rng.pick(&pool).map(|id| id.to_string())
}

/// Everything a reward roll needs from the run.
#[derive(Clone, Copy, Debug)]
pub struct RewardContext<'a> {
    pub floor: u32,
    pub difficulty: u32,
    pub max_unlocked: u32,
    pub loot_luck: u32,
    pub gold_percent: u32,
    pub card_choices: usize,
    pub owned_relics: &'a [String],
}

/// Roll the reward for a won room.
///
/// Gold: `rand(10..=20) + floor*5 + position*2`, x1.5 for elites, x2.5 for
/// bosses, then the relic gold bonus.
pub fn generate_reward(room: &RoomNode, ctx: &RewardContext<'_>, catalog: &Catalog, rng: &mut SeededRng) -> Reward {
    let mut gold = rng.next_int(10, 20) as u32 + ctx.floor * 5 + room.position as u32 * 2;
    if room.boss {
        gold = gold * 5 / 2;
    } else if room.elite {
        gold = gold * 3 / 2;
    }
    gold += gold * ctx.gold_percent / 100;

    let card_choices = sample_cards(catalog, ctx.max_unlocked, ctx.loot_luck, ctx.card_choices, rng);
    let relic = if room.elite || room.boss {
        roll_relic(catalog, ctx.owned_relics, ctx.difficulty, rng)
    } else {
        None
    };
    debug!(gold, cards = card_choices.len(), ?relic, "reward rolled");
    Reward { gold, card_choices, relic }
}
