//! Floor map generation.
//!
//! A floor is a fixed sequence of positions; each position offers one or
//! more room choices. Position 0 is a single easy fight, the last position
//! is the boss and the one before it is a rest site.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RulesConfig;
use crate::content::{Catalog, PackTier};
use crate::core::rng::SeededRng;
use crate::error::{EngineError, Result};
use crate::run::difficulty::DifficultyModifiers;

/// Base weight of Combat choices.
const COMBAT_WEIGHT: i32 = 60;
/// Base weight of Merchant choices.
const MERCHANT_WEIGHT: i32 = 20;
/// Base weight of Special choices.
const SPECIAL_WEIGHT: i32 = 20;
/// Positions below this draw from the easy pack pool.
const EASY_POSITIONS: usize = 3;

/// What a room holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Combat,
    Merchant,
    Special,
    /// Rest site before the boss: heal or upgrade
    PreBoss,
}

/// One selectable room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNode {
    /// Position on the floor, 0-based
    pub position: usize,
    pub room_type: RoomType,
    /// Enemy definition ids, empty for non-combat rooms
    pub enemy_ids: Vec<String>,
    pub elite: bool,
    pub boss: bool,
    pub completed: bool,
}

impl RoomNode {
    fn new(position: usize, room_type: RoomType) -> Self {
        Self {
            position,
            room_type,
            enemy_ids: Vec::new(),
            elite: false,
            boss: false,
            completed: false,
        }
    }
}

/// Pick a pack of `tier` fitting `floor`, falling back to easier tiers
/// when the pool is empty.
fn pick_pack(catalog: &Catalog, tier: PackTier, floor: u32, rng: &mut SeededRng) -> Result<Vec<String>> {
    let fallbacks: &[PackTier] = match tier {
        PackTier::Elite => &[PackTier::Elite, PackTier::Normal, PackTier::Easy],
        PackTier::Normal => &[PackTier::Normal, PackTier::Easy],
        PackTier::Easy => &[PackTier::Easy, PackTier::Normal],
    };
    for candidate in fallbacks {
        let pool: Vec<_> = catalog
            .packs()
            .filter(|p| p.tier == *candidate && p.fits_floor(floor))
            .collect();
        if let Some(pack) = rng.pick(&pool) {
            return Ok(pack.enemies.clone());
        }
    }
    Err(EngineError::EmptyPool("enemy packs"))
}

fn room_weights(modifiers: &DifficultyModifiers) -> [(RoomType, u32); 3] {
    let weight = |base: i32, delta: i32| (base + delta).max(0) as u32;
    [
        (RoomType::Combat, COMBAT_WEIGHT as u32),
        (RoomType::Merchant, weight(MERCHANT_WEIGHT, modifiers.merchant_weight_delta)),
        (RoomType::Special, weight(SPECIAL_WEIGHT, modifiers.special_weight_delta)),
    ]
}

/// Generate the map of one floor.
pub fn generate_map(
    floor: u32,
    modifiers: &DifficultyModifiers,
    catalog: &Catalog,
    rules: &RulesConfig,
    rng: &mut SeededRng,
) -> Result<Vec<Vec<RoomNode>>> {
    let rooms = rules.rooms_per_floor.max(2);
    let boss_position = rooms - 1;
    let pre_boss_position = if rooms >= 3 { Some(rooms - 2) } else { None };
    let elite_chance = (rules.base_elite_chance + modifiers.elite_chance_bonus).min(100);
    let weights = room_weights(modifiers);

    let mut map = Vec::with_capacity(rooms);
    for position in 0..rooms {
        if position == 0 {
            let mut room = RoomNode::new(0, RoomType::Combat);
            room.enemy_ids = pick_pack(catalog, PackTier::Easy, floor, rng)?;
            map.push(vec![room]);
            continue;
        }
        if position == boss_position {
            let mut room = RoomNode::new(position, RoomType::Combat);
            room.enemy_ids = vec![catalog.boss_for_floor(floor)?.to_string()];
            room.boss = true;
            map.push(vec![room]);
            continue;
        }
        if Some(position) == pre_boss_position {
            map.push(vec![RoomNode::new(position, RoomType::PreBoss)]);
            continue;
        }

        let choices = rng.next_int(1, rules.max_room_choices.max(1) as i32) as usize;
        let mut row = Vec::with_capacity(choices);
        for _ in 0..choices {
            let room_type = rng.weighted_pick(&weights).copied().unwrap_or(RoomType::Combat);
            let mut room = RoomNode::new(position, room_type);
            if room_type == RoomType::Combat {
                room.elite = rng.roll_percent(elite_chance);
                let tier = if room.elite {
                    PackTier::Elite
                } else if position < EASY_POSITIONS {
                    PackTier::Easy
                } else {
                    PackTier::Normal
                };
                room.enemy_ids = pick_pack(catalog, tier, floor, rng)?;
            }
            row.push(room);
        }
        map.push(row);
    }

    debug!(floor, rooms, "map generated");
    Ok(map)
}
