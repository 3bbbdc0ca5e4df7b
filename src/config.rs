//! Rules configuration.
//!
//! Every tunable number of the rules lives here so balance changes do not
//! touch engine code. Missing JSON fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for combat and run progression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Maximum cards in hand before overflow handling kicks in
    pub max_hand_size: usize,
    /// Energy restored at the start of each player turn
    pub base_energy: i32,
    /// Cards drawn at the start of each player turn
    pub base_draw: u32,
    /// Ink the player starts each combat with
    pub starting_ink: i32,
    /// Ink cap
    pub max_ink: i32,
    /// Ink cost of the Retrieve power (discard -> hand)
    pub retrieve_ink_cost: i32,
    /// Ink cost of the Draw power
    pub draw_power_ink_cost: i32,
    /// Cards drawn by the Draw power
    pub draw_power_cards: u32,
    /// Ink cost of the Ward power
    pub ward_ink_cost: i32,
    /// Block granted by the Ward power
    pub ward_block: i32,
    /// Draw events kept for diagnostics
    pub draw_log_capacity: usize,

    /// Rooms per floor, boss room included
    pub rooms_per_floor: usize,
    /// Floors per run
    pub floors: u32,
    /// Maximum choices offered by an intermediate room
    pub max_room_choices: u32,
    /// Gold at run start
    pub starting_gold: u32,
    /// Max HP at run start
    pub starting_hp: i32,
    /// Percent of max HP restored by a rest site
    pub heal_room_percent: i32,
    /// Card choices offered after a combat
    pub reward_card_choices: usize,
    /// Percent of enemy damage added per floor past the first
    pub floor_damage_step: u32,
    /// Percent of enemy HP added per floor past the first
    pub floor_hp_step: u32,
    /// Base percent chance of an intermediate combat being elite
    pub base_elite_chance: u32,
    /// Usable items the run can carry
    pub max_items: usize,

    /// Merchant price of a common card
    pub price_common: u32,
    /// Merchant price of an uncommon card
    pub price_uncommon: u32,
    /// Merchant price of a rare card
    pub price_rare: u32,
    /// Merchant price of a relic
    pub price_relic: u32,
    /// Merchant price of a usable item
    pub price_item: u32,
    /// Merchant price of the card removal service
    pub price_removal: u32,
    /// Percent added to merchant prices per floor past the first
    pub floor_price_step: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_hand_size: 10,
            base_energy: 3,
            base_draw: 5,
            starting_ink: 0,
            max_ink: 10,
            retrieve_ink_cost: 2,
            draw_power_ink_cost: 2,
            draw_power_cards: 2,
            ward_ink_cost: 1,
            ward_block: 6,
            draw_log_capacity: 20,

            rooms_per_floor: 10,
            floors: 3,
            max_room_choices: 3,
            starting_gold: 99,
            starting_hp: 70,
            heal_room_percent: 30,
            reward_card_choices: 3,
            floor_damage_step: 10,
            floor_hp_step: 15,
            base_elite_chance: 10,
            max_items: 3,

            price_common: 50,
            price_uncommon: 75,
            price_rare: 150,
            price_relic: 160,
            price_item: 60,
            price_removal: 75,
            floor_price_step: 15,
        }
    }
}

impl RulesConfig {
    /// Parse a config from JSON. Absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
