//! Relic and usable item definitions.

use serde::{Deserialize, Serialize};

use crate::combat::effect::{Effect, TargetMode};
use crate::content::cards::Rarity;

/// Passive relic effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelicEffect {
    /// Block at the start of every combat
    CombatStartBlock { value: i32 },
    /// Strength at the start of every combat
    CombatStartStrength { value: i32 },
    /// Ink at the start of every combat
    CombatStartInk { value: i32 },
    /// Thorns at the start of every combat
    CombatStartThorns { value: i32 },
    /// Extra energy each turn
    MaxEnergy { value: i32 },
    /// Extra card drawn each turn
    ExtraDraw { value: u32 },
    /// First enemy hit each combat that would cost HP is reduced by this percent
    FirstHitReduction { percent: u32 },
    /// Percent chance to gain 1 ink per card played
    InkPerCardChance { percent: u32 },
    /// Shifts reward rarity weights toward rare cards
    LootLuck { value: u32 },
    /// HP restored after each won combat
    HealAfterCombat { value: i32 },
    /// Max HP gained when the relic is obtained
    MaxHp { value: i32 },
    /// Percent bonus on combat gold
    GoldPercent { percent: u32 },
}

/// Immutable relic definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelicDef {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub effects: Vec<RelicEffect>,
    /// Lowest difficulty the relic can be found on
    #[serde(default)]
    pub min_difficulty: u32,
}

/// Immutable usable item definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub target: TargetMode,
    pub effects: Vec<Effect>,
}

/// Sum of passive relic bonuses for a set of owned relics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelicBonuses {
    pub combat_start_block: i32,
    pub combat_start_strength: i32,
    pub combat_start_ink: i32,
    pub combat_start_thorns: i32,
    pub max_energy: i32,
    pub extra_draw: u32,
    /// Strongest reduction among owned relics
    pub first_hit_reduction: Option<u32>,
    pub ink_per_card_chance: u32,
    pub loot_luck: u32,
    pub heal_after_combat: i32,
    pub gold_percent: u32,
}

impl RelicBonuses {
    /// Fold the effects of the given relic definitions.
    pub fn from_relics<'a>(relics: impl IntoIterator<Item = &'a RelicDef>) -> Self {
        let mut bonuses = Self::default();
        for relic in relics {
            for effect in &relic.effects {
                bonuses.add(effect);
            }
        }
        bonuses
    }

    fn add(&mut self, effect: &RelicEffect) {
        match effect {
            RelicEffect::CombatStartBlock { value } => self.combat_start_block += value,
            RelicEffect::CombatStartStrength { value } => self.combat_start_strength += value,
            RelicEffect::CombatStartInk { value } => self.combat_start_ink += value,
            RelicEffect::CombatStartThorns { value } => self.combat_start_thorns += value,
            RelicEffect::MaxEnergy { value } => self.max_energy += value,
            RelicEffect::ExtraDraw { value } => self.extra_draw += value,
            RelicEffect::FirstHitReduction { percent } => {
                let best = self.first_hit_reduction.unwrap_or(0).max(*percent).min(100);
                self.first_hit_reduction = Some(best);
            }
            RelicEffect::InkPerCardChance { percent } => {
                self.ink_per_card_chance = (self.ink_per_card_chance + percent).min(100);
            }
            RelicEffect::LootLuck { value } => self.loot_luck += value,
            RelicEffect::HealAfterCombat { value } => self.heal_after_combat += value,
            RelicEffect::GoldPercent { percent } => self.gold_percent += percent,
            // Applied once on pickup
            RelicEffect::MaxHp { .. } => {}
        }
    }
}
