//! Card definitions and instances.

use serde::{Deserialize, Serialize};

use crate::combat::effect::{describe_effects, Effect, TargetMode};

/// Card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    Attack,
    Skill,
    /// Exhausted after play
    Power,
    /// Unplayable clutter
    Status,
    /// Unplayable clutter that sticks to the deck
    Curse,
}

impl CardCategory {
    /// Status and Curse cards can never be played.
    pub fn is_playable(self) -> bool {
        !matches!(self, CardCategory::Status | CardCategory::Curse)
    }
}

/// Card rarity, drives reward and merchant sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Starter deck only, never offered
    Starter,
    Common,
    Uncommon,
    Rare,
    /// Generated by effects, never offered
    Special,
}

/// Alternate effect list paid for with extra ink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkedVariant {
    /// Effects resolved instead of the base list
    pub effects: Vec<Effect>,
    /// Ink-mark cost on top of the card's own ink cost
    pub ink_cost: i32,
    /// Energy cost override for the inked play
    #[serde(default)]
    pub cost: Option<i32>,
}

/// Explicit upgrade overrides. Anything left `None` falls back to the
/// generic boost rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUpgrade {
    #[serde(default)]
    pub effects: Option<Vec<Effect>>,
    #[serde(default)]
    pub inked_effects: Option<Vec<Effect>>,
    #[serde(default)]
    pub cost: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Immutable card definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDef {
    pub id: String,
    pub name: String,
    pub category: CardCategory,
    /// Energy cost
    pub cost: i32,
    /// Ink cost of any play
    #[serde(default)]
    pub ink_cost: i32,
    pub target: TargetMode,
    pub rarity: Rarity,
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub inked: Option<InkedVariant>,
    #[serde(default)]
    pub upgrade: Option<CardUpgrade>,
    #[serde(default)]
    pub description: Option<String>,
    /// Difficulty level that must be unlocked before the card is offered
    #[serde(default)]
    pub unlock_level: u32,
}

impl CardDef {
    /// Energy cost of a base play.
    pub fn energy_cost(&self, upgraded: bool) -> i32 {
        if upgraded {
            if let Some(cost) = self.upgrade.as_ref().and_then(|u| u.cost) {
                return cost;
            }
        }
        self.cost
    }

    /// Energy cost of an inked play, `None` without a variant.
    pub fn inked_energy_cost(&self, upgraded: bool) -> Option<i32> {
        let variant = self.inked.as_ref()?;
        Some(variant.cost.unwrap_or_else(|| self.energy_cost(upgraded)))
    }

    /// Total ink of an inked play, `None` without a variant.
    pub fn inked_ink_cost(&self) -> Option<i32> {
        self.inked.as_ref().map(|v| self.ink_cost + v.ink_cost)
    }

    /// Effect list for a play.
    ///
    /// Upgraded cards use the explicit override when present, else the
    /// generic boost of the base (or inked) list. `None` if `inked` is
    /// requested on a card without a variant.
    pub fn effects_for(&self, upgraded: bool, inked: bool) -> Option<Vec<Effect>> {
        let base = if inked {
            &self.inked.as_ref()?.effects
        } else {
            &self.effects
        };
        if !upgraded {
            return Some(base.clone());
        }
        let explicit = self.upgrade.as_ref().and_then(|u| {
            if inked {
                u.inked_effects.clone()
            } else {
                u.effects.clone()
            }
        });
        Some(explicit.unwrap_or_else(|| base.iter().map(Effect::boosted).collect()))
    }

    /// Display name, `+` suffixed when upgraded.
    pub fn display_name(&self, upgraded: bool) -> String {
        if upgraded {
            format!("{}+", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Rules text generated from the effect data.
    pub fn description(&self, upgraded: bool) -> String {
        let explicit = if upgraded {
            self.upgrade.as_ref().and_then(|u| u.description.clone())
        } else {
            self.description.clone()
        };
        if let Some(text) = explicit {
            return text;
        }
        let mut text = self
            .effects_for(upgraded, false)
            .map(|effects| describe_effects(&effects, self.target))
            .unwrap_or_default();
        if let Some(inked) = self.effects_for(upgraded, true) {
            let ink = self.inked_ink_cost().unwrap_or_default();
            text.push_str(&format!(" Inked ({ink}): {}", describe_effects(&inked, self.target)));
        }
        if self.category == CardCategory::Power && !text.is_empty() {
            text.push_str(" Exhaust.");
        }
        if !self.category.is_playable() {
            text = if text.is_empty() {
                "Unplayable.".to_string()
            } else {
                format!("Unplayable. {text}")
            };
        }
        text
    }

    /// Any effect of the base list marks the card for exhaust?
    pub fn exhausts(&self, effects: &[Effect]) -> bool {
        self.category == CardCategory::Power || effects.iter().any(|e| *e == Effect::Exhaust)
    }
}

/// One physical card. Instances move between piles; identity matters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub instance_id: String,
    pub card_id: String,
    pub upgraded: bool,
}

impl CardInstance {
    /// Create an unupgraded instance.
    pub fn new(instance_id: impl Into<String>, card_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            card_id: card_id.into(),
            upgraded: false,
        }
    }

    /// Mark upgraded. Returns false when it already was.
    pub fn upgrade(&mut self) -> bool {
        if self.upgraded {
            return false;
        }
        self.upgraded = true;
        true
    }
}
