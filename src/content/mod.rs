//! Definitions feed.
//!
//! A [`Catalog`] is a load-once, read-only set of id -> definition tables.
//! Engine entry points borrow it; nothing mutates it after construction.
//! Referencing an id that is not in the catalog is a fatal content error.

pub mod actors;
pub mod builtin;
pub mod cards;
pub mod events;
pub mod relics;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::effect::Effect;
use crate::error::{EngineError, Result};

pub use actors::{AbilityDef, AllyDef, EnemyDef, EnemyPack, PackTier};
pub use cards::{CardCategory, CardDef, CardInstance, CardUpgrade, InkedVariant, Rarity};
pub use events::{EventChoice, EventDef, EventOutcome};
pub use relics::{ItemDef, RelicBonuses, RelicDef, RelicEffect};

/// Serialized form of a catalog: plain lists of definitions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub cards: Vec<CardDef>,
    pub enemies: Vec<EnemyDef>,
    pub packs: Vec<EnemyPack>,
    pub allies: Vec<AllyDef>,
    pub relics: Vec<RelicDef>,
    pub items: Vec<ItemDef>,
    pub events: Vec<EventDef>,
    /// Boss enemy id per floor; floors past the end reuse the last entry
    pub boss_ids: Vec<String>,
    /// Card ids of a fresh run's deck
    pub starter_deck: Vec<String>,
}

/// Read-only definition tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    cards: BTreeMap<String, CardDef>,
    enemies: BTreeMap<String, EnemyDef>,
    packs: BTreeMap<String, EnemyPack>,
    allies: BTreeMap<String, AllyDef>,
    relics: BTreeMap<String, RelicDef>,
    items: BTreeMap<String, ItemDef>,
    events: BTreeMap<String, EventDef>,
    boss_ids: Vec<String>,
    starter_deck: Vec<String>,
}

fn index_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> &str) -> BTreeMap<String, T> {
    items.into_iter().map(|item| (id(&item).to_string(), item)).collect()
}

impl Catalog {
    /// Build and validate a catalog from its file form.
    pub fn from_file(file: CatalogFile) -> Result<Self> {
        let catalog = Self {
            cards: index_by_id(file.cards, |c| &c.id),
            enemies: index_by_id(file.enemies, |e| &e.id),
            packs: index_by_id(file.packs, |p| &p.id),
            allies: index_by_id(file.allies, |a| &a.id),
            relics: index_by_id(file.relics, |r| &r.id),
            items: index_by_id(file.items, |i| &i.id),
            events: index_by_id(file.events, |e| &e.id),
            boss_ids: file.boss_ids,
            starter_deck: file.starter_deck,
        };
        catalog.validate()?;
        debug!(
            cards = catalog.cards.len(),
            enemies = catalog.enemies.len(),
            relics = catalog.relics.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// The built-in content set.
    pub fn builtin() -> Result<Self> {
        Self::from_file(builtin::catalog_file())
    }

    /// Check every cross-reference resolves.
    pub fn validate(&self) -> Result<()> {
        for pack in self.packs.values() {
            for enemy_id in &pack.enemies {
                self.enemy(enemy_id)?;
            }
        }
        if self.boss_ids.is_empty() {
            return Err(EngineError::EmptyPool("boss_ids"));
        }
        for boss_id in &self.boss_ids {
            self.enemy(boss_id)?;
        }
        for card_id in &self.starter_deck {
            self.card(card_id)?;
        }

        let mut effect_lists: Vec<&[Effect]> = Vec::new();
        for card in self.cards.values() {
            effect_lists.push(&card.effects);
            if let Some(inked) = &card.inked {
                effect_lists.push(&inked.effects);
            }
            if let Some(upgrade) = &card.upgrade {
                if let Some(effects) = &upgrade.effects {
                    effect_lists.push(effects);
                }
                if let Some(effects) = &upgrade.inked_effects {
                    effect_lists.push(effects);
                }
            }
        }
        for ability in self
            .enemies
            .values()
            .flat_map(|e| e.abilities.iter())
            .chain(self.allies.values().flat_map(|a| a.abilities.iter()))
        {
            effect_lists.push(&ability.effects);
        }
        for item in self.items.values() {
            effect_lists.push(&item.effects);
        }
        for effect in effect_lists.into_iter().flatten() {
            match effect {
                Effect::AddCardToDraw { card_id, .. } | Effect::AddCardToDiscard { card_id, .. } => {
                    self.card(card_id)?;
                }
                _ => {}
            }
        }

        for event in self.events.values() {
            for outcome in event.choices.iter().flat_map(|c| c.outcomes.iter()) {
                match outcome {
                    EventOutcome::AddCard { card_id } => {
                        self.card(card_id)?;
                    }
                    EventOutcome::GainRelic { relic_id } => {
                        self.relic(relic_id)?;
                    }
                    EventOutcome::GainItem { item_id } => {
                        self.item(item_id)?;
                    }
                    EventOutcome::GainAlly { ally_id } => {
                        self.ally(ally_id)?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Look up a card definition.
    pub fn card(&self, id: &str) -> Result<&CardDef> {
        self.cards
            .get(id)
            .ok_or_else(|| EngineError::UnknownCard(id.to_string()))
    }

    /// Look up an enemy definition.
    pub fn enemy(&self, id: &str) -> Result<&EnemyDef> {
        self.enemies
            .get(id)
            .ok_or_else(|| EngineError::UnknownEnemy(id.to_string()))
    }

    /// Look up an enemy pack.
    pub fn pack(&self, id: &str) -> Result<&EnemyPack> {
        self.packs
            .get(id)
            .ok_or_else(|| EngineError::UnknownPack(id.to_string()))
    }

    /// Look up an ally definition.
    pub fn ally(&self, id: &str) -> Result<&AllyDef> {
        self.allies
            .get(id)
            .ok_or_else(|| EngineError::UnknownAlly(id.to_string()))
    }

    /// Look up a relic definition.
    pub fn relic(&self, id: &str) -> Result<&RelicDef> {
        self.relics
            .get(id)
            .ok_or_else(|| EngineError::UnknownRelic(id.to_string()))
    }

    /// Look up an item definition.
    pub fn item(&self, id: &str) -> Result<&ItemDef> {
        self.items
            .get(id)
            .ok_or_else(|| EngineError::UnknownItem(id.to_string()))
    }

    /// Look up an event definition.
    pub fn event(&self, id: &str) -> Result<&EventDef> {
        self.events
            .get(id)
            .ok_or_else(|| EngineError::UnknownEvent(id.to_string()))
    }

    /// All cards in id order.
    pub fn cards(&self) -> impl Iterator<Item = &CardDef> {
        self.cards.values()
    }

    /// All packs in id order.
    pub fn packs(&self) -> impl Iterator<Item = &EnemyPack> {
        self.packs.values()
    }

    /// All relics in id order.
    pub fn relics(&self) -> impl Iterator<Item = &RelicDef> {
        self.relics.values()
    }

    /// All items in id order.
    pub fn items(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.values()
    }

    /// All event ids in order.
    pub fn event_ids(&self) -> Vec<String> {
        self.events.keys().cloned().collect()
    }

    /// Boss enemy id for a floor (1-based). Floors past the table reuse
    /// the last boss.
    pub fn boss_for_floor(&self, floor: u32) -> Result<&str> {
        let idx = (floor.max(1) as usize - 1).min(self.boss_ids.len().saturating_sub(1));
        self.boss_ids
            .get(idx)
            .map(String::as_str)
            .ok_or(EngineError::EmptyPool("boss_ids"))
    }

    /// Card ids of a fresh run's deck.
    pub fn starter_deck(&self) -> &[String] {
        &self.starter_deck
    }

    /// Fold passive bonuses of owned relics.
    pub fn relic_bonuses(&self, relic_ids: &[String]) -> Result<RelicBonuses> {
        let defs = relic_ids
            .iter()
            .map(|id| self.relic(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(RelicBonuses::from_relics(defs))
    }
}
