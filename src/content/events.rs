//! Special-room event definitions.

use serde::{Deserialize, Serialize};

/// One consequence of an event choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventOutcome {
    GainGold { amount: u32 },
    /// The choice is unavailable when the run cannot pay
    LoseGold { amount: u32 },
    Heal { amount: i32 },
    /// Never drops HP below 1
    LoseHp { amount: i32 },
    GainMaxHp { amount: i32 },
    AddCard { card_id: String },
    UpgradeRandomCard,
    RemoveRandomCard,
    GainRelic { relic_id: String },
    GainRandomRelic,
    GainItem { item_id: String },
    GainAlly { ally_id: String },
}

/// A selectable option of an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChoice {
    pub label: String,
    pub outcomes: Vec<EventOutcome>,
}

impl EventChoice {
    /// Gold the run must hold to pick this choice.
    pub fn gold_required(&self) -> u32 {
        self.outcomes
            .iter()
            .map(|o| match o {
                EventOutcome::LoseGold { amount } => *amount,
                _ => 0,
            })
            .sum()
    }
}

/// Immutable event definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDef {
    pub id: String,
    pub name: String,
    pub choices: Vec<EventChoice>,
}
