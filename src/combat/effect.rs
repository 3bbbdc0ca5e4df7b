//! Effect, target and buff sum types.
//!
//! Card, ability and item effects are closed enums; every consumer matches
//! them exhaustively.

use serde::{Deserialize, Serialize};

// =============================================================================
// BUFF KIND
// =============================================================================

/// Status effect kinds carried by any combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuffKind {
    /// Outgoing attack damage x0.75
    Weak,
    /// Incoming attack damage x1.5
    Vulnerable,
    /// Loses HP equal to stacks each round, then decays by one
    Poison,
    /// Loses HP equal to stacks each round for its duration, no decay
    Bleed,
    /// Retaliates against attackers for stacks damage
    Thorns,
    /// Heals stacks each round, then decays by one
    Regeneration,
    /// Gains stacks strength each round
    Ritual,
}

impl BuffKind {
    /// Debuffs are harmful to their holder.
    pub fn is_debuff(self) -> bool {
        matches!(
            self,
            BuffKind::Weak | BuffKind::Vulnerable | BuffKind::Poison | BuffKind::Bleed
        )
    }

    /// Display name.
    pub fn as_str(self) -> &'static str {
        match self {
            BuffKind::Weak => "Weak",
            BuffKind::Vulnerable => "Vulnerable",
            BuffKind::Poison => "Poison",
            BuffKind::Bleed => "Bleed",
            BuffKind::Thorns => "Thorns",
            BuffKind::Regeneration => "Regeneration",
            BuffKind::Ritual => "Ritual",
        }
    }
}

// =============================================================================
// INK POWERS AND DISRUPTION
// =============================================================================

/// Once-per-turn powers paid for with ink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InkPower {
    /// Return a chosen card from discard to hand
    Retrieve,
    /// Draw extra cards
    Draw,
    /// Gain block
    Ward,
}

/// Per-turn disruption an enemy can place on the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DisruptionKind {
    /// The next `count` cards drawn enter hand frozen
    FreezeDraws { count: u32 },
    /// The next `count` cards drawn go straight to discard
    DiscardDraws { count: u32 },
    /// Cards cost `amount` more energy next turn
    ExtraCost { amount: i32 },
    /// The given ink power cannot be used next turn
    DisablePower { power: InkPower },
    /// Ink cannot be gained next turn
    LockInk,
}

// =============================================================================
// EFFECT
// =============================================================================

/// A single step of a card, ability or item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Effect {
    /// Attack damage, modified by strength, Weak and Vulnerable
    Damage { value: i32 },
    /// Block, plus focus when the recipient is the player
    Block { value: i32 },
    /// Restore HP up to max
    Heal { value: i32 },
    /// Player draws cards
    DrawCards { count: u32 },
    /// Player gains energy
    GainEnergy { value: i32 },
    /// Player gains ink, capped at max ink
    GainInk { value: i32 },
    /// Recipient gains strength
    GainStrength { value: i32 },
    /// Player gains focus
    GainFocus { value: i32 },
    /// Buff on the friendly recipient
    ApplyBuff {
        buff: BuffKind,
        stacks: i32,
        #[serde(default)]
        duration: Option<u32>,
    },
    /// Debuff on the hostile target
    ApplyDebuff {
        buff: BuffKind,
        stacks: i32,
        #[serde(default)]
        duration: Option<u32>,
    },
    /// Player loses ink
    DrainInk { value: i32 },
    /// The played card is exhausted instead of discarded
    Exhaust,
    /// Shuffle copies of a card into the draw pile
    AddCardToDraw {
        card_id: String,
        #[serde(default = "one")]
        count: u32,
    },
    /// Put copies of a card into the discard pile
    AddCardToDiscard {
        card_id: String,
        #[serde(default = "one")]
        count: u32,
    },
    /// Disrupt the player's next turn
    Disrupt { disruption: DisruptionKind },
}

fn one() -> u32 {
    1
}

/// Generic scaling boost: `max(floor(v * 1.5), v + 1)`.
///
/// Values at or below zero are returned unchanged.
pub fn scale_boost(value: i32) -> i32 {
    if value <= 0 {
        return value;
    }
    (value.saturating_mul(3) / 2).max(value.saturating_add(1))
}

impl Effect {
    /// Effects that only act on a hostile target.
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            Effect::Damage { .. }
                | Effect::ApplyDebuff { .. }
                | Effect::DrainInk { .. }
                | Effect::Disrupt { .. }
        )
    }

    /// Apply the generic upgrade boost to this effect.
    pub fn boosted(&self) -> Effect {
        match self {
            Effect::Damage { value } => Effect::Damage { value: scale_boost(*value) },
            Effect::Block { value } => Effect::Block { value: scale_boost(*value) },
            Effect::Heal { value } => Effect::Heal { value: scale_boost(*value) },
            Effect::GainInk { value } => Effect::GainInk { value: scale_boost(*value) },
            Effect::DrawCards { count } => Effect::DrawCards { count: count + 1 },
            Effect::GainEnergy { value } => Effect::GainEnergy { value: value + 1 },
            Effect::GainStrength { value } => Effect::GainStrength { value: value + 1 },
            Effect::GainFocus { value } => Effect::GainFocus { value: value + 1 },
            Effect::ApplyBuff { buff, stacks, duration } => Effect::ApplyBuff {
                buff: *buff,
                stacks: stacks + 1,
                duration: *duration,
            },
            Effect::ApplyDebuff { buff, stacks, duration } => Effect::ApplyDebuff {
                buff: *buff,
                stacks: stacks + 1,
                duration: *duration,
            },
            Effect::DrainInk { .. }
            | Effect::Exhaust
            | Effect::AddCardToDraw { .. }
            | Effect::AddCardToDiscard { .. }
            | Effect::Disrupt { .. } => self.clone(),
        }
    }

    /// Human-readable sentence for this effect when played at `target`.
    pub fn describe(&self, target: TargetMode) -> String {
        let hostile_scope = match target {
            TargetMode::AllEnemies => " to ALL enemies",
            _ => "",
        };
        match self {
            Effect::Damage { value } => format!("Deal {value} damage{hostile_scope}."),
            Effect::Block { value } => format!("Gain {value} Block."),
            Effect::Heal { value } => format!("Heal {value} HP."),
            Effect::DrawCards { count } if *count == 1 => "Draw 1 card.".to_string(),
            Effect::DrawCards { count } => format!("Draw {count} cards."),
            Effect::GainEnergy { value } => format!("Gain {value} Energy."),
            Effect::GainInk { value } => format!("Gain {value} Ink."),
            Effect::GainStrength { value } => format!("Gain {value} Strength."),
            Effect::GainFocus { value } => format!("Gain {value} Focus."),
            Effect::ApplyBuff { buff, stacks, duration } => {
                format!("Gain {stacks} {}{}.", buff.as_str(), describe_duration(*duration))
            }
            Effect::ApplyDebuff { buff, stacks, duration } => {
                format!("Apply {stacks} {}{hostile_scope}{}.", buff.as_str(), describe_duration(*duration))
            }
            Effect::DrainInk { value } => format!("Drain {value} Ink."),
            Effect::Exhaust => "Exhaust.".to_string(),
            Effect::AddCardToDraw { card_id, count } => {
                format!("Shuffle {count} {card_id} into the draw pile.")
            }
            Effect::AddCardToDiscard { card_id, count } => {
                format!("Add {count} {card_id} to the discard pile.")
            }
            Effect::Disrupt { disruption } => match disruption {
                DisruptionKind::FreezeDraws { count } => {
                    format!("Freeze the next {count} cards drawn.")
                }
                DisruptionKind::DiscardDraws { count } => {
                    format!("Discard the next {count} cards drawn.")
                }
                DisruptionKind::ExtraCost { amount } => {
                    format!("Cards cost {amount} more next turn.")
                }
                DisruptionKind::DisablePower { power } => {
                    format!("Disable the {power:?} ink power next turn.")
                }
                DisruptionKind::LockInk => "Ink cannot be gained next turn.".to_string(),
            },
        }
    }
}

fn describe_duration(duration: Option<u32>) -> String {
    match duration {
        Some(1) => " for 1 turn".to_string(),
        Some(turns) => format!(" for {turns} turns"),
        None => String::new(),
    }
}

/// Join the sentences of an effect list played at `target`.
pub fn describe_effects(effects: &[Effect], target: TargetMode) -> String {
    effects
        .iter()
        .map(|effect| effect.describe(target))
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// UNITS AND TARGETS
// =============================================================================

/// Reference to one combatant in a combat.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "side", content = "id")]
pub enum UnitRef {
    /// The player
    Player,
    /// An ally by instance id
    Ally(String),
    /// An enemy by instance id
    Enemy(String),
}

impl UnitRef {
    /// Player and allies are on the same side.
    pub fn is_friendly_side(&self) -> bool {
        matches!(self, UnitRef::Player | UnitRef::Ally(_))
    }
}

/// Target selector of an effect list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum Target {
    /// The player
    Player,
    /// Every living enemy
    AllEnemies,
    /// Every living ally
    AllAllies,
    /// One enemy by instance id
    Enemy(String),
    /// One ally by instance id
    Ally(String),
}

impl Target {
    /// Whether this target is on the same side as `source`.
    pub fn is_friendly_to(&self, source: &UnitRef) -> bool {
        let target_friendly_side = matches!(self, Target::Player | Target::AllAllies | Target::Ally(_));
        target_friendly_side == source.is_friendly_side()
    }
}

/// How a card, ability or item picks its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    /// One chosen enemy
    SingleEnemy,
    /// Every enemy
    AllEnemies,
    /// The player
    Player,
    /// One chosen ally
    SingleAlly,
    /// Every ally
    AllAllies,
}
