//! Combatant state.
//!
//! Player, allies and enemies share the [`Combatant`] shape. The player adds
//! resources; allies and enemies add an ability cycle.

use serde::{Deserialize, Serialize};

use crate::combat::buffs::stacks_of;
use crate::combat::effect::BuffKind;
use crate::content::AbilityDef;

/// One status entry. At most one per kind per combatant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    /// Status kind
    pub kind: BuffKind,
    /// Stack count
    pub stacks: i32,
    /// Remaining rounds, `None` = permanent until removed
    pub duration: Option<u32>,
}

/// Shared combatant shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Instance id, unique within the combat
    pub id: String,
    /// Display name
    pub name: String,
    /// Current HP, never below 0
    pub hp: i32,
    /// Maximum HP
    pub max_hp: i32,
    /// Current block
    pub block: i32,
    /// Flat damage bonus on attacks
    pub strength: i32,
    /// Active statuses
    pub buffs: Vec<Buff>,
}

impl Combatant {
    /// Create a combatant at full health.
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hp: max_hp,
            max_hp,
            block: 0,
            strength: 0,
            buffs: Vec::new(),
        }
    }

    /// Still in the fight?
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Stacks of a status, 0 if absent.
    #[inline]
    pub fn stacks(&self, kind: BuffKind) -> i32 {
        stacks_of(&self.buffs, kind)
    }

    /// Has at least one stack of a status?
    #[inline]
    pub fn has(&self, kind: BuffKind) -> bool {
        self.stacks(kind) > 0
    }

    /// Restore HP up to max. Returns HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 || !self.is_alive() {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }
}

/// The player in combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Shared combatant data
    pub unit: Combatant,
    /// Energy left this turn
    pub energy: i32,
    /// Energy restored each turn
    pub max_energy: i32,
    /// Ink left this combat
    pub ink: i32,
    /// Ink cap
    pub max_ink: i32,
    /// Cards drawn each turn
    pub draw_count: u32,
    /// Bonus block on every block gain
    pub focus: i32,
    /// Percent chance to gain 1 ink per card played
    pub ink_per_card_chance: u32,
}

/// An enemy or ally in combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorState {
    /// Shared combatant data
    pub unit: Combatant,
    /// Definition this actor was built from
    pub def_id: String,
    /// Turn order, higher acts first
    pub speed: i32,
    /// Ability cycle
    pub abilities: Vec<AbilityDef>,
    /// Index of the next ability
    pub intent_index: usize,
}

impl ActorState {
    /// The ability this actor will use next.
    pub fn current_ability(&self) -> Option<&AbilityDef> {
        self.abilities.get(self.intent_index)
    }

    /// Move the cycle forward by one.
    pub fn advance_intent(&mut self) {
        if self.abilities.is_empty() {
            self.intent_index = 0;
        } else {
            self.intent_index = (self.intent_index + 1) % self.abilities.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::effect::Effect;

    #[test]
    fn test_heal_caps_at_max() {
        let mut unit = Combatant::new("p", "Player", 50);
        unit.hp = 45;
        assert_eq!(unit.heal(10), 5);
        assert_eq!(unit.hp, 50);
    }

    #[test]
    fn test_dead_units_do_not_heal() {
        let mut unit = Combatant::new("e", "Enemy", 10);
        unit.hp = 0;
        assert_eq!(unit.heal(5), 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn test_intent_cycles_round_robin() {
        let ability = |name: &str| AbilityDef {
            name: name.to_string(),
            effects: vec![Effect::Damage { value: 1 }],
            target: None,
        };
        let mut actor = ActorState {
            unit: Combatant::new("e-0", "Enemy", 10),
            def_id: "e".into(),
            speed: 1,
            abilities: vec![ability("a"), ability("b"), ability("c")],
            intent_index: 0,
        };

        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(actor.current_ability().map(|a| a.name.clone()).unwrap_or_default());
            actor.advance_intent();
        }
        assert_eq!(seen, ["a", "b", "c", "a", "b"]);
    }
}
