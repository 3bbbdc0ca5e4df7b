//! Buff/debuff ledger.
//!
//! Stack-and-duration bookkeeping. A list holds at most one entry per kind;
//! applying an existing kind merges into it.

use crate::combat::damage::apply_hp_loss;
use crate::combat::effect::BuffKind;
use crate::combat::unit::{Buff, Combatant};

/// Stacks of `kind` in `list`, 0 if absent.
pub fn stacks_of(list: &[Buff], kind: BuffKind) -> i32 {
    list.iter()
        .find(|b| b.kind == kind)
        .map(|b| b.stacks)
        .unwrap_or(0)
}

/// Merge `stacks` of `kind` into the list.
///
/// Existing entry: stacks add, duration is replaced when one is given.
/// Entries whose stacks fall to zero or below are removed.
pub fn apply_buff(list: &mut Vec<Buff>, kind: BuffKind, stacks: i32, duration: Option<u32>) {
    if let Some(existing) = list.iter_mut().find(|b| b.kind == kind) {
        existing.stacks = existing.stacks.saturating_add(stacks);
        if duration.is_some() {
            existing.duration = duration;
        }
    } else {
        if stacks <= 0 {
            return;
        }
        list.push(Buff { kind, stacks, duration });
    }
    list.retain(|b| b.stacks > 0);
}

/// Remove an entry outright.
pub fn remove_buff(list: &mut Vec<Buff>, kind: BuffKind) {
    list.retain(|b| b.kind != kind);
}

/// Decrement every defined duration, dropping entries that reach zero.
/// Permanent entries are untouched.
pub fn tick_buffs(list: &mut Vec<Buff>) {
    for buff in list.iter_mut() {
        if let Some(turns) = buff.duration.as_mut() {
            *turns = turns.saturating_sub(1);
        }
    }
    list.retain(|b| b.duration != Some(0));
}

/// Lose HP equal to poison stacks, then decay poison by one.
///
/// Returns HP lost.
pub fn apply_poison(unit: &mut Combatant) -> i32 {
    let stacks = unit.stacks(BuffKind::Poison);
    if stacks <= 0 {
        return 0;
    }
    let lost = apply_hp_loss(unit, stacks);
    apply_buff(&mut unit.buffs, BuffKind::Poison, -1, None);
    lost
}

/// Lose HP equal to bleed stacks. Bleed never decays; its duration
/// expires it through [`tick_buffs`].
pub fn apply_bleed(unit: &mut Combatant) -> i32 {
    let stacks = unit.stacks(BuffKind::Bleed);
    if stacks <= 0 {
        return 0;
    }
    apply_hp_loss(unit, stacks)
}

/// Heal regeneration stacks, then decay by one.
pub fn apply_regeneration(unit: &mut Combatant) -> i32 {
    let stacks = unit.stacks(BuffKind::Regeneration);
    if stacks <= 0 {
        return 0;
    }
    let healed = unit.heal(stacks);
    apply_buff(&mut unit.buffs, BuffKind::Regeneration, -1, None);
    healed
}

/// Gain strength equal to ritual stacks.
pub fn apply_ritual(unit: &mut Combatant) {
    let stacks = unit.stacks(BuffKind::Ritual);
    if stacks > 0 {
        unit.strength += stacks;
    }
}

/// What happened to one combatant at end of round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundEndReport {
    pub poison: i32,
    pub bleed: i32,
    pub regenerated: i32,
}

/// End-of-round pass for one combatant: damage-over-time, regeneration,
/// ritual, then duration tick.
pub fn end_of_round(unit: &mut Combatant) -> RoundEndReport {
    if !unit.is_alive() {
        return RoundEndReport::default();
    }
    let poison = apply_poison(unit);
    let bleed = apply_bleed(unit);
    let regenerated = apply_regeneration(unit);
    apply_ritual(unit);
    tick_buffs(&mut unit.buffs);
    RoundEndReport { poison, bleed, regenerated }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_with(kind: BuffKind, stacks: i32, duration: Option<u32>) -> Combatant {
        let mut unit = Combatant::new("u", "Unit", 100);
        apply_buff(&mut unit.buffs, kind, stacks, duration);
        unit
    }

    #[test]
    fn test_apply_merges_into_single_entry() {
        let mut list = Vec::new();
        apply_buff(&mut list, BuffKind::Weak, 1, Some(2));
        apply_buff(&mut list, BuffKind::Weak, 2, None);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].stacks, 3);
        assert_eq!(list[0].duration, Some(2), "duration kept when none given");

        apply_buff(&mut list, BuffKind::Weak, 1, Some(5));
        assert_eq!(list[0].duration, Some(5), "duration replaced when given");
    }

    #[test]
    fn test_tick_drops_expired_keeps_permanent() {
        let mut list = Vec::new();
        apply_buff(&mut list, BuffKind::Vulnerable, 1, Some(1));
        apply_buff(&mut list, BuffKind::Thorns, 3, None);
        tick_buffs(&mut list);
        assert_eq!(stacks_of(&list, BuffKind::Vulnerable), 0);
        assert_eq!(stacks_of(&list, BuffKind::Thorns), 3);
        tick_buffs(&mut list);
        assert_eq!(stacks_of(&list, BuffKind::Thorns), 3);
    }

    #[test]
    fn test_poison_decays() {
        let mut unit = unit_with(BuffKind::Poison, 4, None);
        let mut dealt = Vec::new();
        for _ in 0..6 {
            dealt.push(apply_poison(&mut unit));
        }
        assert_eq!(dealt, [4, 3, 2, 1, 0, 0]);
        assert_eq!(unit.hp, 90);
        assert!(!unit.has(BuffKind::Poison));
    }

    #[test]
    fn test_bleed_does_not_decay() {
        let mut unit = unit_with(BuffKind::Bleed, 3, Some(2));
        for _ in 0..2 {
            assert_eq!(apply_bleed(&mut unit), 3);
            assert!(unit.stacks(BuffKind::Bleed) == 3 || unit.buffs.is_empty());
            tick_buffs(&mut unit.buffs);
        }
        assert_eq!(unit.hp, 94);
        assert!(!unit.has(BuffKind::Bleed));
    }

    #[test]
    fn test_poison_ignores_block() {
        let mut unit = unit_with(BuffKind::Poison, 5, None);
        unit.block = 20;
        apply_poison(&mut unit);
        assert_eq!(unit.hp, 95);
        assert_eq!(unit.block, 20);
    }

    #[test]
    fn test_end_of_round_ritual_and_regen() {
        let mut unit = unit_with(BuffKind::Ritual, 2, None);
        unit.hp = 50;
        apply_buff(&mut unit.buffs, BuffKind::Regeneration, 3, None);
        let report = end_of_round(&mut unit);
        assert_eq!(report.regenerated, 3);
        assert_eq!(unit.strength, 2);
        assert_eq!(unit.stacks(BuffKind::Regeneration), 2);
        end_of_round(&mut unit);
        assert_eq!(unit.strength, 4);
    }

    #[test]
    fn test_negative_stacks_never_create_entries() {
        let mut list = Vec::new();
        apply_buff(&mut list, BuffKind::Poison, -2, None);
        assert!(list.is_empty());
    }
}
