//! Damage & block calculator.
//!
//! Pure integer arithmetic. The modifier order is fixed: strength, then
//! Weak, then Vulnerable, then clamp.

use crate::combat::buffs::stacks_of;
use crate::combat::effect::BuffKind;
use crate::combat::unit::{Buff, Combatant};

/// Final attack damage.
///
/// `base + strength` -> Weak x0.75 (floor) -> Vulnerable x1.5 (floor) -> max 0.
pub fn calculate_damage(
    base: i32,
    attacker_strength: i32,
    attacker_buffs: &[Buff],
    target_buffs: &[Buff],
) -> i32 {
    let mut damage = base.saturating_add(attacker_strength);
    if stacks_of(attacker_buffs, BuffKind::Weak) > 0 {
        damage = (damage.saturating_mul(3)).div_euclid(4);
    }
    if stacks_of(target_buffs, BuffKind::Vulnerable) > 0 {
        damage = (damage.saturating_mul(3)).div_euclid(2);
    }
    damage.max(0)
}

/// Scale a value by a percentage, flooring.
#[inline]
pub fn scale_percent(value: i32, percent: u32) -> i32 {
    ((value as i64 * percent as i64).div_euclid(100)) as i32
}

/// Result of applying a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageOutcome {
    /// HP after the hit, never below 0
    pub hp: i32,
    /// Block after the hit
    pub block: i32,
    /// Damage beyond what was needed to reach 0 HP
    pub overkill: i32,
    /// Damage soaked by block
    pub blocked: i32,
    /// HP actually lost
    pub hp_lost: i32,
}

/// Block absorbs first 1:1, the remainder reduces HP.
pub fn apply_damage(hp: i32, block: i32, damage: i32) -> DamageOutcome {
    let damage = damage.max(0);
    let block = block.max(0);
    let blocked = block.min(damage);
    let remainder = damage - blocked;
    let raw_hp = hp - remainder;
    DamageOutcome {
        hp: raw_hp.max(0),
        block: block - blocked,
        overkill: (-raw_hp).max(0),
        blocked,
        hp_lost: hp.max(0) - raw_hp.max(0),
    }
}

/// Apply a hit to a combatant. Returns the outcome.
pub fn hit(unit: &mut Combatant, damage: i32) -> DamageOutcome {
    let outcome = apply_damage(unit.hp, unit.block, damage);
    unit.hp = outcome.hp;
    unit.block = outcome.block;
    outcome
}

/// HP loss that bypasses block. Returns HP lost.
pub fn apply_hp_loss(unit: &mut Combatant, amount: i32) -> i32 {
    if amount <= 0 {
        return 0;
    }
    let before = unit.hp;
    unit.hp = (unit.hp - amount).max(0);
    before - unit.hp
}

/// New block value: `current + amount + focus`, never below `current`.
#[inline]
pub fn apply_block(current: i32, amount: i32, focus: i32) -> i32 {
    current + amount.saturating_add(focus).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::buffs::apply_buff;
    use proptest::prelude::*;

    fn with(kind: BuffKind) -> Vec<Buff> {
        let mut list = Vec::new();
        apply_buff(&mut list, kind, 1, Some(2));
        list
    }

    #[test]
    fn test_strike_vs_vulnerable() {
        assert_eq!(calculate_damage(6, 0, &[], &with(BuffKind::Vulnerable)), 9);
    }

    #[test]
    fn test_weak_attacker() {
        assert_eq!(calculate_damage(8, 0, &with(BuffKind::Weak), &[]), 6);
    }

    #[test]
    fn test_modifier_order() {
        // (5 + 2) = 7 -> weak floor(5.25) = 5 -> vulnerable floor(7.5) = 7
        let damage = calculate_damage(5, 2, &with(BuffKind::Weak), &with(BuffKind::Vulnerable));
        assert_eq!(damage, 7);
    }

    #[test]
    fn test_negative_strength_clamps_to_zero() {
        assert_eq!(calculate_damage(3, -10, &[], &with(BuffKind::Vulnerable)), 0);
    }

    #[test]
    fn test_apply_damage_block_then_hp() {
        let outcome = apply_damage(20, 5, 8);
        assert_eq!(outcome.block, 0);
        assert_eq!(outcome.hp, 17);
        assert_eq!(outcome.blocked, 5);
        assert_eq!(outcome.hp_lost, 3);
        assert_eq!(outcome.overkill, 0);
    }

    #[test]
    fn test_apply_damage_overkill() {
        let outcome = apply_damage(4, 1, 10);
        assert_eq!(outcome.hp, 0);
        assert_eq!(outcome.overkill, 5);
    }

    #[test]
    fn test_fully_absorbed() {
        let outcome = apply_damage(10, 12, 7);
        assert_eq!(outcome.hp, 10);
        assert_eq!(outcome.block, 5);
        assert_eq!(outcome.hp_lost, 0);
    }

    #[test]
    fn test_apply_block_with_focus() {
        assert_eq!(apply_block(3, 5, 2), 10);
        assert_eq!(apply_block(3, 1, -4), 3);
    }

    #[test]
    fn test_scale_percent_floors() {
        assert_eq!(scale_percent(7, 150), 10);
        assert_eq!(scale_percent(10, 100), 10);
        assert_eq!(scale_percent(9, 110), 9);
    }

    proptest! {
        #[test]
        fn prop_block_conservation(hp in 0i32..500, block in 0i32..200, damage in 0i32..800) {
            let outcome = apply_damage(hp, block, damage);
            prop_assert_eq!(outcome.overkill, (damage - block - hp).max(0));
            prop_assert_eq!(outcome.block, block - block.min(damage));
            prop_assert_eq!(outcome.blocked + outcome.hp_lost + outcome.overkill, damage);
        }

        #[test]
        fn prop_damage_never_negative(base in -50i32..50, strength in -20i32..20) {
            let d = calculate_damage(base, strength, &with(BuffKind::Weak), &with(BuffKind::Vulnerable));
            prop_assert!(d >= 0);
        }
    }
}
