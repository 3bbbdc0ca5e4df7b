//! Effect resolver.
//!
//! Interprets an ordered effect list against a `{source, target}` context.
//! Recipient routing:
//!
//! - hostile effects (Damage, ApplyDebuff, DrainInk, Disrupt) land on the target
//! - supportive effects (Block, Heal, GainStrength, ApplyBuff) land on the
//!   target when it is on the source's side, else on the source
//! - player resources (DrawCards, GainEnergy, GainInk, GainFocus, AddCardTo*)
//!   always belong to the player
//!
//! Dead or missing recipients are skipped.

use tracing::{debug, trace};

use crate::combat::buffs::apply_buff;
use crate::combat::damage::{apply_block, apply_hp_loss, calculate_damage, hit, scale_percent};
use crate::combat::effect::{BuffKind, Effect, Target, UnitRef};
use crate::combat::piles::{DrawReason, DrawSource};
use crate::combat::state::CombatState;
use crate::combat::unit::Buff;
use crate::content::CardInstance;

/// Who is acting and at whom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectContext {
    pub source: UnitRef,
    pub target: Target,
}

impl EffectContext {
    pub fn new(source: UnitRef, target: Target) -> Self {
        Self { source, target }
    }

    fn enemy_attacks_player(&self) -> bool {
        matches!(self.source, UnitRef::Enemy(_)) && self.target == Target::Player
    }
}

/// Totals of one resolved list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Damage dealt after modifiers, before block
    pub damage: i32,
    /// HP lost by recipients of Damage effects
    pub hp_lost: i32,
    /// Effects skipped because the preceding hit did not land
    pub skipped: u32,
}

/// Resolve `effects` in order.
pub fn resolve_effects(state: &mut CombatState, effects: &[Effect], ctx: &EffectContext) -> ResolveSummary {
    let mut summary = ResolveSummary::default();
    // Most recent Damage of an enemy on the player was fully absorbed
    let mut last_hit_absorbed = false;

    for effect in effects {
        match effect {
            Effect::Damage { value } => {
                let mut landed = false;
                for recipient in state.living_units(&ctx.target) {
                    let (dealt, lost) = deal_damage(state, &ctx.source, &recipient, *value);
                    summary.damage += dealt;
                    summary.hp_lost += lost;
                    landed |= lost > 0;
                }
                if ctx.enemy_attacks_player() {
                    last_hit_absorbed = !landed;
                }
            }
            Effect::ApplyDebuff { .. } | Effect::DrainInk { .. }
                if ctx.enemy_attacks_player() && last_hit_absorbed =>
            {
                trace!(?effect, "secondary effect skipped, hit was absorbed");
                summary.skipped += 1;
            }
            Effect::Block { value } => {
                for recipient in supportive_recipients(state, ctx) {
                    let focus = if recipient == UnitRef::Player {
                        state.player.focus
                    } else {
                        0
                    };
                    if let Some(unit) = state.unit_mut(&recipient) {
                        unit.block = apply_block(unit.block, *value, focus);
                    }
                }
            }
            Effect::Heal { value } => {
                for recipient in supportive_recipients(state, ctx) {
                    if let Some(unit) = state.unit_mut(&recipient) {
                        unit.heal(*value);
                    }
                }
            }
            Effect::GainStrength { value } => {
                for recipient in supportive_recipients(state, ctx) {
                    if let Some(unit) = state.unit_mut(&recipient) {
                        unit.strength += value;
                    }
                }
            }
            Effect::ApplyBuff { buff, stacks, duration } => {
                for recipient in supportive_recipients(state, ctx) {
                    if let Some(unit) = state.unit_mut(&recipient) {
                        apply_buff(&mut unit.buffs, *buff, *stacks, *duration);
                    }
                }
            }
            Effect::ApplyDebuff { buff, stacks, duration } => {
                for recipient in state.living_units(&ctx.target) {
                    if let Some(unit) = state.unit_mut(&recipient) {
                        apply_buff(&mut unit.buffs, *buff, *stacks, *duration);
                    }
                }
            }
            Effect::DrainInk { value } => {
                if state.living_units(&ctx.target).contains(&UnitRef::Player) {
                    state.player.ink = (state.player.ink - value).max(0);
                }
            }
            Effect::Disrupt { disruption } => {
                if state.living_units(&ctx.target).contains(&UnitRef::Player) {
                    state.disruption.apply(disruption);
                }
            }
            Effect::DrawCards { count } => {
                let (source, reason) = match ctx.source {
                    UnitRef::Player => (DrawSource::Player, DrawReason::CardEffect),
                    _ => (DrawSource::System, DrawReason::EnemyEffect),
                };
                state.draw_cards(*count, source, reason);
            }
            Effect::GainEnergy { value } => state.player.energy += value,
            Effect::GainInk { value } => state.gain_ink(*value),
            Effect::GainFocus { value } => state.player.focus += value,
            Effect::Exhaust => {}
            Effect::AddCardToDraw { card_id, count } => {
                for _ in 0..*count {
                    let card = generated_card(state, card_id);
                    state.piles.shuffle_into_draw(card, &mut state.rng);
                }
            }
            Effect::AddCardToDiscard { card_id, count } => {
                for _ in 0..*count {
                    let card = generated_card(state, card_id);
                    state.piles.add_to_discard(card);
                }
            }
        }
    }
    summary
}

fn supportive_recipients(state: &CombatState, ctx: &EffectContext) -> Vec<UnitRef> {
    if ctx.target.is_friendly_to(&ctx.source) {
        state.living_units(&ctx.target)
    } else if state.unit(&ctx.source).is_some_and(|u| u.is_alive()) {
        vec![ctx.source.clone()]
    } else {
        Vec::new()
    }
}

fn generated_card(state: &mut CombatState, card_id: &str) -> CardInstance {
    state.next_card_serial += 1;
    CardInstance::new(format!("gen-{}", state.next_card_serial), card_id)
}

/// One hit of `base` damage from `source` on `recipient`.
///
/// Returns (damage before block, HP lost).
fn deal_damage(state: &mut CombatState, source: &UnitRef, recipient: &UnitRef, base: i32) -> (i32, i32) {
    let (strength, attacker_buffs): (i32, Vec<Buff>) = match state.unit(source) {
        Some(unit) => (unit.strength, unit.buffs.clone()),
        None => (0, Vec::new()),
    };
    let Some(target) = state.unit(recipient) else {
        return (0, 0);
    };
    if !target.is_alive() {
        return (0, 0);
    }

    let base = if matches!(source, UnitRef::Enemy(_)) {
        scale_percent(base, state.enemy_damage_scale)
    } else {
        base
    };
    let mut damage = calculate_damage(base, strength, &attacker_buffs, &target.buffs);
    let target_block = target.block;
    let thorns = target.stacks(BuffKind::Thorns);

    // First connecting enemy hit on the player is softened once per combat
    if matches!(source, UnitRef::Enemy(_)) && *recipient == UnitRef::Player && damage > target_block {
        if let Some(percent) = state.first_hit_reduction.take() {
            let reduction = scale_percent(damage, percent);
            debug!(damage, reduction, "first hit reduced");
            damage -= reduction;
        }
    }

    let Some(target) = state.unit_mut(recipient) else {
        return (0, 0);
    };
    let outcome = hit(target, damage);

    if damage > 0 && thorns > 0 && source != recipient {
        if let Some(attacker) = state.unit_mut(source) {
            let lost = apply_hp_loss(attacker, thorns);
            trace!(lost, "thorns retaliation");
        }
    }
    (damage, outcome.hp_lost)
}
