//! Card and item play: validation and execution.
//!
//! Validators never mutate. Executors re-validate and leave the state
//! untouched when the play is illegal, so callers may fire speculative
//! actions safely.

use tracing::debug;

use crate::combat::effect::{Target, TargetMode, UnitRef};
use crate::combat::resolver::{resolve_effects, EffectContext};
use crate::combat::state::{check_combat_end, CombatPhase, CombatState};
use crate::content::{CardDef, Catalog, ItemDef};
use crate::error::Result;

/// Energy a play would cost, including disruption surcharge.
fn total_energy(base: i32, state: &CombatState) -> i32 {
    (base + state.disruption.extra_cost).max(0)
}

fn playable_def<'a>(state: &CombatState, catalog: &'a Catalog, instance_id: &str) -> Result<Option<(&'a CardDef, bool)>> {
    if state.phase != CombatPhase::PlayerTurn {
        return Ok(None);
    }
    let Some(card) = state.piles.in_hand(instance_id) else {
        return Ok(None);
    };
    let def = catalog.card(&card.card_id)?;
    if !def.category.is_playable() || state.disruption.is_frozen(instance_id) {
        return Ok(None);
    }
    Ok(Some((def, card.upgraded)))
}

/// Can the base side of this hand card be played right now?
pub fn can_play(state: &CombatState, catalog: &Catalog, instance_id: &str) -> Result<bool> {
    let Some((def, upgraded)) = playable_def(state, catalog, instance_id)? else {
        return Ok(false);
    };
    Ok(total_energy(def.energy_cost(upgraded), state) <= state.player.energy
        && def.ink_cost <= state.player.ink)
}

/// Can the inked variant of this hand card be played right now?
pub fn can_play_inked(state: &CombatState, catalog: &Catalog, instance_id: &str) -> Result<bool> {
    let Some((def, upgraded)) = playable_def(state, catalog, instance_id)? else {
        return Ok(false);
    };
    let (Some(cost), Some(ink)) = (def.inked_energy_cost(upgraded), def.inked_ink_cost()) else {
        return Ok(false);
    };
    Ok(total_energy(cost, state) <= state.player.energy && ink <= state.player.ink)
}

/// Resolve a target selector for a card or item.
///
/// Single-unit modes need a living unit; without an explicit id the only
/// living candidate is used.
pub fn resolve_target(state: &CombatState, mode: TargetMode, target: Option<&str>) -> Option<Target> {
    let single = |candidates: Vec<String>, wrap: fn(String) -> Target| -> Option<Target> {
        match target {
            Some(id) => candidates.iter().any(|c| c == id).then(|| wrap(id.to_string())),
            None if candidates.len() == 1 => candidates.into_iter().next().map(wrap),
            None => None,
        }
    };
    match mode {
        TargetMode::Player => Some(Target::Player),
        TargetMode::AllEnemies => Some(Target::AllEnemies),
        TargetMode::AllAllies => Some(Target::AllAllies),
        TargetMode::SingleEnemy => single(state.living_enemy_ids(), Target::Enemy),
        TargetMode::SingleAlly => single(state.living_ally_ids(), Target::Ally),
    }
}

/// Play a hand card.
///
/// Order: take the card out of hand, pay energy and ink, resolve the
/// effect list, roll the bonus ink proc, route the card to exhaust or
/// discard, check for the end of combat. Returns `Ok(false)` and leaves
/// the state untouched when the play is illegal.
pub fn play_card(
    state: &mut CombatState,
    catalog: &Catalog,
    instance_id: &str,
    target: Option<&str>,
    inked: bool,
) -> Result<bool> {
    let legal = if inked {
        can_play_inked(state, catalog, instance_id)?
    } else {
        can_play(state, catalog, instance_id)?
    };
    if !legal {
        return Ok(false);
    }
    let Some(card) = state.piles.in_hand(instance_id) else {
        return Ok(false);
    };
    let def = catalog.card(&card.card_id)?;
    let upgraded = card.upgraded;
    let Some(resolved_target) = resolve_target(state, def.target, target) else {
        return Ok(false);
    };
    let Some(effects) = def.effects_for(upgraded, inked) else {
        return Ok(false);
    };
    let (energy, ink) = if inked {
        (
            def.inked_energy_cost(upgraded).unwrap_or(def.cost),
            def.inked_ink_cost().unwrap_or(def.ink_cost),
        )
    } else {
        (def.energy_cost(upgraded), def.ink_cost)
    };
    let Some(card) = state.piles.take_from_hand(instance_id) else {
        return Ok(false);
    };

    let energy = total_energy(energy, state);
    state.player.energy -= energy;
    state.player.ink -= ink;
    debug!(card = %def.id, inked, upgraded, "card played");

    let ctx = EffectContext::new(UnitRef::Player, resolved_target);
    resolve_effects(state, &effects, &ctx);

    let chance = state.player.ink_per_card_chance;
    if chance > 0 && state.rng.roll_percent(chance) {
        state.gain_ink(1);
    }

    if def.exhausts(&effects) {
        state.piles.exhaust.push(card);
    } else {
        state.piles.discard.push(card);
    }
    check_combat_end(state);
    Ok(true)
}

/// Resolve a usable item during the player's turn. Returns `false` when
/// the phase or target is not valid; the caller keeps the item then.
pub fn use_item(state: &mut CombatState, item: &ItemDef, target: Option<&str>) -> bool {
    if state.phase != CombatPhase::PlayerTurn {
        return false;
    }
    let Some(resolved_target) = resolve_target(state, item.target, target) else {
        return false;
    };
    debug!(item = %item.id, "item used");
    let ctx = EffectContext::new(UnitRef::Player, resolved_target);
    resolve_effects(state, &item.effects, &ctx);
    check_combat_end(state);
    true
}
