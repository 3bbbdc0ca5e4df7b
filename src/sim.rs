//! Greedy autopilot.
//!
//! Picks one legal [`Action`] at a time from the visible state: powers
//! first, block when the forecast says the hit lands, attacks on the
//! weakest enemy otherwise. Used by the demo binary, the benchmark and
//! full-run tests.
//!
//! # Determinism
//!
//! The policy is a pure function of the state, so an autopilot run is a
//! pure function of the initial state.

use tracing::{debug, warn};

use crate::action::{apply_action, Action};
use crate::combat::state::can_use_ink_power;
use crate::combat::{can_play, can_play_inked, enemy_intents, CombatPhase, CombatState, Effect, InkPower, TargetMode};
use crate::content::{CardCategory, CardDef, Catalog};
use crate::error::Result;
use crate::run::state::next_position;
use crate::run::{RoomType, RunState, RunStatus, ShopEntry};

/// Deck size past which reward cards are skipped.
const DECK_LIMIT: usize = 25;
/// Below this percent of max HP the autopilot plays safe.
const LOW_HP_PERCENT: i32 = 50;

fn hp_percent(hp: i32, max_hp: i32) -> i32 {
    if max_hp <= 0 {
        return 0;
    }
    hp * 100 / max_hp
}

fn is_clutter(def: &CardDef) -> bool {
    matches!(def.category, CardCategory::Status | CardCategory::Curse)
}

/// Next action for `run`, `None` once the run is over.
pub fn next_action(run: &RunState, catalog: &Catalog) -> Option<Action> {
    if run.status != RunStatus::InProgress {
        return None;
    }
    if let Some(combat) = &run.combat {
        return Some(combat_action(run, combat, catalog));
    }
    if let Some(reward) = &run.reward {
        return Some(match reward.card_choices.first() {
            Some(card_id) if run.deck.len() < DECK_LIMIT => Action::ClaimRewardCard { card_id: card_id.clone() },
            _ => Action::SkipReward,
        });
    }
    if let Some(room) = run.current_room().filter(|r| !r.completed) {
        return Some(match room.room_type {
            RoomType::Merchant => shop_action(run, catalog),
            RoomType::Special => event_action(run, catalog),
            RoomType::PreBoss => rest_action(run, catalog),
            // Combat rooms hold a fight until completed
            RoomType::Combat => Action::CompleteCombat,
        });
    }
    Some(Action::SelectRoom { choice: room_choice(run) })
}

fn room_choice(run: &RunState) -> usize {
    let position = next_position(run);
    let Some(row) = run.map.get(position) else {
        return 0;
    };
    let low = hp_percent(run.hp, run.max_hp) < LOW_HP_PERCENT;
    let preferred = row.iter().position(|room| match room.room_type {
        RoomType::Combat => !low && !room.elite,
        RoomType::Merchant | RoomType::Special => low,
        RoomType::PreBoss => true,
    });
    preferred.unwrap_or(0)
}

// =============================================================================
// COMBAT
// =============================================================================

fn combat_action(run: &RunState, combat: &CombatState, catalog: &Catalog) -> Action {
    match combat.phase {
        CombatPhase::Won | CombatPhase::Lost => return Action::CompleteCombat,
        CombatPhase::AlliesEnemiesTurn => return Action::EnemyTurn,
        CombatPhase::PlayerTurn => {}
    }

    if combat.piles.pending_overflow_exhaust > 0 {
        if let Some(card) = overflow_pick(combat, catalog) {
            return Action::ResolveOverflow { instance_id: card };
        }
    }

    if combat.turn == 1 {
        if let Some(action) = item_action(run, combat, catalog) {
            return action;
        }
    }

    let incoming: i32 = enemy_intents(combat).iter().map(|i| i.total_damage()).sum();
    let threatened = incoming > combat.player.unit.block;

    if threatened && can_use_ink_power(combat, InkPower::Ward, None) {
        return Action::UseInkPower { power: InkPower::Ward, card: None };
    }

    let mut best: Option<(i32, Action)> = None;
    for card in &combat.piles.hand {
        let Ok(def) = catalog.card(&card.card_id) else {
            continue;
        };
        let Some(target) = card_target(combat, def.target) else {
            continue;
        };
        for inked in [true, false] {
            let legal = if inked {
                can_play_inked(combat, catalog, &card.instance_id)
            } else {
                can_play(combat, catalog, &card.instance_id)
            };
            if !matches!(legal, Ok(true)) {
                continue;
            }
            let Some(effects) = def.effects_for(card.upgraded, inked) else {
                continue;
            };
            let score = card_score(def, &effects, threatened) + i32::from(inked);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((
                    score,
                    Action::PlayCard {
                        instance_id: card.instance_id.clone(),
                        target: target.clone(),
                        inked,
                    },
                ));
            }
        }
    }
    if let Some((_, action)) = best {
        return action;
    }

    if can_use_ink_power(combat, InkPower::Draw, None) {
        return Action::UseInkPower { power: InkPower::Draw, card: None };
    }
    Action::EndTurn
}

/// Explicit target id for a mode, `Some(None)` when the mode needs none,
/// `None` when nothing valid is alive.
fn card_target(combat: &CombatState, mode: TargetMode) -> Option<Option<String>> {
    match mode {
        TargetMode::SingleEnemy => combat
            .enemies
            .iter()
            .filter(|e| e.unit.is_alive())
            .min_by_key(|e| e.unit.hp)
            .map(|e| Some(e.unit.id.clone())),
        TargetMode::SingleAlly => combat.living_ally_ids().into_iter().next().map(Some),
        TargetMode::Player | TargetMode::AllEnemies | TargetMode::AllAllies => Some(None),
    }
}

fn card_score(def: &CardDef, effects: &[Effect], threatened: bool) -> i32 {
    if def.category == CardCategory::Power {
        return 100;
    }
    let mut score = 10;
    for effect in effects {
        score += match effect {
            Effect::Damage { value } => {
                if def.target == TargetMode::AllEnemies {
                    value * 2
                } else {
                    *value
                }
            }
            Effect::Block { value } if threatened => value * 2,
            Effect::Block { value } => value / 2,
            Effect::DrawCards { count } => 4 * *count as i32,
            Effect::GainEnergy { value } => 8 * value,
            Effect::GainStrength { .. } | Effect::GainFocus { .. } => 12,
            Effect::ApplyDebuff { stacks, .. } => 2 * stacks,
            Effect::ApplyBuff { stacks, .. } => 2 * stacks,
            Effect::Heal { value } => *value,
            _ => 0,
        };
    }
    score
}

fn overflow_pick(combat: &CombatState, catalog: &Catalog) -> Option<String> {
    let hand = &combat.piles.hand;
    hand.iter()
        .find(|c| catalog.card(&c.card_id).is_ok_and(is_clutter))
        .or_else(|| hand.last())
        .map(|c| c.instance_id.clone())
}

fn item_action(run: &RunState, combat: &CombatState, catalog: &Catalog) -> Option<Action> {
    let big_fight = run.current_room().is_some_and(|r| r.elite || r.boss);
    if !big_fight {
        return None;
    }
    run.items.iter().find_map(|item_id| {
        let def = catalog.item(item_id).ok()?;
        let target = card_target(combat, def.target)?;
        Some(Action::UseItem { item_id: item_id.clone(), target })
    })
}

// =============================================================================
// ROOMS
// =============================================================================

fn shop_action(run: &RunState, catalog: &Catalog) -> Action {
    let Some(shop) = &run.merchant else {
        return Action::LeaveRoom;
    };
    if !shop.removal_used && shop.removal_price <= run.gold {
        let clutter = run
            .deck
            .iter()
            .find(|c| catalog.card(&c.card_id).is_ok_and(is_clutter));
        if let Some(card) = clutter {
            return Action::RemoveCard { instance_id: card.instance_id.clone() };
        }
    }
    let affordable = |entries: &[ShopEntry]| entries.iter().position(|e| !e.sold && e.price <= run.gold);
    if let Some(index) = affordable(&shop.relics) {
        return Action::BuyRelic { index };
    }
    if run.deck.len() < DECK_LIMIT {
        if let Some(index) = affordable(&shop.cards) {
            return Action::BuyCard { index };
        }
    }
    if run.items.len() < run.rules.max_items {
        if let Some(index) = affordable(&shop.items) {
            return Action::BuyItem { index };
        }
    }
    Action::LeaveRoom
}

fn event_action(run: &RunState, catalog: &Catalog) -> Action {
    let choice = run
        .event
        .as_deref()
        .and_then(|id| catalog.event(id).ok())
        .and_then(|event| event.choices.iter().position(|c| c.gold_required() <= run.gold));
    match choice {
        Some(index) => Action::ChooseEvent { index },
        None => Action::LeaveRoom,
    }
}

fn rest_action(run: &RunState, catalog: &Catalog) -> Action {
    if hp_percent(run.hp, run.max_hp) < 70 {
        return Action::Rest;
    }
    let upgradable = run
        .deck
        .iter()
        .find(|c| !c.upgraded && catalog.card(&c.card_id).is_ok_and(|d| !is_clutter(d)));
    match upgradable {
        Some(card) => Action::UpgradeCard { instance_id: card.instance_id.clone() },
        None => Action::Rest,
    }
}

/// Drive `run` with the autopilot for at most `max_actions` steps.
///
/// Stops early when the run ends or an action changes nothing. Returns
/// the final state and the applied action log.
pub fn run_autopilot(mut run: RunState, catalog: &Catalog, max_actions: usize) -> Result<(RunState, Vec<Action>)> {
    let mut log = Vec::new();
    while log.len() < max_actions {
        let Some(action) = next_action(&run, catalog) else {
            break;
        };
        let next = apply_action(run.clone(), &action, catalog)?;
        if next == run {
            warn!(?action, "autopilot stalled");
            break;
        }
        run = next;
        log.push(action);
    }
    debug!(actions = log.len(), status = ?run.status, floor = run.floor, "autopilot finished");
    Ok((run, log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::replay;
    use crate::run::state::tests::test_run;

    #[test]
    fn test_autopilot_makes_progress() {
        let (run, catalog) = test_run("auto");
        let (end, log) = run_autopilot(run, &catalog, 200).unwrap();
        assert!(!log.is_empty());
        assert!(end.floor > 1 || end.current.is_some() || end.status != RunStatus::InProgress);
    }

    #[test]
    fn test_autopilot_log_replays() {
        let (run, catalog) = test_run("auto-replay");
        let (end, log) = run_autopilot(run.clone(), &catalog, 400).unwrap();
        let replayed = replay(run, &log, &catalog).unwrap();
        assert_eq!(replayed.compute_hash().unwrap(), end.compute_hash().unwrap());
    }

    #[test]
    fn test_finished_run_has_no_action() {
        let (mut run, catalog) = test_run("done");
        run.status = RunStatus::Lost;
        assert_eq!(next_action(&run, &catalog), None);
    }

    #[test]
    fn test_threat_prefers_block() {
        let catalog = Catalog::builtin().unwrap();
        let strike = catalog.card("strike").unwrap();
        let defend = catalog.card("defend").unwrap();
        let threatened = card_score(defend, &defend.effects, true) > card_score(strike, &strike.effects, true);
        let calm = card_score(defend, &defend.effects, false) < card_score(strike, &strike.effects, false);
        assert!(threatened);
        assert!(calm);
    }
}
