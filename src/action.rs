//! Discrete actions and the run reducer.
//!
//! Every mutating engine call is reachable as an [`Action`]. Applying an
//! illegal action returns the state unchanged; only corrupted content
//! (unknown ids) is an error.
//!
//! # Determinism
//!
//! [`replay`] of the same action log against the same initial state always
//! reaches the same final state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::{self, InkPower};
use crate::content::Catalog;
use crate::error::Result;
use crate::run::{self, RunState};

/// A player or presentation-layer action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Enter a room choice at the next map position
    SelectRoom { choice: usize },
    PlayCard {
        instance_id: String,
        #[serde(default)]
        target: Option<String>,
        /// Play the inked variant
        #[serde(default)]
        inked: bool,
    },
    UseInkPower {
        power: InkPower,
        /// Card to retrieve
        #[serde(default)]
        card: Option<String>,
    },
    /// Pick which card to exhaust for an overflowing draw
    ResolveOverflow { instance_id: String },
    UseItem {
        item_id: String,
        #[serde(default)]
        target: Option<String>,
    },
    EndTurn,
    /// One ally or enemy acts
    ExecuteEnemyStep,
    /// Remaining actors act, then the end-of-round pass
    FinalizeEnemyTurn,
    /// Whole allies/enemies turn
    EnemyTurn,
    CompleteCombat,
    ClaimRewardCard { card_id: String },
    SkipReward,
    BuyCard { index: usize },
    BuyRelic { index: usize },
    BuyItem { index: usize },
    RemoveCard { instance_id: String },
    /// Heal at the rest site
    Rest,
    /// Upgrade a deck card at the rest site
    UpgradeCard { instance_id: String },
    ChooseEvent { index: usize },
    LeaveRoom,
}

/// Apply one action, returning the next state.
pub fn apply_action(mut state: RunState, action: &Action, catalog: &Catalog) -> Result<RunState> {
    let applied = match action {
        Action::SelectRoom { choice } => run::select_room(&mut state, *choice, catalog)?,
        Action::PlayCard { instance_id, target, inked } => match state.combat.as_mut() {
            Some(c) => combat::play_card(c, catalog, instance_id, target.as_deref(), *inked)?,
            None => false,
        },
        Action::UseInkPower { power, card } => state
            .combat
            .as_mut()
            .is_some_and(|c| combat::use_ink_power(c, *power, card.as_deref())),
        Action::ResolveOverflow { instance_id } => state
            .combat
            .as_mut()
            .is_some_and(|c| c.phase == combat::CombatPhase::PlayerTurn && c.piles.resolve_overflow(instance_id)),
        Action::UseItem { item_id, target } => run::use_item(&mut state, catalog, item_id, target.as_deref())?,
        Action::EndTurn => state.combat.as_mut().is_some_and(combat::end_player_turn),
        Action::ExecuteEnemyStep => state.combat.as_mut().is_some_and(combat::execute_enemy_step),
        Action::FinalizeEnemyTurn => state.combat.as_mut().is_some_and(combat::finalize_enemy_turn),
        Action::EnemyTurn => state
            .combat
            .as_mut()
            .is_some_and(combat::execute_allies_enemies_turn),
        Action::CompleteCombat => run::complete_combat(&mut state, catalog)?,
        Action::ClaimRewardCard { card_id } => run::claim_reward_card(&mut state, catalog, card_id)?,
        Action::SkipReward => run::skip_reward(&mut state),
        Action::BuyCard { index } => run::buy_card(&mut state, *index, catalog)?,
        Action::BuyRelic { index } => run::buy_relic(&mut state, *index, catalog)?,
        Action::BuyItem { index } => run::buy_item(&mut state, *index, catalog)?,
        Action::RemoveCard { instance_id } => run::remove_card(&mut state, instance_id),
        Action::Rest => run::apply_heal_room(&mut state),
        Action::UpgradeCard { instance_id } => run::upgrade_card_in_deck(&mut state, instance_id),
        Action::ChooseEvent { index } => run::apply_event_choice(&mut state, *index, catalog)?,
        Action::LeaveRoom => run::leave_room(&mut state),
    };
    if !applied {
        debug!(?action, "action ignored");
    }
    Ok(state)
}

/// Apply an action log in order.
pub fn replay(initial: RunState, actions: &[Action], catalog: &Catalog) -> Result<RunState> {
    actions
        .iter()
        .try_fold(initial, |state, action| apply_action(state, action, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::state::tests::test_run;

    #[test]
    fn test_action_json_shape() {
        let action = Action::PlayCard {
            instance_id: "card-1".into(),
            target: Some("ink_slime-0".into()),
            inked: false,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "PLAY_CARD");
        assert_eq!(json["instance_id"], "card-1");

        let parsed: Action = serde_json::from_str(r#"{"type":"SELECT_ROOM","choice":0}"#).unwrap();
        assert_eq!(parsed, Action::SelectRoom { choice: 0 });
        let parsed: Action = serde_json::from_str(r#"{"type":"PLAY_CARD","instance_id":"card-2"}"#).unwrap();
        assert_eq!(
            parsed,
            Action::PlayCard { instance_id: "card-2".into(), target: None, inked: false }
        );
        let parsed: Action = serde_json::from_str(r#"{"type":"END_TURN"}"#).unwrap();
        assert_eq!(parsed, Action::EndTurn);
    }

    #[test]
    fn test_illegal_action_is_noop() {
        let (run, catalog) = test_run("noop");
        let before = run.clone();
        let after = apply_action(run, &Action::EndTurn, &catalog).unwrap();
        assert_eq!(after, before);
        let after = apply_action(after, &Action::BuyCard { index: 0 }, &catalog).unwrap();
        assert_eq!(after, before);
        let after = apply_action(after, &Action::SelectRoom { choice: 7 }, &catalog).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_replay_matches_step_by_step() {
        let (run, catalog) = test_run("replay");
        let log = vec![
            Action::SelectRoom { choice: 0 },
            Action::EndTurn,
            Action::ExecuteEnemyStep,
            Action::FinalizeEnemyTurn,
            Action::EndTurn,
            Action::EnemyTurn,
        ];
        let mut stepped = run.clone();
        for action in &log {
            stepped = apply_action(stepped, action, &catalog).unwrap();
        }
        let replayed = replay(run.clone(), &log, &catalog).unwrap();
        // Same log from the same state must reach the same state
        assert_eq!(replayed, stepped);
        assert_eq!(replayed.compute_hash().unwrap(), replay(run, &log, &catalog).unwrap().compute_hash().unwrap());
        assert!(replayed.combat.is_some());
    }

    #[test]
    fn test_play_card_through_reducer() {
        let (run, catalog) = test_run("reduce");
        let run = apply_action(run, &Action::SelectRoom { choice: 0 }, &catalog).unwrap();
        let combat = run.combat.as_ref().unwrap();
        let card = combat
            .piles
            .hand
            .iter()
            .find(|c| c.card_id == "defend")
            .map(|c| c.instance_id.clone());
        let Some(card) = card else {
            return;
        };
        let energy = combat.player.energy;
        let run = apply_action(
            run,
            &Action::PlayCard { instance_id: card, target: None, inked: false },
            &catalog,
        )
        .unwrap();
        let combat = run.combat.as_ref().unwrap();
        assert_eq!(combat.player.energy, energy - 1);
        assert!(combat.player.unit.block >= 5);
    }
}
