//! Special-room events.

use tracing::{debug, info};

use crate::content::{Catalog, EventOutcome};
use crate::core::rng::SeededRng;
use crate::error::{EngineError, Result};
use crate::run::map::RoomType;
use crate::run::rewards::roll_relic;
use crate::run::state::RunState;

/// Pick the event a special room shows.
pub fn pick_event(catalog: &Catalog, rng: &mut SeededRng) -> Result<String> {
    let ids = catalog.event_ids();
    rng.pick(&ids).cloned().ok_or(EngineError::EmptyPool("events"))
}

/// Resolve choice `index` of the current event and finish the room.
///
/// Choices the run cannot pay for are refused. Random outcomes draw from
/// the room's outcome stream.
pub fn apply_event_choice(run: &mut RunState, index: usize, catalog: &Catalog) -> Result<bool> {
    if !run.in_open_room(RoomType::Special) {
        return Ok(false);
    }
    let Some(event_id) = run.event.clone() else {
        return Ok(false);
    };
    let event = catalog.event(&event_id)?;
    let Some(choice) = event.choices.get(index) else {
        return Ok(false);
    };
    if run.gold < choice.gold_required() {
        debug!(event = %event_id, index, gold = run.gold, "event choice unaffordable");
        return Ok(false);
    }

    let mut rng = run.room_rng("event-outcome");
    for outcome in &choice.outcomes {
        apply_outcome(run, outcome, catalog, &mut rng)?;
    }
    run.complete_current_room();
    run.event = None;
    info!(event = %event_id, choice = %choice.label, "event resolved");
    Ok(true)
}

fn apply_outcome(run: &mut RunState, outcome: &EventOutcome, catalog: &Catalog, rng: &mut SeededRng) -> Result<()> {
    match outcome {
        EventOutcome::GainGold { amount } => run.gold += amount,
        EventOutcome::LoseGold { amount } => run.gold = run.gold.saturating_sub(*amount),
        EventOutcome::Heal { amount } => run.hp = (run.hp + (*amount).max(0)).min(run.max_hp),
        EventOutcome::LoseHp { amount } => run.hp = (run.hp - (*amount).max(0)).max(1),
        EventOutcome::GainMaxHp { amount } => {
            run.max_hp += amount;
            run.hp = (run.hp + amount).clamp(1, run.max_hp);
        }
        EventOutcome::AddCard { card_id } => run.add_card(catalog, card_id)?,
        EventOutcome::UpgradeRandomCard => {
            let candidates: Vec<usize> = run
                .deck
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.upgraded)
                .map(|(i, _)| i)
                .collect();
            if let Some(&idx) = rng.pick(&candidates) {
                run.deck[idx].upgrade();
            }
        }
        EventOutcome::RemoveRandomCard => {
            if run.deck.len() > 1 {
                let idx = rng.next_below(run.deck.len() as u32) as usize;
                run.deck.remove(idx);
            }
        }
        EventOutcome::GainRelic { relic_id } => {
            run.gain_relic(catalog, relic_id)?;
        }
        EventOutcome::GainRandomRelic => {
            if let Some(relic) = roll_relic(catalog, &run.relics, run.difficulty, rng) {
                run.gain_relic(catalog, &relic)?;
            }
        }
        EventOutcome::GainItem { item_id } => {
            run.gain_item(catalog, item_id)?;
        }
        EventOutcome::GainAlly { ally_id } => {
            catalog.ally(ally_id)?;
            if !run.allies.contains(ally_id) {
                run.allies.push(ally_id.clone());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::map::RoomNode;
    use crate::run::state::tests::test_run;
    use crate::run::state::RoomCursor;

    /// Put the run in an open special room showing `event_id`.
    fn at_event(event_id: &str) -> (RunState, Catalog) {
        let (mut run, catalog) = test_run("events");
        let room = RoomNode {
            position: 1,
            room_type: RoomType::Special,
            enemy_ids: Vec::new(),
            elite: false,
            boss: false,
            completed: false,
        };
        run.map[1] = vec![room];
        run.map[0][0].completed = true;
        run.current = Some(RoomCursor { position: 1, choice: 0 });
        run.event = Some(event_id.to_string());
        (run, catalog)
    }

    #[test]
    fn test_pick_event_is_deterministic() {
        let catalog = Catalog::builtin().unwrap();
        let a = pick_event(&catalog, &mut SeededRng::new("ev")).unwrap();
        let b = pick_event(&catalog, &mut SeededRng::new("ev")).unwrap();
        assert_eq!(a, b);
        assert!(catalog.event(&a).is_ok());
    }

    #[test]
    fn test_unaffordable_choice_refused() {
        let (mut run, catalog) = at_event("wandering_scribe");
        run.gold = 39;
        assert!(!apply_event_choice(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.event.as_deref(), Some("wandering_scribe"));
        run.gold = 40;
        assert!(apply_event_choice(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.gold, 0);
        assert_eq!(run.deck.iter().filter(|c| c.upgraded).count(), 1);
        assert!(run.event.is_none());
        assert!(run.current_room().unwrap().completed);
    }

    #[test]
    fn test_hp_loss_never_kills() {
        let (mut run, catalog) = at_event("spilled_inkwell");
        run.hp = 3;
        assert!(apply_event_choice(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.relics.len(), 1);
        // A max HP relic heals by the same amount on pickup
        assert_eq!(run.hp, 1 + (run.max_hp - 70));
    }

    #[test]
    fn test_ally_and_cards() {
        let (mut run, catalog) = at_event("lost_companion");
        assert!(apply_event_choice(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.allies, vec!["familiar_crow".to_string()]);

        let (mut run, catalog) = at_event("forgotten_library");
        assert!(apply_event_choice(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.deck.len(), 12);
        assert!(run.deck.iter().any(|c| c.card_id == "regret"));
    }

    #[test]
    fn test_invalid_choice_index() {
        let (mut run, catalog) = at_event("spilled_inkwell");
        assert!(!apply_event_choice(&mut run, 5, &catalog).unwrap());
        assert!(!run.current_room().unwrap().completed);
    }
}
