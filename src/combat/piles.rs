//! Pile/deck manager.
//!
//! Draw, hand, discard and exhaust piles of one combat. The top of the draw
//! pile is the end of its `Vec`. Every shuffle consumes the combat RNG, so
//! call order matters for reproducibility.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::combat::effect::{DisruptionKind, InkPower};
use crate::content::CardInstance;
use crate::core::rng::SeededRng;

// =============================================================================
// DISRUPTION
// =============================================================================

/// Per-turn disruption placed on the player by enemy abilities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disruption {
    /// Hand cards that cannot be played this turn
    pub frozen_cards: BTreeSet<String>,
    /// Cards still to be frozen as they are drawn
    pub freeze_next_draws: u32,
    /// Cards still to be sent straight to discard as they are drawn
    pub discard_next_draws: u32,
    /// Energy surcharge on every card
    pub extra_cost: i32,
    /// Ink powers that cannot be used
    pub disabled_powers: BTreeSet<InkPower>,
    /// Ink gain is suppressed
    pub ink_locked: bool,
}

impl Disruption {
    /// Record a disruption for the player's next turn.
    pub fn apply(&mut self, kind: &DisruptionKind) {
        match kind {
            DisruptionKind::FreezeDraws { count } => self.freeze_next_draws += count,
            DisruptionKind::DiscardDraws { count } => self.discard_next_draws += count,
            DisruptionKind::ExtraCost { amount } => self.extra_cost += amount,
            DisruptionKind::DisablePower { power } => {
                self.disabled_powers.insert(*power);
            }
            DisruptionKind::LockInk => self.ink_locked = true,
        }
    }

    /// Clear the per-turn state at the end of the player's turn.
    /// Pending draw redirections carry over until consumed.
    pub fn clear_turn(&mut self) {
        self.frozen_cards.clear();
        self.extra_cost = 0;
        self.disabled_powers.clear();
        self.ink_locked = false;
    }

    /// Is this hand card frozen?
    pub fn is_frozen(&self, instance_id: &str) -> bool {
        self.frozen_cards.contains(instance_id)
    }
}

// =============================================================================
// DRAW EVENTS
// =============================================================================

/// Who asked for a draw. Decides the overflow policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawSource {
    /// The player's own card, power or item: excess stays in hand pending a choice
    Player,
    /// Turn start or a non-player effect: excess is exhausted
    System,
}

/// Why a draw happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    TurnStart,
    CardEffect,
    InkPower,
    Item,
    EnemyEffect,
}

/// Diagnostics for one draw call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawEvent {
    pub reason: DrawReason,
    pub source: DrawSource,
    /// Cards asked for
    pub requested: u32,
    /// Cards that entered the hand
    pub to_hand: u32,
    /// Cards redirected to discard by disruption
    pub to_discard: u32,
    /// Cards exhausted by overflow
    pub exhausted: u32,
    /// Cards frozen on entry
    pub frozen: u32,
    /// Discard-into-draw reshuffles
    pub reshuffles: u32,
}

// =============================================================================
// PILES
// =============================================================================

/// The four card piles of a combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piles {
    /// Draw pile, top is the last element
    pub draw: Vec<CardInstance>,
    pub hand: Vec<CardInstance>,
    pub discard: Vec<CardInstance>,
    pub exhaust: Vec<CardInstance>,
    /// Excess hand cards the player still has to exhaust
    pub pending_overflow_exhaust: u32,
    /// Hand cap
    pub max_hand_size: usize,
    /// Most recent draw events, oldest first
    pub draw_log: VecDeque<DrawEvent>,
    /// Draw events kept
    pub draw_log_capacity: usize,
}

impl Piles {
    /// Shuffle `deck` into a fresh draw pile.
    pub fn from_deck(
        mut deck: Vec<CardInstance>,
        max_hand_size: usize,
        draw_log_capacity: usize,
        rng: &mut SeededRng,
    ) -> Self {
        rng.shuffle(&mut deck);
        Self {
            draw: deck,
            hand: Vec::new(),
            discard: Vec::new(),
            exhaust: Vec::new(),
            pending_overflow_exhaust: 0,
            max_hand_size,
            draw_log: VecDeque::new(),
            draw_log_capacity,
        }
    }

    /// Draw up to `count` cards.
    ///
    /// Per card: refill from discard if the draw pile is empty (stop if
    /// both are empty), then discard redirection, then overflow, then
    /// freezing.
    pub fn draw(
        &mut self,
        count: u32,
        source: DrawSource,
        reason: DrawReason,
        disruption: &mut Disruption,
        rng: &mut SeededRng,
    ) -> DrawEvent {
        let mut event = DrawEvent {
            reason,
            source,
            requested: count,
            to_hand: 0,
            to_discard: 0,
            exhausted: 0,
            frozen: 0,
            reshuffles: 0,
        };

        for _ in 0..count {
            if self.draw.is_empty() {
                if self.discard.is_empty() {
                    break;
                }
                self.reshuffle(rng);
                event.reshuffles += 1;
            }
            let Some(card) = self.draw.pop() else {
                break;
            };

            if disruption.discard_next_draws > 0 {
                disruption.discard_next_draws -= 1;
                self.discard.push(card);
                event.to_discard += 1;
                continue;
            }

            let over_cap = self.hand.len() >= self.max_hand_size;
            if over_cap && source == DrawSource::System {
                self.exhaust.push(card);
                event.exhausted += 1;
                continue;
            }

            if disruption.freeze_next_draws > 0 {
                disruption.freeze_next_draws -= 1;
                disruption.frozen_cards.insert(card.instance_id.clone());
                event.frozen += 1;
            }
            self.hand.push(card);
            event.to_hand += 1;
            if over_cap {
                self.pending_overflow_exhaust += 1;
            }
        }

        trace!(?reason, requested = count, to_hand = event.to_hand, "draw");
        self.log(event.clone());
        event
    }

    fn reshuffle(&mut self, rng: &mut SeededRng) {
        self.draw.append(&mut self.discard);
        rng.shuffle(&mut self.draw);
    }

    fn log(&mut self, event: DrawEvent) {
        if self.draw_log_capacity == 0 {
            return;
        }
        while self.draw_log.len() >= self.draw_log_capacity {
            self.draw_log.pop_front();
        }
        self.draw_log.push_back(event);
    }

    /// Position of a card in hand.
    pub fn hand_index(&self, instance_id: &str) -> Option<usize> {
        self.hand.iter().position(|c| c.instance_id == instance_id)
    }

    /// Card in hand by instance id.
    pub fn in_hand(&self, instance_id: &str) -> Option<&CardInstance> {
        self.hand.iter().find(|c| c.instance_id == instance_id)
    }

    /// Remove a card from hand.
    pub fn take_from_hand(&mut self, instance_id: &str) -> Option<CardInstance> {
        let idx = self.hand_index(instance_id)?;
        let card = self.hand.remove(idx);
        self.reconcile_overflow();
        Some(card)
    }

    /// Cards over the hand cap.
    pub fn hand_excess(&self) -> u32 {
        self.hand.len().saturating_sub(self.max_hand_size) as u32
    }

    /// Pending overflow never exceeds what the hand actually holds over
    /// the cap.
    fn reconcile_overflow(&mut self) {
        self.pending_overflow_exhaust = self.pending_overflow_exhaust.min(self.hand_excess());
    }

    /// Move every hand card to discard.
    pub fn discard_hand(&mut self) {
        self.discard.append(&mut self.hand);
        self.pending_overflow_exhaust = 0;
    }

    /// Hand -> discard.
    pub fn move_to_discard(&mut self, instance_id: &str) -> bool {
        match self.take_from_hand(instance_id) {
            Some(card) => {
                self.discard.push(card);
                true
            }
            None => false,
        }
    }

    /// Hand -> exhaust.
    pub fn move_to_exhaust(&mut self, instance_id: &str) -> bool {
        match self.take_from_hand(instance_id) {
            Some(card) => {
                self.exhaust.push(card);
                true
            }
            None => false,
        }
    }

    /// Discard -> hand. No-op when the hand is full or the card is not in
    /// discard.
    pub fn move_discard_to_hand(&mut self, instance_id: &str) -> bool {
        if self.hand.len() >= self.max_hand_size {
            return false;
        }
        let Some(idx) = self.discard.iter().position(|c| c.instance_id == instance_id) else {
            return false;
        };
        let card = self.discard.remove(idx);
        self.hand.push(card);
        true
    }

    /// Exhaust the chosen hand card to pay off one pending overflow.
    /// Refused once the hand is back within the cap.
    pub fn resolve_overflow(&mut self, instance_id: &str) -> bool {
        self.reconcile_overflow();
        if self.pending_overflow_exhaust == 0 {
            return false;
        }
        let Some(idx) = self.hand_index(instance_id) else {
            return false;
        };
        let card = self.hand.remove(idx);
        self.exhaust.push(card);
        self.pending_overflow_exhaust -= 1;
        true
    }

    /// Exhaust the most recently drawn cards until no overflow is pending.
    /// Only cards still over the cap are exhausted. Returns the number of
    /// cards exhausted.
    pub fn auto_resolve_overflow(&mut self) -> u32 {
        self.reconcile_overflow();
        let mut exhausted = 0;
        while self.pending_overflow_exhaust > 0 {
            let Some(card) = self.hand.pop() else {
                self.pending_overflow_exhaust = 0;
                break;
            };
            self.exhaust.push(card);
            self.pending_overflow_exhaust -= 1;
            exhausted += 1;
        }
        exhausted
    }

    /// Insert a card at a random position of the draw pile.
    pub fn shuffle_into_draw(&mut self, card: CardInstance, rng: &mut SeededRng) {
        let idx = rng.next_below(self.draw.len() as u32 + 1) as usize;
        self.draw.insert(idx, card);
    }

    /// Put a card on top of the discard pile.
    pub fn add_to_discard(&mut self, card: CardInstance) {
        self.discard.push(card);
    }

    /// Cards across all four piles.
    pub fn total_cards(&self) -> usize {
        self.draw.len() + self.hand.len() + self.discard.len() + self.exhaust.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn deck(n: usize) -> Vec<CardInstance> {
        (0..n).map(|i| CardInstance::new(format!("c{i}"), "strike")).collect()
    }

    fn piles(n: usize, cap: usize) -> (Piles, SeededRng) {
        let mut rng = SeededRng::new("piles");
        let piles = Piles::from_deck(deck(n), cap, 20, &mut rng);
        (piles, rng)
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let (mut piles, mut rng) = piles(5, 10);
        let mut disruption = Disruption::default();
        piles.draw(5, DrawSource::System, DrawReason::TurnStart, &mut disruption, &mut rng);
        piles.discard_hand();
        assert!(piles.draw.is_empty());

        let event = piles.draw(3, DrawSource::System, DrawReason::TurnStart, &mut disruption, &mut rng);
        assert_eq!(event.reshuffles, 1);
        assert_eq!(piles.hand.len(), 3);
        assert_eq!(piles.draw.len(), 2);
        assert_eq!(piles.total_cards(), 5);
    }

    #[test]
    fn test_draw_stops_when_both_piles_empty() {
        let (mut piles, mut rng) = piles(2, 10);
        let mut disruption = Disruption::default();
        let event = piles.draw(5, DrawSource::Player, DrawReason::CardEffect, &mut disruption, &mut rng);
        assert_eq!(event.to_hand, 2);
        assert_eq!(piles.hand.len(), 2);
    }

    #[test]
    fn test_player_overflow_stays_pending() {
        let (mut piles, mut rng) = piles(6, 3);
        let mut disruption = Disruption::default();
        piles.draw(5, DrawSource::Player, DrawReason::CardEffect, &mut disruption, &mut rng);
        assert_eq!(piles.hand.len(), 5);
        assert_eq!(piles.pending_overflow_exhaust, 2);

        let chosen = piles.hand[0].instance_id.clone();
        assert!(piles.resolve_overflow(&chosen));
        assert_eq!(piles.pending_overflow_exhaust, 1);
        assert_eq!(piles.auto_resolve_overflow(), 1);
        assert_eq!(piles.hand.len(), 3);
        assert_eq!(piles.exhaust.len(), 2);
        let leftover = piles.hand[0].instance_id.clone();
        assert!(!piles.resolve_overflow(&leftover));
    }

    #[test]
    fn test_overflow_clears_when_hand_shrinks() {
        let (mut piles, mut rng) = piles(6, 3);
        let mut disruption = Disruption::default();
        piles.draw(5, DrawSource::Player, DrawReason::CardEffect, &mut disruption, &mut rng);
        assert_eq!(piles.pending_overflow_exhaust, 2);

        // Playing cards out of hand pays the overflow down
        let first = piles.hand[0].instance_id.clone();
        assert!(piles.move_to_discard(&first));
        assert_eq!(piles.pending_overflow_exhaust, 1);
        let second = piles.hand[0].instance_id.clone();
        assert!(piles.move_to_discard(&second));
        assert_eq!(piles.pending_overflow_exhaust, 0);

        let held = piles.hand[0].instance_id.clone();
        assert!(!piles.resolve_overflow(&held));
        assert_eq!(piles.auto_resolve_overflow(), 0);
        assert_eq!(piles.hand.len(), 3);
        assert!(piles.exhaust.is_empty());
    }

    #[test]
    fn test_auto_resolve_only_exhausts_excess() {
        let (mut piles, mut rng) = piles(6, 3);
        let mut disruption = Disruption::default();
        piles.draw(5, DrawSource::Player, DrawReason::CardEffect, &mut disruption, &mut rng);
        // Counter out of step with the hand, e.g. from an older snapshot
        piles.hand.truncate(4);
        assert_eq!(piles.auto_resolve_overflow(), 1);
        assert_eq!(piles.hand.len(), 3);
    }

    #[test]
    fn test_system_overflow_exhausts() {
        let (mut piles, mut rng) = piles(6, 3);
        let mut disruption = Disruption::default();
        let event = piles.draw(5, DrawSource::System, DrawReason::EnemyEffect, &mut disruption, &mut rng);
        assert_eq!(piles.hand.len(), 3);
        assert_eq!(event.exhausted, 2);
        assert_eq!(piles.pending_overflow_exhaust, 0);
    }

    #[test]
    fn test_discard_redirect_checked_before_freeze() {
        let (mut piles, mut rng) = piles(5, 10);
        let mut disruption = Disruption {
            discard_next_draws: 1,
            freeze_next_draws: 2,
            ..Disruption::default()
        };
        let event = piles.draw(4, DrawSource::System, DrawReason::TurnStart, &mut disruption, &mut rng);
        assert_eq!(event.to_discard, 1);
        assert_eq!(event.frozen, 2);
        assert_eq!(event.to_hand, 3);
        assert_eq!(disruption.frozen_cards.len(), 2);
        assert_eq!(disruption.discard_next_draws, 0);
        assert_eq!(disruption.freeze_next_draws, 0);
        // First two cards into hand are the frozen ones
        assert!(disruption.is_frozen(&piles.hand[0].instance_id));
        assert!(disruption.is_frozen(&piles.hand[1].instance_id));
        assert!(!disruption.is_frozen(&piles.hand[2].instance_id));
    }

    #[test]
    fn test_draw_log_is_bounded() {
        let mut rng = SeededRng::new("log");
        let mut piles = Piles::from_deck(deck(3), 10, 4, &mut rng);
        let mut disruption = Disruption::default();
        for _ in 0..10 {
            piles.draw(1, DrawSource::Player, DrawReason::CardEffect, &mut disruption, &mut rng);
            piles.discard_hand();
        }
        assert_eq!(piles.draw_log.len(), 4);
    }

    #[test]
    fn test_move_discard_to_hand_respects_cap() {
        let (mut piles, mut rng) = piles(4, 2);
        let mut disruption = Disruption::default();
        piles.draw(2, DrawSource::System, DrawReason::TurnStart, &mut disruption, &mut rng);
        let first = piles.hand[0].instance_id.clone();
        assert!(piles.move_to_discard(&first));
        piles.draw(1, DrawSource::System, DrawReason::TurnStart, &mut disruption, &mut rng);
        assert!(!piles.move_discard_to_hand(&first));
        let second = piles.hand[0].instance_id.clone();
        assert!(piles.move_to_exhaust(&second));
        assert!(piles.move_discard_to_hand(&first));
        assert!(piles.in_hand(&first).is_some());
    }

    #[test]
    fn test_clear_turn_keeps_pending_redirects() {
        let mut disruption = Disruption::default();
        disruption.apply(&DisruptionKind::FreezeDraws { count: 2 });
        disruption.apply(&DisruptionKind::ExtraCost { amount: 1 });
        disruption.apply(&DisruptionKind::DisablePower { power: InkPower::Ward });
        disruption.apply(&DisruptionKind::LockInk);
        disruption.frozen_cards.insert("c1".into());
        disruption.clear_turn();
        assert_eq!(disruption.freeze_next_draws, 2);
        assert_eq!(disruption.extra_cost, 0);
        assert!(disruption.disabled_powers.is_empty());
        assert!(!disruption.ink_locked);
        assert!(disruption.frozen_cards.is_empty());
    }

    proptest! {
        #[test]
        fn prop_hand_cap_invariant(
            deck_size in 0usize..30,
            cap in 1usize..12,
            draws in proptest::collection::vec((0u32..8, any::<bool>()), 1..10),
        ) {
            let mut rng = SeededRng::new("prop-hand");
            let mut piles = Piles::from_deck(deck(deck_size), cap, 20, &mut rng);
            let mut disruption = Disruption::default();
            for (count, player) in draws {
                let source = if player { DrawSource::Player } else { DrawSource::System };
                piles.draw(count, source, DrawReason::CardEffect, &mut disruption, &mut rng);
                prop_assert!(piles.hand.len() <= cap + piles.pending_overflow_exhaust as usize);
                if !player {
                    prop_assert!(piles.pending_overflow_exhaust > 0 || piles.hand.len() <= cap);
                }
                prop_assert_eq!(piles.total_cards(), deck_size);
            }
        }
    }
}
