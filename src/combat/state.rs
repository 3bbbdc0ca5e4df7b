//! Combat state machine.
//!
//! `PlayerTurn -> AlliesEnemiesTurn -> PlayerTurn ...` until the fight is
//! `Won` or `Lost`. Every operation takes `&mut CombatState`, checks its
//! preconditions first and returns `false` (state untouched) when the call
//! is illegal in the current phase.
//!
//! # Determinism
//!
//! - All randomness comes from the embedded `rng`
//! - Collections are `Vec` or `BTree*`, never hash maps
//! - Integer arithmetic only

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combat::buffs::{apply_buff, end_of_round};
use crate::combat::damage::{apply_block, scale_percent};
use crate::combat::effect::{BuffKind, InkPower, Target, UnitRef};
use crate::combat::intent::{execute_actor, turn_order};
use crate::combat::piles::{Disruption, DrawEvent, DrawReason, DrawSource, Piles};
use crate::combat::unit::{ActorState, Combatant, PlayerState};
use crate::config::RulesConfig;
use crate::content::{AbilityDef, CardInstance, Catalog};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rng::SeededRng;
use crate::error::{EngineError, Result};

/// Instance id of the player combatant.
pub const PLAYER_ID: &str = "player";

// =============================================================================
// TYPES
// =============================================================================

/// Combat phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    /// Player plays cards and ink powers
    PlayerTurn,
    /// Allies and enemies act in speed order
    AlliesEnemiesTurn,
    /// Every enemy is down
    Won,
    /// Player is down
    Lost,
}

impl CombatPhase {
    /// Is the fight over?
    pub fn is_over(self) -> bool {
        matches!(self, CombatPhase::Won | CombatPhase::Lost)
    }
}

/// Rules snapshot a combat carries so its operations need no config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRules {
    pub retrieve_ink_cost: i32,
    pub draw_power_ink_cost: i32,
    pub draw_power_cards: u32,
    pub ward_ink_cost: i32,
    pub ward_block: i32,
}

impl CombatRules {
    /// Ink cost of a power.
    pub fn ink_cost(&self, power: InkPower) -> i32 {
        match power {
            InkPower::Retrieve => self.retrieve_ink_cost,
            InkPower::Draw => self.draw_power_ink_cost,
            InkPower::Ward => self.ward_ink_cost,
        }
    }
}

impl From<&RulesConfig> for CombatRules {
    fn from(rules: &RulesConfig) -> Self {
        Self {
            retrieve_ink_cost: rules.retrieve_ink_cost,
            draw_power_ink_cost: rules.draw_power_ink_cost,
            draw_power_cards: rules.draw_power_cards,
            ward_ink_cost: rules.ward_ink_cost,
            ward_block: rules.ward_block,
        }
    }
}

/// What the run brings into a fight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatSetup {
    pub hp: i32,
    pub max_hp: i32,
    /// Master deck, copied into the draw pile
    pub deck: Vec<CardInstance>,
    pub relic_ids: Vec<String>,
    pub ally_ids: Vec<String>,
    /// Enemy HP percent
    pub hp_scale: u32,
    /// Enemy damage percent
    pub damage_scale: u32,
}

/// Complete state of one fight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Player turn counter, 1 on the opening turn
    pub turn: u32,
    pub phase: CombatPhase,
    pub player: PlayerState,
    pub allies: Vec<ActorState>,
    pub enemies: Vec<ActorState>,
    pub piles: Piles,
    pub disruption: Disruption,
    /// Percent applied to enemy base damage
    pub enemy_damage_scale: u32,
    /// Pending first-hit reduction percent, cleared once used
    pub first_hit_reduction: Option<u32>,
    /// An ink power was used this player turn
    pub ink_power_used: bool,
    /// Actors still to act this enemy turn
    pub actor_queue: Vec<UnitRef>,
    /// The current enemy turn has begun (enemy block reset, queue built)
    pub enemy_turn_started: bool,
    pub rules: CombatRules,
    /// Combat RNG stream
    pub rng: SeededRng,
    /// Counter for ids of cards created mid-combat
    pub next_card_serial: u32,
}

// =============================================================================
// ACCESSORS
// =============================================================================

impl CombatState {
    /// Combatant behind a reference.
    pub fn unit(&self, unit: &UnitRef) -> Option<&Combatant> {
        match unit {
            UnitRef::Player => Some(&self.player.unit),
            UnitRef::Ally(id) => self.allies.iter().find(|a| a.unit.id == *id).map(|a| &a.unit),
            UnitRef::Enemy(id) => self.enemies.iter().find(|e| e.unit.id == *id).map(|e| &e.unit),
        }
    }

    /// Mutable combatant behind a reference.
    pub fn unit_mut(&mut self, unit: &UnitRef) -> Option<&mut Combatant> {
        match unit {
            UnitRef::Player => Some(&mut self.player.unit),
            UnitRef::Ally(id) => self
                .allies
                .iter_mut()
                .find(|a| a.unit.id == *id)
                .map(|a| &mut a.unit),
            UnitRef::Enemy(id) => self
                .enemies
                .iter_mut()
                .find(|e| e.unit.id == *id)
                .map(|e| &mut e.unit),
        }
    }

    /// Actor (ally or enemy) behind a reference.
    pub fn actor(&self, unit: &UnitRef) -> Option<&ActorState> {
        match unit {
            UnitRef::Player => None,
            UnitRef::Ally(id) => self.allies.iter().find(|a| a.unit.id == *id),
            UnitRef::Enemy(id) => self.enemies.iter().find(|e| e.unit.id == *id),
        }
    }

    /// Mutable actor behind a reference.
    pub fn actor_mut(&mut self, unit: &UnitRef) -> Option<&mut ActorState> {
        match unit {
            UnitRef::Player => None,
            UnitRef::Ally(id) => self.allies.iter_mut().find(|a| a.unit.id == *id),
            UnitRef::Enemy(id) => self.enemies.iter_mut().find(|e| e.unit.id == *id),
        }
    }

    /// Living combatants a target selector covers, in list order.
    pub fn living_units(&self, target: &Target) -> Vec<UnitRef> {
        match target {
            Target::Player => {
                if self.player.unit.is_alive() {
                    vec![UnitRef::Player]
                } else {
                    Vec::new()
                }
            }
            Target::AllEnemies => self
                .enemies
                .iter()
                .filter(|e| e.unit.is_alive())
                .map(|e| UnitRef::Enemy(e.unit.id.clone()))
                .collect(),
            Target::AllAllies => self
                .allies
                .iter()
                .filter(|a| a.unit.is_alive())
                .map(|a| UnitRef::Ally(a.unit.id.clone()))
                .collect(),
            Target::Enemy(id) => {
                let unit = UnitRef::Enemy(id.clone());
                if self.unit(&unit).is_some_and(Combatant::is_alive) {
                    vec![unit]
                } else {
                    Vec::new()
                }
            }
            Target::Ally(id) => {
                let unit = UnitRef::Ally(id.clone());
                if self.unit(&unit).is_some_and(Combatant::is_alive) {
                    vec![unit]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Instance ids of living enemies.
    pub fn living_enemy_ids(&self) -> Vec<String> {
        self.enemies
            .iter()
            .filter(|e| e.unit.is_alive())
            .map(|e| e.unit.id.clone())
            .collect()
    }

    /// Instance ids of living allies.
    pub fn living_ally_ids(&self) -> Vec<String> {
        self.allies
            .iter()
            .filter(|a| a.unit.is_alive())
            .map(|a| a.unit.id.clone())
            .collect()
    }

    /// Draw through the combat's piles, disruption and RNG.
    pub fn draw_cards(&mut self, count: u32, source: DrawSource, reason: DrawReason) -> DrawEvent {
        self.piles
            .draw(count, source, reason, &mut self.disruption, &mut self.rng)
    }

    /// Gain ink up to the cap unless ink is locked.
    pub fn gain_ink(&mut self, amount: i32) {
        if self.disruption.ink_locked || amount <= 0 {
            return;
        }
        self.player.ink = (self.player.ink + amount).min(self.player.max_ink);
    }

    /// Fingerprint of the whole combat.
    pub fn compute_hash(&self) -> Result<StateHash> {
        let bytes = bincode::serialize(self)?;
        let mut hasher = StateHasher::for_combat_state();
        hasher.update_bytes(&bytes);
        Ok(hasher.finalize())
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

fn build_actor(
    id: String,
    name: &str,
    max_hp: i32,
    strength: i32,
    speed: i32,
    def_id: &str,
    abilities: Vec<AbilityDef>,
) -> ActorState {
    let mut unit = Combatant::new(id, name, max_hp);
    unit.strength = strength;
    ActorState {
        unit,
        def_id: def_id.to_string(),
        speed,
        abilities,
        intent_index: 0,
    }
}

/// Build a combat and start the opening turn.
///
/// Enemy instances are `"{def_id}-{index}"`, allies likewise. Relic
/// combat-start bonuses are applied, the deck is shuffled into the draw
/// pile and the opening hand is drawn.
pub fn init_combat(
    setup: CombatSetup,
    enemy_ids: &[String],
    catalog: &Catalog,
    rules: &RulesConfig,
    mut rng: SeededRng,
) -> Result<CombatState> {
    if enemy_ids.is_empty() {
        return Err(EngineError::EmptyPool("combat enemies"));
    }
    let bonuses = catalog.relic_bonuses(&setup.relic_ids)?;

    let mut enemies = Vec::with_capacity(enemy_ids.len());
    for (i, def_id) in enemy_ids.iter().enumerate() {
        let def = catalog.enemy(def_id)?;
        let max_hp = scale_percent(def.max_hp, setup.hp_scale).max(1);
        enemies.push(build_actor(
            format!("{def_id}-{i}"),
            &def.name,
            max_hp,
            def.strength,
            def.speed,
            &def.id,
            def.abilities.clone(),
        ));
    }

    let mut allies = Vec::with_capacity(setup.ally_ids.len());
    for (i, def_id) in setup.ally_ids.iter().enumerate() {
        let def = catalog.ally(def_id)?;
        allies.push(build_actor(
            format!("{def_id}-{i}"),
            &def.name,
            def.max_hp,
            0,
            def.speed,
            &def.id,
            def.abilities.clone(),
        ));
    }

    let mut unit = Combatant::new(PLAYER_ID, "Player", setup.max_hp);
    unit.hp = setup.hp.clamp(1, setup.max_hp.max(1));
    unit.strength = bonuses.combat_start_strength;
    if bonuses.combat_start_thorns > 0 {
        apply_buff(&mut unit.buffs, BuffKind::Thorns, bonuses.combat_start_thorns, None);
    }
    let max_ink = rules.max_ink;
    let player = PlayerState {
        unit,
        energy: 0,
        max_energy: rules.base_energy + bonuses.max_energy,
        ink: (rules.starting_ink + bonuses.combat_start_ink).clamp(0, max_ink),
        max_ink,
        draw_count: rules.base_draw + bonuses.extra_draw,
        focus: 0,
        ink_per_card_chance: bonuses.ink_per_card_chance,
    };

    let piles = Piles::from_deck(setup.deck, rules.max_hand_size, rules.draw_log_capacity, &mut rng);

    let mut state = CombatState {
        turn: 0,
        phase: CombatPhase::PlayerTurn,
        player,
        allies,
        enemies,
        piles,
        disruption: Disruption::default(),
        enemy_damage_scale: setup.damage_scale,
        first_hit_reduction: bonuses.first_hit_reduction.filter(|p| *p > 0),
        ink_power_used: false,
        actor_queue: Vec::new(),
        enemy_turn_started: false,
        rules: CombatRules::from(rules),
        rng,
        next_card_serial: 0,
    };

    start_player_turn(&mut state);
    if bonuses.combat_start_block > 0 {
        state.player.unit.block = apply_block(state.player.unit.block, bonuses.combat_start_block, 0);
    }

    info!(
        enemies = state.enemies.len(),
        allies = state.allies.len(),
        hand = state.piles.hand.len(),
        "combat started"
    );
    Ok(state)
}

/// Begin a player turn: turn+1, block 0, energy refilled, ink power
/// available, draw `draw_count`. Allies drop their block too.
pub fn start_player_turn(state: &mut CombatState) {
    state.turn += 1;
    state.phase = CombatPhase::PlayerTurn;
    state.player.unit.block = 0;
    state.player.energy = state.player.max_energy;
    state.ink_power_used = false;
    for ally in &mut state.allies {
        ally.unit.block = 0;
    }
    let count = state.player.draw_count;
    state.draw_cards(count, DrawSource::System, DrawReason::TurnStart);
    debug!(turn = state.turn, hand = state.piles.hand.len(), "player turn");
}

/// End the player turn: settle overflow, discard the hand, clear per-turn
/// disruption and hand over to allies and enemies.
pub fn end_player_turn(state: &mut CombatState) -> bool {
    if state.phase != CombatPhase::PlayerTurn {
        return false;
    }
    let exhausted = state.piles.auto_resolve_overflow();
    if exhausted > 0 {
        debug!(exhausted, "overflow auto-exhausted");
    }
    state.piles.discard_hand();
    state.disruption.clear_turn();
    state.phase = CombatPhase::AlliesEnemiesTurn;
    state.enemy_turn_started = false;
    state.actor_queue.clear();
    true
}

fn begin_enemy_turn(state: &mut CombatState) {
    for enemy in &mut state.enemies {
        enemy.unit.block = 0;
    }
    state.actor_queue = turn_order(state);
    state.enemy_turn_started = true;
}

/// Let the next queued actor act. Returns `false` when nobody is left to
/// act or the phase does not allow it.
pub fn execute_enemy_step(state: &mut CombatState) -> bool {
    if state.phase != CombatPhase::AlliesEnemiesTurn {
        return false;
    }
    if !state.enemy_turn_started {
        begin_enemy_turn(state);
    }
    while !state.actor_queue.is_empty() {
        let actor = state.actor_queue.remove(0);
        if execute_actor(state, &actor) {
            check_combat_end(state);
            return true;
        }
    }
    false
}

/// Run whatever actors are left, then the end-of-round pass (enemies,
/// then the player, then allies), then start the next player turn if the
/// fight goes on.
pub fn finalize_enemy_turn(state: &mut CombatState) -> bool {
    if state.phase != CombatPhase::AlliesEnemiesTurn {
        return false;
    }
    while execute_enemy_step(state) {}
    if state.phase.is_over() {
        return true;
    }

    for enemy in &mut state.enemies {
        end_of_round(&mut enemy.unit);
    }
    end_of_round(&mut state.player.unit);
    for ally in &mut state.allies {
        end_of_round(&mut ally.unit);
    }
    state.enemy_turn_started = false;
    state.actor_queue.clear();

    if !check_combat_end(state).is_over() {
        start_player_turn(state);
    }
    true
}

/// Whole allies/enemies turn in one call.
pub fn execute_allies_enemies_turn(state: &mut CombatState) -> bool {
    finalize_enemy_turn(state)
}

/// Resolve the phase from HP. A dead player loses even if every enemy
/// died in the same step.
pub fn check_combat_end(state: &mut CombatState) -> CombatPhase {
    if state.phase.is_over() {
        return state.phase;
    }
    if !state.player.unit.is_alive() {
        state.phase = CombatPhase::Lost;
        info!(turn = state.turn, "combat lost");
    } else if state.enemies.iter().all(|e| !e.unit.is_alive()) {
        state.phase = CombatPhase::Won;
        info!(turn = state.turn, "combat won");
    }
    state.phase
}

// =============================================================================
// INK POWERS
// =============================================================================

/// Can `power` be used right now? Retrieve also needs the chosen card.
pub fn can_use_ink_power(state: &CombatState, power: InkPower, card: Option<&str>) -> bool {
    if state.phase != CombatPhase::PlayerTurn
        || state.ink_power_used
        || state.disruption.disabled_powers.contains(&power)
        || state.player.ink < state.rules.ink_cost(power)
    {
        return false;
    }
    match power {
        InkPower::Retrieve => {
            let Some(id) = card else {
                return false;
            };
            state.piles.hand.len() < state.piles.max_hand_size
                && state.piles.discard.iter().any(|c| c.instance_id == id)
        }
        InkPower::Draw | InkPower::Ward => true,
    }
}

/// Use an ink power. Once per player turn.
pub fn use_ink_power(state: &mut CombatState, power: InkPower, card: Option<&str>) -> bool {
    if !can_use_ink_power(state, power, card) {
        return false;
    }
    match power {
        InkPower::Retrieve => {
            let Some(id) = card else {
                return false;
            };
            if !state.piles.move_discard_to_hand(id) {
                return false;
            }
        }
        InkPower::Draw => {
            let count = state.rules.draw_power_cards;
            state.draw_cards(count, DrawSource::Player, DrawReason::InkPower);
        }
        InkPower::Ward => {
            let player = &mut state.player;
            player.unit.block = apply_block(player.unit.block, state.rules.ward_block, player.focus);
        }
    }
    state.player.ink -= state.rules.ink_cost(power);
    state.ink_power_used = true;
    debug!(?power, ink = state.player.ink, "ink power used");
    true
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::combat::damage::calculate_damage;

    /// Combat against built-in enemies with a strike/defend deck.
    pub(crate) fn test_combat(enemy_ids: &[&str]) -> CombatState {
        let catalog = Catalog::builtin().unwrap();
        let deck: Vec<CardInstance> = (0..10)
            .map(|i| CardInstance::new(format!("c{i}"), if i < 5 { "strike" } else { "defend" }))
            .collect();
        let setup = CombatSetup {
            hp: 70,
            max_hp: 70,
            deck,
            relic_ids: Vec::new(),
            ally_ids: Vec::new(),
            hp_scale: 100,
            damage_scale: 100,
        };
        let ids: Vec<String> = enemy_ids.iter().map(|s| s.to_string()).collect();
        init_combat(setup, &ids, &catalog, &RulesConfig::default(), SeededRng::new("test-combat")).unwrap()
    }

    #[test]
    fn test_init_draws_opening_hand() {
        let state = test_combat(&["ink_slime", "paper_wasp"]);
        assert_eq!(state.turn, 1);
        assert_eq!(state.phase, CombatPhase::PlayerTurn);
        assert_eq!(state.piles.hand.len(), 5);
        assert_eq!(state.piles.draw.len(), 5);
        assert_eq!(state.player.energy, 3);
        assert_eq!(state.enemies[0].unit.id, "ink_slime-0");
        assert_eq!(state.enemies[1].unit.id, "paper_wasp-1");
    }

    #[test]
    fn test_same_seed_same_combat() {
        // Same seed must produce same opening state
        assert_eq!(test_combat(&["ink_slime"]), test_combat(&["ink_slime"]));
        assert_eq!(
            test_combat(&["ink_slime"]).compute_hash().unwrap(),
            test_combat(&["ink_slime"]).compute_hash().unwrap()
        );
    }

    #[test]
    fn test_relic_bonuses_at_combat_start() {
        let catalog = Catalog::builtin().unwrap();
        let setup = CombatSetup {
            hp: 50,
            max_hp: 70,
            deck: vec![CardInstance::new("c0", "strike")],
            relic_ids: vec!["bookmark".into(), "inkpot".into(), "bramble_cover".into(), "padded_spine".into()],
            ally_ids: vec!["familiar_crow".into()],
            hp_scale: 150,
            damage_scale: 120,
        };
        let state = init_combat(
            setup,
            &["ink_slime".to_string()],
            &catalog,
            &RulesConfig::default(),
            SeededRng::new("relics"),
        )
        .unwrap();
        assert_eq!(state.player.unit.hp, 50);
        assert_eq!(state.player.unit.block, 6);
        assert_eq!(state.player.ink, 2);
        assert_eq!(state.player.unit.stacks(BuffKind::Thorns), 2);
        assert_eq!(state.first_hit_reduction, Some(50));
        assert_eq!(state.enemies[0].unit.max_hp, 36);
        assert_eq!(state.enemy_damage_scale, 120);
        assert_eq!(state.allies[0].unit.id, "familiar_crow-0");
    }

    #[test]
    fn test_unknown_enemy_is_fatal() {
        let catalog = Catalog::builtin().unwrap();
        let setup = CombatSetup {
            hp: 70,
            max_hp: 70,
            deck: Vec::new(),
            relic_ids: Vec::new(),
            ally_ids: Vec::new(),
            hp_scale: 100,
            damage_scale: 100,
        };
        let result = init_combat(
            setup,
            &["no_such_enemy".to_string()],
            &catalog,
            &RulesConfig::default(),
            SeededRng::new("x"),
        );
        assert!(matches!(result, Err(EngineError::UnknownEnemy(_))));
    }

    #[test]
    fn test_combat_end_priority_is_lost() {
        let mut state = test_combat(&["ink_slime"]);
        state.player.unit.hp = 0;
        state.enemies[0].unit.hp = 0;
        assert_eq!(check_combat_end(&mut state), CombatPhase::Lost);
    }

    #[test]
    fn test_combat_end_won_and_unchanged() {
        let mut state = test_combat(&["ink_slime"]);
        assert_eq!(check_combat_end(&mut state), CombatPhase::PlayerTurn);
        state.enemies[0].unit.hp = 0;
        assert_eq!(check_combat_end(&mut state), CombatPhase::Won);
    }

    #[test]
    fn test_full_turn_cycle() {
        let mut state = test_combat(&["ink_slime"]);
        let hp = state.player.unit.hp;
        assert!(end_player_turn(&mut state));
        assert!(state.piles.hand.is_empty());
        assert!(!end_player_turn(&mut state));

        assert!(execute_allies_enemies_turn(&mut state));
        // Slime opens with Splash for 5
        assert_eq!(state.player.unit.hp, hp - 5);
        assert_eq!(state.turn, 2);
        assert_eq!(state.phase, CombatPhase::PlayerTurn);
        assert_eq!(state.enemies[0].intent_index, 1);
        assert_eq!(state.piles.hand.len(), 5);
    }

    #[test]
    fn test_stepwise_enemy_turn() {
        let mut state = test_combat(&["ink_slime", "paper_wasp"]);
        state.enemies[0].unit.block = 4;
        assert!(!execute_enemy_step(&mut state));
        end_player_turn(&mut state);

        assert!(execute_enemy_step(&mut state));
        // Block reset happens on the first step
        assert_eq!(state.enemies[0].unit.block, 0);
        // Wasp is faster and acts first
        assert_eq!(state.enemies[1].intent_index, 1);
        assert_eq!(state.enemies[0].intent_index, 0);
        assert_eq!(state.actor_queue.len(), 1);

        assert!(execute_enemy_step(&mut state));
        assert!(!execute_enemy_step(&mut state));
        assert!(finalize_enemy_turn(&mut state));
        assert_eq!(state.phase, CombatPhase::PlayerTurn);
        // Sting poison ticked once at end of round
        assert_eq!(state.player.unit.stacks(BuffKind::Poison), 1);
    }

    #[test]
    fn test_end_of_round_poison_can_win() {
        let mut state = test_combat(&["ink_slime"]);
        state.enemies[0].unit.hp = 2;
        apply_buff(&mut state.enemies[0].unit.buffs, BuffKind::Poison, 5, None);
        end_player_turn(&mut state);
        execute_allies_enemies_turn(&mut state);
        assert_eq!(state.phase, CombatPhase::Won);
        assert_eq!(state.turn, 1);
    }

    #[test]
    fn test_ink_power_once_per_turn() {
        let mut state = test_combat(&["ink_slime"]);
        state.player.ink = 10;
        assert!(use_ink_power(&mut state, InkPower::Ward, None));
        assert_eq!(state.player.unit.block, 6);
        assert_eq!(state.player.ink, 9);
        assert!(!use_ink_power(&mut state, InkPower::Draw, None));
        assert_eq!(state.piles.hand.len(), 5);
    }

    #[test]
    fn test_ink_power_gates() {
        let mut state = test_combat(&["ink_slime"]);
        state.player.ink = 1;
        assert!(!use_ink_power(&mut state, InkPower::Draw, None));
        state.player.ink = 5;
        state.disruption.disabled_powers.insert(InkPower::Draw);
        assert!(!use_ink_power(&mut state, InkPower::Draw, None));
        state.disruption.disabled_powers.clear();
        assert!(use_ink_power(&mut state, InkPower::Draw, None));
        assert_eq!(state.piles.hand.len(), 7);
        assert_eq!(state.player.ink, 3);
    }

    #[test]
    fn test_overflow_played_down_exhausts_nothing() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = test_combat(&["ink_slime"]);
        state.piles.max_hand_size = 5;
        state.player.ink = 2;
        assert!(use_ink_power(&mut state, InkPower::Draw, None));
        assert_eq!(state.piles.hand.len(), 7);
        assert_eq!(state.piles.pending_overflow_exhaust, 2);

        for _ in 0..2 {
            let card = state.piles.hand[0].instance_id.clone();
            assert!(crate::combat::play::play_card(&mut state, &catalog, &card, None, false).unwrap());
        }
        assert_eq!(state.piles.hand.len(), 5);
        assert_eq!(state.piles.pending_overflow_exhaust, 0);

        assert!(end_player_turn(&mut state));
        assert!(state.piles.exhaust.is_empty());
        assert_eq!(state.piles.total_cards(), 10);
    }

    #[test]
    fn test_retrieve_power() {
        let mut state = test_combat(&["ink_slime"]);
        state.player.ink = 5;
        let card = state.piles.hand[0].instance_id.clone();
        state.piles.move_to_discard(&card);
        assert!(!use_ink_power(&mut state, InkPower::Retrieve, None));
        assert!(!use_ink_power(&mut state, InkPower::Retrieve, Some("missing")));
        assert!(use_ink_power(&mut state, InkPower::Retrieve, Some(&card)));
        assert!(state.piles.in_hand(&card).is_some());
        assert_eq!(state.player.ink, 3);
    }

    #[test]
    fn test_damage_scenarios() {
        let mut vulnerable = Vec::new();
        apply_buff(&mut vulnerable, BuffKind::Vulnerable, 1, Some(2));
        assert_eq!(calculate_damage(6, 0, &[], &vulnerable), 9);
        let mut weak = Vec::new();
        apply_buff(&mut weak, BuffKind::Weak, 1, Some(2));
        assert_eq!(calculate_damage(8, 0, &weak, &[]), 6);
    }
}
