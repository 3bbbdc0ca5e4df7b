//! Run lifecycle.
//!
//! A run walks floor maps room by room. Combat rooms hold a live
//! [`CombatState`]; `combat.is_some()` exactly while the current room is a
//! fight in progress. Every random roll comes from a sub-stream derived
//! from the run seed and a context label, so no sub-system consumes
//! another's randomness.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::combat::damage::scale_percent;
use crate::combat::play;
use crate::combat::state::{init_combat, CombatPhase, CombatSetup, CombatState};
use crate::config::RulesConfig;
use crate::content::{CardInstance, Catalog, RelicEffect};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rng::SeededRng;
use crate::error::Result;
use crate::run::difficulty::{clamp_level, modifiers, DifficultyModifiers, MetaProgress};
use crate::run::events::pick_event;
use crate::run::map::{generate_map, RoomNode, RoomType};
use crate::run::merchant::{generate_merchant, MerchantContext, MerchantInventory};
use crate::run::rewards::{generate_reward, Reward, RewardContext};

/// Overall run status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    InProgress,
    /// Final boss defeated
    Won,
    /// Player died
    Lost,
}

/// Which room of the map the run is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCursor {
    pub position: usize,
    /// Index into the choices at `position`
    pub choice: usize,
}

/// Complete state of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    /// Root seed every sub-stream derives from
    pub seed: String,
    pub status: RunStatus,
    /// 1-based floor
    pub floor: u32,
    /// Current room, `None` before the first room of a floor
    pub current: Option<RoomCursor>,
    pub gold: u32,
    pub hp: i32,
    pub max_hp: i32,
    /// Master deck
    pub deck: Vec<CardInstance>,
    pub relics: Vec<String>,
    /// Ally definition ids joining every fight
    pub allies: Vec<String>,
    /// Usable item ids
    pub items: Vec<String>,
    /// Current floor map, one row of choices per position
    pub map: Vec<Vec<RoomNode>>,
    /// Difficulty level of this run
    pub difficulty: u32,
    /// Unlock snapshot, updated when the run ends
    pub meta: MetaProgress,
    /// Unclaimed reward of the last fight
    pub reward: Option<Reward>,
    /// Stock of the current merchant room
    pub merchant: Option<MerchantInventory>,
    /// Event of the current special room
    pub event: Option<String>,
    /// Fight in progress
    pub combat: Option<CombatState>,
    /// Counter for deck card instance ids
    pub next_instance: u32,
    pub rules: RulesConfig,
}

impl RunState {
    /// Room under the cursor.
    pub fn current_room(&self) -> Option<&RoomNode> {
        let cursor = self.current?;
        self.map.get(cursor.position)?.get(cursor.choice)
    }

    fn current_room_mut(&mut self) -> Option<&mut RoomNode> {
        let cursor = self.current?;
        self.map.get_mut(cursor.position)?.get_mut(cursor.choice)
    }

    /// Is the current room open (entered, not finished) and of `room_type`?
    pub fn in_open_room(&self, room_type: RoomType) -> bool {
        self.current_room()
            .is_some_and(|r| r.room_type == room_type && !r.completed)
    }

    pub(crate) fn complete_current_room(&mut self) {
        if let Some(room) = self.current_room_mut() {
            room.completed = true;
        }
    }

    /// Difficulty modifiers of this run.
    pub fn modifiers(&self) -> DifficultyModifiers {
        modifiers(self.difficulty)
    }

    /// Sub-stream for `label` at the current floor and position.
    pub fn room_rng(&self, label: &str) -> SeededRng {
        self.rng_at(label, self.current.map(|c| c.position).unwrap_or(0))
    }

    fn rng_at(&self, label: &str, position: usize) -> SeededRng {
        SeededRng::derive(&self.seed, &format!("{label}:{}:{position}", self.floor))
    }

    /// Create a new deck card instance.
    pub fn new_card(&mut self, card_id: &str) -> CardInstance {
        self.next_instance += 1;
        CardInstance::new(format!("card-{}", self.next_instance), card_id)
    }

    /// Add a card to the deck.
    pub fn add_card(&mut self, catalog: &Catalog, card_id: &str) -> Result<()> {
        catalog.card(card_id)?;
        let card = self.new_card(card_id);
        self.deck.push(card);
        Ok(())
    }

    /// Gain a relic, applying its pickup effects. Already owned relics are
    /// ignored.
    pub fn gain_relic(&mut self, catalog: &Catalog, relic_id: &str) -> Result<bool> {
        let def = catalog.relic(relic_id)?;
        if self.relics.iter().any(|r| r == relic_id) {
            return Ok(false);
        }
        for effect in &def.effects {
            if let RelicEffect::MaxHp { value } = effect {
                self.max_hp += value;
                self.hp += value;
            }
        }
        self.relics.push(relic_id.to_string());
        info!(relic = relic_id, "relic gained");
        Ok(true)
    }

    /// Gain a usable item if there is room.
    pub fn gain_item(&mut self, catalog: &Catalog, item_id: &str) -> Result<bool> {
        catalog.item(item_id)?;
        if self.items.len() >= self.rules.max_items {
            return Ok(false);
        }
        self.items.push(item_id.to_string());
        Ok(true)
    }

    /// Fingerprint of the whole run, combat included.
    pub fn compute_hash(&self) -> Result<StateHash> {
        let bytes = bincode::serialize(self)?;
        let mut hasher = StateHasher::for_run_state();
        hasher.update_str(&self.run_id);
        hasher.update_bytes(&bytes);
        Ok(hasher.finalize())
    }

    /// JSON snapshot.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Start a run on floor 1.
///
/// The requested difficulty is clamped to what `meta` has unlocked.
pub fn create_new_run(
    run_id: &str,
    seed: &str,
    starter_cards: &[String],
    difficulty: u32,
    meta: MetaProgress,
    catalog: &Catalog,
    rules: RulesConfig,
) -> Result<RunState> {
    let difficulty = clamp_level(meta.allowed_level(difficulty));
    let mut run = RunState {
        run_id: run_id.to_string(),
        seed: seed.to_string(),
        status: RunStatus::InProgress,
        floor: 1,
        current: None,
        gold: rules.starting_gold,
        hp: rules.starting_hp,
        max_hp: rules.starting_hp,
        deck: Vec::with_capacity(starter_cards.len()),
        relics: Vec::new(),
        allies: Vec::new(),
        items: Vec::new(),
        map: Vec::new(),
        difficulty,
        meta,
        reward: None,
        merchant: None,
        event: None,
        combat: None,
        next_instance: 0,
        rules,
    };
    for card_id in starter_cards {
        run.add_card(catalog, card_id)?;
    }
    run.map = floor_map(&run, catalog)?;
    info!(run_id, seed, difficulty, "run created");
    Ok(run)
}

fn floor_map(run: &RunState, catalog: &Catalog) -> Result<Vec<Vec<RoomNode>>> {
    let mut rng = SeededRng::derive(&run.seed, &format!("map:{}", run.floor));
    generate_map(run.floor, &run.modifiers(), catalog, &run.rules, &mut rng)
}

/// Enemy HP and damage percents for the run's floor and difficulty.
pub fn enemy_scales(run: &RunState) -> (u32, u32) {
    let mods = run.modifiers();
    let floors_past = run.floor.saturating_sub(1);
    (
        mods.enemy_hp_percent + run.rules.floor_hp_step * floors_past,
        mods.enemy_damage_percent + run.rules.floor_damage_step * floors_past,
    )
}

/// Position the next room will be at.
pub fn next_position(run: &RunState) -> usize {
    run.current.map(|c| c.position + 1).unwrap_or(0)
}

/// Enter choice `choice` of the next position.
///
/// Not allowed mid-fight, with a reward unclaimed, or before the current
/// room is finished.
pub fn select_room(run: &mut RunState, choice: usize, catalog: &Catalog) -> Result<bool> {
    if run.status != RunStatus::InProgress || run.combat.is_some() || run.reward.is_some() {
        return Ok(false);
    }
    if run.current_room().is_some_and(|r| !r.completed) {
        return Ok(false);
    }
    let position = next_position(run);
    let Some(room) = run.map.get(position).and_then(|row| row.get(choice)).cloned() else {
        return Ok(false);
    };
    let mut combat = None;
    let mut merchant = None;
    let mut event = None;
    match room.room_type {
        RoomType::Combat => {
            let (hp_scale, damage_scale) = enemy_scales(run);
            let setup = CombatSetup {
                hp: run.hp,
                max_hp: run.max_hp,
                deck: run.deck.clone(),
                relic_ids: run.relics.clone(),
                ally_ids: run.allies.clone(),
                hp_scale,
                damage_scale,
            };
            let rng = run.rng_at("combat", position);
            combat = Some(init_combat(setup, &room.enemy_ids, catalog, &run.rules, rng)?);
        }
        RoomType::Merchant => {
            let ctx = MerchantContext {
                floor: run.floor,
                difficulty: run.difficulty,
                max_unlocked: run.meta.max_unlocked_level,
                owned_relics: &run.relics,
            };
            let mut rng = run.rng_at("merchant", position);
            merchant = Some(generate_merchant(&ctx, catalog, &run.rules, &mut rng)?);
        }
        RoomType::Special => {
            let mut rng = run.rng_at("event", position);
            event = Some(pick_event(catalog, &mut rng)?);
        }
        RoomType::PreBoss => {}
    }

    // Commit only after every fallible step
    run.current = Some(RoomCursor { position, choice });
    run.combat = combat;
    run.merchant = merchant;
    run.event = event;
    info!(floor = run.floor, position, room = ?room.room_type, elite = room.elite, boss = room.boss, "room selected");
    Ok(true)
}

/// Settle a finished fight.
///
/// A win carries HP back, heals relic after-combat HP, grants gold and any
/// relic and leaves the card choice pending. A boss win advances the floor
/// or, on the last floor, wins the run. A loss ends the run.
pub fn complete_combat(run: &mut RunState, catalog: &Catalog) -> Result<bool> {
    let Some((phase, hp)) = run.combat.as_ref().map(|c| (c.phase, c.player.unit.hp)) else {
        return Ok(false);
    };
    match phase {
        CombatPhase::Won => {
            run.combat = None;
            let bonuses = catalog.relic_bonuses(&run.relics)?;
            run.hp = (hp + bonuses.heal_after_combat.max(0)).min(run.max_hp);
            run.complete_current_room();
            let Some(room) = run.current_room().cloned() else {
                return Ok(true);
            };

            if room.boss && run.floor >= run.rules.floors {
                run.status = RunStatus::Won;
                run.meta.record_victory(run.difficulty);
                info!(floor = run.floor, unlocked = run.meta.max_unlocked_level, "run won");
                return Ok(true);
            }

            let ctx = RewardContext {
                floor: run.floor,
                difficulty: run.difficulty,
                max_unlocked: run.meta.max_unlocked_level,
                loot_luck: bonuses.loot_luck,
                gold_percent: bonuses.gold_percent,
                card_choices: run.rules.reward_card_choices,
                owned_relics: &run.relics,
            };
            let mut rng = run.room_rng("rewards");
            let reward = generate_reward(&room, &ctx, catalog, &mut rng);
            run.gold += reward.gold;
            if let Some(relic) = &reward.relic {
                run.gain_relic(catalog, relic)?;
            }
            run.reward = (!reward.card_choices.is_empty()).then_some(reward);

            if room.boss {
                run.floor += 1;
                run.current = None;
                run.map = floor_map(run, catalog)?;
                info!(floor = run.floor, "floor advanced");
            }
            Ok(true)
        }
        CombatPhase::Lost => {
            run.combat = None;
            run.hp = 0;
            run.status = RunStatus::Lost;
            run.meta.record_defeat();
            info!(floor = run.floor, "run lost");
            Ok(true)
        }
        CombatPhase::PlayerTurn | CombatPhase::AlliesEnemiesTurn => Ok(false),
    }
}

/// Take one of the offered reward cards.
pub fn claim_reward_card(run: &mut RunState, catalog: &Catalog, card_id: &str) -> Result<bool> {
    let offered = run
        .reward
        .as_ref()
        .is_some_and(|r| r.card_choices.iter().any(|c| c == card_id));
    if !offered {
        return Ok(false);
    }
    run.add_card(catalog, card_id)?;
    run.reward = None;
    Ok(true)
}

/// Decline the reward cards.
pub fn skip_reward(run: &mut RunState) -> bool {
    run.reward.take().is_some()
}

/// Rest site: heal a percent of max HP.
pub fn apply_heal_room(run: &mut RunState) -> bool {
    if !run.in_open_room(RoomType::PreBoss) {
        return false;
    }
    let heal = scale_percent(run.max_hp, run.rules.heal_room_percent.max(0) as u32);
    run.hp = (run.hp + heal).min(run.max_hp);
    run.complete_current_room();
    true
}

/// Rest site: upgrade one deck card. Upgrading an upgraded card is a no-op
/// and keeps the rest site open.
pub fn upgrade_card_in_deck(run: &mut RunState, instance_id: &str) -> bool {
    if !run.in_open_room(RoomType::PreBoss) {
        return false;
    }
    let Some(card) = run.deck.iter_mut().find(|c| c.instance_id == instance_id) else {
        return false;
    };
    if !card.upgrade() {
        return false;
    }
    run.complete_current_room();
    true
}

/// Leave a merchant, special room or rest site without further action.
pub fn leave_room(run: &mut RunState) -> bool {
    let leavable = [RoomType::Merchant, RoomType::Special, RoomType::PreBoss]
        .into_iter()
        .any(|t| run.in_open_room(t));
    if !leavable {
        return false;
    }
    run.complete_current_room();
    run.merchant = None;
    run.event = None;
    true
}

/// Use an owned item in the current fight. The item is consumed only if
/// it resolved.
pub fn use_item(run: &mut RunState, catalog: &Catalog, item_id: &str, target: Option<&str>) -> Result<bool> {
    let Some(idx) = run.items.iter().position(|i| i == item_id) else {
        return Ok(false);
    };
    let def = catalog.item(item_id)?;
    let Some(combat) = run.combat.as_mut() else {
        return Ok(false);
    };
    if !play::use_item(combat, def, target) {
        return Ok(false);
    }
    run.items.remove(idx);
    Ok(true)
}
