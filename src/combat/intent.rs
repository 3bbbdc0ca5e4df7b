//! Enemy/ally intent engine.
//!
//! Actors cycle their abilities round-robin with no randomness. The next
//! ability is visible as an [`Intent`] before it resolves.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::combat::damage::{calculate_damage, scale_percent};
use crate::combat::effect::{Effect, Target, TargetMode, UnitRef};
use crate::combat::resolver::{resolve_effects, EffectContext};
use crate::combat::state::CombatState;
use crate::content::AbilityDef;

/// Broad category of an upcoming ability, for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentKind {
    Attack,
    Disrupt,
    Debuff,
    Defend,
    Buff,
    Unknown,
}

impl IntentKind {
    /// First matching rule wins: damage, disruption, debuff, block, buff.
    pub fn classify(effects: &[Effect]) -> Self {
        let any = |pred: fn(&Effect) -> bool| effects.iter().any(pred);
        if any(|e| matches!(e, Effect::Damage { .. })) {
            IntentKind::Attack
        } else if any(|e| matches!(e, Effect::Disrupt { .. })) {
            IntentKind::Disrupt
        } else if any(|e| matches!(e, Effect::ApplyDebuff { .. } | Effect::DrainInk { .. })) {
            IntentKind::Debuff
        } else if any(|e| matches!(e, Effect::Block { .. })) {
            IntentKind::Defend
        } else if any(|e| {
            matches!(e, Effect::ApplyBuff { .. } | Effect::GainStrength { .. } | Effect::Heal { .. })
        }) {
            IntentKind::Buff
        } else {
            IntentKind::Unknown
        }
    }
}

/// Forecast of an actor's next action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub actor: UnitRef,
    pub ability: String,
    pub kind: IntentKind,
    pub target: Option<Target>,
    /// Damage per hit after modifiers, before block
    pub damage_per_hit: Option<i32>,
    /// Damage effects in the ability
    pub hits: u32,
}

impl Intent {
    /// Total previewed damage.
    pub fn total_damage(&self) -> i32 {
        self.damage_per_hit.unwrap_or(0) * self.hits as i32
    }
}

/// Where an ability lands.
///
/// Target modes are absolute (enemy side vs player side). Without an
/// explicit mode enemies hit the player and allies hit the first living
/// enemy. Single-unit modes on the actor's own side pick the actor itself.
pub fn ability_target(state: &CombatState, actor: &UnitRef, ability: &AbilityDef) -> Option<Target> {
    let first_enemy = || state.living_enemy_ids().into_iter().next().map(Target::Enemy);
    match (ability.target, actor) {
        (None, UnitRef::Enemy(_)) => Some(Target::Player),
        (None, _) => first_enemy(),
        (Some(TargetMode::Player), _) => Some(Target::Player),
        (Some(TargetMode::AllEnemies), _) => Some(Target::AllEnemies),
        (Some(TargetMode::AllAllies), _) => Some(Target::AllAllies),
        (Some(TargetMode::SingleEnemy), UnitRef::Enemy(id)) => Some(Target::Enemy(id.clone())),
        (Some(TargetMode::SingleEnemy), _) => first_enemy(),
        (Some(TargetMode::SingleAlly), UnitRef::Ally(id)) => Some(Target::Ally(id.clone())),
        (Some(TargetMode::SingleAlly), _) => Some(
            state
                .living_ally_ids()
                .into_iter()
                .next()
                .map(Target::Ally)
                .unwrap_or(Target::Player),
        ),
    }
}

/// Forecast of what `actor` will do next. `None` for dead or unknown
/// actors and empty ability lists.
pub fn forecast(state: &CombatState, actor: &UnitRef) -> Option<Intent> {
    let actor_state = state.actor(actor)?;
    if !actor_state.unit.is_alive() {
        return None;
    }
    let ability = actor_state.current_ability()?;
    let target = ability_target(state, actor, ability);

    let hits = ability
        .effects
        .iter()
        .filter(|e| matches!(e, Effect::Damage { .. }))
        .count() as u32;
    let first_damage = ability.effects.iter().find_map(|e| match e {
        Effect::Damage { value } => Some(*value),
        _ => None,
    });
    let target_buffs = target
        .as_ref()
        .and_then(|t| state.living_units(t).into_iter().next())
        .and_then(|u| state.unit(&u))
        .map(|u| u.buffs.clone())
        .unwrap_or_default();
    let damage_per_hit = first_damage.map(|base| {
        let base = if matches!(actor, UnitRef::Enemy(_)) {
            scale_percent(base, state.enemy_damage_scale)
        } else {
            base
        };
        calculate_damage(base, actor_state.unit.strength, &actor_state.unit.buffs, &target_buffs)
    });

    Some(Intent {
        actor: actor.clone(),
        ability: ability.name.clone(),
        kind: IntentKind::classify(&ability.effects),
        target,
        damage_per_hit,
        hits,
    })
}

/// Forecasts for every living enemy, in list order.
pub fn enemy_intents(state: &CombatState) -> Vec<Intent> {
    state
        .living_enemy_ids()
        .into_iter()
        .filter_map(|id| forecast(state, &UnitRef::Enemy(id)))
        .collect()
}

/// Living allies then living enemies, stable-sorted by descending speed.
pub fn turn_order(state: &CombatState) -> Vec<UnitRef> {
    let mut order: Vec<(i32, UnitRef)> = state
        .allies
        .iter()
        .filter(|a| a.unit.is_alive())
        .map(|a| (a.speed, UnitRef::Ally(a.unit.id.clone())))
        .chain(
            state
                .enemies
                .iter()
                .filter(|e| e.unit.is_alive())
                .map(|e| (e.speed, UnitRef::Enemy(e.unit.id.clone()))),
        )
        .collect();
    order.sort_by_key(|(speed, _)| std::cmp::Reverse(*speed));
    order.into_iter().map(|(_, unit)| unit).collect()
}

/// Resolve `actor`'s current ability, then advance its cycle.
///
/// Returns `false` when the actor is dead or missing. An actor with no
/// valid target still advances.
pub fn execute_actor(state: &mut CombatState, actor: &UnitRef) -> bool {
    let Some(actor_state) = state.actor(actor) else {
        return false;
    };
    if !actor_state.unit.is_alive() {
        return false;
    }
    let ability = actor_state.current_ability().cloned();

    if let Some(ability) = ability {
        if let Some(target) = ability_target(state, actor, &ability) {
            trace!(?actor, ability = %ability.name, ?target, "actor acts");
            let ctx = EffectContext::new(actor.clone(), target);
            resolve_effects(state, &ability.effects, &ctx);
        }
    }
    if let Some(actor_state) = state.actor_mut(actor) {
        actor_state.advance_intent();
    }
    true
}
