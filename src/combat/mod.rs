//! Combat: piles, buffs, damage, effect resolution, card play, intents and
//! the turn state machine.

pub mod buffs;
pub mod damage;
pub mod effect;
pub mod intent;
pub mod piles;
pub mod play;
pub mod resolver;
pub mod state;
pub mod unit;

pub use effect::{BuffKind, DisruptionKind, Effect, InkPower, Target, TargetMode, UnitRef};
pub use intent::{enemy_intents, forecast, Intent, IntentKind};
pub use piles::{Disruption, DrawEvent, DrawReason, DrawSource, Piles};
pub use play::{can_play, can_play_inked, play_card, use_item};
pub use state::{
    check_combat_end, end_player_turn, execute_allies_enemies_turn, execute_enemy_step,
    finalize_enemy_turn, init_combat, start_player_turn, use_ink_power, CombatPhase,
    CombatSetup, CombatState,
};
pub use unit::{ActorState, Buff, Combatant, PlayerState};
