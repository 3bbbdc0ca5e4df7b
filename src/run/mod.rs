//! Run layer: maps, rooms, rewards, merchants, events and difficulty.
//!
//! A [`RunState`] owns the master deck and walks floors room by room;
//! fights are delegated to [`crate::combat`].

pub mod difficulty;
pub mod events;
pub mod map;
pub mod merchant;
pub mod rewards;
pub mod state;

pub use difficulty::{modifiers, unlock_after_victory, DifficultyModifiers, MetaProgress, MAX_DIFFICULTY};
pub use events::{apply_event_choice, pick_event};
pub use map::{generate_map, RoomNode, RoomType};
pub use merchant::{buy_card, buy_item, buy_relic, generate_merchant, remove_card, MerchantInventory, ShopEntry};
pub use rewards::{generate_reward, Reward};
pub use state::{
    apply_heal_room, claim_reward_card, complete_combat, create_new_run, leave_room, select_room, skip_reward,
    upgrade_card_in_deck, use_item, RoomCursor, RunState, RunStatus,
};
