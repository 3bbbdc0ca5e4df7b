//! Difficulty scaling and unlock progression.
//!
//! Pure functions of an integer level. Out-of-range levels clamp.

use serde::{Deserialize, Serialize};

/// Highest difficulty level.
pub const MAX_DIFFICULTY: u32 = 10;

/// Percent of enemy HP added per level.
const HP_STEP: u32 = 5;
/// Percent of enemy damage added per level.
const DAMAGE_STEP: u32 = 4;
/// Percent elite chance added per level.
const ELITE_STEP: u32 = 2;

/// Clamp a level into `0..=MAX_DIFFICULTY`.
#[inline]
pub fn clamp_level(level: u32) -> u32 {
    level.min(MAX_DIFFICULTY)
}

/// Modifiers derived from a difficulty level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyModifiers {
    /// Clamped level these modifiers were computed for
    pub level: u32,
    /// Enemy max HP percent
    pub enemy_hp_percent: u32,
    /// Enemy damage percent
    pub enemy_damage_percent: u32,
    /// Added percent chance for elite rooms
    pub elite_chance_bonus: u32,
    /// Shift of the Special room weight
    pub special_weight_delta: i32,
    /// Shift of the Merchant room weight
    pub merchant_weight_delta: i32,
}

/// Modifiers for `level`.
pub fn modifiers(level: u32) -> DifficultyModifiers {
    let level = clamp_level(level);
    DifficultyModifiers {
        level,
        enemy_hp_percent: 100 + HP_STEP * level,
        enemy_damage_percent: 100 + DAMAGE_STEP * level,
        elite_chance_bonus: ELITE_STEP * level,
        special_weight_delta: -(level as i32),
        merchant_weight_delta: -((level / 2) as i32),
    }
}

/// New max unlocked level after winning a run at `played`.
///
/// Only a win at the current max unlocks the next level, never more than
/// one per victory.
pub fn unlock_after_victory(max_unlocked: u32, played: u32) -> u32 {
    let max_unlocked = clamp_level(max_unlocked);
    if clamp_level(played) >= max_unlocked && max_unlocked < MAX_DIFFICULTY {
        max_unlocked + 1
    } else {
        max_unlocked
    }
}

/// Progress that survives between runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProgress {
    /// Highest difficulty the player may pick
    pub max_unlocked_level: u32,
    /// Runs won
    pub victories: u32,
    /// Runs lost
    pub defeats: u32,
}

impl MetaProgress {
    /// Record a won run at `played`.
    pub fn record_victory(&mut self, played: u32) {
        self.victories += 1;
        self.max_unlocked_level = unlock_after_victory(self.max_unlocked_level, played);
    }

    /// Record a lost run.
    pub fn record_defeat(&mut self) {
        self.defeats += 1;
    }

    /// Clamp a requested level to what is unlocked.
    pub fn allowed_level(&self, requested: u32) -> u32 {
        requested.min(clamp_level(self.max_unlocked_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_only_at_current_max() {
        assert_eq!(unlock_after_victory(0, 0), 1);
        assert_eq!(unlock_after_victory(1, 0), 1);
        assert_eq!(unlock_after_victory(1, 1), 2);
        assert_eq!(unlock_after_victory(MAX_DIFFICULTY, MAX_DIFFICULTY), MAX_DIFFICULTY);
    }

    #[test]
    fn test_levels_clamp() {
        assert_eq!(modifiers(99), modifiers(MAX_DIFFICULTY));
        assert_eq!(modifiers(0).enemy_hp_percent, 100);
        assert_eq!(modifiers(0).special_weight_delta, 0);
        assert_eq!(modifiers(4).enemy_damage_percent, 116);
        assert_eq!(modifiers(5).merchant_weight_delta, -2);
    }

    #[test]
    fn test_meta_progress() {
        let mut meta = MetaProgress::default();
        meta.record_victory(0);
        meta.record_victory(0);
        assert_eq!(meta.max_unlocked_level, 1);
        assert_eq!(meta.victories, 2);
        assert_eq!(meta.allowed_level(5), 1);
    }
}
