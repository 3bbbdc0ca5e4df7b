//! Enemy, ally and encounter definitions.

use serde::{Deserialize, Serialize};

use crate::combat::effect::{Effect, TargetMode};

/// One entry of an actor's ability cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub name: String,
    pub effects: Vec<Effect>,
    /// `None` = the player for enemies, the first living enemy for allies
    #[serde(default)]
    pub target: Option<TargetMode>,
}

/// Immutable enemy definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: String,
    pub name: String,
    pub max_hp: i32,
    pub speed: i32,
    #[serde(default)]
    pub strength: i32,
    pub abilities: Vec<AbilityDef>,
}

/// Immutable ally definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllyDef {
    pub id: String,
    pub name: String,
    pub max_hp: i32,
    pub speed: i32,
    pub abilities: Vec<AbilityDef>,
}

/// Encounter tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackTier {
    /// Opening rooms of a floor
    Easy,
    /// Later rooms of a floor
    Normal,
    /// Elite rooms
    Elite,
}

/// A group of enemies fought together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPack {
    pub id: String,
    pub tier: PackTier,
    pub enemies: Vec<String>,
    /// First floor the pack can appear on
    #[serde(default = "first_floor")]
    pub min_floor: u32,
    /// Last floor the pack can appear on
    #[serde(default)]
    pub max_floor: Option<u32>,
}

fn first_floor() -> u32 {
    1
}

impl EnemyPack {
    /// Can this pack appear on `floor`?
    pub fn fits_floor(&self, floor: u32) -> bool {
        floor >= self.min_floor && self.max_floor.is_none_or(|max| floor <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_floor_window() {
        let pack = EnemyPack {
            id: "p".into(),
            tier: PackTier::Normal,
            enemies: vec!["e".into()],
            min_floor: 2,
            max_floor: Some(3),
        };
        assert!(!pack.fits_floor(1));
        assert!(pack.fits_floor(2));
        assert!(pack.fits_floor(3));
        assert!(!pack.fits_floor(4));
    }

    #[test]
    fn test_pack_json_defaults() {
        let pack: EnemyPack =
            serde_json::from_str(r#"{ "id": "p", "tier": "Easy", "enemies": ["a"] }"#).unwrap();
        assert_eq!(pack.min_floor, 1);
        assert_eq!(pack.max_floor, None);
        assert!(pack.fits_floor(9));
    }
}
