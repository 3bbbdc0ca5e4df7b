//! Built-in content set.
//!
//! Small but complete: every effect, buff and disruption kind is used by at
//! least one definition, so the demo binary and the full-run tests touch
//! every rule.

use crate::combat::effect::{BuffKind, DisruptionKind, Effect, InkPower, TargetMode};
use crate::content::actors::{AbilityDef, AllyDef, EnemyDef, EnemyPack, PackTier};
use crate::content::cards::{CardCategory, CardDef, CardUpgrade, InkedVariant, Rarity};
use crate::content::events::{EventChoice, EventDef, EventOutcome};
use crate::content::relics::{ItemDef, RelicDef, RelicEffect};
use crate::content::CatalogFile;

// =============================================================================
// HELPERS
// =============================================================================

fn card(
    id: &str,
    name: &str,
    category: CardCategory,
    cost: i32,
    target: TargetMode,
    rarity: Rarity,
    effects: Vec<Effect>,
) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        category,
        cost,
        ink_cost: 0,
        target,
        rarity,
        effects,
        inked: None,
        upgrade: None,
        description: None,
        unlock_level: 0,
    }
}

fn inked(mut def: CardDef, ink_cost: i32, effects: Vec<Effect>) -> CardDef {
    def.inked = Some(InkedVariant { effects, ink_cost, cost: None });
    def
}

fn unlocked_at(mut def: CardDef, level: u32) -> CardDef {
    def.unlock_level = level;
    def
}

fn ability(name: &str, effects: Vec<Effect>) -> AbilityDef {
    AbilityDef { name: name.to_string(), effects, target: None }
}

fn targeted(name: &str, target: TargetMode, effects: Vec<Effect>) -> AbilityDef {
    AbilityDef { name: name.to_string(), effects, target: Some(target) }
}

fn enemy(id: &str, name: &str, max_hp: i32, speed: i32, abilities: Vec<AbilityDef>) -> EnemyDef {
    EnemyDef {
        id: id.to_string(),
        name: name.to_string(),
        max_hp,
        speed,
        strength: 0,
        abilities,
    }
}

fn pack(id: &str, tier: PackTier, enemies: &[&str], min_floor: u32, max_floor: Option<u32>) -> EnemyPack {
    EnemyPack {
        id: id.to_string(),
        tier,
        enemies: enemies.iter().map(|e| e.to_string()).collect(),
        min_floor,
        max_floor,
    }
}

fn relic(id: &str, name: &str, rarity: Rarity, effects: Vec<RelicEffect>) -> RelicDef {
    RelicDef {
        id: id.to_string(),
        name: name.to_string(),
        rarity,
        effects,
        min_difficulty: 0,
    }
}

fn damage(value: i32) -> Effect {
    Effect::Damage { value }
}

fn block(value: i32) -> Effect {
    Effect::Block { value }
}

fn debuff(buff: BuffKind, stacks: i32, duration: Option<u32>) -> Effect {
    Effect::ApplyDebuff { buff, stacks, duration }
}

fn buff(buff: BuffKind, stacks: i32, duration: Option<u32>) -> Effect {
    Effect::ApplyBuff { buff, stacks, duration }
}

// =============================================================================
// CARDS
// =============================================================================

fn cards() -> Vec<CardDef> {
    use CardCategory::*;
    use TargetMode::*;

    let mut calligraphy = card(
        "calligraphy",
        "Calligraphy",
        Attack,
        2,
        SingleEnemy,
        Rarity::Rare,
        vec![damage(14), Effect::GainInk { value: 2 }],
    );
    calligraphy.upgrade = Some(CardUpgrade {
        effects: Some(vec![damage(18), Effect::GainInk { value: 3 }]),
        cost: Some(1),
        ..CardUpgrade::default()
    });

    let mut masterwork = card(
        "masterwork",
        "Masterwork",
        Power,
        3,
        Player,
        Rarity::Rare,
        vec![Effect::GainStrength { value: 3 }, Effect::GainFocus { value: 2 }],
    );
    masterwork.ink_cost = 2;

    vec![
        // Starter
        card("strike", "Strike", Attack, 1, SingleEnemy, Rarity::Starter, vec![damage(6)]),
        card("defend", "Defend", Skill, 1, Player, Rarity::Starter, vec![block(5)]),
        inked(
            card(
                "inkblot",
                "Inkblot",
                Skill,
                1,
                SingleEnemy,
                Rarity::Starter,
                vec![Effect::GainInk { value: 2 }, debuff(BuffKind::Weak, 1, Some(1))],
            ),
            1,
            vec![Effect::GainInk { value: 1 }, debuff(BuffKind::Weak, 2, Some(2))],
        ),
        // Common
        card(
            "bash_line",
            "Bash Line",
            Attack,
            2,
            SingleEnemy,
            Rarity::Common,
            vec![damage(8), debuff(BuffKind::Vulnerable, 2, Some(2))],
        ),
        card(
            "twin_stroke",
            "Twin Stroke",
            Attack,
            1,
            SingleEnemy,
            Rarity::Common,
            vec![damage(4), damage(4)],
        ),
        card(
            "sweeping_serif",
            "Sweeping Serif",
            Attack,
            1,
            AllEnemies,
            Rarity::Common,
            vec![damage(5)],
        ),
        inked(
            card("blot_shield", "Blot Shield", Skill, 1, Player, Rarity::Common, vec![block(8)]),
            2,
            vec![block(12), Effect::DrawCards { count: 1 }],
        ),
        card(
            "draft",
            "Draft",
            Skill,
            0,
            Player,
            Rarity::Common,
            vec![Effect::DrawCards { count: 2 }, Effect::AddCardToDiscard { card_id: "smudge".into(), count: 1 }],
        ),
        card(
            "ink_well",
            "Ink Well",
            Skill,
            1,
            Player,
            Rarity::Common,
            vec![Effect::GainInk { value: 3 }, Effect::Exhaust],
        ),
        card(
            "venom_nib",
            "Venom Nib",
            Attack,
            1,
            SingleEnemy,
            Rarity::Common,
            vec![damage(3), debuff(BuffKind::Poison, 4, None)],
        ),
        card(
            "hamstring",
            "Hamstring",
            Attack,
            1,
            SingleEnemy,
            Rarity::Common,
            vec![damage(4), debuff(BuffKind::Bleed, 3, Some(3))],
        ),
        card(
            "quick_sketch",
            "Quick Sketch",
            Skill,
            0,
            Player,
            Rarity::Common,
            vec![block(3), Effect::DrawCards { count: 1 }],
        ),
        // Uncommon
        card(
            "gash",
            "Gash",
            Attack,
            2,
            SingleEnemy,
            Rarity::Uncommon,
            vec![damage(12), debuff(BuffKind::Weak, 2, Some(2))],
        ),
        unlocked_at(
            card(
                "thorn_script",
                "Thorn Script",
                Power,
                1,
                Player,
                Rarity::Uncommon,
                vec![buff(BuffKind::Thorns, 3, None)],
            ),
            1,
        ),
        card(
            "focus_ritual",
            "Focus Ritual",
            Power,
            1,
            Player,
            Rarity::Uncommon,
            vec![Effect::GainFocus { value: 2 }],
        ),
        inked(
            card("heavy_quill", "Heavy Quill", Attack, 2, SingleEnemy, Rarity::Uncommon, vec![damage(14)]),
            3,
            vec![damage(24), Effect::Exhaust],
        ),
        card(
            "second_wind",
            "Second Wind",
            Skill,
            1,
            Player,
            Rarity::Uncommon,
            vec![Effect::GainEnergy { value: 2 }, Effect::AddCardToDraw { card_id: "wound".into(), count: 1 }],
        ),
        unlocked_at(
            card(
                "overflow",
                "Overflow",
                Skill,
                1,
                Player,
                Rarity::Uncommon,
                vec![Effect::DrawCards { count: 4 }, Effect::Exhaust],
            ),
            2,
        ),
        card(
            "regrowth",
            "Regrowth",
            Skill,
            2,
            Player,
            Rarity::Uncommon,
            vec![buff(BuffKind::Regeneration, 4, None), Effect::Exhaust],
        ),
        // Rare
        calligraphy,
        masterwork,
        unlocked_at(
            card(
                "inkstorm",
                "Inkstorm",
                Attack,
                2,
                AllEnemies,
                Rarity::Rare,
                vec![damage(9), debuff(BuffKind::Vulnerable, 1, Some(2))],
            ),
            3,
        ),
        card(
            "perfect_form",
            "Perfect Form",
            Power,
            2,
            Player,
            Rarity::Rare,
            vec![buff(BuffKind::Ritual, 1, None)],
        ),
        // Clutter
        card("wound", "Wound", Status, 0, Player, Rarity::Special, vec![]),
        card("smudge", "Smudge", Status, 0, Player, Rarity::Special, vec![]),
        card("regret", "Regret", Curse, 0, Player, Rarity::Special, vec![]),
    ]
}

// =============================================================================
// ENEMIES AND ALLIES
// =============================================================================

fn enemies() -> Vec<EnemyDef> {
    let mut censor = enemy(
        "censor",
        "Censor",
        62,
        6,
        vec![
            ability(
                "Redact",
                vec![damage(9), Effect::Disrupt { disruption: DisruptionKind::FreezeDraws { count: 2 } }],
            ),
            ability(
                "Strike Through",
                vec![damage(7), Effect::Disrupt { disruption: DisruptionKind::DisablePower { power: InkPower::Draw } }],
            ),
            ability(
                "Embargo",
                vec![
                    damage(6),
                    Effect::Disrupt { disruption: DisruptionKind::ExtraCost { amount: 1 } },
                    Effect::Disrupt { disruption: DisruptionKind::LockInk },
                ],
            ),
        ],
    );
    censor.strength = 1;

    vec![
        enemy(
            "ink_slime",
            "Ink Slime",
            24,
            2,
            vec![
                ability("Splash", vec![damage(5)]),
                ability("Smear", vec![damage(3), debuff(BuffKind::Weak, 1, Some(1))]),
            ],
        ),
        enemy(
            "paper_wasp",
            "Paper Wasp",
            16,
            8,
            vec![
                ability("Sting", vec![damage(3), debuff(BuffKind::Poison, 2, None)]),
                ability("Buzz", vec![block(4)]),
            ],
        ),
        enemy(
            "inkling",
            "Inkling",
            20,
            5,
            vec![
                ability("Siphon", vec![damage(4), Effect::DrainInk { value: 1 }]),
                ability("Dribble", vec![damage(6)]),
            ],
        ),
        enemy(
            "bookworm",
            "Bookworm",
            34,
            3,
            vec![
                ability("Gnaw", vec![damage(8)]),
                ability("Burrow", vec![block(8), Effect::GainStrength { value: 1 }]),
                ability("Shred", vec![damage(5), Effect::Disrupt { disruption: DisruptionKind::DiscardDraws { count: 1 } }]),
            ],
        ),
        enemy(
            "stamp_golem",
            "Stamp Golem",
            46,
            1,
            vec![
                ability("Stamp", vec![damage(12)]),
                ability("Brace", vec![block(10)]),
                ability("Imprint", vec![damage(6), Effect::AddCardToDiscard { card_id: "wound".into(), count: 2 }]),
            ],
        ),
        censor,
        enemy(
            "archivist",
            "Archivist",
            70,
            4,
            vec![
                ability("Catalogue", vec![damage(10), debuff(BuffKind::Vulnerable, 1, Some(2))]),
                targeted("Preserve", TargetMode::AllEnemies, vec![block(8)]),
                ability("Bury", vec![damage(5), Effect::AddCardToDraw { card_id: "regret".into(), count: 1 }]),
            ],
        ),
        enemy(
            "the_editor",
            "The Editor",
            120,
            5,
            vec![
                ability("Red Pen", vec![damage(14)]),
                ability("Margin Note", vec![damage(6), debuff(BuffKind::Bleed, 2, Some(3))]),
                ability("Revise", vec![block(12), Effect::GainStrength { value: 2 }]),
            ],
        ),
        enemy(
            "the_blank_page",
            "The Blank Page",
            160,
            3,
            vec![
                ability("Whiteout", vec![damage(10), Effect::DrainInk { value: 2 }]),
                ability("Void", vec![Effect::Disrupt { disruption: DisruptionKind::FreezeDraws { count: 3 } }, block(15)]),
                ability("Erase", vec![damage(20)]),
            ],
        ),
        enemy(
            "the_final_draft",
            "The Final Draft",
            220,
            6,
            vec![
                ability("Rewrite", vec![buff(BuffKind::Ritual, 2, None), block(20)]),
                ability("Deadline", vec![damage(16), debuff(BuffKind::Weak, 2, Some(2))]),
                ability("Publish", vec![damage(8), damage(8), Effect::AddCardToDiscard { card_id: "wound".into(), count: 1 }]),
            ],
        ),
    ]
}

fn packs() -> Vec<EnemyPack> {
    vec![
        pack("slime_single", PackTier::Easy, &["ink_slime"], 1, Some(1)),
        pack("wasp_pair", PackTier::Easy, &["paper_wasp", "paper_wasp"], 1, None),
        pack("inkling_single", PackTier::Easy, &["inkling"], 1, None),
        pack("slime_and_wasp", PackTier::Normal, &["ink_slime", "paper_wasp"], 1, None),
        pack("bookworm_single", PackTier::Normal, &["bookworm"], 1, None),
        pack("inkling_trio", PackTier::Normal, &["inkling", "inkling", "inkling"], 2, None),
        pack("golem_guard", PackTier::Normal, &["stamp_golem", "inkling"], 2, None),
        pack("censor_elite", PackTier::Elite, &["censor"], 1, None),
        pack("archivist_elite", PackTier::Elite, &["archivist", "bookworm"], 2, None),
    ]
}

fn allies() -> Vec<AllyDef> {
    vec![
        AllyDef {
            id: "familiar_crow".into(),
            name: "Familiar Crow".into(),
            max_hp: 12,
            speed: 7,
            abilities: vec![
                ability("Peck", vec![damage(4)]),
                targeted("Caw", TargetMode::Player, vec![block(3)]),
            ],
        },
        AllyDef {
            id: "paper_knight".into(),
            name: "Paper Knight".into(),
            max_hp: 25,
            speed: 2,
            abilities: vec![
                ability("Slash", vec![damage(6)]),
                targeted("Shield Wall", TargetMode::AllAllies, vec![block(5)]),
            ],
        },
    ]
}

// =============================================================================
// RELICS, ITEMS, EVENTS
// =============================================================================

fn relics() -> Vec<RelicDef> {
    let mut hourglass = relic(
        "gilded_hourglass",
        "Gilded Hourglass",
        Rarity::Rare,
        vec![RelicEffect::MaxEnergy { value: 1 }],
    );
    hourglass.min_difficulty = 2;

    vec![
        relic("bookmark", "Bookmark", Rarity::Common, vec![RelicEffect::CombatStartBlock { value: 6 }]),
        relic("iron_nib", "Iron Nib", Rarity::Common, vec![RelicEffect::CombatStartStrength { value: 1 }]),
        relic("inkpot", "Inkpot", Rarity::Common, vec![RelicEffect::CombatStartInk { value: 2 }]),
        relic("bramble_cover", "Bramble Cover", Rarity::Uncommon, vec![RelicEffect::CombatStartThorns { value: 2 }]),
        hourglass,
        relic("spare_page", "Spare Page", Rarity::Uncommon, vec![RelicEffect::ExtraDraw { value: 1 }]),
        relic("padded_spine", "Padded Spine", Rarity::Uncommon, vec![RelicEffect::FirstHitReduction { percent: 50 }]),
        relic("leaky_pen", "Leaky Pen", Rarity::Common, vec![RelicEffect::InkPerCardChance { percent: 25 }]),
        relic("lucky_quill", "Lucky Quill", Rarity::Uncommon, vec![RelicEffect::LootLuck { value: 2 }]),
        relic("tea_flask", "Tea Flask", Rarity::Common, vec![RelicEffect::HealAfterCombat { value: 6 }]),
        relic("thick_binding", "Thick Binding", Rarity::Common, vec![RelicEffect::MaxHp { value: 8 }]),
        relic("gold_leaf", "Gold Leaf", Rarity::Uncommon, vec![RelicEffect::GoldPercent { percent: 25 }]),
    ]
}

fn items() -> Vec<ItemDef> {
    let item = |id: &str, name: &str, target, effects| ItemDef {
        id: id.to_string(),
        name: name.to_string(),
        target,
        effects,
    };
    vec![
        item("health_tonic", "Health Tonic", TargetMode::Player, vec![Effect::Heal { value: 15 }]),
        item("fire_ink", "Fire Ink", TargetMode::SingleEnemy, vec![damage(20)]),
        item("acid_ink", "Acid Ink", TargetMode::AllEnemies, vec![debuff(BuffKind::Poison, 5, None)]),
        item("energy_tea", "Energy Tea", TargetMode::Player, vec![Effect::GainEnergy { value: 2 }]),
        item(
            "ink_vial",
            "Ink Vial",
            TargetMode::Player,
            vec![Effect::GainInk { value: 4 }, Effect::DrawCards { count: 1 }],
        ),
    ]
}

fn events() -> Vec<EventDef> {
    let choice = |label: &str, outcomes| EventChoice { label: label.to_string(), outcomes };
    vec![
        EventDef {
            id: "wandering_scribe".into(),
            name: "Wandering Scribe".into(),
            choices: vec![
                choice("Pay for a lesson", vec![EventOutcome::LoseGold { amount: 40 }, EventOutcome::UpgradeRandomCard]),
                choice("Trade a page", vec![EventOutcome::RemoveRandomCard]),
                choice("Walk on", vec![]),
            ],
        },
        EventDef {
            id: "spilled_inkwell".into(),
            name: "Spilled Inkwell".into(),
            choices: vec![
                choice(
                    "Dig through the mess",
                    vec![EventOutcome::LoseHp { amount: 8 }, EventOutcome::GainRandomRelic],
                ),
                choice("Mop it up", vec![EventOutcome::Heal { amount: 10 }]),
            ],
        },
        EventDef {
            id: "forgotten_library".into(),
            name: "Forgotten Library".into(),
            choices: vec![
                choice(
                    "Borrow a tome",
                    vec![EventOutcome::AddCard { card_id: "calligraphy".into() }, EventOutcome::AddCard { card_id: "regret".into() }],
                ),
                choice("Rest among the shelves", vec![EventOutcome::GainMaxHp { amount: 5 }]),
                choice("Pocket the coins", vec![EventOutcome::GainGold { amount: 50 }]),
            ],
        },
        EventDef {
            id: "lost_companion".into(),
            name: "Lost Companion".into(),
            choices: vec![
                choice("Take it in", vec![EventOutcome::GainAlly { ally_id: "familiar_crow".into() }]),
                choice(
                    "Buy it supplies",
                    vec![EventOutcome::LoseGold { amount: 30 }, EventOutcome::GainItem { item_id: "health_tonic".into() }, EventOutcome::GainRelic { relic_id: "tea_flask".into() }],
                ),
                choice("Leave it", vec![]),
            ],
        },
    ]
}

/// The complete built-in content set.
pub fn catalog_file() -> CatalogFile {
    let mut starter_deck = vec!["strike".to_string(); 5];
    starter_deck.extend(vec!["defend".to_string(); 4]);
    starter_deck.push("inkblot".to_string());

    CatalogFile {
        cards: cards(),
        enemies: enemies(),
        packs: packs(),
        allies: allies(),
        relics: relics(),
        items: items(),
        events: events(),
        boss_ids: vec![
            "the_editor".to_string(),
            "the_blank_page".to_string(),
            "the_final_draft".to_string(),
        ],
        starter_deck,
    }
}
