//! Merchant inventory and pricing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RulesConfig;
use crate::content::{Catalog, Rarity};
use crate::core::rng::SeededRng;
use crate::error::Result;
use crate::run::map::RoomType;
use crate::run::rewards::{relic_pool, sample_cards};
use crate::run::state::RunState;

/// Cards on offer.
const CARD_SLOTS: usize = 5;
/// Relics on offer.
const RELIC_SLOTS: usize = 2;
/// Items on offer.
const ITEM_SLOTS: usize = 2;

/// One purchasable entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopEntry {
    /// Card, relic or item id
    pub id: String,
    pub price: u32,
    pub sold: bool,
}

/// What a merchant room sells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantInventory {
    pub cards: Vec<ShopEntry>,
    pub relics: Vec<ShopEntry>,
    pub items: Vec<ShopEntry>,
    /// Price of removing one card from the deck
    pub removal_price: u32,
    /// The removal service is once per visit
    pub removal_used: bool,
}

/// `base` scaled by floor: `+step%` per floor past the first.
pub fn floor_price(base: u32, floor: u32, step: u32) -> u32 {
    base * (100 + step * floor.saturating_sub(1)) / 100
}

/// Floor price with +-10% jitter.
fn jittered(base: u32, floor: u32, rules: &RulesConfig, rng: &mut SeededRng) -> u32 {
    let price = floor_price(base, floor, rules.floor_price_step);
    price * rng.next_int(90, 110) as u32 / 100
}

fn card_base_price(rarity: Rarity, rules: &RulesConfig) -> u32 {
    match rarity {
        Rarity::Uncommon => rules.price_uncommon,
        Rarity::Rare => rules.price_rare,
        Rarity::Starter | Rarity::Common | Rarity::Special => rules.price_common,
    }
}

/// Up to `count` distinct entries of `pool`.
fn sample_distinct<'a>(pool: &[&'a str], count: usize, rng: &mut SeededRng) -> Vec<&'a str> {
    let mut pool = pool.to_vec();
    rng.shuffle(&mut pool);
    pool.truncate(count);
    pool
}

/// What the shop needs from the run.
#[derive(Clone, Copy, Debug)]
pub struct MerchantContext<'a> {
    pub floor: u32,
    pub difficulty: u32,
    pub max_unlocked: u32,
    pub owned_relics: &'a [String],
}

/// Stock a merchant room.
pub fn generate_merchant(
    ctx: &MerchantContext<'_>,
    catalog: &Catalog,
    rules: &RulesConfig,
    rng: &mut SeededRng,
) -> Result<MerchantInventory> {
    let mut cards = Vec::with_capacity(CARD_SLOTS);
    for id in sample_cards(catalog, ctx.max_unlocked, 0, CARD_SLOTS, rng) {
        let rarity = catalog.card(&id)?.rarity;
        let price = jittered(card_base_price(rarity, rules), ctx.floor, rules, rng);
        cards.push(ShopEntry { id, price, sold: false });
    }

    let relic_ids = relic_pool(catalog, ctx.owned_relics, ctx.difficulty);
    let relics = sample_distinct(&relic_ids, RELIC_SLOTS, rng)
        .into_iter()
        .map(|id| ShopEntry {
            id: id.to_string(),
            price: jittered(rules.price_relic, ctx.floor, rules, rng),
            sold: false,
        })
        .collect();

    let item_ids: Vec<&str> = catalog.items().map(|i| i.id.as_str()).collect();
    let items = sample_distinct(&item_ids, ITEM_SLOTS, rng)
        .into_iter()
        .map(|id| ShopEntry {
            id: id.to_string(),
            price: jittered(rules.price_item, ctx.floor, rules, rng),
            sold: false,
        })
        .collect();

    let removal_price = floor_price(rules.price_removal, ctx.floor, rules.floor_price_step);
    debug!(floor = ctx.floor, "merchant stocked");
    Ok(MerchantInventory {
        cards,
        relics,
        items,
        removal_price,
        removal_used: false,
    })
}

// =============================================================================
// PURCHASES
// =============================================================================

#[derive(Clone, Copy)]
enum Shelf {
    Card,
    Relic,
    Item,
}

fn open_shop(run: &RunState) -> bool {
    run.merchant.is_some() && run.in_open_room(RoomType::Merchant)
}

/// Entry at `index` of `shelf`, if it is for sale and affordable.
fn purchasable(run: &RunState, shelf: Shelf, index: usize) -> Option<ShopEntry> {
    if !open_shop(run) {
        return None;
    }
    let shop = run.merchant.as_ref()?;
    let entries = match shelf {
        Shelf::Card => &shop.cards,
        Shelf::Relic => &shop.relics,
        Shelf::Item => &shop.items,
    };
    entries
        .get(index)
        .filter(|e| !e.sold && e.price <= run.gold)
        .cloned()
}

fn mark_sold(run: &mut RunState, shelf: Shelf, index: usize, price: u32) {
    run.gold -= price;
    if let Some(shop) = run.merchant.as_mut() {
        let entries = match shelf {
            Shelf::Card => &mut shop.cards,
            Shelf::Relic => &mut shop.relics,
            Shelf::Item => &mut shop.items,
        };
        if let Some(entry) = entries.get_mut(index) {
            entry.sold = true;
        }
    }
}

/// Buy the card at `index` into the deck.
pub fn buy_card(run: &mut RunState, index: usize, catalog: &Catalog) -> Result<bool> {
    let Some(entry) = purchasable(run, Shelf::Card, index) else {
        return Ok(false);
    };
    run.add_card(catalog, &entry.id)?;
    mark_sold(run, Shelf::Card, index, entry.price);
    info!(card = %entry.id, price = entry.price, "card bought");
    Ok(true)
}

/// Buy the relic at `index`.
pub fn buy_relic(run: &mut RunState, index: usize, catalog: &Catalog) -> Result<bool> {
    let Some(entry) = purchasable(run, Shelf::Relic, index) else {
        return Ok(false);
    };
    if !run.gain_relic(catalog, &entry.id)? {
        return Ok(false);
    }
    mark_sold(run, Shelf::Relic, index, entry.price);
    info!(relic = %entry.id, price = entry.price, "relic bought");
    Ok(true)
}

/// Buy the item at `index`. Refused when the item slots are full.
pub fn buy_item(run: &mut RunState, index: usize, catalog: &Catalog) -> Result<bool> {
    let Some(entry) = purchasable(run, Shelf::Item, index) else {
        return Ok(false);
    };
    if !run.gain_item(catalog, &entry.id)? {
        return Ok(false);
    }
    mark_sold(run, Shelf::Item, index, entry.price);
    info!(item = %entry.id, price = entry.price, "item bought");
    Ok(true)
}

/// Pay to remove a deck card. Once per visit; the last card stays.
pub fn remove_card(run: &mut RunState, instance_id: &str) -> bool {
    if !open_shop(run) || run.deck.len() <= 1 {
        return false;
    }
    let Some(price) = run
        .merchant
        .as_ref()
        .filter(|shop| !shop.removal_used)
        .map(|shop| shop.removal_price)
    else {
        return false;
    };
    if price > run.gold {
        return false;
    }
    let Some(idx) = run.deck.iter().position(|c| c.instance_id == instance_id) else {
        return false;
    };
    let removed = run.deck.remove(idx);
    run.gold -= price;
    if let Some(shop) = run.merchant.as_mut() {
        shop.removal_used = true;
    }
    info!(card = %removed.card_id, price, "card removed");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::map::RoomNode;
    use crate::run::state::tests::test_run;
    use crate::run::state::RoomCursor;

    fn stock(owned: &[String], floor: u32) -> MerchantInventory {
        let catalog = Catalog::builtin().unwrap();
        let ctx = MerchantContext { floor, difficulty: 0, max_unlocked: 0, owned_relics: owned };
        generate_merchant(&ctx, &catalog, &RulesConfig::default(), &mut SeededRng::new("shop")).unwrap()
    }

    #[test]
    fn test_floor_price() {
        assert_eq!(floor_price(100, 1, 15), 100);
        assert_eq!(floor_price(100, 3, 15), 130);
        assert_eq!(floor_price(75, 0, 15), 75);
    }

    #[test]
    fn test_inventory_shape() {
        let shop = stock(&[], 1);
        assert_eq!(shop.cards.len(), 5);
        assert_eq!(shop.relics.len(), 2);
        assert_eq!(shop.items.len(), 2);
        assert_ne!(shop.relics[0].id, shop.relics[1].id);
        assert_eq!(shop.removal_price, 75);
        for relic in &shop.relics {
            assert!((144..=176).contains(&relic.price));
        }
    }

    /// Run standing in an open merchant room with a fresh stock.
    fn at_shop(gold: u32) -> (RunState, Catalog) {
        let (mut run, catalog) = test_run("shopping");
        run.map[1] = vec![RoomNode {
            position: 1,
            room_type: RoomType::Merchant,
            enemy_ids: Vec::new(),
            elite: false,
            boss: false,
            completed: false,
        }];
        run.map[0][0].completed = true;
        run.current = Some(RoomCursor { position: 1, choice: 0 });
        run.merchant = Some(stock(&[], 1));
        run.gold = gold;
        (run, catalog)
    }

    #[test]
    fn test_buy_card_spends_gold_once() {
        let (mut run, catalog) = at_shop(1000);
        let price = run.merchant.as_ref().unwrap().cards[0].price;
        assert!(buy_card(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.gold, 1000 - price);
        assert_eq!(run.deck.len(), 11);
        // Sold entries stay sold
        assert!(!buy_card(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.deck.len(), 11);
    }

    #[test]
    fn test_cannot_overspend() {
        let (mut run, catalog) = at_shop(10);
        assert!(!buy_card(&mut run, 0, &catalog).unwrap());
        assert!(!buy_relic(&mut run, 0, &catalog).unwrap());
        assert!(!remove_card(&mut run, "card-1"));
        assert_eq!(run.gold, 10);
    }

    #[test]
    fn test_item_slots_limit_purchases() {
        let (mut run, catalog) = at_shop(1000);
        run.items = vec!["health_tonic".into(); 3];
        assert!(!buy_item(&mut run, 0, &catalog).unwrap());
        run.items.pop();
        assert!(buy_item(&mut run, 0, &catalog).unwrap());
        assert_eq!(run.items.len(), 3);
    }

    #[test]
    fn test_removal_once_per_visit() {
        let (mut run, catalog) = at_shop(1000);
        assert!(buy_relic(&mut run, 1, &catalog).unwrap());
        assert_eq!(run.relics.len(), 1);
        assert!(remove_card(&mut run, "card-1"));
        assert_eq!(run.deck.len(), 9);
        assert!(!remove_card(&mut run, "card-2"));
    }

    #[test]
    fn test_closed_shop_refuses() {
        let (mut run, catalog) = at_shop(1000);
        run.map[1][0].completed = true;
        assert!(!buy_card(&mut run, 0, &catalog).unwrap());
    }

    #[test]
    fn test_owned_relics_excluded() {
        let owned = vec!["bookmark".to_string(), "inkpot".to_string()];
        let shop = stock(&owned, 2);
        assert!(shop.relics.iter().all(|r| !owned.contains(&r.id)));
    }
}
