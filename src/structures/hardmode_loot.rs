//! Hardmode chest upgrades
//!
//! Every item with an entry in the upgrade table is replaced by its next
//! tier, once. The starter chest nearest spawn keeps its kit.

use std::collections::HashMap;

use log::info;

use crate::config::Equipment;
use crate::ids::{BlockId, ItemId};
use crate::point::Point;
use crate::tile::Item;
use crate::world::World;

/// Honey and ivy chests in the first sheet.
const HONEY_CHEST_FRAMES: [i16; 2] = [360, 1044];
/// Lesion chest in the second sheet.
const LESION_CHEST_FRAME: i16 = 108;
/// Flesh chest in the first sheet.
const FLESH_CHEST_FRAME: i16 = 1548;

fn upgrade_table(world: &World) -> HashMap<ItemId, ItemId> {
    let ores = world.ctx.ores;
    let iron = if ores.iron == BlockId::IRON_ORE { ItemId::IRON_BAR } else { ItemId::LEAD_BAR };
    let gold = if ores.gold == BlockId::GOLD_ORE { ItemId::GOLD_BAR } else { ItemId::PLATINUM_BAR };
    let (from_gold, from_platinum) = if ores.cobalt == BlockId::PALLADIUM_ORE {
        (ItemId::PALLADIUM_BAR, ItemId::PALLADIUM_BAR)
    } else if ores.cobalt == BlockId::COBALT_ORE {
        (ItemId::COBALT_BAR, ItemId::COBALT_BAR)
    } else {
        (ItemId::COBALT_BAR, ItemId::PALLADIUM_BAR)
    };
    let mythril = if ores.mythril == BlockId::ORICHALCUM_ORE {
        ItemId::ORICHALCUM_BAR
    } else {
        ItemId::MYTHRIL_BAR
    };
    let (from_demonite, from_crimtane) = match ores.adamantite {
        BlockId::TITANIUM_ORE => (ItemId::TITANIUM_BAR, ItemId::TITANIUM_BAR),
        BlockId::ADAMANTITE_ORE => (ItemId::ADAMANTITE_BAR, ItemId::ADAMANTITE_BAR),
        _ => (ItemId::ADAMANTITE_BAR, ItemId::TITANIUM_BAR),
    };
    let flail = if world.ctx.is_crimson { ItemId::THE_MEATBALL } else { ItemId::BALL_O_HURT };

    HashMap::from([
        (ItemId::COPPER_BAR, iron),
        (ItemId::TIN_BAR, iron),
        (ItemId::IRON_BAR, gold),
        (ItemId::LEAD_BAR, gold),
        (ItemId::SILVER_BAR, ItemId::METEORITE_BAR),
        (ItemId::TUNGSTEN_BAR, ItemId::METEORITE_BAR),
        (ItemId::GOLD_BAR, from_gold),
        (ItemId::PLATINUM_BAR, from_platinum),
        (ItemId::METEORITE_BAR, mythril),
        (ItemId::DEMONITE_BAR, from_demonite),
        (ItemId::CRIMTANE_BAR, from_crimtane),
        (ItemId::WOODEN_ARROW, ItemId::UNHOLY_ARROW),
        (ItemId::FLAMING_ARROW, ItemId::JESTERS_ARROW),
        (ItemId::JESTERS_ARROW, ItemId::HOLY_ARROW),
        (ItemId::LESSER_HEALING_POTION, ItemId::HEALING_POTION),
        (ItemId::HEALING_POTION, ItemId::GREATER_HEALING_POTION),
        (ItemId::SPEAR, ItemId::SWORDFISH),
        (ItemId::BLOWPIPE, ItemId::BLOWGUN),
        (ItemId::WOODEN_BOOMERANG, ItemId::ENCHANTED_BOOMERANG),
        (ItemId::MACE, flail),
        (ItemId::BOOMSTICK, ItemId::QUAD_BARREL_SHOTGUN),
    ])
}

/// Chest-specific swaps keyed on the sprite the chest was placed with.
fn themed_swap(item: &mut Item, block: BlockId, frame_x: i16) {
    if item.id == ItemId::BOTTLED_HONEY && block == BlockId::CHEST && HONEY_CHEST_FRAMES.contains(&frame_x) {
        item.id = ItemId::HONEYFIN;
    }
    if item.id == ItemId::JESTERS_ARROW || item.id == ItemId::HOLY_ARROW {
        if block == BlockId::CHEST_GROUP2 && frame_x == LESION_CHEST_FRAME {
            item.id = ItemId::CURSED_ARROW;
        } else if block == BlockId::CHEST && frame_x == FLESH_CHEST_FRAME {
            item.id = ItemId::ICHOR_ARROW;
        }
    }
}

/// Top-left corner of the chest nearest spawn, searched in an 160x80 window.
fn starter_chest(world: &World) -> Option<Point> {
    let spawn = world.ctx.spawn;
    let mut best: Option<(f64, Point)> = None;
    for x in spawn.x - 80..spawn.x + 80 {
        for y in spawn.y - 40..spawn.y + 40 {
            let tile = world.tile(x, y);
            let is_chest = tile.block == BlockId::CHEST || tile.block == BlockId::CHEST_GROUP2;
            if is_chest && tile.frame_x % 36 == 0 && tile.frame_y == 0 {
                let pt = Point::new(x, y);
                let dist = spawn.distance(pt);
                if best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, pt));
                }
            }
        }
    }
    best.map(|(_, pt)| pt)
}

pub fn apply_hardmode_loot(world: &mut World) {
    info!("Compounding interest");
    let table = upgrade_table(world);
    let skip = if world.conf.variation.equipment != Equipment::None {
        starter_chest(world)
    } else {
        None
    };
    let frames: Vec<(BlockId, i16)> = world
        .chests()
        .iter()
        .map(|chest| {
            let tile = world.tile(chest.x, chest.y);
            (tile.block, tile.frame_x)
        })
        .collect();
    for (chest, (block, frame_x)) in world.chests_mut().iter_mut().zip(frames) {
        if skip == Some(Point::new(chest.x, chest.y)) {
            continue;
        }
        for item in chest.items.iter_mut() {
            if let Some(&next) = table.get(&item.id) {
                item.id = next;
            }
            themed_swap(item, block, frame_x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::Variant;
    use crate::world::test_world;

    #[test]
    fn test_items_upgrade_one_tier() {
        let mut world = test_world(100, 100);
        {
            let chest = world.place_chest(10, 10, Variant::Gold);
            chest.push(Item::new(ItemId::COPPER_BAR, 5));
            chest.push(Item::new(ItemId::LESSER_HEALING_POTION, 3));
            chest.push(Item::new(ItemId::TORCH, 10));
        }
        apply_hardmode_loot(&mut world);
        let items = world.chests()[0].items;
        assert_eq!(items[0].id, ItemId::IRON_BAR);
        assert_eq!(items[0].stack, 5);
        // Not chained through to greater healing.
        assert_eq!(items[1].id, ItemId::HEALING_POTION);
        assert_eq!(items[2].id, ItemId::TORCH);
    }

    #[test]
    fn test_themed_chests_swap() {
        let mut world = test_world(100, 100);
        world.place_chest(10, 10, Variant::Honey).push(Item::new(ItemId::BOTTLED_HONEY, 2));
        world.place_chest(20, 10, Variant::Lesion).push(Item::new(ItemId::FLAMING_ARROW, 30));
        world.place_chest(30, 10, Variant::Flesh).push(Item::new(ItemId::JESTERS_ARROW, 30));
        apply_hardmode_loot(&mut world);
        assert_eq!(world.chests()[0].items[0].id, ItemId::HONEYFIN);
        assert_eq!(world.chests()[1].items[0].id, ItemId::CURSED_ARROW);
        assert_eq!(world.chests()[2].items[0].id, ItemId::ICHOR_ARROW);
    }

    #[test]
    fn test_starter_chest_keeps_kit() {
        let mut world = test_world(200, 100);
        world.conf.variation.equipment = Equipment::Iron;
        world.ctx.spawn = Point::new(100, 50);
        world.place_chest(102, 48, Variant::Gold).push(Item::new(ItemId::IRON_BAR, 80));
        world.place_chest(150, 48, Variant::Gold).push(Item::new(ItemId::IRON_BAR, 80));
        apply_hardmode_loot(&mut world);
        assert_eq!(world.chests()[0].items[0].id, ItemId::IRON_BAR);
        assert_eq!(world.chests()[1].items[0].id, ItemId::GOLD_BAR);
    }
}
