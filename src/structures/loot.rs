//! Chest loot tables
//!
//! A table is a list of `(probability, item)` rows. Filling rolls every row
//! independently and rerolls the whole table until the chest holds at least
//! roughly 90% of the expected item count.

use serde::Serialize;

use crate::config::Equipment;
use crate::ids::{BlockId, ItemId};
use crate::point::Point;
use crate::random::Random;
use crate::tile::Item;
use crate::world::{Levels, World};

/// Rerolls allowed before accepting a short chest.
const MAX_FILL_ATTEMPTS: usize = 64;

/// Which table a chest draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LootKind {
    Surface,
    Underground,
    Cavern,
    Frozen,
    Honey,
    Ivy,
    Water,
    Lihzahrd,
    Dungeon,
    /// Sandstone chests of desert tombs.
    Sandstone,
    WebCovered,
    Mushroom,
    Starter(StarterKit),
}

/// Starter chest contents by equipment tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum StarterKit {
    Iron,
    Platinum,
    Hellstone,
    Mythril,
}

impl StarterKit {
    pub fn from_equipment(equipment: Equipment) -> Option<Self> {
        match equipment {
            Equipment::None => None,
            Equipment::Iron => Some(Self::Iron),
            Equipment::Platinum => Some(Self::Platinum),
            Equipment::Hellstone => Some(Self::Hellstone),
            Equipment::Mythril => Some(Self::Mythril),
        }
    }
}

/// Depth band of a chest at row `y`.
pub fn depth_kind(y: i32, levels: &Levels) -> LootKind {
    if y < levels.underground {
        LootKind::Surface
    } else if y < levels.cavern {
        LootKind::Underground
    } else {
        LootKind::Cavern
    }
}

type Table = Vec<(f64, Item)>;

fn item(id: ItemId, stack: i32) -> Item {
    Item::new(id, stack.clamp(1, i32::from(u16::MAX)) as u16)
}

fn bar(ore: BlockId) -> ItemId {
    match ore {
        BlockId::COPPER_ORE => ItemId::COPPER_BAR,
        BlockId::TIN_ORE => ItemId::TIN_BAR,
        BlockId::IRON_ORE => ItemId::IRON_BAR,
        BlockId::LEAD_ORE => ItemId::LEAD_BAR,
        BlockId::SILVER_ORE => ItemId::SILVER_BAR,
        BlockId::TUNGSTEN_ORE => ItemId::TUNGSTEN_BAR,
        BlockId::GOLD_ORE => ItemId::GOLD_BAR,
        BlockId::PLATINUM_ORE => ItemId::PLATINUM_BAR,
        BlockId::COBALT_ORE => ItemId::COBALT_BAR,
        BlockId::PALLADIUM_ORE => ItemId::PALLADIUM_BAR,
        BlockId::MYTHRIL_ORE => ItemId::MYTHRIL_BAR,
        BlockId::ORICHALCUM_ORE => ItemId::ORICHALCUM_BAR,
        BlockId::ADAMANTITE_ORE => ItemId::ADAMANTITE_BAR,
        BlockId::TITANIUM_ORE => ItemId::TITANIUM_BAR,
        _ => ItemId::IRON_BAR,
    }
}

/// Roll the items for a chest at `at`.
pub fn roll_loot(kind: LootKind, at: Point, rnd: &mut Random, world: &World) -> Vec<Item> {
    let table = match kind {
        LootKind::Surface => surface_table(rnd, world),
        LootKind::Underground => underground_table(rnd, world),
        LootKind::Cavern => cavern_table(at, rnd, world),
        LootKind::Frozen => frozen_table(rnd, world),
        LootKind::Honey => honey_table(at, rnd, world),
        LootKind::Ivy => ivy_table(at, rnd, world),
        LootKind::Water => water_table(rnd, world),
        LootKind::Lihzahrd => lihzahrd_table(rnd, world),
        LootKind::Dungeon => dungeon_table(rnd, world),
        LootKind::Sandstone => sandstone_table(at, rnd, world),
        LootKind::WebCovered => web_covered_table(rnd, world),
        LootKind::Mushroom => mushroom_table(at, rnd, world),
        LootKind::Starter(kit) => starter_table(kit, rnd, world),
    };
    fill_loot(&table, rnd)
}

/// Roll `table` until the result is not much below its expected size.
fn fill_loot(table: &[(f64, Item)], rnd: &mut Random) -> Vec<Item> {
    let mut expected: f64 = table.iter().map(|(p, _)| p).sum();
    if expected > 5.0 {
        expected = 5.0 + 0.6 * (expected - 5.0);
    }
    let min_loot = (0.9 * expected - 0.5).floor() as usize;
    let mut items = Vec::new();
    for _ in 0..MAX_FILL_ATTEMPTS {
        items.clear();
        for &(probability, row) in table {
            if probability > rnd.get_double(0.0, 1.0) {
                items.push(row);
                if row.id == ItemId::FLARE_GUN {
                    items.push(item(ItemId::FLARE, rnd.get_int(25, 50)));
                }
            }
        }
        if items.len() >= min_loot {
            break;
        }
    }
    items
}

// =============================================================================
// Shared rows
// =============================================================================

fn global_potion(world: &World) -> (f64, Item) {
    let p = if world.conf.variation.double_trouble { 1.0 / 30.0 } else { 0.0 };
    (p, item(ItemId::GREATER_HEALING_POTION, 1))
}

fn lava_level(levels: &Levels) -> i32 {
    (levels.cavern + 2 * levels.underworld) / 3
}

fn deep_trinket(at: Point, world: &World) -> (f64, Item) {
    if at.y < lava_level(&world.levels()) {
        (0.05, item(ItemId::EXTRACTINATOR, 1))
    } else {
        (0.15, item(ItemId::LAVA_CHARM, 1))
    }
}

fn cavern_potions(rnd: &mut Random) -> [(f64, Item); 2] {
    [
        (
            2.0 / 3.0,
            item(
                rnd.select(&[
                    ItemId::SPELUNKER_POTION,
                    ItemId::FEATHERFALL_POTION,
                    ItemId::NIGHT_OWL_POTION,
                    ItemId::WATER_WALKING_POTION,
                    ItemId::ARCHERY_POTION,
                    ItemId::GRAVITATION_POTION,
                ]),
                rnd.get_int(1, 2),
            ),
        ),
        (
            1.0 / 3.0,
            item(
                rnd.select(&[
                    ItemId::THORNS_POTION,
                    ItemId::WATER_WALKING_POTION,
                    ItemId::INVISIBILITY_POTION,
                    ItemId::HUNTER_POTION,
                    ItemId::DANGERSENSE_POTION,
                ]),
                rnd.get_int(1, 2),
            ),
        ),
    ]
}

// =============================================================================
// Tables
// =============================================================================

fn surface_table(rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let primary = rnd.seq.pool(
        "surface primary",
        &[
            ItemId::SPEAR,
            ItemId::BLOWPIPE,
            ItemId::WOODEN_BOOMERANG,
            ItemId::AGLET,
            ItemId::CLIMBING_CLAWS,
            ItemId::UMBRELLA,
            ItemId::WAND_OF_SPARKING,
            ItemId::RADAR,
        ],
    );
    vec![
        (1.0, item(primary, 1)),
        (1.0 / 6.0, item(ItemId::GLOWSTICK, rnd.get_int(40, 75))),
        (1.0 / 6.0, item(ItemId::THROWING_KNIFE, rnd.get_int(150, 300))),
        (1.0 / 3.0, item(ItemId::GRENADE, rnd.get_int(3, 5))),
        (0.5, item(rnd.select(&[bar(ores.copper), bar(ores.iron)]), rnd.get_int(3, 10))),
        (0.5, item(ItemId::ROPE, rnd.get_int(50, 100))),
        (
            2.0 / 3.0,
            item(rnd.select(&[ItemId::WOODEN_ARROW, ItemId::SHURIKEN]), rnd.get_int(25, 50)),
        ),
        global_potion(world),
        (0.5, item(ItemId::LESSER_HEALING_POTION, rnd.get_int(3, 5))),
        (2.0 / 3.0, item(ItemId::RECALL_POTION, rnd.get_int(3, 5))),
        (
            2.0 / 3.0,
            item(
                rnd.select(&[
                    ItemId::IRONSKIN_POTION,
                    ItemId::SHINE_POTION,
                    ItemId::NIGHT_OWL_POTION,
                    ItemId::SWIFTNESS_POTION,
                    ItemId::MINING_POTION,
                    ItemId::BUILDER_POTION,
                ]),
                rnd.get_int(1, 2),
            ),
        ),
        (0.5, item(rnd.select(&[ItemId::TORCH, ItemId::BOTTLE]), rnd.get_int(10, 20))),
        (0.5, item(ItemId::SILVER_COIN, rnd.get_int(10, 29))),
        (0.5, item(ItemId::WOOD, rnd.get_int(50, 99))),
    ]
}

fn underground_table(rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let primary = rnd.seq.pool(
        "underground primary",
        &[
            ItemId::BAND_OF_REGENERATION,
            ItemId::MAGIC_MIRROR,
            ItemId::CLOUD_IN_A_BOTTLE,
            ItemId::HERMES_BOOTS,
            ItemId::MACE,
            ItemId::SHOE_SPIKES,
        ],
    );
    vec![
        (1.0, item(primary, 1)),
        (0.05, item(ItemId::EXTRACTINATOR, 1)),
        (0.05, item(ItemId::FLARE_GUN, 1)),
        (1.0 / 3.0, item(ItemId::BOMB, rnd.get_int(10, 19))),
        (0.2, item(ItemId::ANGEL_STATUE, 1)),
        (1.0 / 3.0, item(ItemId::ROPE, rnd.get_int(50, 100))),
        (0.5, item(rnd.select(&[bar(ores.iron), bar(ores.silver)]), rnd.get_int(5, 14))),
        (
            0.5,
            item(rnd.select(&[ItemId::WOODEN_ARROW, ItemId::SHURIKEN]), rnd.get_int(25, 49)),
        ),
        global_potion(world),
        (0.5, item(ItemId::LESSER_HEALING_POTION, rnd.get_int(3, 5))),
        (
            2.0 / 3.0,
            item(
                rnd.select(&[
                    ItemId::REGENERATION_POTION,
                    ItemId::SHINE_POTION,
                    ItemId::NIGHT_OWL_POTION,
                    ItemId::SWIFTNESS_POTION,
                    ItemId::ARCHERY_POTION,
                    ItemId::GILLS_POTION,
                    ItemId::HUNTER_POTION,
                    ItemId::MINING_POTION,
                    ItemId::DANGERSENSE_POTION,
                ]),
                rnd.get_int(1, 2),
            ),
        ),
        (0.5, item(ItemId::TORCH, rnd.get_int(10, 20))),
        (2.0 / 3.0, item(ItemId::RECALL_POTION, rnd.get_int(1, 2))),
        (0.5, item(ItemId::SILVER_COIN, rnd.get_int(50, 89))),
    ]
}

fn cavern_table(at: Point, rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let primary = rnd.seq.pool(
        "cavern primary",
        &[
            ItemId::BAND_OF_REGENERATION,
            ItemId::MAGIC_MIRROR,
            ItemId::CLOUD_IN_A_BOTTLE,
            ItemId::HERMES_BOOTS,
            ItemId::SHOE_SPIKES,
            ItemId::FLARE_GUN,
        ],
    );
    let mut table = vec![
        (1.0, item(primary, 1)),
        deep_trinket(at, world),
        (0.2, item(ItemId::SUSPICIOUS_LOOKING_EYE, 1)),
        (1.0 / 3.0, item(ItemId::DYNAMITE, 1)),
        (0.25, item(ItemId::JESTERS_ARROW, rnd.get_int(25, 50))),
        (0.5, item(rnd.select(&[bar(ores.silver), bar(ores.gold)]), rnd.get_int(3, 10))),
        (
            0.5,
            item(
                rnd.select(&[ItemId::FLAMING_ARROW, ItemId::THROWING_KNIFE]),
                rnd.get_int(25, 50),
            ),
        ),
        global_potion(world),
        (0.5, item(ItemId::HEALING_POTION, rnd.get_int(3, 5))),
    ];
    table.extend(cavern_potions(rnd));
    table.extend([
        (0.5, item(ItemId::RECALL_POTION, rnd.get_int(1, 2))),
        (
            0.5,
            item(rnd.select(&[ItemId::TORCH, ItemId::GLOWSTICK]), rnd.get_int(15, 29)),
        ),
        (0.5, item(ItemId::GOLD_COIN, rnd.get_int(1, 2))),
    ]);
    table
}

fn dungeon_table(rnd: &mut Random, world: &World) -> Table {
    let primary = rnd.seq.pool(
        "dungeon primary",
        &[
            ItemId::MURAMASA,
            ItemId::COBALT_SHIELD,
            ItemId::AQUA_SCEPTER,
            ItemId::BLUE_MOON,
            ItemId::MAGIC_MISSILE,
            ItemId::VALOR,
            ItemId::HANDGUN,
        ],
    );
    let evil_bar = if world.ctx.is_crimson { ItemId::CRIMTANE_BAR } else { ItemId::DEMONITE_BAR };
    let bullet = if world.ctx.ores.silver == BlockId::SILVER_ORE {
        ItemId::SILVER_BULLET
    } else {
        ItemId::TUNGSTEN_BULLET
    };
    vec![
        (1.0, item(primary, 1)),
        (1.0 / 3.0, item(ItemId::SHADOW_KEY, 1)),
        (0.2, item(ItemId::SUSPICIOUS_LOOKING_EYE, 1)),
        (1.0 / 3.0, item(ItemId::DYNAMITE, 1)),
        (0.25, item(ItemId::JESTERS_ARROW, rnd.get_int(25, 50))),
        (0.5, item(evil_bar, rnd.get_int(3, 10))),
        (0.5, item(bullet, rnd.get_int(25, 50))),
        global_potion(world),
        (0.5, item(ItemId::HEALING_POTION, rnd.get_int(3, 5))),
        (
            2.0 / 3.0,
            item(
                rnd.select(&[
                    ItemId::SPELUNKER_POTION,
                    ItemId::FEATHERFALL_POTION,
                    ItemId::NIGHT_OWL_POTION,
                    ItemId::WATER_WALKING_POTION,
                    ItemId::ARCHERY_POTION,
                    ItemId::GRAVITATION_POTION,
                    ItemId::TITAN_POTION,
                ]),
                rnd.get_int(1, 2),
            ),
        ),
        (
            1.0 / 3.0,
            item(
                rnd.select(&[
                    ItemId::THORNS_POTION,
                    ItemId::WATER_WALKING_POTION,
                    ItemId::INVISIBILITY_POTION,
                    ItemId::HUNTER_POTION,
                    ItemId::DANGERSENSE_POTION,
                    ItemId::TELEPORTATION_POTION,
                ]),
                rnd.get_int(1, 2),
            ),
        ),
        (0.5, item(ItemId::RECALL_POTION, rnd.get_int(1, 2))),
        (0.5, item(ItemId::BONE_TORCH, rnd.get_int(15, 29))),
        (0.5, item(ItemId::GOLD_COIN, rnd.get_int(1, 2))),
    ]
}

/// Rows shared by the cavern chests of the structures below their
/// primary item.
fn cavern_rows(at: Point, arrows: [ItemId; 2], torch: ItemId, rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let mut table = vec![
        deep_trinket(at, world),
        (0.2, item(ItemId::SUSPICIOUS_LOOKING_EYE, 1)),
        (1.0 / 3.0, item(ItemId::DYNAMITE, 1)),
        (0.25, item(ItemId::JESTERS_ARROW, rnd.get_int(25, 50))),
        (0.5, item(rnd.select(&[bar(ores.silver), bar(ores.gold)]), rnd.get_int(3, 10))),
        (0.5, item(rnd.select(&arrows), rnd.get_int(25, 50))),
        global_potion(world),
        (0.5, item(ItemId::HEALING_POTION, rnd.get_int(3, 5))),
    ];
    table.extend(cavern_potions(rnd));
    table.extend([
        (0.5, item(ItemId::RECALL_POTION, rnd.get_int(1, 2))),
        (0.5, item(rnd.select(&[torch, ItemId::GLOWSTICK]), rnd.get_int(15, 29))),
        (0.5, item(ItemId::GOLD_COIN, rnd.get_int(1, 2))),
    ]);
    table
}

fn sandstone_table(at: Point, rnd: &mut Random, world: &World) -> Table {
    let primary = rnd.seq.pool(
        "sandstone primary",
        &[ItemId::STORM_SPEAR, ItemId::THUNDER_ZAPPER, ItemId::BAST_STATUE],
    );
    let mut table = vec![
        (1.0, item(primary, 1)),
        (1.0 / 7.0, item(ItemId::ENCUMBERING_STONE, 1)),
    ];
    let arrows = [ItemId::FLAMING_ARROW, ItemId::BONE_THROWING_KNIFE];
    table.extend(cavern_rows(at, arrows, ItemId::DESERT_TORCH, rnd, world));
    table
}

fn web_covered_table(rnd: &mut Random, world: &World) -> Table {
    let mut table = vec![
        (1.0, item(ItemId::WEB_SLINGER, 1)),
        (1.0, item(ItemId::COBWEB, rnd.get_int(10, 29))),
    ];
    // Web-covered chests never hold a lava charm.
    let at = Point::new(0, 0);
    let arrows = [ItemId::FLAMING_ARROW, ItemId::THROWING_KNIFE];
    table.extend(cavern_rows(at, arrows, ItemId::TORCH, rnd, world));
    table
}

fn mushroom_table(at: Point, rnd: &mut Random, world: &World) -> Table {
    let primary = rnd.seq.pool(
        "mushroom primary",
        &[
            ItemId::BAND_OF_REGENERATION,
            ItemId::MAGIC_MIRROR,
            ItemId::CLOUD_IN_A_BOTTLE,
            ItemId::HERMES_BOOTS,
            ItemId::SHROOMERANG,
        ],
    );
    let secondary = rnd.seq.pool("mushroom secondary", &[ItemId::SHROOM_MINECART, ItemId::MUSHROOM_HAT]);
    let mut table = vec![(1.0, item(primary, 1)), (1.0, item(secondary, 1))];
    let arrows = [ItemId::FLAMING_ARROW, ItemId::THROWING_KNIFE];
    table.extend(cavern_rows(at, arrows, ItemId::MUSHROOM_TORCH, rnd, world));
    table
}

fn frozen_table(rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let primary = rnd.seq.pool(
        "frozen primary",
        &[
            ItemId::ICE_BOOMERANG,
            ItemId::ICE_BLADE,
            ItemId::ICE_SKATES,
            ItemId::SNOWBALL_CANNON,
            ItemId::BLIZZARD_IN_A_BOTTLE,
            ItemId::FLURRY_BOOTS,
        ],
    );
    vec![
        (1.0, item(primary, 1)),
        (1.0 / 3.0, item(ItemId::BOMB, rnd.get_int(10, 19))),
        (0.5, item(rnd.select(&[bar(ores.silver), bar(ores.gold)]), rnd.get_int(3, 10))),
        (0.5, item(ItemId::FLAMING_ARROW, rnd.get_int(25, 50))),
        global_potion(world),
        (0.5, item(ItemId::HEALING_POTION, rnd.get_int(3, 5))),
        (0.5, item(ItemId::RECALL_POTION, rnd.get_int(1, 2))),
        (0.5, item(ItemId::ICE_TORCH, rnd.get_int(15, 29))),
        (0.5, item(ItemId::GOLD_COIN, rnd.get_int(1, 2))),
    ]
}

fn honey_table(at: Point, rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let primary = rnd.seq.pool(
        "honey primary",
        &[
            ItemId::ABEEMINATION,
            ItemId::BEE_MINECART,
            ItemId::HIVE_WAND,
            ItemId::HONEY_DISPENSER,
        ],
    );
    let mut table = vec![
        (1.0, item(primary, 1)),
        deep_trinket(at, world),
        (0.2, item(ItemId::SUSPICIOUS_LOOKING_EYE, 1)),
        (0.25, item(ItemId::JESTERS_ARROW, rnd.get_int(25, 50))),
        (0.5, item(rnd.select(&[bar(ores.silver), bar(ores.gold)]), rnd.get_int(3, 10))),
        global_potion(world),
        (0.5, item(ItemId::BOTTLED_HONEY, rnd.get_int(3, 5))),
    ];
    table.extend(cavern_potions(rnd));
    table.extend([
        (0.5, item(ItemId::RECALL_POTION, rnd.get_int(1, 2))),
        (
            0.5,
            item(rnd.select(&[ItemId::JUNGLE_TORCH, ItemId::GLOWSTICK]), rnd.get_int(15, 29)),
        ),
        (0.5, item(ItemId::GOLD_COIN, rnd.get_int(1, 2))),
    ]);
    table
}

fn ivy_table(at: Point, rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let fifth = rnd.select(&[ItemId::FLOWER_BOOTS, ItemId::FIBERGLASS_FISHING_POLE]);
    let primary = rnd.seq.pool(
        "ivy primary",
        &[
            ItemId::FERAL_CLAWS,
            ItemId::ANKLET_OF_THE_WIND,
            ItemId::STAFF_OF_REGROWTH,
            ItemId::BOOMSTICK,
            fifth,
        ],
    );
    let mut table = vec![
        (1.0, item(primary, 1)),
        deep_trinket(at, world),
        (1.0 / 3.0, item(ItemId::DYNAMITE, 1)),
        (0.5, item(rnd.select(&[bar(ores.silver), bar(ores.gold)]), rnd.get_int(3, 10))),
        global_potion(world),
        (0.5, item(ItemId::HEALING_POTION, rnd.get_int(3, 5))),
    ];
    table.extend(cavern_potions(rnd));
    table.extend([
        (0.5, item(ItemId::JUNGLE_TORCH, rnd.get_int(15, 29))),
        (0.5, item(ItemId::GOLD_COIN, rnd.get_int(1, 2))),
    ]);
    table
}

fn water_table(rnd: &mut Random, world: &World) -> Table {
    let primary = rnd.seq.pool(
        "water primary",
        &[
            ItemId::BREATHING_REED,
            ItemId::FLIPPER,
            ItemId::TRIDENT,
            ItemId::INNER_TUBE,
            ItemId::WATER_WALKING_BOOTS,
            ItemId::BEACH_BALL,
        ],
    );
    vec![
        (1.0, item(primary, 1)),
        (1.0 / 3.0, item(ItemId::GILLS_POTION, rnd.get_int(1, 3))),
        (0.5, item(ItemId::ROPE, rnd.get_int(50, 100))),
        global_potion(world),
        (0.5, item(ItemId::LESSER_HEALING_POTION, rnd.get_int(3, 5))),
        (0.5, item(ItemId::WATER_WALKING_POTION, rnd.get_int(1, 2))),
        (0.5, item(ItemId::SILVER_COIN, rnd.get_int(30, 60))),
    ]
}

fn lihzahrd_table(rnd: &mut Random, world: &World) -> Table {
    vec![
        (1.0, item(ItemId::LIHZAHRD_POWER_CELL, 1)),
        (0.5, item(ItemId::SOLAR_TABLET_FRAGMENT, rnd.get_int(3, 7))),
        (0.2, item(ItemId::LIHZAHRD_FURNACE, 1)),
        (0.2, item(ItemId::LIHZAHRD_BRICK, rnd.get_int(30, 60))),
        (0.25, item(ItemId::CHLOROPHYTE_ARROW, rnd.get_int(25, 50))),
        (0.5, item(ItemId::CHLOROPHYTE_BAR, rnd.get_int(2, 5))),
        global_potion(world),
        (0.5, item(ItemId::GREATER_HEALING_POTION, rnd.get_int(3, 5))),
        (0.5, item(ItemId::JUNGLE_TORCH, rnd.get_int(15, 29))),
        (0.5, item(ItemId::GOLD_COIN, rnd.get_int(5, 10))),
    ]
}

fn starter_table(kit: StarterKit, rnd: &mut Random, world: &World) -> Table {
    let ores = world.ctx.ores;
    let is_iron = ores.iron == BlockId::IRON_ORE;
    let anvil = if is_iron { ItemId::IRON_ANVIL } else { ItemId::LEAD_ANVIL };
    let rows = match kit {
        StarterKit::Iron => vec![
            item(if is_iron { ItemId::IRON_HELMET } else { ItemId::LEAD_HELMET }, 1),
            item(if is_iron { ItemId::IRON_CHAINMAIL } else { ItemId::LEAD_CHAINMAIL }, 1),
            item(if is_iron { ItemId::IRON_GREAVES } else { ItemId::LEAD_GREAVES }, 1),
            item(bar(ores.iron), rnd.get_int(80, 85)),
            item(ItemId::CLOUD_IN_A_BOTTLE, 1),
            item(ItemId::SILVER_COIN, rnd.get_int(12, 24)),
        ],
        StarterKit::Platinum => vec![
            item(anvil, 1),
            item(ItemId::PLATINUM_HELMET, 1),
            item(ItemId::PLATINUM_CHAINMAIL, 1),
            item(ItemId::PLATINUM_GREAVES, 1),
            item(ItemId::PLATINUM_BAR, rnd.get_int(95, 100)),
            item(ItemId::GRAPPLING_HOOK, 1),
            item(ItemId::SILVER_COIN, rnd.get_int(70, 99)),
        ],
        StarterKit::Hellstone => vec![
            item(anvil, 1),
            item(ItemId::MOLTEN_HELMET, 1),
            item(ItemId::MOLTEN_BREASTPLATE, 1),
            item(ItemId::MOLTEN_GREAVES, 1),
            item(ItemId::HELLSTONE_BAR, rnd.get_int(85, 90)),
            item(ItemId::HELLFIRE_TREADS, 1),
            item(ItemId::LIFE_CRYSTAL, rnd.get_int(2, 4)),
            item(ItemId::GOLD_COIN, rnd.get_int(1, 2)),
        ],
        StarterKit::Mythril => {
            let bar_id = if ores.mythril == BlockId::ORICHALCUM_ORE {
                ItemId::ORICHALCUM_BAR
            } else {
                ItemId::MYTHRIL_BAR
            };
            vec![
                item(anvil, 1),
                item(bar_id, rnd.get_int(75, 95)),
                item(ItemId::FLEDGLING_WINGS, 1),
                item(ItemId::LIFE_CRYSTAL, rnd.get_int(4, 6)),
                item(ItemId::GOLD_COIN, rnd.get_int(3, 6)),
            ]
        }
    };
    rows.into_iter().map(|row| (1.0, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    #[test]
    fn test_depth_kind_bands() {
        let levels = Levels::new(4200, 1200);
        assert_eq!(depth_kind(100, &levels), LootKind::Surface);
        assert_eq!(depth_kind(400, &levels), LootKind::Underground);
        assert_eq!(depth_kind(800, &levels), LootKind::Cavern);
    }

    #[test]
    fn test_every_table_yields_its_primary() {
        let world = test_world(1000, 600);
        let mut rnd = Random::new(8);
        for kind in [
            LootKind::Surface,
            LootKind::Underground,
            LootKind::Cavern,
            LootKind::Frozen,
            LootKind::Honey,
            LootKind::Ivy,
            LootKind::Water,
            LootKind::Lihzahrd,
            LootKind::Dungeon,
            LootKind::Sandstone,
            LootKind::WebCovered,
            LootKind::Mushroom,
        ] {
            let items = roll_loot(kind, Point::new(500, 500), &mut rnd, &world);
            assert!(items.len() >= 2, "{kind:?} rolled {} items", items.len());
            assert!(items.iter().all(|item| item.stack > 0));
        }
    }

    #[test]
    fn test_structure_chests_carry_signature_items() {
        let world = test_world(1000, 600);
        let mut rnd = Random::new(3);
        let web = roll_loot(LootKind::WebCovered, Point::new(500, 400), &mut rnd, &world);
        assert_eq!(web[0].id, ItemId::WEB_SLINGER);
        assert_eq!(web[1].id, ItemId::COBWEB);
        let mushroom = roll_loot(LootKind::Mushroom, Point::new(500, 400), &mut rnd, &world);
        assert!(matches!(mushroom[1].id, ItemId::SHROOM_MINECART | ItemId::MUSHROOM_HAT));
        let dungeon = roll_loot(LootKind::Dungeon, Point::new(500, 400), &mut rnd, &world);
        assert!(!dungeon.iter().any(|item| item.id == ItemId::CRIMTANE_BAR));
    }

    #[test]
    fn test_starter_kit_is_complete() {
        let world = test_world(1000, 600);
        let mut rnd = Random::new(4);
        let items = roll_loot(LootKind::Starter(StarterKit::Platinum), Point::new(0, 0), &mut rnd, &world);
        assert_eq!(items.len(), 7);
        assert_eq!(items[1].id, ItemId::PLATINUM_HELMET);
        assert_eq!(StarterKit::from_equipment(Equipment::None), None);
    }

    #[test]
    fn test_flare_gun_brings_flares() {
        let mut rnd = Random::new(5);
        let table = vec![(1.0, item(ItemId::FLARE_GUN, 1))];
        let items = fill_loot(&table, &mut rnd);
        assert_eq!(items[1].id, ItemId::FLARE);
    }
}
