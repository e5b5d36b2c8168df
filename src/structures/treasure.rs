//! Treasure placement: catalogue every flat floor spot, then scatter life
//! crystals, logs, altars, orb hearts, mana crystals, chests, pots and gems
//! over the catalogue.

use log::{debug, info};

use crate::bins::{bin_location, LocationBins};
use crate::commands;
use crate::framing::Variant;
use crate::ids::{wall_variants, BlockId, WallId};
use crate::point::Point;
use crate::random::{fnv1a32pt, Random};
use crate::structures::is_location_used;
use crate::structures::loot::{self, LootKind};
use crate::tile::{Liquid, Slope, Tile};
use crate::world::{lerp, World};

/// Draws per requested placement before giving up on the rest.
const TRIES_PER_PLACEMENT: i32 = 1000;
/// Columns and rows along the world edge that are never scanned.
const EDGE_MARGIN: i32 = 50;
/// Orb heart chambers are 8x8 with clipped corners.
const HEART_CHAMBER: i32 = 8;
const CHEST_ZONE_RADIUS: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gem {
    Topaz = 18,
    Sapphire = 36,
    Emerald = 54,
    Ruby = 72,
    Diamond = 90,
    Amber = 108,
}

/// Run `place` against random catalogue points until it reports `count`
/// successes or the draw budget runs out.
fn scatter<F>(label: &str, count: i32, max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World, mut place: F)
where
    F: FnMut(Point, &mut Random, &mut World) -> bool,
{
    let mut remaining = count;
    let mut tries = TRIES_PER_PLACEMENT * count.max(0);
    while remaining > 0 && tries > 0 {
        tries -= 1;
        let Some(pt) = bins.sample(max_bin, rnd) else {
            continue;
        };
        if place(pt, rnd, world) {
            remaining -= 1;
        }
    }
    if remaining > 0 {
        debug!("Placed {} of {} {}", count - remaining, count, label);
    }
}

fn is_floor_tile(tile: &Tile, x: i32, y: i32, world: &World) -> bool {
    tile.block.is_solid()
        && tile.slope == Slope::None
        && !tile.actuated()
        && !matches!(
            tile.block,
            BlockId::LEAF
                | BlockId::LIVING_WOOD
                | BlockId::MAHOGANY_LEAF
                | BlockId::THIN_ICE
                | BlockId::SPIKE
                | BlockId::WOODEN_SPIKE
        )
        && (!matches!(tile.block, BlockId::AETHERIUM | BlockId::PEARLSTONE) || y > world.surface(x))
}

/// Two solid floor tiles at `(x, y)` and `(x + 1, y)` with three rows of
/// dry headroom above.
pub fn is_placement_candidate(x: i32, y: i32, world: &World) -> bool {
    is_floor_tile(world.tile(x, y), x, y, world)
        && is_floor_tile(world.tile(x + 1, y), x + 1, y, world)
        && world.region_passes(x, y - 3, 2, 3, |tile| {
            tile.is_empty() && !matches!(tile.liquid, Liquid::Lava | Liquid::Shimmer)
        })
}

fn is_heart_wall(i: i32, j: i32) -> bool {
    let last = HEART_CHAMBER - 1;
    ((i == 0 || i == last) && (j < 2 || j > 5)) || ((j == 0 || j == last) && (i < 2 || i > 5))
}

/// Tendril block of an evil core whose 8x8 chamber starts at `(x, y)`, or
/// `None` when the spot cannot hold an orb heart.
fn orb_heart_tendril(x: i32, y: i32, world: &World) -> Option<BlockId> {
    if y < world.underground_level() || y > world.underworld_level() {
        return None;
    }
    let tendril = [(1, 1), (1, 6), (6, 1), (6, 6)]
        .iter()
        .map(|&(i, j)| world.tile(x + i, y + j).block)
        .find(|&block| block == BlockId::LESION || block == BlockId::FLESH)?;
    for i in 0..HEART_CHAMBER {
        for j in 0..HEART_CHAMBER {
            if is_heart_wall(i, j) {
                continue;
            }
            let allowed = matches!(
                world.tile(x + i, y + j).block,
                BlockId::CLAY
                    | BlockId::MUD
                    | BlockId::EBONSTONE
                    | BlockId::EBONSAND
                    | BlockId::CORRUPT_ICE
                    | BlockId::EBONSANDSTONE
                    | BlockId::HARDENED_EBONSAND
                    | BlockId::LESION
                    | BlockId::CRIMSTONE
                    | BlockId::CRIMSAND
                    | BlockId::CRIMSON_ICE
                    | BlockId::CRIMSANDSTONE
                    | BlockId::HARDENED_CRIMSAND
                    | BlockId::FLESH
            );
            if !allowed {
                return None;
            }
        }
    }
    Some(tendril)
}

fn attach_gem(gem: Gem, x: i32, y: i32, rnd: &mut Random, world: &mut World) -> bool {
    let (dx, dy, frame_y) = rnd.select(&[(-1, 0, 162), (1, 0, 108), (0, -1, 0), (0, 1, 54)]);
    let tile = world.tile_mut(x + dx, y + dy);
    if !tile.is_empty() {
        return false;
    }
    tile.block = BlockId::GEM;
    tile.frame_x = gem as i16;
    tile.frame_y = frame_y + 18 * (fnv1a32pt(x as u32, y as u32) % 3) as i16;
    true
}

fn is_gem_anchor(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::SAND
            | BlockId::HARDENED_SAND
            | BlockId::SANDSTONE
            | BlockId::EBONSAND
            | BlockId::HARDENED_EBONSAND
            | BlockId::EBONSANDSTONE
            | BlockId::CRIMSAND
            | BlockId::HARDENED_CRIMSAND
            | BlockId::CRIMSANDSTONE
            | BlockId::PEARLSAND
            | BlockId::HARDENED_PEARLSAND
            | BlockId::PEARLSANDSTONE
            | BlockId::CORALSTONE
    )
}

/// Amber in the desert, then ordinary gems on wet sand near the oceans.
fn place_gems(rnd: &mut Random, world: &mut World) {
    let (w, h) = (world.width(), world.height());
    let mut amber = (world.conf.variation.gems * f64::from(w) * f64::from(h) / f64::from(rnd.get_int(65_800, 76_800))) as i32;
    let reach = (world.conf.variation.desert_size * 0.08 * f64::from(w)) as i32;
    let desert = world.ctx.desert_center as i32;
    let mut tries = 800 * amber;
    while amber > 0 && tries > 0 {
        tries -= 1;
        let x = rnd.get_int(desert - reach, desert + reach);
        let y = rnd.get_int(world.underground_level(), world.underworld_level());
        if is_gem_anchor(world.tile(x, y).block) && attach_gem(Gem::Amber, x, y, rnd, world) {
            amber -= 1;
        }
    }

    let max_y = (5 * world.cavern_level() + world.underworld_level()) / 6;
    let columns = (EDGE_MARGIN..(4 * EDGE_MARGIN).min(w)).chain((w - 4 * EDGE_MARGIN).max(4 * EDGE_MARGIN)..w - EDGE_MARGIN);
    let mut anchors = Vec::new();
    for x in columns {
        for y in world.underground_level()..max_y {
            if is_gem_anchor(world.tile(x, y).block)
                && !world.region_passes(x - 1, y - 1, 3, 3, |tile| !tile.is_empty() || tile.liquid == Liquid::None)
            {
                anchors.push(Point::new(x, y));
            }
        }
    }
    rnd.seq.shuffle(&mut anchors);
    anchors.truncate(anchors.len() / 6);
    let cavern = world.cavern_level();
    for pt in anchors {
        let gem = if pt.y < cavern {
            rnd.select(&[Gem::Topaz, Gem::Sapphire, Gem::Emerald])
        } else {
            rnd.select(&[Gem::Sapphire, Gem::Emerald, Gem::Ruby, Gem::Diamond])
        };
        attach_gem(gem, pt.x, pt.y, rnd, world);
    }
}

/// High trap settings hide some life crystals inside boulders.
fn life_crystal_block(rnd: &mut Random, world: &World) -> BlockId {
    let traps = world.conf.variation.traps;
    let threshold = if traps > 14.0 { 0.0076 * traps + 0.036 } else { 0.0 };
    if rnd.get_double(0.0, 1.0) < threshold {
        BlockId::LIFE_CRYSTAL_BOULDER
    } else {
        BlockId::LIFE_CRYSTAL
    }
}

fn place_life_crystals(max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    let (w, h) = (f64::from(world.width()), f64::from(world.height()));
    let count = (world.conf.variation.life_crystals * w * h / 50_000.0) as i32;
    let mut used = Vec::new();
    scatter("life crystals", count, max_bin, bins, rnd, world, |Point { x, y }, rnd, world| {
        if y <= world.underground_level()
            || y >= world.underworld_level()
            || !is_placement_candidate(x, y, world)
            || world.tile(x, y - 2).wall == WallId::LIHZAHRD_BRICK
            || is_location_used(x, y, 50, &used, 2)
        {
            return false;
        }
        used.push(Point::new(x, y));
        world.place_framed_tile(x, y - 2, life_crystal_block(rnd, world), Variant::None);
        true
    });
}

fn place_fallen_logs(max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    let count = world.width() / rnd.get_int(1066, 1600);
    scatter("fallen logs", count, max_bin, bins, rnd, world, |Point { x, y }, _, world| {
        let ok = f64::from(y) > 0.45 * f64::from(world.underground_level())
            && y < world.underground_level()
            && world.tile(x, y).block == BlockId::GRASS
            && is_placement_candidate(x, y, world)
            && is_placement_candidate(x - 1, y, world);
        if ok {
            world.place_framed_tile(x - 1, y - 2, BlockId::FALLEN_LOG, Variant::None);
        }
        ok
    });
}

fn altar_style(block: BlockId) -> Option<Variant> {
    match block {
        BlockId::EBONSTONE
        | BlockId::CORRUPT_GRASS
        | BlockId::DEMONITE
        | BlockId::EBONSAND
        | BlockId::CORRUPT_JUNGLE_GRASS
        | BlockId::CORRUPT_ICE
        | BlockId::EBONSANDSTONE
        | BlockId::HARDENED_EBONSAND
        | BlockId::LESION => Some(Variant::Corruption),
        BlockId::CRIMSTONE
        | BlockId::CRIMSON_GRASS
        | BlockId::CRIMTANE
        | BlockId::CRIMSAND
        | BlockId::CRIMSON_JUNGLE_GRASS
        | BlockId::CRIMSON_ICE
        | BlockId::CRIMSANDSTONE
        | BlockId::HARDENED_CRIMSAND
        | BlockId::FLESH => Some(Variant::Crimson),
        _ => None,
    }
}

fn place_altars(max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    let mut count = (world.width() / 200).max(8);
    if world.conf.variation.double_trouble {
        count *= 2;
    }
    scatter("altars", count, max_bin, bins, rnd, world, |Point { x, y }, _, world| {
        if f64::from(y) < 0.8 * f64::from(world.underground_level()) {
            return false;
        }
        let Some(style) = altar_style(world.tile(x, y).block) else {
            return false;
        };
        if !is_placement_candidate(x, y, world) || !is_placement_candidate(x - 1, y, world) {
            return false;
        }
        world.place_framed_tile(x - 1, y - 2, BlockId::ALTAR, style);
        true
    });
}

fn place_orb_hearts(max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    let mut count = world.width() * world.height() / 240_000;
    if world.conf.variation.double_trouble {
        count *= 2;
    }
    scatter("orb hearts", count, max_bin, bins, rnd, world, |Point { x, y }, _, world| {
        let Some(tendril) = orb_heart_tendril(x, y, world) else {
            return false;
        };
        let (shell, style) = if tendril == BlockId::LESION {
            (BlockId::EBONSTONE, Variant::Corruption)
        } else {
            (BlockId::CRIMSTONE, Variant::Crimson)
        };
        for i in 0..HEART_CHAMBER {
            for j in 0..HEART_CHAMBER {
                if is_heart_wall(i, j) {
                    continue;
                }
                let tile = world.tile_mut(x + i, y + j);
                if tile.block != tendril {
                    tile.block = shell;
                }
            }
        }
        world.place_framed_tile(x + 3, y + 3, BlockId::ORB_HEART, style);
        true
    });
}

fn place_mana_crystals(max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    let (w, h) = (f64::from(world.width()), f64::from(world.height()));
    let count = (world.conf.variation.mana_crystals * w * h / 310_000.0) as i32;
    scatter("mana crystals", count, max_bin, bins, rnd, world, |Point { x, y }, _, world| {
        let backing = world.tile(x, y - 2).wall;
        let ok = y > world.underground_level()
            && y < world.underworld_level()
            && is_placement_candidate(x, y, world)
            && !wall_variants::contains(&wall_variants::DUNGEON, backing)
            && backing != WallId::LIHZAHRD_BRICK;
        if ok {
            world.place_framed_tile(x, y - 2, BlockId::MANA_CRYSTAL, Variant::None);
        }
        ok
    });
}

/// Chests that count as surface chests. Near the surface layer boundary
/// the decision is dithered per coordinate.
fn fuzzy_is_surface(x: i32, y: i32, world: &World) -> bool {
    y < world.underground_level()
        || (y < (2 * world.underground_level() + world.cavern_level()) / 3
            && fnv1a32pt(x as u32, y as u32) % 2 == 0)
}

/// Biome styles a chest may take from its surroundings, in tie-break order.
const CHEST_ZONES: [Variant; 11] = [
    Variant::AshWood,
    Variant::Flesh,
    Variant::Frozen,
    Variant::Granite,
    Variant::Lesion,
    Variant::Marble,
    Variant::Meteorite,
    Variant::Mushroom,
    Variant::Pearlwood,
    Variant::RichMahogany,
    Variant::Sandstone,
];

fn block_zone(block: BlockId) -> Option<Variant> {
    let zone = match block {
        BlockId::ASH | BlockId::ASH_GRASS | BlockId::OBSIDIAN => Variant::AshWood,
        BlockId::CRIMSTONE
        | BlockId::CRIMSON_GRASS
        | BlockId::CRIMSAND
        | BlockId::CRIMSON_JUNGLE_GRASS
        | BlockId::CRIMSON_ICE
        | BlockId::CRIMSANDSTONE
        | BlockId::HARDENED_CRIMSAND
        | BlockId::FLESH => Variant::Flesh,
        BlockId::SNOW | BlockId::ICE | BlockId::THIN_ICE | BlockId::SLUSH => Variant::Frozen,
        BlockId::EBONSTONE
        | BlockId::CORRUPT_GRASS
        | BlockId::EBONSAND
        | BlockId::CORRUPT_JUNGLE_GRASS
        | BlockId::CORRUPT_ICE
        | BlockId::EBONSANDSTONE
        | BlockId::HARDENED_EBONSAND
        | BlockId::LESION => Variant::Lesion,
        BlockId::GRANITE | BlockId::SMOOTH_GRANITE => Variant::Granite,
        BlockId::MARBLE | BlockId::SMOOTH_MARBLE => Variant::Marble,
        BlockId::HELIUM_MOSS_STONE | BlockId::AETHERIUM => Variant::Meteorite,
        BlockId::MUSHROOM_GRASS => Variant::Mushroom,
        BlockId::HALLOWED_GRASS
        | BlockId::PEARLSTONE
        | BlockId::HALLOWED_ICE
        | BlockId::PEARLSAND
        | BlockId::HARDENED_PEARLSAND
        | BlockId::PEARLSANDSTONE
        | BlockId::CRYSTAL_BLOCK => Variant::Pearlwood,
        BlockId::JUNGLE_GRASS | BlockId::LIVING_MAHOGANY | BlockId::MAHOGANY_LEAF => Variant::RichMahogany,
        BlockId::SAND
        | BlockId::SANDSTONE
        | BlockId::SANDSTONE_BRICK
        | BlockId::HARDENED_SAND
        | BlockId::DESERT_FOSSIL => Variant::Sandstone,
        _ => return None,
    };
    Some(zone)
}

fn wall_zone(wall: WallId) -> Option<Variant> {
    let zone = match wall {
        WallId::EMBER | WallId::CINDER | WallId::MAGMA | WallId::SMOULDERING_STONE => Variant::AshWood,
        WallId::CRIMSON_GRASS
        | WallId::CRIMSANDSTONE
        | WallId::HARDENED_CRIMSAND
        | WallId::CRIMSTONE
        | WallId::CRIMSON_CRUST
        | WallId::CRIMSON_SCAB
        | WallId::CRIMSON_TEETH
        | WallId::CRIMSON_BLISTER => Variant::Flesh,
        WallId::SNOW | WallId::ICE => Variant::Frozen,
        WallId::CORRUPT_GRASS
        | WallId::EBONSANDSTONE
        | WallId::HARDENED_EBONSAND
        | WallId::EBONSTONE
        | WallId::CORRUPT_GROWTH
        | WallId::CORRUPT_MASS
        | WallId::CORRUPT_PUSTULE
        | WallId::CORRUPT_TENDRIL => Variant::Lesion,
        WallId::GRANITE => Variant::Granite,
        WallId::MARBLE => Variant::Marble,
        WallId::MUSHROOM => Variant::Mushroom,
        WallId::HALLOWED_GRASS
        | WallId::PEARLSANDSTONE
        | WallId::HARDENED_PEARLSAND
        | WallId::HALLOWED_PRISM
        | WallId::HALLOWED_CAVERN
        | WallId::HALLOWED_SHARD
        | WallId::HALLOWED_CRYSTALLINE => Variant::Pearlwood,
        WallId::JUNGLE
        | WallId::MUD
        | WallId::LICHEN_STONE
        | WallId::LEAFY_JUNGLE
        | WallId::IVY_STONE
        | WallId::JUNGLE_VINE => Variant::RichMahogany,
        WallId::SANDSTONE | WallId::SANDSTONE_BRICK | WallId::HARDENED_SAND => Variant::Sandstone,
        _ => return None,
    };
    Some(zone)
}

/// Chest style for a floor spot at `(x, y)`.
fn chest_style(x: i32, y: i32, world: &World) -> Variant {
    let above = world.tile(x, y - 2);
    if f64::from(y) < 0.45 * f64::from(world.underground_level()) {
        return Variant::Skyware;
    } else if y > world.underworld_level() {
        return Variant::Shadow;
    } else if above.wall == WallId::HIVE {
        return Variant::Honey;
    } else if above.liquid == Liquid::Water {
        let near_edge = x < 350 || x > world.width() - 350;
        let reef = near_edge
            && (y < world.underground_level()
                || !world.region_passes(x - 2, y, 6, 6, |tile| tile.block != BlockId::CORALSTONE));
        return if reef { Variant::Reef } else { Variant::Water };
    } else if wall_variants::contains(&wall_variants::DUNGEON, above.wall) {
        return Variant::GoldLocked;
    } else if above.wall == WallId::LIHZAHRD_BRICK {
        return Variant::Lihzahrd;
    }
    let mut counts = [0; CHEST_ZONES.len()];
    let mut tally = |zone: Option<Variant>| {
        if let Some(idx) = zone.and_then(|z| CHEST_ZONES.iter().position(|&c| c == z)) {
            counts[idx] += 1;
        }
    };
    let r = CHEST_ZONE_RADIUS;
    for i in -r..r {
        for j in -r..r {
            let tile = world.tile(x + i, y + j);
            tally(block_zone(tile.block));
            tally(wall_zone(tile.wall));
        }
    }
    let count_of = |zone: Variant| CHEST_ZONES.iter().position(|&c| c == zone).map_or(0, |idx| counts[idx]);
    if count_of(Variant::Meteorite) > 0 {
        return Variant::Meteorite;
    }
    for (&zone, &count) in CHEST_ZONES.iter().zip(&counts) {
        if count <= 4 * r {
            continue;
        }
        if zone == Variant::Sandstone && fuzzy_is_surface(x, y, world) {
            return Variant::PalmWood;
        }
        if zone == Variant::Pearlwood {
            let alt = [Variant::Mushroom, Variant::Marble, Variant::Granite, Variant::RichMahogany]
                .into_iter()
                .find(|&alt| count_of(alt) > r);
            if let Some(alt) = alt {
                return alt;
            }
        }
        return zone;
    }
    if let Some(evil) = [Variant::Flesh, Variant::Lesion].into_iter().find(|&evil| count_of(evil) > 2) {
        return evil;
    }
    if fuzzy_is_surface(x, y, world) {
        Variant::None
    } else {
        Variant::Gold
    }
}

/// Loot table for a chest of `style` at `(x, y)`.
fn chest_loot(style: Variant, x: i32, y: i32, world: &World) -> LootKind {
    match style {
        Variant::Frozen => LootKind::Frozen,
        Variant::Honey => LootKind::Honey,
        Variant::Lihzahrd => LootKind::Lihzahrd,
        Variant::Mushroom => LootKind::Mushroom,
        Variant::Reef | Variant::Water => LootKind::Water,
        Variant::RichMahogany => LootKind::Ivy,
        Variant::GoldLocked | Variant::Shadow => LootKind::Cavern,
        Variant::Skyware => LootKind::Surface,
        _ if fuzzy_is_surface(x, y, world) => LootKind::Surface,
        _ => loot::depth_kind(y, &world.levels()),
    }
}

/// Gold chests, and rich mahogany ones in the lower half of the
/// underground, may turn into trapped chests. The chance grows with the trap
/// setting and is keyed to the fine noise at the spot.
fn rig_chest(style: Variant, x: i32, y: i32, rnd: &Random, world: &World) -> Variant {
    let deep_mahogany =
        style == Variant::RichMahogany && y > (world.underground_level() + world.cavern_level()) / 2;
    if style != Variant::Gold && !deep_mahogany {
        return style;
    }
    let mut threshold = lerp(0.0, 220.0, world.conf.variation.traps) as i32;
    if deep_mahogany {
        threshold = threshold.min(300);
    }
    if (99999.0 * (1.0 + rnd.fine(x, y))) as i32 % 907 < threshold {
        Variant::DeadMans
    } else {
        style
    }
}

fn place_chests(max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    let (w, h) = (f64::from(world.width()), f64::from(world.height()));
    let count = (world.conf.variation.chests * w * h / 41_800.0) as i32 - world.chests().len() as i32;
    let mut used: Vec<Point> = world.chests().iter().map(|c| Point::new(c.x, c.y)).collect();
    scatter("chests", count, max_bin, bins, rnd, world, |Point { x, y }, rnd, world| {
        let surface = world.surface(x);
        let spacing = if y > surface {
            20
        } else if f64::from(y) < 0.45 * f64::from(world.underground_level()) {
            125
        } else {
            50
        };
        if !is_placement_candidate(x, y, world) || is_location_used(x, y, spacing, &used, 1) {
            return false;
        }
        let style = chest_style(x, y, world);
        let wet = matches!(style, Variant::Reef | Variant::Water);
        if y < surface + 3 && y > surface - 8 && !wet && rnd.get_double(0.0, 1.0) < 0.85 {
            return false;
        }
        if (y < world.underground_level() && style == Variant::GoldLocked)
            || (style == Variant::Shadow && world.tile(x, y).block == BlockId::ASH)
        {
            return false;
        }
        let style = rig_chest(style, x, y, rnd, world);
        used.push(Point::new(x, y));
        let cmd = commands::Command::PlaceChest {
            x,
            y: y - 2,
            variant: style,
            loot: chest_loot(style, x, y, world),
        };
        commands::apply(&cmd, rnd, world);
        if style == Variant::DeadMans {
            world.queued_traps.push(commands::Command::AddChestTraps { x, y: y - 2 });
        }
        true
    });
}

fn pot_style(x: i32, y: i32, world: &World) -> Variant {
    match chest_style(x, y, world) {
        Variant::Flesh => Variant::Crimson,
        Variant::Frozen => Variant::Tundra,
        Variant::GoldLocked => Variant::Dungeon,
        Variant::Honey | Variant::RichMahogany => Variant::Jungle,
        Variant::Lesion => Variant::Corruption,
        Variant::Lihzahrd => Variant::Lihzahrd,
        Variant::Marble => Variant::Marble,
        Variant::Sandstone => Variant::Desert,
        Variant::Shadow => Variant::Underworld,
        Variant::Spider => Variant::Spider,
        _ => Variant::Forest,
    }
}

fn place_pots(max_bin: i32, bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    let (w, h) = (f64::from(world.width()), f64::from(world.height()));
    let count = (world.conf.variation.pots * w * h / 10_000.0) as i32;
    scatter("pots", count, max_bin, bins, rnd, world, |Point { x, y }, _, world| {
        if f64::from(y) < 0.85 * f64::from(world.underground_level()) || !is_placement_candidate(x, y, world) {
            return false;
        }
        let style = pot_style(x, y, world);
        world.place_framed_tile(x, y - 2, BlockId::POT, style);
        true
    });
}

/// Scan the world for floor spots and orb heart chambers.
fn catalogue(world: &World) -> (LocationBins, LocationBins) {
    let (w, h) = (world.width(), world.height());
    let found = world.par_collect_columns(|world, x| {
        if x < EDGE_MARGIN || x >= w - EDGE_MARGIN {
            return Vec::new();
        }
        let mut spots = Vec::new();
        for y in EDGE_MARGIN..h - EDGE_MARGIN {
            if is_placement_candidate(x, y, world) {
                spots.push((Point::new(x, y), false));
            }
            if orb_heart_tendril(x, y, world).is_some() {
                spots.push((Point::new(x, y), true));
            }
        }
        spots
    });
    let mut flat = LocationBins::new();
    let mut hearts = LocationBins::new();
    for (pt, is_heart) in found {
        if is_heart {
            hearts.insert(pt, h);
        } else {
            flat.insert(pt, h);
        }
    }
    (flat, hearts)
}

/// Catalogue floor spots, flush queued treasures, then scatter every kind
/// of treasure. Returns the floor catalogue for later decoration passes.
pub fn gen_treasure(rnd: &mut Random, world: &mut World) -> LocationBins {
    info!("Cataloging ground");
    let (flat, hearts) = catalogue(world);
    debug!("{} floor spots, {} orb heart chambers", flat.len(), hearts.len());

    info!("Placing treasures");
    let mut queued = std::mem::take(&mut world.queued_treasures);
    rnd.seq.shuffle(&mut queued);
    commands::flush(queued, rnd, world);

    let max_bin = bin_location(world.width(), world.height(), world.height());
    place_life_crystals(max_bin, &flat, rnd, world);
    place_fallen_logs(max_bin, &flat, rnd, world);
    if !world.conf.variation.purity {
        place_altars(max_bin, &flat, rnd, world);
        place_orb_hearts(max_bin, &hearts, rnd, world);
    }
    place_mana_crystals(max_bin, &flat, rnd, world);
    place_chests(max_bin, &flat, rnd, world);
    place_pots(max_bin, &flat, rnd, world);
    place_gems(rnd, world);
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::world::test_world;

    /// Stone below row 300 with a long flat cave floor at row 400.
    fn cave_world() -> World {
        let mut world = test_world(600, 800);
        for pt in Rect::new(0, 300, 600, 500).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
        }
        for pt in Rect::new(60, 390, 480, 10).points() {
            world.tile_at_mut(pt).clear_block();
        }
        world.rescan_surface();
        world
    }

    #[test]
    fn test_placement_candidate_needs_headroom() {
        let mut world = cave_world();
        assert!(is_placement_candidate(100, 400, &world));
        assert!(!is_placement_candidate(100, 399, &world));
        world.tile_mut(101, 398).liquid = Liquid::Lava;
        assert!(!is_placement_candidate(100, 400, &world));
        world.tile_mut(101, 398).liquid = Liquid::None;
        world.tile_mut(101, 400).slope = Slope::Half;
        assert!(!is_placement_candidate(100, 400, &world));
    }

    #[test]
    fn test_orb_heart_chamber() {
        let mut world = cave_world();
        for pt in Rect::new(200, 500, 8, 8).points() {
            world.tile_at_mut(pt).block = BlockId::EBONSTONE;
        }
        assert_eq!(orb_heart_tendril(200, 500, &world), None);
        world.tile_mut(201, 501).block = BlockId::LESION;
        assert_eq!(orb_heart_tendril(200, 500, &world), Some(BlockId::LESION));
        // Clipped corners may hold anything.
        world.tile_mut(200, 500).block = BlockId::GRANITE;
        assert_eq!(orb_heart_tendril(200, 500, &world), Some(BlockId::LESION));
        world.tile_mut(203, 503).block = BlockId::GRANITE;
        assert_eq!(orb_heart_tendril(200, 500, &world), None);
    }

    #[test]
    fn test_chest_style_from_surroundings() {
        let mut world = cave_world();
        assert_eq!(chest_style(100, 400, &world), Variant::Gold);
        for pt in Rect::new(90, 390, 20, 20).points() {
            world.tile_at_mut(pt).wall = WallId::GRANITE;
        }
        assert_eq!(chest_style(100, 400, &world), Variant::Granite);
        world.tile_mut(100, 398).wall = WallId::HIVE;
        assert_eq!(chest_style(100, 400, &world), Variant::Honey);
        assert_eq!(chest_style(100, 50, &world), Variant::Skyware);
    }

    #[test]
    fn test_pot_style_follows_chest_style() {
        let mut world = cave_world();
        for pt in Rect::new(90, 390, 20, 20).points() {
            world.tile_at_mut(pt).wall = WallId::SNOW;
        }
        assert_eq!(pot_style(100, 400, &world), Variant::Tundra);
    }

    #[test]
    fn test_gen_treasure_fills_cave() {
        let mut world = cave_world();
        let mut rnd = Random::new(8);
        rnd.init_noise(600, 800, 0.07);
        world.queued_treasures.push(commands::Command::PlaceChest {
            x: 300,
            y: 398,
            variant: Variant::Gold,
            loot: LootKind::Cavern,
        });
        let bins = gen_treasure(&mut rnd, &mut world);
        assert!(world.queued_treasures.is_empty());
        assert!(bins.len() > 400);
        assert!(bins.iter().all(|pt| pt.y == 400 || pt.y == 300));
        assert!(world.chests().len() > 1);
        assert!(world.chests().iter().all(|c| !c.is_empty()));
        let pots = Rect::new(60, 398, 480, 2)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::POT)
            .count();
        assert!(pots > 0);
        let crystals = Rect::new(0, 290, 600, 110)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::LIFE_CRYSTAL)
            .count();
        assert!(crystals > 0);
    }

    #[test]
    fn test_trap_setting_rigs_gold_chests() {
        let mut world = cave_world();
        let rnd = Random::new(3);
        // Flat noise rolls 229 everywhere.
        assert_eq!(rig_chest(Variant::Gold, 100, 400, &rnd, &world), Variant::Gold);
        world.conf.variation.traps = 2.0;
        assert_eq!(rig_chest(Variant::Gold, 100, 400, &rnd, &world), Variant::DeadMans);
        assert_eq!(rig_chest(Variant::RichMahogany, 100, 300, &rnd, &world), Variant::DeadMans);
        assert_eq!(rig_chest(Variant::RichMahogany, 100, 250, &rnd, &world), Variant::RichMahogany);
        assert_eq!(rig_chest(Variant::Frozen, 100, 400, &rnd, &world), Variant::Frozen);
        world.conf.variation.traps = 0.0;
        assert_eq!(rig_chest(Variant::Gold, 100, 400, &rnd, &world), Variant::Gold);
    }

    #[test]
    fn test_rigged_chests_queue_their_traps() {
        let mut world = cave_world();
        world.conf.variation.traps = 2.0;
        let mut rnd = Random::new(8);
        gen_treasure(&mut rnd, &mut world);
        assert!(!world.queued_traps.is_empty());
        for cmd in &world.queued_traps {
            let commands::Command::AddChestTraps { x, y } = *cmd else {
                panic!("unexpected command {}", cmd.name());
            };
            assert_eq!(world.tile(x, y).block, BlockId::CHEST_GROUP2);
        }
    }

    #[test]
    fn test_life_crystal_boulders_need_high_traps() {
        let mut world = cave_world();
        let mut rnd = Random::new(5);
        world.conf.variation.traps = 14.0;
        assert!((0..50).all(|_| life_crystal_block(&mut rnd, &world) == BlockId::LIFE_CRYSTAL));
        world.conf.variation.traps = 200.0;
        assert!((0..50).all(|_| life_crystal_block(&mut rnd, &world) == BlockId::LIFE_CRYSTAL_BOULDER));
    }
}
