//! Trees, cacti and ground cover
//!
//! Two passes share this module. `gen_plants` grows trees, cacti, palms and
//! bamboo on the flat floor spots catalogued by the treasure pass.
//! `gen_grasses` runs near the end of generation: it applies the queued
//! decoration commands, then dresses the same spots with herbs, rubble
//! piles, sunflowers and small plants.

use log::{debug, info};

use crate::bins::LocationBins;
use crate::commands::{self, Command};
use crate::framing::Variant;
use crate::ids::{BlockId, PaintId, WallId};
use crate::random::{fnv1a32pt, Random};
use crate::tile::{Liquid, Slope};
use crate::world::World;

/// Trunk frames cycle through three sprites.
const TRUNK_FRAME_X: i16 = 0;
const TOP_FRAME: (i16, i16) = (22, 198);
const LEFT_ROOT_FRAME: (i16, i16) = (44, 132);
const RIGHT_ROOT_FRAME: (i16, i16) = (22, 132);
const LEFT_BRANCH_FRAME: (i16, i16) = (66, 0);
const RIGHT_BRANCH_FRAME: (i16, i16) = (88, 66);
/// Chance per trunk row of a side branch.
const BRANCH_CHANCE: f64 = 0.15;
/// Palms only grow this close to the world edge unless water is nearby.
const BEACH_WIDTH: i32 = 380;
/// Coral only grows in the outer oceans.
const CORAL_REACH: i32 = 200;
/// Desert herbs stay clear of the beaches.
const DESERT_HERB_MARGIN: i32 = 350;

/// Integer roll derived from the fine noise, stable per coordinate.
fn noise_roll(x: i32, y: i32, rnd: &Random) -> i32 {
    (99999.0 * (1.0 + rnd.fine(x, y))) as i32
}

fn is_region_empty(x: i32, y: i32, width: i32, height: i32, world: &World) -> bool {
    world.region_passes(x, y, width, height, |tile| tile.is_empty())
}

fn is_tree(block: BlockId) -> bool {
    matches!(block, BlockId::TREE | BlockId::ASH_TREE | BlockId::MUSHROOM_TREE)
}

/// Inside the flooded bowl of a sunken world, where nothing grows.
fn is_sunken(y: i32, world: &World) -> bool {
    let mid = world.width() / 2;
    world.conf.variation.sunken
        && y < world.underground_level()
        && y > world.surface(mid - 130).max(world.surface(mid + 130))
}

fn set_tree_cell(x: i32, y: i32, block: BlockId, frame: (i16, i16), paint: PaintId, world: &mut World) {
    let tile = world.tile_mut(x, y);
    tile.block = block;
    tile.frame_x = frame.0;
    tile.frame_y = frame.1;
    tile.block_paint = paint;
    tile.liquid = Liquid::None;
    tile.slope = Slope::None;
}

/// Grow a three-wide tree with its roots on row `y - 1`. The three ground
/// tiles at `x..x + 3` must all be `ground`.
pub fn grow_tree(x: i32, y: i32, ground: BlockId, tree: BlockId, rnd: &mut Random, world: &mut World) -> bool {
    if is_sunken(y, world) {
        return false;
    }
    if (0..3).any(|i| world.tile(x + i, y).block != ground) {
        return false;
    }
    if is_tree(world.tile(x - 1, y - 2).block) || is_tree(world.tile(x - 2, y - 2).block) {
        return false;
    }
    let height = rnd.get_int(7, 15);
    if !is_region_empty(x, y - 4 - height, 3, height + 4, world) {
        return false;
    }
    if y < world.underground_level() {
        for i in 0..3 {
            world.tile_mut(x + i, y).wall = WallId::EMPTY;
        }
    }
    let paint = world.tile(x + 1, y).block_paint;
    for j in 0..height {
        let row = y + j - height;
        let cycle = 22 * rnd.get_int(0, 2) as i16;
        if j == 0 {
            set_tree_cell(x + 1, row, tree, (TOP_FRAME.0, TOP_FRAME.1 + cycle), paint, world);
            continue;
        }
        set_tree_cell(x + 1, row, tree, (TRUNK_FRAME_X, cycle), paint, world);
        if j == height - 1 {
            if rnd.get_bool() {
                set_tree_cell(x, row, tree, (LEFT_ROOT_FRAME.0, LEFT_ROOT_FRAME.1 + cycle), paint, world);
            }
            if rnd.get_bool() {
                set_tree_cell(x + 2, row, tree, (RIGHT_ROOT_FRAME.0, RIGHT_ROOT_FRAME.1 + cycle), paint, world);
            }
        } else if j >= 2 && j < height - 3 {
            if rnd.get_double(0.0, 1.0) < BRANCH_CHANCE {
                set_tree_cell(x, row, tree, (LEFT_BRANCH_FRAME.0, LEFT_BRANCH_FRAME.1 + cycle), paint, world);
            }
            if rnd.get_double(0.0, 1.0) < BRANCH_CHANCE {
                set_tree_cell(x + 2, row, tree, (RIGHT_BRANCH_FRAME.0, RIGHT_BRANCH_FRAME.1 + cycle), paint, world);
            }
        }
    }
    true
}

fn grow_bamboo(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    if rnd.get_double(0.0, 1.0) > 0.21 {
        return;
    }
    for i in 0..11 {
        let tile = world.tile(x, y - i - 1);
        if !tile.is_empty() || (tile.liquid == Liquid::Water && i > 4) {
            return;
        }
    }
    let size = rnd.get_int(3, 10);
    let paint = world.tile(x, y).block_paint;
    for i in 0..size {
        let frame = if i == 0 {
            rnd.get_int(0, 4)
        } else if i == size - 1 {
            rnd.get_int(14, 19)
        } else {
            rnd.get_int(5, 13)
        };
        let tile = world.tile_mut(x, y - i - 1);
        tile.block = BlockId::BAMBOO_STALK;
        tile.block_paint = paint;
        tile.frame_x = 18 * frame as i16;
    }
}

/// Stack a cactus on the sand at `(x, y)`, sprouting arms that tend to
/// continue once started.
fn place_cactus(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    let size = rnd.get_int(3, 7);
    for i in 0..size {
        world.tile_mut(x, y - i - 1).block = BlockId::CACTUS_PLANT;
        if i == 0 {
            continue;
        }
        for side in [-1, 1] {
            let odds = if world.tile(x + side, y - i).block == BlockId::CACTUS_PLANT {
                3
            } else {
                1
            };
            if rnd.get_int(0, 4) < odds {
                world.tile_mut(x + side, y - i - 1).block = BlockId::CACTUS_PLANT;
            }
        }
    }
}

fn grow_cactus(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    if rnd.get_double(0.0, 1.0) > 0.07 || !is_region_empty(x - 1, y - 8, 3, 8, world) {
        if noise_roll(x, y, rnd) % 13 == 0 {
            world.queued_deco.push(Command::PlaceDryBones { x, y });
        }
        return;
    }
    place_cactus(x, y, rnd, world);
}

/// Bleached bones on open desert sand. Queued by the plant pass and applied
/// once the surface has settled.
pub fn place_dry_bones(x: i32, y: i32, world: &mut World) {
    let flat_sand = world.region_passes(x, y, 3, 1, |tile| {
        tile.block == BlockId::SAND && tile.slope == Slope::None
    });
    if flat_sand && is_region_empty(x, y - 2, 3, 2, world) {
        world.place_framed_tile(x, y - 2, BlockId::LARGE_PILE_GROUP2, Variant::DryBone);
    }
}

/// A palm trunk that bends gradually towards a random lean.
fn place_palm_tree(x: i32, y: i32, height: i32, rnd: &mut Random, world: &mut World) {
    let mut bend: i16 = 0;
    let target_bend = 2 * rnd.get_int(-8, 8) as i16;
    for j in 0..height {
        let frame_x = if j == height - 1 {
            22 * rnd.get_int(4, 6)
        } else if j == 0 {
            66
        } else {
            22 * rnd.get_int(0, 2)
        };
        let tile = world.tile_mut(x + 1, y - j - 1);
        tile.block = BlockId::PALM_TREE;
        tile.frame_x = frame_x as i16;
        tile.frame_y = bend;
        if j * 4 > height {
            if bend > target_bend {
                bend -= 2;
            } else if bend < target_bend {
                bend += 2;
            }
        }
    }
}

fn grow_palm_tree(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    if rnd.get_double(0.0, 1.0) > 0.3 {
        return;
    }
    if (0..3).any(|i| world.tile(x + i, y).block != BlockId::SAND) {
        return;
    }
    if world.tile(x - 1, y - 2).block == BlockId::PALM_TREE || world.tile(x - 2, y - 2).block == BlockId::PALM_TREE {
        return;
    }
    let height = rnd.get_int(10, 20);
    if is_region_empty(x, y - 4 - height, 3, height + 4, world) {
        place_palm_tree(x, y, height, rnd, world);
    }
}

/// Palms on beaches and oases, cacti in open desert.
fn grow_sand_plant(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    if is_sunken(y, world) {
        return;
    }
    let above = world.tile(x, y - 1);
    if !above.wall.is_empty() || above.liquid != Liquid::None {
        return;
    }
    let mut sand_count = 0;
    for i in -10..10 {
        for j in -8..8 {
            match world.tile(x + i, y + j).block {
                BlockId::GRASS | BlockId::CACTUS_PLANT => return,
                BlockId::SAND
                | BlockId::HARDENED_SAND
                | BlockId::EBONSAND
                | BlockId::HARDENED_EBONSAND
                | BlockId::CRIMSAND
                | BlockId::HARDENED_CRIMSAND => sand_count += 1,
                _ => {}
            }
        }
    }
    if sand_count < 15 {
        return;
    }
    if x < BEACH_WIDTH || x > world.width() - BEACH_WIDTH {
        grow_palm_tree(x, y, rnd, world);
        return;
    }
    let mut water_count = 0;
    for i in -50..50 {
        for j in -25..25 {
            if world.tile(x + i, y + j).liquid == Liquid::Water {
                water_count += 1;
                if water_count > 5 {
                    grow_palm_tree(x, y, rnd, world);
                    return;
                }
            }
        }
    }
    grow_cactus(x, y, rnd, world);
}

fn grow_plant_at(x: i32, y: i32, rnd: &mut Random, world: &mut World) -> bool {
    let block = world.tile(x, y).block;
    let above = *world.tile(x, y - 1);
    let underground = world.underground_level();
    match block {
        BlockId::ASH_GRASS => {
            above.liquid == Liquid::None
                && rnd.get_double(0.0, 1.0) < 0.18
                && grow_tree(x, y, block, BlockId::ASH_TREE, rnd, world)
        }
        BlockId::CORRUPT_GRASS
        | BlockId::CORRUPT_JUNGLE_GRASS
        | BlockId::CRIMSON_GRASS
        | BlockId::CRIMSON_JUNGLE_GRASS
        | BlockId::GRASS
        | BlockId::HALLOWED_GRASS
        | BlockId::SNOW => {
            y < underground
                && above.liquid == Liquid::None
                && above.wall.is_empty()
                && rnd.get_double(0.0, 1.0) < 0.21
                && grow_tree(x, y, block, BlockId::TREE, rnd, world)
        }
        BlockId::JUNGLE_GRASS if y < underground => {
            if above.liquid == Liquid::Water {
                grow_bamboo(x, y, rnd, world);
                if world.tile(x + 1, y).block == BlockId::JUNGLE_GRASS {
                    grow_bamboo(x + 1, y, rnd, world);
                }
                false
            } else {
                above.wall.is_empty()
                    && rnd.get_double(0.0, 1.0) < 0.2
                    && grow_tree(x, y, block, BlockId::TREE, rnd, world)
            }
        }
        BlockId::JUNGLE_GRASS => {
            above.liquid == Liquid::None
                && rnd.get_double(0.0, 1.0) < 0.09
                && grow_tree(x, y, block, BlockId::TREE, rnd, world)
        }
        BlockId::MUSHROOM_GRASS => {
            above.liquid == Liquid::None
                && rnd.get_double(0.0, 1.0) < 0.35
                && grow_tree(x, y, block, BlockId::MUSHROOM_TREE, rnd, world)
        }
        BlockId::SAND if y < underground => {
            grow_sand_plant(x, y, rnd, world);
            false
        }
        _ => false,
    }
}

pub fn gen_plants(bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    info!("Growing trees");
    let mut trees = 0;
    for pt in bins.iter() {
        if grow_plant_at(pt.x, pt.y, rnd, world) {
            trees += 1;
        }
    }
    debug!("Grew {} trees", trees);
}

fn is_living_tree_floor(block: BlockId) -> bool {
    matches!(block, BlockId::GRASS | BlockId::LIVING_WOOD)
}

fn is_open_air(world: &World, x: i32, y: i32, width: i32, height: i32) -> bool {
    world.region_passes(x, y, width, height, |tile| tile.is_empty() && tile.wall.is_empty())
}

/// Rubble at the foot of a living tree, or leaf litter up in its canopy.
fn place_living_tree_deco_at(x: i32, rnd: &Random, world: &mut World) {
    let y = world.surface(x);
    let flat = |world: &World, x, y, width, pred: fn(BlockId) -> bool| {
        world.region_passes(x, y, width, 1, |tile| tile.slope == Slope::None && pred(tile.block))
    };
    match noise_roll(x, y, rnd) % 5 {
        0 => {
            if let Some(j) = (-10..10)
                .find(|&j| is_open_air(world, x, y + j, 2, 1) && flat(world, x, y + j + 1, 2, is_living_tree_floor))
            {
                world.place_framed_tile(x, y + j, BlockId::SMALL_PILE, Variant::LivingWood);
            }
        }
        1 => {
            if let Some(j) = (-10..10)
                .find(|&j| is_open_air(world, x, y + j, 3, 2) && flat(world, x, y + j + 2, 3, is_living_tree_floor))
            {
                world.place_framed_tile(x, y + j, BlockId::LARGE_PILE_GROUP2, Variant::LivingWood);
            }
        }
        2 | 3 => {
            if let Some(j) = (-120..-10).find(|&j| {
                flat(world, x, y + j + 2, 3, |b| b == BlockId::LEAF) && is_open_air(world, x, y + j, 3, 2)
            }) {
                world.place_framed_tile(x, y + j, BlockId::LARGE_PILE_GROUP2, Variant::LivingLeaf);
            }
        }
        _ => {}
    }
}

/// Decorate the 20 columns on either side of every living tree trunk.
fn grow_living_tree_deco(rnd: &Random, world: &mut World) {
    let mut place_until = -1;
    for x in 300..world.width() - 300 {
        if world.tile(x, world.surface(x)).block == BlockId::LIVING_WOOD {
            place_until = x + 20;
        }
        if x - 20 < place_until {
            place_living_tree_deco_at(x - 20, rnd, world);
        }
    }
}

fn has_spider_wall(world: &World, x: i32, y: i32, width: i32, height: i32) -> bool {
    !world.region_passes(x, y, width, height, |tile| tile.wall != WallId::SPIDER)
}

fn place_small_pile(x: i32, y: i32, world: &mut World) -> bool {
    let next = *world.tile(x + 1, y);
    if next.block != world.tile(x, y).block || next.slope != Slope::None || !world.tile(x + 1, y - 1).is_empty() {
        return false;
    }
    if has_spider_wall(world, x - 1, y - 1, 4, 3) {
        world.place_framed_tile(x, y - 1, BlockId::SMALL_PILE, Variant::Spider);
        return true;
    }
    let variant = match next.block {
        BlockId::ASH
        | BlockId::ASH_GRASS
        | BlockId::BLUE_BRICK
        | BlockId::GREEN_BRICK
        | BlockId::PINK_BRICK
        | BlockId::HELLSTONE
        | BlockId::HELLSTONE_BRICK
        | BlockId::OBSIDIAN_BRICK => {
            if y < world.underground_level() {
                Variant::Stone
            } else {
                Variant::Bone
            }
        }
        BlockId::DIRT => Variant::Dirt,
        BlockId::GRANITE => Variant::Granite,
        BlockId::GRASS | BlockId::HALLOWED_GRASS => Variant::Forest,
        BlockId::ICE | BlockId::SNOW => Variant::Ice,
        BlockId::MARBLE => Variant::Marble,
        BlockId::SANDSTONE => Variant::Sandstone,
        BlockId::STONE => Variant::Stone,
        _ => return false,
    };
    world.place_framed_tile(x, y - 1, BlockId::SMALL_PILE, variant);
    true
}

fn place_large_pile(x: i32, y: i32, world: &mut World) -> bool {
    if !is_region_empty(x, y - 2, 3, 2, world)
        || !world.region_passes(x + 1, y, 2, 1, |tile| tile.slope == Slope::None && tile.block.is_solid())
    {
        return false;
    }
    if has_spider_wall(world, x - 1, y - 1, 5, 4) {
        world.place_framed_tile(x, y - 2, BlockId::LARGE_PILE_GROUP2, Variant::Spider);
        return true;
    }
    let bones = fnv1a32pt(x as u32, y as u32) % 5 == 0;
    let (block, variant) = match world.tile(x + 1, y).block {
        BlockId::ASH
        | BlockId::ASH_GRASS
        | BlockId::HELLSTONE
        | BlockId::HELLSTONE_BRICK
        | BlockId::OBSIDIAN_BRICK => {
            if y > world.underworld_level() && bones {
                (BlockId::LARGE_PILE, Variant::Bone)
            } else {
                (BlockId::LARGE_PILE_GROUP2, Variant::Ash)
            }
        }
        BlockId::BLUE_BRICK | BlockId::GREEN_BRICK | BlockId::PINK_BRICK => {
            if y > world.underground_level() && bones {
                (BlockId::LARGE_PILE, Variant::Bone)
            } else {
                return false;
            }
        }
        BlockId::GRANITE => (BlockId::LARGE_PILE_GROUP2, Variant::Granite),
        BlockId::GRASS | BlockId::HALLOWED_GRASS => (BlockId::LARGE_PILE_GROUP2, Variant::Forest),
        BlockId::ICE | BlockId::SNOW => (BlockId::LARGE_PILE, Variant::Ice),
        BlockId::JUNGLE_GRASS => (BlockId::LARGE_PILE_GROUP2, Variant::Jungle),
        BlockId::LIHZAHRD_BRICK if world.tile(x + 1, y - 1).wall == WallId::LIHZAHRD_BRICK => {
            (BlockId::LARGE_PILE_GROUP2, Variant::Lihzahrd)
        }
        BlockId::MARBLE => (BlockId::LARGE_PILE_GROUP2, Variant::Marble),
        BlockId::MUSHROOM_GRASS => (BlockId::LARGE_PILE, Variant::Mushroom),
        BlockId::SANDSTONE | BlockId::EBONSANDSTONE | BlockId::CRIMSANDSTONE | BlockId::PEARLSANDSTONE => {
            (BlockId::LARGE_PILE_GROUP2, Variant::Sandstone)
        }
        BlockId::STONE => (BlockId::LARGE_PILE, Variant::Stone),
        _ => return false,
    };
    world.place_framed_tile(x, y - 2, block, variant);
    true
}

fn place_sunflower(x: i32, y: i32, world: &mut World) -> bool {
    let next = world.tile(x + 1, y);
    if next.block != BlockId::GRASS || next.slope != Slope::None || !is_open_air(world, x, y - 4, 2, 4) {
        return false;
    }
    world.place_framed_tile(x, y - 4, BlockId::SUNFLOWER, Variant::None);
    true
}

/// Herb sprite for the ground below, if one grows there.
fn herb_frame(base: BlockId, x: i32, roll: i32, world: &World) -> Option<i16> {
    match base {
        BlockId::ASH | BlockId::ASH_GRASS => Some(90),
        BlockId::CORRUPT_GRASS
        | BlockId::CORRUPT_JUNGLE_GRASS
        | BlockId::CRIMSON_GRASS
        | BlockId::CRIMSON_JUNGLE_GRASS
        | BlockId::EBONSTONE
        | BlockId::CRIMSTONE => Some(54),
        BlockId::DIRT | BlockId::MUD => Some(36),
        BlockId::GRASS | BlockId::HALLOWED_GRASS => Some(0),
        BlockId::JUNGLE_GRASS if roll % 61 == 0 => Some(18),
        BlockId::SAND | BlockId::PEARLSAND
            if x > DESERT_HERB_MARGIN && x < world.width() - DESERT_HERB_MARGIN =>
        {
            Some(72)
        }
        BlockId::SNOW | BlockId::ICE if roll % 61 == 0 => Some(108),
        _ => None,
    }
}

/// Dress the floor tile at `(x, y)` with whatever fits its ground.
fn grow_grass(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    let base = *world.tile(x, y);
    let above = *world.tile(x, y - 1);
    if base.slope != Slope::None || !above.is_empty() {
        return;
    }
    let roll = noise_roll(x, y, rnd);
    if above.liquid == Liquid::Water
        && matches!(base.block, BlockId::SAND | BlockId::CORALSTONE)
        && (x < CORAL_REACH || x > world.width() - CORAL_REACH)
        && roll % 7 == 0
    {
        let tile = world.tile_mut(x, y - 1);
        tile.block = BlockId::CORAL;
        tile.frame_x = 26 * (fnv1a32pt(x as u32, y as u32) % 6) as i16;
        return;
    }
    if above.liquid != Liquid::None {
        return;
    }
    if roll % 61 < 2 {
        if let Some(frame_x) = herb_frame(base.block, x, roll, world) {
            let tile = world.tile_mut(x, y - 1);
            tile.block = BlockId::HERB;
            tile.frame_x = frame_x;
            tile.frame_y = 0;
            return;
        }
    }
    let (small_odds, large_odds) = if matches!(above.wall, WallId::GRANITE | WallId::MARBLE) {
        (5, 6)
    } else {
        (1, 1)
    };
    if roll % 41 < small_odds && place_small_pile(x, y, world) {
        return;
    }
    if roll % 37 < large_odds && place_large_pile(x, y, world) {
        return;
    }
    if base.block == BlockId::GRASS && roll % 3 == 0 && rnd.coarse(x, y) < -0.3 && place_sunflower(x, y, world) {
        return;
    }
    let tall = rnd.coarse(x, y) > 0.0;
    match base.block {
        BlockId::ASH_GRASS => world.place_framed_tile(x, y - 1, BlockId::ASH_PLANT, Variant::None),
        BlockId::CORRUPT_GRASS => world.place_framed_tile(x, y - 1, BlockId::CORRUPT_PLANT, Variant::None),
        BlockId::CRIMSON_GRASS => world.place_framed_tile(x, y - 1, BlockId::CRIMSON_PLANT, Variant::None),
        BlockId::HALLOWED_GRASS => world.place_framed_tile(x, y - 1, BlockId::HALLOWED_PLANT, Variant::None),
        BlockId::GRASS => {
            let plant = if tall { BlockId::TALL_GRASS_PLANT } else { BlockId::GRASS_PLANT };
            world.place_framed_tile(x, y - 1, plant, Variant::None);
        }
        BlockId::JUNGLE_GRASS => {
            let broad = is_region_empty(x, y - 2, 3, 2, world)
                && world.region_passes(x + 1, y, 2, 1, |tile| {
                    tile.block == BlockId::JUNGLE_GRASS && tile.slope == Slope::None
                })
                && roll % 3 != 0;
            if broad {
                world.place_framed_tile(x, y - 2, BlockId::LARGE_JUNGLE_PLANT, Variant::None);
            } else {
                let plant = if tall { BlockId::TALL_JUNGLE_PLANT } else { BlockId::JUNGLE_PLANT };
                world.place_framed_tile(x, y - 1, plant, Variant::None);
                world.tile_mut(x, y - 1).block_paint = base.block_paint;
            }
        }
        BlockId::MUSHROOM_GRASS => {
            world.place_framed_tile(x, y - 1, BlockId::MUSHROOM_PLANT, Variant::None);
            world.tile_mut(x, y - 1).block_paint = base.block_paint;
        }
        _ => {}
    }
}

pub fn gen_grasses(bins: &LocationBins, rnd: &mut Random, world: &mut World) {
    info!("Growing plants");
    rnd.shuffle_noise();
    let deco = std::mem::take(&mut world.queued_deco);
    commands::flush(deco, rnd, world);
    grow_living_tree_deco(rnd, world);
    for pt in bins.iter() {
        grow_grass(pt.x, pt.y, rnd, world);
        grow_grass(pt.x + 1, pt.y, rnd, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point, Rect};
    use crate::random::NoiseField;
    use crate::world::test_world;

    /// Flat ground of `block` on row 100 over dirt.
    fn meadow(block: BlockId) -> World {
        let mut world = test_world(600, 600);
        for pt in Rect::new(0, 100, 600, 500).points() {
            world.tile_at_mut(pt).block = if pt.y == 100 { block } else { BlockId::DIRT };
        }
        world.rescan_surface();
        world
    }

    fn flat_noise(value: f64) -> NoiseField {
        NoiseField::from_fn(600, 600, move |_, _| value)
    }

    #[test]
    fn test_tree_grows_on_flat_grass() {
        let mut world = meadow(BlockId::GRASS);
        world.tile_mut(11, 100).wall = WallId::DIRT;
        let mut rnd = Random::new(3);
        assert!(grow_tree(10, 100, BlockId::GRASS, BlockId::TREE, &mut rnd, &mut world));
        assert_eq!(world.tile(11, 99).block, BlockId::TREE);
        assert_eq!(world.tile(11, 93).block, BlockId::TREE);
        assert!(world.tile(11, 84).is_empty());
        assert!(world.tile(11, 100).wall.is_empty());
        let top = (84..100).find(|&y| world.tile(11, y).block == BlockId::TREE);
        assert_eq!(world.tile(11, top.unwrap_or(0)).frame_x, TOP_FRAME.0);
    }

    #[test]
    fn test_tree_needs_matching_ground() {
        let mut world = meadow(BlockId::GRASS);
        world.tile_mut(12, 100).block = BlockId::DIRT;
        let mut rnd = Random::new(3);
        assert!(!grow_tree(10, 100, BlockId::GRASS, BlockId::TREE, &mut rnd, &mut world));
        assert!(world.tile(11, 99).is_empty());
    }

    #[test]
    fn test_trees_keep_their_distance() {
        let mut world = meadow(BlockId::GRASS);
        let mut rnd = Random::new(3);
        assert!(grow_tree(10, 100, BlockId::GRASS, BlockId::TREE, &mut rnd, &mut world));
        assert!(!grow_tree(13, 100, BlockId::GRASS, BlockId::TREE, &mut rnd, &mut world));
        assert!(world.tile(14, 99).is_empty());
    }

    #[test]
    fn test_cactus_stacks_on_sand() {
        let mut world = meadow(BlockId::SAND);
        let mut rnd = Random::new(9);
        place_cactus(50, 100, &mut rnd, &mut world);
        for y in 97..100 {
            assert_eq!(world.tile(50, y).block, BlockId::CACTUS_PLANT);
        }
        assert!(world.tile(50, 92).is_empty());
    }

    #[test]
    fn test_palm_trunk_is_one_wide() {
        let mut world = meadow(BlockId::SAND);
        let mut rnd = Random::new(9);
        place_palm_tree(20, 100, 12, &mut rnd, &mut world);
        assert_eq!(world.tile(21, 99).frame_x, 66);
        assert_eq!(world.tile(21, 88).block, BlockId::PALM_TREE);
        assert!(world.tile(21, 87).is_empty());
        assert!(world.tile(20, 95).is_empty());
    }

    #[test]
    fn test_dry_bones_need_open_sand() {
        let mut world = meadow(BlockId::SAND);
        place_dry_bones(30, 100, &mut world);
        assert_eq!(world.tile(30, 98).block, BlockId::LARGE_PILE_GROUP2);
        assert_eq!(world.tile(32, 99).block, BlockId::LARGE_PILE_GROUP2);
        let mut world = meadow(BlockId::GRASS);
        place_dry_bones(30, 100, &mut world);
        assert!(world.tile(30, 98).is_empty());
    }

    #[test]
    fn test_herbs_follow_ground() {
        let mut world = meadow(BlockId::DIRT);
        let mut rnd = Random::new(1);
        // Rolls exactly a multiple of 61.
        rnd.noise = flat_noise(60024.5 / 99999.0 - 1.0);
        grow_grass(40, 100, &mut rnd, &mut world);
        assert_eq!(world.tile(40, 99).block, BlockId::HERB);
        assert_eq!(world.tile(40, 99).frame_x, 36);
    }

    #[test]
    fn test_gen_grasses_flushes_deco_and_plants() {
        let mut world = meadow(BlockId::GRASS);
        let mut rnd = Random::new(1);
        rnd.noise = flat_noise(-0.5);
        for x in 200..210 {
            world.tile_mut(x, 100).block = BlockId::SAND;
        }
        world.queued_deco.push(Command::PlaceDryBones { x: 200, y: 100 });
        let mut bins = LocationBins::new();
        bins.insert(Point::new(60, 100), 600);
        bins.insert(Point::new(80, 100), 600);
        gen_grasses(&bins, &mut rnd, &mut world);
        assert!(world.queued_deco.is_empty());
        assert_eq!(world.tile(200, 98).block, BlockId::LARGE_PILE_GROUP2);
        for x in [60, 61, 80, 81] {
            assert_eq!(world.tile(x, 99).block, BlockId::GRASS_PLANT);
        }
        assert!(world.tile(62, 99).is_empty());
    }

    #[test]
    fn test_sunken_bowl_stays_bare() {
        let mut world = meadow(BlockId::GRASS);
        world.conf.variation.sunken = true;
        for x in 150..450 {
            world.set_surface(x, 60);
        }
        let mut rnd = Random::new(3);
        assert!(!grow_tree(300, 100, BlockId::GRASS, BlockId::TREE, &mut rnd, &mut world));
    }
}
