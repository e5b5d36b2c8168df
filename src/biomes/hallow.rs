//! Hallow
//!
//! A cluster of tall diamonds is marked with red wire, each with a small
//! blue-wired core. Marked tiles are converted to their hallowed
//! counterparts, exposed pearl blocks are eroded and the cores become
//! crystal.

use std::collections::HashMap;

use log::{debug, info};

use crate::cleanup::attached_open_wall;
use crate::ids::{wall_variants, BlockId, PaintId, WallId};
use crate::point::Point;
use crate::random::Random;
use crate::tile::{Slope, TileFlags};
use crate::world::World;

/// Columns kept clear of the hallow at either world edge.
const EDGE_MARGIN: i32 = 300;

/// Visit a diamond of `2 * top` columns: a triangular top of height
/// `top`, a rectangular middle of height `center`, and a mirrored bottom.
fn iterate_diamond(top: i32, center: i32, mut f: impl FnMut(i32, i32)) {
    for i in 0..2 * top {
        let slant = (f64::from(top - i) - 0.5).abs();
        for j in slant as i32..top {
            f(i, j);
        }
        for j in 0..center {
            f(i, j + top);
        }
        let max_j = (f64::from(top) - slant) as i32;
        for j in 0..max_j {
            f(i, j + top + center);
        }
    }
}

/// Blocks the hallow refuses to overlap.
fn is_evil(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::CORRUPT_ICE
            | BlockId::CORRUPT_JUNGLE_GRASS
            | BlockId::CRIMSAND
            | BlockId::CRIMSANDSTONE
            | BlockId::CRIMSON_ICE
            | BlockId::CRIMSON_JUNGLE_GRASS
            | BlockId::CRIMSTONE
            | BlockId::EBONSAND
            | BlockId::EBONSANDSTONE
            | BlockId::EBONSTONE
            | BlockId::FLESH
            | BlockId::HARDENED_CRIMSAND
            | BlockId::HARDENED_EBONSAND
            | BlockId::HARDENED_SAND
            | BlockId::LESION
    )
}

/// Pick the hallow's centre column away from the edges, spawn, biome
/// centres and the surface evil. The clearance shrinks after every miss,
/// so the loop ends once it reaches zero.
fn select_hallow_location(rnd: &mut Random, world: &World) -> i32 {
    let avoid = [
        100,
        world.width() - 100,
        world.ctx.spawn.x,
        world.ctx.desert_center as i32,
        world.ctx.jungle_center as i32,
        world.ctx.snow_center as i32,
        world.ctx.surface_evil_center,
    ];
    let mut scan = (0.12 * f64::from(world.width())) as i32;
    loop {
        let x = rnd.get_int(EDGE_MARGIN, world.width() - EDGE_MARGIN);
        let clear = avoid.iter().all(|col| (col - x).abs() >= scan / 2);
        if clear {
            let surface = world.surface(x);
            let passes = world.region_passes(x - scan, surface / 2, scan, world.underworld_level() - surface, |tile| {
                !is_evil(tile.block)
            });
            if passes {
                return x;
            }
        }
        scan -= 1;
        if scan <= 0 {
            debug!("Hallow clearance exhausted, settling on column {}", x);
            return x;
        }
    }
}

/// Mark the diamonds with red wire and their cores with blue wire.
fn mark_for_hallow(center_x: i32, rnd: &mut Random, world: &mut World) {
    let scan = (0.07 * f64::from(world.width())) as i32;
    let area = world.width() * world.height();
    let num_diamonds = rnd.get_int(27, 31);
    for _ in 0..num_diamonds {
        let top = 25 + area / rnd.get_int(76_800, 230_400);
        let center = rnd.get_int(top / 2, (1.5 * f64::from(top)) as i32);
        let mut x = rnd.get_int(center_x - scan, center_x + scan - 2 * top);
        let mut y = rnd.get_int((0.1 * f64::from(world.underground_level())) as i32, world.underworld_level());
        iterate_diamond(top, center, |i, j| world.tile_mut(x + i, y + j).flags.set(TileFlags::WIRE_RED, true));
        x += (0.9 * f64::from(top)) as i32;
        y += (0.9 * f64::from(top) + 0.45 * f64::from(center)) as i32;
        if y > world.surface(x) - 50 && y < world.height() - 100 {
            iterate_diamond(top / 10, center / 10, |i, j| {
                world.tile_mut(x + i, y + j).flags.set(TileFlags::WIRE_BLUE, true)
            });
        }
    }
}

fn hallow_block(block: BlockId) -> Option<BlockId> {
    let converted = match block {
        BlockId::GRASS | BlockId::CORRUPT_GRASS | BlockId::CRIMSON_GRASS => BlockId::HALLOWED_GRASS,
        BlockId::STONE | BlockId::EBONSTONE | BlockId::CRIMSTONE | BlockId::SMOOTH_MARBLE | BlockId::SMOOTH_GRANITE => {
            BlockId::PEARLSTONE
        }
        BlockId::ICE | BlockId::CORRUPT_ICE | BlockId::CRIMSON_ICE => BlockId::HALLOWED_ICE,
        BlockId::SAND | BlockId::EBONSAND | BlockId::CRIMSAND => BlockId::PEARLSAND,
        BlockId::HARDENED_SAND | BlockId::HARDENED_EBONSAND | BlockId::HARDENED_CRIMSAND => {
            BlockId::HARDENED_PEARLSAND
        }
        BlockId::SANDSTONE | BlockId::EBONSANDSTONE | BlockId::CRIMSANDSTONE => BlockId::PEARLSANDSTONE,
        BlockId::CORRUPT_JUNGLE_GRASS | BlockId::CRIMSON_JUNGLE_GRASS => BlockId::JUNGLE_GRASS,
        BlockId::LEAF | BlockId::MAHOGANY_LEAF => BlockId::AETHERIUM,
        BlockId::LIVING_WOOD | BlockId::LIVING_MAHOGANY => BlockId::PEARLSTONE,
        BlockId::LESION | BlockId::FLESH => BlockId::CRYSTAL_BLOCK,
        _ => return None,
    };
    Some(converted)
}

/// Per-world wall remap. Natural wall families each draw a random hallowed
/// variant.
fn hallow_walls(rnd: &mut Random) -> HashMap<WallId, WallId> {
    let mut walls = HashMap::from([
        (WallId::LIVING_LEAF, WallId::AETHERIUM),
        (WallId::GRASS, WallId::HALLOWED_GRASS),
        (WallId::FLOWER, WallId::HALLOWED_GRASS),
        (WallId::JUNGLE, WallId::HALLOWED_GRASS),
        (WallId::CORRUPT_GRASS, WallId::HALLOWED_GRASS),
        (WallId::CRIMSON_GRASS, WallId::HALLOWED_GRASS),
        (WallId::SANDSTONE, WallId::PEARLSANDSTONE),
        (WallId::EBONSANDSTONE, WallId::PEARLSANDSTONE),
        (WallId::CRIMSANDSTONE, WallId::PEARLSANDSTONE),
        (WallId::HARDENED_SAND, WallId::HARDENED_PEARLSAND),
        (WallId::HARDENED_EBONSAND, WallId::HARDENED_PEARLSAND),
        (WallId::HARDENED_CRIMSAND, WallId::HARDENED_PEARLSAND),
    ]);
    let families = wall_variants::DIRT
        .iter()
        .chain(wall_variants::STONE.iter())
        .chain(wall_variants::JUNGLE.iter())
        .chain(wall_variants::CORRUPTION.iter())
        .chain(wall_variants::CRIMSON.iter())
        .chain(
            [
                WallId::SNOW,
                WallId::ICE,
                WallId::MUSHROOM,
                WallId::MARBLE,
                WallId::GRANITE,
                WallId::CORRUPT_TENDRIL,
                WallId::CRIMSON_BLISTER,
            ]
            .iter(),
        );
    for &wall in families {
        walls.insert(wall, rnd.select(&wall_variants::HALLOW));
    }
    walls
}

fn is_painted(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::CLOUD
            | BlockId::RAIN_CLOUD
            | BlockId::SNOW_CLOUD
            | BlockId::JUNGLE_GRASS
            | BlockId::MUSHROOM_GRASS
            | BlockId::HIVE
    )
}

fn erodes(converted: BlockId, original: BlockId) -> bool {
    matches!(converted, BlockId::PEARLSTONE | BlockId::HALLOWED_ICE | BlockId::PEARLSANDSTONE)
        && !matches!(original, BlockId::LIVING_WOOD | BlockId::LIVING_MAHOGANY)
}

pub fn gen_hallow(rnd: &mut Random, world: &mut World) {
    info!("Illuminating the world");
    let center_x = select_hallow_location(rnd, world);
    let walls = hallow_walls(rnd);
    let scan = (0.07 * f64::from(world.width())) as i32;
    let unpainted = world.conf.variation.unpainted;
    mark_for_hallow(center_x, rnd, world);

    let mut erosion = Vec::new();
    let mut cores = Vec::new();
    for x in center_x - scan..center_x + scan {
        for y in 0..world.height() {
            if !world.tile(x, y).flags.contains(TileFlags::WIRE_RED) {
                continue;
            }
            let tile = world.tile_mut(x, y);
            tile.flags.set(TileFlags::WIRE_RED, false);
            if tile.flags.contains(TileFlags::WIRE_BLUE) {
                tile.flags.set(TileFlags::WIRE_BLUE, false);
                tile.block = BlockId::CRYSTAL_BLOCK;
                tile.slope = Slope::None;
                tile.guarded = false;
                cores.push(Point::new(x, y));
            }
            let original = tile.block;
            if let Some(block) = hallow_block(original) {
                tile.block = block;
            }
            if let Some(&wall) = walls.get(&tile.wall) {
                tile.wall = wall;
            }
            let block = tile.block;
            if !unpainted && is_painted(block) {
                tile.block_paint = if block == BlockId::JUNGLE_GRASS { PaintId::CYAN } else { PaintId::PINK };
            }
            if block != original && erodes(block, original) && world.is_exposed(x, y) {
                erosion.push(Point::new(x, y));
            }
        }
    }

    for &pt in &erosion {
        if !world.tile_at(pt).wall.is_empty() {
            let (wall, paint) = attached_open_wall(world, pt.x, pt.y);
            let tile = world.tile_at_mut(pt);
            tile.wall = wall;
            tile.wall_paint = paint;
        }
    }
    for &pt in &erosion {
        world.tile_at_mut(pt).block = BlockId::EMPTY;
    }

    let solid_cores: Vec<Point> = cores
        .into_iter()
        .filter(|&pt| {
            rnd.fine(2 * pt.x, 2 * pt.y).abs() > 0.09
                && world.region_passes(pt.x - 1, pt.y - 1, 3, 3, |tile| tile.block == BlockId::CRYSTAL_BLOCK)
        })
        .collect();
    for pt in solid_cores {
        let tile = world.tile_at_mut(pt);
        tile.block = BlockId::PEARLSTONE;
        tile.wall = WallId::AMETHYST_GEMSPARK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::random::NoiseField;
    use crate::world::test_world;

    #[test]
    fn test_diamond_is_symmetric() {
        let mut cells = Vec::new();
        iterate_diamond(4, 3, |i, j| cells.push((i, j)));
        // Columns 0 and 7 are the narrow tips; the middle two are full height.
        let column = |i| cells.iter().filter(|c| c.0 == i).count();
        assert_eq!(column(0), column(7));
        assert_eq!(column(3), 4 + 3 + 3);
        assert!(column(0) < column(3));
        assert!(cells.iter().all(|&(_, j)| (0..11).contains(&j)));
    }

    #[test]
    fn test_hallow_blocks() {
        assert_eq!(hallow_block(BlockId::STONE), Some(BlockId::PEARLSTONE));
        assert_eq!(hallow_block(BlockId::FLESH), Some(BlockId::CRYSTAL_BLOCK));
        assert_eq!(hallow_block(BlockId::MUD), None);
        assert!(erodes(BlockId::PEARLSTONE, BlockId::STONE));
        assert!(!erodes(BlockId::PEARLSTONE, BlockId::LIVING_WOOD));
    }

    #[test]
    fn test_location_avoids_evil() {
        let mut world = test_world(1000, 600);
        for x in 0..500 {
            for y in 100..370 {
                world.tile_mut(x, y).block = BlockId::EBONSTONE;
            }
        }
        world.rescan_surface();
        world.ctx.spawn = Point::new(500, 100);
        let mut rnd = Random::new(12);
        let x = select_hallow_location(&mut rnd, &world);
        // Clear of spawn, and the region left of it must avoid the ebonstone.
        assert!((500..=700).contains(&x));
    }

    #[test]
    fn test_gen_hallow_converts_stone() {
        let mut world = test_world(1000, 600);
        for pt in Rect::new(0, 150, 1000, 450).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
        }
        world.rescan_surface();
        let mut rnd = Random::new(21);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.0);
        gen_hallow(&mut rnd, &mut world);
        let all = Rect::new(0, 0, 1000, 600);
        assert!(all.points().any(|pt| world.tile_at(pt).block == BlockId::PEARLSTONE));
        assert!(!all.points().any(|pt| world.tile_at(pt).flags.contains(TileFlags::WIRE_RED)));
    }
}
