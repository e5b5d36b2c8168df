//! Granite caves
//!
//! Granite grows outward from open stone pockets. The pixel grain carves
//! winding tunnels through a noisy disc; the hex grain clears whole small
//! hex cells wherever the comb cell was already open.

use std::collections::HashSet;

use log::{debug, info};

use crate::config::BiomeLayout;
use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::tile::Flag;
use crate::world::{Biome, World};
use crate::zone::{hex_centroid_of, iterate_zone, Grain};

use super::{fill_large_wall_gaps, find_stone_cave};

/// World area per granite cave at frequency 1.
const AREA_PER_CAVE: f64 = 2_000_000.0;
const MIN_CAVE_SIZE: i32 = 30;
/// Extra radius of the dirt-to-granite ring around deep caves.
const DIRT_RING: f64 = 60.0;

/// Blocks that keep their own wall when granite spreads over them.
fn keeps_wall(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::SAND
            | BlockId::HARDENED_SAND
            | BlockId::SANDSTONE
            | BlockId::ICE
            | BlockId::SNOW
            | BlockId::MARBLE
            | BlockId::MUD
            | BlockId::MUSHROOM_GRASS
            | BlockId::JUNGLE_GRASS
    )
}

fn fill_granite_cave(cx: i32, cy: i32, rnd: &mut Random, world: &mut World) {
    let mut size = world.conf.variation.granite_size * rnd.get_double(70.0, 150.0);
    let shuffle = Point::new(rnd.get_int(0, world.width()), rnd.get_int(0, world.height()));
    let (fx, fy) = (f64::from(cx), f64::from(cy));
    if !world.conf.variation.shattered {
        fill_large_wall_gaps(
            Point::new((fx - 0.71 * size) as i32, (fy - 0.71 * size) as i32),
            Point::new((fx + 0.71 * size) as i32, (fy + 0.71 * size) as i32),
            rnd,
            world,
        );
    }
    let underworld = world.underworld_level();
    let span = |size: f64, c: f64| (c - size).max(0.0) as i32..(c + size).ceil() as i32;
    for x in span(size, fx) {
        for y in span(size, fy) {
            let threshold = (f64::from(x) - fx).hypot(f64::from(y) - fy) / size;
            let shifted = rnd.fine(x + shuffle.x, y + shuffle.y);
            if shifted < 6.0 * threshold - 5.0 {
                continue;
            }
            let clear = (rnd.coarse(x, 2 * y) + 0.1).abs() < 0.2 - 0.05 * threshold
                && rnd.fine(x, y) > (-0.16f64).min(4.0 * threshold - 4.16);
            let solid = if clear { BlockId::EMPTY } else { BlockId::GRANITE };
            let tile = world.tile_mut(x, y);
            let block = tile.block;
            match block {
                BlockId::DIRT | BlockId::GRASS | BlockId::STONE => tile.block = solid,
                BlockId::SAND | BlockId::CLAY => {
                    tile.block = if clear { BlockId::EMPTY } else { BlockId::SMOOTH_GRANITE };
                }
                BlockId::ICE
                | BlockId::SANDSTONE
                | BlockId::MUD
                | BlockId::JUNGLE_GRASS
                | BlockId::MUSHROOM_GRASS
                | BlockId::MARBLE
                    if shifted > 0.0 =>
                {
                    tile.block = solid;
                }
                _ => {}
            }
            if (!tile.wall.is_empty() || clear)
                && y < underworld
                && !keeps_wall(tile.block)
                && (tile.wall != WallId::MARBLE || shifted > 0.0)
            {
                tile.wall = WallId::GRANITE;
            }
        }
    }
    size += DIRT_RING;
    if fy - size < f64::from(world.cavern_level()) {
        return;
    }
    for x in span(size, fx) {
        for y in span(size, fy) {
            if (f64::from(x) - fx).hypot(f64::from(y) - fy) < size && world.tile(x, y).block == BlockId::DIRT {
                world.tile_mut(x, y).block = BlockId::GRANITE;
            }
        }
    }
}

/// Granite over the border-bounded comb cell around `(x, y)`. Small hex
/// cells at `scale` that touch an opening are cleared outright.
fn fill_granite_cell(x: i32, y: i32, scale: i32, world: &mut World) {
    let bounds = Rect::new(0, 0, world.width(), world.height());
    let cells = iterate_zone(Point::new(x, y), bounds, |pt| world.tile_at(pt).flag != Flag::Border).cells;
    let open: HashSet<Point> = cells
        .iter()
        .map(|&pt| (pt, hex_centroid_of(pt, scale)))
        .filter(|&(pt, centroid)| world.tile_at(pt).is_empty() || world.tile_at(centroid).is_empty())
        .map(|(_, centroid)| centroid)
        .collect();
    let shattered = world.conf.variation.shattered;
    let underworld = world.underworld_level();
    for pt in cells {
        let cleared = open.contains(&hex_centroid_of(pt, scale));
        let tile = world.tile_at_mut(pt);
        let block = tile.block;
        match block {
            BlockId::DIRT | BlockId::GRASS | BlockId::STONE | BlockId::MUD => {
                tile.block = if cleared { BlockId::EMPTY } else { BlockId::GRANITE };
            }
            BlockId::SAND | BlockId::CLAY => {
                tile.block = if cleared { BlockId::EMPTY } else { BlockId::SMOOTH_GRANITE };
            }
            _ => {}
        }
        if (!shattered && pt.y < underworld) || !tile.wall.is_empty() {
            tile.wall = WallId::GRANITE;
        }
    }
}

pub fn gen_granite_cave(rnd: &mut Random, world: &mut World, grain: Grain) {
    info!("Smoothing granite");
    let area = f64::from(world.width()) * f64::from(world.height());
    let num_caves = (world.conf.variation.granite_freq * area / AREA_PER_CAVE) as i32;
    let mid = (world.underground_level() + world.cavern_level()) / 2;
    match grain {
        Grain::Pixel => {
            rnd.restore_shuffle_state();
            let y_min = if world.conf.world.biomes == BiomeLayout::Layers {
                (0.526 * f64::from(world.height())) as i32
            } else {
                mid
            };
            for _ in 0..num_caves {
                if let Some(pt) = find_stone_cave(y_min, world.underworld_level(), rnd, world, MIN_CAVE_SIZE) {
                    fill_granite_cave(pt.x, pt.y, rnd, world);
                }
            }
        }
        Grain::Hex(scale) => {
            let size = world.conf.variation.granite_size;
            let scan = (size * 90.0) as i32;
            for _ in 0..num_caves {
                let Some(pt) = find_stone_cave(mid, world.underworld_level(), rnd, world, MIN_CAVE_SIZE) else {
                    continue;
                };
                if world.tile_at(pt).flag == Flag::Border {
                    debug!("Granite cave at ({}, {}) landed on a cell border", pt.x, pt.y);
                    continue;
                }
                fill_granite_cell(pt.x, pt.y, scale, world);
                // Spread into nearby forest stone cells.
                for _ in 0..(size * 20.0) as i32 {
                    let x = pt.x + rnd.get_int(-scan, scan);
                    let y = pt.y + rnd.get_int(-scan, scan);
                    if world.biome(x, y).active == Biome::Forest && world.tile(x, y).block == BlockId::STONE {
                        fill_granite_cell(x, y, scale, world);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::NoiseField;
    use crate::world::test_world;

    fn stone_world(width: i32, height: i32) -> World {
        let mut world = test_world(width, height);
        for pt in Rect::new(0, 0, width, height).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
        }
        world
    }

    #[test]
    fn test_keeps_wall() {
        assert!(keeps_wall(BlockId::MARBLE));
        assert!(!keeps_wall(BlockId::GRANITE));
        assert!(!keeps_wall(BlockId::EMPTY));
    }

    #[test]
    fn test_fill_granite_cave_solid_core() {
        let mut world = stone_world(400, 600);
        let mut rnd = Random::new(5);
        // The coarse band never matches, so nothing is carved open.
        rnd.noise = NoiseField::from_fn(400, 600, |_, _| 0.5);
        fill_granite_cave(200, 200, &mut rnd, &mut world);
        assert_eq!(world.tile(200, 200).block, BlockId::GRANITE);
        assert_eq!(world.tile(200, 200).wall, WallId::GRANITE);
        assert_eq!(world.tile(2, 2).block, BlockId::STONE);
    }

    #[test]
    fn test_granite_cell_clears_open_hexes() {
        let mut world = stone_world(120, 120);
        for y in 0..120 {
            world.tile_mut(60, y).flag = Flag::Border;
        }
        let hole = hex_centroid_of(Point::new(30, 30), 12);
        world.tile_at_mut(hole).block = BlockId::EMPTY;
        fill_granite_cell(20, 80, 12, &mut world);
        assert!(world.tile(30, 30).is_empty());
        assert_eq!(world.tile(20, 100).block, BlockId::GRANITE);
        assert_eq!(world.tile(90, 90).block, BlockId::STONE);
        assert_eq!(world.tile(60, 90).block, BlockId::STONE);
    }
}
