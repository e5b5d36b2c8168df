//! Biome generators
//!
//! Each sub-module is one scheduler step (or a small family of them). They
//! are built from three shapes of algorithm:
//!
//! - threshold carving: compare a positional threshold against noise
//!   samples per tile (`base`, `ocean`, `evil`, `hallow`, caves)
//! - rejection sampling: draw anchors and test them with region scans
//!   (`find_stone_cave`, `hive`, `asteroid_field`)
//! - connectivity graphs: see `structures::temple`
//!
//! The helpers below are shared across generators.

pub mod asteroid_field;
pub mod base;
pub mod desert;
pub mod evil;
pub mod glowing_moss;
pub mod glowing_mushroom;
pub mod granite_cave;
pub mod hallow;
pub mod hardmode_ores;
pub mod hex_base;
pub mod hive;
pub mod jungle;
pub mod marble_cave;
pub mod ocean;
pub mod patches;
pub mod snow;
pub mod swap_resources;

use std::ops::Range;

use log::debug;

use crate::ids::{BlockId, WallId};
use crate::point::Point;
use crate::random::Random;
use crate::tile::Slope;
use crate::world::{Biome, ColumnMut, World, WorldView};

/// Draws before `find_stone_cave` gives up.
const CAVE_SEARCH_BUDGET: u32 = 20_000;

/// Noise threshold for ore placement at the given ore multiplier. More ore
/// pushes the threshold towards zero.
pub fn ore_threshold(multiplier: f64) -> f64 {
    -0.65 * (-0.09 * multiplier).exp()
}

/// Run `f` on each column of `columns` in parallel. Other columns are
/// left alone; `f` may only draw on noise, never on the RNG stream.
pub fn carve_columns<F>(world: &mut World, columns: Range<i32>, f: F)
where
    F: Fn(&WorldView<'_>, &mut ColumnMut<'_>) + Sync,
{
    world.par_columns_mut(|view, col| {
        if columns.contains(&col.x) {
            f(view, col);
        }
    });
}

/// Give most wall-less tiles in the rectangle a dirt wall, leaving a few
/// noise-shaped gaps. Biome passes later recolour the dirt walls.
pub fn fill_large_wall_gaps(from: Point, to: Point, rnd: &Random, world: &mut World) {
    let y_max = to.y.min(world.underworld_level());
    for x in from.x..to.x {
        for y in from.y..y_max {
            let fine = rnd.fine(x, y);
            let tile = world.tile_mut(x, y);
            if tile.wall.is_empty() && fine < 0.55 {
                tile.wall = WallId::DIRT;
            }
        }
    }
}

/// Scan from `(x, y)` in steps of `step` while the tile is empty. Returns
/// the first non-empty coordinate or the last one before `limit`.
fn scan_open(world: &World, mut x: i32, mut y: i32, step: (i32, i32), limit: i32) -> (i32, i32) {
    loop {
        let next = (x + step.0, y + step.1);
        let edge = if step.0 != 0 { next.0 } else { next.1 };
        if edge <= 0 || edge >= limit || !world.tile(x, y).is_empty() {
            return (x, y);
        }
        x = next.0;
        y = next.1;
    }
}

/// Find an open pocket enclosed by stone on all four sides, at least
/// `min_size` tall and wide. The size requirement drops by one every 100
/// failed draws (never below 3).
pub fn find_stone_cave(
    y_min: i32,
    y_max: i32,
    rnd: &mut Random,
    world: &World,
    mut min_size: i32,
) -> Option<Point> {
    for tries in 0..CAVE_SEARCH_BUDGET {
        if tries % 100 == 99 && min_size > 3 {
            min_size -= 1;
        }
        let x = rnd.get_int(50, world.width() - 50);
        let y = rnd.get_int(y_min, y_max);
        if !world.tile(x, y).is_empty() {
            continue;
        }
        let (_, roof) = scan_open(world, x, y - 1, (0, -1), world.height());
        if world.tile(x, roof).block != BlockId::STONE {
            continue;
        }
        let (_, floor) = scan_open(world, x, y + 1, (0, 1), world.height());
        if world.tile(x, floor).block != BlockId::STONE || floor - roof < min_size {
            continue;
        }
        let (left, _) = scan_open(world, x - 1, y, (-1, 0), world.width());
        if world.tile(left, y).block != BlockId::STONE {
            continue;
        }
        let (right, _) = scan_open(world, x + 1, y, (1, 0), world.width());
        if world.tile(right, y).block != BlockId::STONE || right - left < min_size {
            continue;
        }
        return Some(Point::new((left + right) / 2, (floor + roof) / 2));
    }
    debug!("No stone cave found between rows {} and {}", y_min, y_max);
    None
}

/// Frame column of the moss plant that grows on each glowing moss stone.
fn moss_frame_x(block: BlockId) -> Option<i16> {
    match block {
        BlockId::LAVA_MOSS_STONE => Some(110),
        BlockId::KRYPTON_MOSS_STONE => Some(132),
        BlockId::XENON_MOSS_STONE => Some(154),
        BlockId::ARGON_MOSS_STONE => Some(176),
        BlockId::NEON_MOSS_STONE => Some(198),
        BlockId::HELIUM_MOSS_STONE => Some(220),
        _ => None,
    }
}

/// Sprout moss plants on the open sides of a glowing moss block.
pub fn grow_moss_on(x: i32, y: i32, world: &mut World) {
    let base = *world.tile(x, y);
    let Some(frame_x) = moss_frame_x(base.block) else { return };
    if base.slope != Slope::None {
        return;
    }
    for (i, j, frame_y) in [(0, -1, 0), (0, 1, 54), (1, 0, 108), (-1, 0, 162)] {
        let tile = world.tile_mut(x + i, y + j);
        if tile.is_empty() {
            tile.block = BlockId::MOSS_PLANT;
            tile.frame_x = frame_x;
            tile.frame_y = (frame_y + 18 * (x + i + y + j).rem_euclid(3)) as i16;
        }
    }
}

/// True when the tile and the four points `scan` tiles away all belong to
/// `biome`.
pub fn is_in_biome(x: i32, y: i32, scan: i32, biome: Biome, world: &World) -> bool {
    [(0, 0), (-scan, 0), (scan, 0), (0, -scan), (0, scan)]
        .iter()
        .all(|(i, j)| world.biome(x + i, y + j).active == biome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::world::{test_world, BiomeData};

    #[test]
    fn test_ore_threshold_rises_with_multiplier() {
        assert!((ore_threshold(0.0) + 0.65).abs() < 1e-12);
        assert!(ore_threshold(4.0) > ore_threshold(1.0));
        assert!(ore_threshold(100.0) < 0.0);
    }

    #[test]
    fn test_find_stone_cave() {
        let mut world = test_world(200, 120);
        for pt in Rect::new(0, 0, 200, 120).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
        }
        let cave = Rect::new(60, 40, 80, 20);
        for pt in cave.points() {
            world.tile_at_mut(pt).block = BlockId::EMPTY;
        }
        let mut rnd = Random::new(4);
        let found = find_stone_cave(40, 59, &mut rnd, &world, 6).unwrap();
        assert!(cave.contains(found));
    }

    #[test]
    fn test_find_stone_cave_gives_up() {
        let world = test_world(200, 120);
        let mut rnd = Random::new(4);
        assert_eq!(find_stone_cave(10, 100, &mut rnd, &world, 6), None);
    }

    #[test]
    fn test_moss_needs_unsloped_base() {
        let mut world = test_world(20, 20);
        world.tile_mut(5, 5).block = BlockId::XENON_MOSS_STONE;
        world.tile_mut(5, 5).slope = Slope::Half;
        grow_moss_on(5, 5, &mut world);
        assert!(world.tile(5, 4).is_empty());
        world.tile_mut(5, 5).slope = Slope::None;
        world.tile_mut(6, 5).block = BlockId::STONE;
        grow_moss_on(5, 5, &mut world);
        assert_eq!(world.tile(5, 4).frame_x, 154);
        assert_eq!(world.tile(6, 5).block, BlockId::STONE);
    }

    #[test]
    fn test_is_in_biome() {
        let mut world = test_world(50, 50);
        world.init_biome_data();
        for x in 10..30 {
            for y in 10..30 {
                *world.biome_mut(x, y) = BiomeData::pure(Biome::Snow);
            }
        }
        assert!(is_in_biome(20, 20, 5, Biome::Snow, &world));
        assert!(!is_in_biome(12, 20, 5, Biome::Snow, &world));
    }
}
