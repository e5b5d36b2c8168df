//! Marble caves
//!
//! Each cave starts from an open stone pocket found by `find_stone_cave`.
//! With the pixel grain the marble fills a noisy ellipse around it; with the
//! hex grain it fills the whole comb cell the pocket sits in.

use log::{debug, info};

use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::tile::{Flag, Tile};
use crate::world::World;
use crate::zone::{iterate_zone, Grain};

use super::{fill_large_wall_gaps, find_stone_cave};

/// World area per marble cave at frequency 1.
const AREA_PER_CAVE: f64 = 1_200_000.0;
const MIN_CAVE_SIZE: i32 = 30;

/// Running stalactite state for one column of a cave.
#[derive(Default)]
struct Stalactite {
    len: i32,
    iter: i32,
}

impl Stalactite {
    /// Convert one tile, growing stalactites down from marble ceilings.
    fn marbleize(&mut self, x: i32, y: i32, rnd: &Random, world: &mut World, hex: bool) {
        let below_empty = world.tile(x, y + 1).is_empty();
        let tile = world.tile_mut(x, y);
        let block = tile.block;
        match block {
            BlockId::DIRT | BlockId::STONE | BlockId::MUD => self.ceiling(tile, x, rnd, below_empty),
            BlockId::JUNGLE_GRASS if !hex => self.ceiling(tile, x, rnd, below_empty),
            BlockId::CLAY | BlockId::SAND => tile.block = BlockId::SMOOTH_MARBLE,
            BlockId::EMPTY if below_empty && self.len > 0 => {
                tile.block = BlockId::MARBLE;
                self.len -= 1;
            }
            _ => {}
        }
    }

    fn ceiling(&mut self, tile: &mut Tile, x: i32, rnd: &Random, below_empty: bool) {
        tile.block = BlockId::MARBLE;
        if below_empty {
            self.len = (16.0 * rnd.fine(4 * x, 100 * self.iter)).max(0.0) as i32;
            self.iter += 1;
        }
    }
}

fn fill_marble_cave(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    let size = world.conf.variation.marble_size;
    let cave_width = size * rnd.get_double(70.0, 150.0);
    let cave_height = size * rnd.get_double(40.0, 70.0);
    rnd.shuffle_noise();
    let (fx, fy) = (f64::from(x), f64::from(y));
    fill_large_wall_gaps(
        Point::new((fx - 0.7 * cave_width) as i32, (fy - 0.7 * cave_height) as i32),
        Point::new((fx + 0.7 * cave_width) as i32, (fy + 0.7 * cave_height) as i32),
        rnd,
        world,
    );
    let mut i = ((-cave_width) as i32).max(-x);
    while f64::from(i) < cave_width {
        let mut column = Stalactite::default();
        let mut j = ((-cave_height) as i32).max(-y);
        while f64::from(j) < cave_height {
            let threshold = 4.0 * (f64::from(i) / cave_width).hypot(f64::from(j) / cave_height) - 3.0;
            if rnd.fine(x + i, y + j) >= threshold {
                column.marbleize(x + i, y + j, rnd, world, false);
                let tile = world.tile_mut(x + i, y + j);
                if !tile.wall.is_empty() {
                    tile.wall = WallId::MARBLE;
                }
            }
            j += 1;
        }
        i += 1;
    }
}

/// Convert the border-bounded cell around `(x, y)`.
fn fill_marble_cell(x: i32, y: i32, rnd: &Random, world: &mut World) {
    let bounds = Rect::new(0, 0, world.width(), world.height());
    let mut cells = iterate_zone(Point::new(x, y), bounds, |pt| world.tile_at(pt).flag != Flag::Border).cells;
    cells.sort_unstable_by_key(|pt| (pt.x, pt.y));
    let shattered = world.conf.variation.shattered;
    let mut last_x = None;
    let mut column = Stalactite::default();
    for pt in cells {
        if last_x != Some(pt.x) {
            last_x = Some(pt.x);
            column = Stalactite::default();
        }
        column.marbleize(pt.x, pt.y, rnd, world, true);
        let tile = world.tile_at_mut(pt);
        if !shattered || !tile.wall.is_empty() {
            tile.wall = WallId::MARBLE;
        }
    }
}

pub fn gen_marble_cave(rnd: &mut Random, world: &mut World, grain: Grain) {
    info!("Excavating marble");
    let area = f64::from(world.width()) * f64::from(world.height());
    let num_caves = (world.conf.variation.marble_freq * area / AREA_PER_CAVE) as i32;
    let y_min = (world.underground_level() + world.cavern_level()) / 2;
    for _ in 0..num_caves {
        let Some(Point { x, y }) = find_stone_cave(y_min, world.underworld_level(), rnd, world, MIN_CAVE_SIZE) else {
            continue;
        };
        if !grain.is_hex() {
            fill_marble_cave(x, y, rnd, world);
        } else if world.tile(x, y).flag != Flag::Border {
            fill_marble_cell(x, y, rnd, world);
        } else {
            debug!("Marble cave at ({}, {}) landed on a cell border", x, y);
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
    fn test_fill_marble_cave_center() {
        let mut world = stone_world(300, 600);
        let mut rnd = Random::new(2);
        rnd.noise = NoiseField::from_fn(300, 600, |_, _| 0.0);
        fill_marble_cave(150, 150, &mut rnd, &mut world);
        assert_eq!(world.tile(150, 150).block, BlockId::MARBLE);
        assert_eq!(world.tile(150, 150).wall, WallId::MARBLE);
        assert_eq!(world.tile(5, 5).block, BlockId::STONE);
    }

    #[test]
    fn test_marble_cell_stops_at_border() {
        let mut world = stone_world(100, 100);
        for y in 0..100 {
            world.tile_mut(50, y).flag = Flag::Border;
        }
        let rnd = Random::new(2);
        fill_marble_cell(20, 50, &rnd, &mut world);
        assert_eq!(world.tile(20, 50).block, BlockId::MARBLE);
        assert_eq!(world.tile(49, 99).block, BlockId::MARBLE);
        assert_eq!(world.tile(50, 50).block, BlockId::STONE);
        assert_eq!(world.tile(70, 50).block, BlockId::STONE);
        assert!(world.tile(70, 50).wall.is_empty());
    }

    #[test]
    fn test_stalactite_hangs_from_ceiling() {
        let mut world = stone_world(20, 40);
        for y in 10..40 {
            world.tile_mut(5, y).block = BlockId::EMPTY;
        }
        let mut rnd = Random::new(2);
        rnd.noise = NoiseField::from_fn(20, 40, |_, _| 0.5);
        let mut column = Stalactite::default();
        for y in 0..20 {
            column.marbleize(5, y, &rnd, &mut world, false);
        }
        // 16 * 0.5 = 8 tiles hang below the ceiling at row 9.
        assert!((10..18).all(|y| world.tile(5, y).block == BlockId::MARBLE));
        assert!(world.tile(5, 18).is_empty());
    }

    #[test]
    fn test_gen_marble_cave_finds_pocket() {
        let mut world = stone_world(200, 600);
        for pt in Rect::new(60, 200, 80, 60).points() {
            world.tile_at_mut(pt).block = BlockId::EMPTY;
        }
        world.conf.variation.marble_freq = 10.0;
        let mut rnd = Random::new(11);
        rnd.noise = NoiseField::from_fn(200, 600, |_, _| 0.0);
        gen_marble_cave(&mut rnd, &mut world, Grain::Pixel);
        let marble = Rect::new(0, 0, 200, 600)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::MARBLE)
            .count();
        assert!(marble > 0);
    }
}
