//! Jungle surface: floating mud islands, living mahogany vines and exposed
//! jungle grass.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use log::{debug, info};

use crate::config::BiomeLayout;
use crate::ids::{BlockId, WallId};
use crate::point::Point;
use crate::random::Random;
use crate::tile::{Flag, Tile};
use crate::world::{lerp, World};

/// Columns kept clear of the jungle scan at either world edge.
const EDGE_MARGIN: i32 = 350;
/// Vine anchors drawn per requested vine before the pass gives up.
const VINE_DRAW_BUDGET: u32 = 200;

/// Lift the ground under `center +/- width` by a random height, leaving a
/// parabolic island hanging above a hollow. Returns the lowest surface row
/// that was seen across the span.
fn levitate_island(center: i32, width: i32, rnd: &mut Random, world: &mut World) -> i32 {
    let (x_min, x_max) = (center - width, center + width);
    let min_surface = (x_min..x_max).map(|x| world.surface(x)).min().unwrap_or(world.height());
    let float_height = (rnd.get_double(0.07, 0.2) * f64::from(world.underground_level())) as i32;
    let y_min = min_surface - float_height - 5;
    let hive_queen = world.conf.variation.hive_queen;
    for x in x_min..x_max {
        let span = f64::from((x - x_min) * (x - x_max)) / f64::from(width);
        let y_max = (f64::from(y_min) - 1.9 * span + 37.0 * rnd.fine(x, 0)) as i32;
        for y in y_min..y_max {
            let a = *world.tile(x, y);
            let b = *world.tile(x, y + float_height);
            if !hive_queen {
                *world.tile_mut(x, y) = b;
                *world.tile_mut(x, y + float_height) = a;
            } else if a.flag == Flag::Border {
                // Comb borders stay put; whatever would swap into them is dropped.
                if b.flag != Flag::Border {
                    *world.tile_mut(x, y + float_height) = Tile::AIR;
                }
            } else if b.flag == Flag::Border {
                if y + float_height > world.surface(x) {
                    world.tile_mut(x, y).block = BlockId::MUD;
                }
            } else {
                *world.tile_mut(x, y) = b;
                *world.tile_mut(x, y + float_height) = a;
            }
        }
    }
    min_surface
}

/// Stamp a thick mahogany segment. Returns true when more than half of the
/// segment was already mahogany.
fn draw_mahogany_segment(from: (f64, f64), to: (f64, f64), width: f64, world: &mut World) -> bool {
    let mut fill = BTreeSet::new();
    for step in 0..=10 {
        let t = f64::from(step) / 10.0;
        let cx = lerp(from.0, to.0, t);
        let cy = lerp(from.1, to.1, t);
        for x in (cx - width) as i32..(cx + width).ceil() as i32 {
            for y in (cy - width) as i32..(cy + width).ceil() as i32 {
                if (f64::from(x) - cx).hypot(f64::from(y) - cy) < width {
                    fill.insert(Point::new(x, y));
                }
            }
        }
    }
    let mut crossed = 0;
    for &pt in &fill {
        let tile = world.tile_at_mut(pt);
        if tile.block == BlockId::LIVING_MAHOGANY {
            crossed += 1;
        } else {
            tile.block = BlockId::LIVING_MAHOGANY;
            tile.wall = WallId::LIVING_WOOD;
        }
    }
    2 * crossed > fill.len()
}

fn branch_roll(rnd: &Random, x: f64, y: f64) -> i64 {
    (99999.0 * (1.0 + rnd.fine(x as i32, y as i32))) as i64 % 11
}

/// Grow one wandering vine from `from`, thinning as it goes. Branches and
/// leaf clumps are picked from the fine noise at each joint.
fn grow_mahogany_vine(from: (f64, f64), weight: f64, angle: f64, rnd: &mut Random, world: &mut World) {
    if weight < 0.6 {
        return;
    }
    let angle = angle + (1.8 * rnd.fine(from.0 as i32, from.1 as i32)).clamp(-PI / 3.0, PI / 3.0);
    let to = (from.0 + 3.9 * weight * angle.cos(), from.1 + 3.9 * weight * angle.sin());
    if draw_mahogany_segment(from, to, weight, world) && weight < 1.9 {
        return;
    }
    let shrink = rnd.get_double(0.97, 0.98);
    grow_mahogany_vine(to, shrink * weight, angle, rnd, world);
    match branch_roll(rnd, from.0, from.1) {
        0 => grow_mahogany_vine(to, 0.65 * weight, angle - PI / 2.0, rnd, world),
        1 => grow_mahogany_vine(to, 0.65 * weight, angle + PI / 2.0, rnd, world),
        2..=4 => {
            let (fx, fy) = (from.0 as i32, from.1 as i32);
            for x in fx - 6..fx + 6 {
                for y in fy - 6..fy + 6 {
                    let threshold = (f64::from(x) - from.0).hypot(f64::from(y) - from.1) / 3.0 - 1.0;
                    let leafy = rnd.fine(x, y) > threshold;
                    let tile = world.tile_mut(x, y);
                    if tile.is_empty() && leafy {
                        tile.block = BlockId::MAHOGANY_LEAF;
                        tile.wall = WallId::LIVING_LEAF;
                    }
                }
            }
        }
        _ => {}
    }
}

/// Seed vines inside solid ground of the rectangle, roughly one per 7.7k
/// tiles of area.
fn grow_mahogany_vines(x_min: i32, x_max: i32, y_min: i32, y_max: i32, rnd: &mut Random, world: &mut World) {
    let area = (y_max - y_min).max(0) * (x_max - x_min).max(0);
    let mut remaining = area / rnd.get_int(6910, 8640);
    let mut budget = remaining.max(0) as u32 * VINE_DRAW_BUDGET;
    while remaining > 0 {
        if budget == 0 {
            debug!("Gave up on {} mahogany vines", remaining);
            return;
        }
        budget -= 1;
        let x = rnd.get_int(x_min, x_max);
        let y = rnd.get_int(y_min, y_max);
        let solid = world.region_passes(x - 4, y - 4, 8, 8, |tile| {
            !tile.is_empty() && tile.block != BlockId::LIVING_MAHOGANY && tile.block != BlockId::MAHOGANY_LEAF
        });
        if !solid {
            continue;
        }
        let weight = rnd.get_double(2.1, 2.5);
        let angle = rnd.get_double(-PI, PI);
        grow_mahogany_vine((f64::from(x), f64::from(y)), weight, angle, rnd, world);
        remaining -= 1;
    }
}

/// Open winding tunnels from the surface down to the underground layer,
/// tapering towards the span edges.
fn connect_surface_caves(x_min: i32, x_max: i32, rnd: &mut Random, world: &mut World) {
    rnd.restore_shuffle_state();
    let underground = world.underground_level();
    for x in x_min..x_max {
        let surface = world.surface(x);
        for y in surface..underground {
            let t = (f64::from((y - surface).min(x - x_min).min(x_max - x)) / 75.0).min(1.0);
            let threshold = lerp(2.94 - 3.1 * f64::from(y) / f64::from(underground), -0.16, t);
            if (rnd.coarse(x, 2 * y) + 0.1).abs() < 0.15 && rnd.fine(x, y) > threshold {
                let tile = world.tile_mut(x, y);
                if tile.block != BlockId::HIVE {
                    tile.block = BlockId::EMPTY;
                }
            }
        }
    }
    rnd.shuffle_noise();
}

/// Mahogany tips with a single open side grow a tuft of jungle grass.
fn sprout_mahogany_grass(x_min: i32, x_max: i32, y_min: i32, y_max: i32, rnd: &Random, world: &mut World) {
    for x in x_min..x_max {
        for y in y_min..y_max {
            if world.tile(x, y).block != BlockId::LIVING_MAHOGANY
                || (99999.0 * (1.0 + rnd.fine(x, y))) as i64 % 7 != 0
            {
                continue;
            }
            let mut neighbors: BTreeMap<BlockId, u32> = BTreeMap::new();
            for pt in Point::new(x, y).neighbors() {
                *neighbors.entry(world.tile_at(pt).block).or_default() += 1;
            }
            let open = neighbors.get(&BlockId::EMPTY).copied().unwrap_or(0);
            let wood = neighbors.get(&BlockId::LIVING_MAHOGANY).copied().unwrap_or(0);
            if open == 1 && wood == 3 {
                world.tile_mut(x, y).block = BlockId::JUNGLE_GRASS;
            }
        }
    }
}

fn levitate_islands(lb: i32, ub: i32, rnd: &mut Random, world: &mut World) {
    let underground = f64::from(world.underground_level());
    if world.conf.variation.shattered {
        let y_max = (world.underground_level() + world.cavern_level()) / 2;
        grow_mahogany_vines(lb, ub, (0.7 * underground) as i32, y_max, rnd, world);
        return;
    }
    let mut min_surface = world.underground_level();
    let x_min = lb;
    let mut x_max = lb;
    while x_max < ub {
        let width = rnd.get_int(20, 35);
        x_max += width;
        min_surface = min_surface.min(levitate_island(x_max, width, rnd, world));
        x_max += width;
    }
    connect_surface_caves(x_min, x_max, rnd, world);
    let y_min = min_surface - (0.22 * underground) as i32;
    let y_max = min_surface + (0.1 * underground) as i32;
    grow_mahogany_vines(x_min, x_max, y_min, y_max, rnd, world);
    sprout_mahogany_grass(x_min - 100, x_max + 100, y_min - 100, y_max + 100, rnd, world);
}

/// Horizontal span of the jungle surface to work on.
fn jungle_span(rnd: &mut Random, world: &World) -> (i32, i32) {
    let width = f64::from(world.width());
    let size = world.conf.variation.jungle_size;
    let hive_queen = world.conf.variation.hive_queen;
    if world.conf.world.biomes == BiomeLayout::Columns && !hive_queen {
        let island_scale = if size > 1.0 { size.sqrt() } else { size };
        let center = world.ctx.jungle_center + island_scale * rnd.get_double(-0.05, 0.05) * width;
        let scan = island_scale * rnd.get_double(0.03, 0.035) * width;
        return ((center - scan) as i32, (center + scan) as i32);
    }
    let scan = (rnd.get_double(0.03, 0.035) * width) as i32;
    let mut center = world.ctx.jungle_center as i32;
    if hive_queen {
        let shift = (0.018 * width) as i32;
        center += if center > world.width() / 2 { shift } else { -shift };
    }
    let is_jungle = |x: i32| world.biome(x, world.surface(x)).jungle > 0.8;
    let mut min_x = center;
    while min_x > EDGE_MARGIN && min_x > center - scan && is_jungle(min_x) {
        min_x -= 1;
    }
    let mut max_x = center;
    while max_x < world.width() - EDGE_MARGIN && max_x < center + scan && is_jungle(max_x + 25) {
        max_x += 1;
    }
    (min_x, max_x)
}

pub fn gen_jungle(rnd: &mut Random, world: &mut World) {
    info!("Generating jungle");
    rnd.shuffle_noise();
    let (min_x, max_x) = jungle_span(rnd, world);
    levitate_islands(min_x, max_x, rnd, world);
    let underground = world.underground_level();
    for x in min_x..max_x + 45 {
        for y in (0.45 * f64::from(underground)) as i32..underground {
            if world.tile(x, y).block == BlockId::MUD && world.is_exposed(x, y) {
                world.tile_mut(x, y).block = BlockId::JUNGLE_GRASS;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::NoiseField;
    use crate::world::test_world;

    fn mud_world(width: i32, height: i32, ground: i32) -> World {
        let mut world = test_world(width, height);
        for x in 0..width {
            for y in ground..height {
                world.tile_mut(x, y).block = BlockId::MUD;
            }
        }
        world.rescan_surface();
        world
    }

    #[test]
    fn test_mahogany_segment_reports_crossing() {
        let mut world = test_world(60, 60);
        assert!(!draw_mahogany_segment((10.0, 30.0), (40.0, 30.0), 2.0, &mut world));
        assert_eq!(world.tile(25, 30).block, BlockId::LIVING_MAHOGANY);
        assert_eq!(world.tile(25, 30).wall, WallId::LIVING_WOOD);
        assert!(draw_mahogany_segment((12.0, 30.0), (38.0, 30.0), 2.0, &mut world));
    }

    #[test]
    fn test_levitate_island_lifts_ground() {
        let mut world = mud_world(200, 600, 150);
        let mut rnd = Random::new(1);
        rnd.noise = NoiseField::from_fn(200, 600, |_, _| 0.0);
        let min_surface = levitate_island(100, 30, &mut rnd, &mut world);
        assert_eq!(min_surface, 150);
        // The middle of the span now has a hollow under a floating mass.
        let column: Vec<bool> = (0..200).map(|y| world.tile(100, y).is_empty()).collect();
        let first_solid = column.iter().position(|open| !open).unwrap_or(200);
        assert!(first_solid < 150);
        assert!(column[first_solid..150].iter().any(|open| *open) || column[150..].iter().any(|open| *open));
        // Columns outside the span are untouched.
        assert!(world.tile(10, 149).is_empty());
        assert_eq!(world.tile(10, 150).block, BlockId::MUD);
    }

    #[test]
    fn test_gen_jungle_grows_grass() {
        let mut world = mud_world(800, 600, 150);
        world.ctx.jungle_center = 400.0;
        let mut rnd = Random::new(8);
        rnd.noise = NoiseField::from_fn(800, 600, |x, y| f64::from((x * 7 + y * 13) % 100) / 50.0 - 1.0);
        gen_jungle(&mut rnd, &mut world);
        let grass = (350..450)
            .flat_map(|x| (0..world.underground_level()).map(move |y| (x, y)))
            .filter(|&(x, y)| world.tile(x, y).block == BlockId::JUNGLE_GRASS)
            .count();
        assert!(grass > 0);
        assert_eq!(world.tile(50, 150).block, BlockId::MUD);
    }
}
