//! Oceans
//!
//! Both world edges drop along a sigmoid into a water-filled basin lined
//! with sand, shells and coralstone. One side also gets a flooded cave
//! reaching down from the sea floor, with glowing moss rocks and reef
//! chests queued for the treasure pass.

use log::info;

use crate::commands::Command;
use crate::framing::Variant;
use crate::ids::{BlockId, WallId};
use crate::point::Point;
use crate::random::{fnv1a32pt, Random};
use crate::structures::loot::LootKind;
use crate::structures::{is_location_used, scan_while_empty};
use crate::tile::Liquid;
use crate::world::World;

/// Columns from each edge the ocean basin reaches.
const OCEAN_WIDTH: i32 = 390;
/// Columns sampled for the water table, one per side.
const SHORE_X: i32 = 300;
const CAVE_EDGE_OFFSET: i32 = 105;
const CAVE_HALF_WIDTH: i32 = 100;
const REEF_CHEST_SPACING: i32 = 50;
const GLOW_ROCK_MOSS: [BlockId; 4] = [
    BlockId::KRYPTON_MOSS_STONE,
    BlockId::XENON_MOSS_STONE,
    BlockId::ARGON_MOSS_STONE,
    BlockId::NEON_MOSS_STONE,
];

/// Fill blocks for one shore. Hive-queen worlds line the far shore with
/// honey.
#[derive(Clone, Copy)]
struct Shore {
    sand: BlockId,
    shell: BlockId,
    silt: BlockId,
}

impl Shore {
    const BEACH: Shore = Shore {
        sand: BlockId::SAND,
        shell: BlockId::SHELL_PILE,
        silt: BlockId::SILT,
    };
    const HONEY: Shore = Shore {
        sand: BlockId::HONEY,
        shell: BlockId::HIVE,
        silt: BlockId::HONEY,
    };
}

/// Put the ocean cave on the side away from the jungle.
fn select_ocean_cave(rnd: &mut Random, world: &mut World) {
    let width = world.width();
    let left = CAVE_EDGE_OFFSET;
    let right = width - CAVE_EDGE_OFFSET;
    let reach = 0.11 * f64::from(width) + 220.0;
    let jungle = world.ctx.jungle_center;
    world.ctx.ocean_cave_center = if f64::from(left) > jungle - reach {
        right
    } else if f64::from(right) < jungle + reach {
        left
    } else {
        rnd.select(&[left, right])
    };
}

fn can_place_reef_chest(x: i32, y: i32, world: &World) -> bool {
    world.region_passes(x, y - 1, 2, 3, |tile| tile.is_empty() && tile.liquid == Liquid::Water)
        && world.region_passes(x, y + 2, 2, 1, |tile| {
            tile.block == BlockId::SAND || tile.block == BlockId::CORALSTONE
        })
}

/// Scatter small moss-covered rocks through a share of the flooded cave.
fn add_glow_rocks(mut locations: Vec<Point>, rnd: &mut Random, world: &mut World) {
    rnd.seq.shuffle(&mut locations);
    locations.truncate(locations.len() / 150);
    for Point { x, y } in locations {
        let radius = rnd.get_double(2.0, 3.2);
        let reach = radius as i32;
        let side = (6.0 + 2.0 * radius) as i32;
        if !world.region_passes(x - reach - 3, y - reach - 3, side, side, |tile| tile.is_empty()) {
            continue;
        }
        let offsets: Vec<(i32, i32)> = (-reach..=reach)
            .flat_map(|i| (-reach..=reach).map(move |j| (i, j)))
            .filter(|&(i, j)| f64::from(i) < radius && f64::from(j) < radius)
            .collect();
        for &(i, j) in &offsets {
            if f64::from(i).hypot(f64::from(j)) / radius < 0.6 + 0.6 * rnd.fine(x + i, y + j) {
                world.tile_mut(x + i, y + j).block = BlockId::STONE;
            }
        }
        let moss = rnd.select(&GLOW_ROCK_MOSS);
        for &(i, j) in &offsets {
            if world.tile(x + i, y + j).block == BlockId::STONE && world.is_exposed(x + i, y + j) {
                world.tile_mut(x + i, y + j).block = moss;
                world.queued_deco.push(Command::GrowMoss { x: x + i, y: y + j });
            }
        }
    }
}

/// Carve the flooded cave below the sea floor on the cave side.
fn add_ocean_cave(water_table: i32, rnd: &mut Random, world: &mut World) {
    let shuffle = Point::new(rnd.get_int(0, world.width()), rnd.get_int(0, world.height()));
    let center = world.ctx.ocean_cave_center;
    let mut floor = scan_while_empty(Point::new(center - 90, water_table), (0, 1), world).y;
    let mut min_y = scan_while_empty(Point::new(center + 90, water_table), (0, 1), world).y;
    if min_y > floor {
        std::mem::swap(&mut min_y, &mut floor);
    }
    let max_y = ((f64::from(floor) + world.conf.variation.ocean_size * 0.2262 * f64::from(world.height())) as i32)
        .min(world.underworld_level() - 10);

    let mut flooded = Vec::new();
    for x in center - CAVE_HALF_WIDTH..center + CAVE_HALF_WIDTH {
        for y in min_y..max_y {
            let threshold = f64::from((x - center).abs().max(y + 100 - max_y)) / 25.0 - 3.0;
            if rnd.fine(x, y) < threshold - 0.5 || rnd.coarse(2 * x, 2 * y).abs() > 0.51 {
                continue;
            }
            let fine = rnd.fine(x, y);
            let open = rnd.blur(2 * x, 2 * y).abs() < 0.18
                && (fine > threshold.max(-0.14)
                    || fine < -0.5
                    || rnd.fine(x + shuffle.x, y + shuffle.y) < (-threshold - 0.5).min(-0.4));
            let hash = fnv1a32pt(x as u32, y as u32);
            let tile = world.tile_mut(x, y);
            let block = tile.block;
            match block {
                BlockId::STONE | BlockId::SANDSTONE | BlockId::ICE | BlockId::CLAY | BlockId::SILT => {
                    tile.block = if hash % 7 == 0 { BlockId::SAND } else { BlockId::CORALSTONE };
                }
                BlockId::DIRT | BlockId::GRASS | BlockId::MUD | BlockId::JUNGLE_GRASS => {
                    tile.block = if hash % 5 == 0 { BlockId::HARDENED_SAND } else { BlockId::SAND };
                }
                BlockId::EMPTY if tile.liquid == Liquid::None => {
                    tile.block = if hash % 5 == 0 { BlockId::HARDENED_SAND } else { BlockId::SAND };
                }
                _ => {}
            }
            if open {
                tile.block = BlockId::EMPTY;
                tile.wall = WallId::EMPTY;
                tile.liquid = Liquid::Water;
                if y > floor {
                    flooded.push(Point::new(x, y));
                }
            }
        }
    }
    add_glow_rocks(flooded, rnd, world);

    let mut spots = Vec::new();
    for x in center - 50..center + 50 {
        for y in world.underground_level()..max_y {
            if can_place_reef_chest(x, y, world) {
                spots.push(Point::new(x, y));
            }
        }
    }
    rnd.seq.shuffle(&mut spots);
    let count = (spots.len() / 100).max(2);
    let mut used: Vec<Point> = Vec::new();
    for spot in spots {
        if used.len() >= count {
            break;
        }
        if !is_location_used(spot.x, spot.y, REEF_CHEST_SPACING, &used, 1) {
            used.push(spot);
            world.queued_treasures.push(Command::PlaceChest {
                x: spot.x,
                y: spot.y,
                variant: Variant::Reef,
                loot: LootKind::Water,
            });
        }
    }
}

/// Drop column `x` into the basin below its first solid tile and line the
/// floor.
fn fill_ocean_column(x: i32, drop: f64, sand_depth: f64, water_table: i32, shore: Shore, world: &mut World) {
    let top = (world.surface(x) - 10).max(0);
    let Some(y) = (top..world.underground_level()).find(|&y| {
        let block = world.tile(x, y).block;
        !block.is_empty() && (y > water_table || block != BlockId::HIVE)
    }) else {
        return;
    };
    let mut i = 0;
    while f64::from(i) < drop {
        let tile = world.tile_mut(x, y + i);
        tile.wall = WallId::EMPTY;
        tile.block = BlockId::EMPTY;
        if y + i > water_table {
            tile.liquid = Liquid::Water;
        }
        i += 1;
    }
    let mut i = (drop + 1.0) as i32;
    while f64::from(i) < drop + sand_depth {
        let deep = y + i > water_table + 20;
        let tile = world.tile_mut(x, y + i);
        tile.wall = if tile.wall == WallId::DIRT { WallId::WORN_STONE } else { WallId::EMPTY };
        tile.block = match tile.block {
            BlockId::MUD | BlockId::JUNGLE_GRASS => shore.silt,
            BlockId::STONE | BlockId::SANDSTONE | BlockId::ICE if deep => BlockId::CORALSTONE,
            _ if deep => shore.sand,
            BlockId::DIRT | BlockId::GRASS | BlockId::SAND | BlockId::SNOW => shore.sand,
            _ => shore.shell,
        };
        i += 1;
    }
}

pub fn gen_oceans(rnd: &mut Random, world: &mut World) {
    info!("Filling oceans");
    rnd.shuffle_noise();
    let width = world.width();
    let water_table = world.surface(SHORE_X).max(world.surface(width - SHORE_X)) + rnd.get_int(4, 12);
    select_ocean_cave(rnd, world);
    let cave_left = world.ctx.ocean_cave_center < 400;
    let size = world.conf.variation.ocean_size;
    let hive_queen = world.conf.variation.hive_queen;
    for x in 0..OCEAN_WIDTH {
        let drop = size * 90.0 * (1.0 - 1.0 / (1.0 + (0.041 * f64::from(200 - x)).exp()));
        let sand_depth = (40.0 + 9.0 * rnd.coarse(x, 0)) * (f64::from(400 - x) / 160.0).min(1.0);
        for column in [x, width - x - 1] {
            let shore = if hive_queen && cave_left != (column < 400) {
                Shore::HONEY
            } else {
                Shore::BEACH
            };
            fill_ocean_column(column, drop, sand_depth, water_table, shore, world);
        }
    }
    add_ocean_cave(water_table, rnd, world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    /// Flat dirt from row 150, stone from row 200.
    fn flat_world() -> World {
        let mut world = test_world(1000, 600);
        for x in 0..1000 {
            for y in 150..600 {
                world.tile_mut(x, y).block = if y < 200 { BlockId::DIRT } else { BlockId::STONE };
            }
            world.set_surface(x, 150);
        }
        world
    }

    #[test]
    fn test_ocean_basin_and_shore() {
        let mut world = flat_world();
        let mut rnd = Random::new(5);
        rnd.init_noise(1000, 600, 0.07);
        gen_oceans(&mut rnd, &mut world);
        // Jungle centre defaults to column 0, so the cave goes right.
        assert_eq!(world.ctx.ocean_cave_center, 895);
        let basin = world.tile(50, 200);
        assert!(basin.is_empty());
        assert_eq!(basin.liquid, Liquid::Water);
        assert!(world.tile(50, 200).wall.is_empty());
        // The drop at column 50 is just under 90 rows; the floor below it
        // is sand over coralstone.
        assert_eq!(world.tile(50, 240).block, BlockId::CORALSTONE);
        assert!(world.tile(50, 150).liquid == Liquid::None);
        // Far from the edge nothing changes.
        assert_eq!(world.tile(500, 160).block, BlockId::DIRT);
    }

    #[test]
    fn test_cave_side_avoids_jungle() {
        let mut world = flat_world();
        let mut rnd = Random::new(6);
        world.ctx.jungle_center = 900.0;
        select_ocean_cave(&mut rnd, &mut world);
        assert_eq!(world.ctx.ocean_cave_center, CAVE_EDGE_OFFSET);
    }

    #[test]
    fn test_reef_chest_spot() {
        let mut world = test_world(100, 100);
        for y in 40..43 {
            for x in 10..12 {
                world.tile_mut(x, y).liquid = Liquid::Water;
            }
        }
        world.tile_mut(10, 43).block = BlockId::SAND;
        world.tile_mut(11, 43).block = BlockId::CORALSTONE;
        assert!(can_place_reef_chest(10, 41, &world));
        world.tile_mut(11, 43).block = BlockId::DIRT;
        assert!(!can_place_reef_chest(10, 41, &world));
    }
}
