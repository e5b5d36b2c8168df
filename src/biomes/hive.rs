//! Bee hives
//!
//! Each hive is a disc of honeycomb cells (hexes of scale 10) grown inside
//! the jungle. Cells near the centre are carved open or filled with hive
//! block, the rim is thickened into a shell, and the larvae and honey chest
//! are queued for the treasure pass.

use log::{debug, info};

use crate::commands::Command;
use crate::config::BiomeLayout;
use crate::framing::Variant;
use crate::ids::{BlockId, WallId};
use crate::point::Point;
use crate::random::Random;
use crate::structures::loot::{self, LootKind};
use crate::structures::{is_location_used, scan_while_empty};
use crate::tile::{Flag, Liquid};
use crate::world::{Biome, World};
use crate::zone::hex_centroid;

use super::{carve_columns, is_in_biome};

/// Honeycomb cell scale.
const CELL_SCALE: i32 = 10;
/// Hives larger than this get a full shell; smaller ones only shell tiles
/// that are already hive wall.
const SOLID_SHELL_SIZE: f64 = 200.0;
/// Minimum spacing between larvae and the honey chest.
const LARVA_SPACING: i32 = 35;
const LARVA_TRIES: u32 = 100;
const LOCATION_TRIES: i32 = 100;

/// A hive-wall tile that is not fully surrounded by hive wall.
fn is_hive_edge(x: i32, y: i32, world: &World) -> bool {
    let center = world.tile(x, y);
    if center.wall != WallId::HIVE || center.flag == Flag::Border {
        return false;
    }
    !world.region_passes(x - 1, y - 1, 3, 3, |tile| {
        tile.wall == WallId::HIVE && tile.flag != Flag::Border
    })
}

/// Carve one hive of radius `size` around `center`.
pub fn fill_hive(center: Point, size: f64, rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let reach = size as i32;
    let noise = &rnd.noise;
    carve_columns(world, center.x - reach..center.x + reach, |_, col| {
        let x = col.x;
        for y in center.y - reach..center.y + reach {
            let cell = hex_centroid(x, y, CELL_SCALE);
            let threshold = 3.0 * cell.distance(center) / size - 2.0;
            let tile = col.tile(y);
            if noise.fine(cell.x, cell.y) > threshold {
                tile.block = if noise.fine(cell.x + center.x, cell.y + center.y).abs() > 0.31 {
                    BlockId::HIVE
                } else {
                    BlockId::EMPTY
                };
                tile.wall = WallId::HIVE;
                tile.flag = Flag::None;
            } else if noise.fine(x + center.x, y + center.y) > threshold.max(0.5)
                && matches!(
                    tile.block,
                    BlockId::MUD | BlockId::JUNGLE_GRASS | BlockId::MUSHROOM_GRASS | BlockId::MARBLE
                )
            {
                tile.block = BlockId::HONEY;
            }
        }
    });

    let mut edges = Vec::new();
    for x in center.x - reach..center.x + reach {
        for y in center.y - reach..center.y + reach {
            if is_hive_edge(x, y, world) && Point::new(x, y).distance(center) < size {
                edges.push(Point::new(x, y));
            }
        }
    }
    for edge in edges {
        for i in -2..3 {
            for j in -2..3 {
                let tile = world.tile_mut(edge.x + i, edge.y + j);
                if size > SOLID_SHELL_SIZE {
                    tile.block = BlockId::HIVE;
                    tile.wall = WallId::HIVE;
                } else if tile.wall == WallId::HIVE {
                    tile.block = BlockId::HIVE;
                }
            }
        }
    }

    let area = size * size;
    let count = 1 + (area / f64::from(rnd.get_int(2500, 7000))) as i32;
    world.queued_treasures.push(Command::PlaceLarvae { center, radius: reach, count });
    world.ctx.hives.push(center);
}

/// Find a spot on a hive floor with open space above and a 3-wide hive
/// block floor below.
fn select_larva_location(
    center: Point,
    radius: i32,
    used: &[Point],
    rnd: &mut Random,
    world: &World,
) -> Option<Point> {
    for _ in 0..LARVA_TRIES {
        let x = rnd.get_int(center.x - radius, center.x + radius);
        let mut y = rnd.get_int(center.y - radius, center.y + radius);
        if world.tile(x, y).is_empty() {
            y = scan_while_empty(Point::new(x, y), (0, 1), world).y;
        }
        let fits = world.tile(x + 1, y).wall == WallId::HIVE
            && world.region_passes(x, y - 2, 3, 3, |tile| tile.is_empty() && tile.liquid == Liquid::None)
            && world.region_passes(x, y + 1, 3, 1, |tile| tile.block == BlockId::HIVE)
            && !is_location_used(x, y, LARVA_SPACING, used, 1);
        if fits {
            return Some(Point::new(x, y));
        }
    }
    None
}

/// Place up to `count` larvae in the hive around `center`, and sometimes a
/// honey chest. Small hives are more likely to get the chest.
pub fn place_larvae(center: Point, radius: i32, count: i32, rnd: &mut Random, world: &mut World) {
    let mut used = Vec::new();
    for x in center.x - radius..center.x + radius {
        for y in center.y - radius..center.y + radius {
            let tile = world.tile(x, y);
            if tile.block == BlockId::LARVA && tile.frame_x == 0 && tile.frame_y == 0 {
                used.push(Point::new(x, y));
            }
        }
    }
    for _ in 0..count {
        if let Some(pt) = select_larva_location(center, radius, &used, rnd, world) {
            used.push(pt);
            world.place_framed_tile(pt.x, pt.y - 2, BlockId::LARVA, Variant::None);
        }
    }

    let area = f64::from(radius) * f64::from(radius);
    if rnd.get_double(0.0, 1.0) > 0.4_f64.min(1.0 - area / 15000.0) {
        if let Some(pt) = select_larva_location(center, radius, &used, rnd, world) {
            let items = loot::roll_loot(LootKind::Honey, pt, rnd, world);
            let chest = world.place_chest(pt.x, pt.y - 1, Variant::Honey);
            for item in items {
                if !chest.push(item) {
                    break;
                }
            }
        }
    }
}

/// Anchor of the next hive. With column biomes the hive sits in the
/// jungle band; otherwise jungle anchors are drawn by rejection.
fn select_hive_location(rnd: &mut Random, world: &World) -> Option<Point> {
    let width = world.width();
    let levels = world.levels();
    let y_min = (levels.underground + levels.cavern) / 2;
    let y_max = (levels.cavern + 2 * levels.underworld) / 3;
    let conf = &world.conf;
    if conf.world.biomes == BiomeLayout::Columns && !conf.variation.hive_queen {
        let spread = conf.variation.jungle_size * 0.075 * f64::from(width);
        let x = rnd.get_int(
            ((world.ctx.jungle_center - spread) as i32).max(100),
            ((world.ctx.jungle_center + spread) as i32).min(width - 100),
        );
        return Some(Point::new(x, rnd.get_int(y_min, y_max)));
    }
    for tries in 0..LOCATION_TRIES {
        let x = rnd.get_int(350, width - 350);
        let y = rnd.get_int(y_min, y_max);
        let border_scan = 90 - tries / 2;
        let clear_of_borders = !conf.variation.hive_queen
            || world.region_passes(
                x - border_scan / 2,
                y - border_scan / 2,
                border_scan,
                border_scan,
                |tile| tile.flag != Flag::Border,
            );
        if is_in_biome(x, y, 15 + width / 120, Biome::Jungle, world) && clear_of_borders {
            return Some(Point::new(x, y));
        }
    }
    None
}

pub fn gen_hive(rnd: &mut Random, world: &mut World) {
    info!("Importing bees");
    let v = &world.conf.variation;
    let area = f64::from(world.width()) * f64::from(world.height());
    let mut hives = (v.hive_freq
        * (0.4 * v.jungle_size).max(1.0)
        * (2.1 + rnd.get_double(0.0, area / 5_750_000.0))) as i32;
    let hive_size = v.hive_size;
    let mut tries = 5 * hives;
    while tries > 0 && hives > 0 {
        tries -= 1;
        if let Some(center) = select_hive_location(rnd, world) {
            let size = hive_size * (15.0 + f64::from(world.width()) / rnd.get_double(84.0, 166.0));
            fill_hive(center, size, rnd, world);
            hives -= 1;
        }
    }
    if hives > 0 {
        debug!("{} hives did not find a jungle anchor", hives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::random::NoiseField;
    use crate::world::test_world;

    fn mud_world(width: i32, height: i32) -> World {
        let mut world = test_world(width, height);
        for pt in Rect::new(0, 0, width, height).points() {
            world.tile_at_mut(pt).block = BlockId::MUD;
        }
        world
    }

    #[test]
    fn test_fill_hive_carves_and_queues() {
        let mut world = mud_world(200, 200);
        let mut rnd = Random::new(8);
        rnd.noise = NoiseField::from_fn(200, 200, |x, y| (0.3 * f64::from(x) + 0.2 * f64::from(y)).sin());
        let center = Point::new(100, 100);
        fill_hive(center, 40.0, &mut rnd, &mut world);
        // Threshold at the centre is -2; every sample clears it.
        assert_eq!(world.tile(100, 100).wall, WallId::HIVE);
        // Far outside the disc is untouched.
        assert_eq!(world.tile(10, 10).block, BlockId::MUD);
        assert!(world.tile(10, 10).wall.is_empty());
        assert_eq!(world.ctx.hives, vec![center]);
        assert!(matches!(
            world.queued_treasures[0],
            Command::PlaceLarvae { radius: 40, count, .. } if count >= 1
        ));
    }

    #[test]
    fn test_place_larvae_on_hive_floor() {
        let mut world = test_world(120, 120);
        for pt in Rect::new(30, 30, 60, 60).points() {
            world.tile_at_mut(pt).wall = WallId::HIVE;
        }
        for x in 30..90 {
            world.tile_mut(x, 70).block = BlockId::HIVE;
        }
        let mut rnd = Random::new(12);
        place_larvae(Point::new(60, 60), 25, 1, &mut rnd, &mut world);
        let larvae: Vec<Point> = Rect::new(0, 0, 120, 120)
            .points()
            .filter(|pt| {
                let tile = world.tile_at(*pt);
                tile.block == BlockId::LARVA && tile.frame_x == 0 && tile.frame_y == 0
            })
            .collect();
        assert_eq!(larvae.len(), 1);
        // Top-left two rows above the floor contact row.
        assert_eq!(larvae[0].y, 67);
    }

    #[test]
    fn test_hive_edge_detection() {
        let mut world = test_world(30, 30);
        for pt in Rect::new(10, 10, 5, 5).points() {
            world.tile_at_mut(pt).wall = WallId::HIVE;
        }
        assert!(is_hive_edge(10, 12, &world));
        assert!(!is_hive_edge(12, 12, &world));
        world.tile_mut(13, 12).flag = Flag::Border;
        assert!(is_hive_edge(12, 12, &world));
    }
}
