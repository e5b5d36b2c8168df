//! Glowing moss caves
//!
//! Small pockets are dug into a solid stretch of cavern stone, then the
//! exposed stone around them is coated in one glowing moss. Moss plants
//! sprout from the coated blocks once the decoration queue runs.

use std::collections::HashMap;

use log::{debug, info};

use crate::commands::Command;
use crate::ids::{wall_variants, BlockId, WallId};
use crate::point::Point;
use crate::random::Random;
use crate::world::World;

/// Side of the solid square a cave grows from.
const SOLID_AREA: i32 = 8;
const SITE_TRIES: i32 = 10_000;

fn is_solid_area(x: i32, y: i32, world: &World) -> bool {
    world.region_passes(x, y, SOLID_AREA, SOLID_AREA, |tile| {
        matches!(tile.block, BlockId::DIRT | BlockId::STONE | BlockId::CLAY)
    })
}

/// Centre of a solid square between rows `min_y` and `max_y`.
fn find_solid_area(min_y: i32, max_y: i32, rnd: &mut Random, world: &World) -> Option<Point> {
    for _ in 0..SITE_TRIES {
        let x = rnd.get_int(0, world.width() - SOLID_AREA);
        let y = rnd.get_int(min_y, max_y - SOLID_AREA);
        if is_solid_area(x, y, world) {
            return Some(Point::new(x + SOLID_AREA / 2, y + SOLID_AREA / 2));
        }
    }
    None
}

fn fill_glowing_moss_cave(rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let Some(center) = find_solid_area(world.cavern_level(), world.underworld_level(), rnd, world) else {
        debug!("No solid stone left for a glowing moss cave");
        return;
    };
    let area = f64::from(world.width()) * f64::from(world.height());
    let size = world.conf.variation.glowing_moss_size * area / rnd.get_double(95_000.0, 210_000.0);
    let span = |c: i32| (f64::from(c) - size) as i32..(f64::from(c) + size) as i32;
    let dist = |x: i32, y: i32| f64::from(x - center.x).hypot(f64::from(y - center.y)) / size;

    // Pockets give the moss more edges to coat.
    for x in span(center.x) {
        for y in span(center.y) {
            if !matches!(world.tile(x, y).block, BlockId::DIRT | BlockId::STONE) {
                continue;
            }
            let pocket = rnd.blur(5 * x, 5 * y).abs().max(rnd.blur(7 * x, 7 * y).abs());
            if pocket > dist(x, y).max(0.53) {
                world.tile_mut(x, y).block = BlockId::EMPTY;
            }
        }
    }

    let mut moss = rnd.select(&[
        BlockId::KRYPTON_MOSS_STONE,
        BlockId::XENON_MOSS_STONE,
        BlockId::ARGON_MOSS_STONE,
        BlockId::NEON_MOSS_STONE,
    ]);
    if center.y > (world.cavern_level() + 4 * world.underworld_level()) / 5 {
        moss = rnd.select(&[moss, BlockId::LAVA_MOSS_STONE]);
    }
    let lava = moss == BlockId::LAVA_MOSS_STONE;
    let walls: HashMap<WallId, WallId> = wall_variants::DIRT
        .iter()
        .map(|&wall| {
            let replacement = if lava {
                rnd.select(&wall_variants::UNDERWORLD)
            } else {
                rnd.select(&wall_variants::STONE)
            };
            (wall, replacement)
        })
        .collect();

    let mut coated = Vec::new();
    for x in span(center.x) {
        for y in span(center.y) {
            if rnd.fine(x, y) <= 4.0 * dist(x, y) - 3.0 {
                continue;
            }
            let exposed = world.is_exposed(x, y);
            let tile = world.tile_mut(x, y);
            if let Some(&wall) = walls.get(&tile.wall) {
                tile.wall = wall;
            }
            if tile.block == BlockId::STONE && exposed {
                tile.block = moss;
                coated.push(Command::GrowMoss { x, y });
            }
        }
    }
    world.queued_deco.extend(coated);
}

pub fn gen_glowing_moss(rnd: &mut Random, world: &mut World) {
    info!("Energizing moss");
    let num_caves = (world.conf.variation.glowing_moss_freq * rnd.get_double(2.0, 9.0)) as i32;
    for _ in 0..num_caves {
        fill_glowing_moss_cave(rnd, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::random::NoiseField;
    use crate::world::test_world;

    fn stone_world(width: i32, height: i32) -> World {
        let mut world = test_world(width, height);
        for pt in Rect::new(0, 0, width, height).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
            world.tile_at_mut(pt).wall = WallId::DIRT;
        }
        world
    }

    fn is_glowing_moss(block: BlockId) -> bool {
        matches!(
            block,
            BlockId::KRYPTON_MOSS_STONE
                | BlockId::XENON_MOSS_STONE
                | BlockId::ARGON_MOSS_STONE
                | BlockId::NEON_MOSS_STONE
                | BlockId::LAVA_MOSS_STONE
        )
    }

    #[test]
    fn test_solid_area_search() {
        let mut rnd = Random::new(1);
        let open = test_world(200, 200);
        assert_eq!(find_solid_area(50, 150, &mut rnd, &open), None);
        let solid = stone_world(200, 200);
        let found = find_solid_area(50, 150, &mut rnd, &solid).unwrap();
        assert!(found.y >= 54 && found.y <= 146);
    }

    #[test]
    fn test_cave_coats_pocket_edges() {
        let mut world = stone_world(1000, 600);
        world.conf.variation.glowing_moss_size = 10.0;
        let mut rnd = Random::new(5);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.6);
        fill_glowing_moss_cave(&mut rnd, &mut world);

        let mut moss_tiles = 0;
        let mut recoloured = 0;
        for pt in Rect::new(0, 0, 1000, 600).points() {
            let tile = world.tile_at(pt);
            if is_glowing_moss(tile.block) {
                moss_tiles += 1;
            }
            if wall_variants::contains(&wall_variants::STONE, tile.wall)
                || wall_variants::contains(&wall_variants::UNDERWORLD, tile.wall)
            {
                recoloured += 1;
            }
        }
        assert!(moss_tiles > 0);
        assert!(recoloured > 0);
        assert_eq!(world.queued_deco.len(), moss_tiles);
        for cmd in &world.queued_deco {
            let Command::GrowMoss { x, y } = *cmd else {
                panic!("unexpected command {:?}", cmd);
            };
            assert!(is_glowing_moss(world.tile(x, y).block));
            assert!(world.is_exposed(x, y));
        }
    }

    #[test]
    fn test_zero_frequency_places_nothing() {
        let mut world = stone_world(1000, 600);
        world.conf.variation.glowing_moss_freq = 0.0;
        let mut rnd = Random::new(5);
        gen_glowing_moss(&mut rnd, &mut world);
        assert!(world.queued_deco.is_empty());
    }
}
