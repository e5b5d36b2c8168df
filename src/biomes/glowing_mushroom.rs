//! Glowing mushroom fields in the caverns.
//!
//! Each field is a squashed ellipse of mud and mushroom grass with a
//! hollow band near its floor. Fields keep clear of the desert, jungle
//! and snow; with the patchwork layout they only go where forest is
//! nearly pure.

use log::{debug, info};

use crate::config::BiomeLayout;
use crate::ids::{BlockId, WallId};
use crate::point::Point;
use crate::random::{hash_point, Random};
use crate::world::{lerp, World};

/// World area per field at frequency 1.
const AREA_PER_FIELD: f64 = 3_388_000.0;
const MIN_FIELDS: i32 = 2;
const TRIES_PER_FIELD: i32 = 2500;

fn fill_mushroom_field(center_x: i32, field_floor: i32, field_size: i32, rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let size = f64::from(field_size);
    let center_y = (f64::from(field_floor) - 0.35 * size) as i32;
    world.ctx.mushroom_centers.push(Point::new(center_x, center_y));
    let secondary = rnd.select(&[BlockId::SILT, BlockId::SLIME]);
    let underground = world.underground_level();
    let cx = f64::from(center_x);
    for x in (cx - 1.4 * size) as i32..(cx + 1.4 * size) as i32 {
        for y in field_floor - field_size..field_floor + field_size / 2 {
            let dist = f64::from(x - center_x).hypot(2.1 * f64::from(y - center_y));
            if rnd.fine(x, y) < 4.0 * dist / size - 5.0 {
                continue;
            }
            let dx = f64::from(center_x - x);
            let hollow_top = f64::from(field_floor) + 5.0 * rnd.fine(x, underground)
                - 0.7 * (size * size - dx * dx).max(0.0).sqrt();
            let hollow = rnd.coarse(x, y).abs() > 0.07
                && rnd.coarse(x + center_x, y + center_y).abs() > 0.07
                && f64::from(y) > hollow_top
                && f64::from(y) < f64::from(field_floor) + 10.0 * rnd.coarse(x, 0);
            if hollow {
                let tile = world.tile_mut(x, y);
                tile.block = BlockId::EMPTY;
                tile.wall = WallId::EMPTY;
                for (i, j) in [(-1, -1), (-1, 0), (0, -1)] {
                    let prev = world.tile_mut(x + i, y + j);
                    if prev.block == BlockId::MUD
                        || (prev.block == BlockId::MARBLE && hash_point(x + i, y + j) % 11 > 4)
                    {
                        prev.block = BlockId::MUSHROOM_GRASS;
                    }
                }
                continue;
            }
            let exposed = world.is_exposed(x, y);
            match world.tile(x, y).block {
                BlockId::MARBLE => {
                    if exposed && hash_point(x, y) % 11 > 4 {
                        let tile = world.tile_mut(x, y);
                        tile.block = BlockId::MUSHROOM_GRASS;
                        tile.wall = WallId::MUSHROOM;
                    }
                }
                BlockId::GRASS => {
                    let tile = world.tile_mut(x, y);
                    tile.block = BlockId::MUSHROOM_GRASS;
                    if !tile.wall.is_empty() {
                        tile.wall = WallId::MUSHROOM;
                    }
                }
                block @ (BlockId::EMPTY
                | BlockId::STONE
                | BlockId::CLAY
                | BlockId::SAND
                | BlockId::MUD
                | BlockId::JUNGLE_GRASS
                | BlockId::ICE
                | BlockId::SANDSTONE) => {
                    let grass = !block.is_empty() && (exposed || rnd.get_int(0, 35) == 0);
                    let tile = world.tile_mut(x, y);
                    if !block.is_empty() {
                        tile.block = if grass { BlockId::MUSHROOM_GRASS } else { BlockId::MUD };
                    }
                    if !tile.wall.is_empty() {
                        tile.wall = WallId::MUSHROOM;
                    }
                }
                BlockId::DIRT => world.tile_mut(x, y).block = secondary,
                _ => {}
            }
        }
    }
}

pub fn gen_glowing_mushroom(rnd: &mut Random, world: &mut World) {
    info!("Fertilizing glowing mushrooms");
    let v = &world.conf.variation;
    let (freq, size) = (v.glowing_mushroom_freq, v.glowing_mushroom_size);
    let width = f64::from(world.width());
    let area = width * f64::from(world.height());
    let mut remaining = ((freq * area / AREA_PER_FIELD) as i32).max(MIN_FIELDS);
    let max_tries = remaining * TRIES_PER_FIELD;
    let patches = world.conf.world.biomes == BiomeLayout::Patches;
    for tries in 0..max_tries {
        if remaining == 0 {
            break;
        }
        // Oversized fields shrink back towards normal as tries run out.
        let scale = if size > 1.0 {
            lerp(size, 1.0, f64::from(tries) / f64::from(max_tries))
        } else {
            size
        };
        let buffer = (scale * 0.06 * width) as i32;
        let center_x = (width * rnd.get_double(0.05, 0.95)) as i32;
        let field_floor = rnd.get_int(world.cavern_level(), world.underworld_level() - 50);
        let blocked = if patches {
            world.biome(center_x, field_floor).forest < 0.99
        } else {
            let ctx = &world.ctx;
            [ctx.desert_center, ctx.jungle_center, ctx.snow_center]
                .iter()
                .any(|c| (c - f64::from(center_x)).abs() < f64::from(buffer))
        };
        if blocked {
            continue;
        }
        let field_size = rnd.get_int(buffer / 4, buffer / 2);
        fill_mushroom_field(center_x, field_floor, field_size, rnd, world);
        remaining -= 1;
    }
    if remaining > 0 {
        debug!("{} glowing mushroom fields found no site", remaining);
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

    #[test]
    fn test_field_converts_cavern() {
        let mut world = stone_world(600, 400);
        world.tile_mut(290, 214).block = BlockId::DIRT;
        let mut rnd = Random::new(3);
        rnd.noise = NoiseField::from_fn(600, 400, |_, _| 0.5);
        fill_mushroom_field(300, 250, 40, &mut rnd, &mut world);
        assert_eq!(world.ctx.mushroom_centers, vec![Point::new(300, 236)]);
        // Above the hollow band the stone turns to mud or grass.
        let roof = world.tile(300, 215);
        assert!(matches!(roof.block, BlockId::MUD | BlockId::MUSHROOM_GRASS));
        assert_eq!(roof.wall, WallId::MUSHROOM);
        let hollow = world.tile(300, 240);
        assert!(hollow.is_empty());
        assert!(hollow.wall.is_empty());
        assert!(matches!(world.tile(290, 214).block, BlockId::SILT | BlockId::SLIME));
        // Outside the ellipse nothing changes.
        assert_eq!(world.tile(360, 236).block, BlockId::STONE);
        assert_eq!(world.tile(360, 236).wall, WallId::DIRT);
    }

    #[test]
    fn test_fields_avoid_biome_centres() {
        let mut world = stone_world(1000, 600);
        world.ctx.desert_center = 150.0;
        world.ctx.jungle_center = 500.0;
        world.ctx.snow_center = 850.0;
        let mut rnd = Random::new(12);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.5);
        gen_glowing_mushroom(&mut rnd, &mut world);
        let centers = &world.ctx.mushroom_centers;
        assert_eq!(centers.len(), 2);
        for center in centers {
            for biome in [150, 500, 850] {
                assert!((center.x - biome).abs() >= 60, "field at {} too close to {}", center.x, biome);
            }
            assert!(center.y < world.underworld_level());
        }
    }

    #[test]
    fn test_patches_need_forest() {
        let mut world = stone_world(1000, 600);
        world.conf.world.biomes = BiomeLayout::Patches;
        world.init_biome_data();
        let mut rnd = Random::new(12);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.5);
        gen_glowing_mushroom(&mut rnd, &mut world);
        assert!(world.ctx.mushroom_centers.is_empty());
    }
}
