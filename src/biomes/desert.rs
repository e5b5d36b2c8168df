//! Desert conversion
//!
//! Turns the registered desert band into sand, sandstone, hardened sand and
//! fossil, then clears long horizontal pockets out of the sandstone with
//! the stretched blur field.

use std::collections::HashMap;

use log::info;

use crate::ids::{wall_variants, BlockId, WallId};
use crate::point::Point;
use crate::random::{NoiseField, Random};
use crate::world::{Levels, World};

use super::{carve_columns, fill_large_wall_gaps};

fn sand_walls(rnd: &mut Random) -> HashMap<WallId, WallId> {
    let mut walls = HashMap::from([(WallId::MARBLE, WallId::MARBLE), (WallId::CLOUD, WallId::CLOUD)]);
    for &wall in wall_variants::DIRT.iter() {
        walls.insert(wall, rnd.select(&[WallId::SANDSTONE, WallId::HARDENED_SAND]));
    }
    walls
}

/// Desert replacement for one block. Stone below the caverns is banded
/// with sand and hardened sand.
fn desertify(block: BlockId, x: i32, y: i32, noise: &NoiseField, levels: &Levels) -> BlockId {
    match block {
        BlockId::DIRT => BlockId::SAND,
        BlockId::ICE if noise.fine(x, y) > -0.02 => block,
        BlockId::ICE | BlockId::STONE | BlockId::SMOOTH_MARBLE => {
            let band = noise.coarse(x, y);
            if y > levels.cavern && (band + 0.23).abs() < 0.04 {
                BlockId::SAND
            } else if y > levels.cavern && (band - 0.23).abs() < 0.04 {
                BlockId::HARDENED_SAND
            } else {
                BlockId::SANDSTONE
            }
        }
        BlockId::CLAY | BlockId::MUD => BlockId::DESERT_FOSSIL,
        BlockId::SAND if y > levels.cavern => BlockId::DESERT_FOSSIL,
        BlockId::SAND if y > levels.underground => BlockId::HARDENED_SAND,
        _ => block,
    }
}

pub fn gen_desert(rnd: &mut Random, world: &mut World) {
    info!("Desertification");
    rnd.shuffle_noise();
    let shuffle = Point::new(rnd.get_int(0, world.width()), rnd.get_int(0, world.height()));
    let center = world.ctx.desert_center;
    let size = world.conf.variation.desert_size;
    let width = f64::from(world.width());
    let height = f64::from(world.height());
    let scan = size * 0.08 * width;
    let levels = world.levels();
    let floor = f64::from((levels.cavern + 4 * levels.underworld) / 5);
    let walls = sand_walls(rnd);
    fill_large_wall_gaps(
        Point::new((center - 0.9 * scan) as i32, (0.95 * f64::from(levels.underground)) as i32),
        Point::new((center + 0.9 * scan) as i32, (0.96 * floor) as i32),
        rnd,
        world,
    );

    let noise = &rnd.noise;
    let columns = (center - scan).max(0.0) as i32..(center + scan).min(width) as i32;
    carve_columns(world, columns, |_, col| {
        let x = col.x;
        for y in 0..levels.underworld {
            let threshold = ((f64::from(x) - center).abs() / 100.0 - size * width / 1700.0)
                .max(15.0 * (f64::from(y) - floor) / height);
            if noise.coarse(x, y) < threshold {
                continue;
            }
            let tile = col.tile(y);
            tile.block = desertify(tile.block, x, y, noise, &levels);
            tile.wall = match tile.block {
                BlockId::SANDSTONE => WallId::SANDSTONE,
                BlockId::SAND | BlockId::HARDENED_SAND => WallId::HARDENED_SAND,
                _ => walls.get(&tile.wall).copied().unwrap_or(WallId::EMPTY),
            };

            let threshold = threshold.max(3.0 * f64::from(levels.underground - y) / height);
            let clear = noise.blur(x, 5 * y).abs() > (threshold + 1.2).max(0.4)
                && noise.fine(x + shuffle.x, y + shuffle.y) > -0.3;
            let loose = tile.block == BlockId::SANDSTONE
                || ((tile.block == BlockId::SAND || tile.block == BlockId::HARDENED_SAND) && noise.fine(x, y) > 0.0);
            if clear && loose {
                tile.block = BlockId::EMPTY;
            }
            if tile.wall.is_empty() && y > levels.cavern && noise.fine(x, y) < 0.5 {
                tile.wall = WallId::SANDSTONE;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    #[test]
    fn test_desertify_by_depth() {
        let levels = Levels::new(1000, 600);
        let flat = NoiseField::from_fn(10, 10, |_, _| 0.5);
        assert_eq!(desertify(BlockId::DIRT, 0, 10, &flat, &levels), BlockId::SAND);
        assert_eq!(desertify(BlockId::SAND, 0, 10, &flat, &levels), BlockId::SAND);
        assert_eq!(desertify(BlockId::SAND, 0, levels.underground + 1, &flat, &levels), BlockId::HARDENED_SAND);
        assert_eq!(desertify(BlockId::SAND, 0, levels.cavern + 1, &flat, &levels), BlockId::DESERT_FOSSIL);
        // Ice survives where fine noise is high.
        assert_eq!(desertify(BlockId::ICE, 0, 10, &flat, &levels), BlockId::ICE);
        assert_eq!(desertify(BlockId::STONE, 0, 10, &flat, &levels), BlockId::SANDSTONE);
    }

    #[test]
    fn test_gen_desert_sets_walls() {
        let mut world = test_world(1000, 600);
        for x in 0..1000 {
            for y in 100..360 {
                world.tile_mut(x, y).block = BlockId::STONE;
            }
        }
        world.ctx.desert_center = 500.0;
        let mut rnd = Random::new(3);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.3);
        gen_desert(&mut rnd, &mut world);
        let tile = world.tile(500, 150);
        assert_eq!(tile.block, BlockId::SANDSTONE);
        assert_eq!(tile.wall, WallId::SANDSTONE);
        assert_eq!(world.tile(100, 150).block, BlockId::STONE);
    }
}
