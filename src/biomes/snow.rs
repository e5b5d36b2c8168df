//! Snow conversion
//!
//! Inside the registered snow band: dirt to snow, stone to ice, clay to
//! stone, sand to thin ice, mud to slush. Dirt wall variants are remapped
//! once per world to snow, ice or a stone variant.

use std::collections::HashMap;

use log::info;

use crate::ids::{wall_variants, BlockId, WallId};
use crate::random::Random;
use crate::world::World;

use super::carve_columns;

/// Per-world wall remap for the snow band.
fn snow_walls(rnd: &mut Random) -> HashMap<WallId, WallId> {
    let mut walls = HashMap::from([(WallId::CLOUD, WallId::CLOUD)]);
    for &wall in wall_variants::DIRT.iter() {
        let stone = rnd.select(&wall_variants::STONE);
        walls.insert(wall, rnd.select(&[WallId::SNOW, WallId::SNOW, WallId::ICE, WallId::ICE, stone]));
    }
    walls
}

fn freeze(block: BlockId) -> Option<(BlockId, Option<WallId>)> {
    match block {
        BlockId::DIRT | BlockId::SMOOTH_MARBLE => Some((BlockId::SNOW, Some(WallId::SNOW))),
        BlockId::STONE => Some((BlockId::ICE, Some(WallId::ICE))),
        BlockId::CLAY => Some((BlockId::STONE, None)),
        BlockId::SAND => Some((BlockId::THIN_ICE, None)),
        BlockId::MUD => Some((BlockId::SLUSH, None)),
        BlockId::CLOUD => Some((BlockId::SNOW_CLOUD, None)),
        _ => None,
    }
}

pub fn gen_snow(rnd: &mut Random, world: &mut World) {
    info!("Freezing land");
    rnd.shuffle_noise();
    let center = world.ctx.snow_center;
    let size = world.conf.variation.snow_size;
    let width = f64::from(world.width());
    let height = f64::from(world.height());
    let scan = size * 0.08 * width;
    let levels = world.levels();
    let floor = f64::from((levels.cavern + 2 * levels.underworld) / 3);
    let walls = snow_walls(rnd);
    let noise = &rnd.noise;
    let columns = (center - scan).max(0.0) as i32..(center + scan).min(width) as i32;
    carve_columns(world, columns, |_, col| {
        let x = col.x;
        for y in 0..levels.underworld {
            let fy = f64::from(y);
            let threshold = ((f64::from(x) - center).abs() / 100.0 - size * width / 1700.0)
                .max(15.0 * (fy - floor) / height);
            if noise.coarse(x, y) < threshold {
                continue;
            }
            let tile = col.tile(y);
            if let Some((block, wall)) = freeze(tile.block) {
                tile.block = block;
                if let Some(wall) = wall {
                    tile.wall = wall;
                }
            }
            if let Some(&wall) = walls.get(&tile.wall) {
                tile.wall = wall;
            }
            let threshold = threshold.max(15.0 * f64::from(levels.cavern - y) / height);
            if (noise.coarse(2 * x, y) + 0.1).abs() < 0.12 && noise.fine(x, y) > (1.0 + threshold).max(-0.1) {
                tile.block = if tile.block == BlockId::SNOW { BlockId::THIN_ICE } else { BlockId::EMPTY };
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::NoiseField;
    use crate::world::test_world;

    #[test]
    fn test_freeze_table() {
        assert_eq!(freeze(BlockId::DIRT), Some((BlockId::SNOW, Some(WallId::SNOW))));
        assert_eq!(freeze(BlockId::MUD), Some((BlockId::SLUSH, None)));
        assert_eq!(freeze(BlockId::GRANITE), None);
    }

    #[test]
    fn test_snow_walls_cover_dirt_family() {
        let mut rnd = Random::new(4);
        let walls = snow_walls(&mut rnd);
        for wall in wall_variants::DIRT.iter() {
            let target = walls[wall];
            assert!(
                target == WallId::SNOW || target == WallId::ICE || wall_variants::contains(&wall_variants::STONE, target)
            );
        }
        assert_eq!(walls[&WallId::CLOUD], WallId::CLOUD);
    }

    #[test]
    fn test_gen_snow_converts_band_only() {
        let mut world = test_world(1000, 600);
        for x in 0..1000 {
            for y in 100..300 {
                world.tile_mut(x, y).block = BlockId::DIRT;
            }
        }
        world.ctx.snow_center = 500.0;
        let mut rnd = Random::new(9);
        // Strong coarse signal everywhere, and a fine field that never
        // opens thin ice caves.
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.9);
        gen_snow(&mut rnd, &mut world);
        assert_eq!(world.tile(500, 150).block, BlockId::SNOW);
        assert_eq!(world.tile(500, 150).wall, WallId::SNOW);
        assert_eq!(world.tile(100, 150).block, BlockId::DIRT);
    }
}
