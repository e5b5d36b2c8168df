//! Hardmode ore deposits: three depth bands of cobalt, mythril and
//! adamantite tiers, plus chlorophyte near jungle grass.

use log::info;

use crate::ids::BlockId;
use crate::point::Point;
use crate::random::Random;
use crate::world::{lerp, World};

use super::ore_threshold;

const CHLOROPHYTE_RADIUS: i32 = 8;

/// One ore band with its own noise offset.
#[derive(Debug, Clone, Copy)]
struct Deposit {
    ore: BlockId,
    min_y: i32,
    max_y: i32,
    shift: Point,
}

/// Blocks that may be replaced by hardmode ore.
fn is_clearable(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::ASH
            | BlockId::CLAY
            | BlockId::CORRUPT_ICE
            | BlockId::CORRUPT_JUNGLE_GRASS
            | BlockId::CRIMSAND
            | BlockId::CRIMSANDSTONE
            | BlockId::CRIMSON_ICE
            | BlockId::CRIMSON_JUNGLE_GRASS
            | BlockId::CRIMSTONE
            | BlockId::DIRT
            | BlockId::EBONSAND
            | BlockId::EBONSANDSTONE
            | BlockId::EBONSTONE
            | BlockId::GRANITE
            | BlockId::HARDENED_CRIMSAND
            | BlockId::HARDENED_EBONSAND
            | BlockId::HARDENED_SAND
            | BlockId::ICE
            | BlockId::JUNGLE_GRASS
            | BlockId::MARBLE
            | BlockId::MUD
            | BlockId::MUSHROOM_GRASS
            | BlockId::SAND
            | BlockId::SANDSTONE
            | BlockId::SNOW
            | BlockId::STONE
    )
}

/// True when jungle grass or chlorophyte lies within the spawn radius.
fn can_spawn_chlorophyte(x: i32, y: i32, world: &World) -> bool {
    let r = CHLOROPHYTE_RADIUS;
    (-r..r).any(|i| {
        (-r..r).any(|j| {
            f64::from(i).hypot(f64::from(j)) < f64::from(r)
                && matches!(world.tile(x + i, y + j).block, BlockId::JUNGLE_GRASS | BlockId::CHLOROPHYTE_ORE)
        })
    })
}

pub fn gen_hardmode_ores(rnd: &mut Random, world: &mut World) {
    info!("Blessing ore");
    rnd.shuffle_noise();
    let levels = world.levels();
    let band = |t: f64| lerp(f64::from(levels.cavern), f64::from(levels.underworld), t) as i32;
    let ores = world.ctx.ores;
    let mut deposit = |ore, min_y, max_y| Deposit {
        ore,
        min_y,
        max_y,
        shift: Point::new(rnd.get_int(0, world.width()), rnd.get_int(0, world.height())),
    };
    let deposits = [
        deposit(ores.cobalt, 0, band(0.48)),
        deposit(ores.mythril, band(0.12), band(0.73)),
        deposit(ores.adamantite, band(0.61), world.height()),
    ];
    let chlorophyte_threshold = ore_threshold(0.7 * world.conf.variation.ore);
    let threshold = ore_threshold(0.9 * world.conf.variation.ore);
    let noise = &rnd.noise;

    let planned = world.par_collect_columns(|world, x| {
        let mut edits = Vec::new();
        for y in 0..world.height() {
            let block = world.tile(x, y).block;
            if !is_clearable(block) || (y > levels.underworld && block == BlockId::ASH) {
                continue;
            }
            if y > levels.underground
                && noise.fine(x, y) < chlorophyte_threshold
                && (block == BlockId::JUNGLE_GRASS
                    || (block == BlockId::MUD && can_spawn_chlorophyte(x, y, world)))
            {
                edits.push((x, y, BlockId::CHLOROPHYTE_ORE));
                continue;
            }
            if noise.coarse(x, y) < 0.13 {
                continue;
            }
            let hit = deposits.iter().find(|d| {
                y > d.min_y && y < d.max_y && noise.fine(x + d.shift.x, y + d.shift.y) < threshold
            });
            if let Some(d) = hit {
                edits.push((x, y, d.ore));
            }
        }
        edits
    });
    for (x, y, ore) in planned {
        world.tile_mut(x, y).block = ore;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::NoiseField;
    use crate::world::{test_world, OreVariants};

    #[test]
    fn test_chlorophyte_needs_jungle_nearby() {
        let mut world = test_world(40, 40);
        world.tile_mut(20, 20).block = BlockId::JUNGLE_GRASS;
        assert!(can_spawn_chlorophyte(25, 20, &world));
        assert!(!can_spawn_chlorophyte(30, 20, &world));
    }

    #[test]
    fn test_deposit_bands() {
        let mut world = test_world(50, 1200);
        for x in 0..50 {
            for y in 0..1200 {
                world.tile_mut(x, y).block = BlockId::STONE;
            }
        }
        world.ctx.ores = OreVariants {
            cobalt: BlockId::COBALT_ORE,
            mythril: BlockId::MYTHRIL_ORE,
            adamantite: BlockId::ADAMANTITE_ORE,
            ..OreVariants::default()
        };
        let mut rnd = Random::new(1);
        // Fine noise always under the ore threshold, coarse always above the
        // deposit cut-off.
        rnd.noise = NoiseField::from_fn(50, 1200, |_, _| -0.9).with_coarse(|_, _| 0.5);
        gen_hardmode_ores(&mut rnd, &mut world);
        assert_eq!(world.tile(10, 0).block, BlockId::STONE);
        assert_eq!(world.tile(10, 10).block, BlockId::COBALT_ORE);
        assert_eq!(world.tile(10, 760).block, BlockId::MYTHRIL_ORE);
        assert_eq!(world.tile(10, 900).block, BlockId::ADAMANTITE_ORE);
    }

    #[test]
    fn test_chlorophyte_from_jungle_grass() {
        let mut world = test_world(50, 1200);
        for x in 0..50 {
            for y in 400..420 {
                world.tile_mut(x, y).block = BlockId::MUD;
            }
            world.tile_mut(x, 399).block = BlockId::JUNGLE_GRASS;
        }
        let mut rnd = Random::new(1);
        rnd.noise = NoiseField::from_fn(50, 1200, |_, _| -0.9);
        gen_hardmode_ores(&mut rnd, &mut world);
        assert_eq!(world.tile(20, 399).block, BlockId::CHLOROPHYTE_ORE);
        assert_eq!(world.tile(20, 403).block, BlockId::CHLOROPHYTE_ORE);
        assert_eq!(world.tile(20, 415).block, BlockId::MUD);
    }
}
