//! Double trouble resource swap
//!
//! Marble and granite trade places everywhere. Ores swap with their pair
//! wherever coarse noise is positive, so both variants of every tier
//! appear in patches.

use log::info;

use crate::ids::{BlockId, WallId};
use crate::random::Random;
use crate::world::World;

fn swap_stone(block: BlockId) -> Option<BlockId> {
    match block {
        BlockId::MARBLE => Some(BlockId::GRANITE),
        BlockId::GRANITE => Some(BlockId::MARBLE),
        BlockId::SMOOTH_MARBLE => Some(BlockId::SMOOTH_GRANITE),
        BlockId::SMOOTH_GRANITE => Some(BlockId::SMOOTH_MARBLE),
        _ => None,
    }
}

/// The other ore of an interchangeable pair.
pub fn paired_ore(block: BlockId) -> Option<BlockId> {
    const PAIRS: [(BlockId, BlockId); 7] = [
        (BlockId::COPPER_ORE, BlockId::TIN_ORE),
        (BlockId::IRON_ORE, BlockId::LEAD_ORE),
        (BlockId::SILVER_ORE, BlockId::TUNGSTEN_ORE),
        (BlockId::GOLD_ORE, BlockId::PLATINUM_ORE),
        (BlockId::COBALT_ORE, BlockId::PALLADIUM_ORE),
        (BlockId::MYTHRIL_ORE, BlockId::ORICHALCUM_ORE),
        (BlockId::ADAMANTITE_ORE, BlockId::TITANIUM_ORE),
    ];
    PAIRS.iter().find_map(|&(a, b)| {
        if block == a {
            Some(b)
        } else if block == b {
            Some(a)
        } else {
            None
        }
    })
}

pub fn swap_resources(rnd: &mut Random, world: &mut World) {
    info!("Shuffling ores");
    // Same noise layout the terrain pass placed its ores with.
    rnd.restore_shuffle_state();
    let noise = &rnd.noise;
    world.par_columns_mut(|_, col| {
        let x = col.x;
        for y in 0..col.height() {
            let tile = col.tile(y);
            if let Some(block) = swap_stone(tile.block) {
                tile.block = block;
            } else if noise.coarse(x, y) > 0.0 {
                if let Some(block) = paired_ore(tile.block) {
                    tile.block = block;
                }
            }
            if tile.wall == WallId::MARBLE {
                tile.wall = WallId::GRANITE;
            } else if tile.wall == WallId::GRANITE {
                tile.wall = WallId::MARBLE;
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
    fn test_swap_resources() {
        let mut world = test_world(40, 40);
        let mut rnd = Random::new(1);
        // Positive noise on the left half only.
        rnd.noise = NoiseField::from_fn(40, 40, |x, _| if x < 20 { 0.5 } else { -0.5 });
        for (x, block) in [(5, BlockId::IRON_ORE), (30, BlockId::IRON_ORE), (31, BlockId::GRANITE)] {
            world.tile_mut(x, 10).block = block;
        }
        world.tile_mut(6, 10).wall = WallId::MARBLE;
        swap_resources(&mut rnd, &mut world);
        assert_eq!(world.tile(5, 10).block, BlockId::LEAD_ORE);
        assert_eq!(world.tile(30, 10).block, BlockId::IRON_ORE);
        assert_eq!(world.tile(31, 10).block, BlockId::MARBLE);
        assert_eq!(world.tile(6, 10).wall, WallId::GRANITE);
    }

    #[test]
    fn test_ore_pairs_are_symmetric() {
        assert_eq!(paired_ore(BlockId::TITANIUM_ORE), Some(BlockId::ADAMANTITE_ORE));
        assert_eq!(paired_ore(BlockId::COPPER_ORE), Some(BlockId::TIN_ORE));
        assert_eq!(paired_ore(BlockId::STONE), None);
    }
}
