//! Rainfall simulation that fills terrain depressions with liquid.
//!
//! Rain is dropped from a sample of columns and follows the terrain down
//! and sideways until it settles on a flat run of tiles. A run is filled
//! once enough rain has accumulated to cover its width. Columns run in
//! order since spilled rain lands in its neighbours.

use log::{debug, info};

use crate::ids::{wall_variants, BlockId, WallId};
use crate::tile::Liquid;
use crate::world::World;

/// Only every n-th column releases rain.
const RAIN_STRIDE: i32 = 4;
/// Rows between rain drops within a column.
const DROP_STEP: i32 = 3;
/// Rain released on each drop.
const DROP_VOLUME: f64 = 1.6;
const HIVE_DROP_VOLUME: f64 = 2.4;
/// Rain left over after a drop hits rock.
const RESIDUAL_WATER: f64 = 2.1;
/// Shallowest pool kept after evaporation.
const MIN_POOL_DEPTH: i32 = 4;

/// Surface blocks that never collect rain.
fn is_surface_dry(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::EBONSTONE
            | BlockId::EBONSAND
            | BlockId::LESION
            | BlockId::CORRUPT_GRASS
            | BlockId::CORRUPT_JUNGLE_GRASS
            | BlockId::CRIMSTONE
            | BlockId::CRIMSAND
            | BlockId::FLESH
            | BlockId::CRIMSON_GRASS
            | BlockId::CRIMSON_JUNGLE_GRASS
            | BlockId::PEARLSTONE
            | BlockId::PEARLSAND
            | BlockId::AETHERIUM
            | BlockId::CRYSTAL_BLOCK
            | BlockId::LIVING_WOOD
            | BlockId::LEAF
            | BlockId::LIVING_MAHOGANY
            | BlockId::MAHOGANY_LEAF
            | BlockId::ASH_GRASS
            | BlockId::SANDSTONE_BRICK
            | BlockId::EBONSTONE_BRICK
            | BlockId::PEARLSTONE_BRICK
            | BlockId::BLUE_BRICK
            | BlockId::GREEN_BRICK
            | BlockId::PINK_BRICK
    )
}

/// Walls of arid or constructed areas; rain passing them is absorbed.
fn is_dry_wall(wall: WallId) -> bool {
    matches!(
        wall,
        WallId::SANDSTONE_BRICK
            | WallId::SANDSTONE
            | WallId::HARDENED_SAND
            | WallId::HARDENED_EBONSAND
            | WallId::HARDENED_CRIMSAND
            | WallId::HARDENED_PEARLSAND
            | WallId::EBONSANDSTONE
            | WallId::CRIMSANDSTONE
            | WallId::PEARLSANDSTONE
            | WallId::SPIDER
    ) || wall_variants::contains(&wall_variants::DUNGEON, wall)
}

fn is_liquid_pathable(world: &World, x: i32, y: i32) -> bool {
    let tile = world.tile(x, y);
    (tile.is_empty() || tile.actuated()) && tile.liquid == Liquid::None
}

/// Follow a drop from `(x, y)` until it settles. Returns the settled run as
/// `(min_x, max_x, y)` with `max_x` exclusive.
pub fn follow_rain_from<F>(world: &World, mut x: i32, mut y: i32, is_pathable: F) -> (i32, i32, i32)
where
    F: Fn(&World, i32, i32) -> bool,
{
    loop {
        if is_pathable(world, x, y + 1) {
            y += 1;
            if y >= world.height() {
                return (x, x, y);
            }
            continue;
        }
        let mut flow_left = x;
        while flow_left > 0 {
            if is_pathable(world, flow_left, y + 1) || !is_pathable(world, flow_left - 1, y) {
                break;
            }
            flow_left -= 1;
        }
        let mut flow_right = x;
        while flow_right < world.width() {
            if is_pathable(world, flow_right, y + 1) || !is_pathable(world, flow_right + 1, y) {
                break;
            }
            flow_right += 1;
        }
        if x - flow_left > flow_right - x && is_pathable(world, flow_left, y + 1) {
            x = flow_left;
        } else if is_pathable(world, flow_right, y + 1) {
            x = flow_right;
        } else if is_pathable(world, flow_left, y + 1) {
            x = flow_left;
        } else {
            return (flow_left, flow_right + 1, y);
        }
    }
}

fn lava_level(world: &World) -> i32 {
    (world.cavern_level() + 2 * world.underworld_level()) / 3
}

fn simulate_rain(world: &mut World, x: i32) {
    let lava_level = lava_level(world);
    let underground = world.underground_level();
    let underworld = world.underworld_level();
    let jungle_reach = world.conf.variation.jungle_size * 0.08 * f64::from(world.width());
    let mut pending = if (f64::from(x) - world.ctx.jungle_center).abs() < jungle_reach {
        15.0
    } else {
        -4.0
    };
    let mut y = world.surface(x) - 45;
    while y < underworld {
        let drop_y = y;
        y += DROP_STEP;
        if !is_liquid_pathable(world, x, drop_y) || (drop_y < lava_level && is_dry_wall(world.tile(x, drop_y).wall)) {
            pending = RESIDUAL_WATER;
            continue;
        }
        pending += if world.tile(x, drop_y).wall == WallId::HIVE {
            HIVE_DROP_VOLUME
        } else {
            DROP_VOLUME
        };
        let (min_x, max_x, settle_y) = follow_rain_from(world, x, drop_y, is_liquid_pathable);
        if f64::from(max_x - min_x) >= pending {
            continue;
        }
        pending -= f64::from(max_x - min_x);
        let below = *world.tile((min_x + max_x) / 2, settle_y + 1);
        let near_surface = drop_y < underground;
        if below.liquid == Liquid::Shimmer
            || below.block == BlockId::BUBBLE
            || (near_surface && (is_surface_dry(below.block) || below.liquid == Liquid::Lava))
            || settle_y > underworld + 50
        {
            continue;
        }
        if near_surface
            && (is_surface_dry(world.tile(min_x - 1, settle_y).block)
                || is_surface_dry(world.tile(max_x, settle_y).block))
        {
            continue;
        }
        for fill_x in min_x..max_x {
            let tile = world.tile_mut(fill_x, settle_y);
            tile.liquid = if tile.wall == WallId::HIVE {
                Liquid::Honey
            } else if settle_y > lava_level {
                Liquid::Lava
            } else {
                Liquid::Water
            };
            if below.block == BlockId::HIVE && tile.liquid != Liquid::Honey {
                tile.block = if tile.liquid == Liquid::Lava {
                    BlockId::CRISPY_HONEY
                } else {
                    BlockId::HONEY
                };
                tile.liquid = Liquid::None;
            }
        }
    }
}

fn is_pooled(world: &World, x: i32, y: i32) -> bool {
    matches!(world.tile(x, y).liquid, Liquid::Water | Liquid::Lava)
}

/// Drain puddles and single stray tiles; freeze standing water in icy caves.
fn evaporate_small_pools(world: &mut World, x: i32) -> usize {
    let underground = world.underground_level();
    let mut drained = 0;
    let mut y = world.surface(x) - 50;
    while y < world.underworld_level() {
        let liquid = world.tile(x, y).liquid;
        if liquid != Liquid::Water && (liquid != Liquid::Lava || y < underground) {
            y += 1;
            continue;
        }
        let (_, _, pool_depth) = follow_rain_from(world, x, y, is_pooled);
        if pool_depth - y < MIN_POOL_DEPTH && world.tile(x, y - 1).is_empty() {
            while y <= pool_depth {
                world.tile_mut(x, y).liquid = Liquid::None;
                drained += 1;
                y += 1;
            }
            continue;
        }
        if pool_depth == y && world.tile(x - 1, y).liquid == Liquid::None && world.tile(x + 1, y).liquid == Liquid::None
        {
            world.tile_mut(x, y).liquid = Liquid::None;
            drained += 1;
        } else {
            let tile = world.tile_mut(x, y);
            if matches!(tile.wall, WallId::SNOW | WallId::ICE) && tile.liquid == Liquid::Water {
                tile.liquid = Liquid::None;
                tile.block = BlockId::THIN_ICE;
            }
            y = pool_depth;
        }
        y += 1;
    }
    drained
}

pub fn gen_lake(world: &mut World) {
    info!("Raining");
    for x in (0..world.width()).step_by(RAIN_STRIDE as usize) {
        simulate_rain(world, x);
    }
    let drained: usize = (0..world.width()).map(|x| evaporate_small_pools(world, x)).sum();
    debug!("Evaporated {} liquid tiles", drained);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::world::test_world;

    /// Dirt from row 100 down with a narrow surface bowl and a deep shaft.
    fn basin_world() -> World {
        let mut world = test_world(200, 600);
        for pt in Rect::new(0, 100, 200, 500).points() {
            world.tile_at_mut(pt).block = BlockId::DIRT;
        }
        for pt in Rect::new(44, 100, 8, 10).points().chain(Rect::new(80, 300, 4, 66).points()) {
            world.tile_at_mut(pt).clear_block();
        }
        world.rescan_surface();
        world
    }

    #[test]
    fn test_rain_settles_on_flat_run() {
        let world = basin_world();
        assert_eq!(follow_rain_from(&world, 50, 20, is_liquid_pathable), (44, 52, 109));
        // Spills sideways off a plateau into the bowl.
        assert_eq!(follow_rain_from(&world, 36, 20, is_liquid_pathable), (44, 52, 109));
    }

    #[test]
    fn test_gen_lake_fills_basins() {
        let mut world = basin_world();
        gen_lake(&mut world);
        // Every column spills into the bowl and fills it to the brim.
        for pt in Rect::new(44, 100, 8, 10).points() {
            assert_eq!(world.tile_at(pt).liquid, Liquid::Water);
        }
        assert_eq!(world.tile(43, 99).liquid, Liquid::None);
        // Deep below the lava line the shaft fills with lava.
        assert_eq!(world.tile(81, 365).liquid, Liquid::Lava);
        assert_eq!(world.tile(81, 362).liquid, Liquid::Lava);
        assert_eq!(world.tile(81, 320).liquid, Liquid::None);
    }

    #[test]
    fn test_puddles_evaporate() {
        let mut world = basin_world();
        for x in 44..52 {
            world.tile_mut(x, 108).liquid = Liquid::Water;
            world.tile_mut(x, 109).liquid = Liquid::Water;
        }
        assert_eq!(evaporate_small_pools(&mut world, 45), 2);
        assert_eq!(world.tile(45, 109).liquid, Liquid::None);
        assert_eq!(world.tile(46, 109).liquid, Liquid::Water);
    }

    #[test]
    fn test_icy_pools_freeze_over() {
        let mut world = basin_world();
        for pt in Rect::new(44, 100, 8, 10).points() {
            world.tile_at_mut(pt).liquid = Liquid::Water;
            world.tile_at_mut(pt).wall = WallId::ICE;
        }
        evaporate_small_pools(&mut world, 50);
        assert_eq!(world.tile(50, 100).block, BlockId::THIN_ICE);
        assert_eq!(world.tile(50, 100).liquid, Liquid::None);
        assert_eq!(world.tile(50, 105).liquid, Liquid::Water);
    }

    #[test]
    fn test_dry_biomes_stay_dry() {
        let mut world = basin_world();
        for x in 43..53 {
            world.tile_mut(x, 110).block = BlockId::EBONSAND;
        }
        for y in 100..110 {
            world.tile_mut(43, y).block = BlockId::EBONSAND;
            world.tile_mut(52, y).block = BlockId::EBONSAND;
        }
        gen_lake(&mut world);
        assert_eq!(world.tile(50, 109).liquid, Liquid::None);
    }
}
