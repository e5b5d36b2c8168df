//! Finishing passes over the whole grid: surface slopes, sand
//! stabilisation and wall blending, then moss regions and deep stone walls.

use std::collections::HashMap;

use log::info;

use crate::biomes::grow_moss_on;
use crate::ids::{wall_variants, BlockId, PaintId, WallId};
use crate::random::Random;
use crate::tile::Slope;
use crate::world::World;

/// Wall to show on an exposed block, borrowed from the open space next to
/// it. Open air with no wall wins outright; a neighbour sharing the block's
/// own wall keeps it.
pub fn attached_open_wall(world: &World, x: i32, y: i32) -> (WallId, PaintId) {
    let origin = world.tile(x, y);
    let mut found = (origin.wall, origin.wall_paint);
    let mut keep_origin = false;
    for i in -1..=1 {
        for j in -1..=1 {
            if i == 0 && j == 0 {
                continue;
            }
            let tile = world.tile(x + i, y + j);
            if !tile.is_empty() {
                continue;
            }
            if tile.wall.is_empty() {
                return (WallId::EMPTY, PaintId::NONE);
            }
            if !keep_origin {
                if tile.wall == origin.wall {
                    keep_origin = true;
                } else {
                    found = (tile.wall, tile.wall_paint);
                }
            }
        }
    }
    if keep_origin {
        (origin.wall, origin.wall_paint)
    } else {
        found
    }
}

fn is_open(block: BlockId) -> bool {
    block.is_empty() || block == BlockId::MINECART_TRACK
}

/// Slope for the block at `(x, y)` from its 8-neighbourhood. Bits are read
/// column by column from the top-left, with set bits meaning open space.
pub fn compute_slope(world: &World, x: i32, y: i32) -> Slope {
    let mut flags = 0u8;
    for i in -1..=1 {
        for j in -1..=1 {
            if i == 0 && j == 0 {
                continue;
            }
            flags <<= 1;
            if is_open(world.tile(x + i, y + j).block) {
                flags |= 1;
            }
        }
    }
    let not_crystal = world.tile(x, y).block != BlockId::CRYSTAL_BLOCK;
    match flags {
        0b1101_0110 | 0b1111_0110 | 0b1101_0111 => Slope::Half,
        0b1001_0110 | 0b1001_0111 if world.tile(x - 2, y).is_empty() && not_crystal => Slope::Half,
        0b1001_0110 | 0b1001_0111 | 0b0001_0110 | 0b0001_0111 | 0b0011_0110 => Slope::TopRight,
        0b1101_0100 | 0b1111_0100 if world.tile(x + 2, y).is_empty() && not_crystal => Slope::Half,
        0b1101_0100 | 0b1111_0100 | 0b1101_0000 | 0b1111_0000 | 0b1101_0001 => Slope::TopLeft,
        0b0000_1011 | 0b0010_1011 | 0b0000_1111 | 0b0010_1111 | 0b1000_1011 => Slope::BottomRight,
        0b0110_1000 | 0b1110_1000 | 0b0110_1001 | 0b1110_1001 | 0b0110_1100 => Slope::BottomLeft,
        _ => Slope::None,
    }
}

/// Loose blocks that would fall out from under an open tile.
fn stabilize(block: BlockId) -> Option<BlockId> {
    match block {
        BlockId::SAND | BlockId::SHELL_PILE => Some(BlockId::HARDENED_SAND),
        BlockId::EBONSAND => Some(BlockId::HARDENED_EBONSAND),
        BlockId::PEARLSAND => Some(BlockId::HARDENED_PEARLSAND),
        BlockId::CRIMSAND => Some(BlockId::HARDENED_CRIMSAND),
        BlockId::SILT => Some(BlockId::MUD),
        BlockId::SLUSH => Some(BlockId::SNOW),
        _ => None,
    }
}

fn is_sloped(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::DIRT
            | BlockId::STONE
            | BlockId::GRASS
            | BlockId::CORRUPT_GRASS
            | BlockId::EBONSTONE
            | BlockId::METEORITE
            | BlockId::CLAY
            | BlockId::SAND
            | BlockId::OBSIDIAN
            | BlockId::ASH
            | BlockId::MUD
            | BlockId::JUNGLE_GRASS
            | BlockId::MUSHROOM_GRASS
            | BlockId::HALLOWED_GRASS
            | BlockId::EBONSAND
            | BlockId::PEARLSAND
            | BlockId::PEARLSTONE
            | BlockId::SILT
            | BlockId::SNOW
            | BlockId::ICE
            | BlockId::CORRUPT_ICE
            | BlockId::HALLOWED_ICE
            | BlockId::CLOUD
            | BlockId::LIVING_WOOD
            | BlockId::LEAF
            | BlockId::FLESH
            | BlockId::RAIN_CLOUD
            | BlockId::CRIMSON_GRASS
            | BlockId::CRIMSON_ICE
            | BlockId::CRIMSTONE
            | BlockId::SLUSH
            | BlockId::HIVE
            | BlockId::HONEY
            | BlockId::CRISPY_HONEY
            | BlockId::CRIMSAND
            | BlockId::CORALSTONE
            | BlockId::SMOOTH_MARBLE
            | BlockId::MARBLE
            | BlockId::GRANITE
            | BlockId::SMOOTH_GRANITE
            | BlockId::LAVA_MOSS_STONE
            | BlockId::LIVING_MAHOGANY
            | BlockId::MAHOGANY_LEAF
            | BlockId::CRYSTAL_BLOCK
            | BlockId::SANDSTONE
            | BlockId::HARDENED_SAND
            | BlockId::HARDENED_EBONSAND
            | BlockId::HARDENED_CRIMSAND
            | BlockId::EBONSANDSTONE
            | BlockId::CRIMSANDSTONE
            | BlockId::HARDENED_PEARLSAND
            | BlockId::PEARLSANDSTONE
            | BlockId::SNOW_CLOUD
            | BlockId::LESION
            | BlockId::KRYPTON_MOSS_STONE
            | BlockId::XENON_MOSS_STONE
            | BlockId::ARGON_MOSS_STONE
            | BlockId::NEON_MOSS_STONE
            | BlockId::HELIUM_MOSS_STONE
            | BlockId::ASH_GRASS
            | BlockId::CORRUPT_JUNGLE_GRASS
            | BlockId::CRIMSON_JUNGLE_GRASS
            | BlockId::AETHERIUM
    )
}

/// Planned change to one exposed surface tile.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SurfaceEdit {
    y: i32,
    wall: (WallId, PaintId),
    block: BlockId,
    slope: Slope,
}

fn plan_surface_column(world: &World, x: i32) -> Vec<SurfaceEdit> {
    let mut edits = Vec::new();
    for y in 0..world.height() {
        let tile = world.tile(x, y);
        if tile.guarded || !tile.block.is_solid() || !world.is_exposed(x, y) {
            continue;
        }
        let wall = if tile.wall.is_empty() {
            (tile.wall, tile.wall_paint)
        } else {
            attached_open_wall(world, x, y)
        };
        if world.is_isolated(x, y) {
            edits.push(SurfaceEdit { y, wall, block: BlockId::EMPTY, slope: Slope::None });
            continue;
        }
        let mut block = tile.block;
        if !world.tile(x, y + 1).block.is_solid() {
            block = stabilize(block).unwrap_or(block);
        }
        let slope = if is_sloped(block) { compute_slope(world, x, y) } else { tile.slope };
        edits.push(SurfaceEdit { y, wall, block, slope });
    }
    edits
}

/// Slope exposed blocks, drop isolated ones, harden loose sand over open
/// space and blend exposed walls into the open area beside them.
pub fn smooth_surfaces(world: &mut World) {
    info!("Smoothing surfaces");
    let planned = world.par_collect_columns(|world, x| vec![(x, plan_surface_column(world, x))]);
    for (x, edits) in planned {
        for edit in edits {
            let tile = world.tile_mut(x, edit.y);
            (tile.wall, tile.wall_paint) = edit.wall;
            tile.block = edit.block;
            tile.slope = edit.slope;
        }
    }
}

/// Noise-selected region that turns stone into one moss colour.
#[derive(Debug, Clone, Copy)]
struct MossRegion {
    block: BlockId,
    wall: WallId,
    shift: (i32, i32),
}

/// Planned wall change from `finalize_walls`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum WallEdit {
    Moss { y: i32, block: Option<BlockId>, wall: WallId },
    Stone { y: i32, wall: WallId },
}

/// Deepen underground dirt walls: exposed ones in noise-picked regions turn
/// mossy, deeper ones become stone wall variants.
pub fn finalize_walls(rnd: &mut Random, world: &mut World) {
    info!("Hardening walls");
    let mut mosses: Vec<MossRegion> = [
        (BlockId::GREEN_MOSS_STONE, WallId::GREEN_MOSSY),
        (BlockId::BROWN_MOSS_STONE, WallId::BROWN_MOSSY),
        (BlockId::RED_MOSS_STONE, WallId::RED_MOSSY),
        (BlockId::BLUE_MOSS_STONE, WallId::BLUE_MOSSY),
        (BlockId::PURPLE_MOSS_STONE, WallId::PURPLE_MOSSY),
    ]
    .into_iter()
    .map(|(block, wall)| MossRegion {
        block,
        wall,
        shift: (rnd.get_int(0, world.width()), rnd.get_int(0, world.height())),
    })
    .collect();
    rnd.seq.shuffle(&mut mosses);
    let stone_walls: HashMap<WallId, WallId> = wall_variants::DIRT
        .iter()
        .map(|&wall| (wall, rnd.select(&wall_variants::STONE)))
        .collect();
    let levels = world.levels();
    let height = f64::from(world.height());
    let moss_bound = f64::from((2 * levels.underground + levels.cavern) / 3);
    let stone_bound = f64::from((4 * levels.cavern + levels.underworld) / 5);
    let noise = &rnd.noise;

    let planned = world.par_collect_columns(|world, x| {
        let mut edits = Vec::new();
        for y in levels.underground..world.height() {
            let coarse = noise.coarse(x, y);
            if coarse < 15.0 * (moss_bound - f64::from(y)) / height {
                continue;
            }
            let tile = world.tile(x, y);
            let Some(&stone) = stone_walls.get(&tile.wall) else { continue };
            if world.is_exposed(x, y) {
                let region = mosses.iter().find(|m| noise.coarse(x + m.shift.0, y + m.shift.1) > 0.6);
                if let Some(region) = region {
                    let block = (tile.block == BlockId::STONE).then_some(region.block);
                    edits.push(WallEdit::Moss { y, block, wall: region.wall });
                    continue;
                }
            }
            if coarse >= 15.0 * (stone_bound - f64::from(y)) / height && tile.block != BlockId::DIRT {
                edits.push(WallEdit::Stone { y, wall: stone });
            }
        }
        vec![(x, edits)]
    });

    for (x, edits) in planned {
        for edit in edits {
            match edit {
                WallEdit::Moss { y, block, wall } => {
                    world.tile_mut(x, y).wall = wall;
                    if let Some(block) = block {
                        world.tile_mut(x, y).block = block;
                        grow_moss_on(x, y, world);
                    }
                }
                WallEdit::Stone { y, wall } => world.tile_mut(x, y).wall = wall,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::random::NoiseField;
    use crate::world::test_world;

    #[test]
    fn test_open_wall_prefers_bare_air() {
        let mut world = test_world(10, 10);
        world.tile_mut(5, 5).block = BlockId::STONE;
        world.tile_mut(5, 5).wall = WallId::STONE_PLACED;
        // Every neighbour is air without a wall.
        assert_eq!(attached_open_wall(&world, 5, 5), (WallId::EMPTY, PaintId::NONE));
    }

    #[test]
    fn test_open_wall_borrows_neighbour() {
        let mut world = test_world(10, 10);
        for pt in Rect::new(3, 3, 5, 5).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
            world.tile_at_mut(pt).wall = WallId::STONE_PLACED;
        }
        world.tile_mut(6, 5).block = BlockId::EMPTY;
        world.tile_mut(6, 5).wall = WallId::GRASS;
        assert_eq!(attached_open_wall(&world, 5, 5).0, WallId::GRASS);
        world.tile_mut(4, 5).block = BlockId::EMPTY;
        assert_eq!(attached_open_wall(&world, 5, 5).0, WallId::STONE_PLACED);
    }

    #[test]
    fn test_slope_on_hill_corners() {
        let mut world = test_world(20, 20);
        for x in 0..20 {
            for y in 10..20 {
                world.tile_mut(x, y).block = BlockId::DIRT;
            }
        }
        // A one-wide step: the left edge of the raised block.
        for x in 8..20 {
            world.tile_mut(x, 9).block = BlockId::DIRT;
        }
        assert_eq!(compute_slope(&world, 8, 9), Slope::TopLeft);
        assert_eq!(compute_slope(&world, 12, 9), Slope::None);
        assert_eq!(compute_slope(&world, 12, 15), Slope::None);
    }

    #[test]
    fn test_smooth_surfaces_drops_isolated_and_hardens_sand() {
        let mut world = test_world(30, 30);
        world.tile_mut(5, 5).block = BlockId::STONE;
        for x in 10..20 {
            world.tile_mut(x, 10).block = BlockId::SAND;
        }
        smooth_surfaces(&mut world);
        assert!(world.tile(5, 5).is_empty());
        assert_eq!(world.tile(15, 10).block, BlockId::HARDENED_SAND);
    }

    #[test]
    fn test_guarded_tiles_untouched() {
        let mut world = test_world(30, 30);
        world.tile_mut(5, 5).block = BlockId::STONE;
        world.tile_mut(5, 5).guarded = true;
        smooth_surfaces(&mut world);
        assert_eq!(world.tile(5, 5).block, BlockId::STONE);
    }

    #[test]
    fn test_finalize_walls_deepens_dirt_walls() {
        let mut world = test_world(60, 600);
        for x in 0..60 {
            for y in 0..600 {
                let tile = world.tile_mut(x, y);
                tile.block = BlockId::STONE;
                tile.wall = WallId::DIRT;
            }
        }
        let mut rnd = Random::new(6);
        rnd.noise = NoiseField::from_fn(60, 600, |_, _| 0.5);
        finalize_walls(&mut rnd, &mut world);
        // Above the underground line nothing changes.
        assert_eq!(world.tile(30, 10).wall, WallId::DIRT);
        let deep = world.tile(30, 500).wall;
        assert!(wall_variants::contains(&wall_variants::STONE, deep));
    }
}
