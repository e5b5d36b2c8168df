//! Sunken-world flooding
//!
//! Everything open below the rim of the sunken bowl fills with water down
//! to a little past the underground boundary. Water reaching the underworld
//! roof hardens into obsidian instead, and air bubbles keep the spawn point
//! dry.

use log::{debug, info};

use crate::config::BiomeLayout;
use crate::ids::{wall_variants, BlockId, PaintId, WallId};
use crate::point::Point;
use crate::random::fnv1a32pt;
use crate::tile::Liquid;
use crate::world::{Biome, World};

/// Flooding stops this far below the underground boundary.
const FLOOD_DEPTH: i32 = 30;
/// Radius of the air pocket around spawn, and of the dry interior kept
/// when the pocket is released.
const SPAWN_BUBBLE: i32 = 45;
const SPAWN_BUBBLE_INTERIOR: i32 = 42;
/// Water this close to the underworld roof turns to rock.
const HARDEN_MARGIN: i32 = 10;

/// Walls of constructed dungeons and temples that water must not enter.
fn is_sealed_wall(wall: WallId) -> bool {
    wall == WallId::LIHZAHRD_BRICK || wall_variants::contains(&wall_variants::DUNGEON, wall)
}

fn hardens(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::EMPTY
            | BlockId::ASH_TREE
            | BlockId::TREE
            | BlockId::MINECART_TRACK
            | BlockId::PLATFORM
            | BlockId::WOODEN_BEAM
    )
}

/// Rock mixed into the obsidian crust over the underworld.
fn crust_block(x: i32, y: i32, world: &World) -> BlockId {
    let mix = if world.conf.world.biomes == BiomeLayout::Columns {
        BlockId::ASH
    } else {
        match world.biome(x, y).active {
            Biome::Forest => BlockId::STONE,
            Biome::Desert => BlockId::SANDSTONE,
            Biome::Jungle => BlockId::MUD,
            _ => BlockId::ASH,
        }
    };
    if fnv1a32pt(x as u32, y as u32) % 7 < 2 {
        mix
    } else {
        BlockId::OBSIDIAN
    }
}

/// Fill the open region reachable from `(x, y)`, never rising above
/// `min_y`. Below the cavern boundary water only spreads sideways and down.
/// Returns the number of tiles changed.
pub fn flood_fill(x: i32, y: i32, min_y: i32, world: &mut World) -> usize {
    if world.tile(x, y).liquid != Liquid::None {
        return 0;
    }
    let underworld = world.underworld_level();
    let cavern = world.cavern_level();
    let mut changed = 0;
    let mut stack = vec![Point::new(x, y)];
    while let Some(Point { x, y }) = stack.pop() {
        if x < 0 || x >= world.width() || y < min_y || y > underworld {
            continue;
        }
        let tile = *world.tile(x, y);
        let open = (!tile.block.is_solid() || tile.actuated())
            && tile.block != BlockId::BUBBLE
            && tile.block != BlockId::DOOR
            && !is_sealed_wall(tile.wall)
            && (tile.liquid == Liquid::None || (tile.liquid != Liquid::Water && tile.actuated()));
        if open {
            if y + HARDEN_MARGIN > underworld && hardens(tile.block) {
                let block = crust_block(x, y, world);
                let cell = world.tile_mut(x, y);
                cell.block = block;
                cell.frame_x = 0;
                cell.frame_y = 0;
                cell.block_paint = PaintId::NONE;
            } else {
                world.tile_mut(x, y).liquid = Liquid::Water;
            }
            changed += 1;
            stack.push(Point::new(x - 1, y));
            stack.push(Point::new(x + 1, y));
            stack.push(Point::new(x, y + 1));
            if y < cavern {
                stack.push(Point::new(x, y - 1));
            }
        } else if tile.liquid == Liquid::Lava && matches!(tile.block, BlockId::EMPTY | BlockId::WOODEN_BEAM) {
            let cell = world.tile_mut(x, y);
            cell.block = BlockId::OBSIDIAN;
            cell.liquid = Liquid::None;
            changed += 1;
        }
    }
    changed
}

/// Fill the open cells of a disc with bubble blocks so the flood skips them.
fn inflate_bubble(center: Point, radius: i32, world: &mut World) {
    for i in -radius..radius {
        for j in -radius..radius {
            if f64::from(i).hypot(f64::from(j)) >= f64::from(radius) {
                continue;
            }
            let tile = world.tile_mut(center.x + i, center.y + j);
            if tile.is_empty() && !is_sealed_wall(tile.wall) {
                tile.block = BlockId::BUBBLE;
            }
        }
    }
}

/// Clear the bubble interior, leaving the outer shell of bubble blocks.
fn release_bubble(center: Point, radius: i32, world: &mut World) {
    for i in -radius..radius {
        for j in -radius..radius {
            if f64::from(i).hypot(f64::from(j)) >= f64::from(radius) {
                continue;
            }
            let tile = world.tile_mut(center.x + i, center.y + j);
            tile.liquid = Liquid::None;
            if tile.block == BlockId::BUBBLE {
                tile.block = BlockId::EMPTY;
            }
        }
    }
}

/// Water line of the flood: the lowest of three samples across the middle
/// of the world.
pub fn flood_level(world: &World) -> i32 {
    let shattered = world.conf.variation.shattered;
    let spread = if shattered { 120 } else { 130 };
    let mid = world.width() / 2;
    let level = world
        .surface(mid - spread)
        .max(world.surface(mid))
        .max(world.surface(mid + spread));
    if shattered {
        level + 3
    } else {
        level
    }
}

pub fn gen_flood(world: &mut World) {
    info!("Flooding");
    let level = flood_level(world);
    let spawn = world.ctx.spawn;
    let bubble_limit = if world.conf.variation.shattered {
        world.underworld_level()
    } else {
        world.underground_level() + FLOOD_DEPTH
    };
    let bubble_spawn = level < spawn.y - 2 && spawn.y < bubble_limit;
    if bubble_spawn {
        inflate_bubble(spawn, SPAWN_BUBBLE, world);
    }
    let floor = world.underground_level() + FLOOD_DEPTH;
    let mut changed = 0;
    for x in 0..world.width() {
        for y in level..floor {
            changed += flood_fill(x, y, level, world);
        }
    }
    if bubble_spawn {
        release_bubble(spawn, SPAWN_BUBBLE_INTERIOR, world);
    }
    debug!("Flood line at {}, {} tiles changed", level, changed);
}
