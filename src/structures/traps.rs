//! Pressure plate traps
//!
//! Boulders are hidden in cave ceilings above a single-use plate, dart
//! shooters are set into cave walls facing a plate, and dead man's chests
//! get their own mix of boulders, darts and explosives. Every trap count
//! scales with the `traps` frequency.

use log::{debug, info};

use crate::framing::Variant;
use crate::ids::{BlockId, PaintId, WallId};
use crate::point::Point;
use crate::random::Random;
use crate::tile::{Liquid, Tile, TileFlags};
use crate::world::World;

use super::{is_location_used, place_wire, scan_while_empty, scan_while_not_solid};

const BOULDER_SITE_TRIES: i32 = 50;
/// Draws per requested dart trap before giving up.
const DART_TRIES: i32 = 200;

/// Natural ground a trap may be hidden in.
fn is_trappable_block(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::EMPTY
            | BlockId::DIRT
            | BlockId::STONE
            | BlockId::GRASS
            | BlockId::CORRUPT_GRASS
            | BlockId::EBONSTONE
            | BlockId::CLAY
            | BlockId::MUD
            | BlockId::JUNGLE_GRASS
            | BlockId::MUSHROOM_GRASS
            | BlockId::HALLOWED_GRASS
            | BlockId::PEARLSTONE
            | BlockId::SNOW
            | BlockId::ICE
            | BlockId::CORRUPT_ICE
            | BlockId::HALLOWED_ICE
            | BlockId::CRIMSON_GRASS
            | BlockId::CRIMSON_ICE
            | BlockId::CRIMSTONE
            | BlockId::SMOOTH_MARBLE
            | BlockId::MARBLE
            | BlockId::GRANITE
            | BlockId::SMOOTH_GRANITE
            | BlockId::LAVA_MOSS_STONE
            | BlockId::SANDSTONE
            | BlockId::HARDENED_SAND
            | BlockId::HARDENED_EBONSAND
            | BlockId::HARDENED_CRIMSAND
            | BlockId::EBONSANDSTONE
            | BlockId::CRIMSANDSTONE
            | BlockId::HARDENED_PEARLSAND
            | BlockId::PEARLSANDSTONE
            | BlockId::KRYPTON_MOSS_STONE
            | BlockId::XENON_MOSS_STONE
            | BlockId::ARGON_MOSS_STONE
            | BlockId::NEON_MOSS_STONE
            | BlockId::CORRUPT_JUNGLE_GRASS
            | BlockId::CRIMSON_JUNGLE_GRASS
    )
}

pub fn is_trappable(tile: &Tile) -> bool {
    !tile.guarded && is_trappable_block(tile.block)
}

fn is_solid_trappable(tile: &Tile) -> bool {
    !tile.is_empty() && is_trappable(tile)
}

fn is_dry_air(tile: &Tile) -> bool {
    tile.is_empty() && tile.liquid == Liquid::None
}

/// Plate at `(x, y)`, painted to blend into the ground below it.
fn place_pressure_plate(x: i32, y: i32, single_use: bool, world: &mut World) {
    let below = world.tile(x, y + 1).block;
    let tile = world.tile_mut(x, y);
    tile.block = BlockId::PRESSURE_PLATE;
    tile.frame_x = 0;
    tile.frame_y = if single_use { 126 } else { 36 };
    tile.flags.set(TileFlags::WIRE_RED, true);
    let paint = match below {
        BlockId::DIRT | BlockId::MUD if single_use => PaintId::BROWN,
        BlockId::DIRT | BlockId::MUD => {
            tile.frame_y = 54;
            PaintId::NONE
        }
        BlockId::STONE | BlockId::EBONSTONE | BlockId::CRIMSTONE | BlockId::GRANITE | BlockId::SILT
        | BlockId::PEARLSTONE | BlockId::PEARLSAND | BlockId::HARDENED_PEARLSAND | BlockId::PEARLSANDSTONE
            if single_use =>
        {
            PaintId::GRAY
        }
        BlockId::JUNGLE_GRASS => PaintId::LIME,
        BlockId::SNOW | BlockId::MARBLE => PaintId::WHITE,
        BlockId::ICE | BlockId::CORRUPT_ICE | BlockId::CRIMSON_ICE => PaintId::SKY_BLUE,
        _ => PaintId::NONE,
    };
    tile.block_paint = paint;
}

/// A 6x6 block of solid ceiling material with ground under its middle.
fn is_valid_boulder_site(x: i32, y: i32, allow_mud: bool, world: &World) -> bool {
    world.region_passes(x, y, 6, 6, |tile| {
        !tile.guarded
            && (matches!(
                tile.block,
                BlockId::CRIMSTONE | BlockId::EBONSTONE | BlockId::GRANITE | BlockId::PEARLSTONE | BlockId::SANDSTONE | BlockId::STONE
            ) || (allow_mud && matches!(tile.block, BlockId::MUD | BlockId::MUSHROOM_GRASS)))
    }) && world.region_passes(x + 2, y + 6, 2, 1, |tile| !tile.is_empty())
}

/// Lowest valid boulder spot below a random draw, as the boulder's
/// top-left corner.
fn select_boulder_site(rnd: &mut Random, world: &World) -> Option<Point> {
    let allow_mud = rnd.get_double(0.0, 1.0) < 0.0053 * world.conf.variation.traps - 0.0265;
    let min_y = (0.85 * f64::from(world.underground_level())) as i32;
    for _ in 0..BOULDER_SITE_TRIES {
        let x = rnd.get_int(100, world.width() - 100);
        let mut y = rnd.get_int(min_y, world.underworld_level() - 100);
        if is_valid_boulder_site(x, y, allow_mud, world) {
            while is_valid_boulder_site(x, y + 1, allow_mud, world) {
                y += 1;
            }
            return Some(Point::new(x + 2, y + 2));
        }
    }
    None
}

fn place_boulder_traps(rnd: &mut Random, world: &mut World) {
    let area = f64::from(world.width()) * f64::from(world.height());
    let mut remaining = (world.conf.variation.traps * area / f64::from(rnd.get_int(57_600, 64_000))) as i32;
    let mut used = Vec::new();
    let mut tries = 5 * remaining;
    while remaining > 0 && tries > 0 {
        tries -= 1;
        let Some(Point { x, y }) = select_boulder_site(rnd, world) else {
            continue;
        };
        let mut floor = y + 4;
        while floor < world.height() && !world.region_passes(x, floor, 2, 3, |tile| tile.is_empty()) {
            floor += 1;
        }
        let plate_x = rnd.select(&[x, x + 1]);
        let floor = scan_while_empty(Point::new(plate_x, floor), (0, 1), world).y;
        if floor > world.underworld_level()
            || floor - y > 25
            || !world.region_passes(x, y, 2, floor - y + 2, |tile| is_trappable(tile) && tile.liquid == Liquid::None)
            || is_location_used(x, y, 20, &used, 1)
        {
            continue;
        }
        used.push(Point::new(x, y));
        let spot = *world.tile(x, y);
        let boulder = if spot.block == BlockId::SANDSTONE {
            BlockId::ROLLING_CACTUS
        } else if spot.wall == WallId::MUSHROOM {
            BlockId::BOUNCY_BOULDER
        } else {
            BlockId::BOULDER
        };
        world.place_framed_tile(x, y, boulder, Variant::None);
        for i in -2..4 {
            for j in -2..4 {
                world.tile_mut(x + i, y + j).guarded = true;
            }
        }
        for i in 0..2 {
            for j in 2..floor - y {
                let tile = world.tile_mut(x + i, y + j);
                if !tile.is_empty() {
                    tile.flags.set(TileFlags::ACTUATOR, true);
                    tile.flags.set(TileFlags::WIRE_RED, true);
                } else if x + i == plate_x {
                    tile.flags.set(TileFlags::WIRE_RED, true);
                }
            }
        }
        place_pressure_plate(plate_x, floor, true, world);
        remaining -= 1;
    }
    if remaining > 0 {
        debug!("{} boulder traps left unplaced", remaining);
    }
}

fn is_dart_anchor(pt: Point, world: &World) -> bool {
    is_trappable(world.tile_at(pt)) && world.tile(pt.x, pt.y + 1).block.is_solid()
}

/// Dart shooters in the nearest walls left and right of `(x, y)`, all wired
/// back to it. Returns false when no wall is in range.
pub fn target_with_dart_traps(x: i32, y: i32, max_traps: usize, rnd: &mut Random, world: &mut World) -> bool {
    let mut traps = Vec::new();
    for dir in [-1, 1] {
        for j in -4..2 {
            let mut pos = scan_while_not_solid(Point::new(x, y + j), (dir, 0), world);
            let dist = (pos.x - x).abs();
            if !(5..=30).contains(&dist) {
                continue;
            }
            if !is_dart_anchor(pos, world) {
                pos.x += dir;
                if !is_dart_anchor(pos, world) {
                    continue;
                }
            }
            traps.push(pos);
        }
    }
    if traps.is_empty() {
        return false;
    }
    rnd.seq.shuffle(&mut traps);
    let keep = rnd.get_int(1, traps.len().min(max_traps) as i32) as usize;
    traps.truncate(keep);
    for trap in traps {
        place_wire(trap, Point::new(x, y), TileFlags::WIRE_RED, world);
        let variant = if trap.x > x { Variant::DartLeft } else { Variant::DartRight };
        world.place_framed_tile(trap.x, trap.y, BlockId::TRAP, variant);
    }
    true
}

fn place_dart_traps(rnd: &mut Random, world: &mut World) {
    let area = f64::from(world.width()) * f64::from(world.height());
    let mut remaining = (world.conf.variation.traps * area / f64::from(rnd.get_int(209_000, 256_000))) as i32;
    let scan = (0.12 * f64::from(world.width())) as i32;
    let mut tries = DART_TRIES * remaining;
    while remaining > 0 && tries > 0 {
        tries -= 1;
        let bias = rnd.select(&[world.ctx.jungle_center, world.ctx.snow_center]) as i32;
        let x = rnd.get_int(bias - scan, bias + scan);
        let surface = world.surface(x);
        let min_y = if world.conf.variation.traps > 14.0 {
            surface - 2
        } else {
            (surface + world.underground_level()) / 2
        };
        let y = rnd.get_int(min_y, world.underworld_level().max(min_y));
        let y = scan_while_empty(Point::new(x, y), (0, 1), world).y;
        if y > world.underworld_level()
            || !world.region_passes(x - 1, y - 2, 3, 4, is_trappable)
            || !world.region_passes(x - 1, y - 2, 3, 3, is_dry_air)
            || !target_with_dart_traps(x, y, 1 + (x + y).rem_euclid(2) as usize, rnd, world)
        {
            continue;
        }
        place_pressure_plate(x, y, false, world);
        remaining -= 1;
    }
    if remaining > 0 {
        debug!("{} dart traps left unplaced", remaining);
    }
}

/// Boulders in the ceiling above a chest at `(x, y)`, up to five of them.
fn add_chest_boulder_traps(x: i32, y: i32, rnd: &mut Random, world: &mut World) -> bool {
    let mut traps = Vec::new();
    let mut i = rnd.get_int(-10, -7);
    while i < 10 {
        let ceiling = scan_while_not_solid(Point::new(x + i, y), (0, -1), world);
        let dist = y - ceiling.y;
        i += 4;
        if !(5..=30).contains(&dist) {
            continue;
        }
        let pos = Point::new(ceiling.x, ceiling.y - 5);
        if world.region_passes(pos.x - 2, pos.y - 2, 6, 6, is_solid_trappable) {
            traps.push(pos);
        }
    }
    if traps.is_empty() {
        return false;
    }
    let plate = Point::new(x, y);
    for trap in traps {
        let wire_from = Point::new(trap.x, trap.y + 2);
        place_wire(wire_from, plate, TileFlags::WIRE_RED, world);
        for i in 0..2 {
            for wire_y in trap.y + 2..y {
                if world.tile(trap.x + i, wire_y).block.is_solid() {
                    world.tile_mut(trap.x + i, wire_y).flags.set(TileFlags::ACTUATOR, true);
                    place_wire(wire_from, Point::new(trap.x + i, wire_y), TileFlags::WIRE_RED, world);
                }
            }
        }
        world.place_framed_tile(trap.x, trap.y, BlockId::BOULDER, Variant::None);
    }
    true
}

/// Up to three explosive blocks buried near the chest.
fn add_chest_explosive_traps(x: i32, y: i32, rnd: &mut Random, world: &mut World) -> bool {
    let mut budget = rnd.get_double(0.0, 3.0);
    let mut placed = false;
    while budget > 0.0 {
        let i = rnd.get_int(-9, 9);
        let j = rnd.get_int(-7, 4);
        if !world.region_passes(x + i - 1, y + j - 1, 3, 3, is_solid_trappable) {
            budget -= 0.1;
            continue;
        }
        world.tile_mut(x + i, y + j).block = BlockId::EXPLOSIVES;
        place_wire(Point::new(x + i, y + j), Point::new(x, y), TileFlags::WIRE_RED, world);
        placed = true;
        budget -= 1.0;
    }
    placed
}

/// Rig the chest whose top-left cell is `(x, y)` with two of the three
/// trap kinds, picked at random among those that fit.
pub fn add_chest_traps(x: i32, y: i32, rnd: &mut Random, world: &mut World) {
    let mut kinds = [0, 1, 2];
    rnd.seq.shuffle(&mut kinds);
    let mut armed = 0;
    for kind in kinds {
        let fitted = match kind {
            0 => add_chest_boulder_traps(x, y, rnd, world),
            1 => target_with_dart_traps(x, y, 4, rnd, world),
            _ => add_chest_explosive_traps(x, y, rnd, world),
        };
        if fitted {
            armed += 1;
            if armed == 2 {
                break;
            }
        }
    }
}

pub fn gen_traps(rnd: &mut Random, world: &mut World) {
    info!("Arming traps");
    rnd.shuffle_noise();
    place_boulder_traps(rnd, world);
    place_dart_traps(rnd, world);
    let queued = std::mem::take(&mut world.queued_traps);
    crate::commands::flush(queued, rnd, world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::world::test_world;

    /// Stone with a 20-wide, 10-tall pocket whose floor is row 410.
    fn pocket_world() -> World {
        let mut world = test_world(600, 800);
        for pt in Rect::new(0, 250, 600, 550).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
        }
        for pt in Rect::new(290, 400, 20, 10).points() {
            world.tile_at_mut(pt).clear_block();
        }
        world
    }

    #[test]
    fn test_guarded_ground_is_not_trappable() {
        let mut tile = Tile::AIR;
        tile.block = BlockId::STONE;
        assert!(is_trappable(&tile));
        tile.guarded = true;
        assert!(!is_trappable(&tile));
        tile.guarded = false;
        tile.block = BlockId::LIHZAHRD_BRICK;
        assert!(!is_trappable(&tile));
    }

    #[test]
    fn test_plate_blends_into_ground() {
        let mut world = pocket_world();
        world.tile_mut(300, 410).block = BlockId::DIRT;
        place_pressure_plate(300, 409, true, &mut world);
        assert_eq!(world.tile(300, 409).block, BlockId::PRESSURE_PLATE);
        assert_eq!(world.tile(300, 409).frame_y, 126);
        assert_eq!(world.tile(300, 409).block_paint, PaintId::BROWN);
        place_pressure_plate(301, 409, false, &mut world);
        assert_eq!(world.tile(301, 409).frame_y, 36);
        assert_eq!(world.tile(301, 409).block_paint, PaintId::NONE);
    }

    #[test]
    fn test_darts_face_the_plate() {
        let mut world = pocket_world();
        let mut rnd = Random::new(3);
        assert!(target_with_dart_traps(300, 409, 4, &mut rnd, &mut world));
        let traps: Vec<Point> = Rect::new(280, 395, 40, 20)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::TRAP)
            .collect();
        assert!(!traps.is_empty() && traps.len() <= 4);
        for trap in traps {
            // In the wall, or on the floor right against it.
            assert!(matches!(trap.x, 289 | 290 | 309 | 310), "trap at {:?}", trap);
            let expected = if trap.x > 300 { 0 } else { 18 };
            assert_eq!(world.tile_at(trap).frame_x, expected);
            assert!(world.tile_at(trap).flags.contains(TileFlags::WIRE_RED));
        }
    }

    #[test]
    fn test_no_darts_without_walls_in_range() {
        let mut world = test_world(200, 200);
        let mut rnd = Random::new(3);
        assert!(!target_with_dart_traps(100, 100, 4, &mut rnd, &mut world));
    }

    #[test]
    fn test_chest_traps_arm_two_kinds() {
        let mut world = pocket_world();
        let mut rnd = Random::new(5);
        rnd.init_noise(600, 800, 0.07);
        add_chest_traps(300, 407, &mut rnd, &mut world);
        let count = |block: BlockId| {
            Rect::new(270, 360, 60, 70)
                .points()
                .filter(|&pt| world.tile_at(pt).block == block)
                .count()
        };
        let kinds = [count(BlockId::BOULDER) > 0, count(BlockId::TRAP) > 0, count(BlockId::EXPLOSIVES) > 0];
        assert_eq!(kinds.iter().filter(|&&armed| armed).count(), 2);
    }

    #[test]
    fn test_trap_frequency_scales_boulders() {
        let boulders = |traps: f64| {
            let mut world = pocket_world();
            world.conf.variation.traps = traps;
            for x in (120..480).step_by(40) {
                for pt in Rect::new(x, 500, 6, 12).points() {
                    world.tile_at_mut(pt).clear_block();
                }
            }
            let mut rnd = Random::new(7);
            rnd.init_noise(600, 800, 0.07);
            place_boulder_traps(&mut rnd, &mut world);
            Rect::new(0, 0, 600, 800)
                .points()
                .filter(|&pt| matches!(world.tile_at(pt).block, BlockId::BOULDER | BlockId::ROLLING_CACTUS))
                .count()
        };
        assert_eq!(boulders(0.0), 0);
        assert!(boulders(40.0) > 0);
    }
}
