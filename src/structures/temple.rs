//! Lihzahrd temple
//!
//! The pixel grain builds a stepped brick block with a square room lattice;
//! the hex grain builds a round comb of hex rooms joined by slanted
//! hallways. Both layouts are connected by the same randomised depth-first
//! walk and share the entry, altar, treasure, trap and spike finishing.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info};

use crate::commands::{self, Command};
use crate::framing::Variant;
use crate::ids::{BlockId, PaintId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::structures::loot::LootKind;
use crate::tile::Flag;
use crate::world::World;
use crate::zone::{hex_centroid, hex_centroid_of, iterate_zone, Grain};

use super::{is_location_used, place_platform, place_wire, platform, scan_while_empty, scan_while_not_solid, wire_for};

const WALL_THICKNESS: i32 = 4;
const ROOM_SIZE: i32 = 7;
const ROOM_STEP: i32 = ROOM_SIZE + WALL_THICKNESS;
/// Rows below the temple top where the side entries open.
const DOOR_OFFSET: i32 = 29;
const CENTER_TRIES: i32 = 1000;
/// Draws allowed per requested chest, pot or statue.
const PLACEMENT_TRIES: i32 = 500;
const MAX_WALK_STEPS: usize = 200_000;
/// Platform spots count this many times when drawing treasure spots.
const PLATFORM_WEIGHT: usize = 15;

/// Blocks of other structures and biomes the temple must not overlap.
fn is_avoided(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::AETHERIUM
            | BlockId::ASH
            | BlockId::BLUE_BRICK
            | BlockId::CORRUPT_JUNGLE_GRASS
            | BlockId::CRIMSON_JUNGLE_GRASS
            | BlockId::GRANITE
            | BlockId::GREEN_BRICK
            | BlockId::HIVE
            | BlockId::MARBLE
            | BlockId::MUSHROOM_GRASS
            | BlockId::PINK_BRICK
    )
}

fn is_clearable(block: BlockId) -> bool {
    block.is_ore()
        || matches!(
            block,
            BlockId::DIRT
                | BlockId::MUD
                | BlockId::JUNGLE_GRASS
                | BlockId::STONE
                | BlockId::CLAY
                | BlockId::SILT
                | BlockId::CHLOROPHYTE_ORE
        )
}

/// Column spans `(dx, start_dy, end_dy)` of the stepped temple block. The
/// top edge climbs in steps towards the middle and falls again past it.
fn outline_columns(scan_x: i32) -> Vec<(i32, i32, i32)> {
    let scan_y = (0.45 * f64::from(scan_x)) as i32;
    let mut start = scan_y;
    let mut step = -1;
    let mut columns = Vec::with_capacity(2 * scan_x as usize);
    for i in -scan_x..scan_x {
        if step < 0 {
            if step < -3 {
                step = if i > -30 && i < -15 { -i * 2 - 1 } else { 15 };
            }
            start += if i < 0 { -4 } else { 4 };
        }
        step -= 1;
        let end = scan_y - ((i + scan_x) / 3) % 2;
        columns.push((i, start, end));
    }
    columns
}

fn outline_points(center: Point, columns: &[(i32, i32, i32)]) -> impl Iterator<Item = Point> + '_ {
    columns
        .iter()
        .flat_map(move |&(i, start, end)| (start..end).map(move |j| Point::new(center.x + i, center.y + j)))
}

/// Draw a temple centre near the jungle for which `is_valid` holds. Falls
/// back to the jungle centre halfway down the caverns.
pub fn select_temple_center<F>(is_valid: F, rnd: &mut Random, world: &World) -> Point
where
    F: Fn(Point, &World) -> bool,
{
    let width = f64::from(world.width());
    let reach = world.conf.variation.jungle_size * 0.079 * width;
    let min_x = ((world.ctx.jungle_center - reach) as i32).max(350);
    let max_x = ((world.ctx.jungle_center + reach) as i32).min(world.width() - 350);
    let min_y = (world.underground_level() + world.cavern_level()) / 2;
    for _ in 0..CENTER_TRIES {
        let pt = Point::new(rnd.get_int(min_x, max_x), rnd.get_int(min_y, world.underworld_level()));
        if is_valid(pt, world) {
            return pt;
        }
    }
    debug!("No clear temple site after {} tries, using the jungle centre", CENTER_TRIES);
    Point::new(world.ctx.jungle_center as i32, (min_y + world.underworld_level()) / 2)
}

/// Erode the jungle around the temple with a noisy disc, regrowing grass on
/// newly exposed mud.
pub fn clear_temple_surface(center: Point, scan_dist: i32, rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let radius = f64::from(scan_dist.max(1));
    for x in center.x - scan_dist..center.x + scan_dist {
        for y in center.y - scan_dist..center.y + scan_dist {
            let threshold = 3.0 * f64::from(x - center.x).hypot(f64::from(y - center.y)) / radius - 2.0;
            let block = world.tile(x, y).block;
            if rnd.fine(x, y) > threshold {
                if block == BlockId::LIHZAHRD_BRICK {
                    break;
                }
                if is_clearable(block) {
                    world.tile_mut(x, y).block = BlockId::EMPTY;
                    if world.tile(x - 1, y).block == BlockId::MUD {
                        world.tile_mut(x - 1, y).block = BlockId::JUNGLE_GRASS;
                    }
                }
            } else if block == BlockId::MUD && world.is_exposed(x, y) {
                world.tile_mut(x, y).block = BlockId::JUNGLE_GRASS;
            }
        }
    }
}

/// Two-wide brick or platform floor with four rows of open temple above.
pub fn can_place_treasure_at(x: i32, y: i32, world: &World) -> bool {
    let is_base = |block| matches!(block, BlockId::LIHZAHRD_BRICK | BlockId::PLATFORM);
    is_base(world.tile(x, y).block)
        && is_base(world.tile(x + 1, y).block)
        && world.region_passes(x, y - 4, 2, 4, |tile| {
            tile.is_empty() && tile.wall == WallId::LIHZAHRD_BRICK
        })
}

/// Every treasure spot among `candidates`, platform spots repeated.
fn flat_spots(candidates: impl Iterator<Item = Point>, world: &World) -> Vec<Point> {
    let mut spots = Vec::new();
    for pt in candidates {
        if can_place_treasure_at(pt.x, pt.y, world) {
            let copies = if world.tile_at(pt).block == BlockId::PLATFORM { PLATFORM_WEIGHT } else { 1 };
            spots.extend(std::iter::repeat(pt).take(copies));
        }
    }
    spots
}

/// Chests, pots and statues scaled by the room count.
pub fn add_temple_treasures(spots: &[Point], num_rooms: usize, rnd: &mut Random, world: &mut World) {
    if spots.is_empty() {
        debug!("Temple has no floor for treasure");
        return;
    }
    let mut num_chests = (world.conf.variation.chests * num_rooms as f64 / 17.5) as i32;
    let mut used = Vec::new();
    let mut tries = PLACEMENT_TRIES * num_chests.max(1);
    while num_chests > 0 && tries > 0 {
        tries -= 1;
        let pt = rnd.select(spots);
        if !can_place_treasure_at(pt.x, pt.y, world) || is_location_used(pt.x, pt.y, 12, &used, 1) {
            continue;
        }
        used.push(pt);
        let cmd = Command::PlaceChest {
            x: pt.x,
            y: pt.y - 2,
            variant: Variant::Lihzahrd,
            loot: LootKind::Lihzahrd,
        };
        commands::apply(&cmd, rnd, world);
        num_chests -= 1;
    }
    let mut num_pots = num_rooms as i32 / 14;
    let mut tries = PLACEMENT_TRIES * num_pots.max(1);
    while num_pots > 0 && tries > 0 {
        tries -= 1;
        let pt = rnd.select(spots);
        if can_place_treasure_at(pt.x, pt.y, world) {
            world.place_framed_tile(pt.x, pt.y - 2, BlockId::POT, Variant::Lihzahrd);
            num_pots -= 1;
        }
    }
    let mut num_statues = num_rooms as i32 / 12;
    let mut tries = PLACEMENT_TRIES * num_statues.max(1);
    while num_statues > 0 && tries > 0 {
        tries -= 1;
        let pt = rnd.select(spots);
        if can_place_treasure_at(pt.x - 1, pt.y, world) && can_place_treasure_at(pt.x + 1, pt.y, world) {
            world.place_framed_tile(pt.x, pt.y - 3, BlockId::STATUE, Variant::Lihzahrd);
            num_statues -= 1;
        }
    }
    if num_chests > 0 {
        debug!("Temple short of {} chests", num_chests);
    }
}

fn add_wall_trap(pos: Point, left: Variant, right: Variant, rnd: &mut Random, world: &mut World) {
    if !can_place_treasure_at(pos.x, pos.y, world) {
        return;
    }
    let plate = Point::new(pos.x, pos.y - 1);
    let mut traps = Vec::new();
    for j in 0..4 {
        for dir in [-1, 1] {
            let end = scan_while_not_solid(Point::new(plate.x, plate.y - j), (dir, 0), world);
            let dist = end.distance(plate);
            if dist > 1.5 && dist < 20.0 && world.tile(end.x + dir, end.y).block == BlockId::LIHZAHRD_BRICK {
                traps.push(Point::new(end.x + dir, end.y));
            }
        }
    }
    if traps.is_empty() {
        return;
    }
    rnd.seq.shuffle(&mut traps);
    let keep = rnd.get_int(1, traps.len().min(3) as i32) as usize;
    traps.truncate(keep);
    let wire = wire_for(plate);
    for trap in traps {
        place_wire(trap, plate, wire, world);
        let variant = if trap.x > plate.x { left } else { right };
        world.place_framed_tile(trap.x, trap.y, BlockId::TRAP, variant);
    }
    world.place_framed_tile(plate.x, plate.y, BlockId::PRESSURE_PLATE, Variant::Lihzahrd);
}

fn add_ceiling_trap(pos: Point, trap: Variant, world: &mut World) {
    if !can_place_treasure_at(pos.x, pos.y, world) {
        return;
    }
    let plate = Point::new(pos.x, pos.y - 1);
    let ceiling = scan_while_empty(plate, (0, -1), world).y - 1;
    if world.tile(plate.x, ceiling).block != BlockId::LIHZAHRD_BRICK
        || (trap == Variant::Spear && plate.y - ceiling > 18)
    {
        return;
    }
    let wire = wire_for(plate);
    for i in -3..4 {
        let x = plate.x + i;
        if world.tile(x, ceiling).block == BlockId::LIHZAHRD_BRICK && world.tile(x, ceiling + 1).is_empty() {
            place_wire(Point::new(x, ceiling), plate, wire, world);
            world.place_framed_tile(x, ceiling, BlockId::TRAP, trap);
        }
    }
    world.place_framed_tile(plate.x, plate.y, BlockId::PRESSURE_PLATE, Variant::Lihzahrd);
}

/// Noise-keyed traps on roughly 9 of every `freq` floor spots.
pub fn add_temple_traps(spots: &[Point], freq: i32, rnd: &mut Random, world: &mut World) {
    for &pt in spots {
        let roll = (99999.0 * (1.0 + rnd.fine(pt.x, pt.y))) as i32 % freq;
        match roll {
            0 => {
                if can_place_treasure_at(pt.x, pt.y, world) {
                    world.place_framed_tile(pt.x, pt.y - 2, BlockId::TNT_BARREL, Variant::None);
                }
            }
            1 | 2 => add_wall_trap(pt, Variant::FlameLeft, Variant::FlameRight, rnd, world),
            3 | 4 => add_wall_trap(pt, Variant::SuperDartLeft, Variant::SuperDartRight, rnd, world),
            5 | 6 => add_ceiling_trap(pt, Variant::Spear, world),
            7 | 8 => add_ceiling_trap(pt, Variant::SpikyBall, world),
            _ => {}
        }
    }
}

/// Occasionally line the nearest brick face in a random direction with
/// wooden spikes.
pub fn add_temple_spikes_at(pos: Point, rnd: &mut Random, world: &mut World) {
    if (99999.0 * (1.0 + rnd.fine(pos.x, pos.y))) as i32 % 150 != 0 {
        return;
    }
    let (dx, dy) = rnd.select(&[(1, 0), (-1, 0), (0, 1), (0, -1)]);
    let delta = Point::new(dx, dy);
    let incr = if dx == 0 { Point::new(1, 0) } else { Point::new(0, 1) };
    let mut cell = scan_while_not_solid(pos, (dx, dy), world);
    for _ in 0..4 {
        cell -= incr;
    }
    for _ in 0..9 {
        let behind = cell + delta;
        if world.tile_at(cell).is_empty() && world.tile_at(behind).block == BlockId::LIHZAHRD_BRICK {
            world.tile_at_mut(cell).block = BlockId::WOODEN_SPIKE;
            if (cell.x + cell.y) % 2 == 0 {
                world.tile_at_mut(behind).block = BlockId::WOODEN_SPIKE;
            } else {
                let front = world.tile_at_mut(cell - delta);
                if front.is_empty() {
                    front.block = BlockId::WOODEN_SPIKE;
                }
            }
        }
        cell += incr;
    }
}

/// Randomised depth-first walk from `start`. `neighbours` lists the rooms
/// adjacent to a room; `connect` is called once for every new edge. Dead
/// ends return to the most recent room that still had unvisited
/// neighbours.
fn spanning_walk<N, C>(start: Point, total: usize, neighbours: N, rnd: &mut Random, mut connect: C) -> usize
where
    N: Fn(Point) -> Vec<Point>,
    C: FnMut(Point, Point),
{
    let edge = |a: Point, b: Point| if a < b { (a, b) } else { (b, a) };
    let mut agent = start;
    let mut connected = HashSet::from([start]);
    let mut edges = HashSet::new();
    let mut junctions = Vec::new();
    let mut steps = 0;
    while connected.len() < total {
        steps += 1;
        if steps > MAX_WALK_STEPS {
            debug!("Temple walk stopped with {} of {} rooms joined", connected.len(), total);
            break;
        }
        let choices: Vec<Point> = neighbours(agent)
            .into_iter()
            .filter(|c| !connected.contains(c) || edges.contains(&edge(agent, *c)))
            .collect();
        let stuck = choices.is_empty() || (choices.len() == 1 && connected.contains(&choices[0]));
        if stuck {
            match junctions.pop() {
                Some(junction) => agent = junction,
                None => break,
            }
            continue;
        }
        if choices.iter().any(|c| !connected.contains(c)) {
            junctions.push(agent);
        }
        let next = rnd.select(&choices);
        if connected.insert(next) {
            edges.insert(edge(agent, next));
            connect(agent, next);
        }
        agent = next;
    }
    connected.len()
}

fn apply_room_connection(from: Point, to: Point, world: &mut World) {
    if from.x == to.x {
        let (min_y, max_y) = (from.y.min(to.y), from.y.max(to.y));
        for x in from.x..from.x + ROOM_SIZE {
            for y in min_y + ROOM_SIZE..max_y {
                world.tile_mut(x, y).block = BlockId::EMPTY;
            }
        }
    } else {
        let (min_x, max_x) = (from.x.min(to.x), from.x.max(to.x));
        for x in min_x + ROOM_SIZE..max_x {
            for y in from.y..from.y + ROOM_SIZE {
                world.tile_mut(x, y).block = BlockId::EMPTY;
            }
        }
    }
}

/// Tunnel in from both sides at the door row, stopping after the second
/// opening into the maze.
fn add_temple_entry(center_x: i32, min_y: i32, world: &mut World) {
    let door_y = min_y + DOOR_OFFSET;
    for dir in [-1, 1] {
        let mut x = center_x;
        while world.tile(x + dir, door_y).wall == WallId::LIHZAHRD_BRICK {
            x += dir;
        }
        world.place_framed_tile(x, door_y, BlockId::DOOR, Variant::Lihzahrd);
        world.place_framed_tile(x + 2 * dir, door_y, BlockId::LAMP, Variant::Lihzahrd);
        let pot_x = if dir < 0 { x + 2 } else { x - 3 };
        world.place_framed_tile(pot_x, door_y + 1, BlockId::POT, Variant::Lihzahrd);
        let mut cleared_gap = 0;
        x -= dir;
        while (x - center_x) * dir > 0 {
            for i in 0..3 {
                let tile = world.tile_mut(x, door_y + i);
                if tile.block == BlockId::LIHZAHRD_BRICK {
                    tile.block = BlockId::EMPTY;
                }
            }
            if world.tile(x, door_y - 1).is_empty() || world.tile(x, door_y + 3).is_empty() {
                cleared_gap += 1;
                if cleared_gap > 1 {
                    break;
                }
            }
            x -= dir;
        }
    }
}

/// Rooms walled on both upper sides get a platform floor to stand on.
fn add_dead_end_platforms(rooms: &BTreeSet<Point>, world: &mut World) {
    for &Point { x, y } in rooms {
        let walled = [(-1, 0), (0, -1), (ROOM_SIZE - 1, -1), (ROOM_SIZE, 0)]
            .iter()
            .all(|&(i, j)| world.tile(x + i, y + j).block == BlockId::LIHZAHRD_BRICK);
        if walled {
            for i in 0..ROOM_SIZE {
                place_platform(x + i, y + ROOM_SIZE - 1, platform::LIHZAHRD, world);
            }
        }
    }
}

fn paint_temple(area: Rect, paint: PaintId, world: &mut World) {
    for pt in area.points() {
        let tile = world.tile_at_mut(pt);
        if tile.wall != WallId::LIHZAHRD_BRICK {
            continue;
        }
        if matches!(
            tile.block,
            BlockId::LIHZAHRD_BRICK | BlockId::PLATFORM | BlockId::PRESSURE_PLATE | BlockId::TRAP
        ) {
            tile.block_paint = paint;
        }
        tile.wall_paint = paint;
    }
}

fn gen_lattice_temple(rnd: &mut Random, world: &mut World) {
    let scan_x = ((world.conf.variation.temple_size * 0.029 * f64::from(world.width())) as i32).max(128);
    let columns = outline_columns(scan_x);
    let center = select_temple_center(
        |center, world| {
            outline_points(center, &columns).all(|pt| {
                let tile = world.tile_at(pt);
                !tile.guarded && !is_avoided(tile.block)
            })
        },
        rnd,
        world,
    );
    if center.x < 100 {
        return;
    }
    for pt in outline_points(center, &columns) {
        let tile = world.tile_at_mut(pt);
        tile.block = BlockId::LIHZAHRD_BRICK;
        tile.block_paint = PaintId::NONE;
        tile.wall = WallId::LIHZAHRD_BRICK;
    }
    let scan_dist = ((world.conf.variation.temple_size * 0.019 * f64::from(world.width())) as i32).max(82);
    clear_temple_surface(center, scan_dist, rnd, world);

    let mod_x = center.x.rem_euclid(ROOM_STEP);
    let mod_y = center.y.rem_euclid(ROOM_STEP);
    let mut rooms = BTreeSet::new();
    let mut center_room_x = 0;
    let mut max_room_y = 0;
    let mut min_y = center.y;
    for pt in outline_points(center, &columns) {
        min_y = min_y.min(pt.y);
        let on_lattice = pt.x.rem_euclid(ROOM_STEP) == mod_x && pt.y.rem_euclid(ROOM_STEP) == mod_y;
        if on_lattice
            && world.region_passes(
                pt.x - WALL_THICKNESS,
                pt.y - WALL_THICKNESS,
                ROOM_STEP + WALL_THICKNESS,
                ROOM_STEP + WALL_THICKNESS,
                |tile| tile.wall == WallId::LIHZAHRD_BRICK,
            )
        {
            if (pt.x - center.x).abs() < (center_room_x - center.x).abs() {
                center_room_x = pt.x;
            }
            max_room_y = max_room_y.max(pt.y);
            rooms.insert(pt);
        }
    }
    // The altar hall replaces a 5x3 block of rooms at the bottom centre.
    for i in -2..3 {
        for j in -2..1 {
            rooms.remove(&Point::new(center_room_x + i * ROOM_STEP, max_room_y + j * ROOM_STEP));
        }
    }
    let hall_door = rnd.select(&[center_room_x - 2 * ROOM_STEP, center_room_x + 2 * ROOM_STEP]);
    rooms.insert(Point::new(hall_door, max_room_y));

    if let Some(&start) = rooms.iter().next() {
        let neighbours = |agent: Point| -> Vec<Point> {
            [(-ROOM_STEP, 0), (ROOM_STEP, 0), (0, -ROOM_STEP), (0, ROOM_STEP)]
                .iter()
                .map(|&(i, j)| Point::new(agent.x + i, agent.y + j))
                .filter(|c| rooms.contains(c))
                .collect()
        };
        spanning_walk(start, rooms.len(), neighbours, rnd, |a, b| apply_room_connection(a, b, world));
    }
    for &room in &rooms {
        for pt in Rect::new(room.x, room.y, ROOM_SIZE, ROOM_SIZE).points() {
            world.tile_at_mut(pt).block = BlockId::EMPTY;
        }
    }
    let hall = Rect::new(
        center_room_x - 2 * ROOM_STEP,
        max_room_y - 2 * ROOM_STEP,
        4 * ROOM_STEP + ROOM_SIZE,
        2 * ROOM_STEP + ROOM_SIZE,
    );
    for pt in hall.points() {
        world.tile_at_mut(pt).block = BlockId::EMPTY;
    }
    add_temple_entry(center.x, min_y, world);
    add_dead_end_platforms(&rooms, world);
    world.place_framed_tile(
        center_room_x + ROOM_SIZE / 2 - 1,
        max_room_y + ROOM_SIZE - 2,
        BlockId::LIHZAHRD_ALTAR,
        Variant::None,
    );

    let spots = flat_spots(outline_points(center, &columns), world);
    add_temple_treasures(&spots, rooms.len(), rnd, world);
    let mut trap_spots: Vec<Point> = spots
        .into_iter()
        .filter(|&pt| world.tile_at(pt).block != BlockId::PLATFORM)
        .collect();
    rnd.seq.shuffle(&mut trap_spots);
    add_temple_traps(&trap_spots, 75, rnd, world);
    let open: Vec<Point> = outline_points(center, &columns)
        .filter(|&pt| world.region_passes(pt.x - 1, pt.y - 1, 3, 3, |tile| tile.is_empty()))
        .collect();
    for pt in open {
        add_temple_spikes_at(pt, rnd, world);
    }

    let top = columns.iter().map(|c| c.1).min().unwrap_or(0);
    let bottom = columns.iter().map(|c| c.2).max().unwrap_or(0);
    let area = Rect::new(center.x - scan_x, center.y + top, 2 * scan_x, bottom - top);
    if world.conf.variation.double_trouble {
        paint_temple(area, PaintId::DEEP_LIME, world);
    }
    world.ctx.temple = Some(area);
}

/// Hex-room temple. Rooms are hex cells of the comb lattice; `spacing` is
/// the distance between neighbouring room centres.
struct CombTemple<'a> {
    rnd: &'a mut Random,
    world: &'a mut World,
    size: f64,
    scale: i32,
    spacing: f64,
}

impl CombTemple<'_> {
    fn neighbour_centroids(pt: Point, scale: i32) -> Vec<Point> {
        let s = f64::from(scale);
        let (dx, dy) = (1.5 * s, 0.5 * 3f64.sqrt() * s);
        [(0.0, -2.0 * dy), (0.0, 2.0 * dy), (-dx, -dy), (-dx, dy), (dx, -dy), (dx, dy)]
            .iter()
            .map(|&(i, j)| {
                hex_centroid((f64::from(pt.x) + i).round() as i32, (f64::from(pt.y) + j).round() as i32, scale)
            })
            .collect()
    }

    /// Brick the cell around `centroid` and hollow out every tile whose
    /// 5x5 neighbourhood lies inside it.
    fn make_room(world: &mut World, centroid: Point, scale: i32) {
        let bounds = Rect::new(0, 0, world.width(), world.height());
        let cells = iterate_zone(centroid, bounds, |pt| hex_centroid_of(pt, scale) == centroid).cells;
        let inside: HashSet<Point> = cells.iter().copied().collect();
        for &pt in &cells {
            let tile = world.tile_at_mut(pt);
            tile.block = BlockId::LIHZAHRD_BRICK;
            tile.block_paint = PaintId::NONE;
            tile.wall = WallId::LIHZAHRD_BRICK;
        }
        for &pt in &cells {
            let interior = (-2..3).all(|i| (-2..3).all(|j| inside.contains(&Point::new(pt.x + i, pt.y + j))));
            if interior {
                world.tile_at_mut(pt).block = BlockId::EMPTY;
            }
        }
    }

    /// Clear a slanted corridor about five tiles wide between two rooms.
    fn make_hallway(world: &mut World, a: Point, b: Point) {
        let (a, b) = if a.y > b.y { (b, a) } else { (a, b) };
        if a.y == b.y {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                for y in a.y - 2..=a.y + 2 {
                    world.tile_mut(x, y).block = BlockId::EMPTY;
                }
            }
            return;
        }
        let slope = f64::from(b.x - a.x) / f64::from(b.y - a.y);
        let scan = 2.5 * (1.0 + slope.abs());
        for y in a.y..=b.y {
            let center_x = slope * f64::from(y - a.y) + f64::from(a.x);
            let mut x = (center_x - scan).round() as i32;
            while f64::from(x) < center_x + scan {
                world.tile_mut(x, y).block = BlockId::EMPTY;
                x += 1;
            }
        }
    }

    fn square(&self, center: Point) -> Rect {
        let size = self.size as i32;
        Rect::new(center.x - size, center.y - size, 2 * size, 2 * size)
    }

    fn gen_maze(&mut self, center: Point) {
        let scale = self.scale;
        let core_ring = Self::neighbour_centroids(center, scale);
        for &pt in &core_ring {
            Self::make_room(self.world, pt, scale);
        }
        let core_size = 1.0 + 1.22 * self.spacing;
        let reach = core_size as i32;
        for i in -reach..reach {
            for j in -reach..reach {
                if f64::from(i).hypot(f64::from(j)) < core_size {
                    let tile = self.world.tile_mut(center.x + i, center.y + j);
                    tile.block = BlockId::EMPTY;
                    tile.block_paint = PaintId::NONE;
                    tile.wall = WallId::LIHZAHRD_BRICK;
                }
            }
        }
        let mut core: HashSet<Point> = core_ring.iter().copied().collect();
        core.insert(center);
        let threshold = self.size - self.spacing;
        let start = self.rnd.select(&core_ring);
        let neighbours = |agent: Point| -> Vec<Point> {
            Self::neighbour_centroids(agent, scale)
                .into_iter()
                .filter(|c| c.distance(center) < threshold && !core.contains(c))
                .collect()
        };
        let world = &mut *self.world;
        spanning_walk(start, usize::MAX, neighbours, self.rnd, |a, b| {
            Self::make_room(world, b, scale);
            Self::make_hallway(world, a, b);
        });

        let area = self.square(center);
        let border: Vec<Point> = area
            .points()
            .filter(|&pt| {
                self.world.tile_at(pt).wall != WallId::LIHZAHRD_BRICK
                    && !self.world.region_passes(pt.x - 2, pt.y - 2, 5, 5, |tile| {
                        tile.wall != WallId::LIHZAHRD_BRICK
                    })
            })
            .collect();
        for pt in border {
            let tile = self.world.tile_at_mut(pt);
            tile.block = BlockId::LIHZAHRD_BRICK;
            tile.block_paint = PaintId::NONE;
            tile.wall = WallId::LIHZAHRD_BRICK;
        }
    }

    /// Cut one entry through each side at the centre row.
    fn add_entries(&mut self, center: Point) {
        let half = (self.spacing / 2.0) as i32;
        let scan_dist = (1.1 * self.spacing) as i32;
        let area = self.square(center);
        for dir in [1, -1] {
            let mut x = if dir > 0 { area.x } else { area.x + area.width };
            while self.world.tile(x, center.y).block != BlockId::LIHZAHRD_BRICK && (x - center.x) * dir < 0 {
                x += dir;
            }
            let cell = hex_centroid(x + dir * half, center.y, self.scale);
            clear_temple_surface(
                Point::new(cell.x - dir * half, cell.y - half),
                scan_dist,
                self.rnd,
                self.world,
            );
            let y = cell.y;
            x = cell.x;
            loop {
                let mut in_temple = false;
                for j in -1..2 {
                    let tile = self.world.tile_mut(x, y + j);
                    if tile.wall == WallId::LIHZAHRD_BRICK {
                        tile.block = BlockId::EMPTY;
                        in_temple = true;
                    }
                }
                x -= dir;
                if !in_temple {
                    break;
                }
            }
            self.world.place_framed_tile(x + 2 * dir, y - 1, BlockId::DOOR, Variant::Lihzahrd);
            let pot_x = if dir > 0 { x + 4 } else { x - 5 };
            self.world.place_framed_tile(pot_x, y, BlockId::POT, Variant::Lihzahrd);
        }
    }

    /// Altar on the floor under the core, or under the room to its left
    /// when that floor is higher.
    fn place_altar(&mut self, center: Point) {
        let offset = self.spacing as i32;
        let left = scan_while_empty(Point::new(center.x - offset, center.y), (0, 1), self.world).y;
        let middle = scan_while_empty(center, (0, 1), self.world).y;
        let x = center.x - 1 - if left < middle { offset } else { 0 };
        self.world.place_framed_tile(x, left.min(middle) - 1, BlockId::LIHZAHRD_ALTAR, Variant::None);
    }

    fn gen(&mut self, center: Point) {
        let center = hex_centroid_of(center, self.scale);
        self.gen_maze(center);
        self.add_entries(center);
        self.place_altar(center);
        let area = self.square(center);
        let spots = flat_spots(area.points(), self.world);
        let num_rooms = (self.size * self.size / 127.7 + 20.0) as usize;
        add_temple_treasures(&spots, num_rooms, self.rnd, self.world);
        let mut trap_spots = spots;
        trap_spots.dedup();
        self.rnd.seq.shuffle(&mut trap_spots);
        add_temple_traps(&trap_spots, 45, self.rnd, self.world);
        let open: Vec<Point> = area
            .points()
            .filter(|&pt| {
                self.world.region_passes(pt.x - 1, pt.y - 1, 3, 3, |tile| {
                    tile.is_empty() && tile.wall == WallId::LIHZAHRD_BRICK
                })
            })
            .collect();
        for pt in open {
            add_temple_spikes_at(pt, self.rnd, self.world);
        }
        let paint = self.rnd.select(&[PaintId::YELLOW, PaintId::ORANGE, PaintId::DEEP_YELLOW, PaintId::DEEP_ORANGE]);
        paint_temple(area, paint, self.world);
        self.world.ctx.temple = Some(area);
    }
}

fn gen_comb_temple(scale: i32, rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let mid = 0.5 * (f64::from(world.width()) + 3.55 * f64::from(world.height()));
    let size = (world.conf.variation.temple_size * 0.022 * mid).max(95.0);
    let scan = (0.95 * size) as i32;
    let center = select_temple_center(
        |center, world| {
            world.region_passes(center.x - scan, center.y - scan, 2 * scan, 2 * scan, |tile| {
                !is_avoided(tile.block) || (tile.block == BlockId::HIVE && tile.flag == Flag::Hive)
            })
        },
        rnd,
        world,
    );
    if center.x < 100 {
        return;
    }
    let spacing = 3f64.sqrt() * f64::from(scale);
    CombTemple { rnd, world, size, scale, spacing }.gen(center);
}

pub fn gen_temple(rnd: &mut Random, world: &mut World, grain: Grain) {
    if world.conf.variation.temple_size < 0.01 {
        return;
    }
    info!("Training acolytes");
    match grain {
        Grain::Pixel => gen_lattice_temple(rnd, world),
        Grain::Hex(scale) => gen_comb_temple(scale, rnd, world),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    fn jungle_world(width: i32, height: i32) -> World {
        let mut world = test_world(width, height);
        for pt in Rect::new(0, 0, width, height).points() {
            if pt.y > 150 {
                world.tile_at_mut(pt).block = BlockId::MUD;
            }
        }
        world.ctx.jungle_center = f64::from(width) / 2.0;
        world
    }

    fn count_blocks(world: &World, block: BlockId) -> usize {
        Rect::new(0, 0, world.width(), world.height())
            .points()
            .filter(|&pt| world.tile_at(pt).block == block)
            .count()
    }

    #[test]
    fn test_outline_is_stepped() {
        let columns = outline_columns(128);
        assert_eq!(columns.len(), 256);
        assert_eq!(columns[0], (-128, 53, 57));
        assert_eq!(columns[128].1, -55);
        assert_eq!(columns[255], (127, 57, 56));
        let top = columns.iter().map(|c| c.1).min();
        assert_eq!(top, Some(-55));
    }

    #[test]
    fn test_room_connection_opens_gap() {
        let mut world = test_world(40, 40);
        for pt in Rect::new(0, 0, 40, 40).points() {
            world.tile_at_mut(pt).block = BlockId::LIHZAHRD_BRICK;
        }
        apply_room_connection(Point::new(21, 10), Point::new(10, 10), &mut world);
        assert!(world.tile(17, 10).is_empty());
        assert!(world.tile(20, 16).is_empty());
        assert_eq!(world.tile(16, 10).block, BlockId::LIHZAHRD_BRICK);
        assert_eq!(world.tile(18, 17).block, BlockId::LIHZAHRD_BRICK);
    }

    #[test]
    fn test_treasure_spot_needs_headroom() {
        let mut world = test_world(20, 20);
        for x in 0..20 {
            world.tile_mut(x, 10).block = BlockId::LIHZAHRD_BRICK;
            for y in 0..10 {
                world.tile_mut(x, y).wall = WallId::LIHZAHRD_BRICK;
            }
        }
        assert!(can_place_treasure_at(5, 10, &world));
        world.tile_mut(6, 7).block = BlockId::LIHZAHRD_BRICK;
        assert!(!can_place_treasure_at(5, 10, &world));
        assert!(!can_place_treasure_at(5, 9, &world));
    }

    #[test]
    fn test_walk_joins_every_room() {
        let rooms: BTreeSet<Point> = (0..5)
            .flat_map(|x| (0..4).map(move |y| Point::new(x * ROOM_STEP, y * ROOM_STEP)))
            .collect();
        let neighbours = |agent: Point| -> Vec<Point> {
            [(-ROOM_STEP, 0), (ROOM_STEP, 0), (0, -ROOM_STEP), (0, ROOM_STEP)]
                .iter()
                .map(|&(i, j)| Point::new(agent.x + i, agent.y + j))
                .filter(|c| rooms.contains(c))
                .collect()
        };
        let mut rnd = Random::new(8);
        let mut edges = Vec::new();
        let joined = spanning_walk(Point::new(0, 0), rooms.len(), neighbours, &mut rnd, |a, b| edges.push((a, b)));
        assert_eq!(joined, rooms.len());
        // A spanning tree.
        assert_eq!(edges.len(), rooms.len() - 1);
        assert!(edges.iter().all(|(a, b)| a.distance(*b) == f64::from(ROOM_STEP)));
    }

    #[test]
    fn test_walk_stops_when_rooms_unreachable() {
        let mut rnd = Random::new(2);
        let joined = spanning_walk(Point::new(0, 0), 10, |_| Vec::new(), &mut rnd, |_, _| {});
        assert_eq!(joined, 1);
    }

    #[test]
    fn test_center_falls_back_to_jungle() {
        let mut world = jungle_world(1200, 800);
        for pt in Rect::new(0, 0, 1200, 800).points() {
            world.tile_at_mut(pt).block = BlockId::MARBLE;
        }
        let mut rnd = Random::new(4);
        let center = select_temple_center(
            |c, w| outline_points(c, &outline_columns(128)).all(|pt| !is_avoided(w.tile_at(pt).block)),
            &mut rnd,
            &world,
        );
        assert_eq!(center, Point::new(600, (276 + world.underworld_level()) / 2));
    }

    #[test]
    fn test_gen_lattice_temple() {
        let mut world = jungle_world(1200, 800);
        let mut rnd = Random::new(11);
        rnd.init_noise(1200, 800, 0.07);
        gen_temple(&mut rnd, &mut world, Grain::Pixel);
        let area = world.ctx.temple.expect("temple placed");
        assert_eq!(area.width, 256);
        assert!(area.x + 128 >= 505 && area.x + 128 <= 695);
        // The stepped block holds 14772 tiles before rooms are carved out.
        let bricks = count_blocks(&world, BlockId::LIHZAHRD_BRICK);
        assert!(bricks > 4_000 && bricks < 14_772, "{} bricks", bricks);
        assert_eq!(count_blocks(&world, BlockId::LIHZAHRD_ALTAR), 6);
        assert!(!world.chests().is_empty());
        assert!(count_blocks(&world, BlockId::DOOR) >= 3);
    }

    #[test]
    fn test_gen_comb_temple() {
        let mut world = jungle_world(1200, 800);
        let mut rnd = Random::new(12);
        rnd.init_noise(1200, 800, 0.07);
        gen_temple(&mut rnd, &mut world, Grain::Hex(12));
        let area = world.ctx.temple.expect("temple placed");
        assert!(area.width >= 190);
        assert!(count_blocks(&world, BlockId::LIHZAHRD_BRICK) > 1000);
        assert_eq!(count_blocks(&world, BlockId::LIHZAHRD_ALTAR), 6);
        let painted = area.points().any(|pt| world.tile_at(pt).wall_paint != PaintId::NONE);
        assert!(painted);
    }

    #[test]
    fn test_temple_disabled_by_size() {
        let mut world = jungle_world(600, 600);
        world.conf.variation.temple_size = 0.0;
        let mut rnd = Random::new(1);
        gen_temple(&mut rnd, &mut world, Grain::Pixel);
        assert!(world.ctx.temple.is_none());
    }
}
