//! Dungeon
//!
//! Rooms sit on a square lattice below a surface entry tower and survive
//! where the coarse noise allows. Rooms on neighbouring lattice points
//! merge; every other group is joined to the closest room already reached
//! by a slanted hallway, and the first group to the entry. Doors, spikes,
//! dart traps and locked chests finish the interior.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::commands::{self, Command};
use crate::framing::Variant;
use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::structures::loot::LootKind;
use crate::tile::{Liquid, Slope, TileFlags};
use crate::world::{lerp, World};

use super::{place_wire, scan_while_empty};

const ROOM_SIZE: i32 = 16;
const HALL_SIZE: i32 = 9;
const WALL_THICKNESS: i32 = 5;
/// Side of a room including its walls.
const PADDED: i32 = ROOM_SIZE + 2 * WALL_THICKNESS;
/// Draws allowed per requested chest or trap.
const PLACEMENT_TRIES: i32 = 500;
/// Empty rows below a brick floor that still get an actuated support.
const SUPPORT_REACH: i32 = 35;

/// Brick and wall set of one dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DungeonTheme {
    pub brick: BlockId,
    pub cracked_brick: BlockId,
    pub brick_wall: WallId,
    pub slab_wall: WallId,
    pub tiled_wall: WallId,
}

impl DungeonTheme {
    pub fn for_brick(brick: BlockId) -> Self {
        match brick {
            BlockId::GREEN_BRICK => Self {
                brick,
                cracked_brick: BlockId::CRACKED_GREEN_BRICK,
                brick_wall: WallId::GREEN_BRICK,
                slab_wall: WallId::GREEN_SLAB,
                tiled_wall: WallId::GREEN_TILED,
            },
            BlockId::PINK_BRICK => Self {
                brick,
                cracked_brick: BlockId::CRACKED_PINK_BRICK,
                brick_wall: WallId::PINK_BRICK,
                slab_wall: WallId::PINK_SLAB,
                tiled_wall: WallId::PINK_TILED,
            },
            _ => Self {
                brick: BlockId::BLUE_BRICK,
                cracked_brick: BlockId::CRACKED_BLUE_BRICK,
                brick_wall: WallId::BLUE_BRICK,
                slab_wall: WallId::BLUE_SLAB,
                tiled_wall: WallId::BLUE_TILED,
            },
        }
    }

    pub fn is_dungeon_wall(&self, wall: WallId) -> bool {
        wall == self.brick_wall || wall == self.slab_wall || wall == self.tiled_wall
    }
}

/// Centre column of the widest gap between spawn, the world edges and the
/// planned biomes.
pub fn dungeon_center(world: &World) -> i32 {
    let ctx = &world.ctx;
    let mut avoid = vec![
        0,
        ctx.spawn.x,
        world.width(),
        ctx.surface_evil_center,
        ctx.desert_center as i32,
        ctx.jungle_center as i32,
        ctx.snow_center as i32,
    ];
    avoid.sort_unstable();
    let mut widest = 0;
    let mut center = world.width() / 4;
    for pair in avoid.windows(2) {
        let span = pair[1] - pair[0];
        if span > widest {
            widest = span;
            center = pair[0] + span / 2;
        }
    }
    center
}

/// Half width and height of the room lattice.
fn select_size(center: i32, rnd: &mut Random, world: &World) -> (i32, i32) {
    let size = world.conf.variation.dungeon_size;
    let initial_w = rnd.get_double(0.029, 0.034) * f64::from(world.width());
    let initial_h = rnd.get_double(0.35, 0.4) * f64::from(world.height());
    let target = size * initial_w * initial_h;
    let scale = if size < 1.0 { lerp(size.sqrt(), size, size) } else { size };
    let height = (scale * initial_h)
        .min(0.4 * f64::from(world.height()))
        .max(2.5 * f64::from(ROOM_SIZE)) as i32;
    let max_width = center.min(world.width() - center) - 100;
    (((target / f64::from(height)) as i32).min(max_width), height)
}

/// Entry point near `center`, shifted off living trees and floating
/// islands, on a low percentile of the nearby surface.
fn select_entry(center: i32, world: &World) -> Point {
    let scan = (0.1 * f64::from(world.width())) as i32;
    let offset = if center < world.width() / 2 { 23 } else { -23 };
    let mut x = center;
    for swap in 0..scan {
        let i = if swap % 2 == 0 { -(swap / 2) } else { swap / 2 };
        let surface = (world.surface(center + i - 8) + world.surface(center + i + 8)) / 2;
        let clear = world.region_passes(center + i + offset - 45, surface - 30, 90, 30, |tile| {
            !matches!(tile.block, BlockId::LIVING_WOOD | BlockId::LEAF | BlockId::AETHERIUM)
                && tile.wall != WallId::LIVING_WOOD
        });
        if clear {
            x = center + i;
            break;
        }
    }
    let mut surface: Vec<i32> = (-30..30).map(|i| world.surface(x + i + offset)).collect();
    surface.sort_unstable();
    Point::new(x, surface[(0.15 * surface.len() as f64) as usize])
}

/// Put the top row of rooms first, walking outwards from the centre so
/// the entry hallway reaches the room nearest the entry.
fn sort_initial_zones(center: i32, width: i32, zones: &mut [Point]) {
    let Some(first) = zones.first() else {
        return;
    };
    let threshold_y = first.y + ROOM_SIZE;
    let top = zones.iter().take_while(|pt| pt.y <= threshold_y).count();
    zones[..top].sort_unstable_by_key(|pt| (pt.x, pt.y));
    let threshold_x = center - width / 5;
    let left = zones.iter().take_while(|pt| pt.x < threshold_x && pt.y <= threshold_y).count();
    zones[..left].reverse();
}

/// Add every room reachable from `start` through lattice neighbours.
fn find_connected_zones(start: Point, all: &BTreeSet<Point>, connected: &mut BTreeSet<Point>) {
    let mut pending = vec![start];
    while let Some(pt) = pending.pop() {
        if !connected.insert(pt) {
            continue;
        }
        for (dx, dy) in [(-ROOM_SIZE, 0), (ROOM_SIZE, 0), (0, -ROOM_SIZE), (0, ROOM_SIZE)] {
            let next = Point::new(pt.x + dx, pt.y + dy);
            if all.contains(&next) && !connected.contains(&next) {
                pending.push(next);
            }
        }
    }
}

fn closest_point(pt: Point, points: &BTreeSet<Point>) -> Option<Point> {
    points
        .iter()
        .copied()
        .min_by(|a, b| a.distance(pt).total_cmp(&b.distance(pt)))
}

struct Dungeon {
    theme: DungeonTheme,
    doors: Vec<Point>,
}

impl Dungeon {
    fn new(theme: DungeonTheme) -> Self {
        Self { theme, doors: Vec::new() }
    }

    /// Brick walls around an open (or cracked brick) interior, sheared by
    /// `skew_x` per row and `skew_y` per column.
    fn draw_rect(&self, top_left: Point, bottom_right: Point, skew_x: f64, skew_y: f64, filled: bool, world: &mut World) {
        let theme = self.theme;
        let (width, height) = (bottom_right.x - top_left.x, bottom_right.y - top_left.y);
        for i in 0..width {
            for j in 0..height {
                let x = (f64::from(top_left.x + i) + skew_x * f64::from(j)) as i32;
                let y = (f64::from(top_left.y + j) + skew_y * f64::from(i)) as i32;
                let tile = world.tile_mut(x, y);
                let in_wall = i < WALL_THICKNESS
                    || j < WALL_THICKNESS
                    || width - i <= WALL_THICKNESS
                    || height - j <= WALL_THICKNESS;
                if in_wall {
                    if tile.wall != theme.brick_wall {
                        tile.block = theme.brick;
                    }
                } else if filled
                    && (tile.wall != theme.brick_wall
                        || tile.block == theme.brick
                        || tile.block == theme.cracked_brick)
                {
                    tile.block = theme.cracked_brick;
                } else {
                    tile.block = BlockId::EMPTY;
                }
                tile.wall = theme.brick_wall;
                if matches!(tile.liquid, Liquid::Water | Liquid::Lava) {
                    tile.liquid = Liquid::None;
                }
            }
        }
    }

    fn make_hallway(&mut self, from: Point, to: Point, filled: bool, world: &mut World) {
        let (dx, dy) = ((to.x - from.x).abs(), (to.y - from.y).abs());
        if dy == 0 && !filled {
            self.doors.push(Point::new(from.x.min(to.x) + 1 + ROOM_SIZE / 2, from.y - HALL_SIZE / 2));
            self.doors.push(Point::new(from.x.max(to.x) - 2 - ROOM_SIZE / 2, from.y - HALL_SIZE / 2));
        }
        if dy > dx {
            let (from, to) = if from.y > to.y { (to, from) } else { (from, to) };
            let skew = f64::from(to.x - from.x) / f64::from(2 * HALL_SIZE + dy);
            self.draw_rect(
                Point::new(from.x - HALL_SIZE, from.y - HALL_SIZE),
                Point::new(from.x + HALL_SIZE, to.y + HALL_SIZE),
                skew,
                0.0,
                filled,
                world,
            );
        } else {
            let (from, to) = if from.x > to.x { (to, from) } else { (from, to) };
            let skew = f64::from(to.y - from.y) / f64::from(2 * HALL_SIZE + dx);
            self.draw_rect(
                Point::new(from.x - HALL_SIZE, from.y - HALL_SIZE),
                Point::new(to.x + HALL_SIZE, from.y + HALL_SIZE),
                0.0,
                skew,
                filled,
                world,
            );
        }
    }

    /// Deep hallways are sometimes packed with cracked brick.
    fn connect(&mut self, from: Point, to: Point, rnd: &mut Random, world: &mut World) {
        let filled = from.y.min(to.y) > world.cavern_level() && rnd.get_int(0, 4) == 0;
        self.make_hallway(from, to, filled, world);
    }

    /// Shallow descents detour through an extra room a third of the way down.
    fn make_entry_hallway(&mut self, entry: Point, room: Point, world: &mut World) {
        if 2 * (entry.x - room.x).abs() < (entry.y - room.y).abs() {
            self.make_hallway(entry, room, false, world);
            return;
        }
        let mid = Point::new((2 * entry.x + room.x) / 3, (entry.y + 2 * room.y) / 3);
        let offset = Point::new(ROOM_SIZE / 2 + WALL_THICKNESS, ROOM_SIZE / 2 + WALL_THICKNESS);
        self.draw_rect(mid - offset, mid + offset, 0.0, 0.0, false, world);
        self.make_hallway(entry, mid, false, world);
        self.make_hallway(mid, room, false, world);
    }

    /// Tower over the entry hallway with a doorway facing the world centre.
    fn make_entry(&self, entry: Point, world: &mut World) {
        let half = HALL_SIZE + 2;
        self.draw_rect(
            Point::new(entry.x - half, entry.y - 2 * ROOM_SIZE),
            Point::new(entry.x + half, entry.y + HALL_SIZE + WALL_THICKNESS),
            0.0,
            0.0,
            false,
            world,
        );
        let facing_right = entry.x < world.width() / 2;
        let columns = if facing_right {
            entry.x + half - WALL_THICKNESS..entry.x + half
        } else {
            entry.x - half..entry.x - half + WALL_THICKNESS
        };
        for x in columns {
            for y in entry.y - 6..entry.y - 1 {
                world.tile_mut(x, y).block = BlockId::EMPTY;
            }
        }
    }

    /// Prop floating brick up with actuated pillars where the ground is
    /// close below.
    fn add_supports(&self, center: i32, width: i32, y_min: i32, world: &mut World) {
        let theme = self.theme;
        for x in (center - width..center + width + ROOM_SIZE).step_by(4) {
            let mut prev_was_dungeon = false;
            let mut checked_ground = false;
            for y in y_min..world.underworld_level() {
                let tile = *world.tile(x, y);
                if prev_was_dungeon && tile.is_empty() && tile.wall != theme.brick_wall {
                    if checked_ground || scan_while_empty(Point::new(x, y), (0, 1), world).y - y < SUPPORT_REACH {
                        let tile = world.tile_mut(x, y);
                        tile.block = theme.brick;
                        tile.flags.set(TileFlags::ACTUATED, true);
                        checked_ground = true;
                    } else {
                        prev_was_dungeon = false;
                    }
                } else if tile.block == theme.brick {
                    prev_was_dungeon = true;
                    checked_ground = false;
                } else {
                    prev_was_dungeon = false;
                }
            }
        }
    }

    fn add_doors(&self, world: &mut World) {
        let theme = self.theme;
        for &Point { x, y } in &self.doors {
            let mut floor = 0;
            for j in 0..=HALL_SIZE {
                let block = world.tile(x, y + j).block;
                if !block.is_empty() {
                    if block == theme.brick {
                        floor = j;
                    }
                    break;
                }
            }
            for j in 0..floor - 3 {
                for i in -1..=1 {
                    let tile = world.tile_mut(x + i, y + j);
                    tile.block = theme.brick;
                    if j == floor - 4 && i != 0 {
                        tile.slope = if i < 0 { Slope::BottomLeft } else { Slope::BottomRight };
                    }
                }
            }
            if floor >= 3 {
                world.place_framed_tile(x, y + floor - 3, BlockId::DOOR, Variant::Dungeon);
            }
        }
    }

    fn add_spikes(&self, zones: &[Point], rnd: &mut Random, world: &mut World) {
        let theme = self.theme;
        let attaches = |pt: Point, world: &World| {
            let block = world.tile_at(pt).block;
            block == theme.brick || block == theme.cracked_brick
        };
        for _ in 0..(0.7 * zones.len() as f64) as usize {
            let delta = rnd.select(&[(1, 0), (-1, 0), (0, 1), (0, -1)]);
            let wall = scan_while_empty(rnd.select(zones), delta, world);
            let incr = if delta.0 == 0 { Point::new(1, 0) } else { Point::new(0, 1) };
            let behind = Point::new(delta.0, delta.1);
            let patch = rnd.get_int((0.15 * f64::from(ROOM_SIZE)) as i32, (0.6 * f64::from(ROOM_SIZE)) as i32);
            let at = |k: i32| Point::new(wall.x + k * incr.x, wall.y + k * incr.y);
            let mut k = 0;
            while k > -patch && attaches(at(k) + behind, world) && world.tile_at(at(k)).is_empty() {
                k -= 1;
            }
            k += 1;
            while k < patch && attaches(at(k) + behind, world) && world.tile_at(at(k)).is_empty() {
                let pt = at(k);
                world.tile_at_mut(pt).block = BlockId::SPIKE;
                if (pt.x + pt.y) % 2 == 0 {
                    let front = world.tile_at_mut(pt - behind);
                    if front.is_empty() {
                        front.block = BlockId::SPIKE;
                    }
                }
                k += 1;
            }
        }
    }

    /// Empty, dry, dungeon-walled `width` x `height` box whose bottom row
    /// is `y`, optionally standing on plain brick.
    fn is_valid_placement(&self, x: i32, y: i32, width: i32, height: i32, needs_floor: bool, world: &World) -> bool {
        let theme = self.theme;
        if needs_floor && (0..width).any(|i| world.tile(x + i, y + 1).block != theme.brick) {
            return false;
        }
        world.region_passes(x, y + 1 - height, width, height, |tile| {
            tile.is_empty() && tile.wall == theme.brick_wall && tile.liquid == Liquid::None
        })
    }

    fn add_dart_traps(&self, locations: &[Point], rnd: &mut Random, world: &mut World) {
        let brick = self.theme.brick;
        let traps = world.conf.variation.traps;
        let rate = if traps > 1.0 { 1.0 + traps / 25.0 } else { traps };
        let mut remaining = (rate * locations.len() as f64 / rnd.get_double(124.68, 187.03)) as i32;
        let mut tries = PLACEMENT_TRIES * remaining;
        while remaining > 0 && tries > 0 {
            tries -= 1;
            let plate = rnd.select(locations);
            if !self.is_valid_placement(plate.x, plate.y, 1, 4, true, world) {
                continue;
            }
            let mut found = Vec::new();
            for j in 0..4 {
                for dir in [-1, 1] {
                    let trap = scan_while_empty(Point::new(plate.x, plate.y - j), (dir, 0), world);
                    let dist = trap.distance(plate);
                    if dist > 3.0
                        && dist < 40.0
                        && (world.tile(trap.x, trap.y + 1).block == brick || world.tile(trap.x + dir, trap.y).block == brick)
                    {
                        found.push(trap);
                    }
                }
            }
            if found.is_empty() {
                continue;
            }
            rnd.seq.shuffle(&mut found);
            let keep = rnd.get_int(1, found.len().min(3) as i32);
            found.truncate(keep as usize);
            for trap in found {
                place_wire(trap, plate, TileFlags::WIRE_RED, world);
                let variant = if trap.x > plate.x { Variant::DartLeft } else { Variant::DartRight };
                world.place_framed_tile(trap.x, trap.y, BlockId::TRAP, variant);
            }
            let tile = world.tile_at_mut(plate);
            tile.block = BlockId::PRESSURE_PLATE;
            tile.frame_x = 0;
            tile.frame_y = 36;
            remaining -= 1;
        }
    }

    fn add_chests(&self, locations: &[Point], rnd: &mut Random, world: &mut World) {
        let mut remaining = (world.conf.variation.chests * locations.len() as f64 / 256.65) as i32;
        let mut tries = PLACEMENT_TRIES * remaining;
        while remaining > 0 && tries > 0 {
            tries -= 1;
            let pt = rnd.select(locations);
            if !self.is_valid_placement(pt.x, pt.y, 2, 3, true, world) {
                continue;
            }
            let cmd = Command::PlaceChest {
                x: pt.x,
                y: pt.y - 1,
                variant: Variant::GoldLocked,
                loot: LootKind::Dungeon,
            };
            commands::apply(&cmd, rnd, world);
            remaining -= 1;
        }
    }

    /// Slab walls in the first third of `zones`, tiled walls in the second.
    fn apply_wall_variety(&self, zones: &[Point], world: &mut World) {
        let portion = zones.len() / 3;
        let span = ROOM_SIZE / 2 + WALL_THICKNESS;
        for (idx, zone) in zones.iter().take(2 * portion).enumerate() {
            let wall = if idx < portion { self.theme.slab_wall } else { self.theme.tiled_wall };
            for pt in Rect::new(zone.x - span, zone.y - span, 2 * span, 2 * span).points() {
                let tile = world.tile_at_mut(pt);
                if tile.wall == self.theme.brick_wall {
                    tile.wall = wall;
                }
            }
        }
    }

    /// Claim every dungeon-walled tile of the footprint for later passes.
    fn guard(&self, area: Rect, world: &mut World) {
        for pt in area.points() {
            let tile = world.tile_at_mut(pt);
            if self.theme.is_dungeon_wall(tile.wall) {
                tile.guarded = true;
            }
        }
    }

    /// Lay out and furnish the dungeon. Returns the room centres, empty
    /// when the noise kept no room.
    fn build(&mut self, center: i32, rnd: &mut Random, world: &mut World) -> Vec<Point> {
        let entry = select_entry(center, world);
        let (width, height) = select_size(center, rnd, world);
        let y_min = (world.underground_level() + 4 * world.cavern_level()) / 5;
        let shuffle = Point::new(rnd.get_int(0, world.width()), rnd.get_int(0, world.height()));

        let mut zones = Vec::new();
        for y in (y_min..y_min + height).step_by(ROOM_SIZE as usize) {
            for x in (center - width..center + width).step_by(ROOM_SIZE as usize) {
                let threshold = rnd.coarse(x + shuffle.x, y + shuffle.y).max(0.09);
                if rnd.coarse((1.5 * f64::from(x)) as i32, 3 * y) > threshold {
                    zones.push(Point::new(x + PADDED / 2, y + PADDED / 2));
                }
            }
        }
        if zones.is_empty() {
            return zones;
        }
        world.ctx.dungeon = Some(entry);
        let half = Point::new(PADDED / 2, PADDED / 2);
        for &zone in &zones {
            self.draw_rect(zone - half, zone + half, 0.0, 0.0, false, world);
        }

        let all: BTreeSet<Point> = zones.iter().copied().collect();
        let mut connected = BTreeSet::new();
        sort_initial_zones(center, width, &mut zones);
        for &zone in &zones {
            if connected.is_empty() {
                find_connected_zones(zone, &all, &mut connected);
                self.make_entry_hallway(Point::new(entry.x, entry.y + HALL_SIZE - 3), zone, world);
                continue;
            }
            if connected.contains(&zone) {
                continue;
            }
            let Some(closest) = closest_point(zone, &connected) else {
                continue;
            };
            find_connected_zones(zone, &all, &mut connected);
            self.connect(zone, closest, rnd, world);
        }
        self.make_entry(entry, world);

        self.add_supports(center, width, y_min, world);
        self.add_doors(world);
        let mut locations = Vec::new();
        for x in center - width..center + width + 2 * ROOM_SIZE {
            for y in world.underground_level()..world.underworld_level() {
                if self.is_valid_placement(x, y, 3, 3, true, world) {
                    locations.push(Point::new(x, y));
                }
            }
        }
        if !locations.is_empty() {
            self.add_dart_traps(&locations, rnd, world);
            self.add_chests(&locations, rnd, world);
        }
        self.add_spikes(&zones, rnd, world);

        let mut varied = zones.clone();
        varied.sort_by(|a, b| {
            rnd.coarse(a.x + shuffle.x, a.y + shuffle.y)
                .total_cmp(&rnd.coarse(b.x + shuffle.x, b.y + shuffle.y))
        });
        self.apply_wall_variety(&varied, world);

        let left = (center - width - PADDED).min(entry.x - HALL_SIZE - 2);
        let right = (center + width + 2 * ROOM_SIZE + PADDED).max(entry.x + HALL_SIZE + 2);
        let top = entry.y - 2 * ROOM_SIZE;
        let bottom = (y_min + height + PADDED).max(world.underworld_level());
        self.guard(Rect::new(left, top, right - left, bottom - top), world);
        zones
    }
}

pub fn gen_dungeon(rnd: &mut Random, world: &mut World) {
    if world.conf.variation.dungeon_size < 0.01 {
        return;
    }
    info!("Employing the undead");
    rnd.shuffle_noise();
    let brick = rnd.select(&[BlockId::BLUE_BRICK, BlockId::GREEN_BRICK, BlockId::PINK_BRICK]);
    let mut dungeon = Dungeon::new(DungeonTheme::for_brick(brick));
    let center = dungeon_center(world);
    let zones = dungeon.build(center, rnd, world);
    if zones.is_empty() {
        debug!("Dungeon at column {} kept no rooms", center);
    } else {
        debug!("Dungeon at column {} with {} rooms", center, zones.len());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::random::{hash_point, NoiseField};
    use crate::world::test_world;

    fn dungeon_world() -> World {
        let mut world = test_world(2000, 600);
        for pt in Rect::new(0, 150, 2000, 450).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
            world.tile_at_mut(pt).wall = WallId::DIRT;
        }
        for x in 0..2000 {
            world.set_surface(x, 150);
        }
        world.ctx.spawn = Point::new(1000, 150);
        world.ctx.surface_evil_center = 1300;
        world.ctx.desert_center = 1500.0;
        world.ctx.jungle_center = 1700.0;
        world.ctx.snow_center = 1850.0;
        world
    }

    fn scattered_noise() -> NoiseField {
        NoiseField::from_fn(2000, 600, |x, y| f64::from(hash_point(x, y) % 2001) / 1000.0 - 1.0)
    }

    #[test]
    fn test_dungeon_center_takes_widest_gap() {
        let world = dungeon_world();
        // Gaps: 0..1000 is the widest.
        assert_eq!(dungeon_center(&world), 500);
    }

    #[test]
    fn test_theme_follows_brick() {
        let pink = DungeonTheme::for_brick(BlockId::PINK_BRICK);
        assert_eq!(pink.cracked_brick, BlockId::CRACKED_PINK_BRICK);
        assert!(pink.is_dungeon_wall(WallId::PINK_TILED));
        assert!(!pink.is_dungeon_wall(WallId::BLUE_BRICK));
        assert_eq!(DungeonTheme::for_brick(BlockId::STONE).brick, BlockId::BLUE_BRICK);
    }

    #[test]
    fn test_flat_hallway_requests_doors() {
        let mut world = dungeon_world();
        let mut dungeon = Dungeon::new(DungeonTheme::for_brick(BlockId::GREEN_BRICK));
        dungeon.make_hallway(Point::new(400, 200), Point::new(464, 200), false, &mut world);
        assert_eq!(dungeon.doors, vec![Point::new(409, 196), Point::new(454, 196)]);
        assert!(world.tile(430, 200).is_empty());
        assert_eq!(world.tile(430, 200).wall, WallId::GREEN_BRICK);
        assert_eq!(world.tile(430, 205).block, BlockId::GREEN_BRICK);
        dungeon.make_hallway(Point::new(400, 300), Point::new(420, 360), false, &mut world);
        assert_eq!(dungeon.doors.len(), 2);
    }

    #[test]
    fn test_rooms_reach_entry() {
        let mut world = dungeon_world();
        let mut rnd = Random::new(4);
        rnd.noise = scattered_noise();
        let theme = DungeonTheme::for_brick(BlockId::BLUE_BRICK);
        let mut dungeon = Dungeon::new(theme);
        let zones = dungeon.build(500, &mut rnd, &mut world);
        assert!(zones.len() > 3);
        let entry = world.ctx.dungeon.unwrap();
        assert!((entry.x - 500).abs() < 200);

        let passable = |pt: Point, world: &World| {
            let tile = world.tile_at(pt);
            theme.is_dungeon_wall(tile.wall) && tile.block != theme.brick
        };
        let mut seen = BTreeSet::from([entry]);
        let mut queue = VecDeque::from([entry]);
        while let Some(pt) = queue.pop_front() {
            for next in pt.neighbors() {
                if passable(next, &world) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        for zone in &zones {
            assert!(seen.contains(zone), "room at {:?} cut off from the entry", zone);
            assert!(world.tile_at(*zone).guarded);
        }
    }

    #[test]
    fn test_tiny_dungeon_is_skipped() {
        let mut world = dungeon_world();
        world.conf.variation.dungeon_size = 0.0;
        let mut rnd = Random::new(4);
        gen_dungeon(&mut rnd, &mut world);
        assert_eq!(world.ctx.dungeon, None);
        assert_eq!(world.tile(500, 250).block, BlockId::STONE);
    }
}
