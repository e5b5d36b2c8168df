//! Snow brick igloo on the tundra surface.

use log::{debug, info};

use crate::config::BiomeLayout;
use crate::framing::Variant;
use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::{hash_point, Random};
use crate::tile::Liquid;
use crate::world::World;

use super::{guard_region, is_unguarded};

/// Columns within this distance of spawn stay clear.
const SPAWN_CLEARANCE: i32 = 100;
/// Largest step in the ground under the igloo's rim.
const MAX_RIM_STEP: i32 = 3;
/// Deepest gap filled under the floor.
const MAX_FOUNDATION: i32 = 15;

fn candidate_columns(world: &World) -> Vec<i32> {
    let spawn_x = world.ctx.spawn.x;
    let far_from_spawn = |x: &i32| (x - spawn_x).abs() > SPAWN_CLEARANCE;
    if world.conf.world.biomes == BiomeLayout::Patches {
        (350..world.width() - 350)
            .filter(far_from_spawn)
            .filter(|&x| world.biome(x, world.surface(x)).snow > 0.99)
            .collect()
    } else {
        let scan = (world.conf.variation.snow_size * 0.05 * f64::from(world.width())) as i32;
        let center = world.ctx.snow_center as i32;
        (center - scan..center + scan).filter(far_from_spawn).collect()
    }
}

/// Normalised distance of dome cell `(i, j)` from the floor centre.
fn dome_distance(i: i32, j: i32, radius: i32, rise: i32) -> f64 {
    (f64::from(i) / (f64::from(radius) + 0.5)).hypot(f64::from(j) / (f64::from(rise) + 0.5))
}

fn can_place_igloo(floor: Point, radius: i32, rise: i32, world: &World) -> bool {
    let claim = Rect::new(floor.x - radius - 1, floor.y - rise - 1, 2 * radius + 3, rise + 3);
    if !is_unguarded(claim, world) {
        return false;
    }
    let rims = [world.surface(floor.x - radius), world.surface(floor.x + radius)];
    if rims.iter().any(|rim| (rim - floor.y).abs() > MAX_RIM_STEP) {
        return false;
    }
    world.region_passes(floor.x - radius, floor.y - rise, 2 * radius + 1, rise, |tile| {
        tile.is_empty() || matches!(tile.block, BlockId::SNOW | BlockId::ICE | BlockId::DIRT | BlockId::STONE)
    })
}

/// Build a dome whose floor row is centred on `floor`, with its doorway on
/// the left or right. Returns false when the ground does not fit.
fn place_igloo(floor: Point, radius: i32, door_left: bool, world: &mut World) -> bool {
    let rise = (0.8 * f64::from(radius)) as i32 + 1;
    if !can_place_igloo(floor, radius, rise, world) {
        return false;
    }
    let shell = 1.0 - 1.6 / (f64::from(radius) + 0.5);
    for i in -radius..=radius {
        let x = floor.x + i;
        for j in 0..=rise {
            let dist = dome_distance(i, j, radius, rise);
            if dist > 1.0 {
                continue;
            }
            let tile = world.tile_mut(x, floor.y - j);
            tile.liquid = Liquid::None;
            if j == 0 || dist > shell {
                tile.block = if hash_point(x, floor.y - j) % 5 == 0 { BlockId::ICE_BRICK } else { BlockId::SNOW_BRICK };
            } else {
                tile.block = BlockId::EMPTY;
            }
            tile.wall = WallId::SNOW_BRICK;
        }
        let mut y = floor.y + 1;
        while y <= floor.y + MAX_FOUNDATION && world.tile(x, y).is_empty() {
            world.tile_mut(x, y).block = BlockId::SNOW;
            y += 1;
        }
    }
    let door = if door_left { -radius..-radius + 3 } else { radius - 2..radius + 1 };
    for i in door {
        for j in 1..=3 {
            if dome_distance(i, j, radius, rise) <= 1.0 {
                world.tile_mut(floor.x + i, floor.y - j).block = BlockId::EMPTY;
            }
        }
    }
    let lamp_x = if door_left { floor.x + radius / 2 } else { floor.x - radius / 2 };
    world.place_framed_tile(lamp_x, floor.y - 3, BlockId::LAMP, Variant::Frozen);
    world.place_framed_tile(floor.x - 1, floor.y - 2, BlockId::LARGE_PILE, Variant::Ice);
    guard_region(Rect::new(floor.x - radius, floor.y - rise, 2 * radius + 1, rise + 1), world);
    true
}

pub fn gen_igloo(rnd: &mut Random, world: &mut World) {
    info!("Piling snow");
    let mut columns = candidate_columns(world);
    rnd.seq.shuffle(&mut columns);
    let radius = rnd.get_int(7, 9);
    let spawn_x = world.ctx.spawn.x;
    for x in columns {
        let floor = Point::new(x, world.surface(x));
        if place_igloo(floor, radius, x > spawn_x, world) {
            debug!("Igloo at {:?}", floor);
            return;
        }
    }
    debug!("No site for an igloo");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    fn tundra(world_width: i32) -> World {
        let mut world = test_world(world_width, 600);
        for pt in Rect::new(0, 150, world_width, 450).points() {
            world.tile_at_mut(pt).block = BlockId::SNOW;
        }
        world.rescan_surface();
        world.ctx.spawn = Point::new(500, 150);
        world.ctx.snow_center = 700.0;
        world
    }

    #[test]
    fn test_dome_on_flat_snow() {
        let mut world = tundra(1000);
        assert!(place_igloo(Point::new(700, 150), 8, true, &mut world));
        // Floor, shell and hollow interior.
        assert!(matches!(world.tile(700, 150).block, BlockId::SNOW_BRICK | BlockId::ICE_BRICK));
        assert!(matches!(world.tile(700, 143).block, BlockId::SNOW_BRICK | BlockId::ICE_BRICK));
        assert!(world.tile(697, 146).is_empty());
        assert_eq!(world.tile(697, 146).wall, WallId::SNOW_BRICK);
        // Doorway on the left, solid wall on the right.
        assert!(world.tile(692, 148).is_empty());
        assert!(!world.tile(708, 149).is_empty());
        assert_eq!(world.tile(704, 147).block, BlockId::LAMP);
        assert!(world.tile(700, 146).guarded);
        // A second dome cannot claim the same ground.
        assert!(!place_igloo(Point::new(705, 150), 8, false, &mut world));
    }

    #[test]
    fn test_dome_needs_level_rim() {
        let mut world = tundra(1000);
        for y in 140..150 {
            world.tile_mut(708, y).block = BlockId::SNOW;
        }
        world.rescan_surface();
        assert!(!place_igloo(Point::new(700, 150), 8, true, &mut world));
    }

    #[test]
    fn test_igloo_keeps_away_from_spawn() {
        let mut world = tundra(1000);
        world.ctx.snow_center = 520.0;
        world.conf.variation.snow_size = 3.0;
        let columns = candidate_columns(&world);
        assert!(columns.iter().all(|x| (x - 500).abs() > 100));
        assert_eq!(columns.first(), Some(&370));
        assert_eq!(columns.len(), 30 + 69);
        let mut rnd = Random::new(3);
        gen_igloo(&mut rnd, &mut world);
        let lamps = Rect::new(0, 0, 1000, 600)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::LAMP)
            .count();
        assert_eq!(lamps, 3);
    }
}
