//! Mushroom block cabins inside the glowing mushroom fields.

use log::{debug, info};

use crate::commands::{self, Command};
use crate::framing::Variant;
use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::structures::loot::LootKind;
use crate::world::World;

use super::{guard_region, is_unguarded};

const TRIES: i32 = 1000;
/// Open headroom required above the floor.
const HEADROOM: i32 = 18;
/// Rows from the roof down to the floor.
const CABIN_HEIGHT: i32 = 8;
const PADDING: i32 = 5;
const MAX_FOUNDATION: i32 = 12;

fn is_clearable(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::EMPTY | BlockId::MUD | BlockId::MUSHROOM_GRASS | BlockId::SILT | BlockId::SLIME
    )
}

/// Floor row for a cabin spanning `x..x + width` that starts looking at
/// row `y`: the third quartile of the ground below each column.
fn floor_row(x: i32, y: i32, width: i32, world: &World) -> i32 {
    let mut ground: Vec<i32> = (x..x + width)
        .map(|col| {
            let mut row = y;
            while row < world.height() && world.tile(col, row).is_empty() {
                row += 1;
            }
            row
        })
        .collect();
    ground.sort_unstable();
    ground[ground.len() * 3 / 4]
}

/// Find the top-left column and floor row of a cabin near `center`.
fn find_site(center: Point, width: i32, rnd: &mut Random, world: &World) -> Option<(i32, i32)> {
    let reach_x = (0.02 * f64::from(world.width())) as i32;
    let reach_y = (0.01 * f64::from(world.width())) as i32;
    for _ in 0..TRIES {
        let x = center.x + rnd.get_int(-reach_x, reach_x) - width / 2;
        let y = center.y + rnd.get_int(-reach_y, reach_y);
        let open = world.region_passes(x, y - HEADROOM, width, HEADROOM, |tile| {
            tile.is_empty() && matches!(tile.wall, WallId::EMPTY | WallId::MUSHROOM)
        });
        if !open {
            continue;
        }
        let floor = floor_row(x, y, width, world);
        let claim = Rect::new(x - PADDING, floor - HEADROOM, width + 2 * PADDING, HEADROOM + 2);
        if is_unguarded(claim, world)
            && world.region_passes(claim.x, claim.y, claim.width, claim.height, |tile| is_clearable(tile.block))
        {
            return Some((x, floor));
        }
    }
    None
}

fn build_cabin(x: i32, floor: i32, width: i32, world: &mut World) {
    for i in 0..width {
        let col = x + i;
        for j in 0..=CABIN_HEIGHT {
            let edge = i == 0 || i == width - 1 || j == 0 || j == CABIN_HEIGHT;
            let tile = world.tile_mut(col, floor - j);
            tile.block = if edge { BlockId::MUSHROOM_BLOCK } else { BlockId::EMPTY };
            tile.wall = WallId::MUSHROOM;
        }
        let mut row = floor + 1;
        while row <= floor + MAX_FOUNDATION && world.tile(col, row).is_empty() {
            world.tile_mut(col, row).block = BlockId::MUD;
            row += 1;
        }
    }
    for door_x in [x, x + width - 1] {
        world.place_framed_tile(door_x, floor - 3, BlockId::DOOR, Variant::Mushroom);
    }
}

pub fn gen_mushroom_cabin(rnd: &mut Random, world: &mut World) {
    info!("Shaping mushrooms");
    let centers = world.ctx.mushroom_centers.clone();
    for center in centers {
        let width = rnd.get_int(20, 30);
        let Some((x, floor)) = find_site(center, width, rnd, world) else {
            debug!("No room for a cabin near {:?}", center);
            continue;
        };
        build_cabin(x, floor, width, world);
        let offset = (f64::from(width) * rnd.get_double(0.25, 0.75)) as i32;
        let cmd = Command::PlaceChest {
            x: x + offset,
            y: floor - 2,
            variant: Variant::Mushroom,
            loot: LootKind::Mushroom,
        };
        commands::apply(&cmd, rnd, world);
        guard_region(Rect::new(x, floor - CABIN_HEIGHT, width, CABIN_HEIGHT + 1), world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    /// Mud below row 150 with a hollow at columns 250..350, rows 300..330.
    fn field_world() -> World {
        let mut world = test_world(1000, 600);
        let hollow = Rect::new(250, 300, 100, 30);
        for pt in Rect::new(0, 150, 1000, 450).points() {
            if !hollow.contains(pt) {
                world.tile_at_mut(pt).block = BlockId::MUD;
            }
        }
        world
    }

    #[test]
    fn test_cabin_rests_on_hollow_floor() {
        let mut world = field_world();
        world.ctx.mushroom_centers.push(Point::new(300, 320));
        let mut rnd = Random::new(5);
        gen_mushroom_cabin(&mut rnd, &mut world);

        assert_eq!(world.chests().len(), 1);
        let chest = &world.chests()[0];
        assert_eq!(chest.y, 328);
        assert_eq!(world.tile(chest.x, chest.y).frame_x, 1152);
        assert!(!chest.is_empty());
        assert_eq!(world.tile(chest.x, 330).block, BlockId::MUSHROOM_BLOCK);
        assert_eq!(world.tile(chest.x, 322).block, BlockId::MUSHROOM_BLOCK);
        assert_eq!(world.tile(chest.x, 325).wall, WallId::MUSHROOM);
        assert!(world.tile(chest.x, 325).guarded);
        let doors = Rect::new(200, 300, 200, 40)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::DOOR)
            .count();
        assert_eq!(doors, 6);
    }

    #[test]
    fn test_no_fields_no_cabins() {
        let mut world = field_world();
        let mut rnd = Random::new(5);
        gen_mushroom_cabin(&mut rnd, &mut world);
        assert!(world.chests().is_empty());
    }

    #[test]
    fn test_floor_takes_upper_quartile() {
        let mut world = test_world(40, 40);
        for x in 0..8 {
            let ground = if x < 6 { 20 } else { 30 };
            for y in ground..40 {
                world.tile_mut(x, y).block = BlockId::MUD;
            }
        }
        assert_eq!(floor_row(0, 10, 8, &world), 30);
        assert_eq!(floor_row(0, 10, 4, &world), 20);
    }
}
