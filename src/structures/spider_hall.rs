//! Spider-infested stone halls in the upper caverns.

use log::{debug, info};

use crate::commands::{self, Command};
use crate::framing::Variant;
use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::structures::loot::LootKind;
use crate::tile::Slope;
use crate::world::World;

use super::{guard_region, BuildingSite};

const SHELL: i32 = 2;
/// Worlds narrower than this hold a single hall.
const SPLIT_WIDTH: i32 = 8000;

fn is_clearable(block: BlockId) -> bool {
    block.is_ore()
        || matches!(
            block,
            BlockId::EMPTY | BlockId::DIRT | BlockId::STONE | BlockId::CLAY | BlockId::SAND | BlockId::MUD
        )
}

/// Column ranges sampled for halls, one hall per range.
fn hall_ranges(w: i32, width: i32) -> Vec<(i32, i32)> {
    if w < SPLIT_WIDTH {
        vec![(200, w - width - 200)]
    } else {
        let w = f64::from(w);
        vec![
            (200, (0.35 * w) as i32 - width),
            ((0.65 * w) as i32, w as i32 - width - 200),
        ]
    }
}

/// Gray brick shell around an open hall with a stone slab ledge on each
/// side. A fifth of the masonry has crumbled to raw stone.
fn build_hall(x: i32, y: i32, width: i32, height: i32, rnd: &Random, world: &mut World) {
    let ledge = height / 2;
    for i in 0..width {
        for j in 0..height {
            let (px, py) = (x + i, y + j);
            let in_shell = i < SHELL || i >= width - SHELL || j < SHELL || j >= height - SHELL;
            let in_entry = (i < SHELL || i >= width - SHELL) && (height - 6..height - SHELL).contains(&j);
            let on_ledge = j == ledge && (i < width / 4 || i >= width - width / 4);
            let crumbled = (99999.0 * (1.0 + rnd.fine(px, py))) as i32 % 5 == 0;
            let webbed = rnd.fine(px + 3 * i, py + 3 * j).abs() < 0.45;
            let tile = world.tile_mut(px, py);
            tile.block = if in_shell && !in_entry {
                if crumbled { BlockId::STONE } else { BlockId::GRAY_BRICK }
            } else if on_ledge {
                BlockId::STONE_SLAB
            } else {
                BlockId::EMPTY
            };
            tile.wall = if in_shell {
                if crumbled { WallId::CRAGGY_STONE } else { WallId::GRAY_BRICK }
            } else if webbed {
                WallId::SPIDER
            } else {
                WallId::CRAGGY_STONE
            };
        }
    }
}

fn can_place_deco(x: i32, y: i32, width: i32, height: i32, world: &World) -> bool {
    world.region_passes(x, y, width, height, |tile| tile.is_empty())
        && world.region_passes(x, y + height, width, 1, |tile| {
            !tile.actuated() && tile.block.is_solid() && tile.slope == Slope::None
        })
        && world.tile(x, y).wall == WallId::SPIDER
}

/// Pots and rubble on spider-walled floors.
fn add_deco(area: Rect, rnd: &Random, world: &mut World) {
    for Point { x, y } in area.points() {
        match (99999.0 * (1.0 + rnd.fine(x, y))) as i32 % 11 {
            0 if can_place_deco(x, y, 2, 2, world) => world.place_framed_tile(x, y, BlockId::POT, Variant::Spider),
            1 if can_place_deco(x, y, 2, 1, world) => {
                world.place_framed_tile(x, y, BlockId::SMALL_PILE, Variant::Spider);
            }
            2 if can_place_deco(x, y, 3, 2, world) => {
                world.place_framed_tile(x, y, BlockId::LARGE_PILE_GROUP2, Variant::Spider);
            }
            _ => {}
        }
    }
}

/// Cobwebs thinning out from the hall centre to twice its size. Claimed
/// cells are left alone.
fn add_cobwebs(center: Point, width: i32, height: i32, rnd: &Random, world: &mut World) {
    for i in -width..width {
        for j in -height..height {
            let dist = (f64::from(i) / f64::from(width)).hypot(f64::from(j) / f64::from(height));
            if rnd.fine(center.x + 4 * i, center.y + 4 * j) < (2.0 * dist - 1.0).max(0.1) {
                continue;
            }
            let tile = world.tile_mut(center.x + i, center.y + j);
            if !tile.guarded && tile.is_empty() && !tile.wall.is_empty() {
                tile.block = BlockId::COBWEB;
            }
        }
    }
}

pub fn gen_spider_hall(rnd: &mut Random, world: &mut World) {
    info!("Spinning webs");
    for x_range in hall_ranges(world.width(), 52) {
        let width = rnd.get_int(40, 52);
        let height = rnd.get_int(20, 26);
        let rules = BuildingSite {
            x_range,
            y_range: (
                (world.underground_level() + 2 * world.cavern_level()) / 3,
                (world.cavern_level() + 2 * world.underworld_level()) / 3 - height / 2,
            ),
            width,
            height,
            padding: 40,
            clearable: is_clearable,
        };
        let Some(Point { x, y }) = rules.select(rnd, world, |_, _| true) else {
            debug!("No site for a spider hall in columns {:?}", x_range);
            continue;
        };
        build_hall(x, y, width, height, rnd, world);
        let cmd = Command::PlaceChest {
            x: x + rnd.get_int(SHELL + 2, width - SHELL - 4),
            y: y + height - SHELL - 2,
            variant: Variant::Spider,
            loot: LootKind::WebCovered,
        };
        commands::apply(&cmd, rnd, world);
        let footprint = Rect::new(x, y, width, height);
        add_deco(footprint, rnd, world);
        add_cobwebs(Point::new(x + width / 2, y + height / 2), width, height, rnd, world);
        guard_region(footprint, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ItemId;
    use crate::random::NoiseField;
    use crate::world::test_world;

    /// Stone below row 150 with an open tunnel at rows 250..266.
    fn cave_world() -> World {
        let mut world = test_world(1000, 600);
        for pt in Rect::new(0, 150, 1000, 450).points() {
            let tile = world.tile_at_mut(pt);
            if !(250..266).contains(&pt.y) {
                tile.block = BlockId::STONE;
            }
            tile.wall = WallId::DIRT;
        }
        world
    }

    #[test]
    fn test_hall_holds_web_covered_chest() {
        let mut world = cave_world();
        let mut rnd = Random::new(11);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.5);
        gen_spider_hall(&mut rnd, &mut world);

        assert_eq!(world.chests().len(), 1);
        let chest = &world.chests()[0];
        assert_eq!(chest.items[0].id, ItemId::WEB_SLINGER);
        assert_eq!(world.tile(chest.x, chest.y).frame_x, 540);
        assert!(world.tile(chest.x, chest.y).guarded);
        // Hall floor sits on the tunnel floor.
        assert_eq!(world.tile(chest.x, chest.y + 2).block, BlockId::GRAY_BRICK);
        assert!((268..=271).contains(&(chest.y + 2 + SHELL)));
        // A fine noise of 0.5 clears the webbing threshold near the centre.
        let webs = Rect::new(0, 150, 1000, 450)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::COBWEB)
            .count();
        assert!(webs > 0);
    }

    #[test]
    fn test_cobwebs_need_a_wall() {
        let mut world = test_world(100, 100);
        for pt in Rect::new(40, 40, 10, 10).points() {
            world.tile_at_mut(pt).wall = WallId::SPIDER;
        }
        let mut rnd = Random::new(2);
        rnd.noise = NoiseField::from_fn(100, 100, |_, _| 0.5);
        add_cobwebs(Point::new(45, 45), 20, 20, &rnd, &mut world);
        assert_eq!(world.tile(45, 45).block, BlockId::COBWEB);
        assert!(world.tile(60, 45).is_empty());
        world.tile_mut(42, 42).guarded = true;
        add_cobwebs(Point::new(45, 45), 20, 20, &rnd, &mut world);
        assert!(world.tile(42, 42).is_empty());
    }

    #[test]
    fn test_wide_worlds_hold_two_halls() {
        assert_eq!(hall_ranges(4200, 50), vec![(200, 3950)]);
        assert_eq!(hall_ranges(8400, 50), vec![(200, 2890), (5460, 8150)]);
    }
}
