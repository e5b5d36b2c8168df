//! Torch arena
//!
//! A wide oval cavern carved just above the underworld, with a torch shrine
//! on its floor and a second torch pillar off to one side.

use log::{debug, info};

use crate::commands::Command;
use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::world::{Biome, World};

use super::{guard_region, scan_while_empty, BuildingSite};

/// Half width of the shrine pedestal.
const SHRINE_HALF: i32 = 3;
const SHRINE_HEIGHT: i32 = 2;
const PILLAR_HEIGHT: i32 = 4;

fn is_clearable(block: BlockId) -> bool {
    (block.is_ore() && !matches!(block, BlockId::COPPER_ORE | BlockId::TIN_ORE))
        || matches!(
            block,
            BlockId::EMPTY | BlockId::DIRT | BlockId::STONE | BlockId::MUD | BlockId::SAND | BlockId::CLAY
        )
}

/// Carve the oval around `center` with a noisy floor. Returns the floor
/// offset under the middle columns.
fn carve_arena(center: Point, half_width: i32, half_height: i32, rnd: &Random, world: &mut World) -> i32 {
    let mut favor_base = -3;
    for i in -half_width..half_width {
        let base = (3.5 * f64::from(10 + half_width - i.abs()) * rnd.fine(center.x + i, 0) / f64::from(half_width))
            as i32;
        if (-3..4).contains(&i) {
            favor_base = favor_base.max(base);
        }
        for j in -half_height..base {
            let dist = (f64::from(i) / f64::from(half_width)).hypot(f64::from(j) / f64::from(half_height));
            if rnd.fine(center.x + i, center.y + j) > 3.5 * dist - 2.5 {
                world.tile_mut(center.x + i, center.y + j).block = BlockId::EMPTY;
            }
        }
    }
    favor_base
}

fn place_torch(x: i32, y: i32, world: &mut World) {
    let tile = world.tile_mut(x, y);
    tile.block = BlockId::TORCH;
    tile.frame_x = 0;
    tile.frame_y = 0;
}

/// Ember wall backing where the cave has none.
fn back_with_ember(area: Rect, world: &mut World) {
    for pt in area.points() {
        let tile = world.tile_at_mut(pt);
        if tile.wall.is_empty() {
            tile.wall = WallId::EMBER;
        }
    }
}

/// Stone slab pedestal topped with three torches, resting on `floor`.
fn build_shrine(x: i32, floor: i32, world: &mut World) {
    back_with_ember(Rect::new(x - SHRINE_HALF - 1, floor - SHRINE_HEIGHT - 4, 2 * SHRINE_HALF + 3, SHRINE_HEIGHT + 4), world);
    for i in -SHRINE_HALF..=SHRINE_HALF {
        for j in 1..=SHRINE_HEIGHT {
            world.tile_mut(x + i, floor - j).block = BlockId::STONE_SLAB;
        }
        // Fill any gap down to the ground.
        let mut y = floor;
        while y < floor + 10 && world.tile(x + i, y).is_empty() {
            world.tile_mut(x + i, y).block = BlockId::STONE_SLAB;
            y += 1;
        }
    }
    for i in [-SHRINE_HALF, 0, SHRINE_HALF] {
        place_torch(x + i, floor - SHRINE_HEIGHT - 1, world);
    }
}

fn build_pillar(x: i32, floor: i32, world: &mut World) {
    back_with_ember(Rect::new(x - 1, floor - PILLAR_HEIGHT - 2, 3, PILLAR_HEIGHT + 2), world);
    for j in 1..=PILLAR_HEIGHT {
        world.tile_mut(x, floor - j).block = BlockId::STONE_SLAB;
    }
    place_torch(x, floor - PILLAR_HEIGHT - 1, world);
}

pub fn gen_torch_arena(rnd: &mut Random, world: &mut World) {
    info!("Fueling torches");
    let width = rnd.get_int(90, 110);
    let height = rnd.get_int(45, 52);
    let hive_queen = world.conf.variation.hive_queen;
    let rules = BuildingSite {
        x_range: (100, world.width() - 100 - width),
        y_range: (
            (world.cavern_level() + world.underworld_level()) / 2 - height,
            world.underworld_level() - height,
        ),
        width,
        height,
        padding: if hive_queen { 6 } else { 20 },
        clearable: is_clearable,
    };
    let site = rules.select(rnd, world, |pt, world| !hive_queen || world.biome(pt.x, pt.y).active != Biome::Jungle);
    let Some(Point { x, y }) = site else {
        debug!("No site for the torch arena");
        return;
    };
    let center = Point::new(x + width / 2, y + height - 5);
    let favor_base = carve_arena(center, width / 2 + 3, height - 5, rnd, world);
    build_shrine(center.x, center.y + favor_base, world);

    let offset = rnd.select(&[-1, 1]) * (SHRINE_HALF + 1 + width / 8);
    let pillar_x = center.x + offset;
    let mut pillar_base = -3;
    for i in -1..=1 {
        let base = scan_while_empty(Point::new(pillar_x + i, center.y - 3), (0, 1), world).y + 1 - center.y;
        if base < 5 {
            pillar_base = pillar_base.max(base);
        }
    }
    build_pillar(pillar_x, center.y + pillar_base, world);

    guard_region(Rect::new(x, y, width, height), world);
    world.queued_deco.push(Command::ClearLiquid {
        rect: Rect::new(x, y, width, height),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::NoiseField;
    use crate::world::test_world;

    #[test]
    fn test_carve_leaves_noisy_floor() {
        let mut world = test_world(300, 300);
        for pt in Rect::new(0, 0, 300, 300).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
        }
        let mut rnd = Random::new(1);
        rnd.noise = NoiseField::from_fn(300, 300, |_, _| 0.5);
        // 3.5 * 60 * 0.5 / 50 rounds down to 2.
        assert_eq!(carve_arena(Point::new(150, 150), 50, 40, &rnd, &mut world), 2);
        assert!(world.tile(150, 150).is_empty());
        assert!(world.tile(150, 151).is_empty());
        assert_eq!(world.tile(150, 152).block, BlockId::STONE);
        assert_eq!(world.tile(199, 111).block, BlockId::STONE);
        assert_eq!(world.tile(150, 105).block, BlockId::STONE);
    }

    #[test]
    fn test_arena_lights_its_floor() {
        let mut world = test_world(1000, 600);
        for pt in Rect::new(0, 150, 1000, 450).points() {
            let tile = world.tile_at_mut(pt);
            if !(340..356).contains(&pt.y) {
                tile.block = BlockId::STONE;
            }
        }
        let mut rnd = Random::new(9);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.5);
        gen_torch_arena(&mut rnd, &mut world);

        let torches: Vec<Point> = Rect::new(0, 0, 1000, 600)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::TORCH)
            .collect();
        assert_eq!(torches.len(), 4);
        for torch in &torches {
            assert!(world.tile_at(*torch).guarded);
            assert_eq!(world.tile(torch.x, torch.y + 1).block, BlockId::STONE_SLAB);
            assert_eq!(world.tile_at(*torch).wall, WallId::EMBER);
        }
        assert_eq!(world.queued_deco.len(), 1);
    }

    #[test]
    fn test_copper_is_not_clearable() {
        assert!(is_clearable(BlockId::GOLD_ORE));
        assert!(!is_clearable(BlockId::COPPER_ORE));
        assert!(!is_clearable(BlockId::MARBLE));
    }
}
