//! Sandstone tomb buried under the desert.

use log::{debug, info};

use crate::biomes::is_in_biome;
use crate::commands::{self, Command};
use crate::config::BiomeLayout;
use crate::framing::Variant;
use crate::ids::{BlockId, WallId};
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::structures::loot::LootKind;
use crate::world::{Biome, World};

use super::{guard_region, BuildingSite};

const SHELL: i32 = 3;
/// Width of the hole in the upper floor.
const STAIR_GAP: i32 = 6;

fn is_clearable(block: BlockId) -> bool {
    block.is_ore()
        || matches!(
            block,
            BlockId::EMPTY | BlockId::SAND | BlockId::HARDENED_SAND | BlockId::SANDSTONE | BlockId::DESERT_FOSSIL
        )
}

fn site_rules(width: i32, height: i32, world: &World) -> BuildingSite {
    let x_range = if world.conf.world.biomes == BiomeLayout::Patches {
        (350, world.width() - 350 - width)
    } else {
        let reach = world.conf.variation.desert_size * 0.06 * f64::from(world.width());
        (
            (world.ctx.desert_center - reach) as i32,
            (world.ctx.desert_center + reach) as i32 - width,
        )
    };
    BuildingSite {
        x_range,
        y_range: (
            world.cavern_level(),
            (world.cavern_level() + 4 * world.underworld_level()) / 5 - height,
        ),
        width,
        height,
        padding: 20,
        clearable: is_clearable,
    }
}

/// Two storeys of sandstone brick with open side entries on the ground
/// floor. Returns the interior cells.
fn build_tomb(x: i32, y: i32, width: i32, height: i32, rnd: &mut Random, world: &mut World) -> Vec<Point> {
    let upper_floor = height / 2;
    let gap_start = if rnd.get_bool() { SHELL } else { width - SHELL - STAIR_GAP };
    let mut interior = Vec::new();
    for i in 0..width {
        for j in 0..height {
            let in_shell = i < SHELL || i >= width - SHELL || j < SHELL || j >= height - SHELL;
            let in_entry = (i < SHELL || i >= width - SHELL) && (height - 7..height - SHELL).contains(&j);
            let in_floor =
                (upper_floor..upper_floor + 2).contains(&j) && !(gap_start..gap_start + STAIR_GAP).contains(&i);
            let tile = world.tile_mut(x + i, y + j);
            tile.wall = WallId::SANDSTONE_BRICK;
            if (in_shell && !in_entry) || in_floor {
                tile.block = BlockId::SANDSTONE_BRICK;
            } else {
                tile.block = BlockId::EMPTY;
                if !in_shell {
                    interior.push(Point::new(x + i, y + j));
                }
            }
        }
    }
    interior
}

/// Let patches of the inner walls crumble back to raw sandstone.
fn degrade_walls(interior: &[Point], rnd: &mut Random, world: &mut World) {
    let shuffle = Point::new(rnd.get_int(0, world.width()), rnd.get_int(0, world.height()));
    for &Point { x, y } in interior {
        let worn = rnd.fine(2 * x, 2 * y).abs().min(rnd.fine(shuffle.x + 2 * x, shuffle.y + 2 * y).abs());
        if worn < 0.09 {
            world.tile_mut(x, y).wall = WallId::SANDSTONE;
        }
    }
}

fn is_brick_row(x: i32, y: i32, width: i32, world: &World) -> bool {
    world.region_passes(x, y, width, 1, |tile| tile.block == BlockId::SANDSTONE_BRICK)
}

fn is_open(x: i32, y: i32, width: i32, height: i32, world: &World) -> bool {
    world.region_passes(x, y, width, height, |tile| tile.is_empty())
}

/// Gold piles and pyramid pots on the floors.
fn add_treasure(interior: &[Point], rnd: &mut Random, world: &mut World) {
    let mut spots = interior.to_vec();
    rnd.seq.shuffle(&mut spots);
    for Point { x, y } in spots {
        match (99999.0 * (1.0 + rnd.fine(x, y))) as i32 % 9 {
            0 if is_open(x, y, 2, 1, world) && is_brick_row(x, y + 1, 2, world) => {
                world.place_framed_tile(x, y, BlockId::SMALL_PILE, Variant::Gold);
            }
            1 | 2 if is_open(x, y, 2, 2, world) && is_brick_row(x, y + 2, 2, world) => {
                world.place_framed_tile(x, y, BlockId::POT, Variant::Pyramid);
            }
            _ => {}
        }
    }
}

pub fn gen_desert_tomb(rnd: &mut Random, world: &mut World) {
    info!("Embalming");
    let width = rnd.get_int(38, 46);
    let height = rnd.get_int(22, 26);
    let rules = site_rules(width, height, world);
    let patches = world.conf.world.biomes == BiomeLayout::Patches;
    let scan = width.max(height) / 2;
    let site = rules.select(rnd, world, |pt, world| {
        !patches || is_in_biome(pt.x + scan, pt.y + scan, scan, Biome::Desert, world)
    });
    let Some(Point { x, y }) = site else {
        debug!("No site for the desert tomb");
        return;
    };
    let interior = build_tomb(x, y, width, height, rnd, world);
    let chest_x = x + rnd.get_int(SHELL + 2, width - SHELL - 4);
    let cmd = Command::PlaceChest {
        x: chest_x,
        y: y + height - SHELL - 2,
        variant: Variant::Sandstone,
        loot: LootKind::Sandstone,
    };
    commands::apply(&cmd, rnd, world);
    degrade_walls(&interior, rnd, world);
    add_treasure(&interior, rnd, world);
    let footprint = Rect::new(x, y, width, height);
    guard_region(footprint, world);
    world.queued_deco.push(Command::ClearLiquid {
        rect: Rect::new(x + SHELL, y + SHELL, width - 2 * SHELL, height - 2 * SHELL),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::NoiseField;
    use crate::world::test_world;

    /// Sandstone below row 150 with an open tunnel at rows 270..286.
    fn desert_world() -> World {
        let mut world = test_world(1000, 600);
        for pt in Rect::new(0, 150, 1000, 450).points() {
            let tile = world.tile_at_mut(pt);
            if !(270..286).contains(&pt.y) {
                tile.block = BlockId::SANDSTONE;
            }
            tile.wall = WallId::SANDSTONE;
        }
        world.ctx.desert_center = 500.0;
        world
    }

    #[test]
    fn test_tomb_sits_in_tunnel() {
        let mut world = desert_world();
        let mut rnd = Random::new(7);
        rnd.noise = NoiseField::from_fn(1000, 600, |_, _| 0.5);
        gen_desert_tomb(&mut rnd, &mut world);

        assert_eq!(world.chests().len(), 1);
        let chest = &world.chests()[0];
        assert!((chest.x - 500).abs() < 80);
        assert_eq!(world.tile(chest.x, chest.y).block, BlockId::CHEST_GROUP2);
        assert!(!chest.is_empty());
        // The ground floor rests on the tunnel floor.
        assert_eq!(world.tile(chest.x, chest.y + 2).block, BlockId::SANDSTONE_BRICK);
        assert!((288..=291).contains(&(chest.y + 2 + SHELL)));
        assert!(world.tile(chest.x, chest.y).guarded);
        assert_eq!(world.queued_deco.len(), 1);
    }

    #[test]
    fn test_tomb_skips_claimed_ground() {
        let mut world = desert_world();
        for pt in Rect::new(0, 150, 1000, 450).points() {
            world.tile_at_mut(pt).guarded = true;
        }
        let mut rnd = Random::new(7);
        gen_desert_tomb(&mut rnd, &mut world);
        assert!(world.chests().is_empty());
    }

    #[test]
    fn test_treasure_needs_brick_floor() {
        let mut world = test_world(40, 40);
        for x in 0..40 {
            world.tile_mut(x, 20).block = BlockId::SANDSTONE_BRICK;
            world.tile_mut(x, 30).block = BlockId::SAND;
        }
        let mut rnd = Random::new(1);
        // (99999 * 1.00002) as i32 % 9 == 1: pots where they fit.
        rnd.noise = NoiseField::from_fn(40, 40, |_, _| 0.00002);
        let spots = vec![Point::new(5, 18), Point::new(12, 28)];
        add_treasure(&spots, &mut rnd, &mut world);
        assert_eq!(world.tile(5, 18).block, BlockId::POT);
        assert!(world.tile(12, 28).is_empty());
    }
}
