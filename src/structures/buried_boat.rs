//! A wrecked boat buried in the frozen caverns.

use log::{debug, info};

use crate::biomes::is_in_biome;
use crate::commands::Command;
use crate::config::BiomeLayout;
use crate::ids::BlockId;
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::stamps;
use crate::structures::loot::{self, LootKind};
use crate::world::{Biome, World};

const LOCATION_TRIES: i32 = 8000;
/// Noise band in which the hull has rotted away.
const DECAY_BAND: f64 = 0.11;

/// Terrain the wreck must not cut into.
fn is_avoided(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::AETHERIUM
            | BlockId::BLUE_BRICK
            | BlockId::CORRUPT_ICE
            | BlockId::CRIMSON_ICE
            | BlockId::DIRT
            | BlockId::GRANITE
            | BlockId::GREEN_BRICK
            | BlockId::HIVE
            | BlockId::LIHZAHRD_BRICK
            | BlockId::MARBLE
            | BlockId::MUSHROOM_GRASS
            | BlockId::PINK_BRICK
            | BlockId::STONE
    )
}

/// Hull materials that rot away where the ground already has a block.
fn is_decayable(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::BOREAL_WOOD | BlockId::RICH_MAHOGANY | BlockId::RICH_MAHOGANY_BEAM | BlockId::ROPE
    )
}

/// Top-left corner of a mostly solid snow-biome rectangle in the caverns.
fn select_boat_location(width: i32, height: i32, rnd: &mut Random, world: &World) -> Option<Point> {
    let columns = world.conf.world.biomes == BiomeLayout::Columns;
    let (min_x, max_x) = if columns {
        let reach = world.conf.variation.snow_size * 0.06 * f64::from(world.width());
        (
            (world.ctx.snow_center - reach) as i32 - width,
            (world.ctx.snow_center + reach) as i32,
        )
    } else {
        (350, world.width() - width - 350)
    };
    let min_y = world.cavern_level();
    let max_y = (world.cavern_level() + 2 * world.underworld_level()) / 3 - height;
    let biome_scan = width.max(height) / 2;
    for _ in 0..LOCATION_TRIES {
        let x = rnd.get_int(min_x, max_x);
        let y = rnd.get_int(min_y, max_y);
        if !columns && !is_in_biome(x + biome_scan, y + biome_scan, biome_scan, Biome::Snow, world) {
            continue;
        }
        let mut max_empty = (0.7 * f64::from(width * height)) as i32;
        let fits = world.region_passes(x, y, width, height, |tile| {
            if tile.is_empty() {
                max_empty -= 1;
            }
            !tile.guarded && !is_avoided(tile.block) && max_empty > 0
        });
        if fits {
            return Some(Point::new(x, y));
        }
    }
    None
}

pub fn gen_buried_boat(rnd: &mut Random, world: &mut World) {
    info!("Misplacing explorers");
    rnd.shuffle_noise();
    let boat = stamps::frozen_boat();
    let Some(Point { x, y }) = select_boat_location(boat.width(), boat.height(), rnd, world) else {
        debug!("No site for the buried boat");
        return;
    };
    for i in 0..boat.width() {
        for j in 0..boat.height() {
            let mut cell = *boat.tile(i, j);
            if cell.is_empty() && cell.wall.is_empty() {
                continue;
            }
            let ground = *world.tile(x + i, y + j);
            if rnd.fine(x + i, y + j).abs() < DECAY_BAND {
                if !ground.is_empty() && is_decayable(cell.block) {
                    continue;
                }
                if cell.is_empty() {
                    cell.block = ground.block;
                } else if !ground.wall.is_empty() {
                    cell.wall = ground.wall;
                    cell.wall_paint = ground.wall_paint;
                }
            }
            if cell.block == BlockId::CHEST && cell.frame_x % 36 == 0 && cell.frame_y == 0 {
                let items = loot::roll_loot(LootKind::Frozen, Point::new(x + i, y + j), rnd, world);
                let chest = world.register_storage(x + i, y + j);
                for item in items {
                    if !chest.push(item) {
                        break;
                    }
                }
            }
            if cell.wall.is_empty() {
                cell.wall = ground.wall;
            }
            cell.guarded = true;
            *world.tile_mut(x + i, y + j) = cell;
        }
    }
    world.queued_deco.push(Command::LavaToWater {
        rect: Rect::new(x, y, boat.width(), boat.height()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::WallId;
    use crate::random::NoiseField;
    use crate::tile::Tile;
    use crate::world::test_world;

    fn frozen_world() -> World {
        let mut world = test_world(1000, 800);
        for pt in Rect::new(0, 300, 1000, 500).points() {
            world.tile_at_mut(pt).block = BlockId::ICE;
            world.tile_at_mut(pt).wall = WallId::ICE;
        }
        world.ctx.snow_center = 500.0;
        world
    }

    #[test]
    fn test_location_skips_stone() {
        let mut world = frozen_world();
        for pt in Rect::new(0, 300, 1000, 500).points() {
            world.tile_at_mut(pt).block = BlockId::STONE;
        }
        let mut rnd = Random::new(1);
        assert_eq!(select_boat_location(30, 14, &mut rnd, &world), None);
    }

    #[test]
    fn test_location_needs_ground() {
        let world = test_world(1000, 800);
        let mut rnd = Random::new(1);
        assert_eq!(select_boat_location(30, 14, &mut rnd, &world), None);
    }

    #[test]
    fn test_location_skips_guarded_ground() {
        let mut world = frozen_world();
        for pt in Rect::new(0, 300, 1000, 500).points() {
            world.tile_at_mut(pt).guarded = true;
        }
        let mut rnd = Random::new(1);
        assert_eq!(select_boat_location(30, 14, &mut rnd, &world), None);
    }

    #[test]
    fn test_second_boat_leaves_first_intact() {
        let mut world = frozen_world();
        let mut rnd = Random::new(8);
        rnd.noise = NoiseField::from_fn(1000, 800, |_, _| 0.5);
        gen_buried_boat(&mut rnd, &mut world);
        let first: Vec<(Point, Tile)> = Rect::new(0, 0, 1000, 800)
            .points()
            .filter(|&pt| world.tile_at(pt).guarded)
            .map(|pt| (pt, *world.tile_at(pt)))
            .collect();
        assert!(!first.is_empty());
        gen_buried_boat(&mut rnd, &mut world);
        assert_eq!(world.chests().len(), 2);
        for (pt, tile) in first {
            assert_eq!(*world.tile_at(pt), tile, "boat cell at {:?} overwritten", pt);
        }
    }

    #[test]
    fn test_gen_buried_boat() {
        let mut world = frozen_world();
        let mut rnd = Random::new(6);
        // Outside the decay band everywhere.
        rnd.noise = NoiseField::from_fn(1000, 800, |_, _| 0.5);
        gen_buried_boat(&mut rnd, &mut world);
        assert_eq!(world.chests().len(), 1);
        let chest = &world.chests()[0];
        assert!(!chest.is_empty());
        let (cx, cy) = (chest.x, chest.y);
        // The chest sits at (14, 11) inside the stamp.
        let (x, y) = (cx - 14, cy - 11);
        assert_eq!(world.tile(x + 15, y).block, BlockId::RICH_MAHOGANY_BEAM);
        assert!(world.tile(x + 15, y).guarded);
        assert_eq!(world.tile(x + 10, y + 10).wall, WallId::BOREAL_WOOD);
        assert!(world.tile(x + 10, y + 10).is_empty());
        // Cells outside the hull keep the ground's wall.
        assert_eq!(world.tile(x + 15, y + 2).wall, WallId::ICE);
        assert_eq!(
            world.queued_deco,
            vec![Command::LavaToWater { rect: Rect::new(x, y, 30, 14) }]
        );
    }
}
