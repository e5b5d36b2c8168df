//! Deferred world edits
//!
//! Some passes need to act on terrain that a later pass has not shaped yet.
//! They record a `Command` on one of the world's queues instead, and the
//! scheduler flushes each queue at a fixed point:
//!
//! - `queued_evil` after both evil biomes are placed,
//! - `queued_treasures` during the treasure pass,
//! - `queued_traps` once the trap pass has armed the caves,
//! - `queued_deco` at the start of the grass pass.

use std::collections::BTreeMap;

use log::debug;

use crate::biomes::evil::{self, EvilKind};
use crate::biomes::{self, hive};
use crate::framing::Variant;
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::structures::loot::{self, LootKind};
use crate::structures::{plants, traps};
use crate::tile::Liquid;
use crate::world::World;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Drain every liquid inside the rectangle.
    ClearLiquid { rect: Rect },
    /// Turn lava inside the rectangle into water.
    LavaToWater { rect: Rect },
    /// Scatter larva nests on hive floors near `center`.
    PlaceLarvae { center: Point, radius: i32, count: i32 },
    /// Place a chest and fill it from a loot table.
    PlaceChest { x: i32, y: i32, variant: Variant, loot: LootKind },
    /// Sprout moss plants around a moss stone block.
    GrowMoss { x: i32, y: i32 },
    /// Finish converting the core of an evil biome.
    ConvertEvilRegion { center: Point, radius: i32, palette: EvilKind },
    /// Remove evil tendrils left floating above the surface.
    TrimFloatingTendrils { palette: EvilKind, x_range: (i32, i32) },
    /// Lay a bone pile on flat desert sand if the spot is still open.
    PlaceDryBones { x: i32, y: i32 },
    /// Rig the surroundings of the trapped chest at `(x, y)`.
    AddChestTraps { x: i32, y: i32 },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ClearLiquid { .. } => "clear liquid",
            Command::LavaToWater { .. } => "lava to water",
            Command::PlaceLarvae { .. } => "place larvae",
            Command::PlaceChest { .. } => "place chest",
            Command::GrowMoss { .. } => "grow moss",
            Command::ConvertEvilRegion { .. } => "convert evil region",
            Command::TrimFloatingTendrils { .. } => "trim floating tendrils",
            Command::PlaceDryBones { .. } => "place dry bones",
            Command::AddChestTraps { .. } => "add chest traps",
        }
    }
}

/// Execute one command against the world.
pub fn apply(cmd: &Command, rnd: &mut Random, world: &mut World) {
    match *cmd {
        Command::ClearLiquid { rect } => {
            for pt in rect.points() {
                world.tile_at_mut(pt).liquid = Liquid::None;
            }
        }
        Command::LavaToWater { rect } => {
            for pt in rect.points() {
                let tile = world.tile_at_mut(pt);
                if tile.liquid == Liquid::Lava {
                    tile.liquid = Liquid::Water;
                }
            }
        }
        Command::PlaceLarvae { center, radius, count } => {
            hive::place_larvae(center, radius, count, rnd, world);
        }
        Command::PlaceChest { x, y, variant, loot } => {
            let items = loot::roll_loot(loot, Point::new(x, y), rnd, world);
            let chest = world.place_chest(x, y, variant);
            for item in items {
                if !chest.push(item) {
                    break;
                }
            }
        }
        Command::GrowMoss { x, y } => biomes::grow_moss_on(x, y, world),
        Command::ConvertEvilRegion { center, radius, palette } => {
            evil::convert_region(center, radius, palette, world);
        }
        Command::TrimFloatingTendrils { palette, x_range } => {
            evil::trim_floating_tendrils(palette, x_range, world);
        }
        Command::PlaceDryBones { x, y } => plants::place_dry_bones(x, y, world),
        Command::AddChestTraps { x, y } => traps::add_chest_traps(x, y, rnd, world),
    }
}

/// Number of commands of each kind in `queue`.
pub fn tally(queue: &[Command]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for cmd in queue {
        *counts.entry(cmd.name()).or_insert(0) += 1;
    }
    counts
}

/// Execute a drained queue in insertion order.
pub fn flush(queue: Vec<Command>, rnd: &mut Random, world: &mut World) {
    for (name, count) in tally(&queue) {
        debug!("Applying {} queued {}", count, name);
    }
    for cmd in &queue {
        apply(cmd, rnd, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::BlockId;
    use crate::world::test_world;

    #[test]
    fn test_liquid_commands_stay_in_rect() {
        let mut world = test_world(30, 30);
        for x in 0..30 {
            for y in 0..30 {
                world.tile_mut(x, y).liquid = Liquid::Lava;
            }
        }
        let mut rnd = Random::new(1);
        let queue = vec![
            Command::LavaToWater { rect: Rect::new(2, 2, 4, 4) },
            Command::ClearLiquid { rect: Rect::new(10, 10, 2, 2) },
        ];
        flush(queue, &mut rnd, &mut world);
        assert_eq!(world.tile(3, 3).liquid, Liquid::Water);
        assert_eq!(world.tile(6, 6).liquid, Liquid::Lava);
        assert_eq!(world.tile(11, 11).liquid, Liquid::None);
        assert_eq!(world.tile(12, 12).liquid, Liquid::Lava);
    }

    #[test]
    fn test_tally_groups_by_name() {
        let rect = Rect::new(0, 0, 1, 1);
        let queue = vec![
            Command::LavaToWater { rect },
            Command::GrowMoss { x: 1, y: 1 },
            Command::LavaToWater { rect },
            Command::AddChestTraps { x: 4, y: 4 },
        ];
        let counts = tally(&queue);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["lava to water"], 2);
        assert_eq!(counts["grow moss"], 1);
        assert_eq!(counts["add chest traps"], 1);
        assert!(tally(&[]).is_empty());
    }

    #[test]
    fn test_grow_moss_command() {
        let mut world = test_world(20, 20);
        world.tile_mut(10, 10).block = BlockId::LAVA_MOSS_STONE;
        let mut rnd = Random::new(2);
        apply(&Command::GrowMoss { x: 10, y: 10 }, &mut rnd, &mut world);
        for (x, y) in [(10, 9), (10, 11), (11, 10), (9, 10)] {
            assert_eq!(world.tile(x, y).block, BlockId::MOSS_PLANT);
            assert_eq!(world.tile(x, y).frame_x, 110);
        }
    }

    #[test]
    fn test_place_chest_command_fills_storage() {
        let mut world = test_world(200, 120);
        let mut rnd = Random::new(3);
        let cmd = Command::PlaceChest {
            x: 40,
            y: 80,
            variant: Variant::Gold,
            loot: LootKind::Cavern,
        };
        assert_eq!(cmd.name(), "place chest");
        apply(&cmd, &mut rnd, &mut world);
        assert_eq!(world.chests().len(), 1);
        assert!(!world.chests()[0].is_empty());
        assert_eq!(world.tile(40, 80).block, BlockId::CHEST);
    }
}
