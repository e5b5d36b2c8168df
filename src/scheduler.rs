//! Generation pipeline
//!
//! Steps run strictly in order against one shared world. Which steps run is
//! settled once from the configuration before the first one starts.

use std::collections::BTreeSet;

use log::info;
use serde::Serialize;

use crate::biomes::{
    asteroid_field, base, desert, evil, glowing_moss, glowing_mushroom, granite_cave, hallow, hardmode_ores,
    hex_base, hive, jungle, marble_cave, ocean, snow, swap_resources,
};
use crate::biomes::evil::EvilKind;
use crate::cleanup;
use crate::commands;
use crate::config::{BiomeLayout, Config, Evil};
use crate::random::Random;
use crate::structures::{
    buried_boat, desert_tomb, dungeon, flood, hardmode_loot, igloo, lake, mushroom_cabin, plants, spider_hall,
    starter_home, temple, torch_arena, traps, treasure, vines,
};
use crate::world::{OreVariants, World};
use crate::zone::Grain;

/// Noise scale shared by every field of the world.
pub const NOISE_SCALE: f64 = 0.07;
/// Lattice scale of hex-shaped features in hive-queen worlds.
pub const HIVE_GRAIN: i32 = 12;
/// Climate field scale for the patchwork layout at patch size 1.
pub const CLIMATE_SCALE: f64 = 0.00097;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Step {
    PlanBiomes,
    InitNoise,
    InitClimate,
    Terrain,
    HexTerrain,
    Oceans,
    MarbleCave,
    Snow,
    Desert,
    Jungle,
    GlowingMushroom,
    GraniteCave,
    Hive,
    Crimson,
    Corruption,
    SecondaryCrimson,
    SecondaryCorruption,
    ApplyQueuedEvil,
    HardmodeOres,
    Hallow,
    SwapResources,
    AsteroidField,
    GlowingMoss,
    Dungeon,
    Temple,
    DesertTomb,
    BuriedBoat,
    SpiderHall,
    TorchArena,
    Lake,
    StarterHome,
    Igloo,
    MushroomCabin,
    Treasure,
    ApplyHardmodeLoot,
    Plants,
    Traps,
    SmoothSurfaces,
    FinalizeWalls,
    Flood,
    Vines,
    Grasses,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Self::PlanBiomes => "plan biomes",
            Self::InitNoise => "init noise",
            Self::InitClimate => "init climate",
            Self::Terrain => "terrain",
            Self::HexTerrain => "hex terrain",
            Self::Oceans => "oceans",
            Self::MarbleCave => "marble cave",
            Self::Snow => "snow",
            Self::Desert => "desert",
            Self::Jungle => "jungle",
            Self::GlowingMushroom => "glowing mushroom",
            Self::GraniteCave => "granite cave",
            Self::Hive => "hive",
            Self::Crimson => "crimson",
            Self::Corruption => "corruption",
            Self::SecondaryCrimson => "secondary crimson",
            Self::SecondaryCorruption => "secondary corruption",
            Self::ApplyQueuedEvil => "apply queued evil",
            Self::HardmodeOres => "hardmode ores",
            Self::Hallow => "hallow",
            Self::SwapResources => "swap resources",
            Self::AsteroidField => "asteroid field",
            Self::GlowingMoss => "glowing moss",
            Self::Dungeon => "dungeon",
            Self::Temple => "temple",
            Self::DesertTomb => "desert tomb",
            Self::BuriedBoat => "buried boat",
            Self::SpiderHall => "spider hall",
            Self::TorchArena => "torch arena",
            Self::Lake => "lake",
            Self::StarterHome => "starter home",
            Self::Igloo => "igloo",
            Self::MushroomCabin => "mushroom cabin",
            Self::Treasure => "treasure",
            Self::ApplyHardmodeLoot => "apply hardmode loot",
            Self::Plants => "plants",
            Self::Traps => "traps",
            Self::SmoothSurfaces => "smooth surfaces",
            Self::FinalizeWalls => "finalize walls",
            Self::Flood => "flood",
            Self::Vines => "vines",
            Self::Grasses => "grasses",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const STANDARD_ORDER: &[Step] = &[
    Step::PlanBiomes,
    Step::InitNoise,
    Step::Terrain,
    Step::Oceans,
    Step::MarbleCave,
    Step::Snow,
    Step::Desert,
    Step::Jungle,
    Step::GlowingMushroom,
    Step::GraniteCave,
    Step::Hive,
    Step::Crimson,
    Step::Corruption,
    Step::SecondaryCrimson,
    Step::SecondaryCorruption,
    Step::ApplyQueuedEvil,
    Step::HardmodeOres,
    Step::Hallow,
    Step::SwapResources,
    Step::AsteroidField,
    Step::GlowingMoss,
    Step::Dungeon,
    Step::Temple,
    Step::DesertTomb,
    Step::BuriedBoat,
    Step::SpiderHall,
    Step::TorchArena,
    Step::Lake,
    Step::StarterHome,
    Step::Igloo,
    Step::MushroomCabin,
    Step::Treasure,
    Step::ApplyHardmodeLoot,
    Step::Plants,
    Step::Traps,
    Step::SmoothSurfaces,
    Step::FinalizeWalls,
    Step::Flood,
    Step::Vines,
    Step::Grasses,
];

pub const HIVE_QUEEN_ORDER: &[Step] = &[
    Step::PlanBiomes,
    Step::InitNoise,
    Step::HexTerrain,
    Step::Oceans,
    Step::MarbleCave,
    Step::Snow,
    Step::Desert,
    Step::Jungle,
    Step::GlowingMushroom,
    Step::GraniteCave,
    Step::Hive,
    Step::Crimson,
    Step::Corruption,
    Step::SecondaryCrimson,
    Step::SecondaryCorruption,
    Step::ApplyQueuedEvil,
    Step::HardmodeOres,
    Step::Hallow,
    Step::SwapResources,
    Step::AsteroidField,
    Step::GlowingMoss,
    Step::Dungeon,
    Step::Temple,
    Step::DesertTomb,
    Step::BuriedBoat,
    Step::SpiderHall,
    Step::TorchArena,
    Step::Lake,
    Step::StarterHome,
    Step::Igloo,
    Step::MushroomCabin,
    Step::Treasure,
    Step::ApplyHardmodeLoot,
    Step::Plants,
    Step::Traps,
    Step::SmoothSurfaces,
    Step::FinalizeWalls,
    Step::Flood,
    Step::Vines,
    Step::Grasses,
];

/// Patchwork worlds take their biomes from the climate fields, so the
/// planned snow and desert columns never run.
pub const PATCHES_ORDER: &[Step] = &[
    Step::InitNoise,
    Step::InitClimate,
    Step::Terrain,
    Step::Oceans,
    Step::MarbleCave,
    Step::Jungle,
    Step::GlowingMushroom,
    Step::GraniteCave,
    Step::Hive,
    Step::Crimson,
    Step::Corruption,
    Step::SecondaryCrimson,
    Step::SecondaryCorruption,
    Step::ApplyQueuedEvil,
    Step::HardmodeOres,
    Step::Hallow,
    Step::SwapResources,
    Step::AsteroidField,
    Step::GlowingMoss,
    Step::Dungeon,
    Step::Temple,
    Step::DesertTomb,
    Step::BuriedBoat,
    Step::SpiderHall,
    Step::TorchArena,
    Step::Lake,
    Step::StarterHome,
    Step::Igloo,
    Step::MushroomCabin,
    Step::Treasure,
    Step::ApplyHardmodeLoot,
    Step::Plants,
    Step::Traps,
    Step::SmoothSurfaces,
    Step::FinalizeWalls,
    Step::Flood,
    Step::Vines,
    Step::Grasses,
];

pub fn ordering(conf: &Config) -> &'static [Step] {
    if conf.world.biomes == BiomeLayout::Patches {
        PATCHES_ORDER
    } else if conf.variation.hive_queen {
        HIVE_QUEEN_ORDER
    } else {
        STANDARD_ORDER
    }
}

/// Shape strategy for the passes that can draw on a hex lattice.
pub fn grain(conf: &Config) -> Grain {
    if conf.variation.hive_queen {
        Grain::Hex(HIVE_GRAIN)
    } else {
        Grain::Pixel
    }
}

/// Steps skipped for this configuration. Depends only on its arguments.
pub fn excluded_steps(conf: &Config, is_crimson: bool) -> BTreeSet<Step> {
    let var = &conf.variation;
    let mut excludes = BTreeSet::new();
    excludes.insert(if is_crimson { Step::Corruption } else { Step::Crimson });
    if !conf.world.home {
        excludes.insert(Step::StarterHome);
    }
    if var.double_trouble {
        excludes.insert(if is_crimson {
            Step::SecondaryCrimson
        } else {
            Step::SecondaryCorruption
        });
    } else {
        excludes.extend([Step::SwapResources, Step::SecondaryCrimson, Step::SecondaryCorruption]);
    }
    if !var.sunken {
        excludes.insert(Step::Flood);
    }
    if var.purity {
        excludes.extend([
            Step::Crimson,
            Step::Corruption,
            Step::SecondaryCrimson,
            Step::SecondaryCorruption,
            Step::Hallow,
        ]);
    }
    if !var.hardmode {
        excludes.extend([Step::HardmodeOres, Step::Hallow]);
    }
    if !var.hardmode_loot {
        excludes.insert(Step::ApplyHardmodeLoot);
    }
    if var.dungeon_size < 0.01 {
        excludes.insert(Step::Dungeon);
    }
    excludes
}

/// The steps that will run, in order.
pub fn planned_steps(conf: &Config, is_crimson: bool) -> Vec<Step> {
    let excludes = excluded_steps(conf, is_crimson);
    ordering(conf)
        .iter()
        .copied()
        .filter(|step| !excludes.contains(step))
        .collect()
}

/// Settle the draws every pass relies on: the evil biome and the ore pairs.
pub fn prepare(rnd: &mut Random, world: &mut World) {
    world.ctx.is_crimson = match world.conf.world.evil {
        Evil::Random => rnd.get_bool(),
        Evil::Crimson => true,
        Evil::Corruption => false,
    };
    world.ctx.ores = OreVariants::roll(rnd, world.conf.variation.hardmode);
    info!(
        "Evil biome: {}",
        if world.ctx.is_crimson { "crimson" } else { "corruption" }
    );
}

pub fn run_step(step: Step, rnd: &mut Random, world: &mut World) {
    let grain = grain(&world.conf);
    match step {
        Step::PlanBiomes => world.plan_biomes(rnd),
        Step::InitNoise => {
            let (width, height) = (world.width() as usize, world.height() as usize);
            rnd.init_noise(width, height, NOISE_SCALE);
        }
        Step::InitClimate => {
            let v = &world.conf.variation;
            let scale = CLIMATE_SCALE / v.patches_size;
            let (humidity, temperature) = (v.patches_humidity, v.patches_temperature);
            rnd.init_climate(world.width() as usize, world.height() as usize, scale, humidity, temperature);
        }
        Step::Terrain => base::gen_world_base(rnd, world),
        Step::HexTerrain => hex_base::gen_hex_terrain(rnd, world),
        Step::Oceans => ocean::gen_oceans(rnd, world),
        Step::MarbleCave => marble_cave::gen_marble_cave(rnd, world, grain),
        Step::Snow => snow::gen_snow(rnd, world),
        Step::Desert => desert::gen_desert(rnd, world),
        Step::Jungle => jungle::gen_jungle(rnd, world),
        Step::GlowingMushroom => glowing_mushroom::gen_glowing_mushroom(rnd, world),
        Step::GraniteCave => granite_cave::gen_granite_cave(rnd, world, grain),
        Step::Hive => hive::gen_hive(rnd, world),
        Step::Crimson => evil::gen_evil(EvilKind::Crimson, rnd, world),
        Step::Corruption => evil::gen_evil(EvilKind::Corruption, rnd, world),
        Step::SecondaryCrimson => evil::gen_secondary_evil(EvilKind::Crimson, rnd, world),
        Step::SecondaryCorruption => evil::gen_secondary_evil(EvilKind::Corruption, rnd, world),
        Step::ApplyQueuedEvil => {
            let queue = std::mem::take(&mut world.queued_evil);
            commands::flush(queue, rnd, world);
        }
        Step::HardmodeOres => hardmode_ores::gen_hardmode_ores(rnd, world),
        Step::Hallow => hallow::gen_hallow(rnd, world),
        Step::SwapResources => swap_resources::swap_resources(rnd, world),
        Step::AsteroidField => asteroid_field::gen_asteroid_field(rnd, world, grain),
        Step::GlowingMoss => glowing_moss::gen_glowing_moss(rnd, world),
        Step::Dungeon => dungeon::gen_dungeon(rnd, world),
        Step::Temple => temple::gen_temple(rnd, world, grain),
        Step::DesertTomb => desert_tomb::gen_desert_tomb(rnd, world),
        Step::BuriedBoat => buried_boat::gen_buried_boat(rnd, world),
        Step::SpiderHall => spider_hall::gen_spider_hall(rnd, world),
        Step::TorchArena => torch_arena::gen_torch_arena(rnd, world),
        Step::Lake => lake::gen_lake(world),
        Step::StarterHome => starter_home::gen_starter_home(rnd, world),
        Step::Igloo => igloo::gen_igloo(rnd, world),
        Step::MushroomCabin => mushroom_cabin::gen_mushroom_cabin(rnd, world),
        Step::Treasure => world.locations = treasure::gen_treasure(rnd, world),
        Step::ApplyHardmodeLoot => hardmode_loot::apply_hardmode_loot(world),
        Step::Plants => {
            let bins = std::mem::take(&mut world.locations);
            plants::gen_plants(&bins, rnd, world);
            world.locations = bins;
        }
        Step::Traps => traps::gen_traps(rnd, world),
        Step::SmoothSurfaces => cleanup::smooth_surfaces(world),
        Step::FinalizeWalls => cleanup::finalize_walls(rnd, world),
        Step::Flood => flood::gen_flood(world),
        Step::Vines => vines::gen_vines(rnd, world),
        Step::Grasses => {
            let bins = std::mem::take(&mut world.locations);
            plants::gen_grasses(&bins, rnd, world);
            world.locations = bins;
        }
    }
}

/// Run the whole pipeline. Returns the steps that ran, in order.
pub fn generate(rnd: &mut Random, world: &mut World) -> Vec<Step> {
    prepare(rnd, world);
    if world.conf.variation.purity {
        world.ctx.surface_evil_center = 0;
    }
    let steps = planned_steps(&world.conf, world.ctx.is_crimson);
    info!(
        "Generating {}x{} world in {} steps",
        world.width(),
        world.height(),
        steps.len()
    );
    for &step in &steps {
        run_step(step, rnd, world);
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_excludes() {
        let conf = Config::default();
        let excludes = excluded_steps(&conf, false);
        assert!(excludes.contains(&Step::Crimson));
        assert!(!excludes.contains(&Step::Corruption));
        assert!(excludes.contains(&Step::SwapResources));
        assert!(excludes.contains(&Step::SecondaryCrimson));
        assert!(excludes.contains(&Step::SecondaryCorruption));
        assert!(excludes.contains(&Step::Flood));
        assert!(excludes.contains(&Step::HardmodeOres));
        assert!(excludes.contains(&Step::Hallow));
        assert!(excludes.contains(&Step::ApplyHardmodeLoot));
    }

    #[test]
    fn test_double_trouble_keeps_the_other_evil() {
        let mut conf = Config::default();
        conf.variation.double_trouble = true;
        let excludes = excluded_steps(&conf, true);
        assert!(excludes.contains(&Step::Corruption));
        assert!(excludes.contains(&Step::SecondaryCrimson));
        assert!(!excludes.contains(&Step::SecondaryCorruption));
        assert!(!excludes.contains(&Step::SwapResources));
    }

    #[test]
    fn test_purity_drops_every_evil() {
        let mut conf = Config::default();
        conf.variation.purity = true;
        conf.variation.hardmode = true;
        conf.variation.double_trouble = true;
        let excludes = excluded_steps(&conf, false);
        for step in [
            Step::Crimson,
            Step::Corruption,
            Step::SecondaryCrimson,
            Step::SecondaryCorruption,
            Step::Hallow,
        ] {
            assert!(excludes.contains(&step), "{} should be skipped", step);
        }
        assert!(!excludes.contains(&Step::HardmodeOres));
    }

    #[test]
    fn test_exclusions_are_repeatable() {
        let mut conf = Config::default();
        conf.variation.sunken = true;
        conf.world.home = false;
        let first = excluded_steps(&conf, true);
        for _ in 0..5 {
            assert_eq!(excluded_steps(&conf, true), first);
        }
        assert!(!first.contains(&Step::Flood));
        assert!(first.contains(&Step::StarterHome));
    }

    #[test]
    fn test_orderings_differ_only_in_terrain() {
        assert_eq!(STANDARD_ORDER.len(), HIVE_QUEEN_ORDER.len());
        for (a, b) in STANDARD_ORDER.iter().zip(HIVE_QUEEN_ORDER) {
            if a != b {
                assert_eq!((*a, *b), (Step::Terrain, Step::HexTerrain));
            }
        }
        let unique: BTreeSet<_> = STANDARD_ORDER.iter().collect();
        assert_eq!(unique.len(), STANDARD_ORDER.len());
    }

    #[test]
    fn test_planned_steps_keep_order() {
        let mut conf = Config::default();
        conf.variation.hive_queen = true;
        let steps = planned_steps(&conf, false);
        assert_eq!(steps[0], Step::PlanBiomes);
        assert_eq!(steps[2], Step::HexTerrain);
        assert_eq!(steps.last(), Some(&Step::Grasses));
        assert!(!steps.contains(&Step::Crimson));
        assert_eq!(grain(&conf), Grain::Hex(HIVE_GRAIN));
    }

    #[test]
    fn test_prepare_honours_fixed_evil() {
        let mut conf = Config::default();
        conf.world.evil = Evil::Crimson;
        conf.world.width = 1000;
        conf.world.height = 600;
        let mut world = World::new(conf);
        let mut rnd = Random::new(7);
        prepare(&mut rnd, &mut world);
        assert!(world.ctx.is_crimson);
        assert_eq!(world.ctx.ores.cobalt, crate::ids::BlockId::EMPTY);
    }

    #[test]
    fn test_patches_order_skips_planned_biomes() {
        let mut conf = Config::default();
        conf.world.biomes = BiomeLayout::Patches;
        conf.variation.hive_queen = true;
        let steps = planned_steps(&conf, false);
        assert_eq!(&steps[..3], &[Step::InitNoise, Step::InitClimate, Step::Terrain]);
        for step in [Step::PlanBiomes, Step::Snow, Step::Desert, Step::HexTerrain] {
            assert!(!steps.contains(&step), "{} should not run", step);
        }
        let pos = |step| steps.iter().position(|s| *s == step).unwrap();
        assert!(pos(Step::Jungle) < pos(Step::GlowingMushroom));
        assert!(pos(Step::GlowingMushroom) < pos(Step::GraniteCave));
        assert!(pos(Step::Dungeon) < pos(Step::Temple));
        // Everything after the biomes matches the standard order.
        let from = STANDARD_ORDER.iter().position(|s| *s == Step::Hive).unwrap();
        let patch_from = PATCHES_ORDER.iter().position(|s| *s == Step::Hive).unwrap();
        assert_eq!(&STANDARD_ORDER[from..], &PATCHES_ORDER[patch_from..]);
    }

    #[test]
    fn test_structure_steps_in_order() {
        let mut conf = Config::default();
        conf.world.home = true;
        let steps = planned_steps(&conf, false);
        let pos = |step| steps.iter().position(|s| *s == step).unwrap();
        let chain = [
            Step::AsteroidField,
            Step::GlowingMoss,
            Step::Dungeon,
            Step::Temple,
            Step::DesertTomb,
            Step::BuriedBoat,
            Step::SpiderHall,
            Step::TorchArena,
            Step::Lake,
            Step::StarterHome,
            Step::Igloo,
            Step::MushroomCabin,
            Step::Treasure,
        ];
        for pair in chain.windows(2) {
            assert_eq!(pos(pair[0]) + 1, pos(pair[1]), "{} then {}", pair[0], pair[1]);
        }
        assert_eq!(pos(Step::Jungle) + 1, pos(Step::GlowingMushroom));
    }

    #[test]
    fn test_tiny_dungeon_is_skipped() {
        let mut conf = Config::default();
        assert!(!excluded_steps(&conf, false).contains(&Step::Dungeon));
        conf.variation.dungeon_size = 0.0;
        assert!(excluded_steps(&conf, false).contains(&Step::Dungeon));
    }

    #[test]
    fn test_traps_follow_plants() {
        let steps = planned_steps(&Config::default(), false);
        let pos = |step| steps.iter().position(|s| *s == step);
        let traps = pos(Step::Traps).unwrap();
        assert!(pos(Step::Treasure).unwrap() < traps);
        assert_eq!(pos(Step::Plants), Some(traps - 1));
        assert_eq!(Step::Traps.to_string(), "traps");
    }
}
