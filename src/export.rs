//! Preview image and JSON summary of a finished world

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::ids::{BlockId, WallId};
use crate::scheduler::Step;
use crate::tile::{Liquid, Tile};
use crate::world::{Levels, World, WorldGenContext};

const SKY_TOP: [u8; 3] = [74, 122, 219];
const SKY_HORIZON: [u8; 3] = [155, 209, 255];
const UNDERGROUND_BG: [u8; 3] = [88, 61, 46];
const CAVERN_BG: [u8; 3] = [74, 67, 60];
const UNDERWORLD_BG: [u8; 3] = [51, 0, 0];
const WALL_SHADE: f32 = 0.55;

fn block_color(block: BlockId) -> [u8; 3] {
    match block {
        BlockId::DIRT => [151, 107, 75],
        BlockId::STONE | BlockId::STALACTITE => [128, 128, 128],
        BlockId::GRASS => [28, 216, 94],
        BlockId::CORRUPT_GRASS => [141, 137, 223],
        BlockId::CRIMSON_GRASS => [208, 80, 80],
        BlockId::HALLOWED_GRASS => [78, 193, 227],
        BlockId::JUNGLE_GRASS | BlockId::CORRUPT_JUNGLE_GRASS | BlockId::CRIMSON_JUNGLE_GRASS => [143, 215, 29],
        BlockId::MUSHROOM_GRASS => [93, 127, 255],
        BlockId::ASH_GRASS => [72, 58, 46],
        BlockId::MUD => [92, 68, 73],
        BlockId::SAND | BlockId::SHELL_PILE => [211, 198, 111],
        BlockId::HARDENED_SAND => [218, 152, 74],
        BlockId::SANDSTONE | BlockId::SANDSTONE_COLUMN => [188, 124, 62],
        BlockId::DESERT_FOSSIL => [162, 128, 94],
        BlockId::EBONSAND | BlockId::HARDENED_EBONSAND | BlockId::EBONSANDSTONE => [103, 98, 122],
        BlockId::CRIMSAND | BlockId::HARDENED_CRIMSAND | BlockId::CRIMSANDSTONE => [135, 56, 54],
        BlockId::PEARLSAND | BlockId::HARDENED_PEARLSAND | BlockId::PEARLSANDSTONE => [238, 225, 218],
        BlockId::EBONSTONE | BlockId::EBONSTONE_BRICK => [109, 90, 128],
        BlockId::CRIMSTONE => [128, 44, 45],
        BlockId::FLESH | BlockId::LESION => [154, 61, 66],
        BlockId::PEARLSTONE => [181, 172, 190],
        BlockId::CRYSTAL_BLOCK => [188, 126, 255],
        BlockId::SNOW | BlockId::SNOW_CLOUD => [211, 236, 241],
        BlockId::ICE | BlockId::THIN_ICE | BlockId::ICE_BRICK => [144, 195, 232],
        BlockId::CORRUPT_ICE => [163, 132, 199],
        BlockId::CRIMSON_ICE => [210, 120, 130],
        BlockId::HALLOWED_ICE => [218, 182, 204],
        BlockId::SLUSH => [113, 144, 168],
        BlockId::SILT => [106, 107, 118],
        BlockId::CLAY => [146, 81, 68],
        BlockId::ASH => [68, 68, 76],
        BlockId::HELLSTONE => [142, 66, 66],
        BlockId::OBSIDIAN | BlockId::OBSIDIAN_BRICK => [92, 68, 115],
        BlockId::MARBLE | BlockId::SMOOTH_MARBLE | BlockId::MARBLE_COLUMN => [168, 178, 204],
        BlockId::GRANITE | BlockId::SMOOTH_GRANITE | BlockId::GRANITE_COLUMN => [50, 46, 104],
        BlockId::HIVE => [227, 125, 22],
        BlockId::HONEY | BlockId::CRISPY_HONEY => [255, 156, 12],
        BlockId::LIHZAHRD_BRICK => [141, 56, 0],
        BlockId::CORALSTONE | BlockId::CORAL => [253, 99, 138],
        BlockId::CLOUD | BlockId::RAIN_CLOUD => [223, 255, 255],
        BlockId::SUNPLATE => [228, 213, 50],
        BlockId::METEORITE => [94, 72, 104],
        BlockId::AETHERIUM => [150, 120, 220],
        BlockId::COPPER_ORE => [150, 67, 22],
        BlockId::TIN_ORE => [187, 165, 124],
        BlockId::IRON_ORE => [140, 101, 80],
        BlockId::LEAD_ORE => [62, 82, 114],
        BlockId::SILVER_ORE => [185, 194, 195],
        BlockId::TUNGSTEN_ORE => [125, 186, 121],
        BlockId::GOLD_ORE => [185, 164, 23],
        BlockId::PLATINUM_ORE => [190, 190, 210],
        BlockId::DEMONITE => [98, 95, 167],
        BlockId::CRIMTANE => [209, 47, 57],
        BlockId::COBALT_ORE => [11, 80, 143],
        BlockId::PALLADIUM_ORE => [234, 98, 62],
        BlockId::MYTHRIL_ORE => [91, 169, 169],
        BlockId::ORICHALCUM_ORE => [226, 122, 222],
        BlockId::ADAMANTITE_ORE => [221, 85, 152],
        BlockId::TITANIUM_ORE => [147, 152, 163],
        BlockId::CHLOROPHYTE_ORE => [36, 193, 86],
        BlockId::TREE | BlockId::PALM_TREE | BlockId::LIVING_WOOD | BlockId::WOOD | BlockId::PALM_WOOD => [151, 107, 75],
        BlockId::ASH_TREE | BlockId::ASH_WOOD => [110, 74, 66],
        BlockId::MUSHROOM_TREE => [182, 175, 130],
        BlockId::LEAF | BlockId::MAHOGANY_LEAF => [26, 196, 84],
        BlockId::RICH_MAHOGANY | BlockId::LIVING_MAHOGANY => [145, 81, 85],
        BlockId::BOREAL_WOOD => [96, 77, 64],
        BlockId::CACTUS_PLANT | BlockId::BAMBOO_STALK => [73, 120, 17],
        BlockId::PLATFORM | BlockId::WOODEN_BEAM => [191, 142, 111],
        BlockId::CHEST | BlockId::CHEST_GROUP2 => [233, 207, 94],
        BlockId::POT => [151, 79, 80],
        BlockId::LIFE_CRYSTAL => [174, 24, 69],
        BlockId::MANA_CRYSTAL => [72, 120, 230],
        BlockId::ALTAR | BlockId::LIHZAHRD_ALTAR => [119, 101, 125],
        BlockId::ORB_HEART => [230, 89, 92],
        BlockId::GREEN_MOSS_STONE => [49, 134, 114],
        BlockId::BROWN_MOSS_STONE => [126, 134, 49],
        BlockId::RED_MOSS_STONE => [134, 59, 49],
        BlockId::BLUE_MOSS_STONE => [43, 86, 140],
        BlockId::PURPLE_MOSS_STONE => [121, 49, 134],
        BlockId::LAVA_MOSS_STONE => [254, 121, 2],
        BlockId::BUBBLE => [190, 230, 255],
        BlockId::SAPPHIRE
        | BlockId::RUBY
        | BlockId::EMERALD
        | BlockId::TOPAZ
        | BlockId::AMETHYST
        | BlockId::DIAMOND
        | BlockId::GEM => [210, 90, 210],
        _ if block.is_solid() => [120, 120, 120],
        // Decorations, vines and other non-solid cells.
        _ => [104, 156, 70],
    }
}

fn wall_color(wall: WallId) -> [u8; 3] {
    let base = match wall {
        WallId::DIRT | WallId::CAVE_DIRT | WallId::ROUGH_DIRT | WallId::LAYERED_DIRT => [88, 61, 46],
        WallId::MUD | WallId::JUNGLE | WallId::LICHEN_STONE | WallId::LEAFY_JUNGLE => [61, 58, 78],
        WallId::SNOW | WallId::ICE => [180, 200, 220],
        WallId::SANDSTONE | WallId::HARDENED_SAND => [173, 118, 62],
        WallId::MARBLE => [168, 178, 204],
        WallId::GRANITE => [50, 46, 104],
        WallId::HIVE => [138, 73, 38],
        WallId::LIHZAHRD_BRICK => [73, 51, 36],
        WallId::EBONSTONE | WallId::CORRUPT_GROWTH | WallId::CORRUPT_MASS => [82, 62, 66],
        WallId::CRIMSTONE | WallId::CRIMSON_CRUST | WallId::CRIMSON_SCAB => [91, 33, 33],
        WallId::HALLOWED_PRISM | WallId::HALLOWED_CAVERN => [94, 88, 124],
        WallId::GRASS | WallId::FLOWER => [30, 80, 48],
        _ => [66, 66, 66],
    };
    shade(base, WALL_SHADE)
}

fn liquid_color(liquid: Liquid) -> Option<[u8; 3]> {
    match liquid {
        Liquid::None => None,
        Liquid::Water => Some([9, 61, 191]),
        Liquid::Lava => Some([253, 32, 3]),
        Liquid::Honey => Some([254, 193, 20]),
        Liquid::Shimmer => Some([200, 160, 240]),
    }
}

fn shade(c: [u8; 3], f: f32) -> [u8; 3] {
    [
        (c[0] as f32 * f) as u8,
        (c[1] as f32 * f) as u8,
        (c[2] as f32 * f) as u8,
    ]
}

fn lerp_color(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t) as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t) as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t) as u8,
    ]
}

/// Backdrop behind an empty, wall-less cell.
fn background_color(y: i32, levels: &Levels) -> [u8; 3] {
    if y < levels.underground {
        lerp_color(SKY_TOP, SKY_HORIZON, y as f32 / levels.underground.max(1) as f32)
    } else if y < levels.cavern {
        UNDERGROUND_BG
    } else if y < levels.underworld {
        CAVERN_BG
    } else {
        UNDERWORLD_BG
    }
}

/// Preview colour of one tile: block first, then liquid, then wall.
pub fn tile_color(tile: &Tile, y: i32, levels: &Levels) -> [u8; 3] {
    if !tile.is_empty() && !tile.actuated() {
        return block_color(tile.block);
    }
    if let Some(color) = liquid_color(tile.liquid) {
        return color;
    }
    if tile.wall != WallId::EMPTY {
        return wall_color(tile.wall);
    }
    background_color(y, levels)
}

/// One pixel per tile.
pub fn render_preview(world: &World) -> RgbImage {
    let levels = world.levels();
    let columns = world.par_collect_columns(|w, x| {
        let column: Vec<[u8; 3]> = (0..levels.height)
            .map(|y| tile_color(w.tile(x, y), y, &levels))
            .collect();
        vec![column]
    });
    let mut img: RgbImage = ImageBuffer::new(levels.width as u32, levels.height as u32);
    for (x, column) in columns.into_iter().enumerate() {
        for (y, color) in column.into_iter().enumerate() {
            img.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
    img
}

pub fn export_preview(world: &World, path: &Path) -> Result<()> {
    render_preview(world).save(path)?;
    info!("Wrote preview {}", path.display());
    Ok(())
}

/// Machine-readable description of a generated world.
#[derive(Debug, Serialize)]
pub struct WorldSummary<'a> {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub levels: Levels,
    pub evil: &'static str,
    pub hive_queen: bool,
    pub hardmode: bool,
    pub context: &'a WorldGenContext,
    pub steps: Vec<&'static str>,
    pub chests: usize,
}

pub fn summarize<'a>(world: &'a World, seed: u64, steps: &[Step]) -> WorldSummary<'a> {
    let evil = if world.conf.variation.purity {
        "none"
    } else if world.ctx.is_crimson {
        "crimson"
    } else {
        "corruption"
    };
    WorldSummary {
        seed,
        width: world.width(),
        height: world.height(),
        levels: world.levels(),
        evil,
        hive_queen: world.conf.variation.hive_queen,
        hardmode: world.conf.variation.hardmode,
        context: &world.ctx,
        steps: steps.iter().map(|s| s.name()).collect(),
        chests: world.chests().len(),
    }
}

pub fn export_summary(summary: &WorldSummary<'_>, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, summary)?;
    writeln!(out)?;
    out.flush()?;
    info!("Wrote summary {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    #[test]
    fn test_sky_fades_toward_horizon() {
        let levels = Levels::new(1000, 600);
        let top = tile_color(&Tile::AIR, 0, &levels);
        let low = tile_color(&Tile::AIR, levels.underground - 1, &levels);
        assert_eq!(top, SKY_TOP);
        assert!(low[1] > top[1]);
        assert_eq!(tile_color(&Tile::AIR, levels.underworld + 1, &levels), UNDERWORLD_BG);
    }

    #[test]
    fn test_layers_draw_in_order() {
        let levels = Levels::new(1000, 600);
        let mut tile = Tile::AIR;
        tile.wall = WallId::DIRT;
        tile.liquid = Liquid::Water;
        assert_eq!(tile_color(&tile, 300, &levels), [9, 61, 191]);
        tile.liquid = Liquid::None;
        assert_eq!(tile_color(&tile, 300, &levels), shade([88, 61, 46], WALL_SHADE));
        tile.block = BlockId::STONE;
        assert_eq!(tile_color(&tile, 300, &levels), [128, 128, 128]);
    }

    #[test]
    fn test_preview_matches_world() {
        let mut world = test_world(40, 30);
        world.tile_mut(3, 7).block = BlockId::DIRT;
        let img = render_preview(&world);
        assert_eq!(img.dimensions(), (40, 30));
        assert_eq!(img.get_pixel(3, 7).0, [151, 107, 75]);
    }

    #[test]
    fn test_summary_lists_steps() {
        let mut world = test_world(40, 30);
        world.ctx.is_crimson = true;
        let summary = summarize(&world, 42, &[Step::PlanBiomes, Step::Crimson]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["evil"], "crimson");
        assert_eq!(json["steps"][1], "crimson");
        assert_eq!(json["chests"], 0);
        assert!(json["context"]["ores"].is_object());
    }
}
