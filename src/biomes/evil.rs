//! Corruption and crimson
//!
//! Both evils run the same template with a different `EvilPalette`:
//!
//! 1. a chasm band carved down from the surface source,
//! 2. a radial spread around a surface source and an underground source,
//!    where the inner core becomes tendril blocks (with ore at the centre of
//!    each tendril) and the outer ring converts blocks and walls through
//!    the palette tables,
//! 3. queued follow-ups: the source core is re-converted once every evil
//!    has been placed, and tendrils left floating in the sky are removed.

use std::collections::HashMap;

use log::{debug, info};

use crate::commands::Command;
use crate::ids::{wall_variants, BlockId, PaintId, WallId};
use crate::point::Point;
use crate::random::{hash_point, NoiseField, Random};
use crate::tile::TileFlags;
use crate::world::{World, WorldView};

use super::carve_columns;

/// Width of the band either side of a source, as a fraction of world width.
const SCAN_FRACTION: f64 = 0.08;
/// Outer spread ring: `1 - sqrt(OUTER_FALLOFF * d / scale)`.
const OUTER_FALLOFF: f64 = 18.0;
/// Inner tendril core: `1 - (INNER_FALLOFF * d / scale) ^ exponent`.
const INNER_FALLOFF: f64 = 21.0;
/// Noise margin between a chasm's open interior and its stone lining.
const CHASM_LINING: f64 = 0.07;
/// Radius of the queued core conversion, as a fraction of the scan band.
const CORE_FRACTION: f64 = 0.25;
/// Draws allowed when placing the second evil away from the first.
const SECONDARY_TRIES: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvilKind {
    Corruption,
    Crimson,
}

impl EvilKind {
    pub fn palette(self) -> &'static EvilPalette {
        match self {
            Self::Corruption => &CORRUPTION,
            Self::Crimson => &CRIMSON,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Corruption => Self::Crimson,
            Self::Crimson => Self::Corruption,
        }
    }
}

impl std::fmt::Display for EvilKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corruption => write!(f, "corruption"),
            Self::Crimson => write!(f, "crimson"),
        }
    }
}

/// Which noise field shapes an evil.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvilField {
    /// Ragged: coarse noise, chasms stretched 3x horizontally.
    Coarse,
    /// Smooth: blurred noise, tunnels sampled at double resolution.
    Blur,
}

impl EvilField {
    fn spread(self, noise: &NoiseField, x: i32, y: i32) -> f64 {
        match self {
            Self::Coarse => noise.coarse(x, y),
            Self::Blur => noise.blur(x, y),
        }
    }

    fn chasm(self, noise: &NoiseField, x: i32, y: i32) -> f64 {
        match self {
            Self::Coarse => noise.coarse(3 * x, y),
            Self::Blur => noise.blur(2 * x, 2 * y),
        }
    }
}

/// Conversion tables and shaping constants of one evil.
#[derive(Debug)]
pub struct EvilPalette {
    pub stone: BlockId,
    pub grass: BlockId,
    pub jungle_grass: BlockId,
    pub sand: BlockId,
    pub ice: BlockId,
    pub sandstone: BlockId,
    pub hardened_sand: BlockId,
    /// Block the spread core is built from.
    pub tendril: BlockId,
    /// Ore at the centre of deep tendrils.
    pub ore: BlockId,
    pub tendril_wall: WallId,
    pub grass_wall: WallId,
    pub sandstone_wall: WallId,
    pub hardened_sand_wall: WallId,
    pub walls: &'static [WallId],
    /// Applied to living wood instead of converting it.
    pub paint: PaintId,
    pub field: EvilField,
    pub core_exponent: f64,
    pub core_margin: f64,
    /// Blocks the chasm lining leaves alone.
    pub lining_skips: &'static [BlockId],
}

pub static CORRUPTION: EvilPalette = EvilPalette {
    stone: BlockId::EBONSTONE,
    grass: BlockId::CORRUPT_GRASS,
    jungle_grass: BlockId::CORRUPT_JUNGLE_GRASS,
    sand: BlockId::EBONSAND,
    ice: BlockId::CORRUPT_ICE,
    sandstone: BlockId::EBONSANDSTONE,
    hardened_sand: BlockId::HARDENED_EBONSAND,
    tendril: BlockId::LESION,
    ore: BlockId::DEMONITE,
    tendril_wall: WallId::CORRUPT_TENDRIL,
    grass_wall: WallId::CORRUPT_GRASS,
    sandstone_wall: WallId::EBONSANDSTONE,
    hardened_sand_wall: WallId::HARDENED_EBONSAND,
    walls: &wall_variants::CORRUPTION,
    paint: PaintId::PURPLE,
    field: EvilField::Coarse,
    core_exponent: 0.04,
    core_margin: 0.065,
    lining_skips: &[BlockId::EMPTY],
};

pub static CRIMSON: EvilPalette = EvilPalette {
    stone: BlockId::CRIMSTONE,
    grass: BlockId::CRIMSON_GRASS,
    jungle_grass: BlockId::CRIMSON_JUNGLE_GRASS,
    sand: BlockId::CRIMSAND,
    ice: BlockId::CRIMSON_ICE,
    sandstone: BlockId::CRIMSANDSTONE,
    hardened_sand: BlockId::HARDENED_CRIMSAND,
    tendril: BlockId::FLESH,
    ore: BlockId::CRIMTANE,
    tendril_wall: WallId::CRIMSON_BLISTER,
    grass_wall: WallId::CRIMSON_GRASS,
    sandstone_wall: WallId::CRIMSANDSTONE,
    hardened_sand_wall: WallId::HARDENED_CRIMSAND,
    walls: &wall_variants::CRIMSON,
    paint: PaintId::GRAY,
    field: EvilField::Blur,
    core_exponent: 0.028,
    core_margin: 0.045,
    lining_skips: &[
        BlockId::EMPTY,
        BlockId::IRON_ORE,
        BlockId::LEAD_ORE,
        BlockId::SILVER_ORE,
        BlockId::TUNGSTEN_ORE,
    ],
};

impl EvilPalette {
    /// Outer-ring block conversion. Ore targets only apply when `deep`.
    pub fn spread_block(&self, block: BlockId, deep: bool) -> Option<BlockId> {
        let target = match block {
            BlockId::STONE
            | BlockId::IRON_ORE
            | BlockId::LEAD_ORE
            | BlockId::HIVE
            | BlockId::SILT
            | BlockId::SLUSH => self.stone,
            BlockId::GRASS => self.grass,
            BlockId::SILVER_ORE
            | BlockId::TUNGSTEN_ORE
            | BlockId::GOLD_ORE
            | BlockId::PLATINUM_ORE => self.ore,
            BlockId::LEAF | BlockId::MAHOGANY_LEAF => BlockId::EMPTY,
            BlockId::SAND => self.sand,
            BlockId::JUNGLE_GRASS | BlockId::MUSHROOM_GRASS => self.jungle_grass,
            BlockId::ICE => self.ice,
            BlockId::SANDSTONE => self.sandstone,
            BlockId::HARDENED_SAND => self.hardened_sand,
            _ => return None,
        };
        (deep || target != self.ore).then_some(target)
    }

    /// Same block in this palette for a block of `other`'s palette.
    pub fn counterpart(&self, other: &EvilPalette, block: BlockId) -> Option<BlockId> {
        [
            (other.stone, self.stone),
            (other.grass, self.grass),
            (other.jungle_grass, self.jungle_grass),
            (other.sand, self.sand),
            (other.ice, self.ice),
            (other.sandstone, self.sandstone),
            (other.hardened_sand, self.hardened_sand),
            (other.tendril, self.tendril),
            (other.ore, self.ore),
        ]
        .into_iter()
        .find(|(from, _)| *from == block)
        .map(|(_, to)| to)
    }

    /// Outer-ring wall conversion. Natural dirt, stone, jungle, snow, ice,
    /// mushroom, marble and granite walls each map to one palette wall
    /// drawn per call.
    pub fn wall_table(&self, rnd: &mut Random) -> HashMap<WallId, WallId> {
        let mut table = HashMap::from([
            (WallId::LIVING_LEAF, WallId::EMPTY),
            (WallId::GRASS, self.grass_wall),
            (WallId::FLOWER, self.grass_wall),
            (WallId::JUNGLE, self.grass_wall),
            (WallId::SANDSTONE, self.sandstone_wall),
            (WallId::HARDENED_SAND, self.hardened_sand_wall),
        ]);
        let natural = wall_variants::DIRT
            .iter()
            .chain(wall_variants::STONE.iter())
            .chain(wall_variants::JUNGLE.iter())
            .chain(
                [
                    WallId::SNOW,
                    WallId::ICE,
                    WallId::MUSHROOM,
                    WallId::MARBLE,
                    WallId::GRANITE,
                ]
                .iter(),
            );
        for wall in natural {
            table.insert(*wall, rnd.select(self.walls));
        }
        table
    }

    fn is_evil_block(&self, block: BlockId) -> bool {
        [
            self.stone,
            self.grass,
            self.jungle_grass,
            self.sand,
            self.ice,
            self.sandstone,
            self.hardened_sand,
            self.tendril,
        ]
        .contains(&block)
    }
}

/// True for any block placed by either evil.
pub fn is_evil_block(block: BlockId) -> bool {
    CORRUPTION.is_evil_block(block) || CRIMSON.is_evil_block(block)
}

// =============================================================================
// Template
// =============================================================================

/// One source of radial spread.
#[derive(Clone, Copy, Debug)]
struct Spread {
    source: Point,
    scan: i32,
    scale: f64,
}

/// Convert the disc around one source, column by column in parallel.
fn apply_spread(
    spread: Spread,
    palette: &'static EvilPalette,
    walls: &HashMap<WallId, WallId>,
    noise: &NoiseField,
    world: &mut World,
) {
    let Spread { source, scan, scale } = spread;
    carve_columns(world, source.x - scan..source.x + scan, |view: &WorldView<'_>, col| {
        let x = col.x;
        let levels = view.levels;
        for y in (source.y - scan).max(0)..source.y + scan {
            let dist = f64::from(x - source.x).hypot(f64::from(y - source.y));
            let n = palette.field.spread(noise, x, y).abs();
            if n >= 1.0 - (OUTER_FALLOFF * dist / scale).sqrt() {
                continue;
            }
            let core = 1.0 - (INNER_FALLOFF * dist / scale).powf(palette.core_exponent);
            let tile = col.tile(y);
            if n < core {
                tile.block = if n < core - palette.core_margin {
                    if y > levels.underground {
                        palette.ore
                    } else {
                        palette.stone
                    }
                } else {
                    palette.tendril
                };
                if !tile.wall.is_empty() {
                    tile.wall = palette.tendril_wall;
                }
                tile.flags.set(TileFlags::ECHO_COAT_BLOCK, false);
                continue;
            }
            if let Some(block) = palette.spread_block(tile.block, y > levels.underground) {
                tile.block = block;
            } else if tile.block == BlockId::LIVING_WOOD || tile.block == BlockId::LIVING_MAHOGANY {
                tile.block_paint = palette.paint;
            } else if tile.block == BlockId::ASH
                && f64::from(y) < f64::from(levels.underworld) + 10.0 * noise.fine(x, y) - 20.0
            {
                tile.block = palette.stone;
            }
            if let Some(&wall) = walls.get(&tile.wall) {
                tile.wall = wall;
            } else if tile.wall == WallId::LIVING_WOOD {
                tile.wall_paint = palette.paint;
            }
        }
    });
}

/// Carve the chasm band below the surface source.
fn carve_chasm(surface_x: i32, scan: i32, scale: f64, palette: &EvilPalette, noise: &NoiseField, world: &mut World) {
    let levels = world.levels();
    let max_y = levels.cavern;
    let min_y = (0.45 * f64::from(levels.underground)) as i32;
    for x in (surface_x - scan).max(0)..(surface_x + scan).min(levels.width) {
        for y in min_y..max_y {
            let threshold = (2.0 - 50.0 * f64::from((x - surface_x).abs()) / scale)
                .min(0.01 * f64::from(max_y - y))
                .min(0.16);
            let n = (palette.field.chasm(noise, x, y) + 0.1).abs();
            if n >= threshold {
                continue;
            }
            let tile = world.tile_mut(x, y);
            let skip = matches!(
                tile.block,
                BlockId::LIVING_WOOD | BlockId::LEAF | BlockId::LIVING_MAHOGANY | BlockId::MAHOGANY_LEAF
            ) || tile.wall == WallId::LIVING_WOOD;
            if skip {
                continue;
            }
            if n < threshold - CHASM_LINING {
                tile.block = BlockId::EMPTY;
            } else if !palette.lining_skips.contains(&tile.block) {
                tile.block = palette.stone;
            }
        }
    }
}

/// Shared scale of the spread falloff.
fn spread_scale(world: &World) -> f64 {
    let w = f64::from(world.width());
    let h = f64::from(world.height());
    world.conf.variation.evil_size * (w + 3.5 * h) / 2.0
}

fn scan_distance(world: &World) -> i32 {
    (world.conf.variation.evil_size * SCAN_FRACTION * f64::from(world.width())) as i32
}

/// Draw surface and underground source columns. The surface source keeps
/// away from the middle of the map where spawn is.
fn select_locations(rnd: &mut Random, world: &World) -> (i32, i32) {
    let width = f64::from(world.width());
    let mut surface_x = (width * rnd.get_double(0.12, 0.39)) as i32;
    if rnd.get_bool() {
        surface_x = world.width() - surface_x;
    }
    let underground_x = if world.conf.variation.hive_queen {
        let x = (width * rnd.get_double(0.08, 0.42)) as i32;
        if rnd.get_bool() {
            world.width() - x
        } else {
            x
        }
    } else {
        (width * rnd.get_double(0.08, 0.92)) as i32
    };
    (surface_x, underground_x)
}

/// Build one evil with its surface source at `surface_x`.
pub fn gen_evil_at(kind: EvilKind, surface_x: i32, underground_x: i32, rnd: &mut Random, world: &mut World) {
    let palette = kind.palette();
    let levels = world.levels();
    let surface_y = rnd.get_int(
        (0.95 * f64::from(levels.underground)) as i32,
        (2 * levels.underground + levels.cavern) / 3,
    );
    let scan = scan_distance(world);
    let walls = palette.wall_table(rnd);
    let scale = spread_scale(world);

    carve_chasm(surface_x, scan, scale, palette, &rnd.noise, world);
    let surface = Point::new(surface_x, surface_y);
    apply_spread(Spread { source: surface, scan, scale }, palette, &walls, &rnd.noise, world);
    let underground_y = rnd.get_int((2 * levels.cavern + levels.underworld) / 3, levels.underworld);
    let underground = Point::new(underground_x, underground_y);
    apply_spread(Spread { source: underground, scan, scale }, palette, &walls, &rnd.noise, world);

    world.queued_evil.push(Command::ConvertEvilRegion {
        center: surface,
        radius: (CORE_FRACTION * f64::from(scan)) as i32,
        palette: kind,
    });
    world.queued_evil.push(Command::TrimFloatingTendrils {
        palette: kind,
        x_range: (surface_x - scan, surface_x + scan),
    });
}

/// Primary evil step.
pub fn gen_evil(kind: EvilKind, rnd: &mut Random, world: &mut World) {
    info!("{}", match kind {
        EvilKind::Corruption => "Corrupting the world",
        EvilKind::Crimson => "Infecting the world",
    });
    rnd.shuffle_noise();
    let (surface_x, underground_x) = select_locations(rnd, world);
    world.ctx.surface_evil_center = surface_x;
    gen_evil_at(kind, surface_x, underground_x, rnd, world);
}

/// Second evil of a double trouble world. Its surface source keeps a scan
/// band away from the first, and its underground source must sit in a
/// column band with no evil at mid-cavern depth.
pub fn gen_secondary_evil(kind: EvilKind, rnd: &mut Random, world: &mut World) {
    info!("Spreading a second evil ({})", kind);
    rnd.shuffle_noise();
    let width = world.width();
    let scan = (SCAN_FRACTION * f64::from(width)) as i32;
    let center = world.ctx.surface_evil_center;

    let surface_x = (0..SECONDARY_TRIES)
        .map(|_| {
            let x = (f64::from(width) * rnd.get_double(0.12, 0.39)) as i32;
            if rnd.get_bool() {
                width - x
            } else {
                x
            }
        })
        .find(|x| (x - center).abs() >= scan);
    let Some(surface_x) = surface_x else {
        debug!("No room for a second {} surface", kind);
        return;
    };

    let levels = world.levels();
    let row = (levels.cavern + levels.underworld) / 2;
    for _ in 0..SECONDARY_TRIES {
        let underground_x = (f64::from(width) * rnd.get_double(0.08, 0.92)) as i32;
        let clear = world.region_passes(underground_x - scan, row, 2 * scan, 1, |tile| {
            !is_evil_block(tile.block)
        });
        if clear {
            gen_evil_at(kind, surface_x, underground_x, rnd, world);
            return;
        }
    }
    debug!("No clear cavern band for a second {}", kind);
}

// =============================================================================
// Queued follow-ups
// =============================================================================

/// Fully convert the disc around `center` to `kind`, including blocks the
/// other evil placed there.
pub fn convert_region(center: Point, radius: i32, kind: EvilKind, world: &mut World) {
    let palette = kind.palette();
    let other = kind.other().palette();
    let underground = world.underground_level();
    for x in center.x - radius..=center.x + radius {
        for y in center.y - radius..=center.y + radius {
            let pt = Point::new(x, y);
            if pt.distance(center) > f64::from(radius) {
                continue;
            }
            let tile = world.tile_mut(x, y);
            if tile.guarded {
                continue;
            }
            if let Some(block) = palette
                .counterpart(other, tile.block)
                .or_else(|| palette.spread_block(tile.block, y > underground))
            {
                tile.block = block;
            }
            if other.walls.contains(&tile.wall) {
                let pick = hash_point(x, y) as usize % palette.walls.len();
                tile.wall = palette.walls[pick];
            } else if tile.wall == other.tendril_wall {
                tile.wall = palette.tendril_wall;
            } else if tile.wall == other.grass_wall {
                tile.wall = palette.grass_wall;
            }
        }
    }
}

/// Clear tendril blocks floating in the sky above a surface source. Rows are
/// scanned upwards from just above the underground level; once a row holds
/// no tendril, every tendril above it is removed.
pub fn trim_floating_tendrils(kind: EvilKind, x_range: (i32, i32), world: &mut World) {
    let tendril = kind.palette().tendril;
    let mut clear_floating = false;
    let top = (0.8 * f64::from(world.underground_level())) as i32;
    for y in (1..=top).rev() {
        let mut found = false;
        for x in x_range.0..x_range.1 {
            let tile = world.tile_mut(x, y);
            if tile.block == tendril {
                if clear_floating {
                    tile.block = BlockId::EMPTY;
                } else {
                    found = true;
                    break;
                }
            }
        }
        if !found {
            clear_floating = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::world::test_world;

    fn stone_world(width: i32, height: i32, surface: i32) -> World {
        let mut world = test_world(width, height);
        for pt in Rect::new(0, surface, width, height - surface).points() {
            let tile = world.tile_at_mut(pt);
            tile.block = BlockId::STONE;
            tile.wall = WallId::DIRT;
        }
        world
    }

    #[test]
    fn test_palettes_differ_only_in_data() {
        assert_eq!(EvilKind::Corruption.palette().tendril, BlockId::LESION);
        assert_eq!(EvilKind::Crimson.palette().ore, BlockId::CRIMTANE);
        assert_eq!(
            CRIMSON.counterpart(&CORRUPTION, BlockId::EBONSAND),
            Some(BlockId::CRIMSAND)
        );
        assert_eq!(CORRUPTION.spread_block(BlockId::GOLD_ORE, false), None);
        assert_eq!(
            CORRUPTION.spread_block(BlockId::GOLD_ORE, true),
            Some(BlockId::DEMONITE)
        );
        assert_eq!(CORRUPTION.spread_block(BlockId::LEAF, false), Some(BlockId::EMPTY));
    }

    #[test]
    fn test_wall_table_uses_palette_family() {
        let mut rnd = Random::new(3);
        let table = CRIMSON.wall_table(&mut rnd);
        assert_eq!(table[&WallId::FLOWER], WallId::CRIMSON_GRASS);
        assert!(wall_variants::CRIMSON.contains(&table[&WallId::ROCKY_DIRT]));
        assert!(wall_variants::CRIMSON.contains(&table[&WallId::MARBLE]));
    }

    #[test]
    fn test_trim_floating_tendrils() {
        let mut world = test_world(200, 120);
        let top = (0.8 * f64::from(world.underground_level())) as i32;
        for y in top - 6..=top {
            world.tile_mut(50, y).block = BlockId::LESION;
        }
        world.tile_mut(60, 5).block = BlockId::LESION;
        world.tile_mut(150, 5).block = BlockId::LESION;
        trim_floating_tendrils(EvilKind::Corruption, (0, 100), &mut world);
        assert_eq!(world.tile(50, top - 6).block, BlockId::LESION);
        assert!(world.tile(60, 5).is_empty());
        // Outside the scanned columns.
        assert_eq!(world.tile(150, 5).block, BlockId::LESION);
    }

    #[test]
    fn test_convert_region_takes_over_other_evil() {
        let mut world = stone_world(100, 100, 0);
        world.tile_mut(50, 52).block = BlockId::EBONSTONE;
        world.tile_mut(50, 53).wall = WallId::CORRUPT_GROWTH;
        world.tile_mut(51, 50).guarded = true;
        convert_region(Point::new(50, 50), 5, EvilKind::Crimson, &mut world);
        assert_eq!(world.tile(50, 50).block, BlockId::CRIMSTONE);
        assert_eq!(world.tile(50, 52).block, BlockId::CRIMSTONE);
        assert!(wall_variants::CRIMSON.contains(&world.tile(50, 53).wall));
        assert_eq!(world.tile(51, 50).block, BlockId::STONE);
        assert_eq!(world.tile(50, 56).block, BlockId::STONE);
    }

    #[test]
    fn test_gen_evil_converts_and_queues() {
        let mut world = stone_world(1000, 600, 150);
        let mut rnd = Random::new(21);
        rnd.noise = NoiseField::from_fn(1000, 600, |x, y| {
            (0.05 * f64::from(x)).sin() * (0.07 * f64::from(y)).cos()
        });
        gen_evil(EvilKind::Corruption, &mut rnd, &mut world);
        let center = world.ctx.surface_evil_center;
        assert!(center >= 120 && center <= 880);
        let converted = Rect::new(0, 0, 1000, 600)
            .points()
            .filter(|pt| world.tile_at(*pt).block == BlockId::EBONSTONE)
            .count();
        assert!(converted > 0);
        assert_eq!(world.queued_evil.len(), 2);
        assert_eq!(world.queued_evil[1].name(), "trim floating tendrils");
    }

    #[test]
    fn test_secondary_evil_keeps_its_distance() {
        let mut world = stone_world(1000, 600, 150);
        let mut rnd = Random::new(5);
        rnd.noise = NoiseField::from_fn(1000, 600, |x, y| (0.03 * f64::from(x + y)).sin());
        gen_evil(EvilKind::Crimson, &mut rnd, &mut world);
        let first = world.ctx.surface_evil_center;
        gen_secondary_evil(EvilKind::Corruption, &mut rnd, &mut world);
        assert_eq!(world.ctx.surface_evil_center, first);
        let Some(Command::ConvertEvilRegion { center, palette, .. }) = world.queued_evil.get(2) else {
            panic!("second evil was not placed");
        };
        assert_eq!(*palette, EvilKind::Corruption);
        assert!((center.x - first).abs() >= 80);
    }
}
