//! Tile grid and shared generation state
//!
//! `World` owns the column-major tile array (`tiles[y + x * height]`), the
//! optional per-tile biome map, the per-column surface cache, registered
//! chests, the deferred command queues and the `WorldGenContext` scalars
//! that early passes publish for later ones.
//!
//! Out-of-range reads return `Tile::AIR`; out-of-range writes land on a
//! scratch tile that no in-range coordinate ever reads.

use std::collections::HashMap;

use log::info;
use serde::Serialize;

use crate::bins::LocationBins;
use crate::commands::Command;
use crate::config::Config;
use crate::framing::{self, Variant};
use crate::ids::{BlockId, WallId};
use crate::parallel;
use crate::point::{Point, Rect};
use crate::random::Random;
use crate::tile::{Chest, Slope, Tile};
use crate::tile_buffer::TileBuffer;

// =============================================================================
// Levels and biome data
// =============================================================================

/// World dimensions and the fixed depth boundaries derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Levels {
    pub width: i32,
    pub height: i32,
    pub underground: i32,
    pub cavern: i32,
    pub underworld: i32,
}

impl Levels {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            underground: (0.28 * f64::from(height)) as i32,
            cavern: (0.41 * f64::from(height)) as i32,
            underworld: height - 230,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }
}

/// Major biome a tile belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Biome {
    #[default]
    Forest,
    Snow,
    Desert,
    Jungle,
    Underworld,
}

impl Biome {
    pub fn all() -> &'static [Self] {
        &[Self::Forest, Self::Snow, Self::Desert, Self::Jungle, Self::Underworld]
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forest => write!(f, "forest"),
            Self::Snow => write!(f, "snow"),
            Self::Desert => write!(f, "desert"),
            Self::Jungle => write!(f, "jungle"),
            Self::Underworld => write!(f, "underworld"),
        }
    }
}

/// Blend weights of every biome at one tile, plus the dominant one.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BiomeData {
    pub active: Biome,
    pub forest: f32,
    pub snow: f32,
    pub desert: f32,
    pub jungle: f32,
    pub underworld: f32,
}

impl BiomeData {
    /// Full weight on a single biome.
    pub fn pure(biome: Biome) -> Self {
        let mut data = Self {
            active: biome,
            ..Self::default()
        };
        *data.weight_mut(biome) = 1.0;
        data
    }

    pub fn weight(&self, biome: Biome) -> f32 {
        match biome {
            Biome::Forest => self.forest,
            Biome::Snow => self.snow,
            Biome::Desert => self.desert,
            Biome::Jungle => self.jungle,
            Biome::Underworld => self.underworld,
        }
    }

    pub fn weight_mut(&mut self, biome: Biome) -> &mut f32 {
        match biome {
            Biome::Forest => &mut self.forest,
            Biome::Snow => &mut self.snow,
            Biome::Desert => &mut self.desert,
            Biome::Jungle => &mut self.jungle,
            Biome::Underworld => &mut self.underworld,
        }
    }
}

// =============================================================================
// Generation context
// =============================================================================

/// Which ore of each interchangeable pair the world uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OreVariants {
    pub copper: BlockId,
    pub iron: BlockId,
    pub silver: BlockId,
    pub gold: BlockId,
    /// Hardmode tiers are `EMPTY` unless the world starts in hardmode.
    pub cobalt: BlockId,
    pub mythril: BlockId,
    pub adamantite: BlockId,
}

impl Default for OreVariants {
    fn default() -> Self {
        Self {
            copper: BlockId::COPPER_ORE,
            iron: BlockId::IRON_ORE,
            silver: BlockId::SILVER_ORE,
            gold: BlockId::GOLD_ORE,
            cobalt: BlockId::EMPTY,
            mythril: BlockId::EMPTY,
            adamantite: BlockId::EMPTY,
        }
    }
}

impl OreVariants {
    /// Draw every pair. Hardmode tiers only when `hardmode` is set.
    pub fn roll(rnd: &mut Random, hardmode: bool) -> Self {
        let mut ores = Self {
            copper: rnd.select(&[BlockId::COPPER_ORE, BlockId::TIN_ORE]),
            iron: rnd.select(&[BlockId::IRON_ORE, BlockId::LEAD_ORE]),
            silver: rnd.select(&[BlockId::SILVER_ORE, BlockId::TUNGSTEN_ORE]),
            gold: rnd.select(&[BlockId::GOLD_ORE, BlockId::PLATINUM_ORE]),
            ..Self::default()
        };
        if hardmode {
            ores.cobalt = rnd.select(&[BlockId::COBALT_ORE, BlockId::PALLADIUM_ORE]);
            ores.mythril = rnd.select(&[BlockId::MYTHRIL_ORE, BlockId::ORICHALCUM_ORE]);
            ores.adamantite = rnd.select(&[BlockId::ADAMANTITE_ORE, BlockId::TITANIUM_ORE]);
        }
        ores
    }
}

/// Scalars published by one pass and read by later ones.
///
/// Ownership by convention:
/// - `plan_biomes` writes the three biome centres; with the patchwork
///   layout the terrain pass writes them instead.
/// - the terrain pass writes `spawn`.
/// - the evil pass writes `surface_evil_center`.
/// - the ocean pass writes `ocean_cave_center`.
/// - the dungeon pass writes `dungeon`.
/// - the temple, hive and glowing mushroom passes append their locations.
///
/// Nothing downstream overwrites a field it does not own.
#[derive(Clone, Debug, Default, Serialize)]
pub struct WorldGenContext {
    pub is_crimson: bool,
    pub ores: OreVariants,
    pub spawn: Point,
    pub desert_center: f64,
    pub jungle_center: f64,
    pub snow_center: f64,
    pub surface_evil_center: i32,
    /// Column of the ocean cave, near one edge.
    pub ocean_cave_center: i32,
    pub temple: Option<Rect>,
    pub hives: Vec<Point>,
    /// Entrance of the dungeon at the surface.
    pub dungeon: Option<Point>,
    pub mushroom_centers: Vec<Point>,
}

/// How `place_buffer` merges a stamp into the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Blend {
    /// Copy whole tiles; an absent stamp wall keeps the existing wall.
    #[default]
    Normal,
    /// Copy only non-empty blocks; walls and liquids are untouched.
    BlockOnly,
}

// =============================================================================
// Parallel column access
// =============================================================================

/// Read-only state handed to every column of a parallel region.
pub struct WorldView<'a> {
    pub levels: Levels,
    pub conf: &'a Config,
    pub ctx: &'a WorldGenContext,
    surface: &'a [i32],
}

impl WorldView<'_> {
    pub fn surface(&self, x: i32) -> i32 {
        wrapped_surface(self.surface, x)
    }
}

/// Exclusive access to one column of tiles and biome data.
pub struct ColumnMut<'a> {
    pub x: i32,
    tiles: &'a mut [Tile],
    biomes: &'a mut [BiomeData],
    scratch: Tile,
    scratch_biome: BiomeData,
}

impl ColumnMut<'_> {
    pub fn height(&self) -> i32 {
        self.tiles.len() as i32
    }

    pub fn get(&self, y: i32) -> &Tile {
        usize::try_from(y)
            .ok()
            .and_then(|y| self.tiles.get(y))
            .unwrap_or(&Tile::AIR)
    }

    pub fn tile(&mut self, y: i32) -> &mut Tile {
        match usize::try_from(y).ok().filter(|y| *y < self.tiles.len()) {
            Some(y) => &mut self.tiles[y],
            None => {
                self.scratch = Tile::AIR;
                &mut self.scratch
            }
        }
    }

    pub fn biome(&self, y: i32) -> BiomeData {
        usize::try_from(y)
            .ok()
            .and_then(|y| self.biomes.get(y))
            .copied()
            .unwrap_or_default()
    }

    pub fn biome_mut(&mut self, y: i32) -> &mut BiomeData {
        match usize::try_from(y).ok().filter(|y| *y < self.biomes.len()) {
            Some(y) => &mut self.biomes[y],
            None => &mut self.scratch_biome,
        }
    }
}

fn wrapped_surface(surface: &[i32], x: i32) -> i32 {
    if surface.is_empty() {
        return 0;
    }
    surface[x.rem_euclid(surface.len() as i32) as usize]
}

// =============================================================================
// World
// =============================================================================

pub struct World {
    pub conf: Config,
    pub ctx: WorldGenContext,
    levels: Levels,
    tiles: Vec<Tile>,
    biomes: Vec<BiomeData>,
    surface: Vec<i32>,
    scratch: Tile,
    scratch_biome: BiomeData,
    chests: Vec<Chest>,
    chest_index: HashMap<Point, usize>,
    pub queued_deco: Vec<Command>,
    pub queued_treasures: Vec<Command>,
    pub queued_evil: Vec<Command>,
    pub queued_traps: Vec<Command>,
    /// Candidate coordinates discovered by the treasure pass.
    pub locations: LocationBins,
}

impl World {
    /// Allocate an empty world sized from the configuration.
    pub fn new(conf: Config) -> Self {
        let levels = Levels::new(conf.world.width.max(1), conf.world.height.max(1));
        let cells = levels.width as usize * levels.height as usize;
        Self {
            conf,
            ctx: WorldGenContext::default(),
            levels,
            tiles: vec![Tile::AIR; cells],
            biomes: Vec::new(),
            surface: vec![0; levels.width as usize],
            scratch: Tile::AIR,
            scratch_biome: BiomeData::default(),
            chests: Vec::new(),
            chest_index: HashMap::new(),
            queued_deco: Vec::new(),
            queued_treasures: Vec::new(),
            queued_evil: Vec::new(),
            queued_traps: Vec::new(),
            locations: LocationBins::default(),
        }
    }

    pub fn width(&self) -> i32 {
        self.levels.width
    }

    pub fn height(&self) -> i32 {
        self.levels.height
    }

    pub fn levels(&self) -> Levels {
        self.levels
    }

    pub fn underground_level(&self) -> i32 {
        self.levels.underground
    }

    pub fn cavern_level(&self) -> i32 {
        self.levels.cavern
    }

    pub fn underworld_level(&self) -> i32 {
        self.levels.underworld
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.levels
            .contains(x, y)
            .then(|| y as usize + x as usize * self.levels.height as usize)
    }

    pub fn tile(&self, x: i32, y: i32) -> &Tile {
        match self.index(x, y) {
            Some(idx) => &self.tiles[idx],
            None => &Tile::AIR,
        }
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> &mut Tile {
        match self.index(x, y) {
            Some(idx) => &mut self.tiles[idx],
            None => {
                self.scratch = Tile::AIR;
                &mut self.scratch
            }
        }
    }

    pub fn tile_at(&self, pt: Point) -> &Tile {
        self.tile(pt.x, pt.y)
    }

    pub fn tile_at_mut(&mut self, pt: Point) -> &mut Tile {
        self.tile_mut(pt.x, pt.y)
    }

    // -------------------------------------------------------------------------
    // Biome map
    // -------------------------------------------------------------------------

    /// Allocate the per-tile biome map. Until this runs every tile reads as
    /// forest.
    pub fn init_biome_data(&mut self) {
        self.biomes = vec![BiomeData::default(); self.tiles.len()];
    }

    pub fn biome(&self, x: i32, y: i32) -> BiomeData {
        self.index(x, y)
            .and_then(|idx| self.biomes.get(idx))
            .copied()
            .unwrap_or_default()
    }

    pub fn biome_mut(&mut self, x: i32, y: i32) -> &mut BiomeData {
        match self.index(x, y).filter(|idx| *idx < self.biomes.len()) {
            Some(idx) => &mut self.biomes[idx],
            None => &mut self.scratch_biome,
        }
    }

    // -------------------------------------------------------------------------
    // Surface cache
    // -------------------------------------------------------------------------

    /// Highest solid row of column `x`, wrapping horizontally.
    pub fn surface(&self, x: i32) -> i32 {
        wrapped_surface(&self.surface, x)
    }

    pub fn set_surface(&mut self, x: i32, y: i32) {
        let len = self.surface.len() as i32;
        if len > 0 {
            self.surface[x.rem_euclid(len) as usize] = y;
        }
    }

    /// Recompute the surface of every column by scanning down from the sky
    /// to the first non-empty block.
    pub fn rescan_surface(&mut self) {
        let height = self.height();
        let scanned = parallel::collect_striped(self.width() as usize, |x| {
            let x = x as i32;
            let mut y = 0;
            while y < height && self.tile(x, y).is_empty() {
                y += 1;
            }
            vec![y]
        });
        self.surface = scanned;
    }

    // -------------------------------------------------------------------------
    // Region queries
    // -------------------------------------------------------------------------

    /// True when every tile of the rectangle passes `f`. Stops at the first
    /// failure, scanning column by column.
    pub fn region_passes<F>(&self, x: i32, y: i32, width: i32, height: i32, mut f: F) -> bool
    where
        F: FnMut(&Tile) -> bool,
    {
        for i in 0..width {
            for j in 0..height {
                if !f(self.tile(x + i, y + j)) {
                    return false;
                }
            }
        }
        true
    }

    /// True when any tile in the 3x3 block around `(x, y)` is open.
    /// Always false on the outermost border.
    pub fn is_exposed(&self, x: i32, y: i32) -> bool {
        if x < 1 || x >= self.width() - 1 || y < 1 || y >= self.height() - 1 {
            return false;
        }
        for i in -1..=1 {
            for j in -1..=1 {
                let block = self.tile(x + i, y + j).block;
                if block.is_empty() || block == BlockId::MINECART_TRACK {
                    return true;
                }
            }
        }
        false
    }

    /// True when all eight neighbours of `(x, y)` are empty.
    pub fn is_isolated(&self, x: i32, y: i32) -> bool {
        if x < 1 || x >= self.width() - 1 || y < 1 || y >= self.height() - 1 {
            return false;
        }
        for i in -1..=1 {
            for j in -1..=1 {
                if (i != 0 || j != 0) && !self.tile(x + i, y + j).is_empty() {
                    return false;
                }
            }
        }
        true
    }

    // -------------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------------

    /// Blit a stamp with its top-left corner at `(x, y)`.
    ///
    /// Cloud blocks in the stamp are transparent; a sloped cloud only copies
    /// its slope onto an existing block. Every written tile that ends up with
    /// a block or wall becomes guarded. Returns the top-left corners of the
    /// chests and dressers the stamp contains.
    pub fn place_buffer(&mut self, x: i32, y: i32, buffer: &TileBuffer, blend: Blend) -> Vec<Point> {
        let mut storage = Vec::new();
        for i in 0..buffer.width() {
            for j in 0..buffer.height() {
                let src = *buffer.tile(i, j);
                if blend == Blend::BlockOnly && src.is_empty() {
                    continue;
                }
                let tile = self.tile_mut(x + i, y + j);
                if src.block == BlockId::CLOUD {
                    if src.slope != Slope::None && !tile.is_empty() {
                        tile.slope = src.slope;
                        tile.guarded = true;
                    }
                    continue;
                }
                match blend {
                    Blend::BlockOnly => {
                        tile.block = src.block;
                        tile.frame_x = src.frame_x;
                        tile.frame_y = src.frame_y;
                        tile.block_paint = src.block_paint;
                        tile.slope = src.slope;
                    }
                    Blend::Normal => {
                        let (wall, wall_paint) = (tile.wall, tile.wall_paint);
                        *tile = src;
                        if src.wall == WallId::CLOUD {
                            tile.wall = WallId::EMPTY;
                        } else if src.wall.is_empty() {
                            tile.wall = wall;
                            tile.wall_paint = wall_paint;
                        }
                    }
                }
                tile.guarded = !tile.is_empty() || !tile.wall.is_empty();
                let is_corner = match tile.block {
                    BlockId::DRESSER => tile.frame_x % 54 == 0,
                    BlockId::CHEST | BlockId::CHEST_GROUP2 => tile.frame_x % 36 == 0,
                    _ => false,
                };
                if is_corner && tile.frame_y == 0 {
                    storage.push(Point::new(x + i, y + j));
                }
            }
        }
        storage
    }

    /// Write a framed object's footprint with its top-left corner at
    /// `(x, y)`.
    pub fn place_framed_tile(&mut self, x: i32, y: i32, block: BlockId, variant: Variant) {
        let fp = framing::footprint(x, y, block, variant, self.levels.underground, self.levels.cavern);
        for i in 0..fp.width {
            for j in 0..fp.height {
                let (frame_x, frame_y) = fp.frame(i, j);
                let tile = self.tile_mut(x + i, y + j);
                tile.block = fp.block;
                tile.frame_x = frame_x;
                tile.frame_y = frame_y;
            }
        }
    }

    /// Place a chest and register its storage.
    pub fn place_chest(&mut self, x: i32, y: i32, variant: Variant) -> &mut Chest {
        self.place_framed_tile(x, y, BlockId::CHEST, variant);
        self.register_storage(x, y)
    }

    /// Storage record for the chest at `(x, y)`, created on first use.
    /// At most one record exists per coordinate.
    pub fn register_storage(&mut self, x: i32, y: i32) -> &mut Chest {
        let pt = Point::new(x, y);
        let idx = match self.chest_index.get(&pt) {
            Some(&idx) => idx,
            None => {
                self.chests.push(Chest::new(x, y));
                let idx = self.chests.len() - 1;
                self.chest_index.insert(pt, idx);
                idx
            }
        };
        &mut self.chests[idx]
    }

    pub fn chests(&self) -> &[Chest] {
        &self.chests
    }

    pub fn chests_mut(&mut self) -> &mut [Chest] {
        &mut self.chests
    }

    // -------------------------------------------------------------------------
    // Planning
    // -------------------------------------------------------------------------

    /// Pick desert, jungle and snow centre columns far enough apart. The
    /// required separation relaxes towards a fixed minimum as tries run out.
    pub fn plan_biomes(&mut self, rnd: &mut Random) {
        info!("Planning biomes");
        let v = &self.conf.variation;
        let (desert_size, jungle_size, snow_size) = (v.desert_size, v.jungle_size, v.snow_size);
        let (mut desert, mut jungle, mut snow) = (0.5, 0.25, 0.75);
        for tries in 0..1000 {
            desert = rnd.get_double(0.09, 0.91);
            jungle = rnd.get_double(0.12, 0.39);
            if rnd.get_bool() {
                jungle = 1.0 - jungle;
            }
            snow = rnd.get_double(0.12, 0.88);
            let t = f64::from(tries) / 1000.0;
            let apart = |a: f64, b: f64, size: f64| (a - b).abs() > 0.075 * lerp(size, 2.0, t);
            if apart(desert, jungle, desert_size + jungle_size)
                && apart(desert, snow, desert_size + snow_size)
                && apart(snow, jungle, snow_size + jungle_size)
            {
                break;
            }
        }
        let width = f64::from(self.width());
        self.ctx.desert_center = desert * width;
        self.ctx.jungle_center = jungle * width;
        self.ctx.snow_center = snow * width;
    }

    // -------------------------------------------------------------------------
    // Parallel regions
    // -------------------------------------------------------------------------

    /// Run `f` once per column, columns striped across the worker pool.
    /// Each call owns its column exclusively; everything else is read-only.
    pub fn par_columns_mut<F>(&mut self, f: F)
    where
        F: Fn(&WorldView<'_>, &mut ColumnMut<'_>) + Sync,
    {
        let height = self.levels.height as usize;
        let width = self.levels.width as usize;
        let view = WorldView {
            levels: self.levels,
            conf: &self.conf,
            ctx: &self.ctx,
            surface: &self.surface,
        };
        let biome_columns: Vec<&mut [BiomeData]> = if self.biomes.is_empty() {
            (0..width).map(|_| <&mut [BiomeData]>::default()).collect()
        } else {
            self.biomes.chunks_mut(height).collect()
        };
        let columns = self.tiles.chunks_mut(height).zip(biome_columns).enumerate();
        parallel::for_each_striped(columns, |(x, (tiles, biomes))| {
            let mut column = ColumnMut {
                x: x as i32,
                tiles,
                biomes,
                scratch: Tile::AIR,
                scratch_biome: BiomeData::default(),
            };
            f(&view, &mut column);
        });
    }

    /// Evaluate `f` for every column against a read-only world and gather the
    /// results in column order. Used by passes whose decisions read
    /// neighbouring columns; the caller applies the results afterwards.
    pub fn par_collect_columns<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&World, i32) -> Vec<T> + Sync,
    {
        parallel::collect_striped(self.width() as usize, |x| f(self, x as i32))
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
pub(crate) fn test_world(width: i32, height: i32) -> World {
    let mut conf = Config::default();
    conf.world.width = width;
    conf.world.height = height;
    World::new(conf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_safe() {
        let mut world = test_world(20, 10);
        world.tile_mut(-5, 3).block = BlockId::STONE;
        world.tile_mut(1_000_000, -1_000_000).wall = WallId::DIRT;
        assert!(world.tile(-5, 3).is_empty());
        for x in 0..20 {
            for y in 0..10 {
                assert_eq!(*world.tile(x, y), Tile::AIR);
            }
        }
    }

    #[test]
    fn test_region_passes_short_circuits() {
        let mut world = test_world(30, 30);
        world.tile_mut(2, 3).block = BlockId::STONE;
        let mut calls = 0;
        let passed = world.region_passes(0, 0, 10, 10, |tile| {
            calls += 1;
            tile.is_empty()
        });
        assert!(!passed);
        // Column-major scan: (2, 3) is the 24th tile visited.
        assert_eq!(calls, 2 * 10 + 3 + 1);
        assert!(world.region_passes(5, 5, 4, 4, |tile| tile.is_empty()));
    }

    #[test]
    fn test_exposed_and_isolated() {
        let mut world = test_world(10, 10);
        for x in 0..10 {
            for y in 0..10 {
                world.tile_mut(x, y).block = BlockId::DIRT;
            }
        }
        assert!(!world.is_exposed(5, 5));
        world.tile_mut(6, 6).block = BlockId::EMPTY;
        assert!(world.is_exposed(5, 5));
        assert!(!world.is_exposed(0, 5));
        assert!(!world.is_isolated(5, 5));
        for (i, j) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
            world.tile_mut(3 + i, 3 + j).block = BlockId::EMPTY;
        }
        assert!(world.is_isolated(3, 3));
    }

    #[test]
    fn test_levels() {
        let world = test_world(4200, 1200);
        assert_eq!(world.underground_level(), 336);
        assert_eq!(world.cavern_level(), 491);
        assert_eq!(world.underworld_level(), 970);
    }

    #[test]
    fn test_surface_wraps() {
        let mut world = test_world(10, 10);
        world.set_surface(3, 7);
        assert_eq!(world.surface(13), 7);
        assert_eq!(world.surface(-7), 7);
    }

    #[test]
    fn test_rescan_surface() {
        let mut world = test_world(6, 20);
        world.tile_mut(2, 12).block = BlockId::STONE;
        world.rescan_surface();
        assert_eq!(world.surface(2), 12);
        assert_eq!(world.surface(0), 20);
    }

    #[test]
    fn test_chest_registration_is_unique() {
        let mut world = test_world(40, 40);
        world.place_chest(5, 5, Variant::Gold).items[0].stack = 3;
        world.register_storage(5, 5);
        assert_eq!(world.chests().len(), 1);
        assert_eq!(world.chests()[0].items[0].stack, 3);
        assert_eq!(world.tile(6, 6).block, BlockId::CHEST);
        assert_eq!(world.tile(6, 6).frame_x, 54);
    }

    #[test]
    fn test_place_buffer_blend_rules() {
        let mut world = test_world(20, 20);
        for x in 0..20 {
            for y in 0..20 {
                let tile = world.tile_mut(x, y);
                tile.block = BlockId::STONE;
                tile.wall = WallId::DIRT;
            }
        }
        // 2x2: cloud (transparent), wood with no wall, air with a cloud
        // wall, chest corner.
        let stamp = TileBuffer::decode(&[
            0x0202,
            0x1000,
            BlockId::CLOUD.0 as u16,
            0x1000,
            BlockId::WOOD.0 as u16,
            0x2000,
            WallId::CLOUD.0,
            0x1000,
            BlockId::CHEST.0 as u16,
            36,
            0,
        ]);
        let chests = world.place_buffer(5, 5, &stamp, Blend::Normal);
        assert_eq!(world.tile(5, 5).block, BlockId::STONE);
        assert!(!world.tile(5, 5).guarded);
        assert_eq!(world.tile(5, 6).block, BlockId::WOOD);
        assert_eq!(world.tile(5, 6).wall, WallId::DIRT);
        assert!(world.tile(5, 6).guarded);
        assert!(world.tile(6, 5).is_empty());
        assert!(world.tile(6, 5).wall.is_empty());
        assert!(!world.tile(6, 5).guarded);
        assert_eq!(chests, vec![Point::new(6, 6)]);

        let only_blocks = world.place_buffer(10, 10, &stamp, Blend::BlockOnly);
        assert_eq!(world.tile(11, 10).block, BlockId::STONE);
        assert_eq!(world.tile(10, 11).wall, WallId::DIRT);
        assert_eq!(only_blocks.len(), 1);
    }

    #[test]
    fn test_place_buffer_finds_dresser_corners() {
        let mut world = test_world(60, 60);
        // One row: a dresser's left and middle cells, then a chest's right cell.
        let stamp = TileBuffer::decode(&[
            0x0301,
            0x1000,
            BlockId::DRESSER.0 as u16,
            54,
            0,
            0x1000,
            BlockId::DRESSER.0 as u16,
            72,
            0,
            0x1000,
            BlockId::CHEST.0 as u16,
            18,
            0,
        ]);
        let storage = world.place_buffer(20, 20, &stamp, Blend::Normal);
        assert_eq!(storage, vec![Point::new(20, 20)]);
        assert_eq!(world.tile(21, 20).block, BlockId::DRESSER);
    }

    #[test]
    fn test_plan_biomes_spreads_centres() {
        let mut world = test_world(4200, 1200);
        let mut rnd = Random::new(11);
        world.plan_biomes(&mut rnd);
        let ctx = &world.ctx;
        let w = 4200.0;
        assert!((ctx.desert_center - ctx.jungle_center).abs() > 0.075 * 2.0 * w - 1.0);
        assert!((ctx.snow_center - ctx.jungle_center).abs() > 0.075 * 2.0 * w - 1.0);
        assert!(ctx.jungle_center < 0.39 * w || ctx.jungle_center > 0.61 * w);
    }

    #[test]
    fn test_par_columns_mut_touches_each_column() {
        let mut world = test_world(37, 11);
        world.init_biome_data();
        world.par_columns_mut(|view, column| {
            let x = column.x;
            for y in 0..view.levels.height {
                column.tile(y).frame_x = x as i16;
                column.biome_mut(y).active = Biome::Snow;
            }
            column.tile(-1).frame_x = 99;
        });
        for x in 0..37 {
            for y in 0..11 {
                assert_eq!(world.tile(x, y).frame_x, x as i16);
                assert_eq!(world.biome(x, y).active, Biome::Snow);
            }
        }
    }

    #[test]
    fn test_par_collect_columns_in_order() {
        let world = test_world(25, 5);
        let xs = world.par_collect_columns(|_, x| vec![x]);
        assert_eq!(xs, (0..25).collect::<Vec<_>>());
    }
}
