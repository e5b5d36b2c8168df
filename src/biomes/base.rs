//! Base terrain
//!
//! The first pass that puts blocks in the world. It runs in three stages:
//!
//! 1. biome registration: per-tile biome weights and the active biome,
//!    from distance-to-centre ramps against coarse noise,
//! 2. the main fill: for every tile below the surface, a depth ramp against
//!    fine noise picks soil, stone or a deposit from the biome's tile table,
//!    then ore layers and the cave systems are carved on top,
//! 3. surface finishing: stray single tiles are removed, marble stalactites
//!    grow, and exposed dirt and mud turn to grass.

use log::info;

use crate::config::BiomeLayout;
use crate::ids::{wall_variants, BlockId, WallId};
use crate::point::Point;
use crate::random::{fnv1a32pt, NoiseField, Random};
use crate::tile::Tile;
use crate::world::{lerp, Biome, BiomeData, Levels, World};

use super::{carve_columns, ore_threshold, patches};

/// Columns this close to either edge keep a solid shallow crust so the
/// oceans have something to cut into.
const EDGE_MARGIN: i32 = 350;
/// Ore multiplier that puts the hellstone threshold where it belongs.
const HELLSTONE_ORE_FACTOR: f64 = 4.24492;

// Tile tables, indexed by tile type: 0 soil, 1 rare surface variant,
// 2 stone, 3..=5 deposits.
const SNOW_TILES: [BlockId; 6] = [
    BlockId::SNOW,
    BlockId::SNOW,
    BlockId::ICE,
    BlockId::STONE,
    BlockId::THIN_ICE,
    BlockId::SLUSH,
];
const DESERT_TILES: [BlockId; 6] = [
    BlockId::SAND,
    BlockId::SAND,
    BlockId::SANDSTONE,
    BlockId::DESERT_FOSSIL,
    BlockId::DESERT_FOSSIL,
    BlockId::DESERT_FOSSIL,
];
const JUNGLE_TILES: [BlockId; 6] = [
    BlockId::MUD,
    BlockId::JUNGLE_GRASS,
    BlockId::MUD,
    BlockId::CLAY,
    BlockId::SILT,
    BlockId::STONE,
];
const FOREST_TILES: [BlockId; 6] = [
    BlockId::DIRT,
    BlockId::GRASS,
    BlockId::STONE,
    BlockId::CLAY,
    BlockId::SAND,
    BlockId::MUD,
];

/// Noise offsets drawn once per terrain pass so every layer samples an
/// independent-looking region of the same field.
#[derive(Clone, Debug)]
pub struct TerrainOffsets {
    /// Soil/stone split, deposits and ore layers.
    pub deposit: [Point; 7],
    /// Wall variant patches, one per dirt wall variant.
    pub wall_var: [Point; 8],
}

impl TerrainOffsets {
    pub fn draw(rnd: &mut Random, world: &World) -> Self {
        let mut draw = || Point::new(rnd.get_int(0, world.width()), rnd.get_int(0, world.height()));
        let deposit = std::array::from_fn(|_| draw());
        let wall_var = std::array::from_fn(|_| draw());
        Self { deposit, wall_var }
    }

    /// Index of the first wall patch whose noise band contains `(x, y)`.
    pub fn wall_var_index(&self, x: i32, y: i32, noise: &NoiseField) -> Option<usize> {
        self.wall_var
            .iter()
            .position(|p| noise.coarse(x + p.x, y + p.y).abs() < 0.07)
    }

    fn fine_at(&self, noise: &NoiseField, idx: usize, x: i32, y: i32) -> f64 {
        noise.fine(x + self.deposit[idx].x, y + self.deposit[idx].y)
    }
}

/// Hash a possibly missing wall patch index the same way as a present one.
fn patch_hash(index: Option<usize>, salt: i32) -> u32 {
    fnv1a32pt(index.map_or(u32::MAX, |i| i as u32), salt as u32)
}

// =============================================================================
// Surface
// =============================================================================

/// Draw the surface silhouette. Amplitude is clamped near spawn and near
/// both edges; runs of single-step slopes get a bump so hills do not look
/// like staircases.
pub fn compute_surface_level(rnd: &mut Random, world: &mut World) {
    let underground = f64::from(world.underground_level());
    let surface_level = rnd.get_double(0.7 * underground, 0.8 * underground);
    let width = world.width();
    let center = width / 2;
    let v = &world.conf.variation;
    let sunken = v.sunken && !v.shattered;
    let amplitude = v.surface_amplitude * 50.0;

    let mut levels = vec![0; width as usize];
    let mut delta = 0;
    let mut delta_len = 1;
    let mut prev_y = surface_level as i32;
    for x in 0..width {
        let drop = if sunken {
            let fx = f64::from(x);
            let fc = f64::from(center);
            120.0 * (1.0 / (1.0 + (0.057 * (180.0 + fc - fx)).exp()) + 1.0 / (1.0 + (0.057 * (180.0 + fx - fc)).exp()))
                - 90.0
        } else {
            0.0
        };
        let clamp = (0.1 * f64::from((center - x).abs()) + 15.0)
            .min(0.08 * f64::from(x.min(width - x)) + 5.0)
            .min(amplitude);
        let cur_y = (surface_level + drop + clamp * rnd.coarse(x, 0)) as i32;
        levels[x as usize] = cur_y;
        if delta == cur_y - prev_y {
            delta_len += 1;
        } else {
            if delta_len > 4 && delta.abs() == 1 {
                for i in 0..delta_len {
                    let Some(level) = usize::try_from(x - i).ok().and_then(|idx| levels.get_mut(idx)) else {
                        continue;
                    };
                    let bump = 9.0 * (0.5 - (f64::from(i) - 0.5 * f64::from(delta_len)).abs() / f64::from(delta_len))
                        * rnd.fine(x - 2 * i, 0);
                    *level += bump as i32;
                }
            }
            delta = cur_y - prev_y;
            delta_len = 1;
        }
        prev_y = cur_y;
    }
    for (x, y) in levels.into_iter().enumerate() {
        world.set_surface(x as i32, y);
    }
}

// =============================================================================
// Biome registration
// =============================================================================

/// Snow and desert share a shape: a column band that narrows with depth
/// below `floor`.
fn register_column_biome(biome: Biome, center: f64, size: f64, floor: f64, rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let width = f64::from(world.width());
    let height = f64::from(world.height());
    let scan = size * 0.08 * width;
    let noise = &rnd.noise;
    let columns = (center - scan).max(0.0) as i32..(center + scan).min(width) as i32;
    carve_columns(world, columns, |view, col| {
        let cx = col.x;
        let x = f64::from(cx);
        for y in 0..view.levels.underworld {
            let threshold = ((x - center).abs() / 100.0 - size * width / 1700.0)
                .max(15.0 * (f64::from(y) - floor) / height);
            let data = col.biome_mut(y);
            *data.weight_mut(biome) = (0.45 - 0.75 * threshold).clamp(0.0, 1.0) as f32;
            if noise.coarse(cx, y) > threshold {
                data.active = biome;
            }
        }
    });
}

pub fn register_snow(rnd: &mut Random, world: &mut World) {
    let levels = world.levels();
    let floor = f64::from((levels.cavern + 2 * levels.underworld) / 3);
    let (center, size) = (world.ctx.snow_center, world.conf.variation.snow_size);
    register_column_biome(Biome::Snow, center, size, floor, rnd, world);
}

pub fn register_desert(rnd: &mut Random, world: &mut World) {
    let levels = world.levels();
    let floor = f64::from((levels.cavern + 4 * levels.underworld) / 5);
    let (center, size) = (world.ctx.desert_center, world.conf.variation.desert_size);
    register_column_biome(Biome::Desert, center, size, floor, rnd, world);
}

/// The jungle runs the full height and needs both a coarse and a fine
/// noise sample to claim a tile, giving it ragged edges.
pub fn register_jungle(rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let width = f64::from(world.width());
    let center = world.ctx.jungle_center;
    let size = world.conf.variation.jungle_size;
    let scan = size * 0.11 * width;
    let noise = &rnd.noise;
    let columns = (center - scan).max(0.0) as i32..(center + scan).min(width) as i32;
    carve_columns(world, columns, |_, col| {
        let cx = col.x;
        let x = f64::from(cx);
        let threshold = (x - center).abs() / 100.0 - size * width / 1050.0;
        let fine_threshold = (x - center).abs() / 260.0 - size * width / 2700.0;
        for y in 0..col.height() {
            let data = col.biome_mut(y);
            data.jungle = (0.25 - 0.45 * threshold).clamp(0.0, 1.0) as f32;
            if noise.coarse(cx, y) > threshold && noise.fine(cx, y) > fine_threshold {
                data.active = Biome::Jungle;
            }
        }
    });
}

/// Forest takes whatever weight the other biomes left; everything below a
/// wobbling line near the underworld level is underworld.
pub fn register_underworld(rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    let noise = &rnd.noise;
    world.par_columns_mut(|view, col| {
        let top = view.levels.underworld + (20.0 * noise.coarse(col.x, 0)) as i32;
        for y in 0..top {
            let data = col.biome_mut(y);
            data.forest = (1.0 - data.snow - data.desert - data.jungle).clamp(0.0, 1.0);
        }
        for y in top..col.height() {
            *col.biome_mut(y) = BiomeData::pure(Biome::Underworld);
        }
    });
}

/// Layered layout: biomes stacked by depth instead of side by side.
/// Boundaries wobble with coarse noise.
pub fn register_layers(rnd: &mut Random, world: &mut World) {
    info!("Stacking biome layers");
    rnd.shuffle_noise();
    let noise = &rnd.noise;
    world.par_columns_mut(|view, col| {
        let levels = view.levels;
        let wobble = |y: i32| y + (25.0 * noise.coarse(col.x, y)) as i32;
        let bands = [
            (wobble(levels.underground), Biome::Forest),
            (wobble((levels.underground + levels.cavern) / 2), Biome::Snow),
            (wobble(levels.cavern), Biome::Desert),
            (wobble(levels.underworld), Biome::Jungle),
        ];
        for y in 0..col.height() {
            let biome = bands
                .iter()
                .find(|(floor, _)| y < *floor)
                .map_or(Biome::Underworld, |(_, biome)| *biome);
            *col.biome_mut(y) = BiomeData::pure(biome);
        }
    });
}

// =============================================================================
// Main fill
// =============================================================================

/// Depth ramp for the soil/stone split: solid soil near the surface,
/// mostly stone through the caverns, soil again towards the underworld.
pub fn stone_threshold(y: i32, levels: &Levels) -> f64 {
    let steps = [
        (0, -3.0),
        (levels.underground, 0.0),
        ((levels.underground + levels.cavern) / 2, 0.0918),
        (levels.cavern, 0.1836),
        (levels.underworld, 0.8225),
    ];
    let mut from = (0, 0.0);
    let mut to = (0, 0.0);
    for step in steps {
        from = to;
        to = step;
        if y < to.0 {
            break;
        }
    }
    if to.0 == from.0 {
        return to.1;
    }
    lerp(from.1, to.1, f64::from(y - from.0) / f64::from(to.0 - from.0))
}

/// One ore band: deposit noise index, roof, floor and the ore placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OreLayer {
    pub noise: usize,
    pub roof: f64,
    pub floor: f64,
    pub ore: BlockId,
}

pub fn ore_layers(world: &World) -> [OreLayer; 4] {
    let l = world.levels();
    let ores = world.ctx.ores;
    let (ug, uw) = (f64::from(l.underground), f64::from(l.underworld));
    [
        OreLayer { noise: 3, roof: 0.6 * ug, floor: ((l.underground + l.cavern) / 2).into(), ore: ores.copper },
        OreLayer { noise: 4, roof: 0.85 * ug, floor: ((2 * l.cavern + l.underworld) / 3).into(), ore: ores.iron },
        OreLayer { noise: 5, roof: ((l.underground + l.cavern) / 2).into(), floor: ((l.cavern + l.underworld) / 2).into(), ore: ores.silver },
        OreLayer { noise: 6, roof: ((2 * l.cavern + l.underworld) / 3).into(), floor: uw, ore: ores.gold },
    ]
}

/// Pick the block for one tile from its biome table and set the biome's
/// wall. Shared with the honeycomb terrain.
#[allow(clippy::too_many_arguments)]
pub fn apply_biome_tile(
    tile: &mut Tile,
    x: i32,
    y: i32,
    tile_type: usize,
    active: Biome,
    offsets: &TerrainOffsets,
    noise: &NoiseField,
    levels: &Levels,
) {
    let dep = &offsets.deposit;
    let wv = &offsets.wall_var;
    match active {
        Biome::Snow => {
            tile.block = SNOW_TILES[tile_type];
            let index = offsets.wall_var_index(x, y, noise);
            if index.is_some() && patch_hash(index, wv[0].y) % 5 == 0 {
                tile.wall = wall_variants::STONE[wv[0].x as usize % wall_variants::STONE.len()];
            } else if index.is_some() || y < levels.underground {
                tile.wall = if tile.block == BlockId::SNOW { WallId::SNOW } else { WallId::ICE };
            }
        }
        Biome::Desert => {
            tile.block = DESERT_TILES[tile_type];
            if y > levels.cavern && tile.block == BlockId::SANDSTONE {
                let band = noise.coarse(x + dep[2].x, y + dep[3].y);
                if (band + 0.23).abs() < 0.04 {
                    tile.block = BlockId::SAND;
                } else if (band - 0.23).abs() < 0.04 {
                    tile.block = BlockId::HARDENED_SAND;
                }
            }
            tile.wall = if tile.block == BlockId::SANDSTONE {
                WallId::SANDSTONE
            } else {
                WallId::HARDENED_SAND
            };
        }
        Biome::Jungle => {
            tile.block = JUNGLE_TILES[tile_type];
            if y < levels.underground {
                tile.wall = WallId::MUD;
            } else if let Some(index) = offsets.wall_var_index(x, y, noise) {
                let pick = patch_hash(Some(index), wv[1].x) as usize % wall_variants::JUNGLE.len();
                tile.wall = wall_variants::JUNGLE[pick];
            }
        }
        Biome::Forest => {
            tile.block = FOREST_TILES[tile_type];
            if let Some(index) = offsets.wall_var_index(x, y, noise) {
                tile.wall = wall_variants::DIRT[index];
            } else if y < levels.underground {
                tile.wall = if tile.block == BlockId::STONE { WallId::ROCKY_DIRT } else { WallId::DIRT };
            }
        }
        Biome::Underworld => {
            if let Some(index) = offsets.wall_var_index(x, y, noise) {
                let pick = patch_hash(Some(index), wv[2].x) as usize % wall_variants::UNDERWORLD.len();
                tile.wall = wall_variants::UNDERWORLD[pick];
            }
        }
    }
}

/// Marble where snow and desert meet.
pub fn is_marble_seam(data: &BiomeData, fine: f64) -> bool {
    let threshold = 0.4 + 0.03 * fine;
    let (snow, desert) = (f64::from(data.snow), f64::from(data.desert));
    (desert > threshold && snow > threshold)
        || (snow > 0.57 && data.active == Biome::Desert)
        || (desert > 0.57 && data.active == Biome::Snow)
}

/// Tunnel systems shared by both terrain shapes: strings of nearly connected
/// caves with a horizontal bias, and increasingly large isolated deep caves.
pub fn is_cave(x: i32, y: i32, noise: &NoiseField, levels: &Levels) -> bool {
    let (ug, uw) = (f64::from(levels.underground), f64::from(levels.underworld));
    let fy = f64::from(y);
    let underworld_height = f64::from(levels.height) - uw;
    let threshold = if y < levels.underground {
        2.94 - 3.1 * fy / ug
    } else if y > levels.underworld {
        3.1 * (fy - uw) / underworld_height - 0.16
    } else {
        -0.16
    };
    if (noise.coarse(x, 2 * y) + 0.1).abs() < 0.15 && noise.fine(x, y) > threshold {
        return true;
    }
    let threshold = if y > levels.underworld {
        (uw - fy) / 10.0
    } else {
        (fy - ug) / (uw - ug) - 1.0
    };
    noise.coarse(x, 2 * y).abs() > 0.55 && noise.fine(x, y) < threshold + 0.1
}

/// Large open caverns deep in the jungle.
pub fn is_jungle_cavern(x: i32, y: i32, jungle: f32, noise: &NoiseField, levels: &Levels) -> bool {
    if y <= levels.cavern || jungle <= 0.01 {
        return false;
    }
    let (fy, cav, h) = (f64::from(y), f64::from(levels.cavern), f64::from(levels.height));
    let threshold = 2.0 * (fy - cav) * (fy - h) / (h - cav).powi(2) + 0.75;
    noise.coarse(2 * x, 2 * y) > lerp(1.0, threshold, f64::from(jungle))
}

/// Thin ice caves in snow. Snow inside the cave turns to thin ice, anything
/// else opens.
pub fn snow_cave(x: i32, y: i32, snow: f32, noise: &NoiseField, levels: &Levels) -> bool {
    if snow <= 0.01 {
        return false;
    }
    let threshold = (1.0 + 15.0 * f64::from(levels.cavern - y) / f64::from(levels.height)).max(-0.1);
    (noise.coarse(2 * x, y) + 0.1).abs() < 0.12 && noise.fine(x, y) > lerp(1.0, threshold, f64::from(snow))
}

/// Surface wall for an open tile above the underground level.
pub fn open_surface_wall(
    x: i32,
    y: i32,
    active: Biome,
    offsets: &TerrainOffsets,
    noise: &NoiseField,
) -> Option<WallId> {
    let wv = &offsets.wall_var;
    match active {
        Biome::Jungle => {
            let index = offsets.wall_var_index(x, y, noise);
            Some(if patch_hash(index, wv[3].y) % 3 == 0 {
                wall_variants::STONE[patch_hash(index, wv[3].x) as usize % wall_variants::STONE.len()]
            } else {
                WallId::JUNGLE
            })
        }
        Biome::Forest if offsets.wall_var_index(x, y, noise).map_or(true, |i| i < 1) => {
            Some(if noise.fine(x + wv[4].x, y + wv[4].y) > 0.0 {
                WallId::GRASS
            } else {
                WallId::FLOWER
            })
        }
        _ => None,
    }
}

fn apply_base_terrain(rnd: &mut Random, world: &mut World) {
    rnd.shuffle_noise();
    // Later passes restore this to line up with the cave layout.
    rnd.save_shuffle_state();
    let offsets = TerrainOffsets::draw(rnd, world);
    compute_surface_level(rnd, world);
    let center = world.width() / 2;
    world.ctx.spawn = Point::new(center, world.surface(center) - 1);

    let ore_limit = ore_threshold(world.conf.variation.ore);
    let hellstone_limit = -ore_threshold(HELLSTONE_ORE_FACTOR * world.conf.variation.ore);
    let layers = ore_layers(world);
    let noise = &rnd.noise;
    let offsets = &offsets;
    world.par_columns_mut(|view, col| {
        let levels = view.levels;
        let x = col.x;
        let near_edge = x < EDGE_MARGIN || x > levels.width - EDGE_MARGIN;
        let underworld_height = f64::from(levels.height - levels.underworld);
        let h = f64::from(levels.height);
        let underworld_roof = (f64::from(levels.underworld)
            + 0.22 * underworld_height
            + 19.0 * noise.coarse(x, (0.33 * h) as i32)) as i32;
        let underworld_floor = (f64::from(levels.underworld)
            + 0.42 * underworld_height
            + 35.0 * noise.coarse(x, (0.66 * h) as i32)) as i32;

        for y in view.surface(x).max(0)..levels.height {
            let data = col.biome(y);
            let threshold = stone_threshold(y, &levels);
            let soil = noise.fine(x + offsets.deposit[0].x, y + offsets.deposit[1].y);
            let mut tile_type = if soil > threshold {
                0
            } else {
                2
            };
            if let Some(iter) = (0..3).find(|&i| offsets.fine_at(noise, i, x, y) > 0.7) {
                tile_type = iter + 3;
            }
            if tile_type == 0
                && y < levels.underground
                && (99999.0 * (1.0 + noise.fine(x, y))) as i64 % 100 == 0
            {
                tile_type = 1;
            }

            let tile = col.tile(y);
            apply_biome_tile(tile, x, y, tile_type, data.active, offsets, noise, &levels);
            if data.active == Biome::Underworld {
                if y > underworld_floor {
                    tile.block = if noise.fine(x, y).abs() > hellstone_limit {
                        BlockId::HELLSTONE
                    } else {
                        BlockId::ASH
                    };
                } else if y < underworld_roof {
                    tile.block = BlockId::ASH;
                }
            }
            if is_marble_seam(&data, noise.fine(x, y)) {
                tile.block = BlockId::MARBLE;
                tile.wall = WallId::MARBLE;
            }
            let fy = f64::from(y);
            if let Some(layer) = layers.iter().find(|layer| {
                fy > layer.roof
                    && fy < layer.floor
                    && offsets.fine_at(noise, layer.noise, x, y) < ore_limit
            }) {
                tile.block = layer.ore;
            }

            if near_edge && fy < 0.9 * f64::from(levels.underground) {
                continue;
            }
            if is_cave(x, y, noise, &levels) || is_jungle_cavern(x, y, data.jungle, noise, &levels) {
                tile.block = BlockId::EMPTY;
            }
            if snow_cave(x, y, data.snow, noise, &levels) {
                tile.block = if tile.block == BlockId::SNOW { BlockId::THIN_ICE } else { BlockId::EMPTY };
            }
            if data.desert > 0.01 {
                let threshold = (1.2 + 3.0 * f64::from(levels.underground - y) / h).max(0.4);
                let threshold = lerp(1.0, threshold, f64::from(data.desert));
                let sandy = tile.block == BlockId::SANDSTONE
                    || ((tile.block == BlockId::SAND || tile.block == BlockId::HARDENED_SAND)
                        && noise.fine(x + offsets.deposit[2].x, y + offsets.deposit[3].y) > 0.0);
                if noise.blur(x, 5 * y).abs() > threshold
                    && noise.fine(x + offsets.deposit[4].x, y + offsets.deposit[5].y) > -0.3
                    && sandy
                {
                    tile.block = BlockId::EMPTY;
                }
            }
            if tile.block == BlockId::EMPTY && y < levels.underground {
                if let Some(wall) = open_surface_wall(x, y, data.active, offsets, noise) {
                    tile.wall = wall;
                }
            }
        }
    });
}

// =============================================================================
// Surface finishing
// =============================================================================

/// Block edits `(y, block)` for one column, decided against the unfinished
/// world.
fn finish_column(x: i32, noise: &NoiseField, world: &World) -> Vec<(i32, BlockId)> {
    let levels = world.levels();
    let mut edits = Vec::new();
    let mut stalactite_len = 0;
    let mut stalac_iter = 0;
    for y in 0..levels.height {
        if y % 500 == 0 {
            stalac_iter = y / 35;
        }
        let tile = world.tile(x, y);
        if tile.is_empty() {
            if stalactite_len > 0 && world.tile(x, y + 1).is_empty() {
                edits.push((y, BlockId::MARBLE));
                if tile.wall != WallId::MARBLE {
                    stalactite_len /= 2;
                }
                stalactite_len -= 1;
            }
            continue;
        }
        stalactite_len = 0;
        if !world.is_exposed(x, y) {
            continue;
        }
        if world.is_isolated(x, y) {
            edits.push((y, BlockId::EMPTY));
            continue;
        }
        if tile.block == BlockId::MARBLE && world.tile(x, y + 1).is_empty() {
            stalactite_len = (16.0 * noise.fine(4 * x, 100 * stalac_iter)).max(0.0) as i32;
            stalac_iter += 1;
        }
        let active = world.biome(x, y).active;
        let grown = match (active, tile.block) {
            (Biome::Forest, BlockId::DIRT) if y < levels.underground => Some(BlockId::GRASS),
            (Biome::Jungle, BlockId::MUD) => Some(BlockId::JUNGLE_GRASS),
            (Biome::Underworld, BlockId::ASH)
                if y < world.surface(x) + 10 && (x - levels.width / 2).abs() < 100 =>
            {
                Some(BlockId::ASH_GRASS)
            }
            _ => None,
        };
        if let Some(block) = grown {
            edits.push((y, block));
        }
    }
    edits
}

fn finish_surface(rnd: &Random, world: &mut World) {
    let noise = &rnd.noise;
    let edits = world.par_collect_columns(|w, x| {
        finish_column(x, noise, w).into_iter().map(|e| (x, e)).collect()
    });
    for (x, (y, block)) in edits {
        world.tile_mut(x, y).block = block;
    }
}

/// Terrain step: biome registration, the main fill and surface finishing.
pub fn gen_world_base(rnd: &mut Random, world: &mut World) {
    world.init_biome_data();
    match world.conf.world.biomes {
        BiomeLayout::Layers => register_layers(rnd, world),
        BiomeLayout::Patches => {
            rnd.shuffle_noise();
            patches::register_patches(rnd, world);
        }
        BiomeLayout::Columns => {
            register_snow(rnd, world);
            register_desert(rnd, world);
            register_jungle(rnd, world);
            register_underworld(rnd, world);
        }
    }
    info!("Generating base terrain");
    apply_base_terrain(rnd, world);
    finish_surface(rnd, world);
    world.rescan_surface();
    if world.conf.world.biomes == BiomeLayout::Patches {
        patches::identify_surface_biomes(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    #[test]
    fn test_stone_threshold_ramp() {
        let levels = Levels::new(4200, 1200);
        assert!((stone_threshold(0, &levels) + 3.0).abs() < 1e-9);
        assert!(stone_threshold(levels.underground, &levels).abs() < 1e-9);
        assert!((stone_threshold(levels.cavern, &levels) - 0.1836).abs() < 1e-9);
        assert!((stone_threshold(levels.underworld, &levels) - 0.8225).abs() < 1e-9);
        // The last ramp keeps climbing below the underworld line.
        assert!(stone_threshold(1199, &levels) > 0.8225);
        let mid = stone_threshold(levels.underground / 2, &levels);
        assert!(mid > -3.0 && mid < 0.0);
    }

    #[test]
    fn test_ore_layers_stay_above_underworld() {
        let world = test_world(4200, 1200);
        for layer in ore_layers(&world) {
            assert!(layer.roof < layer.floor);
            assert!(layer.floor <= f64::from(world.underworld_level()));
        }
    }

    #[test]
    fn test_marble_seam() {
        let mut data = BiomeData::pure(Biome::Desert);
        assert!(!is_marble_seam(&data, 0.0));
        data.snow = 0.6;
        assert!(is_marble_seam(&data, 0.0));
    }

    /// Field-threshold carving: a depth ramp from -1 to 1 against a
    /// checkerboard field of +-0.5.
    #[test]
    fn test_threshold_carving_scenario() {
        let carve = || {
            let mut world = test_world(100, 100);
            let field = NoiseField::from_fn(100, 100, |x, y| f64::from((x + y) % 2) - 0.5);
            carve_columns(&mut world, 0..100, |_, col| {
                let x = col.x;
                for y in 0..100 {
                    let ramp = -1.0 + 2.0 * f64::from(y) / 99.0;
                    col.tile(y).block = if field.fine(x, y) > ramp {
                        BlockId::DIRT
                    } else {
                        BlockId::STONE
                    };
                }
            });
            world
        };
        let world = carve();
        for x in 0..100 {
            assert_eq!(world.tile(x, 0).block, BlockId::DIRT);
            assert_eq!(world.tile(x, 99).block, BlockId::STONE);
        }
        // Between the two ramp crossings the cells alternate along
        // diagonals.
        for x in 0..99 {
            let y = 50;
            assert_ne!(world.tile(x, y).block, world.tile(x + 1, y).block);
            assert_eq!(world.tile(x, y).block, world.tile(x + 1, y - 1).block);
        }
        let again = carve();
        for x in 0..100 {
            for y in 0..100 {
                assert_eq!(world.tile(x, y), again.tile(x, y));
            }
        }
    }

    #[test]
    fn test_gen_world_base_smoke() {
        let mut world = test_world(1000, 600);
        let mut rnd = Random::new(77);
        rnd.init_noise(1000, 600, 0.07);
        world.plan_biomes(&mut rnd);
        gen_world_base(&mut rnd, &mut world);
        let spawn = world.ctx.spawn;
        assert_eq!(spawn.x, 500);
        assert!(spawn.y > 0 && spawn.y < world.underground_level());
        let solid = (world.underground_level()..world.height())
            .filter(|&y| !world.tile(500, y).is_empty())
            .count();
        assert!(solid > 0);
        assert_eq!(world.biome(500, 590).active, Biome::Underworld);
    }

    #[test]
    fn test_gen_world_base_patches() {
        let mut world = test_world(1000, 600);
        world.conf.world.biomes = BiomeLayout::Patches;
        let mut rnd = Random::new(78);
        rnd.init_noise(1000, 600, 0.07);
        rnd.init_climate(1000, 600, 0.00097, 0.0, 0.0);
        gen_world_base(&mut rnd, &mut world);
        // The bottom rows are hot enough for the underworld everywhere.
        assert_eq!(world.biome(500, 595).active, Biome::Underworld);
        for center in [world.ctx.desert_center, world.ctx.jungle_center, world.ctx.snow_center] {
            assert!((0.0..1000.0).contains(&center));
        }
    }
}
