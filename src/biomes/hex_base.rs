//! Honeycomb terrain
//!
//! Base terrain for hive-queen worlds. Biomes are decided by majority vote
//! over large hex cells, the terrain fill marks caves instead of carving
//! them, and a second vote over small hex cells turns every cell into a
//! single block and wall. Biome cell borders become hive walls.

use std::collections::{BTreeMap, HashMap};

use log::info;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::config::BiomeLayout;
use crate::ids::{BlockId, WallId};
use crate::parallel;
use crate::point::{Point, Rect};
use crate::random::{NoiseField, Random};
use crate::structures::scan_while_empty;
use crate::tile::{Flag, TileFlags};
use crate::world::{Biome, BiomeData, Levels, World};
use crate::zone::hex_centroid;

use super::base::{
    apply_biome_tile, compute_surface_level, is_cave, is_jungle_cavern, is_marble_seam, ore_layers,
    open_surface_wall, register_layers, snow_cave, TerrainOffsets,
};
use super::ore_threshold;

const BIOME_CELL_SCALE: i32 = 131;
const COMB_SCALE: i32 = 10;
/// Half-size of the hive patch stamped on every biome border point.
const BORDER_PATCH: i32 = 3;
const ORE_FACTOR: f64 = 1.35;
const HELLSTONE_ORE_FACTOR: f64 = 4.24492;
/// Blocks that count as ore when deciding whether a comb cell is a vein.
const COMB_ORES: [BlockId; 10] = [
    BlockId::COPPER_ORE,
    BlockId::TIN_ORE,
    BlockId::IRON_ORE,
    BlockId::LEAD_ORE,
    BlockId::SILVER_ORE,
    BlockId::TUNGSTEN_ORE,
    BlockId::GOLD_ORE,
    BlockId::PLATINUM_ORE,
    BlockId::HELLSTONE,
    BlockId::DESERT_FOSSIL,
];

/// Biome of a tile in the column layout, before cell voting.
fn column_biome_at(x: i32, y: i32, noise: &NoiseField, world: &World) -> Biome {
    let width = f64::from(world.width());
    let height = f64::from(world.height());
    let (fx, fy) = (f64::from(x), f64::from(y));
    let v = &world.conf.variation;
    let ctx = &world.ctx;
    if fy >= f64::from(world.underworld_level()) + 20.0 * noise.coarse(x, 0) {
        Biome::Underworld
    } else if (fx - ctx.jungle_center).abs() < v.jungle_size * 0.09 * width {
        Biome::Jungle
    } else if fy < 0.7917 * height && (fx - ctx.desert_center).abs() < v.desert_size * 0.0584 * width {
        Biome::Desert
    } else if fy < 0.7244 * height && (fx - ctx.snow_center).abs() < v.snow_size * 0.0584 * width {
        Biome::Snow
    } else {
        Biome::Forest
    }
}

/// Winner of a vote; ties go to the earlier biome.
fn majority(counts: &[u32; 5]) -> Biome {
    let mut best = 0;
    for (i, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = i;
        }
    }
    Biome::all()[best]
}

/// Vote biomes over shifted hex cells. Returns the tiles along cell borders.
fn plan_hex_biomes(rnd: &mut Random, world: &mut World) -> Vec<Point> {
    let shift = Point::new(rnd.get_int(0, 99999), rnd.get_int(0, 99999));
    let cell_of = move |x: i32, y: i32| hex_centroid(x + shift.x, y + shift.y, BIOME_CELL_SCALE);
    let columns = world.conf.world.biomes == BiomeLayout::Columns;
    let bounds = Rect::new(0, 0, world.width(), world.height());
    let noise = &rnd.noise;

    let votes: Mutex<HashMap<Point, [u32; 5]>> = Mutex::new(HashMap::new());
    let borders = Mutex::new(Vec::new());
    {
        let world = &*world;
        parallel::stripe(0..world.width(), parallel::worker_count())
            .into_par_iter()
            .for_each(|stripe| {
                let mut local_votes: HashMap<Point, [u32; 5]> = HashMap::new();
                let mut local_borders = Vec::new();
                for x in stripe {
                    for y in 0..world.height() {
                        let cell = cell_of(x, y);
                        let biome = if columns {
                            column_biome_at(x, y, noise, world)
                        } else {
                            world.biome(x, y).active
                        };
                        local_votes.entry(cell).or_default()[biome as usize] += 1;
                        let on_border = Point::new(x, y)
                            .neighbors()
                            .into_iter()
                            .any(|n| bounds.contains(n) && cell_of(n.x, n.y) != cell);
                        if on_border {
                            local_borders.push(Point::new(x, y));
                        }
                    }
                }
                let mut votes = votes.lock();
                for (cell, counts) in local_votes {
                    let total = votes.entry(cell).or_default();
                    for (t, c) in total.iter_mut().zip(counts) {
                        *t += c;
                    }
                }
                drop(votes);
                if !local_borders.is_empty() {
                    borders.lock().extend(local_borders);
                }
            });
    }

    let winners: HashMap<Point, Biome> = votes
        .into_inner()
        .into_iter()
        .map(|(cell, counts)| (cell, majority(&counts)))
        .collect();
    world.par_columns_mut(|_, col| {
        for y in 0..col.height() {
            let biome = winners.get(&cell_of(col.x, y)).copied().unwrap_or_default();
            *col.biome_mut(y) = BiomeData::pure(biome);
        }
    });
    borders.into_inner()
}

/// Fill the terrain below the surface. Caves are marked with red wire for
/// the comb vote instead of being carved.
fn fill_hex_terrain(offsets: &TerrainOffsets, rnd: &Random, world: &mut World) {
    let levels = world.levels();
    let lava_level = (levels.cavern + 2 * levels.underworld) / 3;
    let ore_limit = ore_threshold(ORE_FACTOR * world.conf.variation.ore);
    let hellstone_limit = -ore_threshold(HELLSTONE_ORE_FACTOR * world.conf.variation.ore);
    let layers = ore_layers(world);
    let noise = &rnd.noise;
    world.par_columns_mut(|view, col| {
        let x = col.x;
        let near_edge = x < 350 || x > levels.width - 350;
        for y in view.surface(x).max(0)..levels.height {
            let data = col.biome(y);
            let threshold = if y < levels.underground {
                3.0 * f64::from(y) / f64::from(levels.underground) - 3.0
            } else {
                f64::from(y - levels.underground) / f64::from(levels.height - levels.underground)
            };
            let soil = noise.fine(x + offsets.deposit[0].x, y + offsets.deposit[1].y) > threshold;
            let mut tile_type = if soil { 0 } else { 2 };
            if let Some(iter) = (0..3).find(|&i| {
                noise.fine(x + offsets.deposit[i].x, y + offsets.deposit[i].y) > 0.7
            }) {
                tile_type = iter + 3;
            }
            if data.active == Biome::Jungle && tile_type == 0 && y > lava_level {
                tile_type = 4;
            }

            let tile = col.tile(y);
            apply_biome_tile(tile, x, y, tile_type, data.active, offsets, noise, &levels);
            if data.active == Biome::Underworld {
                tile.block = BlockId::ASH;
            }
            if is_marble_seam(&data, noise.fine(x, y)) {
                tile.block = BlockId::MARBLE;
                tile.wall = WallId::MARBLE;
            }
            let fy = f64::from(y);
            if let Some(layer) = layers.iter().find(|layer| {
                fy > layer.roof
                    && fy < layer.floor
                    && noise.fine(x + offsets.deposit[layer.noise].x, y + offsets.deposit[layer.noise].y) < ore_limit
            }) {
                tile.block = layer.ore;
            }
            if near_edge && fy < 0.9 * f64::from(levels.underground) {
                continue;
            }
            let mut open = is_cave(x, y, noise, &levels) || is_jungle_cavern(x, y, data.jungle, noise, &levels);
            if snow_cave(x, y, data.snow, noise, &levels) {
                if tile.block == BlockId::SNOW {
                    tile.block = BlockId::THIN_ICE;
                } else {
                    open = true;
                }
            }
            if open {
                tile.flags.set(TileFlags::WIRE_RED, true);
                if y < levels.underground {
                    if let Some(wall) = open_surface_wall(x, y, data.active, offsets, noise) {
                        tile.wall = wall;
                    }
                }
            }
        }

        let h = f64::from(levels.height);
        let underworld_height = f64::from(levels.height - levels.underworld);
        let roof = (f64::from(levels.underworld) + 0.22 * underworld_height + 19.0 * noise.coarse(x, (0.33 * h) as i32)) as i32;
        let floor = (f64::from(levels.underworld) + 0.42 * underworld_height + 35.0 * noise.coarse(x, (0.66 * h) as i32)) as i32;
        let top = levels.underworld + (20.0 * noise.coarse(x, 0)) as i32;
        for y in top.max(0)..levels.height {
            let tile = col.tile(y);
            if y > floor {
                if noise.fine(x, y).abs() > hellstone_limit {
                    tile.block = BlockId::HELLSTONE;
                }
            } else if y > roof && tile.block == BlockId::ASH {
                tile.flags.set(TileFlags::WIRE_RED, true);
            }
        }
    });
}

/// Block and wall counts of one comb cell.
#[derive(Clone, Debug, Default)]
struct CombTally {
    count: u32,
    blocks: BTreeMap<BlockId, u32>,
    walls: BTreeMap<WallId, u32>,
}

/// What a comb cell becomes. `None` keeps each tile's own value.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CombVerdict {
    block: Option<BlockId>,
    wall: Option<WallId>,
    flag: Flag,
}

fn first_max<K: Copy>(counts: &BTreeMap<K, u32>) -> Option<(K, u32)> {
    let mut best: Option<(K, u32)> = None;
    for (key, count) in counts {
        if best.map_or(true, |(_, n)| *count > n) {
            best = Some((*key, *count));
        }
    }
    best
}

impl CombTally {
    fn add(&mut self, block: BlockId, wall: WallId) {
        self.count += 1;
        *self.blocks.entry(block).or_default() += 1;
        *self.walls.entry(wall).or_default() += 1;
    }

    fn merge(&mut self, other: CombTally) {
        self.count += other.count;
        for (block, n) in other.blocks {
            *self.blocks.entry(block).or_default() += n;
        }
        for (wall, n) in other.walls {
            *self.walls.entry(wall).or_default() += n;
        }
    }

    /// Majority block and wall, biased towards open space. A cell whose
    /// ore share is noticeable but not a majority keeps its tiles so veins
    /// survive.
    fn majority(mut self, shallow: bool) -> (Option<BlockId>, Option<WallId>) {
        if let Some(n) = self.blocks.get_mut(&BlockId::EMPTY) {
            *n = (f64::from(*n) * 1.3) as u32;
        }
        if shallow {
            if let Some(n) = self.walls.get_mut(&WallId::EMPTY) {
                *n = (f64::from(*n) * 1.3) as u32;
            }
        }
        let threshold = ((0.6 * f64::from(self.count)) as u32).max(2);
        let block = first_max(&self.blocks).filter(|(_, n)| *n >= threshold).filter(|_| {
            let ore_count: u32 = COMB_ORES.iter().filter_map(|ore| self.blocks.get(ore)).sum();
            !(ore_count < threshold && ore_count > (threshold / 4).max(5))
        });
        let wall = first_max(&self.walls).filter(|(_, n)| *n >= threshold);
        (block.map(|(b, _)| b), wall.map(|(w, _)| w))
    }
}

fn comb_flag(centroid: Point, lava_level: i32, noise: &NoiseField) -> Flag {
    let roll = (99999.0 * (1.0 + noise.fine(centroid.x, centroid.y))) as i64 % 13;
    if roll > 5 {
        Flag::Orange
    } else if roll > 1 {
        Flag::Yellow
    } else if centroid.y > lava_level {
        Flag::CrispyHoney
    } else {
        Flag::Hive
    }
}

/// Turn every small hex cell into one block and wall by majority vote.
fn vote_honeycomb(rnd: &Random, world: &mut World) {
    info!("Generating honeycomb");
    let levels = world.levels();
    let lava_level = (levels.cavern + 2 * levels.underworld) / 3;
    let tallies: Mutex<HashMap<Point, CombTally>> = Mutex::new(HashMap::new());
    {
        let world = &*world;
        parallel::stripe(0..world.width(), parallel::worker_count())
            .into_par_iter()
            .for_each(|stripe| {
                let mut local: HashMap<Point, CombTally> = HashMap::new();
                for x in stripe {
                    for y in 0..world.height() {
                        let tile = world.tile(x, y);
                        let block = if tile.flags.contains(TileFlags::WIRE_RED) {
                            BlockId::EMPTY
                        } else {
                            tile.block
                        };
                        local.entry(hex_centroid(x, y, COMB_SCALE)).or_default().add(block, tile.wall);
                    }
                }
                let mut tallies = tallies.lock();
                for (cell, tally) in local {
                    tallies.entry(cell).or_default().merge(tally);
                }
            });
    }

    let noise = &rnd.noise;
    let verdicts: HashMap<Point, CombVerdict> = tallies
        .into_inner()
        .into_iter()
        .map(|(cell, tally)| {
            let (block, wall) = tally.majority(cell.y < levels.underground);
            (cell, CombVerdict { block, wall, flag: comb_flag(cell, lava_level, noise) })
        })
        .collect();
    world.par_columns_mut(|_, col| {
        for y in 0..col.height() {
            let Some(verdict) = verdicts.get(&hex_centroid(col.x, y, COMB_SCALE)) else {
                continue;
            };
            let tile = col.tile(y);
            tile.flags.set(TileFlags::WIRE_RED, false);
            if let Some(block) = verdict.block {
                tile.block = block;
            }
            if let Some(wall) = verdict.wall {
                tile.wall = wall;
            }
            tile.flag = verdict.flag;
        }
    });
}

/// New surface and grass edits for one column.
fn finish_hex_column(x: i32, noise: &NoiseField, world: &World, levels: &Levels) -> (i32, Vec<(i32, BlockId)>) {
    let surface = scan_while_empty(Point::new(x, (world.surface(x) - 10).max(0)), (0, 1), world).y + 1;
    let mut grass = Vec::new();
    for y in 0..levels.height {
        let block = world.tile(x, y).block;
        let active = world.biome(x, y).active;
        if !world.is_exposed(x, y) {
            let buried = y < levels.underground
                && ((active == Biome::Forest && block == BlockId::DIRT)
                    || (active == Biome::Jungle && block == BlockId::MUD))
                && (99999.0 * (1.0 + noise.fine(x, y))) as i64 % 100 == 0;
            if buried {
                let grown = if active == Biome::Forest { BlockId::GRASS } else { BlockId::JUNGLE_GRASS };
                grass.push((y, grown));
            }
            continue;
        }
        let grown = match (active, block) {
            (Biome::Forest, BlockId::DIRT) if y < levels.underground => Some(BlockId::GRASS),
            (Biome::Jungle, BlockId::MUD) => Some(BlockId::JUNGLE_GRASS),
            (Biome::Underworld, BlockId::ASH) if y < surface + 10 && (x - levels.width / 2).abs() < 100 => {
                Some(BlockId::ASH_GRASS)
            }
            _ => None,
        };
        if let Some(block) = grown {
            grass.push((y, block));
        }
    }
    (surface, grass)
}

/// Hive-queen terrain step.
pub fn gen_hex_terrain(rnd: &mut Random, world: &mut World) {
    world.init_biome_data();
    if world.conf.world.biomes == BiomeLayout::Layers {
        register_layers(rnd, world);
    }
    info!("Generating base terrain");
    rnd.shuffle_noise();
    rnd.save_shuffle_state();
    let offsets = TerrainOffsets::draw(rnd, world);
    compute_surface_level(rnd, world);
    let borders = plan_hex_biomes(rnd, world);
    fill_hex_terrain(&offsets, rnd, world);
    vote_honeycomb(rnd, world);

    let levels = world.levels();
    let noise = &rnd.noise;
    let finished = world.par_collect_columns(|w, x| vec![finish_hex_column(x, noise, w, &levels)]);
    for (x, (surface, grass)) in finished.into_iter().enumerate() {
        let x = x as i32;
        world.set_surface(x, surface);
        for y in 0..=surface.min(levels.height - 1) {
            world.tile_mut(x, y).wall = WallId::EMPTY;
        }
        for (y, block) in grass {
            world.tile_mut(x, y).block = block;
        }
    }
    let center = world.width() / 2;
    world.ctx.spawn = Point::new(center, world.surface(center) - 1);

    for pt in borders {
        for i in -BORDER_PATCH..BORDER_PATCH {
            for j in -BORDER_PATCH..BORDER_PATCH {
                let tile = world.tile_mut(pt.x + i, pt.y + j);
                tile.block = BlockId::HIVE;
                tile.wall = WallId::HIVE;
                tile.flag = Flag::Border;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    #[test]
    fn test_majority_ties_go_to_earlier_biome() {
        assert_eq!(majority(&[0, 4, 4, 1, 0]), Biome::Snow);
        assert_eq!(majority(&[0, 0, 0, 0, 0]), Biome::Forest);
        assert_eq!(majority(&[1, 0, 0, 0, 9]), Biome::Underworld);
    }

    #[test]
    fn test_comb_majority() {
        let mut tally = CombTally::default();
        for _ in 0..7 {
            tally.add(BlockId::STONE, WallId::EMPTY);
        }
        for _ in 0..3 {
            tally.add(BlockId::EMPTY, WallId::DIRT);
        }
        assert_eq!(tally.majority(false), (Some(BlockId::STONE), Some(WallId::EMPTY)));

        // No block reaches 60%.
        let mut tally = CombTally::default();
        for block in [BlockId::STONE, BlockId::DIRT, BlockId::MUD] {
            for _ in 0..4 {
                tally.add(block, WallId::EMPTY);
            }
        }
        assert_eq!(tally.majority(false).0, None);
    }

    #[test]
    fn test_comb_keeps_ore_veins() {
        let mut tally = CombTally::default();
        for (block, n) in [(BlockId::STONE, 61), (BlockId::COPPER_ORE, 20), (BlockId::DIRT, 19)] {
            for _ in 0..n {
                tally.add(block, WallId::EMPTY);
            }
        }
        assert_eq!(tally.majority(false).0, None);
    }

    #[test]
    fn test_gen_hex_terrain() {
        let mut world = test_world(1000, 600);
        world.conf.variation.hive_queen = true;
        let mut rnd = Random::new(21);
        rnd.init_noise(1000, 600, 0.07);
        world.plan_biomes(&mut rnd);
        gen_hex_terrain(&mut rnd, &mut world);

        let mut borders = 0;
        let mut flags: HashMap<Point, Flag> = HashMap::new();
        for x in 0..1000 {
            for y in 0..600 {
                let tile = world.tile(x, y);
                assert!(!tile.flags.contains(TileFlags::WIRE_RED));
                if tile.flag == Flag::Border {
                    borders += 1;
                    continue;
                }
                let cell = hex_centroid(x, y, COMB_SCALE);
                assert_eq!(*flags.entry(cell).or_insert(tile.flag), tile.flag);
            }
        }
        assert!(borders > 0);
        assert_eq!(world.ctx.spawn.x, 500);
    }
}
