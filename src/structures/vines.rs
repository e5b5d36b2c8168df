//! Vines, drips and cave formations
//!
//! Each column is scanned top to bottom once. Grass and leaf ceilings grow
//! vines downward, other ceilings may release a liquid drip, and a small
//! state machine tracking ceiling-gap-floor runs places stalactites under
//! overhangs and stalagmites on cave floors. Columns are independent, so
//! the scan runs in parallel.

use log::info;

use crate::ids::{BlockId, PaintId, WallId};
use crate::random::{fnv1a32pt, NoiseField, Random};
use crate::tile::{Flag, Liquid, Slope, Tile};
use crate::world::{ColumnMut, World};

/// Where the scan is relative to the last ceiling and floor seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Open,
    Ceiling,
    CeilingGap1,
    CeilingGap2,
    CeilingGap3,
    Gap1,
    Gap2,
    Gap3,
    /// Solid ground after a gap of at least three rows.
    Floor,
}

/// Blocks that stalactites and stalagmites grow from.
fn is_formation_rock(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::ICE
            | BlockId::STONE
            | BlockId::STONE_SLAB
            | BlockId::HIVE
            | BlockId::PEARLSTONE
            | BlockId::EBONSTONE
            | BlockId::CRIMSTONE
            | BlockId::SANDSTONE
            | BlockId::GRANITE
            | BlockId::MARBLE
            | BlockId::HALLOWED_ICE
            | BlockId::CORRUPT_ICE
            | BlockId::CRIMSON_ICE
    )
}

impl ScanState {
    fn next(self, tile: &Tile) -> Self {
        use ScanState::*;
        if tile.is_empty() {
            match self {
                Open => Gap1,
                Ceiling | Floor => CeilingGap1,
                CeilingGap1 => CeilingGap2,
                CeilingGap2 => CeilingGap3,
                CeilingGap3 | Gap2 | Gap3 => Gap3,
                Gap1 => Gap2,
            }
        } else if tile.slope == Slope::None && !tile.actuated() && is_formation_rock(tile.block) {
            match self {
                CeilingGap3 | Gap3 => Floor,
                _ => Ceiling,
            }
        } else {
            Open
        }
    }
}

/// Stalactite sprite column for a ceiling block.
fn stalactite_offset(block: BlockId) -> Option<i16> {
    let offset = match block {
        BlockId::ICE => 0,
        BlockId::STONE => 54,
        BlockId::HIVE => 162,
        BlockId::PEARLSTONE => 216,
        BlockId::EBONSTONE => 270,
        BlockId::CRIMSTONE => 324,
        BlockId::SANDSTONE => 378,
        BlockId::GRANITE => 432,
        BlockId::MARBLE => 486,
        BlockId::HALLOWED_ICE => 540,
        BlockId::CORRUPT_ICE => 594,
        BlockId::CRIMSON_ICE => 648,
        _ => return None,
    };
    Some(offset)
}

/// Stalagmites only grow from rock, never from ice.
fn stalagmite_offset(block: BlockId) -> Option<i16> {
    match block {
        BlockId::ICE | BlockId::HALLOWED_ICE | BlockId::CORRUPT_ICE | BlockId::CRIMSON_ICE => None,
        _ => stalactite_offset(block),
    }
}

/// Hang a stalactite below the ceiling tile at row `y`.
fn place_stalactite(col: &mut ColumnMut<'_>, y: i32) {
    let variation = (fnv1a32pt(col.x as u32, y as u32) % 6) as i16;
    let (mut frame_x, mut frame_y, mut height) = if variation > 2 {
        (18 * variation - 54, 72, 1)
    } else {
        (18 * variation, 0, 2)
    };
    let ceiling = *col.get(y);
    let mut paint = ceiling.block_paint;
    if ceiling.wall == WallId::SPIDER && matches!(ceiling.block, BlockId::STONE | BlockId::STONE_SLAB) {
        frame_x += 108;
        frame_y = 0;
        height = 2;
        paint = PaintId::NONE;
    } else {
        let Some(offset) = stalactite_offset(ceiling.block) else {
            return;
        };
        frame_x += offset;
        if ceiling.block == BlockId::HIVE {
            if ceiling.flag == Flag::Border {
                return;
            }
            frame_y = 72;
            height = 1;
        }
    }
    for j in 0..height {
        let tile = col.tile(y + j + 1);
        tile.block = BlockId::STALACTITE;
        tile.frame_x = frame_x;
        tile.frame_y = 18 * j as i16 + frame_y;
        tile.block_paint = paint;
    }
}

/// Raise a stalagmite on the floor tile at row `y`.
fn place_stalagmite(col: &mut ColumnMut<'_>, y: i32) {
    let floor = *col.get(y);
    let Some(offset) = stalagmite_offset(floor.block) else {
        return;
    };
    if floor.block == BlockId::HIVE && floor.flag == Flag::Border {
        return;
    }
    let variation = (fnv1a32pt(col.x as u32, y as u32) % 6) as i16;
    let (frame_x, frame_y, height) = if variation > 2 {
        (18 * variation + offset - 54, 90, 1)
    } else if floor.block == BlockId::HIVE {
        (18 * variation + offset, 90, 1)
    } else {
        (18 * variation + offset, 36, 2)
    };
    for j in 0..height {
        let tile = col.tile(y + j - height);
        tile.block = BlockId::STALACTITE;
        tile.frame_x = frame_x;
        tile.frame_y = 18 * j as i16 + frame_y;
        tile.block_paint = floor.block_paint;
    }
}

fn vine_for(block: BlockId) -> Option<BlockId> {
    let vine = match block {
        BlockId::GRASS | BlockId::LEAF => BlockId::VINES,
        BlockId::JUNGLE_GRASS => BlockId::JUNGLE_VINES,
        BlockId::MAHOGANY_LEAF | BlockId::LIHZAHRD_BRICK => BlockId::VINE_ROPE,
        BlockId::CORRUPT_GRASS | BlockId::CORRUPT_JUNGLE_GRASS => BlockId::CORRUPT_VINES,
        BlockId::CRIMSON_GRASS | BlockId::CRIMSON_JUNGLE_GRASS => BlockId::CRIMSON_VINES,
        BlockId::HALLOWED_GRASS => BlockId::HALLOWED_VINES,
        BlockId::MUSHROOM_GRASS => BlockId::MUSHROOM_VINES,
        BlockId::ASH_GRASS => BlockId::ASH_VINES,
        _ => return None,
    };
    Some(vine)
}

fn drip_for(block: BlockId) -> Option<BlockId> {
    let drip = match block {
        BlockId::DIRT
        | BlockId::STONE
        | BlockId::JUNGLE_GRASS
        | BlockId::CLOUD
        | BlockId::RAIN_CLOUD
        | BlockId::GRANITE
        | BlockId::MARBLE
        | BlockId::LIVING_MAHOGANY
        | BlockId::MAHOGANY_LEAF
        | BlockId::LIHZAHRD_BRICK => BlockId::WATER_DRIP,
        BlockId::ASH | BlockId::ASH_GRASS | BlockId::OBSIDIAN_BRICK | BlockId::HELLSTONE_BRICK => {
            BlockId::LAVA_DRIP
        }
        BlockId::SAND
        | BlockId::HARDENED_SAND
        | BlockId::SANDSTONE
        | BlockId::EBONSAND
        | BlockId::HARDENED_EBONSAND
        | BlockId::EBONSANDSTONE
        | BlockId::CRIMSAND
        | BlockId::HARDENED_CRIMSAND
        | BlockId::CRIMSANDSTONE
        | BlockId::PEARLSAND
        | BlockId::HARDENED_PEARLSAND
        | BlockId::PEARLSANDSTONE => BlockId::SAND_DRIP,
        BlockId::HIVE => BlockId::HONEY_DRIP,
        _ => return None,
    };
    Some(drip)
}

fn grow_column(col: &mut ColumnMut<'_>, noise: &NoiseField, lava_level: i32) {
    let x = col.x;
    let mut vine = BlockId::EMPTY;
    let mut vine_paint = PaintId::NONE;
    let mut vine_len = 0;
    let mut dropper: Option<BlockId> = None;
    let mut state = ScanState::Open;
    for y in 0..col.height() {
        let tile = *col.get(y);
        state = state.next(&tile);
        let roll = (99999.0 * (1.0 + noise.fine(x, y))) as i32;
        if vine_len > 0 {
            if tile.is_empty() && matches!(tile.liquid, Liquid::None | Liquid::Water) {
                let cell = col.tile(y);
                cell.block = vine;
                cell.block_paint = vine_paint;
                state = ScanState::Open;
                vine_len -= 1;
                continue;
            }
            vine_len = 0;
        } else if let Some(drip) = dropper {
            let odds = if drip == BlockId::HONEY_DRIP { 19 } else { 67 };
            if tile.is_empty() && tile.liquid == Liquid::None && roll % odds == 0 {
                col.tile(y).block = if drip == BlockId::WATER_DRIP && y > lava_level && roll % 5 != 0 {
                    BlockId::LAVA_DRIP
                } else {
                    drip
                };
                dropper = None;
                state = ScanState::Open;
                continue;
            }
        }
        if state == ScanState::CeilingGap3 && roll % 7 == 0 {
            place_stalactite(col, y - 3);
            state = ScanState::Gap1;
        } else if state == ScanState::Floor && roll % 11 == 0 {
            place_stalagmite(col, y);
        }
        dropper = None;
        if tile.slope != Slope::None || tile.actuated() {
            continue;
        }
        let grows = if tile.block == BlockId::LIHZAHRD_BRICK {
            roll % 29 == 0
        } else {
            roll % 3 != 0
        };
        match vine_for(tile.block) {
            Some(kind) if grows => {
                vine = if kind == BlockId::VINES && noise.coarse(x, y) > 0.12 {
                    BlockId::FLOWER_VINES
                } else {
                    kind
                };
                vine_paint = if vine == BlockId::VINE_ROPE {
                    PaintId::LIME
                } else {
                    tile.block_paint
                };
                vine_len = 4 + roll % 7;
            }
            _ => dropper = drip_for(tile.block),
        }
    }
}

pub fn gen_vines(rnd: &Random, world: &mut World) {
    info!("Growing vines");
    let lava_level = (world.cavern_level() + 2 * world.underworld_level()) / 3;
    let noise = &rnd.noise;
    world.par_columns_mut(|_, col| grow_column(col, noise, lava_level));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    /// Column 5 holds `block` on the given rows; everything else is air.
    fn column_world(rows: &[(std::ops::Range<i32>, BlockId)]) -> World {
        let mut world = test_world(20, 600);
        for (range, block) in rows {
            for y in range.clone() {
                world.tile_mut(5, y).block = *block;
            }
        }
        world
    }

    /// Noise that makes every roll equal `roll`.
    fn rolling(roll: i32, coarse: f64) -> Random {
        let mut rnd = Random::new(1);
        let fine = (f64::from(roll) + 0.5) / 99999.0 - 1.0;
        rnd.noise = NoiseField::from_fn(20, 600, move |_, _| fine).with_coarse(move |_, _| coarse);
        rnd
    }

    #[test]
    fn test_scan_tracks_ceiling_gaps() {
        let rock = Tile { block: BlockId::STONE, ..Tile::AIR };
        let mut state = ScanState::Open;
        for tile in [rock, Tile::AIR, Tile::AIR, Tile::AIR] {
            state = state.next(&tile);
        }
        assert_eq!(state, ScanState::CeilingGap3);
        assert_eq!(state.next(&rock), ScanState::Floor);
        assert_eq!(ScanState::Floor.next(&Tile::AIR), ScanState::CeilingGap1);
        let dirt = Tile { block: BlockId::DIRT, ..Tile::AIR };
        assert_eq!(ScanState::Gap3.next(&dirt), ScanState::Open);
    }

    #[test]
    fn test_vines_hang_from_grass() {
        let mut world = column_world(&[(10..11, BlockId::GRASS), (31..40, BlockId::STONE)]);
        gen_vines(&rolling(49999, -0.5), &mut world);
        // 4 + 49999 % 7 rows of vine.
        for y in 11..20 {
            assert_eq!(world.tile(5, y).block, BlockId::VINES);
        }
        assert!(world.tile(5, 20).is_empty());
    }

    #[test]
    fn test_flower_vines_in_bloom() {
        let mut world = column_world(&[(10..11, BlockId::GRASS)]);
        gen_vines(&rolling(49999, 0.5), &mut world);
        assert_eq!(world.tile(5, 11).block, BlockId::FLOWER_VINES);
    }

    #[test]
    fn test_stalactite_under_overhang() {
        let mut world = column_world(&[(10..11, BlockId::STONE), (40..45, BlockId::STONE)]);
        gen_vines(&rolling(59997, -0.5), &mut world);
        let cell = world.tile(5, 11);
        assert_eq!(cell.block, BlockId::STALACTITE);
        assert!((54..=108).contains(&cell.frame_x));
        assert!(world.tile(5, 13).is_empty());
    }

    #[test]
    fn test_stalagmite_on_floor() {
        let mut world = column_world(&[(30..40, BlockId::STONE)]);
        gen_vines(&rolling(59994, -0.5), &mut world);
        assert_eq!(world.tile(5, 29).block, BlockId::STALACTITE);
        assert!(world.tile(5, 27).is_empty());
    }

    #[test]
    fn test_drip_below_dirt() {
        let mut world = column_world(&[(10..11, BlockId::DIRT)]);
        gen_vines(&rolling(67 * 896, -0.5), &mut world);
        assert_eq!(world.tile(5, 11).block, BlockId::WATER_DRIP);
        assert!(world.tile(5, 12).is_empty());
    }

    #[test]
    fn test_hive_border_grows_nothing() {
        let mut world = column_world(&[(30..40, BlockId::HIVE)]);
        world.tile_mut(5, 30).flag = Flag::Border;
        gen_vines(&rolling(59994, -0.5), &mut world);
        assert!(world.tile(5, 29).is_empty());
    }
}
