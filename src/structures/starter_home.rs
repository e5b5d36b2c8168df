//! The player's starter home at spawn, themed after the ground it sits on.

use log::{debug, info};

use crate::ids::{BlockId, PaintId, WallId};
use crate::point::Point;
use crate::random::Random;
use crate::stamps;
use crate::structures::loot::{self, LootKind, StarterKit};
use crate::structures::scan_while_empty;
use crate::tile::{Flag, Liquid};
use crate::tile_buffer::TileBuffer;
use crate::world::World;

const HIVE_CLEAR_RADIUS: i32 = 30;

/// Building material set for the home.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Theme {
    AshWood,
    Boreal,
    Forest,
    Granite,
    Honey,
    LivingWood,
    Mahogany,
    Marble,
    Palm,
    Skyware,
}

impl Theme {
    /// Block the stamp's dirt foundation becomes.
    fn ground(self) -> BlockId {
        match self {
            Theme::AshWood => BlockId::ASH,
            Theme::Boreal => BlockId::SNOW,
            Theme::Granite => BlockId::GRANITE,
            Theme::Honey | Theme::Mahogany => BlockId::MUD,
            Theme::Marble => BlockId::MARBLE,
            Theme::Palm => BlockId::SAND,
            _ => BlockId::DIRT,
        }
    }
}

/// Stamp material substitutions for one theme.
struct Palette {
    blocks: Vec<(BlockId, BlockId)>,
    walls: Vec<(WallId, WallId)>,
}

impl Palette {
    /// `ground_theme` is the theme detected from the terrain, which decides
    /// the foundation of sky homes.
    fn roll(theme: Theme, ground_theme: Theme, rnd: &mut Random) -> Self {
        let mut blocks = Vec::new();
        let mut walls = Vec::new();
        match theme {
            Theme::AshWood => {
                blocks.extend([(BlockId::WOOD, BlockId::ASH_WOOD), (BlockId::DIRT, BlockId::ASH)]);
                walls.extend([
                    (WallId::WOOD, WallId::ASH_WOOD),
                    (WallId::PLANKED, rnd.select(&[WallId::OBSIDIAN_BRICK_PLACED, WallId::PLANKED])),
                    (WallId::STONE_PLACED, rnd.select(&[WallId::EMBER_PLACED, WallId::WORN_STONE_PLACED])),
                ]);
            }
            Theme::Boreal => {
                blocks.extend([
                    (BlockId::WOOD, BlockId::BOREAL_WOOD),
                    (BlockId::WOODEN_BEAM, BlockId::BOREAL_BEAM),
                    (BlockId::GRAY_BRICK, rnd.select(&[BlockId::SNOW_BRICK, BlockId::ICE_BRICK])),
                    (BlockId::DIRT, BlockId::SNOW),
                ]);
                walls.extend([
                    (WallId::WOOD, WallId::BOREAL_WOOD),
                    (WallId::STONE_PLACED, rnd.select(&[WallId::SNOW_PLACED, WallId::ICE_PLACED])),
                ]);
            }
            Theme::Forest => {
                walls.push((WallId::STONE_PLACED, rnd.select(&[WallId::MUDSTONE_BRICK, WallId::STONE_PLACED])));
            }
            Theme::Granite => {
                blocks.extend([
                    (BlockId::WOOD, BlockId::SMOOTH_GRANITE),
                    (BlockId::WOODEN_BEAM, BlockId::GRANITE_COLUMN),
                    (BlockId::GRAY_BRICK, rnd.select(&[BlockId::OBSIDIAN_BRICK, BlockId::GRAY_BRICK])),
                    (BlockId::DIRT, BlockId::GRANITE),
                ]);
                walls.extend([
                    (WallId::WOOD, WallId::SMOOTH_GRANITE),
                    (WallId::PLANKED, rnd.select(&[WallId::SHADEWOOD, WallId::SPOOKY_WOOD])),
                    (WallId::STONE_PLACED, rnd.select(&[WallId::GRANITE_PLACED, WallId::OBSIDIAN])),
                ]);
            }
            Theme::Honey => {
                blocks.extend([
                    (BlockId::WOOD, BlockId::HONEY),
                    (BlockId::WOODEN_BEAM, BlockId::RICH_MAHOGANY_BEAM),
                    (BlockId::GRAY_BRICK, rnd.select(&[BlockId::HIVE, BlockId::RICH_MAHOGANY])),
                    (BlockId::DIRT, BlockId::MUD),
                ]);
                walls.extend([
                    (WallId::WOOD, WallId::HAY),
                    (WallId::PLANKED, rnd.select(&[WallId::HONEYFALL, WallId::IRIDESCENT_BRICK])),
                    (
                        WallId::STONE_PLACED,
                        rnd.select(&[
                            WallId::BAMBOO,
                            WallId::LARGE_BAMBOO,
                            WallId::LICHEN_STONE_PLACED,
                            WallId::LEAFY_JUNGLE_PLACED,
                        ]),
                    ),
                ]);
            }
            Theme::LivingWood => {
                blocks.extend([(BlockId::WOOD, BlockId::LIVING_WOOD), (BlockId::DIRT, BlockId::LEAF)]);
                walls.extend([
                    (WallId::WOOD, WallId::LIVING_WOOD_PLACED),
                    (WallId::PLANKED, rnd.select(&[WallId::LIVING_LEAF, WallId::PLANKED])),
                    (WallId::STONE_PLACED, rnd.select(&[WallId::MUDSTONE_BRICK, WallId::STONE_PLACED])),
                ]);
            }
            Theme::Mahogany => {
                blocks.extend([
                    (BlockId::WOOD, BlockId::RICH_MAHOGANY),
                    (BlockId::WOODEN_BEAM, BlockId::RICH_MAHOGANY_BEAM),
                    (BlockId::GRAY_BRICK, rnd.select(&[BlockId::IRIDESCENT_BRICK, BlockId::MUDSTONE_BRICK])),
                    (BlockId::DIRT, BlockId::MUD),
                ]);
                walls.extend([
                    (WallId::WOOD, WallId::RICH_MAHOGANY),
                    (WallId::PLANKED, rnd.select(&[WallId::WHITE_DYNASTY, WallId::BLUE_DYNASTY])),
                    (
                        WallId::STONE_PLACED,
                        rnd.select(&[WallId::BAMBOO, WallId::LARGE_BAMBOO, WallId::RICH_MAHOGANY_FENCE]),
                    ),
                ]);
            }
            Theme::Marble => {
                blocks.extend([
                    (BlockId::WOOD, BlockId::SMOOTH_MARBLE),
                    (BlockId::WOODEN_BEAM, BlockId::MARBLE_COLUMN),
                    (BlockId::GRAY_BRICK, rnd.select(&[BlockId::GRAY_BRICK, BlockId::PEARLSTONE_BRICK])),
                    (BlockId::DIRT, BlockId::MARBLE),
                ]);
                walls.extend([
                    (WallId::WOOD, WallId::SMOOTH_MARBLE),
                    (WallId::PLANKED, rnd.select(&[WallId::FANCY_GRAY_WALLPAPER, WallId::PLATINUM_BRICK])),
                    (WallId::STONE_PLACED, rnd.select(&[WallId::MARBLE_PLACED, WallId::STALACTITE_STONE_PLACED])),
                ]);
            }
            Theme::Palm => {
                blocks.extend([
                    (BlockId::WOOD, BlockId::PALM_WOOD),
                    (BlockId::WOODEN_BEAM, BlockId::SANDSTONE_COLUMN),
                    (BlockId::GRAY_BRICK, rnd.select(&[BlockId::SANDSTONE_BRICK, BlockId::TIN_BRICK])),
                    (BlockId::DIRT, BlockId::SAND),
                ]);
                walls.extend([
                    (WallId::WOOD, WallId::PALM_WOOD),
                    (WallId::PLANKED, rnd.select(&[WallId::PALM_WOOD_FENCE, WallId::PLANKED])),
                    (WallId::STONE_PLACED, rnd.select(&[WallId::HARDENED_SAND_PLACED, WallId::SANDSTONE_PLACED])),
                ]);
            }
            Theme::Skyware => {
                blocks.extend([
                    (BlockId::WOOD, BlockId::SUNPLATE),
                    (BlockId::WOODEN_BEAM, BlockId::SANDSTONE_COLUMN),
                    (BlockId::GRAY_BRICK, rnd.select(&[BlockId::TIN_BRICK, BlockId::PEARLSTONE_BRICK])),
                    (BlockId::DIRT, ground_theme.ground()),
                ]);
                walls.extend([
                    (WallId::WOOD, WallId::DISC),
                    (WallId::PLANKED, rnd.select(&[WallId::WHITE_DYNASTY, WallId::BLUE_DYNASTY])),
                    (WallId::STONE_PLACED, rnd.select(&[WallId::LICHEN_STONE_PLACED, WallId::MUDSTONE_BRICK])),
                ]);
            }
        }
        if !blocks.iter().any(|&(from, _)| from == BlockId::GRAY_BRICK) {
            let brick = rnd.select(&[BlockId::GRAY_BRICK, BlockId::RED_BRICK, BlockId::TIN_BRICK]);
            blocks.push((BlockId::GRAY_BRICK, brick));
        }
        let mut palette = Palette { blocks, walls };
        palette.walls.push((WallId::GRAY_BRICK, brick_wall(palette.block(BlockId::GRAY_BRICK))));
        palette
    }

    fn block(&self, block: BlockId) -> BlockId {
        self.blocks.iter().find(|&&(from, _)| from == block).map_or(block, |&(_, to)| to)
    }

    fn wall(&self, wall: WallId) -> WallId {
        self.walls.iter().find(|&&(from, _)| from == wall).map_or(wall, |&(_, to)| to)
    }
}

/// Wall matching a brick block.
fn brick_wall(brick: BlockId) -> WallId {
    match brick {
        BlockId::HIVE => WallId::HIVE_PLACED,
        BlockId::ICE_BRICK => WallId::ICE_BRICK,
        BlockId::IRIDESCENT_BRICK => WallId::IRIDESCENT_BRICK,
        BlockId::MUDSTONE_BRICK => WallId::MUDSTONE_BRICK,
        BlockId::OBSIDIAN_BRICK => WallId::OBSIDIAN_BRICK_PLACED,
        BlockId::PEARLSTONE_BRICK => WallId::PEARLSTONE_BRICK,
        BlockId::RED_BRICK => WallId::RED_BRICK,
        BlockId::RICH_MAHOGANY => WallId::RICH_MAHOGANY,
        BlockId::SANDSTONE_BRICK => WallId::SANDSTONE_BRICK,
        BlockId::SNOW_BRICK => WallId::SNOW_BRICK,
        BlockId::TIN_BRICK => WallId::TIN_BRICK,
        _ => WallId::GRAY_BRICK,
    }
}

/// Natural blocks the player may dig out of the home's foundation.
fn is_unguarded_block(block: BlockId) -> bool {
    matches!(
        block,
        BlockId::ASH
            | BlockId::DIRT
            | BlockId::GRANITE
            | BlockId::LEAF
            | BlockId::MUD
            | BlockId::MARBLE
            | BlockId::SAND
            | BlockId::SNOW
    )
}

fn grass_for(block: BlockId) -> Option<BlockId> {
    match block {
        BlockId::ASH => Some(BlockId::ASH_GRASS),
        BlockId::DIRT => Some(BlockId::GRASS),
        BlockId::MUD => Some(BlockId::JUNGLE_GRASS),
        _ => None,
    }
}

fn soil_for(grass: BlockId) -> Option<BlockId> {
    match grass {
        BlockId::ASH_GRASS => Some(BlockId::ASH),
        BlockId::GRASS | BlockId::HALLOWED_GRASS => Some(BlockId::DIRT),
        BlockId::JUNGLE_GRASS => Some(BlockId::MUD),
        _ => None,
    }
}

fn is_open_above(x: i32, y: i32, world: &World) -> bool {
    world.region_passes(x, y, 1, 4, |tile| tile.is_empty())
}

/// First solid row of column `x`, skipping over floating islands and
/// overhangs left above the cached surface.
fn real_surface_at(x: i32, world: &World, prev_y: Option<i32>) -> i32 {
    let mut min_y = world.surface(x) - 2;
    if !is_open_above(x, min_y - 5, world) {
        min_y -= 73;
    }
    if let Some(prev_y) = prev_y {
        min_y = min_y.min(prev_y);
    }
    while !world.tile(x, min_y).is_empty() {
        min_y -= 1;
    }
    scan_while_empty(Point::new(x, min_y), (0, 1), world).y + 1
}

/// Floor of the cave pocket holding `prev_y`, for spawns underground.
fn scan_for_surface_at(x: i32, world: &World, prev_y: i32) -> i32 {
    let mut min_y = prev_y;
    while !is_open_above(x, min_y - 3, world) {
        min_y -= 1;
        if min_y < 50 {
            return prev_y;
        }
    }
    scan_while_empty(Point::new(x, min_y), (0, 1), world).y + 1
}

/// Open up hive comb walls around spawn.
fn clear_spawn_hive(near_surface: bool, world: &mut World) {
    let x = world.ctx.spawn.x;
    let y = if near_surface { world.surface(x) } else { world.ctx.spawn.y };
    let r = HIVE_CLEAR_RADIUS;
    for i in -r..r {
        let max_j = if near_surface { r } else { 3 };
        for j in -r..max_j {
            if near_surface && y + j >= world.surface(x + i) {
                break;
            }
            let tile = world.tile_mut(x + i, y + j);
            if tile.flag == Flag::Border
                && matches!(tile.block, BlockId::HIVE | BlockId::CRISPY_HONEY)
                && f64::from(i).hypot(f64::from(j)) < f64::from(r)
            {
                tile.block = BlockId::EMPTY;
            }
        }
    }
}

/// Theme from the six tiles below `(x, y)` and the nearby area.
fn detect_theme(x: i32, y: i32, world: &World) -> Theme {
    let column: Vec<BlockId> = (0..6).map(|j| world.tile(x, y + j).block).collect();
    let count = |blocks: &[BlockId]| column.iter().filter(|b| blocks.contains(b)).count();
    let mut theme = if count(&[BlockId::ASH, BlockId::HELLSTONE]) > 2 {
        Theme::AshWood
    } else if count(&[BlockId::SNOW]) > 2 {
        Theme::Boreal
    } else if count(&[BlockId::GRANITE, BlockId::SMOOTH_GRANITE]) > 2 {
        Theme::Granite
    } else if (count(&[BlockId::JUNGLE_GRASS]) > 0 && count(&[BlockId::MUD]) > 1)
        || count(&[BlockId::LIVING_MAHOGANY]) > 2
    {
        Theme::Mahogany
    } else if count(&[BlockId::MARBLE, BlockId::SMOOTH_MARBLE]) > 2 {
        Theme::Marble
    } else if count(&[BlockId::SAND, BlockId::PEARLSAND]) > 2 {
        Theme::Palm
    } else if count(&[BlockId::LEAF]) > 2
        || !world.region_passes(x - 100, y, 200, 1, |tile| tile.block != BlockId::LIVING_WOOD)
    {
        Theme::LivingWood
    } else {
        Theme::Forest
    };
    if matches!(theme, Theme::Forest | Theme::Mahogany)
        && !world.region_passes(x - 20, y - 2, 40, 8, |tile| {
            tile.wall != WallId::HIVE && tile.liquid != Liquid::Honey
        })
    {
        theme = Theme::Honey;
    }
    theme
}

/// Stamp `home` with its top-left corner at `(x, y)`. Foundation cells
/// that would sink into solid ground are left out.
fn place_home_at(x: i32, y: i32, theme: Theme, ground_theme: Theme, home: &TileBuffer, rnd: &mut Random, world: &mut World) {
    let palette = Palette::roll(theme, ground_theme, rnd);
    let (width, height) = (home.width(), home.height());
    let mut placed = Vec::new();
    for i in 0..width {
        let mut num_solid = 0;
        for j in 0..height {
            let buried = num_solid > 1;
            let ground = *world.tile(x + i, y + j);
            if ground.guarded {
                continue;
            }
            if !ground.is_empty()
                && (ground.block != BlockId::THIN_ICE || !world.tile(x + i, y + j + 1).is_empty())
                && j > height / 2
            {
                num_solid += 1;
                continue;
            }
            let mut cell = *home.tile(i, j);
            if buried || (cell.is_empty() && cell.wall.is_empty()) {
                continue;
            }
            placed.push(Point::new(x + i, y + j));
            if cell.block == BlockId::CHEST && cell.frame_x % 36 == 0 && cell.frame_y == 0 {
                let kind = StarterKit::from_equipment(world.conf.variation.equipment)
                    .map_or(LootKind::Surface, LootKind::Starter);
                let items = loot::roll_loot(kind, Point::new(x + i, y + j), rnd, world);
                let chest = world.register_storage(x + i, y + j);
                for item in items {
                    if !chest.push(item) {
                        break;
                    }
                }
            }
            cell.block = palette.block(cell.block);
            cell.wall = palette.wall(cell.wall);
            if ground.block == BlockId::THIN_ICE && cell.is_empty() {
                cell.block = BlockId::THIN_ICE;
            }
            cell.liquid = ground.liquid;
            cell.guarded = !is_unguarded_block(cell.block);
            *world.tile_mut(x + i, y + j) = cell;
        }
    }
    let underground = world.underground_level();
    for pt in placed {
        let block = world.tile_at(pt).block;
        let exposed = world.is_exposed(pt.x, pt.y);
        match (grass_for(block), soil_for(block)) {
            (Some(grass), _) if exposed && (y < underground || grass != BlockId::GRASS) => {
                world.tile_at_mut(pt).block = grass;
            }
            (_, Some(soil)) if !exposed => world.tile_at_mut(pt).block = soil,
            _ => {}
        }
    }
}

pub fn gen_starter_home(rnd: &mut Random, world: &mut World) {
    info!("Purchasing property");
    let spawn = world.ctx.spawn;
    let near_surface = (world.surface(spawn.x) - spawn.y).abs() < 30;
    if world.conf.variation.hive_queen {
        clear_spawn_hive(near_surface, world);
    }
    let surface_at = |x: i32, prev_y: i32, world: &World| {
        if near_surface {
            real_surface_at(x, world, Some(prev_y))
        } else {
            scan_for_surface_at(x, world, prev_y)
        }
    };
    let mut y = surface_at(spawn.x, spawn.y, world);
    let ground_theme = detect_theme(spawn.x, y, world);
    let theme = if f64::from(y) < 0.45 * f64::from(world.underground_level()) {
        Theme::Skyware
    } else {
        ground_theme
    };
    debug!("Starter home theme {:?}", theme);
    let home = TileBuffer::decode(rnd.select(stamps::HOMES));
    let x = spawn.x - home.width() / 2;
    for _ in 0..2 {
        for i in 7..home.width() - 7 {
            y = y.min(surface_at(x + i, y, world));
        }
    }
    world.ctx.spawn.y = y - 1;
    for j in 0..home.height() {
        y -= 1;
        if home.tile(0, j).block_paint == PaintId::RED {
            break;
        }
    }
    place_home_at(x, y, theme, ground_theme, &home, rnd, world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Rect;
    use crate::world::test_world;

    fn meadow(ground: BlockId) -> World {
        let mut world = test_world(400, 600);
        for pt in Rect::new(0, 150, 400, 450).points() {
            world.tile_at_mut(pt).block = ground;
        }
        world.rescan_surface();
        world.ctx.spawn = Point::new(200, 150);
        world
    }

    #[test]
    fn test_theme_follows_ground() {
        assert_eq!(detect_theme(200, 150, &meadow(BlockId::DIRT)), Theme::Forest);
        assert_eq!(detect_theme(200, 150, &meadow(BlockId::SNOW)), Theme::Boreal);
        assert_eq!(detect_theme(200, 150, &meadow(BlockId::SAND)), Theme::Palm);
        let mut world = meadow(BlockId::DIRT);
        world.tile_mut(210, 152).wall = WallId::HIVE;
        assert_eq!(detect_theme(200, 150, &world), Theme::Honey);
    }

    #[test]
    fn test_real_surface_climbs_stale_cache() {
        let mut world = meadow(BlockId::DIRT);
        assert_eq!(real_surface_at(200, &world, None), 150);
        // Blocks piled on top after the surface was cached.
        for y in 145..150 {
            world.tile_mut(200, y).block = BlockId::DIRT;
        }
        assert_eq!(real_surface_at(200, &world, None), 145);
        assert_eq!(real_surface_at(200, &world, Some(120)), 145);
    }

    #[test]
    fn test_palette_brick_walls_match() {
        let mut rnd = Random::new(4);
        for theme in [Theme::Boreal, Theme::Honey, Theme::Palm, Theme::Forest] {
            let palette = Palette::roll(theme, Theme::Forest, &mut rnd);
            let brick = palette.block(BlockId::GRAY_BRICK);
            assert_eq!(palette.wall(WallId::GRAY_BRICK), brick_wall(brick));
        }
        let sky = Palette::roll(Theme::Skyware, Theme::Boreal, &mut rnd);
        assert_eq!(sky.block(BlockId::DIRT), BlockId::SNOW);
        assert_eq!(sky.block(BlockId::WOOD), BlockId::SUNPLATE);
    }

    #[test]
    fn test_gen_starter_home() {
        let mut world = meadow(BlockId::DIRT);
        let mut rnd = Random::new(9);
        rnd.init_noise(400, 600, 0.07);
        gen_starter_home(&mut rnd, &mut world);
        assert_eq!(world.ctx.spawn.y, 149);
        assert_eq!(world.chests().len(), 1);
        let chest = &world.chests()[0];
        assert!(!chest.is_empty());
        let (cx, cy) = (chest.x, chest.y);
        assert_eq!(world.tile(cx, cy).block, BlockId::CHEST);
        assert!(world.tile(cx, cy).guarded);
        // Forest homes keep their wooden floor on the ground row.
        assert_eq!(world.tile(cx, 149).block, BlockId::WOOD);
        assert_eq!(world.tile(cx, 155).block, BlockId::DIRT);
    }

    #[test]
    fn test_home_fills_missing_ground() {
        let mut world = meadow(BlockId::DIRT);
        for pt in Rect::new(180, 150, 40, 3).points() {
            world.tile_at_mut(pt).clear_block();
        }
        let home = TileBuffer::decode(stamps::COTTAGE);
        let mut rnd = Random::new(2);
        rnd.init_noise(400, 600, 0.07);
        place_home_at(191, 141, Theme::Forest, Theme::Forest, &home, &mut rnd, &mut world);
        // Brick course under the floor lands in the gap.
        assert!(matches!(
            world.tile(195, 150).block,
            BlockId::GRAY_BRICK | BlockId::RED_BRICK | BlockId::TIN_BRICK
        ));
        assert!(world.tile(195, 150).guarded);
        // Foundation dirt is left diggable.
        assert!(!world.tile(195, 151).guarded);
    }

    #[test]
    fn test_home_keeps_off_guarded_cells() {
        let mut world = meadow(BlockId::DIRT);
        let claimed = Rect::new(191, 141, 6, 9);
        for pt in claimed.points() {
            world.tile_at_mut(pt).guarded = true;
        }
        let home = TileBuffer::decode(stamps::COTTAGE);
        let mut rnd = Random::new(2);
        rnd.init_noise(400, 600, 0.07);
        place_home_at(191, 141, Theme::Forest, Theme::Forest, &home, &mut rnd, &mut world);
        for pt in claimed.points() {
            assert!(world.tile_at(pt).is_empty(), "{:?} built over", pt);
            assert!(world.tile_at(pt).wall.is_empty());
        }
        assert!(Rect::new(197, 141, home.width() - 6, 9)
            .points()
            .any(|pt| !world.tile_at(pt).wall.is_empty()));
    }

    #[test]
    fn test_clear_spawn_hive_opens_border() {
        let mut world = meadow(BlockId::DIRT);
        for pt in Rect::new(190, 130, 20, 10).points() {
            let tile = world.tile_at_mut(pt);
            tile.block = BlockId::HIVE;
            tile.flag = Flag::Border;
        }
        world.tile_mut(195, 135).flag = Flag::None;
        clear_spawn_hive(false, &mut world);
        assert!(world.tile(200, 135).is_empty());
        assert_eq!(world.tile(195, 135).block, BlockId::HIVE);
    }
}
