//! Multi-tile framed objects
//!
//! Chests, pots, altars, plants and similar objects occupy a small footprint
//! of cells whose frame coordinates select the sprite. The footprint size and
//! base frame offset depend on the block and a style `Variant`; some objects
//! additionally cycle through sprite alternatives keyed on a coordinate hash
//! so repeated placements do not look identical.

use crate::ids::BlockId;
use crate::random::hash_point;

/// Style selector for framed objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    None,
    // Materials and biomes
    Ash,
    AshWood,
    Barrel,
    Bone,
    Corruption,
    Crimson,
    Crystal,
    DeadMans,
    Desert,
    Dirt,
    DryBone,
    Dungeon,
    Dynasty,
    Flesh,
    Forest,
    Frozen,
    Furniture,
    Gold,
    GoldLocked,
    Granite,
    Hallowed,
    Honey,
    Ice,
    Ivy,
    Jungle,
    Lesion,
    Lihzahrd,
    LivingLeaf,
    LivingWood,
    Marble,
    Meteorite,
    Mushroom,
    Obsidian,
    PalmWood,
    Pearlwood,
    Pyramid,
    Reef,
    RichMahogany,
    Sandstone,
    Shadow,
    Skyware,
    Spider,
    Stone,
    Tundra,
    Underworld,
    Water,
    // Traps
    DartLeft,
    DartRight,
    FlameLeft,
    FlameRight,
    Spear,
    SpikyBall,
    SuperDartLeft,
    SuperDartRight,
}

impl Variant {
    /// Chest styles that live in the second chest sprite sheet.
    fn is_chest_group2(self) -> bool {
        matches!(
            self,
            Self::AshWood
                | Self::Crystal
                | Self::DeadMans
                | Self::Desert
                | Self::Lesion
                | Self::Reef
                | Self::Sandstone
        )
    }
}

/// Resolved placement of one framed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    pub block: BlockId,
    pub width: i32,
    pub height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Footprint {
    /// Frame coordinates of cell `(i, j)` inside the footprint.
    pub fn frame(&self, i: i32, j: i32) -> (i16, i16) {
        ((18 * i + self.offset_x) as i16, (18 * j + self.offset_y) as i16)
    }
}

/// Base `(width, height, offset_x, offset_y)` for a block and style.
fn base_frame(block: BlockId, variant: Variant) -> Option<(i32, i32, i32, i32)> {
    use Variant as V;
    let frame = match (block, variant) {
        (BlockId::ALTAR, V::Corruption) => (3, 2, 0, 0),
        (BlockId::ALTAR, V::Crimson) => (3, 2, 54, 0),
        (BlockId::ASH_PLANT, V::None) => (1, 1, 0, 0),
        (BlockId::CHEST, V::Barrel) => (2, 2, 180, 0),
        (BlockId::CHEST, V::Corruption) => (2, 2, 864, 0),
        (BlockId::CHEST, V::Crimson) => (2, 2, 900, 0),
        (BlockId::CHEST, V::Flesh) => (2, 2, 1548, 0),
        (BlockId::CHEST, V::Frozen) => (2, 2, 396, 0),
        (BlockId::CHEST, V::Gold) => (2, 2, 36, 0),
        (BlockId::CHEST, V::GoldLocked) => (2, 2, 72, 0),
        (BlockId::CHEST, V::Granite) => (2, 2, 1800, 0),
        (BlockId::CHEST, V::Hallowed) => (2, 2, 936, 0),
        (BlockId::CHEST, V::Honey) => (2, 2, 1044, 0),
        (BlockId::CHEST, V::Ice) => (2, 2, 972, 0),
        (BlockId::CHEST, V::Ivy) => (2, 2, 360, 0),
        (BlockId::CHEST, V::Jungle) => (2, 2, 828, 0),
        (BlockId::CHEST, V::Lihzahrd) => (2, 2, 576, 0),
        (BlockId::CHEST, V::LivingWood) => (2, 2, 432, 0),
        (BlockId::CHEST, V::Marble) => (2, 2, 1836, 0),
        (BlockId::CHEST, V::Meteorite) => (2, 2, 1764, 0),
        (BlockId::CHEST, V::Mushroom) => (2, 2, 1152, 0),
        (BlockId::CHEST, V::PalmWood) => (2, 2, 1116, 0),
        (BlockId::CHEST, V::Pearlwood) => (2, 2, 324, 0),
        (BlockId::CHEST, V::RichMahogany) => (2, 2, 288, 0),
        (BlockId::CHEST, V::Shadow) => (2, 2, 144, 0),
        (BlockId::CHEST, V::Skyware) => (2, 2, 468, 0),
        (BlockId::CHEST, V::Spider) => (2, 2, 540, 0),
        (BlockId::CHEST, V::Water) => (2, 2, 612, 0),
        (BlockId::CHEST_GROUP2, V::AshWood) => (2, 2, 576, 0),
        (BlockId::CHEST_GROUP2, V::DeadMans) => (2, 2, 144, 0),
        (BlockId::CHEST_GROUP2, V::Desert) => (2, 2, 468, 0),
        (BlockId::CHEST_GROUP2, V::Lesion) => (2, 2, 108, 0),
        (BlockId::CHEST_GROUP2, V::Reef) => (2, 2, 504, 0),
        (BlockId::CHEST_GROUP2, V::Sandstone) => (2, 2, 360, 0),
        (BlockId::CORRUPT_PLANT, V::None) | (BlockId::CRIMSON_PLANT, V::None) => (1, 1, 0, 0),
        (BlockId::DOOR, V::Dungeon) => (1, 3, 0, 702),
        (BlockId::DOOR, V::Lihzahrd) => (1, 3, 0, 594),
        (BlockId::DOOR, V::Mushroom) => (1, 3, 0, 324),
        (BlockId::DOOR, V::Obsidian) => (1, 3, 0, 1026),
        (BlockId::FALLEN_LOG, V::None) => (3, 2, 0, 0),
        (BlockId::GRASS_PLANT, V::None) => (1, 1, 0, 0),
        (BlockId::JUNGLE_PLANT, V::None) => (1, 1, 0, 0),
        (BlockId::LAMP, V::Crystal) => (1, 3, 0, 1674),
        (BlockId::LAMP, V::Dynasty) => (1, 3, 0, 918),
        (BlockId::LAMP, V::Flesh) => (1, 3, 0, 162),
        (BlockId::LAMP, V::Frozen) => (1, 3, 0, 270),
        (BlockId::LAMP, V::Lesion) => (1, 3, 0, 1782),
        (BlockId::LAMP, V::Lihzahrd) => (1, 3, 0, 432),
        (BlockId::LAMP, V::Sandstone) => (1, 3, 0, 2052),
        (BlockId::LARGE_PILE, V::Bone) => (3, 2, 0, 0),
        (BlockId::LARGE_PILE, V::Furniture) => (3, 2, 1188, 0),
        (BlockId::LARGE_PILE, V::Ice) => (3, 2, 1404, 0),
        (BlockId::LARGE_PILE, V::Mushroom) => (3, 2, 1728, 0),
        (BlockId::LARGE_PILE, V::Stone) => (3, 2, 378, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Ash) => (3, 2, 324, 0),
        (BlockId::LARGE_PILE_GROUP2, V::DryBone) => (3, 2, 2808, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Forest) => (3, 2, 756, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Granite) => (3, 2, 1890, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Jungle) => (3, 2, 0, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Lihzahrd) => (3, 2, 972, 0),
        (BlockId::LARGE_PILE_GROUP2, V::LivingWood) => (3, 2, 2538, 0),
        (BlockId::LARGE_PILE_GROUP2, V::LivingLeaf) => (3, 2, 2700, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Marble) => (3, 2, 2214, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Sandstone) => (3, 2, 1566, 0),
        (BlockId::LARGE_PILE_GROUP2, V::Spider) => (3, 2, 486, 0),
        (BlockId::LARVA, V::None) => (3, 3, 0, 0),
        (BlockId::LIHZAHRD_ALTAR, V::None) => (3, 2, 0, 0),
        (BlockId::MUSHROOM_PLANT, V::None) => (1, 1, 0, 0),
        (BlockId::ORB_HEART, V::Crimson) => (2, 2, 36, 0),
        (BlockId::POT, V::Corruption) => (2, 2, 0, 576),
        (BlockId::POT, V::Crimson) => (2, 2, 0, 792),
        (BlockId::POT, V::Desert) => (2, 2, 0, 1224),
        (BlockId::POT, V::Dungeon) => (2, 2, 0, 360),
        (BlockId::POT, V::Jungle) => (2, 2, 0, 252),
        (BlockId::POT, V::Lihzahrd) => (2, 2, 0, 1008),
        (BlockId::POT, V::Marble) => (2, 2, 0, 1116),
        (BlockId::POT, V::Pyramid) => (2, 2, 0, 900),
        (BlockId::POT, V::Spider) => (2, 2, 0, 684),
        (BlockId::POT, V::Tundra) => (2, 2, 0, 144),
        (BlockId::POT, V::Underworld) => (2, 2, 0, 468),
        (BlockId::PRESSURE_PLATE, V::Lihzahrd) => (1, 1, 0, 108),
        (BlockId::SMALL_PILE, V::Bone) => (2, 1, 216, 0),
        (BlockId::SMALL_PILE, V::Dirt) => (1, 1, 108, 0),
        (BlockId::SMALL_PILE, V::Forest) => (2, 1, 1368, 18),
        (BlockId::SMALL_PILE, V::Furniture) => (2, 1, 1116, 18),
        (BlockId::SMALL_PILE, V::Gold) => (2, 1, 648, 18),
        (BlockId::SMALL_PILE, V::LivingWood) => (2, 1, 2124, 18),
        (
            BlockId::SMALL_PILE,
            V::Granite | V::Ice | V::Marble | V::Sandstone | V::Spider | V::Stone,
        ) => (2, 1, 0, 0),
        (BlockId::STATUE, V::Lihzahrd) => (2, 3, 1548, 0),
        (BlockId::SUNFLOWER, V::None) => (2, 4, 0, 0),
        (BlockId::TALL_GRASS_PLANT, V::None) => (1, 1, 0, 0),
        (BlockId::TALL_JUNGLE_PLANT, V::None) => (1, 1, 0, 0),
        (BlockId::TRAP, V::DartLeft) => (1, 1, 0, 0),
        (BlockId::TRAP, V::DartRight) => (1, 1, 18, 0),
        (BlockId::TRAP, V::FlameLeft) => (1, 1, 0, 36),
        (BlockId::TRAP, V::FlameRight) => (1, 1, 18, 36),
        (BlockId::TRAP, V::Spear) => (1, 1, 0, 72),
        (BlockId::TRAP, V::SpikyBall) => (1, 1, 0, 54),
        (BlockId::TRAP, V::SuperDartLeft) => (1, 1, 0, 18),
        (BlockId::TRAP, V::SuperDartRight) => (1, 1, 18, 18),
        _ => return None,
    };
    Some(frame)
}

/// Split a small pile hash into a 1-wide or 2-wide sprite.
fn small_pile_split(hash: u32, modulus: u32, narrow: u32, narrow_x: i32, wide_x: i32) -> (i32, i32, i32) {
    let m = (hash % modulus) as i32;
    if (m as u32) < narrow {
        (1, narrow_x + 18 * m, 0)
    } else {
        (2, wide_x + 36 * (m - narrow as i32), 18)
    }
}

/// Resolve the footprint of `block` placed at `(x, y)`. `underground` and
/// `cavern` are the world's layer boundaries; a few jungle plants only use
/// their deep sprites below them.
pub fn footprint(
    x: i32,
    y: i32,
    block: BlockId,
    variant: Variant,
    underground: i32,
    cavern: i32,
) -> Footprint {
    let block = if block == BlockId::CHEST && variant.is_chest_group2() {
        BlockId::CHEST_GROUP2
    } else {
        block
    };
    let (mut width, height, mut offset_x, mut offset_y) =
        base_frame(block, variant).unwrap_or((2, 2, 0, 0));
    let hash = hash_point(x, y);
    let h = |m: u32| (hash % m) as i32;

    match block {
        BlockId::POT => match variant {
            Variant::Crimson | Variant::Marble | Variant::Pyramid => offset_y += 36 * h(3),
            Variant::Forest => {
                offset_x += 36 * h(3);
                offset_y += 36 * h(4);
            }
            Variant::Lihzahrd => {
                offset_x += 36 * h(2);
                offset_y += 36 * h(3);
            }
            _ => {
                offset_x += 36 * h(3);
                offset_y += 36 * h(3);
            }
        },
        BlockId::STATUE if variant == Variant::Lihzahrd => {
            offset_x += 36 * h(3);
            offset_y += 162 * h(2);
        }
        BlockId::SMALL_PILE => {
            let variant = if variant == Variant::Forest && hash % 41 > 30 {
                Variant::Stone
            } else {
                variant
            };
            let split = match variant {
                Variant::Bone => {
                    let m = h(26);
                    if m < 16 {
                        Some((1, offset_x + 18 * m, offset_y))
                    } else {
                        Some((2, offset_x + 36 * (m - 16), 18))
                    }
                }
                Variant::Dirt => Some((width, offset_x + 18 * h(6), offset_y)),
                Variant::Forest | Variant::Furniture | Variant::LivingWood => {
                    Some((width, offset_x + 36 * h(3), offset_y))
                }
                Variant::Granite => Some(small_pile_split(hash, 12, 6, 1080, 1692)),
                Variant::Ice => Some(small_pile_split(hash, 18, 12, 648, 900)),
                Variant::Marble => Some(small_pile_split(hash, 12, 6, 1188, 1908)),
                Variant::Sandstone => Some(small_pile_split(hash, 12, 6, 972, 1476)),
                Variant::Spider => Some(small_pile_split(hash, 10, 6, 864, 1224)),
                Variant::Stone => Some(small_pile_split(hash, 12, 6, 0, 0)),
                _ => None,
            };
            if let Some((w, ox, oy)) = split {
                width = w;
                offset_x = ox;
                offset_y = oy;
            }
        }
        BlockId::LARGE_PILE | BlockId::LARGE_PILE_GROUP2 => {
            let cycle = match variant {
                Variant::Ash
                | Variant::DryBone
                | Variant::Forest
                | Variant::Lihzahrd
                | Variant::LivingWood
                | Variant::Mushroom => 3,
                Variant::Bone
                | Variant::Granite
                | Variant::Ice
                | Variant::Jungle
                | Variant::Marble
                | Variant::Sandstone
                | Variant::Stone => 6,
                Variant::Furniture => 4,
                Variant::LivingLeaf => 2,
                Variant::Spider => 5,
                _ => 1,
            };
            offset_x += 54 * h(cycle);
        }
        BlockId::ASH_PLANT => offset_x += 18 * h(11),
        BlockId::CORRUPT_PLANT | BlockId::CRIMSON_PLANT => offset_x += 18 * h(23),
        BlockId::GRASS_PLANT | BlockId::TALL_GRASS_PLANT => {
            let mut m = h(if hash % 7 == 1 { 45 } else { 6 });
            if m == 8 && block == BlockId::TALL_GRASS_PLANT {
                m = h(6);
            }
            offset_x += 18 * m;
        }
        BlockId::JUNGLE_PLANT => {
            let mut m = h(if hash % 7 == 1 { 23 } else { 6 });
            if (m == 8 && y < cavern) || (m == 9 && y < underground) {
                m = h(6);
            }
            offset_x += 18 * m;
        }
        BlockId::LARGE_JUNGLE_PLANT => {
            let m = h(21);
            if m > 8 {
                offset_x = 36 * (m - 9);
                offset_y = 36;
            } else {
                width = 3;
                offset_x += 54 * m;
            }
        }
        BlockId::MUSHROOM_PLANT => offset_x += 18 * h(5),
        BlockId::TALL_JUNGLE_PLANT => {
            let mut m = h(if hash % 7 == 1 { 17 } else { 6 });
            if m == 8 {
                m = h(6);
            }
            offset_x += 18 * m;
        }
        BlockId::SUNFLOWER => offset_x += 36 * h(3),
        _ => {}
    }

    Footprint {
        block,
        width,
        height,
        offset_x,
        offset_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chest_variants() {
        let gold = footprint(10, 10, BlockId::CHEST, Variant::Gold, 100, 200);
        assert_eq!(gold.block, BlockId::CHEST);
        assert_eq!((gold.width, gold.height, gold.offset_x), (2, 2, 36));
        assert_eq!(gold.frame(1, 1), (54, 18));

        let reef = footprint(10, 10, BlockId::CHEST, Variant::Reef, 100, 200);
        assert_eq!(reef.block, BlockId::CHEST_GROUP2);
        assert_eq!(reef.offset_x, 504);
    }

    #[test]
    fn test_unknown_defaults_to_two_by_two() {
        let fp = footprint(0, 0, BlockId::ORB_HEART, Variant::Corruption, 100, 200);
        assert_eq!((fp.width, fp.height, fp.offset_x, fp.offset_y), (2, 2, 0, 0));
    }

    #[test]
    fn test_pot_variation_is_positional() {
        let a = footprint(5, 7, BlockId::POT, Variant::Tundra, 100, 200);
        let b = footprint(5, 7, BlockId::POT, Variant::Tundra, 100, 200);
        assert_eq!(a, b);
        assert!(a.offset_y >= 144 && a.offset_y <= 144 + 72);
        assert_eq!(a.offset_x % 36, 0);
    }

    #[test]
    fn test_stone_pile_widths() {
        for x in 0..50 {
            let fp = footprint(x, 3, BlockId::SMALL_PILE, Variant::Stone, 100, 200);
            match fp.width {
                1 => assert_eq!(fp.offset_y, 0),
                2 => assert_eq!(fp.offset_y, 18),
                w => panic!("unexpected width {}", w),
            }
        }
    }

    #[test]
    fn test_traps_are_single_cells() {
        let fp = footprint(1, 1, BlockId::TRAP, Variant::FlameRight, 100, 200);
        assert_eq!((fp.width, fp.height, fp.offset_x, fp.offset_y), (1, 1, 18, 36));
    }
}
