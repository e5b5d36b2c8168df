//! Tile records and chest storage
//!
//! A `Tile` is one grid cell: foreground block, background wall, liquid,
//! slope, paints and a packed set of wire/actuator/coating flags.

use crate::ids::{BlockId, ItemId, PaintId, WallId};

/// Liquid occupying a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Liquid {
    #[default]
    None,
    Water,
    Lava,
    Honey,
    Shimmer,
}

impl Liquid {
    /// Encoding used by stamps and the world format.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Liquid::Water,
            2 => Liquid::Lava,
            3 => Liquid::Honey,
            4 => Liquid::Shimmer,
            _ => Liquid::None,
        }
    }
}

/// Slope shape of a solid block. The named corner is the part that shows as
/// empty space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Slope {
    #[default]
    None,
    Half,
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl Slope {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Slope::Half,
            2 => Slope::TopRight,
            3 => Slope::TopLeft,
            4 => Slope::BottomRight,
            5 => Slope::BottomLeft,
            _ => Slope::None,
        }
    }
}

/// Scratch marker used by passes that need to tag tiles between steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Flag {
    #[default]
    None,
    /// Edge of a hex cell.
    Border,
    /// Hive cell interior.
    Hive,
    /// Hive cell interior below the lava line.
    CrispyHoney,
    Yellow,
    Orange,
}

/// Packed boolean tile state. Every bit is independent of the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TileFlags(u16);

impl TileFlags {
    pub const WIRE_RED: u16 = 1 << 0;
    pub const WIRE_BLUE: u16 = 1 << 1;
    pub const WIRE_GREEN: u16 = 1 << 2;
    pub const WIRE_YELLOW: u16 = 1 << 3;
    pub const ACTUATOR: u16 = 1 << 4;
    pub const ACTUATED: u16 = 1 << 5;
    pub const ECHO_COAT_BLOCK: u16 = 1 << 6;
    pub const ECHO_COAT_WALL: u16 = 1 << 7;
    pub const ILLUMINANT_BLOCK: u16 = 1 << 8;
    pub const ILLUMINANT_WALL: u16 = 1 << 9;

    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u16, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn bits(self) -> u16 {
        self.0
    }
}

/// One grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Tile {
    pub block: BlockId,
    pub frame_x: i16,
    pub frame_y: i16,
    pub wall: WallId,
    pub block_paint: PaintId,
    pub wall_paint: PaintId,
    pub liquid: Liquid,
    pub slope: Slope,
    pub flags: TileFlags,
    /// Claimed by a placed structure; later passes must leave it alone.
    pub guarded: bool,
    pub flag: Flag,
}

impl Tile {
    /// Plain air with no wall. Returned for reads outside the grid.
    pub const AIR: Tile = Tile {
        block: BlockId::EMPTY,
        frame_x: 0,
        frame_y: 0,
        wall: WallId::EMPTY,
        block_paint: PaintId::NONE,
        wall_paint: PaintId::NONE,
        liquid: Liquid::None,
        slope: Slope::None,
        flags: TileFlags(0),
        guarded: false,
        flag: Flag::None,
    };

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    pub fn actuated(&self) -> bool {
        self.flags.contains(TileFlags::ACTUATED)
    }

    /// Clear the block and its frame, leaving wall and liquid alone.
    pub fn clear_block(&mut self) {
        self.block = BlockId::EMPTY;
        self.frame_x = 0;
        self.frame_y = 0;
        self.slope = Slope::None;
        self.block_paint = PaintId::NONE;
    }
}

/// Number of item slots in a chest.
pub const CHEST_SLOTS: usize = 40;

/// A stack of items in one chest slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Item {
    pub id: ItemId,
    pub prefix: u8,
    pub stack: u16,
}

impl Item {
    pub fn new(id: ItemId, stack: u16) -> Self {
        Self { id, prefix: 0, stack }
    }
}

/// Storage registered at the top-left tile of a chest footprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chest {
    pub x: i32,
    pub y: i32,
    pub items: [Item; CHEST_SLOTS],
}

impl Chest {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            items: [Item::default(); CHEST_SLOTS],
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.items.iter().filter(|item| !item.id.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append into the first free slot. Returns false when the chest is full.
    pub fn push(&mut self, item: Item) -> bool {
        match self.items.iter_mut().find(|slot| slot.id.is_none()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_independent() {
        let mut flags = TileFlags::default();
        flags.set(TileFlags::WIRE_RED, true);
        flags.set(TileFlags::ILLUMINANT_WALL, true);
        assert!(flags.contains(TileFlags::WIRE_RED));
        assert!(!flags.contains(TileFlags::WIRE_BLUE));
        flags.set(TileFlags::WIRE_RED, false);
        assert!(flags.contains(TileFlags::ILLUMINANT_WALL));
        assert_eq!(flags.bits(), TileFlags::ILLUMINANT_WALL);
    }

    #[test]
    fn test_default_tile_is_air() {
        let tile = Tile::default();
        assert!(tile.is_empty());
        assert_eq!(tile.wall, WallId::EMPTY);
        assert_eq!(tile.liquid, Liquid::None);
        assert_eq!(tile, Tile::AIR);
    }

    #[test]
    fn test_chest_push_fills_in_order() {
        let mut chest = Chest::new(3, 4);
        assert!(chest.is_empty());
        assert!(chest.push(Item::new(ItemId::TORCH, 10)));
        assert!(chest.push(Item::new(ItemId::ROPE, 50)));
        assert_eq!(chest.len(), 2);
        assert_eq!(chest.items[1].id, ItemId::ROPE);
        for _ in 2..CHEST_SLOTS {
            assert!(chest.push(Item::new(ItemId::WOOD, 1)));
        }
        assert!(!chest.push(Item::new(ItemId::WOOD, 1)));
    }
}
