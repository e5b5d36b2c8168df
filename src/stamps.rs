//! Authored structure stamps
//!
//! Encoded with the run-length format described in `tile_buffer`. Homes mark
//! their ground row with red paint in column 0.

use crate::tile_buffer::TileBuffer;

/// Boreal wood hull with a mahogany mast and a frozen chest in the hold.
pub const FROZEN_BOAT: &[u16] = &[
    0x1e0e, 0x0013, 0x1002, 0x0141, 0x000c, 0x1001, 0x0141, 0x000b, 0x1000, 0x0141, 0x2000, 0x0095,
    0x1000, 0x0141, 0x0006, 0x1000, 0x0141, 0x0002, 0x1000, 0x0141, 0x2001, 0x0095, 0x1000, 0x0141,
    0x0005, 0x1000, 0x0141, 0x2002, 0x0095, 0x1000, 0x0141, 0x2002, 0x0095, 0x1000, 0x0141, 0x0004,
    0x1000, 0x0141, 0x2002, 0x0095, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0003, 0x1000,
    0x0141, 0x2002, 0x0095, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0003, 0x1000, 0x0141,
    0x2002, 0x0095, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0003, 0x1000, 0x0141, 0x2002,
    0x0095, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0003, 0x1000, 0x0141, 0x2002, 0x0095,
    0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0003, 0x1000, 0x0141, 0x0002, 0x1000, 0x0141,
    0x2003, 0x0095, 0x1000, 0x0141, 0x0007, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0007,
    0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0007, 0x1000, 0x0141, 0x2001, 0x0095, 0x3000,
    0x0015, 0x018c, 0x0000, 0x0095, 0x3000, 0x0015, 0x018c, 0x0012, 0x0095, 0x1000, 0x0141, 0x1007,
    0x023f, 0x1000, 0x0141, 0x2001, 0x0095, 0x3000, 0x0015, 0x019e, 0x0000, 0x0095, 0x3000, 0x0015,
    0x019e, 0x0012, 0x0095, 0x1000, 0x0141, 0x0000, 0x1000, 0x00d5, 0x0005, 0x1000, 0x0141, 0x2003,
    0x0095, 0x1000, 0x0141, 0x0000, 0x1000, 0x00d5, 0x0005, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000,
    0x0141, 0x0000, 0x1000, 0x00d5, 0x0005, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0000,
    0x1000, 0x00d5, 0x0005, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0000, 0x1000, 0x00d5,
    0x0005, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0000, 0x1000, 0x00d5, 0x0005, 0x1000,
    0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0000, 0x1006, 0x00d5, 0x1000, 0x0141, 0x2003, 0x0095,
    0x1000, 0x0141, 0x0007, 0x1000, 0x0141, 0x2003, 0x0095, 0x1000, 0x0141, 0x0007, 0x1000, 0x0141,
    0x2002, 0x0095, 0x1000, 0x0141, 0x0008, 0x1000, 0x0141, 0x2001, 0x0095, 0x1000, 0x0141, 0x0009,
    0x1000, 0x0141, 0x2000, 0x0095, 0x1000, 0x0141, 0x000a, 0x1001, 0x0141, 0x0009, 0x1002, 0x0141,
    0x0012,
];

/// Single room cottage with doors on both sides and a shelf.
pub const COTTAGE: &[u16] = &[
    0x120c, 0x0007, 0x4000, 0x0001, 0x0010, 0x1000, 0x001e, 0x0004, 0x1000, 0x001e, 0x1000, 0x0026,
    0x0002, 0x1001, 0x001e, 0x1001, 0x007c, 0x1000, 0x000a, 0x0000, 0x0000, 0x1000, 0x000a, 0x0000,
    0x0012, 0x1000, 0x000a, 0x0000, 0x0024, 0x1000, 0x001e, 0x1000, 0x0026, 0x1001, 0x0000, 0x0000,
    0x1001, 0x001e, 0x2001, 0x001b, 0x2002, 0x0004, 0x1000, 0x001e, 0x3000, 0x0026, 0x0005, 0x3001,
    0x0000, 0x0001, 0x1002, 0x001e, 0x2001, 0x001b, 0x2002, 0x0004, 0x1000, 0x001e, 0x3000, 0x0026,
    0x0005, 0x3001, 0x0000, 0x0001, 0x1002, 0x001e, 0x2001, 0x001b, 0x2002, 0x0004, 0x1000, 0x001e,
    0x3000, 0x0026, 0x0005, 0x3001, 0x0000, 0x0001, 0x1002, 0x001e, 0x2001, 0x001b, 0x2000, 0x0004,
    0x3000, 0x0015, 0x0000, 0x0000, 0x0004, 0x3000, 0x0015, 0x0000, 0x0012, 0x0004, 0x1000, 0x001e,
    0x3000, 0x0026, 0x0005, 0x3001, 0x0000, 0x0001, 0x1002, 0x001e, 0x2001, 0x001b, 0x2000, 0x0004,
    0x3000, 0x0015, 0x0012, 0x0000, 0x0004, 0x3000, 0x0015, 0x0012, 0x0012, 0x0004, 0x1000, 0x001e,
    0x3000, 0x0026, 0x0005, 0x3001, 0x0000, 0x0001, 0x1002, 0x001e, 0x2001, 0x001b, 0x2002, 0x0004,
    0x1000, 0x001e, 0x3000, 0x0026, 0x0005, 0x3001, 0x0000, 0x0001, 0x1002, 0x001e, 0x2000, 0x001b,
    0x3000, 0x0004, 0x0000, 0x0000, 0x001b, 0x2002, 0x0004, 0x1000, 0x001e, 0x3000, 0x0026, 0x0005,
    0x3001, 0x0000, 0x0001, 0x1002, 0x001e, 0x2001, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x0004,
    0x2001, 0x0004, 0x1000, 0x001e, 0x3000, 0x0026, 0x0005, 0x3001, 0x0000, 0x0001, 0x1002, 0x001e,
    0x2001, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x0004, 0x2001, 0x0004, 0x1000, 0x001e, 0x3000,
    0x0026, 0x0005, 0x3001, 0x0000, 0x0001, 0x0000, 0x1001, 0x001e, 0x2001, 0x001b, 0x2002, 0x0004,
    0x1000, 0x001e, 0x3000, 0x0026, 0x0005, 0x3001, 0x0000, 0x0001, 0x0000, 0x1001, 0x001e, 0x1001,
    0x007c, 0x1000, 0x000a, 0x0000, 0x0000, 0x1000, 0x000a, 0x0000, 0x0012, 0x1000, 0x000a, 0x0000,
    0x0024, 0x1000, 0x001e, 0x1000, 0x0026, 0x1001, 0x0000, 0x0001, 0x1000, 0x001e, 0x0004, 0x1000,
    0x001e, 0x1000, 0x0026, 0x0019,
];

/// Two storey house with a platform loft.
pub const LOFT_HOUSE: &[u16] = &[
    0x160f, 0x000a, 0x4000, 0x0001, 0x0012, 0x1000, 0x0026, 0x0008, 0x1000, 0x001e, 0x1000, 0x0026,
    0x0001, 0x1000, 0x001e, 0x1000, 0x0026, 0x1005, 0x007c, 0x1000, 0x000a, 0x0000, 0x0000, 0x1000,
    0x000a, 0x0000, 0x0012, 0x1000, 0x000a, 0x0000, 0x0024, 0x1000, 0x001e, 0x1000, 0x0026, 0x1001,
    0x0000, 0x1000, 0x001e, 0x1000, 0x0026, 0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b,
    0x2003, 0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000,
    0x0026, 0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003, 0x0004, 0x1000, 0x001e,
    0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026, 0x2003, 0x001b, 0x3000,
    0x0013, 0x0000, 0x0000, 0x001b, 0x2000, 0x0004, 0x3000, 0x0004, 0x0000, 0x0000, 0x0004, 0x2001,
    0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026,
    0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003, 0x0004, 0x1000, 0x001e, 0x1000,
    0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026, 0x2003, 0x001b, 0x3000, 0x0013,
    0x0000, 0x0000, 0x001b, 0x2003, 0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001,
    0x1000, 0x001e, 0x1000, 0x0026, 0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003,
    0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026,
    0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003, 0x0004, 0x1000, 0x001e, 0x1000,
    0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026, 0x2003, 0x001b, 0x3000, 0x0013,
    0x0000, 0x0000, 0x001b, 0x2003, 0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001,
    0x1000, 0x001e, 0x1000, 0x0026, 0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003,
    0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026,
    0x2001, 0x001b, 0x3000, 0x0015, 0x0000, 0x0000, 0x001b, 0x3000, 0x0015, 0x0000, 0x0012, 0x001b,
    0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003, 0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001,
    0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026, 0x2001, 0x001b, 0x3000, 0x0015, 0x0012, 0x0000,
    0x001b, 0x3000, 0x0015, 0x0012, 0x0012, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003,
    0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026,
    0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2000, 0x0004, 0x3000, 0x0004, 0x0000,
    0x0000, 0x0004, 0x2001, 0x0004, 0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000,
    0x001e, 0x1000, 0x0026, 0x2003, 0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003, 0x0004,
    0x1000, 0x001e, 0x1000, 0x0026, 0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026, 0x2003,
    0x001b, 0x3000, 0x0013, 0x0000, 0x0000, 0x001b, 0x2003, 0x0004, 0x1000, 0x001e, 0x1000, 0x0026,
    0x3001, 0x0000, 0x0001, 0x1000, 0x001e, 0x1000, 0x0026, 0x1005, 0x007c, 0x1000, 0x000a, 0x0000,
    0x0000, 0x1000, 0x000a, 0x0000, 0x0012, 0x1000, 0x000a, 0x0000, 0x0024, 0x1000, 0x001e, 0x1000,
    0x0026, 0x1001, 0x0000, 0x0000, 0x1000, 0x0026, 0x0008, 0x1000, 0x001e, 0x1000, 0x0026, 0x001f,
];

/// Every starter home layout.
pub const HOMES: &[&[u16]] = &[COTTAGE, LOFT_HOUSE];

pub fn frozen_boat() -> TileBuffer {
    TileBuffer::decode(FROZEN_BOAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BlockId, PaintId, WallId};

    #[test]
    fn test_boat_layout() {
        let boat = frozen_boat();
        assert_eq!((boat.width(), boat.height()), (30, 14));
        let chest = boat.tile(14, 11);
        assert_eq!(chest.block, BlockId::CHEST);
        assert_eq!((chest.frame_x, chest.frame_y), (396, 0));
        assert_eq!(boat.tile(15, 12).frame_y, 18);
        assert_eq!(boat.tile(15, 0).block, BlockId::RICH_MAHOGANY_BEAM);
        assert_eq!(boat.tile(10, 10).wall, WallId::BOREAL_WOOD);
        assert!(boat.tile(10, 10).is_empty());
        assert_eq!(boat.tile(1, 8).block, BlockId::BOREAL_WOOD);
        assert!(boat.tile(0, 0).is_empty());
    }

    #[test]
    fn test_homes_mark_ground_row() {
        for (data, (width, height, ground)) in HOMES.iter().zip([(18, 12, 8), (22, 15, 11)]) {
            let home = TileBuffer::decode(data);
            assert_eq!((home.width(), home.height()), (width, height));
            let marked: Vec<i32> = (0..height)
                .filter(|&j| home.tile(0, j).block_paint == PaintId::RED)
                .collect();
            assert_eq!(marked, vec![ground]);
            assert!(home.tile(0, ground).is_empty());
            let chests = (0..width)
                .flat_map(|i| (0..height).map(move |j| (i, j)))
                .filter(|&(i, j)| home.tile(i, j).block == BlockId::CHEST)
                .count();
            assert_eq!(chests, 4);
        }
    }
}
