//! Run-length encoded structure stamps
//!
//! Stream layout, all 16-bit words:
//!
//! ```text
//! [width << 8 | height] then, per cell in column-major order:
//!   header            low 12 bits: repeat count for the following cells
//!                     0x1000 block, 0x2000 wall, 0x4000 paint, 0x8000 flags
//!   block             (if 0x1000) followed by frame x, frame y for framed blocks
//!   wall              (if 0x2000)
//!   paint             (if 0x4000) low byte block paint, high byte wall paint
//!   flags             (if 0x8000) liquid & 7, slope >> 3 & 7, then wire,
//!                     actuator, echo and illuminant bits from 0x40 upwards
//! ```
//!
//! A repeat count of `n` makes the next `n` cells copies of the one just
//! decoded; they consume no words.

use crate::ids::{BlockId, PaintId, WallId};
use crate::tile::{Liquid, Slope, Tile, TileFlags};

/// Flag word bits in stream order, paired with the tile flag they set.
const FLAG_BITS: [(u16, u16); 10] = [
    (0x0040, TileFlags::WIRE_RED),
    (0x0080, TileFlags::WIRE_BLUE),
    (0x0100, TileFlags::WIRE_GREEN),
    (0x0200, TileFlags::WIRE_YELLOW),
    (0x0400, TileFlags::ACTUATOR),
    (0x0800, TileFlags::ACTUATED),
    (0x1000, TileFlags::ECHO_COAT_BLOCK),
    (0x2000, TileFlags::ECHO_COAT_WALL),
    (0x4000, TileFlags::ILLUMINANT_BLOCK),
    (0x8000, TileFlags::ILLUMINANT_WALL),
];

/// A decoded stamp. Immutable once built, apart from explicit edits by the
/// structure that owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct TileBuffer {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileBuffer {
    /// Decode an encoded stamp. A truncated stream leaves the remaining
    /// cells as air.
    pub fn decode(data: &[u16]) -> Self {
        let mut words = data.iter().copied();
        let dims = words.next().unwrap_or(0);
        let width = i32::from(dims >> 8);
        let height = i32::from(dims & 0xff);
        let mut tiles = vec![Tile::AIR; (width * height) as usize];

        let mut rle = 0;
        for i in 0..tiles.len() {
            if rle > 0 {
                tiles[i] = tiles[i - 1];
                rle -= 1;
                continue;
            }
            let Some(header) = words.next() else { break };
            rle = header & 0x0fff;
            let tile = &mut tiles[i];
            if header & 0x1000 != 0 {
                tile.block = BlockId(words.next().unwrap_or(0) as i16);
                if tile.block.is_framed() {
                    tile.frame_x = words.next().unwrap_or(0) as i16;
                    tile.frame_y = words.next().unwrap_or(0) as i16;
                }
            }
            if header & 0x2000 != 0 {
                tile.wall = WallId(words.next().unwrap_or(0));
            }
            if header & 0x4000 != 0 {
                let paint = words.next().unwrap_or(0);
                tile.block_paint = PaintId((paint & 0x00ff) as u8);
                tile.wall_paint = PaintId((paint >> 8) as u8);
            }
            if header & 0x8000 != 0 {
                let flags = words.next().unwrap_or(0);
                tile.liquid = Liquid::from_code(flags & 0x0007);
                tile.slope = Slope::from_code((flags >> 3) & 0x0007);
                for (bit, flag) in FLAG_BITS {
                    tile.flags.set(flag, flags & bit != 0);
                }
            }
        }
        Self { width, height, tiles }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height).then(|| (y + x * self.height) as usize)
    }

    /// Cell `(x, y)`; air outside the stamp.
    pub fn tile(&self, x: i32, y: i32) -> &Tile {
        match self.index(x, y) {
            Some(idx) => &self.tiles[idx],
            None => &Tile::AIR,
        }
    }

    /// Mutable cell, `None` outside the stamp.
    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.index(x, y).map(move |idx| &mut self.tiles[idx])
    }

    /// Apply `f` to every cell.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Tile)) {
        self.tiles.iter_mut().for_each(|tile| f(tile));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_run_length() {
        // 3 wide, 2 tall. Stone, then dirt repeated twice
        // (covering (1,0) and (1,1)), then a painted wall, then water with
        // a half slope.
        let data = [
            0x0302,
            0x1000,
            1,
            0x3002,
            0,
            2,
            0x6000,
            5,
            0x0104,
            0x8000,
            0x0009 | 0x0040,
        ];
        let buf = TileBuffer::decode(&data);
        assert_eq!((buf.width(), buf.height()), (3, 2));
        assert_eq!(buf.tile(0, 0).block, BlockId::STONE);
        let dirt = *buf.tile(0, 1);
        assert_eq!(dirt.block, BlockId::DIRT);
        assert_eq!(dirt.wall, WallId::DIRT);
        assert_eq!(*buf.tile(1, 0), dirt);
        assert_eq!(*buf.tile(1, 1), dirt);

        let painted = buf.tile(2, 0);
        assert!(painted.is_empty());
        assert_eq!(painted.wall, WallId(5));
        assert_eq!(painted.block_paint, PaintId(4));
        assert_eq!(painted.wall_paint, PaintId(1));

        let last = buf.tile(2, 1);
        assert_eq!(last.liquid, Liquid::Water);
        assert_eq!(last.slope, Slope::Half);
        assert!(last.flags.contains(TileFlags::WIRE_RED));
        assert!(!last.flags.contains(TileFlags::WIRE_BLUE));
    }

    #[test]
    fn test_framed_block_reads_frames() {
        let data = [0x0101, 0x1000, 21, 36, 18];
        let buf = TileBuffer::decode(&data);
        let chest = buf.tile(0, 0);
        assert_eq!(chest.block, BlockId::CHEST);
        assert_eq!((chest.frame_x, chest.frame_y), (36, 18));
    }

    #[test]
    fn test_truncated_stream_leaves_air() {
        let buf = TileBuffer::decode(&[0x0202, 0x1000, 1]);
        assert_eq!(buf.tile(0, 0).block, BlockId::STONE);
        assert!(buf.tile(1, 1).is_empty());
        assert!(buf.tile(9, 9).is_empty());
    }
}
