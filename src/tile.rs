use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

pub const TILE_SIZE: usize = 8;
/// Two 8-byte bit-planes per tile.
pub const TILE_BYTES: usize = 16;

lazy_static! {
    // Bits of a plane byte spread out to one pixel each, MSB (leftmost pixel) first.
    static ref PLANE_BITS: Vec<[u8; TILE_SIZE]> = (0..=255u8)
        .map(|byte| {
            let mut bits = [0u8; TILE_SIZE];
            for (x, bit) in bits.iter_mut().enumerate() {
                *bit = (byte >> (7 - x)) & 1;
            }
            bits
        })
        .collect();
}

/// An 8x8 pattern-table tile, one colour index (0..=3) per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "TileRepr")]
pub struct Tile {
    pixels: [[u8; TILE_SIZE]; TILE_SIZE],
}

#[derive(Deserialize)]
struct TileRepr {
    pixels: [[u8; TILE_SIZE]; TILE_SIZE],
}

impl TryFrom<TileRepr> for Tile {
    type Error = String;

    fn try_from(repr: TileRepr) -> Result<Self, Self::Error> {
        let tile = Tile {
            pixels: repr.pixels,
        };
        if !tile.is_well_formed() {
            return Err("tile pixel out of range".to_string());
        }
        Ok(tile)
    }
}

impl Tile {
    /// Decodes a tile from its 16 bytes: rows 0-7 of the low plane, then rows 0-7 of the high plane.
    pub fn from_planes(data: &[u8; TILE_BYTES]) -> Self {
        let mut tile = Tile::default();
        for y in 0..TILE_SIZE {
            tile.set_scanline(y, data[y], data[y + TILE_SIZE]);
        }
        tile
    }

    fn set_scanline(&mut self, y: usize, low: u8, high: u8) {
        let low = &PLANE_BITS[low as usize];
        let high = &PLANE_BITS[high as usize];
        for x in 0..TILE_SIZE {
            self.pixels[y][x] = low[x] | high[x] << 1;
        }
    }

    /// Packs the tile back into its two bit-planes.
    pub fn to_planes(&self) -> [u8; TILE_BYTES] {
        let mut data = [0u8; TILE_BYTES];
        for (y, row) in self.pixels.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                let shift = 7 - x;
                data[y] |= (value & 1) << shift;
                data[y + TILE_SIZE] |= ((value >> 1) & 1) << shift;
            }
        }
        data
    }

    /// Colour index of the pixel at column `x`, row `y`.
    ///
    /// Panics if `x` or `y` is 8 or more.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    /// Panics if `y` is 8 or more.
    pub fn row(&self, y: usize) -> &[u8; TILE_SIZE] {
        &self.pixels[y]
    }

    pub fn rows(&self) -> &[[u8; TILE_SIZE]; TILE_SIZE] {
        &self.pixels
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.pixels.iter().flatten().all(|&value| value <= 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planes(low: u8, high: u8) -> [u8; TILE_BYTES] {
        let mut data = [low; TILE_BYTES];
        data[TILE_SIZE..].fill(high);
        data
    }

    fn assert_solid(tile: &Tile, value: u8) {
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                assert_eq!(tile.pixel(x, y), value, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_solid_tiles() {
        assert_solid(&Tile::from_planes(&planes(0x00, 0x00)), 0);
        assert_solid(&Tile::from_planes(&planes(0xFF, 0x00)), 1);
        assert_solid(&Tile::from_planes(&planes(0x00, 0xFF)), 2);
        assert_solid(&Tile::from_planes(&planes(0xFF, 0xFF)), 3);
    }

    #[test]
    fn test_msb_is_leftmost_pixel() {
        let mut data = [0u8; TILE_BYTES];
        data[0] = 0b1000_0000;
        data[8] = 0b0000_0001;
        let tile = Tile::from_planes(&data);
        assert_eq!(tile.row(0), &[1, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(tile.row(1), &[0; TILE_SIZE]);
    }

    #[test]
    fn test_rows_use_matching_plane_bytes() {
        // the classic "1/2" glyph from the nesdev pattern table example
        let data = [
            0x41, 0xC2, 0x44, 0x48, 0x10, 0x20, 0x40, 0x80, //
            0x01, 0x02, 0x04, 0x08, 0x16, 0x21, 0x42, 0x87,
        ];
        let tile = Tile::from_planes(&data);
        assert_eq!(tile.row(0), &[0, 1, 0, 0, 0, 0, 0, 3]);
        assert_eq!(tile.row(1), &[1, 1, 0, 0, 0, 0, 3, 0]);
        assert_eq!(tile.row(4), &[0, 0, 0, 3, 0, 2, 2, 0]);
        assert_eq!(tile.row(7), &[3, 0, 0, 0, 0, 2, 2, 2]);
    }

    #[test]
    fn test_to_planes_inverts_from_planes() {
        let data: [u8; TILE_BYTES] = [
            0x3C, 0x42, 0xA5, 0x81, 0xA5, 0x99, 0x42, 0x3C, //
            0x00, 0x3C, 0x7E, 0xFF, 0xFF, 0x7E, 0x3C, 0x00,
        ];
        let tile = Tile::from_planes(&data);
        assert_eq!(tile.to_planes(), data);
    }

    #[test]
    fn test_default_tile_is_blank() {
        let tile = Tile::default();
        assert_solid(&tile, 0);
        assert!(tile.is_well_formed());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_pixel() {
        let mut data = [3u8; TILE_SIZE * TILE_SIZE];
        let tile: Tile = bincode::deserialize(&data).unwrap();
        assert_eq!(tile.row(7), &[3; TILE_SIZE]);

        data[TILE_SIZE * TILE_SIZE - 1] = 4;
        assert!(bincode::deserialize::<Tile>(&data).is_err());
    }

    #[test]
    #[should_panic]
    fn test_pixel_outside_tile_panics() {
        Tile::default().pixel(8, 0);
    }
}
