//! Packed 4-bit-per-pixel bitmaps
//!
//! A [`Bitmap`] stores palette indices (0-15) two to a byte. Pixel `(x, y)`
//! lives at linear index `y * width + x`; even indices use the low nibble of
//! their byte and odd indices the high nibble.

/// A packed indexed-color raster.
///
/// Out-of-bounds reads return 0 and out-of-bounds writes are ignored, so
/// callers never need to clip coordinates themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitmap {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

/// Number of bytes needed to pack `width * height` 4-bit pixels.
pub fn packed_len(width: u16, height: u16) -> usize {
    (width as usize * height as usize).div_ceil(2)
}

impl Bitmap {
    /// Create a bitmap with every pixel set to index 0 (transparent).
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height, data: vec![0; packed_len(width, height)] }
    }

    /// Wrap an externally produced packed buffer.
    ///
    /// The buffer is taken as-is: a short buffer reads as 0 past its end and
    /// writes past its end are dropped. Producing a correctly sized buffer is
    /// the job of the codec that decoded it.
    pub fn from_data(width: u16, height: u16, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Build a bitmap from rows of palette indices.
    ///
    /// Width is the longest row; shorter rows are padded with 0.
    pub fn from_rows(rows: &[Vec<u8>]) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut bitmap = Bitmap::new(width as u16, rows.len() as u16);
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                bitmap.set(x as i32, y as i32, value);
            }
        }
        bitmap
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// True when the bitmap has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The packed pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read the palette index at `(x, y)`, or 0 when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        let Some(index) = self.index(x, y) else {
            return 0;
        };
        let Some(&byte) = self.data.get(index >> 1) else {
            return 0;
        };
        if index & 1 == 1 {
            (byte >> 4) & 0xF
        } else {
            byte & 0xF
        }
    }

    /// Write a palette index at `(x, y)`. The value is masked to 4 bits.
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let Some(byte) = self.data.get_mut(index >> 1) else {
            return;
        };
        let value = value & 0xF;
        if index & 1 == 1 {
            *byte = (*byte & 0x0F) | (value << 4);
        } else {
            *byte = (*byte & 0xF0) | value;
        }
    }

    /// Iterate over every pixel as `(x, y, index)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u16, u16, u8)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (x, y, self.get(x as i32, y as i32)))
        })
    }

    /// Rows of palette indices, top to bottom.
    pub fn rows(&self) -> Vec<Vec<u8>> {
        (0..self.height as i32)
            .map(|y| (0..self.width as i32).map(|x| self.get(x, y)).collect())
            .collect()
    }
}
