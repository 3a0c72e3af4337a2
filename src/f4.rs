//! The "f4" packed binary image format
//!
//! # Layout
//!
//! Short header, used when both dimensions fit in a byte:
//!
//! ```text
//! [0xE0 | bpp, width, height, 0x00]
//! ```
//!
//! Long header, marked by a leading `0x87`:
//!
//! ```text
//! [0x87, 0xE0 | bpp, width_lo, width_hi, height_lo, height_hi, 0x00, 0x00]
//! ```
//!
//! Pixels follow in column-major order (all of column 0 top to bottom, then
//! column 1, ...).
//!
//! - 4bpp: two pixels per byte, first pixel in the low nibble. Every column
//!   is flushed to a byte boundary and then zero-padded until the payload
//!   length is a multiple of 4.
//! - 1bpp: one bit per pixel, LSB first, packed continuously across columns
//!   with no per-column padding.

use crate::bitmap::Bitmap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Base of the format magic byte; the low bits carry bits-per-pixel.
pub const MAGIC_BASE: u8 = 0xE0;

/// Escape byte announcing a long (16-bit dimension) header.
pub const LONG_HEADER_MARKER: u8 = 0x87;

const SHORT_HEADER_LEN: usize = 4;
const LONG_HEADER_LEN: usize = 8;

/// Error type for f4 decoding failures
#[derive(Debug, Error)]
pub enum F4Error {
    #[error("f4 data too short for a header ({0} bytes)")]
    TooShort(usize),
    #[error("unknown f4 format byte 0x{0:02x}")]
    UnknownFormat(u8),
    #[error("f4 payload truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Pixel depth of an f4 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// Legacy monochrome images, magic `0xE1`
    Mono,
    /// 16-color images, magic `0xE4`
    Color,
}

impl BitDepth {
    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Mono => 1,
            BitDepth::Color => 4,
        }
    }

    fn from_magic(magic: u8) -> Result<Self, F4Error> {
        match magic {
            0xE1 => Ok(BitDepth::Mono),
            0xE4 => Ok(BitDepth::Color),
            other => Err(F4Error::UnknownFormat(other)),
        }
    }
}

/// Bytes of pixel data (excluding the header) for an image of this size.
pub fn payload_len(width: u16, height: u16, depth: BitDepth) -> usize {
    let (w, h) = (width as usize, height as usize);
    match depth {
        BitDepth::Color => w * column_stride(h),
        BitDepth::Mono => (w * h).div_ceil(8),
    }
}

/// Bytes one 4bpp column occupies after flushing and alignment.
fn column_stride(height: usize) -> usize {
    (height.div_ceil(2) + 3) & !3
}

/// Accumulates bpp-wide groups into bytes.
struct BitWriter {
    bpp: u8,
    current: u8,
    shift: u8,
    out: Vec<u8>,
}

impl BitWriter {
    fn push(&mut self, value: u8) {
        self.current |= (value & ((1 << self.bpp) - 1)) << self.shift;
        if self.shift == 8 - self.bpp {
            self.out.push(self.current);
            self.current = 0;
            self.shift = 0;
        } else {
            self.shift += self.bpp;
        }
    }

    fn flush(&mut self) {
        while self.shift != 0 {
            self.push(0);
        }
    }
}

fn write_header(out: &mut Vec<u8>, width: u16, height: u16, depth: BitDepth) {
    let magic = MAGIC_BASE | depth.bits();
    if width > 255 || height > 255 {
        let [w_lo, w_hi] = width.to_le_bytes();
        let [h_lo, h_hi] = height.to_le_bytes();
        out.extend_from_slice(&[LONG_HEADER_MARKER, magic, w_lo, w_hi, h_lo, h_hi, 0, 0]);
    } else {
        out.extend_from_slice(&[magic, width as u8, height as u8, 0]);
    }
}

/// Encode a bitmap as 4bpp f4.
///
/// # Examples
///
/// ```
/// use sprite_pack::bitmap::Bitmap;
/// use sprite_pack::f4::encode;
///
/// let mut bitmap = Bitmap::new(1, 1);
/// bitmap.set(0, 0, 5);
/// assert_eq!(encode(&bitmap), vec![0xE4, 1, 1, 0, 0x05, 0, 0, 0]);
/// ```
pub fn encode(bitmap: &Bitmap) -> Vec<u8> {
    encode_with_depth(bitmap, BitDepth::Color)
}

/// Encode a bitmap at the given depth. In mono mode any non-zero index is
/// written as a set bit.
///
/// Mono bits are packed continuously across columns with a single flush at
/// the end, the layout [`decode`] reads back. Encoders that flush at every
/// column produce different bytes whenever the height is not a multiple of
/// 8; such payloads still decode here only when the height is.
pub fn encode_with_depth(bitmap: &Bitmap, depth: BitDepth) -> Vec<u8> {
    let (width, height) = (bitmap.width(), bitmap.height());
    let mut header = Vec::with_capacity(LONG_HEADER_LEN);
    write_header(&mut header, width, height, depth);

    let mut writer = BitWriter {
        bpp: depth.bits(),
        current: 0,
        shift: 0,
        out: Vec::with_capacity(payload_len(width, height, depth)),
    };

    for x in 0..width as i32 {
        for y in 0..height as i32 {
            let value = bitmap.get(x, y);
            match depth {
                BitDepth::Color => writer.push(value),
                BitDepth::Mono => writer.push(u8::from(value != 0)),
            }
        }
        if depth == BitDepth::Color {
            writer.flush();
            while writer.out.len() & 3 != 0 {
                writer.push(0);
            }
        }
    }
    writer.flush();

    header.extend_from_slice(&writer.out);
    header
}

/// Parsed header: depth, dimensions and where the payload starts.
fn read_header(data: &[u8]) -> Result<(BitDepth, u16, u16, usize), F4Error> {
    if data.len() < SHORT_HEADER_LEN {
        return Err(F4Error::TooShort(data.len()));
    }

    if data[0] == LONG_HEADER_MARKER {
        if data.len() < LONG_HEADER_LEN {
            return Err(F4Error::TooShort(data.len()));
        }
        let depth = BitDepth::from_magic(MAGIC_BASE | data[1])?;
        let width = u16::from_le_bytes([data[2], data[3]]);
        let height = u16::from_le_bytes([data[4], data[5]]);
        return Ok((depth, width, height, LONG_HEADER_LEN));
    }

    let depth = BitDepth::from_magic(data[0])?;
    Ok((depth, data[1] as u16, data[2] as u16, SHORT_HEADER_LEN))
}

/// Decode f4 bytes into a bitmap.
///
/// # Errors
///
/// Fails on a missing or unknown header and on a payload shorter than the
/// header's dimensions require. Trailing bytes are ignored.
pub fn decode(data: &[u8]) -> Result<Bitmap, F4Error> {
    let (depth, width, height, start) = read_header(data)?;
    let payload = &data[start..];

    let expected = payload_len(width, height, depth);
    if payload.len() < expected {
        return Err(F4Error::Truncated { expected, actual: payload.len() });
    }

    let mut bitmap = Bitmap::new(width, height);
    let h = height as usize;
    match depth {
        BitDepth::Color => {
            let stride = column_stride(h);
            for x in 0..width as usize {
                let column = &payload[x * stride..];
                for y in 0..h {
                    let byte = column[y >> 1];
                    let value = if y & 1 == 1 { byte >> 4 } else { byte & 0xF };
                    bitmap.set(x as i32, y as i32, value);
                }
            }
        }
        BitDepth::Mono => {
            for x in 0..width as usize {
                for y in 0..h {
                    let bit = x * h + y;
                    if payload[bit >> 3] & (1 << (bit & 7)) != 0 {
                        bitmap.set(x as i32, y as i32, 1);
                    }
                }
            }
        }
    }

    Ok(bitmap)
}

/// Decode, substituting an empty bitmap for any malformed input.
pub fn decode_or_default(data: &[u8]) -> Bitmap {
    decode(data).unwrap_or_else(|e| {
        tracing::warn!("discarding malformed f4 payload: {}", e);
        Bitmap::default()
    })
}

/// Encode a bitmap as 4bpp f4 and base64 it (standard alphabet, padded).
pub fn encode_base64(bitmap: &Bitmap) -> String {
    STANDARD.encode(encode(bitmap))
}

/// Decode a base64 f4 payload.
pub fn decode_base64(data: &str) -> Result<Bitmap, F4Error> {
    let bytes = STANDARD.decode(data.trim())?;
    decode(&bytes)
}

/// Decode a base64 f4 payload, substituting an empty bitmap on failure.
pub fn decode_base64_or_default(data: &str) -> Bitmap {
    decode_base64(data).unwrap_or_else(|e| {
        tracing::warn!("discarding malformed f4 payload: {}", e);
        Bitmap::default()
    })
}
