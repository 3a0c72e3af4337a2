//! Hex color parsing utilities
//!
//! Palette colors are stored as opaque RGB triples and exchanged as hex
//! strings. Supported inputs:
//! - `#RGB` (each digit doubled)
//! - `#RRGGBB`
//! - `RRGGBB` (bare, as written by some project manifests)

use image::Rgba;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3 or 6 hex chars after the optional #)
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// An opaque palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Render as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to an image pixel with the given alpha.
    pub fn to_rgba(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }

    /// Squared Euclidean distance in RGB space.
    pub fn distance_sq(self, r: u8, g: u8, b: u8) -> u32 {
        let dr = self.r as i32 - r as i32;
        let dg = self.g as i32 - g as i32;
        let db = self.b as i32 - b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// Parse a hex color string into an [`Rgb`].
///
/// # Examples
///
/// ```
/// use sprite_pack::color::{parse_hex, Rgb};
///
/// assert_eq!(parse_hex("#F00").unwrap(), Rgb::new(255, 0, 0));
/// assert_eq!(parse_hex("#249ca3").unwrap(), Rgb::new(0x24, 0x9c, 0xa3));
/// assert_eq!(parse_hex("ff8135").unwrap(), Rgb::new(0xff, 0x81, 0x35));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, has the wrong length or
/// contains non-hex characters.
pub fn parse_hex(s: &str) -> Result<Rgb, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').unwrap_or(s);

    // Validate all characters are hex
    for c in hex.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ColorError::InvalidHex(c));
        }
    }

    let digits: Vec<u8> = hex.chars().map(parse_hex_digit).collect::<Result<_, _>>()?;
    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits)
        [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgb::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}
