//! Indexed palettes and built-in palette definitions
//!
//! A palette holds at most 16 colors. Index 0 is reserved for "no pixel"
//! and is never painted, whatever color happens to be stored there.

use crate::color::{parse_hex, ColorError, Rgb};
use thiserror::Error;

/// Maximum number of entries a 4bpp palette can address.
pub const MAX_COLORS: usize = 16;

/// Error type for palette construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("palette must contain at least one color")]
    Empty,
    #[error("palette color {index}: {source}")]
    Color {
        index: usize,
        #[source]
        source: ColorError,
    },
}

/// An ordered list of up to 16 colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Build a palette, keeping at most the first 16 colors.
    pub fn new(mut colors: Vec<Rgb>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        colors.truncate(MAX_COLORS);
        Ok(Self { colors })
    }

    /// Parse a palette from hex strings such as a project manifest carries.
    pub fn from_hex_strings<S: AsRef<str>>(colors: &[S]) -> Result<Self, PaletteError> {
        let parsed = colors
            .iter()
            .enumerate()
            .map(|(index, c)| parse_hex(c.as_ref()).map_err(|source| PaletteError::Color { index, source }))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// The default 16-color arcade palette.
    pub fn arcade() -> Self {
        Self { colors: ARCADE.to_vec() }
    }

    /// Color at `index`, if the palette has that many entries.
    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.colors.get(index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn to_hex_strings(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::arcade()
    }
}

const ARCADE: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0xff, 0xff, 0xff),
    Rgb::new(0xff, 0x21, 0x21),
    Rgb::new(0xff, 0x93, 0xc4),
    Rgb::new(0xff, 0x81, 0x35),
    Rgb::new(0xff, 0xf6, 0x09),
    Rgb::new(0x24, 0x9c, 0xa3),
    Rgb::new(0x78, 0xdc, 0x52),
    Rgb::new(0x00, 0x3f, 0xad),
    Rgb::new(0x87, 0xf2, 0xff),
    Rgb::new(0x8e, 0x2e, 0xc4),
    Rgb::new(0xa4, 0x83, 0x9f),
    Rgb::new(0x5c, 0x40, 0x6c),
    Rgb::new(0xe5, 0xcd, 0xc4),
    Rgb::new(0x91, 0x46, 0x3d),
    Rgb::new(0x00, 0x00, 0x00),
];

/// List of all available built-in palette names.
const BUILTIN_NAMES: &[&str] = &["arcade", "pico8", "grayscale"];

/// Returns a list of all available built-in palette names.
pub fn list_builtins() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

/// Returns a built-in palette by name, or None if not found.
pub fn builtin(name: &str) -> Option<Palette> {
    match name {
        "arcade" => Some(Palette::arcade()),
        "pico8" => Some(pico8()),
        "grayscale" => Some(grayscale()),
        _ => None,
    }
}

/// PICO-8 colors behind a transparent slot; peach is dropped to fit 16.
/// Reference: https://lospec.com/palette-list/pico-8
fn pico8() -> Palette {
    Palette {
        colors: vec![
            Rgb::new(0x00, 0x00, 0x00),
            Rgb::new(0x1D, 0x2B, 0x53),
            Rgb::new(0x7E, 0x25, 0x53),
            Rgb::new(0x00, 0x87, 0x51),
            Rgb::new(0xAB, 0x52, 0x36),
            Rgb::new(0x5F, 0x57, 0x4F),
            Rgb::new(0xC2, 0xC3, 0xC7),
            Rgb::new(0xFF, 0xF1, 0xE8),
            Rgb::new(0xFF, 0x00, 0x4D),
            Rgb::new(0xFF, 0xA3, 0x00),
            Rgb::new(0xFF, 0xEC, 0x27),
            Rgb::new(0x00, 0xE4, 0x36),
            Rgb::new(0x29, 0xAD, 0xFF),
            Rgb::new(0x83, 0x76, 0x9C),
            Rgb::new(0xFF, 0x77, 0xA8),
            Rgb::new(0x00, 0x00, 0x00),
        ],
    }
}

/// 15-shade grayscale ramp from white to black.
fn grayscale() -> Palette {
    let mut colors = vec![Rgb::new(0, 0, 0)];
    for i in 0..15u8 {
        let v = 255 - i * 17;
        colors.push(Rgb::new(v, v, v));
    }
    Palette { colors }
}
