//! Preview rasterization for bitmaps and tilemaps

use crate::bitmap::Bitmap;
use crate::color::Rgb;
use crate::palette::Palette;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use std::collections::HashMap;
use thiserror::Error;

/// Prefix of every preview URI produced here.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Neutral fill for empty cells and tiles without a usable color.
pub const NEUTRAL: Rgb = Rgb::new(0xde, 0xde, 0xde);

/// Transparent color used for unpainted pixels
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Error type for preview encoding
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("preview data URI is not a PNG data URI")]
    NotDataUri,
    #[error("invalid base64 in preview: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Rasterize a bitmap 1:1.
///
/// Non-zero indices are painted opaque in their palette color; index 0 and
/// indices the palette does not cover stay fully transparent.
pub fn render_bitmap(bitmap: &Bitmap, palette: &Palette) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(bitmap.width() as u32, bitmap.height() as u32, TRANSPARENT);
    for (x, y, index) in bitmap.pixels() {
        if index == 0 {
            continue;
        }
        if let Some(color) = palette.get(index) {
            image.put_pixel(x as u32, y as u32, color.to_rgba(255));
        }
    }
    image
}

/// Encode an image as a base64 PNG data URI.
pub fn to_data_uri(image: &RgbaImage) -> Result<String, PreviewError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)?;
    Ok(format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(png)))
}

/// Decode a PNG data URI produced by [`to_data_uri`].
pub fn from_data_uri(uri: &str) -> Result<RgbaImage, PreviewError> {
    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX).ok_or(PreviewError::NotDataUri)?;
    let bytes = STANDARD.decode(payload)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Average color of a bitmap's painted pixels.
///
/// Returns `None` when no pixel is set.
pub fn average_color(bitmap: &Bitmap, palette: &Palette) -> Option<Rgb> {
    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for (_, _, index) in bitmap.pixels() {
        if index == 0 {
            continue;
        }
        // Indices past the palette count as black
        let color = palette.get(index).unwrap_or_default();
        sums[0] += color.r as u64;
        sums[1] += color.g as u64;
        sums[2] += color.b as u64;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Rgb::new((sums[0] / count) as u8, (sums[1] / count) as u8, (sums[2] / count) as u8))
}

/// A grid of tile indices; 0 marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    width: u16,
    height: u16,
    cells: Vec<u8>,
}

impl Tilemap {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height, cells: vec![0; width as usize * height as usize] }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, col: i32, row: i32) -> u8 {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return 0;
        }
        self.cells[row as usize * self.width as usize + col as usize]
    }

    pub fn set(&mut self, col: i32, row: i32, tile: u8) {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return;
        }
        self.cells[row as usize * self.width as usize + col as usize] = tile;
    }
}

/// Tiles addressed by a [`Tilemap`]'s cell values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tileset {
    pub tile_width: u16,
    pub tiles: Vec<Bitmap>,
}

/// Background treatment for tilemap previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TilemapStyle {
    /// Empty cells stay transparent
    #[default]
    Dark,
    /// Opaque neutral background, empty cells included
    Light,
}

/// Render a tilemap overview on a `side_length` square canvas.
///
/// Each occupied cell is filled with the average color of its tile; the map
/// is scaled to fit and centered along its shorter axis. Cells naming a tile
/// missing from the tileset are painted [`NEUTRAL`], cells whose tile has no
/// set pixels keep the background.
pub fn render_tilemap(
    tilemap: &Tilemap,
    tileset: &Tileset,
    side_length: u32,
    style: TilemapStyle,
    palette: &Palette,
) -> RgbaImage {
    let background = match style {
        TilemapStyle::Dark => TRANSPARENT,
        TilemapStyle::Light => NEUTRAL.to_rgba(255),
    };
    let mut image = RgbaImage::from_pixel(side_length, side_length, background);
    if tilemap.width == 0 || tilemap.height == 0 || side_length == 0 {
        return image;
    }

    let side = side_length as f64;
    let (w, h) = (tilemap.width as f64, tilemap.height as f64);
    let cell = (side / w).min(side / h);
    let x_offset = ((side * (1.0 - w / h)) / 2.0).floor().max(0.0);
    let y_offset = ((side * (1.0 - h / w)) / 2.0).floor().max(0.0);

    // Cached per call, keyed by tile index; `None` for tiles with no set pixels
    let mut tile_colors: HashMap<u8, Option<Rgb>> = HashMap::new();

    for col in 0..tilemap.width as i32 {
        for row in 0..tilemap.height as i32 {
            let tile = tilemap.get(col, row);
            if tile == 0 {
                // Empty cells already carry the background
                continue;
            }
            let color = *tile_colors.entry(tile).or_insert_with(|| match tileset.tiles.get(tile as usize) {
                Some(bitmap) => average_color(bitmap, palette),
                None => Some(NEUTRAL),
            });
            // A blank tile averages to transparent, leaving the background
            let Some(color) = color else {
                continue;
            };

            let x0 = (x_offset + col as f64 * cell).round() as u32;
            let x1 = ((x_offset + (col + 1) as f64 * cell).round() as u32).min(side_length);
            let y0 = (y_offset + row as f64 * cell).round() as u32;
            let y1 = ((y_offset + (row + 1) as f64 * cell).round() as u32).min(side_length);
            for y in y0..y1 {
                for x in x0..x1 {
                    image.put_pixel(x, y, color.to_rgba(255));
                }
            }
        }
    }

    image
}
