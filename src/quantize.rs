//! Nearest-color quantization of RGBA samples onto a palette.

use crate::bitmap::Bitmap;
use crate::palette::Palette;
use image::{Rgba, RgbaImage};

/// Samples with alpha below this value map to index 0.
pub const TRANSPARENCY_THRESHOLD: u8 = 100;

/// Map one RGBA sample to the nearest palette index.
///
/// Transparent-enough samples short-circuit to 0 without looking at RGB.
/// Otherwise every entry from index 1 up is compared by squared RGB
/// distance; the first minimum found wins, so ties go to the lower index.
pub fn quantize(pixel: Rgba<u8>, palette: &Palette) -> u8 {
    let [r, g, b, a] = pixel.0;
    if a < TRANSPARENCY_THRESHOLD {
        return 0;
    }

    let mut best_index = 0u8;
    let mut best_distance = u32::MAX;
    for (index, color) in palette.colors().iter().enumerate().skip(1) {
        let distance = color.distance_sq(r, g, b);
        if distance < best_distance {
            best_distance = distance;
            best_index = index as u8;
        }
    }
    best_index
}

/// Quantize a whole image into a bitmap of the same size.
///
/// Images larger than `u16::MAX` in either dimension are cropped.
pub fn quantize_image(image: &RgbaImage, palette: &Palette) -> Bitmap {
    let width = image.width().min(u16::MAX as u32) as u16;
    let height = image.height().min(u16::MAX as u32) as u16;
    let mut bitmap = Bitmap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let index = quantize(*image.get_pixel(x as u32, y as u32), palette);
            bitmap.set(x as i32, y as i32, index);
        }
    }
    bitmap
}
