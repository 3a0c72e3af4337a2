//! PNG output and file path generation for unpacked archives

use crate::ident::NameRegistry;
use crate::record::AssetRecord;
use image::imageops::FilterType;
use image::RgbaImage;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the listing written next to unpacked PNGs
pub const ASSET_LISTING: &str = "assets.json";

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// This preserves crisp pixel edges for pixel art.
pub fn scale_image(image: RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 || image.width() == 0 || image.height() == 0 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// One line of the unpack listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedAsset<'a> {
    /// PNG file written for the record, relative to the output directory
    pub file: String,
    #[serde(flatten)]
    pub record: &'a AssetRecord,
}

/// Pick unique PNG file names for a list of records.
///
/// Named records use their qualified name with dots turned into
/// underscores; anonymous ones are called `image`, `image2`, ...
pub fn record_file_names(records: &[AssetRecord]) -> Vec<String> {
    let mut names = NameRegistry::new();
    records
        .iter()
        .map(|record| {
            let stem = match &record.qualified_name {
                Some(name) if !name.is_empty() => name.replace('.', "_"),
                _ => "image".to_string(),
            };
            format!("{}.png", names.claim(&stem))
        })
        .collect()
}

/// Path of a file inside the output directory.
pub fn output_path(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(file_name)
}

/// Write `assets.json` describing the unpacked records.
pub fn write_listing(output_dir: &Path, records: &[AssetRecord], files: &[String]) -> Result<PathBuf, OutputError> {
    let listing: Vec<ListedAsset<'_>> =
        records.iter().zip(files).map(|(record, file)| ListedAsset { file: file.clone(), record }).collect();
    std::fs::create_dir_all(output_dir)?;
    let path = output_path(output_dir, ASSET_LISTING);
    std::fs::write(&path, serde_json::to_string_pretty(&listing)?)?;
    Ok(path)
}
