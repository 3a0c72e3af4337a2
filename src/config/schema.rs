//! Configuration schema types for `spack.toml`
//!
//! Defines the structure and validation rules for sprite-pack project configuration.

use crate::compress::BrotliCompressor;
use crate::context::ProjectContext;
use crate::literal::LiteralFormat;
use crate::palette::{self, Palette, MAX_COLORS};
use crate::preview::TilemapStyle;
use serde::{Deserialize, Serialize};

/// Highest brotli quality level
pub const MAX_COMPRESSION_QUALITY: u32 = 11;

/// Largest preview scale factor
pub const MAX_PREVIEW_SCALE: u32 = 16;

/// Project metadata section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required), used for the archive name and namespace
    pub name: String,
}

/// Palette selection
///
/// `colors` lists hex colors explicitly; otherwise `builtin` names one of
/// the built-in palettes. Neither set means the arcade palette.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Wrapper used when printing image literals
    #[serde(default)]
    pub literal_format: LiteralFormat,
    /// Brotli quality, 0-11
    #[serde(default = "default_compression_quality")]
    pub compression_quality: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { literal_format: LiteralFormat::default(), compression_quality: default_compression_quality() }
    }
}

fn default_compression_quality() -> u32 {
    crate::compress::DEFAULT_QUALITY
}

/// Preview rendering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Side length of tilemap overviews in pixels
    #[serde(default = "default_tilemap_side")]
    pub tilemap_side: u32,
    /// Paint tilemap backgrounds with the neutral color
    #[serde(default)]
    pub light_mode: bool,
    /// Scale factor for PNGs written by `unpack`
    #[serde(default = "default_scale")]
    pub scale: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { tilemap_side: default_tilemap_side(), light_mode: false, scale: default_scale() }
    }
}

fn default_tilemap_side() -> u32 {
    64
}

fn default_scale() -> u32 {
    1
}

/// Complete `spack.toml` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpritePackConfig {
    /// Project metadata (required)
    pub project: ProjectConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "palette.colors")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spack.toml: '{}' {}", self.field, self.message)
    }
}

impl SpritePackConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.name.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.palette.builtin.is_some() && self.palette.colors.is_some() {
            errors.push(ConfigValidationError {
                field: "palette".to_string(),
                message: "set either 'builtin' or 'colors', not both".to_string(),
            });
        }

        if let Some(name) = &self.palette.builtin {
            if palette::builtin(name).is_none() {
                errors.push(ConfigValidationError {
                    field: "palette.builtin".to_string(),
                    message: format!(
                        "unknown palette '{}' (expected one of: {})",
                        name,
                        palette::list_builtins().join(", ")
                    ),
                });
            }
        }

        if let Some(colors) = &self.palette.colors {
            if colors.len() > MAX_COLORS {
                errors.push(ConfigValidationError {
                    field: "palette.colors".to_string(),
                    message: format!("has {} colors, at most {} are allowed", colors.len(), MAX_COLORS),
                });
            }
            if let Err(e) = Palette::from_hex_strings(colors) {
                errors.push(ConfigValidationError { field: "palette.colors".to_string(), message: e.to_string() });
            }
        }

        if self.export.compression_quality > MAX_COMPRESSION_QUALITY {
            errors.push(ConfigValidationError {
                field: "export.compression_quality".to_string(),
                message: format!("must be between 0 and {}", MAX_COMPRESSION_QUALITY),
            });
        }

        if self.preview.scale == 0 || self.preview.scale > MAX_PREVIEW_SCALE {
            errors.push(ConfigValidationError {
                field: "preview.scale".to_string(),
                message: format!("must be between 1 and {}", MAX_PREVIEW_SCALE),
            });
        }

        if self.preview.tilemap_side == 0 {
            errors.push(ConfigValidationError {
                field: "preview.tilemap_side".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// The configured palette, or arcade when the selection is unusable.
    pub fn resolve_palette(&self) -> Palette {
        if let Some(colors) = &self.palette.colors {
            match Palette::from_hex_strings(colors) {
                Ok(palette) => return palette,
                Err(e) => tracing::warn!("falling back to arcade palette: {}", e),
            }
        } else if let Some(name) = &self.palette.builtin {
            match palette::builtin(name) {
                Some(palette) => return palette,
                None => tracing::warn!("falling back to arcade palette: unknown palette '{}'", name),
            }
        }
        Palette::arcade()
    }

    /// Project context for codec and bundle operations.
    pub fn context(&self) -> ProjectContext {
        ProjectContext::new(self.resolve_palette())
    }

    pub fn compressor(&self) -> BrotliCompressor {
        BrotliCompressor::with_quality(self.export.compression_quality)
    }

    pub fn tilemap_style(&self) -> TilemapStyle {
        if self.preview.light_mode {
            TilemapStyle::Light
        } else {
            TilemapStyle::Dark
        }
    }
}
