//! Configuration loading and discovery for `spack.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{ExportConfig, PaletteConfig, PreviewConfig, ProjectConfig, SpritePackConfig};
use crate::literal::LiteralFormat;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "spack.toml";

/// Directory under the XDG config home holding the user configuration
pub const XDG_DIR_NAME: &str = "sprite-pack";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse spack.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override project name
    pub name: Option<String>,
    /// Use a built-in palette instead of the configured one
    pub palette: Option<String>,
    /// Override literal format
    pub literal_format: Option<LiteralFormat>,
    /// Override compression quality
    pub compression_quality: Option<u32>,
    /// Override preview scale
    pub scale: Option<u32>,
    /// Override tilemap background style
    pub light_mode: Option<bool>,
}

/// Find spack.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for spack.toml
/// 2. Check XDG_CONFIG_HOME/sprite-pack/spack.toml (or ~/.config/sprite-pack/spack.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find spack.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join(XDG_DIR_NAME).join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find spack.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a spack.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration.
///
/// # Example
/// ```no_run
/// use sprite_pack::config::load_config;
/// use std::path::Path;
///
/// let discovered = load_config(None)?;
/// let explicit = load_config(Some(Path::new("my-pack/spack.toml")))?;
/// # Ok::<(), sprite_pack::config::ConfigError>(())
/// ```
pub fn load_config(path: Option<&Path>) -> Result<SpritePackConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

fn load_config_file(path: &Path) -> Result<SpritePackConfig, ConfigError> {
    tracing::debug!("loading config from {}", path.display());
    let contents = fs::read_to_string(path)?;
    let config: SpritePackConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Create a default configuration when no spack.toml is found.
///
/// The project is named after the current directory.
pub fn default_config() -> SpritePackConfig {
    let project_name = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "sprites".to_string());

    SpritePackConfig {
        project: ProjectConfig { name: project_name },
        palette: PaletteConfig::default(),
        export: ExportConfig::default(),
        preview: PreviewConfig::default(),
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut SpritePackConfig, overrides: &CliOverrides) {
    if let Some(ref name) = overrides.name {
        config.project.name = name.clone();
    }

    // A palette named on the command line replaces explicit colors too
    if let Some(ref palette) = overrides.palette {
        config.palette = PaletteConfig { builtin: Some(palette.clone()), colors: None };
    }

    if let Some(format) = overrides.literal_format {
        config.export.literal_format = format;
    }

    if let Some(quality) = overrides.compression_quality {
        config.export.compression_quality = quality;
    }

    if let Some(scale) = overrides.scale {
        config.preview.scale = scale;
    }

    if let Some(light_mode) = overrides.light_mode {
        config.preview.light_mode = light_mode;
    }
}
