//! Command-line interface implementation

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::compress::Uncompressed;
use crate::config::{load_config, merge_cli_overrides, CliOverrides, SpritePackConfig};
use crate::context::ProjectContext;
use crate::export::{archive_file_name, export_project, ExportAsset};
use crate::f4;
use crate::import::{import_archive, import_files, ImportResult, Warning};
use crate::literal::{self, LiteralFormat};
use crate::output::{output_path, record_file_names, save_png, scale_image, write_listing};
use crate::preview::render_bitmap;
use crate::project::{ArchiveEnvelope, ProjectFiles};
use crate::quantize::quantize_image;
use crate::record::AssetRecord;

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// sprite-pack - Bundle indexed-color sprites into project archives
#[derive(Parser)]
#[command(name = "spack")]
#[command(about = "sprite-pack - Bundle indexed-color sprites into project archives")]
#[command(version)]
pub struct Cli {
    /// Path to a spack.toml (default: discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output of the convert command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConvertFormat {
    /// img`...` literal
    Typescript,
    /// img("""...""") literal
    Python,
    /// Base64 f4 payload
    F4,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack PNGs and image literals into a project archive
    Pack {
        /// PNG images or source files containing image literals
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Archive to write (default: {name}.mkcd)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Project name (overrides spack.toml)
        #[arg(long)]
        name: Option<String>,

        /// Mark the asset with this name as a tileset tile (repeatable)
        #[arg(long = "tile", value_name = "NAME")]
        tiles: Vec<String>,

        /// Built-in palette to quantize and preview with
        #[arg(long)]
        palette: Option<String>,

        /// Brotli quality (0-11)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=11))]
        quality: Option<u32>,
    },

    /// Extract every image of an archive or project file set as PNGs
    Unpack {
        /// Archive (.mkcd) or JSON project (envelope or file mapping)
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Convert a PNG into an image literal or f4 payload
    Convert {
        /// Input PNG
        input: PathBuf,

        /// Output format (default: the configured literal format)
        #[arg(long, value_enum)]
        format: Option<ConvertFormat>,

        /// Built-in palette to quantize with
        #[arg(long)]
        palette: Option<String>,
    },

    /// Decode every image literal in a source file
    Literal {
        /// Source file to scan
        input: PathBuf,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let mut overrides = CliOverrides::default();
    match &cli.command {
        Commands::Pack { name, palette, quality, .. } => {
            overrides.name = name.clone();
            overrides.palette = palette.clone();
            overrides.compression_quality = *quality;
        }
        Commands::Unpack { scale, .. } => overrides.scale = *scale,
        Commands::Convert { palette, .. } => overrides.palette = palette.clone(),
        Commands::Literal { .. } => {}
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, &overrides);
            config
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    match cli.command {
        Commands::Pack { inputs, output, tiles, .. } => run_pack(&inputs, output.as_deref(), &tiles, &config),
        Commands::Unpack { input, output, strict, .. } => run_unpack(&input, &output, strict, &config),
        Commands::Convert { input, format, .. } => run_convert(&input, format, &config),
        Commands::Literal { input } => run_literal(&input),
    }
}

fn is_png(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "image".to_string())
}

/// Load one pack input as assets.
fn load_assets(path: &Path, ctx: &ProjectContext, warnings: &mut Vec<String>) -> Result<Vec<ExportAsset>, String> {
    let name = file_stem(path);
    if is_png(path) {
        let image = image::open(path).map_err(|e| format!("Cannot read image '{}': {}", path.display(), e))?;
        let bitmap = quantize_image(&image.to_rgba8(), ctx.palette());
        return Ok(vec![ExportAsset::new(name, AssetRecord::from_bitmap(&bitmap, ctx))]);
    }

    let text =
        std::fs::read_to_string(path).map_err(|e| format!("Cannot read input file '{}': {}", path.display(), e))?;
    let source_file = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let found = literal::scan(&text);
    if found.is_empty() {
        warnings.push(format!("{}: no image literals found", path.display()));
    }
    Ok(found
        .iter()
        .map(|m| ExportAsset::new(name.clone(), AssetRecord::from_literal(&m.text, ctx, source_file.clone())))
        .collect())
}

/// Execute the pack command
fn run_pack(inputs: &[PathBuf], output: Option<&Path>, tiles: &[String], config: &SpritePackConfig) -> ExitCode {
    let ctx = config.context();
    let mut warnings = Vec::new();
    let mut assets = Vec::new();

    for input in inputs {
        if !input.exists() {
            eprintln!("Error: Cannot open input file '{}'", input.display());
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        match load_assets(input, &ctx, &mut warnings) {
            Ok(loaded) => assets.extend(loaded),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    for tile in tiles {
        if !assets.iter().any(|asset| &asset.name == tile) {
            warnings.push(format!("--tile '{}' does not match any asset", tile));
        }
    }
    for asset in &mut assets {
        if tiles.contains(&asset.name) {
            asset.record.is_tileset_tile = true;
        }
    }

    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    if assets.is_empty() {
        eprintln!("Error: No images found in inputs");
        return ExitCode::from(EXIT_ERROR);
    }

    let name = &config.project.name;
    let archive = match export_project(name, &assets, &ctx, &config.compressor()) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(archive_file_name(name)));
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: Failed to create '{}': {}", parent.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
    if let Err(e) = std::fs::write(&path, archive) {
        eprintln!("Error: Failed to save '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Saved: {} ({} assets)", path.display(), assets.len());
    ExitCode::from(EXIT_SUCCESS)
}

/// Import an archive, or a JSON project given either as an envelope or as
/// a plain file mapping.
fn import_input(path: &Path, ctx: &ProjectContext, config: &SpritePackConfig) -> Result<ImportResult, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Cannot open input file '{}': {}", path.display(), e))?;
    let is_json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return import_archive(&bytes, ctx, &config.compressor()).map_err(|e| e.to_string());
    }

    let text = String::from_utf8_lossy(&bytes);
    if ArchiveEnvelope::parse(&text).is_ok() {
        return import_archive(&bytes, ctx, &Uncompressed).map_err(|e| e.to_string());
    }
    let files = ProjectFiles::from_json(&text).map_err(|e| format!("Invalid project file: {}", e))?;
    Ok(import_files(&files, ctx))
}

fn print_warnings(warnings: &[Warning], prefix: &str) {
    for warning in warnings {
        eprintln!("{}: {}", prefix, warning);
    }
}

/// Execute the unpack command
fn run_unpack(input: &Path, output: &Path, strict: bool, config: &SpritePackConfig) -> ExitCode {
    if !input.exists() {
        eprintln!("Error: Cannot open input file '{}'", input.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let ctx = config.context();
    let result = match import_input(input, &ctx, config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let files = record_file_names(&result.records);
    let mut warnings = result.warnings.clone();
    for (record, file) in result.records.iter().zip(&files) {
        if record.width == 0 || record.height == 0 {
            let source = record.source_file.as_deref().unwrap_or("input");
            warnings.push(Warning::in_file(source, format!("Skipped empty image '{}'", file)));
        }
    }

    if strict && !warnings.is_empty() {
        print_warnings(&warnings, "Error");
        return ExitCode::from(EXIT_ERROR);
    }

    let palette = result.custom_palette.clone().unwrap_or_else(|| ctx.palette().clone());
    for (record, file) in result.records.iter().zip(&files) {
        if record.width == 0 || record.height == 0 {
            continue;
        }
        let image = scale_image(render_bitmap(&record.bitmap(), &palette), config.preview.scale);
        let path = output_path(output, file);
        if let Err(e) = save_png(&image, &path) {
            eprintln!("Error: Failed to save '{}': {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        println!("Saved: {}", path.display());
    }

    match write_listing(output, &result.records, &files) {
        Ok(path) => println!("Saved: {}", path.display()),
        Err(e) => {
            eprintln!("Error: Failed to write listing: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    print_warnings(&warnings, "Warning");
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the convert command
fn run_convert(input: &Path, format: Option<ConvertFormat>, config: &SpritePackConfig) -> ExitCode {
    let image = match image::open(input) {
        Ok(image) => image.to_rgba8(),
        Err(e) => {
            eprintln!("Error: Cannot read image '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let ctx = config.context();
    let bitmap = quantize_image(&image, ctx.palette());

    let text = match format {
        Some(ConvertFormat::F4) => f4::encode_base64(&bitmap),
        Some(ConvertFormat::Typescript) => literal::encode(&bitmap, LiteralFormat::TypeScript),
        Some(ConvertFormat::Python) => literal::encode(&bitmap, LiteralFormat::Python),
        None => literal::encode(&bitmap, config.export.literal_format),
    };
    println!("{}", text);
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the literal command
fn run_literal(input: &Path) -> ExitCode {
    let text = match std::fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let found = literal::scan(&text);
    if found.is_empty() {
        eprintln!("Error: No image literals found in '{}'", input.display());
        return ExitCode::from(EXIT_ERROR);
    }

    for (index, m) in found.iter().enumerate() {
        let bitmap = m.decode();
        let line = text[..m.range.start].matches('\n').count() + 1;
        println!("{}: line {} {}x{} {}", index, line, bitmap.width(), bitmap.height(), f4::encode_base64(&bitmap));
    }
    ExitCode::from(EXIT_SUCCESS)
}
