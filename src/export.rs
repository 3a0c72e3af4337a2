//! Exporting named assets as a self-contained project archive
//!
//! # Example
//!
//! ```
//! use sprite_pack::bitmap::Bitmap;
//! use sprite_pack::compress::BrotliCompressor;
//! use sprite_pack::context::ProjectContext;
//! use sprite_pack::export::{build_project, export_project, ExportAsset};
//! use sprite_pack::record::AssetRecord;
//!
//! let ctx = ProjectContext::default();
//! let hero = AssetRecord::from_bitmap(&Bitmap::from_rows(&[vec![1, 2], vec![3, 4]]), &ctx);
//! let assets = vec![ExportAsset::new("hero", hero)];
//!
//! let bundle = build_project("my pack", &assets, &ctx).unwrap();
//! assert_eq!(bundle.namespace, "my_packSprites");
//!
//! let archive = export_project("my pack", &assets, &ctx, &BrotliCompressor::default()).unwrap();
//! assert!(!archive.is_empty());
//! ```

use crate::compress::{CompressionError, Compressor};
use crate::context::ProjectContext;
use crate::ident::{escape_identifier, NameRegistry};
use crate::jres::{JresEntry, JresFile, JresMeta, JresRecord, IMAGE_MIME_TYPE};
use crate::project::{
    ProjectBundle, ProjectFiles, ProjectManifest, ASSETS_JRES, ASSETS_TS, MAIN_BLOCKS, MAIN_BLOCKS_XML, MAIN_TS,
    PROJECT_COMMENT, PXT_JSON, README_MD, TEST_PLAYGROUND, TEST_TS,
};
use crate::record::AssetRecord;
use thiserror::Error;

/// File extension of exported archives.
///
/// The extension is shared with LZMA-compressed editor archives, but the
/// bytes are whatever the [`Compressor`] produced, Brotli with
/// [`BrotliCompressor`](crate::compress::BrotliCompressor). Such archives
/// only open with the same compressor.
pub const ARCHIVE_EXTENSION: &str = "mkcd";

/// Suffix appended to the escaped project name to form the namespace
pub const NAMESPACE_SUFFIX: &str = "Sprites";

/// Error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// A record to export and the name the user gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportAsset {
    pub name: String,
    pub record: AssetRecord,
}

impl ExportAsset {
    pub fn new(name: impl Into<String>, record: AssetRecord) -> Self {
        Self { name: name.into(), record }
    }
}

/// An asset after identifier assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry<'a> {
    pub identifier: String,
    pub record: &'a AssetRecord,
    pub is_tileset_tile: bool,
}

/// Namespace for a project name.
pub fn project_namespace(project_name: &str) -> String {
    format!("{}{}", escape_identifier(project_name), NAMESPACE_SUFFIX)
}

/// Assign each asset a unique identifier, in input order.
pub fn assign_identifiers(assets: &[ExportAsset]) -> Vec<ExportEntry<'_>> {
    let mut names = NameRegistry::new();
    assets
        .iter()
        .map(|asset| ExportEntry {
            identifier: names.claim(&asset.name),
            record: &asset.record,
            is_tileset_tile: asset.record.is_tileset_tile,
        })
        .collect()
}

fn build_jres(namespace: &str, entries: &[ExportEntry<'_>]) -> JresFile {
    let mut jres =
        JresFile::new(JresMeta { namespace: namespace.to_string(), mime_type: IMAGE_MIME_TYPE.to_string() });
    for entry in entries {
        let data = entry.record.binary_data.clone();
        let value = if entry.is_tileset_tile {
            JresEntry::Structured(JresRecord {
                id: entry.identifier.clone(),
                data,
                tilemap_tile: Some(true),
                mime_type: IMAGE_MIME_TYPE.to_string(),
                ..Default::default()
            })
        } else {
            JresEntry::Inline(data)
        };
        jres.push(entry.identifier.clone(), value);
    }
    jres
}

fn build_assets_ts(namespace: &str, entries: &[ExportEntry<'_>]) -> String {
    let mut body = String::new();
    for entry in entries {
        let identity = if entry.is_tileset_tile { "images._tile" } else { "images._image" };
        body.push_str(&format!("    //% fixedInstance jres blockIdentity={}\n", identity));
        body.push_str(&format!("    export const {} = image.ofBuffer(hex``);\n", entry.identifier));
    }
    format!("namespace {} {{\n{}\n}}\n", namespace, body)
}

/// Build the project file set for a list of assets.
///
/// Pure: nothing is compressed or written. Identifiers are unique within
/// the call and follow input order.
pub fn build_project(
    project_name: &str,
    assets: &[ExportAsset],
    ctx: &ProjectContext,
) -> Result<ProjectBundle, ExportError> {
    let namespace = project_namespace(project_name);
    let entries = assign_identifiers(assets);
    tracing::debug!("exporting {} assets into namespace {}", entries.len(), namespace);

    let palette = ctx.has_custom_palette().then(|| ctx.palette().to_hex_strings());
    let manifest = ProjectManifest::for_sprite_pack(project_name, palette);

    let mut files = ProjectFiles::new();
    files.insert(PXT_JSON, manifest.to_json()?);
    files.insert(MAIN_TS, PROJECT_COMMENT);
    files.insert(TEST_TS, TEST_PLAYGROUND);
    files.insert(ASSETS_TS, build_assets_ts(&namespace, &entries));
    files.insert(ASSETS_JRES, build_jres(&namespace, &entries).to_json());
    files.insert(README_MD, "");
    files.insert(MAIN_BLOCKS, MAIN_BLOCKS_XML);

    Ok(ProjectBundle { name: project_name.to_string(), namespace, files, manifest })
}

/// Build and compress a project archive.
pub fn export_project(
    project_name: &str,
    assets: &[ExportAsset],
    ctx: &ProjectContext,
    compressor: &impl Compressor,
) -> Result<Vec<u8>, ExportError> {
    let bundle = build_project(project_name, assets, ctx)?;
    let archive = bundle.to_archive_json()?;
    Ok(compressor.compress(&archive)?)
}

/// File name an archive for `project_name` is saved under.
pub fn archive_file_name(project_name: &str) -> String {
    format!("{}.{}", project_name, ARCHIVE_EXTENSION)
}
