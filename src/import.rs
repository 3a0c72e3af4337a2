//! Importing asset records from an existing project
//!
//! Images are collected from resource files (`*.jres`) and from image
//! literals in source files (`*.ts`, `*.py`), then deduplicated by their
//! base64 payload. Generated sources (`*.g.ts`) are skipped since they only
//! mirror resource files.

use crate::compress::{CompressionError, Compressor};
use crate::context::ProjectContext;
use crate::jres::JresFile;
use crate::literal;
use crate::palette::Palette;
use crate::project::{ArchiveEnvelope, ProjectFiles, ProjectManifest, PXT_JSON};
use crate::record::AssetRecord;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Error type for archive import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid archive: {0}")]
    Archive(#[from] serde_json::Error),
    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// A recoverable problem met while importing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    /// Project file the problem was found in
    pub file: Option<String>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), file: None }
    }

    pub fn in_file(file: &str, message: impl Into<String>) -> Self {
        Self { message: message.into(), file: Some(file.to_string()) }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}: {}", file, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Records found by an import.
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// One record per distinct payload, in first-seen order
    pub records: Vec<AssetRecord>,
    /// Palette declared by the project manifest, if any
    pub custom_palette: Option<Palette>,
    pub warnings: Vec<Warning>,
}

impl ImportResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Payload → record index local to one import.
///
/// Keeps one record per distinct payload string. A named record replaces
/// an anonymous one; otherwise the first record seen wins.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    order: Vec<String>,
    records: HashMap<String, AssetRecord>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a record; returns true if it was stored.
    pub fn insert(&mut self, record: AssetRecord) -> bool {
        match self.records.get(&record.binary_data) {
            None => {
                self.order.push(record.binary_data.clone());
                self.records.insert(record.binary_data.clone(), record);
                true
            }
            Some(existing) if !existing.is_named() && record.is_named() => {
                self.records.insert(record.binary_data.clone(), record);
                true
            }
            Some(_) => false,
        }
    }

    pub fn get(&self, data: &str) -> Option<&AssetRecord> {
        self.records.get(data)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Stored records in first-seen order.
    pub fn into_records(mut self) -> Vec<AssetRecord> {
        self.order.iter().filter_map(|data| self.records.remove(data)).collect()
    }
}

fn is_source_file(name: &str) -> bool {
    (name.ends_with(".ts") && !name.ends_with(".g.ts")) || name.ends_with(".py")
}

/// Palette declared in `pxt.json`, if there is a usable one.
fn manifest_palette(files: &ProjectFiles, warnings: &mut Vec<Warning>) -> Option<Palette> {
    let colors = ProjectManifest::palette_from_json(files.get(PXT_JSON)?)?;
    match Palette::from_hex_strings(&colors) {
        Ok(palette) => Some(palette),
        Err(e) => {
            warnings.push(Warning::in_file(PXT_JSON, format!("ignoring palette: {}", e)));
            None
        }
    }
}

fn import_jres(name: &str, text: &str, ctx: &ProjectContext, index: &mut DedupIndex, warnings: &mut Vec<Warning>) {
    let jres = match JresFile::parse(text) {
        Ok(jres) => jres,
        Err(e) => {
            warnings.push(Warning::in_file(name, format!("skipping unreadable resource file: {}", e)));
            return;
        }
    };
    for (key, entry) in jres.images() {
        index.insert(AssetRecord::from_data_string(
            entry.data(),
            ctx,
            Some(jres.qualified_name(key)),
            entry.is_tilemap_tile(),
            Some(name.to_string()),
        ));
    }
}

fn import_source(name: &str, text: &str, ctx: &ProjectContext, index: &mut DedupIndex) {
    for found in literal::scan(text) {
        index.insert(AssetRecord::from_literal(&found.text, ctx, Some(name.to_string())));
    }
}

/// Collect every image in a project file set.
///
/// Files are visited in lexicographic name order. A palette declared in
/// `pxt.json` replaces the context palette for the previews of this import
/// and is reported back in the result.
pub fn import_files(files: &ProjectFiles, ctx: &ProjectContext) -> ImportResult {
    let mut warnings = Vec::new();
    let custom_palette = manifest_palette(files, &mut warnings);
    let ctx = match &custom_palette {
        Some(palette) => ctx.with_palette(palette.clone()),
        None => ctx.clone(),
    };

    let mut index = DedupIndex::new();
    for (name, text) in files.sorted() {
        if name.ends_with(".jres") {
            import_jres(name, text, &ctx, &mut index, &mut warnings);
        } else if is_source_file(name) {
            import_source(name, text, &ctx, &mut index);
        } else {
            tracing::debug!("skipping project file {}", name);
        }
    }

    ImportResult { records: index.into_records(), custom_palette, warnings }
}

/// Decompress an archive and import its files.
pub fn import_archive(
    bytes: &[u8],
    ctx: &ProjectContext,
    compressor: &impl Compressor,
) -> Result<ImportResult, ImportError> {
    let text = compressor.decompress(bytes)?;
    let envelope = ArchiveEnvelope::parse(&text)?;
    tracing::debug!("importing archive '{}'", envelope.meta.name);
    let files = envelope.files()?;
    Ok(import_files(&files, ctx))
}

/// Script id of a share URL: the text after the last `/`.
///
/// ```
/// use sprite_pack::import::script_id_from_url;
///
/// assert_eq!(script_id_from_url("https://makecode.com/_UAVXEwU7RAew"), "_UAVXEwU7RAew");
/// assert_eq!(script_id_from_url(" 62736-71028 "), "62736-71028");
/// ```
pub fn script_id_from_url(url: &str) -> &str {
    let url = url.trim();
    match url.rfind('/') {
        Some(pos) => &url[pos + 1..],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::compress::Uncompressed;
    use crate::f4;

    fn payload(index: u8) -> String {
        f4::encode_base64(&Bitmap::from_rows(&[vec![index, index], vec![index, 0]]))
    }

    #[test]
    fn test_dedup_prefers_named() {
        let ctx = ProjectContext::default();
        let mut index = DedupIndex::new();
        assert!(index.insert(AssetRecord::from_data_string(&payload(1), &ctx, None, false, None)));
        assert!(index.insert(AssetRecord::from_data_string(&payload(2), &ctx, None, false, None)));
        assert!(index.insert(AssetRecord::from_data_string(&payload(1), &ctx, Some("ns.x".into()), false, None)));
        assert!(!index.insert(AssetRecord::from_data_string(&payload(1), &ctx, Some("ns.y".into()), false, None)));
        assert!(!index.insert(AssetRecord::from_data_string(&payload(1), &ctx, None, false, None)));

        let records = index.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].qualified_name.as_deref(), Some("ns.x"));
        assert_eq!(records[1].binary_data, payload(2));
    }

    #[test]
    fn test_import_jres_and_literals() {
        let ctx = ProjectContext::default();
        let jres = format!(
            r#"{{"*": {{"namespace": "ns", "mimeType": "image/x-mkcd-f4"}}, "hero": "{}", "tile": {{"id": "tile", "data": "{}", "tilemapTile": true, "mimeType": "image/x-mkcd-f4"}}}}"#,
            payload(1),
            payload(7)
        );
        let files: ProjectFiles = [
            ("main.ts", "let a = img`\n1 1\n1 .\n`\nlet b = img`\n3\n`".to_string()),
            ("images.jres", jres),
            ("images.g.ts", "let c = img`\n5\n`".to_string()),
            ("README.md", "img`\n9\n`".to_string()),
        ]
        .into_iter()
        .collect();

        let result = import_files(&files, &ctx);
        assert!(!result.has_warnings());
        assert!(result.custom_palette.is_none());
        assert_eq!(result.records.len(), 3);

        // images.jres sorts before main.ts
        assert_eq!(result.records[0].qualified_name.as_deref(), Some("ns.hero"));
        assert_eq!(result.records[1].qualified_name.as_deref(), Some("ns.tile"));
        assert!(result.records[1].is_tileset_tile);
        assert_eq!(result.records[1].source_file.as_deref(), Some("images.jres"));
        assert_eq!(result.records[2].bitmap().rows(), vec![vec![3]]);
        assert_eq!(result.records[2].source_file.as_deref(), Some("main.ts"));
    }

    #[test]
    fn test_literal_and_jres_duplicates_merge() {
        let ctx = ProjectContext::default();
        let files: ProjectFiles = [
            ("a.ts", "img`\n1 1\n1 .\n`".to_string()),
            ("b.jres", format!(r#"{{"*": {{"mimeType": "image/x-mkcd-f4"}}, "hero": "{}"}}"#, payload(1))),
        ]
        .into_iter()
        .collect();
        let result = import_files(&files, &ctx);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].qualified_name.as_deref(), Some("hero"));
    }

    #[test]
    fn test_custom_palette_from_manifest() {
        let ctx = ProjectContext::default();
        let files: ProjectFiles = [
            ("pxt.json", r##"{"name": "x", "palette": ["#000000", "#00ff00"]}"##),
            ("main.ts", "img`\n1\n`"),
        ]
        .into_iter()
        .collect();
        let result = import_files(&files, &ctx);
        let palette = result.custom_palette.unwrap();
        assert_eq!(palette.len(), 2);

        let preview = crate::preview::from_data_uri(&result.records[0].preview_uri).unwrap();
        assert_eq!(preview.get_pixel(0, 0).0, [0, 0xff, 0, 255]);
    }

    #[test]
    fn test_bad_files_become_warnings() {
        let ctx = ProjectContext::default();
        let files: ProjectFiles = [
            ("pxt.json", r#"{"palette": ["nope"]}"#),
            ("broken.jres", "{not json"),
            ("main.ts", "img`\n2\n`"),
        ]
        .into_iter()
        .collect();
        let result = import_files(&files, &ctx);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[1].file.as_deref(), Some("broken.jres"));
        assert!(result.custom_palette.is_none());
    }

    #[test]
    fn test_odd_jres_entry_keeps_other_images() {
        let ctx = ProjectContext::default();
        let jres = format!(
            r#"{{"*": {{"namespace": "ns", "mimeType": "image/x-mkcd-f4"}}, "hero": "{}", "odd": {{"id": 7, "data": "AAAA", "mimeType": "text/plain"}}}}"#,
            payload(4)
        );
        let files: ProjectFiles = [("assets.jres", jres)].into_iter().collect();

        let result = import_files(&files, &ctx);
        assert!(!result.has_warnings());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].qualified_name.as_deref(), Some("ns.hero"));
    }

    #[test]
    fn test_import_archive_errors() {
        let ctx = ProjectContext::default();
        assert!(matches!(import_archive(b"not json", &ctx, &Uncompressed), Err(ImportError::Archive(_))));
        assert!(matches!(import_archive(&[0xc3], &ctx, &Uncompressed), Err(ImportError::Compression(_))));
        let bad_source = br#"{"meta":{"cloudId":"pxt/arcade","name":"x","editor":"tsprj"},"source":"[1]"}"#;
        assert!(matches!(import_archive(bad_source, &ctx, &Uncompressed), Err(ImportError::Archive(_))));
    }

    #[test]
    fn test_script_id() {
        assert_eq!(script_id_from_url("https://arcade.makecode.com/62736-71028-62577-28752"), "62736-71028-62577-28752");
        assert_eq!(script_id_from_url("abc"), "abc");
    }
}
