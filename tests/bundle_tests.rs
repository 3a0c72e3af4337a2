//! End-to-end tests for exporting and re-importing project bundles
//!
//! These tests drive the library the way the CLI does: build records from
//! bitmaps, export them into an archive, then import the archive and check
//! what comes back.

use sprite_pack::bitmap::Bitmap;
use sprite_pack::compress::{BrotliCompressor, Compressor, Uncompressed};
use sprite_pack::context::ProjectContext;
use sprite_pack::export::{build_project, export_project, ExportAsset};
use sprite_pack::f4;
use sprite_pack::import::{import_archive, import_files, ImportError};
use sprite_pack::jres::{JresEntry, JresFile};
use sprite_pack::literal::{self, LiteralFormat};
use sprite_pack::palette;
use sprite_pack::project::{ArchiveEnvelope, ProjectFiles, ASSETS_JRES, ASSETS_TS, PXT_JSON};
use sprite_pack::record::AssetRecord;

fn checker(width: u16, height: u16, a: u8, b: u8) -> Bitmap {
    let mut bitmap = Bitmap::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            bitmap.set(x, y, if (x + y) % 2 == 0 { a } else { b });
        }
    }
    bitmap
}

fn three_assets(ctx: &ProjectContext) -> Vec<ExportAsset> {
    vec![
        ExportAsset::new("hero", AssetRecord::from_bitmap(&checker(16, 16, 1, 2), ctx)),
        ExportAsset::new("hero", AssetRecord::from_bitmap(&checker(8, 4, 3, 0), ctx)),
        ExportAsset::new("grass tile", AssetRecord::from_bitmap(&checker(16, 16, 7, 6), ctx).with_tileset_tile(true)),
    ]
}

#[test]
fn test_export_three_assets() {
    let ctx = ProjectContext::default();
    let assets = three_assets(&ctx);
    let bundle = build_project("Forest Pack", &assets, &ctx).expect("should build project");

    assert_eq!(bundle.namespace, "Forest_PackSprites");

    let jres = JresFile::parse(bundle.files.get(ASSETS_JRES).unwrap()).expect("jres should parse");
    // "*" plus three assets
    assert_eq!(jres.to_value().as_object().unwrap().len(), 4);
    let keys: Vec<&str> = jres.entries.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["hero", "hero2", "grass_tile"]);
    assert!(matches!(&jres.entries[2].1, JresEntry::Structured(record) if record.id == "grass_tile"));

    let ts = bundle.files.get(ASSETS_TS).unwrap();
    assert_eq!(ts.matches("export const").count(), 3);
    assert!(ts.contains("export const hero2 = image.ofBuffer(hex``);"));
    assert!(ts.contains("blockIdentity=images._tile"));
}

#[test]
fn test_export_then_import_roundtrip() {
    let ctx = ProjectContext::default();
    let assets = three_assets(&ctx);
    let compressor = BrotliCompressor::default();

    let archive = export_project("Forest Pack", &assets, &ctx, &compressor).expect("should export");
    let result = import_archive(&archive, &ctx, &compressor).expect("should import");

    assert!(result.warnings.is_empty());
    assert!(result.custom_palette.is_none());
    assert_eq!(result.records.len(), 3);

    for (asset, record) in assets.iter().zip(&result.records) {
        assert_eq!(record.binary_data, asset.record.binary_data);
        assert_eq!((record.width, record.height), (asset.record.width, asset.record.height));
        assert_eq!(record.bitmap(), asset.record.bitmap());
        assert_eq!(record.source_file.as_deref(), Some(ASSETS_JRES));
    }

    let names: Vec<&str> = result.records.iter().filter_map(|r| r.qualified_name.as_deref()).collect();
    assert_eq!(names, vec!["Forest_PackSprites.hero", "Forest_PackSprites.hero2", "Forest_PackSprites.grass_tile"]);
    assert!(result.records[2].is_tileset_tile);
}

#[test]
fn test_archive_is_brotli_compressed_envelope() {
    let ctx = ProjectContext::default();
    let compressor = BrotliCompressor::default();
    let archive = export_project("pack", &three_assets(&ctx), &ctx, &compressor).unwrap();

    let text = compressor.decompress(&archive).expect("should decompress");
    let envelope = ArchiveEnvelope::parse(&text).expect("should be an envelope");
    assert_eq!(envelope.meta.name, "pack");
    assert_eq!(envelope.meta.editor, "tsprj");

    let files = envelope.files().unwrap();
    assert!(files.get(PXT_JSON).unwrap().contains("\"name\": \"pack\""));
}

#[test]
fn test_identical_payloads_collapse_to_named_record() {
    let ctx = ProjectContext::default();
    let bitmap = checker(4, 4, 5, 9);
    let payload = f4::encode_base64(&bitmap);
    let literal = literal::encode(&bitmap, LiteralFormat::TypeScript);

    let files: ProjectFiles = [
        ("a_main.ts", format!("let a = {};\nlet b = {};", literal, literal)),
        ("b_images.jres", format!(r#"{{"*": {{"namespace": "art", "mimeType": "image/x-mkcd-f4"}}, "bush": "{}"}}"#, payload)),
        ("c_game.py", literal::encode(&bitmap, LiteralFormat::Python)),
    ]
    .into_iter()
    .collect();

    let result = import_files(&files, &ctx);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].qualified_name.as_deref(), Some("art.bush"));
    assert_eq!(result.records[0].binary_data, payload);
}

#[test]
fn test_custom_palette_survives_roundtrip() {
    let grayscale = palette::builtin("grayscale").unwrap();
    let ctx = ProjectContext::default().with_palette(grayscale.clone());
    let assets = vec![ExportAsset::new("shade", AssetRecord::from_bitmap(&checker(2, 2, 15, 1), &ctx))];

    let archive = export_project("gray", &assets, &ctx, &Uncompressed).unwrap();
    let result = import_archive(&archive, &ProjectContext::default(), &Uncompressed).unwrap();

    assert_eq!(result.custom_palette, Some(grayscale));
    assert_eq!(result.records[0].preview_uri, assets[0].record.preview_uri);
}

#[test]
fn test_corrupt_archive_is_rejected() {
    let ctx = ProjectContext::default();
    let compressor = BrotliCompressor::default();
    let archive = export_project("pack", &three_assets(&ctx), &ctx, &compressor).unwrap();

    let truncated = &archive[..archive.len() / 2];
    assert!(matches!(import_archive(truncated, &ctx, &compressor), Err(ImportError::Compression(_))));

    let not_an_envelope = compressor.compress("{\"hello\": 1}").unwrap();
    assert!(matches!(import_archive(&not_an_envelope, &ctx, &compressor), Err(ImportError::Archive(_))));
}

#[test]
fn test_malformed_payload_defaults_to_empty() {
    let ctx = ProjectContext::default();
    let files: ProjectFiles = [(
        "assets.jres",
        r#"{"*": {"namespace": "ns", "mimeType": "image/x-mkcd-f4"}, "broken": "AAAA", "bad64": "%%%"}"#,
    )]
    .into_iter()
    .collect();

    let result = import_files(&files, &ctx);
    assert_eq!(result.records.len(), 2);
    for record in &result.records {
        assert_eq!((record.width, record.height), (0, 0));
        assert!(record.bitmap().is_empty());
    }
}
