//! Integration tests for the spack CLI
//!
//! These tests verify end-to-end behavior of the CLI by running the binary
//! against scratch files and checking exit codes and output.

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the spack binary
fn spack_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_spack"))
}

/// Run spack inside `dir` with an isolated config environment
fn run_spack(dir: &Path, args: &[&str]) -> Output {
    Command::new(spack_binary())
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .output()
        .expect("Failed to execute spack")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// 2x2 PNG using arcade white and red
fn write_png(dir: &Path, name: &str) -> PathBuf {
    let mut image = RgbaImage::from_pixel(2, 2, Rgba([0xff, 0xff, 0xff, 255]));
    image.put_pixel(1, 0, Rgba([0xff, 0x21, 0x21, 255]));
    image.put_pixel(0, 1, Rgba([0, 0, 0, 0]));
    let path = dir.join(name);
    image.save(&path).expect("should write png");
    path
}

fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("should write source");
    path
}

#[test]
fn test_pack_then_unpack() {
    let temp = TempDir::new().expect("should create temp dir");
    write_png(temp.path(), "hero.png");
    write_source(temp.path(), "tiles.ts", "let a = img`\n    7 7\n    6 6\n`;\nlet b = img`\n    5\n`;\n");

    let output = run_spack(
        temp.path(),
        &["pack", "hero.png", "tiles.ts", "-o", "out/pack.mkcd", "--name", "forest", "--tile", "tiles"],
    );
    assert!(output.status.success(), "pack failed: {}", stderr(&output));
    assert!(stdout(&output).contains("3 assets"));
    assert!(temp.path().join("out/pack.mkcd").exists());

    let output = run_spack(temp.path(), &["unpack", "out/pack.mkcd", "-o", "unpacked", "--scale", "2"]);
    assert!(output.status.success(), "unpack failed: {}", stderr(&output));

    let listing = fs::read_to_string(temp.path().join("unpacked/assets.json")).expect("listing should exist");
    let listing: serde_json::Value = serde_json::from_str(&listing).unwrap();
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["qualifiedName"], "forestSprites.hero");
    assert_eq!(entries[1]["qualifiedName"], "forestSprites.tiles");
    assert_eq!(entries[1]["isTilesetTile"], true);
    assert_eq!(entries[2]["qualifiedName"], "forestSprites.tiles2");

    let hero = image::open(temp.path().join("unpacked/forestSprites_hero.png")).unwrap().to_rgba8();
    assert_eq!(hero.dimensions(), (4, 4));
    assert_eq!(*hero.get_pixel(2, 0), Rgba([0xff, 0x21, 0x21, 255]));
    assert_eq!(hero.get_pixel(0, 2)[3], 0);
}

#[test]
fn test_unpack_skips_empty_images() {
    let temp = TempDir::new().expect("should create temp dir");
    let project = r#"{"assets.jres": "{\"*\": {\"namespace\": \"ns\", \"mimeType\": \"image/x-mkcd-f4\"}, \"broken\": \"AAAA\"}", "main.ts": "let a = img`\n1\n`"}"#;
    write_source(temp.path(), "p.json", project);

    let output = run_spack(temp.path(), &["unpack", "p.json", "-o", "out"]);
    assert!(output.status.success(), "unpack failed: {}", stderr(&output));
    assert!(stderr(&output).contains("Warning: assets.jres: Skipped empty image"));
    assert!(!temp.path().join("out/ns_broken.png").exists());
    assert!(temp.path().join("out/image.png").exists());

    let listing = fs::read_to_string(temp.path().join("out/assets.json")).expect("listing should exist");
    let listing: serde_json::Value = serde_json::from_str(&listing).unwrap();
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["qualifiedName"], "ns.broken");
    assert_eq!(entries[0]["width"], 0);

    let strict = run_spack(temp.path(), &["unpack", "p.json", "-o", "strict", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stderr(&strict).contains("Error: assets.jres: Skipped empty image"));
}

#[test]
fn test_pack_uses_config_name() {
    let temp = TempDir::new().expect("should create temp dir");
    fs::write(temp.path().join("spack.toml"), "[project]\nname = \"configured\"\n").unwrap();
    write_png(temp.path(), "hero.png");

    let output = run_spack(temp.path(), &["pack", "hero.png"]);
    assert!(output.status.success(), "pack failed: {}", stderr(&output));
    assert!(temp.path().join("configured.mkcd").exists());
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().expect("should create temp dir");
    fs::write(temp.path().join("spack.toml"), "[project]\nname = \"\"\n").unwrap();
    write_png(temp.path(), "hero.png");

    let output = run_spack(temp.path(), &["pack", "hero.png"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("project.name"));
}

#[test]
fn test_pack_missing_input() {
    let temp = TempDir::new().expect("should create temp dir");
    let output = run_spack(temp.path(), &["pack", "nope.png", "--name", "x"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Cannot open input file"));
}

#[test]
fn test_pack_without_images_fails() {
    let temp = TempDir::new().expect("should create temp dir");
    write_source(temp.path(), "empty.ts", "let x = 1;\n");
    let output = run_spack(temp.path(), &["pack", "empty.ts", "--name", "x"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Warning: "));
    assert!(stderr(&output).contains("No images found"));
}

#[test]
fn test_unpack_strict_warnings() {
    let temp = TempDir::new().expect("should create temp dir");
    let project = r#"{"main.ts": "let a = img`\n1\n`", "broken.jres": "{oops"}"#;
    write_source(temp.path(), "project.json", project);

    let lenient = run_spack(temp.path(), &["unpack", "project.json", "-o", "lenient"]);
    assert!(lenient.status.success(), "unpack failed: {}", stderr(&lenient));
    assert!(stderr(&lenient).contains("Warning: broken.jres"));
    assert!(temp.path().join("lenient/image.png").exists());

    let strict = run_spack(temp.path(), &["unpack", "project.json", "-o", "strict", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stderr(&strict).contains("Error: broken.jres"));
    assert!(!temp.path().join("strict/image.png").exists());
}

#[test]
fn test_unpack_rejects_garbage_archive() {
    let temp = TempDir::new().expect("should create temp dir");
    fs::write(temp.path().join("bad.mkcd"), b"definitely not brotli").unwrap();
    let output = run_spack(temp.path(), &["unpack", "bad.mkcd", "-o", "out"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_convert_formats() {
    let temp = TempDir::new().expect("should create temp dir");
    write_png(temp.path(), "hero.png");

    let output = run_spack(temp.path(), &["convert", "hero.png"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "img`\n    1 2\n    . 1\n`\n");

    let output = run_spack(temp.path(), &["convert", "hero.png", "--format", "python"]);
    assert_eq!(stdout(&output), "img(\"\"\"\n    1 2\n    . 1\n\"\"\")\n");

    let output = run_spack(temp.path(), &["convert", "hero.png", "--format", "f4"]);
    let payload = stdout(&output);
    let bitmap = sprite_pack::f4::decode_base64(payload.trim()).expect("should be valid f4");
    assert_eq!(bitmap.rows(), vec![vec![1, 2], vec![0, 1]]);
}

#[test]
fn test_literal_command() {
    let temp = TempDir::new().expect("should create temp dir");
    write_source(temp.path(), "game.ts", "// sprites\nlet a = img`\n    1 2 3\n`;\n\nlet b = img`\n    f\n    f\n`;\n");

    let output = run_spack(temp.path(), &["literal", "game.ts"]);
    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("0: line 2 3x1 "));
    assert!(lines[1].starts_with("1: line 6 1x2 "));

    write_source(temp.path(), "plain.ts", "let x = 1;");
    let output = run_spack(temp.path(), &["literal", "plain.ts"]);
    assert_eq!(output.status.code(), Some(1));
}
