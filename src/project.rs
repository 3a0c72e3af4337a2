//! Project file sets and the archive envelope around them
//!
//! A project is a flat mapping of file names to file text. An archive is
//! that mapping serialized to a JSON string and wrapped in an envelope with
//! some editor metadata; the envelope is then compressed as a whole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const PXT_JSON: &str = "pxt.json";
pub const MAIN_TS: &str = "main.ts";
pub const MAIN_BLOCKS: &str = "main.blocks";
pub const ASSETS_TS: &str = "assets.ts";
pub const ASSETS_JRES: &str = "assets.jres";
pub const TEST_TS: &str = "test.ts";
pub const README_MD: &str = "README.md";

/// Value of `meta.cloudId` in every archive.
pub const CLOUD_ID: &str = "pxt/arcade";
/// Value of `meta.editor` in every archive.
pub const EDITOR_KIND: &str = "tsprj";
/// Description written into the manifest.
pub const PROJECT_DESCRIPTION: &str = "An asset pack for MakeCode Arcade";
/// Dependency every exported project declares.
pub const DEVICE_DEPENDENCY: (&str, &str) = ("device", "file:../device");

/// Empty blocks workspace with a single start block.
pub const MAIN_BLOCKS_XML: &str = r#"<xml xmlns="http://www.w3.org/1999/xhtml"><variables></variables><block type="pxt-on-start" x="0" y="0"></block></xml>"#;

/// Header comment placed in `main.ts`.
pub const PROJECT_COMMENT: &str = r#"/*
 * This project was created with sprite-pack. If you want to publish
 * this project to GitHub as a sprite pack, do not add any code to
 * this file! The code that is running in the simulator can be edited
 * by opening "test.ts" from the file explorer. Any code added to
 * "test.ts" will not be added to a project that imports this sprite
 * pack as an extension.
 *
 * If you don't wish to publish this project, you can use it as-is.
 * Your sprites should show up in the sprite gallery. Make sure you
 * delete the code in "test.ts"!
 *
 *
 * To publish this project to GitHub:
 *   1. Rename this project to something descriptive
 *   2. Click the GitHub button in the bottom bar next to the save
 *      button (sign in to GitHub if prompted)
 *   3. Choose a name for your repository. This is the name that
 *      people will see when importing your project.
 *   4. Select "public repository" if you want other people to be
 *      able to use your sprites
 *   5. Click "go ahead"
 *
 *
 * To add a published project to an Arcade project:
 *   1. Inside the editor, click "Extensions" under "Advanced" in
 *      the toolbox
 *   2. Search for your GitHub username followed by a "/" and the
 *      name of the repository (username/repository)
 *   3. Click the card that appears
 *   4. The sprites now show up in the gallery of the sprite editor
 * */
"#;

/// Starter content of `test.ts`.
pub const TEST_PLAYGROUND: &str = "// Code here runs in the simulator but is not part of the sprite pack\n";

/// File name → file text, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectFiles {
    files: Vec<(String, String)>,
}

impl ProjectFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let name = name.into();
        let text = text.into();
        match self.files.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = text,
            None => self.files.push((name, text)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.iter().find(|(existing, _)| existing == name).map(|(_, text)| text.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(name, text)| (name.as_str(), text.as_str()))
    }

    /// Files in lexicographic name order.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut files: Vec<(&str, &str)> = self.iter().collect();
        files.sort_by(|a, b| a.0.cmp(b.0));
        files
    }

    /// Serialize as a compact JSON object.
    pub fn to_json(&self) -> String {
        let map: Map<String, Value> =
            self.iter().map(|(name, text)| (name.to_string(), Value::String(text.to_string()))).collect();
        Value::Object(map).to_string()
    }

    /// Parse a JSON object of file texts; non-string values are skipped.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(text)?;
        let mut files = ProjectFiles::new();
        for (name, value) in map {
            match value {
                Value::String(text) => files.insert(name, text),
                _ => tracing::debug!("skipping non-text project file '{}'", name),
            }
        }
        Ok(files)
    }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for ProjectFiles {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut files = ProjectFiles::new();
        for (name, text) in iter {
            files.insert(name, text);
        }
        files
    }
}

/// Contents of `pxt.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    pub name: String,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub test_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl ProjectManifest {
    /// The manifest of an exported sprite pack.
    pub fn for_sprite_pack(name: &str, palette: Option<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            dependencies: BTreeMap::from([(DEVICE_DEPENDENCY.0.to_string(), DEVICE_DEPENDENCY.1.to_string())]),
            description: PROJECT_DESCRIPTION.to_string(),
            files: [MAIN_BLOCKS, MAIN_TS, ASSETS_JRES, ASSETS_TS].map(String::from).to_vec(),
            test_files: vec![TEST_TS.to_string()],
            palette,
        }
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Read just the `palette` array out of manifest text.
    ///
    /// Returns `None` for unparsable text, a missing key or a non-array
    /// value.
    pub fn palette_from_json(text: &str) -> Option<Vec<String>> {
        let value: Value = serde_json::from_str(text).ok()?;
        let colors = value.get("palette")?.as_array()?;
        Some(colors.iter().filter_map(|c| c.as_str().map(String::from)).collect())
    }
}

/// Editor metadata stored next to the sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveMeta {
    pub cloud_id: String,
    #[serde(default)]
    pub target_versions: Map<String, Value>,
    pub name: String,
    pub editor: String,
}

impl ArchiveMeta {
    pub fn new(name: &str) -> Self {
        Self {
            cloud_id: CLOUD_ID.to_string(),
            target_versions: Map::new(),
            name: name.to_string(),
            editor: EDITOR_KIND.to_string(),
        }
    }
}

/// The uncompressed archive document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEnvelope {
    pub meta: ArchiveMeta,
    /// The project files, serialized to a JSON string
    pub source: String,
}

impl ArchiveEnvelope {
    pub fn new(name: &str, files: &ProjectFiles) -> Self {
        Self { meta: ArchiveMeta::new(name), source: files.to_json() }
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn files(&self) -> Result<ProjectFiles, serde_json::Error> {
        ProjectFiles::from_json(&self.source)
    }
}

/// Everything produced by one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBundle {
    pub name: String,
    pub namespace: String,
    pub files: ProjectFiles,
    pub manifest: ProjectManifest,
}

impl ProjectBundle {
    pub fn envelope(&self) -> ArchiveEnvelope {
        ArchiveEnvelope::new(&self.name, &self.files)
    }

    /// The uncompressed archive text.
    pub fn to_archive_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.envelope())
    }
}
