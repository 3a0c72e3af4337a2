//! Resource files (`.jres`): a JSON object mapping ids to resources
//!
//! The special `"*"` key carries defaults for the whole file (namespace and
//! mime type). Every other key maps either to a bare data string, which
//! inherits the default mime type, or to a full record object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Mime type of f4 image resources.
pub const IMAGE_MIME_TYPE: &str = "image/x-mkcd-f4";

/// Key holding the file-wide defaults.
pub const META_KEY: &str = "*";

/// Error type for resource file parsing
#[derive(Debug, Error)]
pub enum JresError {
    #[error("invalid resource JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("resource file must be a JSON object")]
    NotAnObject,
}

/// File-wide defaults stored under `"*"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JresMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
}

/// A resource written out as a full object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JresRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilemap_tile: Option<bool>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tileset: Option<Vec<String>>,
}

/// One resource entry, resolved once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JresEntry {
    /// Bare data string using the file's default mime type
    Inline(String),
    /// Full record with its own mime type
    Structured(JresRecord),
}

impl JresEntry {
    pub fn data(&self) -> &str {
        match self {
            JresEntry::Inline(data) => data,
            JresEntry::Structured(record) => &record.data,
        }
    }

    /// The entry's mime type, falling back to the file default for inline data.
    pub fn mime_type<'a>(&'a self, meta: &'a JresMeta) -> &'a str {
        match self {
            JresEntry::Inline(_) => &meta.mime_type,
            JresEntry::Structured(record) => &record.mime_type,
        }
    }

    pub fn is_tilemap_tile(&self) -> bool {
        match self {
            JresEntry::Inline(_) => false,
            JresEntry::Structured(record) => record.tilemap_tile.unwrap_or(false),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            JresEntry::Inline(data) => Value::String(data.clone()),
            JresEntry::Structured(record) => serde_json::to_value(record).unwrap_or(Value::Null),
        }
    }
}

/// A parsed resource file, entries in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JresFile {
    pub meta: JresMeta,
    pub entries: Vec<(String, JresEntry)>,
}

impl JresFile {
    pub fn new(meta: JresMeta) -> Self {
        Self { meta, entries: Vec::new() }
    }

    pub fn push(&mut self, key: impl Into<String>, entry: JresEntry) {
        self.entries.push((key.into(), entry));
    }

    /// Parse a resource file.
    ///
    /// Only unparsable JSON or a non-object root is an error. Entries that
    /// are neither strings nor well-formed records are skipped, and a
    /// malformed `"*"` falls back to empty defaults.
    pub fn parse(text: &str) -> Result<Self, JresError> {
        let root: Value = serde_json::from_str(text)?;
        let Value::Object(map) = root else {
            return Err(JresError::NotAnObject);
        };

        let mut file = JresFile::default();
        for (key, value) in map {
            if key == META_KEY {
                file.meta = serde_json::from_value(value).unwrap_or_else(|err| {
                    tracing::debug!("ignoring malformed resource defaults: {}", err);
                    JresMeta::default()
                });
                continue;
            }
            match value {
                Value::String(data) => file.push(key, JresEntry::Inline(data)),
                value @ Value::Object(_) => match serde_json::from_value(value) {
                    Ok(record) => file.push(key, JresEntry::Structured(record)),
                    Err(err) => tracing::debug!("skipping malformed resource '{}': {}", key, err),
                },
                other => tracing::debug!("skipping resource '{}' of unexpected shape {}", key, other),
            }
        }
        Ok(file)
    }

    /// Qualified name of an entry key: `namespace.key`, or the bare key
    /// when the file has no namespace.
    pub fn qualified_name(&self, key: &str) -> String {
        if self.meta.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.meta.namespace, key)
        }
    }

    /// Entries whose effective mime type is the image mime type.
    pub fn images(&self) -> impl Iterator<Item = (&str, &JresEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.mime_type(&self.meta) == IMAGE_MIME_TYPE)
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(META_KEY.to_string(), serde_json::to_value(&self.meta).unwrap_or(Value::Null));
        for (key, entry) in &self.entries {
            map.insert(key.clone(), entry.to_value());
        }
        Value::Object(map)
    }

    /// Serialize compactly, `"*"` first and entries in insertion order.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meta_and_entries() {
        let text = r#"{
            "*": {"namespace": "myImages", "mimeType": "image/x-mkcd-f4"},
            "hero": "5AEBAAUAAAA=",
            "grass": {"id": "grass", "data": "5AEBAAEAAAA=", "tilemapTile": true, "mimeType": "image/x-mkcd-f4"},
            "song": {"id": "song", "data": "AAAA", "mimeType": "audio/x-mkcd-song"},
            "weird": 42
        }"#;
        let file = JresFile::parse(text).unwrap();
        assert_eq!(file.meta.namespace, "myImages");
        assert_eq!(file.entries.len(), 3);
        assert_eq!(file.entries[0], ("hero".to_string(), JresEntry::Inline("5AEBAAUAAAA=".into())));
        assert!(file.entries[1].1.is_tilemap_tile());

        let images: Vec<&str> = file.images().map(|(key, _)| key).collect();
        assert_eq!(images, vec!["hero", "grass"]);
        assert_eq!(file.qualified_name("hero"), "myImages.hero");
    }

    #[test]
    fn test_inline_needs_image_meta() {
        let file = JresFile::parse(r#"{"*": {"mimeType": "text/plain"}, "a": "AAAA"}"#).unwrap();
        assert_eq!(file.images().count(), 0);
        let file = JresFile::parse(r#"{"a": "AAAA"}"#).unwrap();
        assert_eq!(file.images().count(), 0);
        assert_eq!(file.qualified_name("a"), "a");
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let text = r#"{
            "*": {"namespace": "ns", "mimeType": "image/x-mkcd-f4"},
            "hero": "5AEBAAUAAAA=",
            "odd": {"id": 7, "data": "AAAA", "mimeType": "text/plain"},
            "tile": {"id": "tile", "data": "AAAA", "tilemapTile": "yes", "mimeType": "image/x-mkcd-f4"}
        }"#;
        let file = JresFile::parse(text).unwrap();
        let keys: Vec<&str> = file.entries.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["hero"]);
        assert_eq!(file.meta.namespace, "ns");
    }

    #[test]
    fn test_malformed_meta_uses_defaults() {
        let file = JresFile::parse(r#"{"*": {"namespace": null}, "a": "AAAA"}"#).unwrap();
        assert_eq!(file.meta, JresMeta::default());
        assert_eq!(file.entries.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(JresFile::parse("{not json"), Err(JresError::Json(_))));
        assert!(matches!(JresFile::parse("[1, 2]"), Err(JresError::NotAnObject)));
    }

    #[test]
    fn test_to_json_order() {
        let mut file = JresFile::new(JresMeta {
            namespace: "packSprites".into(),
            mime_type: IMAGE_MIME_TYPE.into(),
        });
        file.push("b", JresEntry::Inline("BBBB".into()));
        file.push(
            "a",
            JresEntry::Structured(JresRecord {
                id: "a".into(),
                data: "AAAA".into(),
                tilemap_tile: Some(true),
                mime_type: IMAGE_MIME_TYPE.into(),
                ..Default::default()
            }),
        );
        assert_eq!(
            file.to_json(),
            r#"{"*":{"namespace":"packSprites","mimeType":"image/x-mkcd-f4"},"b":"BBBB","a":{"id":"a","data":"AAAA","tilemapTile":true,"mimeType":"image/x-mkcd-f4"}}"#
        );
        assert_eq!(JresFile::parse(&file.to_json()).unwrap(), file);
    }
}
