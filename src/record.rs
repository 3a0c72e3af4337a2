//! Asset records: the unit exchanged with resource files
//!
//! A record bundles the base64 f4 payload of a bitmap with a PNG preview
//! and a little metadata. Records never point back at the bitmap they came
//! from; to change one, edit the bitmap and build a new record.

use crate::bitmap::Bitmap;
use crate::context::ProjectContext;
use crate::f4;
use crate::literal;
use crate::preview::{render_bitmap, to_data_uri};
use serde::{Deserialize, Serialize};

/// A committed image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Base64 of the f4 encoding
    pub binary_data: String,
    /// `data:image/png;base64,...` preview
    #[serde(rename = "previewURI")]
    pub preview_uri: String,
    pub width: u16,
    pub height: u16,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub is_tileset_tile: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_file: Option<String>,
}

/// Render the preview.
///
/// An empty bitmap has no PNG form; its preview is the empty string. The
/// same empty URI is used if PNG encoding fails.
fn preview_uri(bitmap: &Bitmap, ctx: &ProjectContext) -> String {
    if bitmap.is_empty() {
        return String::new();
    }
    match to_data_uri(&render_bitmap(bitmap, ctx.palette())) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!("could not render preview: {}", e);
            String::new()
        }
    }
}

impl AssetRecord {
    /// Build a record from a bitmap using the context's palette.
    pub fn from_bitmap(bitmap: &Bitmap, ctx: &ProjectContext) -> Self {
        Self {
            binary_data: f4::encode_base64(bitmap),
            preview_uri: preview_uri(bitmap, ctx),
            width: bitmap.width(),
            height: bitmap.height(),
            qualified_name: None,
            is_tileset_tile: false,
            source_file: None,
        }
    }

    /// Build a record around an existing base64 payload.
    ///
    /// The payload string is kept verbatim so it can serve as a dedup key;
    /// a malformed payload yields a 0x0 record instead of an error.
    pub fn from_data_string(
        data: &str,
        ctx: &ProjectContext,
        qualified_name: Option<String>,
        is_tileset_tile: bool,
        source_file: Option<String>,
    ) -> Self {
        let bitmap = f4::decode_base64_or_default(data);
        Self {
            binary_data: data.to_string(),
            preview_uri: preview_uri(&bitmap, ctx),
            width: bitmap.width(),
            height: bitmap.height(),
            qualified_name: qualified_name.filter(|name| !name.is_empty()),
            is_tileset_tile,
            source_file,
        }
    }

    /// Build an anonymous record from an image literal.
    pub fn from_literal(text: &str, ctx: &ProjectContext, source_file: Option<String>) -> Self {
        let bitmap = literal::decode(text, None);
        Self::from_bitmap(&bitmap, ctx).with_source_file(source_file)
    }

    pub fn with_qualified_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.qualified_name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn with_tileset_tile(mut self, is_tile: bool) -> Self {
        self.is_tileset_tile = is_tile;
        self
    }

    pub fn with_source_file(mut self, source_file: Option<String>) -> Self {
        self.source_file = source_file;
        self
    }

    /// True when the record carries a non-empty qualified name.
    pub fn is_named(&self) -> bool {
        self.qualified_name.as_deref().is_some_and(|name| !name.is_empty())
    }

    /// Decode the payload back into a bitmap (empty if malformed).
    pub fn bitmap(&self) -> Bitmap {
        f4::decode_base64_or_default(&self.binary_data)
    }

    /// Last segment of the qualified name, if any.
    pub fn short_name(&self) -> Option<&str> {
        self.qualified_name.as_deref().map(|name| name.rsplit('.').next().unwrap_or(name))
    }
}
