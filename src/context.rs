//! Per-project state passed explicitly into codec and bundle operations

use crate::palette::Palette;

/// Settings shared by every operation on one project.
///
/// Nothing here is global: each export or import receives the context it
/// should work with, so two projects with different palettes can be
/// processed side by side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectContext {
    palette: Palette,
}

impl ProjectContext {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// True when the palette differs from the default arcade palette.
    pub fn has_custom_palette(&self) -> bool {
        self.palette != Palette::arcade()
    }

    /// A copy of this context using another palette.
    pub fn with_palette(&self, palette: Palette) -> Self {
        Self { palette }
    }
}
