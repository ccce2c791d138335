/// Error categories surfaced by the font face wrapper.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The font file could not be opened or the requested face index does
    /// not exist in it.
    #[error("failed to open face {index} in {path}: {reason}")]
    FaceOpenFailed { path: String, index: u32, reason: String },

    /// `set_size` failed to apply the requested point size at the requested
    /// resolution.
    #[error("failed to set face size to {pt_size}pt at {xdpi}x{ydpi} dpi: {reason}")]
    SetSizeFailed { pt_size: f32, xdpi: f32, ydpi: f32, reason: String },

    /// A glyph failed to load or rasterize.
    #[error("failed to load glyph {glyph_id}: {reason}")]
    GlyphLoadFailed { glyph_id: u16, reason: String },

    /// A render produced a zero-byte bitmap where content was expected.
    #[error("rasterizer returned an empty bitmap for glyph {glyph_id}")]
    EmptyGlyph { glyph_id: u16 },
}

impl Error {
    pub(crate) fn face_open_failed(path: impl Into<String>, index: u32, reason: impl std::fmt::Display) -> Self {
        Self::FaceOpenFailed { path: path.into(), index, reason: reason.to_string() }
    }

    pub(crate) fn set_size_failed(pt_size: f32, xdpi: f32, ydpi: f32, reason: impl std::fmt::Display) -> Self {
        Self::SetSizeFailed { pt_size, xdpi, ydpi, reason: reason.to_string() }
    }

    pub(crate) fn glyph_load_failed(glyph_id: u16, reason: impl std::fmt::Display) -> Self {
        Self::GlyphLoadFailed { glyph_id, reason: reason.to_string() }
    }

    pub(crate) fn empty_glyph(glyph_id: u16) -> Self {
        Self::EmptyGlyph { glyph_id }
    }
}
