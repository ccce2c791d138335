use cellglyph_core::SpriteCache;
use cellglyph_rasterizer::Face;

/// Caps the dynamic fallback list so an adversarial stream of unfamiliar
/// codepoints can't grow it without bound.
pub const MAX_FALLBACKS: usize = 255;

/// One of the four style-indexed base faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Medium,
    Bold,
    Italic,
    BoldItalic,
}

impl Style {
    /// Maps a cell's (bold, italic) attribute bits to a style slot.
    #[must_use]
    pub fn from_attrs(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Medium,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }
}

/// A real, opened font face paired with its own sprite cache.
///
/// Each configured face — the four style slots, every symbol-map face, and
/// every dynamic fallback — owns an independent cache, since the same
/// glyph id means different things in different faces. All of them
/// allocate atlas coordinates from the single shared sprite tracker.
pub struct RealFont {
    pub face: Face,
    pub cache: SpriteCache,
    pub bold: bool,
    pub italic: bool,
}

impl RealFont {
    #[must_use]
    pub fn new(face: Face, bold: bool, italic: bool) -> Self {
        Self { face, cache: SpriteCache::new(), bold, italic }
    }
}

/// Where a selected real font lives, so callers can mutably borrow it back
/// out of the [`FontRoster`] without the selector itself holding a
/// borrow across the fallback-provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontHandle {
    Styled(Style),
    SymbolMap(usize),
    Fallback(usize),
}

/// The outcome of font selection for one cell: either a real face to shape
/// and render, or one of the three sentinels the line renderer
/// short-circuits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedFont {
    Real(FontHandle),
    /// `ch == 0`: sprite is always `(0, 0, 0)`.
    Blank,
    /// No face covers this cell and the fallback list is exhausted or the
    /// provider declined.
    Missing,
    /// A box-drawing or Powerline-style codepoint, painted externally.
    Box,
}

/// The configured font roster: the four style-indexed base faces, the
/// user's symbol-map faces, and the dynamically grown fallback list.
#[derive(Default)]
pub struct FontRoster {
    pub(crate) medium: Option<RealFont>,
    pub(crate) bold: Option<RealFont>,
    pub(crate) italic: Option<RealFont>,
    pub(crate) bold_italic: Option<RealFont>,
    pub(crate) symbol_maps: Vec<cellglyph_data::SymbolMap>,
    pub(crate) symbol_map_faces: Vec<RealFont>,
    pub(crate) fallbacks: Vec<RealFont>,
}

impl FontRoster {
    /// Read-only access to a style slot.
    #[must_use]
    pub fn styled(&self, style: Style) -> Option<&RealFont> {
        match style {
            Style::Medium => self.medium.as_ref(),
            Style::Bold => self.bold.as_ref(),
            Style::Italic => self.italic.as_ref(),
            Style::BoldItalic => self.bold_italic.as_ref(),
        }
    }

    /// Resolves a handle to its backing font, mutably.
    pub fn get_mut(&mut self, handle: FontHandle) -> Option<&mut RealFont> {
        match handle {
            FontHandle::Styled(Style::Medium) => self.medium.as_mut(),
            FontHandle::Styled(Style::Bold) => self.bold.as_mut(),
            FontHandle::Styled(Style::Italic) => self.italic.as_mut(),
            FontHandle::Styled(Style::BoldItalic) => self.bold_italic.as_mut(),
            FontHandle::SymbolMap(i) => self.symbol_map_faces.get_mut(i),
            FontHandle::Fallback(i) => self.fallbacks.get_mut(i),
        }
    }

    /// Appends a newly adopted fallback face, returning its handle unless
    /// the fallback list is already at capacity.
    pub fn push_fallback(&mut self, font: RealFont) -> Option<usize> {
        if self.fallbacks.len() >= MAX_FALLBACKS {
            return None;
        }
        self.fallbacks.push(font);
        Some(self.fallbacks.len() - 1)
    }

    /// Every configured real font: the style slots, symbol-map faces, and
    /// fallbacks, in that order. Used by metric recomputation, which must
    /// touch all of them.
    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut RealFont> {
        self.medium
            .iter_mut()
            .chain(self.bold.iter_mut())
            .chain(self.italic.iter_mut())
            .chain(self.bold_italic.iter_mut())
            .chain(self.symbol_map_faces.iter_mut())
            .chain(self.fallbacks.iter_mut())
    }
}
