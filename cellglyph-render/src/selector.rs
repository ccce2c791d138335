use cellglyph_data::{Cell, SymbolMap};
use cellglyph_rasterizer::Face;
use compact_str::CompactString;

use crate::font::{FontHandle, FontRoster, RealFont, SelectedFont, Style};

/// Supplies a face for a codepoint none of the configured or fallback
/// faces cover. Modeled on the host-application callback in the original
/// design: given the cell's text and style, either hand back a face or
/// decline.
pub trait FallbackProvider {
    fn provide(&mut self, text: &str, bold: bool, italic: bool) -> Option<Face>;
}

/// Paints a box-drawing or Powerline-style glyph directly, bypassing any
/// font. Returns a `cell_width * cell_height` grayscale buffer.
pub trait BoxPainter {
    fn paint(&mut self, ch: u32, cell_width: u32, cell_height: u32) -> Vec<u8>;
}

/// A fallback provider that never supplies a face, for when the caller
/// configures none. Every cell it's consulted for degrades to the
/// missing-font sentinel.
pub(crate) struct NullFallbackProvider;

impl FallbackProvider for NullFallbackProvider {
    fn provide(&mut self, _text: &str, _bold: bool, _italic: bool) -> Option<Face> {
        None
    }
}

/// Whether `ch` falls in one of the box-drawing or Powerline-arrow ranges
/// painted externally rather than shaped from a font.
#[must_use]
pub fn is_box_drawing(ch: u32) -> bool {
    matches!(ch, 0x2500..=0x2570 | 0x2574..=0x257F | 0xE0B0 | 0xE0B2)
}

/// Whether `face` covers a cell's base codepoint and any combining marks
/// packed into `cc`.
#[must_use]
pub fn has_cell_text(face: &Face, cell: &Cell) -> bool {
    if !face.has_codepoint(cell.ch) {
        return false;
    }
    if let Some(low) = cell.combining_low() {
        if !face.has_codepoint(low) {
            return false;
        }
    }
    if let Some(high) = cell.combining_high() {
        if !face.has_codepoint(high) {
            return false;
        }
    }
    true
}

/// Renders a cell's base codepoint plus any combining marks as a UTF-8
/// string, for handing to the shaper or a fallback provider. Almost always
/// one to three chars, so a [`CompactString`] avoids a heap allocation per
/// cell.
#[must_use]
pub fn cell_text(cell: &Cell) -> CompactString {
    let mut text = CompactString::new("");
    for cp in [Some(cell.ch), cell.combining_low(), cell.combining_high()].into_iter().flatten() {
        if let Some(c) = char::from_u32(cp) {
            text.push(c);
        }
    }
    text
}

/// Selects which font should render `cell`, following the priority chain:
/// blank sentinel, box sentinel, symbol maps, style-indexed base (falling
/// back to medium when unconfigured), the dynamic fallback list, and
/// finally a fresh fallback request. Never fails: an uncooperative
/// provider just yields the missing-font sentinel.
pub fn font_for_cell(cell: &Cell, roster: &mut FontRoster, provider: &mut dyn FallbackProvider) -> SelectedFont {
    if cell.ch == 0 {
        return SelectedFont::Blank;
    }
    if is_box_drawing(cell.ch) {
        return SelectedFont::Box;
    }
    if let Some(index) = SymbolMap::font_index_for(&roster.symbol_maps, cell.ch) {
        if index < roster.symbol_map_faces.len() {
            return SelectedFont::Real(FontHandle::SymbolMap(index));
        }
    }

    let bold = cell.attrs.bold();
    let italic = cell.attrs.italic();
    let mut style = Style::from_attrs(bold, italic);
    loop {
        match roster.styled(style) {
            Some(real) => {
                if has_cell_text(&real.face, cell) {
                    return SelectedFont::Real(FontHandle::Styled(style));
                }
                break;
            }
            None if style != Style::Medium => {
                style = Style::Medium;
            }
            None => break,
        }
    }

    if let Some(index) = roster
        .fallbacks
        .iter()
        .position(|fb| fb.bold == bold && fb.italic == italic && has_cell_text(&fb.face, cell))
    {
        return SelectedFont::Real(FontHandle::Fallback(index));
    }

    let text = cell_text(cell);
    if let Some(face) = provider.provide(&text, bold, italic) {
        let real = RealFont::new(face, bold, italic);
        if let Some(index) = roster.push_fallback(real) {
            return SelectedFont::Real(FontHandle::Fallback(index));
        }
        tracing::warn!("fallback list full ({} entries); discarding new face", crate::font::MAX_FALLBACKS);
    } else {
        tracing::debug!(text, bold, italic, "fallback-font provider declined, using missing-font sentinel");
    }
    SelectedFont::Missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_drawing_ranges_match_spec_boundaries() {
        assert!(is_box_drawing(0x2500));
        assert!(is_box_drawing(0x2570));
        assert!(!is_box_drawing(0x2571));
        assert!(!is_box_drawing(0x2572));
        assert!(!is_box_drawing(0x2573));
        assert!(is_box_drawing(0x2574));
        assert!(is_box_drawing(0x257F));
        assert!(is_box_drawing(0xE0B0));
        assert!(is_box_drawing(0xE0B2));
        assert!(!is_box_drawing(0xE0B1));
    }

    #[test]
    fn cell_text_packs_base_and_combining_codepoints() {
        let cell = Cell::new('e' as u32, 0x0301, cellglyph_data::CellAttrs::new(1, false, false));
        assert_eq!(cell_text(&cell), "e\u{301}");
    }
}
