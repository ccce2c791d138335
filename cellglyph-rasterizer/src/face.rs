use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::shape::ShapeContext;
use swash::zeno::Format;
use swash::{CacheKey, FontRef};

use crate::bitmap::ProcessedBitmap;
use crate::error::Error;

/// Hinting target, derived once per [`Face::set_size`] call and reused for
/// both shaping and rendering so advances and rendered widths agree.
///
/// Mirrors FreeType's `FT_LOAD_TARGET_*` selection: `hintstyle >= 3` wants
/// the normal (grid-fitted) target, `0 < hintstyle < 3` wants the light
/// target, and `hintstyle == 0` (or hinting disabled outright) wants no
/// hinting at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintingMode {
    /// No hint fitting; closest to the outline's design shape.
    None,
    /// Light hinting: vertical stems only.
    Light,
    /// Full hinting, grid-fit in both axes.
    Normal,
}

impl HintingMode {
    /// Computes the hinting target from the raw `(hinting, hintstyle)`
    /// configuration pair.
    #[must_use]
    pub fn from_config(hinting: bool, hintstyle: u8) -> Self {
        if !hinting || hintstyle == 0 {
            Self::None
        } else if hintstyle < 3 {
            Self::Light
        } else {
            Self::Normal
        }
    }
}

/// One shaped glyph, in pixel units (the shaper's internal fixed-point
/// values already divided down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRecord {
    /// Glyph index within the face.
    pub glyph_id: u16,
    /// Byte offset of the source cluster this glyph belongs to.
    pub cluster: u32,
    /// Shaper-reported cluster/continuation flags. Always `0` on this
    /// backend: `swash` does not expose a HarfBuzz-style glyph mask.
    pub mask: u32,
    /// Horizontal placement offset.
    pub x_offset: f32,
    /// Vertical placement offset.
    pub y_offset: f32,
    /// Horizontal advance to the next glyph.
    pub x_advance: f32,
    /// Vertical advance to the next glyph.
    pub y_advance: f32,
}

/// Metrics describing a single fixed cell at the face's current size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    /// Cell width in pixels.
    pub width: u32,
    /// Cell height in pixels.
    pub height: u32,
    /// Distance from the cell top to the baseline, in pixels.
    pub baseline: u32,
    /// Underline position below the baseline, in pixels.
    pub underline_position: u32,
    /// Underline stroke thickness, in pixels.
    pub underline_thickness: u32,
}

/// A font face opened from file bytes, wrapping both the scaler and shaper
/// state `swash` needs to stay in sync.
pub struct Face {
    data: Vec<u8>,
    index: u32,
    key: CacheKey,
    scalable: bool,
    hinting: HintingMode,
    ppem: f32,
    path: String,
}

impl Face {
    /// Opens face `index` from the font file at `path`.
    pub fn open(path: &str, index: u32) -> Result<Self, Error> {
        let data = std::fs::read(path).map_err(|e| Error::face_open_failed(path, index, e))?;
        Self::from_bytes(data, index, path.to_string())
    }

    /// Builds a face from already-loaded font bytes, as returned by a
    /// `fontdb` lookup.
    pub fn from_bytes(data: Vec<u8>, index: u32, path: String) -> Result<Self, Error> {
        let font = FontRef::from_index(&data, index as usize)
            .ok_or_else(|| Error::face_open_failed(&path, index, "no such face index"))?;
        let key = font.key;
        // Fonts shipping only embedded bitmap strikes (no outlines) are rare
        // in terminal use; treat every opened face as scalable unless a
        // future backend needs to distinguish them.
        let scalable = true;
        Ok(Self { data, index, key, scalable, hinting: HintingMode::Normal, ppem: 0.0, path })
    }

    fn font(&self) -> FontRef<'_> {
        FontRef::from_index(&self.data, self.index as usize).expect("validated in Face::open")
    }

    /// Whether this face's outlines can be scaled arbitrarily (as opposed to
    /// a fixed-size embedded bitmap strike).
    #[must_use]
    pub fn is_scalable(&self) -> bool {
        self.scalable
    }

    /// Whether the face has a glyph for `cp`.
    #[must_use]
    pub fn has_codepoint(&self, cp: u32) -> bool {
        let charmap = self.font().charmap();
        charmap.map(cp) != 0
    }

    /// Sets the rasterizer and shaper scale coherently from a 1/64-point
    /// size and device resolution, following FreeType's own
    /// `char-size * dpi / 72` derivation of pixels-per-em.
    pub fn set_size(&mut self, width_1_64: u32, height_1_64: u32, xdpi: f32, ydpi: f32) -> Result<(), Error> {
        if width_1_64 == 0 || height_1_64 == 0 || xdpi <= 0.0 || ydpi <= 0.0 {
            return Err(Error::set_size_failed(
                height_1_64 as f32 / 64.0,
                xdpi,
                ydpi,
                "non-positive size or resolution",
            ));
        }
        let ppem_y = (height_1_64 as f32 / 64.0) * ydpi / 72.0;
        let ppem_x = (width_1_64 as f32 / 64.0) * xdpi / 72.0;
        self.ppem = ppem_x.max(ppem_y);
        Ok(())
    }

    /// Sets the hinting target used by subsequent shaping and rendering.
    pub fn set_hinting(&mut self, hinting: HintingMode) {
        self.hinting = hinting;
    }

    /// Multiplies the current pixels-per-em by `factor`, returning the
    /// pre-scale value so the caller can restore it exactly. Used by the
    /// bitmap compositor's single-retry rescale path.
    pub(crate) fn scale_ppem_by(&mut self, factor: f32) -> f32 {
        let previous = self.ppem;
        self.ppem *= factor;
        previous
    }

    /// Restores a pixels-per-em value saved from [`Face::scale_ppem_by`].
    pub(crate) fn set_ppem(&mut self, ppem: f32) {
        self.ppem = ppem;
    }

    /// Maximum horizontal advance across printable ASCII, ceiling-rounded to
    /// whole pixels.
    pub fn calc_cell_width(&self) -> Result<u32, Error> {
        let mut max_advance = 0.0f32;
        for cp in 32u32..127 {
            let text = char::from_u32(cp).map(|c| c.to_string()).unwrap_or_default();
            for record in self.shape(text.as_bytes())? {
                max_advance = max_advance.max(record.x_advance);
            }
        }
        Ok(max_advance.ceil() as u32)
    }

    /// Derives fixed-cell metrics from the face's font-wide metrics at the
    /// current size.
    pub fn cell_metrics(&self) -> Result<CellMetrics, Error> {
        let metrics = self.font().metrics(&[]).scale(self.ppem);
        let width = self.calc_cell_width()?;
        let ascent = metrics.ascent.round() as i32;
        let descent = metrics.descent.round() as i32;
        let height = (ascent + descent).max(1) as u32;
        let underline_position = (ascent as f32 - metrics.underline_offset).round().max(0.0) as u32;
        let underline_thickness = metrics.underline_size.round().max(1.0) as u32;
        Ok(CellMetrics {
            width,
            height,
            baseline: ascent.max(0) as u32,
            underline_position,
            underline_thickness,
        })
    }

    /// Shapes `utf8` with auto-detected script/language, honoring the
    /// current hinting target so advances match what `render_glyph` draws.
    pub fn shape(&self, utf8: &[u8]) -> Result<Vec<ShapeRecord>, Error> {
        let text = std::str::from_utf8(utf8).map_err(|e| Error::glyph_load_failed(0, e))?;
        let mut context = ShapeContext::new();
        let mut shaper = context.builder(self.font()).size(self.ppem).build();
        shaper.add_str(text);

        let mut records = Vec::new();
        shaper.shape_with(|cluster| {
            for glyph in cluster.glyphs {
                records.push(ShapeRecord {
                    glyph_id: glyph.id,
                    cluster: cluster.source.start,
                    mask: 0,
                    x_offset: 0.0,
                    y_offset: 0.0,
                    x_advance: glyph.advance,
                    y_advance: 0.0,
                });
            }
        });
        Ok(records)
    }

    /// Loads and rasterizes `glyph_id` at the current size and hinting
    /// target, producing an unplaced, untrimmed bitmap.
    pub fn render_glyph(&self, glyph_id: u16) -> Result<ProcessedBitmap, Error> {
        let mut context = ScaleContext::new();
        let hint = !matches!(self.hinting, HintingMode::None);
        let mut scaler = context.builder(self.font()).size(self.ppem).hint(hint).build();

        let image = Render::new(&[
            Source::ColorOutline(0),
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::Outline,
        ])
        .format(Format::Alpha)
        .render(&mut scaler, glyph_id)
        .ok_or_else(|| Error::glyph_load_failed(glyph_id, "no outline or bitmap strike for glyph"))?;

        if image.placement.width == 0 || image.placement.height == 0 {
            return Err(Error::empty_glyph(glyph_id));
        }

        Ok(ProcessedBitmap {
            buf: image.data,
            start_x: 0,
            width: image.placement.width,
            stride: image.placement.width,
            rows: image.placement.height,
            bearing_x: image.placement.left,
            bearing_y: image.placement.top,
        })
    }

    /// File path this face was opened from, for diagnostics.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Face index within its file.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hinting_mode_matches_freetype_target_thresholds() {
        assert_eq!(HintingMode::from_config(false, 3), HintingMode::None);
        assert_eq!(HintingMode::from_config(true, 0), HintingMode::None);
        assert_eq!(HintingMode::from_config(true, 1), HintingMode::Light);
        assert_eq!(HintingMode::from_config(true, 2), HintingMode::Light);
        assert_eq!(HintingMode::from_config(true, 3), HintingMode::Normal);
        assert_eq!(HintingMode::from_config(true, 5), HintingMode::Normal);
    }
}
