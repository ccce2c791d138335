use cellglyph_core::{GpuSink, SpriteCache, SpriteTracker};
use cellglyph_data::SymbolMap;
use cellglyph_rasterizer::Face;

use crate::font::{FontRoster, RealFont};
use crate::selector::{BoxPainter, FallbackProvider};

/// Everything `set_font` needs in one call: the style-indexed faces, the
/// symbol-map table, the target size/resolution, and the two optional
/// host callbacks.
pub struct SetFontConfig {
    pub symbol_maps: Vec<SymbolMap>,
    pub symbol_map_faces: Vec<(Face, bool, bool)>,
    pub pt_size: f32,
    pub xdpi: f32,
    pub ydpi: f32,
    pub medium: Face,
    pub bold: Option<Face>,
    pub italic: Option<Face>,
    pub bold_italic: Option<Face>,
    pub fallback_provider: Option<Box<dyn FallbackProvider>>,
    pub box_painter: Option<Box<dyn BoxPainter>>,
}

/// The single handle threading all render-thread state through the
/// pipeline's public entry points, rather than relying on process-wide
/// globals. Not `Sync`; the single-threaded cooperative scheduling model
/// is the caller's responsibility to uphold.
pub struct RenderContext {
    pub(crate) tracker: SpriteTracker,
    pub(crate) roster: FontRoster,
    pub(crate) box_cache: SpriteCache,
    pub(crate) cell_width: u32,
    pub(crate) cell_height: u32,
    pub(crate) baseline: u32,
    pub(crate) underline_position: u32,
    pub(crate) underline_thickness: u32,
    pub(crate) height_delta: i32,
    pub(crate) height_scale: f32,
    /// Atlas position reserved for blank cells, primed by
    /// [`RenderContext::update_cell_metrics`] right after the tracker's
    /// layout is reset, before any glyph can claim a position.
    pub(crate) blank_sprite: (u16, u16, u32),
    /// Atlas position reserved for the missing-font sentinel, primed
    /// alongside `blank_sprite`.
    pub(crate) missing_sprite: (u16, u16, u32),
    pub(crate) sink: Option<Box<dyn GpuSink>>,
    pub(crate) fallback_provider: Option<Box<dyn FallbackProvider>>,
    pub(crate) box_painter: Option<Box<dyn BoxPainter>>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            tracker: SpriteTracker::default(),
            roster: FontRoster::default(),
            box_cache: SpriteCache::new(),
            cell_width: 0,
            cell_height: 0,
            baseline: 0,
            underline_position: 0,
            underline_thickness: 0,
            height_delta: 0,
            height_scale: 1.0,
            blank_sprite: (0, 0, 0),
            missing_sprite: (0, 0, 0),
            sink: None,
            fallback_provider: None,
            box_painter: None,
        }
    }
}

impl RenderContext {
    /// Builds an unconfigured context; call [`RenderContext::set_font`]
    /// before rendering any line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs (or replaces) the GPU sink sprites are uploaded to. With no
    /// sink installed, uploads are dropped silently and logged once —
    /// allocation still proceeds normally.
    pub fn set_sink(&mut self, sink: impl GpuSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    /// Sets the GPU texture limits the sprite tracker must respect.
    pub fn set_atlas_limits(&mut self, max_texture_size: u32, max_array_len: u32) {
        self.tracker.set_limits(max_texture_size, max_array_len);
    }

    /// Configures the additive-then-multiplicative cell-height adjustment
    /// applied during metric recomputation. `delta` is a pixel offset
    /// applied first; `scale` is a multiplicative fraction applied second
    /// (a value of `1.0` skips the multiplicative step).
    pub fn set_cell_height_adjustment(&mut self, delta: i32, scale: f32) {
        self.height_delta = delta;
        self.height_scale = scale;
    }

    /// The atlas envelope the GPU binding should size its texture array
    /// to: `(xnum, ynum, highest layer touched)`.
    #[must_use]
    pub fn current_layout(&self) -> (u32, u32, u32) {
        self.tracker.current_layout()
    }

    /// The current fixed cell size in pixels.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Atomically discards the prior style roster and fallback list and
    /// installs `config`, then recomputes cell metrics for it. On failure
    /// the previously installed configuration remains in effect.
    pub fn set_font(&mut self, config: SetFontConfig) -> Result<(), crate::Error> {
        let mut roster = FontRoster {
            medium: Some(RealFont::new(config.medium, false, false)),
            bold: config.bold.map(|f| RealFont::new(f, true, false)),
            italic: config.italic.map(|f| RealFont::new(f, false, true)),
            bold_italic: config.bold_italic.map(|f| RealFont::new(f, true, true)),
            symbol_maps: config.symbol_maps,
            symbol_map_faces: config
                .symbol_map_faces
                .into_iter()
                .map(|(face, bold, italic)| RealFont::new(face, bold, italic))
                .collect(),
            fallbacks: Vec::new(),
        };
        std::mem::swap(&mut self.roster, &mut roster);

        if let Some(provider) = config.fallback_provider {
            self.fallback_provider = Some(provider);
        }
        if let Some(painter) = config.box_painter {
            self.box_painter = Some(painter);
        }

        match self.update_cell_metrics(config.pt_size, config.xdpi, config.ydpi) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(%err, "set_font rejected, keeping prior configuration");
                self.roster = roster;
                Err(err)
            }
        }
    }
}
