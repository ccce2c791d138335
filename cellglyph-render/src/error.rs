/// Error categories surfaced by metric recomputation and the components it
/// drives. The font selector itself never fails: it degrades to the
/// missing-font sentinel instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The medium face reported a zero cell width.
    #[error("medium face produced a zero cell width")]
    NoCellWidth,

    /// Computed cell height fell outside the `4..=1000` pixel range.
    #[error("computed cell height {0} is out of the 4..=1000 pixel range")]
    BadCellHeight(u32),

    /// A sprite tracker or sprite cache failure.
    #[error(transparent)]
    Core(#[from] cellglyph_core::Error),

    /// A face or glyph rasterization failure.
    #[error(transparent)]
    Rasterizer(#[from] cellglyph_rasterizer::Error),
}
