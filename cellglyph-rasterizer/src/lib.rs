//! Font face wrapper and bitmap compositor: turns codepoints into
//! cell-sized, baseline-aligned grayscale bitmaps.
//!
//! Rasterization and shaping are backed by `swash` over font bytes
//! discovered with `fontdb`; this crate has no GPU or atlas-allocation
//! concerns of its own.

mod bitmap;
mod error;
mod face;
mod fontset;

pub use bitmap::{place_bitmap_in_cell, render_bitmap, split_cells, Placement, ProcessedBitmap};
pub use error::Error;
pub use face::{CellMetrics, Face, HintingMode, ShapeRecord};
pub use fontset::FontSet;
