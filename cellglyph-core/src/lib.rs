//! Sprite tracker and sprite cache: the atlas-allocation core of the
//! cellglyph text-rendering pipeline.
//!
//! This crate owns no glyph rasterization or font logic; it only tracks
//! which `(glyph, extra_glyphs, is_second)` keys have been assigned atlas
//! positions and hands out new ones in raster order as the GPU sink fills
//! up.

mod error;
mod gpu_sink;
mod sprite_cache;
mod sprite_tracker;

pub use error::Error;
pub use gpu_sink::GpuSink;
pub use sprite_cache::{SpriteCache, SpriteLookup, SpritePosition, SpriteSlotId};
pub use sprite_tracker::SpriteTracker;
