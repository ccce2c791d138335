/// Error categories surfaced by the sprite tracker and sprite cache.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Allocation failure while growing a sprite chain, a symbol-map array,
    /// or the composition canvas.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The sprite tracker's 3D atlas has no more room: `z` would need to
    /// exceed `min(65536, max_array_len)`.
    #[error("out of texture space for sprites (z limit {limit} reached)")]
    AtlasFull {
        /// The `z` bound that was hit.
        limit: u32,
    },
}

impl Error {
    pub(crate) fn out_of_memory(detail: impl std::fmt::Display) -> Self {
        Self::OutOfMemory(detail.to_string())
    }

    pub(crate) fn atlas_full(limit: u32) -> Self {
        Self::AtlasFull { limit }
    }
}
