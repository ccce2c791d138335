use crate::error::Error;

/// Bound on `z`: even a generous `max_array_len` cannot push the atlas past
/// the number of layers a GPU texture array can address.
const HARD_ARRAY_LIMIT: u32 = 65536;

/// Bound on `xnum`/`max_y`: a texture row/column count must fit the grid
/// coordinates handed back to callers, which are `u16`.
const HARD_DIMENSION_LIMIT: u32 = 65535;

/// Monotonic allocator over a 3D sprite atlas.
///
/// Positions are handed out in raster order — left to right, then top to
/// bottom, then layer by layer — and are never reused or moved once
/// assigned. [`SpriteTracker::set_layout`] resets the cursor; it must be
/// called whenever the cell size changes, before any further allocation.
#[derive(Debug, Clone)]
pub struct SpriteTracker {
    max_texture_size: u32,
    max_array_len: u32,
    xnum: u32,
    max_y: u32,
    ynum: u32,
    x: u32,
    y: u32,
    z: u32,
    exhausted: bool,
}

impl Default for SpriteTracker {
    fn default() -> Self {
        Self {
            max_texture_size: 1000,
            max_array_len: 1000,
            xnum: 0,
            max_y: 100,
            ynum: 0,
            x: 0,
            y: 0,
            z: 0,
            exhausted: false,
        }
    }
}

impl SpriteTracker {
    /// Builds a tracker with the given GPU texture limits. Call
    /// [`SpriteTracker::set_layout`] before allocating.
    #[must_use]
    pub fn new(max_texture_size: u32, max_array_len: u32) -> Self {
        let mut tracker = Self::default();
        tracker.set_limits(max_texture_size, max_array_len);
        tracker
    }

    /// Updates the GPU's reported texture limits. Does not touch the
    /// allocation cursor; call [`SpriteTracker::set_layout`] afterward.
    pub fn set_limits(&mut self, max_texture_size: u32, max_array_len: u32) {
        self.max_texture_size = max_texture_size;
        self.max_array_len = max_array_len;
    }

    /// Recomputes the grid layout for a cell size and resets the allocation
    /// cursor to the origin. `cell_w`/`cell_h` must be nonzero.
    pub fn set_layout(&mut self, cell_w: u32, cell_h: u32) {
        debug_assert!(cell_w > 0 && cell_h > 0);
        self.xnum = (self.max_texture_size / cell_w.max(1)).clamp(1, HARD_DIMENSION_LIMIT);
        self.max_y = (self.max_texture_size / cell_h.max(1)).clamp(1, HARD_DIMENSION_LIMIT);
        self.ynum = 1;
        self.x = 0;
        self.y = 0;
        self.z = 0;
        self.exhausted = false;
        tracing::debug!(xnum = self.xnum, max_y = self.max_y, cell_w, cell_h, "sprite atlas layout reset");
    }

    /// The current atlas envelope: `(xnum, ynum, z)`. The live layer count is
    /// `z + 1`; `z` is the highest layer touched so far.
    #[must_use]
    pub fn current_layout(&self) -> (u32, u32, u32) {
        (self.xnum, self.ynum, self.z)
    }

    /// Hands out the next position and advances the cursor.
    ///
    /// Returns [`Error::AtlasFull`] once a prior allocation has pushed the
    /// cursor past the last addressable layer; the position returned by that
    /// prior allocation remains valid.
    pub fn allocate_next(&mut self) -> Result<(u16, u16, u32), Error> {
        if self.exhausted {
            return Err(Error::atlas_full(self.array_limit()));
        }
        let position = (self.x as u16, self.y as u16, self.z);
        self.advance();
        Ok(position)
    }

    fn array_limit(&self) -> u32 {
        self.max_array_len.min(HARD_ARRAY_LIMIT)
    }

    fn advance(&mut self) {
        self.x += 1;
        if self.x == self.xnum {
            self.x = 0;
            self.y += 1;
            self.ynum = self.ynum.max(self.y + 1).min(self.max_y);
            if self.y == self.max_y {
                self.y = 0;
                self.z += 1;
                if self.z >= self.array_limit() {
                    self.exhausted = true;
                    tracing::warn!(z = self.z, limit = self.array_limit(), "sprite atlas exhausted");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_rows_within_a_single_layer() {
        let mut tracker = SpriteTracker::new(1000, 1000);
        tracker.set_layout(8, 16);

        let mut last = (0, 0, 0);
        for _ in 0..125 {
            last = tracker.allocate_next().expect("within bounds");
        }
        assert_eq!(last, (124, 0, 0));

        let next = tracker.allocate_next().expect("within bounds");
        assert_eq!(next, (0, 1, 0));
        assert_eq!(tracker.current_layout().1, 2);
    }

    #[test]
    fn reports_atlas_full_after_exhausting_all_layers() {
        let mut tracker = SpriteTracker::new(16, 2);
        tracker.set_layout(8, 8);

        let mut last = (0, 0, 0);
        for _ in 0..8 {
            last = tracker.allocate_next().expect("within bounds");
        }
        assert_eq!(last, (1, 1, 1));

        assert!(matches!(tracker.allocate_next(), Err(Error::AtlasFull { .. })));
    }

    #[test]
    fn set_layout_resets_cursor_and_exhaustion() {
        let mut tracker = SpriteTracker::new(16, 1);
        tracker.set_layout(8, 8);
        for _ in 0..4 {
            tracker.allocate_next().expect("within bounds");
        }
        assert!(tracker.allocate_next().is_err());

        tracker.set_layout(8, 8);
        assert_eq!(tracker.allocate_next().expect("reset cursor"), (0, 0, 0));
    }
}
