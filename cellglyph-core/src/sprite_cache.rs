use crate::error::Error;
use crate::sprite_tracker::SpriteTracker;

/// Number of directly-addressed head slots. Glyph IDs hash into this range;
/// collisions chain into the overflow arena.
const HEAD_COUNT: usize = 1024;

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    filled: bool,
    rendered: bool,
    is_second: bool,
    glyph_id: u16,
    extra_glyphs: u64,
    x: u16,
    y: u16,
    z: u32,
    next: Option<usize>,
}

impl Slot {
    fn matches(&self, glyph_id: u16, extra_glyphs: u64, is_second: bool) -> bool {
        self.filled
            && self.glyph_id == glyph_id
            && self.extra_glyphs == extra_glyphs
            && self.is_second == is_second
    }

    fn position(&self) -> SpritePosition {
        SpritePosition {
            glyph_id: self.glyph_id,
            extra_glyphs: self.extra_glyphs,
            is_second: self.is_second,
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

/// The atlas coordinates assigned to one `(glyph, extra_glyphs, is_second)`
/// key. Once filled, a position never moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritePosition {
    /// The primary glyph index this sprite was rendered for.
    pub glyph_id: u16,
    /// Combining glyphs packed alongside `glyph_id`, or `0` for none.
    pub extra_glyphs: u64,
    /// Whether this sprite holds the second half of a wide character.
    pub is_second: bool,
    /// Atlas column.
    pub x: u16,
    /// Atlas row.
    pub y: u16,
    /// Atlas layer.
    pub z: u32,
}

/// Opaque handle to a cache slot, returned by [`SpriteCache::position_for`]
/// so callers can report back that a sprite has been rendered without
/// re-walking the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSlotId(usize);

/// Result of a cache lookup: the assigned position, the slot handle, and
/// whether this sprite had already been rendered on a prior lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteLookup {
    /// Handle to pass to [`SpriteCache::mark_rendered`].
    pub id: SpriteSlotId,
    /// The assigned atlas position.
    pub position: SpritePosition,
    /// `true` if this sprite was already rendered by an earlier lookup.
    pub already_rendered: bool,
}

/// Maps `(glyph, extra_glyphs, is_second)` keys to atlas positions.
///
/// Lookups either return an existing position or claim the next position
/// from a [`SpriteTracker`] and chain it in. The chain is an index arena
/// rather than pointers: `heads[glyph_id & (HEAD_COUNT - 1)]` is the first
/// candidate, and collisions walk `next` indices into the shared `slots`
/// vector.
#[derive(Debug, Default)]
pub struct SpriteCache {
    slots: Vec<Slot>,
}

impl SpriteCache {
    /// Builds an empty cache with its head table pre-allocated.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: vec![Slot::default(); HEAD_COUNT] }
    }

    fn head_index(glyph_id: u16) -> usize {
        (glyph_id as usize) & (HEAD_COUNT - 1)
    }

    /// Looks up the sprite for `(glyph_id, extra_glyphs, is_second)`,
    /// claiming a new atlas position from `tracker` if this key hasn't been
    /// seen since the last [`SpriteCache::clear`].
    pub fn position_for(
        &mut self,
        glyph_id: u16,
        extra_glyphs: u64,
        is_second: bool,
        tracker: &mut SpriteTracker,
    ) -> Result<SpriteLookup, Error> {
        let mut idx = Self::head_index(glyph_id);
        loop {
            let slot = self.slots[idx];
            if !slot.filled {
                break;
            }
            if slot.matches(glyph_id, extra_glyphs, is_second) {
                return Ok(SpriteLookup {
                    id: SpriteSlotId(idx),
                    position: slot.position(),
                    already_rendered: slot.rendered,
                });
            }
            match slot.next {
                Some(next) => idx = next,
                None => {
                    let new_idx = self.push_chain_node()?;
                    self.slots[idx].next = Some(new_idx);
                    idx = new_idx;
                    break;
                }
            }
        }

        let (x, y, z) = tracker.allocate_next()?;
        let slot = &mut self.slots[idx];
        slot.filled = true;
        slot.rendered = false;
        slot.is_second = is_second;
        slot.glyph_id = glyph_id;
        slot.extra_glyphs = extra_glyphs;
        slot.x = x;
        slot.y = y;
        slot.z = z;

        Ok(SpriteLookup { id: SpriteSlotId(idx), position: slot.position(), already_rendered: false })
    }

    fn push_chain_node(&mut self) -> Result<usize, Error> {
        self.slots
            .try_reserve(1)
            .map_err(|_| Error::out_of_memory("sprite cache overflow chain"))?;
        self.slots.push(Slot::default());
        Ok(self.slots.len() - 1)
    }

    /// Marks a previously looked-up sprite as rendered, so future lookups
    /// report `already_rendered`.
    pub fn mark_rendered(&mut self, id: SpriteSlotId) {
        self.slots[id.0].rendered = true;
    }

    /// Empties the cache: every head and chained entry becomes
    /// unfilled/unrendered with zeroed coordinates, but chain nodes are
    /// left linked and in place so they're reused on refill rather than
    /// regrown. Callers must also reset the paired [`SpriteTracker`] via
    /// `set_layout`.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.filled = false;
            slot.rendered = false;
            slot.is_second = false;
            slot.glyph_id = 0;
            slot.extra_glyphs = 0;
            slot.x = 0;
            slot.y = 0;
            slot.z = 0;
        }
    }

    /// Destroys every overflow chain node, shrinking storage back to just
    /// the head table. Heads remain, matching the original's per-Font-owned
    /// head array surviving a full free.
    pub fn free(&mut self) {
        self.slots.truncate(HEAD_COUNT);
        for slot in &mut self.slots {
            *slot = Slot::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_returns_same_position_without_reallocating() {
        let mut cache = SpriteCache::new();
        let mut tracker = SpriteTracker::new(1000, 1000);
        tracker.set_layout(8, 16);

        let first = cache.position_for(65, 0, false, &mut tracker).unwrap();
        let second = cache.position_for(65, 0, false, &mut tracker).unwrap();
        assert_eq!(first.position, second.position);
        assert!(!first.already_rendered);
        assert!(!second.already_rendered);
    }

    #[test]
    fn rendered_flag_is_sticky_until_clear() {
        let mut cache = SpriteCache::new();
        let mut tracker = SpriteTracker::new(1000, 1000);
        tracker.set_layout(8, 16);

        let lookup = cache.position_for(65, 0, false, &mut tracker).unwrap();
        assert!(!lookup.already_rendered);
        cache.mark_rendered(lookup.id);

        let again = cache.position_for(65, 0, false, &mut tracker).unwrap();
        assert!(again.already_rendered);

        cache.clear();
        let after_clear = cache.position_for(65, 0, false, &mut tracker).unwrap();
        assert!(!after_clear.already_rendered);
    }

    #[test]
    fn distinct_extra_glyphs_chain_past_a_shared_head() {
        let mut cache = SpriteCache::new();
        let mut tracker = SpriteTracker::new(1000, 1000);
        tracker.set_layout(8, 16);

        let glyph = 7u16;
        let a = cache.position_for(glyph, 0, false, &mut tracker).unwrap();
        let b = cache.position_for(glyph, 1, false, &mut tracker).unwrap();
        let c = cache.position_for(glyph, 0, true, &mut tracker).unwrap();

        assert_ne!(a.position, b.position);
        assert_ne!(a.position, c.position);
        assert_ne!(b.position, c.position);

        let a_again = cache.position_for(glyph, 0, false, &mut tracker).unwrap();
        assert_eq!(a.position, a_again.position);
    }

    #[test]
    fn clear_keeps_chain_nodes_for_reuse_instead_of_freeing_them() {
        let mut cache = SpriteCache::new();
        let mut tracker = SpriteTracker::new(1000, 1000);
        tracker.set_layout(8, 16);

        // Force an overflow chain node into existence by colliding two keys
        // on the same head.
        let glyph = 7u16;
        cache.position_for(glyph, 0, false, &mut tracker).unwrap();
        cache.position_for(glyph, 1, false, &mut tracker).unwrap();
        let len_before = cache.slots.len();
        assert!(len_before > HEAD_COUNT, "expected an overflow chain node to exist");

        cache.clear();
        assert_eq!(cache.slots.len(), len_before, "clear must not truncate the overflow arena");

        // Refilling should walk and reuse the existing chain rather than
        // growing it again.
        tracker.set_layout(8, 16);
        cache.position_for(glyph, 0, false, &mut tracker).unwrap();
        cache.position_for(glyph, 1, false, &mut tracker).unwrap();
        assert_eq!(cache.slots.len(), len_before);
    }

    #[test]
    fn free_truncates_chain_nodes_back_to_the_head_table() {
        let mut cache = SpriteCache::new();
        let mut tracker = SpriteTracker::new(1000, 1000);
        tracker.set_layout(8, 16);

        let glyph = 7u16;
        cache.position_for(glyph, 0, false, &mut tracker).unwrap();
        cache.position_for(glyph, 1, false, &mut tracker).unwrap();
        assert!(cache.slots.len() > HEAD_COUNT);

        cache.free();
        assert_eq!(cache.slots.len(), HEAD_COUNT);
    }

    #[test]
    fn clear_does_not_reset_the_paired_tracker() {
        let mut cache = SpriteCache::new();
        let mut tracker = SpriteTracker::new(1000, 1000);
        tracker.set_layout(8, 16);

        cache.position_for(1, 0, false, &mut tracker).unwrap();
        cache.clear();
        let after = cache.position_for(2, 0, false, &mut tracker).unwrap();
        assert_eq!(after.position.x, 1);
    }
}
