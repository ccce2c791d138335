/// Packs up to four secondary glyph ids (beyond a cluster's primary glyph)
/// into the 64-bit `extra_glyphs` cache key, 16 bits each, in order.
/// Clusters shaping to more than four secondary glyphs silently drop the
/// rest from the key — they still render, just with a cache key that
/// collapses with any other cluster sharing the same first four.
#[must_use]
pub fn pack_extra_glyphs(secondary: &[u16]) -> u64 {
    let mut packed = 0u64;
    for (i, &glyph_id) in secondary.iter().take(4).enumerate() {
        packed |= (glyph_id as u64) << (i * 16);
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_in_order_and_truncates_past_four() {
        assert_eq!(pack_extra_glyphs(&[]), 0);
        assert_eq!(pack_extra_glyphs(&[1]), 1);
        assert_eq!(pack_extra_glyphs(&[1, 2]), 1 | (2 << 16));
        assert_eq!(pack_extra_glyphs(&[1, 2, 3, 4, 5]), pack_extra_glyphs(&[1, 2, 3, 4]));
    }
}
