use crate::cell::CharType;

/// A user-declared mapping from a codepoint range to a specific font index,
/// overriding style-based face selection.
///
/// Ranges are not checked for overlap; when several ranges cover the same
/// codepoint, the first one in declared order wins. This is assumed
/// intentional upstream (later ranges are effectively overridden by earlier
/// ones) and is not rejected or reordered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMap {
    /// Inclusive lower bound of the codepoint range.
    pub left: CharType,
    /// Inclusive upper bound of the codepoint range.
    pub right: CharType,
    /// Index into the caller's symbol-map face table.
    pub font_index: usize,
}

impl SymbolMap {
    /// Builds a new symbol map entry.
    #[must_use]
    pub fn new(left: CharType, right: CharType, font_index: usize) -> Self {
        Self { left, right, font_index }
    }

    /// Whether `ch` falls within this map's inclusive range.
    #[must_use]
    pub fn contains(&self, ch: CharType) -> bool {
        self.left <= ch && ch <= self.right
    }

    /// Finds the font index for `ch` among `maps`, first match wins.
    #[must_use]
    pub fn font_index_for(maps: &[SymbolMap], ch: CharType) -> Option<usize> {
        maps.iter().find(|m| m.contains(ch)).map(|m| m.font_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins_on_overlap() {
        let maps = [SymbolMap::new(0x100, 0x200, 0), SymbolMap::new(0x150, 0x160, 1)];
        assert_eq!(SymbolMap::font_index_for(&maps, 0x155), Some(0));
    }

    #[test]
    fn no_match_returns_none() {
        let maps = [SymbolMap::new(0x100, 0x200, 0)];
        assert_eq!(SymbolMap::font_index_for(&maps, 0x300), None);
    }
}
