// Licensed under the Apache License, Version 2.0.

//! Grid cell representation: a tagged variant rather than a sentinel
//! codepoint, per the design note against coupling "what is this cell" to
//! the codepoint field.

use crate::style::CellAttr;

/// One grid cell. `Glyph` with `width == 2` is always immediately followed
/// (same row) by a `Continuation` cell inheriting its attrs; renderers must
/// skip `Continuation` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// An empty (space) cell with the given attributes.
    Empty(CellAttr),
    /// A printable glyph. `width` is 1 or 2, as classified by
    /// [`crate::encoding::width::width`].
    Glyph { ch: char, width: u8, attr: CellAttr },
    /// The right half of a double-width glyph. Carries the left half's
    /// attributes so a renderer can style it consistently if it chooses to
    /// render something (it should normally render nothing).
    Continuation(CellAttr),
}

impl Cell {
    #[must_use]
    pub fn blank(attr: CellAttr) -> Self { Self::Empty(attr) }

    #[must_use]
    pub fn attr(&self) -> CellAttr {
        match self {
            Self::Empty(attr) | Self::Glyph { attr, .. } | Self::Continuation(attr) => *attr,
        }
    }

    #[must_use]
    pub fn is_continuation(&self) -> bool { matches!(self, Self::Continuation(_)) }

    /// The codepoint a renderer/selection-extractor should draw: space for
    /// empty cells, the glyph for `Glyph`, and nothing (skip) for
    /// continuations — callers must check [`Self::is_continuation`] first.
    #[must_use]
    pub fn display_char(&self) -> char {
        match self {
            Self::Empty(_) => ' ',
            Self::Glyph { ch, .. } => *ch,
            Self::Continuation(_) => ' ',
        }
    }
}

impl Default for Cell {
    fn default() -> Self { Self::Empty(CellAttr::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cell_is_space() {
        assert_eq!(Cell::default().display_char(), ' ');
        assert!(!Cell::default().is_continuation());
    }

    #[test]
    fn continuation_is_flagged() {
        let cell = Cell::Continuation(CellAttr::default());
        assert!(cell.is_continuation());
    }

    #[test]
    fn glyph_carries_its_width() {
        let cell = Cell::Glyph { ch: '\u{3042}', width: 2, attr: CellAttr::default() };
        match cell {
            Cell::Glyph { width, .. } => assert_eq!(width, 2),
            _ => unreachable!(),
        }
    }
}
