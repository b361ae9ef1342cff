// Licensed under the Apache License, Version 2.0.

//! Type-safe coordinates for grid positions and VT100 wire-format coordinates.
//!
//! Two coordinate systems meet at the parser boundary: buffers are 0-based
//! ([`RowIndex`]/[`ColIndex`]), the wire format is 1-based ([`TermRow`]/[`TermCol`]).
//! Keeping them as distinct types prevents an off-by-one from compiling.

use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Read-only access to the numeric value backing an index or length type.
pub trait NumericConversions {
    fn as_usize(&self) -> usize;
    fn as_u16(&self) -> u16;
}

macro_rules! index_type {
    ($name:ident, $ctor:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        #[must_use]
        pub const fn $ctor(value: usize) -> $name { $name(value) }

        impl $name {
            #[must_use]
            pub const fn new(value: usize) -> Self { Self(value) }
        }

        impl NumericConversions for $name {
            fn as_usize(&self) -> usize { self.0 }
            fn as_u16(&self) -> u16 { self.0 as u16 }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self { Self(value) }
        }

        impl Add<usize> for $name {
            type Output = Self;
            fn add(self, rhs: usize) -> Self { Self(self.0 + rhs) }
        }

        impl Sub<usize> for $name {
            type Output = Self;
            fn sub(self, rhs: usize) -> Self { Self(self.0.saturating_sub(rhs)) }
        }

        impl AddAssign<usize> for $name {
            fn add_assign(&mut self, rhs: usize) { self.0 += rhs; }
        }

        impl SubAssign<usize> for $name {
            fn sub_assign(&mut self, rhs: usize) { self.0 = self.0.saturating_sub(rhs); }
        }
    };
}

index_type!(RowIndex, row);
index_type!(ColIndex, col);

/// Result of an array-style bounds check: `index < length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsStatus {
    Within,
    Overflowed,
}

impl RowIndex {
    #[must_use]
    pub fn overflows(&self, num_rows: usize) -> BoundsStatus {
        if self.0 < num_rows {
            BoundsStatus::Within
        } else {
            BoundsStatus::Overflowed
        }
    }

    #[must_use]
    pub fn clamp_to_max(&self, num_rows: usize) -> Self {
        if num_rows == 0 {
            Self(0)
        } else {
            Self(self.0.min(num_rows - 1))
        }
    }
}

impl ColIndex {
    #[must_use]
    pub fn overflows(&self, num_cols: usize) -> BoundsStatus {
        if self.0 < num_cols {
            BoundsStatus::Within
        } else {
            BoundsStatus::Overflowed
        }
    }

    #[must_use]
    pub fn clamp_to_max(&self, num_cols: usize) -> Self {
        if num_cols == 0 {
            Self(0)
        } else {
            Self(self.0.min(num_cols - 1))
        }
    }
}

/// 0-based cursor/cell position within a grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub row: RowIndex,
    pub col: ColIndex,
}

impl Pos {
    #[must_use]
    pub const fn new(row: RowIndex, col: ColIndex) -> Self { Self { row, col } }
}

/// Grid dimensions, rows by columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub rows: usize,
    pub cols: usize,
}

impl Size {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self { Self { rows, cols } }
}

/// 1-based row coordinate used on the wire (`ESC[5;10H`). VT100 mandates values
/// start at 1; a value of 0 is normalized to 1 by callers via [`TermRow::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermRow(u16);

/// 1-based column coordinate used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCol(u16);

macro_rules! term_coord {
    ($name:ident, $index:ident) => {
        impl $name {
            /// Wraps a raw wire value, treating 0 the same as 1 per VT100 convention.
            #[must_use]
            pub const fn from_raw(value: u16) -> Self {
                Self(if value == 0 { 1 } else { value })
            }

            #[must_use]
            pub const fn as_u16(self) -> u16 { self.0 }

            #[must_use]
            pub fn from_zero_based(index: $index) -> Self {
                Self::from_raw(index.as_u16().saturating_add(1))
            }

            #[must_use]
            pub fn to_zero_based(self) -> $index {
                $index::from((self.0.saturating_sub(1)) as usize)
            }
        }
    };
}

term_coord!(TermRow, RowIndex);
term_coord!(TermCol, ColIndex);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_col_constructors() {
        assert_eq!(row(3), RowIndex(3));
        assert_eq!(col(4), ColIndex(4));
    }

    #[test]
    fn term_row_round_trip() {
        let r = TermRow::from_raw(5);
        let idx = r.to_zero_based();
        assert_eq!(idx, RowIndex(4));
        assert_eq!(TermRow::from_zero_based(idx), r);
    }

    #[test]
    fn term_row_zero_normalizes_to_one() {
        assert_eq!(TermRow::from_raw(0).as_u16(), 1);
    }

    #[test]
    fn overflow_checks() {
        assert_eq!(row(5).overflows(5), BoundsStatus::Overflowed);
        assert_eq!(row(4).overflows(5), BoundsStatus::Within);
    }

    #[test]
    fn clamp_to_max_handles_empty() {
        assert_eq!(row(9).clamp_to_max(0), row(0));
        assert_eq!(col(9).clamp_to_max(3), col(2));
    }
}
