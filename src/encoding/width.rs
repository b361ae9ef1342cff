// Licensed under the Apache License, Version 2.0.

//! East Asian Width classification, pinned to an explicit range table rather
//! than delegating to `unicode_width`, whose UAX#11 derivation disagrees with
//! this table at a handful of margins. The table is a data contract: callers
//! rely on exactly these ranges, not "whatever the Unicode version ships."

/// Inclusive wide-glyph ranges. Kept sorted and non-overlapping; `width`
/// binary-searches this table.
const WIDE_RANGES: &[(u32, u32)] = &[
    (0x1100, 0x115F),
    (0x2E80, 0x303E),
    (0x3041, 0x33FF),
    (0x3400, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0xA000, 0xA4CF),
    (0xAC00, 0xD7A3),
    (0xF900, 0xFAFF),
    (0xFE30, 0xFE4F),
    (0xFF00, 0xFF60),
    (0xFFE0, 0xFFE6),
    (0x20000, 0x2FFFD),
    (0x30000, 0x3FFFD),
];

/// Display width of `cp`, in cells: 1 or 2. Callers must not pass control
/// codes (`< 0x20`); the parser filters those out before reaching here.
#[must_use]
pub fn width(cp: char) -> u8 {
    let cp = cp as u32;
    if WIDE_RANGES
        .binary_search_by(|&(lo, hi)| {
            if cp < lo {
                std::cmp::Ordering::Greater
            } else if cp > hi {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
    {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case('a', 1; "ascii narrow")]
    #[test_case(' ', 1; "space narrow")]
    #[test_case('\u{00e9}', 1; "latin1 supplement narrow")]
    #[test_case('\u{3042}', 2; "hiragana a wide")]
    #[test_case('\u{4e00}', 2; "cjk ideograph wide")]
    #[test_case('\u{ac00}', 2; "hangul syllable wide")]
    #[test_case('\u{ff01}', 2; "fullwidth exclamation wide")]
    #[test_case('\u{1100}', 2; "hangul jamo lower bound wide")]
    #[test_case('\u{115f}', 2; "hangul jamo upper bound wide")]
    #[test_case('\u{1160}', 1; "just past hangul jamo range narrow")]
    fn classifies(cp: char, expected: u8) {
        assert_eq!(width(cp), expected);
    }
}
