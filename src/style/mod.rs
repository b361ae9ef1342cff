// Licensed under the Apache License, Version 2.0.

//! Cell attributes: palette/truecolor colours and the SGR flag set.
//!
//! Flags use the `Option<ZST marker>` idiom rather than a bitflags crate:
//! each flag is `Option<flag::Name>`, so "is this flag set" and "toggle it
//! off" read the same as any other `Option` field, and there is no bit
//! layout to keep in sync with the SGR table by hand.

pub mod flag {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Bold;
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Italic;
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Underline;
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Reverse;
}

/// Cell attributes, matching the data model field-for-field: 8-bit palette
/// indices for `fg`/`bg`, an optional 24-bit override when the corresponding
/// truecolor flag is set, and the four SGR flags this crate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAttr {
    pub fg: u8,
    pub bg: u8,
    pub bold: Option<flag::Bold>,
    pub italic: Option<flag::Italic>,
    pub underline: Option<flag::Underline>,
    pub reverse: Option<flag::Reverse>,
    pub fg_rgb: Option<(u8, u8, u8)>,
    pub bg_rgb: Option<(u8, u8, u8)>,
}

/// Default foreground/background palette indices per SGR 39/49.
pub const DEFAULT_FG: u8 = 7;
pub const DEFAULT_BG: u8 = 0;

impl Default for CellAttr {
    fn default() -> Self {
        Self {
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
            bold: None,
            italic: None,
            underline: None,
            reverse: None,
            fg_rgb: None,
            bg_rgb: None,
        }
    }
}

impl CellAttr {
    #[must_use]
    pub fn is_truecolor_fg(&self) -> bool { self.fg_rgb.is_some() }

    #[must_use]
    pub fn is_truecolor_bg(&self) -> bool { self.bg_rgb.is_some() }

    pub fn set_fg_palette(&mut self, index: u8) {
        self.fg = index;
        self.fg_rgb = None;
    }

    pub fn set_bg_palette(&mut self, index: u8) {
        self.bg = index;
        self.bg_rgb = None;
    }

    pub fn set_fg_rgb(&mut self, rgb: (u8, u8, u8)) { self.fg_rgb = Some(rgb); }

    pub fn set_bg_rgb(&mut self, rgb: (u8, u8, u8)) { self.bg_rgb = Some(rgb); }

    /// SGR 0: full reset to defaults.
    pub fn reset(&mut self) { *self = Self::default(); }
}

/// Maps a 256-colour palette index to its RGB value per the xterm scheme:
/// 0-15 ANSI (approximated with the standard xterm palette), 16-231 a
/// 6x6x6 cube with the level table `{0x00,0x5F,0x87,0xAF,0xD7,0xFF}`,
/// 232-255 greys at `0x08 + i*0x0A`.
#[must_use]
pub fn palette_to_rgb(index: u8) -> (u8, u8, u8) {
    const ANSI_16: [(u8, u8, u8); 16] = [
        (0x00, 0x00, 0x00),
        (0xCD, 0x00, 0x00),
        (0x00, 0xCD, 0x00),
        (0xCD, 0xCD, 0x00),
        (0x00, 0x00, 0xEE),
        (0xCD, 0x00, 0xCD),
        (0x00, 0xCD, 0xCD),
        (0xE5, 0xE5, 0xE5),
        (0x7F, 0x7F, 0x7F),
        (0xFF, 0x00, 0x00),
        (0x00, 0xFF, 0x00),
        (0xFF, 0xFF, 0x00),
        (0x5C, 0x5C, 0xFF),
        (0xFF, 0x00, 0xFF),
        (0x00, 0xFF, 0xFF),
        (0xFF, 0xFF, 0xFF),
    ];
    const LEVELS: [u8; 6] = [0x00, 0x5F, 0x87, 0xAF, 0xD7, 0xFF];

    match index {
        0..=15 => ANSI_16[index as usize],
        16..=231 => {
            let i = index - 16;
            let r = LEVELS[(i / 36) as usize];
            let g = LEVELS[((i / 6) % 6) as usize];
            let b = LEVELS[(i % 6) as usize];
            (r, g, b)
        }
        232..=255 => {
            let level = 0x08 + (index - 232) * 0x0A;
            (level, level, level)
        }
    }
}
