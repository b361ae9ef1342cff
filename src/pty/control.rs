// Licensed under the Apache License, Version 2.0.

//! Key/control-sequence-to-bytes translation for the event loop's input
//! side, matching xterm's own key-to-byte conventions.

use std::borrow::Cow;

/// A key or control input translated into the byte sequence the child
/// expects on its stdin. `RawSequence` is the escape hatch for anything not
/// covered by the named variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlChar {
    CtrlC,
    CtrlD,
    CtrlZ,
    CtrlL,
    CtrlU,
    CtrlA,
    CtrlE,
    CtrlK,

    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Home,
    End,
    Insert,
    PageUp,
    PageDown,

    F(u8),

    RawSequence(Vec<u8>),
}

impl ControlChar {
    #[must_use]
    pub fn to_bytes(&self) -> Cow<'static, [u8]> {
        match self {
            Self::CtrlC => Cow::Borrowed(&[0x03]),
            Self::CtrlD => Cow::Borrowed(&[0x04]),
            Self::CtrlZ => Cow::Borrowed(&[0x1A]),
            Self::CtrlL => Cow::Borrowed(&[0x0C]),
            Self::CtrlU => Cow::Borrowed(&[0x15]),
            Self::CtrlA => Cow::Borrowed(&[0x01]),
            Self::CtrlE => Cow::Borrowed(&[0x05]),
            Self::CtrlK => Cow::Borrowed(&[0x0B]),

            Self::Tab => Cow::Borrowed(&[0x09]),
            Self::Enter => Cow::Borrowed(&[0x0D]),
            Self::Escape => Cow::Borrowed(&[0x1B]),
            Self::Backspace => Cow::Borrowed(&[0x7F]),
            Self::Delete => Cow::Borrowed(&[0x1B, 0x5B, 0x33, 0x7E]),

            Self::ArrowUp => Cow::Borrowed(&[0x1B, 0x5B, 0x41]),
            Self::ArrowDown => Cow::Borrowed(&[0x1B, 0x5B, 0x42]),
            Self::ArrowRight => Cow::Borrowed(&[0x1B, 0x5B, 0x43]),
            Self::ArrowLeft => Cow::Borrowed(&[0x1B, 0x5B, 0x44]),

            Self::Home => Cow::Borrowed(&[0x1B, 0x5B, 0x48]),
            Self::End => Cow::Borrowed(&[0x1B, 0x5B, 0x46]),
            Self::Insert => Cow::Borrowed(&[0x1B, 0x5B, 0x32, 0x7E]),
            Self::PageUp => Cow::Borrowed(&[0x1B, 0x5B, 0x35, 0x7E]),
            Self::PageDown => Cow::Borrowed(&[0x1B, 0x5B, 0x36, 0x7E]),

            Self::F(n) => match n {
                1 => Cow::Borrowed(&[0x1B, 0x4F, 0x50]),
                2 => Cow::Borrowed(&[0x1B, 0x4F, 0x51]),
                3 => Cow::Borrowed(&[0x1B, 0x4F, 0x52]),
                4 => Cow::Borrowed(&[0x1B, 0x4F, 0x53]),
                5 => Cow::Borrowed(&[0x1B, 0x5B, 0x31, 0x35, 0x7E]),
                6 => Cow::Borrowed(&[0x1B, 0x5B, 0x31, 0x37, 0x7E]),
                7 => Cow::Borrowed(&[0x1B, 0x5B, 0x31, 0x38, 0x7E]),
                8 => Cow::Borrowed(&[0x1B, 0x5B, 0x31, 0x39, 0x7E]),
                9 => Cow::Borrowed(&[0x1B, 0x5B, 0x32, 0x30, 0x7E]),
                10 => Cow::Borrowed(&[0x1B, 0x5B, 0x32, 0x31, 0x7E]),
                11 => Cow::Borrowed(&[0x1B, 0x5B, 0x32, 0x33, 0x7E]),
                12 => Cow::Borrowed(&[0x1B, 0x5B, 0x32, 0x34, 0x7E]),
                _ => Cow::Borrowed(&[0x1B]),
            },

            Self::RawSequence(bytes) => Cow::Owned(bytes.clone()),
        }
    }
}
