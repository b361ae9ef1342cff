// Licensed under the Apache License, Version 2.0.

//! Encoding concerns independent of `vte`'s own internal decoding of CSI/OSC
//! parameter bytes: the incremental UTF-8 decoder used to sanitise pasted
//! text, and the East Asian Width classifier the grid uses to size glyphs.

pub mod utf8;
pub mod width;
