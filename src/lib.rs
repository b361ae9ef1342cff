// Licensed under the Apache License, Version 2.0.

//! A VT100/ANSI-compatible terminal emulator core: a control-sequence
//! parser, a cell-grid screen model with scrollback and selection, and the
//! PTY session/event-loop plumbing that drives a real shell behind them.
//!
//! [`terminal::Terminal`] is the entry point most applications want — one
//! owned value bundling the grid and the PTY session, exposing the
//! operations an embedding UI needs (key input, resize, scrollback,
//! selection, paste) without any global state. Lower-level pieces
//! ([`parser::Parser`], [`grid::Grid`], [`pty::PtySession`]) are public for
//! callers that want to drive the pieces themselves — for example running
//! [`event_loop::run`] directly instead of polling [`terminal::Terminal::tick`].

pub mod config;
pub mod encoding;
pub mod error;
pub mod event_loop;
pub mod grid;
pub mod osc;
pub mod parser;
pub mod pty;
pub mod style;
pub mod terminal;
pub mod units;

pub use error::{Error, Result};
pub use terminal::Terminal;
