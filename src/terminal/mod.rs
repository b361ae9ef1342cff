// Licensed under the Apache License, Version 2.0.

//! The public facade: one owned [`Terminal`] value bundling the parser/grid
//! and the PTY session behind it, exposing exactly the operations `spec.md`
//! §6 lists. Nothing here is global state — every call takes `&mut self`.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::io::Stdin;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::event_loop::{self, LoopOutcome, UiEvent};
use crate::grid::Cell;
use crate::parser::Parser;
use crate::pty::control::ControlChar;
use crate::pty::{ChildStatus, PtyOutputEvent, PtySession};
use crate::units::{NumericConversions, Pos, Size};

/// A read-only view of the current visible screen, cheap to build and cheap
/// to throw away every frame.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rows: Vec<Vec<Cell>>,
    pub cursor: Pos,
    pub cursor_visible: bool,
    pub scroll_offset: usize,
    pub title: Option<String>,
}

/// Outcome of a [`Terminal::tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    ChildExited(u32),
}

pub struct Terminal {
    parser: Parser,
    pty: PtySession,
    title: Option<String>,
}

impl Terminal {
    /// Spawns the configured shell and allocates the grid at
    /// `config.initial_size`, per `spec.md` §4.5 steps 1-3.
    pub fn start(config: &Config) -> Result<Self> {
        let size = Size::new(config.initial_size.0 as usize, config.initial_size.1 as usize);
        let pty = PtySession::spawn(config)?;
        let parser = Parser::new(size, config.scrollback_lines);
        Ok(Self { parser, pty, title: None })
    }

    /// Drains whatever PTY output has arrived since the last call without
    /// blocking, feeding it through the parser and writing back any query
    /// responses (`DSR`). Call this on your own render cadence; for a fully
    /// automatic push-based loop instead, see [`crate::event_loop::run`].
    pub fn tick(&mut self) -> Result<TickOutcome> {
        while let Some(event) = self.pty.try_recv() {
            match event {
                PtyOutputEvent::Output(bytes) => {
                    self.parser.feed(&bytes);
                    let responses = self.parser.take_responses();
                    if !responses.is_empty() {
                        self.pty.write(&responses)?;
                    }
                    if let Some(last) = self.parser.take_title_events().into_iter().last() {
                        self.title = Some(last);
                    }
                }
                PtyOutputEvent::Eof => {}
                PtyOutputEvent::ReadError(e) => return Err(Error::Io(e)),
            }
        }
        match self.pty.poll_child()? {
            ChildStatus::Exited(code) => Ok(TickOutcome::ChildExited(code)),
            ChildStatus::Running => Ok(TickOutcome::Running),
        }
    }

    /// A snapshot of the currently visible grid, honouring the scrollback
    /// view offset.
    #[must_use]
    pub fn render_snapshot(&self) -> Snapshot {
        let grid = self.parser.grid();
        let rows = (0..grid.visible_rows()).map(|r| grid.visible_line(r)).collect();
        let (col, row) = grid.cursor();
        Snapshot {
            rows,
            cursor: Pos::new(row, col),
            cursor_visible: grid.cursor_visible(),
            scroll_offset: grid.scroll_offset(),
            title: self.title.clone(),
        }
    }

    /// Translates and forwards one key/control input to the child.
    pub fn key_event(&mut self, ctrl: &ControlChar) -> Result<()> { self.pty.send_control(ctrl) }

    /// Resizes the PTY and the grid together, so they can never drift out
    /// of sync.
    pub fn resize(&mut self, rows: u16, cols: u16) -> Result<()> {
        self.pty.resize(rows, cols)?;
        self.parser.grid_mut().resize(rows as usize, cols as usize);
        Ok(())
    }

    /// Scrolls the visible-space view by `delta` lines into scrollback.
    pub fn scroll_by(&mut self, delta: isize) { self.parser.grid_mut().scroll_by(delta); }

    pub fn selection_start(&mut self, pos: Pos) { self.parser.grid_mut().selection_start(pos); }

    pub fn selection_update(&mut self, pos: Pos) { self.parser.grid_mut().selection_update(pos); }

    pub fn selection_end(&mut self, pos: Pos) { self.parser.grid_mut().selection_end(pos); }

    pub fn selection_clear(&mut self) { self.parser.grid_mut().selection_clear(); }

    #[must_use]
    pub fn get_selected_text(&self) -> String { self.parser.grid().get_selected_text() }

    /// Sanitises arbitrary bytes (e.g. from the system clipboard) through
    /// the UTF-8 decoder before writing them to the child, so an invalid
    /// paste can't inject a raw control sequence the decoder wouldn't have
    /// produced itself.
    pub fn paste_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        use crate::encoding::utf8::{Step, Utf8Decoder};

        let mut decoder = Utf8Decoder::default();
        let mut sanitized = String::new();
        for &byte in bytes {
            match decoder.feed(byte) {
                Step::Complete(c) => sanitized.push(c),
                Step::Invalid => sanitized.push(char::REPLACEMENT_CHARACTER),
                Step::Incomplete => {}
            }
        }
        self.pty.write(sanitized.as_bytes())
    }

    /// Runs the automatic push-based loop ([`crate::event_loop::run`])
    /// directly against this terminal's parser/PTY pair, until the child
    /// exits or `stop` is set. Complements [`Self::tick`]'s pull-based
    /// polling. `stdin` is `Some` only for a non-interactive invocation that
    /// wants piped input multiplexed into the session and scanned for Media
    /// Copy requests, per `spec.md` §4.6 step 4 / §6 — pass `None` for a
    /// UI-driven session where all input arrives via `ui_rx`.
    pub async fn run_event_loop(
        &mut self,
        ui_rx: UnboundedReceiver<UiEvent>,
        stdin: Option<Stdin>,
        stop: Arc<AtomicBool>,
    ) -> Result<LoopOutcome> {
        event_loop::run(&mut self.parser, &mut self.pty, ui_rx, stdin, stop).await
    }

    /// Gracefully tears down the PTY session: `SIGTERM`, grace period,
    /// `SIGKILL`, reap.
    pub async fn shutdown(self) -> Result<()> { self.pty.shutdown().await }
}
