// Licensed under the Apache License, Version 2.0.

//! The async event loop tying [`crate::parser::Parser`] and [`crate::pty::PtySession`]
//! together, per `spec.md` §4.6/§5: PTY output feeds the parser, UI input and
//! resizes feed the PTY, non-interactive stdin (if piped) is scanned for
//! Media Copy requests and otherwise forwarded to the PTY, a 16ms tick
//! catches a child exit that raced the reader thread's EOF, and an external
//! stop flag (wired to `SIGINT`/`SIGTERM` by the embedding application via
//! `signal-hook`) ends the loop early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, Stdin};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::pty::control::ControlChar;
use crate::pty::{ChildStatus, PtyOutputEvent, PtySession};

const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Staging buffer size for the stdin branch, per `spec.md` §4.6 step 4.
const STDIN_STAGING_SIZE: usize = 64 * 1024;

/// Forwarding chunk size for bytes read from stdin, per `spec.md` §4.6 step 4
/// ("forward the rest to the PTY in small chunks (<=256B) to preserve
/// ordering with the shell's echo").
const STDIN_FORWARD_CHUNK: usize = 256;

/// Input the embedding application feeds into the loop.
#[derive(Debug)]
pub enum UiEvent {
    /// A named key/control input, translated via [`ControlChar::to_bytes`].
    Key(ControlChar),
    /// Bytes to write verbatim (already sanitised, e.g. via `Terminal::paste_bytes`).
    Raw(Vec<u8>),
    /// The UI surface changed size; propagated to both the PTY and the grid.
    Resize(u16, u16),
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    ChildExited(ChildStatus),
    Stopped,
}

/// The three Media Copy (`CSI i`) forms used to request/toggle printer-style
/// screen dumps. This core doesn't implement printing — per `spec.md`'s
/// non-goals it only needs to avoid forwarding these to the child as if they
/// were ordinary input. Per `spec.md` §6, interception applies to stdin
/// only — not to UI-adapter-forwarded raw/paste bytes, which always go
/// straight to the PTY.
const MEDIA_COPY_SEQUENCES: &[&[u8]] = &[b"\x1b[5i", b"\x1b[4i", b"\x1b[4;0i"];

/// Strips every occurrence of a Media Copy sequence out of `buf`, returning
/// the bytes that should still reach the child.
fn strip_media_copy_sequences(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len());
    let mut i = 0;
    while i < buf.len() {
        if let Some(seq) = MEDIA_COPY_SEQUENCES.iter().find(|seq| buf[i..].starts_with(*seq)) {
            i += seq.len();
        } else {
            out.push(buf[i]);
            i += 1;
        }
    }
    out
}

/// Reads one chunk from `stdin` if present; never resolves once it's `None`
/// (EOF already seen), so the `tokio::select!` arm polling this simply never
/// fires again for the rest of the loop.
async fn read_stdin_chunk(stdin: &mut Option<Stdin>, buf: &mut [u8]) -> std::io::Result<usize> {
    match stdin {
        Some(s) => s.read(buf).await,
        None => std::future::pending().await,
    }
}

/// Runs until the child exits, the reader hits an unrecoverable I/O error,
/// or `stop` is set. Drains parser query responses (`DSR`) back to the PTY
/// and feeds resize events to both the PTY and the grid so they can never
/// drift apart.
///
/// `stdin` is `Some` only for a non-interactive invocation that wants piped
/// input multiplexed into the session (`spec.md` §4.6 step 4); pass `None`
/// for a UI-driven session where all input arrives via `ui_rx` instead.
pub async fn run(
    parser: &mut Parser,
    pty: &mut PtySession,
    mut ui_rx: UnboundedReceiver<UiEvent>,
    mut stdin: Option<Stdin>,
    stop: Arc<AtomicBool>,
) -> Result<LoopOutcome> {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut stdin_buf = vec![0u8; STDIN_STAGING_SIZE];

    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(LoopOutcome::Stopped);
        }

        tokio::select! {
            biased;

            pty_event = pty.recv() => {
                match pty_event {
                    Some(PtyOutputEvent::Output(bytes)) => {
                        parser.feed(&bytes);
                        let responses = parser.take_responses();
                        if !responses.is_empty() {
                            pty.write(&responses)?;
                        }
                        for title in parser.take_title_events() {
                            tracing::debug!(title, "terminal title changed");
                        }
                    }
                    Some(PtyOutputEvent::Eof) | None => {
                        if let ChildStatus::Exited(code) = pty.poll_child()? {
                            return Ok(LoopOutcome::ChildExited(ChildStatus::Exited(code)));
                        }
                    }
                    Some(PtyOutputEvent::ReadError(e)) => return Err(Error::Io(e)),
                }
            }

            Some(ui_event) = ui_rx.recv() => {
                match ui_event {
                    UiEvent::Key(ctrl) => pty.send_control(&ctrl)?,
                    UiEvent::Raw(bytes) => pty.write(&bytes)?,
                    UiEvent::Resize(rows, cols) => {
                        pty.resize(rows, cols)?;
                        parser.grid_mut().resize(rows as usize, cols as usize);
                    }
                }
            }

            stdin_result = read_stdin_chunk(&mut stdin, &mut stdin_buf) => {
                match stdin_result {
                    Ok(0) => stdin = None,
                    Ok(n) => {
                        let forwarded = strip_media_copy_sequences(&stdin_buf[..n]);
                        for chunk in forwarded.chunks(STDIN_FORWARD_CHUNK) {
                            pty.write(chunk)?;
                        }
                    }
                    Err(e) => return Err(Error::Io(e)),
                }
            }

            _ = ticker.tick() => {
                if let ChildStatus::Exited(code) = pty.poll_child()? {
                    return Ok(LoopOutcome::ChildExited(ChildStatus::Exited(code)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::units::Size;
    use tokio::sync::mpsc::unbounded_channel;

    fn test_config() -> Config {
        Config { initial_size: (10, 40), shell_override: Some("/bin/sh".into()), ..Config::default() }
    }

    #[test]
    fn strips_all_three_media_copy_forms() {
        assert_eq!(strip_media_copy_sequences(b"\x1b[5i"), Vec::<u8>::new());
        assert_eq!(strip_media_copy_sequences(b"\x1b[4i"), Vec::<u8>::new());
        assert_eq!(strip_media_copy_sequences(b"\x1b[4;0i"), Vec::<u8>::new());
        assert_eq!(strip_media_copy_sequences(b"\x1b[5n"), b"\x1b[5n".to_vec());
    }

    #[test]
    fn strips_media_copy_sequence_embedded_in_other_input() {
        let input = b"hello\x1b[5iworld\x1b[4;0i!";
        assert_eq!(strip_media_copy_sequences(input), b"helloworld!".to_vec());
    }

    #[serial_test::serial]
    #[tokio::test]
    async fn loop_exits_when_child_exits() {
        let mut pty = PtySession::spawn(&test_config()).expect("spawn shell");
        let mut parser = Parser::new(Size::new(10, 40), 100);
        let (tx, rx) = unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));

        pty.write(b"exit 0\n").expect("write exit command");
        drop(tx);

        let outcome =
            tokio::time::timeout(Duration::from_secs(5), run(&mut parser, &mut pty, rx, None, stop))
                .await
                .expect("loop did not finish in time")
                .expect("loop returned an error");
        assert!(matches!(outcome, LoopOutcome::ChildExited(_)));
    }

    #[serial_test::serial]
    #[tokio::test]
    async fn loop_stops_when_flag_is_set() {
        let mut pty = PtySession::spawn(&test_config()).expect("spawn shell");
        let mut parser = Parser::new(Size::new(10, 40), 100);
        let (_tx, rx) = unbounded_channel();
        let stop = Arc::new(AtomicBool::new(true));

        let outcome =
            tokio::time::timeout(Duration::from_secs(5), run(&mut parser, &mut pty, rx, None, stop))
                .await
                .expect("loop did not finish in time")
                .expect("loop returned an error");
        assert_eq!(outcome, LoopOutcome::Stopped);
        pty.shutdown().await.expect("shutdown");
    }
}
