// Licensed under the Apache License, Version 2.0.

//! PTY session management: spawns the configured shell behind a real
//! pseudo-terminal, streams its combined stdout/stderr to an unbounded
//! channel on a blocking reader thread, and exposes write/resize/shutdown
//! operations for the owning terminal.

pub mod control;

use std::io::{Read, Write};
use std::time::Duration;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pty::control::ControlChar;

const READ_BUFFER_SIZE: usize = 4096;
/// Grace period between `SIGTERM` and `SIGKILL` on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(1000);

/// What arrived from the child since the last drain.
#[derive(Debug)]
pub enum PtyOutputEvent {
    /// Raw bytes read off the PTY, ready for the parser.
    Output(Vec<u8>),
    /// The reader thread hit EOF: the child closed its end.
    Eof,
    /// The reader thread's `read` call failed.
    ReadError(std::io::Error),
}

/// Outcome of a non-blocking child-exit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    Running,
    Exited(u32),
}

fn to_resource_err(e: impl std::fmt::Display) -> Error { Error::Resource(e.to_string()) }

/// A running shell behind a PTY, plus the plumbing to talk to it.
pub struct PtySession {
    controller: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
    output_rx: UnboundedReceiver<PtyOutputEvent>,
    _reader_task: JoinHandle<()>,
}

impl PtySession {
    /// Opens a PTY pair sized per `config.initial_size` and execs
    /// `config.resolve_shell()` into the slave side. The slave is dropped
    /// in the parent once spawned so the
    /// reader thread observes EOF when the child exits rather than hanging
    /// on a lingering duplicate file descriptor.
    pub fn spawn(config: &Config) -> Result<Self> {
        let pty_system = native_pty_system();
        let (rows, cols) = config.initial_size;
        let pair = pty_system
            .openpty(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(to_resource_err)?;

        let mut cmd = CommandBuilder::new(config.resolve_shell());
        for (key, value) in config.child_env() {
            cmd.env(key, value);
        }
        let child = pair.slave.spawn_command(cmd).map_err(to_resource_err)?;
        drop(pair.slave);

        let mut reader = pair.master.try_clone_reader().map_err(to_resource_err)?;
        let writer = pair.master.take_writer().map_err(to_resource_err)?;

        let (tx, rx) = unbounded_channel();
        let reader_task = tokio::task::spawn_blocking(move || {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        let _ = tx.send(PtyOutputEvent::Eof);
                        break;
                    }
                    Ok(n) => {
                        if tx.send(PtyOutputEvent::Output(buf[..n].to_vec())).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(PtyOutputEvent::ReadError(e));
                        break;
                    }
                }
            }
        });

        Ok(Self { controller: pair.master, writer, child, output_rx: rx, _reader_task: reader_task })
    }

    /// Writes raw bytes to the child's stdin.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).map_err(Error::Io)?;
        self.writer.flush().map_err(Error::Io)
    }

    /// Translates and writes a single key/control input.
    pub fn send_control(&mut self, ctrl: &ControlChar) -> Result<()> { self.write(&ctrl.to_bytes()) }

    /// Resizes the PTY's window, which delivers `SIGWINCH` to the child.
    pub fn resize(&mut self, rows: u16, cols: u16) -> Result<()> {
        self.controller
            .resize(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(to_resource_err)
    }

    /// Awaits the next event from the child. Resolves to `None` once the
    /// reader thread has exited and its sender is dropped.
    pub async fn recv(&mut self) -> Option<PtyOutputEvent> { self.output_rx.recv().await }

    /// Non-blocking drain of whatever is already buffered, for callers that
    /// poll on their own schedule (e.g. [`crate::terminal::Terminal::tick`])
    /// instead of running [`crate::event_loop::run`].
    pub fn try_recv(&mut self) -> Option<PtyOutputEvent> { self.output_rx.try_recv().ok() }

    /// Non-blocking check of whether the child has exited.
    pub fn poll_child(&mut self) -> Result<ChildStatus> {
        match self.child.try_wait() {
            Ok(Some(status)) => Ok(ChildStatus::Exited(status.exit_code())),
            Ok(None) => Ok(ChildStatus::Running),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Graceful shutdown: `SIGTERM`, wait up to [`SHUTDOWN_GRACE`], then
    /// `SIGKILL`, then reap. `portable_pty::Child::kill` alone can't express
    /// this two-stage sequence, so signals are sent directly via `rustix`.
    pub async fn shutdown(mut self) -> Result<()> {
        self.signal(Signal::Term);

        let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
        while tokio::time::Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(_)) => return Ok(()),
                Ok(None) => tokio::time::sleep(Duration::from_millis(20)).await,
                Err(e) => return Err(Error::Io(e)),
            }
        }

        self.signal(Signal::Kill);
        self.child.wait().map(|_| ()).map_err(Error::Io)
    }

    fn signal(&self, signal: Signal) {
        let Some(pid) = self.child.process_id() else { return };
        let Some(pid) = rustix::process::Pid::from_raw(pid as i32) else { return };
        let raw = match signal {
            Signal::Term => rustix::process::Signal::Term,
            Signal::Kill => rustix::process::Signal::Kill,
        };
        if let Err(e) = rustix::process::kill_process(pid, raw) {
            tracing::debug!(?e, "failed to signal child process");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Term,
    Kill,
}
