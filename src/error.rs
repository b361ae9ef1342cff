// Licensed under the Apache License, Version 2.0.

//! Error taxonomy for the public surface, per `spec.md` §7.
//!
//! `DecodeError` and `ProtocolError` from §7 are deliberately **not** variants
//! here: the parser and grid are total functions over their inputs and
//! recover from malformed UTF-8 / CSI / OSC internally (emit U+FFFD, drop the
//! offending sequence, return to `Ground`) without ever surfacing an error.
//! Only I/O can fail upward. `ChildExited` is also not a variant here, per
//! §7's own framing ("informational, not an error"): child-exit is carried
//! through [`crate::terminal::TickOutcome`] and
//! [`crate::event_loop::LoopOutcome`] instead of `Result`.

use thiserror::Error;

/// Errors that can cross the crate's public API boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// PTY read/write, ioctl, or fork/exec failure.
    #[error("pty i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Allocation failure on grid/scrollback resize. The old grid is
    /// retained unchanged by the caller; this is only raised on resize, not
    /// on `init` (which is fatal and never returns to the caller at all).
    #[error("failed to allocate grid resources: {0}")]
    Resource(String),
}

/// Convenience alias for the crate's fallible public operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::other("boom");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn resource_error_carries_message() {
        let err = Error::Resource("out of memory".to_string());
        assert_eq!(err.to_string(), "failed to allocate grid resources: out of memory");
    }
}
