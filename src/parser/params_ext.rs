// Licensed under the Apache License, Version 2.0.

//! Extension trait over `vte::Params` for reading CSI parameters the way the
//! dispatch table in `spec.md` §4.4 expects: 1-based positions, missing or
//! zero values defaulting to 1, and colon-separated sub-parameters (the
//! `38:5:196`-style extended SGR colour forms) as a raw slice.
//!
//! `vte::Params` has no public constructor — its fields are private and it
//! can only be produced by feeding real bytes through `vte::Parser::advance`.
//! Unit tests below therefore drive a tiny `vte::Perform` adapter rather than
//! constructing `Params` directly; see `process_csi_sequence_and_test`.

use std::num::NonZeroU16;

use vte::Params;

/// 0-based argument position within a CSI parameter list.
#[derive(Debug, Clone, Copy)]
pub struct Index(pub usize);

impl From<usize> for Index {
    fn from(value: usize) -> Self { Self(value) }
}

pub trait ParamsExt {
    /// The value at `arg_nth_pos`, defaulting to 1 when missing, explicitly
    /// zero, or past the end of the parameter list. This is the common case
    /// for cursor-motion counts (`CUU`/`CUD`/... default to 1).
    fn extract_nth_single_non_zero(&self, arg_nth_pos: impl Into<Index>) -> NonZeroU16;

    /// The raw value at `arg_nth_pos`: `Some(0)` when missing or explicitly
    /// zero, `None` when past the end of the list. Used where "absent"
    /// and "zero" must be distinguished from "not supplied at all" (e.g.
    /// `CSI ? Pm h/l` mode numbers).
    fn extract_nth_single_opt_raw(&self, arg_nth_pos: impl Into<Index>) -> Option<u16>;

    /// The full colon-separated sub-parameter slice at `arg_nth_pos`, e.g.
    /// `38:5:196` yields `Some(&[38, 5, 196])`. `None` past the end of the
    /// list.
    fn extract_nth_many_raw(&self, arg_nth_pos: impl Into<Index>) -> Option<&[u16]>;
}

impl ParamsExt for Params {
    fn extract_nth_single_non_zero(&self, arg_nth_pos: impl Into<Index>) -> NonZeroU16 {
        let pos = arg_nth_pos.into().0;
        let raw = self.iter().nth(pos).and_then(|sub| sub.first().copied()).unwrap_or(0);
        NonZeroU16::new(raw).unwrap_or(NonZeroU16::new(1).expect("1 is non-zero"))
    }

    fn extract_nth_single_opt_raw(&self, arg_nth_pos: impl Into<Index>) -> Option<u16> {
        let pos = arg_nth_pos.into().0;
        self.iter().nth(pos).map(|sub| sub.first().copied().unwrap_or(0))
    }

    fn extract_nth_many_raw(&self, arg_nth_pos: impl Into<Index>) -> Option<&[u16]> {
        let pos = arg_nth_pos.into().0;
        self.iter().nth(pos)
    }
}

/// Parses `CSI r ; c H` / `HVP` parameters into 0-based `(row, col)`,
/// defaulting each missing/zero component to row 1/col 1 (top-left).
#[must_use]
pub fn parse_cursor_position(params: &Params) -> (usize, usize) {
    let row = params.extract_nth_single_non_zero(Index(0)).get();
    let col = params.extract_nth_single_non_zero(Index(1)).get();
    ((row - 1) as usize, (col - 1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vte::{Params, Parser, Perform};

    /// Feeds `sequence` through a real `vte::Parser` and forwards the
    /// `Params` from the first `csi_dispatch` call to `test_fn`. This is the
    /// only way to obtain a populated `Params` value, since its fields are
    /// private.
    fn process_csi_sequence_and_test<F: FnMut(&Params)>(sequence: &str, mut test_fn: F) {
        struct Adapter<'a, F: FnMut(&Params)> {
            test_fn: &'a mut F,
            called: bool,
        }

        impl<F: FnMut(&Params)> Perform for Adapter<'_, F> {
            fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {
                if !self.called {
                    (self.test_fn)(params);
                    self.called = true;
                }
            }
        }

        let mut adapter = Adapter { test_fn: &mut test_fn, called: false };
        let mut parser = Parser::new();
        for byte in sequence.as_bytes() {
            parser.advance(&mut adapter, *byte);
        }
    }

    #[test]
    fn missing_param_defaults_to_one() {
        process_csi_sequence_and_test("\x1b[A", |params| {
            assert_eq!(params.extract_nth_single_non_zero(Index(0)).get(), 1);
        });
    }

    #[test]
    fn explicit_zero_defaults_to_one() {
        process_csi_sequence_and_test("\x1b[0A", |params| {
            assert_eq!(params.extract_nth_single_non_zero(Index(0)).get(), 1);
        });
    }

    #[test]
    fn explicit_value_is_returned() {
        process_csi_sequence_and_test("\x1b[5A", |params| {
            assert_eq!(params.extract_nth_single_non_zero(Index(0)).get(), 5);
        });
    }

    #[test]
    fn out_of_bounds_position_defaults_to_one() {
        process_csi_sequence_and_test("\x1b[5A", |params| {
            assert_eq!(params.extract_nth_single_non_zero(Index(3)).get(), 1);
        });
    }

    #[test]
    fn opt_raw_distinguishes_missing_from_out_of_bounds() {
        process_csi_sequence_and_test("\x1b[0A", |params| {
            assert_eq!(params.extract_nth_single_opt_raw(Index(0)), Some(0));
            assert_eq!(params.extract_nth_single_opt_raw(Index(1)), None);
        });
    }

    #[test]
    fn many_raw_returns_colon_subparams() {
        process_csi_sequence_and_test("\x1b[38:5:196m", |params| {
            let sub = params.extract_nth_many_raw(Index(0)).expect("first arg present");
            assert_eq!(sub, &[38, 5, 196]);
        });
    }

    #[test]
    fn cursor_position_defaults_to_top_left() {
        process_csi_sequence_and_test("\x1b[H", |params| {
            assert_eq!(parse_cursor_position(params), (0, 0));
        });
    }

    #[test]
    fn cursor_position_is_one_based_on_wire() {
        process_csi_sequence_and_test("\x1b[5;10H", |params| {
            assert_eq!(parse_cursor_position(params), (4, 9));
        });
    }
}
