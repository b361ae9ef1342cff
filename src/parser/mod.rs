// Licensed under the Apache License, Version 2.0.

//! Control-sequence parser: a [`vte::Parser`] driving a [`Performer`] that
//! owns the [`Grid`] and turns `vte`'s callbacks into the operations
//! `spec.md` §4.3/§4.4 define. `vte` itself decodes the incoming UTF-8 and
//! tokenizes CSI/OSC parameter bytes — this module only has to interpret
//! what it's handed.

pub mod params_ext;

use vte::{Params, Perform};

use crate::grid::Grid;
use crate::osc::{parse_osc, OscEvent};
use crate::parser::params_ext::{parse_cursor_position, Index, ParamsExt};
use crate::style::{flag, palette_to_rgb, CellAttr, DEFAULT_BG, DEFAULT_FG};
use crate::units::{NumericConversions, Size};

/// `vte::Perform` implementation: the only place byte-level VT100 dispatch
/// logic lives. Holds the grid it mutates plus two small outboxes the event
/// loop drains after each `feed` — query replies that must go back down the
/// PTY, and title-change notifications for the UI adapter.
pub struct Performer {
    grid: Grid,
    responses: Vec<u8>,
    title_events: Vec<String>,
    initial_size: Size,
    scrollback_capacity: usize,
}

impl Performer {
    #[must_use]
    pub fn new(size: Size, scrollback_capacity: usize) -> Self {
        Self {
            grid: Grid::new(size, scrollback_capacity),
            responses: Vec::new(),
            title_events: Vec::new(),
            initial_size: size,
            scrollback_capacity,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid { &self.grid }

    pub fn grid_mut(&mut self) -> &mut Grid { &mut self.grid }

    /// Bytes queued for the PTY in reply to a device/cursor-position status
    /// request (`CSI n`). Empty unless the child just asked.
    pub fn take_responses(&mut self) -> Vec<u8> { std::mem::take(&mut self.responses) }

    /// Title changes observed since the last call (`OSC 0`/`1`/`2`).
    pub fn take_title_events(&mut self) -> Vec<String> { std::mem::take(&mut self.title_events) }

    fn queue_response(&mut self, bytes: &[u8]) { self.responses.extend_from_slice(bytes); }

    fn csi_private_mode(&mut self, action: char, params: &Params) {
        let set = action == 'h';
        let Some(mode) = params.extract_nth_single_opt_raw(Index(0)) else { return };
        match mode {
            7 => self.grid.set_auto_wrap(set),
            25 => self.grid.set_cursor_visible(set),
            47 | 1047 => {
                if set {
                    self.grid.enter_alternate_no_save();
                } else {
                    self.grid.leave_alternate_no_restore();
                }
            }
            1049 => {
                if set {
                    self.grid.enter_alternate_with_save();
                } else {
                    self.grid.leave_alternate_with_restore();
                }
            }
            _ => tracing::trace!(mode, set, "unhandled DEC private mode"),
        }
    }

    fn device_status_report(&mut self, params: &Params) {
        match params.extract_nth_single_opt_raw(Index(0)) {
            Some(5) => self.queue_response(b"\x1b[0n"),
            Some(6) => {
                let (col, row) = self.grid.cursor();
                let report = format!("\x1b[{};{}R", row.as_usize() + 1, col.as_usize() + 1);
                self.queue_response(report.as_bytes());
            }
            _ => {}
        }
    }

    fn reverse_index(&mut self) {
        let (top, _bottom) = self.grid.scroll_region();
        let (_col, row) = self.grid.cursor();
        if row.as_usize() == top {
            self.grid.scroll_down(1);
        } else {
            self.grid.move_cursor_rel(0, -1);
        }
    }

    fn full_reset(&mut self) {
        self.grid = Grid::new(self.initial_size, self.scrollback_capacity);
    }
}

impl Perform for Performer {
    fn print(&mut self, c: char) { self.grid.put(c); }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x08 => self.grid.backspace(),
            0x09 => self.grid.tab(),
            0x0A => self.grid.newline(),
            0x0D => self.grid.carriage_return(),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        let mut body = Vec::new();
        for (i, part) in params.iter().enumerate() {
            if i > 0 {
                body.push(b';');
            }
            body.extend_from_slice(part);
        }
        if let Some(OscEvent::SetTitle(title)) = parse_osc(&body) {
            self.title_events.push(title);
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        if ignore {
            return;
        }
        if matches!(action, 'h' | 'l') && intermediates.first() == Some(&b'?') {
            self.csi_private_mode(action, params);
            return;
        }
        match action {
            '@' => self.grid.insert_char(params.extract_nth_single_non_zero(Index(0)).get() as usize),
            'A' => self.grid.move_cursor_rel(0, -(params.extract_nth_single_non_zero(Index(0)).get() as i32)),
            'B' => self.grid.move_cursor_rel(0, params.extract_nth_single_non_zero(Index(0)).get() as i32),
            'C' => self.grid.move_cursor_rel(params.extract_nth_single_non_zero(Index(0)).get() as i32, 0),
            'D' => self.grid.move_cursor_rel(-(params.extract_nth_single_non_zero(Index(0)).get() as i32), 0),
            'E' => {
                let n = params.extract_nth_single_non_zero(Index(0)).get() as i32;
                self.grid.move_cursor_rel(0, n);
                let (_col, row) = self.grid.cursor();
                self.grid.set_cursor(0, row.as_usize());
            }
            'F' => {
                let n = params.extract_nth_single_non_zero(Index(0)).get() as i32;
                self.grid.move_cursor_rel(0, -n);
                let (_col, row) = self.grid.cursor();
                self.grid.set_cursor(0, row.as_usize());
            }
            'G' => {
                let col = params.extract_nth_single_non_zero(Index(0)).get() as usize - 1;
                let (_c, row) = self.grid.cursor();
                self.grid.set_cursor(col, row.as_usize());
            }
            'H' | 'f' => {
                let (row, col) = parse_cursor_position(params);
                self.grid.set_cursor(col, row);
            }
            'J' => {
                let mode = params.extract_nth_single_opt_raw(Index(0)).unwrap_or(0);
                self.grid.erase_in_display(mode);
            }
            'K' => {
                let mode = params.extract_nth_single_opt_raw(Index(0)).unwrap_or(0);
                self.grid.erase_in_line(mode);
            }
            'L' => self.grid.insert_line(params.extract_nth_single_non_zero(Index(0)).get() as usize),
            'M' => self.grid.delete_line(params.extract_nth_single_non_zero(Index(0)).get() as usize),
            'P' => self.grid.delete_char(params.extract_nth_single_non_zero(Index(0)).get() as usize),
            'S' => self.grid.scroll_up(params.extract_nth_single_non_zero(Index(0)).get() as usize),
            'T' => self.grid.scroll_down(params.extract_nth_single_non_zero(Index(0)).get() as usize),
            'd' => {
                let row = params.extract_nth_single_non_zero(Index(0)).get() as usize - 1;
                let (col, _r) = self.grid.cursor();
                self.grid.set_cursor(col.as_usize(), row);
            }
            'r' => {
                let top = params.extract_nth_single_non_zero(Index(0)).get() as usize - 1;
                let bottom_raw = params.extract_nth_single_opt_raw(Index(1)).unwrap_or(0);
                let bottom = if bottom_raw == 0 { self.grid.rows().saturating_sub(1) } else { bottom_raw as usize - 1 };
                self.grid.set_scroll_region(top, bottom);
            }
            'm' => {
                let groups: Vec<Vec<u16>> = params.iter().map(<[u16]>::to_vec).collect();
                let mut attr = self.grid.current_attr();
                apply_sgr(&mut attr, &groups);
                self.grid.set_current_attr(attr);
            }
            'n' => self.device_status_report(params),
            _ => tracing::trace!(action, "unhandled CSI final byte"),
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        if !intermediates.is_empty() {
            return;
        }
        match byte {
            b'7' => self.grid.save_cursor(),
            b'8' => self.grid.restore_cursor(),
            b'D' => self.grid.newline(),
            b'E' => {
                self.grid.carriage_return();
                self.grid.newline();
            }
            b'M' => self.reverse_index(),
            b'c' => self.full_reset(),
            _ => tracing::trace!(byte, "unhandled ESC final byte"),
        }
    }
}

/// Applies one `CSI ... m` parameter list to `attr`. Handles both the
/// colon sub-parameter extended-colour form (`38:5:N`, `38:2:R:G:B`, a
/// single parameter group) and the legacy semicolon form (`38;5;N`, three
/// separate groups), per `spec.md` §4.4.
fn apply_sgr(attr: &mut CellAttr, groups: &[Vec<u16>]) {
    if groups.is_empty() {
        attr.reset();
        return;
    }
    let mut i = 0;
    while i < groups.len() {
        let code = groups[i].first().copied().unwrap_or(0);
        match code {
            0 => attr.reset(),
            1 => attr.bold = Some(flag::Bold),
            3 => attr.italic = Some(flag::Italic),
            4 => attr.underline = Some(flag::Underline),
            7 => attr.reverse = Some(flag::Reverse),
            22 => attr.bold = None,
            23 => attr.italic = None,
            24 => attr.underline = None,
            27 => attr.reverse = None,
            30..=37 => attr.set_fg_palette(u8::try_from(code - 30).unwrap_or(0)),
            38 => i += apply_extended_color(attr, &groups[i..], true),
            39 => attr.set_fg_palette(DEFAULT_FG),
            40..=47 => attr.set_bg_palette(u8::try_from(code - 40).unwrap_or(0)),
            48 => i += apply_extended_color(attr, &groups[i..], false),
            49 => attr.set_bg_palette(DEFAULT_BG),
            90..=97 => attr.set_fg_palette(u8::try_from(code - 90 + 8).unwrap_or(0)),
            100..=107 => attr.set_bg_palette(u8::try_from(code - 100 + 8).unwrap_or(0)),
            _ => {}
        }
        i += 1;
    }
}

/// Consumes the `38`/`48` group plus whatever follows it (either packed into
/// the same colon sub-parameter group, or trailing semicolon-separated
/// groups) and applies the resulting colour. Returns how many *extra*
/// groups beyond the `38`/`48` one itself were consumed, so the caller's
/// index can skip them.
fn apply_extended_color(attr: &mut CellAttr, rest: &[Vec<u16>], is_fg: bool) -> usize {
    let head = &rest[0];
    if head.len() >= 2 {
        // Colon sub-parameter form: everything is in this one group.
        match head[1] {
            5 if head.len() >= 3 => set_palette(attr, is_fg, u8::try_from(head[2]).unwrap_or(0)),
            2 if head.len() >= 5 => {
                let rgb = (
                    u8::try_from(head[2]).unwrap_or(0),
                    u8::try_from(head[3]).unwrap_or(0),
                    u8::try_from(head[4]).unwrap_or(0),
                );
                set_rgb(attr, is_fg, rgb);
            }
            _ => {}
        }
        return 0;
    }
    // Legacy semicolon form: the mode and its arguments are separate groups.
    let Some(mode_group) = rest.get(1) else { return 0 };
    match mode_group.first().copied().unwrap_or(0) {
        5 => {
            let Some(idx_group) = rest.get(2) else { return 1 };
            set_palette(attr, is_fg, u8::try_from(idx_group.first().copied().unwrap_or(0)).unwrap_or(0));
            2
        }
        2 => {
            if rest.len() < 5 {
                return rest.len().saturating_sub(1);
            }
            let rgb = (
                u8::try_from(rest[2].first().copied().unwrap_or(0)).unwrap_or(0),
                u8::try_from(rest[3].first().copied().unwrap_or(0)).unwrap_or(0),
                u8::try_from(rest[4].first().copied().unwrap_or(0)).unwrap_or(0),
            );
            set_rgb(attr, is_fg, rgb);
            4
        }
        _ => 1,
    }
}

fn set_palette(attr: &mut CellAttr, is_fg: bool, index: u8) {
    if is_fg {
        attr.set_fg_palette(index);
    } else {
        attr.set_bg_palette(index);
    }
}

fn set_rgb(attr: &mut CellAttr, is_fg: bool, rgb: (u8, u8, u8)) {
    if is_fg {
        attr.set_fg_rgb(rgb);
    } else {
        attr.set_bg_rgb(rgb);
    }
}

/// Resolves a palette index to its RGB value; re-exported here so callers
/// that only import `parser` can render extended colours without reaching
/// into `style` directly.
#[must_use]
pub fn resolve_palette(index: u8) -> (u8, u8, u8) { palette_to_rgb(index) }

/// Bundles a `vte::Parser` with the [`Performer`] it drives. This is the
/// crate's entry point for turning raw PTY bytes into grid mutations.
pub struct Parser {
    inner: vte::Parser,
    performer: Performer,
}

impl Parser {
    #[must_use]
    pub fn new(size: Size, scrollback_capacity: usize) -> Self {
        Self { inner: vte::Parser::new(), performer: Performer::new(size, scrollback_capacity) }
    }

    /// Feeds a chunk of bytes straight off the PTY through the state
    /// machine. Malformed UTF-8/CSI/OSC sequences are absorbed internally
    /// by `vte` and never reach this crate as an error.
    pub fn feed(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.inner.advance(&mut self.performer, *byte);
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid { self.performer.grid() }

    pub fn grid_mut(&mut self) -> &mut Grid { self.performer.grid_mut() }

    pub fn take_responses(&mut self) -> Vec<u8> { self.performer.take_responses() }

    pub fn take_title_events(&mut self) -> Vec<String> { self.performer.take_title_events() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Size;

    fn parser() -> Parser { Parser::new(Size::new(24, 80), 1000) }

    #[test]
    fn plain_text_advances_cursor() {
        let mut p = parser();
        p.feed(b"hello");
        assert_eq!(p.grid().cell_at(0, 0).display_char(), 'h');
        let (x, y) = p.grid().cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (5, 0));
    }

    #[test]
    fn cup_moves_cursor_one_based() {
        let mut p = parser();
        p.feed(b"\x1b[5;10H");
        let (x, y) = p.grid().cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (9, 4));
    }

    #[test]
    fn sgr_legacy_truecolor_sets_rgb() {
        let mut p = parser();
        p.feed(b"\x1b[38;2;10;20;30mX");
        match p.grid().cell_at(0, 0) {
            crate::grid::Cell::Glyph { attr, .. } => assert_eq!(attr.fg_rgb, Some((10, 20, 30))),
            other => panic!("expected glyph, got {other:?}"),
        }
    }

    #[test]
    fn sgr_colon_palette_sets_indexed_color() {
        let mut p = parser();
        p.feed(b"\x1b[38:5:196mX");
        match p.grid().cell_at(0, 0) {
            crate::grid::Cell::Glyph { attr, .. } => {
                assert_eq!(attr.fg, 196);
                assert!(!attr.is_truecolor_fg());
            }
            other => panic!("expected glyph, got {other:?}"),
        }
    }

    #[test]
    fn sgr_reset_clears_bold() {
        let mut p = parser();
        p.feed(b"\x1b[1mX\x1b[0mY");
        match p.grid().cell_at(0, 0) {
            crate::grid::Cell::Glyph { attr, .. } => assert!(attr.bold.is_some()),
            other => panic!("expected glyph, got {other:?}"),
        }
        match p.grid().cell_at(0, 1) {
            crate::grid::Cell::Glyph { attr, .. } => assert!(attr.bold.is_none()),
            other => panic!("expected glyph, got {other:?}"),
        }
    }

    #[test]
    fn dec_private_mode_hides_cursor() {
        let mut p = parser();
        p.feed(b"\x1b[?25l");
        assert!(!p.grid().cursor_visible());
        p.feed(b"\x1b[?25h");
        assert!(p.grid().cursor_visible());
    }

    #[test]
    fn alternate_screen_mode_1049_round_trips() {
        let mut p = parser();
        p.feed(b"hello\x1b[?1049h\x1b[?1049l");
        assert_eq!(p.grid().cell_at(0, 0).display_char(), 'h');
        assert!(!p.grid().is_on_alternate());
    }

    #[test]
    fn osc_0_sets_title() {
        let mut p = parser();
        p.feed(b"\x1b]0;my title\x07");
        assert_eq!(p.take_title_events(), vec!["my title".to_string()]);
    }

    #[test]
    fn dsr_cursor_position_queues_response() {
        let mut p = parser();
        p.feed(b"\x1b[5;10H\x1b[6n");
        assert_eq!(p.take_responses(), b"\x1b[5;10R".to_vec());
    }

    #[test]
    fn decstbm_sets_scroll_region() {
        let mut p = parser();
        p.feed(b"\x1b[2;5r");
        assert_eq!(p.grid().scroll_region(), (1, 4));
    }

    #[test]
    fn reverse_index_scrolls_at_top_margin() {
        let mut p = parser();
        p.feed(b"hi\r\n");
        p.feed(b"\x1bM");
        let (_x, y) = p.grid().cursor();
        assert_eq!(y.as_usize(), 0);
    }

    #[test]
    fn ris_resets_the_grid() {
        let mut p = parser();
        p.feed(b"\x1b[1mhello\x1bc");
        assert_eq!(p.grid().cell_at(0, 0).display_char(), ' ');
        let (x, y) = p.grid().cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (0, 0));
    }

    #[test]
    fn split_write_boundary_matches_single_call() {
        use pretty_assertions::assert_eq;

        let input: &[u8] = b"\x1b[31;1mHI\x1b[0mOK\r\n\xe3\x81\x82";

        let mut whole = parser();
        whole.feed(input);

        let mut split = parser();
        for byte in input {
            split.feed(std::slice::from_ref(byte));
        }

        for row in 0..2 {
            let whole_row: Vec<_> = (0..whole.grid().cols()).map(|c| whole.grid().cell_at(row, c).clone()).collect();
            let split_row: Vec<_> = (0..split.grid().cols()).map(|c| split.grid().cell_at(row, c).clone()).collect();
            assert_eq!(whole_row, split_row);
        }
        assert_eq!(whole.grid().cursor(), split.grid().cursor());
    }

    #[test]
    fn truncates_excess_csi_params_silently() {
        let mut p = parser();
        let mut seq = b"\x1b[".to_vec();
        for n in 0..40 {
            seq.extend_from_slice(format!("{n};").as_bytes());
        }
        seq.push(b'm');
        p.feed(&seq);
        p.feed(b"X");
        assert_eq!(p.grid().cell_at(0, 0).display_char(), 'X');
    }
}
