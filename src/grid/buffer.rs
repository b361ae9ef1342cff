// Licensed under the Apache License, Version 2.0.

//! The cell grid: primary/alternate screens, cursor, scrolling region, saved
//! cursor, and the scrollback ring. This is the screen model the parser
//! mutates; it has no knowledge of `vte` or byte streams.

use crate::encoding::width::width;
use crate::grid::cell::Cell;
use crate::grid::scrollback::Scrollback;
use crate::grid::selection::Selection;
use crate::style::CellAttr;
use crate::units::{ColIndex, Pos, RowIndex, Size};

/// Saved cursor state, per ESC 7/DECSC and the 1049 mode-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCursor {
    pub x: ColIndex,
    pub y: RowIndex,
    pub attr: CellAttr,
}

/// A single screen (primary or alternate): its own cell storage, cursor, and
/// scrolling region. Both screens always have identical dimensions — the
/// source's bug of resizing only the live one while the other points at
/// stale dimensions is deliberately not reproduced here.
#[derive(Debug, Clone)]
struct Screen {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
    cursor_x: ColIndex,
    cursor_y: RowIndex,
    pending_wrap: bool,
    scroll_top: usize,
    scroll_bottom: usize,
    current_attr: CellAttr,
    saved_cursor: Option<SavedCursor>,
    cursor_visible: bool,
    auto_wrap: bool,
}

impl Screen {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); rows * cols],
            rows,
            cols,
            cursor_x: ColIndex::new(0),
            cursor_y: RowIndex::new(0),
            pending_wrap: false,
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            current_attr: CellAttr::default(),
            saved_cursor: None,
            cursor_visible: true,
            auto_wrap: true,
        }
    }

    fn index(&self, row: usize, col: usize) -> usize { row * self.cols + col }

    fn cell(&self, row: usize, col: usize) -> &Cell { &self.cells[self.index(row, col)] }

    fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        let idx = self.index(row, col);
        &mut self.cells[idx]
    }

    fn clear_range(&mut self, row: usize, from_col: usize, to_col_exclusive: usize) {
        let attr = self.current_attr;
        for c in from_col..to_col_exclusive {
            *self.cell_mut(row, c) = Cell::blank(attr);
        }
    }
}

/// Outcome of a scroll-up, telling the owning [`Grid`] which lines (if any)
/// to push into scrollback. Only the primary screen, scrolling its full
/// width from `scroll_top == 0`, ever contributes.
struct ScrolledOut {
    lines: Vec<Vec<Cell>>,
}

impl Screen {
    /// Scrolls lines `[scroll_top, scroll_bottom]` up by `n`, clearing
    /// vacated bottom lines. Returns the lines that left the top of the
    /// region, for scrollback capture by the caller.
    fn scroll_up(&mut self, n: usize) -> ScrolledOut {
        let top = self.scroll_top;
        let bottom = self.scroll_bottom;
        if top > bottom || n == 0 {
            return ScrolledOut { lines: Vec::new() };
        }
        let region_height = bottom - top + 1;
        let n = n.min(region_height);
        let mut evicted = Vec::with_capacity(n);
        for _ in 0..n {
            let row_cells: Vec<Cell> = (0..self.cols).map(|c| self.cell(top, c).clone()).collect();
            evicted.push(row_cells);
            for r in top..bottom {
                for c in 0..self.cols {
                    let next = self.cell(r + 1, c).clone();
                    *self.cell_mut(r, c) = next;
                }
            }
            self.clear_range(bottom, 0, self.cols);
        }
        ScrolledOut { lines: evicted }
    }

    fn scroll_down(&mut self, n: usize) {
        let top = self.scroll_top;
        let bottom = self.scroll_bottom;
        if top > bottom || n == 0 {
            return;
        }
        let region_height = bottom - top + 1;
        let n = n.min(region_height);
        for _ in 0..n {
            for r in (top + 1..=bottom).rev() {
                for c in 0..self.cols {
                    let prev = self.cell(r - 1, c).clone();
                    *self.cell_mut(r, c) = prev;
                }
            }
            self.clear_range(top, 0, self.cols);
        }
    }

    fn insert_line(&mut self, n: usize) {
        let y = self.cursor_y.as_usize();
        if y < self.scroll_top || y > self.scroll_bottom {
            return;
        }
        let saved_top = self.scroll_top;
        self.scroll_top = y;
        self.scroll_down(n);
        self.scroll_top = saved_top;
    }

    fn delete_line(&mut self, n: usize) {
        let y = self.cursor_y.as_usize();
        if y < self.scroll_top || y > self.scroll_bottom {
            return;
        }
        let saved_top = self.scroll_top;
        self.scroll_top = y;
        self.scroll_up(n);
        self.scroll_top = saved_top;
    }

    fn insert_char(&mut self, n: usize) {
        let y = self.cursor_y.as_usize();
        let x = self.cursor_x.as_usize().min(self.cols.saturating_sub(1));
        let n = n.min(self.cols - x);
        for c in (x..self.cols - n).rev() {
            let moved = self.cell(y, c).clone();
            *self.cell_mut(y, c + n) = moved;
        }
        self.clear_range(y, x, x + n);
    }

    fn delete_char(&mut self, n: usize) {
        let y = self.cursor_y.as_usize();
        let x = self.cursor_x.as_usize().min(self.cols.saturating_sub(1));
        let n = n.min(self.cols - x);
        for c in x..self.cols - n {
            let moved = self.cell(y, c + n).clone();
            *self.cell_mut(y, c) = moved;
        }
        self.clear_range(y, self.cols - n, self.cols);
    }

    fn erase_in_line(&mut self, mode: u16) {
        let y = self.cursor_y.as_usize();
        let x = self.cursor_x.as_usize().min(self.cols.saturating_sub(1));
        match mode {
            0 => self.clear_range(y, x, self.cols),
            1 => self.clear_range(y, 0, x + 1),
            _ => self.clear_range(y, 0, self.cols),
        }
    }

    fn erase_in_display(&mut self, mode: u16) -> bool {
        let y = self.cursor_y.as_usize();
        let x = self.cursor_x.as_usize().min(self.cols.saturating_sub(1));
        match mode {
            0 => {
                self.clear_range(y, x, self.cols);
                for r in y + 1..self.rows {
                    self.clear_range(r, 0, self.cols);
                }
                false
            }
            1 => {
                for r in 0..y {
                    self.clear_range(r, 0, self.cols);
                }
                self.clear_range(y, 0, x + 1);
                false
            }
            _ => {
                for r in 0..self.rows {
                    self.clear_range(r, 0, self.cols);
                }
                // mode >= 2: full erase; mode == 3 additionally clears scrollback,
                // signalled to the caller via the bool return.
                mode == 3
            }
        }
    }

    fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor_x = ColIndex::new(x.min(self.cols.saturating_sub(1)));
        self.cursor_y = RowIndex::new(y.min(self.rows.saturating_sub(1)));
        self.pending_wrap = false;
    }

    fn resize(&mut self, new_rows: usize, new_cols: usize) {
        let mut new_cells = vec![Cell::default(); new_rows * new_cols];
        let copy_rows = self.rows.min(new_rows);
        let copy_cols = self.cols.min(new_cols);
        for r in 0..copy_rows {
            for c in 0..copy_cols {
                new_cells[r * new_cols + c] = self.cell(r, c).clone();
            }
        }
        self.cells = new_cells;
        self.rows = new_rows;
        self.cols = new_cols;
        self.cursor_x = self.cursor_x.clamp_to_max(new_cols);
        self.cursor_y = self.cursor_y.clamp_to_max(new_rows);
        self.scroll_top = self.scroll_top.min(new_rows.saturating_sub(1));
        self.scroll_bottom = self.scroll_bottom.min(new_rows.saturating_sub(1));
        self.pending_wrap = false;
    }
}

/// The full screen model: primary grid (with its scrollback), lazily
/// allocated alternate grid, and which one is currently live.
#[derive(Debug, Clone)]
pub struct Grid {
    primary: Screen,
    alternate: Option<Screen>,
    on_alternate: bool,
    scrollback: Scrollback,
    /// Lines visible above the live grid, per `spec.md` §3 ("Scrollback");
    /// `0` means the live view. Reset to `0` on resize — the view snaps back
    /// to live rather than trying to preserve a scroll position across a
    /// reflow that scrollback itself never undergoes (see `DESIGN.md`).
    scroll_offset: usize,
    selection: Selection,
}

impl Grid {
    #[must_use]
    pub fn new(size: Size, scrollback_capacity: usize) -> Self {
        Self {
            primary: Screen::new(size.rows, size.cols),
            alternate: None,
            on_alternate: false,
            scrollback: Scrollback::new(scrollback_capacity),
            scroll_offset: 0,
            selection: Selection::default(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize { self.live().rows }

    #[must_use]
    pub fn cols(&self) -> usize { self.live().cols }

    #[must_use]
    pub fn cursor(&self) -> (ColIndex, RowIndex) { (self.live().cursor_x, self.live().cursor_y) }

    #[must_use]
    pub fn cursor_visible(&self) -> bool { self.live().cursor_visible }

    #[must_use]
    pub fn current_attr(&self) -> CellAttr { self.live().current_attr }

    #[must_use]
    pub fn scrollback(&self) -> &Scrollback { &self.scrollback }

    #[must_use]
    pub fn scroll_region(&self) -> (usize, usize) { (self.live().scroll_top, self.live().scroll_bottom) }

    #[must_use]
    pub fn is_on_alternate(&self) -> bool { self.on_alternate }

    #[must_use]
    pub fn cell_at(&self, row: usize, col: usize) -> &Cell { self.live().cell(row, col) }

    fn live(&self) -> &Screen {
        if self.on_alternate {
            self.alternate.as_ref().expect("alternate screen active without being allocated")
        } else {
            &self.primary
        }
    }

    fn live_mut(&mut self) -> &mut Screen {
        if self.on_alternate {
            self.alternate.as_mut().expect("alternate screen active without being allocated")
        } else {
            &mut self.primary
        }
    }

    /// Writes one printable codepoint at the cursor, per the `put()`
    /// contract: pending-wrap is resolved first, wide glyphs never straddle
    /// the right edge, and writing past the last column arms pending-wrap
    /// rather than moving the cursor immediately.
    pub fn put(&mut self, cp: char) {
        let w = width(cp);
        if self.live().pending_wrap {
            self.do_wrap();
        }
        let screen = self.live_mut();
        let cols = screen.cols;
        if w == 2 && screen.cursor_x.as_usize() == cols.saturating_sub(1) {
            let attr = screen.current_attr;
            let (x, y) = (screen.cursor_x.as_usize(), screen.cursor_y.as_usize());
            *screen.cell_mut(y, x) = Cell::blank(attr);
            self.do_wrap();
        }
        let screen = self.live_mut();
        let (x, y) = (screen.cursor_x.as_usize(), screen.cursor_y.as_usize());
        let attr = screen.current_attr;
        *screen.cell_mut(y, x) = Cell::Glyph { ch: cp, width: w, attr };
        if w == 2 {
            *screen.cell_mut(y, x + 1) = Cell::Continuation(attr);
        }
        let new_x = x + w as usize;
        if new_x >= screen.cols {
            screen.cursor_x = ColIndex::new(screen.cols);
            screen.pending_wrap = true;
        } else {
            screen.cursor_x = ColIndex::new(new_x);
        }
    }

    fn do_wrap(&mut self) {
        let screen = self.live_mut();
        screen.cursor_x = ColIndex::new(0);
        screen.pending_wrap = false;
        self.newline_no_cr();
    }

    /// Advances to the next row, scrolling the region if needed. Does not
    /// touch `cursor_x` — callers that want CR+LF semantics clear it
    /// separately (see [`Self::carriage_return`]). Per `spec.md` §4.3: always
    /// increments first, then scrolls and clamps back to `scroll_bottom` only
    /// if the increment overflowed the region — absolute addressing can park
    /// the cursor outside `[scroll_top, scroll_bottom]` and this still pulls
    /// it back in on the next newline, rather than scrolling forever without
    /// ever advancing.
    fn newline_no_cr(&mut self) {
        let screen = self.live_mut();
        screen.cursor_y += 1;
        let y = screen.cursor_y.as_usize();
        let scroll_bottom = screen.scroll_bottom;
        if y > scroll_bottom {
            let on_primary = !self.on_alternate;
            let scroll_top_is_zero = self.live().scroll_top == 0;
            let ScrolledOut { lines } = self.live_mut().scroll_up(1);
            if on_primary && scroll_top_is_zero {
                for line in lines {
                    self.scrollback.push(line);
                }
            }
            self.live_mut().cursor_y = RowIndex::new(scroll_bottom);
        }
    }

    pub fn newline(&mut self) { self.newline_no_cr(); }

    pub fn carriage_return(&mut self) {
        let screen = self.live_mut();
        screen.cursor_x = ColIndex::new(0);
        screen.pending_wrap = false;
    }

    pub fn backspace(&mut self) {
        let screen = self.live_mut();
        if screen.cursor_x.as_usize() > 0 {
            screen.cursor_x -= 1;
        }
        screen.pending_wrap = false;
    }

    pub fn tab(&mut self) {
        let screen = self.live_mut();
        let next = (screen.cursor_x.as_usize() / 8 + 1) * 8;
        screen.cursor_x = ColIndex::new(next.min(screen.cols.saturating_sub(1)));
    }

    pub fn scroll_up(&mut self, n: usize) {
        let on_primary = !self.on_alternate;
        let scroll_top_is_zero = self.live().scroll_top == 0;
        let ScrolledOut { lines } = self.live_mut().scroll_up(n);
        if on_primary && scroll_top_is_zero {
            for line in lines {
                self.scrollback.push(line);
            }
        }
    }

    pub fn scroll_down(&mut self, n: usize) { self.live_mut().scroll_down(n); }

    pub fn insert_line(&mut self, n: usize) { self.live_mut().insert_line(n); }

    pub fn delete_line(&mut self, n: usize) { self.live_mut().delete_line(n); }

    pub fn insert_char(&mut self, n: usize) { self.live_mut().insert_char(n); }

    pub fn delete_char(&mut self, n: usize) { self.live_mut().delete_char(n); }

    pub fn erase_in_line(&mut self, mode: u16) { self.live_mut().erase_in_line(mode); }

    /// Returns whether scrollback should also be cleared (mode 3).
    pub fn erase_in_display(&mut self, mode: u16) -> bool {
        let clear_scrollback = self.live_mut().erase_in_display(mode);
        if clear_scrollback {
            self.scrollback.clear();
        }
        clear_scrollback
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) { self.live_mut().set_cursor(x, y); }

    pub fn move_cursor_rel(&mut self, dx: i32, dy: i32) {
        let screen = self.live();
        let x = (screen.cursor_x.as_usize() as i32 + dx).clamp(0, screen.cols as i32 - 1);
        let y = (screen.cursor_y.as_usize() as i32 + dy).clamp(0, screen.rows as i32 - 1);
        self.set_cursor(x as usize, y as usize);
    }

    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let screen = self.live_mut();
        let top = top.min(screen.rows.saturating_sub(1));
        let bottom = bottom.min(screen.rows.saturating_sub(1));
        let (top, bottom) = if top <= bottom { (top, bottom) } else { (bottom, top) };
        screen.scroll_top = top;
        screen.scroll_bottom = bottom;
        screen.set_cursor(0, 0);
    }

    pub fn save_cursor(&mut self) {
        let screen = self.live_mut();
        screen.saved_cursor =
            Some(SavedCursor { x: screen.cursor_x, y: screen.cursor_y, attr: screen.current_attr });
    }

    pub fn restore_cursor(&mut self) {
        let screen = self.live_mut();
        if let Some(saved) = screen.saved_cursor {
            screen.cursor_x = saved.x;
            screen.cursor_y = saved.y;
            screen.current_attr = saved.attr;
            screen.pending_wrap = false;
        }
    }

    pub fn set_current_attr(&mut self, attr: CellAttr) { self.live_mut().current_attr = attr; }

    pub fn set_cursor_visible(&mut self, visible: bool) { self.live_mut().cursor_visible = visible; }

    pub fn set_auto_wrap(&mut self, on: bool) { self.live_mut().auto_wrap = on; }

    #[must_use]
    pub fn auto_wrap(&self) -> bool { self.live().auto_wrap }

    /// `CSI ? 47h` / `1047h`: switch to alternate, no cursor save.
    pub fn enter_alternate_no_save(&mut self) {
        let (rows, cols) = (self.primary.rows, self.primary.cols);
        if self.alternate.is_none() {
            self.alternate = Some(Screen::new(rows, cols));
        }
        self.on_alternate = true;
    }

    /// `CSI ? 47l` / `1047l`: switch to primary, no cursor restore.
    pub fn leave_alternate_no_restore(&mut self) { self.on_alternate = false; }

    /// `CSI ? 1049h`: save cursor+attr, switch to alt, clear alt.
    pub fn enter_alternate_with_save(&mut self) {
        self.save_cursor();
        let (rows, cols) = (self.primary.rows, self.primary.cols);
        self.alternate = Some(Screen::new(rows, cols));
        self.on_alternate = true;
    }

    /// `CSI ? 1049l`: switch to primary, restore cursor+attr.
    pub fn leave_alternate_with_restore(&mut self) {
        self.on_alternate = false;
        self.restore_cursor();
    }

    pub fn resize(&mut self, new_rows: usize, new_cols: usize) {
        self.primary.resize(new_rows, new_cols);
        if let Some(alt) = self.alternate.as_mut() {
            alt.resize(new_rows, new_cols);
        }
        self.scroll_offset = 0;
    }

    // --- Scrollback view --------------------------------------------------

    #[must_use]
    pub fn scroll_offset(&self) -> usize { self.scroll_offset }

    /// Moves the scrollback view by `delta` lines (positive = further back in
    /// history), clamped to `[0, scrollback.len()]`. A no-op while the
    /// alternate screen is live — full-screen applications own their own
    /// redraw and xterm disables scrollback browsing there too.
    pub fn scroll_by(&mut self, delta: isize) {
        if self.on_alternate {
            return;
        }
        let max = self.scrollback.len() as isize;
        let next = (self.scroll_offset as isize + delta).clamp(0, max);
        self.scroll_offset = next as usize;
    }

    /// One row of the current visible-space view (row 0 = top of screen),
    /// accounting for `scroll_offset`. Composed from scrollback lines above
    /// the live grid when scrolled back; always the live grid verbatim on
    /// the alternate screen.
    #[must_use]
    pub fn visible_line(&self, visible_row: usize) -> Vec<Cell> {
        let screen = self.live();
        if self.on_alternate || self.scroll_offset == 0 {
            return (0..screen.cols).map(|c| screen.cell(visible_row, c).clone()).collect();
        }
        let sb_len = self.scrollback.len();
        let total = sb_len + screen.rows;
        let window_end = total.saturating_sub(1 + self.scroll_offset.min(sb_len));
        let window_start = window_end + 1 - screen.rows.min(window_end + 1);
        let global = window_start + visible_row;
        if global < sb_len {
            self.scrollback.get_from_top(sb_len - 1 - global).map(|l| l.cells.clone()).unwrap_or_default()
        } else {
            let row = global - sb_len;
            (0..screen.cols).map(|c| screen.cell(row, c).clone()).collect()
        }
    }

    #[must_use]
    pub fn visible_rows(&self) -> usize { self.live().rows }

    #[must_use]
    pub fn visible_cols(&self) -> usize { self.live().cols }

    // --- Selection ----------------------------------------------------

    #[must_use]
    pub fn selection(&self) -> &Selection { &self.selection }

    pub fn selection_start(&mut self, pos: Pos) { self.selection.start(pos); }

    pub fn selection_update(&mut self, pos: Pos) {
        self.selection.update(pos);
        self.snap_selection_head();
    }

    pub fn selection_end(&mut self, pos: Pos) {
        self.selection.end(pos);
        self.snap_selection_head();
    }

    pub fn selection_clear(&mut self) { self.selection.clear(); }

    fn snap_selection_head(&mut self) {
        let head = self.selection.head;
        let cols = self.visible_cols();
        if head.col.as_usize() >= cols {
            return;
        }
        let is_continuation = self.visible_line(head.row.as_usize()).get(head.col.as_usize()).is_some_and(Cell::is_continuation);
        self.selection.snap_head_off_continuation(is_continuation);
    }

    /// Extracts the selected text as UTF-8, walking visible-space rows in
    /// reading order and joining them with `\n`. Continuation cells are
    /// skipped; trailing spaces on a row are kept as-is (`spec.md` §4.3).
    #[must_use]
    pub fn get_selected_text(&self) -> String {
        if !self.selection.active {
            return String::new();
        }
        let (start, end) = self.selection.normalized();
        let mut out = String::new();
        for row in start.row.as_usize()..=end.row.as_usize() {
            let line = self.visible_line(row);
            let from = if row == start.row.as_usize() { start.col.as_usize() } else { 0 };
            let to = if row == end.row.as_usize() { end.col.as_usize() + 1 } else { line.len() };
            for cell in &line[from.min(line.len())..to.min(line.len())] {
                if cell.is_continuation() {
                    continue;
                }
                out.push(cell.display_char());
            }
            if row != end.row.as_usize() {
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> Grid { Grid::new(Size::new(rows, cols), 1000) }

    #[test]
    fn plain_text_and_wrap_scenario() {
        let mut g = grid(24, 80);
        for _ in 0..81 {
            g.put('A');
        }
        g.carriage_return();
        g.newline();
        assert_eq!(g.cell_at(0, 79).display_char(), 'A');
        assert_eq!(g.cell_at(1, 0).display_char(), 'A');
        assert_eq!(g.cell_at(1, 1).display_char(), ' ');
        let (x, y) = g.cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (0, 2));
    }

    #[test]
    fn wide_char_at_right_edge_scenario() {
        let mut g = grid(24, 80);
        g.set_cursor(79, 0);
        g.put('\u{3042}');
        assert_eq!(g.cell_at(0, 79).display_char(), ' ');
        match g.cell_at(1, 0) {
            Cell::Glyph { ch, width, .. } => {
                assert_eq!(*ch, '\u{3042}');
                assert_eq!(*width, 2);
            }
            other => panic!("expected glyph, got {other:?}"),
        }
        assert!(g.cell_at(1, 1).is_continuation());
        let (x, y) = g.cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (2, 1));
    }

    #[test]
    fn decstbm_plus_lf_scenario() {
        let mut g = grid(24, 80);
        g.set_scroll_region(1, 4); // rows 2..5 1-based -> 1..4 0-based
        g.set_cursor(0, 4);
        g.put('X'); // tag row 4 before scrolling
        g.set_cursor(0, 4);
        for _ in 0..4 {
            g.newline();
        }
        let (x, y) = g.cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (0, 4));
    }

    #[test]
    fn cup_plus_ed_scenario() {
        let mut g = grid(24, 80);
        for ch in "ABC".chars() {
            g.put(ch);
        }
        g.carriage_return();
        g.newline();
        for ch in "DEF".chars() {
            g.put(ch);
        }
        g.set_cursor(0, 0);
        g.erase_in_display(0);
        assert_eq!(g.cell_at(0, 0).display_char(), ' ');
        assert_eq!(g.cell_at(1, 2).display_char(), ' ');
    }

    #[test]
    fn alternate_1049_round_trip_scenario() {
        let mut g = grid(24, 80);
        for ch in "hello".chars() {
            g.put(ch);
        }
        g.enter_alternate_with_save();
        for ch in "XXX".chars() {
            g.put(ch);
        }
        g.leave_alternate_with_restore();
        assert_eq!(g.cell_at(0, 0).display_char(), 'h');
        let (x, y) = g.cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (5, 0));
        assert!(!g.is_on_alternate());
    }

    #[test]
    fn scroll_up_feeds_scrollback_only_from_region_top_zero() {
        let mut g = grid(3, 10);
        for row in 0..4 {
            g.set_cursor(0, 2);
            for ch in format!("row{row}").chars() {
                g.put(ch);
            }
            g.carriage_return();
            g.newline();
        }
        assert!(g.scrollback().len() >= 1);
    }

    #[test]
    fn esc_save_restore_cursor_law() {
        let mut g = grid(24, 80);
        g.set_cursor(10, 5);
        g.save_cursor();
        g.set_cursor(0, 0);
        g.restore_cursor();
        let (x, y) = g.cursor();
        assert_eq!((x.as_usize(), y.as_usize()), (10, 5));
    }

    #[test]
    fn resize_preserves_top_left() {
        let mut g = grid(24, 80);
        g.put('Z');
        g.resize(10, 40);
        assert_eq!(g.cell_at(0, 0).display_char(), 'Z');
        assert_eq!(g.rows(), 10);
        assert_eq!(g.cols(), 40);
    }

    #[test]
    fn erase_display_mode_three_clears_scrollback() {
        let mut g = grid(3, 10);
        for _ in 0..5 {
            g.newline();
        }
        assert!(!g.scrollback().is_empty());
        g.erase_in_display(3);
        assert!(g.scrollback().is_empty());
    }

    #[test]
    fn scroll_by_reveals_scrollback_lines() {
        let mut g = grid(3, 10);
        for row in 0..6 {
            for ch in format!("r{row}").chars() {
                g.put(ch);
            }
            g.carriage_return();
            g.newline();
        }
        assert_eq!(g.scroll_offset(), 0);
        g.scroll_by(1);
        assert_eq!(g.scroll_offset(), 1);
        let top = g.visible_line(0);
        assert_ne!(top[0].display_char(), ' ');
        g.scroll_by(-100);
        assert_eq!(g.scroll_offset(), 0);
    }

    #[test]
    fn scroll_by_clamps_to_scrollback_len() {
        let mut g = grid(3, 10);
        for _ in 0..2 {
            g.newline();
        }
        g.scroll_by(1000);
        assert_eq!(g.scroll_offset(), g.scrollback().len());
    }

    #[test]
    fn get_selected_text_single_row() {
        use crate::units::{col, row};
        let mut g = grid(5, 10);
        for ch in "hello".chars() {
            g.put(ch);
        }
        g.selection_start(Pos::new(row(0), col(0)));
        g.selection_update(Pos::new(row(0), col(4)));
        assert_eq!(g.get_selected_text(), "hello");
    }

    #[test]
    fn get_selected_text_spans_rows_with_newline() {
        use crate::units::{col, row};
        let mut g = grid(5, 10);
        for ch in "ab".chars() {
            g.put(ch);
        }
        g.carriage_return();
        g.newline();
        for ch in "cd".chars() {
            g.put(ch);
        }
        g.selection_start(Pos::new(row(0), col(0)));
        g.selection_update(Pos::new(row(1), col(1)));
        let text = g.get_selected_text();
        assert!(text.starts_with("ab"));
        assert!(text.ends_with("cd"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn selection_head_snaps_off_continuation_cell() {
        use crate::units::{col, row};
        let mut g = grid(5, 10);
        g.put('\u{3042}'); // wide glyph at columns 0-1
        g.selection_start(Pos::new(row(0), col(0)));
        g.selection_update(Pos::new(row(0), col(1)));
        assert_eq!(g.selection().head, Pos::new(row(0), col(0)));
    }
}
