//! Viewport: cursor position and vertical scroll.
//!
//! The viewport is the `rows × cols` window onto the document. It owns two
//! pieces of state:
//!
//! - **Cursor** - a screen cell, always inside the window:
//!   `0 ≤ x < cols` and `0 ≤ y < rows`. Both bounds are strict everywhere.
//! - **Offset** - the document line shown on screen row 0, always in
//!   `0..=max(0, line_count - rows)`.
//!
//! # Scrolling
//!
//! Scrolling is edge-triggered and moves one line at a time. A cursor move
//! is computed in signed space first; if it would leave the window through
//! the bottom (or top) edge, the offset steps by one line in that direction
//! (when the invariant allows), and only then is the cursor clamped back
//! into the window. Holding `j` on the last screen row therefore scrolls
//! the document one line per key.

use lv_term::terminal::Size;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// A 0-indexed screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

/// A cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// Jump to column 0.
    LineStart,
    /// Jump to the last column.
    LineEnd,
}

/// Clamp one signed coordinate into `0..len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_axis(v: i64, len: u16) -> u16 {
    // Result is in 0..=u16::MAX - 1, so the cast is exact.
    v.min(i64::from(len) - 1).max(0) as u16
}

/// Clamp a signed candidate position into the window.
#[must_use]
pub fn clamp_cursor(x: i64, y: i64, size: Size) -> Cursor {
    Cursor {
        x: clamp_axis(x, size.cols),
        y: clamp_axis(y, size.rows),
    }
}

/// Largest legal scroll offset: `max(0, line_count - rows)`.
#[inline]
#[must_use]
pub fn max_offset(line_count: usize, rows: u16) -> usize {
    line_count.saturating_sub(usize::from(rows))
}

/// One edge-triggered scroll step for a candidate cursor row.
///
/// A row past the bottom edge scrolls down one line, a row above the top
/// edge scrolls up one line, anything else leaves the offset alone. The
/// offset never leaves `0..=max_offset`.
#[must_use]
pub fn scroll(cursor_y: i64, offset: usize, line_count: usize, rows: u16) -> usize {
    if cursor_y >= i64::from(rows) && offset < max_offset(line_count, rows) {
        offset + 1
    } else if cursor_y < 0 && offset > 0 {
        offset - 1
    } else {
        offset
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Cursor and scroll state for one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    size: Size,
    cursor: Cursor,
    offset: usize,
}

impl Viewport {
    /// A viewport at the top of the document with the cursor at `(0, 0)`.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            cursor: Cursor { x: 0, y: 0 },
            offset: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Index of the document line on screen row 0.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Document line index shown on screen row `y`.
    #[inline]
    #[must_use]
    pub const fn line_at_row(&self, y: u16) -> usize {
        self.offset + y as usize
    }

    // -- Movement -----------------------------------------------------------

    /// Move the cursor, scrolling by at most one line if it hits an edge.
    pub fn move_cursor(&mut self, motion: Motion, line_count: usize) {
        let mut x = i64::from(self.cursor.x);
        let mut y = i64::from(self.cursor.y);

        match motion {
            Motion::Left => x -= 1,
            Motion::Right => x += 1,
            Motion::Up => y -= 1,
            Motion::Down => y += 1,
            Motion::LineStart => x = 0,
            Motion::LineEnd => x = i64::from(self.size.cols) - 1,
        }

        self.offset = scroll(y, self.offset, line_count, self.size.rows);
        self.cursor = clamp_cursor(x, y, self.size);
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll the view down one line without moving the cursor.
    ///
    /// Returns `false` if already at the last legal offset.
    pub fn scroll_down(&mut self, line_count: usize) -> bool {
        if self.offset < max_offset(line_count, self.size.rows) {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    /// Scroll the view up one line without moving the cursor.
    ///
    /// Returns `false` if already at the top.
    pub fn scroll_up(&mut self) -> bool {
        if self.offset > 0 {
            self.offset -= 1;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIZE: Size = Size { cols: 80, rows: 24 };

    fn assert_invariants(vp: &Viewport, line_count: usize) {
        let Size { cols, rows } = vp.size();
        assert!(vp.cursor().x < cols, "x {} out of 0..{cols}", vp.cursor().x);
        assert!(vp.cursor().y < rows, "y {} out of 0..{rows}", vp.cursor().y);
        assert!(
            vp.offset() <= max_offset(line_count, rows),
            "offset {} > max {}",
            vp.offset(),
            max_offset(line_count, rows)
        );
    }

    // -- clamp_cursor -------------------------------------------------------

    #[test]
    fn clamp_inside_is_identity() {
        assert_eq!(clamp_cursor(5, 7, SIZE), Cursor { x: 5, y: 7 });
    }

    #[test]
    fn clamp_negative_to_zero() {
        assert_eq!(clamp_cursor(-1, -3, SIZE), Cursor { x: 0, y: 0 });
    }

    #[test]
    fn clamp_past_edge_to_last_cell() {
        assert_eq!(clamp_cursor(80, 24, SIZE), Cursor { x: 79, y: 23 });
        assert_eq!(clamp_cursor(i64::MAX, i64::MAX, SIZE), Cursor { x: 79, y: 23 });
    }

    #[test]
    fn clamp_single_cell_screen() {
        let size = Size { cols: 1, rows: 1 };
        assert_eq!(clamp_cursor(3, -3, size), Cursor { x: 0, y: 0 });
    }

    // -- max_offset / scroll ------------------------------------------------

    #[test]
    fn max_offset_short_document_is_zero() {
        assert_eq!(max_offset(0, 24), 0);
        assert_eq!(max_offset(24, 24), 0);
    }

    #[test]
    fn max_offset_long_document() {
        assert_eq!(max_offset(100, 24), 76);
    }

    #[test]
    fn scroll_down_past_bottom_edge() {
        assert_eq!(scroll(24, 0, 100, 24), 1);
    }

    #[test]
    fn scroll_down_stops_at_max() {
        assert_eq!(scroll(24, 76, 100, 24), 76);
    }

    #[test]
    fn scroll_down_short_document_never_scrolls() {
        assert_eq!(scroll(24, 0, 10, 24), 0);
    }

    #[test]
    fn scroll_up_past_top_edge() {
        assert_eq!(scroll(-1, 5, 100, 24), 4);
    }

    #[test]
    fn scroll_up_stops_at_zero() {
        assert_eq!(scroll(-1, 0, 100, 24), 0);
    }

    #[test]
    fn scroll_inside_window_is_noop() {
        assert_eq!(scroll(0, 5, 100, 24), 5);
        assert_eq!(scroll(23, 5, 100, 24), 5);
    }

    // -- move_cursor --------------------------------------------------------

    #[test]
    fn new_viewport_at_origin() {
        let vp = Viewport::new(SIZE);
        assert_eq!(vp.cursor(), Cursor::default());
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn basic_moves() {
        let mut vp = Viewport::new(SIZE);
        vp.move_cursor(Motion::Right, 100);
        vp.move_cursor(Motion::Right, 100);
        vp.move_cursor(Motion::Down, 100);
        assert_eq!(vp.cursor(), Cursor { x: 2, y: 1 });
        vp.move_cursor(Motion::Left, 100);
        vp.move_cursor(Motion::Up, 100);
        assert_eq!(vp.cursor(), Cursor { x: 1, y: 0 });
    }

    #[test]
    fn left_at_column_zero_stays() {
        let mut vp = Viewport::new(SIZE);
        vp.move_cursor(Motion::Left, 100);
        assert_eq!(vp.cursor(), Cursor { x: 0, y: 0 });
    }

    #[test]
    fn right_at_last_column_stays() {
        let mut vp = Viewport::new(SIZE);
        vp.move_cursor(Motion::LineEnd, 100);
        vp.move_cursor(Motion::Right, 100);
        assert_eq!(vp.cursor().x, 79);
    }

    #[test]
    fn line_start_and_end() {
        let mut vp = Viewport::new(SIZE);
        vp.move_cursor(Motion::LineEnd, 0);
        assert_eq!(vp.cursor().x, 79);
        vp.move_cursor(Motion::LineStart, 0);
        assert_eq!(vp.cursor().x, 0);
    }

    #[test]
    fn down_at_bottom_row_scrolls_one_line() {
        let mut vp = Viewport::new(SIZE);
        for _ in 0..23 {
            vp.move_cursor(Motion::Down, 100);
        }
        assert_eq!(vp.cursor().y, 23);
        assert_eq!(vp.offset(), 0);

        vp.move_cursor(Motion::Down, 100);
        assert_eq!(vp.cursor().y, 23);
        assert_eq!(vp.offset(), 1);
        assert_eq!(vp.line_at_row(23), 24);
    }

    #[test]
    fn up_at_top_row_scrolls_back() {
        let mut vp = Viewport::new(SIZE);
        for _ in 0..30 {
            vp.move_cursor(Motion::Down, 100);
        }
        assert_eq!(vp.offset(), 7);
        for _ in 0..23 {
            vp.move_cursor(Motion::Up, 100);
        }
        assert_eq!(vp.cursor().y, 0);
        assert_eq!(vp.offset(), 7);
        vp.move_cursor(Motion::Up, 100);
        assert_eq!(vp.offset(), 6);
    }

    #[test]
    fn down_stops_scrolling_at_end_of_document() {
        let mut vp = Viewport::new(SIZE);
        for _ in 0..500 {
            vp.move_cursor(Motion::Down, 30);
        }
        assert_eq!(vp.offset(), 6);
        assert_eq!(vp.cursor().y, 23);
        assert_eq!(vp.line_at_row(23), 29);
    }

    #[test]
    fn empty_document_never_scrolls() {
        let mut vp = Viewport::new(SIZE);
        for _ in 0..50 {
            vp.move_cursor(Motion::Down, 0);
        }
        assert_eq!(vp.offset(), 0);
        assert_eq!(vp.cursor().y, 23);
    }

    // -- scroll_down / scroll_up --------------------------------------------

    #[test]
    fn manual_scroll_bounded() {
        let mut vp = Viewport::new(Size { cols: 10, rows: 5 });
        assert!(!vp.scroll_up());
        assert!(vp.scroll_down(7));
        assert!(vp.scroll_down(7));
        assert!(!vp.scroll_down(7));
        assert_eq!(vp.offset(), 2);
        assert!(vp.scroll_up());
        assert_eq!(vp.offset(), 1);
    }

    #[test]
    fn manual_scroll_keeps_cursor() {
        let mut vp = Viewport::new(Size { cols: 10, rows: 5 });
        vp.move_cursor(Motion::Down, 50);
        vp.scroll_down(50);
        assert_eq!(vp.cursor(), Cursor { x: 0, y: 1 });
    }

    // -- Invariants over many paths -----------------------------------------

    #[test]
    fn invariants_hold_over_all_short_motion_sequences() {
        const MOTIONS: [Motion; 6] = [
            Motion::Left,
            Motion::Right,
            Motion::Up,
            Motion::Down,
            Motion::LineStart,
            Motion::LineEnd,
        ];
        let sizes = [
            Size { cols: 1, rows: 1 },
            Size { cols: 3, rows: 2 },
            Size { cols: 80, rows: 24 },
        ];

        for size in sizes {
            for line_count in [0, 1, 2, 5, 100] {
                // Every sequence of 5 motions: 6^5 paths.
                for mut code in 0..6usize.pow(5) {
                    let mut vp = Viewport::new(size);
                    for _ in 0..5 {
                        vp.move_cursor(MOTIONS[code % 6], line_count);
                        assert_invariants(&vp, line_count);
                        code /= 6;
                    }
                }
            }
        }
    }

    #[test]
    fn invariants_hold_over_long_walk() {
        let size = Size { cols: 7, rows: 4 };
        let line_count = 12;
        let mut vp = Viewport::new(size);
        // A fixed pseudo-random walk biased towards vertical moves.
        let mut seed: u32 = 0x2545_F491;
        for _ in 0..10_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let motion = match seed % 8 {
                0 => Motion::Left,
                1 => Motion::Right,
                2 | 3 => Motion::Up,
                4 | 5 => Motion::Down,
                6 => Motion::LineStart,
                _ => Motion::LineEnd,
            };
            vp.move_cursor(motion, line_count);
            if seed % 11 == 0 {
                vp.scroll_down(line_count);
            }
            if seed % 13 == 0 {
                vp.scroll_up();
            }
            assert_invariants(&vp, line_count);
        }
    }
}
