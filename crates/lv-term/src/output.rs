// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// A redraw is composed entirely in memory and handed to the terminal in a
// single write. The terminal never sees half a frame, so there is no
// visible tearing while rows are being cleared and repainted.

use std::io::{self, Write};

use crate::ansi;

/// A byte buffer that accumulates one frame of output.
///
/// Everything a redraw produces (cursor hide, row clears, text, cursor
/// placement) goes in here first; [`flush_to`](Self::flush_to) then writes
/// it all at once and empties the buffer for the next frame.
///
/// Default capacity: 8 KB, roughly a full 80×50 screen of text plus escapes.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 8_192;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes verbatim.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append `n` copies of `byte`.
    #[inline]
    pub fn push_repeated(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Hide the cursor while the frame is painted.
    pub fn cursor_hide(&mut self) {
        // Writing into a Vec cannot fail.
        let _ = ansi::cursor_hide(&mut self.buf);
    }

    /// Show the cursor once the frame is painted.
    pub fn cursor_show(&mut self) {
        let _ = ansi::cursor_show(&mut self.buf);
    }

    /// Move the cursor to the top-left corner.
    pub fn cursor_home(&mut self) {
        let _ = ansi::cursor_home(&mut self.buf);
    }

    /// Move the cursor to the 0-indexed cell `(x, y)`.
    pub fn cursor_to(&mut self, x: u16, y: u16) {
        let _ = ansi::cursor_to(&mut self.buf, x, y);
    }

    /// Erase from the cursor to the end of the current line.
    pub fn clear_line(&mut self) {
        let _ = ansi::clear_line(&mut self.buf);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w` in one call and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails. The buffer is
    /// left untouched in that case; a failed frame is not retried.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens in flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
