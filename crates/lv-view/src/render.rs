//! Renderer: document + viewport to one terminal frame.
//!
//! Rendering happens in two steps. [`layout`] decides, row by row, what
//! each screen row shows: a document line, a filler `~`, or the filler
//! row that carries the welcome banner. [`render_frame`] then encodes those
//! rows into an [`OutputBuffer`] with the surrounding cursor control:
//!
//! ```text
//! ESC[?25l  ESC[H                        hide cursor, home
//! ESC[K <row 0>  \r\n                    one per screen row,
//! ESC[K <row 1>  \r\n                    no delimiter after the last
//! ...
//! ESC[K <row n-1>
//! ESC[y;xH  ESC[?25h                     place and show cursor
//! ```
//!
//! The banner is placed by row index, never by scanning bytes already
//! written, so document content can't shift it.
//!
//! Rendering is a pure function of document and viewport: the same state
//! always yields the same bytes.

use lv_term::output::OutputBuffer;

use crate::document::Document;
use crate::viewport::Viewport;

/// Shown centered a third of the way down when there is nothing to view.
pub const WELCOME: &str = concat!("lessvim -- Version ", env!("CARGO_PKG_VERSION"));

/// Marks screen rows past the end of the document.
const FILLER: u8 = b'~';

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// What one screen row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    /// Document bytes, already clipped to the screen width.
    Text(&'a [u8]),
    /// A `~` past the end of the document.
    Filler,
    /// A `~`, `padding` spaces, then the (clipped) banner text.
    Banner { padding: usize, text: &'a [u8] },
}

/// Screen row that carries the welcome banner.
#[inline]
#[must_use]
pub const fn banner_row(rows: u16) -> u16 {
    rows / 3
}

/// The banner row for a screen `cols` wide.
///
/// Padding is `(cols - len) / 2 - 1`, floored at zero; the text is clipped
/// so `~` + padding + text never exceeds `cols`.
#[must_use]
pub fn banner(cols: u16) -> Row<'static> {
    let cols = usize::from(cols);
    let msg = WELCOME.as_bytes();
    let padding = (cols.saturating_sub(msg.len()) / 2).saturating_sub(1);
    let room = cols.saturating_sub(1 + padding);
    Row::Banner {
        padding,
        text: &msg[..msg.len().min(room)],
    }
}

/// Decide the content of every screen row, top to bottom.
#[must_use]
pub fn layout<'a>(doc: &'a Document, viewport: &Viewport) -> Vec<Row<'a>> {
    let size = viewport.size();
    let cols = usize::from(size.cols);
    let welcome_at = doc.is_empty().then_some(banner_row(size.rows));

    (0..size.rows)
        .map(|y| {
            if let Some(line) = doc.line(viewport.line_at_row(y)) {
                Row::Text(&line[..line.len().min(cols)])
            } else if welcome_at == Some(y) {
                banner(size.cols)
            } else {
                Row::Filler
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn encode_row(row: Row<'_>, out: &mut OutputBuffer) {
    out.clear_line();
    match row {
        Row::Text(bytes) => out.push_bytes(bytes),
        Row::Filler => out.push_bytes(&[FILLER]),
        Row::Banner { padding, text } => {
            out.push_bytes(&[FILLER]);
            out.push_repeated(b' ', padding);
            out.push_bytes(text);
        }
    }
}

/// Compose a complete frame for `doc` as seen through `viewport`.
pub fn render_frame(doc: &Document, viewport: &Viewport, out: &mut OutputBuffer) {
    out.cursor_hide();
    out.cursor_home();

    for (i, row) in layout(doc, viewport).into_iter().enumerate() {
        if i > 0 {
            out.push_bytes(b"\r\n");
        }
        encode_row(row, out);
    }

    let cursor = viewport.cursor();
    out.cursor_to(cursor.x, cursor.y);
    out.cursor_show();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
