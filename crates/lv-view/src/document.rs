//! Document: the lines being viewed.
//!
//! A `Document` is an ordered list of byte lines, built once from a line
//! source and never modified afterwards. Lines are raw bytes: nothing here
//! decodes UTF-8, and the renderer clips by byte count.
//!
//! Line endings are stripped on the way in. Any run of trailing `\n` and
//! `\r` bytes is removed, so LF and CRLF files read the same. A final
//! newline does not produce an extra empty line, and an empty file is a
//! document with no lines at all.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::ViewError;

/// An immutable, ordered sequence of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Vec<u8>>,
}

impl Document {
    /// A document with no lines.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document from already-split lines.
    ///
    /// Trailing line-ending bytes on each line are stripped.
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| strip_line_ending(l.as_ref()).to_vec())
                .collect(),
        }
    }

    /// Read every line from `reader`.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying reader.
    pub fn from_reader(mut reader: impl BufRead) -> io::Result<Self> {
        let mut lines = Vec::new();
        let mut line = Vec::new();
        while reader.read_until(b'\n', &mut line)? > 0 {
            lines.push(strip_line_ending(&line).to_vec());
            line.clear();
        }
        Ok(Self { lines })
    }

    /// Load the file at `path`.
    ///
    /// # Errors
    ///
    /// [`ViewError::File`] if the file cannot be opened or read.
    pub fn open(path: &Path) -> Result<Self, ViewError> {
        let file_err = |source| ViewError::File {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(file_err)?;
        let doc = Self::from_reader(BufReader::new(file)).map_err(file_err)?;

        debug!(path = %path.display(), lines = doc.line_count(), "document loaded");
        Ok(doc)
    }

    /// Number of lines.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no lines.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The bytes of line `idx`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn line(&self, idx: usize) -> Option<&[u8]> {
        self.lines.get(idx).map(Vec::as_slice)
    }
}

/// Drop every trailing `\n` / `\r` byte.
fn strip_line_ending(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }
    line
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
