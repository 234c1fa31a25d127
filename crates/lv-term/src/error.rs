// SPDX-License-Identifier: MIT
//
// Terminal error taxonomy.
//
// Everything that can go wrong between us and the tty falls into one of
// three buckets. None of them are retried: the caller restores the
// terminal, reports the message, and exits with status 1. The one
// recoverable condition, a read that would block, never becomes an error
// at all; the read primitive reports it as "no byte yet".

use std::io;

use thiserror::Error;

/// Failure talking to the terminal.
#[derive(Debug, Error)]
pub enum TermError {
    /// Terminal attributes could not be read or written, or the window
    /// size could not be determined.
    #[error("{context}: {source}")]
    Setup {
        /// What we were trying to do when it failed.
        context: &'static str,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A read or write on the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The terminal answered a cursor-position query with garbage.
    #[error("malformed cursor position reply: {0}")]
    Parse(String),
}

impl TermError {
    /// Wrap the current `errno` as a setup failure.
    #[must_use]
    pub fn setup(context: &'static str) -> Self {
        Self::Setup {
            context,
            source: io::Error::last_os_error(),
        }
    }
}

/// Shorthand for results in this crate.
pub type Result<T> = std::result::Result<T, TermError>;

// ─── Tests ───────────────────────────────────────────────────────────────────
