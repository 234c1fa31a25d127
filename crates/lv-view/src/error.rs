//! Viewer errors.
//!
//! Terminal failures come up from `lv-term` unchanged; the only failure
//! the viewer adds is not being able to read the document.

use std::io;
use std::path::PathBuf;

use lv_term::TermError;
use thiserror::Error;

/// Anything that ends a viewing session early.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The document source is missing or unreadable.
    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The terminal failed underneath us.
    #[error(transparent)]
    Term(#[from] TermError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_error_names_path() {
        let err = ViewError::File {
            path: PathBuf::from("/tmp/missing.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to read /tmp/missing.txt: "), "{msg}");
    }

    #[test]
    fn term_error_is_transparent() {
        let err: ViewError = TermError::Parse("x".into()).into();
        assert_eq!(err.to_string(), "malformed cursor position reply: x");
    }
}
