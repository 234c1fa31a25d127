// SPDX-License-Identifier: MIT
//
// lv-term: Terminal engine for lessvim.
//
// Everything between the viewer and the tty: raw mode with guaranteed
// restoration, a bounded single-byte reader, an escape-sequence key
// decoder, ANSI sequence writers, and a frame buffer that reaches the
// terminal in one write. No TUI framework sits in between; every byte
// sent to the terminal is accounted for.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::{Result, TermError};
