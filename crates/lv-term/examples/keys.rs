// SPDX-License-Identifier: MIT
//
// lv-term key probe: prints every decoded key, one per line.
//
// Handy for checking what a terminal actually sends for arrows and
// Home/End, and for seeing the escape timeout at work: press Esc alone
// and it shows up as `Escape` after one read timeout. Ctrl-Q to quit.
//
// Usage:
//   cargo run -p lv-term --example keys

use std::io::{self, Write};

use lv_term::input::{ctrl, Key, KeyDecoder};
use lv_term::terminal::TerminalSession;
use lv_term::TermError;

fn main() -> Result<(), TermError> {
    let mut session = TerminalSession::enter()?;
    let size = session.query_geometry()?;

    let result = probe(&mut session, size.cols);
    session.restore()?;
    result
}

fn probe(session: &mut TerminalSession, cols: u16) -> Result<(), TermError> {
    let mut out = io::stdout().lock();
    // Output post-processing is off in raw mode, so every line ends in \r\n.
    write!(out, "{cols} columns. Press keys, Ctrl-Q to quit.\r\n")?;
    out.flush()?;

    let mut decoder = KeyDecoder::new();
    loop {
        let key = decoder.next_key(session)?;
        write!(out, "{key}\r\n")?;
        out.flush()?;
        if key == Key::Byte(ctrl(b'q')) {
            return Ok(());
        }
    }
}
