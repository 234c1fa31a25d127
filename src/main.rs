// SPDX-License-Identifier: MIT
//
// lessvim: a minimal read-only terminal file viewer.
//
// This is the binary that wires the two crates together:
//
//   lv-term → raw mode, key decoding, the input loop, single-write frames
//   lv-view → document, viewport, frame rendering
//
// The Viewer struct implements lv-term's App trait. Each keypress flows:
//
//   stdin → KeyDecoder → on_key → Viewport → render_frame → one write()
//
// Keys (vi-style navigation, nothing edits):
//
//   h j k l, arrows   move the cursor, scrolling at the top/bottom edge
//   Home / End        first / last column
//   m / n             scroll the view down / up one line
//   Ctrl-R            redraw
//   Ctrl-Q            quit

mod logging;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use lv_term::event_loop::{Action, App, InputLoop};
use lv_term::input::{ctrl, Key};
use lv_term::output::OutputBuffer;
use lv_term::terminal::{Size, TerminalSession};
use lv_view::document::Document;
use lv_view::render::render_frame;
use lv_view::viewport::{Motion, Viewport};
use lv_view::ViewError;

/// Quit (Ctrl-Q).
const QUIT: u8 = ctrl(b'q');
/// Force a redraw (Ctrl-R).
const REDRAW: u8 = ctrl(b'r');

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lessvim", version, about = "A minimal read-only terminal file viewer")]
struct Cli {
    /// File to view. Without one, lessvim shows its welcome screen.
    path: Option<PathBuf>,

    /// Write the debug log here instead of `<tmpdir>/lessvim.log`.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

// ─── Viewer ─────────────────────────────────────────────────────────────────

/// The viewer application state: what is shown, and where we are in it.
struct Viewer {
    document: Document,
    viewport: Viewport,
}

impl Viewer {
    const fn new(document: Document, size: Size) -> Self {
        Self {
            document,
            viewport: Viewport::new(size),
        }
    }
}

impl App for Viewer {
    fn on_key(&mut self, key: Key) -> Action {
        let line_count = self.document.line_count();

        let motion = match key {
            Key::Byte(QUIT) => return Action::Quit,
            Key::Byte(REDRAW) => return Action::Redraw,
            Key::ArrowLeft | Key::Byte(b'h') => Motion::Left,
            Key::ArrowDown | Key::Byte(b'j') => Motion::Down,
            Key::ArrowUp | Key::Byte(b'k') => Motion::Up,
            Key::ArrowRight | Key::Byte(b'l') => Motion::Right,
            Key::Home => Motion::LineStart,
            Key::End => Motion::LineEnd,
            Key::Byte(b'm') => {
                self.viewport.scroll_down(line_count);
                return Action::Redraw;
            }
            Key::Byte(b'n') => {
                self.viewport.scroll_up();
                return Action::Redraw;
            }
            _ => return Action::Continue,
        };

        self.viewport.move_cursor(motion, line_count);
        Action::Redraw
    }

    fn paint(&self, out: &mut OutputBuffer) {
        render_frame(&self.document, &self.viewport, out);
    }
}

// ─── Entry ──────────────────────────────────────────────────────────────────

/// Size the screen and run the input loop until the user quits.
fn view(session: &mut TerminalSession, document: Document) -> Result<(), ViewError> {
    let size = session.query_geometry()?;
    info!(
        cols = size.cols,
        rows = size.rows,
        lines = document.line_count(),
        "viewing"
    );

    let mut viewer = Viewer::new(document, size);
    let mut stdout = io::stdout().lock();
    InputLoop::new().run(&mut viewer, session, &mut stdout)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), ViewError> {
    let document = match &cli.path {
        Some(path) => Document::open(path)?,
        None => Document::empty(),
    };

    let mut session = TerminalSession::enter()?;
    let result = view(&mut session, document);
    // The session would restore on drop too, but only here can a failed
    // restore be reported.
    let restored = session.restore();

    result?;
    restored?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log = logging::init(cli.log_file.as_deref());
    if let Some(log) = &log {
        info!(log = %log.path().display(), path = ?cli.path, "lessvim starting");
    }

    match run(&cli) {
        Ok(()) => {
            info!("lessvim exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("lessvim: {e}");
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
