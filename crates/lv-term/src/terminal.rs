// SPDX-License-Identifier: MIT
//
// Terminal session: raw mode, geometry, and bounded single-byte reads.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Raw mode is a process-wide resource, so the original attributes live in
// one process-wide slot. Every restore path (an explicit `restore()`, the
// session's `Drop`, the panic hook) goes through `restore_original_mode`,
// which *takes* the slot. Whichever path runs first does the work; the
// others find the slot empty. The terminal is restored exactly once.
//
// Reads use VMIN=0 / VTIME=1: `read()` returns after at most 100ms, with
// or without a byte. That bound is the key decoder's escape timeout and the
// only clock in the program.

use std::io::{self, Write};
use std::sync::{Mutex, Once, PoisonError};

use tracing::{debug, warn};

use crate::ansi;
use crate::error::{Result, TermError};
use crate::input::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
///
/// Queried once at startup and treated as fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the window size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if the ioctl fails or reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn window_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn window_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Cursor position reports ────────────────────────────────────────────────

/// Longest cursor-position reply we are willing to buffer.
const REPORT_MAX: usize = 31;

/// Collect the reply to a `ESC[6n` query.
///
/// Reads one byte at a time until the terminator `R`, a timed-out read, or
/// [`REPORT_MAX`] buffered bytes, whichever comes first. The terminator is
/// kept in the returned bytes.
///
/// # Errors
///
/// Propagates read failures from `source`.
pub fn read_cursor_report(source: &mut impl ByteSource) -> Result<Vec<u8>> {
    let mut reply = Vec::with_capacity(REPORT_MAX);
    while reply.len() < REPORT_MAX {
        let Some(byte) = source.read_byte()? else {
            break;
        };
        reply.push(byte);
        if byte == b'R' {
            break;
        }
    }
    Ok(reply)
}

/// Size the screen by pushing the cursor into the bottom-right corner and
/// asking the terminal where it ended up.
///
/// The whole query is flushed to `out` before the first byte is read from
/// `source`.
///
/// # Errors
///
/// [`TermError::Setup`] if the terminal never answers,
/// [`TermError::Parse`] if the answer is malformed, [`TermError::Io`] if
/// the query cannot be written or the reply read.
pub fn query_cursor_geometry(out: &mut impl Write, source: &mut impl ByteSource) -> Result<Size> {
    ansi::cursor_to_far_corner(out)?;
    ansi::query_cursor_position(out)?;
    out.flush()?;

    let reply = read_cursor_report(source)?;
    if reply.is_empty() {
        return Err(TermError::Setup {
            context: "terminal did not report its size",
            source: io::Error::from(io::ErrorKind::TimedOut),
        });
    }
    let size = parse_cursor_report(&reply)?;
    debug!(cols = size.cols, rows = size.rows, "window size from cursor report");
    Ok(size)
}

/// Parse a cursor-position reply `ESC [ rows ; cols R` into a [`Size`].
///
/// The cursor was pushed into the bottom-right corner before the query, so
/// its 1-indexed position *is* the screen size.
///
/// # Errors
///
/// [`TermError::Parse`] if the reply is not of that form or either
/// dimension is zero.
pub fn parse_cursor_report(reply: &[u8]) -> Result<Size> {
    let body = reply
        .strip_prefix(b"\x1b[")
        .ok_or_else(|| TermError::Parse(format!("missing ESC[ prefix in {reply:?}")))?;
    let body = body.strip_suffix(b"R").unwrap_or(body);

    let text = std::str::from_utf8(body)
        .map_err(|_| TermError::Parse(format!("non-ASCII reply {reply:?}")))?;
    let (rows, cols) = text
        .split_once(';')
        .ok_or_else(|| TermError::Parse(format!("missing ';' in {text:?}")))?;

    let dim = |s: &str| -> Result<u16> {
        match s.parse::<u16>() {
            Ok(0) | Err(_) => Err(TermError::Parse(format!("bad dimension {s:?}"))),
            Ok(n) => Ok(n),
        }
    };

    Ok(Size {
        rows: dim(rows)?,
        cols: dim(cols)?,
    })
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

/// Transform terminal attributes into raw mode.
///
/// Input: no XON/XOFF, no CR→NL, no break signal, no parity check, no
/// 8th-bit stripping. Output: no post-processing. Local: no echo, no
/// canonical lines, no signals, no extended input. Characters are 8 bits.
/// Reads return whatever is available after at most one decisecond.
#[cfg(unix)]
pub fn make_raw(termios: &mut libc::termios) {
    termios.c_iflag &= !(libc::IXON | libc::ICRNL | libc::BRKINT | libc::INPCK | libc::ISTRIP);
    termios.c_oflag &= !libc::OPOST;
    termios.c_cflag |= libc::CS8;
    termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 1;
}

/// The attributes in force before raw mode, waiting to be put back.
#[cfg(unix)]
static ORIGINAL_MODE: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Put the original attributes back, if they haven't been already.
///
/// Returns `Ok(true)` if this call restored them, `Ok(false)` if there was
/// nothing to restore. The slot is emptied before the attempt, so a failed
/// restore is not retried by a later path.
#[cfg(unix)]
fn restore_original_mode() -> io::Result<bool> {
    let original = ORIGINAL_MODE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();

    let Some(original) = original else {
        return Ok(false);
    };

    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(true)
}

#[cfg(not(unix))]
fn restore_original_mode() -> io::Result<bool> {
    Ok(false)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Written straight to fd 1 by the panic hook: make the cursor visible.
const PANIC_RESTORE: &[u8] = b"\x1b[?25h\r\n";

/// Panic hook guard; ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without it a panic in raw mode leaves the shell with no echo and no
/// line editing, and the panic message staircases across the screen.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            let _ = restore_original_mode();
            original(info);
        }));
    });
}

/// Write [`PANIC_RESTORE`] directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock in case the panic happened while
/// a frame was being flushed.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            PANIC_RESTORE.as_ptr().cast::<libc::c_void>(),
            PANIC_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(PANIC_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── TerminalSession ────────────────────────────────────────────────────────

/// The controlling terminal, in raw mode for as long as this value lives.
///
/// [`enter`](Self::enter) switches to raw mode. The original attributes come
/// back when [`restore`](Self::restore) is called, when the session is
/// dropped, or when the process panics, exactly once in all cases.
///
/// # Example
///
/// ```no_run
/// use lv_term::terminal::TerminalSession;
///
/// let mut session = TerminalSession::enter()?;
/// let size = session.query_geometry()?;
/// // ... draw frames, read keys ...
/// session.restore()?;
/// # Ok::<(), lv_term::TermError>(())
/// ```
pub struct TerminalSession {
    /// Whether this session still owes the terminal a restore.
    active: bool,
}

impl TerminalSession {
    /// Capture the current attributes and switch the terminal to raw mode.
    ///
    /// # Errors
    ///
    /// [`TermError::Setup`] if stdin is not a terminal or the attributes
    /// cannot be read or written.
    #[cfg(unix)]
    pub fn enter() -> Result<Self> {
        if !is_tty() {
            return Err(TermError::Setup {
                context: "stdin is not a terminal",
                source: io::Error::from(io::ErrorKind::Unsupported),
            });
        }

        install_panic_hook();

        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
            return Err(TermError::setup("failed to get terminal attributes"));
        }

        *ORIGINAL_MODE.lock().unwrap_or_else(PoisonError::into_inner) = Some(termios);
        // From here on the session owns the restore, including on the error below.
        let session = Self { active: true };

        make_raw(&mut termios);
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(TermError::setup("failed to set terminal attributes"));
        }

        debug!("terminal in raw mode");
        Ok(session)
    }

    #[cfg(not(unix))]
    pub fn enter() -> Result<Self> {
        Err(TermError::Setup {
            context: "raw mode is only supported on unix terminals",
            source: io::Error::from(io::ErrorKind::Unsupported),
        })
    }

    /// Restore the attributes captured by [`enter`](Self::enter).
    ///
    /// Idempotent: later calls (and the eventual drop) do nothing.
    ///
    /// # Errors
    ///
    /// [`TermError::Setup`] if the attributes cannot be written back.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        match restore_original_mode() {
            Ok(restored) => {
                debug!(restored, "terminal attributes restored");
                Ok(())
            }
            Err(source) => Err(TermError::Setup {
                context: "failed to restore terminal attributes",
                source,
            }),
        }
    }

    /// Determine the terminal's size.
    ///
    /// Asks the OS first. If that fails, pushes the cursor into the
    /// bottom-right corner and asks the terminal where it ended up.
    ///
    /// # Errors
    ///
    /// [`TermError::Setup`] if the terminal never answers the query,
    /// [`TermError::Parse`] if the answer is malformed, [`TermError::Io`]
    /// if the query cannot be written or the reply read.
    pub fn query_geometry(&mut self) -> Result<Size> {
        if let Some(size) = window_size() {
            debug!(cols = size.cols, rows = size.rows, "window size from ioctl");
            return Ok(size);
        }

        warn!("TIOCGWINSZ unavailable, falling back to a cursor position query");
        let mut out = io::stdout().lock();
        query_cursor_geometry(&mut out, self)
    }
}

impl ByteSource for TerminalSession {
    /// One bounded `read()` on stdin.
    ///
    /// Zero bytes, `EAGAIN` and `EINTR` all mean "nothing yet".
    #[cfg(unix)]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast::<libc::c_void>(), 1) };

        if n == 1 {
            return Ok(Some(byte));
        }
        if n == 0 {
            return Ok(None);
        }

        let err = io::Error::last_os_error();
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
            _ => Err(TermError::Io(err)),
        }
    }

    #[cfg(not(unix))]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        Err(TermError::Io(io::Error::from(io::ErrorKind::Unsupported)))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("{e}");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
