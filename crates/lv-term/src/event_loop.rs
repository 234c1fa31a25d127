// SPDX-License-Identifier: MIT
//
// Input loop: the heartbeat of the viewer.
//
// One thread, one cycle, repeated: decode a key, let the application
// react, and repaint if it asks for it. There is no tick and no
// background reader; the bounded read in the terminal session is the only
// clock. When the application says quit, the loop paints one last frame
// and returns.
//
// The loop is generic over where bytes come from and where frames go, so
// it runs unchanged against the real terminal or a scripted byte source
// and an in-memory sink.

use std::io::Write;

use tracing::{debug, trace};

use crate::error::Result;
use crate::input::{ByteSource, Key, KeyDecoder};
use crate::output::OutputBuffer;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing visible changed; wait for the next key.
    Continue,
    /// Repaint the screen.
    Redraw,
    /// Repaint one final time, then stop.
    Quit,
}

/// Application interface for the input loop.
pub trait App {
    /// React to one decoded key.
    fn on_key(&mut self, key: Key) -> Action;

    /// Compose a complete frame into `out`.
    ///
    /// `out` is empty on entry. Painting must depend only on application
    /// state, so painting twice without a key in between yields identical
    /// bytes.
    fn paint(&self, out: &mut OutputBuffer);
}

// ─── InputLoop ───────────────────────────────────────────────────────────────

/// Lifecycle of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminating,
}

/// Drives decode → dispatch → redraw until the application quits.
///
/// # Example
///
/// ```no_run
/// use lv_term::event_loop::{Action, App, InputLoop};
/// use lv_term::input::{ctrl, Key};
/// use lv_term::output::OutputBuffer;
/// use lv_term::terminal::TerminalSession;
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_key(&mut self, key: Key) -> Action {
///         if key == Key::Byte(ctrl(b'q')) { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&self, out: &mut OutputBuffer) {
///         out.cursor_home();
///         out.push_bytes(b"hello");
///     }
/// }
///
/// let mut session = TerminalSession::enter()?;
/// InputLoop::new().run(&mut Hello, &mut session, &mut std::io::stdout())?;
/// session.restore()?;
/// # Ok::<(), lv_term::TermError>(())
/// ```
pub struct InputLoop {
    decoder: KeyDecoder,
    frame: OutputBuffer,
    state: LoopState,
    frames: u64,
}

impl InputLoop {
    /// A fresh loop in the `Running` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: KeyDecoder::new(),
            frame: OutputBuffer::new(),
            state: LoopState::Running,
            frames: 0,
        }
    }

    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Number of frames flushed so far.
    #[inline]
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Paint a frame and write it to `output` in one go.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn redraw(&mut self, app: &impl App, output: &mut impl Write) -> Result<()> {
        self.frame.clear();
        app.paint(&mut self.frame);
        self.frame.flush_to(output)?;
        self.frames += 1;
        trace!(frame = self.frames, "frame flushed");
        Ok(())
    }

    /// Run one cycle: decode a key, dispatch it, redraw if asked.
    ///
    /// # Errors
    ///
    /// Returns an error if reading a key or writing a frame fails.
    pub fn cycle(
        &mut self,
        app: &mut impl App,
        input: &mut impl ByteSource,
        output: &mut impl Write,
    ) -> Result<LoopState> {
        let key = self.decoder.next_key(input)?;
        let action = app.on_key(key);
        debug!(%key, ?action, "key");

        match action {
            Action::Continue => {}
            Action::Redraw => self.redraw(&*app, output)?,
            Action::Quit => {
                self.redraw(&*app, output)?;
                self.state = LoopState::Terminating;
            }
        }
        Ok(self.state)
    }

    /// Paint the first frame, then cycle until the application quits.
    ///
    /// # Errors
    ///
    /// Returns the first read or write error; the loop does not retry.
    pub fn run(
        &mut self,
        app: &mut impl App,
        input: &mut impl ByteSource,
        output: &mut impl Write,
    ) -> Result<()> {
        self.redraw(&*app, output)?;
        while self.state == LoopState::Running {
            self.cycle(app, input, output)?;
        }
        Ok(())
    }
}

impl Default for InputLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermError;
    use crate::input::{ctrl, ScriptedInput};
    use pretty_assertions::assert_eq;
    use std::io;

    /// Records keys and paints a frame naming how many it has seen.
    #[derive(Default)]
    struct Recorder {
        keys: Vec<Key>,
    }

    impl App for Recorder {
        fn on_key(&mut self, key: Key) -> Action {
            self.keys.push(key);
            match key {
                Key::Byte(b) if b == ctrl(b'q') => Action::Quit,
                Key::Byte(b'x') => Action::Continue,
                _ => Action::Redraw,
            }
        }

        fn paint(&self, out: &mut OutputBuffer) {
            out.cursor_home();
            write!(out, "[{}]", self.keys.len()).unwrap();
        }
    }

    /// Counts writes so each frame can be seen as a single write.
    #[derive(Default)]
    struct Sink {
        writes: Vec<Vec<u8>>,
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // ── Action ──────────────────────────────────────────────────

    #[test]
    fn action_equality() {
        assert_eq!(Action::Redraw, Action::Redraw);
        assert_ne!(Action::Continue, Action::Quit);
    }

    // ── Loop ────────────────────────────────────────────────────

    #[test]
    fn new_loop_is_running() {
        let lp = InputLoop::new();
        assert_eq!(lp.state(), LoopState::Running);
        assert_eq!(lp.frames(), 0);
    }

    #[test]
    fn quit_right_away_paints_initial_and_final_frame() {
        let mut app = Recorder::default();
        let mut input = ScriptedInput::new(&[ctrl(b'q')]);
        let mut sink = Sink::default();
        let mut lp = InputLoop::new();

        lp.run(&mut app, &mut input, &mut sink).unwrap();

        assert_eq!(lp.state(), LoopState::Terminating);
        assert_eq!(sink.writes, vec![b"\x1b[H[0]".to_vec(), b"\x1b[H[1]".to_vec()]);
    }

    #[test]
    fn continue_does_not_redraw() {
        let mut app = Recorder::default();
        let mut input = ScriptedInput::new(b"xx\x11");
        let mut sink = Sink::default();
        InputLoop::new().run(&mut app, &mut input, &mut sink).unwrap();

        // Initial frame + final frame only.
        assert_eq!(sink.writes.len(), 2);
        assert_eq!(app.keys.len(), 3);
    }

    #[test]
    fn redraw_keys_each_write_one_frame() {
        let mut app = Recorder::default();
        let mut input = ScriptedInput::new(b"\x1b[A\x1b[Bj\x11");
        let mut sink = Sink::default();
        let mut lp = InputLoop::new();
        lp.run(&mut app, &mut input, &mut sink).unwrap();

        assert_eq!(app.keys, vec![Key::ArrowUp, Key::ArrowDown, Key::Byte(b'j'), Key::Byte(0x11)]);
        assert_eq!(sink.writes.len(), 5);
        assert_eq!(lp.frames(), 5);
        assert_eq!(sink.writes[3], b"\x1b[H[3]");
    }

    #[test]
    fn input_after_quit_is_not_read() {
        let mut app = Recorder::default();
        let mut input = ScriptedInput::new(b"\x11jjj");
        InputLoop::new().run(&mut app, &mut input, &mut Sink::default()).unwrap();
        assert_eq!(input.remaining(), 3);
    }

    #[test]
    fn read_error_stops_the_loop() {
        let mut app = Recorder::default();
        let mut input = ScriptedInput::new(b"j");
        let mut sink = Sink::default();
        let err = InputLoop::new().run(&mut app, &mut input, &mut sink).unwrap_err();
        assert!(matches!(err, TermError::Io(_)));
        assert_eq!(sink.writes.len(), 2);
    }

    #[test]
    fn write_error_stops_the_loop() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut app = Recorder::default();
        let mut input = ScriptedInput::new(b"\x11");
        let err = InputLoop::new().run(&mut app, &mut input, &mut Broken).unwrap_err();
        assert!(matches!(err, TermError::Io(_)));
        assert!(app.keys.is_empty());
    }

    #[test]
    fn cycle_reports_state() {
        let mut app = Recorder::default();
        let mut input = ScriptedInput::new(b"j\x11");
        let mut sink = Sink::default();
        let mut lp = InputLoop::new();
        assert_eq!(lp.cycle(&mut app, &mut input, &mut sink).unwrap(), LoopState::Running);
        assert_eq!(lp.cycle(&mut app, &mut input, &mut sink).unwrap(), LoopState::Terminating);
    }
}
