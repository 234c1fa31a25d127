// SPDX-License-Identifier: MIT
//
// Terminal key decoder.
//
// Turns the raw byte stream from the tty into logical keys. Only the
// sequences a pager-style viewer cares about are recognized: the four
// arrows and Home/End in their `ESC [ x` form. Every other byte passes
// through as `Key::Byte`.
//
// # Design
//
// Decoding is an explicit three-state machine (`Idle`, `SawEscape`,
// `SawBracket`) driven by a pure transition function, [`step`]. The
// [`KeyDecoder`] wraps it with the read loop: it pulls one byte at a time
// from a [`ByteSource`] whose reads are bounded by a short timeout, and
// feeds either the byte or `Input::Timeout` through `step` until a key
// falls out.
//
// A lone ESC is ambiguous: the Escape key, or the first byte of a
// sequence. The terminal delivers a whole sequence in one burst, so if the
// next read times out we commit to Escape.
//
// When ESC is followed by anything other than `[`, the decoder emits
// Escape and then replays that byte as fresh input, so `ESC x` yields
// `Escape` followed by `x`. An unknown byte after `ESC [` is the tail of a
// sequence we don't speak; it is dropped.

use std::collections::VecDeque;
use std::fmt;
use std::io;

use crate::error::{Result, TermError};

/// The escape byte (0x1B).
pub const ESC: u8 = 0x1B;

/// The byte a terminal sends for Ctrl + `k` (`k & 0x1f`).
#[inline]
#[must_use]
pub const fn ctrl(k: u8) -> u8 {
    k & 0x1F
}

// ─── Keys ───────────────────────────────────────────────────────────────────

/// A decoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that is not part of a recognized sequence.
    Byte(u8),
    /// A standalone Escape press.
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Byte(b) if b.is_ascii_graphic() || b == b' ' => {
                write!(f, "{b} ('{}')", char::from(b))
            }
            Self::Byte(b @ 0x01..=0x1A) => {
                write!(f, "{b} (Ctrl-{})", char::from(b + b'A' - 1))
            }
            Self::Byte(b) => write!(f, "{b}"),
            Self::Escape => f.write_str("Escape"),
            Self::ArrowUp => f.write_str("ArrowUp"),
            Self::ArrowDown => f.write_str("ArrowDown"),
            Self::ArrowLeft => f.write_str("ArrowLeft"),
            Self::ArrowRight => f.write_str("ArrowRight"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
        }
    }
}

// ─── State machine ──────────────────────────────────────────────────────────

/// Where the decoder is within a (possible) escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    /// Between keys.
    #[default]
    Idle,
    /// Consumed an ESC, waiting to see if a sequence follows.
    SawEscape,
    /// Consumed `ESC [`, waiting for the final byte.
    SawBracket,
}

/// One input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A byte arrived.
    Byte(u8),
    /// The bounded read returned nothing.
    Timeout,
}

/// The result of feeding one [`Input`] through [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State to move to.
    pub next: DecodeState,
    /// Key produced by this input, if any.
    pub emit: Option<Key>,
    /// Byte to feed again from `next` before reading more input.
    pub replay: Option<u8>,
}

impl Transition {
    const fn stay(next: DecodeState) -> Self {
        Self { next, emit: None, replay: None }
    }

    const fn emit(key: Key) -> Self {
        Self {
            next: DecodeState::Idle,
            emit: Some(key),
            replay: None,
        }
    }
}

/// The decoder's transition function.
#[must_use]
pub const fn step(state: DecodeState, input: Input) -> Transition {
    match (state, input) {
        (DecodeState::Idle, Input::Timeout) => Transition::stay(DecodeState::Idle),
        (DecodeState::Idle, Input::Byte(ESC)) => Transition::stay(DecodeState::SawEscape),
        (DecodeState::Idle, Input::Byte(b)) => Transition::emit(Key::Byte(b)),

        (DecodeState::SawEscape, Input::Byte(b'[')) => Transition::stay(DecodeState::SawBracket),
        (DecodeState::SawEscape, Input::Byte(b)) => Transition {
            next: DecodeState::Idle,
            emit: Some(Key::Escape),
            replay: Some(b),
        },
        (DecodeState::SawEscape | DecodeState::SawBracket, Input::Timeout) => {
            Transition::emit(Key::Escape)
        }

        (DecodeState::SawBracket, Input::Byte(b)) => Transition::emit(match b {
            b'A' => Key::ArrowUp,
            b'B' => Key::ArrowDown,
            b'C' => Key::ArrowRight,
            b'D' => Key::ArrowLeft,
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Escape,
        }),
    }
}

// ─── Byte sources ───────────────────────────────────────────────────────────

/// A single-byte reader with a bounded wait.
pub trait ByteSource {
    /// Read at most one byte.
    ///
    /// Returns `Ok(None)` when the wait elapsed with nothing to read.
    ///
    /// # Errors
    ///
    /// Any read failure other than "would block".
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// A canned byte source: replays bytes and timeouts in order.
///
/// Reading past the end of the script is an error rather than an endless
/// run of timeouts, so a loop fed a script always terminates.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<Option<u8>>,
}

impl ScriptedInput {
    /// A script that delivers `bytes` back to back.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self::default().then_bytes(bytes)
    }

    /// Append more bytes.
    #[must_use]
    pub fn then_bytes(mut self, bytes: &[u8]) -> Self {
        self.script.extend(bytes.iter().copied().map(Some));
        self
    }

    /// Append one read that times out.
    #[must_use]
    pub fn then_timeout(mut self) -> Self {
        self.script.push_back(None);
        self
    }

    /// Reads left before the script runs out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for ScriptedInput {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.script.pop_front().ok_or_else(|| {
            TermError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted input exhausted",
            ))
        })
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Pulls bytes from a [`ByteSource`] and assembles them into [`Key`]s.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecodeState,
    replay: Option<u8>,
}

impl KeyDecoder {
    /// A decoder in the `Idle` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state (for tests and diagnostics).
    #[inline]
    #[must_use]
    pub const fn state(&self) -> DecodeState {
        self.state
    }

    /// Feed one input and return the key it completes, if any.
    ///
    /// A replayed byte is parked in `self.replay` for [`next_key`](Self::next_key).
    fn feed(&mut self, input: Input) -> Option<Key> {
        let t = step(self.state, input);
        self.state = t.next;
        self.replay = t.replay;
        t.emit
    }

    /// Block until one complete key has been decoded.
    ///
    /// While idle, timed-out reads just mean "no key yet" and the wait
    /// continues.
    ///
    /// # Errors
    ///
    /// Propagates any error from `source`.
    pub fn next_key(&mut self, source: &mut impl ByteSource) -> Result<Key> {
        loop {
            let input = match self.replay.take() {
                Some(b) => Input::Byte(b),
                None => source.read_byte()?.map_or(Input::Timeout, Input::Byte),
            };
            if let Some(key) = self.feed(input) {
                return Ok(key);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
