//! Sends synthetic input to the focused game window.
//!
//! A [`KeySender`] posts key, mouse-button and text events through an
//! [`InputSink`]. Sinks are fire-and-forget: there is no acknowledgement from
//! the receiving application, only the OS's count of inserted events.
//!
//! - [`KeySender::system`] (Windows only) posts through `SendInput`.
//! - [`RecordingSink`] records events in order and lets callers script held
//!   inputs and window presence. It backs tests and dry runs.
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]
use std::{fmt, sync::Arc};

use tracing::{debug, trace, warn};
use win_keycode::{Key, KeyCombo, MouseButton};

mod error;
mod record;
#[cfg(windows)]
mod sys;

pub use error::{Error, Result};
pub use record::{Recorded, RecordingSink};

/// A key or mouse button whose held state can be queried and replayed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Input {
    /// A keyboard key, sent by hardware scan code.
    Key(Key),
    /// A mouse button.
    Button(MouseButton),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => write!(f, "{}", k.to_spec()),
            Self::Button(b) => write!(f, "{b}"),
        }
    }
}

/// One synthetic event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputEvent {
    /// Press a key or button.
    Down(Input),
    /// Release a key or button.
    Up(Input),
    /// Type text: one press/release pair per character, by code point.
    Text(String),
}

/// Opaque handle of an OS window.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WindowHandle(pub isize);

/// The OS input boundary.
pub trait InputSink: Send + Sync {
    /// True when `input` is physically held right now. Read-only.
    fn is_held(&self, input: Input) -> bool;
    /// Post `events` as a single batch, in order.
    fn post(&self, events: &[InputEvent]) -> Result<()>;
    /// The window currently receiving input, if any.
    fn foreground_window(&self) -> Option<WindowHandle>;
}

/// Cloneable front end over an [`InputSink`].
///
/// Failures are logged and swallowed; callers run inside a frame callback
/// and have no way to recover from a rejected event.
#[derive(Clone)]
pub struct KeySender {
    /// Destination for all events.
    sink: Arc<dyn InputSink>,
}

impl KeySender {
    /// Wrap an arbitrary sink.
    pub fn new(sink: Arc<dyn InputSink>) -> Self {
        Self { sink }
    }

    /// Sender that posts through the Windows `SendInput` API.
    #[cfg(windows)]
    pub fn system() -> Self {
        Self::new(Arc::new(sys::SendInputSink))
    }

    /// Sender for the host platform's input API, if it has one.
    pub fn platform() -> Result<Self> {
        #[cfg(windows)]
        {
            Ok(Self::system())
        }
        #[cfg(not(windows))]
        {
            Err(Error::Unsupported)
        }
    }

    /// True when `input` is physically held right now.
    pub fn is_held(&self, input: Input) -> bool {
        self.sink.is_held(input)
    }

    /// The window currently receiving input, if any.
    pub fn foreground_window(&self) -> Option<WindowHandle> {
        self.sink.foreground_window()
    }

    /// Press `input`.
    pub fn press(&self, input: Input) {
        trace!(%input, "press");
        self.post(&[InputEvent::Down(input)]);
    }

    /// Release `input`.
    pub fn release(&self, input: Input) {
        trace!(%input, "release");
        self.post(&[InputEvent::Up(input)]);
    }

    /// Release every input in `inputs` as one batch, in order.
    pub fn release_all(&self, inputs: &[Input]) {
        if inputs.is_empty() {
            return;
        }
        trace!(count = inputs.len(), "release_all");
        let events: Vec<InputEvent> = inputs.iter().copied().map(InputEvent::Up).collect();
        self.post(&events);
    }

    /// Press every input in `inputs` as one batch, in order.
    pub fn press_all(&self, inputs: &[Input]) {
        if inputs.is_empty() {
            return;
        }
        trace!(count = inputs.len(), "press_all");
        let events: Vec<InputEvent> = inputs.iter().copied().map(InputEvent::Down).collect();
        self.post(&events);
    }

    /// Press and release a combo as one batch: modifiers down in canonical
    /// order, key down, key up, modifiers up in reverse order.
    pub fn tap(&self, combo: &KeyCombo) {
        let Some(key) = combo.key else {
            debug!("tap_unset_combo");
            return;
        };
        let mods: Vec<Input> = combo
            .modifiers
            .iter()
            .map(|m| Input::Key(Key::from(*m)))
            .collect();
        let mut events: Vec<InputEvent> = mods.iter().copied().map(InputEvent::Down).collect();
        events.push(InputEvent::Down(Input::Key(key)));
        events.push(InputEvent::Up(Input::Key(key)));
        events.extend(mods.iter().rev().copied().map(InputEvent::Up));
        trace!(%combo, "tap");
        self.post(&events);
    }

    /// Type `text` as a single batch of code-point events.
    pub fn type_text(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        trace!(len = text.chars().count(), "type_text");
        self.post(&[InputEvent::Text(text.to_string())]);
    }

    /// Post a batch, logging failures.
    fn post(&self, events: &[InputEvent]) {
        if let Err(e) = self.sink.post(events) {
            warn!(error = %e, count = events.len(), "input_post_failed");
        }
    }
}
