//! In-memory sink that records events instead of posting them.

use std::{collections::HashSet, time::Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::{Error, Input, InputEvent, InputSink, Result, WindowHandle};

/// A recorded event and the instant it was posted.
#[derive(Clone, Debug)]
pub struct Recorded {
    /// The event as posted.
    pub event: InputEvent,
    /// When the batch containing it was posted.
    pub at: Instant,
}

/// Scriptable state for a [`RecordingSink`].
#[derive(Debug)]
struct State {
    /// Inputs reported as held.
    held: HashSet<Input>,
    /// Reported foreground window.
    window: Option<WindowHandle>,
    /// Every event posted so far.
    log: Vec<Recorded>,
    /// Number of successful `post` calls.
    batches: usize,
    /// When true, every `post` fails.
    rejecting: bool,
}

/// Sink that records posted events in order.
///
/// Held inputs do not change when events are posted: the sink reports
/// physical state, which synthetic events never alter.
#[derive(Debug)]
pub struct RecordingSink {
    /// Guarded state.
    state: Mutex<State>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    /// Create a sink with nothing held and a foreground window present.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                held: HashSet::new(),
                window: Some(WindowHandle(1)),
                log: Vec::new(),
                batches: 0,
                rejecting: false,
            }),
        }
    }

    /// Report `input` as held (or not).
    pub fn set_held(&self, input: Input, held: bool) {
        let mut st = self.state.lock();
        if held {
            st.held.insert(input);
        } else {
            st.held.remove(&input);
        }
    }

    /// Set the reported foreground window.
    pub fn set_window(&self, window: Option<WindowHandle>) {
        self.state.lock().window = window;
    }

    /// Make every subsequent `post` fail with [`Error::Rejected`].
    pub fn set_rejecting(&self, rejecting: bool) {
        self.state.lock().rejecting = rejecting;
    }

    /// Events posted so far, in order.
    pub fn events(&self) -> Vec<InputEvent> {
        self.state.lock().log.iter().map(|r| r.event.clone()).collect()
    }

    /// Events posted so far, with timestamps.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.state.lock().log.clone()
    }

    /// Number of batches posted.
    pub fn batches(&self) -> usize {
        self.state.lock().batches
    }

    /// Forget all recorded events.
    pub fn clear(&self) {
        let mut st = self.state.lock();
        st.log.clear();
        st.batches = 0;
    }
}

impl InputSink for RecordingSink {
    fn is_held(&self, input: Input) -> bool {
        self.state.lock().held.contains(&input)
    }

    fn post(&self, events: &[InputEvent]) -> Result<()> {
        let mut st = self.state.lock();
        if st.rejecting {
            return Err(Error::Rejected {
                sent: 0,
                expected: events.len(),
            });
        }
        let at = Instant::now();
        for event in events {
            debug!(?event, "recorded_input");
            st.log.push(Recorded {
                event: event.clone(),
                at,
            });
        }
        st.batches += 1;
        Ok(())
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.state.lock().window
    }
}
