//! Input sequencer: turns one dispatch into timed synthetic input.
//!
//! A dispatch does its synchronous part on the caller's thread (guard,
//! ambient capture and release, focus check, deadline computation) and then
//! hands everything it needs, by value, to a task on the engine's tokio
//! runtime. The caller never waits on the timed part.
//!
//! Text dispatch, in order:
//! 1. Refuse if the game's chat box already has focus.
//! 2. Snapshot held movement keys and mouse buttons.
//! 3. Release them immediately, so the game accepts fresh presses later.
//! 4. At `open_settle`, tap the open-chat combo (Shift+Enter to broadcast).
//! 5. After the post-open delay, type the message as one batch.
//! 6. After `submit_settle`, tap Enter; after the final settle, press the
//!    captured inputs again in capture order.
//!
//! Deadlines are absolute instants computed at dispatch, so time already
//! spent on the caller's side is not added again.

use std::{
    collections::HashMap,
    mem,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use keysend::{Input, KeySender};
use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    time::{self, Instant},
};
use tracing::{debug, trace, warn};
use win_keycode::{Key, KeyCombo, MouseButton};

use crate::{ActionChain, Destination, GameContext, TriggerId};

/// Movement keys that are captured and released around a dispatch.
pub const MOVEMENT_KEYS: [Key; 6] = [Key::W, Key::A, Key::S, Key::D, Key::Q, Key::E];

/// Mouse buttons that are captured and released around a dispatch.
pub const AMBIENT_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Poll interval used by [`InputSequencer::wait_idle`].
const IDLE_POLL_INTERVAL_MS: u64 = 2;

/// Delays of a text dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timing {
    /// From dispatch to the open-chat tap.
    pub open_settle: Duration,
    /// From the open-chat tap to typing.
    pub post_open: Duration,
    /// `post_open` for broadcast; the broadcast box takes longer to appear.
    pub post_open_broadcast: Duration,
    /// From typing to the submit tap.
    pub submit_settle: Duration,
    /// From submit to restoring ambient input.
    pub final_settle: Duration,
    /// `final_settle` for broadcast.
    pub final_settle_broadcast: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            open_settle: Duration::from_millis(30),
            post_open: Duration::from_millis(50),
            post_open_broadcast: Duration::from_millis(150),
            submit_settle: Duration::from_millis(20),
            final_settle: Duration::from_millis(30),
            final_settle_broadcast: Duration::from_millis(100),
        }
    }
}

impl Timing {
    /// Post-open delay for `dest`.
    pub fn post_open_for(&self, dest: Destination) -> Duration {
        if dest.is_broadcast() {
            self.post_open_broadcast
        } else {
            self.post_open
        }
    }

    /// Final settle delay for `dest`.
    pub fn final_settle_for(&self, dest: Destination) -> Duration {
        if dest.is_broadcast() {
            self.final_settle_broadcast
        } else {
            self.final_settle
        }
    }
}

/// Movement keys and mouse buttons held at the instant of dispatch.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AmbientInput {
    /// Held inputs in capture order.
    held: Vec<Input>,
}

impl AmbientInput {
    /// Read which ambient inputs are held. Sends nothing.
    pub fn capture(sender: &KeySender) -> Self {
        let held: Vec<Input> = MOVEMENT_KEYS
            .iter()
            .map(|k| Input::Key(*k))
            .chain(AMBIENT_BUTTONS.iter().map(|b| Input::Button(*b)))
            .filter(|i| sender.is_held(*i))
            .collect();
        Self { held }
    }

    /// Held inputs in capture order.
    pub fn held(&self) -> &[Input] {
        &self.held
    }

    /// Release every captured input now. The returned guard presses them
    /// again exactly once: on [`PendingRestore::restore`], or when dropped.
    pub fn release(self, sender: &KeySender) -> PendingRestore {
        if !self.held.is_empty() {
            trace!(count = self.held.len(), "ambient_release");
            sender.release_all(&self.held);
        }
        PendingRestore {
            sender: sender.clone(),
            held: self.held,
        }
    }
}

/// Released ambient input awaiting restore.
pub struct PendingRestore {
    /// Where to send the presses.
    sender: KeySender,
    /// Inputs to press, in capture order. Emptied once restored.
    held: Vec<Input>,
}

impl PendingRestore {
    /// Press the released inputs again, in capture order.
    pub fn restore(mut self) {
        self.flush();
    }

    /// Inputs still awaiting restore.
    pub fn held(&self) -> &[Input] {
        &self.held
    }

    /// Send the presses, once.
    fn flush(&mut self) {
        let held = mem::take(&mut self.held);
        if !held.is_empty() {
            trace!(count = held.len(), "ambient_restore");
            self.sender.press_all(&held);
        }
    }
}

impl Drop for PendingRestore {
    fn drop(&mut self) {
        self.flush();
    }
}

/// What a dispatch sends.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload {
    /// Timed keybind taps.
    Chain(ActionChain),
    /// A chat message for a resolved destination.
    Text {
        /// Message without channel prefix.
        text: String,
        /// Resolved destination.
        destination: Destination,
    },
}

/// Result of a selection or dispatch. None of these are errors: the frame
/// loop logs them and carries on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    /// The timed sequence was handed to the runtime.
    Scheduled,
    /// The trigger is not usable now; the selection waits in the queue.
    Queued,
    /// The trigger has nothing to send.
    Unbound,
    /// The trigger is not usable now and queuing is disabled.
    Unavailable,
    /// The game's chat box has focus; nothing was sent.
    Suppressed,
    /// A previous dispatch of the same trigger is still running.
    Busy,
    /// No foreground window to send to.
    FocusUnavailable,
    /// No trigger with that id.
    Unknown,
}

/// Guard that clears a trigger's in-flight mark when its task ends.
struct InFlight {
    /// Shared in-flight map.
    map: Arc<Mutex<HashMap<TriggerId, u64>>>,
    /// Trigger being dispatched.
    id: TriggerId,
    /// Generation of this dispatch.
    generation: u64,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut map = self.map.lock();
        if map.get(&self.id) == Some(&self.generation) {
            map.remove(&self.id);
        }
    }
}

/// Schedules timed input for dispatched triggers.
#[derive(Clone)]
pub struct InputSequencer {
    /// Input boundary.
    sender: KeySender,
    /// Runtime the timed tasks run on.
    runtime: Handle,
    /// Generation of the running dispatch per trigger.
    in_flight: Arc<Mutex<HashMap<TriggerId, u64>>>,
    /// Source of dispatch generations.
    next_gen: Arc<AtomicU64>,
    /// Delays.
    timing: Timing,
}

impl InputSequencer {
    /// Sequencer posting through `sender` and spawning onto `runtime`.
    pub fn new(sender: KeySender, runtime: Handle) -> Self {
        Self {
            sender,
            runtime,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_gen: Arc::new(AtomicU64::new(1)),
            timing: Timing::default(),
        }
    }

    /// Replace the delays.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Current delays.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// The input boundary.
    pub fn sender(&self) -> &KeySender {
        &self.sender
    }

    /// Whether a dispatch of `id` is still running.
    pub fn is_in_flight(&self, id: TriggerId) -> bool {
        self.in_flight.lock().contains_key(&id)
    }

    /// Wait until no dispatch is running.
    pub async fn wait_idle(&self) {
        while !self.in_flight.lock().is_empty() {
            time::sleep(Duration::from_millis(IDLE_POLL_INTERVAL_MS)).await;
        }
    }

    /// Dispatch `payload` for trigger `id`. Returns once the timed part is
    /// scheduled; see the module docs for the sequence.
    pub fn dispatch(
        &self,
        id: TriggerId,
        payload: Payload,
        ctx: &GameContext,
    ) -> DispatchOutcome {
        if ctx.chat_focused {
            debug!(trigger = %id, "dispatch_suppressed_chat_focused");
            return DispatchOutcome::Suppressed;
        }
        if self.is_in_flight(id) {
            debug!(trigger = %id, "dispatch_busy");
            return DispatchOutcome::Busy;
        }
        match payload {
            Payload::Text { text, destination } => self.dispatch_text(id, &text, destination),
            Payload::Chain(chain) => self.dispatch_chain(id, chain),
        }
    }

    /// Ambient handling, then the chat sequence.
    fn dispatch_text(&self, id: TriggerId, text: &str, dest: Destination) -> DispatchOutcome {
        let ambient = AmbientInput::capture(&self.sender);
        let restore = ambient.release(&self.sender);
        if self.sender.foreground_window().is_none() {
            // Dropping `restore` presses the released inputs again.
            warn!(trigger = %id, "dispatch_no_foreground_window");
            return DispatchOutcome::FocusUnavailable;
        }

        let t = self.timing;
        let open_at = Instant::now() + t.open_settle;
        let type_at = open_at + t.post_open_for(dest);
        let open = dest.open_combo();
        let line = dest.format(text);
        let sender = self.sender.clone();
        let guard = self.mark_in_flight(id);
        debug!(
            trigger = %id,
            destination = %dest,
            generation = guard.generation,
            "dispatch_text"
        );

        self.runtime.spawn(async move {
            let _guard = guard;
            time::sleep_until(open_at).await;
            sender.tap(&open);
            time::sleep_until(type_at).await;
            sender.type_text(&line);
            time::sleep(t.submit_settle).await;
            sender.tap(&KeyCombo::new(Key::Return));
            time::sleep(t.final_settle_for(dest)).await;
            restore.restore();
            trace!(trigger = %id, "dispatch_text_done");
        });
        DispatchOutcome::Scheduled
    }

    /// Keybind chain: each step waits its delay after the previous one.
    fn dispatch_chain(&self, id: TriggerId, chain: ActionChain) -> DispatchOutcome {
        if chain.is_empty() {
            return DispatchOutcome::Unbound;
        }
        if self.sender.foreground_window().is_none() {
            warn!(trigger = %id, "dispatch_no_foreground_window");
            return DispatchOutcome::FocusUnavailable;
        }
        let start = Instant::now();
        let sender = self.sender.clone();
        let guard = self.mark_in_flight(id);
        debug!(
            trigger = %id,
            steps = chain.len(),
            generation = guard.generation,
            "dispatch_chain"
        );

        self.runtime.spawn(async move {
            let _guard = guard;
            let mut at = start;
            for step in chain.steps() {
                at += step.delay();
                time::sleep_until(at).await;
                sender.tap(step.combo());
            }
            trace!(trigger = %id, "dispatch_chain_done");
        });
        DispatchOutcome::Scheduled
    }

    /// Record a new generation for `id`.
    fn mark_in_flight(&self, id: TriggerId) -> InFlight {
        let generation = self.next_gen.fetch_add(1, Ordering::Relaxed);
        self.in_flight.lock().insert(id, generation);
        InFlight {
            map: self.in_flight.clone(),
            id,
            generation,
        }
    }
}
