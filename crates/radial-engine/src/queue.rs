//! Queued dispatch: holds selections the game would currently ignore and
//! releases them once their trigger becomes usable.
//!
//! The queue is polled from the frame loop. It never sleeps and never sends
//! input itself; [`DispatchQueue::tick`] hands due entries back to the caller.

use std::collections::BTreeMap;

use radial_config::Queuing;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::{Action, TriggerId};

/// A pending selection.
#[derive(Clone, Debug, PartialEq)]
pub struct QueueEntry {
    /// Trigger that was selected.
    pub trigger: TriggerId,
    /// Action captured at selection time. Chat channels stay unresolved
    /// until the entry fires.
    pub action: Action,
    /// When the selection was queued.
    pub enqueued_at: Instant,
    /// Entries still waiting after this instant are dropped.
    pub deadline: Instant,
    /// Set once the trigger's condition holds; the entry fires at this
    /// instant if the condition still holds then.
    ready_at: Option<Instant>,
}

impl QueueEntry {
    /// When the entry is due to fire, if its condition currently holds.
    pub fn ready_at(&self) -> Option<Instant> {
        self.ready_at
    }
}

/// At most one pending entry per trigger, with settle and deadline handling.
#[derive(Debug)]
pub struct DispatchQueue {
    /// Queuing parameters.
    params: Queuing,
    /// Pending entries, keyed by trigger.
    entries: BTreeMap<TriggerId, QueueEntry>,
}

impl DispatchQueue {
    /// Empty queue with the given parameters.
    pub fn new(params: Queuing) -> Self {
        Self {
            params,
            entries: BTreeMap::new(),
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &Queuing {
        &self.params
    }

    /// Replace the parameters. Disabling queuing drops everything pending;
    /// otherwise existing deadlines are kept.
    pub fn set_params(&mut self, params: Queuing) {
        if !params.enabled {
            self.cancel_all();
        }
        self.params = params;
    }

    /// Queue `action` for `trigger`, superseding any entry it already has.
    /// Returns false (and queues nothing) when queuing is disabled or the
    /// deadline is not representable.
    pub fn enqueue(&mut self, trigger: TriggerId, action: Action, now: Instant) -> bool {
        if !self.params.enabled {
            debug!(%trigger, "queue_disabled_drop");
            return false;
        }
        let Some(deadline) = now.checked_add(self.params.max_wait()) else {
            warn!(%trigger, wait_s = self.params.max_wait_s, "queue_deadline_overflow");
            return false;
        };
        let entry = QueueEntry {
            trigger,
            action,
            enqueued_at: now,
            deadline,
            ready_at: None,
        };
        if self.entries.insert(trigger, entry).is_some() {
            debug!(%trigger, "queue_replaced");
        } else {
            debug!(%trigger, wait_s = self.params.max_wait_s, "queue_enqueued");
        }
        true
    }

    /// Put back an entry returned by [`DispatchQueue::tick`] that could not
    /// be sent, keeping its deadline and settle state. A newer selection of
    /// the same trigger wins. Returns false when nothing was put back.
    pub fn requeue(&mut self, entry: QueueEntry) -> bool {
        if !self.params.enabled || self.entries.contains_key(&entry.trigger) {
            return false;
        }
        debug!(trigger = %entry.trigger, "queue_requeued");
        self.entries.insert(entry.trigger, entry);
        true
    }

    /// Drop the entry for `trigger`. Returns true if there was one.
    pub fn cancel(&mut self, trigger: TriggerId) -> bool {
        let removed = self.entries.remove(&trigger).is_some();
        if removed {
            debug!(%trigger, "queue_cancelled");
        }
        removed
    }

    /// Drop every entry. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        if n > 0 {
            debug!(count = n, "queue_cancelled_all");
        }
        n
    }

    /// Whether `trigger` has a pending entry.
    pub fn is_queued(&self, trigger: TriggerId) -> bool {
        self.entries.contains_key(&trigger)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance every entry to `now` and return those due to fire, removed
    /// from the queue.
    ///
    /// The deadline is checked first: an entry past its deadline is dropped
    /// whether or not its condition holds. A ready entry fires once it has
    /// stayed ready for the settle delay; an entry whose condition lapses
    /// restarts its settle wait.
    pub fn tick(
        &mut self,
        now: Instant,
        mut is_ready: impl FnMut(TriggerId) -> bool,
    ) -> Vec<QueueEntry> {
        let settle = self.params.settle();
        let mut due = Vec::new();
        self.entries.retain(|id, entry| {
            if now > entry.deadline {
                debug!(
                    trigger = %id,
                    waited_ms = (now - entry.enqueued_at).as_millis(),
                    "queue_drop_deadline"
                );
                return false;
            }
            if !is_ready(*id) {
                if entry.ready_at.take().is_some() {
                    trace!(trigger = %id, "queue_ready_lapsed");
                }
                return true;
            }
            let at = match entry.ready_at {
                Some(at) => at,
                None => {
                    let Some(at) = now.checked_add(settle) else {
                        warn!(
                            trigger = %id,
                            settle_ms = settle.as_millis(),
                            "queue_settle_overflow"
                        );
                        return false;
                    };
                    *entry.ready_at.insert(at)
                }
            };
            if now < at {
                return true;
            }
            trace!(trigger = %id, "queue_fire");
            due.push(entry.clone());
            false
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use radial_config::Channel;
    use tokio::time::Duration;

    use super::*;

    fn params() -> Queuing {
        Queuing {
            settle_ms: 50,
            max_wait_s: 2,
            ..Queuing::default()
        }
    }

    fn chat() -> Action {
        Action::Chat {
            message: "gg".into(),
            channel: Channel::Dynamic,
        }
    }

    const T0: TriggerId = TriggerId::Template(0);
    const C1: TriggerId = TriggerId::Chat(1);

    #[test]
    fn fires_after_settle() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(params());
        assert!(q.enqueue(C1, chat(), t));
        assert!(q.tick(t + Duration::from_millis(10), |_| false).is_empty());
        // Condition holds: settle starts now.
        assert!(q.tick(t + Duration::from_millis(20), |_| true).is_empty());
        assert!(q.tick(t + Duration::from_millis(60), |_| true).is_empty());
        let fired = q.tick(t + Duration::from_millis(70), |_| true);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].trigger, C1);
        assert!(q.is_empty());
    }

    #[test]
    fn lapse_restarts_settle() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(params());
        q.enqueue(C1, chat(), t);
        q.tick(t, |_| true);
        q.tick(t + Duration::from_millis(40), |_| false);
        assert!(q.tick(t + Duration::from_millis(60), |_| true).is_empty());
        assert_eq!(q.tick(t + Duration::from_millis(110), |_| true).len(), 1);
    }

    #[test]
    fn zero_settle_fires_on_first_ready_tick() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(Queuing {
            settle_ms: 0,
            ..params()
        });
        q.enqueue(T0, Action::Chain(Default::default()), t);
        assert_eq!(q.tick(t + Duration::from_millis(1), |_| true).len(), 1);
    }

    #[test]
    fn deadline_drop_ignores_condition() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(params());
        q.enqueue(C1, chat(), t);
        // Exactly at the deadline the entry is still alive.
        assert!(q.tick(t + Duration::from_secs(2), |_| false).is_empty());
        assert!(q.is_queued(C1));
        // Past it, the entry goes even though the condition now holds.
        assert!(q.tick(t + Duration::from_millis(2001), |_| true).is_empty());
        assert!(!q.is_queued(C1));
    }

    #[test]
    fn reselect_supersedes() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(params());
        q.enqueue(C1, chat(), t);
        q.enqueue(C1, chat(), t + Duration::from_secs(1));
        assert_eq!(q.len(), 1);
        // The replacement carries a fresh deadline.
        assert!(q.tick(t + Duration::from_millis(2500), |_| false).is_empty());
        assert!(q.is_queued(C1));
    }

    #[test]
    fn oversized_durations_never_panic() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(Queuing {
            max_wait_s: u64::MAX,
            ..params()
        });
        assert!(!q.enqueue(C1, chat(), t));
        assert!(q.is_empty());

        q.set_params(Queuing {
            settle_ms: u64::MAX,
            ..params()
        });
        assert!(q.enqueue(C1, chat(), t));
        assert!(q.tick(t + Duration::from_millis(1), |_| true).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn requeue_keeps_deadline() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(params());
        q.enqueue(C1, chat(), t);
        q.tick(t, |_| true);
        let due = q.tick(t + Duration::from_millis(50), |_| true);
        assert_eq!(due.len(), 1);
        let entry = due.into_iter().next().expect("due entry");

        assert!(q.requeue(entry.clone()));
        // Still settled: fires again on the next ready tick.
        assert_eq!(q.tick(t + Duration::from_millis(60), |_| true), vec![entry.clone()]);

        assert!(q.requeue(entry));
        assert!(q.tick(t + Duration::from_millis(2001), |_| true).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_and_disable() {
        let t = Instant::now();
        let mut q = DispatchQueue::new(params());
        q.enqueue(C1, chat(), t);
        q.enqueue(T0, Action::Chain(Default::default()), t);
        assert!(q.cancel(T0));
        assert!(!q.cancel(T0));
        assert_eq!(q.cancel_all(), 1);

        q.enqueue(C1, chat(), t);
        q.set_params(Queuing {
            enabled: false,
            ..params()
        });
        assert!(q.is_empty());
        assert!(!q.enqueue(C1, chat(), t));
    }
}
