//! Triggers: the selectable wheel entries and what they send.

use std::{fmt, time::Duration};

use radial_config::Channel;
use win_keycode::KeyCombo;

use crate::{ConditionalProps, Gate, order::Prioritized};

/// Stable identity of a trigger.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum TriggerId {
    /// Template combo slot (0-based).
    Template(usize),
    /// Chat command slot (0-based).
    Chat(usize),
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(i) => write!(f, "template_combo{}", i + 1),
            Self::Chat(i) => write!(f, "chat_command{}", i + 1),
        }
    }
}

/// One key send in a chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionStep {
    /// Combo to tap.
    combo: KeyCombo,
    /// Wait after the previous step (or after dispatch, for the first step).
    delay: Duration,
}

impl ActionStep {
    /// Build a step.
    pub fn new(combo: KeyCombo, delay: Duration) -> Self {
        Self { combo, delay }
    }

    /// Combo to tap.
    pub fn combo(&self) -> &KeyCombo {
        &self.combo
    }

    /// Wait before this step.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Ordered sequence of timed key sends.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActionChain {
    /// Steps in send order.
    steps: Vec<ActionStep>,
}

impl ActionChain {
    /// Append a step.
    pub fn push(&mut self, step: ActionStep) {
        self.steps.push(step);
    }

    /// Remove every step.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Steps in send order.
    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the chain sends nothing.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// What a trigger sends when dispatched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// Tap keybinds in order.
    Chain(ActionChain),
    /// Send a chat message.
    Chat {
        /// Message text without channel prefix.
        message: String,
        /// Configured channel, possibly `Dynamic`.
        channel: Channel,
    },
}

impl Action {
    /// True when dispatching would send nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Chain(c) => c.is_empty(),
            Self::Chat { message, .. } => message.trim().is_empty(),
        }
    }
}

/// A selectable wheel entry.
#[derive(Clone, Debug)]
pub struct Trigger {
    /// Identity.
    pub(crate) id: TriggerId,
    /// Display label.
    pub(crate) label: String,
    /// Visibility/usability flags.
    pub(crate) props: ConditionalProps,
    /// Optional extra condition.
    pub(crate) gate: Option<Gate>,
    /// Sorting priority; lower sorts first.
    pub(crate) priority: i32,
    /// User-facing enable switch.
    pub(crate) enabled: bool,
    /// What to send.
    pub(crate) action: Action,
}

impl Trigger {
    /// A template trigger with an empty (unbound) chain.
    pub fn template(slot: usize, label: impl Into<String>, priority: i32) -> Self {
        Self {
            id: TriggerId::Template(slot),
            label: label.into(),
            props: ConditionalProps::template_default(),
            gate: None,
            priority,
            enabled: true,
            action: Action::Chain(ActionChain::default()),
        }
    }

    /// A chat trigger.
    ///
    /// Commands configured for the broadcast channel are only offered to
    /// commanders, the only players who can broadcast.
    pub fn chat(
        slot: usize,
        label: impl Into<String>,
        message: impl Into<String>,
        channel: Channel,
        enabled: bool,
        priority: i32,
    ) -> Self {
        Self {
            id: TriggerId::Chat(slot),
            label: label.into(),
            props: ConditionalProps::chat_default(),
            gate: (channel == Channel::Broadcast).then_some(Gate::Commander),
            priority,
            enabled,
            action: Action::Chat {
                message: message.into(),
                channel,
            },
        }
    }

    /// Replace the extra gating condition.
    pub fn with_gate(mut self, gate: Option<Gate>) -> Self {
        self.gate = gate;
        self
    }

    /// Identity.
    pub fn id(&self) -> TriggerId {
        self.id
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Visibility/usability flags.
    pub fn props(&self) -> ConditionalProps {
        self.props
    }

    /// Extra gating condition.
    pub fn gate(&self) -> Option<Gate> {
        self.gate
    }

    /// Whether the user enabled this trigger.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// What this trigger sends.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The action chain, for chain triggers.
    pub fn chain(&self) -> Option<&ActionChain> {
        match &self.action {
            Action::Chain(c) => Some(c),
            Action::Chat { .. } => None,
        }
    }

    /// Mutable action chain, for chain triggers.
    pub(crate) fn chain_mut(&mut self) -> Option<&mut ActionChain> {
        match &mut self.action {
            Action::Chain(c) => Some(c),
            Action::Chat { .. } => None,
        }
    }

    /// Bound triggers have something to send and are enabled.
    pub fn is_bound(&self) -> bool {
        self.enabled && !self.action.is_empty()
    }
}

impl Prioritized for Trigger {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn set_priority(&mut self, p: i32) {
        self.priority = p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_as_nicknames() {
        assert_eq!(TriggerId::Template(0).to_string(), "template_combo1");
        assert_eq!(TriggerId::Chat(7).to_string(), "chat_command8");
    }

    #[test]
    fn chat_binding_needs_text_and_enable() {
        let t = Trigger::chat(0, "Stack", "stack", Channel::Squad, true, 0);
        assert!(t.is_bound());
        let t = Trigger::chat(0, "Stack", "   ", Channel::Squad, true, 0);
        assert!(!t.is_bound());
        let t = Trigger::chat(0, "Stack", "stack", Channel::Squad, false, 0);
        assert!(!t.is_bound());
    }

    #[test]
    fn broadcast_commands_are_commander_gated() {
        let t = Trigger::chat(1, "Push", "push", Channel::Broadcast, true, 1);
        assert_eq!(t.gate(), Some(Gate::Commander));
        let t = Trigger::chat(1, "Push", "push", Channel::Dynamic, true, 1);
        assert_eq!(t.gate(), None);
    }

    #[test]
    fn empty_template_is_unbound() {
        let t = Trigger::template(2, "Template Combo 3", 2);
        assert!(!t.is_bound());
        assert_eq!(t.chain().map(ActionChain::len), Some(0));
    }
}
