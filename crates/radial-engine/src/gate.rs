//! Condition gate: resolves dynamic parameters and evaluates trigger
//! visibility/usability against a context snapshot.
//!
//! Everything here is a pure function of its arguments.

use std::fmt;

use radial_config::Channel;
use tracing::debug;
use win_keycode::{Key, KeyCombo, Modifier};

use crate::{GameContext, Trigger, props::Axis};

/// A concrete chat destination. `Dynamic` has no counterpart here, so an
/// unresolved channel cannot reach the input layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Destination {
    /// Squad chat.
    Squad,
    /// Party chat.
    Party,
    /// Map-local say.
    Say,
    /// Commander squad broadcast.
    Broadcast,
}

impl Destination {
    /// Slash-command prefix typed before the message, if any.
    ///
    /// Broadcast has none: the channel is selected by the open combo.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Squad => Some("/d "),
            Self::Party => Some("/p "),
            Self::Say => Some("/s "),
            Self::Broadcast => None,
        }
    }

    /// True for the broadcast channel.
    pub fn is_broadcast(self) -> bool {
        self == Self::Broadcast
    }

    /// Combo that opens the chat box for this destination.
    pub fn open_combo(self) -> KeyCombo {
        let open = KeyCombo::new(Key::Return);
        if self.is_broadcast() {
            open.with(Modifier::Shift)
        } else {
            open
        }
    }

    /// Message text as typed into the chat box.
    pub fn format(self, message: &str) -> String {
        match self.prefix() {
            Some(p) => format!("{p}{message}"),
            None => message.to_string(),
        }
    }

    /// The equivalent configuration channel.
    pub fn channel(self) -> Channel {
        match self {
            Self::Squad => Channel::Squad,
            Self::Party => Channel::Party,
            Self::Say => Channel::Say,
            Self::Broadcast => Channel::Broadcast,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.channel().fmt(f)
    }
}

/// Resolver for dynamic routing and trigger gating.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConditionGate {
    /// Destination used by `Dynamic` when no group context applies.
    fallback: Destination,
}

impl Default for ConditionGate {
    fn default() -> Self {
        Self {
            fallback: Destination::Squad,
        }
    }
}

impl ConditionGate {
    /// Gate with the given dynamic fallback. Only Squad and Say are valid
    /// fallbacks; anything else falls back to Squad.
    pub fn new(fallback: Channel) -> Self {
        let fallback = match fallback {
            Channel::Say => Destination::Say,
            Channel::Squad => Destination::Squad,
            other => {
                debug!(channel = %other, "dynamic_fallback_invalid_using_squad");
                Destination::Squad
            }
        };
        Self { fallback }
    }

    /// Fallback used by `Dynamic`.
    pub fn fallback(&self) -> Destination {
        self.fallback
    }

    /// Resolve a configured channel to a concrete destination.
    ///
    /// Concrete channels pass through. `Dynamic` follows a fixed cascade in
    /// which group-coordination contexts override the personal default:
    /// commander tag, then fractals, then WvW, then the fallback.
    pub fn resolve(&self, configured: Channel, ctx: &GameContext) -> Destination {
        match configured {
            Channel::Squad => Destination::Squad,
            Channel::Party => Destination::Party,
            Channel::Say => Destination::Say,
            Channel::Broadcast => Destination::Broadcast,
            Channel::Dynamic => {
                if ctx.commander {
                    Destination::Broadcast
                } else if ctx.in_fractals {
                    Destination::Party
                } else if ctx.in_wvw {
                    Destination::Squad
                } else {
                    self.fallback
                }
            }
        }
    }

    /// Whether `trigger` should appear on the wheel.
    pub fn is_visible(&self, trigger: &Trigger, ctx: &GameContext) -> bool {
        self.passes(trigger, ctx) && trigger.props().allows(Axis::Visible, ctx)
    }

    /// Whether `trigger` can be delivered right now.
    pub fn is_usable(&self, trigger: &Trigger, ctx: &GameContext) -> bool {
        self.passes(trigger, ctx) && trigger.props().allows(Axis::Usable, ctx)
    }

    /// Binding and extra-gate checks shared by both axes.
    fn passes(&self, trigger: &Trigger, ctx: &GameContext) -> bool {
        trigger.is_bound() && trigger.gate().is_none_or(|g| g.holds(ctx))
    }
}
