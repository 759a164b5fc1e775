//! Conditional visibility/usability flags and extra gating conditions.

use bitflags::bitflags;

use crate::GameContext;

bitflags! {
    /// Where a trigger is shown on the wheel and where it can be sent.
    ///
    /// `*Default`/`*WvW` select the base case by map kind. The situational
    /// axes (combat, underwater, on water) each add a requirement while they
    /// are active.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct ConditionalProps: u32 {
        /// Usable outside WvW.
        const USABLE_DEFAULT = 1 << 0;
        /// Usable in WvW.
        const USABLE_WVW = 1 << 1;
        /// Usable while in combat.
        const USABLE_IN_COMBAT = 1 << 2;
        /// Usable while underwater.
        const USABLE_UNDERWATER = 1 << 3;
        /// Usable while swimming on the surface.
        const USABLE_ON_WATER = 1 << 4;
        /// Visible outside WvW.
        const VISIBLE_DEFAULT = 1 << 8;
        /// Visible in WvW.
        const VISIBLE_WVW = 1 << 9;
        /// Visible while in combat.
        const VISIBLE_IN_COMBAT = 1 << 10;
        /// Visible while underwater.
        const VISIBLE_UNDERWATER = 1 << 11;
        /// Visible while swimming on the surface.
        const VISIBLE_ON_WATER = 1 << 12;

        /// Usable everywhere.
        const USABLE_ALL = Self::USABLE_DEFAULT.bits()
            | Self::USABLE_WVW.bits()
            | Self::USABLE_IN_COMBAT.bits()
            | Self::USABLE_UNDERWATER.bits()
            | Self::USABLE_ON_WATER.bits();
        /// Visible everywhere.
        const VISIBLE_ALL = Self::VISIBLE_DEFAULT.bits()
            | Self::VISIBLE_WVW.bits()
            | Self::VISIBLE_IN_COMBAT.bits()
            | Self::VISIBLE_UNDERWATER.bits()
            | Self::VISIBLE_ON_WATER.bits();
    }
}

/// Which half of the flag set to evaluate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Axis {
    /// The `VISIBLE_*` flags.
    Visible,
    /// The `USABLE_*` flags.
    Usable,
}

impl ConditionalProps {
    /// Template swaps only go through on a plain out-of-combat map. Templates
    /// stay visible in combat so a selection there can be queued; anywhere
    /// else (WvW, underwater, on water) they are neither shown nor usable and
    /// a selection waits in the queue.
    pub fn template_default() -> Self {
        Self::USABLE_DEFAULT | Self::VISIBLE_DEFAULT | Self::VISIBLE_IN_COMBAT
    }

    /// Chat can be sent anywhere.
    pub fn chat_default() -> Self {
        Self::VISIBLE_ALL | Self::USABLE_ALL
    }

    /// Evaluate one axis against `ctx`.
    pub(crate) fn allows(self, axis: Axis, ctx: &GameContext) -> bool {
        let (base, wvw, combat, underwater, on_water) = match axis {
            Axis::Visible => (
                Self::VISIBLE_DEFAULT,
                Self::VISIBLE_WVW,
                Self::VISIBLE_IN_COMBAT,
                Self::VISIBLE_UNDERWATER,
                Self::VISIBLE_ON_WATER,
            ),
            Axis::Usable => (
                Self::USABLE_DEFAULT,
                Self::USABLE_WVW,
                Self::USABLE_IN_COMBAT,
                Self::USABLE_UNDERWATER,
                Self::USABLE_ON_WATER,
            ),
        };
        let map_ok = if ctx.in_wvw {
            self.contains(wvw)
        } else {
            self.contains(base)
        };
        map_ok
            && (!ctx.in_combat || self.contains(combat))
            && (!ctx.underwater || self.contains(underwater))
            && (!ctx.on_water || self.contains(on_water))
    }
}

/// Extra per-trigger condition, evaluated alongside the props.
///
/// A closed set of conditions over the context snapshot, so gating stays a
/// pure function of `(trigger, context)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Gate {
    /// Only while the player has a commander tag up.
    Commander,
    /// Only outside combat.
    OutOfCombat,
    /// Only in WvW.
    InWvw,
    /// Only outside WvW.
    OutsideWvw,
}

impl Gate {
    /// Whether this condition holds in `ctx`.
    pub fn holds(self, ctx: &GameContext) -> bool {
        match self {
            Self::Commander => ctx.commander,
            Self::OutOfCombat => !ctx.in_combat,
            Self::InWvw => ctx.in_wvw,
            Self::OutsideWvw => !ctx.in_wvw,
        }
    }
}
