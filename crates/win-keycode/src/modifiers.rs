use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::Key;

/// Modifier keys a game keybind may combine with its main key.
///
/// Ordering is the canonical press order: modifiers are pressed in
/// ascending order and released in descending order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Modifier {
    /// Either Control key.
    Control,
    /// Either Shift key.
    Shift,
    /// Either Alt key.
    Alt,
}

impl From<Modifier> for Key {
    fn from(m: Modifier) -> Self {
        match m {
            Modifier::Control => Self::Control,
            Modifier::Shift => Self::Shift,
            Modifier::Alt => Self::Alt,
        }
    }
}

impl TryFrom<Key> for Modifier {
    type Error = ();
    fn try_from(k: Key) -> Result<Self, Self::Error> {
        match k {
            Key::Control | Key::LeftControl | Key::RightControl => Ok(Self::Control),
            Key::Shift | Key::LeftShift | Key::RightShift => Ok(Self::Shift),
            Key::Alt | Key::LeftAlt | Key::RightAlt => Ok(Self::Alt),
            _ => Err(()),
        }
    }
}

impl Modifier {
    /// Parses a modifier specification string via key specs, then converts.
    ///
    /// Accepts the same words as `Key::from_spec` (ctrl, shift, alt, and the
    /// sided variant names). If the parsed key is not a modifier, parsing fails.
    pub fn from_spec(s: &str) -> Option<Self> {
        Key::from_spec(s).and_then(|k| Self::try_from(k).ok())
    }

    /// Returns the canonical spec string for this modifier, always lowercased.
    pub fn to_spec(self) -> &'static str {
        match self {
            Self::Control => "ctrl",
            Self::Shift => "shift",
            Self::Alt => "alt",
        }
    }
}
