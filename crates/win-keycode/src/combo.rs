use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Key, Modifier};

/// A key combo: a set of modifiers plus a single key, or unset.
///
/// The unset combo has no key and no modifiers. It stands for a keybind the
/// user has not configured and is never sent to the OS.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo {
    /// The main key, or `None` when unset.
    pub key: Option<Key>,
    /// Modifier keys held down for this combo.
    pub modifiers: BTreeSet<Modifier>,
}

impl KeyCombo {
    /// The unset combo.
    pub const UNSET: Self = Self {
        key: None,
        modifiers: BTreeSet::new(),
    };

    /// A combo of a bare key.
    pub const fn new(key: Key) -> Self {
        Self {
            key: Some(key),
            modifiers: BTreeSet::new(),
        }
    }

    /// Return this combo with `m` added to its modifier set.
    pub fn with(mut self, m: Modifier) -> Self {
        self.modifiers.insert(m);
        self
    }

    /// True when a key is configured.
    pub fn is_set(&self) -> bool {
        self.key.is_some()
    }

    /// Parses a combo specification of the form "ctrl+shift+f1".
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by "+"; the last component is the key spec.
    /// - An empty string (or "unset"/"none") parses to [`KeyCombo::UNSET`].
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("unset")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return Some(Self::UNSET);
        }
        let mut parts: Vec<&str> = s.split('+').collect();
        let key_raw = parts.pop()?;
        let key = if key_raw == " " {
            Key::from_spec(" ")
        } else {
            Key::from_spec(key_raw.trim())
        }?;
        let mut modifiers = BTreeSet::new();
        for m in parts {
            let mt = m.trim();
            if mt.is_empty() {
                return None;
            }
            modifiers.insert(Modifier::from_spec(mt)?);
        }
        Some(Self {
            key: Some(key),
            modifiers,
        })
    }

    /// Returns the canonical string form of this combo.
    ///
    /// Modifiers appear in canonical order (ctrl, shift, alt) followed by the
    /// key spec. The unset combo renders as the empty string.
    pub fn to_string_canonical(&self) -> String {
        let Some(key) = self.key else {
            return String::new();
        };
        let mut out: Vec<String> = self
            .modifiers
            .iter()
            .map(|m| m.to_spec().to_string())
            .collect();
        out.push(key.to_spec());
        out.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "{}", self.to_string_canonical())
        } else {
            write!(f, "(unset)")
        }
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid key combo '{value}'"))
    }
}

impl From<KeyCombo> for String {
    fn from(c: KeyCombo) -> Self {
        c.to_string_canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_combo() {
        let c = KeyCombo::parse("shift+ctrl+k").expect("parse");
        assert!(c.modifiers.contains(&Modifier::Shift));
        assert!(c.modifiers.contains(&Modifier::Control));
        assert_eq!(c.key, Some(Key::K));
        assert_eq!(c.to_string(), "ctrl+shift+k");
    }

    #[test]
    fn unset_forms() {
        assert_eq!(KeyCombo::parse(""), Some(KeyCombo::UNSET));
        assert_eq!(KeyCombo::parse("unset"), Some(KeyCombo::UNSET));
        assert!(!KeyCombo::UNSET.is_set());
        assert_eq!(KeyCombo::UNSET.to_string_canonical(), "");
        assert_eq!(KeyCombo::default(), KeyCombo::UNSET);
    }

    #[test]
    fn equality_ignores_modifier_spelling() {
        let a = KeyCombo::parse("ALT+F1").expect("parse");
        let b = KeyCombo::new(Key::F1).with(Modifier::Alt);
        assert_eq!(a, b);
        assert_ne!(a, KeyCombo::new(Key::F1));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(KeyCombo::parse("ctrl+"), None);
        assert_eq!(KeyCombo::parse("+a"), None);
        assert_eq!(KeyCombo::parse("a+b"), None);
    }
}
