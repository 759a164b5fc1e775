use std::fmt;

/// A mouse button, identified by its virtual-key code for held-state queries.
#[repr(u16)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum MouseButton {
    /// `VK_LBUTTON`.
    Left = 0x01,
    /// `VK_RBUTTON`.
    Right = 0x02,
    /// `VK_MBUTTON`.
    Middle = 0x04,
    /// `VK_XBUTTON1`.
    X1 = 0x05,
    /// `VK_XBUTTON2`.
    X2 = 0x06,
}

impl MouseButton {
    /// Every button.
    pub const ALL: [Self; 5] = [Self::Left, Self::Right, Self::Middle, Self::X1, Self::X2];

    /// Returns the virtual-key code for this button.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
            Self::X1 => "x1",
            Self::X2 => "x2",
        }
    }

    /// Parse `left`, `mouse-left`, `lmb` and the like (case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        let name = s.strip_prefix("mouse-").unwrap_or(&s);
        match name {
            "lmb" => Some(Self::Left),
            "rmb" => Some(Self::Right),
            "mmb" => Some(Self::Middle),
            _ => Self::ALL.into_iter().find(|b| b.name() == name),
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mouse-{}", self.name())
    }
}
