//! The `Key` enum and its name/code lookup tables.

/// Declares the `Key` enum together with its name and code lookup tables.
///
/// Each entry is `Variant = code`. The first entry for a given code wins in
/// `from_code`, so generic keys (`Shift`) must precede their sided variants.
macro_rules! virtual_keys {
    ( $( $(#[$meta:meta])* $name:ident = $code:literal, )* ) => {
        /// A Windows virtual key (`VK_*`), with the exact code as its discriminant.
        #[repr(u16)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub enum Key {
            $( $(#[$meta])* $name = $code, )*
        }

        impl Key {
            /// Every key in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$name, )* ];

            /// Returns the canonical name for this key (the enum variant string).
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name), )*
                }
            }

            /// Looks up a `Key` from a virtual-key code.
            pub fn from_code(code: u16) -> Option<Self> {
                Self::ALL.iter().copied().find(|k| k.code() == code)
            }

            /// Case-insensitive lookup of a `Key` from its name.
            ///
            /// Accepts strings like "Tab", "tab", or "TAB".
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|k| k.name().eq_ignore_ascii_case(name))
            }
        }
    };
}

virtual_keys! {
    Backspace = 0x08,
    Tab = 0x09,
    Return = 0x0D,
    Shift = 0x10,
    Control = 0x11,
    /// `VK_MENU`.
    Alt = 0x12,
    Pause = 0x13,
    CapsLock = 0x14,
    Escape = 0x1B,
    Space = 0x20,
    PageUp = 0x21,
    PageDown = 0x22,
    End = 0x23,
    Home = 0x24,
    LeftArrow = 0x25,
    UpArrow = 0x26,
    RightArrow = 0x27,
    DownArrow = 0x28,
    PrintScreen = 0x2C,
    Insert = 0x2D,
    Delete = 0x2E,
    Digit0 = 0x30,
    Digit1 = 0x31,
    Digit2 = 0x32,
    Digit3 = 0x33,
    Digit4 = 0x34,
    Digit5 = 0x35,
    Digit6 = 0x36,
    Digit7 = 0x37,
    Digit8 = 0x38,
    Digit9 = 0x39,
    A = 0x41,
    B = 0x42,
    C = 0x43,
    D = 0x44,
    E = 0x45,
    F = 0x46,
    G = 0x47,
    H = 0x48,
    I = 0x49,
    J = 0x4A,
    K = 0x4B,
    L = 0x4C,
    M = 0x4D,
    N = 0x4E,
    O = 0x4F,
    P = 0x50,
    Q = 0x51,
    R = 0x52,
    S = 0x53,
    T = 0x54,
    U = 0x55,
    V = 0x56,
    W = 0x57,
    X = 0x58,
    Y = 0x59,
    Z = 0x5A,
    /// Context-menu key (`VK_APPS`).
    Apps = 0x5D,
    Numpad0 = 0x60,
    Numpad1 = 0x61,
    Numpad2 = 0x62,
    Numpad3 = 0x63,
    Numpad4 = 0x64,
    Numpad5 = 0x65,
    Numpad6 = 0x66,
    Numpad7 = 0x67,
    Numpad8 = 0x68,
    Numpad9 = 0x69,
    NumpadMultiply = 0x6A,
    NumpadAdd = 0x6B,
    NumpadSubtract = 0x6D,
    NumpadDecimal = 0x6E,
    NumpadDivide = 0x6F,
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,
    F13 = 0x7C,
    F14 = 0x7D,
    F15 = 0x7E,
    F16 = 0x7F,
    F17 = 0x80,
    F18 = 0x81,
    F19 = 0x82,
    F20 = 0x83,
    F21 = 0x84,
    F22 = 0x85,
    F23 = 0x86,
    F24 = 0x87,
    NumLock = 0x90,
    ScrollLock = 0x91,
    LeftShift = 0xA0,
    RightShift = 0xA1,
    LeftControl = 0xA2,
    RightControl = 0xA3,
    LeftAlt = 0xA4,
    RightAlt = 0xA5,
    /// `VK_OEM_1`.
    Semicolon = 0xBA,
    /// `VK_OEM_PLUS`.
    Equal = 0xBB,
    Comma = 0xBC,
    Minus = 0xBD,
    Period = 0xBE,
    /// `VK_OEM_2`.
    Slash = 0xBF,
    /// `VK_OEM_3`.
    Grave = 0xC0,
    /// `VK_OEM_4`.
    LeftBracket = 0xDB,
    /// `VK_OEM_5`.
    Backslash = 0xDC,
    /// `VK_OEM_6`.
    RightBracket = 0xDD,
    /// `VK_OEM_7`.
    Quote = 0xDE,
}

impl Key {
    /// Returns the virtual-key code (`VK_*`) for this key.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// True for keys that Windows flags as extended (`KEYEVENTF_EXTENDEDKEY`).
    ///
    /// The navigation cluster and right-hand modifiers share scan codes with
    /// keypad/left-hand keys and are only told apart by this flag.
    pub fn is_extended(self) -> bool {
        matches!(
            self,
            Self::PageUp
                | Self::PageDown
                | Self::End
                | Self::Home
                | Self::LeftArrow
                | Self::UpArrow
                | Self::RightArrow
                | Self::DownArrow
                | Self::Insert
                | Self::Delete
                | Self::NumpadDivide
                | Self::RightControl
                | Self::RightAlt
                | Self::Apps
        )
    }
}

impl TryFrom<u16> for Key {
    type Error = ();
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or(())
    }
}

impl From<Key> for u16 {
    fn from(k: Key) -> Self {
        k.code()
    }
}
