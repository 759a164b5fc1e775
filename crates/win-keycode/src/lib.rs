//! win-keycode: Virtual-key identifiers and key combos for Windows.
//!
//! - `Key`: Enum of the Windows virtual-key codes a game keybind can use.
//! - `Modifier`: Enum of modifier keys with conversions to/from `Key`.
//! - `KeyCombo`: A key plus a modifier set, with a distinguished unset value.
//! - `MouseButton`: Mouse buttons, addressable through the same virtual-key space.
//! - Spec helpers: `Key::from_spec`, `Key::to_spec`, `KeyCombo::parse`.
//!
//! `Key` is `repr(u16)` and each variant carries its `VK_*` value, so
//! `key as u16` is the code passed to the OS input APIs.

mod key;
pub use key::Key;

mod spec;

mod modifiers;
pub use modifiers::Modifier;

mod combo;
pub use combo::KeyCombo;

mod mouse;
pub use mouse::MouseButton;
