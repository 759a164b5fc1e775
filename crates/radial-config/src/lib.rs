//! Configuration types for the radial wheels: template bindings, chat
//! commands, dynamic chat routing and queuing parameters.
#![warn(unsafe_op_in_unsafe_fn)]

use std::{env, path::PathBuf};

mod error;
mod loader;
mod types;

pub use error::Error;
pub use loader::load_from_path;
pub use types::{
    CHAT_COMMANDS, Channel, Chat, ChatCommand, Config, MAX_WAIT_S_LIMIT, Queuing, SETTLE_MS_LIMIT,
    TEMPLATE_SLOTS, TemplateSlot,
};

/// Determine the preferred user config path (`<config dir>/radial/config.ron`).
///
/// Uses `APPDATA` on Windows hosts and `XDG_CONFIG_HOME` (then `~/.config`)
/// elsewhere.
pub fn default_config_path() -> PathBuf {
    let base = env::var_os("APPDATA")
        .or_else(|| env::var_os("XDG_CONFIG_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
            p.push(".config");
            p
        });
    base.join("radial").join("config.ron")
}
