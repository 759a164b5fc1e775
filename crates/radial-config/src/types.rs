//! Serde model of the on-disk configuration.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use win_keycode::KeyCombo;

use crate::Error;

/// Number of build/equipment template slots on the template wheel.
pub const TEMPLATE_SLOTS: usize = 9;
/// Number of chat command slots on the chat wheel.
pub const CHAT_COMMANDS: usize = 8;
/// Longest accepted `queuing.max_wait_s`.
pub const MAX_WAIT_S_LIMIT: u64 = 3600;
/// Longest accepted `queuing.settle_ms`.
pub const SETTLE_MS_LIMIT: u64 = 10_000;

/// Chat destination for a command.
///
/// `Dynamic` is a configuration-only value: it is resolved to one of the
/// concrete channels from game context each time a command is sent.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Squad chat (`/d`).
    Squad,
    /// Party chat (`/p`).
    Party,
    /// Map-local say (`/s`).
    Say,
    /// Commander squad broadcast, opened with its own key combo.
    Broadcast,
    /// Resolved at send time.
    #[default]
    Dynamic,
}

impl Channel {
    /// Every channel in index order.
    pub const ALL: [Self; 5] = [
        Self::Squad,
        Self::Party,
        Self::Say,
        Self::Broadcast,
        Self::Dynamic,
    ];

    /// Legacy integer encoding (0=squad, 1=party, 2=say, 3=broadcast, 4=dynamic).
    pub fn index(self) -> u8 {
        match self {
            Self::Squad => 0,
            Self::Party => 1,
            Self::Say => 2,
            Self::Broadcast => 3,
            Self::Dynamic => 4,
        }
    }

    /// Inverse of [`Channel::index`].
    pub fn from_index(i: u8) -> Option<Self> {
        Self::ALL.get(usize::from(i)).copied()
    }

    /// True for every channel except `Dynamic`.
    pub fn is_concrete(self) -> bool {
        self != Self::Dynamic
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Squad => "squad",
            Self::Party => "party",
            Self::Say => "say",
            Self::Broadcast => "broadcast",
            Self::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Global queuing behaviour for inputs the game would currently ignore.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Queuing {
    /// Queue unusable selections instead of dropping them.
    pub enabled: bool,
    /// Extra wait after conditions pass before a queued input is sent.
    pub settle_ms: u64,
    /// Maximum time a queued input may wait before it is dismissed.
    pub max_wait_s: u64,
    /// Selecting the empty center of the wheel cancels queued inputs.
    pub cancel_on_center: bool,
}

impl Default for Queuing {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_ms: 50,
            max_wait_s: 15,
            cancel_on_center: true,
        }
    }
}

impl Queuing {
    /// Settle delay as a `Duration`.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Maximum wait as a `Duration`.
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_s)
    }
}

/// One build + equipment template combination.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSlot {
    /// Wheel label; defaults to "Template Combo N".
    pub label: Option<String>,
    /// In-game keybind of the build template.
    pub build: KeyCombo,
    /// In-game keybind of the equipment template.
    pub equip: KeyCombo,
    /// Sorting priority; defaults to the slot index.
    pub priority: Option<i32>,
}

/// One preset chat message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatCommand {
    /// Wheel label.
    pub label: String,
    /// Message text, without any channel prefix.
    pub message: String,
    /// Destination channel.
    pub channel: Channel,
    /// Disabled commands never appear on the wheel.
    pub enabled: bool,
    /// Sorting priority; defaults to the command index.
    pub priority: Option<i32>,
}

impl Default for ChatCommand {
    fn default() -> Self {
        Self {
            label: String::new(),
            message: String::new(),
            channel: Channel::Dynamic,
            enabled: false,
            priority: None,
        }
    }
}

/// Chat wheel settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Chat {
    /// Channel used by `Dynamic` when no group context applies (Squad or Say).
    pub dynamic_fallback: Channel,
    /// Command slots.
    pub commands: Vec<ChatCommand>,
}

impl Default for Chat {
    fn default() -> Self {
        Self {
            dynamic_fallback: Channel::Squad,
            commands: (1..=CHAT_COMMANDS)
                .map(|i| ChatCommand {
                    label: format!("Command {i}"),
                    ..ChatCommand::default()
                })
                .collect(),
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Queuing parameters shared by every trigger.
    pub queuing: Queuing,
    /// Template slots, in default wheel order.
    pub templates: Vec<TemplateSlot>,
    /// Chat wheel.
    pub chat: Chat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queuing: Queuing::default(),
            templates: vec![TemplateSlot::default(); TEMPLATE_SLOTS],
            chat: Chat::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from RON text and validate it.
    pub fn from_ron(text: &str) -> Result<Self, Error> {
        let cfg: Self = ron::from_str(text).map_err(|e| Error::Parse {
            path: None,
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Render this configuration as pretty RON.
    pub fn to_ron(&self) -> Result<String, Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            Error::Serialize {
                path: None,
                message: e.to_string(),
            }
        })
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if self.templates.len() > TEMPLATE_SLOTS {
            return Err(Error::invalid(format!(
                "at most {TEMPLATE_SLOTS} template slots are supported, found {}",
                self.templates.len()
            )));
        }
        if self.chat.commands.len() > CHAT_COMMANDS {
            return Err(Error::invalid(format!(
                "at most {CHAT_COMMANDS} chat commands are supported, found {}",
                self.chat.commands.len()
            )));
        }
        if !matches!(self.chat.dynamic_fallback, Channel::Squad | Channel::Say) {
            return Err(Error::invalid(format!(
                "dynamic_fallback must be Squad or Say, not {}",
                self.chat.dynamic_fallback
            )));
        }
        if self.queuing.max_wait_s == 0 {
            return Err(Error::invalid("queuing.max_wait_s must be at least 1"));
        }
        if self.queuing.max_wait_s > MAX_WAIT_S_LIMIT {
            return Err(Error::invalid(format!(
                "queuing.max_wait_s must be at most {MAX_WAIT_S_LIMIT}, found {}",
                self.queuing.max_wait_s
            )));
        }
        if self.queuing.settle_ms > SETTLE_MS_LIMIT {
            return Err(Error::invalid(format!(
                "queuing.settle_ms must be at most {SETTLE_MS_LIMIT}, found {}",
                self.queuing.settle_ms
            )));
        }
        Ok(())
    }

    /// Label of template slot `index` (0-based).
    pub fn template_label(&self, index: usize) -> String {
        self.templates
            .get(index)
            .and_then(|s| s.label.clone())
            .unwrap_or_else(|| format!("Template Combo {}", index + 1))
    }
}
