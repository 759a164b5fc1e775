//! Game-state snapshots.
//!
//! The engine never reads live game state. The host polls its observer once
//! per frame and passes a [`GameContext`] value into every engine call. For
//! Guild Wars 2 the observer is the MumbleLink shared-memory block;
//! [`MumbleState::context`] decodes the fields the engine cares about.

use serde::Deserialize;
use tracing::trace;

/// Immutable snapshot of the game state relevant to gating and routing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GameContext {
    /// The game's own chat input box has keyboard focus.
    pub chat_focused: bool,
    /// The player has a commander tag up.
    pub commander: bool,
    /// The current map is a fractal (or the fractal lobby).
    pub in_fractals: bool,
    /// The current map is a World vs. World map.
    pub in_wvw: bool,
    /// The player is in combat.
    pub in_combat: bool,
    /// The player is submerged.
    pub underwater: bool,
    /// The player is swimming at the water surface.
    pub on_water: bool,
}

/// MumbleLink `uiState` bit: the chat text box has focus.
pub const UI_TEXTBOX_FOCUS: u32 = 1 << 5;
/// MumbleLink `uiState` bit: the player is in combat.
pub const UI_IN_COMBAT: u32 = 1 << 6;

/// Avatar height below which the player counts as underwater.
const UNDERWATER_Y: f32 = -1.2;
/// Avatar height below which the player counts as swimming on the surface.
const SURFACE_Y: f32 = -1.0;

/// WvW map types: eternal battlegrounds, the three borderlands, edge of the
/// mists, obsidian sanctum, armistice bastion.
const WVW_MAP_TYPES: &[u32] = &[9, 10, 11, 12, 13, 14, 15, 18];

/// Fractal map ids, including the Mistlock Observatory lobby.
const FRACTAL_MAP_IDS: &[u32] = &[
    872, 947, 948, 949, 950, 951, 952, 953, 954, 955, 956, 957, 958, 959, 960, 1164, 1177, 1205,
    1267, 1290, 1309, 1384, 1500, 1538,
];

/// Raw MumbleLink values, as copied out of shared memory by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MumbleState {
    /// `context.uiState` bitfield.
    pub ui_state: u32,
    /// `context.mapType`.
    pub map_type: u32,
    /// `context.mapId`.
    pub map_id: u32,
    /// Vertical avatar position (`fAvatarPosition[1]`), in meters.
    pub avatar_y: f32,
    /// `identity` JSON string.
    pub identity: String,
}

/// Fields read from the identity JSON. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct Identity {
    /// Commander tag state.
    #[serde(default)]
    commander: bool,
}

impl MumbleState {
    /// Decode into a [`GameContext`].
    ///
    /// Malformed identity JSON (e.g. read mid-write) decodes as "not a
    /// commander" for this frame.
    pub fn context(&self) -> GameContext {
        let identity = serde_json::from_str::<Identity>(&self.identity).unwrap_or_else(|e| {
            trace!(error = %e, "mumble_identity_unparsed");
            Identity::default()
        });
        let underwater = self.avatar_y < UNDERWATER_Y;
        GameContext {
            chat_focused: self.ui_state & UI_TEXTBOX_FOCUS != 0,
            commander: identity.commander,
            in_fractals: FRACTAL_MAP_IDS.contains(&self.map_id),
            in_wvw: WVW_MAP_TYPES.contains(&self.map_type),
            in_combat: self.ui_state & UI_IN_COMBAT != 0,
            underwater,
            on_water: !underwater && self.avatar_y < SURFACE_Y,
        }
    }
}
