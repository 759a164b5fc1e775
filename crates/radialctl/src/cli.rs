//! Command-line interface definitions for radialctl.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;
use radial_engine::GameContext;

/// Command-line interface for the `radialctl` binary.
#[derive(Parser, Debug)]
#[command(
    name = "radialctl",
    about = "Check radial wheel configurations and dry-run dispatches",
    version
)]
pub struct Cli {
    /// Logging controls shared across radial binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration and print both wheels for a game context.
    Check(CheckArgs),
    /// Select a trigger against a recording sink and print the input timeline.
    Send(SendArgs),
    /// Print the default configuration as RON.
    Default,
}

/// Game state to evaluate against.
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// The player has a commander tag up.
    #[arg(long)]
    pub commander: bool,
    /// The player is in a fractal.
    #[arg(long)]
    pub fractals: bool,
    /// The player is in World vs. World.
    #[arg(long)]
    pub wvw: bool,
    /// The player is in combat.
    #[arg(long)]
    pub combat: bool,
    /// The player is underwater.
    #[arg(long)]
    pub underwater: bool,
    /// The player is swimming on the surface.
    #[arg(long)]
    pub on_water: bool,
    /// The game's chat box has focus.
    #[arg(long)]
    pub chat_focused: bool,
}

impl ContextArgs {
    /// The context snapshot these flags describe.
    pub fn context(&self) -> GameContext {
        GameContext {
            chat_focused: self.chat_focused,
            commander: self.commander,
            in_fractals: self.fractals,
            in_wvw: self.wvw,
            in_combat: self.combat,
            underwater: self.underwater,
            on_water: self.on_water,
        }
    }
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Configuration file (RON). Defaults to the per-user config path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Game state.
    #[command(flatten)]
    pub ctx: ContextArgs,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Trigger to select: `template1`..`template9` or `chat1`..`chat8`.
    #[arg(value_name = "TRIGGER")]
    pub trigger: String,

    /// Configuration file (RON). Defaults to the per-user config path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat an input as physically held, e.g. `w` or `mouse-right`. Repeatable.
    #[arg(long = "hold", value_name = "INPUT")]
    pub hold: Vec<String>,

    /// Game state.
    #[command(flatten)]
    pub ctx: ContextArgs,
}
