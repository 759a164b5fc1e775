//! Error handling for radialctl.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for radialctl operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running radialctl.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Configuration failed to load or validate.
    #[error("{}", .0.pretty())]
    Config(#[from] radial_config::Error),
    /// The engine rejected the configuration or an edit.
    #[error("Engine error: {0}")]
    Engine(#[from] radial_engine::Error),
    /// A trigger name did not parse.
    #[error("Unknown trigger '{0}'; expected template1..template9 or chat1..chat8")]
    BadTrigger(String),
    /// A held-input name did not parse.
    #[error("Unknown input '{0}'; expected a key name or mouse-left/mouse-right")]
    BadInput(String),
}
