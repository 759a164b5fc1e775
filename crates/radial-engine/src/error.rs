use std::result::Result as StdResult;

use thiserror::Error;

use crate::TriggerId;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the radial engine.
///
/// Only configuration-time calls return errors. Per-frame calls report
/// their outcome through [`crate::DispatchOutcome`] instead.
#[derive(Debug, Error)]
pub enum Error {
    /// No trigger with this id exists.
    #[error("Unknown trigger: {0}")]
    UnknownTrigger(TriggerId),

    /// Configuration failed to load or validate.
    #[error("Configuration error: {0}")]
    Config(#[from] radial_config::Error),
}
