//! Error types and result alias for the keysend crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Crate-local `Result` alias using the send error type.
pub type Result<T> = StdResult<T, Error>;

/// Errors that can occur while synthesizing or posting events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The OS accepted fewer events than were submitted (blocked by UIPI or
    /// another input desktop).
    #[error("Input rejected: {sent} of {expected} events inserted")]
    Rejected {
        /// Number of events the OS reported as inserted.
        sent: usize,
        /// Number of events submitted.
        expected: usize,
    },
    /// Synthetic input is not available on this platform.
    #[error("Synthetic input is unsupported on this platform")]
    Unsupported,
}
