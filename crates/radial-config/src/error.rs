//! Error types for configuration loading and validation.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while loading, parsing, or validating a configuration.
pub enum Error {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// RON syntax or shape error. The message carries the line and column.
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// A configuration could not be rendered as RON.
    Serialize {
        /// Optional path the configuration was being written to.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// The file parsed but describes an impossible configuration.
    Validation {
        /// Optional path associated with the validation error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Build a validation error without a path.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            path: None,
            message: message.into(),
        }
    }

    /// Attach `p` to this error if it has no path yet.
    pub fn with_path(mut self, p: &Path) -> Self {
        let slot = match &mut self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Serialize { path, .. }
            | Self::Validation { path, .. } => path,
        };
        if slot.is_none() {
            *slot = Some(p.to_path_buf());
        }
        self
    }

    /// Path associated with this error, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Serialize { path, .. }
            | Self::Validation { path, .. } => path.as_deref(),
        }
    }

    /// Render a human-friendly error message including the path when known.
    pub fn pretty(&self) -> String {
        let (kind, message) = match self {
            Self::Read { message, .. } => ("Read error", message),
            Self::Parse { message, .. } => ("Config parse error", message),
            Self::Serialize { message, .. } => ("Config serialize error", message),
            Self::Validation { message, .. } => ("Config validation error", message),
        };
        match self.path() {
            Some(p) => format!("{kind} at {}: {message}", p.display()),
            None => format!("{kind}: {message}"),
        }
    }
}
