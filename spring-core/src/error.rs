//! Error types.
//!
//! Construction-time problems are returned as [`Error`]. Problems detected
//! while ticking are never returned; they are described by [`Violation`],
//! logged, and the offending tick is skipped.

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected configuration (non-positive mass or radius, bad spring, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// Named scenario file does not exist.
    #[error("scenario not found: {0}")]
    NotFound(String),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O failure while loading config or exporting a series.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

/// A tick-time invariant violation. The tick becomes a no-op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("time step must be finite and > 0, got {0}")]
    InvalidTimeStep(f64),

    #[error("advance called before initialize")]
    NotInitialized,

    #[error("body state is not finite: {0}")]
    NonFiniteState(String),
}
