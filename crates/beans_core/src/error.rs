//! Error types for the simulation core.
//!
//! Every failure the core can report is one of these variants; none of them
//! is recovered from silently.

use beans_data::GenotypeError;
use thiserror::Error;

/// Main error type for beans_core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Invalid configuration values, raised before a world exists
    #[error("Configuration error: {0}")]
    Config(String),

    /// Genotype construction rejected a gene set
    #[error("Genotype error: {0}")]
    Genotype(#[from] GenotypeError),

    /// An explicit random sequence ran out of recorded values
    #[error("Randomness exhausted after {consumed} values")]
    RandomnessExhausted { consumed: usize },

    /// Factory lookup with a name outside the registry
    #[error("Unknown {kind}: {name}")]
    UnknownStrategy { kind: &'static str, name: String },

    /// Broken entity invariant, e.g. committing a foreign snapshot
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Result type alias for beans_core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    #[must_use]
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        Self::Invariant(msg.into())
    }

    #[must_use]
    pub fn unknown<S: Into<String>>(kind: &'static str, name: S) -> Self {
        Self::UnknownStrategy {
            kind,
            name: name.into(),
        }
    }
}

/// Fails with [`SimError::Config`] when `cond` does not hold.
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::SimError::Config(format!($($arg)+)));
        }
    };
}
pub(crate) use ensure_config;
