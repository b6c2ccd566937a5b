//! Error types for the simulation engine.
//!
//! Lookup misses (unset gradient entries) are not errors; they come back as `None`.
//! Everything here is fatal for the run and propagates to the driver.

use embryoid_data::AgentId;
use thiserror::Error;

/// Main error type for embryoid_core operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// Differentiation parameter vector is malformed
    #[error("Invalid differentiation parameters: {0}")]
    InvalidParams(String),

    /// A Hill term overflowed to a non-finite value
    #[error("Numeric overflow in {term}: {value}")]
    NumericOverflow { term: &'static str, value: f64 },

    /// Positive feedback evaluated as 0/0
    #[error("Degenerate Hill function: k2^n2 and norm_d^n2 are both zero")]
    DegenerateHill,

    /// Allocator handed out an identity that is already live
    #[error("Duplicate agent ID: {0}")]
    DuplicateAgent(AgentId),

    /// Referenced agent is not part of the population
    #[error("Unknown agent ID: {0}")]
    UnknownAgent(AgentId),

    /// Configuration could not be used
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for embryoid_core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new invalid parameters error.
    #[must_use]
    pub fn invalid_params<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::invalid_params("expected 5 entries, found 3");
        assert_eq!(
            err.to_string(),
            "Invalid differentiation parameters: expected 5 entries, found 3"
        );
    }

    #[test]
    fn test_duplicate_agent_display() {
        let err = SimError::DuplicateAgent(AgentId(7));
        assert_eq!(err.to_string(), "Duplicate agent ID: 7");
    }
}
