//! Error taxonomy for the ranking core
//!
//! Configuration and shape faults are raised synchronously at the call that detects them.
//! Numerical degeneracies (zero-mass vectors) are not errors: they fall back to uniform.

use thiserror::Error;

/// Faults raised by graph construction, engine configuration and matrix shape checks
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    /// Damping factor outside the open interval (0, 1)
    #[error("damping factor must lie strictly between 0 and 1, got {0}")]
    InvalidDampingFactor(f64),

    /// Tolerance is not a positive finite number
    #[error("tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f64),

    /// Iteration budget of zero
    #[error("max_iterations must be at least 1")]
    InvalidMaxIterations,

    /// Suspicion amplification factor is NaN or infinite
    #[error("suspicion weight must be finite, got {0}")]
    InvalidSuspicionWeight(f64),

    /// Matrix or vector shape does not match the node list
    #[error("{what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Which operand was checked
        what: &'static str,
        /// Expected size (rendered)
        expected: String,
        /// Observed size (rendered)
        found: String,
    },

    /// Dense matrix rows of unequal length
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        /// Offending row index
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of the offending row
        found: usize,
    },

    /// Edge weight is negative or not finite
    #[error("edge {source_node} -> {target} has invalid weight {weight}")]
    InvalidWeight {
        /// Edge source identifier
        source_node: String,
        /// Edge target identifier
        target: String,
        /// Rejected weight
        weight: f64,
    },

    /// Matrix entry is negative or not finite
    #[error("{what} entry ({row}, {col}) must be a non-negative finite number, got {value}")]
    InvalidEntry {
        /// Which operand was checked
        what: &'static str,
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Rejected value
        value: f64,
    },

    /// Suspicion score outside [0, 1]
    #[error("suspicion score for node {node} must be between 0 and 1, got {score}")]
    InvalidSuspicion {
        /// Node identifier
        node: String,
        /// Rejected score
        score: f64,
    },

    /// Strategy name not recognised
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

impl RankError {
    /// Shape mismatch for a square `n × n` operand
    pub(crate) fn square(what: &'static str, n: usize, rows: usize, cols: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected: format!("{n}x{n}"),
            found: format!("{rows}x{cols}"),
        }
    }

    /// Shape mismatch for a vector operand
    pub(crate) fn length(what: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
