//! Dangling-node strategies
//!
//! A dangling node has no outgoing edges, so its column in the transition matrix is all
//! zeros and its rank mass would leak. A strategy supplies the distribution that mass is
//! sent along instead. The dense path writes that distribution into every dangling column;
//! the sparse path multiplies it by the dangling mass each iteration. Both use the same
//! [`DanglingStrategy::redistribution`], so the two paths agree.

use super::uniform;
use crate::error::RankError;
use crate::storage::DenseMatrix;
use std::fmt;

/// Redistribution policy for rank mass sitting on dangling nodes
pub trait DanglingStrategy: fmt::Debug + Send + Sync {
    /// Probability distribution (length `n`) receiving a dangling node's mass
    ///
    /// `teleport` is the personalization vector of the running computation, when there is one.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if a supplied vector has the wrong length
    fn redistribution(&self, n: usize, teleport: Option<&[f64]>) -> Result<Vec<f64>, RankError>;

    /// Human-readable description for diagnostics
    fn description(&self) -> String;

    /// Overwrite every column flagged in `mask` with [`Self::redistribution`]
    ///
    /// Stateless with respect to node identifiers: only matrix indices are used.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if the matrix is not square or the mask length differs
    fn handle_dangling_nodes(
        &self,
        matrix: &mut DenseMatrix,
        mask: &[bool],
        teleport: Option<&[f64]>,
    ) -> Result<(), RankError> {
        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(RankError::square("transition matrix", rows, rows, cols));
        }
        if mask.len() != cols {
            return Err(RankError::length("dangling mask", cols, mask.len()));
        }
        if !mask.iter().any(|&d| d) {
            return Ok(());
        }

        let distribution = self.redistribution(rows, teleport)?;
        for (col, _) in mask.iter().enumerate().filter(|&(_, &dangling)| dangling) {
            for (row, &value) in distribution.iter().enumerate() {
                matrix.set(row, col, value);
            }
        }
        Ok(())
    }
}

/// Spread dangling mass evenly over all nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformDangling;

impl DanglingStrategy for UniformDangling {
    fn redistribution(&self, n: usize, _teleport: Option<&[f64]>) -> Result<Vec<f64>, RankError> {
        Ok(uniform(n))
    }

    fn description(&self) -> String {
        "Uniform redistribution of dangling node rank to all nodes".to_string()
    }
}

/// Send dangling mass along a personalization vector
///
/// Uses the vector given at construction if any, else the running computation's
/// personalization vector, else uniform.
#[derive(Debug, Clone, Default)]
pub struct TeleportDangling {
    personalization: Option<Vec<f64>>,
}

impl TeleportDangling {
    /// Follow the personalization vector of each computation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always follow `personalization` (normalised on use)
    #[must_use]
    pub fn with_vector(personalization: Vec<f64>) -> Self {
        Self {
            personalization: Some(personalization),
        }
    }
}

impl DanglingStrategy for TeleportDangling {
    fn redistribution(&self, n: usize, teleport: Option<&[f64]>) -> Result<Vec<f64>, RankError> {
        let Some(vector) = self.personalization.as_deref().or(teleport) else {
            return Ok(uniform(n));
        };
        if vector.len() != n {
            return Err(RankError::length("teleport vector", n, vector.len()));
        }

        let total: f64 = vector.iter().filter(|v| v.is_finite() && **v > 0.0).sum();
        if total > 0.0 {
            Ok(vector
                .iter()
                .map(|&v| if v.is_finite() && v > 0.0 { v / total } else { 0.0 })
                .collect())
        } else {
            Ok(uniform(n))
        }
    }

    fn description(&self) -> String {
        "Redirect dangling nodes according to personalization vector".to_string()
    }
}
