//! Ranking algorithms
//!
//! Personalized `PageRank` power iteration with pluggable dangling-node and
//! personalization strategies.

pub mod dangling;
pub mod pagerank;
pub mod personalization;

use std::collections::HashMap;

pub use dangling::{DanglingStrategy, TeleportDangling, UniformDangling};
pub use pagerank::{
    validate_suspicion_scores, ConvergenceInfo, EngineState, FraudCandidate, PageRankEngine,
    PageRankScores,
};
pub use personalization::{PersonalizationStrategy, SuspicionBased, TransactionVolume};

/// Sparse per-node scalar (suspicion in [0, 1], or non-negative base weight)
pub type ScoreMap = HashMap<String, f64>;

#[allow(clippy::cast_precision_loss)] // Graphs >2^52 nodes unlikely
pub(crate) fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Scale to sum 1; zero, negative or non-finite totals become uniform
pub(crate) fn normalize_or_uniform(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total.is_finite() && total > 0.0 {
        for v in values.iter_mut() {
            *v /= total;
        }
    } else {
        values.copy_from_slice(&uniform(values.len()));
    }
}
