//! Personalization (restart) vector strategies
//!
//! Every strategy returns a probability distribution over `node_ids`: non-negative entries
//! summing to 1. Zero total mass falls back to uniform rather than producing NaN.

use super::{normalize_or_uniform, uniform, ScoreMap};
use std::fmt;

/// Default amplification for fully suspicious nodes
pub const DEFAULT_SUSPICION_WEIGHT: f64 = 5.0;

/// Computes the teleportation vector for a PageRank run
pub trait PersonalizationStrategy: fmt::Debug + Send + Sync {
    /// Restart distribution aligned with `node_ids`
    ///
    /// Entries of `suspicion` or `base_weights` naming unknown nodes are ignored.
    fn compute_personalization_vector(
        &self,
        node_ids: &[String],
        suspicion: Option<&ScoreMap>,
        base_weights: Option<&ScoreMap>,
    ) -> Vec<f64>;

    /// Human-readable description for diagnostics
    fn description(&self) -> String;
}

/// Suspicion scores are clamped into [0, 1]; NaN counts as 0
fn suspicion_of(suspicion: Option<&ScoreMap>, id: &str) -> f64 {
    suspicion
        .and_then(|map| map.get(id))
        .filter(|s| !s.is_nan())
        .map_or(0.0, |s| s.clamp(0.0, 1.0))
}

/// Weights below zero (or non-finite) count as 0
fn weight_of(base_weights: Option<&ScoreMap>, id: &str) -> Option<f64> {
    base_weights
        .and_then(|map| map.get(id))
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
}

/// Restart mass biased toward suspicious nodes
///
/// Each node starts at `1/n` (or its base weight when one is given) and is multiplied by
/// `1 + (suspicion_weight - 1) * suspicion`.
#[derive(Debug, Clone, Copy)]
pub struct SuspicionBased {
    suspicion_weight: f64,
}

impl SuspicionBased {
    /// Amplification factor floored at 1.0
    #[must_use]
    pub fn new(suspicion_weight: f64) -> Self {
        Self {
            suspicion_weight: suspicion_weight.max(1.0),
        }
    }

    /// Effective amplification factor
    #[must_use]
    pub const fn suspicion_weight(&self) -> f64 {
        self.suspicion_weight
    }
}

impl Default for SuspicionBased {
    fn default() -> Self {
        Self::new(DEFAULT_SUSPICION_WEIGHT)
    }
}

impl PersonalizationStrategy for SuspicionBased {
    #[allow(clippy::cast_precision_loss)] // Graphs >2^52 nodes unlikely
    fn compute_personalization_vector(
        &self,
        node_ids: &[String],
        suspicion: Option<&ScoreMap>,
        base_weights: Option<&ScoreMap>,
    ) -> Vec<f64> {
        let n = node_ids.len();
        if n == 0 {
            return Vec::new();
        }
        let share = 1.0 / n as f64;

        let mut mass: Vec<f64> = node_ids
            .iter()
            .map(|id| {
                let base = weight_of(base_weights, id).unwrap_or(share);
                let boost = 1.0 + (self.suspicion_weight - 1.0) * suspicion_of(suspicion, id);
                base * boost
            })
            .collect();

        normalize_or_uniform(&mut mass);
        mass
    }

    fn description(&self) -> String {
        format!(
            "Suspicion-biased personalization (weight={})",
            self.suspicion_weight
        )
    }
}

/// Restart mass proportional to transaction volume
///
/// Without base weights this is uniform. Otherwise each node is seeded with its volume
/// and suspicious nodes gain `suspicion * total_volume / n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionVolume;

impl PersonalizationStrategy for TransactionVolume {
    #[allow(clippy::cast_precision_loss)]
    fn compute_personalization_vector(
        &self,
        node_ids: &[String],
        suspicion: Option<&ScoreMap>,
        base_weights: Option<&ScoreMap>,
    ) -> Vec<f64> {
        let n = node_ids.len();
        match base_weights {
            Some(weights) if !weights.is_empty() => {}
            _ => return uniform(n),
        }

        let mut mass: Vec<f64> = node_ids
            .iter()
            .map(|id| weight_of(base_weights, id).unwrap_or(0.0))
            .collect();
        let total_volume: f64 = mass.iter().sum();

        for (slot, id) in mass.iter_mut().zip(node_ids) {
            *slot += suspicion_of(suspicion, id) * total_volume / n as f64;
        }

        normalize_or_uniform(&mut mass);
        mass
    }

    fn description(&self) -> String {
        "Transaction volume weighted personalization".to_string()
    }
}
