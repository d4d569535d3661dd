//! Engine configuration
//!
//! Defaults: damping 0.85, 100 iterations, tolerance 1e-8, uniform dangling handling,
//! suspicion-based personalization with weight 5.0.

use crate::algorithms::dangling::{DanglingStrategy, TeleportDangling, UniformDangling};
use crate::algorithms::personalization::{
    PersonalizationStrategy, SuspicionBased, TransactionVolume, DEFAULT_SUSPICION_WEIGHT,
};
use crate::error::RankError;
use std::fmt;
use std::str::FromStr;

/// Default damping factor (teleport probability)
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;

/// Default iteration budget
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default L1 convergence threshold
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Built-in dangling-node strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "api", derive(serde::Serialize, serde::Deserialize))]
pub enum DanglingStrategyKind {
    /// Spread dangling mass evenly
    #[default]
    Uniform,
    /// Spread dangling mass along the personalization vector
    Teleport,
}

impl DanglingStrategyKind {
    /// Boxed strategy object
    #[must_use]
    pub fn build(self) -> Box<dyn DanglingStrategy> {
        match self {
            Self::Uniform => Box::new(UniformDangling),
            Self::Teleport => Box::new(TeleportDangling::new()),
        }
    }
}

impl fmt::Display for DanglingStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("Uniform"),
            Self::Teleport => f.write_str("Teleport"),
        }
    }
}

impl FromStr for DanglingStrategyKind {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "uniform" => Ok(Self::Uniform),
            "teleport" => Ok(Self::Teleport),
            _ => Err(RankError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Built-in personalization strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "api", derive(serde::Serialize, serde::Deserialize))]
pub enum PersonalizationStrategyKind {
    /// Bias restarts toward suspicious nodes
    #[default]
    SuspicionBased,
    /// Restart in proportion to transaction volume
    TransactionVolume,
}

impl PersonalizationStrategyKind {
    /// Boxed strategy object; `suspicion_weight` only affects [`Self::SuspicionBased`]
    #[must_use]
    pub fn build(self, suspicion_weight: f64) -> Box<dyn PersonalizationStrategy> {
        match self {
            Self::SuspicionBased => Box::new(SuspicionBased::new(suspicion_weight)),
            Self::TransactionVolume => Box::new(TransactionVolume),
        }
    }
}

impl fmt::Display for PersonalizationStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuspicionBased => f.write_str("SuspicionBased"),
            Self::TransactionVolume => f.write_str("TransactionVolume"),
        }
    }
}

impl FromStr for PersonalizationStrategyKind {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "suspicionbased" | "suspicion" => Ok(Self::SuspicionBased),
            "transactionvolume" | "volume" => Ok(Self::TransactionVolume),
            _ => Err(RankError::UnknownStrategy(s.to_string())),
        }
    }
}

/// `SuspicionBased`, `suspicion_based` and `suspicion-based` all map to `suspicionbased`
fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// PageRank engine configuration
///
/// # Example
///
/// ```
/// use fraudrank::{DanglingStrategyKind, EngineConfig};
///
/// let config = EngineConfig::default()
///     .with_damping_factor(0.5)
///     .with_dangling_strategy(DanglingStrategyKind::Teleport);
/// assert!(config.validate().is_ok());
/// assert!(EngineConfig::default().with_damping_factor(1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "api", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "api", serde(default))]
pub struct EngineConfig {
    /// Teleport probability α, strictly inside (0, 1)
    pub damping_factor: f64,
    /// Iteration budget (at least 1)
    pub max_iterations: usize,
    /// L1 residual below which iteration stops
    pub tolerance: f64,
    /// Dangling-node policy
    pub dangling_strategy: DanglingStrategyKind,
    /// Restart-vector policy
    pub personalization_strategy: PersonalizationStrategyKind,
    /// Amplification for fully suspicious nodes (floored at 1.0 by the strategy)
    pub suspicion_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            damping_factor: DEFAULT_DAMPING_FACTOR,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            dangling_strategy: DanglingStrategyKind::default(),
            personalization_strategy: PersonalizationStrategyKind::default(),
            suspicion_weight: DEFAULT_SUSPICION_WEIGHT,
        }
    }
}

impl EngineConfig {
    /// Set the damping factor
    #[must_use]
    pub fn with_damping_factor(mut self, damping_factor: f64) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    /// Set the iteration budget
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the dangling-node strategy
    #[must_use]
    pub fn with_dangling_strategy(mut self, kind: DanglingStrategyKind) -> Self {
        self.dangling_strategy = kind;
        self
    }

    /// Set the personalization strategy
    #[must_use]
    pub fn with_personalization_strategy(mut self, kind: PersonalizationStrategyKind) -> Self {
        self.personalization_strategy = kind;
        self
    }

    /// Set the suspicion amplification factor
    #[must_use]
    pub fn with_suspicion_weight(mut self, suspicion_weight: f64) -> Self {
        self.suspicion_weight = suspicion_weight;
        self
    }

    /// Check every option; values are never clamped here
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint
    pub fn validate(&self) -> Result<(), RankError> {
        if !(self.damping_factor > 0.0 && self.damping_factor < 1.0) {
            return Err(RankError::InvalidDampingFactor(self.damping_factor));
        }
        if self.max_iterations == 0 {
            return Err(RankError::InvalidMaxIterations);
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RankError::InvalidTolerance(self.tolerance));
        }
        if !self.suspicion_weight.is_finite() {
            return Err(RankError::InvalidSuspicionWeight(self.suspicion_weight));
        }
        Ok(())
    }
}
