//! Personalized `PageRank` engine
//!
//! Based on Page et al. (1999) "The `PageRank` Citation Ranking: Bringing Order to the Web",
//! with restart mass biased toward suspicious accounts.
//!
//! # Algorithm
//!
//! ```text
//! r(t+1) = (1 - α) * (M @ r(t) + dangling_sum(t) * d) + α * p
//! ```
//!
//! Where:
//! - α = damping factor (probability of restarting at `p`)
//! - M = column-stochastic transition operator, `M[target][source] = w / out_degree(source)`
//! - d = redistribution vector of the configured dangling strategy
//! - p = personalization vector
//!
//! The dense path writes `d` into the dangling columns of M (so `dangling_sum` is folded into
//! `M @ r`); the sparse path keeps M sparse and adds `dangling_sum * d` explicitly. Both run
//! the same loop and stop once the L1 residual drops below the tolerance.

use super::dangling::DanglingStrategy;
use super::personalization::PersonalizationStrategy;
use super::{normalize_or_uniform, uniform, ScoreMap};
use crate::config::EngineConfig;
use crate::error::RankError;
use crate::storage::matrix::normalize_weights;
use crate::storage::{CsrMatrix, DenseMatrix, TransactionGraph};
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// Per-node scores aligned with the node ordering they were computed for
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankScores {
    node_ids: Vec<String>,
    scores: Vec<f64>,
    index: HashMap<String, usize>,
}

impl PageRankScores {
    /// Pair `node_ids` with `scores` positionally
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if lengths differ
    pub fn new(node_ids: Vec<String>, scores: Vec<f64>) -> Result<Self, RankError> {
        if node_ids.len() != scores.len() {
            return Err(RankError::length("scores", node_ids.len(), scores.len()));
        }
        let index = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Ok(Self {
            node_ids,
            scores,
            index,
        })
    }

    /// Score of one node
    #[must_use]
    pub fn get(&self, id: &str) -> Option<f64> {
        self.index.get(id).map(|&i| self.scores[i])
    }

    /// `(node_id, score)` pairs in node order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.node_ids
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    /// Node identifiers in order
    #[must_use]
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    /// Raw score vector
    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether there are no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Total mass (1.0 at convergence)
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Copy into an unordered map
    #[must_use]
    pub fn to_map(&self) -> ScoreMap {
        self.iter().map(|(id, s)| (id.to_string(), s)).collect()
    }
}

/// A ranked fraud candidate
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "api", derive(serde::Serialize, serde::Deserialize))]
pub struct FraudCandidate {
    /// Node identifier
    pub node_id: String,
    /// `PageRank` score
    pub pagerank: f64,
    /// Supplied suspicion (0 when absent)
    pub suspicion: f64,
}

impl FraudCandidate {
    /// `pagerank * (1 + suspicion)`
    #[must_use]
    pub fn risk_score(&self) -> f64 {
        self.pagerank * (1.0 + self.suspicion)
    }
}

/// Engine lifecycle as observed between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "api", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineState {
    /// No computation has run yet
    Configured,
    /// Last computation met the tolerance
    Converged,
    /// Last computation used the whole iteration budget
    Exhausted,
}

/// Diagnostics of the last computation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "api", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceInfo {
    /// Damping factor used
    pub damping_factor: f64,
    /// Tolerance used
    pub tolerance: f64,
    /// Iteration budget
    pub max_iterations: usize,
    /// Whether the tolerance was met
    pub converged: bool,
    /// Iterations run (equals `max_iterations` when exhausted)
    pub iterations_performed: usize,
    /// Final L1 residual (0 before any run)
    pub residual: f64,
    /// L1 residual after each iteration
    pub residuals: Vec<f64>,
    /// Active dangling strategy
    pub dangling_strategy: String,
    /// Active personalization strategy
    pub personalization_strategy: String,
}

#[derive(Debug, Clone, Default)]
struct IterationReport {
    converged: bool,
    iterations: usize,
    residuals: Vec<f64>,
}

/// Personalized `PageRank` engine
///
/// Owns its configuration and strategies. Derived artifacts of the last call (transition
/// matrix, personalization vector, scores, diagnostics) are cached for introspection and
/// overwritten by the next call.
///
/// # Example
///
/// ```
/// use fraudrank::{EngineConfig, PageRankEngine, ScoreMap, TransactionGraph};
///
/// let mut graph = TransactionGraph::directed();
/// for (s, t) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")] {
///     graph.add_edge(s, t, 1.0).unwrap();
/// }
///
/// let suspicion: ScoreMap = [("C".to_string(), 1.0)].into_iter().collect();
/// let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
/// let scores = engine.compute_graph_page_rank(&graph, Some(&suspicion), None).unwrap();
///
/// assert!((scores.sum() - 1.0).abs() < 1e-9);
/// let top = PageRankEngine::get_top_fraud_candidates(&scores, Some(&suspicion), 1);
/// assert_eq!(top[0].node_id, "C");
/// ```
#[derive(Debug)]
pub struct PageRankEngine {
    config: EngineConfig,
    dangling: Box<dyn DanglingStrategy>,
    personalization: Box<dyn PersonalizationStrategy>,

    transition: Option<DenseMatrix>,
    personalization_vector: Option<Vec<f64>>,
    scores: Option<PageRankScores>,
    report: IterationReport,
    state: EngineState,
}

impl PageRankEngine {
    /// Engine with the strategies named in `config`
    ///
    /// # Errors
    ///
    /// Returns the configuration error if `config` is invalid (e.g. damping outside (0, 1))
    pub fn new(config: EngineConfig) -> Result<Self, RankError> {
        let dangling = config.dangling_strategy.build();
        let personalization = config
            .personalization_strategy
            .build(config.suspicion_weight);
        Self::with_strategies(config, dangling, personalization)
    }

    /// Engine with caller-supplied strategies (the strategy kinds in `config` are ignored)
    ///
    /// # Errors
    ///
    /// Returns the configuration error if `config` is invalid
    pub fn with_strategies(
        config: EngineConfig,
        dangling: Box<dyn DanglingStrategy>,
        personalization: Box<dyn PersonalizationStrategy>,
    ) -> Result<Self, RankError> {
        config.validate()?;
        Ok(Self {
            config,
            dangling,
            personalization,
            transition: None,
            personalization_vector: None,
            scores: None,
            report: IterationReport::default(),
            state: EngineState::Configured,
        })
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Outcome of the last computation
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Dense transition matrix of the last dense build
    #[must_use]
    pub fn transition_matrix(&self) -> Option<&DenseMatrix> {
        self.transition.as_ref()
    }

    /// Personalization vector of the last computation
    #[must_use]
    pub fn personalization_vector(&self) -> Option<&[f64]> {
        self.personalization_vector.as_deref()
    }

    /// Scores of the last computation
    #[must_use]
    pub fn last_scores(&self) -> Option<&PageRankScores> {
        self.scores.as_ref()
    }

    /// Column-stochastic transition matrix from a source-row adjacency
    ///
    /// `adjacency[i][j]` is the weight of `i → j` (the layout of
    /// [`TransactionGraph::get_adjacency_matrix`]); `weights`, if given, is multiplied in
    /// element-wise. Column `j` of the result holds `j`'s normalised out-edges. A node without
    /// positive out-weight (no edges, or only zero-weight edges) is dangling, and its column
    /// is filled by the dangling strategy (with no personalization vector).
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] for non-square inputs or mismatched overlays,
    /// and [`RankError::InvalidEntry`] if a weighted entry is negative or not finite
    pub fn build_transition_matrix(
        &mut self,
        adjacency: &DenseMatrix,
        weights: Option<&DenseMatrix>,
    ) -> Result<DenseMatrix, RankError> {
        let matrix = self.dense_transition(adjacency, weights, None)?;
        self.transition = Some(matrix.clone());
        Ok(matrix)
    }

    fn dense_transition(
        &self,
        adjacency: &DenseMatrix,
        weights: Option<&DenseMatrix>,
        teleport: Option<&[f64]>,
    ) -> Result<DenseMatrix, RankError> {
        let (rows, cols) = adjacency.shape();
        if rows != cols {
            return Err(RankError::square("adjacency", rows, rows, cols));
        }
        let weighted = match weights {
            Some(overlay) => adjacency.hadamard(overlay)?,
            None => adjacency.clone(),
        };

        // Row i = outgoing weights of i; rows without positive mass are dangling
        let mut stochastic = DenseMatrix::square(rows);
        let mut mask = vec![false; rows];
        for source in 0..rows {
            let mut out = weighted.row(source).to_vec();
            check_entries(source, out.iter().copied().enumerate())?;
            if normalize_weights(&mut out) {
                for (target, probability) in out.into_iter().enumerate() {
                    stochastic.set(source, target, probability);
                }
            } else {
                mask[source] = true;
            }
        }

        let mut matrix = stochastic.transpose();
        self.dangling
            .handle_dangling_nodes(&mut matrix, &mask, teleport)?;
        Ok(matrix)
    }

    /// Restart distribution from the configured personalization strategy
    pub fn compute_personalization_vector(
        &mut self,
        node_ids: &[String],
        suspicion: Option<&ScoreMap>,
        base_weights: Option<&ScoreMap>,
    ) -> Vec<f64> {
        let vector =
            self.personalization
                .compute_personalization_vector(node_ids, suspicion, base_weights);
        self.personalization_vector = Some(vector.clone());
        vector
    }

    /// Dense power iteration
    ///
    /// `adjacency` uses the source-row layout; see [`Self::build_transition_matrix`].
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if `adjacency` or `weights` is not `n × n`,
    /// and [`RankError::InvalidEntry`] if a weighted entry is negative or not finite
    pub fn compute_page_rank(
        &mut self,
        node_ids: &[String],
        adjacency: &DenseMatrix,
        weights: Option<&DenseMatrix>,
        suspicion: Option<&ScoreMap>,
        base_weights: Option<&ScoreMap>,
    ) -> Result<PageRankScores, RankError> {
        let n = node_ids.len();
        let (rows, cols) = adjacency.shape();
        if rows != n || cols != n {
            return Err(RankError::square("adjacency", n, rows, cols));
        }

        let p = self
            .personalization
            .compute_personalization_vector(node_ids, suspicion, base_weights);
        let matrix = self.dense_transition(adjacency, weights, Some(&p))?;
        debug!(
            nodes = n,
            dangling = %self.dangling.description(),
            personalization = %self.personalization.description(),
            "dense PageRank started"
        );

        let (ranks, report) = self.power_iterate(&p, |r, out| matrix.mul_vec(r, out))?;
        self.transition = Some(matrix);
        self.finish(node_ids, p, ranks, report)
    }

    /// Sparse power iteration: one CSR mat-vec per iteration
    ///
    /// Dangling mass is redistributed through the configured dangling strategy, exactly as
    /// in the dense path.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if `adjacency` or `weights` is not `n × n`,
    /// and [`RankError::InvalidEntry`] if a stored weighted entry is negative or not finite
    pub fn compute_sparse_page_rank(
        &mut self,
        node_ids: &[String],
        adjacency: &CsrMatrix,
        weights: Option<&CsrMatrix>,
        suspicion: Option<&ScoreMap>,
        base_weights: Option<&ScoreMap>,
    ) -> Result<PageRankScores, RankError> {
        let n = node_ids.len();
        let (rows, cols) = adjacency.shape();
        if rows != n || cols != n {
            return Err(RankError::square("sparse adjacency", n, rows, cols));
        }
        let weighted = match weights {
            Some(overlay) => adjacency.hadamard(overlay)?,
            None => adjacency.clone(),
        };

        let mut dangling = Vec::new();
        let mut triplets = Vec::with_capacity(weighted.nnz());
        for source in 0..n {
            let (targets, values) = weighted.row(source);
            check_entries(source, targets.iter().copied().zip(values.iter().copied()))?;

            let mut out = values.to_vec();
            if normalize_weights(&mut out) {
                triplets.extend(
                    targets
                        .iter()
                        .zip(out)
                        .map(|(&target, probability)| (target, source, probability)),
                );
            } else {
                dangling.push(source);
            }
        }
        let transition = CsrMatrix::from_triplets(n, n, &triplets);

        let p = self
            .personalization
            .compute_personalization_vector(node_ids, suspicion, base_weights);
        let redistribution = if dangling.is_empty() {
            Vec::new()
        } else {
            self.dangling.redistribution(n, Some(&p))?
        };
        debug!(
            nodes = n,
            nnz = transition.nnz(),
            dangling_nodes = dangling.len(),
            dangling = %self.dangling.description(),
            personalization = %self.personalization.description(),
            "sparse PageRank started"
        );

        let (ranks, report) = self.power_iterate(&p, |r, out| {
            transition.mul_vec(r, out)?;
            let dangling_sum: f64 = dangling.iter().map(|&i| r[i]).sum();
            if dangling_sum > 0.0 {
                for (slot, share) in out.iter_mut().zip(&redistribution) {
                    *slot += dangling_sum * share;
                }
            }
            Ok(())
        })?;

        self.transition = None;
        self.finish(node_ids, p, ranks, report)
    }

    /// Sparse computation over a [`TransactionGraph`] in its current node ordering
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::compute_sparse_page_rank`]
    pub fn compute_graph_page_rank(
        &mut self,
        graph: &TransactionGraph,
        suspicion: Option<&ScoreMap>,
        base_weights: Option<&ScoreMap>,
    ) -> Result<PageRankScores, RankError> {
        let (adjacency, node_ids) = graph.get_sparse_adjacency_matrix();
        self.compute_sparse_page_rank(&node_ids, &adjacency, None, suspicion, base_weights)
    }

    fn power_iterate<F>(&self, p: &[f64], mut apply: F) -> Result<(Vec<f64>, IterationReport), RankError>
    where
        F: FnMut(&[f64], &mut [f64]) -> Result<(), RankError>,
    {
        let n = p.len();
        if n == 0 {
            return Ok((
                Vec::new(),
                IterationReport {
                    converged: true,
                    ..IterationReport::default()
                },
            ));
        }

        let alpha = self.config.damping_factor;
        let mut ranks = uniform(n);
        let mut next = vec![0.0; n];
        let mut report = IterationReport::default();

        for iteration in 1..=self.config.max_iterations {
            apply(&ranks, &mut next)?;
            for (slot, &restart) in next.iter_mut().zip(p) {
                *slot = (1.0 - alpha) * *slot + alpha * restart;
            }

            let diff: f64 = ranks
                .iter()
                .zip(&next)
                .map(|(old, new)| (new - old).abs())
                .sum();
            trace!(iteration, residual = diff, "power iteration");

            report.residuals.push(diff);
            std::mem::swap(&mut ranks, &mut next);

            if diff < self.config.tolerance {
                report.converged = true;
                report.iterations = iteration;
                debug!(iterations = iteration, residual = diff, "PageRank converged");
                break;
            }
        }

        if !report.converged {
            report.iterations = self.config.max_iterations;
            warn!(
                max_iterations = self.config.max_iterations,
                residual = report.residuals.last().copied().unwrap_or_default(),
                "PageRank did not converge; returning last estimate"
            );
        }

        normalize_or_uniform(&mut ranks);
        Ok((ranks, report))
    }

    fn finish(
        &mut self,
        node_ids: &[String],
        personalization: Vec<f64>,
        ranks: Vec<f64>,
        report: IterationReport,
    ) -> Result<PageRankScores, RankError> {
        let scores = PageRankScores::new(node_ids.to_vec(), ranks)?;
        self.personalization_vector = Some(personalization);
        self.state = if report.converged {
            EngineState::Converged
        } else {
            EngineState::Exhausted
        };
        self.report = report;
        self.scores = Some(scores.clone());
        info!(
            nodes = scores.len(),
            iterations = self.report.iterations,
            converged = self.report.converged,
            "Computed PageRank"
        );
        Ok(scores)
    }

    /// Rank nodes by `pagerank * (1 + suspicion)` (or `pagerank` alone without suspicion)
    ///
    /// Sorting is stable, so ties keep node order. At most `top_k` entries are returned.
    #[must_use]
    pub fn get_top_fraud_candidates(
        scores: &PageRankScores,
        suspicion: Option<&ScoreMap>,
        top_k: usize,
    ) -> Vec<FraudCandidate> {
        let mut candidates: Vec<FraudCandidate> = scores
            .iter()
            .map(|(id, pagerank)| FraudCandidate {
                node_id: id.to_string(),
                pagerank,
                suspicion: suspicion
                    .and_then(|map| map.get(id).copied())
                    .unwrap_or(0.0),
            })
            .collect();

        candidates.sort_by(|a, b| b.risk_score().total_cmp(&a.risk_score()));
        candidates.truncate(top_k);
        candidates
    }

    /// Diagnostics of the last computation
    #[must_use]
    pub fn get_convergence_info(&self) -> ConvergenceInfo {
        ConvergenceInfo {
            damping_factor: self.config.damping_factor,
            tolerance: self.config.tolerance,
            max_iterations: self.config.max_iterations,
            converged: self.report.converged,
            iterations_performed: self.report.iterations,
            residual: self.report.residuals.last().copied().unwrap_or_default(),
            residuals: self.report.residuals.clone(),
            dangling_strategy: self.dangling.description(),
            personalization_strategy: self.personalization.description(),
        }
    }
}

/// Weighted adjacency entries must be non-negative and finite
fn check_entries<I>(row: usize, entries: I) -> Result<(), RankError>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    for (col, value) in entries {
        if !(value.is_finite() && value >= 0.0) {
            return Err(RankError::InvalidEntry {
                what: "weighted adjacency",
                row,
                col,
                value,
            });
        }
    }
    Ok(())
}

/// Reject suspicion scores outside [0, 1] (NaN included)
///
/// Request shells call this before handing scores to the engine; the engine itself clamps.
///
/// # Errors
///
/// Returns [`RankError::InvalidSuspicion`] naming the first offending node in sorted order
pub fn validate_suspicion_scores(suspicion: &ScoreMap) -> Result<(), RankError> {
    let mut entries: Vec<(&String, &f64)> = suspicion.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (node, &score) in entries {
        if !(0.0..=1.0).contains(&score) {
            return Err(RankError::InvalidSuspicion {
                node: node.clone(),
                score,
            });
        }
    }
    Ok(())
}
