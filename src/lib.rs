//! fraudrank: personalized `PageRank` for transaction-graph fraud detection
//!
//! # Overview
//!
//! fraudrank scores accounts in a weighted, directed transaction graph. Rank mass restarts
//! preferentially at accounts already flagged as suspicious, so risk propagates along money
//! flows toward the accounts that receive from (or sit in rings with) known bad actors.
//!
//! # Quick Start
//!
//! ```
//! use fraudrank::{EngineConfig, PageRankEngine, ScoreMap, TransactionGraph};
//!
//! # fn main() -> fraudrank::Result<()> {
//! let mut graph = TransactionGraph::directed();
//! graph.add_edge("alice", "bob", 15_000.0)?;
//! graph.add_edge("bob", "carol", 12_000.0)?;
//! graph.add_edge("carol", "alice", 9_000.0)?;
//!
//! let suspicion: ScoreMap = [("carol".to_string(), 0.9)].into_iter().collect();
//!
//! let mut engine = PageRankEngine::new(EngineConfig::default())?;
//! let scores = engine.compute_graph_page_rank(&graph, Some(&suspicion), None)?;
//!
//! for candidate in PageRankEngine::get_top_fraud_candidates(&scores, Some(&suspicion), 2) {
//!     println!("{} risk={:.4}", candidate.node_id, candidate.risk_score());
//! }
//! assert!(engine.get_convergence_info().converged);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Storage**: [`TransactionGraph`] (insertion-ordered labels, adjacency lists) plus
//!   [`DenseMatrix`] / [`CsrMatrix`] views
//! - **Persistence**: plain-text edge lists and Parquet (`storage` feature)
//! - **Algorithms**: dense and sparse power iteration with pluggable
//!   [`DanglingStrategy`] and [`PersonalizationStrategy`] implementations
//! - **Configuration**: [`EngineConfig`], serde-enabled with the `api` feature

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod config;
pub mod error;
pub mod storage;

// Re-export core types
pub use algorithms::{
    validate_suspicion_scores, ConvergenceInfo, DanglingStrategy, EngineState, FraudCandidate,
    PageRankEngine, PageRankScores, PersonalizationStrategy, ScoreMap, SuspicionBased,
    TeleportDangling, TransactionVolume, UniformDangling,
};
pub use config::{DanglingStrategyKind, EngineConfig, PersonalizationStrategyKind};
pub use error::RankError;
pub use storage::{CsrMatrix, DenseMatrix, NodeDegree, NodeId, TransactionGraph};

// Error type
pub use anyhow::{Error, Result};
