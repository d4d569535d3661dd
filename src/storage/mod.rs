//! Graph storage layer
//!
//! Adjacency-list transaction graph, dense/CSR matrix views, text and Parquet persistence.

pub mod graph;
pub mod matrix;
#[cfg(feature = "storage")]
pub mod parquet;
pub mod text;

pub use graph::{NodeDegree, NodeId, TransactionGraph, DEFAULT_EDGE_WEIGHT};
pub use matrix::{CsrMatrix, DenseMatrix};
