//! Adjacency-list transaction graph keyed by string identifiers
//!
//! Node indices follow insertion order. Matrix views are always returned together with the
//! node-id list they were built against; indices are not stable across mutations.

use super::matrix::{normalize_weights, CsrMatrix, DenseMatrix};
use crate::error::RankError;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Weight used when an edge record carries none
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Dense node index (position in insertion order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported
    fn from_index(idx: usize) -> Self {
        Self(idx as u32)
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Out-degree, in-degree and their sum for one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDegree {
    /// Node identifier
    pub id: String,
    /// Sum of outgoing weights
    pub out_degree: f64,
    /// Sum of incoming weights
    pub in_degree: f64,
    /// `out_degree + in_degree`
    pub total_degree: f64,
}

/// Weighted transaction graph (directed or undirected)
///
/// Each node owns an ordered list of `(neighbor, weight)` pairs. Overwriting an edge keeps
/// its position; removing and re-adding moves it to the end.
///
/// # Example
///
/// ```
/// use fraudrank::TransactionGraph;
///
/// let mut graph = TransactionGraph::directed();
/// graph.add_edge("acct_1", "acct_2", 150.0).unwrap();
/// graph.add_edge("acct_1", "acct_3", 50.0).unwrap();
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.get_out_degree("acct_1"), 200.0);
/// assert_eq!(graph.get_dangling_nodes(), vec![false, true, true]);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionGraph {
    directed: bool,

    /// Node identifiers in insertion order
    labels: Vec<String>,

    /// Identifier → index
    index: HashMap<String, NodeId>,

    /// Outgoing `(target, weight)` pairs per node, in insertion order
    adjacency: Vec<Vec<(NodeId, f64)>>,

    /// Number of stored (source, target) pairs
    edge_count: usize,
}

impl TransactionGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            labels: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            edge_count: 0,
        }
    }

    /// Empty directed graph
    #[must_use]
    pub fn directed() -> Self {
        Self::new(true)
    }

    /// Empty undirected graph
    #[must_use]
    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Whether edges are one-way
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Add a node if absent; returns its index either way
    pub fn add_node(&mut self, id: &str) -> NodeId {
        if let Some(&node) = self.index.get(id) {
            return node;
        }
        let node = NodeId::from_index(self.labels.len());
        self.labels.push(id.to_string());
        self.index.insert(id.to_string(), node);
        self.adjacency.push(Vec::new());
        node
    }

    /// Add or overwrite an edge
    ///
    /// Both endpoints are created if absent. Overwriting replaces the weight, it does not
    /// accumulate. Undirected graphs also store the mirrored edge (self-loops once).
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidWeight`] for negative or non-finite weights
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) -> Result<(), RankError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(RankError::InvalidWeight {
                source_node: source.to_string(),
                target: target.to_string(),
                weight,
            });
        }

        let src = self.add_node(source);
        let dst = self.add_node(target);

        self.upsert(src, dst, weight);
        if !self.directed && src != dst {
            self.upsert(dst, src, weight);
        }
        Ok(())
    }

    fn upsert(&mut self, src: NodeId, dst: NodeId, weight: f64) {
        let neighbors = &mut self.adjacency[src.index()];
        if let Some(slot) = neighbors.iter_mut().find(|(t, _)| *t == dst) {
            slot.1 = weight;
        } else {
            neighbors.push((dst, weight));
            self.edge_count += 1;
        }
    }

    fn detach(&mut self, src: NodeId, dst: NodeId) -> bool {
        let neighbors = &mut self.adjacency[src.index()];
        match neighbors.iter().position(|(t, _)| *t == dst) {
            Some(pos) => {
                neighbors.remove(pos);
                self.edge_count -= 1;
                true
            }
            None => false,
        }
    }

    /// Remove an edge (and its mirror when undirected)
    ///
    /// Returns `false` if the edge did not exist.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let (Some(&src), Some(&dst)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };

        if !self.detach(src, dst) {
            return false;
        }
        if !self.directed && src != dst {
            self.detach(dst, src);
        }
        true
    }

    /// Whether the node exists
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Whether the directed pair `source → target` is stored
    #[must_use]
    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(src), Some(dst)) => self.adjacency[src.index()].iter().any(|(t, _)| t == dst),
            _ => false,
        }
    }

    /// Index of a node in the current ordering
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Outgoing neighbors with weights, in insertion order (empty for unknown nodes)
    #[must_use]
    pub fn get_neighbors(&self, id: &str) -> Vec<(&str, f64)> {
        self.index.get(id).map_or_else(Vec::new, |node| {
            self.adjacency[node.index()]
                .iter()
                .map(|(t, w)| (self.labels[t.index()].as_str(), *w))
                .collect()
        })
    }

    /// Sum of outgoing weights (0 for unknown nodes)
    #[must_use]
    pub fn get_out_degree(&self, id: &str) -> f64 {
        self.index
            .get(id)
            .map_or(0.0, |node| self.adjacency[node.index()].iter().map(|(_, w)| w).sum())
    }

    /// Sum of incoming weights (equals out-degree when undirected)
    #[must_use]
    pub fn get_in_degree(&self, id: &str) -> f64 {
        if !self.directed {
            return self.get_out_degree(id);
        }
        let Some(&node) = self.index.get(id) else {
            return 0.0;
        };
        self.adjacency
            .iter()
            .flat_map(|neighbors| neighbors.iter())
            .filter(|(t, _)| *t == node)
            .map(|(_, w)| w)
            .sum()
    }

    /// Node identifiers in index order
    #[must_use]
    pub fn get_nodes(&self) -> &[String] {
        &self.labels
    }

    /// All stored edges as `(source, target, weight)`
    #[must_use]
    pub fn get_edges(&self) -> Vec<(&str, &str, f64)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(src, neighbors)| {
                neighbors.iter().map(move |(dst, w)| {
                    (
                        self.labels[src].as_str(),
                        self.labels[dst.index()].as_str(),
                        *w,
                    )
                })
            })
            .collect()
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of stored (source, target) pairs
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn triplets(&self) -> Vec<(usize, usize, f64)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(src, neighbors)| neighbors.iter().map(move |(dst, w)| (src, dst.index(), *w)))
            .collect()
    }

    /// Dense adjacency (`A[i][j]` = weight of `i → j`) with its node ordering
    #[must_use]
    pub fn get_adjacency_matrix(&self) -> (DenseMatrix, Vec<String>) {
        let n = self.node_count();
        let mut matrix = DenseMatrix::square(n);
        for (src, dst, weight) in self.triplets() {
            matrix.set(src, dst, weight);
        }
        (matrix, self.labels.clone())
    }

    /// Sparse CSR adjacency (row = source) with its node ordering
    #[must_use]
    pub fn get_sparse_adjacency_matrix(&self) -> (CsrMatrix, Vec<String>) {
        let n = self.node_count();
        (CsrMatrix::from_triplets(n, n, &self.triplets()), self.labels.clone())
    }

    /// Sparse transition operator `M[target][source] = w / out_degree(source)`
    ///
    /// Also returns, per node, whether its column was left empty. That covers dangling nodes
    /// and nodes whose out-edges all weigh 0; callers must redistribute the mass of every
    /// flagged column. Weights are scaled by their maximum before summing, so huge weights
    /// cannot overflow the out-degree.
    #[must_use]
    pub fn get_transition_matrix(&self) -> (CsrMatrix, Vec<String>, Vec<bool>) {
        let n = self.node_count();
        let mut triplets = Vec::with_capacity(self.edge_count);
        let mut empty_columns = vec![false; n];

        for (src, neighbors) in self.adjacency.iter().enumerate() {
            let mut out: Vec<f64> = neighbors.iter().map(|(_, w)| *w).collect();
            if normalize_weights(&mut out) {
                triplets.extend(
                    neighbors
                        .iter()
                        .zip(out)
                        .map(|((dst, _), probability)| (dst.index(), src, probability)),
                );
            } else {
                empty_columns[src] = true;
            }
        }

        (
            CsrMatrix::from_triplets(n, n, &triplets),
            self.labels.clone(),
            empty_columns,
        )
    }

    /// `true` where a node has no outgoing edges, in index order
    #[must_use]
    pub fn get_dangling_nodes(&self) -> Vec<bool> {
        self.adjacency.iter().map(Vec::is_empty).collect()
    }

    /// Independent graph restricted to `nodes`
    ///
    /// Keeps the source graph's ordering; unknown identifiers are ignored.
    #[must_use]
    pub fn subgraph<S: AsRef<str>>(&self, nodes: &[S]) -> Self {
        let keep: HashSet<&str> = nodes.iter().map(AsRef::<str>::as_ref).collect();
        let mut sub = Self::new(self.directed);

        for label in self.labels.iter().filter(|l| keep.contains(l.as_str())) {
            sub.add_node(label);
        }
        for (src, dst, weight) in self.get_edges() {
            if keep.contains(src) && keep.contains(dst) {
                // Weights were validated on insertion into `self`
                sub.upsert_labels(src, dst, weight);
            }
        }
        sub
    }

    fn upsert_labels(&mut self, source: &str, target: &str, weight: f64) {
        let src = self.add_node(source);
        let dst = self.add_node(target);
        self.upsert(src, dst, weight);
    }

    /// Per-node degree summary in index order
    #[must_use]
    pub fn degree_summary(&self) -> Vec<NodeDegree> {
        self.labels
            .iter()
            .map(|id| {
                let out_degree = self.get_out_degree(id);
                let in_degree = self.get_in_degree(id);
                NodeDegree {
                    id: id.clone(),
                    out_degree,
                    in_degree,
                    total_degree: out_degree + in_degree,
                }
            })
            .collect()
    }
}

impl Default for TransactionGraph {
    fn default() -> Self {
        Self::directed()
    }
}

impl fmt::Display for TransactionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransactionGraph(nodes={}, edges={}, directed={})",
            self.node_count(),
            self.edge_count,
            self.directed
        )
    }
}
