//! Line-oriented text persistence
//!
//! # Format
//!
//! ```text
//! directed:True
//! nodes:3
//! edges:2
//! A,B,15000.0
//! B,C,1.0
//! ```
//!
//! The three header lines are always skipped by the loader (only the `directed` flag is
//! read from line 1). Edge lines are `source,target[,weight]`; lines with fewer than two
//! fields are ignored. Isolated nodes are not represented.

use super::graph::{TransactionGraph, DEFAULT_EDGE_WEIGHT};
use anyhow::{anyhow, Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

const HEADER_LINES: usize = 3;

impl TransactionGraph {
    /// Render the graph in the text format
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let directed = if self.is_directed() { "True" } else { "False" };

        // Writing into a String cannot fail
        let _ = writeln!(out, "directed:{directed}");
        let _ = writeln!(out, "nodes:{}", self.node_count());
        let _ = writeln!(out, "edges:{}", self.edge_count());

        for (source, target, weight) in self.get_edges() {
            let _ = writeln!(out, "{source},{target},{weight:?}");
        }
        out
    }

    /// Parse the text format
    ///
    /// # Errors
    ///
    /// Returns error if the header is missing, a weight does not parse, or an edge is rejected
    pub fn from_text(text: &str) -> Result<Self> {
        let mut lines = text.lines();

        let flag = lines
            .next()
            .ok_or_else(|| anyhow!("Missing 'directed' header line"))?;
        let directed = flag.trim().split(':').nth(1) == Some("True");
        let mut graph = Self::new(directed);

        for (offset, line) in lines.skip(HEADER_LINES - 1).enumerate() {
            let line_no = offset + HEADER_LINES + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() < 2 {
                continue;
            }

            let weight = match parts.get(2) {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("Invalid weight {raw:?} on line {line_no}"))?,
                None => DEFAULT_EDGE_WEIGHT,
            };

            graph
                .add_edge(parts[0], parts[1], weight)
                .with_context(|| format!("Rejected edge on line {line_no}"))?;
        }

        Ok(graph)
    }

    /// Write the graph to a text file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_text())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), nodes = self.node_count(), edges = self.edge_count(), "saved graph");
        Ok(())
    }

    /// Read a graph from a text file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let graph =
            Self::from_text(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), nodes = graph.node_count(), edges = graph.edge_count(), "loaded graph");
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_to_text_format() {
        let mut graph = TransactionGraph::directed();
        graph.add_edge("A", "B", 15000.0).unwrap();
        graph.add_edge("B", "C", 0.1).unwrap();

        assert_eq!(
            graph.to_text(),
            "directed:True\nnodes:3\nedges:2\nA,B,15000.0\nB,C,0.1\n"
        );
    }

    #[test]
    fn test_from_text_skips_malformed_lines() {
        let text = "directed:False\nnodes:99\nedges:99\nA,B\n\njunk\nB,C,2.5\n";
        let graph = TransactionGraph::from_text(text).unwrap();

        assert!(!graph.is_directed());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4); // mirrored
        assert_eq!(graph.get_neighbors("A"), vec![("B", 1.0)]);
        assert_eq!(graph.get_out_degree("C"), 2.5);
    }

    #[test]
    fn test_from_text_header_lines_never_parsed_as_edges() {
        let text = "directed:True\nX,Y,1.0\nZ,W,1.0\nA,B,1.0\n";
        let graph = TransactionGraph::from_text(text).unwrap();
        assert_eq!(graph.get_nodes(), &["A", "B"]);
    }

    #[test]
    fn test_from_text_bad_weight() {
        let text = "directed:True\nnodes:2\nedges:1\nA,B,lots\n";
        let err = TransactionGraph::from_text(text).unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_from_text_empty() {
        assert!(TransactionGraph::from_text("").is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.txt");

        let mut graph = TransactionGraph::directed();
        graph.add_edge("A", "B", 1.0 / 3.0).unwrap();
        graph.add_edge("B", "A", 2.0).unwrap();
        graph.add_edge("B", "C", 7.25).unwrap();

        graph.save(&path).unwrap();
        let loaded = TransactionGraph::load(&path).unwrap();

        assert_eq!(loaded.is_directed(), graph.is_directed());
        assert_eq!(loaded.get_nodes(), graph.get_nodes());
        assert_eq!(loaded.edge_count(), graph.edge_count());
        assert_eq!(loaded.get_edges(), graph.get_edges());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = TransactionGraph::load(dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
