//! Integration tests for fraudrank
//!
//! Tests real-world usage scenarios (payment rings, mule chains, persistence)

use fraudrank::{
    CsrMatrix, DanglingStrategyKind, EngineConfig, EngineState, PageRankEngine,
    PersonalizationStrategyKind, RankError, ScoreMap, TransactionGraph,
};

fn suspicion(pairs: &[(&str, f64)]) -> ScoreMap {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

#[test]
fn test_simple_payment_graph() {
    // alice → bob, alice → carol, bob → carol, carol → alice
    let mut graph = TransactionGraph::directed();
    graph.add_edge("alice", "bob", 100.0).unwrap();
    graph.add_edge("alice", "carol", 300.0).unwrap();
    graph.add_edge("bob", "carol", 50.0).unwrap();
    graph.add_edge("carol", "alice", 25.0).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.get_out_degree("alice"), 400.0);
    assert_eq!(graph.get_in_degree("carol"), 350.0);

    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, None, None).unwrap();

    assert_eq!(scores.node_ids(), graph.get_nodes());
    assert!((scores.sum() - 1.0).abs() < 1e-9);
    // carol receives the most flow
    let carol = scores.get("carol").unwrap();
    assert!(carol > scores.get("bob").unwrap());
}

#[test]
fn test_suspicious_node_ranks_first() {
    let mut graph = TransactionGraph::directed();
    for (s, t) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")] {
        graph.add_edge(s, t, 1.0).unwrap();
    }
    let flags = suspicion(&[("C", 1.0)]);

    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, Some(&flags), None).unwrap();

    let c = scores.get("C").unwrap();
    for other in ["A", "B", "D"] {
        assert!(c > scores.get(other).unwrap(), "C should outrank {other}");
    }

    let top = PageRankEngine::get_top_fraud_candidates(&scores, Some(&flags), 2);
    assert_eq!(top[0].node_id, "C");
    assert_eq!(top[0].suspicion, 1.0);
    assert!((top[0].risk_score() - 2.0 * c).abs() < 1e-15);
}

#[test]
fn test_dense_matches_graph_path() {
    let mut graph = TransactionGraph::directed();
    graph.add_edge("A", "B", 2.0).unwrap();
    graph.add_edge("A", "C", 1.0).unwrap();
    graph.add_edge("B", "C", 4.0).unwrap();
    graph.add_node("D"); // isolated, dangling
    let flags = suspicion(&[("B", 0.5)]);

    for kind in [DanglingStrategyKind::Uniform, DanglingStrategyKind::Teleport] {
        let config = EngineConfig::default().with_dangling_strategy(kind);

        let (adjacency, ids) = graph.get_adjacency_matrix();
        let mut dense_engine = PageRankEngine::new(config.clone()).unwrap();
        let dense = dense_engine
            .compute_page_rank(&ids, &adjacency, None, Some(&flags), None)
            .unwrap();

        let mut sparse_engine = PageRankEngine::new(config).unwrap();
        let sparse = sparse_engine
            .compute_graph_page_rank(&graph, Some(&flags), None)
            .unwrap();

        for ((id, a), (_, b)) in dense.iter().zip(sparse.iter()) {
            assert!((a - b).abs() < 1e-9, "{kind}: {id} {a} vs {b}");
        }
    }
}

#[test]
fn test_sparse_weight_overlay() {
    // Structure says A pays B and C equally; overlay triples the A → C edge
    let ids: Vec<String> = ["A", "B", "C"].iter().map(|s| (*s).to_string()).collect();
    let adjacency = CsrMatrix::from_triplets(3, 3, &[(0, 1, 1.0), (0, 2, 1.0), (1, 0, 1.0), (2, 0, 1.0)]);
    let overlay = CsrMatrix::from_triplets(3, 3, &[(0, 1, 1.0), (0, 2, 3.0), (1, 0, 1.0), (2, 0, 1.0)]);

    let mut engine = PageRankEngine::new(EngineConfig::default().with_damping_factor(0.15)).unwrap();
    let plain = engine
        .compute_sparse_page_rank(&ids, &adjacency, None, None, None)
        .unwrap();
    let weighted = engine
        .compute_sparse_page_rank(&ids, &adjacency, Some(&overlay), None, None)
        .unwrap();

    assert!((plain.get("B").unwrap() - plain.get("C").unwrap()).abs() < 1e-9);
    assert!(weighted.get("C").unwrap() > weighted.get("B").unwrap());
}

#[test]
fn test_transaction_volume_personalization() {
    let mut graph = TransactionGraph::directed();
    graph.add_edge("A", "B", 1.0).unwrap();
    graph.add_edge("B", "A", 1.0).unwrap();
    graph.add_node("C");

    let volume = suspicion(&[("C", 1_000_000.0), ("A", 1.0)]);
    let config = EngineConfig::default()
        .with_personalization_strategy(PersonalizationStrategyKind::TransactionVolume);
    let mut engine = PageRankEngine::new(config).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, None, Some(&volume)).unwrap();

    let p = engine.personalization_vector().unwrap();
    assert!(p[2] > 0.99);
    assert!(scores.get("C").unwrap() > scores.get("B").unwrap());
}

#[test]
fn test_dangling_mass_conserved() {
    let mut graph = TransactionGraph::directed();
    graph.add_edge("A", "B", 1.0).unwrap();
    graph.add_edge("B", "C", 1.0).unwrap();
    graph.add_edge("A", "C", 1.0).unwrap();

    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, None, None).unwrap();

    assert!((scores.sum() - 1.0).abs() < 1e-9);
    assert!(scores.scores().iter().all(|&s| s > 0.0));
}

#[test]
fn test_extreme_transfer_amounts() {
    let mut graph = TransactionGraph::directed();
    graph.add_edge("A", "B", 1e308).unwrap();
    graph.add_edge("A", "C", 1e308).unwrap();
    graph.add_edge("B", "A", 1.0).unwrap();
    graph.add_edge("C", "A", 1.0).unwrap();
    // D only ever sent a zero-value transfer
    graph.add_edge("D", "A", 0.0).unwrap();

    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, None, None).unwrap();

    assert!((scores.sum() - 1.0).abs() < 1e-9);
    assert!((scores.get("B").unwrap() - scores.get("C").unwrap()).abs() < 1e-12);
    assert!(scores.get("A").unwrap() > scores.get("D").unwrap());
    assert!(engine.get_convergence_info().converged);
}

#[test]
fn test_engine_reuse_overwrites_results() {
    let mut small = TransactionGraph::directed();
    small.add_edge("A", "B", 1.0).unwrap();

    let mut large = TransactionGraph::directed();
    for (s, t) in [("W", "X"), ("X", "Y"), ("Y", "Z"), ("Z", "W")] {
        large.add_edge(s, t, 1.0).unwrap();
    }

    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    assert_eq!(engine.state(), EngineState::Configured);
    assert!(engine.last_scores().is_none());

    engine.compute_graph_page_rank(&small, None, None).unwrap();
    assert_eq!(engine.last_scores().unwrap().len(), 2);

    engine.compute_graph_page_rank(&large, None, None).unwrap();
    assert_eq!(engine.last_scores().unwrap().len(), 4);
    assert_eq!(engine.personalization_vector().unwrap().len(), 4);
    assert_eq!(engine.state(), EngineState::Converged);
}

#[test]
fn test_convergence_info_history() {
    let mut graph = TransactionGraph::directed();
    for (s, t) in [("A", "B"), ("B", "C"), ("C", "A"), ("A", "C")] {
        graph.add_edge(s, t, 1.0).unwrap();
    }

    let mut engine = PageRankEngine::new(EngineConfig::default().with_damping_factor(0.15)).unwrap();
    engine.compute_graph_page_rank(&graph, None, None).unwrap();

    let info = engine.get_convergence_info();
    assert!(info.converged);
    assert_eq!(info.residuals.len(), info.iterations_performed);
    assert!(info.residual < info.tolerance);
    assert_eq!(info.max_iterations, 100);
    assert!(info.dangling_strategy.contains("Uniform"));
}

#[test]
fn test_undirected_graph_is_symmetric() {
    let mut graph = TransactionGraph::undirected();
    graph.add_edge("A", "B", 1.0).unwrap();
    graph.add_edge("B", "C", 1.0).unwrap();

    assert!(graph.contains_edge("B", "A"));
    assert!(graph.contains_edge("C", "B"));

    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, None, None).unwrap();
    // Ends of the path are interchangeable
    assert!((scores.get("A").unwrap() - scores.get("C").unwrap()).abs() < 1e-9);
    assert!(scores.get("B").unwrap() > scores.get("A").unwrap());
}

#[test]
fn test_invalid_inputs() {
    let mut graph = TransactionGraph::directed();
    assert!(matches!(
        graph.add_edge("A", "B", -1.0),
        Err(RankError::InvalidWeight { .. })
    ));
    assert!(graph.add_edge("A", "B", f64::NAN).is_err());

    assert!(PageRankEngine::new(EngineConfig::default().with_tolerance(-1.0)).is_err());
    assert!("bogus".parse::<PersonalizationStrategyKind>().is_err());
}

#[test]
fn test_text_roundtrip_preserves_ranking() {
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let path = dir.path().join("ring.txt");

    let mut graph = TransactionGraph::directed();
    graph.add_edge("A", "B", 15_000.0).unwrap();
    graph.add_edge("B", "C", 12_000.5).unwrap();
    graph.add_edge("C", "A", 9_000.25).unwrap();
    graph.save(&path).unwrap();

    let loaded = TransactionGraph::load(&path).unwrap();
    assert_eq!(loaded.get_edges(), graph.get_edges());

    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let original = engine.compute_graph_page_rank(&graph, None, None).unwrap();
    let reloaded = engine.compute_graph_page_rank(&loaded, None, None).unwrap();
    assert_eq!(original, reloaded);
}

#[cfg(feature = "storage")]
#[tokio::test]
async fn test_parquet_persistence() {
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let path = dir.path().join("transactions");

    let mut graph = TransactionGraph::directed();
    graph.add_edge("A", "B", 1.0).unwrap();
    graph.add_edge("A", "C", 2.0).unwrap();
    graph.add_node("dormant");

    graph.write_parquet(&path).await.unwrap();

    assert!(std::path::Path::new(&format!("{}_edges.parquet", path.display())).exists());
    assert!(std::path::Path::new(&format!("{}_nodes.parquet", path.display())).exists());

    let loaded = TransactionGraph::read_parquet(&path).await.unwrap();
    assert_eq!(loaded.node_count(), 4);
    assert_eq!(loaded.edge_count(), 2);
    assert_eq!(loaded.get_nodes(), graph.get_nodes());
    assert!(loaded.contains_node("dormant"));
}
