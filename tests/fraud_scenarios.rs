//! Fraud scenario tests
//!
//! Runs the engine end-to-end over the eight-account demo ring and small hand-built
//! topologies (cycles, mule chains, sinks) and checks the rankings an analyst would expect.

use fraudrank::{
    validate_suspicion_scores, DanglingStrategyKind, EngineConfig, EngineState, PageRankEngine,
    PageRankScores, RankError, ScoreMap, TransactionGraph,
};

// ============================================================================
// HELPER: Build test graphs
// ============================================================================

/// Eight accounts moving money in overlapping loops
///
/// ```text
///   A → B → D → F → H → B
///   A → C → E → G → A
///   C → H,  E → F,  G → D
/// ```
fn demo_ring() -> TransactionGraph {
    let mut graph = TransactionGraph::directed();
    for (source, target, amount) in [
        ("A", "B", 15_000.0),
        ("A", "C", 45_000.0),
        ("B", "D", 12_000.0),
        ("C", "E", 78_000.0),
        ("D", "F", 9_000.0),
        ("E", "G", 125_000.0),
        ("F", "H", 8_000.0),
        ("G", "A", 95_000.0),
        ("H", "B", 11_000.0),
        ("C", "H", 32_000.0),
        ("E", "F", 56_000.0),
        ("G", "D", 87_000.0),
    ] {
        graph.add_edge(source, target, amount).unwrap();
    }
    graph
}

fn flags(pairs: &[(&str, f64)]) -> ScoreMap {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn rank(graph: &TransactionGraph, config: EngineConfig, suspicion: Option<&ScoreMap>) -> PageRankScores {
    let mut engine = PageRankEngine::new(config).unwrap();
    engine.compute_graph_page_rank(graph, suspicion, None).unwrap()
}

// ============================================================================
// Demo ring
// ============================================================================

#[test]
fn test_demo_ring_shape() {
    let graph = demo_ring();
    assert_eq!(graph.node_count(), 8);
    assert_eq!(graph.edge_count(), 12);
    assert!(graph.get_dangling_nodes().iter().all(|&d| !d));
    assert_eq!(graph.to_string(), "TransactionGraph(nodes=8, edges=12, directed=true)");
}

#[test]
fn test_demo_ring_converges_to_distribution() {
    let graph = demo_ring();
    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, None, None).unwrap();

    assert_eq!(scores.len(), 8);
    assert!((scores.sum() - 1.0).abs() < 1e-9);
    assert!(scores.scores().iter().all(|&s| s > 0.0));
    assert_eq!(engine.state(), EngineState::Converged);
}

#[test]
fn test_flagged_account_tops_candidates() {
    let graph = demo_ring();
    let suspicion = flags(&[("G", 1.0)]);
    let scores = rank(&graph, EngineConfig::default(), Some(&suspicion));

    let top = PageRankEngine::get_top_fraud_candidates(&scores, Some(&suspicion), 3);
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].node_id, "G");
    for pair in top.windows(2) {
        assert!(pair[0].risk_score() >= pair[1].risk_score());
    }
}

#[test]
fn test_flagging_raises_own_score() {
    let graph = demo_ring();
    let baseline = rank(&graph, EngineConfig::default(), None);
    let flagged = rank(&graph, EngineConfig::default(), Some(&flags(&[("E", 0.8)])));

    assert!(flagged.get("E").unwrap() > baseline.get("E").unwrap());
}

#[test]
fn test_risk_flows_to_recipients() {
    // G pays A; H never does. A should absorb more risk when G is the flagged account.
    let graph = demo_ring();
    let via_g = rank(&graph, EngineConfig::default(), Some(&flags(&[("G", 1.0)])));
    let via_h = rank(&graph, EngineConfig::default(), Some(&flags(&[("H", 1.0)])));

    assert!(via_g.get("A").unwrap() > via_h.get("A").unwrap());
}

#[test]
fn test_repeated_runs_are_identical() {
    let graph = demo_ring();
    let suspicion = flags(&[("C", 0.4), ("F", 0.9)]);

    let first = rank(&graph, EngineConfig::default(), Some(&suspicion));
    let second = rank(&graph, EngineConfig::default(), Some(&suspicion));
    assert_eq!(first, second);
}

#[test]
fn test_budget_exhaustion_still_returns_scores() {
    let graph = demo_ring();
    let config = EngineConfig::default()
        .with_max_iterations(1)
        .with_tolerance(1e-15);

    let mut engine = PageRankEngine::new(config).unwrap();
    let scores = engine
        .compute_graph_page_rank(&graph, Some(&flags(&[("A", 1.0)])), None)
        .unwrap();

    let info = engine.get_convergence_info();
    assert!(!info.converged);
    assert_eq!(info.iterations_performed, 1);
    assert_eq!(engine.state(), EngineState::Exhausted);
    assert!((scores.sum() - 1.0).abs() < 1e-9);
}

// ============================================================================
// Small topologies
// ============================================================================

#[test]
fn test_cycle_with_suspicious_node() {
    let mut graph = TransactionGraph::directed();
    for (s, t) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")] {
        graph.add_edge(s, t, 1.0).unwrap();
    }
    let config = EngineConfig::default().with_suspicion_weight(5.0);
    let scores = rank(&graph, config, Some(&flags(&[("C", 1.0)])));

    let c = scores.get("C").unwrap();
    assert!(["A", "B", "D"].iter().all(|id| c > scores.get(id).unwrap()));
    // D receives from C, so it trails C but leads the rest
    assert!(scores.get("D").unwrap() > scores.get("A").unwrap());
}

#[test]
fn test_teleport_sends_sink_mass_to_suspects() {
    // A and B pay into sink S; F is flagged but isolated
    let mut graph = TransactionGraph::directed();
    graph.add_edge("A", "S", 1.0).unwrap();
    graph.add_edge("B", "S", 1.0).unwrap();
    graph.add_node("F");
    let suspicion = flags(&[("F", 1.0)]);
    let config = EngineConfig::default().with_damping_factor(0.3);

    let uniform = rank(&graph, config.clone(), Some(&suspicion));
    let teleport = rank(
        &graph,
        config.with_dangling_strategy(DanglingStrategyKind::Teleport),
        Some(&suspicion),
    );

    assert!(teleport.get("F").unwrap() > uniform.get("F").unwrap());
    assert!((teleport.sum() - 1.0).abs() < 1e-9);
}

#[test]
fn test_isolated_account() {
    let mut graph = TransactionGraph::directed();
    graph.add_node("lonely");

    let scores = rank(&graph, EngineConfig::default(), None);
    assert!((scores.get("lonely").unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_empty_graph() {
    let graph = TransactionGraph::directed();
    let mut engine = PageRankEngine::new(EngineConfig::default()).unwrap();
    let scores = engine.compute_graph_page_rank(&graph, None, None).unwrap();

    assert!(scores.is_empty());
    assert!(PageRankEngine::get_top_fraud_candidates(&scores, None, 5).is_empty());
}

#[test]
fn test_subgraph_investigation() {
    // Zoom into the A → C → E → G loop
    let graph = demo_ring();
    let ring = graph.subgraph(&["A", "C", "E", "G"]);

    assert_eq!(ring.get_nodes(), ["A", "C", "E", "G"]);
    assert_eq!(ring.edge_count(), 4);

    let scores = rank(&ring, EngineConfig::default(), None);
    for (_, score) in scores.iter() {
        assert!((score - 0.25).abs() < 1e-8);
    }
}

#[test]
fn test_shell_rejects_out_of_range_suspicion() {
    let bad = flags(&[("A", 0.2), ("B", 1.2)]);
    assert!(matches!(
        validate_suspicion_scores(&bad),
        Err(RankError::InvalidSuspicion { ref node, .. }) if node == "B"
    ));

    // The engine itself clamps instead of failing
    let scores = rank(&demo_ring(), EngineConfig::default(), Some(&bad));
    assert!((scores.sum() - 1.0).abs() < 1e-9);
}
