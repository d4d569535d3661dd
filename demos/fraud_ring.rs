//! Fraud ring walkthrough: rank eight accounts moving money in overlapping loops
//!
//! Run with: cargo run --example fraud_ring

use fraudrank::{
    validate_suspicion_scores, DanglingStrategyKind, EngineConfig, PageRankEngine,
    PersonalizationStrategyKind, ScoreMap, TransactionGraph,
};

const TRANSFERS: [(&str, &str, f64); 12] = [
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
];

fn main() -> fraudrank::Result<()> {
    println!("🕵️  fraudrank Fraud Ring Demo\n");

    // 1. Load transfers
    let mut graph = TransactionGraph::directed();
    for (source, target, amount) in TRANSFERS {
        graph.add_edge(source, target, amount)?;
    }
    println!("📊 {graph}");

    // 2. Analyst-supplied suspicion
    let suspicion: ScoreMap = [("E", 0.9), ("G", 0.7)]
        .into_iter()
        .map(|(id, s)| (id.to_string(), s))
        .collect();
    validate_suspicion_scores(&suspicion)?;

    // 3. Baseline vs personalized ranking
    let mut baseline = PageRankEngine::new(EngineConfig::default())?;
    let plain = baseline.compute_graph_page_rank(&graph, None, None)?;

    let config = EngineConfig::default()
        .with_dangling_strategy(DanglingStrategyKind::Teleport)
        .with_suspicion_weight(5.0);
    let mut engine = PageRankEngine::new(config)?;
    let scores = engine.compute_graph_page_rank(&graph, Some(&suspicion), None)?;

    println!("\n📈 PageRank (baseline → personalized):");
    for (id, score) in scores.iter() {
        let before = plain.get(id).unwrap_or_default();
        println!("  {id}: {before:.4} → {score:.4}");
    }

    // 4. Candidates
    println!("\n🚨 Top fraud candidates:");
    for (rank, candidate) in PageRankEngine::get_top_fraud_candidates(&scores, Some(&suspicion), 5)
        .iter()
        .enumerate()
    {
        println!(
            "  {}. {} risk={:.4} (pagerank={:.4}, suspicion={:.1})",
            rank + 1,
            candidate.node_id,
            candidate.risk_score(),
            candidate.pagerank,
            candidate.suspicion
        );
    }

    let info = engine.get_convergence_info();
    println!(
        "\n🔁 converged={} after {} iterations (residual {:.2e})",
        info.converged, info.iterations_performed, info.residual
    );

    // 5. Volume-weighted restarts using outgoing transfer totals
    let volume: ScoreMap = graph
        .degree_summary()
        .into_iter()
        .map(|d| (d.id, d.out_degree))
        .collect();
    let mut by_volume = PageRankEngine::new(
        EngineConfig::default()
            .with_personalization_strategy(PersonalizationStrategyKind::TransactionVolume),
    )?;
    let weighted = by_volume.compute_graph_page_rank(&graph, Some(&suspicion), Some(&volume))?;

    println!("\n💸 Volume-weighted top 3:");
    for candidate in PageRankEngine::get_top_fraud_candidates(&weighted, Some(&suspicion), 3) {
        println!("  {} risk={:.4}", candidate.node_id, candidate.risk_score());
    }

    println!("\n✨ Demo complete!");
    Ok(())
}
