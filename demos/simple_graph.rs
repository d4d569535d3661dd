//! Simple example demonstrating fraudrank graph storage
//!
//! Run with: cargo run --example simple_graph

use fraudrank::TransactionGraph;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🦀 fraudrank Graph Store Example\n");

    // 1. Build a payment graph
    println!("📊 Building payment graph...");
    let mut graph = TransactionGraph::directed();

    graph.add_edge("payroll", "alice", 4_200.0)?;
    graph.add_edge("payroll", "bob", 3_900.0)?;
    graph.add_edge("alice", "landlord", 1_500.0)?;
    graph.add_edge("bob", "landlord", 1_350.0)?;
    graph.add_edge("alice", "bob", 60.0)?;
    graph.add_edge("alice", "bob", 75.0)?; // overwrites, does not accumulate
    graph.add_node("savings");

    println!("  ✅ {graph}\n");

    // 2. Query neighbors and degrees
    println!("🔍 Querying graph...");
    for (target, amount) in graph.get_neighbors("alice") {
        println!("  alice → {target}: {amount:.2}");
    }
    for degree in graph.degree_summary() {
        println!(
            "  {:<10} out={:>8.2} in={:>8.2}",
            degree.id, degree.out_degree, degree.in_degree
        );
    }
    let dangling: Vec<&str> = graph
        .get_nodes()
        .iter()
        .zip(graph.get_dangling_nodes())
        .filter(|(_, dangling)| *dangling)
        .map(|(id, _)| id.as_str())
        .collect();
    println!("  Dangling accounts: {dangling:?}");

    // 3. Text format
    println!("\n📝 Text format:");
    print!("{}", graph.to_text());

    // 4. Persist to Parquet
    println!("\n💾 Saving to Parquet...");
    let path = std::env::temp_dir().join("fraudrank_example_graph");
    graph.write_parquet(&path).await?;
    println!("  ✅ Saved to {}_edges.parquet", path.display());
    println!("  ✅ Saved to {}_nodes.parquet", path.display());

    // 5. Load from Parquet
    println!("\n📂 Loading from Parquet...");
    let loaded = TransactionGraph::read_parquet(&path).await?;
    println!("  ✅ Loaded: {loaded}");

    // Isolated accounts survive Parquet (unlike the text format)
    assert_eq!(loaded.get_nodes(), graph.get_nodes());
    assert_eq!(loaded.get_edges(), graph.get_edges());
    assert!(loaded.contains_node("savings"));

    println!("\n✨ Example complete!");

    Ok(())
}
