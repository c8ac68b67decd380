//! SoPaGraMi CLI
//!
//! Loads a labelled graph from an `.lg` file, mines every frequent connected
//! pattern and prints them, one line each or as JSON.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;

use clap::Parser;
use sopagrami_common::DataGraph;
use sopagrami_miner::run_sopagrami;
use tracing::info;

use args::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let params = args.to_params();

    info!("Loading graph: {}", args.graph.display());
    let graph = DataGraph::load_from_lg(&args.graph, params.directed)?;
    let out = run_sopagrami(&graph, &params)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("[sopagrami] |V|={} |E|={}", graph.num_vertices(), graph.num_edges());
    println!(
        "[sopagrami] tau={} directed={} sorted={} threads={} full={}",
        params.tau,
        params.mines_directed(graph.is_directed()),
        params.sorted_seeds,
        params.resolved_threads(),
        params.compute_full_support
    );
    println!(
        "[sopagrami] {} frequent patterns in {:.3?}",
        out.len(),
        out.stats.elapsed
    );

    for (i, found) in out.frequent_patterns.iter().enumerate() {
        println!(
            "{i}: k={} |E|={} support={} full={} key={}",
            found.pat.num_vertices(),
            found.pat.num_edges(),
            found.support,
            found.full_support,
            found.pat
        );
    }

    Ok(())
}
