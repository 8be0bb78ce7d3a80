//! Graph command implementation.

use std::path::Path;

use serde::Serialize;
use vaultgraph_core::graph::{GraphStats, LinkEdge};

use super::output::print_json;
use super::{Session, load_config};
use crate::GraphArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphOutput<'a> {
    stats: GraphStats,
    dangling: Vec<LinkEdge>,
    orphans: Vec<&'a str>,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: GraphArgs) {
    let rc = load_config(config, profile);
    let session = Session::open(&rc, None);
    let graph = session.engine.graph();

    let stats = graph.stats();
    let dangling = graph.dangling();
    let orphans: Vec<&str> = graph.orphans().into_iter().map(|n| n.path.as_str()).collect();

    if args.json {
        print_json(&GraphOutput { stats, dangling, orphans });
        return;
    }

    println!("Graph: {}", rc.vault_root.display());
    println!("  Documents:  {}", stats.nodes);
    println!("  Links:      {}", stats.edges);
    println!("  Resolved:   {}", stats.resolved);
    println!("  Dangling:   {}", stats.dangling);
    println!("  Orphans:    {}", stats.orphans);

    if !dangling.is_empty() {
        println!();
        println!("Dangling links:");
        for edge in &dangling {
            println!("  {} -> {}", edge.source, edge.raw_target);
        }
    }
}
