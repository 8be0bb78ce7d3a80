//! Links command implementation.

use std::path::Path;

use serde::Serialize;
use vaultgraph_core::graph::LinkEdge;

use super::output::{print_edges_table, print_json};
use super::{Session, load_config};
use crate::LinksArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinksOutput<'a> {
    path: &'a str,
    title: &'a str,
    outgoing: Vec<LinkEdge>,
    backlinks: Vec<&'a str>,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: LinksArgs) {
    let rc = load_config(config, profile);
    let session = Session::open(&rc, None);
    let graph = session.engine.graph();

    let note_path = normalize_path(&args.note);
    let Some(node) = graph.node(&note_path) else {
        eprintln!("Note not found in graph: {}", note_path);
        eprintln!("Hint: Check the path or run 'vgraph sync'.");
        std::process::exit(1);
    };

    let outgoing = graph.outgoing(&note_path);
    let backlinks = graph.backlinks(&note_path);

    if args.json {
        print_json(&LinksOutput { path: &node.path, title: &node.title, outgoing, backlinks });
        return;
    }

    println!("{} ({})", node.title, node.path);
    println!();
    println!("=== Outgoing links ===");
    print_edges_table(&outgoing);
    println!();
    println!("=== Backlinks ===");
    if backlinks.is_empty() {
        println!("(no backlinks)");
    }
    for source in backlinks {
        println!("  {source}");
    }
}

/// Strip a leading `./` and make sure the note has its extension.
fn normalize_path(path: &str) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    if path.ends_with(".md") { path.to_string() } else { format!("{path}.md") }
}
