//! Shared output formatting for query commands.

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use vaultgraph_core::graph::{LinkEdge, LinkResolution};
use vaultgraph_core::knowledge::RelatedDocument;

/// Row for related-document tables.
#[derive(Tabled)]
struct RelatedRow {
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Links")]
    links: usize,
}

/// Row for link tables.
#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Resolves to")]
    resolved: String,
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn print_related_table(docs: &[RelatedDocument]) {
    if docs.is_empty() {
        println!("(no related documents)");
        return;
    }

    let rows: Vec<RelatedRow> = docs
        .iter()
        .map(|d| RelatedRow {
            score: format!("{:.3}", d.score),
            path: d.path.clone(),
            title: d.title.clone(),
            links: d.links.len(),
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
}

pub fn print_edges_table(edges: &[LinkEdge]) {
    if edges.is_empty() {
        println!("(no outgoing links)");
        return;
    }

    let rows: Vec<LinkRow> = edges
        .iter()
        .map(|e| LinkRow {
            target: e.raw_target.clone(),
            resolved: match &e.resolution {
                LinkResolution::Resolved(path) => path.clone(),
                LinkResolution::Unresolved => "(dangling)".to_string(),
            },
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
}
