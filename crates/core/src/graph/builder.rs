//! Document graph construction and link resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::resolve::Resolver;
use super::types::{DocumentNode, GraphStats, LinkEdge, LinkResolution};
use crate::vault::extract_note;

/// In-memory document graph for one vault.
///
/// Nodes are keyed by vault path. Links are recorded raw on upsert and
/// resolved in a separate [`GraphBuilder::resolve`] pass once the batch of
/// nodes is complete.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<String, DocumentNode>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from stored nodes and resolve it.
    pub fn from_nodes(nodes: impl IntoIterator<Item = DocumentNode>) -> Self {
        let mut graph =
            Self { nodes: nodes.into_iter().map(|n| (n.path.clone(), n)).collect() };
        graph.resolve();
        graph
    }

    /// Build a resolved graph from `(path, content)` pairs.
    pub fn build<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let mut graph = Self::new();
        for (path, content) in files {
            graph.upsert_node(path.as_ref(), content.as_ref());
        }
        graph.resolve();
        graph
    }

    /// Create or update the node for `path` from its content.
    ///
    /// Links start out unresolved; the stored index id survives updates.
    pub fn upsert_node(&mut self, path: &str, content: &str) -> &DocumentNode {
        let extracted = extract_note(content, Path::new(path));
        let index_id = self.nodes.get(path).and_then(|n| n.index_id.clone());

        let mut node = DocumentNode::new(path, extracted.title, extracted.links);
        node.index_id = index_id;

        self.nodes.insert(path.to_string(), node);
        &self.nodes[path]
    }

    /// Drop a node. Links pointing at it become dangling on the next resolve.
    pub fn remove_node(&mut self, path: &str) -> Option<DocumentNode> {
        self.nodes.remove(path)
    }

    /// Record the index identifier for a node. Returns false if absent.
    pub fn set_index_id(&mut self, path: &str, id: impl Into<String>) -> bool {
        match self.nodes.get_mut(path) {
            Some(node) => {
                node.index_id = Some(id.into());
                true
            }
            None => false,
        }
    }

    /// Resolve every raw link against the current node set.
    ///
    /// Deterministic for a given node set, whatever order the nodes were added in.
    pub fn resolve(&mut self) {
        let resolutions: Vec<(String, BTreeMap<String, LinkResolution>)> = {
            let resolver = Resolver::new(self.nodes.keys().map(String::as_str));
            self.nodes
                .values()
                .map(|node| {
                    let links = node
                        .links
                        .keys()
                        .map(|raw| {
                            let resolution = match resolver.resolve(&node.path, raw) {
                                Some(path) => LinkResolution::Resolved(path),
                                None => LinkResolution::Unresolved,
                            };
                            (raw.clone(), resolution)
                        })
                        .collect();
                    (node.path.clone(), links)
                })
                .collect()
        };

        for (path, links) in resolutions {
            if let Some(node) = self.nodes.get_mut(&path) {
                node.links = links;
            }
        }
    }

    pub fn node(&self, path: &str) -> Option<&DocumentNode> {
        self.nodes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Nodes sorted by path.
    pub fn nodes(&self) -> impl Iterator<Item = &DocumentNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All edges, sorted by source then raw target.
    pub fn edges(&self) -> Vec<LinkEdge> {
        self.nodes.values().flat_map(node_edges).collect()
    }

    /// Outgoing edges of one document.
    pub fn outgoing(&self, path: &str) -> Vec<LinkEdge> {
        self.nodes.get(path).map(|n| node_edges(n).collect()).unwrap_or_default()
    }

    /// Paths of documents with a resolved link to `path`.
    pub fn backlinks(&self, path: &str) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|n| n.links.values().any(|r| r.resolved_path() == Some(path)))
            .map(|n| n.path.as_str())
            .collect()
    }

    /// Edges whose target matched no document.
    pub fn dangling(&self) -> Vec<LinkEdge> {
        self.edges().into_iter().filter(|e| !e.resolution.is_resolved()).collect()
    }

    /// Documents nothing else links to.
    pub fn orphans(&self) -> Vec<&DocumentNode> {
        let targeted: BTreeSet<&str> = self
            .nodes
            .values()
            .flat_map(|n| {
                n.links
                    .values()
                    .filter_map(LinkResolution::resolved_path)
                    .filter(move |target| *target != n.path)
            })
            .collect();

        self.nodes.values().filter(|n| !targeted.contains(n.path.as_str())).collect()
    }

    pub fn stats(&self) -> GraphStats {
        let edges = self.edges();
        let resolved = edges.iter().filter(|e| e.resolution.is_resolved()).count();
        GraphStats {
            nodes: self.nodes.len(),
            edges: edges.len(),
            resolved,
            dangling: edges.len() - resolved,
            orphans: self.orphans().len(),
        }
    }
}

fn node_edges(node: &DocumentNode) -> impl Iterator<Item = LinkEdge> + '_ {
    node.links.iter().map(|(raw, resolution)| LinkEdge {
        source: node.path.clone(),
        raw_target: raw.clone(),
        resolution: resolution.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> Vec<(&'static str, &'static str)> {
        vec![
            ("note1.md", "# Note 1\n\nLinks to [[note2]] and [[missing-note]]."),
            ("note2.md", "# Note 2\n\nBack to [[note1|the first]]."),
            ("sub/note3.md", "# Note 3\n\nSee [Note One](../note1.md) and [[sub/note4]]."),
            ("sub/note4.md", "No heading here."),
        ]
    }

    fn render(edges: &[LinkEdge]) -> String {
        edges
            .iter()
            .map(|e| match &e.resolution {
                LinkResolution::Resolved(p) => format!("{} -> {}", e.source, p),
                LinkResolution::Unresolved => format!("{} -> ?{}", e.source, e.raw_target),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_build_resolves_edges() {
        let graph = GraphBuilder::build(sample_files());

        insta::assert_snapshot!(render(&graph.edges()), @r"
        note1.md -> ?missing-note
        note1.md -> note2.md
        note2.md -> note1.md
        sub/note3.md -> note1.md
        sub/note3.md -> sub/note4.md
        ");
    }

    #[test]
    fn test_titles() {
        let graph = GraphBuilder::build(sample_files());
        assert_eq!(graph.node("note1.md").unwrap().title, "Note 1");
        assert_eq!(graph.node("sub/note4.md").unwrap().title, "note4");
    }

    #[test]
    fn test_node_link_sets() {
        let graph = GraphBuilder::build(sample_files());
        let note1 = graph.node("note1.md").unwrap();

        assert_eq!(note1.raw_links().collect::<Vec<_>>(), vec!["missing-note", "note2"]);
        assert_eq!(note1.resolved_links().into_iter().collect::<Vec<_>>(), vec!["note2.md"]);
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let files = sample_files();
        let expected = GraphBuilder::build(files.clone()).edges();

        let mut reversed = files.clone();
        reversed.reverse();
        assert_eq!(GraphBuilder::build(reversed).edges(), expected);

        let rotated: Vec<_> = files[2..].iter().chain(&files[..2]).copied().collect();
        assert_eq!(GraphBuilder::build(rotated).edges(), expected);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut graph = GraphBuilder::build(sample_files());
        let first = graph.edges();
        graph.resolve();
        assert_eq!(graph.edges(), first);
    }

    #[test]
    fn test_remove_node_leaves_dangling_links() {
        let mut graph = GraphBuilder::build(sample_files());
        graph.remove_node("note2.md");
        graph.resolve();

        assert!(!graph.contains("note2.md"));
        let outgoing = graph.outgoing("note1.md");
        let note2_edge = outgoing.iter().find(|e| e.raw_target == "note2").unwrap();
        assert_eq!(note2_edge.resolution, LinkResolution::Unresolved);
    }

    #[test]
    fn test_late_node_resolves_dangling_link() {
        let mut graph = GraphBuilder::build(sample_files());
        graph.upsert_node("missing-note.md", "# Found");
        graph.resolve();

        assert!(graph.dangling().is_empty());
        assert_eq!(graph.backlinks("missing-note.md"), vec!["note1.md"]);
    }

    #[test]
    fn test_upsert_keeps_index_id() {
        let mut graph = GraphBuilder::build(sample_files());
        assert!(graph.set_index_id("note1.md", "doc-1"));
        graph.upsert_node("note1.md", "# Renamed");

        let node = graph.node("note1.md").unwrap();
        assert_eq!(node.title, "Renamed");
        assert_eq!(node.index_id.as_deref(), Some("doc-1"));
        assert!(!graph.set_index_id("absent.md", "x"));
    }

    #[test]
    fn test_backlinks_orphans_and_stats() {
        let graph = GraphBuilder::build(sample_files());

        assert_eq!(graph.backlinks("note1.md"), vec!["note2.md", "sub/note3.md"]);
        let orphans: Vec<_> = graph.orphans().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(orphans, vec!["sub/note3.md"]);

        let stats = graph.stats();
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.edges, 5);
        assert_eq!(stats.resolved, 4);
        assert_eq!(stats.dangling, 1);
        assert_eq!(stats.orphans, 1);
    }

    #[test]
    fn test_from_nodes_recomputes_resolution() {
        let nodes = vec![
            DocumentNode::new("a.md", "A", ["b".to_string()]),
            DocumentNode::new("b.md", "B", Vec::new()),
        ];
        let graph = GraphBuilder::from_nodes(nodes);
        assert_eq!(
            graph.node("a.md").unwrap().links["b"],
            LinkResolution::Resolved("b.md".to_string())
        );
    }
}
