//! Read-only lookup tables built once per compilation pass.

use std::collections::HashMap;

use crate::graph::{Edge, GraphSnapshot, Node, Uniform};

/// Node, edge and uniform lookup by id, plus the incoming-edge adjacency.
///
/// When ids repeat, the last entry in the snapshot wins.
#[derive(Debug, Default)]
pub struct GraphIndex<'a> {
    nodes: HashMap<&'a str, &'a Node>,
    edges: HashMap<&'a str, &'a Edge>,
    uniforms: HashMap<&'a str, &'a Uniform>,
    /// target node id -> incoming edge ids, in snapshot order.
    input_edges: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(snapshot: &'a GraphSnapshot) -> Self {
        let nodes = snapshot.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let edges = snapshot.edges.iter().map(|e| (e.id.as_str(), e)).collect();
        let uniforms = snapshot
            .uniforms
            .iter()
            .map(|u| (u.id.as_str(), u))
            .collect();

        let mut input_edges: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        for edge in &snapshot.edges {
            input_edges
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.id.as_str());
        }

        Self {
            nodes,
            edges,
            uniforms,
            input_edges,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    pub fn edge(&self, id: &str) -> Option<&'a Edge> {
        self.edges.get(id).copied()
    }

    pub fn uniform(&self, id: &str) -> Option<&'a Uniform> {
        self.uniforms.get(id).copied()
    }

    pub fn input_edges(&self, node_id: &str) -> Vec<&'a Edge> {
        self.input_edges
            .get(node_id)
            .map(|ids| ids.iter().filter_map(|id| self.edge(id)).collect())
            .unwrap_or_default()
    }

    /// Source nodes of the incoming edges; edges from unknown nodes are skipped.
    pub fn input_nodes(&self, node_id: &str) -> Vec<&'a Node> {
        self.input_edges(node_id)
            .into_iter()
            .filter_map(|edge| self.node(&edge.source))
            .collect()
    }
}
