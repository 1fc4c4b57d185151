//! Formatting and lookup helpers shared by node compilers.

use std::collections::HashMap;

use crate::graph::Edge;

/// Format a number as a GLSL float literal; the result always contains a `.`.
///
/// `1` renders as `1.` and `0.25` stays `0.25`.
pub fn format_float_literal(value: f64) -> String {
    let mut s = value.to_string();
    if !s.contains('.') {
        s.push('.');
    }
    s
}

/// Key incoming edges by the input socket they attach to.
///
/// When several edges target the same socket the first one wins. Edges without
/// a target handle are skipped.
pub fn edges_by_handle<'a>(edges: &[&'a Edge]) -> HashMap<&'a str, &'a Edge> {
    let mut by_handle: HashMap<&'a str, &'a Edge> = HashMap::new();
    for edge in edges {
        if let Some(handle) = edge.target_handle.as_deref() {
            by_handle.entry(handle).or_insert(*edge);
        }
    }
    by_handle
}
