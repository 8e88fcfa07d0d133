//! Mermaid flowchart rendering for lineage graphs.
//!
//! Nodes are grouped into one subgraph per layer and connected left to right.
//! The output only depends on the graph contents, so a sorted graph always
//! renders to the same text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write as _};

use crate::graph::{GraphNode, LineageGraph};
use crate::layer::Layer;

const STYLE_BLOCK: &[&str] = &[
    "classDef bronze fill:#cd7f32,stroke:#8b4513,stroke-width:2px,color:#fff",
    "classDef silver fill:#c0c0c0,stroke:#708090,stroke-width:2px,color:#000",
    "classDef gold fill:#ffd700,stroke:#b8860b,stroke-width:2px,color:#000",
];

/// Render a lineage graph as a `graph LR` Mermaid diagram.
///
/// Expects the graph to be sorted (see [`LineageGraph::sort`]); nodes are
/// emitted in graph order within their layer's subgraph.
pub fn render(graph: &LineageGraph) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_diagram(&mut out, graph);
    out
}

fn write_diagram(out: &mut String, graph: &LineageGraph) -> fmt::Result {
    let ids = node_ids(graph);
    let id_of = |node: &GraphNode| ids.get(&node.id).map(String::as_str).unwrap_or_default();

    writeln!(out, "graph LR")?;
    for layer in graph.layers() {
        writeln!(
            out,
            "    subgraph {}[\"{}\"]",
            sanitize_id(&layer.to_uppercase()),
            escape_label(&layer_title(&layer))
        )?;
        for node in graph.nodes.iter().filter(|node| node.layer == layer) {
            writeln!(out, "        {}[\"{}\"]", id_of(node), node_label(node))?;
        }
        writeln!(out, "    end")?;
    }

    for edge in &graph.edges {
        let (Some(source), Some(target)) = (graph.node(edge.source_id), graph.node(edge.target_id))
        else {
            continue;
        };
        writeln!(
            out,
            "    {} -->|{}| {}",
            id_of(source),
            escape_label(&edge.kind),
            id_of(target)
        )?;
    }

    writeln!(out)?;
    for line in STYLE_BLOCK {
        writeln!(out, "    {line}")?;
    }
    for node in &graph.nodes {
        writeln!(out, "    class {} {}", id_of(node), style_class(&node.layer))?;
    }
    Ok(())
}

/// Diagram identifiers keyed by table id, of the form `<LAYER_UPPER>_<table_name>`.
///
/// Names that survive sanitizing unchanged claim their identifier first; a
/// sanitized name that collides with one already taken gets the table id
/// appended.
fn node_ids(graph: &LineageGraph) -> BTreeMap<i64, String> {
    let mut ids = BTreeMap::new();
    let mut taken = BTreeSet::new();

    let (clean, rewritten): (Vec<&GraphNode>, Vec<&GraphNode>) = graph
        .nodes
        .iter()
        .partition(|node| sanitize_id(&node.name) == node.name);

    for node in clean.into_iter().chain(rewritten) {
        let base = sanitize_id(&format!("{}_{}", node.layer.to_uppercase(), node.name));
        let mut id = base.clone();
        let mut attempt = 0;
        while taken.contains(&id) {
            attempt += 1;
            id = if attempt == 1 {
                format!("{base}_{}", node.id)
            } else {
                format!("{base}_{}_{attempt}", node.id)
            };
        }
        taken.insert(id.clone());
        ids.insert(node.id, id);
    }
    ids
}

fn layer_title(layer: &str) -> String {
    match Layer::from_name(layer) {
        Some(known) => format!("{} Layer ({})", known.display_name(), known.subtitle()),
        None => format!("{} Layer", capitalize(layer)),
    }
}

fn node_label(node: &GraphNode) -> String {
    let mut parts = vec![escape_label(&node.name)];
    if let Some(count) = node.column_count {
        parts.push(format!("{count} columns"));
    }
    if let Some(description) = node.description.as_deref().filter(|d| !d.trim().is_empty()) {
        parts.push(escape_label(description.trim()));
    }
    parts.join("<br/>")
}

fn style_class(layer: &str) -> String {
    sanitize_id(&layer.to_lowercase())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sanitize_id(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

// Labels sit inside `["..."]` and `|...|`; quotes, pipes and newlines would end them early.
fn escape_label(value: &str) -> String {
    value
        .replace('"', "#quot;")
        .replace('|', "#124;")
        .replace(['\r', '\n'], " ")
}
