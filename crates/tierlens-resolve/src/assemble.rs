use std::collections::BTreeMap;

use futures_util::future::try_join_all;

use tierlens_core::{GraphEdge, GraphNode, LineageGraph, Result};
use tierlens_store::LineageStore;

use crate::traversal::Traversal;

/// Build the canonical, sorted lineage graph from a traversal.
///
/// Nodes are keyed by table id and keep the depth they were first seen at.
pub fn assemble(traversal: &Traversal) -> LineageGraph {
    let mut nodes: BTreeMap<i64, GraphNode> = BTreeMap::new();
    for visit in &traversal.visits {
        nodes.entry(visit.table.id).or_insert_with(|| GraphNode {
            id: visit.table.id,
            name: visit.table.name.clone(),
            layer: visit.table.layer.clone(),
            layer_rank: visit.table.layer_rank,
            description: visit.table.description.clone(),
            depth: visit.depth,
            column_count: None,
        });
    }

    let edges = traversal
        .edges
        .iter()
        .filter(|edge| nodes.contains_key(&edge.source.id) && nodes.contains_key(&edge.target.id))
        .map(|edge| GraphEdge {
            source_id: edge.source.id,
            target_id: edge.target.id,
            source: edge.source.name.clone(),
            target: edge.target.name.clone(),
            source_layer: edge.source.layer.clone(),
            target_layer: edge.target.layer.clone(),
            kind: edge.kind.clone(),
            name: edge.name.clone(),
            confidence: edge.confidence,
            depth: edge.depth,
        })
        .collect();

    let mut graph = LineageGraph {
        nodes: nodes.into_values().collect(),
        edges,
    };
    graph.sort();
    graph
}

/// Fetch the column count of every node, one concurrent lookup per node.
///
/// Fails as a whole if any lookup fails; the graph is left untouched then.
pub async fn attach_column_counts<S>(store: &S, graph: &mut LineageGraph) -> Result<()>
where
    S: LineageStore + ?Sized,
{
    let ids: Vec<i64> = graph.nodes.iter().map(|node| node.id).collect();
    let counts = try_join_all(ids.into_iter().map(|id| store.count_columns(id))).await?;

    for (node, count) in graph.nodes.iter_mut().zip(counts) {
        node.column_count = Some(count);
    }
    Ok(())
}

/// Give nodes without a stored description a generated one.
pub fn fill_descriptions(graph: &mut LineageGraph) {
    for node in &mut graph.nodes {
        let missing = node
            .description
            .as_deref()
            .is_none_or(|text| text.trim().is_empty());
        if missing {
            node.description = Some(format!("{} table in {} layer", node.name, node.layer));
        }
    }
}
