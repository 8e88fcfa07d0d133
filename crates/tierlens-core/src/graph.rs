use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A table reached during lineage resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphNode {
    pub id: i64,
    pub name: String,
    pub layer: String,
    pub layer_rank: i32,
    pub description: Option<String>,
    /// Hops from the nearest seed; seeds have depth 0.
    pub depth: u32,
    pub column_count: Option<i64>,
}

/// A directed edge between two graph nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphEdge {
    pub source_id: i64,
    pub target_id: i64,
    pub source: String,
    pub target: String,
    pub source_layer: String,
    pub target_layer: String,
    pub kind: String,
    /// Transformation name, when the edge is a transformation.
    pub name: Option<String>,
    pub confidence: f64,
    /// Depth of the node this edge discovered.
    pub depth: u32,
}

/// Derived lineage structure, built per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineageGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub max_depth: u32,
    pub layers: Vec<String>,
}

impl LineageGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: i64) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Deepest node depth, 0 for an empty graph.
    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Distinct layer names ordered by rank, then name.
    pub fn layers(&self) -> Vec<String> {
        let mut layers: BTreeMap<(i32, &str), ()> = BTreeMap::new();
        for node in &self.nodes {
            layers.insert((node.layer_rank, node.layer.as_str()), ());
        }
        layers
            .into_keys()
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Sort nodes by (layer rank, name, id) and edges by discovery depth, then
    /// endpoint order and kind. Output built from a sorted graph is stable.
    pub fn sort(&mut self) {
        self.nodes.sort_by(|left, right| {
            (left.layer_rank, &left.name, left.id).cmp(&(right.layer_rank, &right.name, right.id))
        });

        let position: BTreeMap<i64, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();
        let rank = |id: i64| position.get(&id).copied().unwrap_or(usize::MAX);

        self.edges.sort_by(|left, right| {
            (left.depth, rank(left.source_id), rank(left.target_id), &left.kind).cmp(&(
                right.depth,
                rank(right.source_id),
                rank(right.target_id),
                &right.kind,
            ))
        });
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            max_depth: self.max_depth(),
            layers: self.layers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, name: &str, layer: &str, rank: i32, depth: u32) -> GraphNode {
        GraphNode {
            id,
            name: name.to_string(),
            layer: layer.to_string(),
            layer_rank: rank,
            description: None,
            depth,
            column_count: None,
        }
    }

    #[test]
    fn sorts_nodes_by_layer_then_name() {
        let mut graph = LineageGraph {
            nodes: vec![
                node(3, "orders_agg", "gold", 3, 2),
                node(2, "b_clean", "silver", 2, 1),
                node(4, "a_clean", "silver", 2, 1),
                node(1, "orders", "bronze", 1, 0),
            ],
            edges: Vec::new(),
        };
        graph.sort();

        let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "a_clean", "b_clean", "orders_agg"]);
    }

    #[test]
    fn summary_reports_layers_in_rank_order() {
        let graph = LineageGraph {
            nodes: vec![
                node(3, "orders_agg", "gold", 3, 2),
                node(1, "orders", "bronze", 1, 0),
            ],
            edges: Vec::new(),
        };

        let summary = graph.summary();
        assert_eq!(summary.total_nodes, 2);
        assert_eq!(summary.max_depth, 2);
        assert_eq!(summary.layers, vec!["bronze", "gold"]);
    }

    #[test]
    fn empty_graph_has_zero_depth() {
        let graph = LineageGraph::default();
        assert!(graph.is_empty());
        assert_eq!(graph.summary(), GraphSummary::default());
    }
}
