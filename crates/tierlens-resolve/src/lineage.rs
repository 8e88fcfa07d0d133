//! Lineage chain and full-flow resolution pipelines.

use tierlens_core::{Direction, GraphSummary, Layer, LineageGraph, Result, TableRecord, mermaid};
use tierlens_store::LineageStore;

use crate::assemble::{assemble, attach_column_counts, fill_descriptions};
use crate::traversal::{EdgeSource, TraversalOptions, traverse};

/// Transformation lineage around a single table, ready for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct LineageChain {
    /// The seed table, `None` when it does not exist in the requested layer.
    pub seed: Option<TableRecord>,
    pub graph: LineageGraph,
    pub mermaid: String,
    pub total_depth: u32,
    pub layers_involved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainQuery {
    pub table_name: String,
    pub layer: Layer,
    pub direction: Direction,
    pub max_depth: u32,
}

/// Relationship flow across the warehouse, optionally from one start table.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub graph: LineageGraph,
    pub summary: GraphSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowQuery {
    pub start_table: Option<String>,
    pub end_table: Option<String>,
    pub max_depth: u32,
}

/// Walk transformation edges around `table_name` in `layer`, then attach
/// column counts and descriptions and render the diagram.
pub async fn resolve_lineage_chain<S>(store: &S, query: &ChainQuery) -> Result<LineageChain>
where
    S: LineageStore + ?Sized,
{
    let seed = store
        .find_table(&query.table_name, query.layer.as_str())
        .await?;

    let opts = TraversalOptions {
        edges: EdgeSource::Transformations,
        direction: query.direction,
        max_depth: query.max_depth,
        end_table: None,
    };
    let traversal = traverse(store, seed.iter().cloned().collect(), &opts).await?;

    let mut graph = assemble(&traversal);
    attach_column_counts(store, &mut graph).await?;
    fill_descriptions(&mut graph);

    let mermaid = mermaid::render(&graph);
    Ok(LineageChain {
        seed,
        total_depth: graph.max_depth(),
        layers_involved: graph.layers(),
        mermaid,
        graph,
    })
}

/// Walk relationship edges downstream from `start_table` (every table of that
/// name) or, without one, from every table of the lowest-ranked layer.
pub async fn resolve_flow<S>(store: &S, query: &FlowQuery) -> Result<Flow>
where
    S: LineageStore + ?Sized,
{
    let seeds = match query.start_table.as_deref() {
        Some(name) => store.find_tables_named(name).await?,
        None => match store.list_layers().await?.first() {
            Some(entry) => store.list_tables(Some(&entry.name)).await?,
            None => Vec::new(),
        },
    };

    let opts = TraversalOptions {
        edges: EdgeSource::Relationships,
        direction: Direction::Downstream,
        max_depth: query.max_depth,
        end_table: query.end_table.clone(),
    };
    let graph = assemble(&traverse(store, seeds, &opts).await?);

    Ok(Flow {
        summary: graph.summary(),
        graph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CatalogBuilder, orders_chain};

    fn chain_query(name: &str, layer: Layer, max_depth: u32) -> ChainQuery {
        ChainQuery {
            table_name: name.to_string(),
            layer,
            direction: Direction::Both,
            max_depth,
        }
    }

    #[tokio::test]
    async fn orders_chain_resolves_three_layers() {
        let store = orders_chain();
        let chain = resolve_lineage_chain(&store, &chain_query("orders", Layer::Bronze, 3))
            .await
            .unwrap();

        assert_eq!(chain.graph.nodes.len(), 3);
        assert_eq!(chain.graph.edges.len(), 2);
        assert_eq!(chain.total_depth, 2);
        assert_eq!(chain.layers_involved, vec!["bronze", "silver", "gold"]);
        assert_eq!(chain.mermaid.matches("subgraph ").count(), 3);
        assert!(chain.mermaid.contains("-->|cleansing|"));
        assert!(chain.mermaid.contains("-->|aggregation|"));
        assert_eq!(chain.mermaid.matches("-->").count(), 2);
    }

    #[tokio::test]
    async fn chain_from_middle_reaches_both_ends() {
        let store = orders_chain();
        let chain = resolve_lineage_chain(&store, &chain_query("orders_clean", Layer::Silver, 3))
            .await
            .unwrap();

        assert_eq!(chain.total_depth, 1);
        assert!(chain.graph.nodes.iter().all(|node| node.column_count.is_some()));
    }

    #[tokio::test]
    async fn missing_seed_gives_empty_graph() {
        let store = orders_chain();
        let chain = resolve_lineage_chain(&store, &chain_query("orders", Layer::Gold, 3))
            .await
            .unwrap();

        assert!(chain.seed.is_none());
        assert!(chain.graph.is_empty());
        assert_eq!(chain.total_depth, 0);
        assert!(chain.layers_involved.is_empty());
    }

    #[tokio::test]
    async fn chain_is_deterministic() {
        let store = orders_chain();
        let query = chain_query("orders", Layer::Bronze, 3);
        let first = resolve_lineage_chain(&store, &query).await.unwrap();
        let second = resolve_lineage_chain(&store, &query).await.unwrap();
        assert_eq!(first.mermaid, second.mermaid);
    }

    #[tokio::test]
    async fn flow_defaults_to_all_bronze_tables() {
        let store = CatalogBuilder::new()
            .table(1, "orders", "bronze")
            .table(2, "customer_raw", "bronze")
            .table(3, "orders_clean", "silver")
            .table(4, "customer", "silver")
            .table(5, "sales", "gold")
            .relationship(1, 3, "lineage", 0.9)
            .relationship(2, 4, "lineage", 0.8)
            .relationship(3, 5, "aggregation", 0.9)
            .relationship(4, 5, "enrichment", 0.7)
            .build();
        let flow = resolve_flow(
            &store,
            &FlowQuery {
                start_table: None,
                end_table: None,
                max_depth: 3,
            },
        )
        .await
        .unwrap();

        assert_eq!(flow.summary.total_nodes, 5);
        assert_eq!(flow.summary.total_edges, 4);
        assert_eq!(flow.summary.max_depth, 2);
        assert_eq!(flow.summary.layers, vec!["bronze", "silver", "gold"]);
        let seeds: Vec<&str> = flow
            .graph
            .nodes
            .iter()
            .filter(|node| node.depth == 0)
            .map(|node| node.name.as_str())
            .collect();
        assert_eq!(seeds, vec!["customer_raw", "orders"]);
    }

    #[tokio::test]
    async fn flow_from_unknown_start_is_empty() {
        let store = orders_chain();
        let flow = resolve_flow(
            &store,
            &FlowQuery {
                start_table: Some("nope".to_string()),
                end_table: None,
                max_depth: 3,
            },
        )
        .await
        .unwrap();
        assert_eq!(flow.summary.total_nodes, 0);
        assert!(flow.summary.layers.is_empty());
    }
}
