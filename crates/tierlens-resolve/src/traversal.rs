//! Bounded breadth-first walks over relationship or transformation edges.
//!
//! Each level issues at most one batched store query per walk side, so the
//! number of round trips is bounded by `2 * max_depth` regardless of fan-out.

use std::collections::{BTreeMap, HashSet};

use tierlens_core::{Direction, EdgeSide, Result, TableRecord};
use tierlens_store::LineageStore;

/// Which edge relation a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSource {
    Relationships,
    Transformations,
}

#[derive(Debug, Clone)]
pub struct TraversalOptions {
    pub edges: EdgeSource,
    pub direction: Direction,
    pub max_depth: u32,
    /// Table name only accepted as the last hop (`depth == max_depth`).
    pub end_table: Option<String>,
}

/// A table reached by the walk and the level it was first reached at.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub table: TableRecord,
    pub depth: u32,
}

/// An edge crossed by the walk, uniform over both edge sources.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversedEdge {
    pub source: TableRecord,
    pub target: TableRecord,
    pub kind: String,
    pub name: Option<String>,
    pub confidence: f64,
    /// Depth of the endpoint this edge discovered.
    pub depth: u32,
}

/// Raw traversal output, ordered by discovery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traversal {
    pub visits: Vec<Visit>,
    pub edges: Vec<TraversedEdge>,
}

/// Walk side a frontier entry keeps following.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Downstream,
    Upstream,
}

impl Walk {
    fn side(self) -> EdgeSide {
        match self {
            Walk::Downstream => EdgeSide::Outgoing,
            Walk::Upstream => EdgeSide::Incoming,
        }
    }
}

/// Walk from `seeds` (all at depth 0) following `opts`.
///
/// Tables are visited once: an edge is kept only if its far endpoint had not
/// been reached on an earlier level. Nodes reached downstream keep walking
/// downstream; nodes reached upstream keep walking upstream. Expansion stops
/// silently at `max_depth`. Any store failure aborts the whole walk.
pub async fn traverse<S>(store: &S, seeds: Vec<TableRecord>, opts: &TraversalOptions) -> Result<Traversal>
where
    S: LineageStore + ?Sized,
{
    let mut visited: HashSet<i64> = HashSet::new();
    let mut traversal = Traversal::default();
    let mut downstream: Vec<i64> = Vec::new();
    let mut upstream: Vec<i64> = Vec::new();

    for seed in seeds {
        if !visited.insert(seed.id) {
            continue;
        }
        if opts.direction.includes_downstream() {
            downstream.push(seed.id);
        }
        if opts.direction.includes_upstream() {
            upstream.push(seed.id);
        }
        traversal.visits.push(Visit {
            table: seed,
            depth: 0,
        });
    }

    let mut seen_edges: HashSet<(i64, i64, String)> = HashSet::new();
    let mut depth = 0;

    while depth < opts.max_depth && !(downstream.is_empty() && upstream.is_empty()) {
        let next_depth = depth + 1;
        let mut reached: BTreeMap<i64, TableRecord> = BTreeMap::new();
        let mut next_downstream = Vec::new();
        let mut next_upstream = Vec::new();

        for (walk, frontier, next) in [
            (Walk::Downstream, &downstream, &mut next_downstream),
            (Walk::Upstream, &upstream, &mut next_upstream),
        ] {
            if frontier.is_empty() {
                continue;
            }

            for edge in fetch_edges(store, frontier, walk.side(), opts.edges).await? {
                let far = match walk {
                    Walk::Downstream => &edge.target,
                    Walk::Upstream => &edge.source,
                };
                if visited.contains(&far.id) || !end_table_allowed(opts, far, next_depth) {
                    continue;
                }

                let far = far.clone();
                let key = (edge.source.id, edge.target.id, edge.kind.clone());
                if seen_edges.insert(key) {
                    traversal.edges.push(TraversedEdge {
                        depth: next_depth,
                        ..edge
                    });
                }
                if !next.contains(&far.id) {
                    next.push(far.id);
                }
                reached.entry(far.id).or_insert(far);
            }
        }

        tracing::debug!(
            event = "traversal_level",
            depth = next_depth,
            reached = reached.len(),
            edges = traversal.edges.len()
        );

        for (id, table) in reached {
            visited.insert(id);
            traversal.visits.push(Visit {
                table,
                depth: next_depth,
            });
        }

        downstream = next_downstream;
        upstream = next_upstream;
        depth = next_depth;
    }

    if !(downstream.is_empty() && upstream.is_empty()) {
        tracing::debug!(
            event = "traversal_truncated",
            max_depth = opts.max_depth,
            frontier = downstream.len() + upstream.len()
        );
    }

    Ok(traversal)
}

fn end_table_allowed(opts: &TraversalOptions, far: &TableRecord, depth: u32) -> bool {
    match opts.end_table.as_deref() {
        Some(end) if far.name == end => depth == opts.max_depth,
        _ => true,
    }
}

async fn fetch_edges<S>(
    store: &S,
    table_ids: &[i64],
    side: EdgeSide,
    source: EdgeSource,
) -> Result<Vec<TraversedEdge>>
where
    S: LineageStore + ?Sized,
{
    let edges = match source {
        EdgeSource::Relationships => store
            .relationships(table_ids, side)
            .await?
            .into_iter()
            .map(|rel| TraversedEdge {
                source: rel.source,
                target: rel.target,
                kind: rel.kind,
                name: None,
                confidence: rel.confidence,
                depth: 0,
            })
            .collect(),
        EdgeSource::Transformations => store
            .transformations(table_ids, side)
            .await?
            .into_iter()
            .map(|tr| TraversedEdge {
                source: tr.source,
                target: tr.target,
                kind: tr.kind,
                name: Some(tr.name),
                confidence: 1.0,
                depth: 0,
            })
            .collect(),
    };
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::test_support::{BrokenStore, CatalogBuilder, orders_chain};

    fn opts(edges: EdgeSource, direction: Direction, max_depth: u32) -> TraversalOptions {
        TraversalOptions {
            edges,
            direction,
            max_depth,
            end_table: None,
        }
    }

    fn depths(traversal: &Traversal) -> HashMap<&str, u32> {
        traversal
            .visits
            .iter()
            .map(|visit| (visit.table.name.as_str(), visit.depth))
            .collect()
    }

    async fn seed(store: &impl LineageStore, name: &str, layer: &str) -> Vec<TableRecord> {
        store.find_table(name, layer).await.unwrap().into_iter().collect()
    }

    fn assert_depth_monotone(traversal: &Traversal) {
        let by_id: HashMap<i64, u32> = traversal
            .visits
            .iter()
            .map(|visit| (visit.table.id, visit.depth))
            .collect();
        for edge in &traversal.edges {
            let mut ends = [by_id[&edge.source.id], by_id[&edge.target.id]];
            ends.sort();
            assert_eq!(ends, [edge.depth - 1, edge.depth], "edge {edge:?}");
        }
    }

    #[tokio::test]
    async fn follows_transformations_downstream() {
        let store = orders_chain();
        let seeds = seed(&store, "orders", "bronze").await;
        let result = traverse(&store, seeds, &opts(EdgeSource::Transformations, Direction::Downstream, 3))
            .await
            .unwrap();

        let depths = depths(&result);
        assert_eq!(depths["orders"], 0);
        assert_eq!(depths["orders_clean"], 1);
        assert_eq!(depths["orders_agg"], 2);
        assert_eq!(result.edges.len(), 2);
        assert_eq!(result.edges[0].name.as_deref(), Some("cleansing_1_2"));
        assert_depth_monotone(&result);
    }

    #[tokio::test]
    async fn upstream_walk_ignores_downstream_edges() {
        let store = orders_chain();
        let seeds = seed(&store, "orders_clean", "silver").await;
        let result = traverse(&store, seeds, &opts(EdgeSource::Transformations, Direction::Upstream, 3))
            .await
            .unwrap();

        let names: Vec<&str> = result.visits.iter().map(|v| v.table.name.as_str()).collect();
        assert_eq!(names, vec!["orders_clean", "orders"]);
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].target.name, "orders_clean");
    }

    #[tokio::test]
    async fn both_directions_do_not_wander_into_siblings() {
        // a -> hub <- b ; hub -> out. Seeded at `out` upstream-and-downstream,
        // the walk reaches hub, a and b but never follows hub's other children.
        let store = CatalogBuilder::new()
            .table(1, "a", "bronze")
            .table(2, "b", "bronze")
            .table(3, "hub", "silver")
            .table(4, "out", "gold")
            .table(5, "sibling", "gold")
            .relationship(1, 3, "lineage", 0.9)
            .relationship(2, 3, "lineage", 0.9)
            .relationship(3, 4, "lineage", 0.9)
            .relationship(3, 5, "lineage", 0.9)
            .build();
        let seeds = seed(&store, "out", "gold").await;
        let result = traverse(&store, seeds, &opts(EdgeSource::Relationships, Direction::Both, 5))
            .await
            .unwrap();

        let depths = depths(&result);
        assert_eq!(depths.len(), 4);
        assert!(!depths.contains_key("sibling"));
        assert_eq!(depths["a"], 2);
        assert_depth_monotone(&result);
    }

    #[tokio::test]
    async fn cycle_terminates_without_revisiting_seed() {
        let store = CatalogBuilder::new()
            .table(1, "a", "bronze")
            .table(2, "b", "silver")
            .table(3, "c", "gold")
            .relationship(1, 2, "lineage", 0.9)
            .relationship(2, 3, "lineage", 0.9)
            .relationship(3, 1, "reference", 0.5)
            .build();
        let seeds = seed(&store, "a", "bronze").await;
        let result = traverse(&store, seeds, &opts(EdgeSource::Relationships, Direction::Downstream, 10))
            .await
            .unwrap();

        assert_eq!(result.visits.len(), 3);
        assert_eq!(result.visits.iter().filter(|v| v.table.id == 1).count(), 1);
        assert_eq!(depths(&result)["a"], 0);
        assert_eq!(result.edges.len(), 2);
    }

    #[tokio::test]
    async fn diamond_keeps_both_edges_and_one_node() {
        let store = CatalogBuilder::new()
            .table(1, "src", "bronze")
            .table(2, "left", "silver")
            .table(3, "right", "silver")
            .table(4, "sink", "gold")
            .relationship(1, 2, "lineage", 0.9)
            .relationship(1, 3, "lineage", 0.9)
            .relationship(2, 4, "aggregation", 0.8)
            .relationship(3, 4, "aggregation", 0.8)
            .build();
        let seeds = seed(&store, "src", "bronze").await;
        let result = traverse(&store, seeds, &opts(EdgeSource::Relationships, Direction::Downstream, 3))
            .await
            .unwrap();

        assert_eq!(result.visits.iter().filter(|v| v.table.name == "sink").count(), 1);
        assert_eq!(result.edges.iter().filter(|e| e.target.name == "sink").count(), 2);
        assert_depth_monotone(&result);
    }

    #[tokio::test]
    async fn respects_depth_bound() {
        let store = orders_chain();
        let seeds = seed(&store, "orders", "bronze").await;
        let result = traverse(&store, seeds, &opts(EdgeSource::Transformations, Direction::Downstream, 1))
            .await
            .unwrap();

        assert!(result.visits.iter().all(|visit| visit.depth <= 1));
        assert_eq!(result.visits.len(), 2);
        assert_eq!(result.edges.len(), 1);
    }

    #[tokio::test]
    async fn parallel_edges_deduplicate_by_kind() {
        let store = CatalogBuilder::new()
            .table(1, "a", "bronze")
            .table(2, "b", "silver")
            .relationship(1, 2, "lineage", 0.9)
            .relationship(1, 2, "lineage", 0.4)
            .relationship(1, 2, "enrichment", 0.6)
            .build();
        let seeds = seed(&store, "a", "bronze").await;
        let result = traverse(&store, seeds, &opts(EdgeSource::Relationships, Direction::Downstream, 2))
            .await
            .unwrap();

        let kinds: Vec<&str> = result.edges.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["lineage", "enrichment"]);
        assert_eq!(result.edges[0].confidence, 0.9);
    }

    #[tokio::test]
    async fn end_table_only_accepted_at_final_depth() {
        // a -> end directly, and a -> mid -> end.
        let store = CatalogBuilder::new()
            .table(1, "a", "bronze")
            .table(2, "mid", "silver")
            .table(3, "end", "gold")
            .relationship(1, 3, "lineage", 0.9)
            .relationship(1, 2, "lineage", 0.9)
            .relationship(2, 3, "lineage", 0.9)
            .build();
        let seeds = seed(&store, "a", "bronze").await;
        let mut options = opts(EdgeSource::Relationships, Direction::Downstream, 2);
        options.end_table = Some("end".to_string());
        let result = traverse(&store, seeds, &options).await.unwrap();

        assert_eq!(depths(&result)["end"], 2);
        assert!(result.edges.iter().all(|e| e.source.name != "a" || e.target.name != "end"));
    }

    #[tokio::test]
    async fn multiple_seeds_start_at_depth_zero() {
        let store = orders_chain();
        let mut seeds = seed(&store, "orders", "bronze").await;
        seeds.extend(seed(&store, "orders_clean", "silver").await);
        let result = traverse(&store, seeds, &opts(EdgeSource::Transformations, Direction::Downstream, 3))
            .await
            .unwrap();

        let depths = depths(&result);
        assert_eq!(depths["orders"], 0);
        assert_eq!(depths["orders_clean"], 0);
        assert_eq!(depths["orders_agg"], 1);
        assert_eq!(result.edges.len(), 1);
    }

    #[tokio::test]
    async fn empty_seed_list_yields_empty_traversal() {
        let store = orders_chain();
        let result = traverse(&store, Vec::new(), &opts(EdgeSource::Transformations, Direction::Both, 3))
            .await
            .unwrap();
        assert_eq!(result, Traversal::default());
    }

    #[tokio::test]
    async fn store_failure_aborts_walk() {
        let seeds = seed(&orders_chain(), "orders", "bronze").await;
        let result =
            traverse(&BrokenStore, seeds, &opts(EdgeSource::Relationships, Direction::Both, 3)).await;
        assert!(result.is_err());
    }
}
