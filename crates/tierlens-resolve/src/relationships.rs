use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use tierlens_core::{Direction, EdgeSide, RelationshipRecord, Result};
use tierlens_store::LineageStore;

use crate::selector::TableSelector;

/// Position of an edge relative to the queried table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelativeDirection {
    /// The queried table is the edge target.
    Upstream,
    /// The queried table is the edge source.
    Downstream,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DirectedRelationship {
    #[serde(flatten)]
    pub relationship: RelationshipRecord,
    pub direction: RelativeDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipSummary {
    pub total: usize,
    pub upstream: usize,
    pub downstream: usize,
    pub avg_confidence: f64,
}

impl RelationshipSummary {
    pub fn from_relationships(relationships: &[DirectedRelationship]) -> Self {
        let total = relationships.len();
        let upstream = relationships
            .iter()
            .filter(|rel| rel.direction == RelativeDirection::Upstream)
            .count();
        let avg_confidence = if total == 0 {
            0.0
        } else {
            relationships
                .iter()
                .map(|rel| rel.relationship.confidence)
                .sum::<f64>()
                / total as f64
        };
        Self {
            total,
            upstream,
            downstream: total - upstream,
            avg_confidence,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipLookup {
    pub relationships: Vec<DirectedRelationship>,
    pub summary: RelationshipSummary,
}

/// Relationship edges touching the selected table(s), strongest first.
///
/// Upstream edges are collected before downstream ones, so an edge between
/// two selected tables is reported once, as upstream.
pub async fn lookup_relationships<S>(
    store: &S,
    selector: &TableSelector,
    direction: Direction,
) -> Result<RelationshipLookup>
where
    S: LineageStore + ?Sized,
{
    let ids: Vec<i64> = selector
        .resolve(store)
        .await?
        .into_iter()
        .map(|table| table.id)
        .collect();
    if ids.is_empty() {
        return Ok(RelationshipLookup::default());
    }

    let mut seen = HashSet::new();
    let mut relationships = Vec::new();

    let passes = [
        (direction.includes_upstream(), EdgeSide::Incoming, RelativeDirection::Upstream),
        (direction.includes_downstream(), EdgeSide::Outgoing, RelativeDirection::Downstream),
    ];
    for (enabled, side, label) in passes {
        if !enabled {
            continue;
        }
        for relationship in store.relationships(&ids, side).await? {
            if seen.insert(relationship.id) {
                relationships.push(DirectedRelationship {
                    relationship,
                    direction: label,
                });
            }
        }
    }

    relationships.sort_by(|left, right| {
        right
            .relationship
            .confidence
            .total_cmp(&left.relationship.confidence)
            .then_with(|| left.relationship.id.cmp(&right.relationship.id))
    });

    Ok(RelationshipLookup {
        summary: RelationshipSummary::from_relationships(&relationships),
        relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CatalogBuilder;
    use tierlens_core::Layer;
    use tierlens_store::MemoryStore;

    fn store() -> MemoryStore {
        CatalogBuilder::new()
            .table(1, "orders", "bronze")
            .table(2, "orders_clean", "silver")
            .table(3, "customer", "silver")
            .table(4, "orders_agg", "gold")
            .relationship(1, 2, "lineage", 0.9)
            .relationship(3, 2, "enrichment", 0.6)
            .relationship(2, 4, "aggregation", 0.75)
            .build()
    }

    fn clean() -> TableSelector {
        TableSelector::Name {
            name: "orders_clean".to_string(),
            layer: Some(Layer::Silver),
        }
    }

    #[tokio::test]
    async fn upstream_returns_only_incoming_edges() {
        let lookup = lookup_relationships(&store(), &clean(), Direction::Upstream)
            .await
            .unwrap();

        assert_eq!(lookup.relationships.len(), 2);
        for rel in &lookup.relationships {
            assert_eq!(rel.relationship.target.name, "orders_clean");
            assert_eq!(rel.direction, RelativeDirection::Upstream);
        }
        assert_eq!(lookup.summary.downstream, 0);
    }

    #[tokio::test]
    async fn downstream_returns_only_outgoing_edges() {
        let lookup = lookup_relationships(&store(), &TableSelector::Id(2), Direction::Downstream)
            .await
            .unwrap();

        assert_eq!(lookup.relationships.len(), 1);
        assert_eq!(lookup.relationships[0].relationship.source.name, "orders_clean");
        assert_eq!(lookup.relationships[0].direction, RelativeDirection::Downstream);
    }

    #[tokio::test]
    async fn both_sorts_by_confidence_and_summarizes() {
        let lookup = lookup_relationships(&store(), &clean(), Direction::Both)
            .await
            .unwrap();

        let confidences: Vec<f64> = lookup
            .relationships
            .iter()
            .map(|rel| rel.relationship.confidence)
            .collect();
        assert_eq!(confidences, vec![0.9, 0.75, 0.6]);
        assert_eq!(lookup.summary.total, 3);
        assert_eq!(lookup.summary.upstream, 2);
        assert_eq!(lookup.summary.downstream, 1);
        assert!((lookup.summary.avg_confidence - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unknown_table_is_empty_not_error() {
        let lookup = lookup_relationships(&store(), &TableSelector::Id(99), Direction::Both)
            .await
            .unwrap();
        assert!(lookup.relationships.is_empty());
        assert_eq!(lookup.summary.avg_confidence, 0.0);
    }
}
