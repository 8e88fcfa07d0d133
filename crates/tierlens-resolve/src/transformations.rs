use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use tierlens_core::{Direction, EdgeSide, Layer, Result, TransformationRecord};
use tierlens_store::LineageStore;

use crate::relationships::RelativeDirection;
use crate::selector::TableSelector;

/// The two transformation lookup modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformationQuery {
    /// Transformations touching a table, in the requested direction(s).
    ForTable {
        table: TableSelector,
        direction: Direction,
    },
    /// Transformations between layers; a missing side matches any layer.
    BetweenLayers {
        source: Option<Layer>,
        target: Option<Layer>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DirectedTransformation {
    #[serde(flatten)]
    pub transformation: TransformationRecord,
    /// Set for table-scoped lookups only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<RelativeDirection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransformationSummary {
    pub total: usize,
    pub upstream: usize,
    pub downstream: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

impl TransformationSummary {
    pub fn from_transformations(items: &[DirectedTransformation]) -> Self {
        let mut summary = TransformationSummary {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            match item.direction {
                Some(RelativeDirection::Upstream) => summary.upstream += 1,
                Some(RelativeDirection::Downstream) => summary.downstream += 1,
                None => {}
            }
            *summary
                .by_kind
                .entry(item.transformation.kind.clone())
                .or_default() += 1;
            *summary
                .by_status
                .entry(item.transformation.status.clone())
                .or_default() += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformationLookup {
    pub transformations: Vec<DirectedTransformation>,
    pub summary: TransformationSummary,
}

pub async fn lookup_transformations<S>(
    store: &S,
    query: &TransformationQuery,
) -> Result<TransformationLookup>
where
    S: LineageStore + ?Sized,
{
    let transformations = match query {
        TransformationQuery::ForTable { table, direction } => {
            for_table(store, table, *direction).await?
        }
        TransformationQuery::BetweenLayers { source, target } => {
            between_layers(store, *source, *target).await?
        }
    };

    Ok(TransformationLookup {
        summary: TransformationSummary::from_transformations(&transformations),
        transformations,
    })
}

/// Sorted by (source layer rank, target layer rank, newest first).
async fn for_table<S>(
    store: &S,
    selector: &TableSelector,
    direction: Direction,
) -> Result<Vec<DirectedTransformation>>
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
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let passes = [
        (direction.includes_upstream(), EdgeSide::Incoming, RelativeDirection::Upstream),
        (direction.includes_downstream(), EdgeSide::Outgoing, RelativeDirection::Downstream),
    ];
    for (enabled, side, label) in passes {
        if !enabled {
            continue;
        }
        for transformation in store.transformations(&ids, side).await? {
            if seen.insert(transformation.id) {
                found.push(DirectedTransformation {
                    transformation,
                    direction: Some(label),
                });
            }
        }
    }

    found.sort_by(|left, right| {
        let (l, r) = (&left.transformation, &right.transformation);
        (l.source.layer_rank, l.target.layer_rank)
            .cmp(&(r.source.layer_rank, r.target.layer_rank))
            .then_with(|| r.created_at.cmp(&l.created_at))
            .then_with(|| l.id.cmp(&r.id))
    });
    Ok(found)
}

/// Sorted newest first.
async fn between_layers<S>(
    store: &S,
    source: Option<Layer>,
    target: Option<Layer>,
) -> Result<Vec<DirectedTransformation>>
where
    S: LineageStore + ?Sized,
{
    let mut found: Vec<DirectedTransformation> = store
        .transformations_between(source.map(Layer::as_str), target.map(Layer::as_str))
        .await?
        .into_iter()
        .map(|transformation| DirectedTransformation {
            transformation,
            direction: None,
        })
        .collect();

    found.sort_by(|left, right| {
        right
            .transformation
            .created_at
            .cmp(&left.transformation.created_at)
            .then_with(|| left.transformation.id.cmp(&right.transformation.id))
    });
    Ok(found)
}
