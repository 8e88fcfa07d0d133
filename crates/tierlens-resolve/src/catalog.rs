use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use tierlens_core::{ColumnRecord, EdgeSide, Layer, Result, TableRecord};
use tierlens_store::LineageStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayerOverview {
    pub name: String,
    pub rank: i32,
    pub description: Option<String>,
    pub table_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableDetails {
    pub table: TableRecord,
    /// Key columns first, then by name.
    pub columns: Vec<ColumnRecord>,
    pub upstream: usize,
    pub downstream: usize,
}

/// Layers in rank order with the number of tables each holds.
pub async fn layer_overview<S>(store: &S) -> Result<Vec<LayerOverview>>
where
    S: LineageStore + ?Sized,
{
    let tables = store.list_tables(None).await?;
    Ok(store
        .list_layers()
        .await?
        .into_iter()
        .map(|layer| LayerOverview {
            table_count: tables
                .iter()
                .filter(|table| table.layer.eq_ignore_ascii_case(&layer.name))
                .count(),
            name: layer.name,
            rank: layer.rank,
            description: layer.description,
        })
        .collect())
}

/// Columns and relationship counts for one table, `None` if it does not exist.
pub async fn table_details<S>(store: &S, name: &str, layer: Layer) -> Result<Option<TableDetails>>
where
    S: LineageStore + ?Sized,
{
    let Some(table) = store.find_table(name, layer.as_str()).await? else {
        return Ok(None);
    };

    let mut columns = store.list_columns(table.id).await?;
    columns.sort_by(|left, right| {
        right
            .is_key
            .cmp(&left.is_key)
            .then_with(|| left.name.cmp(&right.name))
    });
    let upstream = store.relationships(&[table.id], EdgeSide::Incoming).await?.len();
    let downstream = store.relationships(&[table.id], EdgeSide::Outgoing).await?.len();

    Ok(Some(TableDetails {
        table,
        columns,
        upstream,
        downstream,
    }))
}
