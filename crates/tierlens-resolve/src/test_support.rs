use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use tierlens_core::{
    ColumnMatch, ColumnRecord, EdgeSide, Error, LayerRecord, RelationshipRecord, Result,
    TableRecord, TransformationRecord,
};
use tierlens_store::{
    LineageStore, MemoryStore, Snapshot, SnapshotRelationship, SnapshotTable,
    SnapshotTransformation,
};

/// Small builder for in-memory catalogs used across unit tests.
pub struct CatalogBuilder {
    snapshot: Snapshot,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        let layers = [("bronze", 1), ("silver", 2), ("gold", 3)]
            .into_iter()
            .map(|(name, rank)| LayerRecord {
                id: rank as i64,
                name: name.to_string(),
                rank,
                description: None,
            })
            .collect();
        Self {
            snapshot: Snapshot {
                layers,
                ..Snapshot::default()
            },
        }
    }

    pub fn table(mut self, id: i64, name: &str, layer: &str) -> Self {
        self.snapshot.tables.push(SnapshotTable {
            id,
            name: name.to_string(),
            layer: layer.to_string(),
            description: None,
        });
        self
    }

    pub fn described(mut self, id: i64, name: &str, layer: &str, description: &str) -> Self {
        self.snapshot.tables.push(SnapshotTable {
            id,
            name: name.to_string(),
            layer: layer.to_string(),
            description: Some(description.to_string()),
        });
        self
    }

    pub fn columns(mut self, table_id: i64, names: &[&str]) -> Self {
        for name in names {
            let id = self.snapshot.columns.len() as i64 + 1;
            self.snapshot.columns.push(ColumnRecord {
                id,
                table_id,
                name: name.to_string(),
                data_type: "text".to_string(),
                is_key: name.ends_with("_id"),
                is_nullable: !name.ends_with("_id"),
            });
        }
        self
    }

    pub fn relationship(mut self, source: i64, target: i64, kind: &str, confidence: f64) -> Self {
        let id = self.snapshot.relationships.len() as i64 + 1;
        self.snapshot.relationships.push(SnapshotRelationship {
            id,
            source_table_id: source,
            target_table_id: target,
            kind: kind.to_string(),
            description: None,
            confidence,
        });
        self
    }

    /// Add a transformation created on day `day` of March 2024.
    pub fn transformation(mut self, source: i64, target: i64, kind: &str, day: u32) -> Self {
        let id = self.snapshot.transformations.len() as i64 + 1;
        self.snapshot.transformations.push(SnapshotTransformation {
            id,
            name: format!("{kind}_{source}_{target}"),
            description: None,
            kind: kind.to_string(),
            script: None,
            status: "active".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap(),
            source_table_id: source,
            target_table_id: target,
        });
        self
    }

    pub fn build(self) -> MemoryStore {
        MemoryStore::from_snapshot(self.snapshot).unwrap()
    }
}

/// `orders` (bronze) -> `orders_clean` (silver) -> `orders_agg` (gold).
pub fn orders_chain() -> MemoryStore {
    CatalogBuilder::new()
        .described(1, "orders", "bronze", "Raw order events")
        .table(2, "orders_clean", "silver")
        .table(3, "orders_agg", "gold")
        .columns(1, &["order_id", "customer_id", "amount"])
        .columns(2, &["order_id", "amount"])
        .columns(3, &["order_day"])
        .transformation(1, 2, "cleansing", 1)
        .transformation(2, 3, "aggregation", 2)
        .build()
}

/// Store whose every query fails, for boundary error handling tests.
pub struct BrokenStore;

fn broken<T>() -> Result<T> {
    Err(Error::Db("connection refused".to_string()))
}

#[async_trait]
impl LineageStore for BrokenStore {
    fn engine(&self) -> &'static str {
        "broken"
    }

    async fn list_layers(&self) -> Result<Vec<LayerRecord>> {
        broken()
    }

    async fn list_tables(&self, _layer: Option<&str>) -> Result<Vec<TableRecord>> {
        broken()
    }

    async fn find_table(&self, _name: &str, _layer: &str) -> Result<Option<TableRecord>> {
        broken()
    }

    async fn find_tables_named(&self, _name: &str) -> Result<Vec<TableRecord>> {
        broken()
    }

    async fn table_by_id(&self, _id: i64) -> Result<Option<TableRecord>> {
        broken()
    }

    async fn list_columns(&self, _table_id: i64) -> Result<Vec<ColumnRecord>> {
        broken()
    }

    async fn count_columns(&self, _table_id: i64) -> Result<i64> {
        broken()
    }

    async fn relationships(
        &self,
        _table_ids: &[i64],
        _side: EdgeSide,
    ) -> Result<Vec<RelationshipRecord>> {
        broken()
    }

    async fn transformations(
        &self,
        _table_ids: &[i64],
        _side: EdgeSide,
    ) -> Result<Vec<TransformationRecord>> {
        broken()
    }

    async fn transformations_between(
        &self,
        _source_layer: Option<&str>,
        _target_layer: Option<&str>,
    ) -> Result<Vec<TransformationRecord>> {
        broken()
    }

    async fn search_tables(&self, _pattern: &str, _limit: usize) -> Result<Vec<TableRecord>> {
        broken()
    }

    async fn search_columns(&self, _pattern: &str, _limit: usize) -> Result<Vec<ColumnMatch>> {
        broken()
    }

    async fn search_transformations(
        &self,
        _pattern: &str,
        _limit: usize,
    ) -> Result<Vec<TransformationRecord>> {
        broken()
    }
}
