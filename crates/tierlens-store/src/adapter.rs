use async_trait::async_trait;

use tierlens_core::{
    ColumnMatch, ColumnRecord, EdgeSide, LayerRecord, RelationshipRecord, Result, TableRecord,
    TransformationRecord,
};

/// Read-only query contract over the lineage catalog.
///
/// Implementations own uniqueness and referential integrity of the rows they
/// return; callers trust them. Every method is a single round trip so that
/// dropping the caller's future abandons the query.
#[async_trait]
pub trait LineageStore: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// All layers ordered by rank.
    async fn list_layers(&self) -> Result<Vec<LayerRecord>>;

    /// Tables ordered by (layer rank, name), optionally restricted to one layer.
    async fn list_tables(&self, layer: Option<&str>) -> Result<Vec<TableRecord>>;

    /// Look up a table by name within a layer (case-insensitive layer match).
    async fn find_table(&self, name: &str, layer: &str) -> Result<Option<TableRecord>>;

    /// Every table carrying `name`, across layers, ordered by layer rank.
    async fn find_tables_named(&self, name: &str) -> Result<Vec<TableRecord>>;

    async fn table_by_id(&self, id: i64) -> Result<Option<TableRecord>>;

    /// Columns of a table ordered by id.
    async fn list_columns(&self, table_id: i64) -> Result<Vec<ColumnRecord>>;

    async fn count_columns(&self, table_id: i64) -> Result<i64>;

    /// Relationship edges whose source (`Outgoing`) or target (`Incoming`) is
    /// one of `table_ids`.
    async fn relationships(
        &self,
        table_ids: &[i64],
        side: EdgeSide,
    ) -> Result<Vec<RelationshipRecord>>;

    /// Transformation edges whose source (`Outgoing`) or target (`Incoming`)
    /// is one of `table_ids`.
    async fn transformations(
        &self,
        table_ids: &[i64],
        side: EdgeSide,
    ) -> Result<Vec<TransformationRecord>>;

    /// Transformations filtered by source and/or target layer name.
    async fn transformations_between(
        &self,
        source_layer: Option<&str>,
        target_layer: Option<&str>,
    ) -> Result<Vec<TransformationRecord>>;

    /// Tables whose name or description contains `pattern`, ignoring case.
    async fn search_tables(&self, pattern: &str, limit: usize) -> Result<Vec<TableRecord>>;

    /// Columns whose name or data type contains `pattern`, ignoring case.
    async fn search_columns(&self, pattern: &str, limit: usize) -> Result<Vec<ColumnMatch>>;

    /// Transformations whose name, description or kind contains `pattern`,
    /// ignoring case.
    async fn search_transformations(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<TransformationRecord>>;
}
