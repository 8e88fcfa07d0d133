use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use tierlens_core::{
    ColumnMatch, ColumnRecord, EdgeSide, Error, LayerRecord, RelationshipRecord, Result,
    TableRecord, TransformationRecord,
};

use crate::adapter::LineageStore;

mod mapper;
mod queries;

/// Pool settings for [`PostgresStore::connect`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Store adapter for the PostgreSQL lineage catalog.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a fresh pool to `url`.
    pub async fn connect(url: &str, opts: &PoolOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(opts.max_connections)
            .acquire_timeout(opts.acquire_timeout)
            .connect(url)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(Self::new(pool))
    }
}

fn clamp_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait::async_trait]
impl LineageStore for PostgresStore {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn list_layers(&self) -> Result<Vec<LayerRecord>> {
        Ok(mapper::map_layers(queries::list_layers(&self.pool).await?))
    }

    async fn list_tables(&self, layer: Option<&str>) -> Result<Vec<TableRecord>> {
        Ok(mapper::map_tables(queries::list_tables(&self.pool, layer).await?))
    }

    async fn find_table(&self, name: &str, layer: &str) -> Result<Option<TableRecord>> {
        Ok(queries::find_table(&self.pool, name, layer)
            .await?
            .map(mapper::map_table))
    }

    async fn find_tables_named(&self, name: &str) -> Result<Vec<TableRecord>> {
        Ok(mapper::map_tables(queries::find_tables_named(&self.pool, name).await?))
    }

    async fn table_by_id(&self, id: i64) -> Result<Option<TableRecord>> {
        Ok(queries::table_by_id(&self.pool, id)
            .await?
            .map(mapper::map_table))
    }

    async fn list_columns(&self, table_id: i64) -> Result<Vec<ColumnRecord>> {
        Ok(mapper::map_columns(queries::list_columns(&self.pool, table_id).await?))
    }

    async fn count_columns(&self, table_id: i64) -> Result<i64> {
        queries::count_columns(&self.pool, table_id).await
    }

    async fn relationships(
        &self,
        table_ids: &[i64],
        side: EdgeSide,
    ) -> Result<Vec<RelationshipRecord>> {
        if table_ids.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(event = "store_query", query = "relationships", tables = table_ids.len(), side = ?side);
        let raw = queries::relationships(&self.pool, table_ids, side == EdgeSide::Outgoing).await?;
        Ok(mapper::map_relationships(raw))
    }

    async fn transformations(
        &self,
        table_ids: &[i64],
        side: EdgeSide,
    ) -> Result<Vec<TransformationRecord>> {
        if table_ids.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(event = "store_query", query = "transformations", tables = table_ids.len(), side = ?side);
        let raw =
            queries::transformations(&self.pool, table_ids, side == EdgeSide::Outgoing).await?;
        Ok(mapper::map_transformations(raw))
    }

    async fn transformations_between(
        &self,
        source_layer: Option<&str>,
        target_layer: Option<&str>,
    ) -> Result<Vec<TransformationRecord>> {
        let raw = queries::transformations_between(&self.pool, source_layer, target_layer).await?;
        Ok(mapper::map_transformations(raw))
    }

    async fn search_tables(&self, pattern: &str, limit: usize) -> Result<Vec<TableRecord>> {
        let raw = queries::search_tables(&self.pool, pattern, clamp_limit(limit)).await?;
        Ok(mapper::map_tables(raw))
    }

    async fn search_columns(&self, pattern: &str, limit: usize) -> Result<Vec<ColumnMatch>> {
        let raw = queries::search_columns(&self.pool, pattern, clamp_limit(limit)).await?;
        Ok(mapper::map_column_matches(raw))
    }

    async fn search_transformations(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<TransformationRecord>> {
        let raw = queries::search_transformations(&self.pool, pattern, clamp_limit(limit)).await?;
        Ok(mapper::map_transformations(raw))
    }
}
