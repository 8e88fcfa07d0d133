//! In-memory store backed by a catalog snapshot.
//!
//! Used for offline exploration (`--fixture`) and as the fake store in tests.
//! The store is immutable once built, so it can be shared across requests
//! without locking.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tierlens_core::{
    ColumnMatch, ColumnRecord, EdgeSide, Error, LayerRecord, RelationshipRecord, Result,
    TableRecord, TransformationRecord,
};

use crate::adapter::LineageStore;

/// Serializable catalog snapshot, the on-disk format for `--fixture` files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub layers: Vec<LayerRecord>,
    pub tables: Vec<SnapshotTable>,
    #[serde(default)]
    pub columns: Vec<ColumnRecord>,
    #[serde(default)]
    pub relationships: Vec<SnapshotRelationship>,
    #[serde(default)]
    pub transformations: Vec<SnapshotTransformation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotTable {
    pub id: i64,
    pub name: String,
    pub layer: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRelationship {
    pub id: i64,
    pub source_table_id: i64,
    pub target_table_id: i64,
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotTransformation {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub script: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub source_table_id: i64,
    pub target_table_id: i64,
}

impl Snapshot {
    /// Read a JSON snapshot from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| Error::Other(format!("reading {}: {err}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|err| Error::InvalidData(format!("parsing {}: {err}", path.display())))
    }

    /// Copy the full catalog out of any store.
    pub async fn capture(store: &dyn LineageStore) -> Result<Self> {
        let layers = store.list_layers().await?;
        let tables = store.list_tables(None).await?;
        let table_ids: Vec<i64> = tables.iter().map(|table| table.id).collect();

        let mut columns = Vec::new();
        for table in &tables {
            columns.extend(store.list_columns(table.id).await?);
        }

        let relationships = store
            .relationships(&table_ids, EdgeSide::Outgoing)
            .await?
            .into_iter()
            .map(|rel| SnapshotRelationship {
                id: rel.id,
                source_table_id: rel.source.id,
                target_table_id: rel.target.id,
                kind: rel.kind,
                description: rel.description,
                confidence: rel.confidence,
            })
            .collect();

        let transformations = store
            .transformations(&table_ids, EdgeSide::Outgoing)
            .await?
            .into_iter()
            .map(|tr| SnapshotTransformation {
                id: tr.id,
                name: tr.name,
                description: tr.description,
                kind: tr.kind,
                script: tr.script,
                status: tr.status,
                created_at: tr.created_at,
                source_table_id: tr.source.id,
                target_table_id: tr.target.id,
            })
            .collect();

        Ok(Snapshot {
            layers,
            tables: tables
                .into_iter()
                .map(|table| SnapshotTable {
                    id: table.id,
                    name: table.name,
                    layer: table.layer,
                    description: table.description,
                })
                .collect(),
            columns,
            relationships,
            transformations,
        })
    }
}

/// [`LineageStore`] over fully loaded catalog rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    layers: Vec<LayerRecord>,
    tables: BTreeMap<i64, TableRecord>,
    columns: Vec<ColumnRecord>,
    relationships: Vec<RelationshipRecord>,
    transformations: Vec<TransformationRecord>,
}

impl MemoryStore {
    /// Build a store, resolving table references and checking integrity.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut layers = snapshot.layers;
        layers.sort_by(|left, right| (left.rank, &left.name).cmp(&(right.rank, &right.name)));

        let mut tables = BTreeMap::new();
        for table in snapshot.tables {
            let layer = layers
                .iter()
                .find(|layer| layer.name.eq_ignore_ascii_case(&table.layer))
                .ok_or_else(|| {
                    Error::InvalidData(format!(
                        "table {} references unknown layer {}",
                        table.name, table.layer
                    ))
                })?;
            let record = TableRecord {
                id: table.id,
                name: table.name,
                description: table.description,
                layer: layer.name.clone(),
                layer_rank: layer.rank,
            };
            if tables.insert(record.id, record).is_some() {
                return Err(Error::InvalidData(format!("duplicate table id {}", table.id)));
            }
        }

        let lookup = |id: i64, what: &str| {
            tables
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::InvalidData(format!("{what} references unknown table {id}")))
        };

        for column in &snapshot.columns {
            lookup(column.table_id, "column")?;
        }

        let relationships = snapshot
            .relationships
            .into_iter()
            .map(|rel| {
                Ok(RelationshipRecord {
                    id: rel.id,
                    kind: rel.kind,
                    description: rel.description,
                    confidence: rel.confidence,
                    source: lookup(rel.source_table_id, "relationship")?,
                    target: lookup(rel.target_table_id, "relationship")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let transformations = snapshot
            .transformations
            .into_iter()
            .map(|tr| {
                Ok(TransformationRecord {
                    id: tr.id,
                    name: tr.name,
                    description: tr.description,
                    kind: tr.kind,
                    script: tr.script,
                    status: tr.status,
                    created_at: tr.created_at,
                    source: lookup(tr.source_table_id, "transformation")?,
                    target: lookup(tr.target_table_id, "transformation")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns = snapshot.columns;
        columns.sort_by_key(|column| column.id);

        Ok(Self {
            layers,
            tables,
            columns,
            relationships,
            transformations,
        })
    }

    /// Load a JSON snapshot file into a store.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_snapshot(Snapshot::load(path)?)
    }

    fn sorted_tables<'a>(&self, tables: impl Iterator<Item = &'a TableRecord>) -> Vec<TableRecord> {
        let mut tables: Vec<TableRecord> = tables.cloned().collect();
        tables.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
        tables
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn matches_side(source: i64, target: i64, table_ids: &[i64], side: EdgeSide) -> bool {
    match side {
        EdgeSide::Outgoing => table_ids.contains(&source),
        EdgeSide::Incoming => table_ids.contains(&target),
    }
}

#[async_trait]
impl LineageStore for MemoryStore {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn list_layers(&self) -> Result<Vec<LayerRecord>> {
        Ok(self.layers.clone())
    }

    async fn list_tables(&self, layer: Option<&str>) -> Result<Vec<TableRecord>> {
        Ok(self.sorted_tables(self.tables.values().filter(|table| {
            layer.is_none_or(|layer| table.layer.eq_ignore_ascii_case(layer))
        })))
    }

    async fn find_table(&self, name: &str, layer: &str) -> Result<Option<TableRecord>> {
        Ok(self
            .tables
            .values()
            .find(|table| table.name == name && table.layer.eq_ignore_ascii_case(layer))
            .cloned())
    }

    async fn find_tables_named(&self, name: &str) -> Result<Vec<TableRecord>> {
        Ok(self.sorted_tables(self.tables.values().filter(|table| table.name == name)))
    }

    async fn table_by_id(&self, id: i64) -> Result<Option<TableRecord>> {
        Ok(self.tables.get(&id).cloned())
    }

    async fn list_columns(&self, table_id: i64) -> Result<Vec<ColumnRecord>> {
        Ok(self
            .columns
            .iter()
            .filter(|column| column.table_id == table_id)
            .cloned()
            .collect())
    }

    async fn count_columns(&self, table_id: i64) -> Result<i64> {
        let count = self
            .columns
            .iter()
            .filter(|column| column.table_id == table_id)
            .count();
        Ok(count as i64)
    }

    async fn relationships(
        &self,
        table_ids: &[i64],
        side: EdgeSide,
    ) -> Result<Vec<RelationshipRecord>> {
        Ok(self
            .relationships
            .iter()
            .filter(|rel| matches_side(rel.source.id, rel.target.id, table_ids, side))
            .cloned()
            .collect())
    }

    async fn transformations(
        &self,
        table_ids: &[i64],
        side: EdgeSide,
    ) -> Result<Vec<TransformationRecord>> {
        Ok(self
            .transformations
            .iter()
            .filter(|tr| matches_side(tr.source.id, tr.target.id, table_ids, side))
            .cloned()
            .collect())
    }

    async fn transformations_between(
        &self,
        source_layer: Option<&str>,
        target_layer: Option<&str>,
    ) -> Result<Vec<TransformationRecord>> {
        Ok(self
            .transformations
            .iter()
            .filter(|tr| {
                source_layer.is_none_or(|layer| tr.source.layer.eq_ignore_ascii_case(layer))
                    && target_layer.is_none_or(|layer| tr.target.layer.eq_ignore_ascii_case(layer))
            })
            .cloned()
            .collect())
    }

    async fn search_tables(&self, pattern: &str, limit: usize) -> Result<Vec<TableRecord>> {
        let needle = pattern.to_lowercase();
        let mut found = self.sorted_tables(self.tables.values().filter(|table| {
            contains_ignore_case(&table.name, &needle)
                || table
                    .description
                    .as_deref()
                    .is_some_and(|text| contains_ignore_case(text, &needle))
        }));
        found.truncate(limit);
        Ok(found)
    }

    async fn search_columns(&self, pattern: &str, limit: usize) -> Result<Vec<ColumnMatch>> {
        let needle = pattern.to_lowercase();
        Ok(self
            .columns
            .iter()
            .filter(|column| {
                contains_ignore_case(&column.name, &needle)
                    || contains_ignore_case(&column.data_type, &needle)
            })
            .filter_map(|column| {
                self.tables.get(&column.table_id).map(|table| ColumnMatch {
                    column: column.clone(),
                    table_name: table.name.clone(),
                    layer: table.layer.clone(),
                })
            })
            .take(limit)
            .collect())
    }

    async fn search_transformations(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<TransformationRecord>> {
        let needle = pattern.to_lowercase();
        let mut found: Vec<TransformationRecord> = self
            .transformations
            .iter()
            .filter(|tr| {
                contains_ignore_case(&tr.name, &needle)
                    || contains_ignore_case(&tr.kind, &needle)
                    || tr
                        .description
                        .as_deref()
                        .is_some_and(|text| contains_ignore_case(text, &needle))
            })
            .cloned()
            .collect();
        found.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        found.truncate(limit);
        Ok(found)
    }
}
