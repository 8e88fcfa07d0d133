use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::layer::Layer;

/// A layer row as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayerRecord {
    pub id: i64,
    pub name: String,
    pub rank: i32,
    pub description: Option<String>,
}

/// A warehouse table together with the layer it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub layer: String,
    pub layer_rank: i32,
}

impl TableRecord {
    /// Known layer of this table, if the stored name is one of bronze/silver/gold.
    pub fn known_layer(&self) -> Option<Layer> {
        Layer::from_name(&self.layer)
    }

    /// Ordering key used wherever tables are listed: layer rank, then name.
    pub fn sort_key(&self) -> (i32, &str, i64) {
        (self.layer_rank, self.name.as_str(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnRecord {
    pub id: i64,
    pub table_id: i64,
    pub name: String,
    pub data_type: String,
    pub is_key: bool,
    pub is_nullable: bool,
}

/// Typed, confidence-scored link between two tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipRecord {
    pub id: i64,
    pub kind: String,
    pub description: Option<String>,
    pub confidence: f64,
    pub source: TableRecord,
    pub target: TableRecord,
}

/// Declared or executed data transformation between two tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransformationRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub script: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub source: TableRecord,
    pub target: TableRecord,
}

/// Column match returned by free-text search, with its owning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnMatch {
    #[serde(flatten)]
    pub column: ColumnRecord,
    pub table_name: String,
    pub layer: String,
}

/// Which lineage direction(s) to follow relative to a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upstream,
    Downstream,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_upstream(self) -> bool {
        matches!(self, Direction::Upstream | Direction::Both)
    }

    pub fn includes_downstream(self) -> bool {
        matches!(self, Direction::Downstream | Direction::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
            Direction::Both => "both",
        }
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upstream" => Ok(Direction::Upstream),
            "downstream" => Ok(Direction::Downstream),
            "both" => Ok(Direction::Both),
            _ => Err(ValidationError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which endpoint of an edge the queried tables must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    /// Queried tables are the edge source (downstream edges).
    Outgoing,
    /// Queried tables are the edge target (upstream edges).
    Incoming,
}
