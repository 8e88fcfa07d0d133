//! Core contracts and helpers for tierlens.
//!
//! This crate defines the warehouse catalog records, the lineage graph model,
//! request validation, and the Mermaid diagram renderer shared by the store
//! adapters, the resolver and the CLI.

pub mod error;
pub mod graph;
pub mod layer;
pub mod mermaid;
pub mod model;
pub mod redaction;
pub mod validation;

pub use error::{Error, Result, ValidationError};
pub use graph::{GraphEdge, GraphNode, GraphSummary, LineageGraph};
pub use layer::Layer;
pub use model::{
    ColumnMatch, ColumnRecord, Direction, EdgeSide, LayerRecord, RelationshipRecord, TableRecord,
    TransformationRecord,
};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use validation::{MIN_QUERY_LEN, require, validate_depth, validate_query};
