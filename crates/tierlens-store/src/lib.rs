//! Store adapters for the lineage catalog.

pub mod adapter;
pub mod memory;
pub mod postgres;

pub use adapter::LineageStore;
pub use memory::{
    MemoryStore, Snapshot, SnapshotRelationship, SnapshotTable, SnapshotTransformation,
};
pub use postgres::{PoolOptions, PostgresStore};
