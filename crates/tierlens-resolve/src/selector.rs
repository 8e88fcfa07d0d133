use tierlens_core::{Layer, Result, TableRecord};
use tierlens_store::LineageStore;

/// How a caller identifies the table a lookup is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelector {
    Id(i64),
    /// A name, optionally pinned to a layer. Without a layer every table of
    /// that name is selected.
    Name { name: String, layer: Option<Layer> },
}

impl TableSelector {
    /// Tables matching the selector; empty when nothing matches.
    pub async fn resolve<S>(&self, store: &S) -> Result<Vec<TableRecord>>
    where
        S: LineageStore + ?Sized,
    {
        match self {
            TableSelector::Id(id) => Ok(store.table_by_id(*id).await?.into_iter().collect()),
            TableSelector::Name {
                name,
                layer: Some(layer),
            } => Ok(store
                .find_table(name, layer.as_str())
                .await?
                .into_iter()
                .collect()),
            TableSelector::Name { name, layer: None } => store.find_tables_named(name).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TableSelector::Id(id) => format!("#{id}"),
            TableSelector::Name {
                name,
                layer: Some(layer),
            } => format!("{layer}.{name}"),
            TableSelector::Name { name, layer: None } => name.clone(),
        }
    }
}
