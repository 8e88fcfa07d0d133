use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use tierlens_core::{
    ColumnMatch, Result, TableRecord, TransformationRecord, ValidationError, validate_query,
};
use tierlens_store::LineageStore;

const MAX_SUGGESTIONS: usize = 3;

/// Entity types a search runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Tables,
    Columns,
    Transformations,
    #[default]
    All,
}

impl SearchScope {
    fn tables(self) -> bool {
        matches!(self, SearchScope::Tables | SearchScope::All)
    }

    fn columns(self) -> bool {
        matches!(self, SearchScope::Columns | SearchScope::All)
    }

    fn transformations(self) -> bool {
        matches!(self, SearchScope::Transformations | SearchScope::All)
    }
}

impl FromStr for SearchScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tables" => Ok(SearchScope::Tables),
            "columns" => Ok(SearchScope::Columns),
            "transformations" => Ok(SearchScope::Transformations),
            "all" => Ok(SearchScope::All),
            _ => Err(ValidationError::UnknownSearchScope(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResults {
    pub tables: Vec<TableRecord>,
    pub columns: Vec<ColumnMatch>,
    pub transformations: Vec<TransformationRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchSuggestions {
    pub tables: Vec<String>,
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub results: SearchResults,
    pub suggestions: SearchSuggestions,
}

/// Case-insensitive substring search over the requested entity types.
///
/// Queries shorter than two characters (after trimming) are rejected before
/// the store is touched.
pub async fn search<S>(
    store: &S,
    raw_query: &str,
    scope: SearchScope,
    limit: usize,
) -> Result<SearchOutcome>
where
    S: LineageStore + ?Sized,
{
    let query = validate_query(raw_query)?;

    let mut results = SearchResults::default();
    if scope.tables() {
        results.tables = store.search_tables(&query, limit).await?;
    }
    if scope.columns() {
        results.columns = store.search_columns(&query, limit).await?;
    }
    if scope.transformations() {
        results.transformations = store.search_transformations(&query, limit).await?;
    }
    results.total = results.tables.len() + results.columns.len() + results.transformations.len();

    let suggestions = SearchSuggestions {
        tables: distinct(results.tables.iter().map(|table| table.name.as_str())),
        layers: distinct(results.tables.iter().map(|table| table.layer.as_str())),
    };

    Ok(SearchOutcome {
        query,
        results,
        suggestions,
    })
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
        if !out.iter().any(|existing| existing == value) {
            out.push(value.to_string());
        }
    }
    out
}
