//! Untyped request shapes as received from the UI/CLI layer, and their
//! validation into typed queries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use tierlens_core::{Direction, Layer, ValidationError, require, validate_depth, validate_query};

use crate::lineage::{ChainQuery, FlowQuery};
use crate::options::ResolveOptions;
use crate::search::SearchScope;
use crate::selector::TableSelector;
use crate::transformations::TransformationQuery;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_layer(value: &Option<String>) -> Result<Option<Layer>, ValidationError> {
    non_blank(value).map(str::parse::<Layer>).transpose()
}

fn parse_direction(value: &Option<String>) -> Result<Direction, ValidationError> {
    Ok(non_blank(value)
        .map(str::parse::<Direction>)
        .transpose()?
        .unwrap_or_default())
}

fn table_selector(
    table_id: Option<i64>,
    table_name: &Option<String>,
    layer: &Option<String>,
) -> Result<Option<TableSelector>, ValidationError> {
    if let Some(id) = table_id {
        return Ok(Some(TableSelector::Id(id)));
    }
    match non_blank(table_name) {
        Some(name) => Ok(Some(TableSelector::Name {
            name: name.to_string(),
            layer: parse_layer(layer)?,
        })),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LineageChainRequest {
    pub table_name: Option<String>,
    pub layer: Option<String>,
    pub direction: Option<String>,
    pub max_depth: Option<u32>,
}

impl LineageChainRequest {
    pub fn validate(&self, opts: &ResolveOptions) -> Result<ChainQuery, ValidationError> {
        let table_name = require(self.table_name.as_deref(), "table_name")?;
        let layer: Layer = require(self.layer.as_deref(), "layer")?.parse()?;
        Ok(ChainQuery {
            table_name: table_name.to_string(),
            layer,
            direction: parse_direction(&self.direction)?,
            max_depth: validate_depth(self.max_depth, opts.chain_max_depth, opts.depth_limit)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FlowRequest {
    pub start_table: Option<String>,
    pub end_table: Option<String>,
    pub max_depth: Option<u32>,
}

impl FlowRequest {
    pub fn validate(&self, opts: &ResolveOptions) -> Result<FlowQuery, ValidationError> {
        Ok(FlowQuery {
            start_table: non_blank(&self.start_table).map(str::to_string),
            end_table: non_blank(&self.end_table).map(str::to_string),
            max_depth: validate_depth(self.max_depth, opts.flow_max_depth, opts.depth_limit)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipRequest {
    pub table_id: Option<i64>,
    pub table_name: Option<String>,
    pub layer: Option<String>,
    pub direction: Option<String>,
}

impl RelationshipRequest {
    pub fn validate(&self) -> Result<(TableSelector, Direction), ValidationError> {
        let selector = table_selector(self.table_id, &self.table_name, &self.layer)?
            .ok_or(ValidationError::MissingParameter("table_id or table_name"))?;
        Ok((selector, parse_direction(&self.direction)?))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TransformationRequest {
    pub table_name: Option<String>,
    pub table_id: Option<i64>,
    pub layer: Option<String>,
    pub source_layer: Option<String>,
    pub target_layer: Option<String>,
    pub direction: Option<String>,
}

impl TransformationRequest {
    /// A table identity selects table mode; otherwise the layer pair is used,
    /// and an empty pair lists every transformation.
    pub fn validate(&self) -> Result<TransformationQuery, ValidationError> {
        if let Some(table) = table_selector(self.table_id, &self.table_name, &self.layer)? {
            return Ok(TransformationQuery::ForTable {
                table,
                direction: parse_direction(&self.direction)?,
            });
        }
        Ok(TransformationQuery::BetweenLayers {
            source: parse_layer(&self.source_layer)?,
            target: parse_layer(&self.target_layer)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub scope: Option<String>,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(String, SearchScope), ValidationError> {
        let query = validate_query(self.q.as_deref().ok_or(ValidationError::MissingParameter("q"))?)?;
        let scope = non_blank(&self.scope)
            .map(str::parse::<SearchScope>)
            .transpose()?
            .unwrap_or_default();
        Ok((query, scope))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TableDetailsRequest {
    pub table_name: Option<String>,
    pub layer: Option<String>,
}

impl TableDetailsRequest {
    pub fn validate(&self) -> Result<(String, Layer), ValidationError> {
        let table_name = require(self.table_name.as_deref(), "table_name")?;
        let layer: Layer = require(self.layer.as_deref(), "layer")?.parse()?;
        Ok((table_name.to_string(), layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_requires_table_and_layer() {
        let opts = ResolveOptions::default();
        let missing = LineageChainRequest {
            layer: Some("bronze".to_string()),
            ..Default::default()
        };
        assert_eq!(
            missing.validate(&opts),
            Err(ValidationError::MissingParameter("table_name"))
        );

        let bad_layer = LineageChainRequest {
            table_name: Some("orders".to_string()),
            layer: Some("platinum".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_layer.validate(&opts),
            Err(ValidationError::UnknownLayer(_))
        ));
    }

    #[test]
    fn chain_defaults_direction_and_depth() {
        let request = LineageChainRequest {
            table_name: Some("orders".to_string()),
            layer: Some("Bronze".to_string()),
            ..Default::default()
        };
        let query = request.validate(&ResolveOptions::default()).unwrap();
        assert_eq!(query.layer, Layer::Bronze);
        assert_eq!(query.direction, Direction::Both);
        assert_eq!(query.max_depth, 5);
    }

    #[test]
    fn flow_rejects_depth_over_limit() {
        let request = FlowRequest {
            max_depth: Some(50),
            ..Default::default()
        };
        assert!(matches!(
            request.validate(&ResolveOptions::default()),
            Err(ValidationError::DepthOutOfRange { .. })
        ));
    }

    #[test]
    fn relationship_prefers_table_id() {
        let request = RelationshipRequest {
            table_id: Some(7),
            table_name: Some("orders".to_string()),
            direction: Some("upstream".to_string()),
            ..Default::default()
        };
        assert_eq!(
            request.validate(),
            Ok((TableSelector::Id(7), Direction::Upstream))
        );
        assert!(RelationshipRequest::default().validate().is_err());
    }

    #[test]
    fn transformation_modes_are_tagged() {
        let by_table = TransformationRequest {
            table_name: Some("orders".to_string()),
            source_layer: Some("bronze".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            by_table.validate(),
            Ok(TransformationQuery::ForTable { .. })
        ));

        let by_layers = TransformationRequest {
            source_layer: Some("silver".to_string()),
            ..Default::default()
        };
        assert_eq!(
            by_layers.validate(),
            Ok(TransformationQuery::BetweenLayers {
                source: Some(Layer::Silver),
                target: None,
            })
        );
    }

    #[test]
    fn search_validates_query_and_type() {
        let short = SearchRequest {
            q: Some("c".to_string()),
            scope: None,
        };
        assert!(matches!(
            short.validate(),
            Err(ValidationError::QueryTooShort { .. })
        ));

        let typed: SearchRequest =
            serde_json::from_str(r#"{"q": "cust", "type": "tables"}"#).unwrap();
        assert_eq!(
            typed.validate(),
            Ok(("cust".to_string(), SearchScope::Tables))
        );
    }
}
