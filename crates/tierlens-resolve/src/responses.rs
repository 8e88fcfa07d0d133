//! JSON response shapes handed back to the UI/CLI layer.
//!
//! Every response carries an optional `error`. When a store lookup fails the
//! service returns the shape with empty data and the message set, so callers
//! always get something they can render.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use tierlens_core::{GraphEdge, GraphNode, GraphSummary};

use crate::catalog::{LayerOverview, TableDetails};
use crate::lineage::{Flow, LineageChain};
use crate::relationships::{DirectedRelationship, RelationshipLookup, RelationshipSummary};
use crate::search::{SearchOutcome, SearchResults, SearchSuggestions};
use crate::transformations::{
    DirectedTransformation, TransformationLookup, TransformationSummary,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineageChainResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub mermaid_syntax: String,
    pub selected_table: String,
    pub selected_layer: String,
    pub total_depth: u32,
    pub layers_involved: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LineageChainResponse {
    pub fn from_chain(chain: LineageChain, table: &str, layer: &str) -> Self {
        Self {
            nodes: chain.graph.nodes,
            edges: chain.graph.edges,
            mermaid_syntax: chain.mermaid,
            selected_table: table.to_string(),
            selected_layer: layer.to_string(),
            total_depth: chain.total_depth,
            layers_involved: chain.layers_involved,
            error: None,
        }
    }

    pub fn unavailable(table: &str, layer: &str, error: String) -> Self {
        Self {
            selected_table: table.to_string(),
            selected_layer: layer.to_string(),
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub summary: GraphSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Flow> for FlowResponse {
    fn from(flow: Flow) -> Self {
        Self {
            nodes: flow.graph.nodes,
            edges: flow.graph.edges,
            summary: flow.summary,
            error: None,
        }
    }
}

impl FlowResponse {
    pub fn unavailable(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipResponse {
    pub relationships: Vec<DirectedRelationship>,
    pub summary: RelationshipSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RelationshipLookup> for RelationshipResponse {
    fn from(lookup: RelationshipLookup) -> Self {
        Self {
            relationships: lookup.relationships,
            summary: lookup.summary,
            error: None,
        }
    }
}

impl RelationshipResponse {
    pub fn unavailable(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransformationResponse {
    pub transformations: Vec<DirectedTransformation>,
    pub summary: TransformationSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<TransformationLookup> for TransformationResponse {
    fn from(lookup: TransformationLookup) -> Self {
        Self {
            transformations: lookup.transformations,
            summary: lookup.summary,
            error: None,
        }
    }
}

impl TransformationResponse {
    pub fn unavailable(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    pub query: String,
    pub results: SearchResults,
    pub suggestions: SearchSuggestions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            query: outcome.query,
            results: outcome.results,
            suggestions: outcome.suggestions,
            error: None,
        }
    }
}

impl SearchResponse {
    pub fn unavailable(query: &str, error: String) -> Self {
        Self {
            query: query.to_string(),
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayersResponse {
    pub layers: Vec<LayerOverview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayersResponse {
    pub fn unavailable(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// `table` is `None` when no table matches the requested name and layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableDetailsResponse {
    pub table: Option<TableDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableDetailsResponse {
    pub fn unavailable(error: String) -> Self {
        Self {
            table: None,
            error: Some(error),
        }
    }
}
