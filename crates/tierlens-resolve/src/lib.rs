//! Lineage resolution for the tierlens warehouse catalog.
//!
//! Traversal walks relationship or transformation edges level by level,
//! assembly turns the walk into a sorted graph, and the query layer answers
//! relationship, transformation, search and catalog lookups. `service` wraps
//! all of it behind the request/response shapes the CLI serves.

pub mod assemble;
pub mod catalog;
pub mod lineage;
pub mod options;
pub mod relationships;
pub mod requests;
pub mod responses;
pub mod search;
pub mod selector;
pub mod service;
pub mod transformations;
pub mod traversal;

#[cfg(test)]
mod test_support;

pub use catalog::{LayerOverview, TableDetails, layer_overview, table_details};
pub use lineage::{ChainQuery, Flow, FlowQuery, LineageChain, resolve_flow, resolve_lineage_chain};
pub use options::ResolveOptions;
pub use relationships::{
    DirectedRelationship, RelationshipLookup, RelationshipSummary, RelativeDirection,
    lookup_relationships,
};
pub use requests::{
    FlowRequest, LineageChainRequest, RelationshipRequest, SearchRequest, TableDetailsRequest,
    TransformationRequest,
};
pub use responses::{
    FlowResponse, LayersResponse, LineageChainResponse, RelationshipResponse, SearchResponse,
    TableDetailsResponse, TransformationResponse,
};
pub use search::{SearchOutcome, SearchResults, SearchScope, SearchSuggestions, search};
pub use selector::TableSelector;
pub use service::{LineageService, ServiceResult};
pub use transformations::{
    DirectedTransformation, TransformationLookup, TransformationQuery, TransformationSummary,
    lookup_transformations,
};
pub use traversal::{EdgeSource, Traversal, TraversalOptions, TraversedEdge, Visit, traverse};
