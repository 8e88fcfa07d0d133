//! Request handlers sitting between the UI/CLI layer and the resolver.
//!
//! Validation failures are returned as `Err` and never reach the store. Store
//! failures are logged with the operation and its parameters, then turned into
//! the operation's response shape with `error` set.

use tracing::{error, info};

use tierlens_core::{Error, ValidationError};
use tierlens_store::LineageStore;

use crate::catalog::{layer_overview, table_details};
use crate::lineage::{resolve_flow, resolve_lineage_chain};
use crate::options::ResolveOptions;
use crate::relationships::lookup_relationships;
use crate::requests::{
    FlowRequest, LineageChainRequest, RelationshipRequest, SearchRequest, TableDetailsRequest,
    TransformationRequest,
};
use crate::responses::{
    FlowResponse, LayersResponse, LineageChainResponse, RelationshipResponse, SearchResponse,
    TableDetailsResponse, TransformationResponse,
};
use crate::search::search;
use crate::transformations::{TransformationQuery, lookup_transformations};

pub type ServiceResult<T> = std::result::Result<T, ValidationError>;

pub struct LineageService<'a> {
    store: &'a dyn LineageStore,
    options: ResolveOptions,
}

impl<'a> LineageService<'a> {
    pub fn new(store: &'a dyn LineageStore, options: ResolveOptions) -> Self {
        Self { store, options }
    }

    pub async fn lineage_chain(
        &self,
        request: &LineageChainRequest,
    ) -> ServiceResult<LineageChainResponse> {
        let query = request.validate(&self.options)?;
        let params = format!(
            "table={} layer={} direction={} max_depth={}",
            query.table_name, query.layer, query.direction, query.max_depth
        );
        let table = query.table_name.as_str();
        let layer = query.layer.as_str();

        match resolve_lineage_chain(self.store, &query).await {
            Ok(chain) => {
                info!(
                    event = "lineage_chain_resolved",
                    params = %params,
                    nodes = chain.graph.nodes.len(),
                    edges = chain.graph.edges.len(),
                    found = chain.seed.is_some()
                );
                Ok(LineageChainResponse::from_chain(chain, table, layer))
            }
            Err(err) => degrade("lineage_chain", &params, err, |message| {
                LineageChainResponse::unavailable(table, layer, message)
            }),
        }
    }

    pub async fn flow(&self, request: &FlowRequest) -> ServiceResult<FlowResponse> {
        let query = request.validate(&self.options)?;
        let params = format!(
            "start={} end={} max_depth={}",
            query.start_table.as_deref().unwrap_or("*"),
            query.end_table.as_deref().unwrap_or("*"),
            query.max_depth
        );

        match resolve_flow(self.store, &query).await {
            Ok(flow) => {
                info!(
                    event = "flow_resolved",
                    params = %params,
                    nodes = flow.summary.total_nodes,
                    edges = flow.summary.total_edges
                );
                Ok(flow.into())
            }
            Err(err) => degrade("flow", &params, err, FlowResponse::unavailable),
        }
    }

    pub async fn relationships(
        &self,
        request: &RelationshipRequest,
    ) -> ServiceResult<RelationshipResponse> {
        let (selector, direction) = request.validate()?;
        let params = format!("table={} direction={direction}", selector.describe());

        match lookup_relationships(self.store, &selector, direction).await {
            Ok(lookup) => {
                info!(event = "relationships_listed", params = %params, total = lookup.summary.total);
                Ok(lookup.into())
            }
            Err(err) => degrade("relationships", &params, err, RelationshipResponse::unavailable),
        }
    }

    pub async fn transformations(
        &self,
        request: &TransformationRequest,
    ) -> ServiceResult<TransformationResponse> {
        let query = request.validate()?;
        let params = match &query {
            TransformationQuery::ForTable { table, direction } => {
                format!("table={} direction={direction}", table.describe())
            }
            TransformationQuery::BetweenLayers { source, target } => format!(
                "source_layer={} target_layer={}",
                source.map_or("*", |layer| layer.as_str()),
                target.map_or("*", |layer| layer.as_str())
            ),
        };

        match lookup_transformations(self.store, &query).await {
            Ok(lookup) => {
                info!(event = "transformations_listed", params = %params, total = lookup.summary.total);
                Ok(lookup.into())
            }
            Err(err) => degrade(
                "transformations",
                &params,
                err,
                TransformationResponse::unavailable,
            ),
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> ServiceResult<SearchResponse> {
        let (query, scope) = request.validate()?;
        let params = format!("q={query} type={scope:?}");

        match search(self.store, &query, scope, self.options.search_limit).await {
            Ok(outcome) => {
                info!(event = "search_finished", params = %params, total = outcome.results.total);
                Ok(outcome.into())
            }
            Err(err) => degrade("search", &params, err, |message| {
                SearchResponse::unavailable(&query, message)
            }),
        }
    }

    pub async fn layers(&self) -> LayersResponse {
        match layer_overview(self.store).await {
            Ok(layers) => LayersResponse {
                layers,
                error: None,
            },
            Err(err) => {
                log_failure("layers", "", &err);
                LayersResponse::unavailable(err.to_string())
            }
        }
    }

    pub async fn table_details(
        &self,
        request: &TableDetailsRequest,
    ) -> ServiceResult<TableDetailsResponse> {
        let (name, layer) = request.validate()?;
        let params = format!("table={name} layer={layer}");

        match table_details(self.store, &name, layer).await {
            Ok(table) => Ok(TableDetailsResponse { table, error: None }),
            Err(err) => degrade("table_details", &params, err, TableDetailsResponse::unavailable),
        }
    }
}

fn log_failure(operation: &'static str, params: &str, err: &Error) {
    error!(event = "lookup_failed", operation, params, error = %err);
}

/// Validation errors surface as-is; anything else becomes `fallback(message)`.
fn degrade<T>(
    operation: &'static str,
    params: &str,
    err: Error,
    fallback: impl FnOnce(String) -> T,
) -> ServiceResult<T> {
    match err {
        Error::Validation(err) => Err(err),
        err => {
            log_failure(operation, params, &err);
            Ok(fallback(err.to_string()))
        }
    }
}
