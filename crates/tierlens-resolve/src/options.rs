/// Limits applied by the resolver when a request leaves them unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Default depth bound for single-table lineage chains.
    pub chain_max_depth: u32,
    /// Default depth bound for full-flow traversals.
    pub flow_max_depth: u32,
    /// Largest depth a request may ask for.
    pub depth_limit: u32,
    /// Results returned per entity type by free-text search.
    pub search_limit: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            chain_max_depth: 5,
            flow_max_depth: 3,
            depth_limit: 10,
            search_limit: 10,
        }
    }
}
