use thiserror::Error;

/// Core error type shared across tierlens crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or store adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// The request was rejected before reaching the store.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// A row returned by the store violates model invariants.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

impl Error {
    /// Returns true for failures caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Input problems that are rejected immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("unknown layer '{0}' (expected bronze, silver or gold)")]
    UnknownLayer(String),
    #[error("unknown direction '{0}' (expected upstream, downstream or both)")]
    UnknownDirection(String),
    #[error("unknown search type '{0}' (expected tables, columns, transformations or all)")]
    UnknownSearchScope(String),
    #[error("query must be at least {min} characters, got {actual}")]
    QueryTooShort { min: usize, actual: usize },
    #[error("max_depth must be between 1 and {limit}, got {actual}")]
    DepthOutOfRange { limit: u32, actual: u32 },
}

/// Convenience alias for results returned by tierlens crates.
pub type Result<T> = std::result::Result<T, Error>;
