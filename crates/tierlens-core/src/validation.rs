use crate::error::ValidationError;

/// Minimum number of characters accepted by free-text search.
pub const MIN_QUERY_LEN: usize = 2;

/// Trim a search query and reject it when shorter than [`MIN_QUERY_LEN`].
pub fn validate_query(raw: &str) -> Result<String, ValidationError> {
    let query = raw.trim();
    let actual = query.chars().count();
    if actual < MIN_QUERY_LEN {
        return Err(ValidationError::QueryTooShort {
            min: MIN_QUERY_LEN,
            actual,
        });
    }
    Ok(query.to_string())
}

/// Resolve an optional requested depth against a default and a hard limit.
pub fn validate_depth(
    requested: Option<u32>,
    default: u32,
    limit: u32,
) -> Result<u32, ValidationError> {
    let depth = requested.unwrap_or(default);
    if depth == 0 || depth > limit {
        return Err(ValidationError::DepthOutOfRange {
            limit,
            actual: depth,
        });
    }
    Ok(depth)
}

/// Reject missing or blank required string parameters.
pub fn require<'a>(
    value: Option<&'a str>,
    name: &'static str,
) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingParameter(name)),
    }
}
