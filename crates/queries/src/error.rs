//! Error types for the queries crate.

use thiserror::Error;

/// Errors returned by queries whose contract promises a result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The catalog (or the filtered subset the query ranks) is empty
    #[error("{query}: no movie qualifies")]
    NotFound { query: &'static str },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, QueryError>;
