//! Error types for the query engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

/// Every failure a caller of the query entry points can observe.
///
/// All of these are raised while the query is being read, before any row is
/// touched, so a failed command leaves the tables unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Unknown comparator: {0}")]
    UnknownComparator(String),

    #[error("Unresolved substitution: {0}")]
    UnresolvedSubstitution(String),

    #[error("{0} positional substitution value(s) left unused")]
    UnusedSubstitution(usize),

    #[error("Unknown datastore: {0}")]
    UnknownDatastore(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl QueryError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedQuery(msg.into())
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::InvalidConfig(err.to_string())
    }
}
