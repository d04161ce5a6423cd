use thiserror::Error;

/// Conditions that end a cycle early. None of them stop the polling loop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CycleError {
    /// Configuration selects no content type, so nothing can be queried.
    #[error("no queries configured")]
    NoQueries,

    #[error("fetch {query} failed: {reason}")]
    Fetch { query: String, reason: String },

    /// Every fetch succeeded but returned nothing.
    #[error("no assets in the responses")]
    EmptyResult,
}
