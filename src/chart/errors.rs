use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    /// A chart ID with no backing metadata is a data-integrity error and
    /// always propagates to the caller.
    #[error("Chart not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(String),
}
