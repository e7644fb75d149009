use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Submission not found: {0}")]
    NotFound(String),
}
