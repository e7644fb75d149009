use thiserror::Error;

use crate::capability::CapabilityError;
use crate::score::ScoreError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
