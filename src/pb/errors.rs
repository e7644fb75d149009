use thiserror::Error;

use crate::capability::CapabilityError;
use crate::chart::ChartError;
use crate::score::ScoreError;

#[derive(Debug, Error)]
pub enum PbError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
