use thiserror::Error;

use crate::capability::CapabilityError;
use crate::pb::PbError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error(transparent)]
    Pb(#[from] PbError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
