use thiserror::Error;

use crate::pb::PbError;
use crate::profile::ProfileError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Pb(#[from] PbError),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}
