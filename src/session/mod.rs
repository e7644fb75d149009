mod errors;
pub mod models;
pub mod naming;
pub mod repository;
pub mod service;

pub use errors::SessionError;
pub use models::{Session, SessionOutcome, SessionOutcomeKind};
pub use naming::{PetNameSessionNameGenerator, SessionNameGenerator};
pub use repository::{InMemorySessionRepository, SessionRepository};
pub use service::SessionService;
