// Library crate for the scorevault aggregation core
// This file exposes the public API for the import pipeline and integration tests

pub mod capability;
pub mod chart;
pub mod event;
pub mod games;
pub mod import;
pub mod pb;
pub mod profile;
pub mod rating;
pub mod score;
pub mod session;

// Re-export commonly used types for easier access in callers and tests
pub use capability::{CapabilityError, CapabilityTable, GameCapabilities};
pub use chart::{ChartError, ChartInfo, ChartRepository};
pub use event::{UserEvent, UserEventBus};
pub use games::{GameId, GameKey, Playtype};
pub use import::{ImportError, ImportService, ImportSummary};
pub use pb::{ChartRanker, PbDocument, PbService};
pub use profile::{ClassDelta, ProfileService, ProfileStats};
pub use score::{MetricValue, ScoreData, Submission, SubmissionRepository};
pub use session::{Session, SessionOutcome, SessionOutcomeKind, SessionService};
