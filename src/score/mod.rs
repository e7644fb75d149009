mod errors;
pub mod models;
pub mod repository;

pub use errors::ScoreError;
pub use models::{CalculatedData, MetricDirection, MetricValue, ScoreData, Submission};
pub use repository::{InMemorySubmissionRepository, SubmissionRepository};
