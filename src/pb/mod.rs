mod errors;
pub mod models;
pub mod ranking;
pub mod repository;
pub mod service;

pub use errors::PbError;
pub use models::{PbDocument, ProvenanceEntry, RankData};
pub use ranking::ChartRanker;
pub use repository::{InMemoryPbRepository, PbRepository};
pub use service::PbService;
