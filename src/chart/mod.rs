mod errors;
pub mod models;
pub mod repository;

pub use errors::ChartError;
pub use models::ChartInfo;
pub use repository::{ChartRepository, InMemoryChartRepository};
