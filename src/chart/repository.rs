use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use super::errors::ChartError;
use super::models::ChartInfo;

/// Trait for chart metadata lookups
#[async_trait]
pub trait ChartRepository: Send + Sync {
    /// Fetches a chart by ID. Missing charts are an error, not a `None`:
    /// a dangling chart reference means the catalog and the score store
    /// have diverged, and callers must not paper over that.
    async fn get_chart(&self, chart_id: &str) -> Result<ChartInfo, ChartError>;
}

/// In-memory implementation of ChartRepository for development and testing
pub struct InMemoryChartRepository {
    charts: Mutex<HashMap<String, ChartInfo>>,
}

impl Default for InMemoryChartRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChartRepository {
    pub fn new() -> Self {
        Self {
            charts: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository pre-populated with a chart catalog
    pub fn with_charts(charts: Vec<ChartInfo>) -> Self {
        let mut chart_map = HashMap::new();
        for chart in charts {
            chart_map.insert(chart.id.clone(), chart);
        }

        Self {
            charts: Mutex::new(chart_map),
        }
    }

    pub fn chart_count(&self) -> usize {
        self.charts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChartRepository for InMemoryChartRepository {
    #[instrument(skip(self))]
    async fn get_chart(&self, chart_id: &str) -> Result<ChartInfo, ChartError> {
        let charts = self.charts.lock().unwrap();
        match charts.get(chart_id) {
            Some(chart) => {
                debug!(chart_id = %chart_id, song = %chart.song_title, "Chart found in memory");
                Ok(chart.clone())
            }
            None => Err(ChartError::NotFound(chart_id.to_string())),
        }
    }
}
