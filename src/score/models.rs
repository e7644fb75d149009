use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::games::GameKey;

/// Named rating values attached to a submission, session or PB. A key being
/// present with a `None` value means the algorithm ran and declined to
/// produce a number; an absent key means the algorithm did not run (or
/// failed and was isolated).
pub type CalculatedData = BTreeMap<String, Option<f64>>;

/// A single metric inside a score's metric bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    Integer(i64),
    Decimal(f64),
    /// Ordinal metrics (lamps, grades) store their display label here; the
    /// rank used for comparison lives in `ScoreData::enum_indexes`.
    Enum(String),
}

/// Whether "best" for a metric means the largest or the smallest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricDirection {
    Maximize,
    Minimize,
}

/// The metric bag of a submission or PB: provided + derived metrics, plus a
/// side-map giving each enum metric a numeric rank for comparison/sorting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreData {
    pub metrics: BTreeMap<String, MetricValue>,
    pub enum_indexes: BTreeMap<String, u32>,
}

impl ScoreData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: &str) -> Option<&MetricValue> {
        self.metrics.get(metric)
    }

    pub fn set(&mut self, metric: &str, value: MetricValue) {
        self.metrics.insert(metric.to_string(), value);
    }

    pub fn set_enum(&mut self, metric: &str, label: &str, index: u32) {
        self.metrics
            .insert(metric.to_string(), MetricValue::Enum(label.to_string()));
        self.enum_indexes.insert(metric.to_string(), index);
    }

    pub fn integer(&self, metric: &str) -> Option<i64> {
        match self.metrics.get(metric) {
            Some(MetricValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn decimal(&self, metric: &str) -> Option<f64> {
        match self.metrics.get(metric) {
            Some(MetricValue::Decimal(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn enum_label(&self, metric: &str) -> Option<&str> {
        match self.metrics.get(metric) {
            Some(MetricValue::Enum(label)) => Some(label.as_str()),
            _ => None,
        }
    }

    /// The value used when ordering scores on this metric. Integers and
    /// decimals compare numerically; enum metrics compare by their ordinal
    /// rank in `enum_indexes`, never by display label.
    pub fn comparable_value(&self, metric: &str) -> Option<f64> {
        match self.metrics.get(metric)? {
            MetricValue::Integer(v) => Some(*v as f64),
            MetricValue::Decimal(v) => Some(*v),
            MetricValue::Enum(_) => self.enum_indexes.get(metric).map(|idx| *idx as f64),
        }
    }
}

/// An immutable raw score submission. Created by ingestion, consumed here,
/// never mutated or deleted; superseded submissions stay for provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub user_id: String,
    pub chart_id: String,
    pub game_key: GameKey,
    /// Absent timestamps never anchor a session and never advance a PB's
    /// timestamp, but the submission still counts toward metric merges.
    pub time_achieved: Option<DateTime<Utc>>,
    pub score_data: ScoreData,
    pub calculated_data: CalculatedData,
    pub highlight: bool,
}
