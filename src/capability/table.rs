use std::collections::HashMap;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tracing::warn;

use super::errors::CapabilityError;
use super::games::{iidx, jubeat, sdvx};
use super::{
    ClassSet, MergeFunction, MetricDeriver, ProfileRatingAlgorithm, ScoreCalculator,
    SessionRatingAlgorithm,
};
use crate::chart::ChartInfo;
use crate::games::{GameId, GameKey};
use crate::score::{CalculatedData, MetricValue, ScoreData, Submission};

/// Fixed ordinal table for one enum metric, worst label first.
#[derive(Debug, Clone, Copy)]
pub struct EnumOrdering {
    pub metric: &'static str,
    pub labels: &'static [&'static str],
}

impl EnumOrdering {
    pub fn index_of(&self, label: &str) -> Option<u32> {
        self.labels.iter().position(|l| *l == label).map(|i| i as u32)
    }
}

/// Everything pluggable about one (game, playtype): metric derivers, rating
/// calculators at score/session/profile scope, class-sets, and the ordered
/// PB merge functions. Pure configuration plus functions; no state.
#[derive(Clone)]
pub struct GameCapabilities {
    /// The metric a PB is seeded from and charts are ranked by.
    pub default_metric: &'static str,
    /// Name recorded on the PB's seed provenance entry.
    pub provenance_seed_name: &'static str,
    pub enum_orderings: &'static [EnumOrdering],
    pub metric_derivers: Vec<Arc<dyn MetricDeriver>>,
    pub score_calculators: Vec<Arc<dyn ScoreCalculator>>,
    pub session_algorithms: Vec<Arc<dyn SessionRatingAlgorithm>>,
    pub profile_algorithms: Vec<Arc<dyn ProfileRatingAlgorithm>>,
    pub class_sets: Vec<ClassSet>,
    pub merge_functions: Vec<Arc<dyn MergeFunction>>,
}

impl GameCapabilities {
    /// Re-runs every metric deriver against a (possibly merged) metric bag.
    pub fn rederive_metrics(
        &self,
        score: &mut ScoreData,
        chart: &ChartInfo,
    ) -> Result<(), CapabilityError> {
        for deriver in &self.metric_derivers {
            deriver.derive(score, chart)?;
        }
        Ok(())
    }

    /// Rebuilds the enum-index side-map from the metric bag's current enum
    /// labels. A label outside the ordering table is a data-integrity
    /// error, not something to guess an ordinal for.
    pub fn rebuild_enum_indexes(&self, score: &mut ScoreData) -> Result<(), CapabilityError> {
        for ordering in self.enum_orderings {
            let label = match score.metrics.get(ordering.metric) {
                Some(MetricValue::Enum(label)) => label.clone(),
                _ => continue,
            };

            match ordering.index_of(&label) {
                Some(index) => {
                    score.enum_indexes.insert(ordering.metric.to_string(), index);
                }
                None => {
                    return Err(CapabilityError::UnknownEnumValue {
                        metric: ordering.metric.to_string(),
                        value: label,
                    })
                }
            }
        }
        Ok(())
    }

    /// Runs every score calculator against one metric bag. A failing
    /// calculator is logged and its key left absent; it never takes the
    /// other calculators down with it.
    pub fn calculate_score_ratings(&self, score: &ScoreData, chart: &ChartInfo) -> CalculatedData {
        let mut out = CalculatedData::new();
        for calculator in &self.score_calculators {
            match calculator.calculate(score, chart) {
                Ok(value) => {
                    out.insert(calculator.name().to_string(), value);
                }
                Err(error) => {
                    warn!(
                        algorithm = calculator.name(),
                        %error,
                        "Score calculator failed; leaving key absent"
                    );
                }
            }
        }
        out
    }

    /// Runs every session-scope algorithm over a session's submission set,
    /// with the same per-algorithm isolation as score calculators.
    pub fn calculate_session_ratings(&self, submissions: &[Submission]) -> CalculatedData {
        let mut out = CalculatedData::new();
        for algorithm in &self.session_algorithms {
            match algorithm.calculate(submissions) {
                Ok(value) => {
                    out.insert(algorithm.name().to_string(), value);
                }
                Err(error) => {
                    warn!(
                        algorithm = algorithm.name(),
                        %error,
                        "Session algorithm failed; leaving key absent"
                    );
                }
            }
        }
        out
    }
}

/// The static per-(game, playtype) registry. Built once; handed around as
/// `Arc<CapabilityTable>`.
pub struct CapabilityTable {
    entries: HashMap<GameKey, Arc<GameCapabilities>>,
}

impl CapabilityTable {
    /// The standard table covering every supported game. The match below is
    /// exhaustive over `GameId`, so adding a game without registering its
    /// capabilities fails to compile.
    pub fn standard() -> Self {
        let mut entries = HashMap::new();

        for game in GameId::iter() {
            let per_playtype = match game {
                GameId::Iidx => iidx::capabilities(),
                GameId::Sdvx => sdvx::capabilities(),
                GameId::Jubeat => jubeat::capabilities(),
            };

            for (playtype, capabilities) in per_playtype {
                entries.insert(GameKey::new(game, playtype), Arc::new(capabilities));
            }
        }

        Self { entries }
    }

    pub fn get(&self, key: GameKey) -> Result<Arc<GameCapabilities>, CapabilityError> {
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| CapabilityError::UnsupportedGame(key.to_string()))
    }

    pub fn supports(&self, key: GameKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn supported_keys(&self) -> Vec<GameKey> {
        self.entries.keys().copied().collect()
    }
}
