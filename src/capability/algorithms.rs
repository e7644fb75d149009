//! Reducer-backed building blocks shared by the per-game capability
//! tables. Game modules instantiate these with their own names, source
//! keys and window sizes instead of re-implementing the reductions.

use async_trait::async_trait;

use super::errors::CapabilityError;
use super::{
    ClassDeriver, MetricDeriver, ProfileContext, ProfileRatingAlgorithm, SessionRatingAlgorithm,
};
use crate::chart::ChartInfo;
use crate::rating::{average_of_best_n, sum_of_best_n};
use crate::score::{CalculatedData, MetricValue, ScoreData, Submission};

/// Session-scope average of the best `n` values of one calculated-data key.
pub struct AverageBestSession {
    pub name: &'static str,
    pub source: &'static str,
    pub n: usize,
}

impl SessionRatingAlgorithm for AverageBestSession {
    fn name(&self) -> &'static str {
        self.name
    }

    fn calculate(&self, submissions: &[Submission]) -> Result<Option<f64>, CapabilityError> {
        let values: Vec<f64> = submissions
            .iter()
            .filter_map(|s| s.calculated_data.get(self.source).copied().flatten())
            .collect();
        Ok(average_of_best_n(&values, self.n))
    }
}

/// Profile-scope average of the best `n` values of one key across all PBs.
pub struct AverageBestProfile {
    pub name: &'static str,
    pub source: &'static str,
    pub n: usize,
}

#[async_trait]
impl ProfileRatingAlgorithm for AverageBestProfile {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn calculate(&self, ctx: &ProfileContext<'_>) -> Result<Option<f64>, CapabilityError> {
        let values: Vec<f64> = ctx
            .pbs
            .iter()
            .filter_map(|pb| pb.calculated_data.get(self.source).copied().flatten())
            .collect();
        Ok(average_of_best_n(&values, self.n))
    }
}

/// Profile-scope sum of the best `n` values of one key across all PBs.
///
/// `empty_is_null` selects between the two empty-set conventions: `false`
/// yields 0.0 when nothing qualifies, `true` yields null.
pub struct SumBestProfile {
    pub name: &'static str,
    pub source: &'static str,
    pub n: usize,
    pub empty_is_null: bool,
}

#[async_trait]
impl ProfileRatingAlgorithm for SumBestProfile {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn calculate(&self, ctx: &ProfileContext<'_>) -> Result<Option<f64>, CapabilityError> {
        let values: Vec<f64> = ctx
            .pbs
            .iter()
            .filter_map(|pb| pb.calculated_data.get(self.source).copied().flatten())
            .collect();

        if values.is_empty() && self.empty_is_null {
            return Ok(None);
        }

        Ok(Some(sum_of_best_n(&values, self.n)))
    }
}

/// Class deriver over an ascending threshold table for one rating key.
/// Returns the label of the highest threshold the rating reaches, or
/// `None` when the rating is null/absent or below every threshold.
pub struct ThresholdClassDeriver {
    pub rating_key: &'static str,
    /// Ascending `(minimum rating, label)` pairs.
    pub thresholds: &'static [(f64, &'static str)],
}

impl ClassDeriver for ThresholdClassDeriver {
    fn derive(&self, ratings: &CalculatedData) -> Result<Option<&'static str>, CapabilityError> {
        let Some(value) = ratings.get(self.rating_key).copied().flatten() else {
            return Ok(None);
        };

        Ok(self
            .thresholds
            .iter()
            .rev()
            .find(|(minimum, _)| value >= *minimum)
            .map(|(_, label)| *label))
    }
}

/// Derives an enum metric (e.g. a grade) from a numeric source metric via
/// an ascending threshold table. The ordinal index is filled in by the
/// enum-ordering rebuild, not here.
pub struct GradeFromMetric {
    pub target: &'static str,
    pub source: &'static str,
    /// Ascending `(minimum source value, label)` pairs; the first entry is
    /// the floor grade and should start at the metric's minimum.
    pub thresholds: &'static [(f64, &'static str)],
}

impl MetricDeriver for GradeFromMetric {
    fn name(&self) -> &'static str {
        self.target
    }

    fn derive(&self, score: &mut ScoreData, _chart: &ChartInfo) -> Result<(), CapabilityError> {
        let Some(value) = score.comparable_value(self.source) else {
            // nothing to derive from; leave any existing label alone
            return Ok(());
        };

        let label = self
            .thresholds
            .iter()
            .rev()
            .find(|(minimum, _)| value >= *minimum)
            .map(|(_, label)| *label);

        if let Some(label) = label {
            score.set(self.target, MetricValue::Enum(label.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::InMemoryChartRepository;
    use crate::games::{GameId, GameKey, Playtype};
    use crate::pb::models::PbDocument;
    use crate::score::Submission;

    fn submission_with(name: &str, value: Option<f64>) -> Submission {
        let mut calculated_data = CalculatedData::new();
        calculated_data.insert(name.to_string(), value);

        Submission {
            id: "sub".to_string(),
            user_id: "user-1".to_string(),
            chart_id: "chart-1".to_string(),
            game_key: GameKey::new(GameId::Iidx, Playtype::Single),
            time_achieved: None,
            score_data: ScoreData::new(),
            calculated_data,
            highlight: false,
        }
    }

    fn pb_with(name: &str, value: Option<f64>) -> PbDocument {
        let mut pb = PbDocument::seeded_from(&submission_with(name, value), "bestScore");
        pb.calculated_data = {
            let mut data = CalculatedData::new();
            data.insert(name.to_string(), value);
            data
        };
        pb
    }

    #[test]
    fn session_average_skips_null_values() {
        let algorithm = AverageBestSession {
            name: "rating",
            source: "rating",
            n: 2,
        };
        let submissions = vec![
            submission_with("rating", Some(4.0)),
            submission_with("rating", None),
            submission_with("rating", Some(8.0)),
        ];

        let value = algorithm.calculate(&submissions).unwrap();
        assert_eq!(value, Some(6.0));
    }

    #[tokio::test]
    async fn sum_profile_conventions_differ_on_empty() {
        let charts = InMemoryChartRepository::new();
        let ctx = ProfileContext {
            user_id: "user-1",
            game_key: GameKey::new(GameId::Sdvx, Playtype::Single),
            pbs: &[],
            charts: &charts,
        };

        let zero = SumBestProfile {
            name: "vf6",
            source: "vf6",
            n: 50,
            empty_is_null: false,
        };
        let null = SumBestProfile {
            name: "naive",
            source: "vf6",
            n: 60,
            empty_is_null: true,
        };

        assert_eq!(zero.calculate(&ctx).await.unwrap(), Some(0.0));
        assert_eq!(null.calculate(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn average_profile_reads_pb_values() {
        let charts = InMemoryChartRepository::new();
        let pbs = vec![pb_with("rating", Some(10.0)), pb_with("rating", Some(20.0))];
        let ctx = ProfileContext {
            user_id: "user-1",
            game_key: GameKey::new(GameId::Iidx, Playtype::Single),
            pbs: &pbs,
            charts: &charts,
        };

        let algorithm = AverageBestProfile {
            name: "rating",
            source: "rating",
            n: 2,
        };
        assert_eq!(algorithm.calculate(&ctx).await.unwrap(), Some(15.0));
    }

    #[test]
    fn threshold_deriver_picks_highest_reached() {
        const THRESHOLDS: &[(f64, &str)] = &[(0.0, "WHITE"), (5.0, "BLUE"), (10.0, "GOLD")];
        let deriver = ThresholdClassDeriver {
            rating_key: "rating",
            thresholds: THRESHOLDS,
        };

        let mut ratings = CalculatedData::new();
        ratings.insert("rating".to_string(), Some(7.2));
        assert_eq!(deriver.derive(&ratings).unwrap(), Some("BLUE"));

        ratings.insert("rating".to_string(), None);
        assert_eq!(deriver.derive(&ratings).unwrap(), None);
    }

    #[test]
    fn grade_deriver_overwrites_stale_labels() {
        const THRESHOLDS: &[(f64, &str)] = &[(0.0, "D"), (50.0, "B"), (90.0, "S")];
        let deriver = GradeFromMetric {
            target: "grade",
            source: "percent",
            thresholds: THRESHOLDS,
        };
        let chart = ChartInfo::new("chart-1", "song", 10.0, 1000);

        let mut score = ScoreData::new();
        score.set("percent", MetricValue::Decimal(95.0));
        score.set("grade", MetricValue::Enum("D".to_string()));

        deriver.derive(&mut score, &chart).unwrap();
        assert_eq!(score.enum_label("grade"), Some("S"));
    }
}
