//! jubeat capabilities.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::algorithms::{AverageBestSession, SumBestProfile, ThresholdClassDeriver};
use crate::capability::merge::BestEnumMerge;
use crate::capability::{
    CapabilityError, ClassKind, ClassSet, EnumOrdering, GameCapabilities, ProfileContext,
    ProfileRatingAlgorithm, ScoreCalculator,
};
use crate::chart::ChartInfo;
use crate::games::Playtype;
use crate::rating::sum_of_best_n;
use crate::score::ScoreData;

pub const LAMPS: &[&str] = &["FAILED", "CLEAR", "FULL COMBO", "EXCELLENT"];

const ENUM_ORDERINGS: &[EnumOrdering] = &[EnumOrdering {
    metric: "lamp",
    labels: LAMPS,
}];

pub const COLOURS: &[&str] = &[
    "BLACK",
    "YELLOW_GREEN",
    "GREEN",
    "LIGHT_BLUE",
    "BLUE",
    "VIOLET",
    "RED",
    "ORANGE",
    "GOLD",
];

const COLOUR_THRESHOLDS: &[(f64, &str)] = &[
    (0.0, "BLACK"),
    (1_000.0, "YELLOW_GREEN"),
    (2_000.0, "GREEN"),
    (3_000.0, "LIGHT_BLUE"),
    (4_500.0, "BLUE"),
    (6_000.0, "VIOLET"),
    (7_500.0, "RED"),
    (8_500.0, "ORANGE"),
    (9_500.0, "GOLD"),
];

/// Per-score jubility from music rate and chart level, one decimal place.
pub struct Jubility;

impl ScoreCalculator for Jubility {
    fn name(&self) -> &'static str {
        "jubility"
    }

    fn calculate(
        &self,
        score: &ScoreData,
        chart: &ChartInfo,
    ) -> Result<Option<f64>, CapabilityError> {
        let Some(music_rate) = score.decimal("musicRate") else {
            return Ok(None);
        };

        let value = chart.level * music_rate / 10.0;
        Ok(Some((value * 10.0).round() / 10.0))
    }
}

const JUBILITY_WINDOW: usize = 30;

/// Profile jubility: the best 30 values on current-version ("hot") charts
/// and the best 30 on everything else, summed independently and combined.
/// Zero qualifying PBs yields 0, not null.
pub struct JubilityProfile;

#[async_trait]
impl ProfileRatingAlgorithm for JubilityProfile {
    fn name(&self) -> &'static str {
        "jubility"
    }

    async fn calculate(&self, ctx: &ProfileContext<'_>) -> Result<Option<f64>, CapabilityError> {
        let mut hot = Vec::new();
        let mut cold = Vec::new();

        for pb in ctx.pbs {
            let Some(value) = pb.calculated_data.get("jubility").copied().flatten() else {
                continue;
            };

            let chart = ctx
                .charts
                .get_chart(&pb.chart_id)
                .await
                .map_err(|e| CapabilityError::ChartLookup(e.to_string()))?;

            if chart.is_hot {
                hot.push(value);
            } else {
                cold.push(value);
            }
        }

        Ok(Some(
            sum_of_best_n(&hot, JUBILITY_WINDOW) + sum_of_best_n(&cold, JUBILITY_WINDOW),
        ))
    }
}

fn table() -> GameCapabilities {
    GameCapabilities {
        default_metric: "musicRate",
        provenance_seed_name: "bestScore",
        enum_orderings: ENUM_ORDERINGS,
        metric_derivers: vec![],
        score_calculators: vec![Arc::new(Jubility)],
        session_algorithms: vec![Arc::new(AverageBestSession {
            name: "jubility",
            source: "jubility",
            n: 10,
        })],
        profile_algorithms: vec![
            Arc::new(JubilityProfile),
            // same source without the hot/cold split; null when empty
            Arc::new(SumBestProfile {
                name: "naiveJubility",
                source: "jubility",
                n: 60,
                empty_is_null: true,
            }),
        ],
        class_sets: vec![ClassSet {
            name: "colour",
            kind: ClassKind::Derived,
            ordering: COLOURS,
            deriver: Arc::new(ThresholdClassDeriver {
                rating_key: "jubility",
                thresholds: COLOUR_THRESHOLDS,
            }),
        }],
        merge_functions: vec![Arc::new(BestEnumMerge {
            name: "bestLamp",
            metric: "lamp",
            carried_fields: &[],
        })],
    }
}

pub(in crate::capability) fn capabilities() -> Vec<(Playtype, GameCapabilities)> {
    vec![(Playtype::Single, table())]
}
