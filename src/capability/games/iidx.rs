//! beatmania IIDX capabilities (SP and DP share one table).

use std::sync::Arc;

use crate::capability::algorithms::{
    AverageBestProfile, AverageBestSession, GradeFromMetric, ThresholdClassDeriver,
};
use crate::capability::merge::{BestEnumMerge, LowestIntegerMerge};
use crate::capability::{
    CapabilityError, ClassKind, ClassSet, EnumOrdering, GameCapabilities, ScoreCalculator,
};
use crate::chart::ChartInfo;
use crate::games::Playtype;
use crate::score::ScoreData;

pub const LAMPS: &[&str] = &[
    "NO PLAY",
    "FAILED",
    "ASSIST CLEAR",
    "EASY CLEAR",
    "CLEAR",
    "HARD CLEAR",
    "EX HARD CLEAR",
    "FULL COMBO",
];

pub const GRADES: &[&str] = &["F", "E", "D", "C", "B", "A", "AA", "AAA", "MAX-", "MAX"];

const GRADE_THRESHOLDS: &[(f64, &str)] = &[
    (0.0, "F"),
    (22.22, "E"),
    (33.33, "D"),
    (44.44, "C"),
    (55.55, "B"),
    (66.66, "A"),
    (77.77, "AA"),
    (88.88, "AAA"),
    (94.44, "MAX-"),
    (100.0, "MAX"),
];

const ENUM_ORDERINGS: &[EnumOrdering] = &[
    EnumOrdering {
        metric: "lamp",
        labels: LAMPS,
    },
    EnumOrdering {
        metric: "grade",
        labels: GRADES,
    },
];

pub const COLOURS: &[&str] = &[
    "WHITE",
    "LIGHT_BLUE",
    "BLUE",
    "GREEN",
    "YELLOW",
    "ORANGE",
    "RED",
    "SILVER",
    "GOLD",
];

const COLOUR_THRESHOLDS: &[(f64, &str)] = &[
    (0.0, "WHITE"),
    (4.0, "LIGHT_BLUE"),
    (7.0, "BLUE"),
    (10.0, "GREEN"),
    (13.0, "YELLOW"),
    (16.0, "ORANGE"),
    (19.0, "RED"),
    (22.0, "SILVER"),
    (24.0, "GOLD"),
];

pub const DANS: &[&str] = &[
    "SEVENTH_KYU",
    "SIXTH_KYU",
    "FIFTH_KYU",
    "FOURTH_KYU",
    "THIRD_KYU",
    "SECOND_KYU",
    "FIRST_KYU",
    "FIRST_DAN",
    "SECOND_DAN",
    "THIRD_DAN",
    "FOURTH_DAN",
    "FIFTH_DAN",
    "SIXTH_DAN",
    "SEVENTH_DAN",
    "EIGHTH_DAN",
    "NINTH_DAN",
    "TENTH_DAN",
    "CHUUDEN",
    "KAIDEN",
];

const DAN_THRESHOLDS: &[(f64, &str)] = &[
    (1.0, "SEVENTH_KYU"),
    (2.0, "SIXTH_KYU"),
    (3.0, "FIFTH_KYU"),
    (4.0, "FOURTH_KYU"),
    (5.0, "THIRD_KYU"),
    (6.0, "SECOND_KYU"),
    (7.0, "FIRST_KYU"),
    (8.0, "FIRST_DAN"),
    (9.0, "SECOND_DAN"),
    (10.0, "THIRD_DAN"),
    (11.0, "FOURTH_DAN"),
    (12.0, "FIFTH_DAN"),
    (13.0, "SIXTH_DAN"),
    (13.5, "SEVENTH_DAN"),
    (14.0, "EIGHTH_DAN"),
    (14.5, "NINTH_DAN"),
    (15.0, "TENTH_DAN"),
    (15.5, "CHUUDEN"),
    (16.0, "KAIDEN"),
];

/// Score-level rating from percent, chart level and clear lamp.
pub struct KtRating;

impl ScoreCalculator for KtRating {
    fn name(&self) -> &'static str {
        "ktRating"
    }

    fn calculate(
        &self,
        score: &ScoreData,
        chart: &ChartInfo,
    ) -> Result<Option<f64>, CapabilityError> {
        let Some(percent) = score.decimal("percent") else {
            return Ok(None);
        };

        let base = chart.level * (percent / 100.0) * 2.0;
        let bonus = match score.enum_label("lamp") {
            Some("FULL COMBO") => 1.0,
            Some("EX HARD CLEAR") => 0.75,
            Some("HARD CLEAR") => 0.5,
            Some("CLEAR") => 0.25,
            _ => 0.0,
        };

        Ok(Some(((base + bonus) * 100.0).round() / 100.0))
    }
}

/// Lamp-weighted chart level; the basis of the dan-facing profile rating.
pub struct KtLampRating;

impl ScoreCalculator for KtLampRating {
    fn name(&self) -> &'static str {
        "ktLampRating"
    }

    fn calculate(
        &self,
        score: &ScoreData,
        chart: &ChartInfo,
    ) -> Result<Option<f64>, CapabilityError> {
        let Some(lamp) = score.enum_label("lamp") else {
            return Ok(None);
        };

        let coefficient = match lamp {
            "FULL COMBO" => 1.2,
            "EX HARD CLEAR" => 1.1,
            "HARD CLEAR" => 1.05,
            "CLEAR" => 1.0,
            "EASY CLEAR" => 0.8,
            "ASSIST CLEAR" => 0.5,
            _ => 0.0,
        };

        Ok(Some(((chart.level * coefficient) * 100.0).round() / 100.0))
    }
}

fn table() -> GameCapabilities {
    GameCapabilities {
        default_metric: "percent",
        provenance_seed_name: "bestScore",
        enum_orderings: ENUM_ORDERINGS,
        metric_derivers: vec![Arc::new(GradeFromMetric {
            target: "grade",
            source: "percent",
            thresholds: GRADE_THRESHOLDS,
        })],
        score_calculators: vec![Arc::new(KtRating), Arc::new(KtLampRating)],
        session_algorithms: vec![Arc::new(AverageBestSession {
            name: "ktRating",
            source: "ktRating",
            n: 10,
        })],
        profile_algorithms: vec![
            Arc::new(AverageBestProfile {
                name: "ktRating",
                source: "ktRating",
                n: 20,
            }),
            Arc::new(AverageBestProfile {
                name: "ktLampRating",
                source: "ktLampRating",
                n: 20,
            }),
        ],
        class_sets: vec![
            ClassSet {
                name: "colour",
                kind: ClassKind::Derived,
                ordering: COLOURS,
                deriver: Arc::new(ThresholdClassDeriver {
                    rating_key: "ktRating",
                    thresholds: COLOUR_THRESHOLDS,
                }),
            },
            ClassSet {
                name: "dan",
                kind: ClassKind::Provided,
                ordering: DANS,
                deriver: Arc::new(ThresholdClassDeriver {
                    rating_key: "ktLampRating",
                    thresholds: DAN_THRESHOLDS,
                }),
            },
        ],
        merge_functions: vec![
            Arc::new(BestEnumMerge {
                name: "bestLamp",
                metric: "lamp",
                carried_fields: &[],
            }),
            Arc::new(LowestIntegerMerge {
                name: "lowestBp",
                metric: "bp",
            }),
        ],
    }
}

pub(in crate::capability) fn capabilities() -> Vec<(Playtype, GameCapabilities)> {
    vec![(Playtype::Single, table()), (Playtype::Double, table())]
}
