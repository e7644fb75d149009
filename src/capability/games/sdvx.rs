//! SOUND VOLTEX capabilities.

use std::sync::Arc;

use crate::capability::algorithms::{
    AverageBestSession, GradeFromMetric, SumBestProfile, ThresholdClassDeriver,
};
use crate::capability::merge::BestEnumMerge;
use crate::capability::{
    CapabilityError, ClassKind, ClassSet, EnumOrdering, GameCapabilities, ScoreCalculator,
};
use crate::chart::ChartInfo;
use crate::games::Playtype;
use crate::score::ScoreData;

pub const LAMPS: &[&str] = &[
    "FAILED",
    "CLEAR",
    "EXCESSIVE CLEAR",
    "ULTIMATE CHAIN",
    "PERFECT ULTIMATE CHAIN",
];

pub const GRADES: &[&str] = &["D", "C", "B", "A", "A+", "AA", "AA+", "AAA", "AAA+", "S"];

const GRADE_THRESHOLDS: &[(f64, &str)] = &[
    (0.0, "D"),
    (6_500_000.0, "C"),
    (7_500_000.0, "B"),
    (8_700_000.0, "A"),
    (9_000_000.0, "A+"),
    (9_300_000.0, "AA"),
    (9_500_000.0, "AA+"),
    (9_700_000.0, "AAA"),
    (9_800_000.0, "AAA+"),
    (9_900_000.0, "S"),
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

pub const VF_CLASSES: &[&str] = &[
    "DANDELION",
    "CYAN",
    "COBALT",
    "DARK_BLUE",
    "VIOLET",
    "CORAL",
    "ARGENTO",
    "ELDORA",
    "CRIMSON",
    "IMPERIAL",
];

const VF_CLASS_THRESHOLDS: &[(f64, &str)] = &[
    (0.0, "DANDELION"),
    (2.5, "CYAN"),
    (5.0, "COBALT"),
    (7.5, "DARK_BLUE"),
    (10.0, "VIOLET"),
    (12.5, "CORAL"),
    (15.0, "ARGENTO"),
    (17.5, "ELDORA"),
    (20.0, "CRIMSON"),
    (23.0, "IMPERIAL"),
];

pub const DANS: &[&str] = &[
    "DAN_1", "DAN_2", "DAN_3", "DAN_4", "DAN_5", "DAN_6", "DAN_7", "DAN_8", "DAN_9", "DAN_10",
    "DAN_11", "INF",
];

const DAN_THRESHOLDS: &[(f64, &str)] = &[
    (1.0, "DAN_1"),
    (3.0, "DAN_2"),
    (5.0, "DAN_3"),
    (7.0, "DAN_4"),
    (9.0, "DAN_5"),
    (11.0, "DAN_6"),
    (13.0, "DAN_7"),
    (15.0, "DAN_8"),
    (17.0, "DAN_9"),
    (19.0, "DAN_10"),
    (21.0, "DAN_11"),
    (23.5, "INF"),
];

/// VOLFORCE, series 6 formula: chart level scaled by score ratio, grade and
/// clear coefficients, floored to two decimals like the in-game display.
pub struct Vf6;

impl ScoreCalculator for Vf6 {
    fn name(&self) -> &'static str {
        "vf6"
    }

    fn calculate(
        &self,
        score: &ScoreData,
        chart: &ChartInfo,
    ) -> Result<Option<f64>, CapabilityError> {
        let Some(points) = score.integer("score") else {
            return Ok(None);
        };

        let grade_coefficient = match score.enum_label("grade") {
            Some("S") => 1.05,
            Some("AAA+") => 1.02,
            Some("AAA") => 1.0,
            Some("AA+") => 0.97,
            Some("AA") => 0.94,
            Some("A+") => 0.91,
            Some("A") => 0.88,
            Some("B") => 0.85,
            Some("C") => 0.82,
            _ => 0.8,
        };

        let clear_coefficient = match score.enum_label("lamp") {
            Some("PERFECT ULTIMATE CHAIN") => 1.1,
            Some("ULTIMATE CHAIN") => 1.05,
            Some("EXCESSIVE CLEAR") => 1.02,
            Some("CLEAR") => 1.0,
            _ => 0.5,
        };

        let volforce = chart.level * (points as f64 / 10_000_000.0)
            * grade_coefficient
            * clear_coefficient
            * 2.0;

        Ok(Some((volforce * 100.0).floor() / 100.0))
    }
}

fn table() -> GameCapabilities {
    GameCapabilities {
        default_metric: "score",
        provenance_seed_name: "bestScore",
        enum_orderings: ENUM_ORDERINGS,
        metric_derivers: vec![Arc::new(GradeFromMetric {
            target: "grade",
            source: "score",
            thresholds: GRADE_THRESHOLDS,
        })],
        score_calculators: vec![Arc::new(Vf6)],
        session_algorithms: vec![Arc::new(AverageBestSession {
            name: "vf6",
            source: "vf6",
            n: 10,
        })],
        profile_algorithms: vec![Arc::new(SumBestProfile {
            name: "vf6",
            source: "vf6",
            n: 50,
            empty_is_null: false,
        })],
        class_sets: vec![
            ClassSet {
                name: "vfClass",
                kind: ClassKind::Derived,
                ordering: VF_CLASSES,
                deriver: Arc::new(ThresholdClassDeriver {
                    rating_key: "vf6",
                    thresholds: VF_CLASS_THRESHOLDS,
                }),
            },
            ClassSet {
                name: "dan",
                kind: ClassKind::Provided,
                ordering: DANS,
                deriver: Arc::new(ThresholdClassDeriver {
                    rating_key: "vf6",
                    thresholds: DAN_THRESHOLDS,
                }),
            },
        ],
        // best lamp carries that play's remaining gauge with it
        merge_functions: vec![Arc::new(BestEnumMerge {
            name: "bestLamp",
            metric: "lamp",
            carried_fields: &["gauge"],
        })],
    }
}

pub(in crate::capability) fn capabilities() -> Vec<(Playtype, GameCapabilities)> {
    vec![(Playtype::Single, table())]
}
