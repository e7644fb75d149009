pub mod algorithms;
pub mod games;
pub mod merge;

mod errors;
mod table;

pub use errors::CapabilityError;
pub use table::{CapabilityTable, EnumOrdering, GameCapabilities};

use async_trait::async_trait;

use crate::chart::{ChartInfo, ChartRepository};
use crate::games::GameKey;
use crate::pb::models::PbDocument;
use crate::score::{CalculatedData, MetricDirection, ScoreData, Submission};

/// Recomputes a derived metric (e.g. a grade) from the rest of the metric
/// bag. Run after a PB merge so derived metrics match the merged values.
pub trait MetricDeriver: Send + Sync {
    fn name(&self) -> &'static str;

    fn derive(&self, score: &mut ScoreData, chart: &ChartInfo) -> Result<(), CapabilityError>;
}

/// Produces one named rating value for a single score.
pub trait ScoreCalculator: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the inputs don't support a value (e.g. a metric is
    /// missing); `Err` is a calculator fault and is isolated by callers.
    fn calculate(&self, score: &ScoreData, chart: &ChartInfo)
        -> Result<Option<f64>, CapabilityError>;
}

/// Reduces a session's submissions to one session-scope rating value.
pub trait SessionRatingAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn calculate(&self, submissions: &[Submission]) -> Result<Option<f64>, CapabilityError>;
}

/// What a profile-scope rating algorithm gets to look at: the user's PBs
/// for this (game, playtype) and the chart catalog. Algorithms are
/// independent of each other and may run concurrently.
pub struct ProfileContext<'a> {
    pub user_id: &'a str,
    pub game_key: GameKey,
    pub pbs: &'a [PbDocument],
    pub charts: &'a dyn ChartRepository,
}

#[async_trait]
pub trait ProfileRatingAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    async fn calculate(&self, ctx: &ProfileContext<'_>) -> Result<Option<f64>, CapabilityError>;
}

/// Whether a class-set moves freely with every recompute or only upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// Recomputed from ratings every time; adopts the new label even when
    /// it ranks lower than before.
    Derived,
    /// Externally authoritative progression; a stored label is only
    /// replaced by a strictly higher-ranked one.
    Provided,
}

/// Maps current profile ratings to a class label, or `None` when the
/// ratings don't support classification yet.
pub trait ClassDeriver: Send + Sync {
    fn derive(&self, ratings: &CalculatedData) -> Result<Option<&'static str>, CapabilityError>;
}

/// One classification scheme: its label ordering (worst first) and deriver.
#[derive(Clone)]
pub struct ClassSet {
    pub name: &'static str,
    pub kind: ClassKind,
    pub ordering: &'static [&'static str],
    pub deriver: std::sync::Arc<dyn ClassDeriver>,
}

impl ClassSet {
    pub fn ordinal_of(&self, label: &str) -> Option<usize> {
        self.ordering.iter().position(|l| *l == label)
    }
}

/// A named rule that finds the best-qualifying submission for one metric
/// and folds it into the composite PB.
///
/// `apply` takes ownership of the evolving composite and returns it: merge
/// functions run strictly in declared order and never hold the composite
/// concurrently, so provenance ordering stays deterministic.
pub trait MergeFunction: Send + Sync {
    fn name(&self) -> &'static str;

    fn metric(&self) -> &'static str;

    fn direction(&self) -> MetricDirection;

    fn apply(&self, pb: PbDocument, donor: &Submission) -> PbDocument;
}
