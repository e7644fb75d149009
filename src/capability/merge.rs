//! Reusable PB merge functions. Each one owns exactly one metric slot;
//! the composition engine picks the donor submission, these copy the
//! winning fields across.

use super::MergeFunction;
use crate::pb::models::PbDocument;
use crate::score::{MetricDirection, Submission};

/// Copies `metric` (value plus enum index, when present) from donor to
/// composite. The enum index is re-derived later anyway, but carrying it
/// keeps the composite comparable mid-merge.
fn copy_metric(pb: &mut PbDocument, donor: &Submission, metric: &str) {
    let Some(value) = donor.score_data.get(metric) else {
        return;
    };
    pb.score_data.metrics.insert(metric.to_string(), value.clone());

    match donor.score_data.enum_indexes.get(metric) {
        Some(index) => {
            pb.score_data.enum_indexes.insert(metric.to_string(), *index);
        }
        None => {
            pb.score_data.enum_indexes.remove(metric);
        }
    }
}

/// Takes the highest-ranked value of an enum metric, optionally carrying
/// related fields from the same donor (a best-lamp merge typically brings
/// that play's gauge along with it).
pub struct BestEnumMerge {
    pub name: &'static str,
    pub metric: &'static str,
    pub carried_fields: &'static [&'static str],
}

impl MergeFunction for BestEnumMerge {
    fn name(&self) -> &'static str {
        self.name
    }

    fn metric(&self) -> &'static str {
        self.metric
    }

    fn direction(&self) -> MetricDirection {
        MetricDirection::Maximize
    }

    fn apply(&self, mut pb: PbDocument, donor: &Submission) -> PbDocument {
        copy_metric(&mut pb, donor, self.metric);
        for field in self.carried_fields {
            copy_metric(&mut pb, donor, field);
        }
        pb
    }
}

/// Takes the smallest value of an integer metric (miss counts and the like).
pub struct LowestIntegerMerge {
    pub name: &'static str,
    pub metric: &'static str,
}

impl MergeFunction for LowestIntegerMerge {
    fn name(&self) -> &'static str {
        self.name
    }

    fn metric(&self) -> &'static str {
        self.metric
    }

    fn direction(&self) -> MetricDirection {
        MetricDirection::Minimize
    }

    fn apply(&self, mut pb: PbDocument, donor: &Submission) -> PbDocument {
        copy_metric(&mut pb, donor, self.metric);
        pb
    }
}
