use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::errors::PbError;
use super::models::PbDocument;
use super::repository::PbRepository;
use crate::capability::CapabilityTable;
use crate::chart::ChartRepository;
use crate::games::GameKey;
use crate::score::{MetricDirection, SubmissionRepository};

/// Composes canonical best-records from raw submissions.
pub struct PbService {
    capabilities: Arc<CapabilityTable>,
    submissions: Arc<dyn SubmissionRepository>,
    charts: Arc<dyn ChartRepository>,
    repository: Arc<dyn PbRepository>,
}

impl PbService {
    pub fn new(
        capabilities: Arc<CapabilityTable>,
        submissions: Arc<dyn SubmissionRepository>,
        charts: Arc<dyn ChartRepository>,
        repository: Arc<dyn PbRepository>,
    ) -> Self {
        Self {
            capabilities,
            submissions,
            charts,
            repository,
        }
    }

    pub fn repository(&self) -> Arc<dyn PbRepository> {
        self.repository.clone()
    }

    /// Builds the composite PB for (user, chart) from scratch. `Ok(None)`
    /// means the user has no qualifying submission on the chart: an
    /// expected absence, not a fault. A dangling chart reference, on the
    /// other hand, always propagates.
    ///
    /// The merge-function loop is strictly sequential: each function reads
    /// the current composite (timestamp, provenance so far) and returns
    /// the next one, so running them concurrently would race on the
    /// composite and scramble provenance order.
    #[instrument(skip(self))]
    pub async fn compose_pb(
        &self,
        game_key: GameKey,
        user_id: &str,
        chart_id: &str,
    ) -> Result<Option<PbDocument>, PbError> {
        let caps = self.capabilities.get(game_key)?;
        let chart = self.charts.get_chart(chart_id).await?;

        let seed = match self
            .submissions
            .best_by_metric(
                user_id,
                chart_id,
                caps.default_metric,
                MetricDirection::Maximize,
            )
            .await?
        {
            Some(seed) => seed,
            None => {
                warn!(
                    user_id = %user_id,
                    chart_id = %chart_id,
                    "No submissions to compose a PB from"
                );
                return Ok(None);
            }
        };

        let mut pb = PbDocument::seeded_from(&seed, caps.provenance_seed_name);

        for merge in &caps.merge_functions {
            let donor = self
                .submissions
                .best_by_metric(user_id, chart_id, merge.metric(), merge.direction())
                .await?;

            let Some(donor) = donor else {
                debug!(
                    merge = merge.name(),
                    metric = merge.metric(),
                    "No qualifying donor; skipping merge slot"
                );
                continue;
            };

            pb = merge.apply(pb, &donor);
            pb.absorb_donor(&donor);
            pb.record_provenance(merge.name(), &donor.id);
        }

        // the merged bag may match no single submission: derived metrics,
        // enum indexes and every rating are rebuilt from the final state
        caps.rederive_metrics(&mut pb.score_data, &chart)?;
        caps.rebuild_enum_indexes(&mut pb.score_data)?;
        pb.calculated_data = caps.calculate_score_ratings(&pb.score_data, &chart);

        Ok(Some(pb))
    }

    /// Composes and persists the PB for (user, chart). Returns the stored
    /// document, or `None` when there was nothing to compose.
    #[instrument(skip(self))]
    pub async fn update_pb(
        &self,
        game_key: GameKey,
        user_id: &str,
        chart_id: &str,
    ) -> Result<Option<PbDocument>, PbError> {
        let Some(mut pb) = self.compose_pb(game_key, user_id, chart_id).await? else {
            return Ok(None);
        };

        // ranking is a separate chart-wide pass; keep whatever it last wrote
        if let Some(existing) = self.repository.get(user_id, chart_id).await? {
            pb.rank_data = existing.rank_data;
        }

        self.repository.upsert(&pb).await?;
        info!(
            user_id = %user_id,
            chart_id = %chart_id,
            provenance = pb.composed_from.len(),
            "PB recomposed"
        );

        Ok(Some(pb))
    }
}
