use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::errors::ImportError;
use crate::games::GameKey;
use crate::pb::{ChartRanker, PbService};
use crate::profile::{ClassDelta, ProfileService};
use crate::score::Submission;
use crate::session::{SessionOutcome, SessionService};

/// What one processed batch did to the store.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub sessions: Vec<SessionOutcome>,
    pub charts_processed: usize,
    pub pbs_updated: usize,
    pub deltas: Vec<ClassDelta>,
}

/// Runs the full post-ingestion pipeline for one user's batch: session
/// clustering, per-chart PB recomposition and re-ranking, then the
/// profile recompute. Invoked synchronously by the surrounding import
/// job, which owns threading and deadlines.
pub struct ImportService {
    sessions: Arc<SessionService>,
    pbs: Arc<PbService>,
    ranker: Arc<ChartRanker>,
    profiles: Arc<ProfileService>,
}

impl ImportService {
    pub fn new(
        sessions: Arc<SessionService>,
        pbs: Arc<PbService>,
        ranker: Arc<ChartRanker>,
        profiles: Arc<ProfileService>,
    ) -> Self {
        Self {
            sessions,
            pbs,
            ranker,
            profiles,
        }
    }

    /// Processes one user's freshly ingested submissions. The batch must
    /// already be persisted in the submission store; this pipeline only
    /// reads it back.
    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    pub async fn process_batch(
        &self,
        user_id: &str,
        game_key: GameKey,
        batch: &[Submission],
    ) -> Result<ImportSummary, ImportError> {
        if batch.is_empty() {
            debug!(user_id = %user_id, "Empty batch; nothing to process");
            return Ok(ImportSummary::default());
        }

        let sessions = self
            .sessions
            .cluster_submissions(user_id, game_key, batch)
            .await?;

        let chart_ids: BTreeSet<&str> = batch.iter().map(|s| s.chart_id.as_str()).collect();

        let mut pbs_updated = 0;
        for chart_id in &chart_ids {
            if self
                .pbs
                .update_pb(game_key, user_id, chart_id)
                .await?
                .is_some()
            {
                pbs_updated += 1;
            }
            self.ranker.rerank_chart(game_key, chart_id).await?;
        }

        let profile = self.profiles.update_profile(user_id, game_key).await?;

        info!(
            user_id = %user_id,
            game = %game_key,
            sessions = sessions.len(),
            pbs = pbs_updated,
            deltas = profile.deltas.len(),
            "Batch processed"
        );

        Ok(ImportSummary {
            sessions,
            charts_processed: chart_ids.len(),
            pbs_updated,
            deltas: profile.deltas,
        })
    }
}
