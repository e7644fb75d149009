use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::errors::PbError;
use super::models::RankData;
use super::repository::PbRepository;
use crate::capability::CapabilityTable;
use crate::games::GameKey;

/// Chart-wide ranking pass over stored PBs. Runs separately from PB
/// composition: composition owns one (user, chart) document, this pass
/// owns the standing of every PB on one chart.
pub struct ChartRanker {
    capabilities: Arc<CapabilityTable>,
    repository: Arc<dyn PbRepository>,
}

impl ChartRanker {
    pub fn new(capabilities: Arc<CapabilityTable>, repository: Arc<dyn PbRepository>) -> Self {
        Self {
            capabilities,
            repository,
        }
    }

    /// Recomputes rank/out-of for every PB on a chart, ordered by the
    /// game's default metric. A chart with zero PBs is skipped outright:
    /// an empty bulk write is a store-layer error, not a legitimate
    /// outcome. Returns how many PBs were re-ranked.
    #[instrument(skip(self))]
    pub async fn rerank_chart(&self, game_key: GameKey, chart_id: &str) -> Result<usize, PbError> {
        let caps = self.capabilities.get(game_key)?;
        let mut pbs = self.repository.all_for_chart(chart_id).await?;

        if pbs.is_empty() {
            debug!(chart_id = %chart_id, "No PBs on chart; skipping rank update");
            return Ok(0);
        }

        let values: Vec<f64> = pbs
            .iter()
            .map(|pb| {
                pb.score_data
                    .comparable_value(caps.default_metric)
                    .unwrap_or(f64::MIN)
            })
            .collect();

        let out_of = pbs.len() as u32;
        for (pb, value) in pbs.iter_mut().zip(values.iter()) {
            // ties share a rank: 1 + number of strictly better PBs
            let rank = 1 + values.iter().filter(|other| *other > value).count() as u32;
            let rival_rank = pb.rank_data.and_then(|r| r.rival_rank);
            pb.rank_data = Some(RankData {
                rank,
                out_of,
                rival_rank,
            });
        }

        self.repository.bulk_upsert(&pbs).await?;

        info!(chart_id = %chart_id, ranked = out_of, "Chart re-ranked");
        Ok(pbs.len())
    }

    /// Ranks one user's PB against an explicit rival set on a chart and
    /// persists it on the user's document. `None` when the user has no PB
    /// there.
    #[instrument(skip(self, rival_ids))]
    pub async fn update_rival_rank(
        &self,
        game_key: GameKey,
        chart_id: &str,
        user_id: &str,
        rival_ids: &[String],
    ) -> Result<Option<u32>, PbError> {
        let caps = self.capabilities.get(game_key)?;

        let Some(mut user_pb) = self.repository.get(user_id, chart_id).await? else {
            return Ok(None);
        };
        let Some(user_value) = user_pb.score_data.comparable_value(caps.default_metric) else {
            return Ok(None);
        };

        let mut better = 0_u32;
        for rival_id in rival_ids {
            if let Some(rival_pb) = self.repository.get(rival_id, chart_id).await? {
                if let Some(value) = rival_pb.score_data.comparable_value(caps.default_metric) {
                    if value > user_value {
                        better += 1;
                    }
                }
            }
        }

        let rival_rank = better + 1;
        user_pb.rank_data = match user_pb.rank_data {
            Some(rank_data) => Some(RankData {
                rival_rank: Some(rival_rank),
                ..rank_data
            }),
            None => Some(RankData {
                rank: 0,
                out_of: 0,
                rival_rank: Some(rival_rank),
            }),
        };
        self.repository.upsert(&user_pb).await?;

        Ok(Some(rival_rank))
    }
}
