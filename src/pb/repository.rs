use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use super::errors::PbError;
use super::models::PbDocument;
use crate::games::GameKey;

/// Trait for the PB document store. Documents are keyed by (user, chart)
/// and fully replaced on every recompute.
#[async_trait]
pub trait PbRepository: Send + Sync {
    async fn upsert(&self, pb: &PbDocument) -> Result<(), PbError>;

    async fn get(&self, user_id: &str, chart_id: &str) -> Result<Option<PbDocument>, PbError>;

    /// Every PB on one chart, across all users.
    async fn all_for_chart(&self, chart_id: &str) -> Result<Vec<PbDocument>, PbError>;

    /// Every PB a user holds for one (game, playtype).
    async fn all_for_user_game(
        &self,
        user_id: &str,
        game_key: GameKey,
    ) -> Result<Vec<PbDocument>, PbError>;

    /// Replaces a batch of PBs in one pass. Callers must not invoke this
    /// with an empty batch; guard at the call site instead.
    async fn bulk_upsert(&self, pbs: &[PbDocument]) -> Result<(), PbError>;
}

/// In-memory implementation of PbRepository for development and testing
pub struct InMemoryPbRepository {
    pbs: Mutex<HashMap<(String, String), PbDocument>>,
}

impl Default for InMemoryPbRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPbRepository {
    pub fn new() -> Self {
        Self {
            pbs: Mutex::new(HashMap::new()),
        }
    }

    pub fn pb_count(&self) -> usize {
        self.pbs.lock().unwrap().len()
    }
}

#[async_trait]
impl PbRepository for InMemoryPbRepository {
    #[instrument(skip(self, pb))]
    async fn upsert(&self, pb: &PbDocument) -> Result<(), PbError> {
        debug!(user_id = %pb.user_id, chart_id = %pb.chart_id, "Upserting PB in memory");

        let mut pbs = self.pbs.lock().unwrap();
        pbs.insert((pb.user_id.clone(), pb.chart_id.clone()), pb.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: &str, chart_id: &str) -> Result<Option<PbDocument>, PbError> {
        let pbs = self.pbs.lock().unwrap();
        Ok(pbs
            .get(&(user_id.to_string(), chart_id.to_string()))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn all_for_chart(&self, chart_id: &str) -> Result<Vec<PbDocument>, PbError> {
        let pbs = self.pbs.lock().unwrap();
        let mut matches: Vec<PbDocument> = pbs
            .values()
            .filter(|pb| pb.chart_id == chart_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(matches)
    }

    #[instrument(skip(self))]
    async fn all_for_user_game(
        &self,
        user_id: &str,
        game_key: GameKey,
    ) -> Result<Vec<PbDocument>, PbError> {
        let pbs = self.pbs.lock().unwrap();
        let mut matches: Vec<PbDocument> = pbs
            .values()
            .filter(|pb| pb.user_id == user_id && pb.game_key == game_key)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.chart_id.cmp(&b.chart_id));
        Ok(matches)
    }

    #[instrument(skip(self, pbs))]
    async fn bulk_upsert(&self, pbs: &[PbDocument]) -> Result<(), PbError> {
        if pbs.is_empty() {
            return Err(PbError::Repository(
                "Bulk upsert of zero documents".to_string(),
            ));
        }

        let mut store = self.pbs.lock().unwrap();
        for pb in pbs {
            store.insert((pb.user_id.clone(), pb.chart_id.clone()), pb.clone());
        }
        Ok(())
    }
}
