use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::games::GameKey;
use crate::score::{CalculatedData, ScoreData, Submission};

/// One audit-trail entry: which submission fed which slot of the composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub name: String,
    pub submission_id: String,
}

/// Chart-wide standing, filled by the ranking pass, not by composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankData {
    pub rank: u32,
    pub out_of: u32,
    pub rival_rank: Option<u32>,
}

/// The canonical best-record for one (user, chart), composed from possibly
/// many submissions. Always fully recomputed, never incrementally patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PbDocument {
    pub user_id: String,
    pub chart_id: String,
    pub game_key: GameKey,
    pub score_data: ScoreData,
    pub calculated_data: CalculatedData,
    pub time_achieved: Option<DateTime<Utc>>,
    pub highlight: bool,
    /// First entry is always the default-metric seed. No submission ID
    /// appears twice, even when one submission wins several merge slots.
    pub composed_from: Vec<ProvenanceEntry>,
    pub rank_data: Option<RankData>,
}

impl PbDocument {
    /// Seeds a composite from the submission that won the default metric.
    pub fn seeded_from(seed: &Submission, seed_name: &str) -> Self {
        Self {
            user_id: seed.user_id.clone(),
            chart_id: seed.chart_id.clone(),
            game_key: seed.game_key,
            score_data: seed.score_data.clone(),
            calculated_data: seed.calculated_data.clone(),
            time_achieved: seed.time_achieved,
            highlight: seed.highlight,
            composed_from: vec![ProvenanceEntry {
                name: seed_name.to_string(),
                submission_id: seed.id.clone(),
            }],
            rank_data: None,
        }
    }

    pub fn references_submission(&self, submission_id: &str) -> bool {
        self.composed_from
            .iter()
            .any(|entry| entry.submission_id == submission_id)
    }

    /// Records provenance for a merge slot, deduplicating by submission
    /// identity: a donor that already contributed is not listed again.
    pub fn record_provenance(&mut self, name: &str, submission_id: &str) {
        if self.references_submission(submission_id) {
            return;
        }
        self.composed_from.push(ProvenanceEntry {
            name: name.to_string(),
            submission_id: submission_id.to_string(),
        });
    }

    /// Folds a donor submission's non-metric contributions into the
    /// composite: highlight is sticky, and the composite's timestamp
    /// advances to the most recent contributing play.
    pub fn absorb_donor(&mut self, donor: &Submission) {
        if donor.highlight {
            self.highlight = true;
        }
        match (self.time_achieved, donor.time_achieved) {
            (Some(current), Some(donated)) if donated > current => {
                self.time_achieved = Some(donated);
            }
            (None, Some(donated)) => self.time_achieved = Some(donated),
            _ => {}
        }
    }
}
