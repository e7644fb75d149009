use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::errors::ScoreError;
use super::models::{MetricDirection, Submission};

/// Trait for the append-only submission store. This core reads it and never
/// writes back; `insert` exists for the ingestion side and for tests.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn insert(&self, submission: &Submission) -> Result<(), ScoreError>;

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Submission>, ScoreError>;

    /// All of a user's submissions on one chart, in no guaranteed order.
    async fn for_user_chart(
        &self,
        user_id: &str,
        chart_id: &str,
    ) -> Result<Vec<Submission>, ScoreError>;

    /// The user's best submission on a chart for one metric, per the given
    /// direction. Submissions missing the metric (or holding an enum value
    /// with no ordinal index) do not qualify. `None` means no submission
    /// qualifies. Ties keep the earliest-inserted qualifying submission.
    async fn best_by_metric(
        &self,
        user_id: &str,
        chart_id: &str,
        metric: &str,
        direction: MetricDirection,
    ) -> Result<Option<Submission>, ScoreError>;
}

/// In-memory implementation of SubmissionRepository for development and
/// testing. Data is lost when the process exits.
pub struct InMemorySubmissionRepository {
    submissions: Mutex<HashMap<String, Submission>>,
}

impl Default for InMemorySubmissionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self {
            submissions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_submissions(submissions: Vec<Submission>) -> Self {
        let mut map = HashMap::new();
        for submission in submissions {
            map.insert(submission.id.clone(), submission);
        }

        Self {
            submissions: Mutex::new(map),
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    fn sorted_for_user_chart(&self, user_id: &str, chart_id: &str) -> Vec<Submission> {
        let submissions = self.submissions.lock().unwrap();
        let mut matches: Vec<Submission> = submissions
            .values()
            .filter(|s| s.user_id == user_id && s.chart_id == chart_id)
            .cloned()
            .collect();
        // stable order so tie-breaking is deterministic
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    #[instrument(skip(self, submission))]
    async fn insert(&self, submission: &Submission) -> Result<(), ScoreError> {
        let mut submissions = self.submissions.lock().unwrap();
        if submissions.contains_key(&submission.id) {
            warn!(submission_id = %submission.id, "Submission already exists in memory");
            return Err(ScoreError::Repository(
                "Submission already exists".to_string(),
            ));
        }
        submissions.insert(submission.id.clone(), submission.clone());
        Ok(())
    }

    #[instrument(skip(self, ids))]
    async fn get_many(&self, ids: &[String]) -> Result<Vec<Submission>, ScoreError> {
        let submissions = self.submissions.lock().unwrap();
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            match submissions.get(id) {
                Some(submission) => found.push(submission.clone()),
                None => return Err(ScoreError::NotFound(id.clone())),
            }
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn for_user_chart(
        &self,
        user_id: &str,
        chart_id: &str,
    ) -> Result<Vec<Submission>, ScoreError> {
        Ok(self.sorted_for_user_chart(user_id, chart_id))
    }

    #[instrument(skip(self))]
    async fn best_by_metric(
        &self,
        user_id: &str,
        chart_id: &str,
        metric: &str,
        direction: MetricDirection,
    ) -> Result<Option<Submission>, ScoreError> {
        let candidates = self.sorted_for_user_chart(user_id, chart_id);

        let mut best: Option<(f64, Submission)> = None;
        for candidate in candidates {
            let Some(value) = candidate.score_data.comparable_value(metric) else {
                continue;
            };

            match &best {
                None => best = Some((value, candidate)),
                Some((best_value, _)) => {
                    let better = match direction {
                        MetricDirection::Maximize => value > *best_value,
                        MetricDirection::Minimize => value < *best_value,
                    };
                    if better {
                        best = Some((value, candidate));
                    }
                }
            }
        }

        if best.is_none() {
            debug!(
                user_id = %user_id,
                chart_id = %chart_id,
                metric = %metric,
                "No qualifying submission for metric"
            );
        }

        Ok(best.map(|(_, submission)| submission))
    }
}
