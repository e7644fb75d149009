use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::models::{Session, SessionOutcome, SessionOutcomeKind};
use super::naming::SessionNameGenerator;
use super::repository::SessionRepository;
use super::SessionError;
use crate::capability::CapabilityTable;
use crate::games::GameKey;
use crate::score::{Submission, SubmissionRepository};

/// Two timestamps closer than this belong to the same play session, and an
/// existing session within this distance of a group absorbs it.
const SESSION_MERGE_WINDOW_HOURS: i64 = 2;

pub fn session_merge_window() -> Duration {
    Duration::hours(SESSION_MERGE_WINDOW_HOURS)
}

/// Clusters timestamped submissions into sessions.
///
/// Groups for one user are processed sequentially: two groups clustered
/// concurrently could both see "no nearby session" and create a false
/// split. There is no cross-process lock behind this; near-simultaneous
/// imports for one user can still race, which the store model tolerates.
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    capabilities: Arc<CapabilityTable>,
    name_generator: Arc<dyn SessionNameGenerator>,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        capabilities: Arc<CapabilityTable>,
        name_generator: Arc<dyn SessionNameGenerator>,
    ) -> Self {
        Self {
            repository,
            submissions,
            capabilities,
            name_generator,
        }
    }

    /// Clusters a batch of submissions (any order, any mix of timestamped
    /// and untimestamped) into session create/append operations. Returns
    /// one outcome per contiguous time group processed.
    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    pub async fn cluster_submissions(
        &self,
        user_id: &str,
        game_key: GameKey,
        batch: &[Submission],
    ) -> Result<Vec<SessionOutcome>, SessionError> {
        let mut timestamped: Vec<(DateTime<Utc>, Submission)> = batch
            .iter()
            .filter_map(|s| s.time_achieved.map(|at| (at, s.clone())))
            .collect();

        if timestamped.is_empty() {
            debug!(user_id = %user_id, "No timestamped submissions; nothing to cluster");
            return Ok(Vec::new());
        }

        timestamped.sort_by_key(|(at, _)| *at);

        let caps = self.capabilities.get(game_key)?;
        let window = session_merge_window();

        let mut outcomes = Vec::new();
        for group in partition_into_groups(timestamped, window) {
            let outcome = self
                .process_group(user_id, game_key, &caps, &group, window)
                .await?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn process_group(
        &self,
        user_id: &str,
        game_key: GameKey,
        caps: &crate::capability::GameCapabilities,
        group: &[(DateTime<Utc>, Submission)],
        window: chrono::Duration,
    ) -> Result<SessionOutcome, SessionError> {
        let group_start = group[0].0;
        let group_end = group[group.len() - 1].0;

        let nearby = self
            .repository
            .find_in_window(user_id, game_key, group_start - window, group_end + window)
            .await?;

        if nearby.len() > 1 {
            // more than one candidate is ambiguous; the first (earliest)
            // match wins, matching long-standing behavior
            debug!(
                user_id = %user_id,
                candidates = nearby.len(),
                "Multiple sessions within merge window; using the first"
            );
        }

        match nearby.into_iter().next() {
            Some(session) => self.append_group(session, caps, group).await,
            None => self.create_session(user_id, game_key, caps, group, group_start, group_end)
                .await,
        }
    }

    async fn append_group(
        &self,
        mut session: Session,
        caps: &crate::capability::GameCapabilities,
        group: &[(DateTime<Utc>, Submission)],
    ) -> Result<SessionOutcome, SessionError> {
        let group_start = group[0].0;
        let group_end = group[group.len() - 1].0;
        let group_ids: Vec<String> = group.iter().map(|(_, s)| s.id.clone()).collect();

        // keep submission IDs ascending by time relative to what is there
        if group_end <= session.time_started {
            let mut ids = group_ids;
            ids.extend(session.submission_ids.drain(..));
            session.submission_ids = ids;
        } else {
            session.submission_ids.extend(group_ids);
        }

        session.time_started = session.time_started.min(group_start);
        session.time_ended = session.time_ended.max(group_end);

        // ratings are recomputed over the full combined set, not patched
        let combined = self.submissions.get_many(&session.submission_ids).await?;
        session.calculated_data = caps.calculate_session_ratings(&combined);

        self.repository.update_session(&session).await?;

        info!(
            session_id = %session.id,
            appended = group.len(),
            total = session.submission_ids.len(),
            "Appended group to existing session"
        );

        Ok(SessionOutcome {
            session_id: session.id,
            kind: SessionOutcomeKind::Appended,
        })
    }

    async fn create_session(
        &self,
        user_id: &str,
        game_key: GameKey,
        caps: &crate::capability::GameCapabilities,
        group: &[(DateTime<Utc>, Submission)],
        group_start: DateTime<Utc>,
        group_end: DateTime<Utc>,
    ) -> Result<SessionOutcome, SessionError> {
        let submission_ids: Vec<String> = group.iter().map(|(_, s)| s.id.clone()).collect();
        let members: Vec<Submission> = group.iter().map(|(_, s)| s.clone()).collect();

        let mut session = Session::new(
            user_id,
            game_key,
            self.name_generator.generate().await,
            submission_ids,
            group_start,
            group_end,
        );
        session.calculated_data = caps.calculate_session_ratings(&members);

        self.repository.create_session(&session).await?;

        info!(
            session_id = %session.id,
            name = %session.name,
            submissions = group.len(),
            "Created new session"
        );

        Ok(SessionOutcome {
            session_id: session.id,
            kind: SessionOutcomeKind::Created,
        })
    }
}

/// Splits time-sorted submissions into contiguous runs: a gap of `window`
/// or more between consecutive timestamps starts a new group.
fn partition_into_groups(
    sorted: Vec<(DateTime<Utc>, Submission)>,
    window: chrono::Duration,
) -> Vec<Vec<(DateTime<Utc>, Submission)>> {
    let mut groups: Vec<Vec<(DateTime<Utc>, Submission)>> = Vec::new();

    for entry in sorted {
        match groups.last_mut() {
            Some(group) => {
                let last_at = group[group.len() - 1].0;
                if entry.0 - last_at < window {
                    group.push(entry);
                } else {
                    groups.push(vec![entry]);
                }
            }
            None => groups.push(vec![entry]),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{GameId, Playtype};
    use crate::score::{InMemorySubmissionRepository, MetricValue, ScoreData};
    use crate::session::repository::InMemorySessionRepository;
    use crate::session::PetNameSessionNameGenerator;
    use chrono::TimeZone;

    fn key() -> GameKey {
        GameKey::new(GameId::Iidx, Playtype::Single)
    }

    fn at_millis(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn submission(id: &str, time: Option<DateTime<Utc>>) -> Submission {
        let mut score_data = ScoreData::new();
        score_data.set("percent", MetricValue::Decimal(80.0));

        Submission {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            chart_id: "chart-1".to_string(),
            game_key: key(),
            time_achieved: time,
            score_data,
            calculated_data: Default::default(),
            highlight: false,
        }
    }

    struct Setup {
        service: SessionService,
        sessions: Arc<InMemorySessionRepository>,
        submissions: Arc<InMemorySubmissionRepository>,
    }

    fn setup(batch: &[Submission]) -> Setup {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let submissions = Arc::new(InMemorySubmissionRepository::with_submissions(
            batch.to_vec(),
        ));
        let service = SessionService::new(
            sessions.clone(),
            submissions.clone(),
            Arc::new(CapabilityTable::standard()),
            Arc::new(PetNameSessionNameGenerator::new()),
        );
        Setup {
            service,
            sessions,
            submissions,
        }
    }

    #[tokio::test]
    async fn ninety_minutes_apart_is_one_session() {
        let base = 1_700_000_000_000_i64;
        let batch = vec![
            submission("a", Some(at_millis(base))),
            submission("b", Some(at_millis(base + 90 * 60 * 1000))),
        ];
        let setup = setup(&batch);

        let outcomes = setup
            .service
            .cluster_submissions("user-1", key(), &batch)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind, SessionOutcomeKind::Created);
        assert_eq!(setup.sessions.session_count(), 1);
    }

    #[tokio::test]
    async fn three_hours_apart_is_two_sessions() {
        let base = 1_700_000_000_000_i64;
        let batch = vec![
            submission("a", Some(at_millis(base))),
            submission("b", Some(at_millis(base + 3 * 60 * 60 * 1000))),
        ];
        let setup = setup(&batch);

        let outcomes = setup
            .service
            .cluster_submissions("user-1", key(), &batch)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| o.kind == SessionOutcomeKind::Created));
        assert_eq!(setup.sessions.session_count(), 2);
    }

    #[tokio::test]
    async fn nearby_group_appends_to_existing_session() {
        let base = 1_700_000_000_000_i64;
        let first = vec![submission("a", Some(at_millis(base)))];
        let setup = setup(&first);

        let created = setup
            .service
            .cluster_submissions("user-1", key(), &first)
            .await
            .unwrap();
        let session_id = created[0].session_id.clone();

        // one hour after the existing bound: inside the merge window
        let later = submission("b", Some(at_millis(base + 60 * 60 * 1000)));
        setup.submissions.insert(&later).await.unwrap();

        let outcomes = setup
            .service
            .cluster_submissions("user-1", key(), &[later])
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind, SessionOutcomeKind::Appended);
        assert_eq!(outcomes[0].session_id, session_id);
        assert_eq!(setup.sessions.session_count(), 1);

        let session = setup
            .sessions
            .get_session(&session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.submission_ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn distant_group_creates_a_second_session() {
        let base = 1_700_000_000_000_i64;
        let first = vec![submission("a", Some(at_millis(base)))];
        let setup = setup(&first);

        setup
            .service
            .cluster_submissions("user-1", key(), &first)
            .await
            .unwrap();

        let far = submission("b", Some(at_millis(base + 5 * 60 * 60 * 1000)));
        setup.submissions.insert(&far).await.unwrap();

        let outcomes = setup
            .service
            .cluster_submissions("user-1", key(), &[far])
            .await
            .unwrap();

        assert_eq!(outcomes[0].kind, SessionOutcomeKind::Created);
        assert_eq!(setup.sessions.session_count(), 2);
    }

    #[tokio::test]
    async fn earlier_group_prepends_and_widens_bounds() {
        let base = 1_700_000_000_000_i64;
        let first = vec![submission("late", Some(at_millis(base)))];
        let setup = setup(&first);

        let created = setup
            .service
            .cluster_submissions("user-1", key(), &first)
            .await
            .unwrap();

        let earlier = submission("early", Some(at_millis(base - 30 * 60 * 1000)));
        setup.submissions.insert(&earlier).await.unwrap();

        setup
            .service
            .cluster_submissions("user-1", key(), &[earlier])
            .await
            .unwrap();

        let session = setup
            .sessions
            .get_session(&created[0].session_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.submission_ids, vec!["early", "late"]);
        assert_eq!(session.time_started, at_millis(base - 30 * 60 * 1000));
        assert_eq!(session.time_ended, at_millis(base));
    }

    #[tokio::test]
    async fn session_bounds_match_member_extremes() {
        let base = 1_700_000_000_000_i64;
        let batch = vec![
            submission("b", Some(at_millis(base + 40 * 60 * 1000))),
            submission("a", Some(at_millis(base))),
            submission("c", Some(at_millis(base + 100 * 60 * 1000))),
        ];
        let setup = setup(&batch);

        let outcomes = setup
            .service
            .cluster_submissions("user-1", key(), &batch)
            .await
            .unwrap();

        let session = setup
            .sessions
            .get_session(&outcomes[0].session_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.time_started, at_millis(base));
        assert_eq!(session.time_ended, at_millis(base + 100 * 60 * 1000));
        assert_eq!(session.submission_ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn untimestamped_submissions_never_cluster() {
        let batch = vec![submission("a", None), submission("b", None)];
        let setup = setup(&batch);

        let outcomes = setup
            .service
            .cluster_submissions("user-1", key(), &batch)
            .await
            .unwrap();

        assert!(outcomes.is_empty());
        assert_eq!(setup.sessions.session_count(), 0);
    }

    #[tokio::test]
    async fn session_ratings_recompute_over_combined_set() {
        let base = 1_700_000_000_000_i64;
        let mut batch = Vec::new();
        for i in 0..10_i64 {
            let mut s = submission(
                &format!("s{i:02}"),
                Some(at_millis(base + i * 60 * 1000)),
            );
            s.calculated_data
                .insert("ktRating".to_string(), Some(10.0 + i as f64));
            batch.push(s);
        }
        let setup = setup(&batch);

        let outcomes = setup
            .service
            .cluster_submissions("user-1", key(), &batch)
            .await
            .unwrap();

        let session = setup
            .sessions
            .get_session(&outcomes[0].session_id)
            .await
            .unwrap()
            .unwrap();

        // average of 10.0..=19.0
        assert_eq!(session.calculated_data.get("ktRating"), Some(&Some(14.5)));
    }
}
