use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::games::GameKey;
use crate::score::CalculatedData;

/// A time-bounded cluster of one user's submissions for one (game,
/// playtype). Bounds always equal the min/max achieved-at of the
/// contained submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub game_key: GameKey,
    /// Generated display name; users rename these later.
    pub name: String,
    /// Ascending by achieved-at.
    pub submission_ids: Vec<String>,
    pub time_started: DateTime<Utc>,
    pub time_ended: DateTime<Utc>,
    pub calculated_data: CalculatedData,
    pub highlight: bool,
}

impl Session {
    pub fn new(
        user_id: &str,
        game_key: GameKey,
        name: String,
        submission_ids: Vec<String>,
        time_started: DateTime<Utc>,
        time_ended: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_key,
            name,
            submission_ids,
            time_started,
            time_ended,
            calculated_data: CalculatedData::new(),
            highlight: false,
        }
    }

    /// Whether this session's `[time_started, time_ended]` range
    /// intersects the given (already padded) window.
    pub fn overlaps(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> bool {
        self.time_started <= window_end && self.time_ended >= window_start
    }
}

/// What happened to one clustered group of submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcomeKind {
    Created,
    Appended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: String,
    pub kind: SessionOutcomeKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{GameId, Playtype};
    use chrono::{Duration, TimeZone};

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(minutes * 60 * 1000).unwrap()
    }

    fn session(start_min: i64, end_min: i64) -> Session {
        Session::new(
            "user-1",
            GameKey::new(GameId::Iidx, Playtype::Single),
            "brave-lemming".to_string(),
            vec![],
            ts(start_min),
            ts(end_min),
        )
    }

    #[test]
    fn overlap_check_is_inclusive_of_touching_bounds() {
        let existing = session(300, 400);
        let window = Duration::hours(2);

        // a group ending an hour before the session starts, padded by the
        // merge window, reaches the session
        assert!(existing.overlaps(ts(200) - window, ts(240) + window));
        // likewise for a group starting an hour after the session ends
        assert!(existing.overlaps(ts(460) - window, ts(500) + window));
        // five hours clear of the session stays out of reach
        assert!(!existing.overlaps(ts(700) - window, ts(800) + window));
    }
}
