use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::errors::SessionError;
use super::models::Session;
use crate::games::GameKey;

/// Trait for session store operations
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<(), SessionError>;

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, SessionError>;

    async fn update_session(&self, session: &Session) -> Result<(), SessionError>;

    /// Sessions for (user, game, playtype) whose `[time_started,
    /// time_ended]` range intersects `[window_start, window_end]`, ordered
    /// by `time_started` ascending. Callers pad the window themselves.
    async fn find_in_window(
        &self,
        user_id: &str,
        game_key: GameKey,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Session>, SessionError>;
}

/// In-memory implementation of SessionRepository for development and
/// testing. Data is lost when the process exits.
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, Session>>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &Session) -> Result<(), SessionError> {
        debug!(session_id = %session.id, user_id = %session.user_id, "Creating session in memory");

        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.id) {
            warn!(session_id = %session.id, "Session already exists in memory");
            return Err(SessionError::Repository(
                "Session already exists".to_string(),
            ));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.get(session_id).cloned())
    }

    #[instrument(skip(self, session))]
    async fn update_session(&self, session: &Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        if !sessions.contains_key(&session.id) {
            warn!(session_id = %session.id, "Session not found for update in memory");
            return Err(SessionError::NotFound(session.id.clone()));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_in_window(
        &self,
        user_id: &str,
        game_key: GameKey,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Session>, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        let mut matches: Vec<Session> = sessions
            .values()
            .filter(|s| {
                s.user_id == user_id
                    && s.game_key == game_key
                    && s.overlaps(window_start, window_end)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|s| s.time_started);

        debug!(
            user_id = %user_id,
            game = %game_key,
            matches = matches.len(),
            "Session window query"
        );
        Ok(matches)
    }
}
