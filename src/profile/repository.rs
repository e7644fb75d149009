use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use super::errors::ProfileError;
use super::models::{AchievementEntry, ProfileStats};
use crate::games::GameKey;

/// Trait for the profile stats document store, keyed by (user, game,
/// playtype).
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(
        &self,
        user_id: &str,
        game_key: GameKey,
    ) -> Result<Option<ProfileStats>, ProfileError>;

    async fn upsert(&self, stats: &ProfileStats) -> Result<(), ProfileError>;
}

/// Trait for the append-only achievement log
#[async_trait]
pub trait AchievementLogRepository: Send + Sync {
    async fn append(&self, entry: &AchievementEntry) -> Result<(), ProfileError>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AchievementEntry>, ProfileError>;
}

/// In-memory implementation of ProfileRepository for development and testing
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<(String, GameKey), ProfileStats>>,
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    #[instrument(skip(self))]
    async fn get(
        &self,
        user_id: &str,
        game_key: GameKey,
    ) -> Result<Option<ProfileStats>, ProfileError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.get(&(user_id.to_string(), game_key)).cloned())
    }

    #[instrument(skip(self, stats))]
    async fn upsert(&self, stats: &ProfileStats) -> Result<(), ProfileError> {
        debug!(user_id = %stats.user_id, game = %stats.game_key, "Upserting profile in memory");

        let mut profiles = self.profiles.lock().unwrap();
        profiles.insert((stats.user_id.clone(), stats.game_key), stats.clone());
        Ok(())
    }
}

/// In-memory implementation of AchievementLogRepository
pub struct InMemoryAchievementLog {
    entries: Mutex<Vec<AchievementEntry>>,
}

impl Default for InMemoryAchievementLog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAchievementLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl AchievementLogRepository for InMemoryAchievementLog {
    #[instrument(skip(self, entry))]
    async fn append(&self, entry: &AchievementEntry) -> Result<(), ProfileError> {
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AchievementEntry>, ProfileError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{GameId, Playtype};
    use crate::profile::models::ClassDelta;

    fn key() -> GameKey {
        GameKey::new(GameId::Jubeat, Playtype::Single)
    }

    #[tokio::test]
    async fn profile_upsert_round_trips() {
        let repo = InMemoryProfileRepository::new();
        let mut stats = ProfileStats::new("user-1", key());
        stats
            .ratings
            .insert("jubility".to_string(), Some(4200.0));

        repo.upsert(&stats).await.unwrap();

        let found = repo.get("user-1", key()).await.unwrap().unwrap();
        assert_eq!(found.ratings.get("jubility"), Some(&Some(4200.0)));
    }

    #[tokio::test]
    async fn missing_profile_is_none() {
        let repo = InMemoryProfileRepository::new();
        assert!(repo.get("user-1", key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn achievement_log_is_append_only_per_user() {
        let log = InMemoryAchievementLog::new();
        let delta = ClassDelta {
            user_id: "user-1".to_string(),
            game: GameId::Jubeat,
            playtype: Playtype::Single,
            set: "colour".to_string(),
            old: None,
            new: "GREEN".to_string(),
        };

        log.append(&AchievementEntry::for_class_delta(&delta))
            .await
            .unwrap();

        assert_eq!(log.entry_count(), 1);
        assert_eq!(log.list_for_user("user-1").await.unwrap().len(), 1);
        assert!(log.list_for_user("user-2").await.unwrap().is_empty());
    }
}
