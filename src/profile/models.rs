use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::games::{GameId, GameKey, Playtype};
use crate::score::CalculatedData;

/// One user's profile-scope state for one (game, playtype): the rating
/// map and the class map. Created on the first scored submission, updated
/// in place afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStats {
    pub user_id: String,
    pub game_key: GameKey,
    /// Algorithm name → scalar (or null when the algorithm ran but the
    /// candidates didn't support a value).
    pub ratings: CalculatedData,
    /// Class-set name → current label.
    pub classes: BTreeMap<String, String>,
}

impl ProfileStats {
    pub fn new(user_id: &str, game_key: GameKey) -> Self {
        Self {
            user_id: user_id.to_string(),
            game_key,
            ratings: CalculatedData::new(),
            classes: BTreeMap::new(),
        }
    }
}

/// An accepted class transition. Ephemeral: logged as an achievement and
/// forwarded to hooks, never stored as a primary entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDelta {
    pub user_id: String,
    pub game: GameId,
    pub playtype: Playtype,
    pub set: String,
    /// `None` on a user's first classification in this set.
    pub old: Option<String>,
    pub new: String,
}

/// Append-only achievement record, one per accepted class delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementEntry {
    pub id: String,
    pub user_id: String,
    pub game_key: GameKey,
    pub body: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AchievementEntry {
    pub fn for_class_delta(delta: &ClassDelta) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: delta.user_id.clone(),
            game_key: GameKey::new(delta.game, delta.playtype),
            body: serde_json::json!({
                "type": "classAchieved",
                "set": delta.set,
                "old": delta.old,
                "new": delta.new,
            }),
            created_at: Utc::now(),
        }
    }
}
