use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::errors::ProfileError;
use super::models::{AchievementEntry, ClassDelta, ProfileStats};
use super::repository::{AchievementLogRepository, ProfileRepository};
use crate::capability::{CapabilityTable, ClassKind, ClassSet, ProfileContext};
use crate::chart::ChartRepository;
use crate::event::{ClassDeltaHook, UserEvent, UserEventBus};
use crate::games::GameKey;
use crate::pb::{PbDocument, PbRepository};
use crate::score::CalculatedData;

/// Result of one profile recompute.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub stats: ProfileStats,
    pub deltas: Vec<ClassDelta>,
}

/// Recomputes profile-scope ratings and classes from a user's PBs.
pub struct ProfileService {
    capabilities: Arc<CapabilityTable>,
    pbs: Arc<dyn PbRepository>,
    charts: Arc<dyn ChartRepository>,
    profiles: Arc<dyn ProfileRepository>,
    achievements: Arc<dyn AchievementLogRepository>,
    event_bus: UserEventBus,
    delta_hooks: Vec<Arc<dyn ClassDeltaHook>>,
}

impl ProfileService {
    pub fn builder(
        capabilities: Arc<CapabilityTable>,
        pbs: Arc<dyn PbRepository>,
        charts: Arc<dyn ChartRepository>,
        profiles: Arc<dyn ProfileRepository>,
        achievements: Arc<dyn AchievementLogRepository>,
    ) -> ProfileServiceBuilder {
        ProfileServiceBuilder {
            capabilities,
            pbs,
            charts,
            profiles,
            achievements,
            event_bus: None,
            delta_hooks: Vec::new(),
        }
    }

    /// Recomputes ratings, re-derives classes under the monotonicity
    /// policy, persists the merged document, and fans accepted deltas out
    /// to the achievement log, the event bus and any registered hooks.
    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        game_key: GameKey,
    ) -> Result<ProfileUpdate, ProfileError> {
        let caps = self.capabilities.get(game_key)?;
        let pbs = self.pbs.all_for_user_game(user_id, game_key).await?;

        let ratings = self
            .calculate_ratings(&caps.profile_algorithms, user_id, game_key, &pbs)
            .await;

        let mut stats = self
            .profiles
            .get(user_id, game_key)
            .await?
            .unwrap_or_else(|| ProfileStats::new(user_id, game_key));

        let deltas = derive_classes(&caps.class_sets, user_id, game_key, &ratings, &mut stats.classes);
        stats.ratings = ratings;

        self.profiles.upsert(&stats).await?;

        for delta in &deltas {
            self.achievements
                .append(&AchievementEntry::for_class_delta(delta))
                .await?;

            self.event_bus
                .emit_to_user(
                    user_id,
                    UserEvent::ClassDeltaAchieved {
                        delta: delta.clone(),
                    },
                )
                .await;

            for hook in &self.delta_hooks {
                if let Err(error) = hook.on_class_delta(delta).await {
                    warn!(hook = hook.hook_name(), %error, "Class delta hook failed");
                }
            }
        }

        info!(
            user_id = %user_id,
            game = %game_key,
            ratings = stats.ratings.len(),
            deltas = deltas.len(),
            "Profile recomputed"
        );

        Ok(ProfileUpdate { stats, deltas })
    }

    /// Runs every profile algorithm concurrently: each one writes a
    /// disjoint ratings key and reads only from the PB/chart stores, so
    /// there is nothing to serialize. A failing algorithm is logged and
    /// its key left absent.
    async fn calculate_ratings(
        &self,
        algorithms: &[Arc<dyn crate::capability::ProfileRatingAlgorithm>],
        user_id: &str,
        game_key: GameKey,
        pbs: &[PbDocument],
    ) -> CalculatedData {
        let ctx = ProfileContext {
            user_id,
            game_key,
            pbs,
            charts: self.charts.as_ref(),
        };

        let ctx = &ctx;
        let results = join_all(algorithms.iter().map(|algorithm| async move {
            (algorithm.name(), algorithm.calculate(ctx).await)
        }))
        .await;

        let mut ratings = CalculatedData::new();
        for (name, result) in results {
            match result {
                Ok(value) => {
                    ratings.insert(name.to_string(), value);
                }
                Err(error) => {
                    warn!(
                        algorithm = name,
                        %error,
                        "Profile algorithm failed; leaving key absent"
                    );
                }
            }
        }
        ratings
    }
}

/// Applies every class-set deriver to fresh ratings and merges the results
/// into `classes` under the per-set policy:
///
/// - deriver yields nothing → previous label kept, no delta;
/// - no previous label → accepted unconditionally;
/// - derived sets → accepted unconditionally, delta only on change;
/// - provided sets → accepted only on a strictly higher ordinal rank,
///   silently kept otherwise.
pub(crate) fn derive_classes(
    class_sets: &[ClassSet],
    user_id: &str,
    game_key: GameKey,
    ratings: &CalculatedData,
    classes: &mut BTreeMap<String, String>,
) -> Vec<ClassDelta> {
    let mut deltas = Vec::new();

    for set in class_sets {
        let new_label = match set.deriver.derive(ratings) {
            Ok(Some(label)) => label,
            Ok(None) => continue,
            Err(error) => {
                warn!(set = set.name, %error, "Class deriver failed; keeping previous value");
                continue;
            }
        };

        let old_label = classes.get(set.name).cloned();

        let accepted = match (&old_label, set.kind) {
            (None, _) => true,
            (Some(_), ClassKind::Derived) => true,
            (Some(old), ClassKind::Provided) => {
                match (set.ordinal_of(old), set.ordinal_of(new_label)) {
                    (Some(old_rank), Some(new_rank)) => new_rank > old_rank,
                    _ => {
                        warn!(
                            set = set.name,
                            old = %old,
                            new = %new_label,
                            "Label outside the set ordering; keeping previous value"
                        );
                        false
                    }
                }
            }
        };

        if !accepted {
            debug!(
                set = set.name,
                new = %new_label,
                "Provided class not an upgrade; keeping previous value"
            );
            continue;
        }

        classes.insert(set.name.to_string(), new_label.to_string());

        let changed = old_label.as_deref() != Some(new_label);
        if changed {
            deltas.push(ClassDelta {
                user_id: user_id.to_string(),
                game: game_key.game,
                playtype: game_key.playtype,
                set: set.name.to_string(),
                old: old_label,
                new: new_label.to_string(),
            });
        }
    }

    deltas
}

pub struct ProfileServiceBuilder {
    capabilities: Arc<CapabilityTable>,
    pbs: Arc<dyn PbRepository>,
    charts: Arc<dyn ChartRepository>,
    profiles: Arc<dyn ProfileRepository>,
    achievements: Arc<dyn AchievementLogRepository>,
    event_bus: Option<UserEventBus>,
    delta_hooks: Vec<Arc<dyn ClassDeltaHook>>,
}

impl ProfileServiceBuilder {
    pub fn with_event_bus(mut self, event_bus: UserEventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_delta_hook(mut self, hook: Arc<dyn ClassDeltaHook>) -> Self {
        self.delta_hooks.push(hook);
        self
    }

    pub fn build(self) -> ProfileService {
        ProfileService {
            capabilities: self.capabilities,
            pbs: self.pbs,
            charts: self.charts,
            profiles: self.profiles,
            achievements: self.achievements,
            event_bus: self.event_bus.unwrap_or_default(),
            delta_hooks: self.delta_hooks,
        }
    }
}
