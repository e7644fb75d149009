mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::ProfileError;
pub use models::{AchievementEntry, ClassDelta, ProfileStats};
pub use repository::{
    AchievementLogRepository, InMemoryAchievementLog, InMemoryProfileRepository,
    ProfileRepository,
};
pub use service::{ProfileService, ProfileUpdate};
