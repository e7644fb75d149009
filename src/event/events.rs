use serde::{Deserialize, Serialize};

use crate::profile::models::ClassDelta;

/// Events this core emits about a user.
///
/// Events represent facts about things that have already happened; the
/// subscribers (webhook forwarders, feeds) live outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserEvent {
    /// A class transition was accepted during a profile recompute.
    ClassDeltaAchieved { delta: ClassDelta },
}
