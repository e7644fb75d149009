use async_trait::async_trait;
use thiserror::Error;

use crate::profile::models::ClassDelta;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Hook error: {0}")]
    Delivery(String),
}

/// Direct callback seam for class deltas, for callers that want more than
/// a broadcast subscription. A failing hook is logged and never blocks
/// the profile recompute that triggered it.
#[async_trait]
pub trait ClassDeltaHook: Send + Sync {
    async fn on_class_delta(&self, delta: &ClassDelta) -> Result<(), HookError>;

    fn hook_name(&self) -> &'static str;
}
