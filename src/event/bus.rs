use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::UserEvent;

/// Event bus for distributing user events throughout the application
#[derive(Debug, Clone, Default)]
pub struct UserEventBus {
    /// Per-user event channels: user_id -> sender
    user_channels: Arc<RwLock<HashMap<String, broadcast::Sender<UserEvent>>>>,
}

impl UserEventBus {
    pub fn new() -> Self {
        Self {
            user_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emits an event to all subscribers of a specific user
    pub async fn emit_to_user(&self, user_id: &str, event: UserEvent) {
        let user_channels = self.user_channels.read().await;

        if let Some(sender) = user_channels.get(user_id) {
            match sender.send(event) {
                Ok(receiver_count) => {
                    debug!(
                        user_id = %user_id,
                        receivers = receiver_count,
                        "User event emitted"
                    );
                }
                Err(_) => {
                    debug!(user_id = %user_id, "User event emitted with no receivers");
                }
            }
        } else {
            debug!(user_id = %user_id, "No user channel found - creating one");
            drop(user_channels);

            // Create user channel if it doesn't exist
            let mut user_channels = self.user_channels.write().await;
            let (sender, _) = broadcast::channel(100);
            user_channels.insert(user_id.to_string(), sender.clone());

            // Try to send again
            if sender.send(event).is_err() {
                debug!(user_id = %user_id, "User event sent to new channel with no receivers");
            }
        }
    }

    /// Subscribe to events for a specific user
    pub async fn subscribe_to_user(&self, user_id: &str) -> broadcast::Receiver<UserEvent> {
        let user_channels = self.user_channels.read().await;

        if let Some(sender) = user_channels.get(user_id) {
            sender.subscribe()
        } else {
            debug!(user_id = %user_id, "Creating new user channel for subscription");
            drop(user_channels);

            // Create user channel if it doesn't exist
            let mut user_channels = self.user_channels.write().await;
            let (sender, _) = broadcast::channel(100);
            let receiver = sender.subscribe();
            user_channels.insert(user_id.to_string(), sender);
            receiver
        }
    }
}
