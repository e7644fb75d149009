pub mod bus;
pub mod events;
pub mod hook;

pub use bus::UserEventBus;
pub use events::UserEvent;
pub use hook::{ClassDeltaHook, HookError};
