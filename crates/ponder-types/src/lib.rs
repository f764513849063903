pub mod config;
pub mod events;

pub use config::{ContextPolicy, SessionConfig, DEFAULT_MODEL};
pub use events::{StreamEvent, TurnStatus};
