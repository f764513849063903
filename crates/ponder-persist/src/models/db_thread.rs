use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ThreadId = String;

/// A named conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed whenever a message is added; never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}
