use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const DEFAULT_LOCATION: &str = "Por definir";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
    pub location: String,
    pub organizer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at >= now
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
    pub location: String,
    pub organizer_id: i64,
}

/// Fields an organizer may change from the edit form. Empty strings keep the stored value.
#[derive(Debug, Clone)]
pub struct EventUpdate {
    pub title: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
    pub location: String,
}
