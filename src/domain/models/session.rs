use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Server-side login session. Only the SHA-256 of the cookie token is kept.
#[derive(Debug, FromRow, Clone)]
pub struct Session {
    pub token_hash: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
