use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const COMMENT_TITLE_MAX: usize = 30;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Comment {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub event_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub title: String,
    pub text: String,
    pub user_id: i64,
    pub event_id: i64,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct CommentListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub author: String,
}
