use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const RATING_TITLE_MAX: usize = 30;
pub const RATING_TEXT_MAX: usize = 250;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub title: String,
    pub text: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub user_id: i64,
    pub event_id: i64,
    pub title: String,
    pub text: String,
    pub rating: i64,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RatingListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub rating: Rating,
    pub author: String,
    pub event_title: String,
}
