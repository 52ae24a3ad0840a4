use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(()),
        }
    }
}

/// A notification with `user_id = None` is global: every ticket holder of
/// `event_id` sees it.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
    pub is_read: bool,
    pub event_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl Notification {
    pub fn is_global(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub event_id: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct NotificationListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub notification: Notification,
    pub event_title: Option<String>,
    pub recipient: Option<String>,
}
