use crate::domain::{
    models::notification::{NewNotification, Notification, NotificationListing},
    ports::NotificationRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};

const LISTING_SELECT: &str =
    "SELECT n.*, e.title AS event_title, u.username AS recipient
     FROM notifications n
     LEFT JOIN events e ON e.id = n.event_id
     LEFT JOIN users u ON u.id = n.user_id";

/// Addressed to the user, or global on an event the user holds a ticket for.
const VISIBLE_TO_USER: &str =
    "(n.user_id = ? OR (n.user_id IS NULL AND n.event_id IN (SELECT event_id FROM tickets WHERE user_id = ?)))";

/// Shared with the event repository so an event edit and its notice commit together.
pub(crate) async fn insert_notification<'e, E>(executor: E, notification: &NewNotification) -> Result<Notification, AppError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Notification>(
        r#"INSERT INTO notifications (title, message, created_at, priority, is_read, event_id, user_id)
           VALUES (?, ?, ?, ?, 0, ?, ?)
           RETURNING *"#
    )
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(Utc::now())
        .bind(notification.priority)
        .bind(notification.event_id)
        .bind(notification.user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::Database)
}

pub struct SqliteNotificationRepo {
    pool: SqlitePool,
}

impl SqliteNotificationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepo {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError> {
        insert_notification(&self.pool, notification).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<NotificationListing>, AppError> {
        sqlx::query_as::<_, NotificationListing>(&format!("{} ORDER BY n.created_at DESC, n.id DESC", LISTING_SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<NotificationListing>, AppError> {
        sqlx::query_as::<_, NotificationListing>(&format!(
            "{} WHERE {} ORDER BY n.created_at DESC, n.id DESC",
            LISTING_SELECT, VISIBLE_TO_USER
        ))
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn is_visible_to(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM notifications n WHERE n.id = ? AND {})",
            VISIBLE_TO_USER
        ))
            .bind(id)
            .bind(user_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_read(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notificación"));
        }
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            r#"UPDATE notifications SET title = ?, message = ?, priority = ?, event_id = ?, user_id = ?
               WHERE id = ?
               RETURNING *"#
        )
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.priority)
            .bind(notification.event_id)
            .bind(notification.user_id)
            .bind(notification.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notificación"));
        }
        Ok(())
    }
}
