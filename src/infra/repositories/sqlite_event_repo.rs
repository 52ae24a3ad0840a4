use crate::domain::{
    models::{
        event::{Event, NewEvent},
        notification::{NewNotification, Notification},
    },
    ports::EventRepository,
};
use crate::error::AppError;
use crate::infra::repositories::sqlite_notification_repo::insert_notification;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &NewEvent) -> Result<Event, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (title, description, scheduled_at, location, organizer_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.scheduled_at)
            .bind(&event.location)
            .bind(event.organizer_id)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE scheduled_at >= ? ORDER BY scheduled_at ASC")
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY scheduled_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &Event, notification: Option<&NewNotification>) -> Result<(Event, Option<Notification>), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let saved = sqlx::query_as::<_, Event>(
            r#"UPDATE events SET title = ?, description = ?, scheduled_at = ?, location = ?, updated_at = ?
               WHERE id = ?
               RETURNING *"#
        )
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.scheduled_at)
            .bind(&event.location)
            .bind(event.updated_at)
            .bind(event.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::not_found("Evento"))?;

        let created = match notification {
            Some(n) => Some(insert_notification(&mut *tx, n).await?),
            None => None,
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok((saved, created))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Evento"));
        }
        Ok(())
    }
}
