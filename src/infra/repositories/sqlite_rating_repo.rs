use crate::domain::{
    models::rating::{NewRating, Rating, RatingListing},
    ports::RatingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const LISTING_SELECT: &str =
    "SELECT r.*, u.username AS author, e.title AS event_title
     FROM ratings r
     JOIN users u ON u.id = r.user_id
     JOIN events e ON e.id = r.event_id";

pub struct SqliteRatingRepo {
    pool: SqlitePool,
}

impl SqliteRatingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for SqliteRatingRepo {
    async fn create(&self, rating: &NewRating) -> Result<Rating, AppError> {
        sqlx::query_as::<_, Rating>(
            "INSERT INTO ratings (user_id, event_id, title, text, rating, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(rating.user_id)
            .bind(rating.event_id)
            .bind(&rating.title)
            .bind(&rating.text)
            .bind(rating.rating)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Rating>, AppError> {
        sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<Option<Rating>, AppError> {
        sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE user_id = ? AND event_id = ? LIMIT 1")
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<RatingListing>, AppError> {
        sqlx::query_as::<_, RatingListing>(&format!(
            "{} WHERE r.user_id = ? ORDER BY r.created_at DESC, r.id DESC",
            LISTING_SELECT
        ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: i64) -> Result<Vec<RatingListing>, AppError> {
        sqlx::query_as::<_, RatingListing>(&format!(
            "{} WHERE r.event_id = ? ORDER BY r.created_at DESC, r.id DESC",
            LISTING_SELECT
        ))
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, rating: &Rating) -> Result<Rating, AppError> {
        sqlx::query_as::<_, Rating>("UPDATE ratings SET title = ?, text = ?, rating = ? WHERE id = ? RETURNING *")
            .bind(&rating.title)
            .bind(&rating.text)
            .bind(rating.rating)
            .bind(rating.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Calificación"));
        }
        Ok(())
    }

    async fn average_for_event(&self, event_id: i64) -> Result<f64, AppError> {
        let avg = sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(rating) FROM ratings WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(avg.unwrap_or(0.0))
    }
}
