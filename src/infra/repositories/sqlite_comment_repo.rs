use crate::domain::{
    models::comment::{Comment, CommentListing, NewComment},
    ports::CommentRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteCommentRepo {
    pool: SqlitePool,
}

impl SqliteCommentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepo {
    async fn create(&self, comment: &NewComment) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (title, text, created_at, user_id, event_id) VALUES (?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&comment.title)
            .bind(&comment.text)
            .bind(Utc::now())
            .bind(comment.user_id)
            .bind(comment.event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: i64) -> Result<Vec<CommentListing>, AppError> {
        sqlx::query_as::<_, CommentListing>(
            "SELECT c.*, u.username AS author
             FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.event_id = ?
             ORDER BY c.created_at DESC, c.id DESC"
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>("UPDATE comments SET title = ?, text = ? WHERE id = ? RETURNING *")
            .bind(&comment.title)
            .bind(&comment.text)
            .bind(comment.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Comentario"));
        }
        Ok(())
    }
}
