use crate::domain::{
    models::refund::{NewRefundRequest, RefundListing, RefundRequest, RefundStatus},
    ports::RefundRepository,
};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

const LISTING_SELECT: &str =
    "SELECT r.*, u.username AS requester
     FROM refund_requests r
     JOIN users u ON u.id = r.user_id";

pub struct SqliteRefundRepo {
    pool: SqlitePool,
}

impl SqliteRefundRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefundRepository for SqliteRefundRepo {
    async fn create_if_none_pending(&self, request: &NewRefundRequest) -> Result<Option<RefundRequest>, AppError> {
        let inserted = sqlx::query_as::<_, RefundRequest>(
            r#"INSERT INTO refund_requests (ticket_code, reason, approved, approval_date, created_at, user_id, status)
               SELECT ?, ?, 0, NULL, ?, ?, 'pendiente'
               WHERE NOT EXISTS (SELECT 1 FROM refund_requests WHERE user_id = ? AND status = 'pendiente')
               RETURNING *"#
        )
            .bind(request.ticket_code)
            .bind(&request.reason)
            .bind(Utc::now())
            .bind(request.user_id)
            .bind(request.user_id)
            .fetch_optional(&self.pool)
            .await;

        match inserted {
            Ok(row) => Ok(row),
            // The partial unique index caught a concurrent insert.
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn has_pending(&self, user_id: i64) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM refund_requests WHERE user_id = ? AND status = 'pendiente')"
        )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RefundRequest>, AppError> {
        sqlx::query_as::<_, RefundRequest>("SELECT * FROM refund_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<RefundListing>, AppError> {
        sqlx::query_as::<_, RefundListing>(&format!("{} ORDER BY r.created_at DESC, r.id DESC", LISTING_SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<RefundListing>, AppError> {
        sqlx::query_as::<_, RefundListing>(&format!(
            "{} WHERE r.user_id = ? ORDER BY r.created_at DESC, r.id DESC",
            LISTING_SELECT
        ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, request: &RefundRequest) -> Result<RefundRequest, AppError> {
        sqlx::query_as::<_, RefundRequest>(
            "UPDATE refund_requests SET ticket_code = ?, reason = ?
             WHERE id = ? AND status = 'pendiente'
             RETURNING *"
        )
            .bind(request.ticket_code)
            .bind(&request.reason)
            .bind(request.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::Conflict("La solicitud ya fue resuelta.".to_string()))
    }

    async fn decide(&self, id: i64, status: RefundStatus, approval_date: NaiveDate) -> Result<Option<RefundRequest>, AppError> {
        sqlx::query_as::<_, RefundRequest>(
            "UPDATE refund_requests SET status = ?, approved = ?, approval_date = ?
             WHERE id = ? AND status = 'pendiente'
             RETURNING *"
        )
            .bind(status)
            .bind(status == RefundStatus::Aprobado)
            .bind(approval_date)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM refund_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Solicitud de reembolso"));
        }
        Ok(())
    }
}
