use crate::domain::{
    models::ticket::{NewTicket, Ticket, TicketListing},
    ports::TicketRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

const LISTING_SELECT: &str =
    "SELECT t.*, e.title AS event_title, u.username AS holder
     FROM tickets t
     JOIN events e ON e.id = t.event_id
     JOIN users u ON u.id = t.user_id";

pub struct SqliteTicketRepo {
    pool: SqlitePool,
}

impl SqliteTicketRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepo {
    async fn create_within_cap(&self, ticket: &NewTicket, cap: i64) -> Result<Option<Ticket>, AppError> {
        // The holder's running total is read and written by the same statement.
        sqlx::query_as::<_, Ticket>(
            r#"INSERT INTO tickets (user_id, event_id, quantity, ticket_type, buy_date)
               SELECT ?, ?, ?, ?, ?
               WHERE (SELECT COALESCE(SUM(quantity), 0) FROM tickets WHERE user_id = ? AND event_id = ?) + ? <= ?
               RETURNING *"#
        )
            .bind(ticket.user_id)
            .bind(ticket.event_id)
            .bind(ticket.quantity)
            .bind(ticket.ticket_type)
            .bind(ticket.buy_date)
            .bind(ticket.user_id)
            .bind(ticket.event_id)
            .bind(ticket.quantity)
            .bind(cap)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_within_cap(&self, ticket: &Ticket, cap: i64) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>(
            r#"UPDATE tickets SET quantity = ?, ticket_type = ?
               WHERE ticket_code = ?
                 AND (SELECT COALESCE(SUM(quantity), 0) FROM tickets
                      WHERE user_id = ? AND event_id = ? AND ticket_code != ?) + ? <= ?
               RETURNING *"#
        )
            .bind(ticket.quantity)
            .bind(ticket.ticket_type)
            .bind(ticket.ticket_code)
            .bind(ticket.user_id)
            .bind(ticket.event_id)
            .bind(ticket.ticket_code)
            .bind(ticket.quantity)
            .bind(cap)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn quantity_held(&self, user_id: i64, event_id: i64, excluding: Option<i64>) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0) FROM tickets
             WHERE user_id = ? AND event_id = ? AND (? IS NULL OR ticket_code != ?)"
        )
            .bind(user_id)
            .bind(event_id)
            .bind(excluding)
            .bind(excluding)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_code(&self, ticket_code: i64) -> Result<Option<Ticket>, AppError> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE ticket_code = ?")
            .bind(ticket_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_holder(&self, user_id: i64, event_id: i64) -> Result<Vec<TicketListing>, AppError> {
        sqlx::query_as::<_, TicketListing>(&format!(
            "{} WHERE t.user_id = ? AND t.event_id = ? ORDER BY t.buy_date ASC",
            LISTING_SELECT
        ))
            .bind(user_id)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: i64) -> Result<Vec<TicketListing>, AppError> {
        sqlx::query_as::<_, TicketListing>(&format!(
            "{} WHERE t.event_id = ? ORDER BY t.buy_date ASC",
            LISTING_SELECT
        ))
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn exists_for_event(&self, event_id: i64) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tickets WHERE event_id = ?)")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, ticket_code: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tickets WHERE ticket_code = ?")
            .bind(ticket_code)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Ticket"));
        }
        Ok(())
    }
}
