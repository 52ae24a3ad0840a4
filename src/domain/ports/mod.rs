use crate::domain::models::{
    user::{NewUser, User},
    session::Session,
    event::{Event, NewEvent},
    ticket::{NewTicket, Ticket, TicketListing},
    refund::{NewRefundRequest, RefundListing, RefundRequest, RefundStatus},
    comment::{Comment, CommentListing, NewComment},
    rating::{NewRating, Rating, RatingListing},
    notification::{NewNotification, Notification, NotificationListing},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), AppError>;
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;
    async fn delete(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &NewEvent) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError>;
    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError>;
    async fn list_all(&self) -> Result<Vec<Event>, AppError>;
    /// Saves the event and, when given, the notification in one transaction.
    async fn update(&self, event: &Event, notification: Option<&NewNotification>) -> Result<(Event, Option<Notification>), AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Inserts only if the holder's total for the event stays within `cap`.
    /// `None` means the guard rejected the write.
    async fn create_within_cap(&self, ticket: &NewTicket, cap: i64) -> Result<Option<Ticket>, AppError>;
    /// Updates quantity and type only if the holder's total, counting the new
    /// quantity instead of the stored one, stays within `cap`.
    async fn update_within_cap(&self, ticket: &Ticket, cap: i64) -> Result<Option<Ticket>, AppError>;
    async fn quantity_held(&self, user_id: i64, event_id: i64, excluding: Option<i64>) -> Result<i64, AppError>;
    async fn find_by_code(&self, ticket_code: i64) -> Result<Option<Ticket>, AppError>;
    async fn list_for_holder(&self, user_id: i64, event_id: i64) -> Result<Vec<TicketListing>, AppError>;
    async fn list_by_event(&self, event_id: i64) -> Result<Vec<TicketListing>, AppError>;
    async fn exists_for_event(&self, event_id: i64) -> Result<bool, AppError>;
    async fn delete(&self, ticket_code: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait RefundRepository: Send + Sync {
    /// Inserts only if the user has no pending request. `None` means one exists.
    async fn create_if_none_pending(&self, request: &NewRefundRequest) -> Result<Option<RefundRequest>, AppError>;
    async fn has_pending(&self, user_id: i64) -> Result<bool, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<RefundRequest>, AppError>;
    async fn list_all(&self) -> Result<Vec<RefundListing>, AppError>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<RefundListing>, AppError>;
    async fn update(&self, request: &RefundRequest) -> Result<RefundRequest, AppError>;
    /// Moves a pending request to `status`. `None` if it was no longer pending.
    async fn decide(&self, id: i64, status: RefundStatus, approval_date: NaiveDate) -> Result<Option<RefundRequest>, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &NewComment) -> Result<Comment, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;
    async fn list_by_event(&self, event_id: i64) -> Result<Vec<CommentListing>, AppError>;
    async fn update(&self, comment: &Comment) -> Result<Comment, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn create(&self, rating: &NewRating) -> Result<Rating, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Rating>, AppError>;
    async fn find_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<Option<Rating>, AppError>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<RatingListing>, AppError>;
    async fn list_by_event(&self, event_id: i64) -> Result<Vec<RatingListing>, AppError>;
    async fn update(&self, rating: &Rating) -> Result<Rating, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    /// Mean rating of the event, 0 when it has none.
    async fn average_for_event(&self, event_id: i64) -> Result<f64, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError>;
    async fn list_all(&self) -> Result<Vec<NotificationListing>, AppError>;
    /// Notifications addressed to the user plus global ones of events where
    /// the user holds a ticket, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<NotificationListing>, AppError>;
    async fn is_visible_to(&self, id: i64, user_id: i64) -> Result<bool, AppError>;
    async fn mark_read(&self, id: i64) -> Result<(), AppError>;
    async fn update(&self, notification: &Notification) -> Result<Notification, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
