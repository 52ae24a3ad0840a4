pub mod sqlite_comment_repo;
pub mod sqlite_event_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_rating_repo;
pub mod sqlite_refund_repo;
pub mod sqlite_session_repo;
pub mod sqlite_ticket_repo;
pub mod sqlite_user_repo;
