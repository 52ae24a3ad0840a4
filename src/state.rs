use std::sync::Arc;
use crate::domain::ports::{
    CommentRepository, EventRepository, NotificationRepository, RatingRepository,
    RefundRepository, SessionRepository, TicketRepository, UserRepository,
};
use crate::domain::services::{
    auth_service::AuthService, event_service::EventService,
    refund_service::RefundService, ticket_service::TicketService,
};
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub ticket_repo: Arc<dyn TicketRepository>,
    pub refund_repo: Arc<dyn RefundRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub rating_repo: Arc<dyn RatingRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub auth_service: Arc<AuthService>,
    pub event_service: Arc<EventService>,
    pub ticket_service: Arc<TicketService>,
    pub refund_service: Arc<RefundService>,
    pub templates: Arc<Tera>,
}
