use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, comment, event, health, home, notification, rating, refund, ticket};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(home::home))

        // Accounts
        .route("/accounts/register/", get(auth::register_page).post(auth::register))
        .route("/accounts/login/", get(auth::login_page).post(auth::login))
        .route("/accounts/logout/", post(auth::logout))

        // Events
        .route("/events/", get(event::list_events))
        .route("/events/create/", get(event::create_event_page).post(event::create_event))
        .route("/events/{id}/", get(event::event_detail))
        .route("/events/{id}/edit/", get(event::edit_event_page).post(event::edit_event))
        .route("/events/{id}/delete/", get(event::delete_event_get).post(event::delete_event))

        // Tickets
        .route("/tickets/buy/{event_id}/", get(ticket::buy_page))
        .route("/tickets/confirm/", post(ticket::confirm_purchase))
        .route("/tickets/manage/{event_id}/", get(ticket::manage_tickets))
        .route("/tickets/{code}/edit/", get(ticket::edit_ticket_page).post(ticket::edit_ticket))
        .route("/tickets/{code}/delete/", get(ticket::delete_ticket_get).post(ticket::delete_ticket))

        // Refunds
        .route("/refunds/", get(refund::list_refunds))
        .route("/refunds/create/", get(refund::create_refund_page).post(refund::create_refund))
        .route("/refunds/{id}/", get(refund::refund_detail))
        .route("/refunds/{id}/edit/", get(refund::edit_refund_page).post(refund::edit_refund))
        .route("/refunds/{id}/delete/", get(refund::refunds_redirect).post(refund::delete_refund))
        .route("/refunds/{id}/accept/", get(refund::refunds_redirect).post(refund::accept_refund))
        .route("/refunds/{id}/reject/", get(refund::refunds_redirect).post(refund::reject_refund))

        // Comments
        .route("/comments/create/", post(comment::create_comment))
        .route("/comments/{event_id}/", get(comment::list_comments))
        .route("/comments/{event_id}/edit/{id}/", get(comment::edit_comment_page).post(comment::edit_comment))
        .route("/comments/{event_id}/delete/{id}/", get(comment::delete_comment_get).post(comment::delete_comment))

        // Ratings
        .route("/ratings/", get(rating::list_ratings))
        .route("/ratings/create/", post(rating::create_rating))
        .route("/ratings/{id}/edit/", get(rating::edit_rating_page).post(rating::edit_rating))
        .route("/ratings/{id}/delete/", get(rating::delete_rating_get).post(rating::delete_rating))

        // Notifications
        .route("/notifications/", get(notification::notifications_home))
        .route("/notifications/inbox/", get(notification::inbox))
        .route("/notifications/manage/", get(notification::manage))
        .route("/notifications/create/", get(notification::create_page).post(notification::create))
        .route("/notifications/{id}/", get(notification::detail))
        .route("/notifications/{id}/read/", post(notification::mark_read))
        .route("/notifications/{id}/edit/", get(notification::edit_page).post(notification::edit))
        .route("/notifications/{id}/delete/", get(notification::delete_get).post(notification::delete))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
