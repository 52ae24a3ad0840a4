use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use crate::domain::models::user::User;
use crate::domain::services::auth_service::SESSION_COOKIE;
use crate::error::{AppError, LOGIN_PATH};
use crate::state::AppState;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

/// Logged-in user. Anonymous visitors are sent to the login page.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        match session_user(parts, &app_state).await {
            Ok(Some(user)) => {
                Span::current().record("user_id", user.id);
                Ok(AuthUser(user))
            }
            Ok(None) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Resolves the session cookie, if any, to a user.
pub(crate) async fn session_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let cookies = parts.extensions.get::<Cookies>()
        .ok_or_else(|| AppError::InternalWithMsg("cookie layer missing".to_string()))?;

    match cookies.get(SESSION_COOKIE) {
        Some(cookie) => state.auth_service.authenticate(cookie.value()).await,
        None => Ok(None),
    }
}
