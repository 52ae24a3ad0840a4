use axum::{extract::State, response::IntoResponse};
use std::sync::Arc;
use tera::Context;
use tower_cookies::Cookies;

use crate::api::{extractors::maybe_auth::MaybeAuthUser, views::render};
use crate::error::AppError;
use crate::state::AppState;

pub async fn home(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    MaybeAuthUser(user): MaybeAuthUser,
) -> Result<impl IntoResponse, AppError> {
    render(&state, &cookies, user.as_ref(), "home.html", Context::new())
}
