use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;
use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use tracing::info;

use crate::api::{
    dtos::requests::{FormErrors, LoginForm, RegisterForm, NON_FIELD},
    extractors::maybe_auth::MaybeAuthUser,
    flash::{self, FlashLevel},
    handlers::form_context,
    views::render,
};
use crate::domain::models::user::NewUser;
use crate::domain::services::auth_service::SESSION_COOKIE;
use crate::error::{AppError, SAFE_DEFAULT_PATH};
use crate::state::AppState;

pub async fn register_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    MaybeAuthUser(user): MaybeAuthUser,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to(SAFE_DEFAULT_PATH).into_response());
    }
    let context = form_context(&RegisterForm::default(), &FormErrors::new());
    Ok(render(&state, &cookies, None, "accounts/register.html", context)?.into_response())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let mut errors = form.validate();
    let email = form.email.trim();
    let username = form.username.trim();

    if !email.is_empty() && state.user_repo.find_by_email(email).await?.is_some() {
        errors.add("email", "Ya existe un usuario con este email");
    }
    if !username.is_empty() && state.user_repo.find_by_username(username).await?.is_some() {
        errors.add("username", "Ya existe un usuario con este nombre de usuario");
    }

    if !errors.is_empty() {
        let context = form_context(&form, &errors);
        return Ok(render(&state, &cookies, None, "accounts/register.html", context)?.into_response());
    }

    let password_hash = state.auth_service.hash_password(&form.password)?;
    let user = state.user_repo
        .create(&NewUser::new(username.to_string(), email.to_string(), password_hash, form.is_organizer()))
        .await?;
    info!("User registered: {} (organizer: {})", user.id, user.is_organizer);

    let token = state.auth_service.login(&user).await?;
    set_session_cookie(&cookies, &state, token);
    flash::push(&cookies, FlashLevel::Success, format!("Bienvenido, {}.", user.username));
    Ok(Redirect::to(SAFE_DEFAULT_PATH).into_response())
}

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    MaybeAuthUser(user): MaybeAuthUser,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to(SAFE_DEFAULT_PATH).into_response());
    }
    let context = form_context(&LoginForm::default(), &FormErrors::new());
    Ok(render(&state, &cookies, None, "accounts/login.html", context)?.into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match state.auth_service.check_credentials(form.username.trim(), &form.password).await? {
        Some(user) => user,
        None => {
            let errors = FormErrors::with(NON_FIELD, "Usuario o contraseña incorrectos");
            let context = form_context(&form, &errors);
            return Ok(render(&state, &cookies, None, "accounts/login.html", context)?.into_response());
        }
    };

    let token = state.auth_service.login(&user).await?;
    set_session_cookie(&cookies, &state, token);
    Ok(Redirect::to(SAFE_DEFAULT_PATH).into_response())
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.auth_service.logout(cookie.value()).await?;
    }
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());

    info!("User logged out");
    Ok(Redirect::to("/"))
}

fn set_session_cookie(cookies: &Cookies, state: &AppState, token: String) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_secure(state.config.secure_cookies);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(Duration::hours(state.config.session_ttl_hours));
    cookies.add(cookie);
}
