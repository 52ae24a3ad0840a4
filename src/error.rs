use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::{error, warn};

pub const LOGIN_PATH: &str = "/accounts/login/";
pub const SAFE_DEFAULT_PATH: &str = "/events/";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} no encontrado", what))
    }
}

/// SQLite reports unique violations as extended code 2067 (1555 for primary keys).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "2067" || code == "1555")
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html><html lang=\"es\"><head><meta charset=\"utf-8\"><title>{code}</title></head>\
         <body><main class=\"container\"><h1>{code}</h1><p>{message}</p>\
         <a href=\"{home}\">Volver a eventos</a></main></body></html>",
        code = status.as_u16(),
        message = tera::escape_html(message),
        home = SAFE_DEFAULT_PATH,
    );
    (status, Html(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return error_page(StatusCode::CONFLICT, "El recurso ya existe.");
                }
                error!("Database error: {:?}", e);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor.")
            }
            AppError::Template(e) => {
                error!("Template error: {:?}", e);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor.")
            }
            AppError::NotFound(msg) => error_page(StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized => Redirect::to(LOGIN_PATH).into_response(),
            AppError::Forbidden(msg) => {
                warn!("Permission denied: {}", msg);
                Redirect::to(SAFE_DEFAULT_PATH).into_response()
            }
            AppError::Conflict(msg) => error_page(StatusCode::CONFLICT, msg),
            AppError::Validation(msg) => error_page(StatusCode::BAD_REQUEST, msg),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor.")
            }
        }
    }
}

/// Failures that abort `run()` before the server starts listening.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
