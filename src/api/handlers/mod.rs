pub mod auth;
pub mod comment;
pub mod event;
pub mod health;
pub mod home;
pub mod notification;
pub mod rating;
pub mod refund;
pub mod ticket;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tera::Context;

use crate::api::dtos::requests::FormErrors;
use crate::error::AppError;
use crate::state::AppState;

/// Context of a form page: the submitted values and their errors.
pub(crate) fn form_context<T: Serialize>(data: &T, errors: &FormErrors) -> Context {
    let mut context = Context::new();
    context.insert("data", data);
    context.insert("errors", errors);
    context
}

pub(crate) fn today(state: &AppState) -> NaiveDate {
    Utc::now().with_timezone(&state.config.timezone).date_naive()
}

/// Ids posted in form bodies rather than in the path.
pub(crate) fn parse_form_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| AppError::not_found(what))
}
