use std::collections::HashMap;
use axum::response::Html;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tera::{Context, Tera};
use tower_cookies::Cookies;

use crate::api::flash;
use crate::domain::models::user::User;
use crate::domain::services::formatting::{format_event_datetime, format_short_datetime};
use crate::error::AppError;
use crate::state::AppState;

macro_rules! template {
    ($name:literal) => {
        ($name, include_str!(concat!("../../templates/", $name)))
    };
}

pub fn load_templates(tz: Tz) -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        template!("base.html"),
        template!("home.html"),
        template!("accounts/login.html"),
        template!("accounts/register.html"),
        template!("events/list.html"),
        template!("events/detail.html"),
        template!("events/form.html"),
        template!("tickets/buy.html"),
        template!("tickets/manage.html"),
        template!("tickets/edit.html"),
        template!("refunds/list.html"),
        template!("refunds/form.html"),
        template!("refunds/detail.html"),
        template!("comments/list.html"),
        template!("comments/edit.html"),
        template!("ratings/list.html"),
        template!("ratings/edit.html"),
        template!("notifications/inbox.html"),
        template!("notifications/manage.html"),
        template!("notifications/form.html"),
        template!("notifications/detail.html"),
    ])?;
    tera.register_filter("fecha", datetime_filter(tz, format_event_datetime));
    tera.register_filter("fecha_corta", datetime_filter(tz, format_short_datetime));
    Ok(tera)
}

/// Renders serialized UTC timestamps in the display timezone.
fn datetime_filter(
    tz: Tz,
    format: fn(DateTime<Utc>, Tz) -> String,
) -> impl Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync {
    move |value, _args| {
        let raw = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("fecha expects a timestamp string"))?;
        let dt = DateTime::parse_from_rfc3339(raw)
            .map_err(|e| tera::Error::msg(format!("invalid timestamp {}: {}", raw, e)))?;
        Ok(Value::String(format(dt.with_timezone(&Utc), tz)))
    }
}

/// Renders a page with the current user and pending flash messages in scope.
pub fn render(
    state: &AppState,
    cookies: &Cookies,
    user: Option<&User>,
    template: &str,
    mut context: Context,
) -> Result<Html<String>, AppError> {
    context.insert("current_user", &user);
    context.insert("messages", &flash::take(cookies));
    let body = state.templates.render(template, &context)?;
    Ok(Html(body))
}
