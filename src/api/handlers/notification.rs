use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;
use tera::Context;
use tower_cookies::Cookies;
use tracing::info;

use crate::api::{
    dtos::requests::{FormErrors, NotificationForm, NotificationInput, Recipient},
    extractors::auth::AuthUser,
    flash::{self, FlashLevel},
    handlers::form_context,
    views::render,
};
use crate::domain::models::{
    notification::{NewNotification, Notification},
    user::User,
};
use crate::domain::services::policy::{authorize, is_allowed, Action};
use crate::error::AppError;
use crate::state::AppState;

const INBOX_PATH: &str = "/notifications/inbox/";
const MANAGE_PATH: &str = "/notifications/manage/";

pub async fn notifications_home(AuthUser(user): AuthUser) -> Redirect {
    if is_allowed(&user, Action::ManageNotifications) {
        Redirect::to(MANAGE_PATH)
    } else {
        Redirect::to(INBOX_PATH)
    }
}

pub async fn inbox(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.notification_repo.list_for_user(user.id).await?;
    let unread = notifications.iter().filter(|n| !n.notification.is_read).count();

    let mut context = Context::new();
    context.insert("notifications", &notifications);
    context.insert("unread", &unread);
    render(&state, &cookies, Some(&user), "notifications/inbox.html", context)
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !state.notification_repo.is_visible_to(id, user.id).await? {
        return Err(AppError::not_found("Notificación"));
    }
    state.notification_repo.mark_read(id).await?;
    Ok(Redirect::to(INBOX_PATH))
}

pub async fn manage(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, Action::ManageNotifications)?;

    let mut context = Context::new();
    context.insert("notifications", &state.notification_repo.list_all().await?);
    render(&state, &cookies, Some(&user), "notifications/manage.html", context)
}

/// Checks that the event and user named by the form exist.
async fn resolve(state: &AppState, input: NotificationInput) -> Result<Result<NewNotification, FormErrors>, AppError> {
    let mut errors = FormErrors::new();

    let (event_id, user_id) = match &input.recipient {
        Recipient::Everyone { event_id } => (Some(*event_id), None),
        Recipient::User { username, event_id } => {
            let user = state.user_repo.find_by_username(username).await?;
            if user.is_none() {
                errors.add("username", "El usuario no existe.");
            }
            (*event_id, user.map(|u| u.id))
        }
    };

    if let Some(event_id) = event_id
        && state.event_repo.find_by_id(event_id).await?.is_none()
    {
        errors.add("event_id", "El evento no existe.");
    }

    if !errors.is_empty() {
        return Ok(Err(errors));
    }
    Ok(Ok(NewNotification {
        title: input.title,
        message: input.message,
        priority: input.priority,
        event_id,
        user_id,
    }))
}

async fn render_form(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    form: &NotificationForm,
    errors: &FormErrors,
    notification: Option<&Notification>,
) -> Result<Response, AppError> {
    let mut context = form_context(form, errors);
    context.insert("events", &state.event_repo.list_all().await?);
    context.insert("notification", &notification);
    Ok(render(state, cookies, Some(user), "notifications/form.html", context)?.into_response())
}

pub async fn create_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<Response, AppError> {
    authorize(&user, Action::ManageNotifications)?;
    let form = NotificationForm {
        priority: "MEDIUM".to_string(),
        recipient_type: "todos".to_string(),
        ..Default::default()
    };
    render_form(&state, &cookies, &user, &form, &FormErrors::new(), None).await
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Form(form): Form<NotificationForm>,
) -> Result<Response, AppError> {
    authorize(&user, Action::ManageNotifications)?;

    let resolved = match form.validate() {
        Ok(input) => resolve(&state, input).await?,
        Err(errors) => Err(errors),
    };
    let new_notification = match resolved {
        Ok(n) => n,
        Err(errors) => return render_form(&state, &cookies, &user, &form, &errors, None).await,
    };

    let created = state.notification_repo.create(&new_notification).await?;
    info!("Notification {} created by organizer {}", created.id, user.id);
    flash::push(&cookies, FlashLevel::Success, "Notificación creada.");
    Ok(Redirect::to(MANAGE_PATH).into_response())
}

async fn load_managed(state: &AppState, user: &User, id: i64) -> Result<Notification, AppError> {
    authorize(user, Action::ManageNotifications)?;
    state.notification_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::not_found("Notificación"))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let notification = load_managed(&state, &user, id).await?;

    let event = match notification.event_id {
        Some(event_id) => state.event_repo.find_by_id(event_id).await?,
        None => None,
    };
    let recipient = match notification.user_id {
        Some(user_id) => state.user_repo.find_by_id(user_id).await?.map(|u| u.username),
        None => None,
    };

    let mut context = Context::new();
    context.insert("notification", &notification);
    context.insert("event", &event);
    context.insert("recipient", &recipient);
    render(&state, &cookies, Some(&user), "notifications/detail.html", context)
}

pub async fn edit_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let notification = load_managed(&state, &user, id).await?;

    let username = match notification.user_id {
        Some(user_id) => state.user_repo.find_by_id(user_id).await?.map(|u| u.username).unwrap_or_default(),
        None => String::new(),
    };
    let form = NotificationForm {
        title: notification.title.clone(),
        message: notification.message.clone(),
        priority: notification.priority.as_str().to_string(),
        recipient_type: if notification.is_global() { "todos" } else { "usuario" }.to_string(),
        event_id: notification.event_id.map(|id| id.to_string()).unwrap_or_default(),
        username,
    };
    render_form(&state, &cookies, &user, &form, &FormErrors::new(), Some(&notification)).await
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<NotificationForm>,
) -> Result<Response, AppError> {
    let notification = load_managed(&state, &user, id).await?;

    let resolved = match form.validate() {
        Ok(input) => resolve(&state, input).await?,
        Err(errors) => Err(errors),
    };
    let changes = match resolved {
        Ok(n) => n,
        Err(errors) => return render_form(&state, &cookies, &user, &form, &errors, Some(&notification)).await,
    };

    state.notification_repo.update(&Notification {
        title: changes.title,
        message: changes.message,
        priority: changes.priority,
        event_id: changes.event_id,
        user_id: changes.user_id,
        ..notification
    }).await?;
    flash::push(&cookies, FlashLevel::Success, "Notificación actualizada.");
    Ok(Redirect::to(&format!("/notifications/{}/", id)).into_response())
}

pub async fn delete_get() -> Redirect {
    Redirect::to(MANAGE_PATH)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let notification = load_managed(&state, &user, id).await?;
    state.notification_repo.delete(notification.id).await?;

    info!("Notification {} deleted by organizer {}", notification.id, user.id);
    flash::push(&cookies, FlashLevel::Success, "Notificación eliminada.");
    Ok(Redirect::to(MANAGE_PATH))
}
