use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use std::sync::Arc;
use tera::Context;
use tower_cookies::Cookies;
use tracing::info;

use crate::api::{
    dtos::{
        requests::{CommentForm, EventForm, FormErrors, RatingForm},
        responses::Row,
    },
    extractors::auth::AuthUser,
    flash::{self, FlashLevel},
    handlers::form_context,
    views::render,
};
use crate::domain::models::{
    event::{Event, EventUpdate, NewEvent, DEFAULT_LOCATION},
    user::User,
};
use crate::domain::services::{
    formatting::{format_average, split_local_datetime},
    policy::{authorize, is_allowed, Action},
};
use crate::error::{AppError, SAFE_DEFAULT_PATH};
use crate::state::AppState;

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events: Vec<Row<Event>> = state.event_repo.list_upcoming(Utc::now()).await?
        .into_iter()
        .map(|event| {
            let can_manage = is_allowed(&user, Action::ManageEvent(&event));
            Row::new(event, can_manage, can_manage)
        })
        .collect();

    let mut context = Context::new();
    context.insert("events", &events);
    context.insert("can_create", &is_allowed(&user, Action::CreateEvent));
    render(&state, &cookies, Some(&user), "events/list.html", context)
}

/// Comment and rating forms embedded in the detail page, with any errors
/// from a rejected submission.
#[derive(Default)]
pub(crate) struct DetailForms {
    pub comment: CommentForm,
    pub comment_errors: FormErrors,
    pub rating: RatingForm,
    pub rating_errors: FormErrors,
}

pub(crate) async fn render_detail(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    event: Event,
    forms: DetailForms,
) -> Result<Response, AppError> {
    let comments: Vec<_> = state.comment_repo.list_by_event(event.id).await?
        .into_iter()
        .map(|c| {
            let can_modify = is_allowed(user, Action::ModifyOwned { owner_id: c.comment.user_id });
            Row::new(c, can_modify, can_modify)
        })
        .collect();

    let ratings: Vec<_> = state.rating_repo.list_by_event(event.id).await?
        .into_iter()
        .map(|r| {
            let can_edit = is_allowed(user, Action::EditOwn { owner_id: r.rating.user_id });
            let can_delete = is_allowed(user, Action::ModifyOwned { owner_id: r.rating.user_id });
            Row::new(r, can_edit, can_delete)
        })
        .collect();

    let tickets = state.ticket_repo.list_for_holder(user.id, event.id).await?;
    let has_rated = state.rating_repo.find_by_user_and_event(user.id, event.id).await?.is_some();

    let average = if is_allowed(user, Action::ViewRatingAverage(&event)) {
        Some(format_average(state.rating_repo.average_for_event(event.id).await?))
    } else {
        None
    };

    let mut context = Context::new();
    context.insert("can_manage", &is_allowed(user, Action::ManageEvent(&event)));
    context.insert("event", &event);
    context.insert("comments", &comments);
    context.insert("ratings", &ratings);
    context.insert("tickets", &tickets);
    context.insert("has_rated", &has_rated);
    context.insert("average", &average);
    context.insert("comment_data", &forms.comment);
    context.insert("comment_errors", &forms.comment_errors);
    context.insert("rating_data", &forms.rating);
    context.insert("rating_errors", &forms.rating_errors);
    Ok(render(state, cookies, Some(user), "events/detail.html", context)?.into_response())
}

pub(crate) async fn load_event(state: &AppState, id: i64) -> Result<Event, AppError> {
    state.event_repo.find_by_id(id).await?.ok_or_else(|| AppError::not_found("Evento"))
}

pub async fn event_detail(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let event = load_event(&state, id).await?;
    render_detail(&state, &cookies, &user, event, DetailForms::default()).await
}

fn render_form(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    form: &EventForm,
    errors: &FormErrors,
    event: Option<&Event>,
) -> Result<Response, AppError> {
    let mut context = form_context(form, errors);
    context.insert("event", &event);
    Ok(render(state, cookies, Some(user), "events/form.html", context)?.into_response())
}

pub async fn create_event_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<Response, AppError> {
    authorize(&user, Action::CreateEvent)?;
    render_form(&state, &cookies, &user, &EventForm::default(), &FormErrors::new(), None)
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    authorize(&user, Action::CreateEvent)?;

    let input = match form.validate(state.config.timezone) {
        Ok(input) => input,
        Err(errors) => return render_form(&state, &cookies, &user, &form, &errors, None),
    };

    let location = if input.location.is_empty() { DEFAULT_LOCATION.to_string() } else { input.location };
    let event = state.event_repo.create(&NewEvent {
        title: input.title,
        description: input.description,
        scheduled_at: input.scheduled_at,
        location,
        organizer_id: user.id,
    }).await?;

    info!("Event {} created by organizer {}", event.id, user.id);
    flash::push(&cookies, FlashLevel::Success, "Evento creado correctamente.");
    Ok(Redirect::to(&format!("/events/{}/", event.id)).into_response())
}

pub async fn edit_event_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let event = load_event(&state, id).await?;
    authorize(&user, Action::ManageEvent(&event))?;

    let (date, time) = split_local_datetime(event.scheduled_at, state.config.timezone);
    let form = EventForm {
        title: event.title.clone(),
        description: event.description.clone(),
        date,
        time,
        location: event.location.clone(),
    };
    render_form(&state, &cookies, &user, &form, &FormErrors::new(), Some(&event))
}

pub async fn edit_event(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let event = load_event(&state, id).await?;
    authorize(&user, Action::ManageEvent(&event))?;

    let input = match form.validate(state.config.timezone) {
        Ok(input) => input,
        Err(errors) => return render_form(&state, &cookies, &user, &form, &errors, Some(&event)),
    };

    let (updated, notification) = state.event_service.update(id, EventUpdate {
        title: input.title,
        description: input.description,
        scheduled_at: input.scheduled_at,
        location: input.location,
    }).await?;

    flash::push(&cookies, FlashLevel::Success, "Evento actualizado correctamente.");
    if notification.is_some() {
        flash::push(&cookies, FlashLevel::Info, "Se notificó el cambio a los asistentes.");
    }
    Ok(Redirect::to(&format!("/events/{}/", updated.id)).into_response())
}

pub async fn delete_event_get() -> Redirect {
    Redirect::to(SAFE_DEFAULT_PATH)
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let event = load_event(&state, id).await?;
    authorize(&user, Action::ManageEvent(&event))?;

    state.event_repo.delete(id).await?;
    info!("Event {} deleted by organizer {}", id, user.id);
    flash::push(&cookies, FlashLevel::Success, "Evento eliminado.");
    Ok(Redirect::to(SAFE_DEFAULT_PATH))
}
