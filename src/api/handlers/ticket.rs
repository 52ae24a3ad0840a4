use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::info;

use crate::api::{
    dtos::{
        requests::{BuyTicketForm, FormErrors, TicketEditForm},
        responses::Row,
    },
    extractors::auth::AuthUser,
    flash::{self, FlashLevel},
    handlers::{event::load_event, form_context, parse_form_id, today},
    views::render,
};
use crate::domain::models::{event::Event, ticket::Ticket, user::User};
use crate::domain::services::{
    policy::{authorize, is_allowed, Action},
    ticket_cap::MAX_TICKETS_PER_EVENT,
};
use crate::error::AppError;
use crate::state::AppState;

fn manage_path(event_id: i64) -> String {
    format!("/tickets/manage/{}/", event_id)
}

/// Cap violations come back as validation errors and belong next to the quantity.
fn quantity_error(result: AppError) -> Result<FormErrors, AppError> {
    match result {
        AppError::Validation(msg) => Ok(FormErrors::with("cantidad", msg)),
        other => Err(other),
    }
}

async fn render_buy(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    event: &Event,
    form: &BuyTicketForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let held = state.ticket_repo.quantity_held(user.id, event.id, None).await?;
    let mut context = form_context(form, errors);
    context.insert("event", event);
    context.insert("held", &held);
    context.insert("max_tickets", &MAX_TICKETS_PER_EVENT);
    Ok(render(state, cookies, Some(user), "tickets/buy.html", context)?.into_response())
}

pub async fn buy_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event = load_event(&state, event_id).await?;
    let form = BuyTicketForm {
        cantidad: "1".to_string(),
        tipo: "general".to_string(),
        id_evento: event.id.to_string(),
        ..Default::default()
    };
    render_buy(&state, &cookies, &user, &event, &form, &FormErrors::new()).await
}

pub async fn confirm_purchase(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Form(form): Form<BuyTicketForm>,
) -> Result<Response, AppError> {
    let event_id = parse_form_id(&form.id_evento, "Evento")?;
    let event = load_event(&state, event_id).await?;

    let (quantity, ticket_type) = match form.validate(today(&state)) {
        Ok(valid) => valid,
        Err(errors) => return render_buy(&state, &cookies, &user, &event, &form, &errors).await,
    };

    match state.ticket_service.purchase(user.id, event.id, quantity, ticket_type).await {
        Ok(_) => {
            flash::push(&cookies, FlashLevel::Success, "¡Compra realizada con éxito!");
            Ok(Redirect::to(&manage_path(event.id)).into_response())
        }
        Err(e) => {
            let errors = quantity_error(e)?;
            render_buy(&state, &cookies, &user, &event, &form, &errors).await
        }
    }
}

pub async fn manage_tickets(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event = load_event(&state, event_id).await?;

    let listings = if is_allowed(&user, Action::ManageEvent(&event)) {
        state.ticket_repo.list_by_event(event.id).await?
    } else {
        state.ticket_repo.list_for_holder(user.id, event.id).await?
    };
    let tickets: Vec<_> = listings
        .into_iter()
        .map(|t| {
            let can_modify = is_allowed(&user, Action::ModifyOwned { owner_id: t.ticket.user_id });
            Row::new(t, can_modify, can_modify)
        })
        .collect();

    let mut context = tera::Context::new();
    context.insert("event", &event);
    context.insert("tickets", &tickets);
    Ok(render(&state, &cookies, Some(&user), "tickets/manage.html", context)?.into_response())
}

async fn load_ticket(state: &AppState, user: &User, code: i64) -> Result<Ticket, AppError> {
    let ticket = state.ticket_repo.find_by_code(code).await?
        .ok_or_else(|| AppError::not_found("Ticket"))?;
    authorize(user, Action::ModifyOwned { owner_id: ticket.user_id })?;
    Ok(ticket)
}

fn render_edit(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    ticket: &Ticket,
    form: &TicketEditForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let mut context = form_context(form, errors);
    context.insert("ticket", ticket);
    context.insert("max_tickets", &MAX_TICKETS_PER_EVENT);
    Ok(render(state, cookies, Some(user), "tickets/edit.html", context)?.into_response())
}

pub async fn edit_ticket_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(code): Path<i64>,
) -> Result<Response, AppError> {
    let ticket = load_ticket(&state, &user, code).await?;
    let form = TicketEditForm {
        cantidad: ticket.quantity.to_string(),
        tipo: ticket.ticket_type.to_string(),
    };
    render_edit(&state, &cookies, &user, &ticket, &form, &FormErrors::new())
}

pub async fn edit_ticket(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(code): Path<i64>,
    Form(form): Form<TicketEditForm>,
) -> Result<Response, AppError> {
    let ticket = load_ticket(&state, &user, code).await?;

    let (quantity, ticket_type) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return render_edit(&state, &cookies, &user, &ticket, &form, &errors),
    };

    match state.ticket_service.update(&ticket, quantity, ticket_type).await {
        Ok(saved) => {
            flash::push(&cookies, FlashLevel::Success, "Entrada actualizada.");
            Ok(Redirect::to(&manage_path(saved.event_id)).into_response())
        }
        Err(e) => {
            let errors = quantity_error(e)?;
            render_edit(&state, &cookies, &user, &ticket, &form, &errors)
        }
    }
}

pub async fn delete_ticket_get(
    State(state): State<Arc<AppState>>,
    Path(code): Path<i64>,
) -> Result<Redirect, AppError> {
    let target = match state.ticket_repo.find_by_code(code).await? {
        Some(ticket) => manage_path(ticket.event_id),
        None => "/events/".to_string(),
    };
    Ok(Redirect::to(&target))
}

pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(code): Path<i64>,
) -> Result<Redirect, AppError> {
    let ticket = load_ticket(&state, &user, code).await?;
    state.ticket_repo.delete(ticket.ticket_code).await?;

    info!("Ticket {} deleted by user {}", ticket.ticket_code, user.id);
    flash::push(&cookies, FlashLevel::Success, "Entrada eliminada.");
    Ok(Redirect::to(&manage_path(ticket.event_id)))
}
