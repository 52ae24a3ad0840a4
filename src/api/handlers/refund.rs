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
    dtos::{
        requests::{FormErrors, RefundForm},
        responses::Row,
    },
    extractors::auth::AuthUser,
    flash::{self, FlashLevel},
    handlers::form_context,
    views::render,
};
use crate::domain::models::{
    refund::{NewRefundRequest, RefundDecision, RefundRequest},
    user::User,
};
use crate::domain::services::{
    policy::{authorize, is_allowed, Action},
    refund_service::PENDING_REFUND_WARNING,
};
use crate::error::AppError;
use crate::state::AppState;

const REFUNDS_PATH: &str = "/refunds/";
const TICKET_NOT_OWNED: &str = "El ticket ingresado no existe o no pertenece a tu cuenta.";

fn pending_redirect(cookies: &Cookies) -> Response {
    flash::push(cookies, FlashLevel::Warning, PENDING_REFUND_WARNING);
    Redirect::to(REFUNDS_PATH).into_response()
}

fn detail_path(id: i64) -> String {
    format!("/refunds/{}/", id)
}

pub async fn list_refunds(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let reviewer = is_allowed(&user, Action::ReviewRefunds);
    let listings = if reviewer {
        state.refund_repo.list_all().await?
    } else {
        state.refund_repo.list_by_user(user.id).await?
    };

    let refunds: Vec<_> = listings
        .into_iter()
        .map(|r| {
            let owner_id = r.request.user_id;
            let can_edit = r.request.is_pending() && is_allowed(&user, Action::EditOwn { owner_id });
            let can_delete = is_allowed(&user, Action::ModifyOwned { owner_id });
            Row::new(r, can_edit, can_delete)
        })
        .collect();

    let mut context = Context::new();
    context.insert("refunds", &refunds);
    context.insert("is_reviewer", &reviewer);
    context.insert("has_pending", &state.refund_service.has_pending(user.id).await?);
    render(&state, &cookies, Some(&user), "refunds/list.html", context)
}

/// Ticket code must name a ticket held by the requester.
async fn check_ticket_owner(state: &AppState, user: &User, ticket_code: i64, errors: &mut FormErrors) -> Result<(), AppError> {
    match state.ticket_repo.find_by_code(ticket_code).await? {
        Some(ticket) if ticket.user_id == user.id => {}
        _ => errors.add("ticket_code", TICKET_NOT_OWNED),
    }
    Ok(())
}

fn render_form(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    form: &RefundForm,
    errors: &FormErrors,
    request: Option<&RefundRequest>,
) -> Result<Response, AppError> {
    let mut context = form_context(form, errors);
    context.insert("refund", &request);
    Ok(render(state, cookies, Some(user), "refunds/form.html", context)?.into_response())
}

pub async fn create_refund_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<Response, AppError> {
    if state.refund_service.has_pending(user.id).await? {
        return Ok(pending_redirect(&cookies));
    }
    render_form(&state, &cookies, &user, &RefundForm::default(), &FormErrors::new(), None)
}

pub async fn create_refund(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Form(form): Form<RefundForm>,
) -> Result<Response, AppError> {
    if state.refund_service.has_pending(user.id).await? {
        return Ok(pending_redirect(&cookies));
    }

    let (ticket_code, reason) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return render_form(&state, &cookies, &user, &form, &errors, None),
    };
    let mut errors = FormErrors::new();
    check_ticket_owner(&state, &user, ticket_code, &mut errors).await?;
    if !errors.is_empty() {
        return render_form(&state, &cookies, &user, &form, &errors, None);
    }

    match state.refund_service.create(NewRefundRequest { ticket_code, reason, user_id: user.id }).await {
        Ok(_) => {
            flash::push(&cookies, FlashLevel::Success, "Solicitud de reembolso enviada.");
            Ok(Redirect::to(REFUNDS_PATH).into_response())
        }
        Err(AppError::Conflict(_)) => Ok(pending_redirect(&cookies)),
        Err(e) => Err(e),
    }
}

async fn load_refund(state: &AppState, id: i64) -> Result<RefundRequest, AppError> {
    state.refund_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::not_found("Solicitud de reembolso"))
}

pub async fn refund_detail(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let refund = load_refund(&state, id).await?;
    authorize(&user, Action::ModifyOwned { owner_id: refund.user_id })?;

    let requester = state.user_repo.find_by_id(refund.user_id).await?.map(|u| u.username);
    let mut context = Context::new();
    context.insert("can_edit", &(refund.is_pending() && is_allowed(&user, Action::EditOwn { owner_id: refund.user_id })));
    context.insert("can_decide", &(refund.is_pending() && is_allowed(&user, Action::ReviewRefunds)));
    context.insert("refund", &refund);
    context.insert("requester", &requester);
    render(&state, &cookies, Some(&user), "refunds/detail.html", context)
}

pub async fn edit_refund_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let refund = load_refund(&state, id).await?;
    authorize(&user, Action::EditOwn { owner_id: refund.user_id })?;
    if !refund.is_pending() {
        flash::push(&cookies, FlashLevel::Warning, "La solicitud ya fue resuelta.");
        return Ok(Redirect::to(&detail_path(id)).into_response());
    }

    let form = RefundForm {
        ticket_code: refund.ticket_code.to_string(),
        reason: refund.reason.clone(),
    };
    render_form(&state, &cookies, &user, &form, &FormErrors::new(), Some(&refund))
}

pub async fn edit_refund(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<RefundForm>,
) -> Result<Response, AppError> {
    let refund = load_refund(&state, id).await?;
    authorize(&user, Action::EditOwn { owner_id: refund.user_id })?;

    let (ticket_code, reason) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return render_form(&state, &cookies, &user, &form, &errors, Some(&refund)),
    };
    let mut errors = FormErrors::new();
    check_ticket_owner(&state, &user, ticket_code, &mut errors).await?;
    if !errors.is_empty() {
        return render_form(&state, &cookies, &user, &form, &errors, Some(&refund));
    }

    match state.refund_service.amend(&refund, ticket_code, reason).await {
        Ok(_) => flash::push(&cookies, FlashLevel::Success, "Solicitud actualizada."),
        Err(AppError::Conflict(msg)) => flash::push(&cookies, FlashLevel::Warning, msg),
        Err(e) => return Err(e),
    }
    Ok(Redirect::to(&detail_path(id)).into_response())
}

pub async fn refunds_redirect() -> Redirect {
    Redirect::to(REFUNDS_PATH)
}

pub async fn delete_refund(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let refund = load_refund(&state, id).await?;
    authorize(&user, Action::ModifyOwned { owner_id: refund.user_id })?;

    state.refund_repo.delete(id).await?;
    info!("Refund request {} deleted by user {}", id, user.id);
    flash::push(&cookies, FlashLevel::Success, "Solicitud eliminada.");
    Ok(Redirect::to(REFUNDS_PATH))
}

async fn decide(state: &AppState, cookies: &Cookies, user: &User, id: i64, decision: RefundDecision) -> Result<Redirect, AppError> {
    authorize(user, Action::ReviewRefunds)?;

    match state.refund_service.decide(id, decision).await {
        Ok(decided) => {
            let text = match decision {
                RefundDecision::Accept => format!("Solicitud #{} aprobada.", decided.id),
                RefundDecision::Reject => format!("Solicitud #{} rechazada.", decided.id),
            };
            flash::push(cookies, FlashLevel::Success, text);
        }
        Err(AppError::Conflict(msg)) => flash::push(cookies, FlashLevel::Warning, msg),
        Err(e) => return Err(e),
    }
    Ok(Redirect::to(REFUNDS_PATH))
}

pub async fn accept_refund(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    decide(&state, &cookies, &user, id, RefundDecision::Accept).await
}

pub async fn reject_refund(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    decide(&state, &cookies, &user, id, RefundDecision::Reject).await
}
