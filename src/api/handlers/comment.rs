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
        requests::{CommentForm, FormErrors},
        responses::Row,
    },
    extractors::auth::AuthUser,
    flash::{self, FlashLevel},
    handlers::{
        event::{load_event, render_detail, DetailForms},
        form_context, parse_form_id,
    },
    views::render,
};
use crate::domain::models::{
    comment::{Comment, NewComment},
    user::User,
};
use crate::domain::services::policy::{authorize, is_allowed, Action};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_event(&state, event_id).await?;
    let comments: Vec<_> = state.comment_repo.list_by_event(event.id).await?
        .into_iter()
        .map(|c| {
            let can_modify = is_allowed(&user, Action::ModifyOwned { owner_id: c.comment.user_id });
            Row::new(c, can_modify, can_modify)
        })
        .collect();

    let mut context = Context::new();
    context.insert("event", &event);
    context.insert("comments", &comments);
    render(&state, &cookies, Some(&user), "comments/list.html", context)
}

/// Invalid submissions re-render the event page with the comment form filled in.
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let event_id = parse_form_id(&form.event_id, "Evento")?;
    let event = load_event(&state, event_id).await?;

    let (title, text) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            let forms = DetailForms { comment: form, comment_errors: errors, ..Default::default() };
            return render_detail(&state, &cookies, &user, event, forms).await;
        }
    };

    let comment = state.comment_repo.create(&NewComment { title, text, user_id: user.id, event_id: event.id }).await?;
    info!("Comment {} posted on event {}", comment.id, event.id);
    flash::push(&cookies, FlashLevel::Success, "Comentario publicado.");
    Ok(Redirect::to(&format!("/events/{}/", event.id)).into_response())
}

async fn load_comment(state: &AppState, user: &User, event_id: i64, id: i64) -> Result<Comment, AppError> {
    let comment = state.comment_repo.find_by_id(id).await?
        .filter(|c| c.event_id == event_id)
        .ok_or_else(|| AppError::not_found("Comentario"))?;
    authorize(user, Action::ModifyOwned { owner_id: comment.user_id })?;
    Ok(comment)
}

fn render_edit(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    comment: &Comment,
    form: &CommentForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let mut context = form_context(form, errors);
    context.insert("comment", comment);
    Ok(render(state, cookies, Some(user), "comments/edit.html", context)?.into_response())
}

pub async fn edit_comment_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path((event_id, id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let comment = load_comment(&state, &user, event_id, id).await?;
    let form = CommentForm {
        event_id: event_id.to_string(),
        title: comment.title.clone(),
        text: comment.text.clone(),
    };
    render_edit(&state, &cookies, &user, &comment, &form, &FormErrors::new())
}

pub async fn edit_comment(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path((event_id, id)): Path<(i64, i64)>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let comment = load_comment(&state, &user, event_id, id).await?;

    let (title, text) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return render_edit(&state, &cookies, &user, &comment, &form, &errors),
    };

    state.comment_repo.update(&Comment { title, text, ..comment }).await?;
    flash::push(&cookies, FlashLevel::Success, "Comentario actualizado.");
    Ok(Redirect::to(&format!("/events/{}/", event_id)).into_response())
}

pub async fn delete_comment_get(Path((event_id, _id)): Path<(i64, i64)>) -> Redirect {
    Redirect::to(&format!("/comments/{}/", event_id))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path((event_id, id)): Path<(i64, i64)>,
) -> Result<Redirect, AppError> {
    let comment = load_comment(&state, &user, event_id, id).await?;
    state.comment_repo.delete(comment.id).await?;

    info!("Comment {} deleted by user {}", comment.id, user.id);
    flash::push(&cookies, FlashLevel::Success, "Comentario eliminado.");
    Ok(Redirect::to(&format!("/events/{}/", event_id)))
}
