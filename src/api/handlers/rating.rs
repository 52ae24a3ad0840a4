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
        requests::{FormErrors, RatingForm, NON_FIELD},
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
    rating::{NewRating, Rating},
    user::User,
};
use crate::domain::services::policy::{authorize, Action};
use crate::error::AppError;
use crate::state::AppState;

const RATINGS_PATH: &str = "/ratings/";

pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let ratings: Vec<_> = state.rating_repo.list_by_user(user.id).await?
        .into_iter()
        .map(|r| Row::new(r, true, true))
        .collect();

    let mut context = Context::new();
    context.insert("ratings", &ratings);
    render(&state, &cookies, Some(&user), "ratings/list.html", context)
}

pub async fn create_rating(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Form(form): Form<RatingForm>,
) -> Result<Response, AppError> {
    let event_id = parse_form_id(&form.event_id, "Evento")?;
    let event = load_event(&state, event_id).await?;

    let validated = form.validate();
    let already_rated = state.rating_repo.find_by_user_and_event(user.id, event.id).await?.is_some();

    let input = match validated {
        Ok(input) if !already_rated => input,
        other => {
            let mut errors = other.err().unwrap_or_default();
            if already_rated {
                errors.add(NON_FIELD, "Ya calificaste este evento.");
            }
            let forms = DetailForms { rating: form, rating_errors: errors, ..Default::default() };
            return render_detail(&state, &cookies, &user, event, forms).await;
        }
    };

    let rating = state.rating_repo.create(&NewRating {
        user_id: user.id,
        event_id: event.id,
        title: input.title,
        text: input.text,
        rating: input.rating,
    }).await?;

    info!("Rating {} ({}) posted on event {}", rating.id, rating.rating, event.id);
    flash::push(&cookies, FlashLevel::Success, "Calificación guardada.");
    Ok(Redirect::to(&format!("/events/{}/", event.id)).into_response())
}

async fn load_rating(state: &AppState, id: i64) -> Result<Rating, AppError> {
    state.rating_repo.find_by_id(id).await?.ok_or_else(|| AppError::not_found("Calificación"))
}

fn render_edit(
    state: &AppState,
    cookies: &Cookies,
    user: &User,
    rating: &Rating,
    form: &RatingForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let mut context = form_context(form, errors);
    context.insert("rating", rating);
    Ok(render(state, cookies, Some(user), "ratings/edit.html", context)?.into_response())
}

pub async fn edit_rating_page(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let rating = load_rating(&state, id).await?;
    authorize(&user, Action::EditOwn { owner_id: rating.user_id })?;

    let form = RatingForm {
        event_id: rating.event_id.to_string(),
        title: rating.title.clone(),
        text: rating.text.clone(),
        rating: rating.rating.to_string(),
    };
    render_edit(&state, &cookies, &user, &rating, &form, &FormErrors::new())
}

pub async fn edit_rating(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<RatingForm>,
) -> Result<Response, AppError> {
    let rating = load_rating(&state, id).await?;
    authorize(&user, Action::EditOwn { owner_id: rating.user_id })?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_edit(&state, &cookies, &user, &rating, &form, &errors),
    };

    state.rating_repo.update(&Rating {
        title: input.title,
        text: input.text,
        rating: input.rating,
        ..rating
    }).await?;
    flash::push(&cookies, FlashLevel::Success, "Calificación actualizada.");
    Ok(Redirect::to(RATINGS_PATH).into_response())
}

pub async fn delete_rating_get() -> Redirect {
    Redirect::to(RATINGS_PATH)
}

pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let rating = load_rating(&state, id).await?;
    authorize(&user, Action::ModifyOwned { owner_id: rating.user_id })?;

    state.rating_repo.delete(rating.id).await?;
    info!("Rating {} deleted by user {}", rating.id, user.id);
    flash::push(&cookies, FlashLevel::Success, "Calificación eliminada.");
    Ok(Redirect::to(RATINGS_PATH))
}
