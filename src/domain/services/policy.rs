use crate::domain::models::{event::Event, user::User};
use crate::error::AppError;

/// Everything a handler may need permission for.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateEvent,
    /// Edit or delete.
    ManageEvent(&'a Event),
    ViewRatingAverage(&'a Event),
    /// Accept, reject and list every refund request.
    ReviewRefunds,
    ManageNotifications,
    /// Owner, or any organizer acting as moderator.
    ModifyOwned { owner_id: i64 },
    /// Owner only.
    EditOwn { owner_id: i64 },
}

pub fn is_allowed(user: &User, action: Action<'_>) -> bool {
    match action {
        Action::CreateEvent | Action::ReviewRefunds | Action::ManageNotifications => user.is_organizer,
        Action::ManageEvent(event) | Action::ViewRatingAverage(event) => {
            user.is_organizer && event.organizer_id == user.id
        }
        Action::ModifyOwned { owner_id } => owner_id == user.id || user.is_organizer,
        Action::EditOwn { owner_id } => owner_id == user.id,
    }
}

pub fn authorize(user: &User, action: Action<'_>) -> Result<(), AppError> {
    if is_allowed(user, action) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("user {} may not {:?}", user.id, action)))
    }
}
