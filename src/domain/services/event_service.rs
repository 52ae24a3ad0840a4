use std::sync::Arc;
use chrono::Utc;
use chrono_tz::Tz;
use crate::domain::{
    models::{
        event::{Event, EventUpdate},
        notification::Notification,
    },
    ports::{EventRepository, TicketRepository},
    services::event_changes::{change_notification, detect_changes},
};
use crate::error::AppError;
use tracing::info;

pub struct EventService {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
    tz: Tz,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>, tickets: Arc<dyn TicketRepository>, tz: Tz) -> Self {
        Self { events, tickets, tz }
    }

    /// Applies the edit and, when the date or place moved on an event that has
    /// tickets, stores one global notification alongside it.
    pub async fn update(&self, event_id: i64, changes: EventUpdate) -> Result<(Event, Option<Notification>), AppError> {
        let before = self.events.find_by_id(event_id).await?
            .ok_or_else(|| AppError::not_found("Evento"))?;

        let after = apply_update(&before, changes);
        let change = detect_changes(&before, &after);

        let notice = if change.any() && self.tickets.exists_for_event(event_id).await? {
            change_notification(&after, change, self.tz)
        } else {
            None
        };

        let (saved, notification) = self.events.update(&after, notice.as_ref()).await?;

        info!("Event {} updated", saved.id);
        if let Some(n) = &notification {
            info!("Notification {} created for event {}", n.id, saved.id);
        }
        Ok((saved, notification))
    }
}

/// Empty text fields keep the stored value.
fn apply_update(event: &Event, changes: EventUpdate) -> Event {
    let keep_or = |new: String, old: &str| {
        let trimmed = new.trim();
        if trimmed.is_empty() { old.to_string() } else { trimmed.to_string() }
    };

    Event {
        title: keep_or(changes.title, &event.title),
        description: keep_or(changes.description, &event.description),
        location: keep_or(changes.location, &event.location),
        scheduled_at: changes.scheduled_at,
        updated_at: Utc::now(),
        ..event.clone()
    }
}
