use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use chrono_tz::Tz;
use crate::domain::models::{
    event::Event,
    notification::{NewNotification, Priority},
};
use crate::domain::services::formatting::format_short_datetime;

/// Which attendee-facing fields differ between two versions of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventChange {
    pub schedule_changed: bool,
    pub location_changed: bool,
}

impl EventChange {
    pub fn any(&self) -> bool {
        self.schedule_changed || self.location_changed
    }
}

fn to_minute(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.duration_trunc(TimeDelta::minutes(1)).unwrap_or(dt)
}

/// Schedules are compared at minute granularity; title and description are ignored.
pub fn detect_changes(before: &Event, after: &Event) -> EventChange {
    EventChange {
        schedule_changed: to_minute(before.scheduled_at) != to_minute(after.scheduled_at),
        location_changed: before.location != after.location,
    }
}

/// Global notification announcing `change` on the updated `event`, or `None`
/// when nothing attendees care about changed.
pub fn change_notification(event: &Event, change: EventChange, tz: Tz) -> Option<NewNotification> {
    if !change.any() {
        return None;
    }

    let mut message = String::from("El evento fue actualizado. ");
    if change.schedule_changed {
        message.push_str("La fecha ha cambiado. ");
    }
    if change.location_changed {
        message.push_str("El lugar ha cambiado. ");
    }
    message.push_str(&format!(
        "Fecha: {}, Lugar: {}",
        format_short_datetime(event.scheduled_at, tz),
        event.location
    ));

    Some(NewNotification {
        title: format!("Actualización del evento: {}", event.title),
        message,
        priority: Priority::High,
        event_id: Some(event.id),
        user_id: None,
    })
}
