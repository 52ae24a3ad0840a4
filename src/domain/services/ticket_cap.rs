use std::fmt;

pub const MAX_TICKETS_PER_EVENT: i64 = 4;

/// Rejected purchase or edit: `current` tickets already held plus `requested`
/// would go over the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketCapExceeded {
    pub current: i64,
    pub requested: i64,
}

impl TicketCapExceeded {
    pub fn overage(&self) -> i64 {
        self.current.saturating_add(self.requested).saturating_sub(MAX_TICKETS_PER_EVENT)
    }
}

impl fmt::Display for TicketCapExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ya tienes {} entradas para este evento. Con {} más superarías el límite de {} entradas por {}.",
            self.current,
            self.requested,
            MAX_TICKETS_PER_EVENT,
            self.overage()
        )
    }
}

/// `existing` must already exclude the ticket being edited.
pub fn check_ticket_cap(existing: i64, requested: i64) -> Result<(), TicketCapExceeded> {
    match existing.checked_add(requested) {
        Some(total) if total <= MAX_TICKETS_PER_EVENT => Ok(()),
        _ => Err(TicketCapExceeded { current: existing, requested }),
    }
}
