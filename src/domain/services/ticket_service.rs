use std::sync::Arc;
use crate::domain::{
    models::ticket::{NewTicket, Ticket, TicketType},
    ports::TicketRepository,
    services::ticket_cap::{check_ticket_cap, TicketCapExceeded, MAX_TICKETS_PER_EVENT},
};
use crate::error::AppError;
use tracing::{info, warn};

pub struct TicketService {
    repo: Arc<dyn TicketRepository>,
}

impl TicketService {
    pub fn new(repo: Arc<dyn TicketRepository>) -> Self {
        Self { repo }
    }

    pub async fn purchase(&self, user_id: i64, event_id: i64, quantity: i64, ticket_type: TicketType) -> Result<Ticket, AppError> {
        ensure_positive(quantity)?;

        let existing = self.repo.quantity_held(user_id, event_id, None).await?;
        if let Err(exceeded) = check_ticket_cap(existing, quantity) {
            return Err(reject(user_id, event_id, exceeded));
        }

        let new_ticket = NewTicket::new(user_id, event_id, quantity, ticket_type);
        match self.repo.create_within_cap(&new_ticket, MAX_TICKETS_PER_EVENT).await? {
            Some(ticket) => {
                info!("Ticket {} purchased: user {} event {} x{}", ticket.ticket_code, user_id, event_id, quantity);
                Ok(ticket)
            }
            // Lost a race against a concurrent purchase; report the fresh total.
            None => Err(self.cap_error(user_id, event_id, None, quantity).await),
        }
    }

    /// The cap sum leaves out the ticket being edited.
    pub async fn update(&self, ticket: &Ticket, quantity: i64, ticket_type: TicketType) -> Result<Ticket, AppError> {
        ensure_positive(quantity)?;

        let others = self.repo.quantity_held(ticket.user_id, ticket.event_id, Some(ticket.ticket_code)).await?;
        if let Err(exceeded) = check_ticket_cap(others, quantity) {
            return Err(reject(ticket.user_id, ticket.event_id, exceeded));
        }

        let mut changed = ticket.clone();
        changed.quantity = quantity;
        changed.ticket_type = ticket_type;

        match self.repo.update_within_cap(&changed, MAX_TICKETS_PER_EVENT).await? {
            Some(saved) => {
                info!("Ticket {} updated: x{} {}", saved.ticket_code, saved.quantity, saved.ticket_type);
                Ok(saved)
            }
            None => Err(self.cap_error(ticket.user_id, ticket.event_id, Some(ticket.ticket_code), quantity).await),
        }
    }

    async fn cap_error(&self, user_id: i64, event_id: i64, excluding: Option<i64>, requested: i64) -> AppError {
        match self.repo.quantity_held(user_id, event_id, excluding).await {
            Ok(current) => reject(user_id, event_id, TicketCapExceeded { current, requested }),
            Err(e) => e,
        }
    }
}

fn ensure_positive(quantity: i64) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::Validation("La cantidad debe ser al menos 1.".to_string()));
    }
    Ok(())
}

fn reject(user_id: i64, event_id: i64, exceeded: TicketCapExceeded) -> AppError {
    warn!(
        user_id,
        event_id,
        current = exceeded.current,
        requested = exceeded.requested,
        "Ticket cap exceeded"
    );
    AppError::Validation(exceeded.to_string())
}
