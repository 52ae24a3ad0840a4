use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TicketType {
    #[serde(rename = "general")]
    #[sqlx(rename = "general")]
    General,
    #[serde(rename = "VIP")]
    #[sqlx(rename = "VIP")]
    Vip,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::General => "general",
            TicketType::Vip => "VIP",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(TicketType::General),
            "VIP" => Ok(TicketType::Vip),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Ticket {
    pub ticket_code: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub quantity: i64,
    pub ticket_type: TicketType,
    pub buy_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub user_id: i64,
    pub event_id: i64,
    pub quantity: i64,
    pub ticket_type: TicketType,
    pub buy_date: DateTime<Utc>,
}

impl NewTicket {
    pub fn new(user_id: i64, event_id: i64, quantity: i64, ticket_type: TicketType) -> Self {
        Self {
            user_id,
            event_id,
            quantity,
            ticket_type,
            buy_date: Utc::now(),
        }
    }
}

/// Ticket row joined with its event title and holder name for listings.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct TicketListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub event_title: String,
    pub holder: String,
}
