use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RefundStatus {
    Pendiente,
    Aprobado,
    Rechazado,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pendiente => "pendiente",
            RefundStatus::Aprobado => "aprobado",
            RefundStatus::Rechazado => "rechazado",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RefundRequest {
    pub id: i64,
    pub ticket_code: i64,
    pub reason: String,
    pub approved: bool,
    pub approval_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub status: RefundStatus,
}

impl RefundRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RefundStatus::Pendiente
    }
}

#[derive(Debug, Clone)]
pub struct NewRefundRequest {
    pub ticket_code: i64,
    pub reason: String,
    pub user_id: i64,
}

/// Organizer verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundDecision {
    Accept,
    Reject,
}

impl RefundDecision {
    pub fn status(&self) -> RefundStatus {
        match self {
            RefundDecision::Accept => RefundStatus::Aprobado,
            RefundDecision::Reject => RefundStatus::Rechazado,
        }
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RefundListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: RefundRequest,
    pub requester: String,
}
