use std::sync::Arc;
use chrono::Utc;
use chrono_tz::Tz;
use crate::domain::{
    models::refund::{NewRefundRequest, RefundDecision, RefundRequest},
    ports::RefundRepository,
};
use crate::error::AppError;
use tracing::{info, warn};

pub const PENDING_REFUND_WARNING: &str = "Ya tienes una solicitud de reembolso pendiente.";

pub struct RefundService {
    repo: Arc<dyn RefundRepository>,
    tz: Tz,
}

impl RefundService {
    pub fn new(repo: Arc<dyn RefundRepository>, tz: Tz) -> Self {
        Self { repo, tz }
    }

    pub async fn has_pending(&self, user_id: i64) -> Result<bool, AppError> {
        self.repo.has_pending(user_id).await
    }

    /// Fails with a conflict when the user already has a pending request.
    pub async fn create(&self, request: NewRefundRequest) -> Result<RefundRequest, AppError> {
        match self.repo.create_if_none_pending(&request).await? {
            Some(created) => {
                info!("Refund request {} created by user {}", created.id, created.user_id);
                Ok(created)
            }
            None => {
                warn!(user_id = request.user_id, "Refund request rejected: one is already pending");
                Err(AppError::Conflict(PENDING_REFUND_WARNING.to_string()))
            }
        }
    }

    /// Owner edit of ticket code and reason. Only pending requests change.
    pub async fn amend(&self, request: &RefundRequest, ticket_code: i64, reason: String) -> Result<RefundRequest, AppError> {
        if !request.is_pending() {
            return Err(AppError::Conflict("La solicitud ya fue resuelta.".to_string()));
        }
        let mut changed = request.clone();
        changed.ticket_code = ticket_code;
        changed.reason = reason;
        self.repo.update(&changed).await
    }

    pub async fn decide(&self, id: i64, decision: RefundDecision) -> Result<RefundRequest, AppError> {
        let today = Utc::now().with_timezone(&self.tz).date_naive();
        match self.repo.decide(id, decision.status(), today).await? {
            Some(decided) => {
                info!("Refund request {} set to {}", decided.id, decided.status.as_str());
                Ok(decided)
            }
            None => {
                if self.repo.find_by_id(id).await?.is_none() {
                    return Err(AppError::not_found("Solicitud de reembolso"));
                }
                warn!(refund_id = id, "Refund decision on a request that is no longer pending");
                Err(AppError::Conflict("La solicitud ya fue resuelta.".to_string()))
            }
        }
    }
}
