pub mod auth_service;
pub mod event_changes;
pub mod event_service;
pub mod formatting;
pub mod policy;
pub mod refund_service;
pub mod ticket_cap;
pub mod ticket_service;
