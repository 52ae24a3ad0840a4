pub mod comment;
pub mod event;
pub mod notification;
pub mod rating;
pub mod refund;
pub mod session;
pub mod ticket;
pub mod user;
