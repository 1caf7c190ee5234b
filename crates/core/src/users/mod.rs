//! Users module - user model and shared audit/relation view types.

mod users_model;

pub use users_model::{AuditTrail, Related, User};
