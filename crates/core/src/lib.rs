//! Balances Core - entity cache, normalization, pagination state and domain
//! models for the Balances personal finance tracker.
//!
//! This crate is transport-agnostic: it never performs I/O against the
//! backend. The `balances-client` crate drives it from HTTP responses.

pub mod bank_accounts;
pub mod constants;
pub mod dashboard;
pub mod drafts;
pub mod entities;
pub mod errors;
pub mod properties;
pub mod search;
pub mod session;
pub mod state;
pub mod users;
pub mod vehicles;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
