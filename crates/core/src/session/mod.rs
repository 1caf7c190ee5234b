//! Session module - the authenticated session record and its persistence.

mod file_session_store;
mod session_model;
mod session_traits;

#[cfg(test)]
mod session_tests;

pub use file_session_store::{CookieNames, FileSessionStore};
pub use session_model::{Credentials, Session, TokenGrant};
pub use session_traits::{MemorySessionStore, SessionStore};
