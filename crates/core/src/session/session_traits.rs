use std::sync::Mutex;

use super::session_model::Session;
use crate::errors::{Error, Result};

/// Persistence for the session record and the locale preference.
///
/// Implementations must not return a session whose expiry has passed.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;

    fn save(&self, session: &Session) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn load_locale(&self) -> Result<Option<String>>;

    fn save_locale(&self, locale: &str) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    session: Option<Session>,
    locale: Option<String>,
}

/// Process-local store, used in tests and for one-shot commands.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<MemoryState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                session: Some(session),
                locale: None,
            }),
        }
    }

    fn with_state<T>(&self, op: impl FnOnce(&mut MemoryState) -> T) -> Result<T> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| Error::Session("Session store lock poisoned".into()))?;
        Ok(op(&mut guard))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let now = chrono::Utc::now();
        self.with_state(|state| {
            state
                .session
                .clone()
                .filter(|session| !session.is_expired(now))
        })
    }

    fn save(&self, session: &Session) -> Result<()> {
        self.with_state(|state| state.session = Some(session.clone()))
    }

    fn clear(&self) -> Result<()> {
        self.with_state(|state| state.session = None)
    }

    fn load_locale(&self) -> Result<Option<String>> {
        self.with_state(|state| state.locale.clone())
    }

    fn save_locale(&self, locale: &str) -> Result<()> {
        self.with_state(|state| state.locale = Some(locale.to_string()))
    }
}
