//! Application state: the single owner of session, cache and request state.

use log::{debug, warn};
use std::collections::BTreeMap;

use super::actions::{Action, FetchOutcome, Operation};
use super::api_state::{ApiState, ApiStateReducer};
use super::pagination::{query_key, PaginationRecord, PaginationReducer};
use crate::entities::{EntityCache, EntityKind};
use crate::session::Session;

#[derive(Debug)]
pub struct AppState {
    pub session: Option<Session>,
    pub entities: EntityCache,
    pub last_error: Option<String>,
    paginations: BTreeMap<Operation, PaginationReducer>,
    api_states: BTreeMap<Operation, ApiStateReducer>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Registers a pagination reducer for every search and a fetch-state
    /// reducer for every other operation.
    pub fn new() -> Self {
        let mut paginations = BTreeMap::new();
        let mut api_states = BTreeMap::new();
        for operation in [Operation::Login, Operation::RefreshToken] {
            api_states.insert(operation, ApiStateReducer::for_operation(operation));
        }
        for kind in EntityKind::ALL {
            let search = Operation::Search(kind);
            paginations.insert(search, PaginationReducer::for_operation(search, query_key));
            for operation in [
                Operation::Get(kind),
                Operation::Create(kind),
                Operation::Update(kind),
                Operation::Delete(kind),
            ] {
                api_states.insert(operation, ApiStateReducer::for_operation(operation));
            }
        }
        Self {
            session: None,
            entities: EntityCache::new(),
            last_error: None,
            paginations,
            api_states,
        }
    }

    /// Routes `action` through every reducer. Returns whether any part of
    /// the state changed.
    pub fn dispatch(&mut self, action: &Action) -> bool {
        match action {
            Action::Fetch(fetch) => {
                debug!("dispatch {}", fetch.action_type());
                let mut changed = false;
                match &fetch.outcome {
                    FetchOutcome::Success(response) => {
                        if let Some(normalized) = &response.normalized {
                            changed |= self.entities.merge(&normalized.entities);
                        }
                    }
                    FetchOutcome::Failure(message) => {
                        warn!("{} failed: {}", fetch.operation, message);
                        if self.last_error.as_deref() != Some(message.as_str()) {
                            self.last_error = Some(message.clone());
                            changed = true;
                        }
                    }
                    FetchOutcome::Request => {}
                }
                if let Some(reducer) = self.paginations.get_mut(&fetch.operation) {
                    changed |= reducer.reduce(action);
                }
                if let Some(reducer) = self.api_states.get_mut(&fetch.operation) {
                    changed |= reducer.reduce(action);
                }
                changed
            }
            Action::Authenticated(session) => {
                let changed = self.session.as_ref() != Some(session);
                self.session = Some(session.clone());
                changed
            }
            Action::Deauthenticated => {
                let mut changed = self.session.is_some() || !self.entities.is_empty();
                self.session = None;
                self.entities.clear();
                for reducer in self.paginations.values_mut() {
                    changed |= reducer.reset();
                }
                for reducer in self.api_states.values_mut() {
                    changed |= reducer.reset();
                }
                changed
            }
            Action::ClearError => self.last_error.take().is_some(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Pagination record for a search `kind` and query key.
    pub fn pagination(&self, kind: EntityKind, key: &str) -> PaginationRecord {
        self.paginations
            .get(&Operation::Search(kind))
            .map(|reducer| reducer.record(key))
            .unwrap_or_default()
    }

    /// Fetch state of a non-search operation.
    pub fn api_state(&self, operation: Operation) -> ApiState {
        self.api_states
            .get(&operation)
            .map(ApiStateReducer::state)
            .unwrap_or_default()
    }

    /// Whether any request is in flight.
    pub fn is_busy(&self) -> bool {
        self.api_states.values().any(|r| r.state().is_fetching)
            || self.paginations.values().any(|r| {
                r.keys().any(|key| r.record(key).is_fetching)
            })
    }
}
