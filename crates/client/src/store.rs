//! The store: runs backend calls and feeds their outcome into [`AppState`].
//!
//! Every call dispatches a request action, performs the HTTP call,
//! normalizes the response and dispatches success or failure. A 401 from
//! any authenticated call ends the session before the error is returned.

use balances_core::bank_accounts::BankAccount;
use balances_core::constants::{DEFAULT_LOCALE, DEFAULT_PAGE_SIZE};
use balances_core::dashboard::{self, AssetSummary};
use balances_core::entities::{
    normalize, readiness, EntityId, EntityKind, EntityRef, InputModel, NormalizedResult, Schema,
};
use balances_core::properties::Property;
use balances_core::search::{DetailQuery, SearchFilter};
use balances_core::session::{Credentials, Session, SessionStore};
use balances_core::state::{
    Action, AppState, FetchAction, FetchResponse, Operation, PaginationRecord, Query,
};
use balances_core::users::User;
use balances_core::vehicles::Vehicle;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::client::BalancesApi;
use crate::error::{ClientError, Result};

/// Default overall deadline for readiness convergence.
const DEFAULT_READY_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Page size for searches that do not set one.
    pub default_page_size: u32,
    /// Deadline for [`BalancesStore::ensure_ready`].
    pub ready_timeout: Duration,
    pub default_locale: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

pub struct BalancesStore {
    api: Arc<dyn BalancesApi>,
    sessions: Arc<dyn SessionStore>,
    state: AppState,
    options: StoreOptions,
    /// Readiness fetches dispatched as requests but not yet completed.
    in_flight: BTreeSet<Operation>,
}

impl BalancesStore {
    pub fn new(
        api: Arc<dyn BalancesApi>,
        sessions: Arc<dyn SessionStore>,
        options: StoreOptions,
    ) -> Self {
        Self {
            api,
            sessions,
            state: AppState::new(),
            options,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: &Action) -> bool {
        self.state.dispatch(action)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Restores a persisted, unexpired session. Returns whether one was found.
    pub fn hydrate(&mut self) -> Result<bool> {
        match self.sessions.load()? {
            Some(session) if !session.is_expired(Utc::now()) => {
                debug!("Hydrated session for {}", session.user.username);
                self.dispatch(&Action::Authenticated(session));
                Ok(true)
            }
            Some(_) => {
                self.sessions.clear()?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Logs in with basic credentials and persists the session.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<Session> {
        let operation = Operation::Login;
        self.dispatch(&FetchAction::request(operation, None).into());

        let outcome = match self.api.login(credentials).await {
            Ok(session) => user_response(&session.user).map(|response| (session, response)),
            Err(e) => Err(e),
        };
        let (session, response) = match outcome {
            Ok(done) => done,
            Err(e) => return Err(self.fail(operation, None, e)),
        };

        self.dispatch(&FetchAction::success(operation, None, response).into());
        self.dispatch(&Action::Authenticated(session.clone()));
        if let Err(e) = self.sessions.save(&session) {
            warn!("Could not persist session: {}", e);
        }
        info!("Logged in as {}", session.user.username);
        Ok(session)
    }

    /// Exchanges the current token for a fresh one. Any failure ends the
    /// session.
    pub async fn refresh_token(&mut self) -> Result<Session> {
        let operation = Operation::RefreshToken;
        let Some(mut session) = self.state.session.clone() else {
            return Err(ClientError::unauthorized("Not logged in"));
        };
        self.dispatch(&FetchAction::request(operation, None).into());

        match self.api.refresh_token(&session.token).await {
            Ok(grant) => {
                session.renew(grant);
                self.dispatch(&FetchAction::success(operation, None, FetchResponse::default()).into());
                self.dispatch(&Action::Authenticated(session.clone()));
                if let Err(e) = self.sessions.save(&session) {
                    warn!("Could not persist refreshed session: {}", e);
                }
                Ok(session)
            }
            Err(e) => {
                let error = self.fail(operation, None, e);
                if !error.is_unauthorized() {
                    self.deauthenticate()?;
                }
                Err(error)
            }
        }
    }

    /// Drops the session, the cached entities and the persisted record.
    pub fn deauthenticate(&mut self) -> Result<()> {
        self.dispatch(&Action::Deauthenticated);
        self.sessions.clear()?;
        Ok(())
    }

    pub fn locale(&self) -> String {
        match self.sessions.load_locale() {
            Ok(Some(locale)) => locale,
            Ok(None) => self.options.default_locale.clone(),
            Err(e) => {
                warn!("Could not read locale preference: {}", e);
                self.options.default_locale.clone()
            }
        }
    }

    pub fn set_locale(&self, locale: &str) -> Result<()> {
        Ok(self.sessions.save_locale(locale)?)
    }

    fn token(&mut self) -> Result<String> {
        let now = Utc::now();
        let live = match &self.state.session {
            Some(session) => (!session.is_expired(now)).then(|| session.token.clone()),
            None => return Err(ClientError::unauthorized("Not logged in")),
        };
        match live {
            Some(token) => Ok(token),
            None => {
                self.deauthenticate()?;
                Err(ClientError::unauthorized("Session expired"))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────────

    /// Runs a search and returns the updated pagination record for its key.
    pub async fn search(&mut self, kind: EntityKind, filter: &SearchFilter) -> Result<PaginationRecord> {
        let mut filter = filter.clone();
        filter.page_size.get_or_insert(self.options.default_page_size);
        let key = filter.pagination_key();
        let query = Some(Query::new(key.clone(), filter.page_or_first()));
        let operation = Operation::Search(kind);

        let token = self.token()?;
        self.dispatch(&FetchAction::request(operation, query.clone()).into());

        let outcome = match self.api.search(&token, kind, &filter).await {
            Ok(page) => normalize(&Value::Array(page.items), Schema::List(kind))
                .map(|normalized| FetchResponse {
                    normalized: Some(normalized),
                    page_info: Some(page.page_info),
                })
                .map_err(ClientError::from),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(response) => {
                self.dispatch(&FetchAction::success(operation, query, response).into());
                Ok(self.state.pagination(kind, &key))
            }
            Err(e) => Err(self.fail(operation, query, e)),
        }
    }

    /// Fetches every page of a search, returning all ids in server order.
    pub async fn search_all(&mut self, kind: EntityKind, filter: &SearchFilter) -> Result<Vec<EntityId>> {
        let mut ids = Vec::new();
        let mut page = 1;
        loop {
            let mut paged = filter.clone();
            paged.page = Some(page);
            let record = self.search(kind, &paged).await?;
            ids.extend(record.ids);
            if page >= record.page_count {
                return Ok(ids);
            }
            page += 1;
        }
    }

    /// Fetches one record (with its history when asked) into the cache.
    pub async fn fetch(&mut self, kind: EntityKind, id: &EntityId, query: &DetailQuery) -> Result<EntityId> {
        let token = self.token()?;
        let operation = Operation::Get(kind);
        self.dispatch(&FetchAction::request(operation, None).into());
        let result = self.api.get(&token, kind, id, query).await;
        self.complete_single(operation, kind, result)
    }

    /// Validates `input`, then creates it or, when it carries an id, updates
    /// it. Returns the id of the stored record.
    pub async fn save<I: InputModel>(&mut self, input: &I) -> Result<EntityId> {
        input.validate()?;
        let body = serde_json::to_value(input)?;
        let token = self.token()?;
        let kind = I::KIND;

        let (operation, result) = match input.id() {
            Some(id) => {
                let operation = Operation::Update(kind);
                self.dispatch(&FetchAction::request(operation, None).into());
                (operation, self.api.update(&token, kind, id, body).await)
            }
            None => {
                let operation = Operation::Create(kind);
                self.dispatch(&FetchAction::request(operation, None).into());
                (operation, self.api.create(&token, kind, body).await)
            }
        };
        self.complete_single(operation, kind, result)
    }

    /// Soft-deletes a record; the returned record (with its deletion stamp)
    /// is merged into the cache.
    pub async fn delete(&mut self, kind: EntityKind, id: &EntityId) -> Result<EntityId> {
        if kind == EntityKind::Users {
            return Err(ClientError::invalid_request("users cannot be deleted"));
        }
        let token = self.token()?;
        let operation = Operation::Delete(kind);
        self.dispatch(&FetchAction::request(operation, None).into());
        let result = self.api.delete(&token, kind, id).await;
        self.complete_single(operation, kind, result)
    }

    fn complete_single(
        &mut self,
        operation: Operation,
        kind: EntityKind,
        result: Result<Value>,
    ) -> Result<EntityId> {
        let outcome = result.and_then(|value| {
            normalize(&value, Schema::Entity(kind)).map_err(ClientError::from)
        });
        match outcome {
            Ok(normalized) => {
                let id = match &normalized.result {
                    NormalizedResult::One(id) => id.clone(),
                    NormalizedResult::Many(_) => {
                        return Err(self.fail(
                            operation,
                            None,
                            ClientError::invalid_response("expected a single record"),
                        ))
                    }
                };
                let response = FetchResponse {
                    normalized: Some(normalized),
                    page_info: None,
                };
                self.dispatch(&FetchAction::success(operation, None, response).into());
                Ok(id)
            }
            Err(e) => Err(self.fail(operation, None, e)),
        }
    }

    /// Records a failed call. A 401 ends the session first.
    fn fail(&mut self, operation: Operation, query: Option<Query>, error: ClientError) -> ClientError {
        if error.is_unauthorized() && operation.is_authenticated() {
            warn!("{} was unauthorized; ending session", operation);
            if let Err(e) = self.deauthenticate() {
                warn!("Could not clear persisted session: {}", e);
            }
        }
        self.dispatch(&FetchAction::failure(operation, query, error.to_string()).into());
        error
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Readiness
    // ─────────────────────────────────────────────────────────────────────────

    /// Loads whatever the aggregate rooted at `kind`/`id` still misses.
    ///
    /// Missing records are fetched concurrently, round after round, until
    /// the aggregate is ready. Stops with `DependencyFailed` when a fetch
    /// fails, `Unresolvable` when a round leaves the same records missing,
    /// and `ReadinessTimeout` when the configured deadline passes.
    pub async fn ensure_ready(&mut self, kind: EntityKind, id: &EntityId) -> Result<()> {
        let timeout = self.options.ready_timeout;
        let outcome = tokio::time::timeout(timeout, self.converge(kind, id)).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                let error = ClientError::ReadinessTimeout {
                    entity: EntityRef::new(kind, id.clone()),
                    timeout,
                };
                warn!("{}", error);
                // Abandoned fetches never reported back; close them out.
                for operation in std::mem::take(&mut self.in_flight) {
                    self.dispatch(&FetchAction::failure(operation, None, error.to_string()).into());
                }
                Err(error)
            }
        }
    }

    pub fn is_ready(&self, kind: EntityKind, id: &EntityId) -> bool {
        readiness::is_ready(&self.state.entities, kind, id)
    }

    async fn converge(&mut self, kind: EntityKind, id: &EntityId) -> Result<()> {
        let mut previous: Option<BTreeSet<EntityRef>> = None;
        loop {
            let missing = readiness::missing(&self.state.entities, kind, id);
            if missing.is_empty() {
                return Ok(());
            }
            if previous.as_ref() == Some(&missing) {
                return Err(ClientError::Unresolvable(missing.into_iter().collect()));
            }
            debug!("{}/{} waiting on {} records", kind, id, missing.len());

            let token = self.token()?;
            for entity in &missing {
                let operation = Operation::Get(entity.kind);
                self.in_flight.insert(operation);
                self.dispatch(&FetchAction::request(operation, None).into());
            }
            let fetches: Vec<_> = missing
                .iter()
                .map(|entity| {
                    let api = Arc::clone(&self.api);
                    let token = token.clone();
                    let entity = entity.clone();
                    async move {
                        let result = api
                            .get(&token, entity.kind, &entity.id, &DetailQuery::default())
                            .await;
                        (entity, result)
                    }
                })
                .collect();

            let results = join_all(fetches).await;
            self.in_flight.clear();
            let mut failed: Option<(EntityRef, ClientError)> = None;
            for (entity, result) in results {
                let operation = Operation::Get(entity.kind);
                if let Err(e) = self.complete_single(operation, entity.kind, result) {
                    failed.get_or_insert((entity, e));
                }
                // A 401 ended the session; later results must not repopulate the cache.
                if self.state.session.is_none() {
                    break;
                }
            }
            if let Some((entity, error)) = failed {
                if error.is_unauthorized() {
                    return Err(error);
                }
                return Err(ClientError::DependencyFailed {
                    entity,
                    source: Box::new(error),
                });
            }
            previous = Some(missing);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────────

    pub fn current_user(&self) -> Option<&User> {
        self.state.session.as_ref().map(|session| &session.user)
    }

    pub fn user(&self, id: &EntityId) -> Result<Option<User>> {
        self.view(EntityKind::Users, id)
    }

    pub fn bank_account(&self, id: &EntityId) -> Result<Option<BankAccount>> {
        self.view(EntityKind::BankAccounts, id)
    }

    pub fn vehicle(&self, id: &EntityId) -> Result<Option<Vehicle>> {
        self.view(EntityKind::Vehicles, id)
    }

    pub fn property(&self, id: &EntityId) -> Result<Option<Property>> {
        self.view(EntityKind::Properties, id)
    }

    /// Typed views for the current page of a search key.
    pub fn page<T: DeserializeOwned>(&self, kind: EntityKind, key: &str) -> Result<Vec<T>> {
        let record = self.state.pagination(kind, key);
        Ok(self.state.entities.views(kind, &record.ids)?)
    }

    pub fn views<T: DeserializeOwned>(&self, kind: EntityKind, ids: &[EntityId]) -> Result<Vec<T>> {
        Ok(self.state.entities.views(kind, ids)?)
    }

    pub fn summary(&self) -> AssetSummary {
        dashboard::summarize(&self.state.entities)
    }

    fn view<T: DeserializeOwned>(&self, kind: EntityKind, id: &EntityId) -> Result<Option<T>> {
        Ok(self.state.entities.view(kind, id)?)
    }
}

fn user_response(user: &User) -> Result<FetchResponse> {
    let value = serde_json::to_value(user)?;
    let normalized = normalize(&value, Schema::Entity(EntityKind::Users))?;
    Ok(FetchResponse {
        normalized: Some(normalized),
        page_info: None,
    })
}
