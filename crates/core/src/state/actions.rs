//! Actions dispatched into [`AppState`](super::AppState).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{EntityKind, Normalized};
use crate::errors::{Error, Result};
use crate::search::PageInfo;
use crate::session::Session;

/// Every logical call the client makes against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "name", content = "kind")]
pub enum Operation {
    Login,
    RefreshToken,
    Search(EntityKind),
    Get(EntityKind),
    Create(EntityKind),
    Update(EntityKind),
    Delete(EntityKind),
}

impl Operation {
    /// The entity kind the operation reads or writes, if any.
    pub fn kind(self) -> Option<EntityKind> {
        match self {
            Operation::Login | Operation::RefreshToken => None,
            Operation::Search(kind)
            | Operation::Get(kind)
            | Operation::Create(kind)
            | Operation::Update(kind)
            | Operation::Delete(kind) => Some(kind),
        }
    }

    pub fn is_search(self) -> bool {
        matches!(self, Operation::Search(_))
    }

    /// Whether the call needs a bearer token.
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Operation::Login)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Login => f.write_str("auth/login"),
            Operation::RefreshToken => f.write_str("auth/token"),
            Operation::Search(kind) => write!(f, "{kind}/search"),
            Operation::Get(kind) => write!(f, "{kind}/get"),
            Operation::Create(kind) => write!(f, "{kind}/create"),
            Operation::Update(kind) => write!(f, "{kind}/update"),
            Operation::Delete(kind) => write!(f, "{kind}/delete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Request,
    Success,
    Failure,
}

/// The (operation, phase) pair reducers are registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionType {
    pub operation: Operation,
    pub phase: Phase,
}

impl ActionType {
    pub fn new(operation: Operation, phase: Phase) -> Self {
        Self { operation, phase }
    }

    /// The request, success and failure types of `operation`, in that order.
    pub fn triple(operation: Operation) -> [ActionType; 3] {
        [
            Self::new(operation, Phase::Request),
            Self::new(operation, Phase::Success),
            Self::new(operation, Phase::Failure),
        ]
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.operation, self.phase)
    }
}

/// Checks that `types` are the request/success/failure triple of a single
/// operation and returns that operation.
pub(crate) fn triple_operation(types: &[ActionType]) -> Result<Operation> {
    let [request, success, failure] = types else {
        return Err(Error::invalid_reducer(format!(
            "expected exactly three action types, got {}",
            types.len()
        )));
    };
    let operation = request.operation;
    if success.operation != operation || failure.operation != operation {
        return Err(Error::invalid_reducer(format!(
            "action types must share one operation, got {request}, {success}, {failure}"
        )));
    }
    if [request.phase, success.phase, failure.phase]
        != [Phase::Request, Phase::Success, Phase::Failure]
    {
        return Err(Error::invalid_reducer(format!(
            "action types must be ordered request, success, failure; got {request}, {success}, {failure}"
        )));
    }
    Ok(operation)
}

/// Identifies the slice of paginated state a fetch belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub key: String,
    pub page: u32,
}

impl Query {
    pub fn new(key: impl Into<String>, page: u32) -> Self {
        Self {
            key: key.into(),
            page,
        }
    }
}

/// Payload of a successful fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResponse {
    /// Normalized entities; `None` for calls that return no records.
    pub normalized: Option<Normalized>,
    /// Present for search results.
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Request,
    Success(FetchResponse),
    Failure(String),
}

impl FetchOutcome {
    pub fn phase(&self) -> Phase {
        match self {
            FetchOutcome::Request => Phase::Request,
            FetchOutcome::Success(_) => Phase::Success,
            FetchOutcome::Failure(_) => Phase::Failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchAction {
    pub operation: Operation,
    pub query: Option<Query>,
    pub outcome: FetchOutcome,
}

impl FetchAction {
    pub fn request(operation: Operation, query: Option<Query>) -> Self {
        Self {
            operation,
            query,
            outcome: FetchOutcome::Request,
        }
    }

    pub fn success(operation: Operation, query: Option<Query>, response: FetchResponse) -> Self {
        Self {
            operation,
            query,
            outcome: FetchOutcome::Success(response),
        }
    }

    pub fn failure(operation: Operation, query: Option<Query>, message: impl Into<String>) -> Self {
        Self {
            operation,
            query,
            outcome: FetchOutcome::Failure(message.into()),
        }
    }

    pub fn action_type(&self) -> ActionType {
        ActionType::new(self.operation, self.outcome.phase())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Fetch(FetchAction),
    Authenticated(Session),
    Deauthenticated,
    ClearError,
}

impl Action {
    /// Fetch actions have a type reducers can match on; session actions do
    /// not.
    pub fn action_type(&self) -> Option<ActionType> {
        match self {
            Action::Fetch(fetch) => Some(fetch.action_type()),
            _ => None,
        }
    }
}

impl From<FetchAction> for Action {
    fn from(action: FetchAction) -> Self {
        Action::Fetch(action)
    }
}
