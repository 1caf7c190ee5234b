//! In-flight tracking for operations that are not paginated.

use serde::Serialize;

use super::actions::{triple_operation, Action, ActionType, FetchOutcome, Operation};
use crate::errors::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiState {
    pub is_fetching: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiStateReducer {
    operation: Operation,
    state: ApiState,
}

impl ApiStateReducer {
    /// Same construction contract as
    /// [`PaginationReducer::new`](super::PaginationReducer::new).
    pub fn new(types: &[ActionType]) -> Result<Self> {
        triple_operation(types).map(Self::for_operation)
    }

    pub(crate) fn for_operation(operation: Operation) -> Self {
        Self {
            operation,
            state: ApiState::default(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn state(&self) -> ApiState {
        self.state
    }

    pub fn reduce(&mut self, action: &Action) -> bool {
        let Action::Fetch(fetch) = action else {
            return false;
        };
        if fetch.operation != self.operation {
            return false;
        }
        let is_fetching = matches!(fetch.outcome, FetchOutcome::Request);
        let changed = self.state.is_fetching != is_fetching;
        self.state.is_fetching = is_fetching;
        changed
    }

    /// Returns whether anything was cleared.
    pub fn reset(&mut self) -> bool {
        let changed = self.state != ApiState::default();
        self.state = ApiState::default();
        changed
    }
}
