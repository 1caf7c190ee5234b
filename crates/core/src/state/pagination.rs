//! Pagination bookkeeping keyed by caller-defined query keys.

use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::actions::{triple_operation, Action, ActionType, FetchAction, FetchOutcome, Operation};
use crate::entities::EntityId;
use crate::errors::Result;

/// Pagination state of one query key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRecord {
    pub is_fetching: bool,
    pub current_page: u32,
    pub page_count: u32,
    pub total_count: u32,
    /// Ids of the last successfully fetched page, in server order.
    pub ids: Vec<EntityId>,
}

impl Default for PaginationRecord {
    fn default() -> Self {
        Self {
            is_fetching: false,
            current_page: 1,
            page_count: 0,
            total_count: 0,
            ids: Vec::new(),
        }
    }
}

type KeyFn = Box<dyn Fn(&FetchAction) -> Option<String> + Send + Sync>;

/// Key extractor used by the application state: the key carried on the
/// action's query.
pub fn query_key(action: &FetchAction) -> Option<String> {
    action.query.as_ref().map(|query| query.key.clone())
}

/// Tracks a [`PaginationRecord`] per key for one search operation.
pub struct PaginationReducer {
    operation: Operation,
    map_action_to_key: KeyFn,
    records: BTreeMap<String, PaginationRecord>,
}

impl PaginationReducer {
    /// Builds a reducer for the request/success/failure `types` of a single
    /// operation. Any other shape of `types` is rejected here rather than
    /// surfacing later during dispatch.
    pub fn new<F>(types: &[ActionType], map_action_to_key: F) -> Result<Self>
    where
        F: Fn(&FetchAction) -> Option<String> + Send + Sync + 'static,
    {
        let operation = triple_operation(types)?;
        Ok(Self::for_operation(operation, map_action_to_key))
    }

    pub(crate) fn for_operation<F>(operation: Operation, map_action_to_key: F) -> Self
    where
        F: Fn(&FetchAction) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            operation,
            map_action_to_key: Box::new(map_action_to_key),
            records: BTreeMap::new(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Applies `action`. Returns whether any record changed.
    pub fn reduce(&mut self, action: &Action) -> bool {
        let Action::Fetch(fetch) = action else {
            return false;
        };
        if fetch.operation != self.operation {
            return false;
        }
        let Some(key) = (self.map_action_to_key)(fetch) else {
            warn!(
                "Ignoring {} without a pagination key",
                fetch.action_type()
            );
            return false;
        };

        let record = self.records.entry(key).or_default();
        let before = record.clone();
        match &fetch.outcome {
            FetchOutcome::Request => record.is_fetching = true,
            FetchOutcome::Success(response) => {
                record.is_fetching = false;
                record.ids = response
                    .normalized
                    .as_ref()
                    .map(|normalized| normalized.result.ids())
                    .unwrap_or_default();
                if let Some(query) = &fetch.query {
                    record.current_page = query.page.max(1);
                }
                match response.page_info {
                    Some(info) => {
                        record.page_count = info.page_count;
                        record.total_count = info.total_count;
                    }
                    None => {
                        record.total_count = u32::try_from(record.ids.len()).unwrap_or(u32::MAX);
                        record.page_count = u32::from(record.total_count > 0);
                    }
                }
            }
            FetchOutcome::Failure(_) => record.is_fetching = false,
        }
        *record != before
    }

    /// The record for `key`, or the default record if the key was never
    /// fetched.
    pub fn record(&self, key: &str) -> PaginationRecord {
        self.records.get(key).cloned().unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn reset(&mut self) -> bool {
        let changed = !self.records.is_empty();
        self.records.clear();
        changed
    }
}

impl fmt::Debug for PaginationReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationReducer")
            .field("operation", &self.operation)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}
