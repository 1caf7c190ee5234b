//! Wire types for the Balances REST API.

use balances_core::entities::EntityKind;
use balances_core::search::PageInfo;
use serde::Deserialize;
use serde_json::Value;

/// Every response body: `data` on success, `error` on failure, `message`
/// for plain acknowledgements such as the health check.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<Value>,
    pub message: Option<String>,
}

/// One page of search results, items still in their nested wire form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub items: Vec<Value>,
    pub page_info: PageInfo,
}

/// Path of the REST resource serving `kind`, relative to the base URL.
pub fn resource_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Users => "users",
        EntityKind::BankAccounts => "bankAccounts",
        EntityKind::BankAccountBalances => "bankAccounts/balances",
        EntityKind::Vehicles => "vehicles",
        EntityKind::VehicleValues => "vehicles/values",
        EntityKind::Properties => "properties",
        EntityKind::PropertyValues => "properties/values",
    }
}

/// Query parameter and date prefix a detail request uses to embed history,
/// for the kinds that have one.
pub(crate) fn history_params(kind: EntityKind) -> Option<(&'static str, &'static str)> {
    match kind {
        EntityKind::BankAccounts => Some(("withBalances", "balance")),
        EntityKind::Vehicles | EntityKind::Properties => Some(("withValues", "value")),
        _ => None,
    }
}
