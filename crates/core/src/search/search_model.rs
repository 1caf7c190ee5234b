use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::EntityId;

/// Body of a `{resource}/search` request.
///
/// Unset fields are omitted so the backend applies its own defaults. The
/// date range and parent ids only apply to the history resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_ids: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_ids: Option<Vec<EntityId>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub end_date: Option<DateTime<Utc>>,
}

impl SearchFilter {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    /// Page requested, defaulting to the first one.
    pub fn page_or_first(&self) -> u32 {
        self.page.filter(|page| *page >= 1).unwrap_or(1)
    }

    /// Stable key identifying this query for pagination bookkeeping.
    ///
    /// Two filters that differ only in the page share a key, so paging
    /// through results overwrites one record instead of creating many.
    pub fn pagination_key(&self) -> String {
        let mut parts = vec![self.keyword.as_deref().unwrap_or_default().to_string()];
        if self.include_deleted.unwrap_or(false) {
            parts.push("deleted".to_string());
        }
        if let Some(size) = self.page_size {
            parts.push(format!("size={size}"));
        }
        if let Some(id) = &self.bank_account_id {
            parts.push(format!("account={id}"));
        }
        if let Some(ids) = &self.vehicle_ids {
            parts.push(format!("vehicles={}", join_ids(ids)));
        }
        if let Some(ids) = &self.property_ids {
            parts.push(format!("properties={}", join_ids(ids)));
        }
        if let Some(start) = self.start_date {
            parts.push(format!("from={}", start.timestamp_millis()));
        }
        if let Some(end) = self.end_date {
            parts.push(format!("to={}", end.timestamp_millis()));
        }
        parts.join("|")
    }
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(EntityId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Page metadata returned alongside search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u32,
    pub page_count: u32,
}

impl PageInfo {
    pub fn new(page: u32, page_size: u32, total_count: u32) -> Self {
        Self {
            page,
            page_size,
            total_count,
            page_count: page_count(total_count, page_size),
        }
    }
}

/// Number of pages needed for `total_count` items.
pub fn page_count(total_count: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Query parameters for a detail (`GET {resource}/{id}`) request.
///
/// `with_history` asks the backend to embed the balance or value series,
/// optionally bounded by dates and capped at `page_size` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailQuery {
    pub with_history: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page_size: Option<u32>,
}

impl DetailQuery {
    pub fn with_history() -> Self {
        Self {
            with_history: true,
            ..Self::default()
        }
    }

    /// Query-string pairs, using the parameter names the resource expects
    /// (`withBalances`/`balanceStartDate` for accounts, `withValues`/
    /// `valueStartDate` for vehicles and properties).
    pub fn to_params(&self, history_param: &str, date_prefix: &str) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.with_history {
            return params;
        }
        params.push((history_param.to_string(), "true".to_string()));
        if let Some(start) = self.start_date {
            params.push((
                format!("{date_prefix}StartDate"),
                start.timestamp_millis().to_string(),
            ));
        }
        if let Some(end) = self.end_date {
            params.push((
                format!("{date_prefix}EndDate"),
                end.timestamp_millis().to_string(),
            ));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize".to_string(), size.to_string()));
        }
        params
    }
}
