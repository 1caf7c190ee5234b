//! Dashboard module - asset totals across the entity cache.

mod dashboard_model;
mod dashboard_service;


pub use dashboard_model::AssetSummary;
pub use dashboard_service::summarize;
