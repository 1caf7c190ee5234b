use rust_decimal::Decimal;
use serde::Serialize;

/// Totals per asset class, plus the grand total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub bank_accounts_total: Decimal,
    pub bank_accounts_count: usize,
    pub vehicles_total: Decimal,
    pub vehicles_count: usize,
    pub properties_total: Decimal,
    pub properties_count: usize,
    pub total: Decimal,
}
