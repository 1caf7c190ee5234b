//! Plain-text rendering helpers.

use balances_core::constants::DISPLAY_DECIMAL_PRECISION;
use balances_core::users::{Related, User};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn money(amount: Decimal, currency: &str) -> String {
    format!(
        "{} {}",
        amount.round_dp(DISPLAY_DECIMAL_PRECISION),
        currency
    )
}

pub fn date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Wire name of a serde enum, e.g. `in_use`.
pub fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => "?".to_string(),
    }
}

/// Display name of a related user, or its id when it is not loaded.
pub fn user(related: &Related<User>) -> String {
    match related {
        Related::Loaded(user) => user.display_name().to_string(),
        Related::Id(id) => id.to_string(),
    }
}

/// Left-aligned columns padded to the widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rounds_to_display_precision() {
        assert_eq!(money(dec!(1250.456), "USD"), "1250.46 USD");
        assert_eq!(money(dec!(3), "EUR"), "3 EUR");
    }

    #[test]
    fn test_label_uses_wire_name() {
        use balances_core::properties::PropertyStatus;
        assert_eq!(label(&PropertyStatus::NotInUse), "not_in_use");
    }

    #[test]
    fn test_table_pads_columns() {
        let rows = vec![
            vec!["a1".to_string(), "Checking".to_string()],
            vec!["long-id".to_string(), "S".to_string()],
        ];
        assert_eq!(
            table(&["ID", "NAME"], &rows),
            "ID       NAME\na1       Checking\nlong-id  S"
        );
    }
}
