use log::warn;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::dashboard_model::AssetSummary;
use crate::bank_accounts::BankAccountStatus;
use crate::entities::{EntityCache, EntityKind};
use crate::properties::PropertyStatus;
use crate::vehicles::VehicleStatus;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountFigures {
    last_balance: Decimal,
    #[serde(default)]
    status: BankAccountStatus,
    #[serde(default)]
    deleted: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VehicleFigures {
    current_value: Decimal,
    #[serde(default)]
    status: VehicleStatus,
    #[serde(default)]
    deleted: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyFigures {
    current_value: Decimal,
    #[serde(default)]
    status: PropertyStatus,
    #[serde(default)]
    deleted: Option<i64>,
}

/// Totals the assets currently in the cache.
///
/// Only active bank accounts and vehicles or properties that have not been
/// sold are counted; soft-deleted records never are. Records missing the
/// amount field (for example from a partial listing) are skipped.
pub fn summarize(cache: &EntityCache) -> AssetSummary {
    let mut summary = AssetSummary::default();

    for account in figures::<AccountFigures>(cache, EntityKind::BankAccounts) {
        if account.deleted.is_none() && account.status == BankAccountStatus::Active {
            summary.bank_accounts_total += account.last_balance;
            summary.bank_accounts_count += 1;
        }
    }
    for vehicle in figures::<VehicleFigures>(cache, EntityKind::Vehicles) {
        if vehicle.deleted.is_none() && vehicle.status != VehicleStatus::Sold {
            summary.vehicles_total += vehicle.current_value;
            summary.vehicles_count += 1;
        }
    }
    for property in figures::<PropertyFigures>(cache, EntityKind::Properties) {
        if property.deleted.is_none() && property.status != PropertyStatus::Sold {
            summary.properties_total += property.current_value;
            summary.properties_count += 1;
        }
    }

    summary.total = summary.bank_accounts_total + summary.vehicles_total + summary.properties_total;
    summary
}

fn figures<T: DeserializeOwned>(cache: &EntityCache, kind: EntityKind) -> Vec<T> {
    cache
        .records(kind)
        .filter_map(|(id, record)| {
            match serde_json::from_value::<T>(Value::Object(record.clone())) {
                Ok(figures) => Some(figures),
                Err(e) => {
                    warn!("Skipping {kind}/{id} in summary: {e}");
                    None
                }
            }
        })
        .collect()
}
