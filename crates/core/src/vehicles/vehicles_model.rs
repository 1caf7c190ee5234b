//! Vehicle domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, EntityKind, InputModel};
use crate::errors::{Error, Result, ValidationError};
use crate::users::{AuditTrail, Related};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    #[default]
    Car,
    Truck,
    Bicycle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    InUse,
    Retired,
    Sold,
}

/// Domain model representing a vehicle and its valuation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: EntityId,
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub title_holder: String,
    pub license_plate_number: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub purchase_date: DateTime<Utc>,
    pub initial_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub initial_value_date: DateTime<Utc>,
    pub current_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub current_value_date: DateTime<Utc>,
    pub annual_depreciation_percent: Decimal,
    pub status: VehicleStatus,
    #[serde(flatten)]
    pub audit: AuditTrail,
    #[serde(default)]
    pub values: Vec<Related<VehicleValue>>,
}

impl Vehicle {
    /// Vehicles that still count towards net worth.
    pub fn is_held(&self) -> bool {
        self.status != VehicleStatus::Sold && !self.audit.is_deleted()
    }

    /// Loaded valuations, oldest first.
    pub fn value_history(&self) -> Vec<&VehicleValue> {
        let mut history: Vec<&VehicleValue> =
            self.values.iter().filter_map(Related::loaded).collect();
        history.sort_by_key(|value| value.date);
        history
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleValue {
    pub id: EntityId,
    pub vehicle_id: EntityId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub value: Decimal,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

/// Input model for creating or updating a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub title_holder: String,
    pub license_plate_number: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub purchase_date: DateTime<Utc>,
    pub initial_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub initial_value_date: DateTime<Utc>,
    pub current_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub current_value_date: DateTime<Utc>,
    pub annual_depreciation_percent: Decimal,
    pub status: VehicleStatus,
}

impl VehicleInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Vehicle name cannot be empty".to_string(),
            )));
        }
        if self.initial_value.is_sign_negative() || self.current_value.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Vehicle values cannot be negative".to_string(),
            )));
        }
        if self.current_value_date < self.initial_value_date {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Current value date cannot precede the initial value date".to_string(),
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleValueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub vehicle_id: EntityId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub value: Decimal,
}

impl VehicleValueInput {
    pub fn validate(&self) -> Result<()> {
        if self.vehicle_id.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "vehicleId".to_string(),
            )));
        }
        if self.value.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Value cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

impl InputModel for VehicleInput {
    const KIND: EntityKind = EntityKind::Vehicles;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<()> {
        VehicleInput::validate(self)
    }
}

impl InputModel for VehicleValueInput {
    const KIND: EntityKind = EntityKind::VehicleValues;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<()> {
        VehicleValueInput::validate(self)
    }
}
