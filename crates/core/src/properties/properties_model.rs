//! Property (real estate) domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, EntityKind, InputModel};
use crate::errors::{Error, Result, ValidationError};
use crate::users::{AuditTrail, Related};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Land,
    #[default]
    House,
    Apartment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    NotInUse,
    #[default]
    InUse,
    Rented,
    Sold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyAreaUnit {
    #[default]
    Sqm,
    Sqft,
}

/// Domain model representing a property and its valuation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: EntityId,
    pub name: String,
    pub address: String,
    pub total_area: Decimal,
    pub building_area: Decimal,
    pub area_unit: PropertyAreaUnit,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub title_holder: String,
    pub tax_identifier: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub purchase_date: DateTime<Utc>,
    pub initial_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub initial_value_date: DateTime<Utc>,
    pub current_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub current_value_date: DateTime<Utc>,
    pub annual_appreciation_percent: Decimal,
    pub status: PropertyStatus,
    #[serde(flatten)]
    pub audit: AuditTrail,
    #[serde(default)]
    pub values: Vec<Related<PropertyValue>>,
}

impl Property {
    /// Properties that still count towards net worth.
    pub fn is_held(&self) -> bool {
        self.status != PropertyStatus::Sold && !self.audit.is_deleted()
    }

    /// Loaded valuations, oldest first.
    pub fn value_history(&self) -> Vec<&PropertyValue> {
        let mut history: Vec<&PropertyValue> =
            self.values.iter().filter_map(Related::loaded).collect();
        history.sort_by_key(|value| value.date);
        history
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    pub id: EntityId,
    pub property_id: EntityId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub value: Decimal,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

/// Input model for creating or updating a property.
///
/// The backend reads the appreciation rate from `annualDepreciationPercent`
/// on input while returning it as `annualAppreciationPercent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub address: String,
    pub total_area: Decimal,
    pub building_area: Decimal,
    pub area_unit: PropertyAreaUnit,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub title_holder: String,
    pub tax_identifier: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub purchase_date: DateTime<Utc>,
    pub initial_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub initial_value_date: DateTime<Utc>,
    pub current_value: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub current_value_date: DateTime<Utc>,
    #[serde(rename = "annualDepreciationPercent")]
    pub annual_appreciation_percent: Decimal,
    pub status: PropertyStatus,
}

impl PropertyInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Property name cannot be empty".to_string(),
            )));
        }
        if self.building_area > self.total_area {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Building area cannot exceed total area".to_string(),
            )));
        }
        if self.initial_value.is_sign_negative() || self.current_value.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Property values cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub property_id: EntityId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub value: Decimal,
}

impl PropertyValueInput {
    pub fn validate(&self) -> Result<()> {
        if self.property_id.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "propertyId".to_string(),
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

impl InputModel for PropertyInput {
    const KIND: EntityKind = EntityKind::Properties;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<()> {
        PropertyInput::validate(self)
    }
}

impl InputModel for PropertyValueInput {
    const KIND: EntityKind = EntityKind::PropertyValues;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<()> {
        PropertyValueInput::validate(self)
    }
}
