//! Entity identity types shared by the normalizer, the cache and readiness.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A flattened entity record: nested entities have been replaced by ids.
pub type Record = Map<String, Value>;

/// Normalized entities grouped by kind, then by id.
pub type EntityMap = BTreeMap<EntityKind, BTreeMap<EntityId, Record>>;

/// Every kind of record the Balances API returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Users,
    BankAccounts,
    BankAccountBalances,
    Vehicles,
    VehicleValues,
    Properties,
    PropertyValues,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Users,
        EntityKind::BankAccounts,
        EntityKind::BankAccountBalances,
        EntityKind::Vehicles,
        EntityKind::VehicleValues,
        EntityKind::Properties,
        EntityKind::PropertyValues,
    ];

    /// Name of the collection this kind is stored under.
    pub fn collection_name(self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::BankAccounts => "bankAccounts",
            EntityKind::BankAccountBalances => "bankAccountBalances",
            EntityKind::Vehicles => "vehicles",
            EntityKind::VehicleValues => "vehicleValues",
            EntityKind::Properties => "properties",
            EntityKind::PropertyValues => "propertyValues",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

/// Case-folded entity identifier.
///
/// The API returns UUIDs in whatever case the endpoint happens to produce, so
/// ids are trimmed and lower-cased on construction. Two fetches of the same
/// record through different endpoints therefore land in the same cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(EntityId::new(raw))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        EntityId::new(raw)
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        EntityId::new(raw)
    }
}

impl From<Uuid> for EntityId {
    fn from(id: Uuid) -> Self {
        EntityId(id.hyphenated().to_string())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A typed pointer into the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
