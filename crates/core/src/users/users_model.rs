//! User domain models and the audit fields every record carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::EntityId;

/// Domain model representing a Balances user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<EntityId>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<EntityId>,
}

impl User {
    /// Name to show in listings, falling back to the login name.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// A relation field in a denormalized view: either the related entity, when
/// it is loaded, or just its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Related<T> {
    Loaded(Box<T>),
    Id(EntityId),
}

impl<T> Related<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Related::Loaded(value) => Some(value.as_ref()),
            Related::Id(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Related::Loaded(_))
    }
}

impl Related<User> {
    pub fn id(&self) -> &EntityId {
        match self {
            Related::Loaded(user) => &user.id,
            Related::Id(id) => id,
        }
    }
}

/// Creation/update/deletion stamps shared by all asset records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrail {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub created_by: Related<User>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<Related<User>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub deleted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_by: Option<Related<User>>,
}

impl AuditTrail {
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}
