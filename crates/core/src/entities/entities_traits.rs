use serde::Serialize;

use super::entities_model::{EntityId, EntityKind};
use crate::errors::Result;

/// An input DTO the backend accepts for create and update calls.
pub trait InputModel: Serialize + Send + Sync {
    /// Kind of entity the input creates or updates.
    const KIND: EntityKind;

    /// Id of the record being updated; `None` for a new record.
    fn id(&self) -> Option<&EntityId>;

    fn validate(&self) -> Result<()>;
}
