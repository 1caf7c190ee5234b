//! Process-wide entity cache.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use super::entities_model::{EntityId, EntityKind, EntityMap, Record};
use super::normalize::{denormalize, NormalizedResult};
use super::schema::Schema;
use crate::errors::{Error, Result};

/// Keyed store of every entity fetched so far.
///
/// Incoming records are deep-merged into existing ones, so a list fetch that
/// returns a few fields and a later detail fetch that returns the rest end
/// up as one complete record. `revision` only advances when a merge actually
/// changes something; callers compare revisions to skip redundant work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCache {
    collections: BTreeMap<EntityKind, BTreeMap<EntityId, Record>>,
    revision: u64,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges normalized entities into the cache. Returns whether anything
    /// changed.
    pub fn merge(&mut self, entities: &EntityMap) -> bool {
        let mut changed = false;
        for (kind, records) in entities {
            let collection = self.collections.entry(*kind).or_default();
            for (id, incoming) in records {
                match collection.get_mut(id) {
                    Some(existing) => changed |= merge_record(existing, incoming),
                    None => {
                        collection.insert(id.clone(), incoming.clone());
                        changed = true;
                    }
                }
            }
        }
        if changed {
            self.revision += 1;
        }
        changed
    }

    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Option<&Record> {
        self.collections.get(&kind).and_then(|records| records.get(id))
    }

    pub fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.get(kind, id).is_some()
    }

    pub fn records(&self, kind: EntityKind) -> impl Iterator<Item = (&EntityId, &Record)> {
        self.collections
            .get(&kind)
            .into_iter()
            .flat_map(|records| records.iter())
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.collections.get(&kind).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(BTreeMap::is_empty)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drops every record. Used when the session ends.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.collections.clear();
            self.revision += 1;
        }
    }

    /// Denormalizes one entity and decodes it into a typed view.
    ///
    /// Returns `Ok(None)` when the entity has not been loaded yet. A record
    /// that is present but does not fit `T` is a decode error.
    pub fn view<T: DeserializeOwned>(&self, kind: EntityKind, id: &EntityId) -> Result<Option<T>> {
        let Some(value) = denormalize(
            Schema::Entity(kind),
            &NormalizedResult::One(id.clone()),
            self,
        ) else {
            return Ok(None);
        };
        decode_view(kind, value).map(Some)
    }

    /// Typed views for a list of ids, skipping any that are not loaded yet.
    pub fn views<T: DeserializeOwned>(&self, kind: EntityKind, ids: &[EntityId]) -> Result<Vec<T>> {
        ids.iter()
            .filter_map(|id| self.view(kind, id).transpose())
            .collect()
    }
}

fn decode_view<T: DeserializeOwned>(kind: EntityKind, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::decode(format!("cached {kind} record does not match its model: {e}")))
}

/// Field-by-field merge of `incoming` into `target`.
///
/// Nested objects merge recursively; arrays and scalars are replaced.
/// Returns whether `target` changed.
pub(crate) fn merge_record(target: &mut Record, incoming: &Record) -> bool {
    let mut changed = false;
    for (key, value) in incoming {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(next)) => {
                changed |= merge_record(existing, next);
            }
            (Some(existing), next) => {
                if *existing != *next {
                    *existing = next.clone();
                    changed = true;
                }
            }
            (None, next) => {
                target.insert(key.clone(), next.clone());
                changed = true;
            }
        }
    }
    changed
}
