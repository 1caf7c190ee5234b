//! Readiness of an aggregate in the entity cache.
//!
//! An aggregate is ready when its root record is loaded, every entity its
//! relations point at is loaded, and the relations of those entities resolve
//! too. Anything deeper is not required.

use serde_json::Value;
use std::collections::BTreeSet;

use super::entities_model::{EntityId, EntityKind, EntityRef, Record};
use super::entity_cache::EntityCache;
use super::schema::Cardinality;

/// References the aggregate rooted at `kind`/`id` still needs.
///
/// If the root itself is missing only the root is reported, since its
/// relations are unknown until it arrives.
pub fn missing(cache: &EntityCache, kind: EntityKind, id: &EntityId) -> BTreeSet<EntityRef> {
    let mut missing = BTreeSet::new();
    let Some(root) = cache.get(kind, id) else {
        missing.insert(EntityRef::new(kind, id.clone()));
        return missing;
    };

    for related in references(kind, root) {
        match cache.get(related.kind, &related.id) {
            None => {
                missing.insert(related);
            }
            Some(record) => {
                for nested in references(related.kind, record) {
                    if !cache.contains(nested.kind, &nested.id) {
                        missing.insert(nested);
                    }
                }
            }
        }
    }
    missing
}

pub fn is_ready(cache: &EntityCache, kind: EntityKind, id: &EntityId) -> bool {
    missing(cache, kind, id).is_empty()
}

/// Every entity referenced by `record`'s relation fields.
pub fn references(kind: EntityKind, record: &Record) -> Vec<EntityRef> {
    let mut refs = Vec::new();
    for relation in kind.schema().relations {
        match (relation.cardinality, record.get(relation.field)) {
            (Cardinality::One, Some(Value::String(raw))) => {
                push_ref(&mut refs, relation.target, raw);
            }
            (Cardinality::Many, Some(Value::Array(items))) => {
                for raw in items.iter().filter_map(Value::as_str) {
                    push_ref(&mut refs, relation.target, raw);
                }
            }
            _ => {}
        }
    }
    refs
}

fn push_ref(refs: &mut Vec<EntityRef>, kind: EntityKind, raw: &str) {
    let id = EntityId::new(raw);
    if !id.is_empty() {
        refs.push(EntityRef::new(kind, id));
    }
}
