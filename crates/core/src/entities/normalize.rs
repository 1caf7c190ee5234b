//! Flattening of nested API payloads into id-keyed entity maps, and the
//! reverse walk used to rebuild nested views from the cache.

use log::error;
use serde_json::Value;
use std::collections::BTreeMap;

use super::entities_model::{EntityId, EntityKind, EntityMap, EntityRef, Record};
use super::entity_cache::{merge_record, EntityCache};
use super::schema::{Cardinality, Schema};
use crate::errors::{Error, Result};

/// Ids found at the root of a normalized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResult {
    One(EntityId),
    Many(Vec<EntityId>),
}

impl NormalizedResult {
    /// The root ids in payload order.
    pub fn ids(&self) -> Vec<EntityId> {
        match self {
            NormalizedResult::One(id) => vec![id.clone()],
            NormalizedResult::Many(ids) => ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub result: NormalizedResult,
    pub entities: EntityMap,
}

/// Normalizes `payload` according to `schema`.
///
/// Relation fields holding objects are extracted recursively and replaced by
/// the nested entity's id. Relation fields already holding an id string are
/// kept as references; no entity record is created for them.
pub fn normalize(payload: &Value, schema: Schema) -> Result<Normalized> {
    let mut entities = EntityMap::new();
    let result = match schema {
        Schema::Entity(kind) => NormalizedResult::One(visit_entity(payload, kind, &mut entities)?),
        Schema::List(kind) => {
            let items = payload.as_array().ok_or_else(|| {
                error!("Expected an array of {} but got: {}", kind, payload);
                Error::decode(format!("expected an array of {kind}"))
            })?;
            let ids = items
                .iter()
                .map(|item| visit_entity(item, kind, &mut entities))
                .collect::<Result<Vec<_>>>()?;
            NormalizedResult::Many(ids)
        }
    };
    Ok(Normalized { result, entities })
}

fn visit_entity(value: &Value, kind: EntityKind, entities: &mut EntityMap) -> Result<EntityId> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::decode(format!("expected an object for {kind}, got {value}")))?;
    let schema = kind.schema();

    let id = object
        .get(schema.id_attribute)
        .and_then(Value::as_str)
        .map(EntityId::new)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            Error::decode(format!(
                "{kind} record is missing a string '{}' attribute",
                schema.id_attribute
            ))
        })?;

    let mut record = object.clone();
    record.insert(
        schema.id_attribute.to_string(),
        Value::String(id.as_str().to_string()),
    );

    for relation in schema.relations {
        let Some(field) = record.get_mut(relation.field) else {
            continue;
        };
        let replaced = match relation.cardinality {
            Cardinality::One => visit_reference(field, relation.target, entities)?,
            Cardinality::Many => match field {
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| visit_reference(item, relation.target, entities))
                        .collect::<Result<Vec<_>>>()?,
                ),
                Value::Null => Value::Null,
                other => {
                    return Err(Error::decode(format!(
                        "{kind}.{} must be an array, got {other}",
                        relation.field
                    )))
                }
            },
        };
        *field = replaced;
    }

    let slot = entities
        .entry(kind)
        .or_insert_with(BTreeMap::new)
        .entry(id.clone())
        .or_default();
    merge_record(slot, &record);

    Ok(id)
}

fn visit_reference(value: &Value, target: EntityKind, entities: &mut EntityMap) -> Result<Value> {
    match value {
        Value::Object(_) => {
            let id = visit_entity(value, target, entities)?;
            Ok(Value::String(id.into_string()))
        }
        Value::String(raw) => Ok(Value::String(EntityId::new(raw).into_string())),
        Value::Null => Ok(Value::Null),
        other => Err(Error::decode(format!(
            "reference to {target} must be an object or an id, got {other}"
        ))),
    }
}

/// Read access to normalized records, implemented by both a freshly
/// normalized [`EntityMap`] and the long-lived [`EntityCache`].
pub trait EntitySource {
    fn record(&self, kind: EntityKind, id: &EntityId) -> Option<&Record>;
}

impl EntitySource for EntityMap {
    fn record(&self, kind: EntityKind, id: &EntityId) -> Option<&Record> {
        self.get(&kind).and_then(|records| records.get(id))
    }
}

impl EntitySource for EntityCache {
    fn record(&self, kind: EntityKind, id: &EntityId) -> Option<&Record> {
        self.get(kind, id)
    }
}

/// Rebuilds the nested JSON for `result` by following ids through `source`.
///
/// Ids without a matching record stay as plain id strings, as do
/// non-expanding reference fields. A relation back to an entity that is
/// already being expanded higher up also stays an id, so cyclic schemas
/// always terminate.
///
/// Returns `None` when a single-entity root is not in `source`; missing list
/// members are skipped.
pub fn denormalize(
    schema: Schema,
    result: &NormalizedResult,
    source: &impl EntitySource,
) -> Option<Value> {
    let kind = schema.kind();
    let mut stack = Vec::new();
    match result {
        NormalizedResult::One(id) => denormalize_entity(kind, id, source, &mut stack),
        NormalizedResult::Many(ids) => Some(Value::Array(
            ids.iter()
                .filter_map(|id| denormalize_entity(kind, id, source, &mut stack))
                .collect(),
        )),
    }
}

fn denormalize_entity(
    kind: EntityKind,
    id: &EntityId,
    source: &impl EntitySource,
    stack: &mut Vec<EntityRef>,
) -> Option<Value> {
    let record = source.record(kind, id)?;
    let mut out = record.clone();
    stack.push(EntityRef::new(kind, id.clone()));

    for relation in kind.schema().relations.iter().filter(|r| r.expand) {
        let Some(field) = out.get_mut(relation.field) else {
            continue;
        };
        match (relation.cardinality, field) {
            (Cardinality::One, slot) => expand_slot(slot, relation.target, source, stack),
            (Cardinality::Many, Value::Array(items)) => {
                for slot in items.iter_mut() {
                    expand_slot(slot, relation.target, source, stack);
                }
            }
            (Cardinality::Many, _) => {}
        }
    }

    stack.pop();
    Some(Value::Object(out))
}

fn expand_slot(
    slot: &mut Value,
    target: EntityKind,
    source: &impl EntitySource,
    stack: &mut Vec<EntityRef>,
) {
    let Some(id) = slot.as_str().map(EntityId::new) else {
        return;
    };
    let reference = EntityRef::new(target, id);
    if stack.contains(&reference) {
        return;
    }
    if let Some(expanded) = denormalize_entity(target, &reference.id, source, stack) {
        *slot = expanded;
    }
}
