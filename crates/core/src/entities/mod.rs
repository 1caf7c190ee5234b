//! Entities module - identity types, schemas, normalization, the entity cache
//! and readiness derivation.

mod entities_model;
mod entities_traits;
mod entity_cache;
mod normalize;
pub mod readiness;
mod schema;

#[cfg(test)]
mod entity_cache_tests;
#[cfg(test)]
mod normalize_tests;
#[cfg(test)]
mod readiness_tests;

// Re-export the public interface
pub use entities_model::{EntityId, EntityKind, EntityMap, EntityRef, Record};
pub use entities_traits::InputModel;
pub use entity_cache::EntityCache;
pub use normalize::{denormalize, normalize, EntitySource, Normalized, NormalizedResult};
pub use schema::{Cardinality, EntitySchema, Relation, Schema};
