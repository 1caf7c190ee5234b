//! Unit tests for readiness derivation.

use super::readiness::{is_ready, missing, references};
use super::*;
use serde_json::json;

fn cache_with(payloads: &[(EntityKind, serde_json::Value)]) -> EntityCache {
    let mut cache = EntityCache::new();
    for (kind, payload) in payloads {
        let normalized = normalize(payload, Schema::Entity(*kind)).unwrap();
        cache.merge(&normalized.entities);
    }
    cache
}

#[test]
fn test_missing_root_reports_only_root() {
    let cache = EntityCache::new();
    let missing = missing(&cache, EntityKind::BankAccounts, &EntityId::new("a"));
    assert_eq!(
        missing.into_iter().collect::<Vec<_>>(),
        vec![EntityRef::new(EntityKind::BankAccounts, "a")]
    );
}

#[test]
fn test_dangling_relations_are_not_ready() {
    let cache = cache_with(&[(
        EntityKind::BankAccounts,
        json!({ "id": "a", "createdBy": "u1", "balances": ["b1", "b2"] }),
    )]);

    let missing = missing(&cache, EntityKind::BankAccounts, &EntityId::new("a"));
    assert!(missing.contains(&EntityRef::new(EntityKind::Users, "u1")));
    assert!(missing.contains(&EntityRef::new(EntityKind::BankAccountBalances, "b1")));
    assert!(missing.contains(&EntityRef::new(EntityKind::BankAccountBalances, "b2")));
    assert!(!is_ready(&cache, EntityKind::BankAccounts, &EntityId::new("a")));
}

#[test]
fn test_second_level_references_must_resolve() {
    let cache = cache_with(&[
        (
            EntityKind::BankAccounts,
            json!({
                "id": "a",
                "createdBy": { "id": "u1", "username": "alice" },
                "balances": [{ "id": "b1", "bankAccountId": "a", "createdBy": "u2" }]
            }),
        ),
    ]);

    let missing = missing(&cache, EntityKind::BankAccounts, &EntityId::new("a"));
    assert_eq!(
        missing.into_iter().collect::<Vec<_>>(),
        vec![EntityRef::new(EntityKind::Users, "u2")]
    );
}

#[test]
fn test_ready_once_everything_resolves() {
    let cache = cache_with(&[
        (
            EntityKind::BankAccounts,
            json!({
                "id": "A",
                "createdBy": { "id": "u1" },
                "updatedBy": null,
                "balances": [{ "id": "b1", "bankAccountId": "a", "createdBy": "U1" }]
            }),
        ),
    ]);
    assert!(is_ready(&cache, EntityKind::BankAccounts, &EntityId::new("a")));
}

#[test]
fn test_references_lists_relation_ids() {
    let record = json!({ "id": "v", "values": ["x", "Y"], "createdBy": "u", "deletedBy": "" });
    let refs = references(EntityKind::Vehicles, record.as_object().unwrap());
    assert_eq!(
        refs,
        vec![
            EntityRef::new(EntityKind::VehicleValues, "x"),
            EntityRef::new(EntityKind::VehicleValues, "y"),
            EntityRef::new(EntityKind::Users, "u"),
        ]
    );
}
