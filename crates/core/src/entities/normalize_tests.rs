//! Unit tests for payload normalization and denormalization.

use super::*;
use serde_json::json;

const ACCOUNT_ID: &str = "0190A1B2-C3D4-7E5F-8A9B-0C1D2E3F4A5B";
const BALANCE_ID: &str = "0190A1B2-C3D4-7E5F-8A9B-00000000B001";
const USER_ID: &str = "0190A1B2-C3D4-7E5F-8A9B-00000000C0DE";

fn account_payload() -> serde_json::Value {
    json!({
        "id": ACCOUNT_ID,
        "accountName": "Daily",
        "bankName": "First Bank",
        "createdBy": { "id": USER_ID, "username": "alice", "name": "Alice" },
        "balances": [
            {
                "id": BALANCE_ID,
                "bankAccountId": ACCOUNT_ID,
                "balance": 1250.5,
                "date": 1700000000000_i64,
                "createdBy": USER_ID
            }
        ]
    })
}

#[test]
fn test_normalize_single_entity_extracts_nested_relations() {
    let normalized = normalize(&account_payload(), Schema::Entity(EntityKind::BankAccounts)).unwrap();

    let account_id = EntityId::new(ACCOUNT_ID);
    assert_eq!(normalized.result, NormalizedResult::One(account_id.clone()));

    let account = normalized
        .entities
        .record(EntityKind::BankAccounts, &account_id)
        .unwrap();
    assert_eq!(account["id"], json!(ACCOUNT_ID.to_lowercase()));
    assert_eq!(account["createdBy"], json!(USER_ID.to_lowercase()));
    assert_eq!(account["balances"], json!([BALANCE_ID.to_lowercase()]));

    let balance = normalized
        .entities
        .record(EntityKind::BankAccountBalances, &EntityId::new(BALANCE_ID))
        .unwrap();
    assert_eq!(balance["bankAccountId"], json!(ACCOUNT_ID.to_lowercase()));
    assert_eq!(balance["balance"], json!(1250.5));

    let user = normalized
        .entities
        .record(EntityKind::Users, &EntityId::new(USER_ID))
        .unwrap();
    assert_eq!(user["username"], json!("alice"));
}

#[test]
fn test_normalize_list_keeps_server_order() {
    let payload = json!([
        { "id": "B", "accountName": "second" },
        { "id": "a", "accountName": "first" },
        { "id": "C", "accountName": "third" }
    ]);
    let normalized = normalize(&payload, Schema::List(EntityKind::BankAccounts)).unwrap();

    assert_eq!(
        normalized.result,
        NormalizedResult::Many(vec![EntityId::new("b"), EntityId::new("a"), EntityId::new("c")])
    );
    assert_eq!(normalized.entities[&EntityKind::BankAccounts].len(), 3);
}

#[test]
fn test_normalize_string_reference_creates_no_entity() {
    let payload = json!({ "id": "v1", "name": "Car", "createdBy": "USER-1", "values": [] });
    let normalized = normalize(&payload, Schema::Entity(EntityKind::Vehicles)).unwrap();

    let vehicle = normalized
        .entities
        .record(EntityKind::Vehicles, &EntityId::new("v1"))
        .unwrap();
    assert_eq!(vehicle["createdBy"], json!("user-1"));
    assert!(!normalized.entities.contains_key(&EntityKind::Users));
}

#[test]
fn test_normalize_absent_and_null_relations_are_left_alone() {
    let payload = json!({ "id": "p1", "name": "House", "updatedBy": null });
    let normalized = normalize(&payload, Schema::Entity(EntityKind::Properties)).unwrap();

    let property = normalized
        .entities
        .record(EntityKind::Properties, &EntityId::new("p1"))
        .unwrap();
    assert_eq!(property["updatedBy"], serde_json::Value::Null);
    assert!(!property.contains_key("values"));
}

#[test]
fn test_normalize_same_entity_twice_merges_fields() {
    let payload = json!([
        { "id": "v1", "vehicleId": "car", "value": 10, "createdBy": { "id": "u1", "username": "alice" } },
        { "id": "v2", "vehicleId": "car", "value": 11, "createdBy": { "id": "U1", "email": "a@example.com" } }
    ]);
    let normalized = normalize(&payload, Schema::List(EntityKind::VehicleValues)).unwrap();

    let user = normalized
        .entities
        .record(EntityKind::Users, &EntityId::new("u1"))
        .unwrap();
    assert_eq!(user["username"], json!("alice"));
    assert_eq!(user["email"], json!("a@example.com"));
}

#[test]
fn test_normalize_rejects_malformed_payloads() {
    let not_a_list = normalize(&json!({ "id": "x" }), Schema::List(EntityKind::Users));
    assert!(matches!(not_a_list, Err(crate::Error::Decode(_))));

    let missing_id = normalize(&json!({ "name": "x" }), Schema::Entity(EntityKind::Users));
    assert!(matches!(missing_id, Err(crate::Error::Decode(_))));

    let numeric_id = normalize(&json!({ "id": 7 }), Schema::Entity(EntityKind::Users));
    assert!(matches!(numeric_id, Err(crate::Error::Decode(_))));

    let bad_list = normalize(
        &json!({ "id": "a", "balances": "nope" }),
        Schema::Entity(EntityKind::BankAccounts),
    );
    assert!(matches!(bad_list, Err(crate::Error::Decode(_))));

    let bad_reference = normalize(
        &json!({ "id": "a", "createdBy": 42 }),
        Schema::Entity(EntityKind::BankAccounts),
    );
    assert!(matches!(bad_reference, Err(crate::Error::Decode(_))));
}

#[test]
fn test_normalize_is_deterministic() {
    let first = normalize(&account_payload(), Schema::Entity(EntityKind::BankAccounts)).unwrap();
    let second = normalize(&account_payload(), Schema::Entity(EntityKind::BankAccounts)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_denormalize_round_trips_modulo_id_case() {
    let normalized = normalize(&account_payload(), Schema::Entity(EntityKind::BankAccounts)).unwrap();
    let rebuilt = denormalize(
        Schema::Entity(EntityKind::BankAccounts),
        &normalized.result,
        &normalized.entities,
    )
    .unwrap();

    let expected = json!({
        "id": ACCOUNT_ID.to_lowercase(),
        "accountName": "Daily",
        "bankName": "First Bank",
        "createdBy": { "id": USER_ID.to_lowercase(), "username": "alice", "name": "Alice" },
        "balances": [
            {
                "id": BALANCE_ID.to_lowercase(),
                "bankAccountId": ACCOUNT_ID.to_lowercase(),
                "balance": 1250.5,
                "date": 1700000000000_i64,
                "createdBy": { "id": USER_ID.to_lowercase(), "username": "alice", "name": "Alice" }
            }
        ]
    });
    assert_eq!(rebuilt, expected);
}

#[test]
fn test_denormalize_missing_root_is_none() {
    let entities = EntityMap::new();
    let rebuilt = denormalize(
        Schema::Entity(EntityKind::Users),
        &NormalizedResult::One(EntityId::new("ghost")),
        &entities,
    );
    assert!(rebuilt.is_none());
}

#[test]
fn test_denormalize_keeps_parent_reference_as_id() {
    let normalized = normalize(&account_payload(), Schema::Entity(EntityKind::BankAccounts)).unwrap();
    let rebuilt = denormalize(
        Schema::Entity(EntityKind::BankAccountBalances),
        &NormalizedResult::One(EntityId::new(BALANCE_ID)),
        &normalized.entities,
    )
    .unwrap();

    assert_eq!(rebuilt["bankAccountId"], json!(ACCOUNT_ID.to_lowercase()));
    assert_eq!(rebuilt["createdBy"]["username"], json!("alice"));
}
