//! Unit tests for the entity cache merge policy.

#[cfg(test)]
mod tests {
    use crate::entities::{normalize, EntityCache, EntityId, EntityKind, Schema};
    use serde::Deserialize;
    use serde_json::json;

    fn merge_payload(cache: &mut EntityCache, payload: serde_json::Value) -> bool {
        let normalized = normalize(&payload, Schema::Entity(EntityKind::BankAccounts)).unwrap();
        cache.merge(&normalized.entities)
    }

    #[test]
    fn test_merge_summary_then_detail_keeps_all_fields() {
        let mut cache = EntityCache::new();
        merge_payload(
            &mut cache,
            json!({ "id": "acc-1", "accountName": "Daily", "bankName": "First Bank" }),
        );
        merge_payload(
            &mut cache,
            json!({ "id": "ACC-1", "bankName": "First Bank Ltd", "accountNumber": "123" }),
        );

        let record = cache
            .get(EntityKind::BankAccounts, &EntityId::new("acc-1"))
            .unwrap();
        assert_eq!(record["accountName"], json!("Daily"));
        assert_eq!(record["bankName"], json!("First Bank Ltd"));
        assert_eq!(record["accountNumber"], json!("123"));
        assert_eq!(cache.len(EntityKind::BankAccounts), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let payload = json!({
            "id": "acc-1",
            "accountName": "Daily",
            "balances": [{ "id": "b1", "balance": 10 }]
        });
        let mut cache = EntityCache::new();
        assert!(merge_payload(&mut cache, payload.clone()));
        let once = cache.clone();

        assert!(!merge_payload(&mut cache, payload));
        assert_eq!(cache, once);
    }

    #[test]
    fn test_revision_only_advances_on_change() {
        let mut cache = EntityCache::new();
        assert_eq!(cache.revision(), 0);

        merge_payload(&mut cache, json!({ "id": "acc-1", "accountName": "Daily" }));
        assert_eq!(cache.revision(), 1);

        merge_payload(&mut cache, json!({ "id": "acc-1", "accountName": "Daily" }));
        assert_eq!(cache.revision(), 1);

        merge_payload(&mut cache, json!({ "id": "acc-1", "accountName": "Savings" }));
        assert_eq!(cache.revision(), 2);
    }

    #[test]
    fn test_nested_objects_merge_and_arrays_replace() {
        let mut cache = EntityCache::new();
        merge_payload(
            &mut cache,
            json!({ "id": "a", "meta": { "color": "red" }, "balances": ["b1", "b2"] }),
        );
        merge_payload(
            &mut cache,
            json!({ "id": "a", "meta": { "icon": "bank" }, "balances": ["b3"] }),
        );

        let record = cache.get(EntityKind::BankAccounts, &EntityId::new("a")).unwrap();
        assert_eq!(record["meta"], json!({ "color": "red", "icon": "bank" }));
        assert_eq!(record["balances"], json!(["b3"]));
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut cache = EntityCache::new();
        merge_payload(&mut cache, json!({ "id": "a" }));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.revision(), 2);

        cache.clear();
        assert_eq!(cache.revision(), 2);
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct AccountView {
        account_name: String,
        balances: Vec<BalanceView>,
    }

    #[derive(Debug, Deserialize)]
    struct BalanceView {
        id: String,
        balance: f64,
    }

    #[test]
    fn test_view_rebuilds_typed_aggregate() {
        let mut cache = EntityCache::new();
        merge_payload(
            &mut cache,
            json!({
                "id": "a",
                "accountName": "Daily",
                "balances": [{ "id": "B1", "balance": 10.5 }]
            }),
        );

        let view: AccountView = cache
            .view(EntityKind::BankAccounts, &EntityId::new("a"))
            .unwrap()
            .unwrap();
        assert_eq!(view.account_name, "Daily");
        assert_eq!(view.balances.len(), 1);
        assert_eq!(view.balances[0].id, "b1");
        assert_eq!(view.balances[0].balance, 10.5);

        let missing: Option<AccountView> = cache
            .view(EntityKind::BankAccounts, &EntityId::new("nope"))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_view_with_wrong_shape_is_decode_error() {
        let mut cache = EntityCache::new();
        merge_payload(&mut cache, json!({ "id": "a", "accountName": 12 }));

        let result = cache.view::<AccountView>(EntityKind::BankAccounts, &EntityId::new("a"));
        assert!(matches!(result, Err(crate::Error::Decode(_))));
    }

    #[test]
    fn test_uuid_ids_match_their_upper_case_spelling() {
        let uuid = uuid::Uuid::parse_str("A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11").unwrap();
        let mut cache = EntityCache::new();
        merge_payload(
            &mut cache,
            json!({ "id": "A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11", "accountName": "Daily" }),
        );

        assert!(cache.contains(EntityKind::BankAccounts, &EntityId::from(uuid)));
    }
}
