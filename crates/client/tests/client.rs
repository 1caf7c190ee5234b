mod common;

use balances_client::{BalancesApi, ClientError};
use balances_core::entities::{EntityId, EntityKind};
use balances_core::search::{DetailQuery, SearchFilter};
use common::{account, client, credentials, requests, spawn, Backend};
use serde_json::json;

#[tokio::test]
async fn health_reports_message() {
    let (base_url, _) = spawn(Backend::default()).await;
    assert_eq!(client(&base_url).health().await.unwrap(), "OK");
}

#[tokio::test]
async fn login_sends_basic_credentials() {
    let (base_url, _) = spawn(Backend::default()).await;
    let session = client(&base_url).login(&credentials()).await.unwrap();

    assert_eq!(session.token, "token-1");
    assert_eq!(session.user.id.as_str(), "u1");
    assert_eq!(session.expiration.timestamp_millis(), common::EXPIRATION_MS);
}

#[tokio::test]
async fn search_unwraps_page_envelope() {
    let items = vec![account("a1", "One"), account("a2", "Two"), account("a3", "Three")];
    let (base_url, shared) = spawn(Backend::default().with_search("bankAccounts/balances", items)).await;

    let filter = SearchFilter {
        bank_account_id: Some(EntityId::new("a1")),
        ..SearchFilter::keyword("x").with_page(2, 2)
    };
    let page = client(&base_url)
        .search("token-1", EntityKind::BankAccountBalances, &filter)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page_info.page, 2);
    assert_eq!(page.page_info.page_count, 2);
    assert_eq!(page.page_info.total_count, 3);
    assert!(requests(&shared).contains(&"POST bankAccounts/balances/search".to_string()));
    assert_eq!(
        shared.lock().unwrap().last_body,
        Some(json!({ "keyword": "x", "page": 2, "pageSize": 2, "bankAccountId": "a1" }))
    );
}

#[tokio::test]
async fn rejected_token_is_unauthorized() {
    let (base_url, _) = spawn(Backend::default()).await;
    let error = client(&base_url)
        .get("bogus", EntityKind::Users, &EntityId::new("u1"), &DetailQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Unauthorized(_)));
    assert!(error.is_unauthorized());
}
