//! Integration tests for pair plus-state reconciliation.
//!
//! Drives the pair-write trigger endpoint and the entitlement sync flow
//! against the in-memory document store, and checks the derived pair state
//! and write discipline end to end.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Map, Value};
use tower::util::ServiceExt;

use duet_entitlements::adapters::auth::MockSessionValidator;
use duet_entitlements::adapters::http::{verify_router, VerifyAppState};
use duet_entitlements::adapters::store::InMemoryDocumentStore;
use duet_entitlements::domain::entitlement::AppleVerifyResponse;
use duet_entitlements::domain::foundation::Timestamp;
use duet_entitlements::domain::pair::{collections, pair_fields, user_fields};
use duet_entitlements::ports::{
    AppStoreClient, DocumentStore, SessionValidator, VerificationError,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct StubAppStore {
    response: Value,
}

#[async_trait]
impl AppStoreClient for StubAppStore {
    async fn verify_receipt(
        &self,
        _receipt_data: &str,
    ) -> Result<AppleVerifyResponse, VerificationError> {
        serde_json::from_value(self.response.clone())
            .map_err(|e| VerificationError::unexpected(e.to_string()))
    }
}

fn doc(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn seed_user(store: &InMemoryDocumentStore, uid: &str, is_plus: bool, pair_id: Option<&str>) {
    let mut fields = json!({ user_fields::IS_PLUS: is_plus });
    if let Some(pair_id) = pair_id {
        fields[user_fields::PAIR_ID] = json!(pair_id);
    }
    store.seed(collections::USERS, uid, doc(fields));
}

fn seed_pair(store: &InMemoryDocumentStore, pair_id: &str, fields: Value) {
    store.seed(collections::PAIRS, pair_id, doc(fields));
}

fn test_app(
    store: Arc<InMemoryDocumentStore>,
    app_store: Option<Value>,
) -> axum::Router {
    let session_validator: Arc<dyn SessionValidator> =
        Arc::new(MockSessionValidator::new().with_token("valid-token", "alice"));

    let state = VerifyAppState {
        session_validator,
        store,
        app_store: app_store
            .map(|response| Arc::new(StubAppStore { response }) as Arc<dyn AppStoreClient>),
        play_store: None,
    };

    verify_router().with_state(state)
}

fn post_pair_write(pair_id: &str, deleted: bool) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/internal/pairWrite")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "pairId": pair_id, "deleted": deleted }).to_string(),
        ))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn pair_doc(store: &InMemoryDocumentStore, pair_id: &str) -> Map<String, Value> {
    store
        .get(collections::PAIRS, pair_id)
        .await
        .unwrap()
        .expect("pair document should exist")
}

// =============================================================================
// Trigger Endpoint
// =============================================================================

#[tokio::test]
async fn first_plus_member_becomes_owner() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_user(&store, "alice", false, Some("pair-1"));
    seed_user(&store, "bob", true, Some("pair-1"));
    seed_pair(
        &store,
        "pair-1",
        json!({ pair_fields::MEMBER_UIDS: ["alice", "bob"] }),
    );

    let app = test_app(store.clone(), None);
    let response = app.oneshot(post_pair_write("pair-1", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "updated");

    let pair = pair_doc(&store, "pair-1").await;
    assert_eq!(pair[pair_fields::PLUS_ACTIVE], json!(true));
    assert_eq!(pair[pair_fields::PLUS_OWNER_UID], json!("bob"));
    assert_eq!(pair[pair_fields::PLUS_GRACE_UNTIL], Value::Null);
    assert!(pair.contains_key(pair_fields::UPDATED_AT));
}

#[tokio::test]
async fn consistent_pair_is_not_rewritten() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_user(&store, "alice", true, Some("pair-1"));
    seed_pair(
        &store,
        "pair-1",
        json!({
            pair_fields::MEMBER_UIDS: ["alice"],
            pair_fields::PLUS_ACTIVE: true,
            pair_fields::PLUS_OWNER_UID: "alice"
        }),
    );

    let app = test_app(store.clone(), None);
    let response = app.oneshot(post_pair_write("pair-1", false)).await.unwrap();
    assert_eq!(body_json(response).await["status"], "unchanged");
    assert_eq!(store.merge_count(), 0);
}

#[tokio::test]
async fn deletion_trigger_is_skipped() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let app = test_app(store.clone(), None);

    let response = app.oneshot(post_pair_write("pair-1", true)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "skipped");
    assert_eq!(store.merge_count(), 0);
}

#[tokio::test]
async fn missing_pair_is_acknowledged_without_writes() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let app = test_app(store.clone(), None);

    let response = app.oneshot(post_pair_write("pair-9", false)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "missing");
    assert_eq!(store.merge_count(), 0);
}

#[tokio::test]
async fn repeated_triggers_settle_after_one_write() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_user(&store, "alice", true, Some("pair-1"));
    seed_pair(
        &store,
        "pair-1",
        json!({ pair_fields::MEMBER_UIDS: ["alice"] }),
    );

    let app = test_app(store.clone(), None);
    let first = app
        .clone()
        .oneshot(post_pair_write("pair-1", false))
        .await
        .unwrap();
    assert_eq!(body_json(first).await["status"], "updated");

    let second = app.oneshot(post_pair_write("pair-1", false)).await.unwrap();
    assert_eq!(body_json(second).await["status"], "unchanged");
    assert_eq!(store.merge_count(), 1);
}

#[tokio::test]
async fn emptied_member_list_resets_plus_state() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_pair(
        &store,
        "pair-1",
        json!({
            pair_fields::MEMBER_UIDS: [],
            pair_fields::PLUS_ACTIVE: true,
            pair_fields::PLUS_OWNER_UID: "alice"
        }),
    );

    let app = test_app(store.clone(), None);
    let response = app.oneshot(post_pair_write("pair-1", false)).await.unwrap();
    assert_eq!(body_json(response).await["status"], "updated");

    let pair = pair_doc(&store, "pair-1").await;
    assert_eq!(pair[pair_fields::PLUS_ACTIVE], json!(false));
    assert_eq!(pair[pair_fields::PLUS_OWNER_UID], Value::Null);
}

// =============================================================================
// Entitlement Sync Through Verification
// =============================================================================

#[tokio::test]
async fn verified_purchase_reconciles_the_callers_pair() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_user(&store, "alice", false, Some("pair-1"));
    seed_user(&store, "bob", false, Some("pair-1"));
    seed_pair(
        &store,
        "pair-1",
        json!({
            pair_fields::MEMBER_UIDS: ["alice", "bob"],
            pair_fields::PLUS_ACTIVE: false
        }),
    );

    let expires = (Timestamp::now().as_unix_millis() + 3_600_000) as u64;
    let receipt = json!({
        "status": 0,
        "latest_receipt_info": [{
            "product_id": "plus.monthly",
            "expires_date_ms": expires.to_string(),
            "purchase_date_ms": (expires - 7_200_000).to_string()
        }]
    });

    let app = test_app(store.clone(), Some(receipt));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/verifyPurchase")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer valid-token")
        .body(Body::from(
            json!({
                "platform": "ios",
                "productId": "plus.monthly",
                "verificationData": "base64-receipt"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let user = store
        .get(collections::USERS, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user[user_fields::IS_PLUS], json!(true));

    let pair = pair_doc(&store, "pair-1").await;
    assert_eq!(pair[pair_fields::PLUS_ACTIVE], json!(true));
    assert_eq!(pair[pair_fields::PLUS_OWNER_UID], json!("alice"));
}

#[tokio::test]
async fn ownership_moves_when_the_owner_lapses() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_user(&store, "alice", true, Some("pair-1"));
    seed_user(&store, "bob", true, Some("pair-1"));
    seed_pair(
        &store,
        "pair-1",
        json!({
            pair_fields::MEMBER_UIDS: ["alice", "bob"],
            pair_fields::PLUS_ACTIVE: true,
            pair_fields::PLUS_OWNER_UID: "alice"
        }),
    );

    // Alice's subscription now verifies as expired.
    let expired = (Timestamp::now().as_unix_millis() - 3_600_000) as u64;
    let receipt = json!({
        "status": 0,
        "latest_receipt_info": [{
            "product_id": "plus.monthly",
            "expires_date_ms": expired.to_string(),
            "purchase_date_ms": (expired - 1000).to_string()
        }]
    });

    let app = test_app(store.clone(), Some(receipt));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/verifyPurchase")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer valid-token")
        .body(Body::from(
            json!({
                "platform": "ios",
                "productId": "plus.monthly",
                "verificationData": "base64-receipt"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Bob still holds plus, so the pair stays active under his ownership.
    let pair = pair_doc(&store, "pair-1").await;
    assert_eq!(pair[pair_fields::PLUS_ACTIVE], json!(true));
    assert_eq!(pair[pair_fields::PLUS_OWNER_UID], json!("bob"));
}
