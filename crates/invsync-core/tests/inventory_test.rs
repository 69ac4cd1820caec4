#![allow(clippy::unwrap_used)]
// Integration tests for `Inventory` against a wiremock CRUD server.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::timeout;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use invsync_core::{CoreError, Inventory, InventoryConfig, Product, SnapshotSource};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Inventory) {
    let server = MockServer::start().await;
    let config = InventoryConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        timeout: Duration::from_secs(5),
        live_updates: false,
        ..InventoryConfig::default()
    };
    let inventory = Inventory::new(config).unwrap();
    (server, inventory)
}

fn product_json(id: i64, brand: &str) -> serde_json::Value {
    json!({
        "id": id,
        "brand": brand,
        "category": "tools",
        "quantity": 5,
        "price": 10.0
    })
}

fn product(id: i64, brand: &str) -> Product {
    Product {
        id,
        brand: brand.into(),
        category: "tools".into(),
        quantity: 5,
        price: 10.0,
        created_at: None,
        updated_at: None,
    }
}

// ── End-to-end scenario ─────────────────────────────────────────────

#[tokio::test]
async fn refresh_then_remove_then_refresh() {
    let (server, inventory) = setup().await;

    assert!(inventory.products().is_empty());
    assert!(!inventory.store().loaded());

    // First list returns one product; after the delete, the collection
    // is empty.
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "A")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    inventory.refresh().await.unwrap();

    let view = inventory.products();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, 1);
    assert_eq!(view[0].brand, "A");
    assert_eq!(view[0].quantity, 5);
    assert!(inventory.store().loaded());

    inventory.remove(1).await.unwrap();

    assert!(inventory.products().is_empty());
    assert!(inventory.product(1).is_none());
}

// ── Mutations re-derive the view from the last list ─────────────────

#[tokio::test]
async fn create_triggers_refresh() {
    let (server, inventory) = setup().await;

    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([product_json(1, "A"), product_json(2, "B")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    inventory.create(&product(2, "B")).await.unwrap();

    // The view equals the result of the last list() call, not an
    // optimistic local insert.
    let view = inventory.products();
    assert_eq!(view.len(), 2);
    assert_eq!(view[1].brand, "B");
}

#[tokio::test]
async fn update_triggers_refresh() {
    let (server, inventory) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "A2")])))
        .expect(1)
        .mount(&server)
        .await;

    inventory.update(&product(1, "A2")).await.unwrap();

    assert_eq!(inventory.product(1).unwrap().brand, "A2");
}

// ── Failures never mutate the view ──────────────────────────────────

#[tokio::test]
async fn create_validation_error_surfaces_messages_and_leaves_view() {
    let (server, inventory) = setup().await;

    // Exactly one GET: the initial refresh. The failed create must not
    // trigger another.
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "A")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "errors": ["price must be positive"] })),
        )
        .mount(&server)
        .await;

    inventory.refresh().await.unwrap();
    let before = inventory.products();

    let err = inventory.create(&product(2, "B")).await.unwrap_err();
    assert_eq!(
        err.validation_messages().unwrap(),
        &["price must be positive".to_string()]
    );

    let after = inventory.products();
    assert_eq!(before.len(), after.len());
    assert_eq!(after[0].id, 1);
}

#[tokio::test]
async fn remove_not_found_keeps_product_visible() {
    let (server, inventory) = setup().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "A")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/products/1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "errors": ["product not found"] })),
        )
        .mount(&server)
        .await;

    inventory.refresh().await.unwrap();

    let err = inventory.remove(1).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    // Still visible: nothing leaves the view until the server confirms.
    assert!(inventory.product(1).is_some());
}

#[tokio::test]
async fn failed_refresh_keeps_stale_view() {
    let (server, inventory) = setup().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "A")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    inventory.refresh().await.unwrap();
    assert_eq!(inventory.products().len(), 1);

    let err = inventory.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));

    // Stale-but-available, and still marked loaded.
    assert_eq!(inventory.products().len(), 1);
    assert!(inventory.store().loaded());
}

// ── Push snapshots ──────────────────────────────────────────────────

#[tokio::test]
async fn push_snapshot_replaces_not_unions() {
    let (_server, inventory) = setup().await;
    let store = inventory.store();

    store.apply_snapshot(SnapshotSource::Push, vec![product(1, "A")]);
    store.apply_snapshot(SnapshotSource::Push, vec![product(2, "B")]);

    let view = inventory.products();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, 2);
}

#[tokio::test]
async fn push_wins_over_earlier_refresh_and_vice_versa() {
    let (server, inventory) = setup().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "A")])))
        .mount(&server)
        .await;

    inventory.refresh().await.unwrap();
    inventory
        .store()
        .apply_snapshot(SnapshotSource::Push, vec![product(2, "B")]);
    assert_eq!(inventory.products()[0].id, 2);

    // A later refresh completion is just as authoritative.
    inventory.refresh().await.unwrap();
    assert_eq!(inventory.products()[0].id, 1);
}

// ── Subscriptions ───────────────────────────────────────────────────

#[tokio::test]
async fn subscribers_observe_refresh() {
    let (server, inventory) = setup().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, "A")])))
        .mount(&server)
        .await;

    let mut sub = inventory.subscribe();
    assert!(sub.current().is_empty());

    inventory.refresh().await.unwrap();

    let snap = timeout(Duration::from_secs(5), sub.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].brand, "A");
}
