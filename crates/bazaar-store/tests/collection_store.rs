//! Integration tests for `CollectionStore` against a mocked remote API.
//!
//! Each test stands up its own `wiremock` server. The scenarios cover the
//! remote happy path, the permanent downgrade to the local store after the
//! first remote failure, and the wire contract of the write endpoints.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bazaar_core::ItemDraft;
use bazaar_store::{
    read_items, CartStore, LocalStore, MemoryStore, RemoteCollectionClient, StoreMode,
    WishlistStore,
};

fn test_client(server: &MockServer) -> RemoteCollectionClient {
    RemoteCollectionClient::new(&server.uri(), 5, "bazaar-test/0.1")
        .expect("failed to build test RemoteCollectionClient")
}

fn tile(quantity: i64) -> ItemDraft {
    ItemDraft::new("tile-1")
        .with_title("Terracotta tile")
        .with_price(Decimal::new(1250, 2))
        .with_quantity(quantity)
        .with_source("studio")
}

// ---------------------------------------------------------------------------
// Remote happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_all_reads_bare_array_and_normalizes_aliases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"productId": "a", "name": "Lamp", "price": "19.5", "quantity": "2", "img": "l.png"},
            {"_id": 42, "title": "Rug", "price": 80}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let cart = CartStore::new(Some(test_client(&server)), Arc::new(MemoryStore::new()));
    let items = cart.fetch_all().await.expect("fetch_all");

    assert_eq!(cart.mode(), StoreMode::Remote);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "a");
    assert_eq!(items[0].title, "Lamp");
    assert_eq!(items[0].price, Decimal::new(195, 1));
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].image_url, "l.png");
    assert_eq!(items[1].id, "42");
    assert_eq!(items[1].quantity, 1);
}

#[tokio::test]
async fn fetch_all_accepts_items_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": [{"id": "w1", "title": "Vase"}]})),
        )
        .mount(&server)
        .await;

    let wishlist = WishlistStore::new(Some(test_client(&server)), Arc::new(MemoryStore::new()));
    let items = wishlist.fetch_all().await.expect("fetch_all");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "w1");
    assert_eq!(wishlist.mode(), StoreMode::Remote);
}

#[tokio::test]
async fn remote_add_posts_payload_then_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .and(body_json(json!({
            "productId": "tile-1",
            "source": "studio",
            "name": "Terracotta tile",
            "image": "",
            "price": 12.5,
            "quantity": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"productId": "tile-1", "title": "Terracotta tile", "price": 12.5, "quantity": 3}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    let cart = CartStore::new(Some(test_client(&server)), local.clone());
    let items = cart.add(tile(3)).await.expect("add");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(cart.snapshot(), items);
    assert!(
        local.get("cart").unwrap().is_none(),
        "remote writes must not touch the local store"
    );
}

#[tokio::test]
async fn wishlist_add_omits_quantity_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wishlist/add"))
        .and(body_json(json!({
            "productId": "tile-1",
            "source": "studio",
            "name": "Terracotta tile",
            "image": "",
            "price": 12.5
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "tile-1"}])))
        .mount(&server)
        .await;

    let wishlist = WishlistStore::new(Some(test_client(&server)), Arc::new(MemoryStore::new()));
    wishlist.add(tile(5)).await.expect("add");
    assert_eq!(wishlist.mode(), StoreMode::Remote);
}

#[tokio::test]
async fn update_quantity_to_zero_uses_remove_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/remove"))
        .and(body_partial_json(json!({"productId": "tile-1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart/update"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let cart = CartStore::new(Some(test_client(&server)), Arc::new(MemoryStore::new()));
    let items = cart.update_quantity(tile(1), 0).await.expect("update");
    assert!(items.is_empty());
}

#[tokio::test]
async fn update_quantity_posts_exact_quantity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/update"))
        .and(body_json(json!({"productId": "tile-1", "source": "studio", "quantity": 6})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"productId": "tile-1", "quantity": 6}])),
        )
        .mount(&server)
        .await;

    let cart = CartStore::new(Some(test_client(&server)), Arc::new(MemoryStore::new()));
    let items = cart.update_quantity(tile(1), 6).await.expect("update");
    assert_eq!(items[0].quantity, 6);
}

#[tokio::test]
async fn demo_user_header_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("x-demo-user", "demo-alex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server).with_demo_user("demo-alex");
    let cart = CartStore::new(Some(client), Arc::new(MemoryStore::new()));
    cart.fetch_all().await.expect("fetch_all");
    assert_eq!(cart.mode(), StoreMode::Remote);
}

// ---------------------------------------------------------------------------
// Downgrade to local fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_add_downgrades_and_later_adds_stay_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    let cart = CartStore::new(Some(test_client(&server)), local.clone());

    let first = cart.add(tile(1)).await.expect("first add falls back");
    assert_eq!(cart.mode(), StoreMode::LocalFallback);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].quantity, 1);

    let second = cart.add(tile(2)).await.expect("second add is local");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].quantity, 3);
    assert!(local.get("cart").unwrap().is_some());
}

#[tokio::test]
async fn failed_refresh_after_write_still_downgrades() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let cart = CartStore::new(Some(test_client(&server)), Arc::new(MemoryStore::new()));
    let items = cart.add(tile(2)).await.expect("add falls back");
    assert_eq!(cart.mode(), StoreMode::LocalFallback);
    assert_eq!(items[0].quantity, 2);
}

#[tokio::test]
async fn fetch_all_failure_reads_local_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    local
        .set(
            "wishlist",
            r#"[{"id":"w1","title":"Vase","price":"30","imageUrl":"","quantity":1,"source":"marketplace","addons":[]}]"#,
        )
        .unwrap();

    let wishlist = WishlistStore::new(Some(test_client(&server)), local);
    let items = wishlist.fetch_all().await.expect("fetch_all falls back");

    assert_eq!(wishlist.mode(), StoreMode::LocalFallback);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "w1");

    // Degraded stores never call the remote again.
    wishlist.fetch_all().await.expect("second fetch is local");
}

#[tokio::test]
async fn malformed_remote_body_downgrades() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cart": "nope"})))
        .mount(&server)
        .await;

    let cart = CartStore::new(Some(test_client(&server)), Arc::new(MemoryStore::new()));
    let items = cart.fetch_all().await.expect("fetch_all falls back");
    assert!(items.is_empty());
    assert_eq!(cart.mode(), StoreMode::LocalFallback);
}

#[tokio::test]
async fn unreachable_remote_downgrades() {
    // Nothing listens on port 9 of the loopback interface.
    let client = RemoteCollectionClient::new("http://127.0.0.1:9", 2, "bazaar-test/0.1")
        .expect("client");
    let cart = CartStore::new(Some(client), Arc::new(MemoryStore::new()));

    let items = cart.add(tile(1)).await.expect("add falls back");
    assert_eq!(items.len(), 1);
    assert!(cart.is_degraded());
}

#[tokio::test]
async fn downgrade_is_per_store_instance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let local: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let cart = CartStore::new(Some(test_client(&server)), local.clone());
    let wishlist = WishlistStore::new(Some(test_client(&server)), local);

    cart.fetch_all().await.expect("cart falls back");
    wishlist.fetch_all().await.expect("wishlist stays remote");

    assert_eq!(cart.mode(), StoreMode::LocalFallback);
    assert_eq!(wishlist.mode(), StoreMode::Remote);
}

#[tokio::test]
async fn retries_transient_errors_before_downgrading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server).with_retry(2, 0);
    let cart = CartStore::new(Some(client), Arc::new(MemoryStore::new()));
    let items = cart.fetch_all().await.expect("fetch_all");

    assert_eq!(items.len(), 1);
    assert_eq!(cart.mode(), StoreMode::Remote);
}

#[tokio::test]
async fn server_error_on_add_is_not_resent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    let client = test_client(&server).with_retry(2, 0);
    let cart = CartStore::new(Some(client), local.clone());
    let items = cart.add(tile(2)).await.expect("add falls back");

    // The 503 may have been applied upstream, so the add is not re-posted;
    // it lands locally exactly once instead.
    assert_eq!(cart.mode(), StoreMode::LocalFallback);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);

    let posts = server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/cart/add")
        .count();
    assert_eq!(posts, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_downgrade_once_and_sum_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/add"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    let cart = CartStore::new(Some(test_client(&server)), local.clone());
    let mut updates = cart.subscribe();

    let (a, b, c, d) = tokio::join!(
        cart.add(tile(1)),
        cart.add(tile(2)),
        cart.add(tile(3)),
        cart.add(tile(4)),
    );
    for result in [a, b, c, d] {
        result.expect("every add lands locally");
    }

    assert_eq!(cart.mode(), StoreMode::LocalFallback);
    let snapshot = cart.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].quantity, 10);

    let persisted = read_items(local.as_ref(), "cart").expect("read local cart");
    assert_eq!(persisted, snapshot);
    assert_eq!(*updates.borrow_and_update(), snapshot);
}
