//! End-to-end HTTP tests against the in-memory store.
//!
//! Each test starts the real application on an ephemeral port and drives it with reqwest.
//! A call-counting store wrapper checks that rejected requests never reach the store.

use async_trait::async_trait;
use product_api::domain::product::DocumentUpdate;
use product_api::storage::{Document, ProductStore, StoreError, UpdateResult};
use product_api::{transport, MemoryProductStore, ProductId, ProductService};
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct CountingStore {
    inner: MemoryProductStore,
    calls: AtomicUsize,
    inserts: AtomicUsize,
}

impl CountingStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for CountingStore {
    async fn find_all(&self) -> Result<Vec<(ProductId, Document)>, StoreError> {
        self.hit();
        self.inner.find_all().await
    }

    async fn find_one(&self, id: ProductId) -> Result<Option<Document>, StoreError> {
        self.hit();
        self.inner.find_one(id).await
    }

    async fn insert_one(&self, doc: Document) -> Result<ProductId, StoreError> {
        self.hit();
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_one(doc).await
    }

    async fn update_one(
        &self,
        id: ProductId,
        update: &DocumentUpdate,
    ) -> Result<UpdateResult, StoreError> {
        self.hit();
        self.inner.update_one(id, update).await
    }

    async fn delete_one(&self, id: ProductId) -> Result<u64, StoreError> {
        self.hit();
        self.inner.delete_one(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// A store whose every call fails, as if the database were unreachable.
struct BrokenStore;

fn broken() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ProductStore for BrokenStore {
    async fn find_all(&self) -> Result<Vec<(ProductId, Document)>, StoreError> {
        Err(broken())
    }
    async fn find_one(&self, _id: ProductId) -> Result<Option<Document>, StoreError> {
        Err(broken())
    }
    async fn insert_one(&self, _doc: Document) -> Result<ProductId, StoreError> {
        Err(broken())
    }
    async fn update_one(&self, _id: ProductId, _u: &DocumentUpdate) -> Result<UpdateResult, StoreError> {
        Err(broken())
    }
    async fn delete_one(&self, _id: ProductId) -> Result<u64, StoreError> {
        Err(broken())
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(broken())
    }
}

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn start(store: Arc<dyn ProductStore>) -> TestServer {
    let app_state = transport::http::AppState {
        products: ProductService::new(store),
    };
    let app = transport::http::build_app(app_state, Duration::from_secs(10));

    // Bind to an ephemeral port to avoid conflicts between tests.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        client,
        handle,
    }
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, body: JsonValue) -> String {
        let resp = self.client.post(self.url("/products")).json(&body).send().await.unwrap();
        assert_eq!(resp.status(), 201);
        resp.text().await.unwrap()
    }
}

const UNKNOWN_ID: &str = "5f1b2c3d4e5f60718293a4b5";

#[tokio::test]
async fn test_widget_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let server = start(Arc::new(MemoryProductStore::new())).await;

    let resp = server
        .client
        .post(server.url("/products"))
        .json(&json!({"name": "Widget", "price": 9.99}))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);
    assert_eq!(resp.headers()["content-type"], "text/plain");
    let id = resp.text().await?;
    assert_eq!(id.len(), 24);

    let resp = server.client.get(server.url(&format!("/products/{}", id))).send().await?;
    assert_eq!(resp.status(), 200);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body, json!({"_id": id, "name": "Widget", "price": 9.99}));

    let resp = server.client.delete(server.url(&format!("/products/{}", id))).send().await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(resp.text().await?, "Objects deleted: 1");

    let resp = server.client.get(server.url(&format!("/products/{}", id))).send().await?;
    assert_eq!(resp.status(), 404);

    let resp = server.client.delete(server.url(&format!("/products/{}", id))).send().await?;
    assert_eq!(resp.status(), 404);
    Ok(())
}

#[tokio::test]
async fn test_list_products() -> Result<(), Box<dyn std::error::Error>> {
    let server = start(Arc::new(MemoryProductStore::new())).await;

    let resp = server.client.get(server.url("/products")).send().await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<JsonValue>().await?, json!([]));

    let a = server.create(json!({"name": "A", "quantity": 1})).await;
    let b = server.create(json!({"name": "B", "rating": 3.5})).await;

    let list: Vec<JsonValue> = server.client.get(server.url("/products")).send().await?.json().await?;
    assert_eq!(list.len(), 2);
    let ids: Vec<&str> = list.iter().filter_map(|p| p["_id"].as_str()).collect();
    assert!(ids.contains(&a.as_str()));
    assert!(ids.contains(&b.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_root_redirects_to_products() -> Result<(), Box<dyn std::error::Error>> {
    let server = start(Arc::new(MemoryProductStore::new())).await;
    let resp = server.client.get(server.url("/")).send().await?;
    assert_eq!(resp.status(), 301);
    assert_eq!(resp.headers()["location"], "/products");
    Ok(())
}

#[tokio::test]
async fn test_sparse_update() -> Result<(), Box<dyn std::error::Error>> {
    let server = start(Arc::new(MemoryProductStore::new())).await;
    let id = server
        .create(json!({"name": "Lamp", "description": "Desk lamp", "quantity": 2, "price": 20.5}))
        .await;
    let item = server.url(&format!("/products/{}", id));

    let resp = server.client.put(&item).json(&json!({"name": "Big lamp"})).send().await?;
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await?.is_empty());

    let body: JsonValue = server.client.get(&item).send().await?.json().await?;
    assert_eq!(
        body,
        json!({"_id": id, "name": "Big lamp", "description": "Desk lamp", "quantity": 2, "price": 20.5})
    );

    // Explicit null clears a field; repeating the path id in the body is allowed.
    let resp = server
        .client
        .put(&item)
        .json(&json!({"_id": id, "description": null}))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body: JsonValue = server.client.get(&item).send().await?.json().await?;
    assert!(body.get("description").is_none());
    Ok(())
}

#[tokio::test]
async fn test_update_failures() -> Result<(), Box<dyn std::error::Error>> {
    let server = start(Arc::new(MemoryProductStore::new())).await;
    let id = server.create(json!({"name": "Lamp"})).await;
    let item = server.url(&format!("/products/{}", id));

    // Identical payload modifies nothing.
    let resp = server.client.put(&item).json(&json!({"name": "Lamp"})).send().await?;
    assert_eq!(resp.status(), 500);

    // A payload that sets no field is the same failure.
    let resp = server.client.put(&item).json(&json!({})).send().await?;
    assert_eq!(resp.status(), 500);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["error"], format!("Failed to update product with id = {}", id));

    let resp = server
        .client
        .put(server.url(&format!("/products/{}", UNKNOWN_ID)))
        .json(&json!({"name": "Lamp"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 404);

    let resp = server
        .client
        .put(&item)
        .json(&json!({"_id": UNKNOWN_ID, "name": "Other"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let resp = server.client.put(&item).body("{\"name\": ").send().await?;
    assert_eq!(resp.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_malformed_ids_never_reach_the_store() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(CountingStore::default());
    let server = start(store.clone()).await;

    for bad in ["123", "not-an-id", "5f1b2c3d4e5f60718293a4bz", "5f1b2c3d4e5f60718293a4b5aa"] {
        let item = server.url(&format!("/products/{}", bad));

        let resp = server.client.get(&item).send().await?;
        assert_eq!(resp.status(), 400, "GET {bad}");
        let body: JsonValue = resp.json().await?;
        assert_eq!(body, json!({"success": false, "error": "Invalid id."}));

        let resp = server.client.put(&item).json(&json!({"name": "x"})).send().await?;
        assert_eq!(resp.status(), 400, "PUT {bad}");

        let resp = server.client.delete(&item).send().await?;
        assert_eq!(resp.status(), 400, "DELETE {bad}");
    }

    assert_eq!(store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_client_id() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(CountingStore::default());
    let server = start(store.clone()).await;

    let resp = server
        .client
        .post(server.url("/products"))
        .json(&json!({"_id": UNKNOWN_ID, "name": "Widget"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["error"], "Product id must be null or empty.");
    assert_eq!(store.inserts(), 0);

    // An empty id counts as no id.
    let resp = server
        .client
        .post(server.url("/products"))
        .json(&json!({"_id": "", "name": "Widget"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);
    assert_eq!(store.inserts(), 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_bodies_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(CountingStore::default());
    let server = start(store.clone()).await;

    for body in ["", "not json", "[]", "{\"quantity\": \"ten\"}", "{\"price\": true}"] {
        let resp = server
            .client
            .post(server.url("/products"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;
        assert_eq!(resp.status(), 400, "body {body:?}");
        let json: JsonValue = resp.json().await?;
        assert_eq!(json["error"], "Product is invalid.");
    }
    assert_eq!(store.calls(), 0);

    // The body is decoded regardless of the declared content type.
    let resp = server
        .client
        .post(server.url("/products"))
        .header("content-type", "text/plain")
        .body("{\"name\": \"Plain\"}")
        .send()
        .await?;
    assert_eq!(resp.status(), 201);
    Ok(())
}

#[tokio::test]
async fn test_store_failures_map_to_500() -> Result<(), Box<dyn std::error::Error>> {
    let server = start(Arc::new(BrokenStore)).await;
    let item = server.url(&format!("/products/{}", UNKNOWN_ID));

    assert_eq!(server.client.get(server.url("/products")).send().await?.status(), 500);
    assert_eq!(server.client.get(&item).send().await?.status(), 500);
    assert_eq!(
        server.client.post(server.url("/products")).json(&json!({"name": "x"})).send().await?.status(),
        500
    );
    assert_eq!(server.client.put(&item).json(&json!({"name": "x"})).send().await?.status(), 500);
    assert_eq!(server.client.delete(&item).send().await?.status(), 500);

    let resp = server.client.get(server.url("/health")).send().await?;
    assert_eq!(resp.status(), 503);
    Ok(())
}

#[tokio::test]
async fn test_health_and_unmatched_routes() -> Result<(), Box<dyn std::error::Error>> {
    let server = start(Arc::new(MemoryProductStore::new())).await;

    let resp = server.client.get(server.url("/health")).send().await?;
    assert_eq!(resp.status(), 200);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["data"]["status"], "ok");

    assert_eq!(server.client.get(server.url("/items")).send().await?.status(), 404);
    assert_eq!(server.client.delete(server.url("/products")).send().await?.status(), 405);

    let resp = server.client.get(server.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(resp.status(), 200);
    let doc: JsonValue = resp.json().await?;
    assert!(doc["paths"]["/products/{id}"].is_object());
    Ok(())
}
