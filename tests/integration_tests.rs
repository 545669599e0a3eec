// Integration Tests for the basket HTTP surface
// Drives the axum router end to end with a cookie-carried session

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use basket_server::basket::pricing::TotalSource;
use basket_server::catalog::inventory::InventoryRecord;
use basket_server::config::{BasketConfig, SessionConfig};
use basket_server::http::{router, AppState};
use basket_server::{InMemoryCatalog, InMemorySessionStore, ProductId};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    app: Router,
    sessions: Arc<InMemorySessionStore>,
    cookie: Option<String>,
}

struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response is not JSON")
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog.insert_product(ProductId::from(1), "Green tea", Decimal::from(10));
    catalog.insert_product(ProductId::from(2), "Oolong", Decimal::from(15));
    catalog.insert_product(ProductId::from(3), "Matcha", Decimal::from(40));

    catalog.inventory().record(InventoryRecord::new("north", ProductId::from(1), 3));
    catalog.inventory().record(InventoryRecord::new("south", ProductId::from(1), 2));
    catalog.inventory().record(InventoryRecord::new("north", ProductId::from(2), 2));
    // Product 3 has no inventory rows at all
    catalog
}

impl Harness {
    fn new(total_source: TotalSource) -> Self {
        Self::with_catalog(total_source, false, catalog())
    }

    fn with_catalog(total_source: TotalSource, prune_unresolved: bool, catalog: InMemoryCatalog) -> Self {
        let sessions = Arc::new(InMemorySessionStore::new());
        let state = Arc::new(AppState {
            catalog: Arc::new(catalog),
            sessions: sessions.clone(),
            session: SessionConfig::default(),
            basket: BasketConfig {
                prune_unresolved,
                total_source,
            },
        });

        Self {
            app: router(state),
            sessions,
            cookie: None,
        }
    }

    async fn send(&mut self, mut request: Request<Body>) -> Reply {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set) = response.headers().get(header::SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        Reply { status, body }
    }

    async fn add(&mut self, product: u64) -> Reply {
        self.add_raw(&product.to_string()).await
    }

    async fn add_raw(&mut self, productid: &str) -> Reply {
        let request = Request::post("/basket/add")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("productid={productid}")))
            .unwrap();
        self.send(request).await
    }

    async fn list(&mut self) -> Reply {
        self.send(Request::get("/basket/").body(Body::empty()).unwrap()).await
    }

    async fn json(&mut self, method: &str, body: Value) -> Reply {
        let request = Request::builder()
            .method(method)
            .uri("/basket/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

#[tokio::test]
async fn test_add_issues_cookie_and_lists() {
    let mut h = Harness::new(TotalSource::Server);

    let reply = h.add(1).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text(), "1");
    assert!(h.cookie.as_deref().unwrap().starts_with("sessionid="));
    assert_eq!(h.sessions.len(), 1);

    h.add(1).await;
    let summary = h.list().await.json();
    assert_eq!(summary["items"][0]["amount"], json!(2));
    assert_eq!(summary["items"][0]["stock_amount"], json!(5));
    assert_eq!(summary["total"].as_f64(), Some(20.0));
    assert_eq!(h.sessions.len(), 1);
}

#[tokio::test]
async fn test_post_on_basket_root_adds() {
    let mut h = Harness::new(TotalSource::Server);
    let request = Request::post("/basket/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("productid=2"))
        .unwrap();

    assert_eq!(h.send(request).await.text(), "1");
    assert_eq!(h.list().await.json()["items"][0]["product"]["id"], json!("2"));
}

#[tokio::test]
async fn test_list_clamps_to_stock_once() {
    let mut h = Harness::new(TotalSource::Server);
    for _ in 0..4 {
        h.add(2).await;
    }

    let first = h.list().await.json();
    assert_eq!(first["items"][0]["amount"], json!(2));
    assert_eq!(first["total"].as_f64(), Some(30.0));
    assert_eq!(first["corrections"][0]["requested"], json!(4));
    assert_eq!(first["corrections"][0]["clamped_to"], json!(2));

    let second = h.list().await.json();
    assert_eq!(second["total"].as_f64(), Some(30.0));
    assert_eq!(second["corrections"], json!([]));
}

#[tokio::test]
async fn test_client_total_adjust_scenario() {
    let mut h = Harness::new(TotalSource::Client);
    h.add(1).await;
    h.add(1).await;

    let reply = h
        .json("PATCH", json!({"product_id": 1, "product_amount": 5, "total_price": 50}))
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let body = reply.json();
    assert_eq!(body["agreement"], json!(true));
    assert_eq!(body["total_product"].as_f64(), Some(50.0));
    assert_eq!(body["total"].as_f64(), Some(80.0));

    assert_eq!(h.list().await.json()["items"][0]["amount"], json!(5));
}

#[tokio::test]
async fn test_adjust_beyond_stock_is_rejected() {
    let mut h = Harness::new(TotalSource::Client);
    h.add(1).await;
    h.add(1).await;

    let body = h
        .json("PATCH", json!({"product_id": "1", "product_amount": "10", "total_price": "20"}))
        .await
        .json();
    assert_eq!(body, json!({"agreement": false, "amount": 2}));
    assert_eq!(h.list().await.json()["items"][0]["amount"], json!(2));
}

#[tokio::test]
async fn test_client_total_is_required_in_client_mode() {
    let mut h = Harness::new(TotalSource::Client);
    h.add(1).await;

    let reply = h.json("PATCH", json!({"product_id": 1, "product_amount": 1})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_server_total_ignores_client_total() {
    let mut h = Harness::new(TotalSource::Server);
    h.add(1).await;
    h.add(1).await;
    h.add(2).await;
    h.add(2).await;

    // Server grand total is 2 * 10 + 2 * 15 = 50
    let body = h
        .json("PATCH", json!({"product_id": 1, "product_amount": 5, "total_price": 9999}))
        .await
        .json();
    assert_eq!(body["agreement"], json!(true));
    assert_eq!(body["total_product"].as_f64(), Some(50.0));
    assert_eq!(body["total"].as_f64(), Some(80.0));
}

#[tokio::test]
async fn test_zero_stock_is_out_of_stock() {
    let mut h = Harness::new(TotalSource::Server);
    h.add(3).await;

    let body = h
        .json("PATCH", json!({"product_id": 3, "product_amount": 1}))
        .await
        .json();
    assert_eq!(body, json!({"agreement": "Out of stock"}));
}

#[tokio::test]
async fn test_adjust_unknown_key_is_not_found() {
    let mut h = Harness::new(TotalSource::Server);
    h.add(1).await;

    let reply = h.json("PATCH", json!({"product_id": 2, "product_amount": 1})).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_reports_new_total() {
    let mut h = Harness::new(TotalSource::Server);
    h.add(1).await;
    h.add(1).await;
    h.add(2).await;

    let reply = h.json("DELETE", json!({"product_id": 1, "total_price": 35})).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"total": "15"}));

    let summary = h.list().await.json();
    assert_eq!(summary["items"].as_array().unwrap().len(), 1);
    assert_eq!(summary["total"].as_f64(), Some(15.0));
}

#[tokio::test]
async fn test_delete_with_client_total() {
    let mut h = Harness::new(TotalSource::Client);
    h.add(2).await;
    h.add(2).await;

    let reply = h.json("DELETE", json!({"product_id": "2", "total_price": "100"})).await;
    assert_eq!(reply.json(), json!({"total": "70"}));
}

#[tokio::test]
async fn test_delete_missing_product_is_not_found() {
    let mut h = Harness::new(TotalSource::Server);
    h.add(1).await;

    let reply = h.json("DELETE", json!({"product_id": 2, "total_price": 10})).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert!(reply.json()["error"].as_str().unwrap().contains("not in the basket"));
}

#[tokio::test]
async fn test_vanished_product_is_hidden_or_pruned() {
    let kept = catalog();
    let mut h = Harness::with_catalog(TotalSource::Server, false, kept);
    h.add(1).await;
    h.add(77).await;

    let summary = h.list().await.json();
    assert_eq!(summary["items"].as_array().unwrap().len(), 1);
    assert_eq!(summary["unresolved"], json!(["77"]));
    // Kept: still reported on the next read
    assert_eq!(h.list().await.json()["unresolved"], json!(["77"]));

    let mut h = Harness::with_catalog(TotalSource::Server, true, catalog());
    h.add(77).await;
    assert_eq!(h.list().await.json()["unresolved"], json!(["77"]));
    // Pruned: gone from storage after the first read
    assert_eq!(h.list().await.json()["unresolved"], json!([]));
}

#[tokio::test]
async fn test_unknown_cookie_starts_new_session() {
    let mut h = Harness::new(TotalSource::Server);
    h.cookie = Some("sessionid=does-not-exist".to_string());

    h.add(1).await;
    assert_ne!(h.cookie.as_deref(), Some("sessionid=does-not-exist"));
    assert_eq!(h.list().await.json()["items"][0]["amount"], json!(1));
}

#[tokio::test]
async fn test_health() {
    let mut h = Harness::new(TotalSource::Server);
    let reply = h.send(Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_absurd_client_totals_are_client_errors() {
    let mut h = Harness::new(TotalSource::Client);
    h.add(1).await;

    let patch = h
        .json(
            "PATCH",
            json!({"product_id": 1, "product_amount": 5, "total_price": "79228162514264337593543950335"}),
        )
        .await;
    assert!(patch.status.is_client_error(), "got {}", patch.status);

    let delete = h
        .json(
            "DELETE",
            json!({"product_id": 1, "total_price": "-79228162514264337593543950335"}),
        )
        .await;
    assert!(delete.status.is_client_error(), "got {}", delete.status);

    // The server keeps answering and the basket is untouched
    let summary = h.list().await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.json()["items"][0]["amount"], json!(1));
}

#[tokio::test]
async fn test_total_overflow_from_catalog_price_is_bad_request() {
    let catalog = InMemoryCatalog::new();
    catalog.insert_product(ProductId::from(9), "Meteorite", Decimal::MAX);
    catalog.inventory().record(InventoryRecord::new("vault", ProductId::from(9), 5));
    let mut h = Harness::with_catalog(TotalSource::Client, false, catalog);
    h.add(9).await;
    h.add(9).await;

    let patch = h
        .json("PATCH", json!({"product_id": 9, "product_amount": 3, "total_price": 0}))
        .await;
    assert_eq!(patch.status, StatusCode::BAD_REQUEST);
    assert!(patch.json()["error"].as_str().unwrap().contains("out of range"));

    let delete = h
        .json("DELETE", json!({"product_id": 9, "total_price": 0}))
        .await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_ids_are_canonical_integers() {
    let mut h = Harness::new(TotalSource::Server);

    assert!(h.add_raw("abc").await.status.is_client_error());
    assert!(h.add_raw("").await.status.is_client_error());
    assert_eq!(h.list().await.json()["items"], json!([]));

    assert_eq!(h.add_raw("01").await.text(), "1");
    h.add(1).await;

    let summary = h.list().await.json();
    assert_eq!(summary["items"].as_array().unwrap().len(), 1);
    assert_eq!(summary["items"][0]["product"]["id"], json!("1"));
    assert_eq!(summary["items"][0]["amount"], json!(2));

    let reply = h
        .json("PATCH", json!({"product_id": "001", "product_amount": 3}))
        .await;
    assert_eq!(reply.json()["agreement"], json!(true));
}

#[tokio::test]
async fn test_rejected_server_adjust_keeps_stock_clamp() {
    let mut h = Harness::new(TotalSource::Server);
    for _ in 0..4 {
        h.add(2).await;
    }

    // Reconciliation clamps 4 to the stock of 2 before the request is judged
    let body = h
        .json("PATCH", json!({"product_id": 2, "product_amount": 10}))
        .await
        .json();
    assert_eq!(body, json!({"agreement": false, "amount": 2}));

    let summary = h.list().await.json();
    assert_eq!(summary["items"][0]["amount"], json!(2));
    assert_eq!(summary["corrections"], json!([]));
}
