//! Integration tests for the campus shop: product administration, listing
//! and wallet-funded checkout.
//!
//! Requires a PostgreSQL database reachable through TEST_DATABASE_URL.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::spawn_app;
use persistence::repositories::WalletRepository;

/// Provision a wallet for the student and seed it with coins.
async fn funded_wallet(app: &common::TestApp, token: &str, amount: i64) -> String {
    let (status, body) = app.request("POST", "/api/v1/wallet", Some(token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let address = body["address"].as_str().unwrap().to_string();
    app.ledger.fund(&address, amount);
    address
}

#[tokio::test]
async fn test_admin_creates_product() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/admin/products",
            Some(&token),
            Some(json!({
                "name": "Iced Coffee",
                "description": "House blend over ice",
                "price": 25,
                "stock_quantity": 3,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Iced Coffee");
    assert_eq!(body["price"], 25);
    assert_eq!(body["stock_level"], "low");
}

#[tokio::test]
async fn test_student_cannot_create_product() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/admin/products",
            Some(&token),
            Some(json!({ "name": "Contraband", "price": 1, "stock_quantity": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_products_shows_stock_level() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    let product = app.create_product(40, 0).await;

    let (status, body) = app
        .request("GET", "/api/v1/shop/products", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let listed = body
        .as_array()
        .expect("expected an array")
        .iter()
        .find(|p| p["id"] == product.id.to_string())
        .cloned()
        .expect("product missing from listing");
    assert_eq!(listed["stock_level"], "out_of_stock");
}

#[tokio::test]
async fn test_checkout_debits_wallet_and_decrements_stock() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    let address = funded_wallet(&app, &token, 200).await;
    let product = app.create_product(30, 5).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": product.id, "quantity": 2 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order placed");
    assert_eq!(body["new_balance"], 140);
    assert_eq!(body["data"]["total_amount"], 60);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["unit_price"], 30);

    assert_eq!(app.ledger.balance(&address), 140);

    // Stock went down
    let (_, products) = app
        .request("GET", "/api/v1/shop/products", Some(&token), None)
        .await;
    let listed = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == product.id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(listed["stock_quantity"], 3);

    // The payment shows up as a confirmed log
    let (_, history) = app
        .request("GET", "/api/v1/wallet/transactions", Some(&token), None)
        .await;
    let transactions = history["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["tx_type"], "order_payment");
    assert_eq!(transactions[0]["status"], "confirmed");
    assert_eq!(transactions[0]["amount"], 60);
}

#[tokio::test]
async fn test_checkout_with_insufficient_funds_conflicts() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    funded_wallet(&app, &token, 10).await;
    let product = app.create_product(30, 5).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": product.id, "quantity": 1 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Insufficient funds");

    // No order, no stock movement
    let (_, products) = app
        .request("GET", "/api/v1/shop/products", Some(&token), None)
        .await;
    let listed = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == product.id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(listed["stock_quantity"], 5);
}

#[tokio::test]
async fn test_checkout_unknown_product_not_found() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    funded_wallet(&app, &token, 100).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": Uuid::new_v4(), "quantity": 1 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_checkout_insufficient_stock_conflicts() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    let address = funded_wallet(&app, &token, 1000).await;
    let product = app.create_product(10, 2).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": product.id, "quantity": 3 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        format!("Insufficient stock for {}", product.name)
    );
    // Rejected before any debit
    assert_eq!(app.ledger.balance(&address), 1000);
}

#[tokio::test]
async fn test_checkout_duplicate_product_lines_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    funded_wallet(&app, &token, 100).await;
    let product = app.create_product(10, 5).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [
                    { "product_id": product.id, "quantity": 1 },
                    { "product_id": product.id, "quantity": 2 },
                ]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Order contains the same product more than once"
    );
}

#[tokio::test]
async fn test_checkout_empty_basket_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    funded_wallet(&app, &token, 100).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({ "items": [] })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_checkout_without_wallet_not_found() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    let product = app.create_product(10, 5).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": product.id, "quantity": 1 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Wallet not found");
}

#[tokio::test]
async fn test_checkout_fails_when_ledger_is_down() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;
    let address = funded_wallet(&app, &token, 100).await;
    let product = app.create_product(10, 5).await;

    app.ledger.set_fail_debits(true);
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": product.id, "quantity": 1 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
    assert_eq!(app.ledger.balance(&address), 100);

    // No order was written and the shelf is untouched
    app.ledger.set_fail_debits(false);
    let (_, products) = app
        .request("GET", "/api/v1/shop/products", Some(&token), None)
        .await;
    let listed = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == product.id.to_string())
        .cloned()
        .unwrap();
    assert_eq!(listed["stock_quantity"], 5);

    let (_, history) = app
        .request("GET", "/api/v1/wallet/transactions", Some(&token), None)
        .await;
    assert_eq!(history["total"], 0);
}

#[tokio::test]
async fn test_checkout_keeps_cached_balance_when_sync_read_fails() {
    let app = spawn_app().await;
    let (student, token) = app.create_student().await;
    let address = funded_wallet(&app, &token, 100).await;
    let product = app.create_product(10, 5).await;

    // Pull the funded balance into the cache first
    let (status, body) = app.request("GET", "/api/v1/wallet", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 100);

    // Debit settles but the post-debit balance read does not
    app.ledger.set_fail_balance_reads(true);
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": product.id, "quantity": 1 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_balance"], 90);
    assert_eq!(app.ledger.balance(&address), 90);

    // The cached mirror keeps its last synced value instead of being
    // stamped with a locally computed one
    let wallet = WalletRepository::new(app.pool.clone())
        .find_by_user(student.id)
        .await
        .unwrap()
        .expect("wallet row missing");
    assert_eq!(wallet.balance, 100);

    // The next successful read refreshes it
    app.ledger.set_fail_balance_reads(false);
    let (_, body) = app.request("GET", "/api/v1/wallet", Some(&token), None).await;
    assert_eq!(body["balance"], 90);
}

#[tokio::test]
async fn test_staff_cannot_checkout() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("staff").await;
    let product = app.create_product(10, 5).await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/shop/checkout",
            Some(&token),
            Some(json!({
                "items": [{ "product_id": product.id, "quantity": 1 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
