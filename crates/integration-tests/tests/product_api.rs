//! JSON product API and health endpoints.

use axum::http::{Method, StatusCode};
use serde_json::json;
use shopcart_integration_tests::TestApp;

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new().await;

    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");

    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_and_show_products() {
    let mut app = TestApp::new().await;

    let list = app.get("/api/products").await;
    assert_eq!(list.status, StatusCode::OK);
    let products = list.json();
    let names: Vec<_> = products
        .as_array()
        .map(|products| products.iter().filter_map(|p| p["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["Widget", "Gadget", "Gizmo"]);

    let gadget = app.get("/api/products/2").await.json();
    assert_eq!(gadget["price"], "25.50");

    let missing = app.get("/api/products/999").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.json()["error"].is_string());
}

#[tokio::test]
async fn test_writes_require_admin() {
    let mut anonymous = TestApp::new().await;
    let mut user = anonymous.new_browser();
    let body = json!({ "name": "Sneaky", "price": "1.00" });

    let response = anonymous
        .send_json(Method::POST, "/api/products", &body)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    user.login_user().await;
    let response = user.send_json(Method::POST, "/api/products", &body).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = user.send(Method::DELETE, "/api/products/1", None, String::new()).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_crud() {
    let mut admin = TestApp::new().await;
    admin.login_admin().await;

    let created = admin
        .send_json(
            Method::POST,
            "/api/products",
            &json!({
                "name": "Thingamajig",
                "description": "Does things",
                "price": "7.50",
                "image_url": "https://example.com/thing.png"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let product = created.json();
    assert_eq!(product["id"], 4);
    assert_eq!(product["name"], "Thingamajig");

    let updated = admin
        .send_json(
            Method::PUT,
            "/api/products/4",
            &json!({ "name": "Thingamajig II", "price": "8.00" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["name"], "Thingamajig II");

    let deleted = admin
        .send(Method::DELETE, "/api/products/4", None, String::new())
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let again = admin
        .send(Method::DELETE, "/api/products/4", None, String::new())
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_product_is_rejected() {
    let mut admin = TestApp::new().await;
    admin.login_admin().await;

    let response = admin
        .send_json(
            Method::POST,
            "/api/products",
            &json!({ "name": "   ", "price": "3.00" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());

    let response = admin
        .send_json(
            Method::PUT,
            "/api/products/999",
            &json!({ "name": "Ghost", "price": "3.00" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prices_are_rounded_and_bounded() {
    let mut admin = TestApp::new().await;
    admin.login_admin().await;

    let created = admin
        .send_json(
            Method::POST,
            "/api/products",
            &json!({ "name": "Half Cent", "price": "10.005" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.json()["price"], "10.01");

    let too_large = admin
        .send_json(
            Method::POST,
            "/api/products",
            &json!({ "name": "Galaxy", "price": "10000000000.00" }),
        )
        .await;
    assert_eq!(too_large.status, StatusCode::BAD_REQUEST);
    assert!(too_large.json()["error"].is_string());

    let too_large = admin
        .send_json(
            Method::PUT,
            "/api/products/1",
            &json!({ "name": "Widget", "price": "1000000000000" }),
        )
        .await;
    assert_eq!(too_large.status, StatusCode::BAD_REQUEST);

    let widget = admin.get("/api/products/1").await.json();
    assert_eq!(widget["price"], "10.00");
}
