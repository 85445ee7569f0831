//! Cart behavior through the HTTP surface.

use axum::http::StatusCode;
use shopcart_integration_tests::TestApp;

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let mut app = TestApp::new().await;

    assert_eq!(app.cart_count().await, 0);

    let cart = app.get("/cart").await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_to_cart_redirects_with_flash() {
    let mut app = TestApp::new().await;

    let response = app.post_form("/cart/add", "product_id=1").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/?flash=added");

    let home = app.get("/?flash=added").await;
    assert!(home.body.contains("1 item added to the cart"));
    assert_eq!(app.cart_count().await, 1);
}

#[tokio::test]
async fn test_adding_twice_increments_quantity() {
    let mut app = TestApp::new().await;

    app.add_to_cart(1).await;
    app.add_to_cart(1).await;
    app.add_to_cart(2).await;

    assert_eq!(app.cart_count().await, 3);

    let cart = app.get("/cart").await;
    assert!(cart.body.contains("Widget"));
    assert!(cart.body.contains("Gadget"));
    // 2 x $10.00 + $25.50
    assert!(cart.body.contains("$45.50"));
}

#[tokio::test]
async fn test_add_unknown_product_leaves_cart_unchanged() {
    let mut app = TestApp::new().await;

    let response = app.post_form("/cart/add", "product_id=999").await;
    assert_eq!(response.location(), "/?flash=product_not_found");
    assert_eq!(app.cart_count().await, 0);
}

#[tokio::test]
async fn test_update_quantity_and_remove_by_zero() {
    let mut app = TestApp::new().await;
    app.add_to_cart(3).await;

    let response = app
        .post_form("/cart/update", "product_id=3&quantity=4")
        .await;
    assert_eq!(response.location(), "/cart?flash=updated");
    assert_eq!(app.cart_count().await, 4);

    app.post_form("/cart/update", "product_id=3&quantity=0")
        .await;
    assert_eq!(app.cart_count().await, 0);
}

#[tokio::test]
async fn test_remove_line() {
    let mut app = TestApp::new().await;
    app.add_to_cart(1).await;
    app.add_to_cart(2).await;

    let response = app.post_form("/cart/remove", "product_id=1").await;
    assert_eq!(response.location(), "/cart?flash=removed");
    assert_eq!(app.cart_count().await, 1);

    let cart = app.get("/cart").await;
    assert!(!cart.body.contains("Widget"));
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let mut first = TestApp::new().await;
    let mut second = first.new_browser();

    first.add_to_cart(1).await;

    assert_eq!(first.cart_count().await, 1);
    assert_eq!(second.cart_count().await, 0);
}

#[tokio::test]
async fn test_cart_uses_current_catalog_price() {
    let mut shopper = TestApp::new().await;
    let mut admin = shopper.new_browser();
    shopper.add_to_cart(1).await;

    admin.login_admin().await;
    let response = admin
        .post_form(
            "/admin/products/1",
            "name=Widget&description=Repriced&price=12.00&image_url=",
        )
        .await;
    assert_eq!(response.location(), "/?flash=product_saved");

    let cart = shopper.get("/cart").await;
    assert!(cart.body.contains("$12.00"));
}

#[tokio::test]
async fn test_quantity_beyond_line_maximum_is_rejected() {
    let mut app = TestApp::new().await;
    app.add_to_cart(1).await;

    let response = app
        .post_form("/cart/update", "product_id=1&quantity=3000000000")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.cart_count().await, 1);

    let response = app
        .post_form("/cart/update", "product_id=1&quantity=10000")
        .await;
    assert_eq!(response.location(), "/cart?flash=updated");
    assert_eq!(app.cart_count().await, 10_000);

    let response = app.post_form("/cart/add", "product_id=1").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.cart_count().await, 10_000);

    // The capped cart still checks out
    app.login_user().await;
    let confirmation = app.post_form("/payment", "").await;
    assert_eq!(confirmation.status, StatusCode::OK);
    assert!(confirmation.body.contains("$100000.00"));
    assert_eq!(app.orders.len().await, 1);
}
