//! Role-gated administration.

use axum::http::StatusCode;
use shopcart_integration_tests::TestApp;

#[tokio::test]
async fn test_admin_pages_reject_anonymous_and_users() {
    let mut anonymous = TestApp::new().await;
    let mut user = anonymous.new_browser();
    let mut admin = anonymous.new_browser();

    let response = anonymous.get("/admin/orders").await;
    assert_eq!(response.location(), "/auth/login");

    user.login_user().await;
    assert_eq!(user.get("/admin/orders").await.status, StatusCode::FORBIDDEN);
    assert_eq!(
        user.get("/admin/products/new").await.status,
        StatusCode::FORBIDDEN
    );

    admin.login_admin().await;
    assert_eq!(admin.get("/admin/orders").await.status, StatusCode::OK);
    assert_eq!(admin.get("/admin/products/new").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_cannot_delete_products() {
    let mut user = TestApp::new().await;
    user.login_user().await;

    let response = user.post_form("/admin/products/1/delete", "").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(user.get("/api/products/1").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_manages_products_with_forms() {
    let mut admin = TestApp::new().await;
    admin.login_admin().await;

    let response = admin
        .post_form(
            "/admin/products",
            "name=Doohickey&description=Brand+new&price=%245.25&image_url=",
        )
        .await;
    assert_eq!(response.location(), "/?flash=product_saved");

    let home = admin.get("/").await;
    assert!(home.body.contains("Doohickey"));
    assert!(home.body.contains("$5.25"));

    let edit = admin.get("/admin/products/4/edit").await;
    assert_eq!(edit.status, StatusCode::OK);
    assert!(edit.body.contains("Doohickey"));

    let response = admin.post_form("/admin/products/4/delete", "").await;
    assert_eq!(response.location(), "/?flash=product_deleted");
    assert!(!admin.get("/").await.body.contains("Doohickey"));

    let response = admin.post_form("/admin/products/4/delete", "").await;
    assert_eq!(response.location(), "/?flash=product_not_found");
}

#[tokio::test]
async fn test_invalid_product_form_is_redisplayed() {
    let mut admin = TestApp::new().await;
    admin.login_admin().await;

    let response = admin
        .post_form("/admin/products", "name=Broken&price=-1")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("Broken"));

    let response = admin.post_form("/admin/products", "name=+&price=1").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_updates_order_status() {
    let mut user = TestApp::new().await;
    let mut admin = user.new_browser();

    user.login_user().await;
    user.add_to_cart(1).await;
    user.post_form("/payment", "").await;

    admin.login_admin().await;
    let dashboard = admin.get("/admin/orders").await;
    assert!(dashboard.body.contains("/orders/1"));

    let response = admin
        .post_form("/admin/orders/1/status", "status=SHIPPED")
        .await;
    assert_eq!(response.location(), "/admin/orders?flash=status_updated");

    let detail = user.get("/orders/1").await;
    assert!(detail.body.contains("SHIPPED"));
}

#[tokio::test]
async fn test_order_status_update_rejects_bad_input() {
    let mut user = TestApp::new().await;
    let mut admin = user.new_browser();

    user.login_user().await;
    user.add_to_cart(1).await;
    user.post_form("/payment", "").await;

    admin.login_admin().await;
    let response = admin.post_form("/admin/orders/1/status", "status=+").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = admin
        .post_form("/admin/orders/99/status", "status=SHIPPED")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = user
        .post_form("/admin/orders/1/status", "status=DELIVERED")
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(user.get("/orders/1").await.body.contains("PENDING"));
}
