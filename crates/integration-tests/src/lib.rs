//! Integration tests for Shopcart.
//!
//! The storefront router is driven in-process over in-memory stores and a
//! memory session store, so no database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopcart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart mutations, flash redirects and the badge count
//! - `checkout` - Login gate, order placement and order visibility
//! - `access_control` - Admin-only pages and API writes
//! - `product_api` - JSON product API

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use shopcart_core::{ProductInput, Role};
use shopcart_storefront::config::StorefrontConfig;
use shopcart_storefront::db::memory::{MemoryCatalogStore, MemoryOrderStore, MemoryUserStore};
use shopcart_storefront::middleware::SESSION_COOKIE_NAME;
use shopcart_storefront::services::auth::AuthService;
use shopcart_storefront::state::AppState;

/// Peer address of every request; the rate limiters key on it.
const CLIENT_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)), 40_000);

/// Demo catalog: Widget ($10.00), Gadget ($25.50), Gizmo ($99.99), IDs 1-3.
fn demo_products() -> Vec<ProductInput> {
    [("Widget", 1000), ("Gadget", 2550), ("Gizmo", 9999)]
        .into_iter()
        .map(|(name, cents)| ProductInput {
            name: name.to_owned(),
            description: format!("A fine {name}."),
            price: Decimal::new(cents, 2),
            image_url: String::new(),
        })
        .collect()
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Target of a redirect.
    ///
    /// # Panics
    ///
    /// Panics if the response has no `Location` header.
    #[must_use]
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_else(|| panic!("no Location header on {} response", self.status))
    }

    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response body is not JSON ({e}): {}", self.body))
    }
}

/// One browser session against a fresh storefront.
///
/// The session cookie is carried between requests like a browser would.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub orders: Arc<MemoryOrderStore>,
}

impl TestApp {
    /// Fresh storefront with the demo catalog and the `admin`/`admin123` and
    /// `user`/`user123` accounts.
    ///
    /// # Panics
    ///
    /// Panics if the demo accounts cannot be created.
    pub async fn new() -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let auth = AuthService::new(users.as_ref());
        for (username, password, role) in [
            ("admin", "admin123", Role::Admin),
            ("user", "user123", Role::User),
            ("other", "other123", Role::User),
        ] {
            auth.register(username, password, role)
                .await
                .unwrap_or_else(|e| panic!("failed to create {username}: {e}"));
        }

        let catalog = Arc::new(MemoryCatalogStore::with_products(demo_products()));
        let orders = Arc::new(MemoryOrderStore::new());
        let state = AppState::with_stores(
            StorefrontConfig::local(),
            catalog,
            orders.clone(),
            users,
        );

        Self {
            router: shopcart_storefront::app(state, MemoryStore::default()),
            cookie: None,
            orders,
        }
    }

    /// Same storefront, new browser: no session cookie.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            orders: self.orders.clone(),
        }
    }

    /// Send a request, updating the session cookie from the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        body: String,
    ) -> TestResponse {
        let mut request = Request::builder()
            .method(method)
            .uri(path)
            .extension(ConnectInfo(CLIENT_ADDR));
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={cookie}"));
        }
        let request = request
            .body(Body::from(body))
            .unwrap_or_else(|e| panic!("invalid request: {e}"));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        self.store_cookie(response.headers());
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn store_cookie(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            let Some((name, cookie)) = pair.split_once('=') else {
                continue;
            };
            if name.trim() != SESSION_COOKIE_NAME {
                continue;
            }
            let cookie = cookie.trim();
            self.cookie = (!cookie.is_empty()).then(|| cookie.to_owned());
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, String::new()).await
    }

    /// POST an urlencoded form body such as `product_id=1`.
    pub async fn post_form(&mut self, path: &str, form: &str) -> TestResponse {
        self.send(
            Method::POST,
            path,
            Some("application/x-www-form-urlencoded"),
            form.to_owned(),
        )
        .await
    }

    pub async fn send_json(
        &mut self,
        method: Method,
        path: &str,
        body: &serde_json::Value,
    ) -> TestResponse {
        self.send(method, path, Some("application/json"), body.to_string())
            .await
    }

    /// Log in and return the redirect response.
    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form(
            "/auth/login",
            &format!("username={username}&password={password}"),
        )
        .await
    }

    /// Log in as `user`.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn login_user(&mut self) {
        let response = self.login("user", "user123").await;
        assert_eq!(response.location(), "/", "user login failed");
    }

    /// Log in as `admin`.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn login_admin(&mut self) {
        let response = self.login("admin", "admin123").await;
        assert_eq!(response.location(), "/admin/orders", "admin login failed");
    }

    /// Add one unit of `product_id` to the cart.
    ///
    /// # Panics
    ///
    /// Panics if the product does not exist.
    pub async fn add_to_cart(&mut self, product_id: i32) {
        let response = self
            .post_form("/cart/add", &format!("product_id={product_id}"))
            .await;
        assert_eq!(response.location(), "/?flash=added");
    }

    /// The cart badge count.
    pub async fn cart_count(&mut self) -> u64 {
        self.get("/cart/count").await.json()["itemCount"]
            .as_u64()
            .unwrap_or_default()
    }
}
