//! Route access policy.
//!
//! Every request is classified before it reaches a handler. Anonymous
//! requests to protected routes are sent to the login page (or get 401 under
//! `/api/`); signed-in users without the admin role get 403 on admin routes.
//! Handlers still take `RequireAuth`/`RequireAdmin` for the user they act on.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::auth::AuthRejection;
use crate::models::{CurrentUser, session_keys};

/// Who may reach a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Authenticated,
    Admin,
}

/// Classify a request by method and path.
#[must_use]
pub fn classify(method: &Method, path: &str) -> RouteClass {
    let path = path.trim_end_matches('/');

    if under(path, "/admin") {
        return RouteClass::Admin;
    }
    if under(path, "/api/products") && !matches!(*method, Method::GET | Method::HEAD) {
        return RouteClass::Admin;
    }
    if path == "/checkout"
        || path == "/payment"
        || under(path, "/account")
        || under(path, "/orders")
    {
        return RouteClass::Authenticated;
    }
    RouteClass::Public
}

/// `path` is `prefix` or a sub-path of it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decide whether `user` may reach a route of class `class`.
///
/// # Errors
///
/// Returns the rejection to send instead of running the handler.
pub fn authorize(
    class: RouteClass,
    user: Option<&CurrentUser>,
    path: &str,
) -> Result<(), AuthRejection> {
    match (class, user) {
        (RouteClass::Public, _) => Ok(()),
        (_, None) => Err(AuthRejection::anonymous(path)),
        (RouteClass::Admin, Some(user)) if !user.is_admin() => Err(AuthRejection::Forbidden),
        (_, Some(_)) => Ok(()),
    }
}

/// Middleware enforcing [`classify`] on every request.
///
/// Must run inside the session layer.
pub async fn access_policy_middleware(request: Request, next: Next) -> Response {
    let class = classify(request.method(), request.uri().path());
    if class == RouteClass::Public {
        return next.run(request).await;
    }

    let user = match request.extensions().get::<Session>() {
        Some(session) => session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten(),
        None => None,
    };

    if let Err(rejection) = authorize(class, user.as_ref(), request.uri().path()) {
        tracing::info!(
            path = %request.uri().path(),
            ?class,
            signed_in = user.is_some(),
            "Request rejected by access policy"
        );
        return rejection.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use shopcart_core::{Role, UserId};

    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "someone".to_owned(),
            role,
        }
    }

    #[test]
    fn test_classify_public_routes() {
        for path in ["/", "/products/3", "/cart", "/cart/add", "/auth/login", "/health"] {
            assert_eq!(classify(&Method::GET, path), RouteClass::Public, "{path}");
        }
        assert_eq!(classify(&Method::POST, "/cart/add"), RouteClass::Public);
        assert_eq!(classify(&Method::GET, "/api/products/1"), RouteClass::Public);
    }

    #[test]
    fn test_classify_protected_routes() {
        assert_eq!(classify(&Method::GET, "/checkout"), RouteClass::Authenticated);
        assert_eq!(classify(&Method::POST, "/payment"), RouteClass::Authenticated);
        assert_eq!(classify(&Method::GET, "/account/orders"), RouteClass::Authenticated);
        assert_eq!(classify(&Method::GET, "/orders/7"), RouteClass::Authenticated);
        assert_eq!(classify(&Method::GET, "/admin/orders"), RouteClass::Admin);
        assert_eq!(classify(&Method::GET, "/admin/"), RouteClass::Admin);
        assert_eq!(classify(&Method::POST, "/api/products"), RouteClass::Admin);
        assert_eq!(classify(&Method::DELETE, "/api/products/1"), RouteClass::Admin);
    }

    #[test]
    fn test_classify_does_not_match_lookalike_prefixes() {
        assert_eq!(classify(&Method::GET, "/administrator"), RouteClass::Public);
        assert_eq!(classify(&Method::GET, "/ordersheet"), RouteClass::Public);
    }

    #[test]
    fn test_authorize() {
        let admin = user(Role::Admin);
        let shopper = user(Role::User);

        assert!(authorize(RouteClass::Public, None, "/").is_ok());
        assert_eq!(
            authorize(RouteClass::Authenticated, None, "/checkout"),
            Err(AuthRejection::RedirectToLogin)
        );
        assert_eq!(
            authorize(RouteClass::Admin, None, "/api/products"),
            Err(AuthRejection::Unauthorized)
        );
        assert!(authorize(RouteClass::Authenticated, Some(&shopper), "/checkout").is_ok());
        assert_eq!(
            authorize(RouteClass::Admin, Some(&shopper), "/admin/orders"),
            Err(AuthRejection::Forbidden)
        );
        assert!(authorize(RouteClass::Admin, Some(&admin), "/admin/orders").is_ok());
    }
}
