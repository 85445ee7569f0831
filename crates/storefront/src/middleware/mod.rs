//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Access policy (reject before handlers run)
//! 6. Rate limiting (governor, login and product API only)

pub mod access;
pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use access::{RouteClass, access_policy_middleware, classify};
pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user,
};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, existing_cart, session_cart};
