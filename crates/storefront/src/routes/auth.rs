//! Authentication route handlers.
//!
//! Username/password login backed by the user store, and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::routes::views::{Flash, PageContext, redirect_with};
use crate::services::CartKey;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
}

/// Display the login page.
pub async fn login_page(ctx: PageContext) -> impl IntoResponse {
    LoginTemplate { ctx }
}

/// Handle login form submission.
///
/// Admins land on the order dashboard, everyone else on the catalog.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let user = match AuthService::new(state.users())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return Ok(redirect_with("/auth/login", Flash::LoginFailed).into_response());
        }
        Err(e) => return Err(AppError::Auth(e)),
    };

    let current = CurrentUser::from(user);
    set_current_user(&session, &current).await?;
    set_sentry_user(&current.id, &current.username);

    let landing = if current.is_admin() { "/admin/orders" } else { "/" };
    Ok(Redirect::to(landing).into_response())
}

/// End the session and drop its cart.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(key) = session.get::<CartKey>(session_keys::CART_ID).await? {
        state.carts().discard(key).await;
    }
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(redirect_with("/", Flash::LoggedOut))
}
