// handlers/public/auth/login.rs - GET/POST /login and POST /api/auth/login

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::utils::establish_session;
use crate::auth::{AuthError, Role};
use crate::error::{ApiError, PageError};
use crate::middleware::auth::{encode_query_value, session_cookie};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Present after a failed attempt (`/login?error`)
    pub error: Option<String>,
    /// Present after logout (`/login?logout`)
    pub logout: Option<String>,
    /// Page to return to after signing in
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub roles: Vec<Role>,
    pub expires_at: DateTime<Utc>,
}

/// GET /login
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let next = query.next.as_deref().and_then(return_target);
    views::login_page(query.error.is_some(), query.logout.is_some(), next)
}

/// Post-login target: a same-site path other than the login/logout pages.
fn return_target(next: &str) -> Option<&str> {
    let next = next.trim();
    let same_site = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    let printable = !next.chars().any(char::is_control);
    let auth_page = ["/login", "/logout"]
        .iter()
        .any(|page| next == *page || next.starts_with(&format!("{}?", page)));

    (same_site && printable && !auth_page).then_some(next)
}

/// POST /login - form login. Success sets the session cookie and returns to the
/// requested page (home by default); failure redirects back to the form without
/// saying which factor was wrong.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let principal = match state.authenticator.login(&form.username, &form.password).await {
        Ok(principal) => principal,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Failed login attempt for '{}'", form.username);
            let retry = match form.next.as_deref().and_then(return_target) {
                Some(next) => format!("/login?error&next={}", encode_query_value(next)),
                None => "/login?error".to_string(),
            };
            return Ok(Redirect::to(&retry).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let (session, token) = establish_session(&state, principal).await?;
    tracing::info!(
        "User '{}' logged in with roles {:?}",
        session.principal.username,
        session.principal.roles
    );

    let cookie = session_cookie(
        &token,
        state.sessions.ttl().num_seconds(),
        state.config.security.cookie_secure,
    );
    let target = form.next.as_deref().and_then(return_target).unwrap_or("/");
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target)).into_response())
}

/// POST /api/auth/login - JSON login returning a bearer token
pub async fn api_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginForm>,
) -> ApiResult<LoginResponse> {
    let principal = state
        .authenticator
        .login(&payload.username, &payload.password)
        .await
        .map_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::warn!("Failed API login attempt for '{}'", payload.username);
            }
            ApiError::from(e)
        })?;

    let (session, token) = establish_session(&state, principal).await?;
    tracing::info!("User '{}' obtained an API token", session.principal.username);

    Ok(ApiResponse::success(LoginResponse {
        token,
        username: session.principal.username,
        roles: session.principal.roles.into_iter().collect(),
        expires_at: session.expires_at,
    }))
}
