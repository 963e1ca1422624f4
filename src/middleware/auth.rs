use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::auth::{decode_session_token, AuthError, Decision, Principal};
use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "INVENTORY_SESSION";

/// Authenticated session attached to the request by [`access_control_middleware`]
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub session_id: Uuid,
    pub principal: Principal,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Resolves the caller's session and applies the access policy to the request path.
///
/// Pages are redirected to `/login` or `/notAuthorized`; `/api/**` gets a JSON 401/403.
pub async fn access_control_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let auth_user = resolve_auth_user(&state, request.headers()).await;

    match state.policy.authorize(&path, auth_user.as_ref().map(|u| &u.principal)) {
        Decision::Permit => {
            if let Some(auth_user) = auth_user {
                request.extensions_mut().insert(auth_user);
            }
            next.run(request).await
        }
        Decision::Unauthenticated => {
            tracing::debug!("Anonymous request to gated path {}", path);
            if is_api_path(&path) {
                ApiError::unauthorized("Authentication required").into_response()
            } else if request.method() == Method::GET {
                let requested = request.uri().path_and_query().map_or(path.as_str(), |pq| pq.as_str());
                Redirect::to(&login_redirect(requested)).into_response()
            } else {
                Redirect::to("/login").into_response()
            }
        }
        Decision::Forbidden => {
            let username = auth_user.map(|u| u.principal.username).unwrap_or_default();
            tracing::warn!("Access denied for '{}' to {}", username, path);
            if is_api_path(&path) {
                ApiError::forbidden("Insufficient role for this resource").into_response()
            } else {
                Redirect::to("/notAuthorized").into_response()
            }
        }
    }
}

/// `/login`, remembering the requested page in `next` unless it is the home page.
pub fn login_redirect(requested: &str) -> String {
    if requested == "/" {
        return "/login".to_string();
    }
    format!("/login?next={}", encode_query_value(requested))
}

pub fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

async fn resolve_auth_user(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let token = extract_session_token(headers)?;

    let claims = match decode_session_token(&token, &state.config.security.jwt_secret) {
        Ok(claims) => claims,
        Err(AuthError::InvalidToken(msg)) => {
            tracing::debug!("Ignoring session token: {}", msg);
            return None;
        }
        Err(e) => {
            tracing::error!("Session token check failed: {}", e);
            return None;
        }
    };

    // A signed token is not enough: the session must still be live
    let session = state.sessions.resolve(claims.sid).await?;
    Some(AuthUser {
        session_id: session.id,
        principal: session.principal,
    })
}

/// Bearer header first, then the session cookie.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        max_age_secs,
        if secure { "; Secure" } else { "" }
    )
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}
