use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Role;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub username: String,
    pub roles: Vec<Role>,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// GET /api/auth/whoami - the caller's identity and session expiry
pub async fn whoami(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<WhoAmI> {
    let session = state
        .sessions
        .resolve(auth_user.session_id)
        .await
        .ok_or_else(|| ApiError::unauthorized("Session is missing or expired"))?;

    Ok(ApiResponse::success(WhoAmI {
        username: session.principal.username,
        roles: session.principal.roles.into_iter().collect(),
        session_id: session.id,
        expires_at: session.expires_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub logged_out: bool,
}

/// DELETE /api/auth/session - ends the caller's session
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<LogoutResult> {
    let logged_out = state.sessions.invalidate(auth_user.session_id).await;
    tracing::info!("User '{}' ended API session", auth_user.principal.username);
    Ok(ApiResponse::success(LogoutResult { logged_out }))
}
