use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::middleware::auth::clear_session_cookie;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::views;

/// GET /logout - asks for confirmation; the session is untouched
pub async fn logout_page(auth_user: Option<AuthUser>) -> Html<String> {
    views::logout_page(auth_user.as_ref().map(|u| &u.principal))
}

/// POST /logout - ends the session (if any) and clears the cookie
pub async fn logout(State(state): State<AppState>, auth_user: Option<AuthUser>) -> Response {
    if let Some(auth_user) = auth_user {
        state.sessions.invalidate(auth_user.session_id).await;
        tracing::info!("User '{}' logged out", auth_user.principal.username);
    }

    let cookie = clear_session_cookie(state.config.security.cookie_secure);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login?logout")).into_response()
}

/// GET /notAuthorized
pub async fn not_authorized(auth_user: Option<AuthUser>) -> (StatusCode, Html<String>) {
    (
        StatusCode::FORBIDDEN,
        views::not_authorized_page(auth_user.as_ref().map(|u| &u.principal)),
    )
}
