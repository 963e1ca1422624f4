use crate::auth::{encode_session_token, AuthError, Claims, Principal, Session};
use crate::state::AppState;

/// Opens a server-side session for `principal` and signs the token that refers to it.
pub async fn establish_session(state: &AppState, principal: Principal) -> Result<(Session, String), AuthError> {
    let session = state.sessions.create(principal).await;

    match encode_session_token(&Claims::for_session(&session), &state.config.security.jwt_secret) {
        Ok(token) => Ok((session, token)),
        Err(e) => {
            // No token means nobody can ever present this session
            state.sessions.invalidate(session.id).await;
            Err(e)
        }
    }
}
