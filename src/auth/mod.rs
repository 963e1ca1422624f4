pub mod credentials;
pub mod password;
pub mod policy;
pub mod session;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use credentials::{Credential, CredentialStore, MemoryCredentialStore, PgCredentialStore};
pub use policy::{Access, AccessPolicy, Decision, PathPattern};
pub use session::{Session, SessionStore};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password; deliberately not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("password check did not complete: {0}")]
    PasswordCheck(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("ROLE_").unwrap_or(name);
        if name.eq_ignore_ascii_case("USER") {
            Ok(Role::User)
        } else if name.eq_ignore_ascii_case("ADMIN") {
            Ok(Role::Admin)
        } else {
            Err(format!("unknown role '{}'", s))
        }
    }
}

/// An authenticated identity and the roles granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl Principal {
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Verifies submitted credentials against a [`CredentialStore`].
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let credential = self
            .store
            .lookup_credential(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // bcrypt verification is CPU-bound; run it off the async workers
        let raw = password.to_string();
        let stored = credential.password_hash;
        let verified = tokio::task::spawn_blocking(move || password::verify_password(&raw, &stored))
            .await
            .map_err(|e| AuthError::PasswordCheck(e.to_string()))?;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal::new(username, credential.roles))
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

/// Signed payload carried by the session cookie or bearer header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sid: Uuid,
    pub sub: String,
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_session(session: &Session) -> Self {
        Self {
            sid: session.id,
            sub: session.principal.username.clone(),
            roles: session.principal.roles.iter().copied().collect(),
            iat: session.issued_at.timestamp(),
            exp: session.expires_at.timestamp(),
        }
    }
}

pub fn encode_session_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::TokenGeneration("signing secret not configured".to_string()));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn decode_session_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidToken("signing secret not configured".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
