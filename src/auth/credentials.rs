use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

use super::{password, AuthError, Role};
use crate::database::models::AppUser;

/// Password used by the built-in accounts.
pub const DEFAULT_PASSWORD: &str = "1234";

/// Built-in accounts: two plain users and one administrator.
pub const DEFAULT_USERS: &[(&str, &[Role])] = &[
    ("user1", &[Role::User]),
    ("user2", &[Role::User]),
    ("admin", &[Role::User, Role::Admin]),
];

/// What the authenticator needs to know about a user
#[derive(Debug, Clone)]
pub struct Credential {
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn lookup_credential(&self, username: &str) -> Result<Option<Credential>, AuthError>;
}

/// Fixed user list held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    users: HashMap<String, Credential>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user, hashing the password once up front at the given bcrypt cost.
    pub fn with_user(
        mut self,
        username: &str,
        raw_password: &str,
        roles: &[Role],
        cost: u32,
    ) -> Result<Self, AuthError> {
        self.users.insert(
            username.to_string(),
            Credential {
                password_hash: password::hash_password(raw_password, cost)?,
                roles: roles.iter().copied().collect(),
            },
        );
        Ok(self)
    }

    pub fn with_default_users(cost: u32) -> Result<Self, AuthError> {
        DEFAULT_USERS.iter().try_fold(Self::new(), |store, (username, roles)| {
            store.with_user(username, DEFAULT_PASSWORD, roles, cost)
        })
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn lookup_credential(&self, username: &str) -> Result<Option<Credential>, AuthError> {
        Ok(self.users.get(username).cloned())
    }
}

/// Users stored in the `app_users` table
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<AppUser>, AuthError> {
        let user = sqlx::query_as::<_, AppUser>(
            "SELECT id, username, password, roles FROM app_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Inserts the built-in accounts when the table is empty. Returns the number inserted.
    pub async fn seed_default_users(&self, cost: u32) -> Result<usize, AuthError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_users")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            info!("app_users already has {} rows, skipping user seed", existing);
            return Ok(0);
        }

        for (username, roles) in DEFAULT_USERS {
            let password_hash = password::hash_password(DEFAULT_PASSWORD, cost)?;
            let role_names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
            sqlx::query(
                "INSERT INTO app_users (username, password, roles) VALUES ($1, $2, $3)
                 ON CONFLICT (username) DO NOTHING",
            )
            .bind(*username)
            .bind(password_hash)
            .bind(&role_names)
            .execute(&self.pool)
            .await?;
            info!("Seeded user '{}' with roles {:?}", username, role_names);
        }

        Ok(DEFAULT_USERS.len())
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn lookup_credential(&self, username: &str) -> Result<Option<Credential>, AuthError> {
        Ok(self.find_by_username(username).await?.map(|user| Credential {
            roles: parse_roles(&user.username, &user.roles),
            password_hash: user.password,
        }))
    }
}

/// Stored role names to roles; unknown names are dropped.
pub fn parse_roles(username: &str, names: &[String]) -> BTreeSet<Role> {
    names
        .iter()
        .filter_map(|name| match name.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!("Ignoring stored role for '{}': {}", username, e);
                None
            }
        })
        .collect()
}
