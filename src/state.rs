use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AccessPolicy, AuthError, Authenticator, MemoryCredentialStore, PgCredentialStore, SessionStore};
use crate::config::AppConfig;
use crate::database::{
    DatabaseError, DatabaseManager, MemoryProductRepository, PgProductRepository, ProductRepository,
};

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Shared handles passed to every handler and to the access-control middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub products: Arc<dyn ProductRepository>,
    pub authenticator: Authenticator,
    pub sessions: SessionStore,
    pub policy: Arc<AccessPolicy>,
    /// Present only for the Postgres backend.
    pub database: Option<DatabaseManager>,
    /// Postgres user table, when users live in the database.
    pub user_store: Option<PgCredentialStore>,
}

impl AppState {
    /// Memory-backed state with the built-in accounts, hashed at the configured cost.
    pub fn in_memory(config: AppConfig) -> Result<Self, AuthError> {
        let users = MemoryCredentialStore::with_default_users(config.security.password_hash_cost)?;
        Ok(Self::assemble(
            config,
            Arc::new(MemoryProductRepository::new()),
            Authenticator::new(Arc::new(users)),
            None,
            None,
        ))
    }

    /// Postgres-backed state when `database.url` is set, memory-backed otherwise.
    pub async fn from_config(config: AppConfig) -> Result<Self, StateError> {
        if config.database.url.is_none() {
            tracing::info!("DATABASE_URL not set, using in-memory storage");
            return Ok(Self::in_memory(config)?);
        }

        let database = DatabaseManager::connect(&config.database).await?;
        database.ensure_schema().await?;

        let pool = database.pool().clone();
        let user_store = PgCredentialStore::new(pool.clone());
        Ok(Self::assemble(
            config,
            Arc::new(PgProductRepository::new(pool)),
            Authenticator::new(Arc::new(user_store.clone())),
            Some(database),
            Some(user_store),
        ))
    }

    fn assemble(
        config: AppConfig,
        products: Arc<dyn ProductRepository>,
        authenticator: Authenticator,
        database: Option<DatabaseManager>,
        user_store: Option<PgCredentialStore>,
    ) -> Self {
        let ttl = chrono::Duration::hours(config.security.session_expiry_hours as i64);
        Self {
            policy: Arc::new(AccessPolicy::for_config(&config)),
            sessions: SessionStore::new(ttl),
            config: Arc::new(config),
            products,
            authenticator,
            database,
            user_store,
        }
    }
}
