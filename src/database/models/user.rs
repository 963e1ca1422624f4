use sqlx::FromRow;

/// Row of the `app_users` table. `password` holds the stored hash, never the raw secret.
#[derive(Debug, Clone, FromRow)]
pub struct AppUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub roles: Vec<String>,
}
