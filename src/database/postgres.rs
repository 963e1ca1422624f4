use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::{Product, ProductDraft};
use crate::database::repository::{ProductRepository, RepositoryError};

/// Product store over the `products` table.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so the user's term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, price, quantity)
             VALUES ($1, $2, $3)
             RETURNING id, name, price, quantity",
        )
        .bind(&draft.name)
        .bind(draft.price)
        .bind(draft.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            "UPDATE products
             SET name = $2, price = $3, quantity = $4
             WHERE id = $1
             RETURNING id, name, price, quantity",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound(product.id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>("SELECT id, name, price, quantity FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products =
            sqlx::query_as::<_, Product>("SELECT id, name, price, quantity FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    async fn find_by_name_containing(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let term = term.trim();
        if term.is_empty() {
            return self.find_all().await;
        }

        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, quantity FROM products
             WHERE name ILIKE $1 ESCAPE '\\'
             ORDER BY id",
        )
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pho"), "%pho%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
