use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::database::models::{Product, ProductDraft};
use crate::database::repository::{ProductRepository, RepositoryError};

/// In-process product store used when no database is configured.
#[derive(Debug)]
pub struct MemoryProductRepository {
    rows: RwLock<BTreeMap<i64, Product>>,
    next_id: AtomicI64,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let product = draft.into_product(id);
        self.rows.write().await.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(product)
            }
            None => Err(RepositoryError::NotFound(product.id)),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Product, RepositoryError> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_name_containing(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.find_all().await;
        }

        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.rows.read().await.len() as i64)
    }
}
