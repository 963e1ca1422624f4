use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Product, ProductDraft};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("product {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Typed CRUD over product rows. Listing operations return rows ordered by id.
///
/// Implementations expect drafts that already passed [`ProductDraft::field_errors`].
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Assigns a fresh id, ignoring any id on the draft.
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;

    /// Overwrites every field of an existing row. Never inserts.
    async fn update(&self, product: Product) -> Result<Product, RepositoryError>;

    /// Removes the row, or fails with `NotFound` if it does not exist.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Product, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Case-insensitive substring match on name. A blank term behaves as `find_all`.
    async fn find_by_name_containing(&self, term: &str) -> Result<Vec<Product>, RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;
}

/// Create when the draft has no id, otherwise update the referenced row.
pub async fn save(
    repository: &dyn ProductRepository,
    draft: ProductDraft,
) -> Result<Product, RepositoryError> {
    match draft.id {
        Some(id) => repository.update(draft.into_product(id)).await,
        None => repository.create(draft).await,
    }
}
