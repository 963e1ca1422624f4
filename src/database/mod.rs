pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProductRepository;
pub use postgres::PgProductRepository;
pub use repository::{ProductRepository, RepositoryError};
