pub mod product;
pub mod user;

pub use product::{Product, ProductDraft, ProductForm};
pub use user::AppUser;
