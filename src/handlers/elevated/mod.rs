// handlers/elevated/mod.rs - ADMIN-only handlers (/admin/**)
pub mod products;

pub use products::{delete_product, edit_product, new_product, save_product};
