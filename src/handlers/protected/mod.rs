// handlers/protected/mod.rs - Handlers behind an authenticated session
//
// Page routes live under /user/** (USER role); JSON routes under /api/**.
pub mod auth;
pub mod products;

pub use auth::{session_logout, session_whoami};
pub use products::{api_get_product, api_list_products, home, index, search};
