// handlers/public/mod.rs - Public handlers (no session required)
//
// Reachable by anonymous clients; the access policy lists their paths as permit-all.
pub mod auth;
pub mod health;

pub use auth::*;
pub use health::health;
