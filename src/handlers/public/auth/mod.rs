// handlers/public/auth/mod.rs - Session acquisition and release
pub mod login;
pub mod session;
pub mod utils;

pub use login::{api_login, login_page, login_submit};
pub use session::{logout, logout_page, not_authorized};
