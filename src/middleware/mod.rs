pub mod auth;
pub mod response;

pub use auth::{access_control_middleware, AuthUser, SESSION_COOKIE};
pub use response::{ApiResponse, ApiResult};
