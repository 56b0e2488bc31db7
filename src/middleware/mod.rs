pub mod auth;
pub mod response;

pub use auth::{session_user, AuthUser};
pub use response::{ApiResponse, ApiResult};
