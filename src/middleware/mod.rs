pub mod auth;
pub mod ownership;
pub mod response;

pub use auth::{identity_middleware, AuthUser};
pub use ownership::{assert_ownership, require_role};
pub use response::{ApiResponse, ApiResult};
