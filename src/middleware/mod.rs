pub mod auth;
pub mod caller;
pub mod response;

pub use auth::jwt_auth_middleware;
pub use caller::AuthCaller;
pub use response::{ApiResponse, ApiResult};
