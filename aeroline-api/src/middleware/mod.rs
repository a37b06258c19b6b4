pub mod auth;
pub mod rate_limit;

pub use auth::{issue_token, login_required, AdminUser, AuthUser, Claims};
pub use rate_limit::rate_limit_middleware;
