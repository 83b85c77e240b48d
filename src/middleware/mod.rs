/// Middleware module
///
/// Request-time authorization for per-user resources.

mod auth_middleware;

pub use auth_middleware::{AuthMiddleware, Identity};
