//! Middleware module
//!
//! Bearer-token authentication for the user management routes.

mod jwt_middleware;

pub use jwt_middleware::JwtMiddleware;
