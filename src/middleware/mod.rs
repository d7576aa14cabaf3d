// Middleware: bearer authentication, role gating and CORS

pub mod auth;
pub mod auth_middleware;
pub mod cors;

pub use auth::AuthenticatedUser;
pub use auth_middleware::{auth_middleware, bearer_token, require_roles};
pub use cors::dynamic_cors_middleware;
