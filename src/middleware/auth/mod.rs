pub mod access;
pub mod config;

pub use access::{AuthMiddleware, apply};
pub use config::{ErrorHandler, MiddlewareConfig, default_error_handler};
