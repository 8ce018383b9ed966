//! Request-time JWT authentication for axum.
//!
//! Bearer tokens are verified (RS256, `kid` resolved through a [`KeySource`]) by the
//! middleware, which stores the verified claims in the request extensions. Handlers
//! derive the caller's [`Session`] from there.
//!
//! [`KeySource`]: services::keys::KeySource
//! [`Session`]: services::auth::Session
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

pub use error::AuthError;
