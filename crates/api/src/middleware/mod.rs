//! Request middleware.

pub mod auth;

pub use auth::{AuthUser, MaybeAuth, auth_middleware};
