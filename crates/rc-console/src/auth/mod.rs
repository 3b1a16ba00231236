//! Operator authentication

pub mod auth_service;

pub use auth_service::{AccessTokenClaims, AuthConfig, AuthService};
