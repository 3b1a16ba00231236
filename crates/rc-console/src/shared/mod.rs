//! Shared infrastructure: errors, API types, auth plumbing and health checks.

pub mod error;
pub mod api_common;
pub mod permissions;
pub mod authorization_service;
pub mod middleware;
pub mod health_api;

pub use authorization_service::{authorize, AuthContext, CapabilityCheck, PermissionPolicy};
