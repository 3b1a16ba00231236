//! Registry Console
//!
//! Internal administration of the app registry:
//! - Audit trail browsing with actor resolution and entity scoping
//! - App registrations with their identities, data streams, telecoms and grants
//! - App synchronization with the identity provider (Auth0)
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access, behind collaborator traits where services need them
//! - `api` - REST endpoints

pub mod version;
pub mod user;
pub mod app;

// Authentication & identity provider
pub mod auth;
pub mod idp;

// Shared infrastructure
pub mod shared;

pub use shared::error::{PlatformError, Result};

// Re-export main entity types for convenience
pub use version::entity::{EntityRef, Version, VersionEvent};
pub use user::entity::User;
pub use app::entity::{App, AppGrant};

// Re-export repositories and collaborator traits
pub use version::repository::{VersionRepository, VersionStore};
pub use user::repository::{UserDirectory, UserRepository};
pub use app::repository::{AppDirectory, AppRepository};
pub use idp::IdentityProviderSync;

// Re-export services
pub use version::resolver::AuditTrailResolver;
pub use app::sync::AppSyncService;
pub use auth::auth_service::{AccessTokenClaims, AuthService};
pub use shared::authorization_service::{AuthContext, AuthorizationService, CapabilityCheck, PermissionPolicy};

/// API routers, states and middleware
pub mod api {
    pub use crate::shared::middleware::{AppState, AuthLayer, Authenticated};
    pub use crate::shared::api_common::{ApiError, PaginatedResponse, PaginationParams};

    pub use crate::version::api::{audit_trail_router, AuditTrailState};
    pub use crate::app::api::{apps_router, AppsState};
    pub use crate::shared::health_api::{health_router, HealthState};
}
