//! Authorization Service
//!
//! Permission-based access control for console operators, and the
//! capability check the presentation layer uses to gate buttons and actions.

use std::collections::HashSet;

use crate::app::entity::App;
use crate::auth::auth_service::AccessTokenClaims;
use crate::shared::error::{PlatformError, Result};
use crate::shared::permissions;

/// Authorization context for a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Operator actor id (the value recorded as `whodunnit`)
    pub principal_id: String,

    pub email: Option<String>,

    pub name: String,

    /// All permissions (resolved from roles)
    pub permissions: HashSet<String>,

    pub roles: Vec<String>,
}

impl AuthContext {
    pub fn from_claims_with_permissions(
        claims: &AccessTokenClaims,
        permissions: HashSet<String>,
    ) -> Self {
        Self {
            principal_id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            permissions,
            roles: claims.roles.clone(),
        }
    }

    /// Check if this context has a specific permission
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.permissions.contains(permission) {
            return true;
        }

        let parts: Vec<&str> = permission.split(':').collect();
        if parts.len() >= 2 {
            let wildcard = format!("{}:*", parts[0]);
            if self.permissions.contains(&wildcard) {
                return true;
            }

            if self.permissions.contains(permissions::ADMIN_ALL) {
                return true;
            }
        }

        false
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// What the operator wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Edit,
    Destroy,
    /// Bulk sync of every app with the identity provider
    Sync,
    /// Push one app and its grants to the identity provider
    SyncOnIdentityProvider,
}

/// What the action applies to. Class-level resources carry no instance.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    AuditTrail,
    AppClass,
    App(&'a App),
    IdentityApp { app_id: i64 },
    AppMssTelecom { app_id: i64 },
}

/// Capability check injected into the presentation layer.
pub trait CapabilityCheck: Send + Sync {
    fn can_perform(&self, actor: &AuthContext, action: Action, resource: &Resource<'_>) -> bool;
}

/// Capability check backed by the operator's resolved permissions.
#[derive(Debug, Clone, Default)]
pub struct PermissionPolicy;

impl PermissionPolicy {
    pub fn required_permission(action: Action, resource: &Resource<'_>) -> Option<&'static str> {
        use permissions::{app_mss_telecoms, apps, audit_trail, identity_apps};

        match (resource, action) {
            (Resource::AuditTrail, Action::View) => Some(audit_trail::VIEW),
            (Resource::AppClass | Resource::App(_), Action::View) => Some(apps::VIEW),
            (Resource::AppClass, Action::Create) => Some(apps::CREATE),
            (Resource::AppClass, Action::Sync) => Some(apps::SYNC),
            (Resource::App(_), Action::Edit) => Some(apps::EDIT),
            (Resource::App(_), Action::SyncOnIdentityProvider) => Some(apps::SYNC_IDENTITY_PROVIDER),
            (Resource::IdentityApp { .. }, Action::Create) => Some(identity_apps::CREATE),
            (Resource::IdentityApp { .. }, Action::Destroy) => Some(identity_apps::DESTROY),
            (Resource::AppMssTelecom { .. }, Action::Create) => Some(app_mss_telecoms::CREATE),
            (Resource::AppMssTelecom { .. }, Action::Destroy) => Some(app_mss_telecoms::DESTROY),
            _ => None,
        }
    }
}

impl CapabilityCheck for PermissionPolicy {
    fn can_perform(&self, actor: &AuthContext, action: Action, resource: &Resource<'_>) -> bool {
        Self::required_permission(action, resource)
            .map(|permission| actor.has_permission(permission))
            .unwrap_or(false)
    }
}

/// Turn a denied capability into a `Forbidden` error.
pub fn authorize(
    check: &dyn CapabilityCheck,
    actor: &AuthContext,
    action: Action,
    resource: &Resource<'_>,
) -> Result<()> {
    if check.can_perform(actor, action, resource) {
        Ok(())
    } else {
        Err(PlatformError::forbidden(format!("Not allowed to {:?} on {}", action, resource_name(resource))))
    }
}

fn resource_name(resource: &Resource<'_>) -> String {
    match resource {
        Resource::AuditTrail => "AuditTrail".to_string(),
        Resource::AppClass => "App".to_string(),
        Resource::App(app) => format!("App#{}", app.id),
        Resource::IdentityApp { app_id } => format!("IdentityApp(app {})", app_id),
        Resource::AppMssTelecom { app_id } => format!("AppMssTelecom(app {})", app_id),
    }
}

/// Builds authorization contexts from validated token claims
#[derive(Debug, Clone, Default)]
pub struct AuthorizationService;

impl AuthorizationService {
    pub fn new() -> Self {
        Self
    }

    pub fn build_context(&self, claims: &AccessTokenClaims) -> AuthContext {
        let permissions = claims.roles.iter()
            .flat_map(|role| permissions::permissions_for_role(role).iter())
            .map(|p| p.to_string())
            .collect();
        AuthContext::from_claims_with_permissions(claims, permissions)
    }
}
