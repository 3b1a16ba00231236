//! Identity Provider Sync
//!
//! Pushes app registrations to the external identity provider.

pub mod auth0;

use async_trait::async_trait;

use crate::app::entity::{App, AppGrant};
use crate::shared::error::{PlatformError, Result};

pub use auth0::{auth0_dashboard_link, Auth0Client, Auth0Settings};

/// Collaborator that mirrors apps and their grants into the identity provider
#[async_trait]
pub trait IdentityProviderSync: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Push the app's client settings
    async fn sync_app(&self, app: &App) -> Result<()>;

    /// Push one grant of the app
    async fn sync_app_grant(&self, app: &App, grant: &AppGrant) -> Result<()>;
}

/// Used when no identity provider is configured; every push fails
pub struct UnconfiguredProvider;

#[async_trait]
impl IdentityProviderSync for UnconfiguredProvider {
    fn provider_name(&self) -> &'static str {
        "Auth0"
    }

    async fn sync_app(&self, _app: &App) -> Result<()> {
        Err(not_configured())
    }

    async fn sync_app_grant(&self, _app: &App, _grant: &AppGrant) -> Result<()> {
        Err(not_configured())
    }
}

fn not_configured() -> PlatformError {
    PlatformError::identity_provider("Auth0 is not configured")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_provider_fails() {
        let err = UnconfiguredProvider.sync_app(&App::new(1, "billing")).await.unwrap_err();
        assert_eq!(err.to_string(), "Identity provider error: Auth0 is not configured");
    }
}
