//! Sync an app with the identity provider
//!
//! Loads the app, checks the operator may sync it, then pushes the app and
//! each of its grants in order. Provider failures become an error flash
//! instead of an HTTP error.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use super::actions::app_path;
use super::entity::App;
use super::repository::AppDirectory;
use crate::idp::IdentityProviderSync;
use crate::shared::authorization_service::{authorize, Action, AuthContext, CapabilityCheck, Resource};
use crate::shared::error::{PlatformError, Result};

/// Message shown to the operator after the action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Flash {
    Notice(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub flash: Flash,
    pub redirect_to: String,
}

pub struct AppSyncService {
    apps: Arc<dyn AppDirectory>,
    provider: Arc<dyn IdentityProviderSync>,
    capabilities: Arc<dyn CapabilityCheck>,
}

impl AppSyncService {
    pub fn new(
        apps: Arc<dyn AppDirectory>,
        provider: Arc<dyn IdentityProviderSync>,
        capabilities: Arc<dyn CapabilityCheck>,
    ) -> Self {
        Self { apps, provider, capabilities }
    }

    pub async fn sync_app(&self, actor: &AuthContext, app_id: i64) -> Result<SyncOutcome> {
        let app = self.apps.find_by_id(app_id).await?
            .ok_or_else(|| PlatformError::not_found("App", app_id.to_string()))?;

        authorize(self.capabilities.as_ref(), actor, Action::SyncOnIdentityProvider, &Resource::App(&app))?;

        let flash = match self.push(&app).await {
            Ok(grant_count) => {
                info!(
                    app_id,
                    grant_count,
                    actor = %actor.principal_id,
                    provider = self.provider.provider_name(),
                    "App synchronized with identity provider"
                );
                Flash::Notice(format!("Application synchronized with {}.", self.provider.provider_name()))
            }
            Err(e) => {
                error!(
                    app_id,
                    actor = %actor.principal_id,
                    provider = self.provider.provider_name(),
                    error = %e,
                    "App synchronization with identity provider failed"
                );
                Flash::Error(format!("An error occurred: {}", e))
            }
        };

        Ok(SyncOutcome {
            flash,
            redirect_to: app_path(app.id),
        })
    }

    /// Stops at the first failure
    async fn push(&self, app: &App) -> Result<usize> {
        self.provider.sync_app(app).await?;

        let grants = self.apps.find_grants(app.id).await?;
        for grant in &grants {
            self.provider.sync_app_grant(app, grant).await?;
        }

        Ok(grants.len())
    }
}
