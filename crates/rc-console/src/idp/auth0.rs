//! Auth0 Management API adapter
//!
//! Obtains a management token with the client-credentials grant and patches
//! the client and client-grant resources of an app.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::IdentityProviderSync;
use crate::app::entity::{App, AppGrant};
use crate::shared::error::{PlatformError, Result};

/// Refresh the management token this long before it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Connection settings for the Auth0 tenant
#[derive(Debug, Clone)]
pub struct Auth0Settings {
    /// e.g. `https://tenant.eu.auth0.com`
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Management API audience, usually `{base_url}/api/v2/`
    pub audience: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    86400
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Serialize)]
struct ClientUpdate<'a> {
    name: &'a str,
    callbacks: &'a [String],
    allowed_logout_urls: &'a [String],
    web_origins: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    initiate_login_uri: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ClientGrant {
    id: String,
}

#[derive(Debug, Serialize)]
struct ClientGrantCreate<'a> {
    client_id: &'a str,
    audience: &'a str,
    scope: &'a [String],
}

#[derive(Debug, Serialize)]
struct ClientGrantUpdate<'a> {
    scope: &'a [String],
}

pub struct Auth0Client {
    settings: Auth0Settings,
    http_client: reqwest::Client,
    token: RwLock<Option<CachedToken>>,
}

impl Auth0Client {
    pub fn new(settings: Auth0Settings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| PlatformError::internal(format!("Failed to build Auth0 HTTP client: {}", e)))?;

        Ok(Self {
            settings,
            http_client,
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn management_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let mut cached = self.token.write().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting Auth0 management token");
        let response = self.http_client
            .post(self.url("/oauth/token"))
            .json(&TokenRequest {
                grant_type: "client_credentials",
                client_id: &self.settings.client_id,
                client_secret: &self.settings.client_secret,
                audience: &self.settings.audience,
            })
            .send()
            .await?;
        let token: TokenResponse = check_status(response, "token request").await?.json().await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    async fn find_client_grant(&self, token: &str, client_id: &str, audience: &str) -> Result<Option<ClientGrant>> {
        let response = self.http_client
            .get(self.url("/api/v2/client-grants"))
            .bearer_auth(token)
            .query(&[("client_id", client_id), ("audience", audience)])
            .send()
            .await?;
        let grants: Vec<ClientGrant> = check_status(response, "client grant lookup").await?.json().await?;
        Ok(grants.into_iter().next())
    }
}

fn client_id_of(app: &App) -> Result<&str> {
    app.auth0_client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PlatformError::validation(format!("App {} has no Auth0 client id", app.id)))
}

async fn check_status(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(PlatformError::identity_provider(format!(
        "Auth0 {} failed with {}: {}",
        operation, status, body
    )))
}

#[async_trait]
impl IdentityProviderSync for Auth0Client {
    fn provider_name(&self) -> &'static str {
        "Auth0"
    }

    async fn sync_app(&self, app: &App) -> Result<()> {
        let client_id = client_id_of(app)?;
        let token = self.management_token().await?;

        let response = self.http_client
            .patch(self.url(&format!("/api/v2/clients/{}", urlencoding::encode(client_id))))
            .bearer_auth(&token)
            .json(&ClientUpdate {
                name: &app.name,
                callbacks: &app.callbacks,
                allowed_logout_urls: &app.allowed_logout_urls,
                web_origins: &app.web_origins,
                initiate_login_uri: app.initiate_login_uri.as_deref().filter(|u| !u.is_empty()),
            })
            .send()
            .await?;
        check_status(response, "client update").await?;

        info!(app_id = app.id, client_id, "Synchronized app with Auth0");
        Ok(())
    }

    async fn sync_app_grant(&self, app: &App, grant: &AppGrant) -> Result<()> {
        let client_id = client_id_of(app)?;
        let token = self.management_token().await?;

        let response = match self.find_client_grant(&token, client_id, &grant.audience).await? {
            Some(existing) => {
                self.http_client
                    .patch(self.url(&format!("/api/v2/client-grants/{}", urlencoding::encode(&existing.id))))
                    .bearer_auth(&token)
                    .json(&ClientGrantUpdate { scope: &grant.scopes })
                    .send()
                    .await?
            }
            None => {
                self.http_client
                    .post(self.url("/api/v2/client-grants"))
                    .bearer_auth(&token)
                    .json(&ClientGrantCreate {
                        client_id,
                        audience: &grant.audience,
                        scope: &grant.scopes,
                    })
                    .send()
                    .await?
            }
        };
        check_status(response, "client grant update").await?;

        info!(app_id = app.id, grant_id = grant.id, audience = %grant.audience, "Synchronized app grant with Auth0");
        Ok(())
    }
}

/// Auth0 dashboard page of a client
pub fn auth0_dashboard_link(region: &str, tenant: &str, client_id: &str) -> String {
    format!(
        "https://manage.auth0.com/dashboard/{}/{}/applications/{}/settings",
        region,
        tenant,
        urlencoding::encode(client_id)
    )
}
