//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use rc_console::app::entity::{App, AppGrant};
use rc_console::version::VersionQuery;
use rc_console::{
    AppDirectory, AuthContext, IdentityProviderSync, PlatformError, Result, User, UserDirectory,
    Version, VersionStore,
};

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn actor(perms: &[&str]) -> AuthContext {
    AuthContext {
        principal_id: "ops-1".to_string(),
        email: Some("ops@example.com".to_string()),
        name: "Ops".to_string(),
        permissions: perms.iter().map(|p| p.to_string()).collect(),
        roles: vec![],
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Vec<User>,
}

impl InMemoryUsers {
    pub fn with(users: Vec<User>) -> Arc<Self> {
        Arc::new(Self { users })
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryApps {
    apps: Vec<App>,
    grants: Vec<AppGrant>,
}

impl InMemoryApps {
    pub fn with(apps: Vec<App>) -> Arc<Self> {
        Arc::new(Self { apps, grants: vec![] })
    }

    pub fn with_grants(apps: Vec<App>, grants: Vec<AppGrant>) -> Arc<Self> {
        Arc::new(Self { apps, grants })
    }
}

#[async_trait]
impl AppDirectory for InMemoryApps {
    async fn find_by_name(&self, name: &str) -> Result<Option<App>> {
        Ok(self.apps.iter().find(|a| a.name == name).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<App>> {
        Ok(self.apps.iter().find(|a| a.id == id).cloned())
    }

    async fn find_grants(&self, app_id: i64) -> Result<Vec<AppGrant>> {
        Ok(self.grants.iter().filter(|g| g.app_id == app_id).cloned().collect())
    }
}

/// Version store that evaluates queries in memory and records them
#[derive(Default)]
pub struct InMemoryVersions {
    versions: Vec<Version>,
    pub queries: Mutex<Vec<VersionQuery>>,
}

impl InMemoryVersions {
    pub fn with(versions: Vec<Version>) -> Arc<Self> {
        Arc::new(Self { versions, queries: Mutex::new(vec![]) })
    }

    pub fn last_query(&self) -> Option<VersionQuery> {
        self.queries.lock().last().cloned()
    }
}

#[async_trait]
impl VersionStore for InMemoryVersions {
    async fn find(&self, query: &VersionQuery, skip: u64, limit: i64) -> Result<Vec<Version>> {
        self.queries.lock().push(query.clone());

        let mut found: Vec<Version> = self.versions.iter()
            .filter(|v| query.matches(v))
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(found.into_iter()
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

/// Identity provider that records pushes and fails on demand
#[derive(Default)]
pub struct RecordingProvider {
    pub pushed: Mutex<Vec<String>>,
    pub fail_app: bool,
    pub fail_grant_id: Option<i64>,
}

impl RecordingProvider {
    pub fn pushed(&self) -> Vec<String> {
        self.pushed.lock().clone()
    }
}

#[async_trait]
impl IdentityProviderSync for RecordingProvider {
    fn provider_name(&self) -> &'static str {
        "Auth0"
    }

    async fn sync_app(&self, app: &App) -> Result<()> {
        if self.fail_app {
            return Err(PlatformError::identity_provider("client update rejected"));
        }
        self.pushed.lock().push(format!("app:{}", app.id));
        Ok(())
    }

    async fn sync_app_grant(&self, _app: &App, grant: &AppGrant) -> Result<()> {
        if self.fail_grant_id == Some(grant.id) {
            return Err(PlatformError::identity_provider(format!("grant {} rejected", grant.id)));
        }
        self.pushed.lock().push(format!("grant:{}", grant.id));
        Ok(())
    }
}
