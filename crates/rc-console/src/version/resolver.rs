//! Audit Trail Resolver
//!
//! Turns an operator's audit-trail request into a version-store query:
//! the free-text actor is resolved to the identifier stored in `whodunnit`,
//! and an explicit entity replaces every other filter.

use std::sync::Arc;

use tracing::debug;

use super::entity::{EntityRef, Version};
use super::query::{VersionFilters, VersionQuery};
use super::repository::VersionStore;
use crate::app::repository::AppDirectory;
use crate::shared::error::Result;
use crate::user::repository::UserDirectory;

/// How an actor search was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedActor {
    /// Email of a user; holds the user's actor id
    User(String),
    /// Name of an app; holds the app's client id
    App(String),
    /// Matched nothing; holds the search text
    Raw(String),
}

impl ResolvedActor {
    pub fn into_whodunnit(self) -> String {
        match self {
            Self::User(id) | Self::App(id) | Self::Raw(id) => id,
        }
    }
}

pub struct AuditTrailResolver {
    users: Arc<dyn UserDirectory>,
    apps: Arc<dyn AppDirectory>,
    versions: Arc<dyn VersionStore>,
}

impl AuditTrailResolver {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        apps: Arc<dyn AppDirectory>,
        versions: Arc<dyn VersionStore>,
    ) -> Self {
        Self { users, apps, versions }
    }

    /// Resolve actor search text. Users are tried before apps; a match with
    /// no identifier counts as a miss.
    pub async fn resolve_actor(&self, search: &str) -> Result<ResolvedActor> {
        if let Some(actor_id) = self.users.find_by_email(search).await?.and_then(|u| u.actor_id) {
            debug!(search, actor_id = %actor_id, "Actor search resolved to user");
            return Ok(ResolvedActor::User(actor_id));
        }

        if let Some(client_id) = self.apps.find_by_name(search).await?.and_then(|a| a.auth0_client_id) {
            debug!(search, client_id = %client_id, "Actor search resolved to app");
            return Ok(ResolvedActor::App(client_id));
        }

        Ok(ResolvedActor::Raw(search.to_string()))
    }

    /// Build the store query. `filters.whodunnit` carries the raw actor search.
    pub async fn build_query(
        &self,
        mut filters: VersionFilters,
        explicit_entity: Option<EntityRef>,
    ) -> Result<VersionQuery> {
        if let Some(entity) = explicit_entity {
            return Ok(VersionQuery::Entity(entity));
        }

        let search = filters.whodunnit.take();
        filters.whodunnit = match search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => {
                Some(self.resolve_actor(search).await?.into_whodunnit())
            }
            _ => None,
        };

        Ok(VersionQuery::Filtered(filters))
    }

    /// Matching records, newest first
    pub async fn resolve(
        &self,
        filters: VersionFilters,
        explicit_entity: Option<EntityRef>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Version>> {
        let query = self.build_query(filters, explicit_entity).await?;
        self.versions.find(&query, skip, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::entity::{App, AppGrant};
    use crate::user::entity::User;
    use async_trait::async_trait;

    struct Users(Vec<User>);
    struct Apps(Vec<App>);
    struct NoVersions;

    #[async_trait]
    impl UserDirectory for Users {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self.0.iter().find(|u| u.email == email).cloned())
        }
    }

    #[async_trait]
    impl AppDirectory for Apps {
        async fn find_by_name(&self, name: &str) -> Result<Option<App>> {
            Ok(self.0.iter().find(|a| a.name == name).cloned())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<App>> {
            Ok(self.0.iter().find(|a| a.id == id).cloned())
        }

        async fn find_grants(&self, _app_id: i64) -> Result<Vec<AppGrant>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl VersionStore for NoVersions {
        async fn find(&self, _query: &VersionQuery, _skip: u64, _limit: i64) -> Result<Vec<Version>> {
            Ok(vec![])
        }
    }

    fn resolver(users: Vec<User>, apps: Vec<App>) -> AuditTrailResolver {
        AuditTrailResolver::new(Arc::new(Users(users)), Arc::new(Apps(apps)), Arc::new(NoVersions))
    }

    #[tokio::test]
    async fn test_user_without_actor_id_falls_through_to_app() {
        let resolver = resolver(
            vec![User::new(1, "shared@example.com")],
            vec![App::new(2, "shared@example.com").with_client_id("client-2")],
        );

        let actor = resolver.resolve_actor("shared@example.com").await.unwrap();
        assert_eq!(actor, ResolvedActor::App("client-2".to_string()));
    }

    #[tokio::test]
    async fn test_blank_search_is_absent() {
        let resolver = resolver(vec![], vec![]);
        let filters = VersionFilters {
            whodunnit: Some("   ".to_string()),
            ..Default::default()
        };

        let query = resolver.build_query(filters, None).await.unwrap();
        assert_eq!(query, VersionQuery::Filtered(VersionFilters::default()));
    }

    #[tokio::test]
    async fn test_search_is_trimmed_before_lookup() {
        let resolver = resolver(vec![User::new(1, "alice@example.com").with_actor_id("42")], vec![]);
        let filters = VersionFilters {
            whodunnit: Some("  alice@example.com ".to_string()),
            ..Default::default()
        };

        let query = resolver.build_query(filters, None).await.unwrap();
        match query {
            VersionQuery::Filtered(f) => assert_eq!(f.whodunnit.as_deref(), Some("42")),
            other => panic!("unexpected query {:?}", other),
        }
    }
}
